use crate::refresh::{FetchFailure, FetchOrigin, RefreshController};
use crate::source::{CatalogItem, FetchError};

pub struct App {
    /// Result list, loading state and timers.
    pub controller: RefreshController,
    /// Selected card, as an index into the newest-first order.
    selected: Option<usize>,
    /// Fetches approved by the controller but not yet spawned.
    pending: Vec<FetchOrigin>,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,
}

impl App {
    pub fn new(controller: RefreshController) -> Self {
        Self {
            controller,
            selected: None,
            pending: Vec::new(),
            quit: false,
            status: "Waiting for the first item…".into(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.controller.results().len()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    // -- fetch requests ------------------------------------------------------

    pub fn request_manual_refresh(&mut self) {
        match self.controller.on_manual_trigger() {
            Some(origin) => self.pending.push(origin),
            None => self.status = "Already loading".into(),
        }
    }

    pub fn auto_refresh(&mut self) {
        if let Some(origin) = self.controller.on_auto_refresh_tick() {
            self.pending.push(origin);
        }
    }

    pub fn toggle_timer(&mut self) {
        self.status = if self.controller.toggle_active() {
            "Timer resumed".into()
        } else {
            "Timer paused".into()
        };
    }

    /// Drain the fetches the event loop should spawn.
    pub fn take_pending(&mut self) -> Vec<FetchOrigin> {
        std::mem::take(&mut self.pending)
    }

    pub fn handle_fetched(&mut self, origin: FetchOrigin, result: Result<CatalogItem, FetchError>) {
        if let Some(item) = self.controller.on_fetch_complete(origin, result) {
            self.status = format!("Fetched #{:03} {}", item.id, item.display_name());
            // The new card goes in front; keep the same card selected.
            if let Some(i) = self.selected {
                self.selected = Some(i + 1);
            }
        }
    }

    /// Surface a failure that would otherwise only be logged.
    pub fn show_failure(&mut self, failure: &FetchFailure) {
        tracing::debug!(kind = ?failure.kind, origin = ?failure.origin, "showing fetch failure");
        self.status = format!("Error: {}", failure.message);
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        let len = self.item_count();
        if len == 0 {
            return;
        }
        let i = match self.selected {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.selected = Some(i);
    }

    pub fn select_previous(&mut self) {
        if self.item_count() == 0 {
            return;
        }
        let i = match self.selected {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.selected = Some(i);
    }

    pub fn select_first(&mut self) {
        if self.item_count() > 0 {
            self.selected = Some(0);
        }
    }

    pub fn select_last(&mut self) {
        let len = self.item_count();
        if len > 0 {
            self.selected = Some(len - 1);
        }
    }
}
