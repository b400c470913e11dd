//! Refresh control: timers, loading state and the result list.
//!
//! [`RefreshController`] is a plain state machine owned by the event loop.
//! It decides whether a tick or key press may start a fetch, and absorbs
//! completions.  Network work never touches it directly: [`spawn_fetch`]
//! runs the source's future on a tokio worker and posts the outcome back as
//! an [`AppMsg`], so every mutation happens on the owning task.
//!
//! ## For contributors
//!
//! Two timers drive the loop: a one-second clock that advances the elapsed
//! counter and the auto-refresh period (30 s by default).  Both are created
//! with [`every`], whose first tick fires one full period after start.

use std::time::Duration;

use chrono::{DateTime, Utc};
use crossterm::event::KeyEvent;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::source::{CatalogItem, FetchError, FetchErrorKind, ItemSource};

/// Period of the elapsed-time clock.
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

/// Default auto-refresh period.
pub const AUTO_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

const ERROR_CHANNEL_CAPACITY: usize = 16;

/// What started a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// The auto-refresh timer.
    Auto,
    /// The user's refresh key.
    Manual,
}

/// Whether an auto-refresh tick may start a fetch while another is loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OverlapPolicy {
    /// Auto ticks always fetch; a manual and an auto fetch can overlap.
    #[default]
    Allow,
    /// Auto ticks are skipped while any fetch is loading.
    Skip,
}

/// One fetched item and when its fetch completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub item: CatalogItem,
    pub fetched_at: DateTime<Utc>,
}

/// A failed fetch, as published on the error channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub origin: FetchOrigin,
    pub kind: FetchErrorKind,
    pub message: String,
}

/// Messages delivered to the event loop.
#[derive(Debug)]
pub enum AppMsg {
    /// A terminal key event from the input thread.
    Key(KeyEvent),
    /// A spawned fetch finished.
    Fetched {
        origin: FetchOrigin,
        result: Result<CatalogItem, FetchError>,
    },
}

/// Render `seconds` as `MM:SS`.
///
/// Minutes are taken modulo one hour, so 3661 s renders as `01:01`.
pub fn format_elapsed(seconds: u64) -> String {
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

pub struct RefreshController {
    /// Append-only, in completion order.
    results: Vec<ResultEntry>,
    /// Fetches started but not yet completed.
    in_flight: usize,
    elapsed_seconds: u64,
    /// Cleared by [`toggle_active`](Self::toggle_active) to pause the clock
    /// and auto refresh.
    active: bool,
    overlap: OverlapPolicy,
    errors: broadcast::Sender<FetchFailure>,
}

impl RefreshController {
    pub fn new(overlap: OverlapPolicy) -> Self {
        let (errors, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);
        Self {
            results: Vec::new(),
            in_flight: 0,
            elapsed_seconds: 0,
            active: true,
            overlap,
            errors,
        }
    }

    // -- observation ---------------------------------------------------------

    /// Results in completion order (oldest first).
    pub fn results(&self) -> &[ResultEntry] {
        &self.results
    }

    /// Results in render order (most recent first).
    pub fn newest_first(&self) -> impl Iterator<Item = &ResultEntry> {
        self.results.iter().rev()
    }

    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_seconds())
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Subscribe to failed fetches.  Failures are only logged unless
    /// someone listens here.
    pub fn subscribe_errors(&self) -> broadcast::Receiver<FetchFailure> {
        self.errors.subscribe()
    }

    // -- events --------------------------------------------------------------

    /// The auto-refresh timer fired.  Returns the fetch to start, if any.
    pub fn on_auto_refresh_tick(&mut self) -> Option<FetchOrigin> {
        if !self.active {
            debug!("auto refresh skipped: paused");
            return None;
        }
        if self.overlap == OverlapPolicy::Skip && self.loading() {
            debug!(in_flight = self.in_flight, "auto refresh skipped: fetch in flight");
            return None;
        }
        self.in_flight += 1;
        Some(FetchOrigin::Auto)
    }

    /// The user asked for an item.  Refused while loading.
    pub fn on_manual_trigger(&mut self) -> Option<FetchOrigin> {
        if self.loading() {
            debug!("manual refresh refused: fetch in flight");
            return None;
        }
        self.in_flight += 1;
        Some(FetchOrigin::Manual)
    }

    /// The one-second clock fired.
    pub fn on_clock_tick(&mut self) {
        if self.active {
            self.elapsed_seconds += 1;
        }
    }

    /// Pause or resume the clock and auto refresh.  Returns the new state.
    pub fn toggle_active(&mut self) -> bool {
        self.active = !self.active;
        info!(active = self.active, "timer toggled");
        self.active
    }

    /// A fetch started by `origin` finished.
    ///
    /// Auto fetches reset the elapsed counter whether or not they succeeded.
    /// Returns the appended item on success.
    pub fn on_fetch_complete(
        &mut self,
        origin: FetchOrigin,
        result: Result<CatalogItem, FetchError>,
    ) -> Option<&CatalogItem> {
        self.in_flight = self.in_flight.saturating_sub(1);
        if origin == FetchOrigin::Auto {
            self.elapsed_seconds = 0;
        }

        match result {
            Ok(item) => {
                info!(id = item.id, name = %item.name, ?origin, "fetched catalog item");
                self.results.push(ResultEntry {
                    item,
                    fetched_at: Utc::now(),
                });
                self.results.last().map(|entry| &entry.item)
            }
            Err(e) => {
                warn!(?origin, error = %e, "fetch failed");
                // No receivers is the normal, silent case.
                let _ = self.errors.send(FetchFailure {
                    origin,
                    kind: e.kind(),
                    message: e.to_string(),
                });
                None
            }
        }
    }
}

/// Start `source`'s next fetch on a tokio worker.
///
/// The outcome is sent to `tx` as exactly one [`AppMsg::Fetched`].  If the
/// receiver is gone the event loop has exited and the result is dropped.
pub fn spawn_fetch<S>(source: &mut S, origin: FetchOrigin, tx: mpsc::Sender<AppMsg>) -> JoinHandle<()>
where
    S: ItemSource + ?Sized,
{
    debug!(source = source.name(), ?origin, "starting fetch");
    let pending = source.fetch();
    tokio::spawn(async move {
        let result = pending.await;
        let _ = tx.send(AppMsg::Fetched { origin, result }).await;
    })
}

/// An interval whose first tick is one full `period` from now.
pub fn every(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use url::Url;

    use crate::source::FetchFuture;

    fn item(id: u32) -> CatalogItem {
        CatalogItem {
            id,
            name: format!("mon-{id}"),
            image_url: Url::parse(&format!("https://img.example/{id}.png")).unwrap(),
        }
    }

    // -- formatting ----------------------------------------------------------

    #[test]
    fn format_elapsed_pads_minutes_and_seconds() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(9), "00:09");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(3599), "59:59");
    }

    #[test]
    fn format_elapsed_wraps_at_one_hour() {
        assert_eq!(format_elapsed(3600), "00:00");
        assert_eq!(format_elapsed(3661), "01:01");
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_controller_is_idle_and_active() {
        let c = RefreshController::new(OverlapPolicy::Allow);
        assert!(c.results().is_empty());
        assert!(!c.loading());
        assert!(c.active());
        assert_eq!(c.elapsed_display(), "00:00");
    }

    // -- clock ---------------------------------------------------------------

    #[test]
    fn clock_tick_advances_only_while_active() {
        let mut c = RefreshController::new(OverlapPolicy::Allow);
        c.on_clock_tick();
        c.on_clock_tick();
        assert_eq!(c.elapsed_seconds(), 2);

        assert!(!c.toggle_active());
        c.on_clock_tick();
        assert_eq!(c.elapsed_seconds(), 2);

        assert!(c.toggle_active());
        c.on_clock_tick();
        assert_eq!(c.elapsed_seconds(), 3);
    }

    // -- manual trigger ------------------------------------------------------

    #[test]
    fn manual_trigger_sets_loading_until_completion() {
        let mut c = RefreshController::new(OverlapPolicy::Allow);

        assert_eq!(c.on_manual_trigger(), Some(FetchOrigin::Manual));
        assert!(c.loading());

        c.on_fetch_complete(FetchOrigin::Manual, Ok(item(1)));
        assert!(!c.loading());
    }

    #[test]
    fn manual_trigger_is_refused_while_loading() {
        let mut c = RefreshController::new(OverlapPolicy::Allow);
        c.on_manual_trigger();

        assert_eq!(c.on_manual_trigger(), None);
        assert_eq!(c.in_flight(), 1);
    }

    #[test]
    fn manual_completion_keeps_elapsed() {
        let mut c = RefreshController::new(OverlapPolicy::Allow);
        for _ in 0..10 {
            c.on_clock_tick();
        }
        c.on_manual_trigger();
        c.on_fetch_complete(FetchOrigin::Manual, Ok(item(1)));
        assert_eq!(c.elapsed_seconds(), 10);
    }

    #[test]
    fn manual_trigger_works_while_paused() {
        let mut c = RefreshController::new(OverlapPolicy::Allow);
        c.toggle_active();
        assert_eq!(c.on_manual_trigger(), Some(FetchOrigin::Manual));
    }

    // -- auto refresh --------------------------------------------------------

    #[test]
    fn auto_completion_resets_elapsed_on_success_and_failure() {
        let mut c = RefreshController::new(OverlapPolicy::Allow);
        for _ in 0..30 {
            c.on_clock_tick();
        }
        assert_eq!(c.on_auto_refresh_tick(), Some(FetchOrigin::Auto));
        c.on_fetch_complete(FetchOrigin::Auto, Ok(item(4)));
        assert_eq!(c.elapsed_seconds(), 0);

        for _ in 0..30 {
            c.on_clock_tick();
        }
        c.on_auto_refresh_tick();
        c.on_fetch_complete(FetchOrigin::Auto, Err(FetchError::NoData));
        assert_eq!(c.elapsed_seconds(), 0);
        assert_eq!(c.results().len(), 1);
    }

    #[test]
    fn auto_tick_overlaps_when_allowed() {
        let mut c = RefreshController::new(OverlapPolicy::Allow);
        c.on_manual_trigger();
        assert_eq!(c.on_auto_refresh_tick(), Some(FetchOrigin::Auto));
        assert_eq!(c.in_flight(), 2);

        c.on_fetch_complete(FetchOrigin::Manual, Ok(item(1)));
        assert!(c.loading(), "auto fetch still in flight");
        c.on_fetch_complete(FetchOrigin::Auto, Ok(item(2)));
        assert!(!c.loading());
    }

    #[test]
    fn auto_tick_skipped_while_loading_when_configured() {
        let mut c = RefreshController::new(OverlapPolicy::Skip);
        c.on_manual_trigger();
        assert_eq!(c.on_auto_refresh_tick(), None);
        assert_eq!(c.in_flight(), 1);
    }

    #[test]
    fn auto_tick_skipped_while_paused() {
        let mut c = RefreshController::new(OverlapPolicy::Allow);
        c.toggle_active();
        assert_eq!(c.on_auto_refresh_tick(), None);
        assert!(!c.loading());
    }

    // -- results -------------------------------------------------------------

    #[test]
    fn results_are_in_completion_order_and_render_newest_first() {
        let mut c = RefreshController::new(OverlapPolicy::Allow);
        for id in [5, 2, 9] {
            c.on_manual_trigger();
            let appended = c.on_fetch_complete(FetchOrigin::Manual, Ok(item(id)));
            assert_eq!(appended.map(|i| i.id), Some(id));
        }

        assert_eq!(c.results().len(), 3);
        let completion: Vec<u32> = c.results().iter().map(|e| e.item.id).collect();
        assert_eq!(completion, vec![5, 2, 9]);
        let rendered: Vec<u32> = c.newest_first().map(|e| e.item.id).collect();
        assert_eq!(rendered, vec![9, 2, 5]);
    }

    #[test]
    fn failure_appends_nothing() {
        let mut c = RefreshController::new(OverlapPolicy::Allow);
        c.on_manual_trigger();
        let appended = c.on_fetch_complete(FetchOrigin::Manual, Err(FetchError::NoData));
        assert!(appended.is_none());
        assert!(c.results().is_empty());
        assert!(!c.loading());
    }

    // -- error channel -------------------------------------------------------

    #[test]
    fn failures_are_published_to_subscribers() {
        let mut c = RefreshController::new(OverlapPolicy::Allow);
        let mut rx = c.subscribe_errors();

        c.on_auto_refresh_tick();
        c.on_fetch_complete(
            FetchOrigin::Auto,
            Err(FetchError::ExhaustedRange { min: 1, max: 2 }),
        );

        let failure = rx.try_recv().unwrap();
        assert_eq!(failure.origin, FetchOrigin::Auto);
        assert_eq!(failure.kind, FetchErrorKind::ExhaustedRange);
        assert!(failure.message.contains("1..=2"));
    }

    #[test]
    fn failures_without_subscribers_are_silent() {
        let mut c = RefreshController::new(OverlapPolicy::Allow);
        c.on_manual_trigger();
        // Must not panic or block with nobody listening.
        c.on_fetch_complete(FetchOrigin::Manual, Err(FetchError::NoData));
        assert!(c.results().is_empty());
    }

    #[test]
    fn successes_are_not_published() {
        let mut c = RefreshController::new(OverlapPolicy::Allow);
        let mut rx = c.subscribe_errors();
        c.on_manual_trigger();
        c.on_fetch_complete(FetchOrigin::Manual, Ok(item(1)));
        assert!(rx.try_recv().is_err());
    }

    // -- spawning ------------------------------------------------------------

    struct Scripted {
        outcomes: Vec<Result<CatalogItem, FetchError>>,
    }

    impl ItemSource for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn fetch(&mut self) -> FetchFuture {
            let outcome = self.outcomes.remove(0);
            Box::pin(async move { outcome })
        }
    }

    #[tokio::test]
    async fn spawn_fetch_delivers_exactly_one_message_per_fetch() {
        let mut source = Scripted {
            outcomes: vec![Ok(item(12)), Err(FetchError::NoData)],
        };
        let (tx, mut rx) = mpsc::channel(8);

        spawn_fetch(&mut source, FetchOrigin::Manual, tx.clone()).await.unwrap();
        spawn_fetch(&mut source, FetchOrigin::Auto, tx).await.unwrap();

        match rx.recv().await {
            Some(AppMsg::Fetched { origin, result }) => {
                assert_eq!(origin, FetchOrigin::Manual);
                assert_eq!(result.unwrap().id, 12);
            }
            other => panic!("unexpected message: {other:?}"),
        }
        match rx.recv().await {
            Some(AppMsg::Fetched { origin, result }) => {
                assert_eq!(origin, FetchOrigin::Auto);
                assert!(matches!(result, Err(FetchError::NoData)));
            }
            other => panic!("unexpected message: {other:?}"),
        }
        // Both senders dropped: the channel is closed, nothing else arrives.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn spawn_fetch_tolerates_closed_receiver() {
        let mut source = Scripted {
            outcomes: vec![Ok(item(1))],
        };
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        spawn_fetch(&mut source, FetchOrigin::Auto, tx).await.unwrap();
    }

    // -- timers --------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_a_full_period() {
        let start = Instant::now();
        let mut interval = every(AUTO_REFRESH_INTERVAL);

        interval.tick().await;
        assert!(start.elapsed() >= AUTO_REFRESH_INTERVAL);

        interval.tick().await;
        assert!(start.elapsed() >= AUTO_REFRESH_INTERVAL * 2);
    }
}
