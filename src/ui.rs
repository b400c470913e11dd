//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a three-row split: a header with the elapsed clock and
//!   the refresh "button", the card grid, and a one-line status bar.
//! * Cards are laid out [`COLUMNS`] per row, newest first.  The grid scrolls
//!   so the row holding the selected card stays visible.
//! * Images are not rendered; each card shows its artwork URL instead.

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::refresh::ResultEntry;

/// Cards per grid row.
const COLUMNS: usize = 2;
/// Card height including its border.
const CARD_HEIGHT: u16 = 5;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [header_area, grid_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(CARD_HEIGHT),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(app, frame, header_area);
    draw_grid(app, frame, grid_area);
    draw_status_bar(app, frame, status_area);
}

/// Elapsed clock on the left, refresh button on the right.
fn draw_header(app: &App, frame: &mut Frame, area: Rect) {
    let [clock_area, button_area] =
        Layout::horizontal([Constraint::Min(10), Constraint::Length(22)]).areas(area);

    let timer_state = if app.controller.active() {
        Span::styled("auto refresh", Style::default().fg(Color::Green))
    } else {
        Span::styled("paused", Style::default().fg(Color::Red))
    };
    let clock = Paragraph::new(Line::from(vec![
        Span::styled(
            app.controller.elapsed_display(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        timer_state,
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(clock, clock_area);

    let (label, color) = match app.controller.in_flight() {
        0 => ("[r] Show Pokémon".to_string(), Color::Blue),
        1 => ("Loading…".to_string(), Color::DarkGray),
        n => (format!("Loading… ({n})"), Color::DarkGray),
    };
    let button = Paragraph::new(Span::styled(label, Style::default().fg(color)))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
    frame.render_widget(button, button_area);
}

/// Render the scrollable card grid.
fn draw_grid(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Pokédex ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let entries: Vec<&ResultEntry> = app.controller.newest_first().collect();
    if entries.is_empty() {
        let hint = Paragraph::new("No Pokémon yet. Press r or wait for the timer.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, inner);
        return;
    }

    let visible_rows = usize::from(inner.height / CARD_HEIGHT).max(1);
    let selected_row = app.selected().map_or(0, |i| i / COLUMNS);
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    let rows = Layout::vertical(vec![Constraint::Length(CARD_HEIGHT); visible_rows]).split(inner);
    for (r, row_area) in rows.iter().enumerate() {
        let cols = Layout::horizontal([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)]).split(*row_area);
        for (c, card_area) in cols.iter().enumerate() {
            let index = (first_row + r) * COLUMNS + c;
            if let Some(entry) = entries.get(index) {
                draw_card(frame, *card_area, entry, app.selected() == Some(index));
            }
        }
    }
}

fn draw_card(frame: &mut Frame, area: Rect, entry: &ResultEntry, selected: bool) {
    let border_style = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let fetched_at = entry.fetched_at.with_timezone(&Local).format("%H:%M:%S");

    let lines = vec![
        Line::from(Span::styled(
            entry.item.display_name(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            entry.item.image_url.as_str(),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(Span::styled(
            format!("fetched {fetched_at}"),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let card = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .title(format!(" #{:03} ", entry.item.id))
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(card, area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} items", app.item_count()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  r: show  p: pause  ↑/↓: move  Home/End: jump"),
    ]));
    frame.render_widget(status, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
