//! Phosphor palette and semantic styling for the TUI.
//!
//! Green-on-black with amber accents, after the radar scopes this kind of
//! tool gets compared to. Alert red is reserved for flagged creeps.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const PHOSPHOR: Color = Color::Rgb(102, 255, 102); // #66ff66
pub const PHOSPHOR_DIM: Color = Color::Rgb(58, 145, 58); // #3a913a
pub const AMBER: Color = Color::Rgb(255, 191, 71); // #ffbf47
pub const ALERT_RED: Color = Color::Rgb(255, 84, 84); // #ff5454
pub const ICE_BLUE: Color = Color::Rgb(125, 200, 255); // #7dc8ff

// ── Extended Palette ──────────────────────────────────────────────────

pub const FOG: Color = Color::Rgb(176, 184, 176); // #b0b8b0
pub const GRID_GRAY: Color = Color::Rgb(84, 98, 84); // #546254
pub const BG_HIGHLIGHT: Color = Color::Rgb(26, 36, 26); // #1a241a

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(PHOSPHOR).add_modifier(Modifier::BOLD)
}

/// Border for a focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(PHOSPHOR_DIM)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(GRID_GRAY)
}

/// Table header row.
pub fn table_header() -> Style {
    Style::default()
        .fg(PHOSPHOR)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Normal table row text.
pub fn table_row() -> Style {
    Style::default().fg(FOG)
}

/// A row flagged as a creep.
pub fn table_row_creep() -> Style {
    Style::default().fg(ALERT_RED)
}

/// Selected / highlighted table row.
pub fn table_selected() -> Style {
    Style::default()
        .fg(AMBER)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Status bar text.
pub fn status_bar() -> Style {
    Style::default().fg(FOG)
}

/// Status bar "live" indicator.
pub fn status_ok() -> Style {
    Style::default().fg(PHOSPHOR)
}

/// Status bar error indicator.
pub fn status_error() -> Style {
    Style::default().fg(ALERT_RED).add_modifier(Modifier::BOLD)
}

/// Key hint: the key itself.
pub fn key_hint_key() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

/// Key hint: the description.
pub fn key_hint() -> Style {
    Style::default().fg(GRID_GRAY)
}
