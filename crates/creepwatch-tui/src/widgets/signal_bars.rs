//! RSSI strength bars for table cells.

use ratatui::style::{Color, Style};
use ratatui::text::Span;

use crate::theme;

/// Styled bar glyphs for an RSSI reading, dotted out when the device has
/// produced no recent signal. Each 10 dBm below -50 drops one bar.
pub fn signal_span(dbm: Option<i32>) -> Span<'static> {
    let Some(dbm) = dbm else {
        return Span::styled("····", Style::default().fg(theme::GRID_GRAY));
    };

    let bars = match dbm {
        d if d >= -50 => "▂▄▆█",
        d if d >= -60 => "▂▄▆ ",
        d if d >= -70 => "▂▄  ",
        d if d >= -80 => "▂   ",
        _ => "·   ",
    };
    Span::styled(bars, Style::default().fg(strength_color(dbm)))
}

/// Phosphor for a strong signal, fading through amber to alert red for one
/// on the edge of hearing.
fn strength_color(dbm: i32) -> Color {
    if dbm >= -50 {
        theme::PHOSPHOR
    } else if dbm >= -60 {
        theme::PHOSPHOR_DIM
    } else if dbm >= -80 {
        theme::AMBER
    } else {
        theme::ALERT_RED
    }
}

/// Numeric dBm label alongside the bars, `"-61"` or `"···"` when absent.
pub fn dbm_label(dbm: Option<i32>) -> String {
    dbm.map_or_else(|| "···".into(), |v| format!("{v}"))
}
