//! Application core — event loop, action dispatch, status bar.

use std::time::Duration;

use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use creepwatch_core::{Monitor, Settings};

use crate::action::{Action, SensorStatus};
use crate::data_bridge::spawn_data_bridge;
use crate::event::{EventPump, UiEvent};
use crate::screens::CreepsScreen;
use crate::theme;
use crate::tui::Tui;

/// Top-level application state and event loop.
pub struct App {
    /// The one screen: the creep table.
    screen: CreepsScreen,
    /// Whether the app should keep running.
    running: bool,
    /// Sensor status shown in the status bar.
    status: SensorStatus,
    /// Latest watermark, for the "data through ..." status segment.
    watermark: Option<i64>,
    /// Help overlay visibility.
    help_visible: bool,
    /// Action sender — the data bridge and input handling dispatch through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver — main loop drains this.
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            screen: CreepsScreen::new(settings),
            running: true,
            status: SensorStatus::default(),
            watermark: None,
            help_visible: false,
            action_tx,
            action_rx,
        }
    }

    /// Run the main event loop, hosting the monitor for its duration.
    ///
    /// The monitor is started by the data bridge and stopped when the loop
    /// exits — teardown cancels the bridge and waits for it, so no
    /// in-flight poll response can touch a dead terminal.
    pub async fn run(&mut self, monitor: Monitor) -> Result<()> {
        let mut tui = Tui::enter()?;

        let bridge_cancel = CancellationToken::new();
        let bridge = tokio::spawn(spawn_data_bridge(
            monitor,
            self.action_tx.clone(),
            bridge_cancel.clone(),
        ));

        let mut events = EventPump::start(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(50),  // 20 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                UiEvent::Key(key) => {
                    if let Some(action) = self.handle_key_event(key) {
                        self.action_tx.send(action)?;
                    }
                }
                UiEvent::Mouse(mouse) => {
                    if let Some(action) = self.handle_mouse_event(mouse) {
                        self.action_tx.send(action)?;
                    }
                }
                UiEvent::Resize(w, h) => {
                    self.action_tx.send(Action::Resize(w, h))?;
                }
                UiEvent::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                UiEvent::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            // Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                let render = matches!(action, Action::Render);
                self.process_action(action);
                if render {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        bridge_cancel.cancel();
        let _ = bridge.await;
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// everything else goes to the screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    Some(Action::ToggleHelp)
                }
                _ => None,
            };
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) | (KeyModifiers::NONE, KeyCode::Char('q')) => {
                Some(Action::Quit)
            }
            (KeyModifiers::NONE, KeyCode::Char('?')) => Some(Action::ToggleHelp),
            _ => self.screen.handle_key_event(key),
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Option<Action> {
        if self.help_visible {
            return None;
        }
        self.screen.handle_mouse_event(mouse)
    }

    /// Process a single action — update app state and propagate to the screen.
    fn process_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::StatusChanged(status) => self.status = status,
            Action::WatermarkAdvanced(mark) => self.watermark = Some(mark),
            Action::OpenDetail(ref key) => {
                debug!(device = %key, "row activated");
                self.screen.update(&action);
            }
            Action::Render | Action::Tick | Action::Resize(..) => {}
            other => self.screen.update(&other),
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Min(1),    // screen content
            Constraint::Length(1), // status bar
        ])
        .split(area);

        self.screen.render(frame, layout[0]);
        self.render_status_bar(frame, layout[1]);

        if self.help_visible {
            self.render_help_overlay(frame, area);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let (indicator, style) = match &self.status {
            SensorStatus::Starting => ("◌ connecting", theme::status_bar()),
            SensorStatus::Polling => ("● polling", theme::status_ok()),
            SensorStatus::Stopped => ("○ stopped", theme::status_bar()),
            SensorStatus::Failed(_) => ("✗ failed", theme::status_error()),
        };

        let mut spans = vec![
            Span::styled(format!(" {indicator} "), style),
            Span::styled("│ ", theme::key_hint()),
        ];

        if let SensorStatus::Failed(reason) = &self.status {
            spans.push(Span::styled(reason.clone(), theme::status_error()));
        } else if let Some(mark) = self.watermark {
            spans.push(Span::styled(
                format!("data through {} ", fmt_watermark(mark)),
                theme::status_bar(),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let width = 46.min(area.width);
        let height = 12.min(area.height);
        let popup = Rect {
            x: area.x + (area.width.saturating_sub(width)) / 2,
            y: area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        };

        let block = Block::default()
            .title(" Help ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let key = |k: &'static str| Span::styled(format!("  {k:<12}"), theme::key_hint_key());
        let desc = |d: &'static str| Span::styled(d, theme::status_bar());

        let lines = vec![
            Line::default(),
            Line::from(vec![key("j/k, ↓/↑"), desc("move selection")]),
            Line::from(vec![key("g / G"), desc("jump to top / bottom")]),
            Line::from(vec![key("Ctrl-d/u"), desc("page down / up")]),
            Line::from(vec![key("Enter"), desc("open device detail")]),
            Line::from(vec![key("click"), desc("select; click again for detail")]),
            Line::from(vec![key("Esc"), desc("close detail")]),
            Line::from(vec![key("?"), desc("toggle this help")]),
            Line::from(vec![key("q"), desc("quit")]),
        ];

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

/// Render a watermark epoch as local-ish HH:MM:SS; relative window values
/// from before the first batch aren't meaningful timestamps.
fn fmt_watermark(mark: i64) -> String {
    match DateTime::<Utc>::from_timestamp(mark, 0) {
        Some(dt) if mark > 1_000_000 => dt.format("%H:%M:%S UTC").to_string(),
        _ => format!("window {mark}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watermark_formats_epochs_and_windows() {
        assert_eq!(fmt_watermark(1), "window 1");
        assert_eq!(fmt_watermark(-60), "window -60");
        assert!(fmt_watermark(1_700_000_000).ends_with("UTC"));
    }
}
