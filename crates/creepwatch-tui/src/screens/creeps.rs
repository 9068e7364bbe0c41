//! The creep table — live view of located devices, sorted by signal then
//! drift, with a detail panel for the activated row.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use std::sync::Arc;

use creepwatch_core::{CreepRow, RowSnapshot, Settings};

use crate::action::Action;
use crate::theme;
use crate::widgets::signal_bars;

pub struct CreepsScreen {
    rows: RowSnapshot,
    table_state: TableState,
    detail_open: bool,
    settings: Settings,
    /// Table body viewport captured at render time, for click hit-testing.
    table_area: Rect,
}

impl CreepsScreen {
    pub fn new(settings: Settings) -> Self {
        Self {
            rows: Arc::new(Vec::new()),
            table_state: TableState::default(),
            detail_open: false,
            settings,
            table_area: Rect::default(),
        }
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected_row(&self) -> Option<&Arc<CreepRow>> {
        self.rows.get(self.selected_index())
    }

    fn select(&mut self, idx: usize) {
        let clamped = if self.rows.is_empty() {
            0
        } else {
            idx.min(self.rows.len() - 1)
        };
        self.table_state.select(Some(clamped));
    }

    fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let next = self.selected_index().saturating_add_signed(delta);
        self.select(next);
    }

    fn activate_selected(&mut self) -> Option<Action> {
        let key = self.selected_row().map(|r| r.key.clone())?;
        self.detail_open = true;
        Some(Action::OpenDetail(key))
    }

    /// True if this row's drift meets the creep threshold (inclusive).
    fn is_creep(&self, row: &CreepRow) -> bool {
        row.distance >= self.settings.threshold_distance
    }

    // ── Input ────────────────────────────────────────────────────────

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        if self.detail_open {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    self.detail_open = false;
                    Some(Action::CloseDetail)
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    self.move_selection(1);
                    None
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.move_selection(-1);
                    None
                }
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Char('g') => {
                self.select(0);
                None
            }
            KeyCode::Char('G') => {
                if !self.rows.is_empty() {
                    self.select(self.rows.len() - 1);
                }
                None
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_selection(10);
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_selection(-10);
                None
            }
            KeyCode::Enter => self.activate_selected(),
            _ => None,
        }
    }

    /// Left click selects the row under the cursor; a click on the row
    /// that is already selected activates it.
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Option<Action> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return None;
        }
        let area = self.table_area;
        if !area.contains(ratatui::layout::Position::new(mouse.column, mouse.row)) {
            return None;
        }
        // First line of the viewport is the header row.
        let line = mouse.row.checked_sub(area.y)?;
        if line == 0 {
            return None;
        }
        let idx = usize::from(line - 1) + self.table_state.offset();
        if idx >= self.rows.len() {
            return None;
        }
        if idx == self.selected_index() && self.table_state.selected().is_some() {
            self.select(idx);
            return self.activate_selected();
        }
        self.select(idx);
        None
    }

    pub fn update(&mut self, action: &Action) {
        match action {
            Action::RowsUpdated(rows) => {
                self.rows = Arc::clone(rows);
                // Clamp selection
                if !self.rows.is_empty() && self.selected_index() >= self.rows.len() {
                    self.select(self.rows.len() - 1);
                }
            }
            Action::CloseDetail => {
                self.detail_open = false;
            }
            _ => {}
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let row_count = self.rows.len();
        let creep_count = self.rows.iter().filter(|r| self.is_creep(r)).count();
        let title = format!(" Creep Watch — {row_count} tracked · {creep_count} flagged ");

        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            // focus follows the detail panel when it's open
            .border_style(if self.detail_open {
                theme::border_default()
            } else {
                theme::border_focused()
            });

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let (table_area, detail_area) = if self.detail_open {
            let chunks =
                Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)])
                    .split(inner);
            (chunks[0], Some(chunks[1]))
        } else {
            (inner, None)
        };

        let layout = Layout::vertical([
            Constraint::Length(1), // filter line
            Constraint::Min(1),    // table
            Constraint::Length(1), // hints
        ])
        .split(table_area);

        self.render_filter_line(frame, layout[0]);
        self.render_table(frame, layout[1]);
        self.render_hints(frame, layout[2]);

        if let Some(detail_area) = detail_area {
            if let Some(row) = self.selected_row() {
                let row = Arc::clone(row);
                self.render_detail(frame, detail_area, &row);
            }
        }
    }

    fn render_filter_line(&self, frame: &mut Frame, area: Rect) {
        let filter = if self.settings.show_only_creeps {
            "[creeps only]"
        } else {
            "[all located]"
        };
        let line = Line::from(vec![
            Span::styled(" Filter: ", Style::default().fg(theme::FOG)),
            Span::styled(filter, Style::default().fg(theme::PHOSPHOR)),
            Span::styled("  Threshold: ", Style::default().fg(theme::FOG)),
            Span::styled(
                format!(
                    "{} {}",
                    self.settings.threshold_distance,
                    self.settings.unit.label()
                ),
                Style::default().fg(theme::AMBER),
            ),
            Span::styled("  Sort: ", Style::default().fg(theme::FOG)),
            Span::styled("[rssi ↓, drift ↓]", Style::default().fg(theme::PHOSPHOR)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        self.table_area = area;

        let header = Row::new(vec![
            Cell::from("⚑").style(theme::table_header()),
            Cell::from("SSID").style(theme::table_header()),
            Cell::from("Type").style(theme::table_header()),
            Cell::from("MAC Addr").style(theme::table_header()),
            Cell::from("Manuf").style(theme::table_header()),
            Cell::from("RSSI").style(theme::table_header()),
            Cell::from("Lat").style(theme::table_header()),
            Cell::from("Lon").style(theme::table_header()),
            Cell::from(format!("Drift ({})", self.settings.unit.label()))
                .style(theme::table_header()),
        ]);

        let selected = self.selected_index();
        let rows: Vec<Row> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let is_selected = i == selected;
                let is_creep = self.is_creep(row);
                let prefix = if is_selected { "▸" } else { " " };
                let flag = if is_creep { "⚑" } else { " " };

                let ssid = if row.ssid.is_empty() {
                    "<hidden>".to_owned()
                } else {
                    row.ssid.clone()
                };

                let base_style = if is_creep {
                    theme::table_row_creep()
                } else {
                    theme::table_row()
                };

                Row::new(vec![
                    Cell::from(format!("{prefix}{flag}")).style(base_style),
                    Cell::from(ssid).style(base_style.add_modifier(if is_selected {
                        Modifier::BOLD
                    } else {
                        Modifier::empty()
                    })),
                    Cell::from(row.device_type.clone()).style(base_style),
                    Cell::from(row.macaddr.clone()).style(Style::default().fg(theme::ICE_BLUE)),
                    Cell::from(row.manufacturer.clone()).style(base_style),
                    Cell::from(Line::from(vec![
                        signal_bars::signal_span(row.rssi),
                        Span::raw(" "),
                        Span::styled(signal_bars::dbm_label(row.rssi), base_style),
                    ])),
                    Cell::from(format!("{:.5}", row.lat)).style(base_style),
                    Cell::from(format!("{:.5}", row.lon)).style(base_style),
                    Cell::from(format!("{:.3}", row.distance)).style(if is_creep {
                        theme::table_row_creep().add_modifier(Modifier::BOLD)
                    } else {
                        base_style
                    }),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(2),
            Constraint::Min(14),
            Constraint::Length(12),
            Constraint::Length(17),
            Constraint::Length(14),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Length(11),
            Constraint::Length(11),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, area, &mut state);
        self.table_state = state;
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("Enter/click ", theme::key_hint_key()),
            Span::styled("detail  ", theme::key_hint()),
            Span::styled("? ", theme::key_hint_key()),
            Span::styled("help  ", theme::key_hint()),
            Span::styled("q ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), area);
    }

    /// Device detail, rendered below the table for the activated row.
    fn render_detail(&self, frame: &mut Frame, area: Rect, row: &CreepRow) {
        let ssid = if row.ssid.is_empty() {
            "<hidden>"
        } else {
            row.ssid.as_str()
        };
        let title = format!(" {ssid}  ·  {} ", row.macaddr);
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let label = |s: &'static str| Span::styled(s, Style::default().fg(theme::GRID_GRAY));
        let value = |s: String| Span::styled(s, Style::default().fg(theme::FOG));

        let verdict = if self.is_creep(row) {
            Span::styled(
                format!(
                    "FLAGGED: drift at or over {} {}",
                    self.settings.threshold_distance,
                    self.settings.unit.label()
                ),
                theme::status_error(),
            )
        } else {
            Span::styled("below threshold", theme::status_ok())
        };

        let lines = vec![
            Line::from(vec![label("  Key          "), value(row.key.to_string())]),
            Line::from(vec![label("  Type         "), value(row.device_type.clone())]),
            Line::from(vec![
                label("  Manufacturer "),
                value(row.manufacturer.clone()),
            ]),
            Line::from(vec![
                label("  Last RSSI    "),
                signal_bars::signal_span(row.rssi),
                Span::raw(" "),
                value(format!("{} dBm", signal_bars::dbm_label(row.rssi))),
            ]),
            Line::from(vec![
                label("  Position     "),
                value(format!("{:.6}, {:.6}", row.lat, row.lon)),
            ]),
            Line::from(vec![
                label("  Drift        "),
                value(format!(
                    "{:.4} {}",
                    row.distance,
                    self.settings.unit.label()
                )),
            ]),
            Line::default(),
            Line::from(vec![Span::raw("  "), verdict]),
        ];

        frame.render_widget(Paragraph::new(lines), inner);
    }
}
