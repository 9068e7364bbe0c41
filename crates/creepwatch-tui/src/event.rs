//! Terminal input pump.
//!
//! A background task owns the crossterm [`EventStream`] and multiplexes
//! raw terminal input with the app's tick and render cadence onto one
//! channel, so the main loop has exactly one thing to await.

use std::time::Duration;

use crossterm::event::{Event as TermEvent, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// One unit of work for the main loop.
#[derive(Debug)]
pub enum UiEvent {
    Key(KeyEvent),
    /// Row clicks ride on this.
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// Status refresh cadence.
    Tick,
    /// Frame cadence.
    Render,
}

/// Map a raw crossterm event, dropping the ones the app ignores (key
/// releases and repeats, focus changes, paste).
fn translate(raw: TermEvent) -> Option<UiEvent> {
    match raw {
        TermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(UiEvent::Key(key)),
        TermEvent::Mouse(mouse) => Some(UiEvent::Mouse(mouse)),
        TermEvent::Resize(cols, rows) => Some(UiEvent::Resize(cols, rows)),
        _ => None,
    }
}

/// Handle to the input task; yields its events to the main loop.
pub struct EventPump {
    events: mpsc::UnboundedReceiver<UiEvent>,
    shutdown: CancellationToken,
    _task: JoinHandle<()>,
}

impl EventPump {
    /// Spawn the pump. `tick_every` paces [`UiEvent::Tick`], `render_every`
    /// paces [`UiEvent::Render`].
    pub fn start(tick_every: Duration, render_every: Duration) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(pump(tx, shutdown.clone(), tick_every, render_every));
        Self {
            events,
            shutdown,
            _task: task,
        }
    }

    /// Next event, or `None` once the pump has shut down.
    pub async fn next(&mut self) -> Option<UiEvent> {
        self.events.recv().await
    }

    pub fn stop(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for EventPump {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn pump(
    tx: mpsc::UnboundedSender<UiEvent>,
    shutdown: CancellationToken,
    tick_every: Duration,
    render_every: Duration,
) {
    let mut input = EventStream::new();
    let mut ticks = interval(tick_every);
    let mut frames = interval(render_every);
    // Skip, don't burst, when the loop falls behind.
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let event = tokio::select! {
            () = shutdown.cancelled() => return,
            _ = ticks.tick() => UiEvent::Tick,
            _ = frames.tick() => UiEvent::Render,
            Some(Ok(raw)) = input.next() => {
                let Some(ev) = translate(raw) else { continue };
                ev
            }
        };
        // Receiver gone means the main loop already exited.
        if tx.send(event).is_err() {
            return;
        }
    }
}
