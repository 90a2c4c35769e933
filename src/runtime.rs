use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};

/// Everything the app reacts to
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// No input arrived within one tick interval.
    Tick,
    /// The input stream is gone; nothing more will arrive.
    Closed,
}

/// Terminal events the app cares about; mouse, focus and paste are dropped.
pub fn translate(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) => Some(AppEvent::Key(key)),
        Event::Resize(_, _) => Some(AppEvent::Resize),
        _ => None,
    }
}

/// Where input comes from
pub trait EventSource {
    fn next_event(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Channel-backed source. The terminal variant is fed by a reader thread, tests
/// feed it directly.
pub struct ChannelEventSource {
    rx: Receiver<AppEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }

    /// Reads crossterm events on a helper thread until the terminal goes away
    /// or the source is dropped.
    pub fn terminal() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                Ok(ev) => ev,
                Err(err) => {
                    tracing::error!(%err, "terminal event stream closed");
                    break;
                }
            };
            if let Some(ev) = translate(ev) {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Self::new(rx)
    }
}

impl EventSource for ChannelEventSource {
    fn next_event(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// How often a running session gets its clock refreshed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickRate(Duration);

impl TickRate {
    pub const DEFAULT_MS: u64 = 250;

    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    pub fn interval(self) -> Duration {
        self.0
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self::from_millis(Self::DEFAULT_MS)
    }
}

/// Pulls one event at a time, turning idle intervals into [`AppEvent::Tick`].
pub struct Runner<E: EventSource> {
    source: E,
    tick_rate: TickRate,
}

impl<E: EventSource> Runner<E> {
    pub fn new(source: E) -> Self {
        Self {
            source,
            tick_rate: TickRate::default(),
        }
    }

    pub fn with_tick_rate(mut self, tick_rate: TickRate) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn tick_rate(&self) -> TickRate {
        self.tick_rate
    }

    pub fn step(&self) -> AppEvent {
        match self.source.next_event(self.tick_rate.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => AppEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!("event source disconnected");
                AppEvent::Closed
            }
        }
    }
}
