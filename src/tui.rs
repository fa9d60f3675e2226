//! Terminal ownership and the input pump.
//!
//! [`Tui`] enables raw mode, the alternate screen and mouse capture on
//! [`Tui::enter`], and restores all three on [`Tui::exit`] or drop. While
//! entered, a background task merges crossterm input with tick and frame
//! timers into a single [`Event`] channel.

use std::io::Stdout;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, EventStream, KeyCode,
    KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, terminal};
use futures::{FutureExt, StreamExt};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Time the pump gets to notice cancellation before it is aborted.
const ABORT_AFTER: Duration = Duration::from_millis(500);
/// Time after which shutdown gives up on the pump entirely.
const GIVE_UP_AFTER: Duration = Duration::from_secs(2);

pub type Backend = CrosstermBackend<Stdout>;

#[derive(Clone, Debug)]
pub enum Event {
    Init,
    Quit,
    Error(String),
    Tick,
    Render,
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

/// Tick and frame periods for the input pump.
#[derive(Debug, Clone, Copy)]
pub struct Rates {
    pub tick: Duration,
    pub frame: Duration,
}

impl Rates {
    /// Build from ticks per second and frames per second.
    pub fn per_second(ticks: f64, frames: f64) -> Self {
        Self {
            tick: Duration::from_secs_f64(1.0 / ticks),
            frame: Duration::from_secs_f64(1.0 / frames),
        }
    }
}

pub struct Tui {
    terminal: Terminal<Backend>,
    rates: Rates,
    pump: Option<JoinHandle<()>>,
    cancel: CancellationToken,
    event_tx: UnboundedSender<Event>,
    event_rx: UnboundedReceiver<Event>,
}

impl Tui {
    pub fn new(rates: Rates) -> color_eyre::Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Ok(Self {
            terminal: Terminal::new(Backend::new(std::io::stdout()))?,
            rates,
            pump: None,
            cancel: CancellationToken::new(),
            event_tx,
            event_rx,
        })
    }

    /// Take over the terminal and start pumping events.
    pub fn enter(&mut self) -> color_eyre::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            std::io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        self.cancel = CancellationToken::new();
        self.pump = Some(tokio::spawn(pump(
            self.event_tx.clone(),
            self.cancel.clone(),
            self.rates,
        )));
        debug!("Entered terminal");
        Ok(())
    }

    /// Stop the pump and hand the terminal back. Safe to call twice.
    pub fn exit(&mut self) -> color_eyre::Result<()> {
        self.stop_pump()?;
        if !terminal::is_raw_mode_enabled()? {
            return Ok(());
        }
        self.flush()?;
        execute!(
            std::io::stdout(),
            DisableMouseCapture,
            LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;
        debug!("Restored terminal");
        Ok(())
    }

    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    fn stop_pump(&mut self) -> color_eyre::Result<()> {
        self.cancel.cancel();
        let Some(task) = self.pump.take() else {
            return Ok(());
        };

        let started = Instant::now();
        while !task.is_finished() {
            let elapsed = started.elapsed();
            if elapsed >= GIVE_UP_AFTER {
                return Err(color_eyre::eyre::eyre!("Input pump did not stop"));
            }
            if elapsed >= ABORT_AFTER {
                task.abort();
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        Ok(())
    }
}

/// Map a raw terminal event. Only key presses pass; Ctrl+C becomes a quit.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
            let interrupt =
                key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
            Some(if interrupt { Event::Quit } else { Event::Key(key) })
        }
        CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    }
}

#[cfg(unix)]
fn forward_sigterm(event_tx: UnboundedSender<Event>) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                let _ = event_tx.send(Event::Quit);
            }
            Err(e) => warn!("Failed to install SIGTERM handler: {e}"),
        }
    });
}

async fn pump(event_tx: UnboundedSender<Event>, cancel: CancellationToken, rates: Rates) {
    let mut input = EventStream::new();
    let mut ticks = interval(rates.tick);
    let mut frames = interval(rates.frame);

    #[cfg(unix)]
    forward_sigterm(event_tx.clone());

    if event_tx.send(Event::Init).is_err() {
        return;
    }

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticks.tick() => Event::Tick,
            _ = frames.tick() => Event::Render,
            next = input.next().fuse() => match next {
                Some(Ok(raw)) => match translate(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(e)) => Event::Error(e.to_string()),
                None => break,
            },
        };
        if event_tx.send(event).is_err() {
            break;
        }
    }
}

impl Deref for Tui {
    type Target = Terminal<Backend>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            error!("Failed to restore terminal: {e}");
        }
    }
}
