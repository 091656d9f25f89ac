//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! The reducer stays pure and returns effects; this module performs them.
//! Backend round trips are spawned on tokio and report back through an
//! inbox channel that the loop drains every frame, so a slow reply never
//! blocks typing or scrolling.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use parley_core::chat::{ChatEvent, ChatState, effects};
use parley_core::gateway::BackendGateway;
use tokio::sync::mpsc;
use tracing::debug;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{TuiOptions, TuiState};
use crate::terminal::{self, Term};
use crate::{render, update};

/// Frame cadence while something is animating or in flight.
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll cadence when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

type InboxSender = mpsc::UnboundedSender<UiEvent>;
type InboxReceiver = mpsc::UnboundedReceiver<UiEvent>;

pub struct TuiRuntime {
    terminal: Term,
    pub state: TuiState,
    gateway: Arc<dyn BackendGateway>,
    inbox_tx: InboxSender,
    inbox_rx: InboxReceiver,
    last_tick: Instant,
    last_terminal_event: Instant,
}

impl TuiRuntime {
    /// Installs the panic hook and switches to the alternate screen.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot enter raw mode or the
    /// alternate screen.
    pub fn new(
        chat: ChatState,
        gateway: Arc<dyn BackendGateway>,
        options: TuiOptions,
    ) -> Result<Self> {
        // Panic hook goes in before the alternate screen.
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let now = Instant::now();
        Ok(Self {
            terminal,
            state: TuiState::new(chat, options),
            gateway,
            inbox_tx,
            inbox_rx,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Activates the session and runs until the user quits.
    ///
    /// # Errors
    /// Returns an error if drawing or reading terminal input fails.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;

        self.dispatch_event(UiEvent::Chat(ChatEvent::Activate));
        let result = self.event_loop();

        if let Err(err) = terminal::disable_input_features() {
            debug!(error = %err, "could not disable input features");
        }
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let mut events = self.collect_events()?;

            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                if !matches!(&event, UiEvent::Frame { .. }) {
                    dirty = true;
                }
                self.dispatch_event(event);
            }

            if dirty {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                dirty = false;
            }
        }

        Ok(())
    }

    /// Collects terminal input, inbox completions, and the tick.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let tick_interval = if self.state.is_busy() || recent_terminal_activity {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Don't delay already-collected events; otherwise sleep until the tick.
        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            let now = Instant::now();
            events.push(UiEvent::Tick(now));
            self.last_tick = now;
        }

        Ok(events)
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns `f` and posts its resulting event to the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            if tx.send(f().await).is_err() {
                debug!("inbox closed, dropping completion");
            }
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::Chat(effect) => {
                debug!(?effect, "spawning backend request");
                let gateway = Arc::clone(&self.gateway);
                self.spawn_effect(move || async move {
                    UiEvent::Chat(effects::execute(gateway.as_ref(), effect).await)
                });
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
