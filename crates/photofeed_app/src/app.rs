use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use feed_logging::{feed_debug, feed_info, feed_warn};
use photofeed_core::{update, FeedState, Msg};

use crate::commands::{self, Command, HELP};
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::render;

/// Everything the dispatch loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    Feed(Msg),
    Command(Command),
    InputClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Read commands from stdin until `quit` or end of input.
    Interactive,
    /// Load up to this many pages, print the feed once and exit.
    Batch { pages: usize },
}

pub fn run(config: &AppConfig, initial: Msg, mode: RunMode) -> anyhow::Result<()> {
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let settings = config.fetch_settings()?;
    let runner = EffectRunner::new(settings, event_tx.clone()).context("starting fetch engine")?;

    if mode == RunMode::Interactive {
        spawn_stdin_reader(event_tx);
    } else {
        drop(event_tx);
    }

    let stdout = io::stdout();
    let session = Session::new(
        FeedState::with_config(config.feed_config()),
        runner,
        stdout.lock(),
        mode,
    );
    session.run(initial, &event_rx)?;

    feed_info!("photofeed exiting");
    Ok(())
}

fn spawn_stdin_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(AppEvent::Command(commands::parse(&line))).is_err() {
                return;
            }
        }
        let _ = tx.send(AppEvent::InputClosed);
    });
}

struct Session<W: Write> {
    state: FeedState,
    runner: EffectRunner,
    out: W,
    mode: RunMode,
}

impl<W: Write> Session<W> {
    fn new(state: FeedState, runner: EffectRunner, out: W, mode: RunMode) -> Self {
        Self {
            state,
            runner,
            out,
            mode,
        }
    }

    /// Dispatches `initial`, then reacts to events until quit, end of input
    /// or, in batch mode, until the feed has been printed.
    fn run(mut self, initial: Msg, events: &mpsc::Receiver<AppEvent>) -> anyhow::Result<()> {
        self.dispatch(initial)?;
        if self.batch_finished() {
            return self.finish_batch();
        }

        while let Ok(event) = events.recv() {
            match event {
                AppEvent::Feed(msg) => self.dispatch(msg)?,
                AppEvent::Command(Command::Feed(msg)) => self.dispatch(msg)?,
                AppEvent::Command(Command::Help) => writeln!(self.out, "{HELP}")?,
                AppEvent::Command(Command::Unknown(line)) => {
                    writeln!(self.out, "unknown command {line:?}; type `help`")?
                }
                AppEvent::Command(Command::Quit) | AppEvent::InputClosed => break,
            }
            if self.batch_finished() {
                return self.finish_batch();
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        let full_frame = !matches!(msg, Msg::NextPageRequested | Msg::Scrolled(_));
        feed_debug!("dispatch {:?}", msg);

        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);

        if self.mode == RunMode::Interactive && was_dirty {
            let view = self.state.view();
            if full_frame {
                write!(self.out, "{}", render::render_frame(&view))?;
            } else {
                writeln!(self.out, "{}", render::render_status(&view))?;
            }
            self.out.flush()?;
        }

        if let RunMode::Batch { pages } = self.mode {
            if !self.state.is_network_active()
                && self.state.has_more()
                && self.state.last_failure().is_none()
                && self.state.pages_loaded() < pages
            {
                // Stands in for the scroll listener.
                return self.dispatch(Msg::NextPageRequested);
            }
        }
        Ok(())
    }

    /// Batch mode stops once nothing is loading and no further page will be requested.
    fn batch_finished(&self) -> bool {
        matches!(self.mode, RunMode::Batch { .. }) && !self.state.is_network_active()
    }

    fn finish_batch(mut self) -> anyhow::Result<()> {
        let view = self.state.view();
        if let Some(reason) = &view.last_failure {
            feed_warn!("batch stopped after a failed fetch: {}", reason);
        }
        write!(self.out, "{}", render::render_frame(&view))?;
        self.out.flush()?;
        Ok(())
    }
}
