//! A terminal client for the campus portal: log in, register, and look at
//! academic records.

/// The "functional core" to the main module's "imperative shell"
mod app;

/// Configuration and argument parsing
mod config;

/// A macro for tab-through form fields
mod form_fields;

use app::{App, EffectContext};
use clap::Parser;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use std::{fs, io, process::ExitCode, sync::Arc};
use tokio::{
    sync::mpsc::{unbounded_channel, UnboundedSender},
    task::JoinHandle,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> io::Result<ExitCode> {
    let config = config::Config::parse();

    // The terminal belongs to the UI, so logs go to a file next to the
    // session instead.
    let data_dir = config.data_dir();
    fs::create_dir_all(&data_dir)?;
    let (log_writer, _log_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&data_dir, "campus.log"));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_writer)
                .with_ansi(false),
        )
        .init();

    tracing::info!(server = %config.server, ?data_dir, "starting");

    let context = EffectContext::new(&config)
        .await
        .map_err(io::Error::other)?;

    let mut terminal = ratatui::init();
    terminal.clear()?;
    let res = run(terminal, Arc::new(context)).await;
    ratatui::restore();
    res
}

/// Manage the lifecycle of the app
async fn run(mut terminal: DefaultTerminal, context: Arc<EffectContext>) -> io::Result<ExitCode> {
    let mut app = App::new();

    // Effects run on their own tasks and report back over this channel. The
    // handles are kept so quitting can wait for them.
    let (effect_tx, mut effect_rx) = unbounded_channel();
    let mut outstanding_effects: Vec<JoinHandle<()>> = Vec::with_capacity(1);

    terminal.draw(|frame| app.render(frame))?;

    let mut event_stream = EventStream::new();

    loop {
        // Key presses and finished effects both become actions. Resizes and
        // other terminal events just fall through to a redraw.
        let next_action_opt = tokio::select! {
            event_opt = event_stream.next() => {
                match event_opt {
                    Some(Ok(Event::Key(key_event))) => {
                        Some(app::Action::Key(key_event))
                    }
                    Some(Err(err)) => {
                        Some(app::Action::Problem(err.to_string()))
                    }
                    _ => None,
                }
            },

            effect_opt = effect_rx.recv() => {
                effect_opt
            }
        };

        // Nothing is cancelled or de-duplicated here. Two quick logins are two
        // requests in flight, and the login handler picks the winner.
        if let Some(action) = next_action_opt {
            for effect in app.handle(action) {
                outstanding_effects.push(spawn_effect_task(
                    effect_tx.clone(),
                    Arc::clone(&context),
                    effect,
                ));
            }
        }

        terminal.draw(|frame| app.render(frame))?;

        // Pruned every pass, so the list stays short.
        outstanding_effects.retain(|handle| !handle.is_finished());

        // A login still in flight may have a role to store. Every request
        // carries the configured timeout, so this wait is bounded.
        if let Some(code) = app.should_exit() {
            for effect in outstanding_effects.drain(..) {
                if let Err(err) = effect.await {
                    tracing::error!(?err, "effect task failed during shutdown");
                }
            }

            tracing::info!("exiting");
            return Ok(code);
        }
    }
}

/// Spawn a task to run an effect and send the next action to the app.
fn spawn_effect_task(
    effect_tx: UnboundedSender<app::Action>,
    context: Arc<EffectContext>,
    effect: app::Effect,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Some(next_action) = effect.run(&context).await {
            // A closed channel means we're shutting down and nobody is left
            // to render the result.
            if effect_tx.send(next_action).is_err() {
                tracing::debug!("dropping action after shutdown");
            }
        }
    })
}
