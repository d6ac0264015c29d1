mod cli;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use hearthcoach::prelude::*;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::broadcast;

use crate::cli::{Cli, Commands, DEFAULT_TRIGGER};

/// How often to look for new lines once the followed file is at its end.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Log text marking the start of a new game.
const NEW_GAME_MARKER: &str = "CREATE_GAME";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CompanionConfig::load_or_default(&cli.config)?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    hearthcoach::logging::init(&config.log_filter);

    let companion = Companion::new(config)?;

    match cli.command.unwrap_or(Commands::Stream {
        file: None,
        trigger: DEFAULT_TRIGGER.to_owned(),
    }) {
        Commands::Health => {
            let result = companion.check_health().await;
            println!("{}", companion.client().health().label());
            result?;
        }
        Commands::SuggestOnce { state } => {
            let state = read_game_state(&state)?;
            let suggestion = companion
                .get_suggestion(&state)
                .await
                .context("requesting suggestion")?;
            println!("{suggestion}");
        }
        Commands::Stream { file, trigger } => {
            stream(&companion, file.as_deref(), &trigger).await?;
            companion.shutdown().await?;
        }
    }

    Ok(())
}

fn read_game_state(path: &Path) -> Result<GameState> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading game state '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("parsing game state '{}'", path.display()))
}

async fn stream(companion: &Companion, file: Option<&Path>, trigger: &str) -> Result<()> {
    let printer = tokio::spawn(print_events(
        companion.subscribe(),
        companion.session().clone(),
    ));
    companion.start().await?;

    let session = companion.session();
    let result = tokio::select! {
        r = async {
            match file {
                Some(path) => {
                    let file = tokio::fs::File::open(path)
                        .await
                        .with_context(|| format!("opening log '{}'", path.display()))?;
                    forward_lines(session, file, trigger, true).await
                }
                None => forward_lines(session, tokio::io::stdin(), trigger, false).await,
            }
        } => r,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
            Ok(())
        }
    };

    printer.abort();
    result
}

/// Sends each log line to the server. With `follow`, waits for more lines
/// at end of input instead of stopping.
async fn forward_lines(
    session: &SessionHandle,
    input: impl AsyncRead + Unpin,
    trigger: &str,
    follow: bool,
) -> Result<()> {
    let mut lines = BufReader::new(input).lines();
    loop {
        let Some(line) = lines.next_line().await.context("reading log")? else {
            if !follow {
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
            continue;
        };

        if line.contains(NEW_GAME_MARKER) {
            session.reset_game_state().await?;
        }
        let wants_suggestion = line.contains(trigger);
        session.send_log_line(line).await?;
        if wants_suggestion {
            session.request_suggestion().await?;
        }
    }
}

async fn print_events(mut events: broadcast::Receiver<SessionEvent>, session: SessionHandle) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::Suggestion(s)) => println!("suggestion: {s}"),
            Ok(SessionEvent::ConnectionChanged { .. }) => {
                eprintln!("[{}]", session.status().label());
            }
            Ok(SessionEvent::ServerStatus { connected }) => {
                eprintln!("[server {}]", if connected { "ready" } else { "not ready" });
            }
            Ok(SessionEvent::ReconnectScheduled { attempt, delay }) => {
                eprintln!("[retry {attempt} in {}s]", delay.as_secs());
            }
            Ok(SessionEvent::ReconnectExhausted { attempts }) => {
                eprintln!("[gave up after {attempts} retries]");
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::debug!(skipped = n, "event printer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}
