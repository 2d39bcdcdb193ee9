//! Terminal front-end
//!
//! Reads line commands from stdin and prints one response per command.
//! End of input behaves like `quit`.
//! This is the presentation layer: it only invokes controller commands and
//! reads snapshots.

pub mod commands;
pub mod handlers;
pub mod responses;

use std::{future::Future, sync::Arc};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::{state::TimerController, utils::shutdown_signal};
use commands::Command;
use handlers::handle_command;
use responses::CommandResponse;

/// What to do after a line was processed
#[derive(Debug)]
pub enum Outcome {
    Respond(CommandResponse),
    Quit(CommandResponse),
    Ignore,
}

/// Parse and apply one input line
pub fn process_line(controller: &TimerController, line: &str) -> Outcome {
    if line.trim().is_empty() {
        return Outcome::Ignore;
    }

    let command = match line.parse::<Command>() {
        Ok(command) => command,
        Err(e) => {
            debug!("{}", e);
            return Outcome::Respond(CommandResponse::error(
                format!("{} (try 'help')", e),
                &controller.snapshot(),
            ));
        }
    };

    let quit = command == Command::Quit;
    match handle_command(controller, command) {
        Ok(response) if quit => Outcome::Quit(response),
        Ok(response) => Outcome::Respond(response),
        Err(e) => Outcome::Respond(CommandResponse::error(e.to_string(), &controller.snapshot())),
    }
}

fn print_response(response: &CommandResponse, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(response)?);
    } else {
        println!("{}", response.render_text());
    }
    Ok(())
}

/// Serve commands from stdin until `quit`, end of input or a shutdown signal
pub async fn run_console(controller: Arc<TimerController>, json: bool) -> anyhow::Result<()> {
    serve_lines(controller, BufReader::new(tokio::io::stdin()), shutdown_signal(), json).await
}

/// Serve commands from `reader` until `quit`, end of input or `shutdown`
pub async fn serve_lines<R, S>(
    controller: Arc<TimerController>,
    reader: R,
    shutdown: S,
    json: bool,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    let mut lines = reader.lines();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => match process_line(&controller, &line) {
                        Outcome::Respond(response) => print_response(&response, json)?,
                        Outcome::Quit(response) => {
                            print_response(&response, json)?;
                            info!("Quit requested");
                            break;
                        }
                        Outcome::Ignore => {}
                    },
                    Ok(None) => {
                        info!("End of input, shutting down");
                        break;
                    }
                    Err(e) => {
                        warn!("Failed to read input: {}", e);
                        break;
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}
