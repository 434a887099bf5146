//! Operator console on stdin: one command per line.
//!
//! The watcher thread only parses lines and forwards them; commands are
//! acted on by the host loop, on the host thread.

use bridge_core::config::BridgeConfig;
use bridge_core::ipc::Supervisor;

use std::io::BufRead;
use std::str::FromStr;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use log::{debug, error, info, warn};

pub const HELP: &str = "commands: start, stop, status, help, quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        match line.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("Unknown command: {other}")),
        }
    }
}

/// Reads `input` line by line, sending each command to `commands`.
///
/// End of input counts as [`Command::Quit`]. Returns once quit was sent or
/// the receiving side is gone.
pub fn watch<R: BufRead>(input: R, commands: &Sender<Command>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read console input: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => {
                debug!("Console command: {:?}", command);
                if commands.send(command).is_err() || command == Command::Quit {
                    return;
                }
            }
            Err(e) => warn!("{e} ({HELP})"),
        }
    }

    debug!("Console input closed");
    let _ = commands.send(Command::Quit);
}

/// Runs [`watch`] over stdin on a background thread.
///
/// # Errors
///
/// Returns the spawn error if the thread cannot be created.
pub fn spawn_stdin_watcher(commands: Sender<Command>) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(String::from("bridge-console"))
        .spawn(move || watch(std::io::stdin().lock(), &commands))
}

/// Acts on one command against `supervisor`. Returns `false` once the host
/// should exit.
pub fn apply<H: 'static>(
    command: Command,
    supervisor: &Supervisor<H>,
    config: &BridgeConfig,
) -> bool {
    match command {
        Command::Start => match supervisor.start(config) {
            Ok(address) => info!("Server started on {}", address),
            Err(e) => error!("Failed to start server: {}", e),
        },
        Command::Stop => supervisor.stop(),
        Command::Status => match serde_json::to_string(&supervisor.server_info()) {
            Ok(status) => info!("Server status: {}", status),
            Err(e) => warn!("Failed to serialize server status: {}", e),
        },
        Command::Help => info!("{HELP}"),
        Command::Quit => return false,
    }
    true
}
