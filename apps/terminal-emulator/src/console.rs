//! Operator console: one control command per input line.

use terminal_core::control::{ControlCommand, ControlReport};
use terminal_core::rpc::RpcAdapter;

use std::io::{BufRead, stdin};
use std::sync::Arc;
use std::thread;

use log::{Level, error, info, log};
use tokio::sync::mpsc;

/// Runs one line. Blank lines yield nothing.
pub fn execute(line: &str, adapter: &RpcAdapter) -> Option<ControlReport> {
    if line.trim().is_empty() {
        return None;
    }

    Some(match line.parse::<ControlCommand>() {
        Ok(command) => command.apply(adapter),
        Err(e) => ControlReport {
            level: Level::Warn,
            message: e.to_string(),
        },
    })
}

/// Reads stdin on a plain thread and forwards each line.
///
/// Stdin reads block, so they stay off the runtime; the thread ends with the
/// process or when the receiver is dropped.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    let spawned = thread::Builder::new()
        .name(String::from("console-stdin"))
        .spawn(move || {
            for line in stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Failed to read console input: {e}");
                        break;
                    }
                }
            }
        });

    if let Err(e) = spawned {
        error!("Failed to start console reader: {e}");
    }

    rx
}

/// Applies every received line until the sender side closes.
pub async fn run(mut lines: mpsc::UnboundedReceiver<String>, adapter: Arc<RpcAdapter>) {
    while let Some(line) = lines.recv().await {
        if let Some(report) = execute(&line, &adapter) {
            log!(report.level, "{report}");
        }
    }
    info!("Console input closed");
}
