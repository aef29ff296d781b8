//! Line-oriented control surface on stdin.

use onair_monitor::{SchedulerError, SchedulerHandle};
use std::fmt;
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

pub const HELP: &str = "commands: start | stop | check | exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Resume periodic checks.
    Start,
    /// Pause periodic checks.
    Stop,
    /// Run one check immediately.
    Check,
    Exit,
}

impl ControlCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, UnknownCommand> {
        let word = line.trim();
        if word.is_empty() {
            return Ok(None);
        }
        let command = match word.to_ascii_lowercase().as_str() {
            "start" | "resume" => Self::Start,
            "stop" | "pause" => Self::Stop,
            "check" | "refresh" | "now" => Self::Check,
            "exit" | "quit" => Self::Exit,
            _ => return Err(UnknownCommand(word.to_string())),
        };
        Ok(Some(command))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command '{}'", self.0)
    }
}

impl std::error::Error for UnknownCommand {}

/// Forward stdin commands to the scheduler until exit is requested.
///
/// Ctrl-C, SIGTERM and SIGHUP request exit. Returns once the scheduler has
/// acknowledged shutdown.
pub async fn run(handle: SchedulerHandle) -> Result<(), SchedulerError> {
    run_with(handle, BufReader::new(tokio::io::stdin()), shutdown_signal()).await
}

/// Forward commands read from `input` until an exit command arrives or
/// `exit` resolves.
///
/// Losing the input (EOF or a read error) only stops reading commands;
/// monitoring carries on until `exit`.
pub async fn run_with<R, F>(
    handle: SchedulerHandle,
    input: R,
    exit: F,
) -> Result<(), SchedulerError>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    let mut lines = input.lines();
    let mut input_open = true;
    tokio::pin!(exit);

    loop {
        let command = tokio::select! {
            _ = &mut exit => ControlCommand::Exit,
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) => match ControlCommand::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        tracing::warn!("{e}; {HELP}");
                        continue;
                    }
                },
                Ok(None) => {
                    tracing::info!("command input closed; monitoring continues until signalled");
                    input_open = false;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read commands; monitoring continues");
                    input_open = false;
                    continue;
                }
            },
        };

        match command {
            ControlCommand::Start => handle.start().await?,
            ControlCommand::Stop => handle.stop().await?,
            ControlCommand::Check => handle.trigger_now().await?,
            ControlCommand::Exit => {
                tracing::info!("shutting down");
                return handle.shutdown().await;
            }
        }
    }
}

/// Resolves on Ctrl-C, and on Unix also on SIGTERM or SIGHUP.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let handlers = (signal(SignalKind::terminate()), signal(SignalKind::hangup()));
        let (mut term, mut hup) = match handlers {
            (Ok(term), Ok(hup)) => (term, hup),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "failed to install signal handlers");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => tracing::debug!("interrupted"),
            _ = term.recv() => tracing::debug!("received SIGTERM"),
            _ = hup.recv() => tracing::debug!("received SIGHUP"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::debug!("interrupted");
    }
}
