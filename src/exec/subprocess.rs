//! Subprocess execution with streamed output and timeout support
//!
//! stdout and stderr are read line by line by two tasks feeding one
//! channel. The caller's task drains that channel into the job
//! transcript while it waits for the child, so lines from one stream
//! keep their order while the interleaving of the two streams is
//! whatever the reader tasks observed.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::error::{hints, ConvertError};
use crate::progress::Transcript;

/// Prefix for stderr lines in the transcript
pub const STDERR_PREFIX: &str = "ERROR: ";

/// Result of a subprocess execution
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,

    /// Process exit code
    pub exit_code: i32,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// Execution duration
    pub duration: Duration,
}

impl CommandResult {
    /// Create a CommandResult from an exit status
    pub fn from_status(
        status: ExitStatus,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        let exit_code = status.code().unwrap_or(-1);
        Self {
            success: status.success(),
            exit_code,
            stdout,
            stderr,
            duration,
        }
    }
}

/// An external tool invocation
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    /// Indexes into `args` that must not be logged
    secret_args: Vec<usize>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            secret_args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    /// Add an argument that is redacted in logs (passwords)
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secret_args.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    /// File name of the program, for messages
    pub fn tool_name(&self) -> String {
        self.program
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Command line with secret arguments masked
    pub fn display_redacted(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        for (idx, arg) in self.args.iter().enumerate() {
            if self.secret_args.contains(&idx) {
                parts.push("******".to_string());
            } else if arg.contains(' ') {
                parts.push(format!("\"{}\"", arg));
            } else {
                parts.push(arg.clone());
            }
        }
        parts.join(" ")
    }
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Run a command to completion, streaming its output into `transcript`
///
/// A non-zero exit is returned as data. `Err` means the tool could not be
/// run at all, or was killed after `timeout`.
pub async fn run_streaming(
    command: &ToolCommand,
    transcript: &Transcript,
    timeout: Duration,
) -> Result<CommandResult, ConvertError> {
    let start = Instant::now();
    log::debug!("Executing: {}", command.display_redacted());

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| spawn_error(command, e))?;

    let (tx, mut rx) = mpsc::unbounded_channel::<(Stream, String)>();
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(pump_lines(stdout, Stream::Stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(pump_lines(stderr, Stream::Stderr, tx.clone()));
    }
    drop(tx);

    let mut stdout = String::new();
    let mut stderr = String::new();

    let drain = async {
        while let Some((stream, line)) = rx.recv().await {
            match stream {
                Stream::Stdout => {
                    stdout.push_str(&line);
                    stdout.push('\n');
                    transcript.report(line);
                }
                Stream::Stderr => {
                    stderr.push_str(&line);
                    stderr.push('\n');
                    transcript.report(format!("{}{}", STDERR_PREFIX, line));
                }
            }
        }
    };

    let outcome = tokio::time::timeout(timeout, async {
        let ((), status) = tokio::join!(drain, child.wait());
        status
    })
    .await;

    let status = match outcome {
        Ok(status) => status.map_err(|e| {
            ConvertError::io(format!("Failed to wait for {}", command.tool_name()), e)
        })?,
        Err(_) => {
            let _ = child.start_kill();
            log::warn!(
                "{} did not finish within {}s, killed",
                command.tool_name(),
                timeout.as_secs()
            );
            return Err(ConvertError::TimedOut {
                tool: command.tool_name(),
                timeout,
            });
        }
    };

    let result = CommandResult::from_status(status, stdout, stderr, start.elapsed());
    log::debug!(
        "{} exited with {} after {:.2}s",
        command.tool_name(),
        result.exit_code,
        result.duration.as_secs_f64()
    );
    Ok(result)
}

async fn pump_lines<R>(reader: R, stream: Stream, tx: mpsc::UnboundedSender<(Stream, String)>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\r', '\n']);
                if line.is_empty() {
                    continue;
                }
                if tx.send((stream, line.to_string())).is_err() {
                    break;
                }
            }
        }
    }
}

fn spawn_error(command: &ToolCommand, err: std::io::Error) -> ConvertError {
    if err.kind() == std::io::ErrorKind::NotFound {
        let tool = command.tool_name();
        let hint = if tool == "unzip" {
            hints::unzip()
        } else {
            hints::jdk()
        };
        ConvertError::missing_tool(
            command.program.display().to_string(),
            format!("running {}", tool),
            hint,
        )
    } else {
        ConvertError::io(
            format!("Failed to execute {}", command.program.display()),
            err,
        )
    }
}
