//! Keeps the miner process alive.
//!
//! The supervisor launches the miner, streams its stdout line by line into
//! [`MinerState`], and relaunches it after every exit until shutdown is requested.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};

use super::config::SupervisorConfig;
use super::monitor::MinerHandle;
use super::parse::parse_hashrate;
use super::status::MinerState;
use crate::core::shutdown::ShutdownToken;
use crate::error::{GridError, Result};
use crate::observability;

/// Longest output line kept. The rest of an overlong line is dropped.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Destination for the miner's raw output.
pub type LogSink = Box<dyn Write + Send>;

pub struct Supervisor {
    executable: PathBuf,
    config: SupervisorConfig,
    state: Arc<MinerState>,
    sink: Mutex<LogSink>,
    launch_attempts: AtomicU64,
}

impl Supervisor {
    /// Resolve the miner executable and build a supervisor for it.
    ///
    /// A missing executable is fatal: nothing on a later iteration could make it appear,
    /// so the caller is expected to abort startup.
    pub fn new(config: SupervisorConfig) -> Result<Self> {
        let config = config.normalized();
        let executable =
            which::which(&config.program).map_err(|source| GridError::ExecutableNotFound {
                name: config.program.clone(),
                source,
            })?;
        Ok(Self::with_executable(executable, config))
    }

    /// Build a supervisor for an already resolved executable.
    pub fn with_executable(executable: impl Into<PathBuf>, config: SupervisorConfig) -> Self {
        Self {
            executable: executable.into(),
            config: config.normalized(),
            state: Arc::new(MinerState::new()),
            sink: Mutex::new(Box::new(std::io::stdout())),
            launch_attempts: AtomicU64::new(0),
        }
    }

    /// Forward miner output somewhere other than stdout.
    pub fn with_sink(self, sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
            ..self
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Read-only view of the run state for HTTP handlers and the notifier.
    pub fn handle(&self) -> MinerHandle {
        MinerHandle::new(Arc::clone(&self.state))
    }

    /// Number of launch attempts made so far, successful or not.
    pub fn launch_attempts(&self) -> u64 {
        self.launch_attempts.load(Ordering::Relaxed)
    }

    /// Run the launch/stream/restart loop until `shutdown` fires.
    pub async fn run(&self, shutdown: ShutdownToken) {
        log::info!(
            "miner supervisor: using {} {}",
            self.executable.display(),
            self.config.args.join(" ")
        );

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            self.launch_attempts.fetch_add(1, Ordering::Relaxed);
            match self.spawn() {
                Ok((child, stdout)) => {
                    self.state.record_start(Utc::now());
                    log::info!("miner start: pid {}", child.id().unwrap_or_default());

                    let outcome = self.supervise(child, stdout, &shutdown).await;

                    if shutdown.is_cancelled() {
                        self.state.record_exit(Utc::now(), None);
                        log::info!("miner stop: shutdown requested");
                        break;
                    }
                    match outcome {
                        Ok(()) => {
                            log::info!("miner wait: exited cleanly");
                            self.state.record_exit(Utc::now(), None);
                        }
                        Err(err) => {
                            log::warn!("miner wait: {}", err);
                            observability::capture_error(
                                &err,
                                &[("component", "xmrig"), ("operation", "wait")],
                            );
                            self.state.record_exit(Utc::now(), Some(err.to_string()));
                        }
                    }
                }
                Err(err) => {
                    log::warn!("miner start: {}", err);
                    let operation = match err {
                        GridError::Pipe(_) => "stdout_pipe",
                        _ => "start",
                    };
                    observability::capture_error(
                        &err,
                        &[("component", "xmrig"), ("operation", operation)],
                    );
                    self.state.record_exit(Utc::now(), Some(err.to_string()));
                }
            }

            log::debug!(
                "miner restart: waiting {:?} before relaunch",
                self.config.restart_delay
            );
            if !shutdown.sleep(self.config.restart_delay).await {
                break;
            }
        }

        log::info!("miner supervisor: stopped");
    }

    fn spawn(&self) -> Result<(Child, ChildStdout)> {
        let mut child = Command::new(&self.executable)
            .args(&self.config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| GridError::launch(&self.executable, source))?;

        // Dropping the child here kills it.
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GridError::pipe("stdout was not captured"))?;
        Ok((child, stdout))
    }

    /// Stream output until the pipe closes, then reap the child.
    async fn supervise(
        &self,
        mut child: Child,
        stdout: ChildStdout,
        shutdown: &ShutdownToken,
    ) -> Result<()> {
        let mut reader = BufReader::new(stdout);
        let mut line = Vec::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return terminate(&mut child).await,
                read = read_line_bounded(&mut reader, &mut line, MAX_LINE_BYTES) => match read {
                    Ok(true) => self.handle_line(&line),
                    Ok(false) => break,
                    Err(err) => {
                        log::warn!("miner log scan: {}", err);
                        observability::capture_error(
                            &err,
                            &[("component", "xmrig"), ("operation", "log_scan")],
                        );
                        break;
                    }
                },
            }
        }

        let waited = tokio::select! {
            _ = shutdown.cancelled() => None,
            status = child.wait() => Some(status),
        };
        let status = match waited {
            Some(status) => status?,
            None => return terminate(&mut child).await,
        };

        if status.success() {
            Ok(())
        } else {
            Err(GridError::exited(format!("miner exited: {}", status)))
        }
    }

    fn handle_line(&self, raw: &[u8]) {
        let text = String::from_utf8_lossy(raw);
        let line = text.strip_suffix('\r').unwrap_or(&text);

        if let Err(err) = writeln!(self.sink.lock(), "{}", line) {
            log::debug!("miner output sink: {}", err);
        }

        let hashrate = parse_hashrate(line);
        self.state.record_line(line, Utc::now(), hashrate);
    }
}

/// Read one `\n`-terminated line into `line`, keeping at most `limit` bytes of it.
///
/// Returns `false` once the stream is exhausted and nothing was read.
pub(crate) async fn read_line_bounded<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    line: &mut Vec<u8>,
    limit: usize,
) -> io::Result<bool> {
    line.clear();
    let mut read_any = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(read_any);
        }
        read_any = true;

        let (chunk, used, complete) = match available.iter().position(|&b| b == b'\n') {
            Some(end) => (&available[..end], end + 1, true),
            None => (available, available.len(), false),
        };
        let room = limit.saturating_sub(line.len());
        line.extend_from_slice(&chunk[..chunk.len().min(room)]);
        reader.consume(used);

        if complete {
            return Ok(true);
        }
    }
}

async fn terminate(child: &mut Child) -> Result<()> {
    if let Err(err) = child.start_kill() {
        log::debug!("miner kill: {}", err);
    }
    child.wait().await?;
    Ok(())
}
