//! Child-process ownership for the shell session.
//!
//! `SessionProcess` spawns the interpreter with piped stdio, writes to its
//! stdin, and drains stdout/stderr on background tasks into one event
//! channel. The channel is created once and survives restarts, so the app
//! loop can keep selecting on it while the child is replaced underneath.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::error::{Result, SessionError};

// Channel buffer sizes
const EVENT_CHANNEL_BUFFER: usize = 1024;
const READ_BUFFER: usize = 16384;

/// Ctrl+C as seen by a console program reading its stdin.
pub const INTERRUPT_BYTE: u8 = 0x03;

/// Default bound on launching the interpreter.
pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_millis(1000);

/// Lifecycle of the child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    /// Transient, only observable while `start()` is in flight.
    Starting,
    Running,
    /// A graceful termination was requested but the child has not exited yet.
    Terminating,
    Stopped,
}

/// Notifications produced by the output-draining tasks, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
    /// The child's stdout reached end of file.
    Exited { pid: Option<u32> },
}

/// What to spawn and how long to wait for it.
#[derive(Clone, Debug)]
pub struct ShellConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; inherits ours when `None`.
    pub cwd: Option<PathBuf>,
    pub start_timeout: Duration,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: default_shell(),
            args: Vec::new(),
            cwd: None,
            start_timeout: DEFAULT_START_TIMEOUT,
        }
    }
}

/// The platform's command interpreter.
pub fn default_shell() -> String {
    if cfg!(windows) {
        std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
    } else {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
}

/// Primitive operations on the session's child process.
///
/// These never escalate on their own; retry, escalation and restart are
/// policy of [`super::SessionManager`].
#[allow(async_fn_in_trait)]
pub trait ShellProcess {
    /// Launch the interpreter. No-op when already running.
    async fn start(&mut self) -> Result<()>;

    /// Write raw bytes to stdin and wait up to `wait` for the flush.
    async fn write(&mut self, bytes: &[u8], wait: Duration) -> Result<()>;

    /// Deliver [`INTERRUPT_BYTE`], waiting up to `wait` for the flush.
    async fn send_interrupt(&mut self, wait: Duration) -> Result<()>;

    /// Ask the child to exit and wait up to `wait` for it.
    /// Returns [`SessionError::ExitTimeout`] if it is still alive.
    async fn terminate(&mut self, wait: Duration) -> Result<()>;

    /// Force the child down and wait for the OS to confirm it.
    async fn kill(&mut self);

    /// Current lifecycle state. Never blocks.
    fn state(&mut self) -> SessionState;

    /// Next chunk of output or exit notification.
    async fn next_event(&mut self) -> Option<ProcessEvent>;
}

/// The real child process behind a session.
pub struct SessionProcess {
    config: ShellConfig,
    state: SessionState,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    event_tx: Sender<ProcessEvent>,
    event_rx: Receiver<ProcessEvent>,
}

impl SessionProcess {
    /// Creates a session process. Nothing is spawned until `start()`.
    pub fn new(config: ShellConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        Self {
            config,
            state: SessionState::NotStarted,
            child: None,
            stdin: None,
            event_tx,
            event_rx,
        }
    }

    /// OS process id of the live child, if any.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    fn start_failed(&mut self, source: io::Error) -> SessionError {
        self.state = SessionState::Stopped;
        SessionError::StartFailure {
            program: self.config.program.clone(),
            source,
        }
    }

    /// Forget the child after it is known to be gone.
    fn release(&mut self) {
        self.stdin = None;
        self.child = None;
        self.state = SessionState::Stopped;
    }
}

impl ShellProcess for SessionProcess {
    async fn start(&mut self) -> Result<()> {
        if self.state() == SessionState::Running {
            return Ok(());
        }
        if self.child.is_some() {
            // Left over from a terminate that timed out
            self.kill().await;
        }

        self.state = SessionState::Starting;

        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &self.config.cwd {
            command.current_dir(cwd);
        }

        // A child spawned after the deadline is dropped with the join
        // result, and kill_on_drop takes it down.
        let bound = self.config.start_timeout;
        let spawned = timeout(bound, tokio::task::spawn_blocking(move || command.spawn())).await;
        let mut child = match spawned {
            Ok(Ok(Ok(child))) => child,
            Ok(Ok(Err(e))) => return Err(self.start_failed(e)),
            Ok(Err(join_err)) => return Err(self.start_failed(io::Error::other(join_err))),
            Err(_) => {
                return Err(self.start_failed(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("not started within {bound:?}"),
                )));
            }
        };

        let pid = child.id();
        self.stdin = child.stdin.take();
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(stdout, ProcessEvent::Stdout, Some(pid), self.event_tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(stderr, ProcessEvent::Stderr, None, self.event_tx.clone());
        }

        self.child = Some(child);
        self.state = SessionState::Running;
        info!("Started {} (pid {:?})", self.config.program, pid);
        Ok(())
    }

    async fn write(&mut self, bytes: &[u8], wait: Duration) -> Result<()> {
        if self.state() != SessionState::Running {
            return Err(SessionError::NotRunning);
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SessionError::NotRunning);
        };

        let flushed = timeout(wait, async {
            stdin.write_all(bytes).await?;
            stdin.flush().await?;
            Ok::<(), io::Error>(())
        })
        .await;

        match flushed {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(SessionError::Write(e)),
            Err(_) => Err(SessionError::FlushTimeout(wait)),
        }
    }

    async fn send_interrupt(&mut self, wait: Duration) -> Result<()> {
        self.write(&[INTERRUPT_BYTE], wait).await
    }

    async fn terminate(&mut self, wait: Duration) -> Result<()> {
        let Some(child) = self.child.as_mut() else {
            if self.state != SessionState::NotStarted {
                self.state = SessionState::Stopped;
            }
            return Ok(());
        };

        self.state = SessionState::Terminating;
        if let Err(e) = request_graceful_exit(child) {
            warn!("Failed to request shell exit: {}", e);
        }

        match timeout(wait, child.wait()).await {
            Ok(Ok(status)) => {
                info!("Shell process terminated with {}", status);
                self.release();
                Ok(())
            }
            Ok(Err(e)) => {
                warn!("Failed to wait for shell process: {}", e);
                self.release();
                Ok(())
            }
            Err(_) => Err(SessionError::ExitTimeout(wait)),
        }
    }

    async fn kill(&mut self) {
        let Some(mut child) = self.child.take() else {
            if self.state != SessionState::NotStarted {
                self.state = SessionState::Stopped;
            }
            return;
        };

        if let Err(e) = child.start_kill() {
            debug!("Kill request for shell process failed: {}", e);
        }
        match child.wait().await {
            Ok(status) => info!("Shell process killed ({})", status),
            Err(e) => error!("Failed to reap killed shell process: {}", e),
        }
        self.release();
    }

    fn state(&mut self) -> SessionState {
        if let Some(child) = self.child.as_mut() {
            match child.try_wait() {
                Ok(Some(status)) => {
                    info!("Shell process exited with {}", status);
                    self.release();
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to poll shell process: {}", e),
            }
        }
        self.state
    }

    async fn next_event(&mut self) -> Option<ProcessEvent> {
        self.event_rx.recv().await
    }
}

#[cfg(unix)]
fn request_graceful_exit(child: &mut Child) -> io::Result<()> {
    let Some(pid) = child.id() else {
        return Ok(());
    };
    let pid = libc::pid_t::try_from(pid).map_err(io::Error::other)?;
    // SAFETY: `pid` is our own child and has not been reaped yet.
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn request_graceful_exit(child: &mut Child) -> io::Result<()> {
    child.start_kill()
}

/// Drain one output stream into the event channel until EOF.
///
/// Each successful read becomes one event; bytes are not coalesced or
/// split, so the decoder sees exactly what the OS delivered. When
/// `exit_pid` is set, EOF is reported as [`ProcessEvent::Exited`].
fn spawn_reader<R>(
    mut reader: R,
    wrap: fn(Vec<u8>) -> ProcessEvent,
    exit_pid: Option<Option<u32>>,
    event_tx: Sender<ProcessEvent>,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; READ_BUFFER];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => {
                    if let Some(pid) = exit_pid {
                        if event_tx.send(ProcessEvent::Exited { pid }).await.is_err() {
                            debug!("Event receiver dropped before exit notice");
                        }
                    }
                    break;
                }
                Ok(n) => {
                    if event_tx.send(wrap(buf[..n].to_vec())).await.is_err() {
                        // Receiver dropped, session is gone
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!("Shell output read error: {}", e);
                    break;
                }
            }
        }
    });
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> SessionProcess {
        SessionProcess::new(ShellConfig {
            program: "/bin/sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            ..ShellConfig::default()
        })
    }

    fn cat() -> SessionProcess {
        SessionProcess::new(ShellConfig {
            program: "cat".to_string(),
            ..ShellConfig::default()
        })
    }

    /// Collect bytes from one stream until `needle` shows up.
    async fn read_until(process: &mut SessionProcess, stderr: bool, needle: &str) -> String {
        let mut seen = Vec::new();
        let deadline = Duration::from_secs(5);
        timeout(deadline, async {
            while let Some(event) = process.next_event().await {
                match event {
                    ProcessEvent::Stdout(bytes) if !stderr => seen.extend(bytes),
                    ProcessEvent::Stderr(bytes) if stderr => seen.extend(bytes),
                    _ => {}
                }
                if String::from_utf8_lossy(&seen).contains(needle) {
                    break;
                }
            }
        })
        .await
        .expect("timed out waiting for output");
        String::from_utf8_lossy(&seen).into_owned()
    }

    #[tokio::test]
    async fn test_new_process_is_not_started() {
        let mut process = cat();
        assert_eq!(process.state(), SessionState::NotStarted);
        assert!(process.pid().is_none());
    }

    #[tokio::test]
    async fn test_write_before_start_is_not_running() {
        let mut process = cat();
        let err = process
            .write(b"dir\r\n", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NotRunning));
        assert_eq!(process.state(), SessionState::NotStarted);
    }

    #[tokio::test]
    async fn test_start_failure_leaves_stopped() {
        let mut process = SessionProcess::new(ShellConfig {
            program: "/definitely/not/a/shell".to_string(),
            ..ShellConfig::default()
        });
        let err = process.start().await.unwrap_err();
        assert!(matches!(err, SessionError::StartFailure { .. }));
        assert_eq!(process.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn test_start_is_noop_when_running() {
        let mut process = cat();
        process.start().await.unwrap();
        let pid = process.pid();
        process.start().await.unwrap();

        assert_eq!(process.state(), SessionState::Running);
        assert_eq!(process.pid(), pid);
        process.kill().await;
    }

    #[tokio::test]
    async fn test_written_bytes_reach_stdin_verbatim() {
        let mut process = cat();
        process.start().await.unwrap();
        process.write(b"dir\r\n", Duration::from_secs(1)).await.unwrap();

        let echoed = read_until(&mut process, false, "\n").await;
        assert_eq!(echoed, "dir\r\n");
        process.kill().await;
    }

    #[tokio::test]
    async fn test_write_to_stalled_reader_times_out() {
        // Never reads stdin, so the pipe fills up long before 4 MiB
        let mut process = shell("echo ready; sleep 30");
        process.start().await.unwrap();
        read_until(&mut process, false, "ready").await;

        let err = process
            .write(&vec![b'x'; 4 * 1024 * 1024], Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::FlushTimeout(wait) if wait == Duration::from_millis(200)));
        assert_eq!(process.state(), SessionState::Running);
        process.kill().await;
    }

    #[tokio::test]
    async fn test_write_to_closed_stdin_is_broken_pipe() {
        let mut process = shell("exec 0<&-; echo ready; sleep 30");
        process.start().await.unwrap();
        read_until(&mut process, false, "ready").await;

        let err = process
            .write(b"dir\r\n", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, SessionError::Write(e) if e.kind() == io::ErrorKind::BrokenPipe),
            "unexpected error: {err:?}"
        );
        assert_eq!(process.state(), SessionState::Running);
        process.kill().await;
    }

    #[tokio::test]
    async fn test_stderr_is_a_separate_event() {
        let mut process = shell("echo oops 1>&2; cat");
        process.start().await.unwrap();

        let err = read_until(&mut process, true, "oops").await;
        assert!(err.contains("oops"));
        process.kill().await;
    }

    #[tokio::test]
    async fn test_interrupt_byte_is_delivered() {
        let mut process = cat();
        process.start().await.unwrap();
        process.send_interrupt(Duration::from_secs(1)).await.unwrap();

        let echoed = read_until(&mut process, false, "\u{3}").await;
        assert_eq!(echoed.as_bytes(), &[INTERRUPT_BYTE]);
        // Plain pipes carry no line discipline, so cat keeps running
        assert_eq!(process.state(), SessionState::Running);
        process.kill().await;
    }

    #[tokio::test]
    async fn test_natural_exit_is_observed() {
        let mut process = shell("exit 0");
        process.start().await.unwrap();

        let exited = timeout(Duration::from_secs(5), async {
            loop {
                if let Some(ProcessEvent::Exited { .. }) = process.next_event().await {
                    break;
                }
            }
        })
        .await;
        assert!(exited.is_ok());

        let stopped = timeout(Duration::from_secs(5), async {
            while process.state() != SessionState::Stopped {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(stopped.is_ok());
    }

    #[tokio::test]
    async fn test_terminate_stops_cooperative_child() {
        let mut process = cat();
        process.start().await.unwrap();
        process.terminate(Duration::from_secs(1)).await.unwrap();

        assert_eq!(process.state(), SessionState::Stopped);
        assert!(process.pid().is_none());
    }

    #[tokio::test]
    async fn test_terminate_times_out_then_kill_stops() {
        let mut process = shell("trap '' TERM; echo ready; while :; do sleep 0.05; done");
        process.start().await.unwrap();
        read_until(&mut process, false, "ready").await;

        let err = process
            .terminate(Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::ExitTimeout(_)));
        assert_eq!(process.state(), SessionState::Terminating);

        process.kill().await;
        assert_eq!(process.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn test_restart_after_kill_spawns_new_child() {
        let mut process = cat();
        process.start().await.unwrap();
        let first = process.pid();
        process.kill().await;
        process.start().await.unwrap();

        assert_eq!(process.state(), SessionState::Running);
        assert!(process.pid().is_some());
        assert_ne!(process.pid(), first);
        process.kill().await;
    }
}
