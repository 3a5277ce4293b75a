//! Session orchestration: command dispatch, interrupt escalation and
//! restart policy on top of a [`ShellProcess`].
//!
//! Every operation takes `&mut self` and is awaited to completion on the
//! app loop, so no command can be written while an interrupt's
//! terminate/kill/restart sequence is still in flight.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::error::SessionError;
use super::process::{ProcessEvent, SessionProcess, SessionState, ShellProcess};
use crate::output::{ByteDecoder, Transcript};

/// Callback fired after the transcript changed, with the decoded chunk.
pub type OutputHook = Box<dyn FnMut(&str) + Send>;

/// Bounded waits used by the session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Flush wait for a submitted command.
    pub write: Duration,
    /// Flush wait for the interrupt byte.
    pub interrupt_flush: Duration,
    /// Exit wait after terminating on an interrupt request.
    pub interrupt_exit: Duration,
    /// Exit wait at application shutdown. Kept short so closing never
    /// visibly hangs.
    pub shutdown_exit: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            write: Duration::from_secs(30),
            interrupt_flush: Duration::from_millis(1000),
            interrupt_exit: Duration::from_millis(1000),
            shutdown_exit: Duration::from_millis(100),
        }
    }
}

/// Terminator appended to every submitted command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LineEnding {
    /// `\r\n`, what a console interpreter expects from the Enter key.
    #[default]
    Crlf,
    /// `\n`, for POSIX shells that would keep the `\r` in the command.
    Lf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Crlf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

/// Owns the session process, the transcript and the decoder, and turns
/// user intents into process operations.
pub struct SessionManager<P: ShellProcess = SessionProcess> {
    process: P,
    transcript: Transcript,
    decoder: ByteDecoder,
    line_ending: LineEnding,
    timeouts: Timeouts,
    on_output: Option<OutputHook>,
    on_error: Option<OutputHook>,
    shut_down: bool,
}

impl<P: ShellProcess> SessionManager<P> {
    pub fn new(process: P, transcript: Transcript, decoder: ByteDecoder) -> Self {
        Self {
            process,
            transcript,
            decoder,
            line_ending: LineEnding::default(),
            timeouts: Timeouts::default(),
            on_output: None,
            on_error: None,
            shut_down: false,
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Subscribe to stdout chunks appended to the transcript.
    pub fn on_output_available<F>(&mut self, hook: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_output = Some(Box::new(hook));
    }

    /// Subscribe to stderr chunks appended to the transcript.
    pub fn on_error_available<F>(&mut self, hook: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_error = Some(Box::new(hook));
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn decoder(&self) -> &ByteDecoder {
        &self.decoder
    }

    pub fn process(&self) -> &P {
        &self.process
    }

    pub fn state(&mut self) -> SessionState {
        self.process.state()
    }

    /// Bring the session up. Failures are logged; the next command retries.
    pub async fn start(&mut self) {
        if self.shut_down {
            return;
        }
        if let Err(e) = self.process.start().await {
            warn!("Failed to start shell session: {}", e);
        }
    }

    /// Send one line to the shell, starting it first if needed.
    ///
    /// Empty input still sends the terminator, like pressing Enter on an
    /// empty prompt.
    pub async fn submit_command(&mut self, text: &str) {
        if self.shut_down {
            warn!("Ignoring command after shutdown");
            return;
        }

        let command = text.trim();
        if self.process.state() != SessionState::Running {
            if let Err(e) = self.process.start().await {
                warn!("Shell not running and restart failed, dropping command: {}", e);
                return;
            }
        }

        debug!("Executing command: {:?}", command);
        let line = format!("{command}{}", self.line_ending.as_str());
        if let Err(e) = self.process.write(line.as_bytes(), self.timeouts.write).await {
            warn!("Failed to send command to shell: {}", e);
        }
    }

    /// Abort whatever the shell is running.
    ///
    /// Escalates from the interrupt byte to terminate to kill, and always
    /// finishes by starting the shell again, so the user is never left
    /// with a dead session. Shell state (cwd, variables) is lost whenever
    /// the process had to be replaced.
    pub async fn request_interrupt(&mut self) {
        if self.shut_down || self.process.state() != SessionState::Running {
            debug!("Interrupt requested with no running shell");
            return;
        }

        info!("Interrupt requested");
        if let Err(e) = self.process.send_interrupt(self.timeouts.interrupt_flush).await {
            warn!("Failed to write interrupt signal: {}", e);
        }

        if self.process.state() == SessionState::Running {
            match self.process.terminate(self.timeouts.interrupt_exit).await {
                Ok(()) => {}
                Err(SessionError::ExitTimeout(wait)) => {
                    warn!("Shell ignored terminate for {:?}, killing it", wait);
                    self.process.kill().await;
                }
                Err(e) => {
                    warn!("Terminate failed, killing shell: {}", e);
                    self.process.kill().await;
                }
            }
        }

        if let Err(e) = self.process.start().await {
            warn!("Failed to restart shell after interrupt: {}", e);
        }
    }

    /// Tear the session down for good. Idempotent; never restarts.
    pub async fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        match self.process.state() {
            SessionState::NotStarted | SessionState::Stopped => {}
            SessionState::Starting | SessionState::Running | SessionState::Terminating => {
                if let Err(e) = self.process.terminate(self.timeouts.shutdown_exit).await {
                    debug!("Graceful shutdown incomplete ({}), killing shell", e);
                    self.process.kill().await;
                }
            }
        }
        info!("Shell session shut down");
    }

    /// Wait for the next output notification from the process.
    pub async fn next_event(&mut self) -> Option<ProcessEvent> {
        self.process.next_event().await
    }

    /// Route one output notification into the transcript and hooks.
    pub fn handle_process_event(&mut self, event: ProcessEvent) {
        match event {
            ProcessEvent::Stdout(bytes) => {
                let text = self.decoder.decode(&bytes);
                self.transcript.append(&text);
                if let Some(hook) = self.on_output.as_mut() {
                    hook(&text);
                }
            }
            ProcessEvent::Stderr(bytes) => {
                let text = self.decoder.decode(&bytes);
                self.transcript.append_error(&text);
                if let Some(hook) = self.on_error.as_mut() {
                    hook(&text);
                }
            }
            ProcessEvent::Exited { pid } => {
                info!("Shell process {:?} closed its output", pid);
            }
        }
    }
}
