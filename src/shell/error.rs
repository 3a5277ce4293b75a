//! Failure taxonomy of the shell session.
//!
//! None of these are fatal: the session manager logs them and recovers by
//! starting, escalating or restarting the child process.

use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The interpreter could not be launched within the start bound.
    #[error("Failed to start {program}: {source}")]
    StartFailure {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Input was sent while no child process is alive.
    #[error("Shell process is not running")]
    NotRunning,

    /// Bytes written to stdin were not flushed within the bound.
    #[error("Write was not flushed within {0:?}")]
    FlushTimeout(Duration),

    /// Graceful termination did not finish within the bound.
    #[error("Process did not exit within {0:?}")]
    ExitTimeout(Duration),

    /// Writing to stdin failed, usually because the child closed it.
    #[error("Failed to write to shell stdin: {0}")]
    Write(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
