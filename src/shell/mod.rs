//! Shell session management.
//!
//! This module owns the interpreter child process and the policy around
//! it: starting it lazily, sending command lines, interrupting with
//! escalation, and shutting it down with the application.

mod error;
mod manager;
mod process;

pub use error::{Result, SessionError};
pub use manager::{LineEnding, OutputHook, SessionManager, Timeouts};
pub use process::{
    DEFAULT_START_TIMEOUT, INTERRUPT_BYTE, ProcessEvent, SessionProcess, SessionState,
    ShellConfig, ShellProcess, default_shell,
};
