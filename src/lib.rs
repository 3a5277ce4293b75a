//! RustyConsole - a console window around a command interpreter
//!
//! The interpreter runs as a child process on plain pipes. Command lines
//! go to its stdin, stdout and stderr come back into a bounded transcript,
//! and Ctrl+C aborts the running command by escalating from the interrupt
//! byte to terminate to kill, restarting the shell afterwards.
//!
//! - `shell`: the session process and the manager that owns its policy
//! - `output`: byte decoding and the bounded transcript
//! - `event`, `ui`, `app`: the terminal front end
//! - `config`, `utils`: command-line settings and logging
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use rusty_console::output::{ByteDecoder, Transcript};
//! use rusty_console::shell::{SessionManager, SessionProcess, ShellConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let process = SessionProcess::new(ShellConfig::default());
//!     let mut session = SessionManager::new(process, Transcript::new(1000), ByteDecoder::default());
//!     session.on_output_available(|text| print!("{text}"));
//!
//!     session.submit_command("echo hi").await;
//!     if let Ok(Some(event)) =
//!         tokio::time::timeout(Duration::from_secs(1), session.next_event()).await
//!     {
//!         session.handle_process_event(event);
//!     }
//!     session.shutdown().await;
//! }
//! ```

pub mod app;
pub mod config;
pub mod event;
pub mod output;
pub mod shell;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use app::App;
pub use config::{Cli, Settings};
pub use output::{ByteDecoder, Transcript};
pub use shell::{SessionError, SessionManager, SessionProcess, SessionState};
