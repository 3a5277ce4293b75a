//! Event sources for the application loop.
//!
//! Two streams feed the loop: user input read from the terminal on a
//! dedicated thread, and shell output drained by the session process.
//! Keeping terminal reads off the runtime means a burst of shell output
//! never delays a Ctrl+C.
//!
//! # Submodules
//!
//! - `terminal`: mapping of key presses to [`Intent`]s

pub mod terminal;

use std::io::Result;
use std::thread;

use tokio::sync::mpsc::{self, Receiver};

pub use terminal::{Intent, key_to_intent};

/// User input events from the terminal (keys, mouse, resize).
pub type UserEvent = crossterm::event::Event;

// Key presses are tiny; a short queue is plenty
const USER_EVENT_BUFFER: usize = 64;

/// Start reading terminal input on a background thread.
///
/// The thread stops on its own once the returned receiver is dropped.
pub fn init_user_event() -> Receiver<Result<UserEvent>> {
    let (tx, rx) = mpsc::channel(USER_EVENT_BUFFER);
    thread::spawn(move || {
        loop {
            if tx.blocking_send(crossterm::event::read()).is_err() {
                break;
            }
        }
    });
    rx
}
