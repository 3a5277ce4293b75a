//! Utility modules: logging setup and the terminal restore guard.

pub mod guard;
pub mod logger;
