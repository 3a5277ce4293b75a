//! Main entry point for RustyConsole.
//!
//! Parses the command line, starts logging, takes over the terminal,
//! runs the app until the user quits, and restores the terminal on the
//! way out, panics included.

use anyhow::Result;
use clap::Parser;

use rusty_console::utils::guard::ExitGuard;
use rusty_console::utils::logger;
use rusty_console::{App, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Cli::parse().into_settings()?;

    // Held until exit so buffered log lines are flushed
    let _log_guard = logger::init_logging(settings.log_dir.as_deref());

    let mut terminal = ratatui::init();
    let _restore = ExitGuard::with(ratatui::restore);

    let mut app = App::new(settings);
    app.run(&mut terminal).await
}
