//! Command-line configuration.
//!
//! Everything has a default, so running the binary with no flags opens
//! the platform shell with a 1000-line transcript.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;

use crate::output::{ByteDecoder, DEFAULT_MAX_LINES};
use crate::shell::{LineEnding, ShellConfig, Timeouts, default_shell};

#[derive(Debug, Clone, Parser)]
#[command(name = "rusty-console", version, about = "A console window for a command interpreter")]
pub struct Cli {
    /// Interpreter to spawn (defaults to $SHELL, or %COMSPEC% on Windows)
    #[arg(long, value_name = "PROGRAM")]
    pub shell: Option<String>,

    /// Argument passed to the interpreter; repeat for several
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Working directory of the interpreter
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Lines kept in the transcript before the oldest are dropped
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_LINES, value_parser = parse_max_lines)]
    pub max_lines: usize,

    /// Encoding of the interpreter's output (ibm437 or any WHATWG label)
    #[arg(long, value_name = "LABEL", default_value = "ibm437")]
    pub encoding: String,

    /// Terminator appended to each command
    #[arg(long, value_enum, default_value_t = LineEnding::Crlf)]
    pub line_ending: LineEnding,

    /// Directory for log files (defaults to logs/ next to the executable)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

/// Resolved configuration handed to the application.
#[derive(Debug, Clone)]
pub struct Settings {
    pub shell: ShellConfig,
    pub max_lines: usize,
    pub decoder: ByteDecoder,
    pub line_ending: LineEnding,
    pub timeouts: Timeouts,
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shell: ShellConfig::default(),
            max_lines: DEFAULT_MAX_LINES,
            decoder: ByteDecoder::default(),
            line_ending: LineEnding::default(),
            timeouts: Timeouts::default(),
            log_dir: None,
        }
    }
}

impl Cli {
    pub fn into_settings(self) -> Result<Settings> {
        let decoder = ByteDecoder::for_label(&self.encoding)
            .ok_or_else(|| anyhow!("Unknown output encoding: {}", self.encoding))?;

        let shell = ShellConfig {
            program: self.shell.unwrap_or_else(default_shell),
            args: self.args,
            cwd: self.cwd,
            ..ShellConfig::default()
        };

        Ok(Settings {
            shell,
            max_lines: self.max_lines,
            decoder,
            line_ending: self.line_ending,
            timeouts: Timeouts::default(),
            log_dir: self.log_dir,
        })
    }
}

fn parse_max_lines(value: &str) -> std::result::Result<usize, String> {
    let n: usize = value.parse().map_err(|e| format!("{e}"))?;
    if n == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(n)
}
