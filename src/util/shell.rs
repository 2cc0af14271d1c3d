//! Centralized shell output for the CLI.
//!
//! Status lines are right-aligned to a fixed width (`   Exporting finalmq/1.0.0`),
//! colored when stderr is a terminal. Long external phases get an `indicatif`
//! spinner in normal mode; verbose mode prints plain lines instead so the
//! tool's own output is not interleaved with spinner redraws.

use std::fmt::Display;
use std::io::{self, IsTerminal};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only, no progress
    Quiet,
    #[default]
    Normal,
    /// --verbose: plain status lines, no spinners
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status words. Shell handles all formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success (green)
    Finished,
    Packaged,
    Exported,
    Generated,

    // In progress (cyan)
    Exporting,
    Generating,
    Building,
    Packaging,

    Info,
    Error,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Finished => "Finished",
            Status::Packaged => "Packaged",
            Status::Exported => "Exported",
            Status::Generated => "Generated",
            Status::Exporting => "Exporting",
            Status::Generating => "Generating",
            Status::Building => "Building",
            Status::Packaging => "Packaging",
            Status::Info => "Info",
            Status::Error => "error",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Finished | Status::Packaged | Status::Exported | Status::Generated => {
                "\x1b[1;32m"
            }
            Status::Exporting
            | Status::Generating
            | Status::Building
            | Status::Packaging => "\x1b[1;36m",
            Status::Info => "\x1b[1;34m",
            Status::Error => "\x1b[1;31m",
        }
    }
}

const STATUS_WIDTH: usize = 12;

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
}

impl Shell {
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };
        Shell {
            verbosity,
            use_color,
        }
    }

    /// Create a shell from CLI flags. Quiet wins over verbose.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Shell::new(verbosity, color)
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a status line. Quiet mode only lets errors through.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_quiet() && status != Status::Error {
            return;
        }
        eprintln!("{} {}", self.format_status(status), msg);
    }

    pub fn error(&self, msg: impl Display) {
        self.status(Status::Error, msg);
    }

    /// Print raw text to stderr, untouched. Used for external tool output.
    pub fn raw(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        if text.ends_with('\n') {
            eprint!("{}", text);
        } else {
            eprintln!("{}", text);
        }
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        if self.use_color {
            format!(
                "{}{:>width$}\x1b[0m",
                status.color_code(),
                text,
                width = STATUS_WIDTH
            )
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }

    /// Start a timed phase with a spinner (normal mode only).
    pub fn phase(&self, status: Status, msg: impl Display) -> Activity<'_> {
        let message = msg.to_string();
        let spinner = match self.verbosity {
            Verbosity::Normal if io::stderr().is_terminal() => {
                let pb = ProgressBar::new_spinner();
                if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")
                {
                    pb.set_style(style);
                }
                pb.set_message(format!("{} {}", status.as_str(), message));
                pb.enable_steady_tick(Duration::from_millis(100));
                Some(pb)
            }
            Verbosity::Quiet => None,
            _ => {
                self.status(status, &message);
                None
            }
        };

        Activity {
            shell: self,
            message,
            spinner,
            start: Instant::now(),
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal, ColorChoice::Auto)
    }
}

/// A running activity. Clears its spinner on drop.
pub struct Activity<'a> {
    shell: &'a Shell,
    message: String,
    spinner: Option<ProgressBar>,
    start: Instant,
}

impl Activity<'_> {
    /// Finish with a status line carrying the elapsed time.
    pub fn finish(mut self, status: Status) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
        self.shell.status(
            status,
            format!("{} in {}", self.message, format_duration(self.start.elapsed())),
        );
    }
}

impl Drop for Activity<'_> {
    fn drop(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

/// Format a duration in a human-readable way.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}
