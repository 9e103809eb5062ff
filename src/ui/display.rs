//! Terminal output for the step runner.
//!
//! Plain styled lines on stdout; honors NO_COLOR and a quiet mode.

use owo_colors::OwoColorize;

use crate::engine::IterateOutcome;

/// Renders iteration outcomes for the binary.
#[derive(Debug)]
pub struct StepDisplay {
    /// Whether colors are enabled (respects NO_COLOR env var)
    colors_enabled: bool,
    /// Suppress everything except errors
    quiet: bool,
}

impl Default for StepDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl StepDisplay {
    /// Create a display with color support auto-detected.
    pub fn new() -> Self {
        Self {
            colors_enabled: Self::detect_color_support(),
            quiet: false,
        }
    }

    /// Set quiet mode.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Enable or disable colors.
    pub fn set_colors_enabled(&mut self, enabled: bool) {
        self.colors_enabled = enabled;
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(&self) -> bool {
        self.colors_enabled
    }

    /// Detect if color output should be enabled.
    ///
    /// Respects the NO_COLOR environment variable.
    fn detect_color_support() -> bool {
        std::env::var("NO_COLOR").is_err()
    }

    /// Print the run banner.
    pub fn banner(&self, total_count: usize, mode: &str, workflow_id: &str) {
        if self.quiet {
            return;
        }
        let line = format!(
            "promptwheel | {} prompt(s) | {} mode | workflow `{}`",
            total_count, mode, workflow_id
        );
        if self.colors_enabled {
            println!("{}", line.bold());
        } else {
            println!("{line}");
        }
    }

    /// Print one iteration outcome.
    pub fn step(&self, step_number: u32, outcome: &IterateOutcome) {
        if self.quiet {
            return;
        }
        if self.colors_enabled {
            println!(
                "{} {}",
                format!("[step {}]", step_number).cyan(),
                outcome.status.bold()
            );
            println!("  {} {}", "prompt".dimmed(), outcome.prompt);
            println!("  {} {}", "filename".dimmed(), outcome.filename.green());
            println!("  {} {}", "seed".dimmed(), outcome.seed);
        } else {
            println!("[step {}] {}", step_number, outcome.status);
            println!("  prompt {}", outcome.prompt);
            println!("  filename {}", outcome.filename);
            println!("  seed {}", outcome.seed);
        }
    }

    /// Print the debug payload as pretty JSON, if the outcome carries one.
    pub fn debug_payload(&self, outcome: &IterateOutcome) {
        if self.quiet {
            return;
        }
        if let Some(debug) = &outcome.debug {
            match serde_json::to_string_pretty(debug) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::warn!("failed to render debug payload: {}", e),
            }
        }
    }

    /// Print an error line. Shown even in quiet mode.
    pub fn error(&self, message: &str) {
        if self.colors_enabled {
            eprintln!("{} {}", "error:".red().bold(), message);
        } else {
            eprintln!("error: {message}");
        }
    }
}
