// Terminal runner for promptwheel
// Steps the engine a fixed number of times within one process.

use crate::engine::{IterateRequest, IteratorEngine};
use crate::ui::StepDisplay;

/// Configuration for the runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// The engine request driven on every step
    pub request: IterateRequest,
    /// Number of steps to run
    pub steps: u32,
    /// Quiet mode - suppress output
    pub quiet: bool,
    /// Print the debug payload after each step
    pub show_debug: bool,
}

/// Result of running the requested steps
#[derive(Debug)]
pub struct RunResult {
    /// Whether every step completed
    pub completed: bool,
    /// Number of steps that ran
    pub steps_run: u32,
    /// Status line of the last completed step
    pub last_status: Option<String>,
    /// Error message if the run stopped early
    pub error: Option<String>,
}

/// Drives the engine for a configured number of steps
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    /// Create a new runner with the given configuration
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run the configured number of steps against a fresh engine
    pub fn run(&self) -> RunResult {
        let mut engine = IteratorEngine::new();
        self.run_with(&mut engine)
    }

    /// Run the configured number of steps against the given engine
    pub fn run_with(&self, engine: &mut IteratorEngine) -> RunResult {
        let display = StepDisplay::new().with_quiet(self.config.quiet);
        let mut request = self.config.request.clone();
        let mut last_status = None;

        display.banner(
            request.prompts.iter().filter(|p| !p.trim().is_empty()).count(),
            request.mode.as_str(),
            &request.workflow_id,
        );

        for step in 0..self.config.steps {
            match engine.iterate(&request) {
                Ok(outcome) if outcome.is_empty_batch() => {
                    display.error(&outcome.status);
                    return RunResult {
                        completed: false,
                        steps_run: step,
                        last_status,
                        error: Some(outcome.status),
                    };
                }
                Ok(outcome) => {
                    tracing::debug!(
                        "step {} selected index {} of {}",
                        step + 1,
                        outcome.current_index,
                        outcome.total_count
                    );
                    display.step(step + 1, &outcome);
                    if self.config.show_debug {
                        display.debug_payload(&outcome);
                    }
                    last_status = Some(outcome.status);
                }
                Err(e) => {
                    display.error(&e.to_string());
                    return RunResult {
                        completed: false,
                        steps_run: step,
                        last_status,
                        error: Some(e.to_string()),
                    };
                }
            }

            // The reset flag applies to the first step only; later steps
            // continue from the advanced state.
            if request.reset {
                request.reset = false;
            }
        }

        RunResult {
            completed: true,
            steps_run: self.config.steps,
            last_status,
            error: None,
        }
    }
}
