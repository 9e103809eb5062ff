//! The iteration engine.
//!
//! One call parses the batch, selects an index for the request's
//! traversal mode, derives a filename and an output seed, and returns
//! the fixed-shape [`IterateOutcome`]. State lives in a [`StateStore`]
//! owned by the engine the caller constructs; the random source is
//! injected so shuffles and seed draws are reproducible in tests.

pub mod filename;
pub mod seed;
pub mod selection;

pub use filename::NamingMode;
pub use seed::SeedMode;
pub use selection::{LoopMode, TraversalMode};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::batch::PromptBatch;
use crate::state::StateStore;
use crate::template::{FilenameTemplate, TemplateError};

/// Status string returned when no usable prompts were supplied.
pub const EMPTY_BATCH_STATUS: &str = "Error: No prompts provided";

/// Workflow id used when the caller does not supply one.
pub const DEFAULT_WORKFLOW_ID: &str = "default";

/// Errors that can fail an iteration call outright.
///
/// Everything else degrades to deterministic fallbacks or, for the
/// empty batch, to the sentinel outcome.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The filename template failed validation.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// All inputs for one iteration call.
///
/// Construct with [`IterateRequest::new`] and refine with the builder
/// methods; every field also stays public for direct assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterateRequest {
    /// Key partitioning state into independent iteration contexts
    pub workflow_id: String,
    /// Traversal mode selecting the item index
    pub mode: TraversalMode,
    /// Boundary behavior for sequential traversal
    pub loop_mode: LoopMode,
    /// Filename derivation policy
    pub filename_mode: NamingMode,
    /// Stem for derived filenames
    pub base_filename: String,
    /// Candidate prompts; only non-empty trimmed entries count
    pub prompts: Vec<String>,
    /// Explicit filenames for filename-list mode
    pub filenames: Vec<String>,
    /// Suffix entries for suffix-list and template modes
    pub suffixes: Vec<String>,
    /// Template for template mode
    pub filename_template: String,
    /// Text concatenated before the selected prompt
    pub prepend_text: String,
    /// Text concatenated after the selected prompt
    pub append_text: String,
    /// Requested index for manual traversal
    pub manual_index: usize,
    /// Restore the workflow state to defaults before selecting
    pub reset: bool,
    /// Seed to pin on creation/reset; negative values mean unspecified
    pub generation_seed: Option<i64>,
    /// Policy governing the output seed
    pub seed_mode: SeedMode,
}

impl IterateRequest {
    /// Start a request from the candidate prompts.
    pub fn new<I, S>(prompts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            workflow_id: DEFAULT_WORKFLOW_ID.to_string(),
            mode: TraversalMode::default(),
            loop_mode: LoopMode::default(),
            filename_mode: NamingMode::default(),
            base_filename: "output".to_string(),
            prompts: prompts.into_iter().map(Into::into).collect(),
            filenames: Vec::new(),
            suffixes: Vec::new(),
            filename_template: "{base}_{index:03d}".to_string(),
            prepend_text: String::new(),
            append_text: String::new(),
            manual_index: 0,
            reset: false,
            generation_seed: None,
            seed_mode: SeedMode::default(),
        }
    }

    /// Set the workflow id.
    pub fn with_workflow_id(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = workflow_id.into();
        self
    }

    /// Set the traversal mode.
    pub fn with_mode(mut self, mode: TraversalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the loop mode for sequential traversal.
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    /// Set the filename derivation mode.
    pub fn with_filename_mode(mut self, filename_mode: NamingMode) -> Self {
        self.filename_mode = filename_mode;
        self
    }

    /// Set the base filename.
    pub fn with_base_filename(mut self, base_filename: impl Into<String>) -> Self {
        self.base_filename = base_filename.into();
        self
    }

    /// Set the explicit filename list.
    pub fn with_filenames<I, S>(mut self, filenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filenames = filenames.into_iter().map(Into::into).collect();
        self
    }

    /// Set the suffix list.
    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the filename template.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.filename_template = template.into();
        self
    }

    /// Set text concatenated around the selected prompt.
    pub fn with_affixes(
        mut self,
        prepend_text: impl Into<String>,
        append_text: impl Into<String>,
    ) -> Self {
        self.prepend_text = prepend_text.into();
        self.append_text = append_text.into();
        self
    }

    /// Set the requested index for manual traversal.
    pub fn with_manual_index(mut self, manual_index: usize) -> Self {
        self.manual_index = manual_index;
        self
    }

    /// Request a state reset before selection.
    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    /// Pin the generation seed (negative values mean unspecified).
    pub fn with_generation_seed(mut self, generation_seed: i64) -> Self {
        self.generation_seed = Some(generation_seed);
        self
    }

    /// Set the seed policy.
    pub fn with_seed_mode(mut self, seed_mode: SeedMode) -> Self {
        self.seed_mode = seed_mode;
        self
    }
}

/// Machine-readable mirror of one call's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDebug {
    /// Traversal mode the call ran with
    pub mode: TraversalMode,
    /// Filename mode the call ran with
    pub filename_mode: NamingMode,
    /// Index returned by this call
    pub current_index: usize,
    /// Stored index after advancement, i.e. where the next call starts
    pub state_index: usize,
    /// Completed-pass count after this call
    pub iteration: u64,
    /// Loop mode the call ran with
    pub loop_mode: LoopMode,
    /// Filename the call derived
    pub filename: String,
    /// Seed the call output
    pub seed: i64,
    /// Seed policy the call ran with
    pub seed_mode: SeedMode,
}

/// Fixed-shape result of one iteration call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterateOutcome {
    /// Selected prompt text (with affixes applied, trimmed)
    pub prompt: String,
    /// Derived output filename
    pub filename: String,
    /// 0-based index of the selected item
    pub current_index: usize,
    /// Number of usable prompts in the batch
    pub total_count: usize,
    /// Human-readable status line
    pub status: String,
    /// Output generation seed
    pub seed: i64,
    /// Decision mirror; absent for the degenerate outcome
    pub debug: Option<StepDebug>,
}

impl IterateOutcome {
    /// The sentinel outcome for a batch with no usable prompts.
    fn empty_batch(base_filename: &str) -> Self {
        Self {
            prompt: String::new(),
            filename: base_filename.to_string(),
            current_index: 0,
            total_count: 0,
            status: EMPTY_BATCH_STATUS.to_string(),
            seed: 0,
            debug: None,
        }
    }

    /// Whether this is the degenerate empty-batch outcome.
    pub fn is_empty_batch(&self) -> bool {
        self.total_count == 0
    }
}

/// Stateful prompt iterator.
///
/// Owns the per-workflow state map and the random source. Calls take
/// `&mut self`; the host serializes calls per workflow id.
#[derive(Debug)]
pub struct IteratorEngine<R: Rng = StdRng> {
    store: StateStore,
    rng: R,
}

impl IteratorEngine<StdRng> {
    /// Create an engine with an OS-seeded random source.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for IteratorEngine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> IteratorEngine<R> {
    /// Create an engine with an injected random source.
    pub fn with_rng(rng: R) -> Self {
        Self {
            store: StateStore::new(),
            rng,
        }
    }

    /// Read-only view of the state store.
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Run one iteration step.
    ///
    /// Returns the degenerate outcome for an empty batch without touching
    /// any state. The only hard error is a failing filename template,
    /// reported before any state mutation for the call.
    ///
    /// # Errors
    ///
    /// [`EngineError::Template`] when template mode is selected and the
    /// template does not validate.
    pub fn iterate(&mut self, request: &IterateRequest) -> Result<IterateOutcome, EngineError> {
        let batch = PromptBatch::new(&request.prompts, &request.filenames, &request.suffixes);
        if batch.is_empty() {
            tracing::debug!(
                "no usable prompts for workflow `{}`, returning sentinel outcome",
                request.workflow_id
            );
            return Ok(IterateOutcome::empty_batch(&request.base_filename));
        }

        // Validate the template before any state is touched.
        let template = match request.filename_mode {
            NamingMode::Template => Some(FilenameTemplate::parse(&request.filename_template)?),
            _ => None,
        };

        let total_count = batch.len();
        let state = self.store.get_or_create(
            &request.workflow_id,
            total_count,
            request.generation_seed,
            &mut self.rng,
        );

        if request.reset {
            tracing::debug!("resetting iteration state for workflow `{}`", request.workflow_id);
            state.reset(total_count, request.generation_seed, &mut self.rng);
        }

        let current_index = selection::select_index(
            request.mode,
            request.loop_mode,
            request.manual_index,
            total_count,
            state,
            &mut self.rng,
        );

        let prompt = compose_prompt(
            &request.prepend_text,
            batch.prompt(current_index),
            &request.append_text,
        );
        let filename = filename::derive_filename(
            request.filename_mode,
            current_index,
            &request.base_filename,
            &batch,
            template.as_ref(),
        );

        let status = build_status(
            request.mode,
            request.loop_mode,
            current_index,
            total_count,
            state.iteration,
        );

        let seed = seed::apply_seed_policy(request.seed_mode, state, current_index, &mut self.rng);

        let debug = StepDebug {
            mode: request.mode,
            filename_mode: request.filename_mode,
            current_index,
            state_index: state.index,
            iteration: state.iteration,
            loop_mode: request.loop_mode,
            filename: filename.clone(),
            seed,
            seed_mode: request.seed_mode,
        };

        Ok(IterateOutcome {
            prompt,
            filename,
            current_index,
            total_count,
            status,
            seed,
            debug: Some(debug),
        })
    }
}

fn compose_prompt(prepend_text: &str, prompt: &str, append_text: &str) -> String {
    format!("{prepend_text}{prompt}{append_text}")
        .trim()
        .to_string()
}

fn build_status(
    mode: TraversalMode,
    loop_mode: LoopMode,
    current_index: usize,
    total_count: usize,
    iteration: u64,
) -> String {
    let mut status = format!("Prompt {}/{}", current_index + 1, total_count);
    match mode {
        TraversalMode::Sequential => {
            status.push_str(&format!(" | Iteration {}", iteration + 1));
            if loop_mode == LoopMode::PingPong {
                status.push_str(" (ping-pong)");
            }
        }
        TraversalMode::Random => status.push_str(" (random)"),
        TraversalMode::Manual | TraversalMode::Single => {}
    }
    status
}
