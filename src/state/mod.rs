//! Per-workflow iteration state and the store that owns it.
//!
//! The store is an explicit object the caller owns through the engine —
//! there is no process-wide map. Entries are created lazily per workflow
//! id and live for the lifetime of the store; nothing evicts them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Largest representable generation seed.
pub const SEED_CEILING: i64 = 2_147_483_647;

/// Seed increments wrap modulo this value.
pub const SEED_MODULUS: i64 = 2_147_483_648;

/// Direction of travel for ping-pong traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Advancing toward the last item
    #[default]
    Forward,
    /// Returning toward the first item
    Backward,
}

impl Direction {
    /// Signed step applied to the index when moving in this direction.
    pub fn delta(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Mutable iteration state for one workflow id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Ordinal pointer into the item list
    pub index: usize,
    /// Count of completed full passes
    pub iteration: u64,
    /// Travel direction, used only by ping-pong traversal
    pub direction: Direction,
    /// Permutation of item indices for random traversal
    pub random_order: Vec<usize>,
    /// Seed the workflow started from
    pub base_seed: i64,
    /// Seed carried between calls, advanced by the seed policy
    pub current_seed: i64,
    /// When this state entry was first created
    pub created_at: DateTime<Utc>,
}

impl WorkflowState {
    /// Create fresh state for a batch of `total_count` items.
    ///
    /// A non-negative `requested_seed` pins both seeds; otherwise one
    /// value is drawn from `rng` and used for both.
    pub fn new(total_count: usize, requested_seed: Option<i64>, rng: &mut impl Rng) -> Self {
        let seed = resolve_seed(requested_seed, rng);
        Self {
            index: 0,
            iteration: 0,
            direction: Direction::Forward,
            random_order: (0..total_count).collect(),
            base_seed: seed,
            current_seed: seed,
            created_at: Utc::now(),
        }
    }

    /// Restore this state to its defaults.
    ///
    /// Index, iteration and direction reset, the permutation becomes the
    /// identity over `total_count` items, and the seeds are re-pinned the
    /// same way [`WorkflowState::new`] pins them.
    pub fn reset(&mut self, total_count: usize, requested_seed: Option<i64>, rng: &mut impl Rng) {
        self.index = 0;
        self.iteration = 0;
        self.direction = Direction::Forward;
        self.random_order = (0..total_count).collect();
        let seed = resolve_seed(requested_seed, rng);
        self.base_seed = seed;
        self.current_seed = seed;
    }
}

/// Draw a uniform seed in `[0, SEED_CEILING]`.
pub fn draw_seed(rng: &mut impl Rng) -> i64 {
    rng.random_range(0..=SEED_CEILING)
}

fn resolve_seed(requested_seed: Option<i64>, rng: &mut impl Rng) -> i64 {
    match requested_seed.filter(|seed| *seed >= 0) {
        Some(seed) => seed,
        None => draw_seed(rng),
    }
}

/// Map from workflow id to its iteration state.
///
/// Growth is unbounded: one entry per distinct workflow id ever seen.
/// No locking — callers are serialized by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateStore {
    states: HashMap<String, WorkflowState>,
}

impl StateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the state for `workflow_id`, creating it on first use.
    pub fn get_or_create(
        &mut self,
        workflow_id: &str,
        total_count: usize,
        requested_seed: Option<i64>,
        rng: &mut impl Rng,
    ) -> &mut WorkflowState {
        self.states
            .entry(workflow_id.to_string())
            .or_insert_with(|| {
                tracing::debug!("creating iteration state for workflow `{}`", workflow_id);
                WorkflowState::new(total_count, requested_seed, rng)
            })
    }

    /// Read-only view of the state for `workflow_id`, if it exists.
    pub fn get(&self, workflow_id: &str) -> Option<&WorkflowState> {
        self.states.get(workflow_id)
    }

    /// Number of workflow ids tracked.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
