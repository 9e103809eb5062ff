//! Index selection policy.
//!
//! Given the traversal mode and the current workflow state, decides which
//! item index the call returns and how the state advances for the next
//! call. Manual and single traversal never mutate state.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::state::{Direction, WorkflowState};

/// Policy selecting which item index a call returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalMode {
    /// Walk the batch in order, honoring the loop mode at the boundaries
    #[default]
    Sequential,
    /// Always return the caller-requested index, clamped into range
    Manual,
    /// Draw from a per-call reshuffled permutation
    Random,
    /// Always return the first item
    Single,
}

impl TraversalMode {
    /// Stable string form, matching the serialized representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TraversalMode::Sequential => "sequential",
            TraversalMode::Manual => "manual",
            TraversalMode::Random => "random",
            TraversalMode::Single => "single",
        }
    }
}

/// Boundary behavior for sequential traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Freeze on the last item once it is reached
    Once,
    /// Wrap back to the first item
    #[default]
    Loop,
    /// Bounce between the ends, revisiting each boundary item
    PingPong,
}

impl LoopMode {
    /// Stable string form, matching the serialized representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopMode::Once => "once",
            LoopMode::Loop => "loop",
            LoopMode::PingPong => "ping_pong",
        }
    }
}

/// Resolve the index for this call and advance `state` for the next one.
///
/// `total_count` must be at least 1; the empty batch is handled before
/// selection. A stored index that fell out of range because the batch
/// shrank between calls is clamped back to the last item first.
pub(crate) fn select_index(
    mode: TraversalMode,
    loop_mode: LoopMode,
    manual_index: usize,
    total_count: usize,
    state: &mut WorkflowState,
    rng: &mut impl Rng,
) -> usize {
    debug_assert!(total_count > 0);

    match mode {
        TraversalMode::Single => 0,
        TraversalMode::Manual => manual_index.min(total_count - 1),
        TraversalMode::Random => {
            clamp_stored_index(state, total_count);
            if state.random_order.len() != total_count {
                state.random_order = (0..total_count).collect();
            }
            // Reshuffled on every random-mode call, not only on reset.
            state.random_order.shuffle(rng);
            let current = state.random_order[state.index];
            state.index = (state.index + 1) % total_count;
            if state.index == 0 {
                state.iteration += 1;
            }
            current
        }
        TraversalMode::Sequential => {
            clamp_stored_index(state, total_count);
            let current = state.index;
            match loop_mode {
                LoopMode::Once => {
                    if state.index < total_count - 1 {
                        state.index += 1;
                    }
                }
                LoopMode::Loop => {
                    state.index = (state.index + 1) % total_count;
                    if state.index == 0 {
                        state.iteration += 1;
                    }
                }
                LoopMode::PingPong => {
                    // A move that would leave [0, N-1] flips direction and
                    // stays put, so boundary items are returned twice.
                    let next = current as i64 + state.direction.delta();
                    if next > total_count as i64 - 1 {
                        state.direction = Direction::Backward;
                    } else if next < 0 {
                        state.direction = Direction::Forward;
                        state.iteration += 1;
                    } else {
                        state.index = next as usize;
                    }
                }
            }
            current
        }
    }
}

/// Pull a stored index back in range after the batch shrank between calls.
fn clamp_stored_index(state: &mut WorkflowState, total_count: usize) {
    if state.index >= total_count {
        state.index = total_count - 1;
    }
}
