//! Seed policy.
//!
//! Decides whether the carried generation seed advances on a call and
//! what value the call outputs. Increments wrap modulo 2^31.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::state::{draw_seed, WorkflowState, SEED_MODULUS};

/// Policy governing when the generation seed advances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedMode {
    /// Output the carried seed unchanged
    Fixed,
    /// Bump once per completed pass, on the first item of a repeat pass
    #[default]
    IncrementBatch,
    /// Bump on every call
    IncrementPrompt,
    /// Output a fresh uniform draw, which also becomes the carried seed
    Random,
}

impl SeedMode {
    /// Stable string form, matching the serialized representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SeedMode::Fixed => "fixed",
            SeedMode::IncrementBatch => "increment_batch",
            SeedMode::IncrementPrompt => "increment_prompt",
            SeedMode::Random => "random",
        }
    }
}

/// Apply the seed policy for this call and return the output seed.
pub(crate) fn apply_seed_policy(
    mode: SeedMode,
    state: &mut WorkflowState,
    current_index: usize,
    rng: &mut impl Rng,
) -> i64 {
    match mode {
        SeedMode::Fixed => state.current_seed,
        SeedMode::IncrementPrompt => {
            state.current_seed = bump(state.current_seed);
            state.current_seed
        }
        SeedMode::IncrementBatch => {
            if current_index == 0 && state.iteration > 0 {
                state.current_seed = bump(state.current_seed);
            }
            state.current_seed
        }
        SeedMode::Random => {
            // Stored as well, so a later switch to fixed continues from it.
            state.current_seed = draw_seed(rng);
            state.current_seed
        }
    }
}

fn bump(seed: i64) -> i64 {
    (seed + 1) % SEED_MODULUS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SEED_CEILING;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixture(seed: i64) -> (WorkflowState, StdRng) {
        let mut rng = StdRng::seed_from_u64(3);
        let state = WorkflowState::new(3, Some(seed), &mut rng);
        (state, rng)
    }

    #[test]
    fn test_fixed_never_advances() {
        let (mut state, mut rng) = fixture(12345);
        for _ in 0..6 {
            assert_eq!(apply_seed_policy(SeedMode::Fixed, &mut state, 1, &mut rng), 12345);
        }
    }

    #[test]
    fn test_increment_prompt_bumps_every_call() {
        let (mut state, mut rng) = fixture(2000);
        let seeds: Vec<i64> = (0..4)
            .map(|_| apply_seed_policy(SeedMode::IncrementPrompt, &mut state, 0, &mut rng))
            .collect();
        assert_eq!(seeds, vec![2001, 2002, 2003, 2004]);
    }

    #[test]
    fn test_increment_batch_waits_for_second_pass() {
        let (mut state, mut rng) = fixture(1000);
        // First pass: index 0 with iteration 0 does not bump.
        assert_eq!(
            apply_seed_policy(SeedMode::IncrementBatch, &mut state, 0, &mut rng),
            1000
        );
        assert_eq!(
            apply_seed_policy(SeedMode::IncrementBatch, &mut state, 1, &mut rng),
            1000
        );
        // Second pass: back at index 0 after a completed iteration.
        state.iteration = 1;
        assert_eq!(
            apply_seed_policy(SeedMode::IncrementBatch, &mut state, 0, &mut rng),
            1001
        );
        assert_eq!(
            apply_seed_policy(SeedMode::IncrementBatch, &mut state, 1, &mut rng),
            1001
        );
    }

    #[test]
    fn test_increment_wraps_at_modulus() {
        let (mut state, mut rng) = fixture(SEED_CEILING);
        assert_eq!(
            apply_seed_policy(SeedMode::IncrementPrompt, &mut state, 0, &mut rng),
            0
        );
    }

    #[test]
    fn test_random_draw_is_stored() {
        let (mut state, mut rng) = fixture(500);
        let drawn = apply_seed_policy(SeedMode::Random, &mut state, 0, &mut rng);
        assert!((0..=SEED_CEILING).contains(&drawn));
        assert_eq!(state.current_seed, drawn);
        // Switching to fixed continues from the drawn value.
        assert_eq!(
            apply_seed_policy(SeedMode::Fixed, &mut state, 1, &mut rng),
            drawn
        );
    }
}
