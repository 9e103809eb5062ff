//! Integration tests for the iteration engine
//!
//! Exercises the public API end to end: traversal modes, loop modes,
//! filename derivation, seed policies and workflow isolation.

use rand::rngs::StdRng;
use rand::SeedableRng;

use promptwheel::engine::{
    IterateRequest, IteratorEngine, LoopMode, NamingMode, SeedMode, TraversalMode,
    EMPTY_BATCH_STATUS,
};

fn engine() -> IteratorEngine<StdRng> {
    IteratorEngine::with_rng(StdRng::seed_from_u64(99))
}

fn indices(engine: &mut IteratorEngine<StdRng>, request: &IterateRequest, calls: usize) -> Vec<usize> {
    (0..calls)
        .map(|_| engine.iterate(request).unwrap().current_index)
        .collect()
}

fn seeds(engine: &mut IteratorEngine<StdRng>, request: &IterateRequest, calls: usize) -> Vec<i64> {
    (0..calls)
        .map(|_| engine.iterate(request).unwrap().seed)
        .collect()
}

// ============================================================================
// Traversal and loop modes
// ============================================================================

#[test]
fn test_sequential_loop_full_pass_increments_iteration() {
    let mut engine = engine();
    let request = IterateRequest::new(["a", "b", "c", "d"]).with_generation_seed(0);

    assert_eq!(indices(&mut engine, &request, 9), vec![0, 1, 2, 3, 0, 1, 2, 3, 0]);

    let state = engine.store().get("default").unwrap();
    assert_eq!(state.iteration, 2);
}

#[test]
fn test_sequential_once_freezes_at_last_index() {
    let mut engine = engine();
    let request = IterateRequest::new(["a", "b", "c"])
        .with_loop_mode(LoopMode::Once)
        .with_generation_seed(0);

    assert_eq!(indices(&mut engine, &request, 8), vec![0, 1, 2, 2, 2, 2, 2, 2]);
}

#[test]
fn test_ping_pong_sequence_and_iteration_count() {
    let mut engine = engine();
    let request = IterateRequest::new(["a", "b", "c", "d"])
        .with_loop_mode(LoopMode::PingPong)
        .with_generation_seed(0);

    assert_eq!(
        indices(&mut engine, &request, 10),
        vec![0, 1, 2, 3, 3, 2, 1, 0, 0, 1]
    );
    let state = engine.store().get("default").unwrap();
    assert_eq!(state.iteration, 1);
}

#[test]
fn test_random_mode_stays_in_range_and_counts_passes() {
    let mut engine = engine();
    let request = IterateRequest::new(["a", "b", "c", "d", "e"])
        .with_mode(TraversalMode::Random)
        .with_generation_seed(0);

    let seen = indices(&mut engine, &request, 20);
    assert!(seen.iter().all(|&i| i < 5));

    let state = engine.store().get("default").unwrap();
    assert_eq!(state.iteration, 4);
}

#[test]
fn test_manual_and_single_modes() {
    let mut engine = engine();
    let manual = IterateRequest::new(["a", "b", "c"])
        .with_mode(TraversalMode::Manual)
        .with_manual_index(7)
        .with_generation_seed(0);
    assert_eq!(engine.iterate(&manual).unwrap().current_index, 2);

    let single = IterateRequest::new(["a", "b", "c"])
        .with_mode(TraversalMode::Single)
        .with_generation_seed(0);
    assert_eq!(indices(&mut engine, &single, 3), vec![0, 0, 0]);
}

#[test]
fn test_single_prompt_batch_is_safe_in_every_mode() {
    for (mode, loop_mode) in [
        (TraversalMode::Sequential, LoopMode::Once),
        (TraversalMode::Sequential, LoopMode::Loop),
        (TraversalMode::Sequential, LoopMode::PingPong),
        (TraversalMode::Random, LoopMode::Loop),
        (TraversalMode::Manual, LoopMode::Loop),
        (TraversalMode::Single, LoopMode::Loop),
    ] {
        let mut engine = engine();
        let request = IterateRequest::new(["only"])
            .with_mode(mode)
            .with_loop_mode(loop_mode)
            .with_generation_seed(0);
        for _ in 0..4 {
            let outcome = engine.iterate(&request).unwrap();
            assert_eq!(outcome.current_index, 0, "mode {mode:?} / {loop_mode:?}");
            assert_eq!(outcome.prompt, "only");
        }
    }
}

// ============================================================================
// Reset and workflow isolation
// ============================================================================

#[test]
fn test_reset_restores_index_iteration_direction_and_seed() {
    let mut engine = engine();
    let request = IterateRequest::new(["a", "b", "c"])
        .with_loop_mode(LoopMode::PingPong)
        .with_generation_seed(10);

    for _ in 0..5 {
        engine.iterate(&request).unwrap();
    }

    let outcome = engine
        .iterate(&request.clone().with_generation_seed(777).with_reset(true))
        .unwrap();
    assert_eq!(outcome.current_index, 0);
    assert_eq!(outcome.seed, 777);

    let state = engine.store().get("default").unwrap();
    assert_eq!(state.iteration, 0);
    assert_eq!(state.base_seed, 777);
    assert_eq!(state.current_seed, 777);
}

#[test]
fn test_distinct_workflow_ids_never_share_state() {
    let mut engine = engine();
    let left = IterateRequest::new(["a", "b", "c"])
        .with_workflow_id("left")
        .with_generation_seed(100)
        .with_seed_mode(SeedMode::IncrementPrompt);
    let right = IterateRequest::new(["a", "b", "c"])
        .with_workflow_id("right")
        .with_generation_seed(200)
        .with_seed_mode(SeedMode::Fixed);

    engine.iterate(&left).unwrap();
    engine.iterate(&left).unwrap();

    let outcome = engine.iterate(&right).unwrap();
    assert_eq!(outcome.current_index, 0);
    assert_eq!(outcome.seed, 200);

    let outcome = engine.iterate(&left).unwrap();
    assert_eq!(outcome.current_index, 2);
    assert_eq!(outcome.seed, 103);
}

// ============================================================================
// Seed policies
// ============================================================================

#[test]
fn test_fixed_seed_is_stable_across_calls() {
    let mut engine = engine();
    let request = IterateRequest::new(["a", "b", "c"])
        .with_generation_seed(12345)
        .with_seed_mode(SeedMode::Fixed);

    assert_eq!(seeds(&mut engine, &request, 6), vec![12345; 6]);
}

#[test]
fn test_increment_batch_bumps_on_each_new_pass() {
    let mut engine = engine();
    let request = IterateRequest::new(["a", "b", "c"])
        .with_generation_seed(1000)
        .with_seed_mode(SeedMode::IncrementBatch);

    // Calls 0-2 are the first pass; the bump lands exactly on calls 3, 6, 9.
    assert_eq!(
        seeds(&mut engine, &request, 10),
        vec![1000, 1000, 1000, 1001, 1001, 1001, 1002, 1002, 1002, 1003]
    );
}

#[test]
fn test_increment_prompt_bumps_every_call() {
    let mut engine = engine();
    let request = IterateRequest::new(["a", "b", "c"])
        .with_generation_seed(2000)
        .with_seed_mode(SeedMode::IncrementPrompt);

    assert_eq!(seeds(&mut engine, &request, 4), vec![2001, 2002, 2003, 2004]);
}

#[test]
fn test_random_seed_mode_feeds_later_fixed_mode() {
    let mut engine = engine();
    let random = IterateRequest::new(["a", "b"])
        .with_generation_seed(5)
        .with_seed_mode(SeedMode::Random);
    let drawn = engine.iterate(&random).unwrap().seed;

    let fixed = random.clone().with_seed_mode(SeedMode::Fixed);
    assert_eq!(engine.iterate(&fixed).unwrap().seed, drawn);
}

// ============================================================================
// Filename derivation
// ============================================================================

#[test]
fn test_suffix_list_walkthrough() {
    let mut engine = engine();
    let request = IterateRequest::new(["front view", "left view"])
        .with_filename_mode(NamingMode::SuffixList)
        .with_base_filename("character")
        .with_suffixes(["_front", "_left"])
        .with_generation_seed(0);

    assert_eq!(engine.iterate(&request).unwrap().filename, "character_front");
    assert_eq!(engine.iterate(&request).unwrap().filename, "character_left");
}

#[test]
fn test_filename_list_with_fallback() {
    let mut engine = engine();
    let request = IterateRequest::new(["a", "b"])
        .with_filename_mode(NamingMode::FilenameList)
        .with_filenames(["hero.png"])
        .with_base_filename("shot")
        .with_generation_seed(0);

    assert_eq!(engine.iterate(&request).unwrap().filename, "hero.png");
    assert_eq!(engine.iterate(&request).unwrap().filename, "shot_001");
}

#[test]
fn test_template_mode_end_to_end() {
    let mut engine = engine();
    let request = IterateRequest::new(["a", "b"])
        .with_filename_mode(NamingMode::Template)
        .with_template("{base}_{index:03d}_{suffix}")
        .with_suffixes(["_front", "_left"])
        .with_base_filename("character")
        .with_generation_seed(0);

    assert_eq!(engine.iterate(&request).unwrap().filename, "character_000_front");
    assert_eq!(engine.iterate(&request).unwrap().filename, "character_001_left");
}

#[test]
fn test_bad_template_is_a_hard_error() {
    let mut engine = engine();
    let request = IterateRequest::new(["a"])
        .with_filename_mode(NamingMode::Template)
        .with_template("{base}_{unknown}")
        .with_generation_seed(0);

    let err = engine.iterate(&request).unwrap_err();
    assert!(err.to_string().contains("{base}_{unknown}"));
}

// ============================================================================
// Degenerate input
// ============================================================================

#[test]
fn test_blank_prompts_yield_error_outcome_not_panic() {
    let mut engine = engine();
    let request = IterateRequest::new(["", "   ", "\t"])
        .with_base_filename("render")
        .with_generation_seed(0);

    let outcome = engine.iterate(&request).unwrap();
    assert!(outcome.is_empty_batch());
    assert_eq!(outcome.prompt, "");
    assert_eq!(outcome.filename, "render");
    assert_eq!(outcome.current_index, 0);
    assert_eq!(outcome.total_count, 0);
    assert_eq!(outcome.status, EMPTY_BATCH_STATUS);
    assert!(outcome.debug.is_none());
}
