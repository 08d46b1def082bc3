//! Determinism testing utilities.
//!
//! Provides a harness for verifying that matches produce identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Replays and batch statistics are only meaningful if a seed fully
//! determines a match. Sources of non-determinism include:
//!
//! - **Floating-point math**: we use fixed-point arithmetic via
//!   [`hex_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Decisions always iterate `BTreeMap`s or sorted ids.
//!
//! - **System randomness**: map generation uses a seeded generator only.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual searches and tree evaluations
//! 2. **Property tests**: random boards must still produce deterministic outputs
//! 3. **Integration tests**: full generated matches are reproducible
//! 4. **Parallel tests**: running N matches on threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use hex_core::session::Session;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps played per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run ended in the same state.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to replay
/// * `steps` - Number of steps per run
/// * `setup` - Creates the initial state
/// * `step` - Advances the state by one step
/// * `hash` - Computes the state hash
///
/// # Example
///
/// ```
/// use hex_test_utils::determinism::verify_determinism;
/// use hex_test_utils::fixtures::generated_session;
///
/// let result = verify_determinism(
///     3,
///     10,
///     || generated_session(7),
///     |session| {
///         session.play_ai_turn();
///         session.end_turn();
///     },
///     |session| session.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..steps {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Play one AI turn and hand over to the next player.
pub fn step_session(session: &mut Session) {
    session.play_ai_turn();
    session.end_turn();
}

/// Play two sessions from the same setup and compare final hashes.
pub fn verify_session_determinism<F>(setup_fn: F, steps: u64) -> bool
where
    F: Fn() -> Session,
{
    verify_determinism(2, steps, &setup_fn, step_session, Session::state_hash).is_deterministic
}

/// Compare two sessions step by step, finding the first divergence.
///
/// # Returns
///
/// `None` if the sessions stay identical, `Some(step)` for the first step
/// whose resulting hash differs (0 means the setups already differ).
pub fn find_first_divergence<F>(setup_fn: F, steps: u64) -> Option<u64>
where
    F: Fn() -> Session,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for step in 1..=steps {
        step_session(&mut a);
        step_session(&mut b);
        if a.state_hash() != b.state_hash() {
            return Some(step);
        }
    }

    None
}

/// Result of parallel match runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final state hash from each match.
    pub hashes: Vec<u64>,
    /// Steps each match played.
    pub steps: u64,
}

impl ParallelRunResult {
    /// Check if all matches produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all matches agreed.
    ///
    /// # Panics
    ///
    /// Panics if the matches produced different hashes.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic(),
            "Parallel matches diverged after {} steps: {:?}",
            self.steps,
            self.hashes
        );
    }
}

/// Play `count` sessions on scoped threads and collect their final hashes.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_sessions<F>(setup_fn: F, count: usize, steps: u64) -> ParallelRunResult
where
    F: Fn() -> Session + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..count)
            .map(|_| {
                s.spawn(|| {
                    let mut session = setup_fn();
                    for _ in 0..steps {
                        step_session(&mut session);
                    }
                    session.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("session thread panicked"))
            .collect()
    });

    ParallelRunResult { hashes, steps }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for boards and matches.
pub mod strategies {
    use proptest::prelude::*;

    use hex_core::hex::HexCoord;
    use hex_core::terrain::Terrain;
    use hex_core::unit::UnitKind;

    /// Any axial coordinate within a generous window around the origin.
    pub fn arb_hex_coord() -> impl Strategy<Value = HexCoord> {
        (-50i32..50, -50i32..50).prop_map(|(q, r)| HexCoord::new(q, r))
    }

    /// Board dimensions small enough for exhaustive search in tests.
    pub fn arb_board_size() -> impl Strategy<Value = (u32, u32)> {
        (2u32..12, 2u32..12)
    }

    /// A board size together with two offset cells on it.
    pub fn arb_board_with_cells() -> impl Strategy<Value = ((u32, u32), HexCoord, HexCoord)> {
        arb_board_size().prop_flat_map(|(w, h)| {
            let cell = (0..w as i32, 0..h as i32)
                .prop_map(|(col, row)| HexCoord::from_offset(col, row));
            (Just((w, h)), cell.clone(), cell)
        })
    }

    /// Any terrain kind.
    pub fn arb_terrain() -> impl Strategy<Value = Terrain> {
        prop::sample::select(Terrain::ALL.to_vec())
    }

    /// Passable terrain only.
    pub fn arb_passable_terrain() -> impl Strategy<Value = Terrain> {
        prop::sample::select(vec![Terrain::Plains, Terrain::Forest, Terrain::Mountain])
    }

    /// Any unit kind.
    pub fn arb_unit_kind() -> impl Strategy<Value = UnitKind> {
        prop::sample::select(vec![UnitKind::Infantry, UnitKind::Cavalry, UnitKind::Artillery])
    }

    /// Map seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }
}
