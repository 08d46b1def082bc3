//! Whole-match determinism: a seed fully decides a match.

use hex_core::config::{AiConfig, RulesConfig};
use hex_core::map_generation::{generate, MapConfig};
use hex_core::session::Session;
use hex_test_utils::determinism::strategies::arb_seed;
use hex_test_utils::determinism::{
    find_first_divergence, run_parallel_sessions, verify_determinism, verify_session_determinism,
};
use hex_test_utils::fixtures::generated_session;
use proptest::prelude::*;

#[test]
fn generated_matches_replay_identically() {
    for seed in [1, 17, 4242] {
        assert!(
            verify_session_determinism(|| generated_session(seed), 30),
            "seed {seed} diverged at step {:?}",
            find_first_divergence(|| generated_session(seed), 30)
        );
    }
}

#[test]
fn event_logs_match_across_runs() {
    let play = || {
        let mut session = generated_session(8);
        session.run_to_completion(15);
        session.world().events().to_vec()
    };
    assert_eq!(play(), play());
}

#[test]
fn aggressive_ai_is_deterministic_too() {
    let setup = || {
        let world = generate(MapConfig::new(12, 12).with_seed(77), RulesConfig::default());
        let ai = AiConfig {
            aggressiveness: 10,
            ..AiConfig::default()
        };
        Session::new(world, ai)
    };
    verify_determinism(4, 25, setup, |s| {
        s.play_ai_turn();
        s.end_turn();
    }, Session::state_hash)
    .assert_deterministic();
}

#[test]
fn parallel_matches_agree() {
    run_parallel_sessions(|| generated_session(31), 4, 20).assert_deterministic();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn any_seed_is_deterministic(seed in arb_seed()) {
        prop_assert!(verify_session_determinism(|| generated_session(seed), 6));
    }
}
