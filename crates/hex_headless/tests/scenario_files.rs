//! Scenario files on disk through to match results.

use std::path::PathBuf;

use hex_core::unit::{PlayerId, UnitKind};
use hex_headless::{run_batch, run_match, BatchConfig, BatchResults, MatchResult, Scenario};

fn shipped(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

#[test]
fn shipped_scenario_parses() {
    let scenario = Scenario::load(shipped("river_crossing.ron")).unwrap();
    assert_eq!(scenario.name, "river_crossing");
    assert_eq!(scenario.map.width, 16);
    assert_eq!(scenario.rules.resource_node_yield, 15);
    assert_eq!(scenario.ai_for(PlayerId::ONE).production_threshold, 40);
    assert_eq!(scenario.ai_for(PlayerId::TWO).production_unit, UnitKind::Cavalry);
    // Unlisted fields fall back to defaults.
    assert_eq!(scenario.ai_for(PlayerId::TWO).influence_range, 8);
}

#[test]
fn resolve_accepts_names_and_paths() {
    assert_eq!(Scenario::resolve("duel").unwrap(), Scenario::duel());
    let path = shipped("river_crossing.ron");
    let by_path = Scenario::resolve(path.to_str().unwrap()).unwrap();
    assert_eq!(by_path.name, "river_crossing");
}

#[test]
fn match_result_serializes_to_json() {
    let scenario = Scenario {
        max_turns: 10,
        ..Scenario::load(shipped("river_crossing.ron")).unwrap()
    };
    let result = run_match(&scenario, 1);
    let json = serde_json::to_string(&result).unwrap();
    let back: MatchResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
    assert_eq!(back.scenario, "river_crossing");
}

#[test]
fn batch_written_to_disk_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = Scenario {
        max_turns: 6,
        ..Scenario::duel()
    };
    let results = run_batch(BatchConfig::new(scenario, 4).with_seed(50));
    let path = BatchResults::default_path(dir.path());
    results.save(&path).unwrap();

    let loaded = BatchResults::load(&path).unwrap();
    assert_eq!(loaded.games, results.games);
    assert_eq!(loaded.summary.total_games, 4);
}
