//! Batch match runner for balance testing.
//!
//! Runs many independent matches in parallel using rayon. Each match is
//! single-threaded and owns its own session.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::metrics::{BatchSummary, MatchResult};
use crate::runner::run_match;
use crate::scenario::Scenario;

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario to run
    pub scenario: Scenario,
    /// Number of matches to run
    pub game_count: u32,
    /// Maximum parallel matches (0 = use rayon default)
    pub parallel_games: u32,
    /// Seed of the first match; match `i` uses `seed_start + i`
    pub seed_start: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::skirmish(),
            game_count: 100,
            parallel_games: 0,
            seed_start: 0,
        }
    }
}

impl BatchConfig {
    /// Create config for a specific scenario
    pub fn new(scenario: Scenario, game_count: u32) -> Self {
        Self {
            scenario,
            game_count,
            ..Default::default()
        }
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the thread count
    pub fn with_parallelism(mut self, threads: u32) -> Self {
        self.parallel_games = threads;
        self
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual match results, in seed order
    pub games: Vec<MatchResult>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }

    /// Default results file inside `dir`.
    #[must_use]
    pub fn default_path(dir: &Path) -> PathBuf {
        dir.join("batch_results.json")
    }
}

/// Run a batch of matches
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        scenario = %config.scenario.name,
        count = config.game_count,
        seed = config.seed_start,
        "starting batch"
    );

    let play = |i: u32| {
        let seed = config.seed_start.wrapping_add(u64::from(i));
        let result = run_match(&config.scenario, seed);
        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        if done % 10 == 0 {
            debug!("Progress: {}/{}", done, config.game_count);
        }
        result
    };

    let games: Vec<MatchResult> = if config.parallel_games > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build()
        {
            Ok(pool) => pool.install(|| (0..config.game_count).into_par_iter().map(play).collect()),
            Err(err) => {
                tracing::warn!(%err, "thread pool unavailable, using global pool");
                (0..config.game_count).into_par_iter().map(play).collect()
            }
        }
    } else {
        (0..config.game_count).into_par_iter().map(play).collect()
    };

    let summary = BatchSummary::from_results(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s ({:.1} games/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
    }
}

/// Play the same seed `runs` times and check every result is identical.
pub fn verify_determinism(scenario: &Scenario, seed: u64, runs: u32) -> bool {
    let results: Vec<MatchResult> = (0..runs).map(|_| run_match(scenario, seed)).collect();
    let Some(first) = results.first() else {
        return true;
    };
    results.iter().all(|r| r == first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick() -> Scenario {
        Scenario {
            max_turns: 8,
            ..Scenario::duel()
        }
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(quick(), 500)
            .with_seed(12345)
            .with_parallelism(2);
        assert_eq!(config.game_count, 500);
        assert_eq!(config.seed_start, 12345);
        assert_eq!(config.parallel_games, 2);
    }

    #[test]
    fn test_run_batch_small() {
        let results = run_batch(BatchConfig::new(quick(), 6).with_seed(100));
        assert_eq!(results.games.len(), 6);
        assert_eq!(results.summary.total_games, 6);
        let seeds: Vec<u64> = results.games.iter().map(|g| g.seed).collect();
        assert_eq!(seeds, (100..106).collect::<Vec<_>>());
    }

    #[test]
    fn test_parallelism_does_not_change_results() {
        let serial = run_batch(BatchConfig::new(quick(), 4).with_parallelism(1));
        let parallel = run_batch(BatchConfig::new(quick(), 4).with_parallelism(4));
        assert_eq!(serial.games, parallel.games);
    }

    #[test]
    fn test_verify_determinism() {
        assert!(verify_determinism(&quick(), 12345, 3));
    }

    #[test]
    fn test_batch_results_save_load() {
        let results = run_batch(BatchConfig::new(quick(), 3));

        let dir = tempfile::tempdir().unwrap();
        let path = BatchResults::default_path(dir.path());

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.games, results.games);
        assert_eq!(loaded.config.scenario, quick());
    }
}
