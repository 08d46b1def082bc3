//! Headless match runner for AI testing and CI verification.
//!
//! Plays hex skirmish matches without graphics so that:
//!
//! - **AI tuning**: scenarios with different AI knobs can be compared
//! - **Balance runs**: many seeds are played in parallel and summarized
//! - **CI verification**: the same seed always yields the same result
//!
//! Scenarios are RON files (or built-in presets); results are JSON.
//!
//! # Example
//!
//! ```bash
//! # Play one match and print the final board
//! cargo run -p hex_headless -- run --scenario duel --seed 7
//!
//! # Balance batch
//! cargo run -p hex_headless -- batch --scenario skirmish --count 500 --output results/
//!
//! # Verify determinism
//! cargo run -p hex_headless -- verify --seed 12345 --runs 5
//! ```

pub mod ascii_visualizer;
pub mod batch;
pub mod metrics;
pub mod runner;
pub mod scenario;

pub use ascii_visualizer::{render_ascii, render_session, AsciiConfig};
pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults};
pub use metrics::{BatchSummary, MatchResult, MetricsCollector, PlayerMetrics};
pub use runner::{run_match, MatchRunner};
pub use scenario::{Scenario, ScenarioError};
