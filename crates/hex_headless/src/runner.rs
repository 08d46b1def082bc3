//! Single-match runner.

use hex_core::session::Session;
use tracing::{debug, info};

use crate::metrics::{MatchResult, MetricsCollector};
use crate::scenario::Scenario;

/// Win condition label for a captured base.
pub const BASE_CAPTURED: &str = "base_captured";
/// Win condition label for a match that hit its turn limit.
pub const TURN_LIMIT: &str = "turn_limit";

/// Plays one scenario with one seed from setup to result.
#[derive(Debug)]
pub struct MatchRunner {
    scenario: Scenario,
    seed: u64,
    session: Session,
    metrics: MetricsCollector,
}

impl MatchRunner {
    /// Set up the match; the map is generated immediately.
    #[must_use]
    pub fn new(scenario: Scenario, seed: u64) -> Self {
        let session = scenario.build_session(seed);
        Self {
            scenario,
            seed,
            session,
            metrics: MetricsCollector::new(),
        }
    }

    /// The match in progress.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Whether the match has ended by capture or turn limit.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.session.is_over() || self.session.turn() > self.scenario.max_turns
    }

    /// Play one player's turn. Returns `false` once the match is finished.
    pub fn step(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        let player = self.session.current_player();
        if let Some(report) = self.session.play_ai_turn() {
            debug!(
                seed = self.seed,
                turn = self.session.turn(),
                %player,
                units = report.orders.len(),
                "player turn"
            );
        }
        self.session.end_turn();
        let events = self.session.world_mut().drain_events();
        self.metrics.record_all(&events);
        true
    }

    /// Play to the end, calling `observe` after every player turn.
    pub fn run_with(mut self, mut observe: impl FnMut(&Session)) -> MatchResult {
        // Setup events (starting units, first turn) come before any step.
        let setup = self.session.world_mut().drain_events();
        self.metrics.record_all(&setup);

        while self.step() {
            observe(&self.session);
        }
        self.finish()
    }

    /// Play to the end.
    pub fn run(self) -> MatchResult {
        self.run_with(|_| {})
    }

    fn finish(self) -> MatchResult {
        let winner = self.session.winner();
        let win_condition = if winner.is_some() {
            BASE_CAPTURED
        } else {
            TURN_LIMIT
        };
        let result = MatchResult {
            scenario: self.scenario.name.clone(),
            seed: self.seed,
            turns: self.session.turn(),
            winner: winner.map(|p| p.0),
            win_condition: win_condition.to_string(),
            final_state_hash: self.session.state_hash(),
            players: self.metrics.finish(),
        };
        info!(
            scenario = %result.scenario,
            seed = result.seed,
            turns = result.turns,
            winner = ?result.winner,
            hash = result.final_state_hash,
            "match finished"
        );
        result
    }
}

/// Play `scenario` once with `seed`.
#[must_use]
pub fn run_match(scenario: &Scenario, seed: u64) -> MatchResult {
    MatchRunner::new(scenario.clone(), seed).run()
}
