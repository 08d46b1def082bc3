//! Match metrics collected from the game event log.
//!
//! Everything here is derived from [`GameEvent`]s, so a metrics record
//! can be rebuilt from a saved event log.

use std::collections::{BTreeMap, HashMap};

use hex_core::events::GameEvent;
use hex_core::unit::{PlayerId, UnitId};
use serde::{Deserialize, Serialize};

/// Per-player totals for one match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMetrics {
    /// Units that entered play, starting units included.
    pub units_spawned: u32,
    /// Units this player lost.
    pub units_lost: u32,
    /// Enemy units this player destroyed.
    pub units_killed: u32,
    /// Attacks made.
    pub attacks: u32,
    /// Total damage dealt.
    pub damage_dealt: u64,
    /// Resources from income and resource nodes.
    pub resources_collected: u64,
    /// Resources spent on production.
    pub resources_spent: u64,
    /// Standing-order changes.
    pub order_changes: u32,
}

/// Outcome and statistics of a single match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Scenario name.
    pub scenario: String,
    /// Map seed.
    pub seed: u64,
    /// Turn the match ended on.
    pub turns: u32,
    /// Winning player index, `None` for a draw.
    pub winner: Option<u8>,
    /// "base_captured" or "turn_limit".
    pub win_condition: String,
    /// Final session hash, for determinism checks.
    pub final_state_hash: u64,
    /// Per-player metrics keyed by player label ("P0", "P1").
    pub players: BTreeMap<String, PlayerMetrics>,
}

/// Folds events into per-player metrics.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    owners: HashMap<UnitId, PlayerId>,
    players: BTreeMap<PlayerId, PlayerMetrics>,
}

impl MetricsCollector {
    /// Empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one event.
    pub fn record(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::UnitSpawned { unit, owner, .. } => {
                self.owners.insert(unit, owner);
                self.player(owner).units_spawned += 1;
            }
            GameEvent::UnitAttacked {
                attacker, damage, ..
            } => {
                if let Some(owner) = self.owners.get(&attacker).copied() {
                    let metrics = self.player(owner);
                    metrics.attacks += 1;
                    metrics.damage_dealt += u64::from(damage);
                }
            }
            GameEvent::UnitDestroyed { unit, owner, .. } => {
                self.owners.remove(&unit);
                self.player(owner).units_lost += 1;
                self.player(owner.opponent()).units_killed += 1;
            }
            GameEvent::ResourcesCollected { player, amount, .. } => {
                self.player(player).resources_collected += u64::from(amount);
            }
            GameEvent::ResourcesSpent { player, amount } => {
                self.player(player).resources_spent += u64::from(amount);
            }
            GameEvent::OrderChanged { unit, .. } => {
                if let Some(owner) = self.owners.get(&unit).copied() {
                    self.player(owner).order_changes += 1;
                }
            }
            GameEvent::UnitMoved { .. }
            | GameEvent::TurnStarted { .. }
            | GameEvent::GameWon { .. } => {}
        }
    }

    /// Account for a batch of events.
    pub fn record_all<'a>(&mut self, events: impl IntoIterator<Item = &'a GameEvent>) {
        for event in events {
            self.record(event);
        }
    }

    /// Metrics of `player` so far.
    #[must_use]
    pub fn metrics(&self, player: PlayerId) -> PlayerMetrics {
        self.players.get(&player).cloned().unwrap_or_default()
    }

    /// Labelled metrics for every player seen.
    #[must_use]
    pub fn finish(self) -> BTreeMap<String, PlayerMetrics> {
        self.players
            .into_iter()
            .map(|(player, metrics)| (player.to_string(), metrics))
            .collect()
    }

    fn player(&mut self, player: PlayerId) -> &mut PlayerMetrics {
        self.players.entry(player).or_default()
    }
}

/// Aggregate over many matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches played.
    pub total_games: u32,
    /// Wins per player label.
    pub wins: BTreeMap<String, u32>,
    /// Matches without a winner.
    pub draws: u32,
    /// Mean match length in turns.
    pub avg_turns: f64,
    /// Shortest match.
    pub min_turns: u32,
    /// Longest match.
    pub max_turns: u32,
}

impl BatchSummary {
    /// Summarize a set of results.
    #[must_use]
    pub fn from_results(results: &[MatchResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }
        let mut summary = Self {
            total_games: results.len() as u32,
            min_turns: u32::MAX,
            ..Self::default()
        };
        let mut total_turns = 0u64;
        for result in results {
            match result.winner {
                Some(w) => *summary.wins.entry(PlayerId(w).to_string()).or_insert(0) += 1,
                None => summary.draws += 1,
            }
            total_turns += u64::from(result.turns);
            summary.min_turns = summary.min_turns.min(result.turns);
            summary.max_turns = summary.max_turns.max(result.turns);
        }
        summary.avg_turns = total_turns as f64 / f64::from(summary.total_games);
        summary
    }

    /// Win rate of a player label (0.0 to 1.0).
    #[must_use]
    pub fn win_rate(&self, label: &str) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        f64::from(self.wins.get(label).copied().unwrap_or(0)) / f64::from(self.total_games)
    }
}
