//! Match flow: whose turn it is, income, and the win condition.
//!
//! A [`Session`] owns the [`World`] plus one [`StrategicPlanner`] per
//! player. Players act in id order; the turn counter advances each time
//! play wraps back to the first player.
//!
//! # Example
//!
//! ```
//! use hex_core::config::{AiConfig, RulesConfig};
//! use hex_core::map_generation::{generate, MapConfig};
//! use hex_core::session::Session;
//!
//! let world = generate(MapConfig::default().with_seed(7), RulesConfig::default());
//! let mut session = Session::new(world, AiConfig::default());
//! session.run_to_completion(5);
//! assert!(session.turn() >= 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use tracing::{debug, info};

use crate::config::AiConfig;
use crate::events::GameEvent;
use crate::strategic::{StrategicPlanner, TurnReport};
use crate::unit::PlayerId;
use crate::world::World;

/// A match in progress.
#[derive(Debug)]
pub struct Session {
    world: World,
    players: Vec<PlayerId>,
    planners: BTreeMap<PlayerId, StrategicPlanner>,
    current: usize,
    turn: u32,
    winner: Option<PlayerId>,
}

impl Session {
    /// Start a match where every player runs the same AI configuration.
    ///
    /// # Panics
    ///
    /// Panics if the world has no bases.
    #[must_use]
    pub fn new(world: World, config: AiConfig) -> Self {
        let configs = world.players().map(|p| (p, config.clone())).collect();
        Self::with_configs(world, configs)
    }

    /// Start a match with a per-player AI configuration. Players without
    /// an entry use [`AiConfig::default`].
    ///
    /// # Panics
    ///
    /// Panics if the world has no bases.
    #[must_use]
    pub fn with_configs(mut world: World, mut configs: BTreeMap<PlayerId, AiConfig>) -> Self {
        let players: Vec<PlayerId> = world.players().collect();
        assert!(!players.is_empty(), "session needs at least one player base");

        let planners = players
            .iter()
            .map(|&p| {
                let config = configs.remove(&p).unwrap_or_default();
                (p, StrategicPlanner::new(p, config))
            })
            .collect();

        let first = players[0];
        world.record(GameEvent::TurnStarted {
            turn: 1,
            player: first,
        });
        info!(players = players.len(), "session started");

        let mut session = Self {
            world,
            players,
            planners,
            current: 0,
            turn: 1,
            winner: None,
        };
        session.check_winner();
        session
    }

    /// The board.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The board, for scripted moves between AI turns.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Player to act.
    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.players[self.current]
    }

    /// Turn counter, starting at 1.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Winner, once decided.
    #[must_use]
    pub const fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// Whether a winner has been decided.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// AI of `player`.
    #[must_use]
    pub fn planner(&self, player: PlayerId) -> Option<&StrategicPlanner> {
        self.planners.get(&player)
    }

    /// Let the current player's AI act. Does nothing once the match is over.
    pub fn play_ai_turn(&mut self) -> Option<TurnReport> {
        if self.is_over() {
            return None;
        }
        let player = self.current_player();
        let planner = self.planners.get_mut(&player)?;
        let report = planner.execute_turn(&mut self.world);
        debug!(
            turn = self.turn,
            %player,
            orders = report.orders.len(),
            produced = ?report.produced,
            "ai turn played"
        );
        self.check_winner();
        Some(report)
    }

    /// Finish the current player's turn and hand over to the next one.
    ///
    /// The finishing player's units are refreshed, the next player
    /// receives per-turn income, and the win condition is checked.
    pub fn end_turn(&mut self) {
        if self.is_over() {
            return;
        }
        let finished = self.current_player();
        self.world.refresh_units(finished);

        self.current = (self.current + 1) % self.players.len();
        if self.current == 0 {
            self.turn += 1;
        }
        let next = self.current_player();

        let income = self.world.rules().income_per_turn;
        if income > 0 {
            self.world.add_resources(next, income, None);
        }
        self.world.record(GameEvent::TurnStarted {
            turn: self.turn,
            player: next,
        });
        debug!(
            turn = self.turn,
            player = %next,
            state_hash = self.state_hash(),
            "turn started"
        );

        self.check_winner();
    }

    /// Alternate AI turns until someone wins or `max_turns` have been
    /// played. Returns the winner, if any.
    pub fn run_to_completion(&mut self, max_turns: u32) -> Option<PlayerId> {
        while !self.is_over() && self.turn <= max_turns {
            self.play_ai_turn();
            self.end_turn();
        }
        info!(
            turn = self.turn,
            winner = ?self.winner,
            "session finished"
        );
        self.winner
    }

    /// Hash of the world plus turn bookkeeping.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.world.state_hash().hash(&mut hasher);
        self.turn.hash(&mut hasher);
        self.current_player().hash(&mut hasher);
        self.winner.hash(&mut hasher);
        hasher.finish()
    }

    fn check_winner(&mut self) {
        if self.winner.is_some() {
            return;
        }
        if let Some(winner) = self.world.winner() {
            self.winner = Some(winner);
            self.world.record(GameEvent::GameWon { winner });
            info!(turn = self.turn, %winner, "base captured");
        }
    }
}
