//! Scenario loading and configuration.
//!
//! A scenario fixes everything about a match except the seed: map size,
//! rules, each player's AI knobs and the turn limit.

use std::collections::BTreeMap;
use std::path::Path;

use hex_core::config::{AiConfig, RulesConfig};
use hex_core::error::GameError;
use hex_core::map_generation::{generate, MapConfig};
use hex_core::session::Session;
use hex_core::unit::PlayerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Parsed, but the values are out of range.
    #[error("Invalid scenario: {0}")]
    Invalid(#[from] GameError),
    /// No built-in scenario by that name.
    #[error("Unknown scenario '{0}' (try skirmish, duel or frontier)")]
    Unknown(String),
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Map size and default seed.
    pub map: MapConfig,
    /// Match rules.
    pub rules: RulesConfig,
    /// AI configuration per player index. Missing entries use defaults.
    pub ai: Vec<AiConfig>,
    /// Match ends in a draw after this many turns.
    pub max_turns: u32,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::skirmish()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Resolve a CLI argument: a built-in name or a path to a RON file.
    pub fn resolve(name_or_path: &str) -> Result<Self, ScenarioError> {
        if let Some(scenario) = Self::named(name_or_path) {
            return Ok(scenario);
        }
        if name_or_path.ends_with(".ron") || Path::new(name_or_path).exists() {
            return Self::load(name_or_path);
        }
        Err(ScenarioError::Unknown(name_or_path.to_string()))
    }

    /// Built-in scenario by name.
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "skirmish" => Some(Self::skirmish()),
            "duel" => Some(Self::duel()),
            "frontier" => Some(Self::frontier()),
            _ => None,
        }
    }

    /// Standard 10x10 match with default AI on both sides.
    #[must_use]
    pub fn skirmish() -> Self {
        Self {
            name: "skirmish".to_string(),
            description: "Standard 10x10 skirmish, balanced AI on both sides".to_string(),
            map: MapConfig::default(),
            rules: RulesConfig::default(),
            ai: vec![AiConfig::default(), AiConfig::default()],
            max_turns: 100,
        }
    }

    /// Small board, aggressive player one against a defensive player two.
    #[must_use]
    pub fn duel() -> Self {
        Self {
            name: "duel".to_string(),
            description: "8x8 rush against turtle".to_string(),
            map: MapConfig::new(8, 8),
            ai: vec![
                AiConfig {
                    aggressiveness: 9,
                    ..AiConfig::default()
                },
                AiConfig {
                    aggressiveness: 2,
                    resource_priority: 8,
                    ..AiConfig::default()
                },
            ],
            max_turns: 60,
            ..Self::skirmish()
        }
    }

    /// Large board with a richer economy.
    #[must_use]
    pub fn frontier() -> Self {
        Self {
            name: "frontier".to_string(),
            description: "20x16 map, higher income, longer games".to_string(),
            map: MapConfig::new(20, 16),
            rules: RulesConfig {
                income_per_turn: 15,
                starting_units: 3,
                ..RulesConfig::default()
            },
            max_turns: 200,
            ..Self::skirmish()
        }
    }

    /// Check every AI configuration.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.map.width < 2 || self.map.height < 2 {
            return Err(GameError::InvalidState(format!(
                "map must be at least 2x2, got {}x{}",
                self.map.width, self.map.height
            )));
        }
        for config in &self.ai {
            config.validate()?;
        }
        Ok(())
    }

    /// AI configuration for `player`.
    #[must_use]
    pub fn ai_for(&self, player: PlayerId) -> AiConfig {
        self.ai
            .get(usize::from(player.0))
            .cloned()
            .unwrap_or_default()
    }

    /// Generate the map for `seed` and start a session on it.
    #[must_use]
    pub fn build_session(&self, seed: u64) -> Session {
        let world = generate(self.map.with_seed(seed), self.rules.clone());
        let configs: BTreeMap<PlayerId, AiConfig> = world
            .players()
            .map(|p| (p, self.ai_for(p)))
            .collect();
        Session::with_configs(world, configs)
    }
}
