//! Tunable AI and rules parameters.
//!
//! Both structs deserialize from RON with every field optional, so a
//! config file only needs to name what it overrides:
//!
//! ```
//! use hex_core::config::AiConfig;
//!
//! let config = AiConfig::from_ron_str("(aggressiveness: 8)").unwrap();
//! assert_eq!(config.aggressiveness, 8);
//! assert_eq!(config.rally_points, 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::unit::UnitKind;

/// Strategic and tactical AI knobs for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// 0..=10. At 7 or more a stronger AI sends everyone at the enemy base.
    pub aggressiveness: u32,
    /// 0..=10. Weight given to gathering when resources run low.
    pub resource_priority: u32,
    /// Resources below which the AI considers sending gatherers.
    pub low_resource_threshold: u32,
    /// Maximum movement cost influence propagates over.
    pub influence_range: u32,
    /// Number of rally waypoints picked each refresh.
    pub rally_points: usize,
    /// Resources needed before the AI produces a unit.
    pub production_threshold: u32,
    /// Minimum turns between two productions.
    pub production_cooldown: u32,
    /// What the AI produces.
    pub production_unit: UnitKind,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            aggressiveness: 5,
            resource_priority: 5,
            low_resource_threshold: 50,
            influence_range: 8,
            rally_points: 3,
            production_threshold: 30,
            production_cooldown: 2,
            production_unit: UnitKind::Infantry,
        }
    }
}

impl AiConfig {
    /// Parse from a RON string.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] on malformed input or
    /// out-of-range values.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron).map_err(|e| GameError::DataParseError {
            what: "AI config".into(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] naming the bad field.
    pub fn validate(&self) -> Result<()> {
        let bad = |field: &str, message: &str| GameError::DataParseError {
            what: format!("AI config field `{field}`"),
            message: message.into(),
        };
        if self.aggressiveness > 10 {
            return Err(bad("aggressiveness", "must be between 0 and 10"));
        }
        if self.resource_priority > 10 {
            return Err(bad("resource_priority", "must be between 0 and 10"));
        }
        if self.influence_range == 0 {
            return Err(bad("influence_range", "must be positive"));
        }
        Ok(())
    }
}

/// Match rules that are not AI decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Resources each player starts with.
    pub starting_resources: u32,
    /// Resources granted at the start of each player's turn.
    pub income_per_turn: u32,
    /// Resources gained by stepping onto a resource node.
    pub resource_node_yield: u32,
    /// Infantry placed next to each base at setup.
    pub starting_units: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            starting_resources: 100,
            income_per_turn: 10,
            resource_node_yield: 10,
            starting_units: 2,
        }
    }
}

impl RulesConfig {
    /// Parse from a RON string.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] on malformed input.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        ron::from_str(ron).map_err(|e| GameError::DataParseError {
            what: "rules config".into(),
            message: e.to_string(),
        })
    }
}
