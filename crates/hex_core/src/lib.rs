//! # Hex Core
//!
//! Deterministic rules and AI for a two-player, turn-based hex skirmish.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness (map generation uses a seeded generator)
//! - No floating-point math (uses fixed-point)
//!
//! The same seed and configuration always replay the same match, which
//! is what the headless runner and the determinism tests rely on.
//!
//! ## Crate Structure
//!
//! - [`hex`], [`grid`], [`terrain`] - Board geometry and terrain
//! - [`pathfinding`] - Cost, cheapest and threat-aware path search
//! - [`influence`], [`waypoints`] - Board assessment for the AI
//! - [`behavior`], [`tactical`] - Behavior trees and per-unit control
//! - [`strategic`] - Per-player order assignment and production
//! - [`world`], [`session`] - Rules, units and match flow
//! - [`map_generation`] - Seeded map setup

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod behavior;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod hex;
pub mod influence;
pub mod map_generation;
pub mod math;
pub mod pathfinding;
pub mod session;
pub mod strategic;
pub mod tactical;
pub mod terrain;
pub mod unit;
pub mod waypoints;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::behavior::{BehaviorNode, NodeStatus};
    pub use crate::config::{AiConfig, RulesConfig};
    pub use crate::error::{GameError, Result};
    pub use crate::events::GameEvent;
    pub use crate::grid::{Cell, HexGrid};
    pub use crate::hex::{HexCoord, HexDirection};
    pub use crate::influence::InfluenceMap;
    pub use crate::map_generation::{generate, MapConfig};
    pub use crate::math::Fixed;
    pub use crate::pathfinding::{Path, Pathfinder, Threat};
    pub use crate::session::Session;
    pub use crate::strategic::{StrategicPlanner, TurnReport};
    pub use crate::tactical::{Order, UnitController};
    pub use crate::terrain::Terrain;
    pub use crate::unit::{MovementProfile, PlayerId, Unit, UnitId, UnitKind, UnitStats};
    pub use crate::waypoints::{Waypoint, WaypointCategory, WaypointSet};
    pub use crate::world::{AttackOutcome, World};
}
