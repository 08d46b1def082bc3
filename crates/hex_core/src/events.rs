//! Structured log of everything that changed the world.
//!
//! The world appends to this as it mutates; the session and headless
//! runner drain it for replays, metrics and tracing output.

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::unit::{PlayerId, UnitId, UnitKind};

/// Something that happened during play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A unit entered play.
    UnitSpawned {
        /// New unit.
        unit: UnitId,
        /// Its archetype.
        kind: UnitKind,
        /// Owning player.
        owner: PlayerId,
        /// Where it appeared.
        cell: HexCoord,
    },
    /// A unit moved along a path.
    UnitMoved {
        /// Moving unit.
        unit: UnitId,
        /// Origin cell.
        from: HexCoord,
        /// Destination cell.
        to: HexCoord,
        /// Whole movement points spent.
        points: u32,
    },
    /// A unit attacked another.
    UnitAttacked {
        /// Attacker.
        attacker: UnitId,
        /// Target.
        target: UnitId,
        /// Damage dealt.
        damage: u32,
        /// Target health afterwards.
        remaining_health: u32,
    },
    /// A unit was destroyed and removed.
    UnitDestroyed {
        /// Removed unit.
        unit: UnitId,
        /// Its owner.
        owner: PlayerId,
        /// Cell it stood on.
        cell: HexCoord,
    },
    /// A player gained resources.
    ResourcesCollected {
        /// Receiving player.
        player: PlayerId,
        /// Amount gained.
        amount: u32,
        /// Where they were collected, `None` for per-turn income.
        cell: Option<HexCoord>,
    },
    /// A player spent resources.
    ResourcesSpent {
        /// Paying player.
        player: PlayerId,
        /// Amount spent.
        amount: u32,
    },
    /// A unit's standing order changed.
    OrderChanged {
        /// Affected unit.
        unit: UnitId,
        /// New order name.
        order: String,
        /// Order target, if any.
        target: Option<HexCoord>,
    },
    /// A new turn began.
    TurnStarted {
        /// Turn counter.
        turn: u32,
        /// Player to act.
        player: PlayerId,
    },
    /// A player captured the enemy base.
    GameWon {
        /// Winning player.
        winner: PlayerId,
    },
}
