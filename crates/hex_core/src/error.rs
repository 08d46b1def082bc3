//! Error types for the game simulation.

use thiserror::Error;

use crate::hex::HexCoord;
use crate::unit::UnitId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
///
/// None of these are fatal: the AI layer treats every variant as
/// "operation not permitted" and falls back to another behavior.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Invalid unit identifier.
    #[error("Invalid unit ID: {0}")]
    InvalidUnitId(UnitId),

    /// Coordinate does not name a cell of the grid.
    #[error("No cell at {0}")]
    CellNotFound(HexCoord),

    /// Target cell is impassable or already occupied.
    #[error("Cell {0} cannot be entered")]
    CellBlocked(HexCoord),

    /// Movement rejected (budget, lock, or unreachable target).
    #[error("Unit {unit} cannot move to {target}: {reason}")]
    MoveNotPermitted {
        /// Unit that tried to move.
        unit: UnitId,
        /// Requested destination.
        target: HexCoord,
        /// Why the move was rejected.
        reason: &'static str,
    },

    /// Attack rejected (range, ownership, or once-per-turn latch).
    #[error("Unit {attacker} cannot attack unit {target}")]
    AttackNotPermitted {
        /// Attacking unit.
        attacker: UnitId,
        /// Intended target.
        target: UnitId,
    },

    /// Insufficient resources.
    #[error("Insufficient resources: need {required}, have {available}")]
    InsufficientResources {
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// Data file parsing error.
    #[error("Failed to parse {what}: {message}")]
    DataParseError {
        /// Which document failed to parse.
        what: String,
        /// Error message.
        message: String,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
