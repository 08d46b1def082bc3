//! ASCII board renderer for terminal review.
//!
//! Rows are drawn in "odd-r" layout: odd rows are shifted half a cell to
//! the right so neighbors line up the way they do on the hex grid.

use std::fmt::Write as _;

use hex_core::grid::Cell;
use hex_core::hex::HexCoord;
use hex_core::session::Session;
use hex_core::unit::{PlayerId, Unit, UnitKind};
use hex_core::world::World;

/// ASCII rendering configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Show unit counts and resources under the board.
    pub show_legend: bool,
    /// Use colored output (ANSI).
    pub use_color: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            show_legend: true,
            use_color: true,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const BLUE: &str = "\x1b[34m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const GREEN: &str = "\x1b[32m";
    pub const GRAY: &str = "\x1b[90m";
    pub const CYAN: &str = "\x1b[36m";
}

/// Player one is uppercase, player two lowercase.
fn unit_char(unit: &Unit) -> char {
    let base = match unit.stats().kind {
        UnitKind::Infantry => 'I',
        UnitKind::Cavalry => 'C',
        UnitKind::Artillery => 'A',
    };
    if unit.owner() == PlayerId::ONE {
        base
    } else {
        base.to_ascii_lowercase()
    }
}

fn player_color(player: PlayerId) -> &'static str {
    if player == PlayerId::ONE {
        colors::BLUE
    } else {
        colors::YELLOW
    }
}

/// Glyph and optional color for one cell.
fn cell_glyph(world: &World, cell: &Cell) -> (char, Option<&'static str>) {
    if let Some(unit) = cell.occupant().and_then(|id| world.unit(id)) {
        return (unit_char(unit), Some(player_color(unit.owner())));
    }
    if cell.is_base {
        let owner = cell.owner.unwrap_or(PlayerId::ONE);
        let glyph = if owner == PlayerId::ONE { 'H' } else { 'h' };
        return (glyph, Some(player_color(owner)));
    }
    if cell.resource_node {
        return ('$', Some(colors::GREEN));
    }
    let glyph = cell.terrain().glyph();
    let color = match glyph {
        '~' => Some(colors::CYAN),
        '^' | 'f' => Some(colors::GRAY),
        _ => None,
    };
    (glyph, color)
}

/// Render the board.
#[must_use]
pub fn render_ascii(world: &World, config: &AsciiConfig) -> String {
    let grid = world.grid();
    let mut out = String::new();

    for row in 0..grid.height() as i32 {
        if row % 2 == 1 {
            out.push(' ');
        }
        for col in 0..grid.width() as i32 {
            let Some(cell) = grid.cell(HexCoord::from_offset(col, row)) else {
                out.push_str("  ");
                continue;
            };
            let (glyph, color) = cell_glyph(world, cell);
            match color {
                Some(color) if config.use_color => {
                    let _ = write!(out, "{color}{glyph}{}", colors::RESET);
                }
                _ => out.push(glyph),
            }
            out.push(' ');
        }
        let trimmed = out.trim_end_matches(' ').len();
        out.truncate(trimmed);
        out.push('\n');
    }

    if config.show_legend {
        out.push_str(&legend(world, config));
    }
    out
}

fn legend(world: &World, config: &AsciiConfig) -> String {
    let mut out = String::new();
    for player in world.players() {
        let line = format!(
            "{player}: {} units, {} resources",
            world.unit_count(player),
            world.resources_of(player)
        );
        if config.use_color {
            let _ = writeln!(
                out,
                "{}{}{line}{}",
                colors::BOLD,
                player_color(player),
                colors::RESET
            );
        } else {
            let _ = writeln!(out, "{line}");
        }
    }
    out.push_str(". plains  f forest  ^ mountain  ~ water  $ resource  H/h base\n");
    out
}

/// Render a session with a turn header.
#[must_use]
pub fn render_session(session: &Session, config: &AsciiConfig) -> String {
    let mut out = format!(
        "Turn {} - {} to act",
        session.turn(),
        session.current_player()
    );
    if let Some(winner) = session.winner() {
        let _ = write!(out, " - {winner} wins");
    }
    out.push('\n');
    out.push_str(&render_ascii(session.world(), config));
    out
}
