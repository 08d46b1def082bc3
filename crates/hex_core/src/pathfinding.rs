//! Hex-grid pathfinding: cost A*, Dijkstra and tactical A*.
//!
//! All three variants share one best-first search over a binary heap.
//! They differ only in the priority they assign to open nodes, the
//! passability rule, and (for tactical search) an iteration cap.
//! Costs are fixed-point so identical inputs give identical paths on
//! every platform.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::{debug, trace};

use crate::grid::{Cell, HexGrid};
use crate::hex::HexCoord;
use crate::math::{Fixed, HALF};
use crate::unit::{MovementProfile, PlayerId};

/// Node budget for tactical searches.
pub const TACTICAL_MAX_ITERATIONS: usize = 200;

/// Weight applied to the danger score of a cell.
const DANGER_WEIGHT: Fixed = Fixed::const_from_int(2);

/// Weight applied to stepping on disliked terrain.
const TERRAIN_DISLIKE_WEIGHT: Fixed = HALF;

/// Danger from standing inside an enemy's attack range.
const IN_RANGE_DANGER: u32 = 5;

/// Danger from standing just outside an enemy's attack range.
const NEAR_RANGE_DANGER: u32 = 2;

/// How far beyond attack range a cell still counts as near.
const NEAR_RANGE_MARGIN: u32 = 2;

/// An enemy position that tactical search steers around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threat {
    /// Where the enemy stands.
    pub cell: HexCoord,
    /// The enemy's attack range.
    pub attack_range: u32,
}

/// Danger score of standing on `coord`, summed over every threat.
#[must_use]
pub fn danger_at(coord: HexCoord, threats: &[Threat]) -> u32 {
    threats
        .iter()
        .map(|threat| {
            let distance = coord.distance(threat.cell);
            if distance <= threat.attack_range {
                IN_RANGE_DANGER
            } else if distance <= threat.attack_range + NEAR_RANGE_MARGIN {
                NEAR_RANGE_DANGER
            } else {
                0
            }
        })
        .sum()
}

/// A found path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    cells: Vec<HexCoord>,
    /// Accumulated movement cost on arrival at each cell; `costs[0]` is zero.
    costs: Vec<Fixed>,
}

impl Path {
    fn single(cell: HexCoord) -> Self {
        Self {
            cells: vec![cell],
            costs: vec![Fixed::ZERO],
        }
    }

    /// Cells from start to goal, both included.
    #[must_use]
    pub fn cells(&self) -> &[HexCoord] {
        &self.cells
    }

    /// Total movement cost, excluding the start cell.
    #[must_use]
    pub fn cost(&self) -> Fixed {
        self.costs.last().copied().unwrap_or(Fixed::ZERO)
    }

    /// Movement cost of reaching `self.cells()[index]`.
    #[must_use]
    pub fn cost_to(&self, index: usize) -> Option<Fixed> {
        self.costs.get(index).copied()
    }

    /// Number of cells, start included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: a path contains at least its start.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// First cell.
    #[must_use]
    pub fn start(&self) -> Option<HexCoord> {
        self.cells.first().copied()
    }

    /// Last cell.
    #[must_use]
    pub fn goal(&self) -> Option<HexCoord> {
        self.cells.last().copied()
    }
}

/// Rules that distinguish one search variant from another.
trait SearchPolicy {
    /// Short name for logs.
    const NAME: &'static str;

    /// Whether a non-goal cell may be entered.
    fn passable(&self, cell: &Cell) -> bool;

    /// Open-set ordering key: lower is expanded first.
    fn priority(&self, g: Fixed, h: Fixed, cell: &Cell) -> (Fixed, Fixed);

    /// Whether the heuristic is used at all.
    fn informed(&self) -> bool {
        true
    }

    /// Maximum node expansions, if bounded.
    fn max_iterations(&self) -> Option<usize> {
        None
    }
}

struct CostSearch;

impl SearchPolicy for CostSearch {
    const NAME: &'static str = "astar";

    fn passable(&self, cell: &Cell) -> bool {
        cell.is_passable()
    }

    fn priority(&self, g: Fixed, h: Fixed, _cell: &Cell) -> (Fixed, Fixed) {
        (g + h, h)
    }
}

struct CheapestSearch {
    player: PlayerId,
}

impl SearchPolicy for CheapestSearch {
    const NAME: &'static str = "dijkstra";

    fn passable(&self, cell: &Cell) -> bool {
        cell.is_passable_for(self.player)
    }

    fn priority(&self, g: Fixed, _h: Fixed, _cell: &Cell) -> (Fixed, Fixed) {
        (g, Fixed::ZERO)
    }

    fn informed(&self) -> bool {
        false
    }
}

struct TacticalSearch<'t> {
    threats: &'t [Threat],
    profile: MovementProfile,
}

impl TacticalSearch<'_> {
    fn tactical_cost(&self, cell: &Cell) -> Fixed {
        let danger = Fixed::from_num(danger_at(cell.coord(), self.threats));
        let mut cost = danger * DANGER_WEIGHT;
        if self.profile.affinity.dislikes(cell.terrain()) {
            cost += TERRAIN_DISLIKE_WEIGHT;
        }
        cost
    }
}

impl SearchPolicy for TacticalSearch<'_> {
    const NAME: &'static str = "tactical";

    fn passable(&self, cell: &Cell) -> bool {
        cell.is_passable()
    }

    fn priority(&self, g: Fixed, h: Fixed, cell: &Cell) -> (Fixed, Fixed) {
        (g + h + self.tactical_cost(cell), Fixed::ZERO)
    }

    fn max_iterations(&self) -> Option<usize> {
        Some(TACTICAL_MAX_ITERATIONS)
    }
}

/// An entry in the open set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    coord: HexCoord,
    primary: Fixed,
    secondary: Fixed,
    /// Insertion sequence; earlier entries win remaining ties.
    seq: u64,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse everything for min-first.
        other
            .primary
            .cmp(&self.primary)
            .then_with(|| other.secondary.cmp(&self.secondary))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Path queries against a borrowed grid.
#[derive(Debug, Clone, Copy)]
pub struct Pathfinder<'g> {
    grid: &'g HexGrid,
}

impl<'g> Pathfinder<'g> {
    /// Create a pathfinder over `grid`.
    #[must_use]
    pub const fn new(grid: &'g HexGrid) -> Self {
        Self { grid }
    }

    /// Cheapest path by movement cost using A*.
    ///
    /// Occupied and water cells are skipped, except that the goal itself
    /// may be occupied (it is the target of an approach, not a stop).
    #[must_use]
    pub fn find_path(
        &self,
        start: HexCoord,
        goal: HexCoord,
        profile: &MovementProfile,
    ) -> Option<Path> {
        self.search(start, goal, profile, &CostSearch)
    }

    /// Cheapest path by plain Dijkstra, honoring player-specific rules
    /// (a player's own base blocks its units).
    #[must_use]
    pub fn find_cheapest_path(
        &self,
        start: HexCoord,
        goal: HexCoord,
        player: PlayerId,
        profile: &MovementProfile,
    ) -> Option<Path> {
        self.search(start, goal, profile, &CheapestSearch { player })
    }

    /// A* that also avoids enemy threat ranges and disliked terrain.
    ///
    /// Gives up after [`TACTICAL_MAX_ITERATIONS`] expansions.
    #[must_use]
    pub fn find_tactical_path(
        &self,
        start: HexCoord,
        goal: HexCoord,
        profile: &MovementProfile,
        threats: &[Threat],
    ) -> Option<Path> {
        let policy = TacticalSearch {
            threats,
            profile: *profile,
        };
        self.search(start, goal, profile, &policy)
    }

    fn search<P: SearchPolicy>(
        &self,
        start: HexCoord,
        goal: HexCoord,
        profile: &MovementProfile,
        policy: &P,
    ) -> Option<Path> {
        let start_cell = self.grid.cell(start)?;
        self.grid.cell(goal)?;

        if start == goal {
            return Some(Path::single(start));
        }

        let min_step = profile.min_step_cost();
        let heuristic = |coord: HexCoord| {
            if policy.informed() {
                Fixed::from_num(coord.distance(goal)) * min_step
            } else {
                Fixed::ZERO
            }
        };

        let mut open = BinaryHeap::new();
        let mut g_score: HashMap<HexCoord, Fixed> = HashMap::new();
        let mut came_from: HashMap<HexCoord, HexCoord> = HashMap::new();
        let mut closed: HashSet<HexCoord> = HashSet::new();
        let mut seq = 0_u64;

        let (primary, secondary) = policy.priority(Fixed::ZERO, heuristic(start), start_cell);
        g_score.insert(start, Fixed::ZERO);
        open.push(OpenNode {
            coord: start,
            primary,
            secondary,
            seq,
        });

        let mut iterations = 0_usize;
        while let Some(current) = open.pop() {
            // Superseded entry for a node already expanded.
            if closed.contains(&current.coord) {
                continue;
            }
            if policy.max_iterations().is_some_and(|cap| iterations >= cap) {
                debug!(
                    search = P::NAME,
                    %start,
                    %goal,
                    iterations,
                    "search hit iteration cap"
                );
                return None;
            }
            iterations += 1;

            if current.coord == goal {
                let path = reconstruct_path(&came_from, &g_score, goal);
                debug!(
                    search = P::NAME,
                    %start,
                    %goal,
                    cells = path.len(),
                    cost = %path.cost(),
                    iterations,
                    "path found"
                );
                return Some(path);
            }

            closed.insert(current.coord);
            let current_g = g_score.get(&current.coord).copied().unwrap_or(Fixed::MAX);
            trace!(search = P::NAME, cell = %current.coord, g = %current_g, "expand");

            for neighbor in self.grid.neighbors(current.coord) {
                let coord = neighbor.coord();
                if closed.contains(&coord) {
                    continue;
                }
                if coord != goal && !policy.passable(neighbor) {
                    continue;
                }
                let Some(step) = profile.step_cost(neighbor.terrain()) else {
                    continue;
                };

                let tentative = current_g + step;
                let known = g_score.get(&coord).copied().unwrap_or(Fixed::MAX);
                if tentative < known {
                    g_score.insert(coord, tentative);
                    came_from.insert(coord, current.coord);

                    seq += 1;
                    let (primary, secondary) =
                        policy.priority(tentative, heuristic(coord), neighbor);
                    open.push(OpenNode {
                        coord,
                        primary,
                        secondary,
                        seq,
                    });
                }
            }
        }

        debug!(
            search = P::NAME,
            %start,
            %goal,
            iterations,
            explored = closed.len(),
            "no path"
        );
        None
    }
}

/// Walk the parent links back from `goal`.
fn reconstruct_path(
    came_from: &HashMap<HexCoord, HexCoord>,
    g_score: &HashMap<HexCoord, Fixed>,
    goal: HexCoord,
) -> Path {
    let mut cells = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        cells.push(prev);
        current = prev;
    }
    cells.reverse();

    let costs = cells
        .iter()
        .map(|c| g_score.get(c).copied().unwrap_or(Fixed::ZERO))
        .collect();

    Path { cells, costs }
}
