//! Board constants — grid size, board names, class board ranges, search limits.
//!
//! These are plain constants with no network or rendering dependency.
//! Both the optimizer and the headless harness read them.

/// Rows and columns of every Daevanion board grid (1-based coordinates).
pub const GRID_SIZE: u32 = 15;

/// Canonical board names, indexed by `board_id - class_range.start`.
pub const BOARD_NAMES: [&str; 6] = ["네자칸", "지켈", "바이젤", "트리니엘", "아리엘", "아스펠"];

/// Boards the optimizer will touch. 아리엘 and 아스펠 are excluded.
pub const OPTIMIZABLE_BOARDS: [&str; 4] = ["네자칸", "지켈", "바이젤", "트리니엘"];

/// Upper bound on expansion rounds. Each round activates at most one node,
/// so this exceeds the cell count of a full grid.
pub const MAX_EXPANSION_ROUNDS: u32 = 256;

/// Two efficiencies closer than this are treated as equal.
pub const EFFICIENCY_TOLERANCE: f64 = 0.001;

/// Board ids loaded when a character's class can't be resolved (치유성).
pub const DEFAULT_BOARD_RANGE: (u32, u32) = (71, 76);

/// Largest point cost a grade may be configured with. Keeps board totals
/// far below `u32::MAX` for any 15×15 grid.
pub const MAX_GRADE_COST: u32 = 1_000;

pub mod point_costs {
    pub const COMMON: u32 = 1;
    pub const RARE: u32 = 2;
    pub const UNIQUE: u32 = 3;
    pub const LEGEND: u32 = 5;
}
