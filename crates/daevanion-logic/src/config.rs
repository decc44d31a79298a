//! Optimizer configuration — grade cost table, eligible boards, search limits.
//!
//! The grade → point cost mapping is data, not logic: swapping the table
//! changes what the optimizer recommends without touching the search.
//! Power is always one per point spent.
//!
//! ```
//! use daevanion_logic::config::{validate_config, OptimizerConfig};
//!
//! let config = OptimizerConfig::default();
//! assert!(validate_config(&config).is_empty());
//! assert!(config.is_optimizable("지켈"));
//! assert!(!config.is_optimizable("아리엘"));
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{
    point_costs, BOARD_NAMES, EFFICIENCY_TOLERANCE, MAX_EXPANSION_ROUNDS, MAX_GRADE_COST,
    OPTIMIZABLE_BOARDS,
};
use crate::node::{DaevanionNode, Grade};

/// Point cost per playable grade. `Grade::None` always costs 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeCostTable {
    pub common: u32,
    pub rare: u32,
    pub unique: u32,
    pub legend: u32,
}

impl Default for GradeCostTable {
    fn default() -> Self {
        Self {
            common: point_costs::COMMON,
            rare: point_costs::RARE,
            unique: point_costs::UNIQUE,
            legend: point_costs::LEGEND,
        }
    }
}

impl GradeCostTable {
    pub fn grade_cost(&self, grade: Grade) -> u32 {
        match grade {
            Grade::Common => self.common,
            Grade::Rare => self.rare,
            Grade::Unique => self.unique,
            Grade::Legend => self.legend,
            Grade::None => 0,
        }
    }

    /// Points needed to open `node`. Start and empty cells are free.
    pub fn point_cost(&self, node: &DaevanionNode) -> u32 {
        if node.is_playable() {
            self.grade_cost(node.grade)
        } else {
            0
        }
    }

    /// Combat power granted by `node` (one per point).
    pub fn combat_power(&self, node: &DaevanionNode) -> u32 {
        self.point_cost(node)
    }
}

/// Tunables for a board optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub grade_costs: GradeCostTable,
    /// Board names eligible for optimization; every other board yields an empty result.
    pub optimizable_boards: Vec<String>,
    /// Safety stop for the expansion loop.
    pub max_rounds: u32,
    /// Efficiency tie tolerance used when ranking candidates. Power is one per
    /// point, so every candidate has efficiency 1.0 and this never changes a
    /// result; ranking then falls through to cost.
    pub efficiency_tolerance: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            grade_costs: GradeCostTable::default(),
            optimizable_boards: OPTIMIZABLE_BOARDS.iter().map(|s| s.to_string()).collect(),
            max_rounds: MAX_EXPANSION_ROUNDS,
            efficiency_tolerance: EFFICIENCY_TOLERANCE,
        }
    }
}

impl OptimizerConfig {
    pub fn is_optimizable(&self, board_name: &str) -> bool {
        self.optimizable_boards.iter().any(|b| b == board_name)
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// No board would ever be optimized.
    NoOptimizableBoards,
    /// Board name isn't one of the canonical six.
    UnknownBoard(String),
    /// Same board listed twice.
    DuplicateBoard(String),
    /// A playable grade costs nothing, so it could never be recommended.
    FreeGrade(Grade),
    /// Grade cost above `MAX_GRADE_COST`.
    GradeCostTooHigh(Grade, u32),
    /// Expansion could never run.
    ZeroRoundCeiling,
    /// Tolerance must be finite and positive.
    InvalidTolerance(f64),
}

/// Validate an optimizer configuration, returning all errors found.
pub fn validate_config(config: &OptimizerConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.optimizable_boards.is_empty() {
        errors.push(ConfigError::NoOptimizableBoards);
    }
    for (i, board) in config.optimizable_boards.iter().enumerate() {
        if !BOARD_NAMES.contains(&board.as_str()) {
            errors.push(ConfigError::UnknownBoard(board.clone()));
        }
        if config.optimizable_boards[..i].contains(board) {
            errors.push(ConfigError::DuplicateBoard(board.clone()));
        }
    }

    for grade in Grade::PLAYABLE {
        let cost = config.grade_costs.grade_cost(grade);
        if cost == 0 {
            errors.push(ConfigError::FreeGrade(grade));
        } else if cost > MAX_GRADE_COST {
            errors.push(ConfigError::GradeCostTooHigh(grade, cost));
        }
    }

    if config.max_rounds == 0 {
        errors.push(ConfigError::ZeroRoundCeiling);
    }
    if !config.efficiency_tolerance.is_finite() || config.efficiency_tolerance <= 0.0 {
        errors.push(ConfigError::InvalidTolerance(config.efficiency_tolerance));
    }

    errors
}
