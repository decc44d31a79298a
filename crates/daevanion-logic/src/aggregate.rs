//! Whole-character aggregation across boards.
//!
//! Runs the board optimizer once per eligible board and sums power. Boards
//! are independent, so the order of evaluation never matters.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::OptimizerConfig;
use crate::node::DaevanionNode;
use crate::optimizer::{optimize_board_with, OptimizationResult};

/// One board's nodes plus the ids the character has open on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardInput {
    pub nodes: Vec<DaevanionNode>,
    pub activated: BTreeSet<u32>,
}

/// Summed optimization outcome for a character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub total_current_power: u32,
    /// Never below `total_current_power`.
    pub total_optimized_power: u32,
    pub total_improvement: u32,
    /// Keyed by board name; ineligible boards are absent.
    pub board_results: BTreeMap<String, OptimizationResult>,
}

/// Optimize every eligible board with the default configuration.
pub fn optimize_all_boards(boards: &BTreeMap<String, BoardInput>) -> AggregateResult {
    optimize_all_boards_with(boards, &OptimizerConfig::default())
}

/// Optimize every eligible board. Ineligible names are skipped entirely.
pub fn optimize_all_boards_with(
    boards: &BTreeMap<String, BoardInput>,
    config: &OptimizerConfig,
) -> AggregateResult {
    let mut aggregate = AggregateResult::default();

    for (board_name, input) in boards {
        if !config.is_optimizable(board_name) {
            debug!("skipping board {board_name}");
            continue;
        }
        let result = optimize_board_with(&input.nodes, board_name, &input.activated, config);
        aggregate.total_current_power = aggregate
            .total_current_power
            .saturating_add(result.current_combat_power);
        aggregate.total_optimized_power = aggregate
            .total_optimized_power
            .saturating_add(result.optimized_combat_power);
        aggregate.board_results.insert(board_name.clone(), result);
    }

    aggregate.total_optimized_power = aggregate
        .total_optimized_power
        .max(aggregate.total_current_power);
    aggregate.total_improvement = aggregate.total_optimized_power - aggregate.total_current_power;
    aggregate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GradeCostTable;
    use crate::node::{Grade, NodeType};

    fn small_board(stranded: u32) -> BoardInput {
        let nodes = vec![
            DaevanionNode::start(1, 8, 8),
            DaevanionNode::new(2, 8, 9, Grade::Common, NodeType::Stat),
            DaevanionNode::new(3, 8, 10, Grade::Rare, NodeType::Stat),
            DaevanionNode::new(stranded, 1, 1, Grade::Unique, NodeType::Stat),
        ];
        BoardInput {
            nodes,
            activated: BTreeSet::from([1, 2, stranded]),
        }
    }

    #[test]
    fn test_sums_eligible_boards() {
        let boards = BTreeMap::from([
            ("네자칸".to_string(), small_board(10)),
            ("지켈".to_string(), small_board(11)),
        ]);
        let aggregate = optimize_all_boards(&boards);
        assert_eq!(aggregate.board_results.len(), 2);
        let current: u32 = aggregate
            .board_results
            .values()
            .map(|r| r.current_combat_power)
            .sum();
        assert_eq!(aggregate.total_current_power, current);
        assert_eq!(aggregate.total_current_power, 8);
        assert!(aggregate.total_optimized_power >= aggregate.total_current_power);
    }

    #[test]
    fn test_totals_saturate_on_huge_costs() {
        let config = OptimizerConfig {
            grade_costs: GradeCostTable {
                unique: u32::MAX / 2 + 1,
                ..Default::default()
            },
            ..OptimizerConfig::default()
        };
        let boards = BTreeMap::from([
            ("네자칸".to_string(), small_board(10)),
            ("지켈".to_string(), small_board(11)),
        ]);
        let aggregate = optimize_all_boards_with(&boards, &config);
        assert_eq!(aggregate.total_current_power, u32::MAX);
        assert_eq!(aggregate.total_optimized_power, u32::MAX);
        assert_eq!(aggregate.total_improvement, 0);
    }

    #[test]
    fn test_ineligible_boards_contribute_nothing() {
        let boards = BTreeMap::from([
            ("네자칸".to_string(), small_board(10)),
            ("아리엘".to_string(), small_board(11)),
            ("아스펠".to_string(), small_board(12)),
        ]);
        let aggregate = optimize_all_boards(&boards);
        assert_eq!(aggregate.board_results.len(), 1);
        assert!(!aggregate.board_results.contains_key("아리엘"));
        assert_eq!(aggregate.total_current_power, 4);
    }

    #[test]
    fn test_empty_input() {
        let aggregate = optimize_all_boards(&BTreeMap::new());
        assert_eq!(aggregate, AggregateResult::default());
    }

    #[test]
    fn test_custom_board_list() {
        let boards = BTreeMap::from([
            ("네자칸".to_string(), small_board(10)),
            ("아리엘".to_string(), small_board(11)),
        ]);
        let config = OptimizerConfig {
            optimizable_boards: vec!["아리엘".to_string()],
            ..OptimizerConfig::default()
        };
        let aggregate = optimize_all_boards_with(&boards, &config);
        assert_eq!(aggregate.board_results.keys().collect::<Vec<_>>(), vec!["아리엘"]);
    }
}
