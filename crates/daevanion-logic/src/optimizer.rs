//! Budget-constrained activation search for a single board.
//!
//! The player has already spent some points on a board. The optimizer takes
//! that same budget and re-spends it from scratch, growing a connected
//! activation outward from the start node:
//!
//! 1. Every playable node is ranked once: highest power-per-point first,
//!    cheaper first among equal efficiencies.
//! 2. The frontier holds unactivated candidates that share an edge with an
//!    activated cell. Each round opens the best-ranked frontier candidate
//!    that still fits the remaining budget, then adds its neighbours.
//! 3. An empty frontier is rebuilt from every activated cell; the walk ends
//!    when nothing fits, the budget is gone, or the round ceiling is hit.
//!
//! Greedy growth is not guaranteed optimal for grid reachability, so the
//! result is compared against the player's current activation and the
//! current one wins whenever it has more power. The recommendation is
//! therefore never worse than changing nothing.
//!
//! ```
//! use std::collections::BTreeSet;
//! use daevanion_logic::node::{DaevanionNode, Grade, NodeType};
//! use daevanion_logic::optimizer::optimize_board;
//!
//! let nodes = vec![
//!     DaevanionNode::start(1, 8, 8),
//!     DaevanionNode::new(2, 8, 9, Grade::Common, NodeType::Stat),
//!     DaevanionNode::new(3, 1, 1, Grade::Common, NodeType::Stat),
//! ];
//! // Node 3 is stranded in a corner; the point is better spent next to start.
//! let result = optimize_board(&nodes, "네자칸", &BTreeSet::from([1, 3]));
//! assert_eq!(result.recommendations.add, vec![2]);
//! assert_eq!(result.recommendations.remove, vec![3]);
//! assert_eq!(result.improvement, 0);
//! ```

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::config::{GradeCostTable, OptimizerConfig};
use crate::node::{neighbor_cells, DaevanionNode};

/// Node ids to open and to reset. The start node never appears in either list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    /// In the optimized set but not currently open (ascending).
    pub add: Vec<u32>,
    /// Currently open but not in the optimized set (ascending).
    pub remove: Vec<u32>,
}

/// Outcome of optimizing one board.
///
/// Ineligible and malformed boards produce `OptimizationResult::default()`:
/// no activation, zero power, no recommendations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    /// Points spent by the current activation. Also the optimizer's budget.
    pub total_points: u32,
    /// Power of the returned activation (same as `optimized_combat_power`).
    pub total_combat_power: u32,
    /// Optimized activation, start node included.
    pub activated_node_ids: BTreeSet<u32>,
    pub recommendations: Recommendations,
    pub current_combat_power: u32,
    pub optimized_combat_power: u32,
    /// `optimized - current`, never negative.
    pub improvement: u32,
}

impl OptimizationResult {
    /// True for the zero-valued result of a skipped board.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// The normalized current activation this result was computed from.
    pub fn current_node_ids(&self) -> BTreeSet<u32> {
        let mut ids = self.activated_node_ids.clone();
        for id in &self.recommendations.add {
            ids.remove(id);
        }
        ids.extend(self.recommendations.remove.iter().copied());
        ids
    }
}

/// Point cost of a node under the default grade table.
pub fn node_point_cost(node: &DaevanionNode) -> u32 {
    GradeCostTable::default().point_cost(node)
}

/// Combat power of a node under the default grade table.
pub fn node_combat_power(node: &DaevanionNode) -> u32 {
    GradeCostTable::default().combat_power(node)
}

/// Optimize one board with the default configuration.
pub fn optimize_board(
    nodes: &[DaevanionNode],
    board_name: &str,
    current: &BTreeSet<u32>,
) -> OptimizationResult {
    optimize_board_with(nodes, board_name, current, &OptimizerConfig::default())
}

/// Optimize one board.
///
/// `current` may or may not contain the start node; it is folded in either
/// way. Never fails: anything unusable degrades to the empty result.
pub fn optimize_board_with(
    nodes: &[DaevanionNode],
    board_name: &str,
    current: &BTreeSet<u32>,
    config: &OptimizerConfig,
) -> OptimizationResult {
    if !config.is_optimizable(board_name) {
        debug!("board {board_name} is not optimizable, skipping");
        return OptimizationResult::default();
    }
    let Some(start) = nodes.iter().find(|n| n.is_start()) else {
        warn!("board {board_name} has no start node, skipping");
        return OptimizationResult::default();
    };

    let table = &config.grade_costs;
    let mut by_id: HashMap<u32, &DaevanionNode> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        by_id.entry(node.node_id).or_insert(node);
    }
    let cost_of = |ids: &BTreeSet<u32>| -> u32 {
        ids.iter()
            .filter_map(|id| by_id.get(id))
            .map(|n| table.point_cost(n))
            .fold(0, u32::saturating_add)
    };
    let power_of = |ids: &BTreeSet<u32>| -> u32 {
        ids.iter()
            .filter_map(|id| by_id.get(id))
            .map(|n| table.combat_power(n))
            .fold(0, u32::saturating_add)
    };

    let mut current_ids = current.clone();
    current_ids.insert(start.node_id);
    let budget = cost_of(&current_ids);
    let current_power = power_of(&current_ids);

    let greedy = FrontierSearch::new(nodes, start, config).run(budget);
    let greedy_power = power_of(&greedy);

    let (optimized, optimized_power) = if greedy_power < current_power {
        debug!(
            "board {board_name}: greedy reached {greedy_power} < current {current_power}, keeping current"
        );
        (current_ids.clone(), current_power)
    } else {
        (greedy, greedy_power)
    };

    let add: Vec<u32> = optimized
        .difference(&current_ids)
        .filter(|&&id| id != start.node_id)
        .copied()
        .collect();
    let remove: Vec<u32> = current_ids
        .difference(&optimized)
        .filter(|&&id| id != start.node_id)
        .copied()
        .collect();

    debug!(
        "board {board_name}: budget {budget}, power {current_power} -> {optimized_power}, +{} -{}",
        add.len(),
        remove.len()
    );

    OptimizationResult {
        total_points: budget,
        total_combat_power: optimized_power,
        activated_node_ids: optimized,
        recommendations: Recommendations { add, remove },
        current_combat_power: current_power,
        optimized_combat_power: optimized_power,
        improvement: optimized_power.saturating_sub(current_power),
    }
}

/// A playable node with its derived cost and power.
struct Candidate<'a> {
    node: &'a DaevanionNode,
    cost: u32,
    power: u32,
}

/// Greedy frontier walk over one board. Candidates are referred to by rank,
/// their index in best-first order.
struct FrontierSearch<'a> {
    start: &'a DaevanionNode,
    ranked: Vec<Candidate<'a>>,
    /// (row, col) → ranks of candidates in that cell.
    cells: HashMap<(u32, u32), Vec<usize>>,
    max_rounds: u32,
}

impl<'a> FrontierSearch<'a> {
    fn new(nodes: &'a [DaevanionNode], start: &'a DaevanionNode, config: &OptimizerConfig) -> Self {
        let ranked = rank_candidates(nodes, start, &config.grade_costs, config.efficiency_tolerance);
        let mut cells: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
        for (rank, candidate) in ranked.iter().enumerate() {
            cells
                .entry((candidate.node.row, candidate.node.col))
                .or_default()
                .push(rank);
        }
        Self {
            start,
            ranked,
            cells,
            max_rounds: config.max_rounds,
        }
    }

    /// Spend at most `budget` points and return the activated ids.
    fn run(&self, budget: u32) -> BTreeSet<u32> {
        let mut activated = BTreeSet::from([self.start.node_id]);
        let mut activated_cells = vec![(self.start.row, self.start.col)];
        let mut taken = vec![false; self.ranked.len()];
        let mut frontier: BTreeSet<usize> = BTreeSet::new();
        let mut remaining = budget;
        let mut rounds = 0;

        while remaining > 0 && rounds < self.max_rounds {
            rounds += 1;

            if frontier.is_empty() {
                frontier = activated_cells
                    .iter()
                    .flat_map(|&(row, col)| self.adjacent_ranks(row, col))
                    .filter(|&rank| !taken[rank])
                    .collect();
                if frontier.is_empty() {
                    break;
                }
            }

            // Ranks are best-first, so the first fit is the best fit.
            let Some(rank) = frontier
                .iter()
                .copied()
                .find(|&rank| self.ranked[rank].cost <= remaining)
            else {
                break;
            };
            frontier.remove(&rank);
            taken[rank] = true;

            let pick = &self.ranked[rank];
            activated.insert(pick.node.node_id);
            activated_cells.push((pick.node.row, pick.node.col));
            remaining -= pick.cost;
            trace!(
                "round {rounds}: open node {} ({:?}, cost {}), {remaining} left",
                pick.node.node_id,
                pick.node.grade,
                pick.cost
            );

            frontier.extend(
                self.adjacent_ranks(pick.node.row, pick.node.col)
                    .filter(|&r| !taken[r]),
            );
        }

        if rounds >= self.max_rounds {
            debug!("expansion stopped at round ceiling {}", self.max_rounds);
        }
        activated
    }

    fn adjacent_ranks(&self, row: u32, col: u32) -> impl Iterator<Item = usize> + '_ {
        neighbor_cells(row, col)
            .filter_map(|cell| self.cells.get(&cell))
            .flatten()
            .copied()
    }
}

/// Playable, non-free nodes in best-first order: efficiency descending, then
/// cost ascending, then board order.
fn rank_candidates<'a>(
    nodes: &'a [DaevanionNode],
    start: &DaevanionNode,
    table: &GradeCostTable,
    tolerance: f64,
) -> Vec<Candidate<'a>> {
    let mut ranked: Vec<Candidate<'a>> = nodes
        .iter()
        .filter(|n| n.node_id != start.node_id && n.is_playable())
        .filter_map(|node| {
            let cost = table.point_cost(node);
            (cost > 0).then(|| Candidate {
                node,
                cost,
                power: table.combat_power(node),
            })
        })
        .collect();
    ranked.sort_by_key(|c| (Reverse(efficiency_bucket(c.power, c.cost, tolerance)), c.cost));
    ranked
}

/// Efficiency quantized to the tie tolerance, so near-equal values compare equal
/// and the ordering stays total.
fn efficiency_bucket(power: u32, cost: u32, tolerance: f64) -> i64 {
    let efficiency = power as f64 / cost as f64;
    (efficiency / tolerance).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Grade, NodeType};

    fn stat(id: u32, row: u32, col: u32, grade: Grade) -> DaevanionNode {
        DaevanionNode::new(id, row, col, grade, NodeType::Stat)
    }

    fn ids(list: &[u32]) -> BTreeSet<u32> {
        list.iter().copied().collect()
    }

    /// Start at (8,8) with one Common on each side and a Rare beyond the east Common.
    fn cross_board() -> Vec<DaevanionNode> {
        vec![
            DaevanionNode::start(1, 8, 8),
            stat(2, 7, 8, Grade::Common),
            stat(3, 9, 8, Grade::Common),
            stat(4, 8, 7, Grade::Common),
            stat(5, 8, 9, Grade::Common),
            stat(6, 8, 10, Grade::Rare),
        ]
    }

    #[test]
    fn test_ineligible_board_is_empty() {
        let result = optimize_board(&cross_board(), "아리엘", &ids(&[1, 2, 3]));
        assert!(result.is_empty());
        assert!(result.activated_node_ids.is_empty());
    }

    #[test]
    fn test_missing_start_is_empty() {
        let nodes = vec![stat(2, 7, 8, Grade::Common), stat(3, 9, 8, Grade::Common)];
        let result = optimize_board(&nodes, "네자칸", &ids(&[2]));
        assert!(result.is_empty());
    }

    #[test]
    fn test_zero_budget_keeps_only_start() {
        let result = optimize_board(&cross_board(), "네자칸", &BTreeSet::new());
        assert_eq!(result.activated_node_ids, ids(&[1]));
        assert_eq!(result.total_points, 0);
        assert_eq!(result.improvement, 0);
        assert!(result.recommendations.add.is_empty());
        assert!(result.recommendations.remove.is_empty());
    }

    #[test]
    fn test_start_folded_into_current() {
        let with_start = optimize_board(&cross_board(), "지켈", &ids(&[1, 2]));
        let without_start = optimize_board(&cross_board(), "지켈", &ids(&[2]));
        assert_eq!(with_start, without_start);
        assert!(with_start.activated_node_ids.contains(&1));
    }

    #[test]
    fn test_stranded_nodes_are_reallocated() {
        let mut nodes = cross_board();
        nodes.push(stat(20, 1, 1, Grade::Common));
        nodes.push(stat(21, 1, 3, Grade::Common));
        let result = optimize_board(&nodes, "바이젤", &ids(&[20, 21]));
        assert_eq!(result.total_points, 2);
        assert_eq!(result.current_combat_power, 2);
        assert_eq!(result.optimized_combat_power, 2);
        assert_eq!(result.recommendations.remove, vec![20, 21]);
        assert_eq!(result.recommendations.add.len(), 2);
        assert!(result
            .recommendations
            .add
            .iter()
            .all(|id| [2, 3, 4, 5].contains(id)));
    }

    #[test]
    fn test_cheaper_grade_wins_ties() {
        let nodes = vec![
            DaevanionNode::start(1, 8, 8),
            stat(2, 7, 8, Grade::Legend),
            stat(3, 9, 8, Grade::Rare),
            stat(4, 8, 9, Grade::Common),
            stat(5, 8, 10, Grade::Common),
            stat(10, 1, 1, Grade::Rare),
        ];
        // Budget 2 from the stranded Rare. Two Commons beat the adjacent Rare.
        let result = optimize_board(&nodes, "트리니엘", &ids(&[10]));
        assert_eq!(result.activated_node_ids, ids(&[1, 4, 5]));
        assert_eq!(result.recommendations.add, vec![4, 5]);
        assert_eq!(result.recommendations.remove, vec![10]);
    }

    #[test]
    fn test_expansion_goes_past_first_ring() {
        let nodes = cross_board();
        // 4 Commons around start + Rare behind the east one = 6 points.
        let result = optimize_board(&nodes, "네자칸", &ids(&[2, 3, 4, 5, 6]));
        assert_eq!(result.total_points, 6);
        assert_eq!(result.activated_node_ids, ids(&[1, 2, 3, 4, 5, 6]));
        assert!(result.recommendations.add.is_empty());
        assert!(result.recommendations.remove.is_empty());
    }

    #[test]
    fn test_unreachable_legend_falls_back_to_current() {
        // Two route Commons then a Legend; the budget of 5 sits on scattered Commons.
        let nodes = vec![
            DaevanionNode::start(1, 8, 8),
            stat(2, 8, 9, Grade::Common),
            stat(3, 8, 10, Grade::Common),
            stat(4, 8, 11, Grade::Legend),
            stat(10, 1, 1, Grade::Common),
            stat(11, 1, 3, Grade::Common),
            stat(12, 1, 5, Grade::Common),
            stat(13, 3, 1, Grade::Common),
            stat(14, 3, 3, Grade::Common),
        ];
        let current = ids(&[10, 11, 12, 13, 14]);
        let result = optimize_board(&nodes, "네자칸", &current);
        assert_eq!(result.current_combat_power, 5);
        assert_eq!(result.optimized_combat_power, 5);
        assert_eq!(result.improvement, 0);
        assert_eq!(result.activated_node_ids, ids(&[1, 10, 11, 12, 13, 14]));
        assert!(result.recommendations.add.is_empty());
        assert!(result.recommendations.remove.is_empty());
    }

    #[test]
    fn test_round_ceiling_triggers_fallback() {
        let nodes = vec![
            DaevanionNode::start(1, 8, 8),
            stat(2, 8, 9, Grade::Common),
            stat(3, 8, 10, Grade::Common),
            stat(4, 8, 11, Grade::Common),
        ];
        let config = OptimizerConfig {
            max_rounds: 1,
            ..OptimizerConfig::default()
        };
        let result = optimize_board_with(&nodes, "네자칸", &ids(&[2, 3, 4]), &config);
        assert_eq!(result.activated_node_ids, ids(&[1, 2, 3, 4]));
        assert_eq!(result.improvement, 0);
    }

    #[test]
    fn test_empty_cells_never_activated() {
        let nodes = vec![
            DaevanionNode::start(1, 8, 8),
            stat(2, 8, 9, Grade::None),
            DaevanionNode::new(3, 7, 8, Grade::Common, NodeType::None),
            stat(4, 9, 8, Grade::Common),
            stat(10, 1, 1, Grade::Rare),
        ];
        let result = optimize_board(&nodes, "네자칸", &ids(&[10]));
        assert!(!result.activated_node_ids.contains(&2));
        assert!(!result.activated_node_ids.contains(&3));
    }

    #[test]
    fn test_empty_cell_blocks_path() {
        let nodes = vec![
            DaevanionNode::start(1, 8, 8),
            stat(2, 8, 9, Grade::None),
            stat(3, 8, 10, Grade::Common),
            stat(10, 1, 1, Grade::Common),
        ];
        let result = optimize_board(&nodes, "네자칸", &ids(&[10]));
        // Node 3 is only reachable through the empty cell, so the current set stays.
        assert_eq!(result.activated_node_ids, ids(&[1, 10]));
    }

    #[test]
    fn test_unknown_current_ids_are_free() {
        let result = optimize_board(&cross_board(), "네자칸", &ids(&[2, 999]));
        assert_eq!(result.total_points, 1);
        assert_eq!(result.current_combat_power, 1);
        assert!(result.recommendations.remove.contains(&999));
    }

    #[test]
    fn test_current_ids_roundtrip_through_diff() {
        let mut nodes = cross_board();
        nodes.push(stat(20, 1, 1, Grade::Rare));
        let current = ids(&[1, 2, 20]);
        let result = optimize_board(&nodes, "지켈", &current);
        assert_eq!(result.current_node_ids(), current);
    }

    #[test]
    fn test_ranking_order() {
        let nodes = vec![
            DaevanionNode::start(1, 8, 8),
            stat(2, 1, 1, Grade::Legend),
            stat(3, 1, 2, Grade::Common),
            stat(4, 1, 3, Grade::Unique),
            stat(5, 1, 4, Grade::Rare),
            stat(6, 1, 5, Grade::None),
        ];
        let ranked = rank_candidates(&nodes, &nodes[0], &GradeCostTable::default(), 0.001);
        let order: Vec<u32> = ranked.iter().map(|c| c.node.node_id).collect();
        assert_eq!(order, vec![3, 5, 4, 2]);
    }

    #[test]
    fn test_oversized_costs_saturate() {
        let config = OptimizerConfig {
            grade_costs: GradeCostTable {
                legend: u32::MAX / 2 + 1,
                ..GradeCostTable::default()
            },
            ..OptimizerConfig::default()
        };
        let nodes = vec![
            DaevanionNode::start(1, 8, 8),
            stat(2, 8, 9, Grade::Legend),
            stat(3, 8, 10, Grade::Legend),
        ];
        let result = optimize_board_with(&nodes, "네자칸", &ids(&[2, 3]), &config);
        assert_eq!(result.total_points, u32::MAX);
        assert_eq!(result.current_combat_power, u32::MAX);
        // Greedy affords one Legend only, so the current activation stands.
        assert_eq!(result.activated_node_ids, ids(&[1, 2, 3]));
        assert_eq!(result.improvement, 0);
    }

    #[test]
    fn test_tolerance_does_not_change_result() {
        let nodes = cross_board();
        let current = ids(&[2, 3, 6]);
        let coarse = OptimizerConfig {
            efficiency_tolerance: 0.5,
            ..OptimizerConfig::default()
        };
        assert_eq!(
            optimize_board_with(&nodes, "바이젤", &current, &coarse),
            optimize_board(&nodes, "바이젤", &current)
        );
    }

    #[test]
    fn test_default_cost_helpers() {
        let legend = stat(1, 1, 1, Grade::Legend);
        assert_eq!(node_point_cost(&legend), 5);
        assert_eq!(node_combat_power(&legend), 5);
        assert_eq!(node_point_cost(&DaevanionNode::start(2, 8, 8)), 0);
    }
}
