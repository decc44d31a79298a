//! Presentation-ready views of an optimization result.
//!
//! Turns id lists into rows a board card can show directly (name, point
//! cost, power delta, headline effect) and tallies per-grade counts for
//! the summary header.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::GradeCostTable;
use crate::node::{DaevanionNode, Grade};
use crate::optimizer::OptimizationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationKind {
    Add,
    Remove,
}

/// One row of the add/remove recommendation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedNode {
    pub node_id: u32,
    pub name: String,
    pub kind: RecommendationKind,
    pub point_cost: u32,
    /// Positive for additions, negative for removals.
    pub power_delta: i64,
    /// First line of the node's effect text, if it has any.
    pub headline_effect: Option<String>,
}

/// Node name, or `노드 {id}` when the payload left it blank.
pub fn display_name(node: &DaevanionNode) -> String {
    if node.name.trim().is_empty() {
        format!("노드 {}", node.node_id)
    } else {
        node.name.clone()
    }
}

/// Rows for every recommended id that resolves to a node: additions first,
/// then removals. Unresolvable ids are dropped.
pub fn recommendation_rows(
    result: &OptimizationResult,
    nodes: &[DaevanionNode],
    table: &GradeCostTable,
) -> Vec<RecommendedNode> {
    let adds = result
        .recommendations
        .add
        .iter()
        .map(|&id| (id, RecommendationKind::Add));
    let removes = result
        .recommendations
        .remove
        .iter()
        .map(|&id| (id, RecommendationKind::Remove));

    adds.chain(removes)
        .filter_map(|(id, kind)| {
            let node = nodes.iter().find(|n| n.node_id == id)?;
            let power = i64::from(table.combat_power(node));
            Some(RecommendedNode {
                node_id: id,
                name: display_name(node),
                kind,
                point_cost: table.point_cost(node),
                power_delta: match kind {
                    RecommendationKind::Add => power,
                    RecommendationKind::Remove => -power,
                },
                headline_effect: node.effect_list.first().map(|e| e.desc.clone()),
            })
        })
        .collect()
}

/// Activated node count per playable grade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeCounts {
    pub common: u32,
    pub rare: u32,
    pub unique: u32,
    pub legend: u32,
}

impl GradeCounts {
    fn tally<'a>(nodes: impl Iterator<Item = &'a DaevanionNode>) -> Self {
        let mut counts = Self::default();
        for node in nodes.filter(|n| n.is_playable()) {
            match node.grade {
                Grade::Common => counts.common += 1,
                Grade::Rare => counts.rare += 1,
                Grade::Unique => counts.unique += 1,
                Grade::Legend => counts.legend += 1,
                Grade::None => {}
            }
        }
        counts
    }

    pub fn total(&self) -> u32 {
        self.common + self.rare + self.unique + self.legend
    }
}

/// Summary header for one board card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub budget: u32,
    /// Points the optimized activation spends.
    pub optimized_points: u32,
    /// Budget left over after the optimized activation.
    pub unspent_points: u32,
    pub current_grades: GradeCounts,
    pub optimized_grades: GradeCounts,
}

pub fn summarize_board(
    result: &OptimizationResult,
    nodes: &[DaevanionNode],
    table: &GradeCostTable,
) -> BoardSummary {
    let current = select(nodes, &result.current_node_ids());
    let optimized = select(nodes, &result.activated_node_ids);
    let optimized_points = optimized
        .iter()
        .map(|n| table.point_cost(n))
        .fold(0, u32::saturating_add);

    BoardSummary {
        budget: result.total_points,
        optimized_points,
        unspent_points: result.total_points.saturating_sub(optimized_points),
        current_grades: GradeCounts::tally(current.into_iter()),
        optimized_grades: GradeCounts::tally(optimized.into_iter()),
    }
}

fn select<'a>(nodes: &'a [DaevanionNode], ids: &BTreeSet<u32>) -> Vec<&'a DaevanionNode> {
    ids.iter()
        .filter_map(|id| nodes.iter().find(|n| n.node_id == *id))
        .collect()
}
