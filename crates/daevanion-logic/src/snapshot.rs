//! Board-detail payloads and character snapshots.
//!
//! The data service returns one detail payload per board. A snapshot
//! bundles every payload fetched for one character at one moment; it is
//! converted into the name-keyed input the aggregator expects.

use std::collections::{BTreeMap, BTreeSet};

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::BoardInput;
use crate::boards::board_name;
use crate::config::OptimizerConfig;
use crate::node::{DaevanionNode, Effect};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot for {character} contains no boards")]
    NoBoards { character: String },
}

/// Detail payload for one board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDetail {
    pub node_list: Vec<DaevanionNode>,
    #[serde(default)]
    pub open_stat_effect_list: Vec<Effect>,
    #[serde(default)]
    pub open_skill_effect_list: Vec<Effect>,
}

impl BoardDetail {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Ids the character has open, start node always included.
    pub fn open_node_ids(&self) -> BTreeSet<u32> {
        open_node_ids(&self.node_list)
    }
}

/// Ids with `open == 1`, plus the start node regardless of its flag.
pub fn open_node_ids(nodes: &[DaevanionNode]) -> BTreeSet<u32> {
    nodes
        .iter()
        .filter(|n| n.is_open() || n.is_start())
        .map(|n| n.node_id)
        .collect()
}

/// Every board payload fetched for one character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSnapshot {
    #[serde(default)]
    pub character_name: String,
    #[serde(default)]
    pub class_name: String,
    /// Board id → detail payload.
    pub boards: BTreeMap<u32, BoardDetail>,
}

impl CharacterSnapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: CharacterSnapshot = serde_json::from_str(json)?;
        if snapshot.boards.is_empty() {
            return Err(SnapshotError::NoBoards {
                character: snapshot.character_name,
            });
        }
        Ok(snapshot)
    }

    /// Aggregator input for the boards `config` allows, keyed by board name.
    pub fn board_inputs(&self, config: &OptimizerConfig) -> BTreeMap<String, BoardInput> {
        let mut inputs = BTreeMap::new();
        for (&board_id, detail) in &self.boards {
            let name = board_name(board_id);
            if !config.is_optimizable(&name) {
                continue;
            }
            if !detail.node_list.iter().any(|n| n.is_start()) {
                warn!("board {board_id} ({name}) has no start node");
            }
            let input = BoardInput {
                nodes: detail.node_list.clone(),
                activated: detail.open_node_ids(),
            };
            if inputs.insert(name.clone(), input).is_some() {
                warn!("board {board_id} shares the name {name} with another board, keeping the later one");
            }
        }
        inputs
    }
}
