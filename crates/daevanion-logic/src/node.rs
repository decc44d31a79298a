//! Board nodes — one cell of a 15×15 Daevanion grid.
//!
//! The field layout mirrors the board-detail payload served by the
//! character data service, so nodes deserialize straight from JSON
//! (`boardId`, `nodeId`, `effectList`, `type`, ...).

use serde::{Deserialize, Serialize};

/// Rarity tier of a node. Fully determines its point cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    Common,
    Rare,
    Unique,
    Legend,
    /// Non-playable cell. Unrecognized grade strings land here.
    #[serde(other)]
    None,
}

impl Grade {
    /// All playable grades, cheapest first.
    pub const PLAYABLE: [Grade; 4] = [Grade::Common, Grade::Rare, Grade::Unique, Grade::Legend];
}

/// What a node grants when opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Stat,
    SkillLevel,
    /// The activation root. Exactly one per board.
    Start,
    /// Decorative or empty cell. Unrecognized type strings land here.
    #[serde(other)]
    None,
}

/// One line of effect text shown for a node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Effect {
    pub desc: String,
}

/// A single cell on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaevanionNode {
    pub board_id: u32,
    pub node_id: u32,
    #[serde(default)]
    pub name: String,
    /// 1-based row in `1..=GRID_SIZE`.
    pub row: u32,
    /// 1-based column in `1..=GRID_SIZE`.
    pub col: u32,
    pub grade: Grade,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub effect_list: Vec<Effect>,
    /// 1 when the character has this node opened.
    #[serde(default)]
    pub open: u8,
}

impl DaevanionNode {
    /// Build a closed node with no display data.
    pub fn new(node_id: u32, row: u32, col: u32, grade: Grade, node_type: NodeType) -> Self {
        Self {
            board_id: 0,
            node_id,
            name: String::new(),
            row,
            col,
            grade,
            node_type,
            icon: String::new(),
            effect_list: Vec::new(),
            open: 0,
        }
    }

    /// Build the start node of a board.
    pub fn start(node_id: u32, row: u32, col: u32) -> Self {
        Self::new(node_id, row, col, Grade::None, NodeType::Start)
    }

    pub fn is_start(&self) -> bool {
        self.node_type == NodeType::Start
    }

    pub fn is_open(&self) -> bool {
        self.open == 1
    }

    /// True for cells a player can spend points on.
    pub fn is_playable(&self) -> bool {
        !self.is_start() && self.grade != Grade::None && self.node_type != NodeType::None
    }

    /// Up/down/left/right neighbour test. Diagonals don't count.
    pub fn is_adjacent(&self, other: &DaevanionNode) -> bool {
        is_adjacent((self.row, self.col), (other.row, other.col))
    }
}

/// Whether two grid cells share an edge.
pub fn is_adjacent(a: (u32, u32), b: (u32, u32)) -> bool {
    let row_diff = a.0.abs_diff(b.0);
    let col_diff = a.1.abs_diff(b.1);
    (row_diff == 1 && col_diff == 0) || (row_diff == 0 && col_diff == 1)
}

/// The four edge-neighbour cells of `(row, col)`, skipping row/col 0.
pub fn neighbor_cells(row: u32, col: u32) -> impl Iterator<Item = (u32, u32)> {
    [
        row.checked_sub(1).map(|r| (r, col)),
        Some((row + 1, col)),
        col.checked_sub(1).map(|c| (row, c)),
        Some((row, col + 1)),
    ]
    .into_iter()
    .flatten()
    .filter(|&(r, c)| r > 0 && c > 0)
}
