//! Class archetypes and board naming.
//!
//! Every class owns six consecutive board ids. The offset inside the class
//! range picks one of the six canonical board names, which in turn decides
//! whether the optimizer is allowed to touch the board.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_NAMES, DEFAULT_BOARD_RANGE, OPTIMIZABLE_BOARDS};

/// Character class that owns a block of Daevanion boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassArchetype {
    /// 검성, boards 11–16.
    Gladiator,
    /// 수호성, boards 21–26.
    Templar,
    /// 궁성, boards 31–36.
    Ranger,
    /// 살성, boards 41–46.
    Assassin,
    /// 정령성, boards 51–56.
    Spiritmaster,
    /// 마도성, boards 61–66.
    Sorcerer,
    /// 치유성, boards 71–76.
    Cleric,
    /// 호법성, boards 81–86.
    Chanter,
}

impl ClassArchetype {
    /// All classes in board-id order.
    pub fn all() -> &'static [ClassArchetype] {
        &[
            ClassArchetype::Gladiator,
            ClassArchetype::Templar,
            ClassArchetype::Ranger,
            ClassArchetype::Assassin,
            ClassArchetype::Spiritmaster,
            ClassArchetype::Sorcerer,
            ClassArchetype::Cleric,
            ClassArchetype::Chanter,
        ]
    }

    /// Class name as it appears in character profiles.
    pub fn display_name(self) -> &'static str {
        match self {
            ClassArchetype::Gladiator => "검성",
            ClassArchetype::Templar => "수호성",
            ClassArchetype::Ranger => "궁성",
            ClassArchetype::Assassin => "살성",
            ClassArchetype::Spiritmaster => "정령성",
            ClassArchetype::Sorcerer => "마도성",
            ClassArchetype::Cleric => "치유성",
            ClassArchetype::Chanter => "호법성",
        }
    }

    /// First board id of this class; the range spans six ids.
    fn first_board_id(self) -> u32 {
        match self {
            ClassArchetype::Gladiator => 11,
            ClassArchetype::Templar => 21,
            ClassArchetype::Ranger => 31,
            ClassArchetype::Assassin => 41,
            ClassArchetype::Spiritmaster => 51,
            ClassArchetype::Sorcerer => 61,
            ClassArchetype::Cleric => 71,
            ClassArchetype::Chanter => 81,
        }
    }

    pub fn board_ids(self) -> RangeInclusive<u32> {
        let start = self.first_board_id();
        start..=start + BOARD_NAMES.len() as u32 - 1
    }

    /// Resolve a profile class name. Matches on containment, so decorated
    /// names like "치유성 (각성)" still resolve.
    pub fn from_class_name(class_name: &str) -> Option<ClassArchetype> {
        // Lookup order follows the service's own class table.
        const LOOKUP_ORDER: [ClassArchetype; 8] = [
            ClassArchetype::Cleric,
            ClassArchetype::Sorcerer,
            ClassArchetype::Spiritmaster,
            ClassArchetype::Assassin,
            ClassArchetype::Ranger,
            ClassArchetype::Templar,
            ClassArchetype::Gladiator,
            ClassArchetype::Chanter,
        ];
        LOOKUP_ORDER
            .into_iter()
            .find(|class| class_name.contains(class.display_name()))
    }

    /// Class owning `board_id`, if any.
    pub fn for_board(board_id: u32) -> Option<ClassArchetype> {
        Self::all()
            .iter()
            .copied()
            .find(|class| class.board_ids().contains(&board_id))
    }
}

/// Display name of a board id. Ids outside every class range are named `보드{id}`.
pub fn board_name(board_id: u32) -> String {
    match ClassArchetype::for_board(board_id) {
        Some(class) => {
            let index = (board_id - class.first_board_id()) as usize;
            BOARD_NAMES[index].to_string()
        }
        None => format!("보드{}", board_id),
    }
}

/// Board ids to load for a class name, falling back to the 치유성 range.
pub fn board_ids_for_class(class_name: &str) -> Vec<u32> {
    match ClassArchetype::from_class_name(class_name) {
        Some(class) => class.board_ids().collect(),
        None => (DEFAULT_BOARD_RANGE.0..=DEFAULT_BOARD_RANGE.1).collect(),
    }
}

/// Whether the default optimizer settings allow this board.
pub fn is_optimizable_board(board_name: &str) -> bool {
    OPTIMIZABLE_BOARDS.contains(&board_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_names_by_offset() {
        assert_eq!(board_name(71), "네자칸");
        assert_eq!(board_name(72), "지켈");
        assert_eq!(board_name(74), "트리니엘");
        assert_eq!(board_name(75), "아리엘");
        assert_eq!(board_name(16), "아스펠");
        assert_eq!(board_name(81), "네자칸");
    }

    #[test]
    fn test_unknown_board_id() {
        assert_eq!(board_name(17), "보드17");
        assert_eq!(board_name(99), "보드99");
    }

    #[test]
    fn test_class_lookup_by_containment() {
        assert_eq!(
            ClassArchetype::from_class_name("치유성"),
            Some(ClassArchetype::Cleric)
        );
        assert_eq!(
            ClassArchetype::from_class_name("[Lv.45] 궁성"),
            Some(ClassArchetype::Ranger)
        );
        assert_eq!(ClassArchetype::from_class_name("기공성"), None);
    }

    #[test]
    fn test_board_ids_for_class() {
        assert_eq!(board_ids_for_class("마도성"), vec![61, 62, 63, 64, 65, 66]);
        assert_eq!(board_ids_for_class("unknown"), vec![71, 72, 73, 74, 75, 76]);
    }

    #[test]
    fn test_every_class_has_six_boards() {
        for class in ClassArchetype::all() {
            assert_eq!(class.board_ids().count(), 6);
            for id in class.board_ids() {
                assert_eq!(ClassArchetype::for_board(id), Some(*class));
            }
        }
    }

    #[test]
    fn test_four_of_six_boards_are_optimizable() {
        let eligible = ClassArchetype::Templar
            .board_ids()
            .filter(|&id| is_optimizable_board(&board_name(id)))
            .count();
        assert_eq!(eligible, 4);
    }
}
