//! Squares on the rule engine's 16x16 mailbox board.

use serde::{Deserialize, Serialize};

/// Leftmost playable file (column) on the mailbox board.
pub const FILE_LEFT: u8 = 3;
/// Rightmost playable file on the mailbox board.
pub const FILE_RIGHT: u8 = 11;
/// Topmost playable rank (row) on the mailbox board.
pub const RANK_TOP: u8 = 3;
/// Bottommost playable rank on the mailbox board.
pub const RANK_BOTTOM: u8 = 12;
/// Width of one mailbox row.
pub const ROW_STRIDE: u8 = 16;
/// Total number of mailbox squares, playable or not.
pub const SQUARE_COUNT: usize = 256;

/// A square on the 16x16 mailbox board.
///
/// The playable 9x10 grid occupies files 3..=11 and ranks 3..=12; the
/// surrounding border squares exist only so the rule engine can detect
/// off-board moves cheaply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square(u8);

impl Square {
    /// Creates a square from its raw mailbox index.
    pub fn from_index(index: u8) -> Self {
        Self(index)
    }

    /// Creates a square from mailbox file and rank coordinates.
    ///
    /// Returns `None` if the coordinates fall outside the playable grid.
    pub fn from_parts(file: u8, rank: u8) -> Option<Self> {
        if (FILE_LEFT..=FILE_RIGHT).contains(&file) && (RANK_TOP..=RANK_BOTTOM).contains(&rank) {
            Some(Self(rank * ROW_STRIDE + file))
        } else {
            None
        }
    }

    /// Returns the raw mailbox index.
    pub fn index(self) -> u8 {
        self.0
    }

    /// Returns the mailbox file (column) of this square.
    pub fn file(self) -> u8 {
        self.0 & 15
    }

    /// Returns the mailbox rank (row) of this square.
    pub fn rank(self) -> u8 {
        self.0 >> 4
    }

    /// Checks whether this square lies on the playable 9x10 grid.
    pub fn in_board(self) -> bool {
        (FILE_LEFT..=FILE_RIGHT).contains(&self.file())
            && (RANK_TOP..=RANK_BOTTOM).contains(&self.rank())
    }

    /// Iterates over every playable square in mailbox index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..SQUARE_COUNT as u16).filter_map(|i| {
            let sq = Square(i as u8);
            sq.in_board().then_some(sq)
        })
    }
}
