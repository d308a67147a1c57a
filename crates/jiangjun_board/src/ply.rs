//! A single half-move.

use crate::square::Square;
use serde::{Deserialize, Serialize};

/// One half-move: a source square and a destination square.
///
/// A ply is only a *candidate* until the rule engine accepts it; both
/// squares are expected to lie on the playable grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ply {
    /// Square the piece moves from.
    pub src: Square,
    /// Square the piece moves to.
    pub dst: Square,
}

impl Ply {
    /// Creates a new ply.
    pub fn new(src: Square, dst: Square) -> Self {
        debug_assert!(src.in_board() && dst.in_board());
        Self { src, dst }
    }
}
