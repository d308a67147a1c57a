//! Pure xiangqi board domain types.
//!
//! This crate carries the vocabulary shared between the orchestrator and its
//! collaborators: mailbox squares, plies, sides, piece kinds, game results,
//! and the ICCS text codec used by the remote move oracles. It performs no
//! I/O and holds no game state; the rule engine itself lives behind a
//! contract in the orchestrator crate.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod iccs;
mod ply;
mod square;
mod types;

pub use iccs::{decode, decode_square, encode, NotationError};
pub use ply::Ply;
pub use square::{Square, FILE_LEFT, FILE_RIGHT, RANK_BOTTOM, RANK_TOP, ROW_STRIDE, SQUARE_COUNT};
pub use types::{GameResult, MoveClass, PieceKind, Side};
