//! Core domain enums shared by the orchestrator and its collaborators.

use serde::{Deserialize, Serialize};

/// Side to move.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Red (moves first in the standard opening position).
    Red,
    /// Black.
    Black,
}

impl Side {
    /// Returns the opposing side.
    pub fn opponent(self) -> Self {
        match self {
            Side::Red => Side::Black,
            Side::Black => Side::Red,
        }
    }
}

/// Kind of piece occupying a square.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum PieceKind {
    /// King (general).
    King,
    /// Advisor (guard).
    Advisor,
    /// Elephant.
    Elephant,
    /// Horse.
    Horse,
    /// Rook (chariot).
    Rook,
    /// Cannon.
    Cannon,
    /// Pawn (soldier).
    Pawn,
}

impl PieceKind {
    /// Whether this kind counts as attacking material.
    ///
    /// Kings, advisors and elephants cannot cross the river or deliver mate
    /// on their own; a position where neither side retains anything above
    /// that threshold is adjudicated as a dead draw.
    pub fn is_attacking(self) -> bool {
        matches!(
            self,
            PieceKind::Horse | PieceKind::Rook | PieceKind::Cannon | PieceKind::Pawn
        )
    }
}

/// Terminal result of a game, from the local (human) player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum GameResult {
    /// Game is still in progress.
    Unknown,
    /// The local player won.
    Win,
    /// Drawn game.
    Draw,
    /// The local player lost.
    Loss,
}

/// Presentation-level classification of an applied ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveClass {
    /// Ordinary move.
    Quiet,
    /// The ply captured a piece.
    Capture,
    /// The ply left the opponent in check.
    Check,
}
