//! Rule engine contract consumed by the orchestrator.

use jiangjun_board::{PieceKind, Ply, Side, Square};

/// Score magnitude at which a repetition verdict counts as forced.
///
/// The engine scores positions on a centipawn-like scale where mate is
/// 10000; repetition values strictly inside `(-WIN_VALUE, WIN_VALUE)` mean
/// neither side is forcing and the repetition is a draw, while values at or
/// beyond the bound identify a perpetual-check/chase pattern whose owner
/// loses the adjudication.
pub const WIN_VALUE: i32 = 9800;

/// One applied ply together with its capture marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    /// The ply that was applied.
    pub ply: Ply,
    /// Piece captured by the ply, if any.
    pub captured: Option<PieceKind>,
}

/// Contract the move-generation/rule engine must satisfy.
///
/// The orchestrator treats the engine as an opaque, stateful collaborator:
/// it owns the real board, generates and validates moves, hashes positions
/// for repetition detection, and converts plies to human-readable notation.
/// All mutation is strictly sequential; the engine is never shared across
/// tasks.
pub trait RuleEngine: Send {
    /// Side currently to move.
    fn side_to_move(&self) -> Side;

    /// Whether the ply is legal in the current position.
    fn legal_move(&self, ply: Ply) -> bool;

    /// Applies the ply. Returns `false` (leaving the position unchanged)
    /// when the ply is illegal, e.g. it would leave the mover in check.
    fn make_move(&mut self, ply: Ply) -> bool;

    /// Reverts the most recently applied ply.
    fn undo_move(&mut self);

    /// Whether the side to move is currently in check.
    fn in_check(&self) -> bool;

    /// Whether the side to move has no legal response.
    fn is_mate(&self) -> bool;

    /// Probes the position-hash history for a repetition within the given
    /// number of prior occurrences. Returns `0` when none is found and an
    /// engine-defined positive status otherwise.
    fn repetition_status(&self, window: u32) -> i32;

    /// Signed adjudication score for a repetition status returned by
    /// [`Self::repetition_status`]. Values inside `(-WIN_VALUE, WIN_VALUE)`
    /// are draws; the sign of a forced value identifies the losing side
    /// relative to the side to move.
    fn repetition_value(&self, status: i32) -> i32;

    /// Current position in FEN-style notation.
    fn to_fen(&self) -> String;

    /// Replaces the position. Returns `false` if the notation is unusable.
    fn load_fen(&mut self, fen: &str) -> bool;

    /// Occupant of the given square, if any.
    fn piece_at(&self, square: Square) -> Option<(Side, PieceKind)>;

    /// Applied plies in order, oldest first, with capture markers.
    fn history(&self) -> &[MoveRecord];

    /// Human-readable description of a just-applied ply, for the
    /// diagnostics trace. Callers apply the ply first and undo afterwards.
    fn describe_ply(&self, ply: Ply) -> String;
}
