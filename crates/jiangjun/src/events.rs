//! Events published to the presentation layer.

use jiangjun_board::{GameResult, MoveClass, Ply, Square};

/// Messages sent from the lifecycle controller to the UI.
///
/// The controller never touches rendering or audio; every visible or
/// audible consequence of the game state is announced here and interpreted
/// by whatever front end is listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A new game began from the given position.
    GameStarted {
        /// Starting position notation.
        fen: String,
    },
    /// The pending selection changed; `None` clears the highlight.
    Selected(Option<Square>),
    /// A ply was accepted by the rule engine and applied.
    MoveApplied {
        /// The applied ply.
        ply: Ply,
        /// Whether the machine opponent played it.
        by_opponent: bool,
    },
    /// A candidate ply was rejected by the rule engine.
    IllegalMove(Ply),
    /// Presentation signal for an applied ply in a game that continues.
    MoveSignal(MoveClass),
    /// The thinking indicator turned on or off.
    Thinking(bool),
    /// Human-readable principal variation for the diagnostics panel.
    SearchTrace(Vec<String>),
    /// A hint request resolved; the move is reported, never applied.
    HintReady(Ply),
    /// The last ply (or two) was retracted; the position is now `fen`.
    Retracted {
        /// Position notation after the retraction.
        fen: String,
    },
    /// The game reached a terminal state.
    GameOver {
        /// Result relative to the local player.
        result: GameResult,
        /// Human-readable reason for the result.
        reason: String,
        /// Square of the mated king, when the game ended in checkmate.
        mated_king: Option<Square>,
    },
}
