//! Game lifecycle controller.
//!
//! Owns the turn state machine: selection and destination clicks, applying
//! accepted plies, classifying terminal positions, and requesting the next
//! opponent move from the acquisition pipeline. The busy flag is the sole
//! mutual-exclusion primitive — it is raised before any suspension point
//! that can mutate game state and lowered only once the full
//! terminal-check/next-acquisition cycle has completed, and every entry
//! point ignores input while it is raised.

use crate::acquisition::AcquisitionPipeline;
use crate::config::PlayConfig;
use crate::engine::{RuleEngine, WIN_VALUE};
use crate::events::GameEvent;
use crate::oracle::{BookDbOracle, CloudOracle};
use crate::search::LocalSearch;
use anyhow::Result;
use jiangjun_board::{GameResult, MoveClass, PieceKind, Ply, Side, Square};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument};

/// Repetition lookback window for terminal detection.
const REPETITION_LOOKBACK: u32 = 3;
/// Number of plies without a capture that draws the game.
const MOVE_LIMIT: usize = 100;

/// Mutable per-game state owned by the controller.
#[derive(Debug, Clone)]
struct GameState {
    result: GameResult,
    busy: bool,
    selected: Option<Square>,
    last_ply: Option<Ply>,
}

impl GameState {
    fn new() -> Self {
        Self {
            result: GameResult::Unknown,
            busy: false,
            selected: None,
            last_ply: None,
        }
    }
}

/// Drives one game: applies plies, detects terminal positions, and asks the
/// acquisition pipeline for opponent moves.
pub struct GameController {
    engine: Box<dyn RuleEngine>,
    search: Option<Box<dyn LocalSearch>>,
    pipeline: AcquisitionPipeline,
    config: PlayConfig,
    state: GameState,
    events: mpsc::UnboundedSender<GameEvent>,
}

impl GameController {
    /// Creates a controller around an already-positioned rule engine.
    pub fn new(
        engine: Box<dyn RuleEngine>,
        pipeline: AcquisitionPipeline,
        config: PlayConfig,
        events: mpsc::UnboundedSender<GameEvent>,
    ) -> Self {
        Self {
            engine,
            search: None,
            pipeline,
            config,
            state: GameState::new(),
            events,
        }
    }

    /// Creates a controller with oracle clients built from the config URLs.
    pub fn from_config(
        engine: Box<dyn RuleEngine>,
        config: PlayConfig,
        events: mpsc::UnboundedSender<GameEvent>,
    ) -> Self {
        let pipeline = AcquisitionPipeline::new(
            Box::new(BookDbOracle::new(config.book_db_url().clone())),
            Box::new(CloudOracle::new(
                config.cloud_engine_url().clone(),
                config.cloud_tier().clone(),
            )),
        );
        Self::new(engine, pipeline, config, events)
    }

    /// Installs or removes the local search backend.
    ///
    /// Without a backend the machine opponent never auto-moves and hints
    /// are unavailable.
    pub fn set_search(&mut self, search: Option<Box<dyn LocalSearch>>) {
        self.search = search;
    }

    /// Whether a ply lifecycle is currently in flight.
    pub fn busy(&self) -> bool {
        self.state.busy
    }

    /// Terminal result so far.
    pub fn result(&self) -> GameResult {
        self.state.result
    }

    /// Currently selected square, if any.
    pub fn selected(&self) -> Option<Square> {
        self.state.selected
    }

    /// Most recently applied ply, if any.
    pub fn last_ply(&self) -> Option<Ply> {
        self.state.last_ply
    }

    /// Read access to the rule engine.
    pub fn engine(&self) -> &dyn RuleEngine {
        self.engine.as_ref()
    }

    /// Handles a click on a board square.
    ///
    /// Ignored while busy or after a terminal result. Clicking a piece of
    /// the side to move (re)selects it; clicking anywhere else with a
    /// selection pending attempts the ply.
    #[instrument(skip(self))]
    pub async fn click(&mut self, square: Square) -> Result<()> {
        if self.state.busy || self.state.result != GameResult::Unknown {
            return Ok(());
        }
        if !square.in_board() {
            return Ok(());
        }

        let own_piece = self
            .engine
            .piece_at(square)
            .is_some_and(|(side, _)| side == self.engine.side_to_move());
        if own_piece {
            self.state.selected = Some(square);
            self.events.send(GameEvent::Selected(Some(square)))?;
        } else if let Some(src) = self.state.selected {
            self.try_ply(Ply::new(src, square), false).await?;
        }
        Ok(())
    }

    /// Resolves a move for the side to move and reports it without applying
    /// it.
    ///
    /// Shares the acquisition routine with the auto-move path; only the
    /// terminal step differs.
    #[instrument(skip(self))]
    pub async fn hint(&mut self) -> Result<()> {
        if self.state.busy || self.state.result != GameResult::Unknown {
            return Ok(());
        }
        let Some(search) = self.search.as_mut() else {
            debug!("Hint requested without a search backend");
            return Ok(());
        };

        self.state.busy = true;
        self.events.send(GameEvent::Thinking(true))?;
        let acquired = self
            .pipeline
            .acquire(self.engine.as_mut(), search.as_mut(), &self.config)
            .await;
        self.events.send(GameEvent::Thinking(false))?;
        if !acquired.trace.is_empty() {
            self.events.send(GameEvent::SearchTrace(acquired.trace))?;
        }
        self.events.send(GameEvent::HintReady(acquired.ply))?;
        self.state.busy = false;
        Ok(())
    }

    /// Starts a new game from the given position.
    #[instrument(skip(self))]
    pub async fn restart(&mut self, fen: &str) -> Result<()> {
        if self.state.busy {
            return Ok(());
        }
        if !self.engine.load_fen(fen) {
            anyhow::bail!("rule engine rejected position {fen:?}");
        }
        self.state = GameState::new();
        info!(fen, "New game");
        self.events.send(GameEvent::GameStarted {
            fen: fen.to_string(),
        })?;
        self.dispatch_opponent().await
    }

    /// Undoes the last ply — and one more if that would leave the machine
    /// opponent to move, so control always returns to the human side.
    ///
    /// Clears any terminal result. Does not re-trigger acquisition; the
    /// caller resumes explicitly (e.g. via [`Self::hint`] or the next
    /// click).
    #[instrument(skip(self))]
    pub async fn retract(&mut self) -> Result<()> {
        if self.state.busy {
            return Ok(());
        }
        self.state.result = GameResult::Unknown;
        self.state.selected = None;

        if !self.engine.history().is_empty() {
            self.engine.undo_move();
        }
        if !self.engine.history().is_empty() && self.opponent_to_move() {
            self.engine.undo_move();
        }
        self.state.last_ply = self.engine.history().last().map(|record| record.ply);

        let fen = self.engine.to_fen();
        debug!(fen = %fen, "Retracted");
        self.events.send(GameEvent::Retracted { fen })?;
        Ok(())
    }

    fn opponent_to_move(&self) -> bool {
        *self.config.opponent() == Some(self.engine.side_to_move())
    }

    /// Attempts a candidate ply; on acceptance runs the rest of the cycle.
    async fn try_ply(&mut self, ply: Ply, by_opponent: bool) -> Result<()> {
        let accepted = self.engine.legal_move(ply) && self.engine.make_move(ply);
        if !accepted {
            if by_opponent {
                // The pipeline legality-gates oracle moves and the search
                // contract promises legal output, so this is a collaborator
                // bug; refuse the move rather than corrupt the game.
                error!(%ply, "Opponent move was rejected by the rule engine");
                self.state.busy = false;
            } else {
                debug!(%ply, "Rejected candidate ply");
                self.state.selected = None;
                self.events.send(GameEvent::Selected(None))?;
                self.events.send(GameEvent::IllegalMove(ply))?;
            }
            return Ok(());
        }

        self.state.busy = true;
        self.post_apply(ply, by_opponent).await
    }

    /// Everything that happens after the rule engine accepts a ply:
    /// terminal classification in fixed priority order, then either the
    /// game-over event or the next acquisition cycle.
    async fn post_apply(&mut self, ply: Ply, by_opponent: bool) -> Result<()> {
        self.state.selected = None;
        self.state.last_ply = Some(ply);
        self.events.send(GameEvent::MoveApplied { ply, by_opponent })?;

        // Purely presentational; terminal detection never depends on it.
        if let Some(pause) = self.config.animation_pause() {
            sleep(pause).await;
        }

        if self.engine.is_mate() {
            let result = if by_opponent {
                GameResult::Loss
            } else {
                GameResult::Win
            };
            let mated_king = self.find_king(self.engine.side_to_move());
            return self.finish(result, "checkmate", mated_king);
        }

        let rep = self.engine.repetition_status(REPETITION_LOOKBACK);
        if rep > 0 {
            let value = self.engine.repetition_value(rep);
            return if value > -WIN_VALUE && value < WIN_VALUE {
                self.finish(GameResult::Draw, "draw by mutual repetition", None)
            } else if by_opponent == (value < 0) {
                self.finish(GameResult::Loss, "forced repetition loses the game", None)
            } else {
                self.finish(GameResult::Win, "forced repetition loses the game", None)
            };
        }

        let captured = self
            .engine
            .history()
            .last()
            .is_some_and(|record| record.captured.is_some());
        if captured {
            if !self.any_attacking_material() {
                return self.finish(
                    GameResult::Draw,
                    "neither side has attacking material left",
                    None,
                );
            }
        } else if self.engine.history().len() >= MOVE_LIMIT {
            let recent_capture = self
                .engine
                .history()
                .iter()
                .rev()
                .take(MOVE_LIMIT)
                .any(|record| record.captured.is_some());
            if !recent_capture {
                return self.finish(GameResult::Draw, "draw by the natural-move limit", None);
            }
        }

        let class = if self.engine.in_check() {
            MoveClass::Check
        } else if captured {
            MoveClass::Capture
        } else {
            MoveClass::Quiet
        };
        self.events.send(GameEvent::MoveSignal(class))?;

        self.dispatch_opponent().await
    }

    /// Requests the next opponent move when one is due; otherwise releases
    /// the busy flag.
    async fn dispatch_opponent(&mut self) -> Result<()> {
        if !self.opponent_to_move() || self.search.is_none() {
            self.state.busy = false;
            return Ok(());
        }
        let Some(search) = self.search.as_mut() else {
            self.state.busy = false;
            return Ok(());
        };

        self.state.busy = true;
        self.events.send(GameEvent::Thinking(true))?;
        let acquired = self
            .pipeline
            .acquire(self.engine.as_mut(), search.as_mut(), &self.config)
            .await;
        self.events.send(GameEvent::Thinking(false))?;
        if !acquired.trace.is_empty() {
            self.events.send(GameEvent::SearchTrace(acquired.trace.clone()))?;
        }

        if !self.engine.legal_move(acquired.ply) {
            error!(
                ply = %acquired.ply,
                origin = ?acquired.origin,
                "Resolved move is illegal in the current position; abandoning the cycle"
            );
            self.state.busy = false;
            return Ok(());
        }
        Box::pin(self.try_ply(acquired.ply, true)).await
    }

    fn finish(
        &mut self,
        result: GameResult,
        reason: &str,
        mated_king: Option<Square>,
    ) -> Result<()> {
        self.state.result = result;
        self.state.busy = false;
        info!(%result, reason, "Game over");
        self.events.send(GameEvent::GameOver {
            result,
            reason: reason.to_string(),
            mated_king,
        })?;
        Ok(())
    }

    fn find_king(&self, side: Side) -> Option<Square> {
        Square::all().find(|&sq| self.engine.piece_at(sq) == Some((side, PieceKind::King)))
    }

    fn any_attacking_material(&self) -> bool {
        Square::all().any(|sq| {
            self.engine
                .piece_at(sq)
                .is_some_and(|(_, kind)| kind.is_attacking())
        })
    }
}
