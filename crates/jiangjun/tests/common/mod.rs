//! Shared test doubles for the orchestrator integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use jiangjun::{
    GameEvent, LocalSearch, MoveRecord, Oracle, OracleError, OracleReply, PieceKind, Ply,
    RuleEngine, SearchHint, Side, Square,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Installs a subscriber so `RUST_LOG=debug cargo test` shows the
/// orchestrator's tracing output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Decodes ICCS text, panicking on bad test data.
pub fn ply(text: &str) -> Ply {
    jiangjun_board::decode(text).unwrap()
}

/// Decodes a single ICCS square, panicking on bad test data.
pub fn sq(text: &str) -> Square {
    let mut chars = text.chars();
    jiangjun_board::decode_square(chars.next().unwrap(), chars.next().unwrap()).unwrap()
}

/// Builds an oracle reply from ICCS text.
pub fn reply(best: &str, pv: &[&str], score: i32, depth: i32) -> OracleReply {
    OracleReply {
        best: best.to_string(),
        score: Some(score),
        depth: Some(depth),
        pv: pv.iter().map(|s| s.to_string()).collect(),
    }
}

/// Drains every event currently queued on the receiver.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<GameEvent>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ─────────────────────────────────────────────────────────────
//  Scripted rule engine
// ─────────────────────────────────────────────────────────────

/// Mutable script shared between a test and its engine double.
pub struct Script {
    /// Side to move.
    pub side: Side,
    /// Every ply is legal when set; otherwise consult `legal`.
    pub all_legal: bool,
    /// Explicit legal-move set (ignored when `all_legal`).
    pub legal: HashSet<Ply>,
    /// Plies that pass the legality probe but fail on application.
    pub reject_make: HashSet<Ply>,
    /// Report mate once this many plies are on the board.
    pub mate_after: Option<usize>,
    /// Side to move is in check.
    pub check: bool,
    /// Repetition status returned for any probe (0 = none).
    pub rep_status: i32,
    /// Signed repetition adjudication value.
    pub rep_value: i32,
    /// Lookback windows the orchestrator probed with, in order.
    pub rep_probes: Vec<u32>,
    /// Capture markers consumed by successive applied plies.
    pub next_captures: VecDeque<Option<PieceKind>>,
    /// Board occupancy for `piece_at` scans.
    pub pieces: HashMap<Square, (Side, PieceKind)>,
    /// Position notation reported by `to_fen`.
    pub fen: String,
}

impl Script {
    /// A permissive script: Red to move, everything legal, nothing terminal.
    pub fn permissive() -> Self {
        Self {
            side: Side::Red,
            all_legal: true,
            legal: HashSet::new(),
            reject_make: HashSet::new(),
            mate_after: None,
            check: false,
            rep_status: 0,
            rep_value: 0,
            rep_probes: Vec::new(),
            next_captures: VecDeque::new(),
            pieces: HashMap::new(),
            fen: "test-position".to_string(),
        }
    }
}

/// Rule engine double driven entirely by a [`Script`].
pub struct ScriptedEngine {
    script: Arc<Mutex<Script>>,
    history: Vec<MoveRecord>,
}

/// Builds an engine double plus the script handle the test keeps.
pub fn engine_with(script: Script) -> (Box<ScriptedEngine>, Arc<Mutex<Script>>) {
    engine_with_history(script, Vec::new())
}

/// Same, with a pre-existing move history.
pub fn engine_with_history(
    script: Script,
    history: Vec<MoveRecord>,
) -> (Box<ScriptedEngine>, Arc<Mutex<Script>>) {
    let handle = Arc::new(Mutex::new(script));
    (
        Box::new(ScriptedEngine {
            script: handle.clone(),
            history,
        }),
        handle,
    )
}

impl RuleEngine for ScriptedEngine {
    fn side_to_move(&self) -> Side {
        self.script.lock().unwrap().side
    }

    fn legal_move(&self, ply: Ply) -> bool {
        let script = self.script.lock().unwrap();
        script.all_legal || script.legal.contains(&ply)
    }

    fn make_move(&mut self, ply: Ply) -> bool {
        if !self.legal_move(ply) {
            return false;
        }
        let mut script = self.script.lock().unwrap();
        if script.reject_make.contains(&ply) {
            return false;
        }
        let captured = script.next_captures.pop_front().flatten();
        script.side = script.side.opponent();
        drop(script);
        self.history.push(MoveRecord { ply, captured });
        true
    }

    fn undo_move(&mut self) {
        if self.history.pop().is_some() {
            let mut script = self.script.lock().unwrap();
            script.side = script.side.opponent();
        }
    }

    fn in_check(&self) -> bool {
        self.script.lock().unwrap().check
    }

    fn is_mate(&self) -> bool {
        self.script
            .lock()
            .unwrap()
            .mate_after
            .is_some_and(|n| self.history.len() >= n)
    }

    fn repetition_status(&self, window: u32) -> i32 {
        let mut script = self.script.lock().unwrap();
        script.rep_probes.push(window);
        script.rep_status
    }

    fn repetition_value(&self, _status: i32) -> i32 {
        self.script.lock().unwrap().rep_value
    }

    fn to_fen(&self) -> String {
        self.script.lock().unwrap().fen.clone()
    }

    fn load_fen(&mut self, fen: &str) -> bool {
        self.history.clear();
        self.script.lock().unwrap().fen = fen.to_string();
        true
    }

    fn piece_at(&self, square: Square) -> Option<(Side, PieceKind)> {
        self.script.lock().unwrap().pieces.get(&square).copied()
    }

    fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    fn describe_ply(&self, ply: Ply) -> String {
        format!("move {ply}")
    }
}

// ─────────────────────────────────────────────────────────────
//  Scripted local search
// ─────────────────────────────────────────────────────────────

/// Arguments the orchestrator passed to one search invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedCall {
    pub depth_limit: u32,
    pub time_budget_ms: u64,
    pub hint: Option<SearchHint>,
}

/// Search double that records its calls and returns a canned move.
pub struct ScriptedSearch {
    best: Ply,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl ScriptedSearch {
    /// Creates a search double returning the given ICCS move.
    pub fn returning(text: &str) -> (Self, Arc<Mutex<Vec<RecordedCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                best: ply(text),
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl LocalSearch for ScriptedSearch {
    async fn search_best_move(
        &mut self,
        depth_limit: u32,
        time_budget_ms: u64,
        hint: Option<SearchHint>,
    ) -> Ply {
        self.calls.lock().unwrap().push(RecordedCall {
            depth_limit,
            time_budget_ms,
            hint,
        });
        self.best
    }
}

// ─────────────────────────────────────────────────────────────
//  Scripted oracles
// ─────────────────────────────────────────────────────────────

/// Oracle double that serves queued answers, optionally after a delay.
pub struct ScriptedOracle {
    name: &'static str,
    replies: Mutex<VecDeque<Result<OracleReply, OracleError>>>,
    delay: Option<Duration>,
    calls: Arc<Mutex<u32>>,
}

impl ScriptedOracle {
    /// Always answers with the given reply.
    pub fn returning(name: &'static str, reply: OracleReply) -> Self {
        Self::with_queue(name, vec![Ok(reply)], None)
    }

    /// Always answers with the given failure.
    pub fn failing(name: &'static str, error: OracleError) -> Self {
        Self::with_queue(name, vec![Err(error)], None)
    }

    /// Answers with the given reply after sleeping, to provoke timeouts.
    pub fn slow(name: &'static str, delay: Duration, reply: OracleReply) -> Self {
        Self::with_queue(name, vec![Ok(reply)], Some(delay))
    }

    /// Serves the queue in order, then repeats the final answer.
    pub fn with_queue(
        name: &'static str,
        replies: Vec<Result<OracleReply, OracleError>>,
        delay: Option<Duration>,
    ) -> Self {
        Self {
            name,
            replies: Mutex::new(replies.into()),
            delay,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Handle counting how many times the oracle was queried.
    pub fn call_count(&self) -> Arc<Mutex<u32>> {
        self.calls.clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn query(&self, _fen: &str) -> Result<OracleReply, OracleError> {
        *self.calls.lock().unwrap() += 1;
        let answer = {
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.pop_front().unwrap()
            } else {
                replies.front().cloned().unwrap_or(Err(OracleError::NoConfidentMove))
            }
        };
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        answer
    }
}

/// Oracle double that invalidates the scripted legal-move set while its
/// answer is in flight, simulating a response that outlives the position it
/// was computed for.
pub struct StaleOracle {
    script: Arc<Mutex<Script>>,
    reply: OracleReply,
}

impl StaleOracle {
    /// Creates the double around the engine script it will invalidate.
    pub fn new(script: Arc<Mutex<Script>>, reply: OracleReply) -> Self {
        Self { script, reply }
    }
}

#[async_trait]
impl Oracle for StaleOracle {
    fn name(&self) -> &'static str {
        "stale"
    }

    async fn query(&self, _fen: &str) -> Result<OracleReply, OracleError> {
        // The position changes under the request; the answer below was
        // legal when the query was issued.
        let mut script = self.script.lock().unwrap();
        script.all_legal = false;
        script.legal.clear();
        Ok(self.reply.clone())
    }
}
