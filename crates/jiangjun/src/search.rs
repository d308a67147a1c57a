//! Local search contract consumed by the acquisition pipeline.

use async_trait::async_trait;
use jiangjun_board::Ply;
use serde::{Deserialize, Serialize};

/// Which oracle produced a search hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HintOrigin {
    /// The book-database oracle (Source A).
    BookDb,
    /// The cloud-engine oracle (Source B).
    CloudEngine,
}

/// Best-effort seeding data handed to the local search when an oracle
/// produced a move the pipeline declined to apply.
///
/// Hints are auxiliary: the search may order the hinted move first or use
/// the depth/score to trim its budget, but it is free to ignore all of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHint {
    /// The oracle's principal move.
    pub ply: Ply,
    /// Which oracle proposed it.
    pub origin: HintOrigin,
    /// Search depth the oracle reported, if any.
    pub depth: Option<i32>,
    /// Evaluation score the oracle reported, if any.
    pub score: Option<i32>,
}

/// Contract the local search engine must satisfy.
///
/// The search is the terminal fallback of the acquisition cascade and is
/// assumed to always return a legal move for any non-terminal position; a
/// violation is a collaborator bug the orchestrator refuses to apply.
#[async_trait]
pub trait LocalSearch: Send {
    /// Searches the current position for the best move.
    async fn search_best_move(
        &mut self,
        depth_limit: u32,
        time_budget_ms: u64,
        hint: Option<SearchHint>,
    ) -> Ply;
}
