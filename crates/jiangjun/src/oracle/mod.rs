//! Remote move-oracle clients.
//!
//! An oracle is a remote service that proposes a move for a given position.
//! Both known services are brittle in their own way, so the shared contract
//! normalizes every answer into an [`OracleReply`] or a typed
//! [`OracleError`]; deciding whether to trust a reply is the acquisition
//! pipeline's job, not the client's.

mod bookdb;
mod cloud;

pub use bookdb::BookDbOracle;
pub use cloud::CloudOracle;

use async_trait::async_trait;
use derive_more::{Display, Error};

/// Normalized answer from one oracle query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleReply {
    /// Principal move in 4-character ICCS text.
    pub best: String,
    /// Evaluation score, when the service reported a numeric one.
    pub score: Option<i32>,
    /// Search depth, when the service reported one.
    pub depth: Option<i32>,
    /// Principal variation as ICCS blocks, starting with the principal move.
    pub pv: Vec<String>,
}

/// Failure modes of an oracle query.
///
/// None of these are fatal: every variant sends the acquisition cascade to
/// its next stage.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum OracleError {
    /// The service answered but offered nothing usable.
    #[display("oracle answered without a confident move")]
    NoConfidentMove,
    /// The service returned an empty candidate list.
    #[display("oracle returned no candidates")]
    NoCandidates,
    /// Network or HTTP-level failure.
    #[display("oracle transport failure: {message}")]
    Transport {
        /// Description of the underlying failure.
        message: String,
    },
    /// The request exceeded its deadline.
    #[display("oracle request timed out")]
    Timeout,
}

/// Contract shared by every remote move oracle.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Short identifier used in logs and traces.
    fn name(&self) -> &'static str;

    /// Queries the service for the given position.
    ///
    /// Implementations do not enforce a deadline themselves; the caller
    /// wraps each query in an explicit timeout.
    async fn query(&self, fen: &str) -> Result<OracleReply, OracleError>;
}

/// Splits a raw principal-variation tail into 4-character ICCS blocks.
///
/// Both wire formats pack moves in 5-character strides (4 move characters
/// plus one separator, with a trailing separator); a final fragment shorter
/// than a full move is dropped.
pub(crate) fn split_pv_blocks(tail: &str) -> Vec<String> {
    tail.as_bytes()
        .chunks(5)
        .filter(|chunk| chunk.len() >= 4)
        .map(|chunk| String::from_utf8_lossy(&chunk[..4]).into_owned())
        .collect()
}
