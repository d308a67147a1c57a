//! Move acquisition pipeline.
//!
//! Resolves exactly one opponent move per cycle by cascading across the
//! book-database oracle, the cloud-engine oracle, and finally the local
//! search. Every oracle answer is re-validated against the rule engine
//! before it is trusted; a reply that arrives malformed, illegal, or for a
//! position that has since changed simply advances the cascade.

use crate::config::{PlayConfig, ThinkMode};
use crate::engine::RuleEngine;
use crate::oracle::{Oracle, OracleError, OracleReply};
use crate::search::{HintOrigin, LocalSearch, SearchHint};
use jiangjun_board::{decode, Ply};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};

/// Repetition lookback used to pre-check a position before consulting the
/// cloud oracle in deep mode.
const REPETITION_PROBE: u32 = 1;

/// Which stage of the cascade produced the resolved move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOrigin {
    /// The book-database oracle (Source A).
    BookDb,
    /// The cloud-engine oracle (Source B).
    CloudEngine,
    /// The local search fallback.
    LocalSearch,
}

/// Why the oracle cascade handed the cycle to the local search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferReason {
    /// Neither oracle produced a usable, legal move.
    OraclesExhausted,
    /// The position already has a forced repetition result, which a
    /// heuristic oracle should not second-guess.
    ForcedRepetition,
}

/// Outcome of the oracle cascade for one acquisition cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionOutcome {
    /// An oracle produced a legal move.
    Resolved {
        /// The validated move.
        ply: Ply,
        /// Stage that produced it.
        origin: MoveOrigin,
        /// Reported evaluation score, if any.
        score: Option<i32>,
        /// Reported search depth, if any.
        depth: Option<i32>,
    },
    /// The cascade is handing the cycle to the local search.
    Deferred {
        /// Why the oracles were abandoned.
        reason: DeferReason,
        /// Best-effort seeding for the search, when a move was parsed but
        /// declined.
        hint: Option<SearchHint>,
    },
}

/// The fully resolved move for one cycle, whatever stage produced it.
#[derive(Debug, Clone)]
pub struct Acquired {
    /// The move to play (or report, for hint requests).
    pub ply: Ply,
    /// Stage that produced it.
    pub origin: MoveOrigin,
    /// Reported evaluation score, if any.
    pub score: Option<i32>,
    /// Reported search depth, if any.
    pub depth: Option<i32>,
    /// Human-readable principal variation gathered for diagnostics.
    pub trace: Vec<String>,
}

/// Ordered cascade over the two oracles and the local-search fallback.
pub struct AcquisitionPipeline {
    primary: Box<dyn Oracle>,
    secondary: Box<dyn Oracle>,
}

impl AcquisitionPipeline {
    /// Creates a pipeline consulting `primary` before `secondary`.
    pub fn new(primary: Box<dyn Oracle>, secondary: Box<dyn Oracle>) -> Self {
        Self { primary, secondary }
    }

    /// Resolves exactly one move for the side to move.
    ///
    /// The caller holds the busy flag for the whole call; nothing else may
    /// mutate the engine while this is in flight.
    #[instrument(skip_all, fields(mode = ?config.mode()))]
    pub async fn acquire(
        &self,
        engine: &mut dyn RuleEngine,
        search: &mut dyn LocalSearch,
        config: &PlayConfig,
    ) -> Acquired {
        let mut trace = Vec::new();
        let outcome = match config.mode() {
            ThinkMode::Fast => self.fast_cascade(engine, config).await,
            ThinkMode::Deep => self.deep_cascade(engine, config, &mut trace).await,
        };

        match outcome {
            AcquisitionOutcome::Resolved {
                ply,
                origin,
                score,
                depth,
            } => {
                info!(%ply, ?origin, ?score, ?depth, "Move resolved by oracle");
                Acquired {
                    ply,
                    origin,
                    score,
                    depth,
                    trace,
                }
            }
            AcquisitionOutcome::Deferred { reason, hint } => {
                debug!(?reason, hinted = hint.is_some(), "Deferring to local search");
                // Even an instant local answer waits this long; see the
                // fallback_delay_ms configuration entry.
                sleep(config.fallback_delay()).await;
                let ply = search
                    .search_best_move(*config.depth_limit(), *config.think_time_ms(), hint)
                    .await;
                info!(%ply, "Move resolved by local search");
                Acquired {
                    ply,
                    origin: MoveOrigin::LocalSearch,
                    score: None,
                    depth: None,
                    trace,
                }
            }
        }
    }

    /// Fast mode: one shot per oracle, no tracing, hintless deferral.
    async fn fast_cascade(
        &self,
        engine: &mut dyn RuleEngine,
        config: &PlayConfig,
    ) -> AcquisitionOutcome {
        match self.consult(self.primary.as_ref(), engine, config).await {
            Ok((ply, reply)) => {
                return AcquisitionOutcome::Resolved {
                    ply,
                    origin: MoveOrigin::BookDb,
                    score: reply.score,
                    depth: reply.depth,
                };
            }
            Err(e) => debug!(oracle = self.primary.name(), error = %e, "Primary oracle unusable"),
        }

        match self.consult(self.secondary.as_ref(), engine, config).await {
            Ok((ply, reply)) => AcquisitionOutcome::Resolved {
                ply,
                origin: MoveOrigin::CloudEngine,
                score: reply.score,
                depth: reply.depth,
            },
            Err(e) => {
                debug!(oracle = self.secondary.name(), error = %e, "Secondary oracle unusable");
                AcquisitionOutcome::Deferred {
                    reason: DeferReason::OraclesExhausted,
                    hint: None,
                }
            }
        }
    }

    /// Deep mode: trace variations, pre-check repetitions, seed the search
    /// with whatever the cloud proposed when it cannot be applied.
    async fn deep_cascade(
        &self,
        engine: &mut dyn RuleEngine,
        config: &PlayConfig,
        trace: &mut Vec<String>,
    ) -> AcquisitionOutcome {
        match self.consult(self.primary.as_ref(), engine, config).await {
            Ok((ply, reply)) => {
                *trace = replay_variation(engine, &reply.pv);
                return AcquisitionOutcome::Resolved {
                    ply,
                    origin: MoveOrigin::BookDb,
                    score: reply.score,
                    depth: reply.depth,
                };
            }
            Err(e) => debug!(oracle = self.primary.name(), error = %e, "Primary oracle unusable"),
        }

        // A position that already carries a forced repetition result is
        // settled by the local search, never second-guessed by a heuristic
        // oracle.
        if engine.repetition_status(REPETITION_PROBE) > 0 {
            debug!("Forced repetition on the board; skipping the cloud oracle");
            return AcquisitionOutcome::Deferred {
                reason: DeferReason::ForcedRepetition,
                hint: None,
            };
        }

        let fen = engine.to_fen();
        let reply = match timeout(config.oracle_timeout(), self.secondary.query(&fen)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                debug!(oracle = self.secondary.name(), error = %e, "Secondary oracle unusable");
                return AcquisitionOutcome::Deferred {
                    reason: DeferReason::OraclesExhausted,
                    hint: None,
                };
            }
            Err(_) => {
                debug!(oracle = self.secondary.name(), "Secondary oracle timed out");
                return AcquisitionOutcome::Deferred {
                    reason: DeferReason::OraclesExhausted,
                    hint: None,
                };
            }
        };

        *trace = replay_variation(engine, &reply.pv);

        match decode(&reply.best) {
            Ok(ply) if engine.legal_move(ply) => AcquisitionOutcome::Resolved {
                ply,
                origin: MoveOrigin::CloudEngine,
                score: reply.score,
                depth: reply.depth,
            },
            Ok(ply) => {
                warn!(%ply, "Cloud move is illegal here; passing it to the search as a hint only");
                AcquisitionOutcome::Deferred {
                    reason: DeferReason::OraclesExhausted,
                    hint: Some(SearchHint {
                        ply,
                        origin: HintOrigin::CloudEngine,
                        depth: reply.depth,
                        score: reply.score,
                    }),
                }
            }
            Err(e) => {
                warn!(error = %e, "Cloud move text is malformed");
                AcquisitionOutcome::Deferred {
                    reason: DeferReason::OraclesExhausted,
                    hint: None,
                }
            }
        }
    }

    /// Queries one oracle under the configured deadline and validates its
    /// principal move against the position as it stands *now* — by the time
    /// a response lands, the request may describe a stale position.
    async fn consult(
        &self,
        oracle: &dyn Oracle,
        engine: &dyn RuleEngine,
        config: &PlayConfig,
    ) -> Result<(Ply, OracleReply), OracleError> {
        let fen = engine.to_fen();
        let reply = match timeout(config.oracle_timeout(), oracle.query(&fen)).await {
            Ok(result) => result?,
            Err(_) => return Err(OracleError::Timeout),
        };

        let ply = match decode(&reply.best) {
            Ok(ply) => ply,
            Err(e) => {
                warn!(oracle = oracle.name(), error = %e, "Oracle returned malformed move text");
                return Err(OracleError::NoConfidentMove);
            }
        };
        if !engine.legal_move(ply) {
            warn!(oracle = oracle.name(), %ply, "Oracle proposed an illegal move");
            return Err(OracleError::NoConfidentMove);
        }
        Ok((ply, reply))
    }
}

/// Replays a principal variation against the engine purely to render a
/// human-readable trace, undoing every applied ply afterwards.
///
/// Entries that fail to decode or to apply are skipped without aborting the
/// walk, so a half-usable variation still yields a partial trace.
fn replay_variation(engine: &mut dyn RuleEngine, pv: &[String]) -> Vec<String> {
    let mut descriptions = Vec::with_capacity(pv.len());
    let mut applied = 0;
    for text in pv {
        let Ok(ply) = decode(text) else { continue };
        if !engine.legal_move(ply) || !engine.make_move(ply) {
            continue;
        }
        descriptions.push(engine.describe_ply(ply));
        applied += 1;
    }
    for _ in 0..applied {
        engine.undo_move();
    }
    descriptions
}
