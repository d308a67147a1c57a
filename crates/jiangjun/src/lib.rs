//! Move-resolution and game-state orchestrator for a xiangqi client.
//!
//! This library decides *which* move source answers for the machine
//! opponent, *how* its answer is normalized and validated, and *when* the
//! game has ended. It does not know the rules of xiangqi and it does not
//! draw anything: the rule engine and the local search live behind the
//! [`RuleEngine`] and [`LocalSearch`] contracts, and everything a front end
//! needs to render is published as [`GameEvent`]s.
//!
//! # Architecture
//!
//! - **Oracle clients**: one [`Oracle`] implementation per remote move
//!   service — a book-database endpoint speaking an offset-addressed text
//!   format and a cloud engine speaking JSON.
//! - **Acquisition pipeline**: the ordered cascade across both oracles and
//!   the local search fallback, with per-call timeouts and legality
//!   re-validation.
//! - **Lifecycle controller**: the turn state machine that applies resolved
//!   plies, classifies terminal positions, and requests the next move.
//!
//! # Example
//!
//! ```no_run
//! use jiangjun::{GameController, PlayConfig};
//! use tokio::sync::mpsc;
//!
//! # fn engine() -> Box<dyn jiangjun::RuleEngine> { unimplemented!() }
//! # fn search() -> Box<dyn jiangjun::LocalSearch> { unimplemented!() }
//! # async fn example() -> anyhow::Result<()> {
//! let (tx, _rx) = mpsc::unbounded_channel();
//! let mut controller = GameController::from_config(engine(), PlayConfig::default(), tx);
//! controller.set_search(Some(search()));
//! controller.restart("rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w - - 0 1").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod acquisition;
mod config;
mod controller;
mod engine;
mod events;
mod oracle;
mod search;

// Crate-level exports - acquisition pipeline
pub use acquisition::{Acquired, AcquisitionOutcome, AcquisitionPipeline, DeferReason, MoveOrigin};

// Crate-level exports - configuration
pub use config::{ConfigError, PlayConfig, ThinkMode};

// Crate-level exports - lifecycle controller
pub use controller::GameController;

// Crate-level exports - collaborator contracts
pub use engine::{MoveRecord, RuleEngine, WIN_VALUE};
pub use search::{HintOrigin, LocalSearch, SearchHint};

// Crate-level exports - events
pub use events::GameEvent;

// Crate-level exports - oracle clients
pub use oracle::{BookDbOracle, CloudOracle, Oracle, OracleError, OracleReply};

// Re-exported domain vocabulary
pub use jiangjun_board::{GameResult, MoveClass, NotationError, PieceKind, Ply, Side, Square};
