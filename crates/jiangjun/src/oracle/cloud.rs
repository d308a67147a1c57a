//! Cloud-engine oracle (Source B).
//!
//! Speaks JSON: `{ "moves": [ { "move": "...", "pv": "...", "score": n } ] }`
//! with candidates ordered best-first. Only the first candidate is ever
//! used for selection; its variation feeds the diagnostics trace.

use super::{split_pv_blocks, Oracle, OracleError, OracleReply};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// Client for the cloud-engine oracle.
#[derive(Debug, Clone)]
pub struct CloudOracle {
    base_url: String,
    tier: String,
    client: reqwest::Client,
}

impl CloudOracle {
    /// Creates a client for the service at `base_url` with the given
    /// quality-tier flag.
    pub fn new(base_url: impl Into<String>, tier: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            tier: tier.into(),
            client: reqwest::Client::new(),
        }
    }
}

/// Wire shape of the cloud response.
#[derive(Debug, Deserialize)]
struct MovesResponse {
    #[serde(default)]
    moves: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default, rename = "move")]
    move_text: String,
    #[serde(default)]
    pv: String,
    #[serde(default)]
    score: Option<f64>,
}

#[async_trait]
impl Oracle for CloudOracle {
    fn name(&self) -> &'static str {
        "cloud"
    }

    #[instrument(skip(self, fen), fields(oracle = "cloud"))]
    async fn query(&self, fen: &str) -> Result<OracleReply, OracleError> {
        debug!("Querying cloud engine");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("fen", fen), ("level", self.tier.as_str())])
            .send()
            .await
            .map_err(|e| OracleError::Transport {
                message: format!("request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Cloud engine returned an error status");
            return Err(OracleError::Transport {
                message: format!("HTTP status {}", status),
            });
        }

        let body = response.text().await.map_err(|e| OracleError::Transport {
            message: format!("failed to read response: {}", e),
        })?;
        let parsed: MovesResponse =
            serde_json::from_str(&body).map_err(|e| OracleError::Transport {
                message: format!("invalid JSON response: {}", e),
            })?;

        normalize(parsed)
    }
}

/// Normalizes the decoded JSON into the shared reply shape.
fn normalize(response: MovesResponse) -> Result<OracleReply, OracleError> {
    let Some(first) = response.moves.into_iter().next() else {
        debug!("Cloud engine returned an empty candidate list");
        return Err(OracleError::NoCandidates);
    };

    let pv = split_pv_blocks(&first.pv);
    // The wire carries no explicit depth; the variation length stands in
    // for it, the same number the shipped client fed its search hints.
    let depth = (!pv.is_empty()).then_some(pv.len() as i32);

    debug!(
        best = %first.move_text,
        score = ?first.score,
        pv_len = pv.len(),
        "Parsed cloud-engine reply"
    );
    Ok(OracleReply {
        best: first.move_text,
        score: first.score.map(|s| s as i32),
        depth,
        pv,
    })
}
