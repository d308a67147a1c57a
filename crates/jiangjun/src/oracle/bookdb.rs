//! Book-database oracle (Source A).
//!
//! Speaks the `querypv` text protocol: a successful body carries `score:`,
//! `depth:` and `pv:` markers in one line, and everything is addressed by
//! character offset from those markers. The format has no escaping and no
//! framing, so the parser reproduces the offset arithmetic exactly rather
//! than attempting anything smarter; the arithmetic is pinned by unit tests.

use super::{split_pv_blocks, Oracle, OracleError, OracleReply};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Client for the book-database oracle.
#[derive(Debug, Clone)]
pub struct BookDbOracle {
    base_url: String,
    client: reqwest::Client,
}

impl BookDbOracle {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Oracle for BookDbOracle {
    fn name(&self) -> &'static str {
        "bookdb"
    }

    #[instrument(skip(self, fen), fields(oracle = "bookdb"))]
    async fn query(&self, fen: &str) -> Result<OracleReply, OracleError> {
        debug!("Querying book database");
        let response = self
            .client
            .post(&self.base_url)
            .query(&[("action", "querypv"), ("learn", "1"), ("board", fen)])
            .header("Content-Type", "application/x-www-form-urlencoded")
            .send()
            .await
            .map_err(|e| OracleError::Transport {
                message: format!("request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Book database returned an error status");
            return Err(OracleError::Transport {
                message: format!("HTTP status {}", status),
            });
        }

        let body = response.text().await.map_err(|e| OracleError::Transport {
            message: format!("failed to read response: {}", e),
        })?;

        parse_querypv(&body)
    }
}

/// Parses a `querypv` response body.
///
/// Success requires all three markers to be present at once; a body missing
/// any of them is a no-answer, not an error. Offsets mirror the wire
/// contract: the score starts 6 characters after the `score` marker and
/// runs for `idx(depth) - 7` characters, the depth starts 6 after `depth`
/// and runs for `idx(pv) - 7 - idx(depth)`, and the principal move is the 4
/// characters at `idx(pv) + 3`, with the full variation trailing from the
/// same offset in 5-character strides.
fn parse_querypv(body: &str) -> Result<OracleReply, OracleError> {
    if !(body.contains("pv:") && body.contains("depth:") && body.contains("score:")) {
        debug!("Response lacks the pv/depth/score markers");
        return Err(OracleError::NoConfidentMove);
    }

    // The guard above makes these finds infallible.
    let si = body.find("score").ok_or(OracleError::NoConfidentMove)?;
    let di = body.find("depth").ok_or(OracleError::NoConfidentMove)?;
    let pi = body.find("pv").ok_or(OracleError::NoConfidentMove)?;

    let score_len = di.saturating_sub(7);
    let depth_len = pi.saturating_sub(7 + di);

    let score = body
        .get(si + 6..si + 6 + score_len)
        .and_then(|s| s.trim().parse::<i32>().ok());
    let depth = body
        .get(di + 6..di + 6 + depth_len)
        .and_then(|s| s.trim().parse::<i32>().ok());

    let Some(best) = body.get(pi + 3..pi + 7) else {
        warn!("Markers present but the principal move is truncated");
        return Err(OracleError::NoConfidentMove);
    };
    let pv = body.get(pi + 3..).map(split_pv_blocks).unwrap_or_default();

    debug!(best, ?score, ?depth, pv_len = pv.len(), "Parsed book-database reply");
    Ok(OracleReply {
        best: best.to_string(),
        score,
        depth,
        pv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_reply() {
        let reply = parse_querypv("score:25 depth:30 pv:h2e2 h9g7 b0c2 ").unwrap();
        assert_eq!(reply.best, "h2e2");
        assert_eq!(reply.score, Some(25));
        assert_eq!(reply.depth, Some(30));
        assert_eq!(reply.pv, vec!["h2e2", "h9g7", "b0c2"]);
    }

    #[test]
    fn test_parse_negative_score() {
        let reply = parse_querypv("score:-4 depth:18 pv:c3c4 ").unwrap();
        assert_eq!(reply.score, Some(-4));
        assert_eq!(reply.depth, Some(18));
        assert_eq!(reply.best, "c3c4");
    }

    #[test]
    fn test_parse_single_move_variation() {
        let reply = parse_querypv("score:72 depth:12 pv:b2e2").unwrap();
        assert_eq!(reply.best, "b2e2");
        assert_eq!(reply.pv, vec!["b2e2"]);
    }

    #[test]
    fn test_missing_all_markers_is_no_confident_move() {
        assert_eq!(parse_querypv(""), Err(OracleError::NoConfidentMove));
        assert_eq!(
            parse_querypv("unknown board"),
            Err(OracleError::NoConfidentMove)
        );
    }

    #[test]
    fn test_partial_markers_are_no_confident_move() {
        // All three markers are required simultaneously.
        assert_eq!(
            parse_querypv("score:25 depth:30"),
            Err(OracleError::NoConfidentMove)
        );
        assert_eq!(
            parse_querypv("pv:h2e2 depth:30"),
            Err(OracleError::NoConfidentMove)
        );
        assert_eq!(
            parse_querypv("score:25 pv:h2e2"),
            Err(OracleError::NoConfidentMove)
        );
    }

    #[test]
    fn test_truncated_principal_move_is_no_confident_move() {
        assert_eq!(
            parse_querypv("score:25 depth:30 pv:h2"),
            Err(OracleError::NoConfidentMove)
        );
    }

    #[test]
    fn test_unparseable_score_and_depth_degrade_to_none() {
        let reply = parse_querypv("score:?? depth:xx pv:h2e2 ").unwrap();
        assert_eq!(reply.best, "h2e2");
        assert_eq!(reply.score, None);
        assert_eq!(reply.depth, None);
    }
}
