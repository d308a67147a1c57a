//! ICCS move text codec.
//!
//! The remote oracles speak 4-character ICCS coordinates: a file letter and
//! a rank digit for the source square followed by the same pair for the
//! destination (`"h2e2"`). Files map over a fixed 9-wide alphabet `a..=i`
//! to columns 0..=8; rank digits count up from the Red edge, so digit `r`
//! lands on mailbox rank `(9 - r) + 3`. The mapping is the one the rule
//! engine bakes into its square indices and must not drift from it.

use crate::ply::Ply;
use crate::square::{Square, FILE_LEFT, RANK_TOP};
use derive_more::{Display, Error};
use tracing::instrument;

/// Error decoding ICCS move text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum NotationError {
    /// Input was not exactly four characters long.
    #[display("move text must be exactly 4 characters, got {len}")]
    Length {
        /// Actual character count of the input.
        len: usize,
    },
    /// A file character fell outside `a..=i`.
    #[display("invalid file letter {ch:?}")]
    File {
        /// The offending character.
        ch: char,
    },
    /// A rank character fell outside `0..=9`.
    #[display("invalid rank digit {ch:?}")]
    Rank {
        /// The offending character.
        ch: char,
    },
}

/// Decodes one (file letter, rank digit) pair into a mailbox square.
pub fn decode_square(file: char, rank: char) -> Result<Square, NotationError> {
    let col = match file {
        'a'..='i' => file as u8 - b'a',
        _ => return Err(NotationError::File { ch: file }),
    };
    let row = match rank {
        '0'..='9' => rank as u8 - b'0',
        _ => return Err(NotationError::Rank { ch: rank }),
    };
    Ok(Square::from_index((9 - row + RANK_TOP) * 16 + (col + FILE_LEFT)))
}

/// Decodes 4-character ICCS move text into a ply.
#[instrument(level = "trace")]
pub fn decode(text: &str) -> Result<Ply, NotationError> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() != 4 {
        return Err(NotationError::Length { len: chars.len() });
    }
    let src = decode_square(chars[0], chars[1])?;
    let dst = decode_square(chars[2], chars[3])?;
    Ok(Ply { src, dst })
}

/// Encodes a ply as 4-character ICCS move text.
///
/// Both squares must lie on the playable grid.
pub fn encode(ply: Ply) -> String {
    let part = |sq: Square| {
        let file = (b'a' + (sq.file() - FILE_LEFT)) as char;
        let rank = (b'0' + (9 - (sq.rank() - RANK_TOP))) as char;
        [file, rank]
    };
    part(ply.src).iter().chain(part(ply.dst).iter()).collect()
}

impl std::fmt::Display for Ply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", encode(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_square() {
        // Red cannon on h2 in the opening position: file h = column 7,
        // rank 2 -> mailbox rank 10.
        let sq = decode_square('h', '2').unwrap();
        assert_eq!(sq.file(), 7 + FILE_LEFT);
        assert_eq!(sq.rank(), 9 - 2 + RANK_TOP);
    }

    #[test]
    fn test_decode_central_cannon_opening() {
        let ply = decode("h2e2").unwrap();
        assert_eq!(encode(ply), "h2e2");
        assert!(ply.src.in_board());
        assert!(ply.dst.in_board());
    }

    #[test]
    fn test_roundtrip_every_playable_pair() {
        for src in Square::all() {
            for dst in Square::all() {
                let ply = Ply { src, dst };
                assert_eq!(decode(&encode(ply)), Ok(ply));
            }
        }
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert_eq!(decode(""), Err(NotationError::Length { len: 0 }));
        assert_eq!(decode("h2e"), Err(NotationError::Length { len: 3 }));
        assert_eq!(decode("h2e2e"), Err(NotationError::Length { len: 5 }));
    }

    #[test]
    fn test_rejects_file_outside_alphabet() {
        assert_eq!(decode("j2e2"), Err(NotationError::File { ch: 'j' }));
        assert_eq!(decode("h2z2"), Err(NotationError::File { ch: 'z' }));
        assert_eq!(decode("H2e2"), Err(NotationError::File { ch: 'H' }));
    }

    #[test]
    fn test_rejects_non_digit_rank() {
        assert_eq!(decode("hxe2"), Err(NotationError::Rank { ch: 'x' }));
    }

    #[test]
    fn test_display_matches_encode() {
        let ply = decode("b2e2").unwrap();
        assert_eq!(ply.to_string(), "b2e2");
    }
}
