//! `Accept` header parsing and media type scoring (RFC 2616 §14.1)
//!
//! - [`parse_media_type`] / [`parse_media_range`] split a single media range
//! - [`parse_accept_header`] parses a whole header, failing on the first bad element
//! - [`fitness_and_quality`] scores one concrete type against parsed ranges
//! - [`best_match`] / [`all_best_matches`] rank a list of candidates
//!
//! ```rust
//! use mediacork::mediatype::best_match_str;
//!
//! let best = best_match_str(&["application/xbel+xml", "text/xml"], "text/*;q=0.5,*/*;q=0.1")?;
//! assert_eq!(best, Some("text/xml"));
//! # Ok::<(), mediacork::mediatype::MediaTypeError>(())
//! ```

mod quality;
mod range;

pub use quality::{
    CandidateScore, all_best_matches, best_match, best_match_str, fitness_and_quality, quality,
};
pub use range::{
    AcceptHeader, MediaRange, parse_accept_header, parse_media_range, parse_media_type,
};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaTypeError {
    #[error("malformed media type: {0:?}")]
    Malformed(String),
}
