//! Error types for QR encoding

use thiserror::Error;

/// Result type alias for encoding operations
pub type Result<T> = std::result::Result<T, QrError>;

/// Errors that can occur while encoding a symbol.
///
/// The set is closed: callers can match exhaustively and decide whether to
/// retry with a different error correction level, version, or charset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QrError {
    /// A character cannot be represented in the selected mode
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// The payload does not fit the forced or maximum version
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// The declared charset is unknown or cannot encode the input
    #[error("unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// A sanity check tripped; indicates a bug in the static tables
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}
