//! Protocol error types.

use thiserror::Error;

/// Why a raw frame could not become a [`crate::ServerEvent`].
///
/// Decoding is total over valid traffic; any of these means the frame
/// came from a server speaking a different dialect (or line noise) and
/// should be dropped, not crashed on.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No entry in the tag table matches the start of the frame.
    #[error("unrecognised frame tag: {frame:?}")]
    UnknownTag { frame: String },

    /// A required positional field is absent or empty.
    #[error("frame is missing its {field} field")]
    MissingField { field: &'static str },

    /// A card token was not exactly one rank character plus one suit
    /// character.
    #[error("malformed card token: {token:?}")]
    BadCard { token: String },

    /// A suit field was not one of the four suit characters.
    #[error("malformed suit: {token:?}")]
    BadSuit { token: String },

    /// A numeric field failed to parse.
    #[error("malformed number: {value:?}")]
    BadNumber { value: String },

    /// The settings document in a game-start frame was not valid JSON.
    #[error("malformed game settings: {0}")]
    BadSettings(#[source] serde_json::Error),
}
