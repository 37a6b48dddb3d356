//! Unified error type for the Napoleon client.

use napoleon_transport::TransportError;

/// Top-level error the client crate hands back.
///
/// Only transport-shaped failures surface here. Protocol problems never
/// do: an undecodable inbound frame is logged, counted, and dropped,
/// and encoding an outbound command cannot fail.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A transport-level error while connecting or closing.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The background writer is gone, so no command can leave anymore.
    #[error("connection closed")]
    ConnectionClosed,
}
