//! Unified error type for the Roshambo server.

use roshambo_protocol::ProtocolError;
use roshambo_session::GameError;
use roshambo_transport::TransportError;

/// Top-level error that wraps each layer's error type.
///
/// The `#[from]` attributes let `?` convert layer errors automatically,
/// so the server and handler code deal with one error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A game-level error (registry or session operation).
    #[error(transparent)]
    Game(#[from] GameError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Transport(_)));
        assert!(server_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Protocol(_)));
    }

    #[test]
    fn test_from_game_error() {
        let err = GameError::NotFound("lunchtime".into());
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Game(_)));
        assert!(server_err.to_string().contains("lunchtime"));
    }
}
