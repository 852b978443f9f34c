//! Codec trait and implementations for serializing messages.
//!
//! A codec converts between Rust types and raw bytes. The rest of the
//! stack doesn't care how messages are serialized — it only needs
//! something that implements [`Codec`]. [`JsonCodec`] is the default
//! (human-readable, easy to debug from browser dev tools); a binary codec
//! can be added later without touching any other layer.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes Rust types to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because codecs are shared across connection
/// handler tasks for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// Behind the `json` feature flag (enabled by default).
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::ServerMessage;

    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let msg = ServerMessage::PlayerJoined { name: "alice".into() };

        let bytes = codec.encode(&msg).unwrap();
        let decoded: ServerMessage = codec.decode(&bytes).unwrap();

        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_json_codec_decode_garbage_fails() {
        let codec = JsonCodec;
        let result: Result<ServerMessage, _> = codec.decode(b"\xff\xfe");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
