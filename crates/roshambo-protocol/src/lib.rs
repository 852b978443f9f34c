//! Wire protocol for Roshambo.
//!
//! This crate defines the language that clients and the server speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`PlayerEntry`]) —
//!   the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding or
//!   decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the session
//! layer (game state). It knows nothing about connections or sessions —
//! only how to serialize and deserialize messages.
//!
//! ```text
//! Transport (bytes) → Protocol (messages) → Session (game state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientMessage, PlayerEntry, ServerMessage};
