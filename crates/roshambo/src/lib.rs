//! # Roshambo
//!
//! A generalized Rock-Paper-Scissors game server.
//!
//! One connection creates a named game (becoming its controller), other
//! connections join it by name, the controller starts rounds, and every
//! participant's simultaneous choice is resolved against an arbitrary
//! "beats" relation — the classic triangle, or any rule set a controller
//! supplies.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roshambo::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ServerError> {
//!     let server = ServerBuilder::new().bind("0.0.0.0:8080").build().await?;
//!     server.run().await
//! }
//! ```

mod error;
mod handler;
mod server;

pub use error::ServerError;
pub use server::{Server, ServerBuilder};

/// Everything a server binary or test typically needs.
pub mod prelude {
    pub use crate::{Server, ServerBuilder, ServerError};
    pub use roshambo_protocol::{ClientMessage, Codec, JsonCodec, PlayerEntry, ServerMessage};
    pub use roshambo_rules::{RuleError, RuleGraph};
    pub use roshambo_session::{GameError, Registry, SessionHandle};
}
