//! Game sessions for Roshambo.
//!
//! This crate owns everything between the wire protocol and the rule
//! engine:
//!
//! 1. **Players** — where a participant's choice comes from
//!    ([`ChoiceSource`] and its implementations)
//! 2. **Sessions** — one actor task per game, owning the rule graph,
//!    the roster, and the round state machine ([`SessionHandle`])
//! 3. **The registry** — the process-wide map from game name to live
//!    session ([`Registry`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)   ← routes each connection's messages to its session
//!     ↕
//! Session layer (this crate)   ← game state, roster, round lifecycle
//!     ↕
//! Rules / Protocol (below)   ← beats relation, wire message types
//! ```

mod error;
mod player;
mod registry;
mod session;

pub use error::GameError;
pub use player::{
    AiSource, ChoiceSource, ConsoleSource, PendingChoice, PlayerError,
    RemoteSource,
};
pub use registry::Registry;
pub use session::{ClientSender, Outbound, Phase, SessionHandle};
