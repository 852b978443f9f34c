//! Error types for the session layer.

/// Errors that can occur during game and registry operations.
///
/// Every variant is reported to the requesting connection only; none of
/// them ends a session. The two session-ending events — controller
/// disconnect and a mid-round departure — are not errors but lifecycle
/// transitions, handled on the close path.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// A game with this name already exists in the registry.
    #[error("a game named {0} already exists")]
    GameExists(String),

    /// No game with this name exists.
    #[error("no game named {0}")]
    NotFound(String),

    /// The game is not accepting joins or starts (a round is in flight).
    #[error("game {0} is not open")]
    NotOpen(String),

    /// A password is configured and the supplied one doesn't match.
    #[error("wrong password for game {0}")]
    BadPassword(String),

    /// Another participant already uses this player name.
    #[error("player name {0} is already taken")]
    NameTaken(String),

    /// A choice was submitted while no round is in progress.
    #[error("no round is in progress")]
    NotStarted,

    /// The game has no participants to play a round with.
    #[error("game {0} has no players")]
    NoPlayers(String),

    /// The participant already has a pending choice this round.
    #[error("{0} has already submitted a choice this round")]
    AlreadySubmitted(String),

    /// The submitted value is not a member of the current choice set.
    #[error("{0} is not a valid choice")]
    InvalidChoice(String),

    /// The session's command channel is closed — the actor has stopped.
    #[error("game {0} is no longer available")]
    Unavailable(String),
}
