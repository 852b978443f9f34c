//! Session actor: an isolated Tokio task that owns one game.
//!
//! Each session runs in its own task, communicating with connection
//! handlers through channels. All mutation of a game's state happens
//! inside its actor, one command at a time — no locks, no interleaving,
//! no data races by construction.

use std::collections::BTreeMap;
use std::fmt;

use roshambo_protocol::{PlayerEntry, ServerMessage};
use roshambo_rules::RuleGraph;
use tokio::sync::{mpsc, oneshot};

use crate::player::RemoteSource;
use crate::GameError;

/// An outbound instruction from a session actor to a connection handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Deliver this message to the client.
    Message(ServerMessage),
    /// The session is done with this connection: close it.
    Close,
}

/// Channel sender delivering outbound traffic to one connection.
pub type ClientSender = mpsc::UnboundedSender<Outbound>;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The round phase of a session.
///
/// ```text
/// Open ──(start_game)──→ Started ──(all choices in, reveal)──→ Open
/// ```
///
/// - **Open**: accepting joins; no round in progress.
/// - **Started**: a round is in flight, awaiting one choice per seat.
///
/// There is no explicit closed phase — a closed session is one whose
/// actor task has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    Started,
}

impl Phase {
    /// Returns `true` if the session is accepting joins and starts.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns `true` if a round is in progress.
    pub fn is_started(self) -> bool {
        matches!(self, Self::Started)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Started => write!(f, "started"),
        }
    }
}

// ---------------------------------------------------------------------------
// Commands and handle
// ---------------------------------------------------------------------------

/// Commands sent to a session actor through its channel.
pub(crate) enum SessionCommand {
    /// Add a participant. The reply reports join failures so the handler
    /// can relay them and close the connection.
    Join {
        name: String,
        password: Option<String>,
        sender: ClientSender,
        reply: oneshot::Sender<Result<(), GameError>>,
    },

    /// A participant's connection ended (or they asked to leave).
    Leave { name: String },

    /// The controller wants a round to begin.
    StartGame,

    /// Someone asked for the roster. `player` is `None` when the
    /// controller asked.
    PlayerList { player: Option<String> },

    /// A participant submitted a choice.
    MakeChoice { name: String, choice: String },

    /// The controller is gone: close everything.
    Shutdown,
}

/// Handle to a running session actor. Cheap to clone.
///
/// The registry holds one of these per game; connection handlers clone it
/// to route their traffic.
#[derive(Clone)]
pub struct SessionHandle {
    name: String,
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// The game's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Asks the session to add a participant bound to `sender`.
    ///
    /// # Errors
    /// [`GameError::NotOpen`], [`GameError::BadPassword`], or
    /// [`GameError::NameTaken`] — the join was refused and no state
    /// changed. [`GameError::Unavailable`] if the actor has stopped.
    pub async fn join(
        &self,
        name: String,
        password: Option<String>,
        sender: ClientSender,
    ) -> Result<(), GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Join {
            name,
            password,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| GameError::Unavailable(self.name.clone()))?
    }

    /// Reports that a participant's connection ended.
    pub async fn leave(&self, name: String) -> Result<(), GameError> {
        self.send(SessionCommand::Leave { name }).await
    }

    /// Asks the session to start a round. Failures are reported to the
    /// controller over its channel, not here.
    pub async fn start_game(&self) -> Result<(), GameError> {
        self.send(SessionCommand::StartGame).await
    }

    /// Requests the roster on behalf of a participant (`Some(name)`) or
    /// the controller (`None`).
    pub async fn player_list(&self, player: Option<String>) -> Result<(), GameError> {
        self.send(SessionCommand::PlayerList { player }).await
    }

    /// Submits a participant's choice. Failures are reported to the
    /// submitter over its channel, not here.
    pub async fn make_choice(&self, name: String, choice: String) -> Result<(), GameError> {
        self.send(SessionCommand::MakeChoice { name, choice }).await
    }

    /// Tells the session its controller is gone.
    pub async fn shutdown(&self) -> Result<(), GameError> {
        self.send(SessionCommand::Shutdown).await
    }

    async fn send(&self, cmd: SessionCommand) -> Result<(), GameError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| GameError::Unavailable(self.name.clone()))
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// One participant's seat: identity, score, pending choice, and the
/// channel back to their connection. Seats are kept in join order.
struct Seat {
    name: String,
    score: u32,
    source: RemoteSource,
    sender: ClientSender,
}

/// The session actor state. Runs inside a Tokio task.
struct SessionActor {
    name: String,
    password: Option<String>,
    rules: RuleGraph,
    phase: Phase,
    controller: ClientSender,
    seats: Vec<Seat>,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl SessionActor {
    /// Runs the actor loop, processing commands until the session closes.
    async fn run(mut self) {
        tracing::info!(game = %self.name, "session started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Join {
                    name,
                    password,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(name, password, sender);
                    let _ = reply.send(result);
                }
                SessionCommand::Leave { name } => {
                    if self.handle_leave(&name) {
                        break;
                    }
                }
                SessionCommand::StartGame => self.handle_start(),
                SessionCommand::PlayerList { player } => {
                    self.handle_player_list(player);
                }
                SessionCommand::MakeChoice { name, choice } => {
                    self.handle_choice(&name, choice);
                }
                SessionCommand::Shutdown => {
                    tracing::info!(game = %self.name, "controller left, closing session");
                    self.close();
                    break;
                }
            }
        }

        tracing::info!(game = %self.name, "session closed");
    }

    fn handle_join(
        &mut self,
        name: String,
        password: Option<String>,
        sender: ClientSender,
    ) -> Result<(), GameError> {
        if !self.phase.is_open() {
            return Err(GameError::NotOpen(self.name.clone()));
        }
        if self.password.is_some() && self.password != password {
            return Err(GameError::BadPassword(self.name.clone()));
        }
        if self.seats.iter().any(|s| s.name == name) {
            return Err(GameError::NameTaken(name));
        }

        self.seats.push(Seat {
            name: name.clone(),
            score: 0,
            source: RemoteSource::new(),
            sender,
        });
        tracing::info!(
            game = %self.name,
            player = %name,
            players = self.seats.len(),
            "player joined"
        );

        // The newcomer gets the full rules and roster; everyone else
        // (including the controller) gets a notification.
        let response = ServerMessage::JoinResponse {
            rules: self.rules.clone(),
            players: self.roster(),
        };
        let newcomer = self.seats.last().expect("just pushed");
        send_to(&newcomer.sender, response);

        let joined = ServerMessage::PlayerJoined { name: name.clone() };
        send_to(&self.controller, joined.clone());
        for seat in self.seats.iter().filter(|s| s.name != name) {
            send_to(&seat.sender, joined.clone());
        }

        Ok(())
    }

    /// Handles a departure. Returns `true` if the session must close.
    fn handle_leave(&mut self, name: &str) -> bool {
        let Some(idx) = self.seats.iter().position(|s| s.name == name) else {
            tracing::debug!(game = %self.name, player = %name, "leave from unknown player");
            return false;
        };

        // A departure mid-round invalidates the round: the whole session
        // closes rather than substituting or pausing. No results are sent.
        if self.phase.is_started() {
            tracing::warn!(
                game = %self.name,
                player = %name,
                "player left mid-round, closing session"
            );
            self.close();
            return true;
        }

        self.seats.remove(idx);
        tracing::info!(
            game = %self.name,
            player = %name,
            players = self.seats.len(),
            "player left"
        );

        let left = ServerMessage::PlayerLeft {
            name: name.to_string(),
        };
        send_to(&self.controller, left.clone());
        for seat in &self.seats {
            send_to(&seat.sender, left.clone());
        }
        false
    }

    fn handle_start(&mut self) {
        if !self.phase.is_open() {
            self.report_to_controller(GameError::NotOpen(self.name.clone()));
            return;
        }
        if self.seats.is_empty() {
            self.report_to_controller(GameError::NoPlayers(self.name.clone()));
            return;
        }

        self.phase = Phase::Started;
        tracing::info!(
            game = %self.name,
            players = self.seats.len(),
            "round started"
        );
        for seat in &self.seats {
            send_to(&seat.sender, ServerMessage::ChoiceRequest);
        }
    }

    fn handle_player_list(&self, player: Option<String>) {
        let response = ServerMessage::PlayerListResponse {
            players: self.roster(),
        };
        match player {
            None => send_to(&self.controller, response),
            Some(name) => {
                if let Some(seat) = self.seats.iter().find(|s| s.name == name) {
                    send_to(&seat.sender, response);
                }
            }
        }
    }

    fn handle_choice(&mut self, name: &str, choice: String) {
        let Some(idx) = self.seats.iter().position(|s| s.name == name) else {
            tracing::debug!(game = %self.name, player = %name, "choice from unknown player");
            return;
        };

        if !self.phase.is_started() {
            self.report_to_seat(idx, GameError::NotStarted);
            return;
        }
        if self.seats[idx].source.has_pending() {
            self.report_to_seat(idx, GameError::AlreadySubmitted(name.to_string()));
            return;
        }
        if !self.rules.contains(&choice) {
            self.report_to_seat(idx, GameError::InvalidChoice(choice));
            return;
        }

        tracing::debug!(game = %self.name, player = %name, "choice submitted");
        self.seats[idx]
            .source
            .submit(choice)
            .expect("slot checked empty");
        self.try_reveal();
    }

    /// Reveals the round if — and only if — every seat has submitted.
    ///
    /// Called after every successful submission; a non-blocking poll, not
    /// a wait.
    fn try_reveal(&mut self) {
        if !self.seats.iter().all(|s| s.source.has_pending()) {
            return;
        }

        // Reset to Open before resolving, so a disconnect arriving during
        // the resolution window sees a finished round, not a live one.
        self.phase = Phase::Open;

        let round: Vec<(String, String)> = self
            .seats
            .iter_mut()
            .map(|seat| {
                let choice = seat
                    .source
                    .take()
                    .expect("every seat has a pending choice");
                (seat.name.clone(), choice)
            })
            .collect();

        let picks: Vec<&str> = round.iter().map(|(_, c)| c.as_str()).collect();
        let winner = self.rules.resolve(&picks).map(|idx| {
            // Seats and picks share an index: both are in join order.
            self.seats[idx].score += 1;
            self.seats[idx].name.clone()
        });

        tracing::info!(
            game = %self.name,
            winner = winner.as_deref().unwrap_or("(tie)"),
            "round resolved"
        );

        let results = ServerMessage::Results {
            choices: round.into_iter().collect::<BTreeMap<_, _>>(),
            winner,
        };
        send_to(&self.controller, results.clone());
        for seat in &self.seats {
            send_to(&seat.sender, results.clone());
        }
    }

    /// Best-effort close of the controller and every seat. Dead channels
    /// are skipped; this never fails.
    fn close(&self) {
        let _ = self.controller.send(Outbound::Close);
        for seat in &self.seats {
            let _ = seat.sender.send(Outbound::Close);
        }
    }

    fn roster(&self) -> Vec<PlayerEntry> {
        self.seats
            .iter()
            .map(|s| PlayerEntry {
                name: s.name.clone(),
                score: s.score,
            })
            .collect()
    }

    fn report_to_controller(&self, error: GameError) {
        send_to(
            &self.controller,
            ServerMessage::Error {
                message: error.to_string(),
            },
        );
    }

    fn report_to_seat(&self, idx: usize, error: GameError) {
        send_to(
            &self.seats[idx].sender,
            ServerMessage::Error {
                message: error.to_string(),
            },
        );
    }
}

/// Sends a message to a single connection. Silently drops if the receiver
/// is gone (the connection already died); the disconnect itself is handled
/// through the ordinary leave path.
fn send_to(sender: &ClientSender, msg: ServerMessage) {
    let _ = sender.send(Outbound::Message(msg));
}

/// Spawns a new session actor and returns a handle to communicate with it.
pub(crate) fn spawn_session(
    name: String,
    password: Option<String>,
    rules: RuleGraph,
    controller: ClientSender,
    channel_size: usize,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = SessionActor {
        name: name.clone(),
        password,
        rules,
        phase: Phase::Open,
        controller,
        seats: Vec::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    SessionHandle { name, sender: tx }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_predicates() {
        assert!(Phase::Open.is_open());
        assert!(!Phase::Open.is_started());
        assert!(Phase::Started.is_started());
        assert!(!Phase::Started.is_open());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Open.to_string(), "open");
        assert_eq!(Phase::Started.to_string(), "started");
    }
}
