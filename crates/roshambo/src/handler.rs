//! Per-connection handler: role negotiation and message routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive the first message — it must be `Create` or `Join` and
//!      fixes the connection's role for its lifetime.
//!   2. Controller: register the game, relay `StartGame`/`PlayerList`,
//!      and on exit tear the session down and release the name.
//!   3. Participant: join the game, relay `MakeChoice`/`PlayerList`, and
//!      on exit report the departure (the session decides whether that is
//!      fatal to the round).
//!
//! In both roles a `select!` loop pumps inbound frames to the session
//! actor and outbound session traffic to the socket.

use std::sync::Arc;

use roshambo_protocol::{ClientMessage, Codec, ServerMessage};
use roshambo_rules::RuleGraph;
use roshambo_session::{Outbound, SessionHandle};
use roshambo_transport::{Connection, WsConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::ServerError;

type OutboundRx = mpsc::UnboundedReceiver<Outbound>;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WsConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ServerError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // The first message decides the connection's role. No read timeout:
    // a silent client simply occupies a socket until it hangs up.
    let Some(data) = conn.recv().await? else {
        tracing::debug!(%conn_id, "closed before first message");
        return Ok(());
    };

    let first: ClientMessage = match state.codec.decode(&data) {
        Ok(msg) => msg,
        Err(e) => {
            send_error(&conn, &state.codec, &format!("invalid message: {e}")).await?;
            let _ = conn.close().await;
            return Ok(());
        }
    };

    match first {
        ClientMessage::Create {
            game,
            password,
            rules,
        } => run_controller(conn, state, game, password, rules).await,
        ClientMessage::Join {
            player,
            game,
            password,
        } => run_participant(conn, state, player, game, password).await,
        _ => {
            send_error(&conn, &state.codec, "first message must be Create or Join")
                .await?;
            let _ = conn.close().await;
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

async fn run_controller<C: Codec>(
    conn: WsConnection,
    state: Arc<ServerState<C>>,
    game: String,
    password: Option<String>,
    rules: RuleGraph,
) -> Result<(), ServerError> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    // Lock only for registration, drop before any network I/O.
    let created = {
        let mut registry = state.registry.lock().await;
        registry.create(&game, password, rules, tx)
    };
    let handle = match created {
        Ok(handle) => handle,
        Err(e) => {
            send_error(&conn, &state.codec, &e.to_string()).await?;
            let _ = conn.close().await;
            return Ok(());
        }
    };

    tracing::info!(conn = %conn.id(), game = %game, "controller connected");
    send_message(
        &conn,
        &state.codec,
        &ServerMessage::Created { game: game.clone() },
    )
    .await?;

    let result = controller_loop(&conn, &state, &game, &handle, &mut rx).await;

    // Controller gone: tear the session down and release the name. This
    // is the sole destruction path for a game.
    let _ = handle.shutdown().await;
    state.registry.lock().await.remove(&game);
    let _ = conn.close().await;
    tracing::info!(game = %game, "controller disconnected");
    result
}

async fn controller_loop<C: Codec>(
    conn: &WsConnection,
    state: &ServerState<C>,
    game: &str,
    handle: &SessionHandle,
    rx: &mut OutboundRx,
) -> Result<(), ServerError> {
    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let Some(frame) = decode_frame(state, game, inbound) else {
                    continue;
                };
                match frame {
                    Frame::Closed => break,
                    Frame::Message(ClientMessage::StartGame) => {
                        let _ = handle.start_game().await;
                    }
                    Frame::Message(ClientMessage::PlayerList) => {
                        let _ = handle.player_list(None).await;
                    }
                    Frame::Message(_) => {
                        send_error(conn, &state.codec, "invalid request for a controller")
                            .await?;
                        break;
                    }
                }
            }
            outbound = rx.recv() => {
                match outbound {
                    Some(Outbound::Message(msg)) => {
                        send_message(conn, &state.codec, &msg).await?;
                    }
                    Some(Outbound::Close) | None => break,
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

async fn run_participant<C: Codec>(
    conn: WsConnection,
    state: Arc<ServerState<C>>,
    player: String,
    game: String,
    password: Option<String>,
) -> Result<(), ServerError> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let lookup = state.registry.lock().await.get(&game);
    let handle = match lookup {
        Ok(handle) => handle,
        Err(e) => {
            send_error(&conn, &state.codec, &e.to_string()).await?;
            let _ = conn.close().await;
            return Ok(());
        }
    };

    if let Err(e) = handle.join(player.clone(), password, tx).await {
        send_error(&conn, &state.codec, &e.to_string()).await?;
        let _ = conn.close().await;
        return Ok(());
    }
    tracing::info!(
        conn = %conn.id(),
        game = %game,
        player = %player,
        "participant connected"
    );

    let result = participant_loop(&conn, &state, &game, &player, &handle, &mut rx).await;

    // Ordinary close path. The session decides whether this departure is
    // a plain leave or, mid-round, fatal to the whole session.
    let _ = handle.leave(player.clone()).await;
    let _ = conn.close().await;
    tracing::info!(game = %game, player = %player, "participant disconnected");
    result
}

async fn participant_loop<C: Codec>(
    conn: &WsConnection,
    state: &ServerState<C>,
    game: &str,
    player: &str,
    handle: &SessionHandle,
    rx: &mut OutboundRx,
) -> Result<(), ServerError> {
    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let Some(frame) = decode_frame(state, game, inbound) else {
                    continue;
                };
                match frame {
                    Frame::Closed => break,
                    Frame::Message(ClientMessage::MakeChoice { choice }) => {
                        let _ = handle.make_choice(player.to_string(), choice).await;
                    }
                    Frame::Message(ClientMessage::PlayerList) => {
                        let _ = handle.player_list(Some(player.to_string())).await;
                    }
                    Frame::Message(_) => {
                        send_error(conn, &state.codec, "invalid request for a participant")
                            .await?;
                        break;
                    }
                }
            }
            outbound = rx.recv() => {
                match outbound {
                    Some(Outbound::Message(msg)) => {
                        send_message(conn, &state.codec, &msg).await?;
                    }
                    Some(Outbound::Close) | None => break,
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

/// A decoded inbound event: a message, or the end of the connection.
enum Frame {
    Message(ClientMessage),
    Closed,
}

/// Turns a raw recv result into a [`Frame`]. Undecodable frames are
/// logged and skipped (`None`); transport errors end the connection.
fn decode_frame<C: Codec>(
    state: &ServerState<C>,
    game: &str,
    inbound: Result<Option<Vec<u8>>, roshambo_transport::TransportError>,
) -> Option<Frame> {
    let data = match inbound {
        Ok(Some(data)) => data,
        Ok(None) => return Some(Frame::Closed),
        Err(e) => {
            tracing::debug!(game = %game, error = %e, "recv error");
            return Some(Frame::Closed);
        }
    };
    match state.codec.decode(&data) {
        Ok(msg) => Some(Frame::Message(msg)),
        Err(e) => {
            tracing::debug!(game = %game, error = %e, "undecodable frame, skipping");
            None
        }
    }
}

/// Encodes and sends one server message.
async fn send_message<C: Codec>(
    conn: &WsConnection,
    codec: &C,
    msg: &ServerMessage,
) -> Result<(), ServerError> {
    let bytes = codec.encode(msg)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// Sends a `ServerMessage::Error` to the client.
async fn send_error<C: Codec>(
    conn: &WsConnection,
    codec: &C,
    message: &str,
) -> Result<(), ServerError> {
    send_message(
        conn,
        codec,
        &ServerMessage::Error {
            message: message.to_string(),
        },
    )
    .await
}
