//! Core protocol types for Roshambo's wire format.
//!
//! Every message is an internally tagged JSON object: the `type` field
//! names the variant and the remaining fields sit alongside it, e.g.
//!
//! ```json
//! { "type": "Join", "player": "alice", "game": "lunchtime" }
//! ```
//!
//! A connection's first message must be [`ClientMessage::Create`] (which
//! makes it the game's controller) or [`ClientMessage::Join`] (which makes
//! it a participant). Everything after that is routed to the owning
//! session.

use std::collections::BTreeMap;

use roshambo_rules::RuleGraph;
use serde::{Deserialize, Serialize};

/// One roster entry: a participant's name and running score.
///
/// Scores start at zero and only the server increments them (one point to
/// the round winner, none on a tie).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub name: String,
    pub score: u32,
}

/// Messages sent by clients to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// First message of a controller connection: create a named game.
    ///
    /// `password` is an optional shared secret participants must present
    /// to join. `rules` is the initial rule graph in its wire form (a map
    /// of choice name → beaten names).
    Create {
        game: String,
        password: Option<String>,
        rules: RuleGraph,
    },

    /// First message of a participant connection: join an existing game
    /// by name.
    Join {
        player: String,
        game: String,
        password: Option<String>,
    },

    /// Request the current roster. Valid from either role.
    PlayerList,

    /// Begin a round. Controller only.
    StartGame,

    /// Submit a choice for the round in progress. Participant only.
    MakeChoice { choice: String },
}

/// Messages sent by the server to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// The game was created; the connection is now its controller.
    Created { game: String },

    /// Sent to a participant on successful join: the full rule graph and
    /// the roster as of the join (including the new participant).
    JoinResponse {
        rules: RuleGraph,
        players: Vec<PlayerEntry>,
    },

    /// A participant joined. Sent to everyone except the new participant
    /// (who gets [`JoinResponse`](Self::JoinResponse) instead).
    PlayerJoined { name: String },

    /// A participant left an open game. Sent to everyone remaining.
    PlayerLeft { name: String },

    /// The current roster, with scores.
    PlayerListResponse { players: Vec<PlayerEntry> },

    /// A round has started: submit a choice. Sent to every participant.
    ChoiceRequest,

    /// Round outcome: every participant's submitted choice, plus the
    /// winner's name — or `null` for a tie.
    Results {
        choices: BTreeMap<String, String>,
        winner: Option<String>,
    },

    /// Something went wrong. For protocol violations (bad first message,
    /// failed join, role-invalid request) this accompanies connection
    /// closure; for in-round mistakes (double submission, unknown choice)
    /// the connection stays open.
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Wire-shape tests. The JSON layout is the contract with client
    //! implementations, so these assert exact shapes, not just round-trips.

    use super::*;

    fn classic_graph() -> RuleGraph {
        RuleGraph::classic()
    }

    // =====================================================================
    // ClientMessage
    // =====================================================================

    #[test]
    fn test_create_json_format() {
        let msg = ClientMessage::Create {
            game: "lunchtime".into(),
            password: Some("hunter2".into()),
            rules: classic_graph(),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "Create");
        assert_eq!(json["game"], "lunchtime");
        assert_eq!(json["password"], "hunter2");
        assert_eq!(json["rules"]["Rock"], serde_json::json!(["Scissors"]));
    }

    #[test]
    fn test_create_without_password_decodes_as_none() {
        // A missing `password` field is accepted and becomes None.
        let json = r#"{"type":"Create","game":"g","rules":{}}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();

        match msg {
            ClientMessage::Create { password, rules, .. } => {
                assert!(password.is_none());
                assert!(rules.is_empty());
            }
            other => panic!("expected Create, got {other:?}"),
        }
    }

    #[test]
    fn test_join_round_trip() {
        let msg = ClientMessage::Join {
            player: "alice".into(),
            game: "lunchtime".into(),
            password: None,
        };
        let bytes = serde_json::to_vec(&msg).unwrap();
        let decoded: ClientMessage = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_player_list_json_format() {
        // Unit variants still carry the tag and nothing else.
        let json = serde_json::to_string(&ClientMessage::PlayerList).unwrap();
        assert_eq!(json, r#"{"type":"PlayerList"}"#);
    }

    #[test]
    fn test_start_game_round_trip() {
        let msg = ClientMessage::StartGame;
        let bytes = serde_json::to_vec(&msg).unwrap();
        let decoded: ClientMessage = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_make_choice_json_format() {
        let msg = ClientMessage::MakeChoice {
            choice: "Rock".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "MakeChoice");
        assert_eq!(json["choice"], "Rock");
    }

    // =====================================================================
    // ServerMessage
    // =====================================================================

    #[test]
    fn test_created_round_trip() {
        let msg = ServerMessage::Created { game: "g".into() };
        let bytes = serde_json::to_vec(&msg).unwrap();
        let decoded: ServerMessage = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_join_response_carries_rules_and_roster() {
        let msg = ServerMessage::JoinResponse {
            rules: classic_graph(),
            players: vec![
                PlayerEntry { name: "alice".into(), score: 2 },
                PlayerEntry { name: "bob".into(), score: 0 },
            ],
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "JoinResponse");
        assert_eq!(json["rules"]["Paper"], serde_json::json!(["Rock"]));
        assert_eq!(json["players"][0]["name"], "alice");
        assert_eq!(json["players"][0]["score"], 2);
        assert_eq!(json["players"][1]["name"], "bob");
    }

    #[test]
    fn test_player_joined_json_format() {
        let msg = ServerMessage::PlayerJoined { name: "carol".into() };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "PlayerJoined");
        assert_eq!(json["name"], "carol");
    }

    #[test]
    fn test_player_left_round_trip() {
        let msg = ServerMessage::PlayerLeft { name: "carol".into() };
        let bytes = serde_json::to_vec(&msg).unwrap();
        let decoded: ServerMessage = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_choice_request_json_format() {
        let json = serde_json::to_string(&ServerMessage::ChoiceRequest).unwrap();
        assert_eq!(json, r#"{"type":"ChoiceRequest"}"#);
    }

    #[test]
    fn test_results_winner_json_format() {
        let msg = ServerMessage::Results {
            choices: BTreeMap::from([
                ("alice".to_string(), "Rock".to_string()),
                ("bob".to_string(), "Scissors".to_string()),
            ]),
            winner: Some("alice".into()),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "Results");
        assert_eq!(json["choices"]["alice"], "Rock");
        assert_eq!(json["choices"]["bob"], "Scissors");
        assert_eq!(json["winner"], "alice");
    }

    #[test]
    fn test_results_tie_serializes_null_winner() {
        // A tie is `"winner": null`, not a missing field.
        let msg = ServerMessage::Results {
            choices: BTreeMap::from([
                ("alice".to_string(), "Rock".to_string()),
                ("bob".to_string(), "Rock".to_string()),
            ]),
            winner: None,
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert!(json["winner"].is_null());
    }

    #[test]
    fn test_error_json_format() {
        let msg = ServerMessage::Error {
            message: "name taken".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "Error");
        assert_eq!(json["message"], "name taken");
    }

    // =====================================================================
    // Malformed input
    // =====================================================================

    #[test]
    fn test_decode_garbage_returns_error() {
        let garbage = b"not json at all";
        let result: Result<ClientMessage, _> = serde_json::from_slice(garbage);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_unknown_type_returns_error() {
        let unknown = r#"{"type":"FlyToMoon","speed":9000}"#;
        let result: Result<ClientMessage, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_fields_returns_error() {
        // A Join without a game name is not a Join.
        let wrong = r#"{"type":"Join","player":"alice"}"#;
        let result: Result<ClientMessage, _> = serde_json::from_str(wrong);
        assert!(result.is_err());
    }
}
