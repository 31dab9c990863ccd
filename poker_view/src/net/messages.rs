use log::warn;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::fmt;

use super::errors::{ProtocolError, Result};
use crate::{
    cards::CardCode,
    game::entities::{GameType, PlayerState},
};

/// Prefix of the plain-text redirect frame older servers send.
pub const LEGACY_REDIRECT_PREFIX: &str = "redirect:";

/// Suffix older servers expect on a redirect target.
pub const PAGE_EXTENSION: &str = ".html";

/// Messages exchanged between the relay and the page it hosts.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ContextMessage {
    /// An inbound server frame, relay to page.
    #[serde(rename = "websocket")]
    WebSocket { data: String },
    /// An outbound frame the page wants sent, page to relay.
    #[serde(rename = "sendWebSocket")]
    SendWebSocket { data: String },
    /// A request to replace the active page, page to relay.
    #[serde(rename = "navigate")]
    Navigate { target: String },
}

/// An action the client asks the server to perform.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "action", content = "data")]
pub enum ClientAction {
    Login {
        username: String,
    },
    Register {
        username: String,
    },
    ShowPlayers,
    ShowLobbies,
    CreateLobby {
        lobby_name: String,
        game_type: GameType,
    },
    JoinLobby {
        lobby_name: String,
        spectate: bool,
    },
    DrawCards {
        #[serde(rename = "cardIndices")]
        card_indices: Vec<usize>,
    },
    ShowStats,
    ShowLobbyInfo,
    Disconnect,
    Ready,
    StartGame,
    Quit,
    Check,
    Fold,
    Call,
    Raise {
        amount: u32,
    },
    AllIn,
}

impl ClientAction {
    /// Encodes the action as a text frame.
    pub fn to_frame(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for ClientAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr: &str = match self {
            Self::Login { username } => &format!("logging in as {username}"),
            Self::Register { username } => &format!("registering {username}"),
            Self::ShowPlayers => "requested the player count",
            Self::ShowLobbies => "requested the lobby list",
            Self::CreateLobby {
                lobby_name,
                game_type,
            } => &format!("creating {game_type} lobby '{lobby_name}'"),
            Self::JoinLobby {
                lobby_name,
                spectate,
            } => &format!(
                "joining '{lobby_name}'{}",
                if *spectate { " as a spectator" } else { "" }
            ),
            Self::DrawCards { card_indices } => &format!("drawing at {card_indices:?}"),
            Self::ShowStats => "requested stats",
            Self::ShowLobbyInfo => "requested lobby info",
            Self::Disconnect => "disconnecting",
            Self::Ready => "ready",
            Self::StartGame => "starting the game",
            Self::Quit => "quitting",
            Self::Check => "check",
            Self::Fold => "fold",
            Self::Call => "call",
            Self::Raise { amount } => &format!("raise ${amount}"),
            Self::AllIn => "all-in",
        };
        write!(f, "{repr}")
    }
}

// === Inbound payloads ===

/// Accepts either a single value or a list of values.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(values) => values,
            OneOrMany::One(value) => vec![value],
        }
    }
}

fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<OneOrMany<T>>::deserialize(deserializer)?
        .map(Vec::from)
        .unwrap_or_default())
}

fn maybe_one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<OneOrMany<T>>::deserialize(deserializer)?.map(Vec::from))
}

/// A player entry inside `updatePlayers` or `startGame`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPayload {
    #[serde(alias = "username")]
    pub name: String,
    #[serde(alias = "chipBalance", alias = "chips")]
    pub wallet: Option<i64>,
    #[serde(alias = "cards")]
    pub hand: Option<Vec<CardCode>>,
    pub state: Option<PlayerState>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayersUpdate {
    #[serde(default, deserialize_with = "one_or_many")]
    pub players: Vec<PlayerPayload>,
    #[serde(default, deserialize_with = "maybe_one_or_many")]
    pub spectators: Option<Vec<String>>,
    pub game_active: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameStart {
    #[serde(default, deserialize_with = "one_or_many")]
    pub players: Vec<PlayerPayload>,
    #[serde(default, deserialize_with = "maybe_one_or_many")]
    pub spectators: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameInfoUpdate {
    pub pot: Option<u64>,
    /// Kept raw so an unknown phase doesn't discard the rest of the update.
    pub phase: Option<String>,
    #[serde(alias = "currentTurn", alias = "currentPlayer")]
    pub current_turn_player_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShowdownHand {
    #[serde(alias = "playerName")]
    pub name: String,
    #[serde(default, alias = "cards")]
    pub hand: Vec<CardCode>,
    #[serde(alias = "handName", alias = "handRank", alias = "label")]
    pub hand_label: Option<String>,
    #[serde(default, alias = "isWinner")]
    pub winner: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShowdownReveal {
    #[serde(default, alias = "players", deserialize_with = "one_or_many")]
    pub hands: Vec<ShowdownHand>,
    #[serde(alias = "pot")]
    pub pot_awarded: Option<u64>,
    #[serde(alias = "message")]
    pub summary_message: Option<String>,
}

/// A game command pushed by the server while a hand is running.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GameCommand {
    UpdatePlayers(PlayersUpdate),
    StartGame(GameStart),
    UpdateGameInfo(GameInfoUpdate),
    ShowdownHands(ShowdownReveal),
}

impl GameCommand {
    fn from_parts(command: &str, data: Value) -> Result<Self> {
        match command {
            "updatePlayers" => Ok(Self::UpdatePlayers(from_data(data)?)),
            // A broken player list still starts a fresh (empty) table.
            "startGame" => Ok(Self::StartGame(from_data(data).unwrap_or_else(|err| {
                warn!("malformed startGame payload: {err}");
                GameStart::default()
            }))),
            "updateGameInfo" => Ok(Self::UpdateGameInfo(from_data(data)?)),
            "showdownHands" => Ok(Self::ShowdownHands(from_data(data)?)),
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}

fn from_data<T: DeserializeOwned + Default>(data: Value) -> Result<T> {
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data).map_err(|err| ProtocolError::Shape(err.to_string()))
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LobbySummary {
    pub name: String,
    #[serde(default, rename = "type")]
    pub game_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub player_count: u32,
    #[serde(default)]
    pub max_players: u32,
}

impl LobbySummary {
    pub fn is_joinable(&self) -> bool {
        self.status.eq_ignore_ascii_case("joinable")
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LobbyInfo {
    pub name: String,
    #[serde(default)]
    pub game_type: String,
    #[serde(default)]
    pub player_count: u32,
    #[serde(default)]
    pub max_players: u32,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct LobbyMember {
    pub name: String,
    #[serde(default)]
    pub ready: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub username: String,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub games_won: u32,
    #[serde(default)]
    pub wallet: i64,
}

/// A non-command frame. Any subset of fields may be present.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub message: Option<String>,
    pub redirect: Option<String>,
    pub error: Option<String>,
    pub player_count: Option<u32>,
    #[serde(default, deserialize_with = "maybe_one_or_many")]
    pub lobbies: Option<Vec<LobbySummary>>,
    pub lobby_info: Option<LobbyInfo>,
    #[serde(default, deserialize_with = "maybe_one_or_many")]
    pub players: Option<Vec<LobbyMember>>,
    pub stats: Option<PlayerStats>,
}

impl Envelope {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A decoded server frame.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Inbound {
    Command(GameCommand),
    Envelope(Envelope),
    /// Plain `redirect:<target>` frame, with [`PAGE_EXTENSION`] appended.
    LegacyRedirect(String),
}

impl Inbound {
    /// Decodes a raw text frame. Callers are expected to log and drop
    /// frames that fail to decode.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(err) => {
                return legacy_redirect(raw)
                    .map(Self::LegacyRedirect)
                    .ok_or_else(|| ProtocolError::Malformed(err.to_string()));
            }
        };
        let mut fields = match value {
            Value::Object(fields) => fields,
            Value::String(text) => {
                return legacy_redirect(&text)
                    .map(Self::LegacyRedirect)
                    .ok_or_else(|| ProtocolError::Shape("bare string frame".to_string()));
            }
            _ => return Err(ProtocolError::Shape("expected a JSON object".to_string())),
        };
        if fields.get("type").and_then(Value::as_str) == Some("command") {
            let command = fields
                .get("command")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| ProtocolError::Shape("command frame without a name".to_string()))?;
            let data = fields.remove("data").unwrap_or(Value::Null);
            return GameCommand::from_parts(&command, data).map(Self::Command);
        }
        let envelope: Envelope = serde_json::from_value(Value::Object(fields))
            .map_err(|err| ProtocolError::Shape(err.to_string()))?;
        if envelope.is_empty() {
            Err(ProtocolError::Unrecognized)
        } else {
            Ok(Self::Envelope(envelope))
        }
    }
}

fn legacy_redirect(raw: &str) -> Option<String> {
    let target = raw
        .trim()
        .trim_matches('"')
        .strip_prefix(LEGACY_REDIRECT_PREFIX)?
        .trim();
    if target.is_empty() {
        None
    } else {
        Some(format!("{target}{PAGE_EXTENSION}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn command(raw: Value) -> GameCommand {
        match Inbound::parse(&raw.to_string()) {
            Ok(Inbound::Command(command)) => command,
            other => panic!("expected a command, got {other:?}"),
        }
    }

    fn envelope(raw: Value) -> Envelope {
        match Inbound::parse(&raw.to_string()) {
            Ok(Inbound::Envelope(envelope)) => envelope,
            other => panic!("expected an envelope, got {other:?}"),
        }
    }

    // === Outbound ===

    #[test]
    fn test_login_frame() {
        let frame = ClientAction::Login {
            username: "alice".to_string(),
        }
        .to_frame()
        .unwrap();
        assert_eq!(frame, r#"{"action":"Login","data":{"username":"alice"}}"#);
    }

    #[test]
    fn test_unit_action_frame_has_no_data() {
        assert_eq!(
            ClientAction::Disconnect.to_frame().unwrap(),
            r#"{"action":"Disconnect"}"#
        );
    }

    #[test]
    fn test_draw_cards_frame() {
        let frame = ClientAction::DrawCards {
            card_indices: vec![0, 3],
        }
        .to_frame()
        .unwrap();
        assert_eq!(
            frame,
            r#"{"action":"DrawCards","data":{"cardIndices":[0,3]}}"#
        );
    }

    #[test]
    fn test_create_lobby_frame_uses_game_type_code() {
        let frame = ClientAction::CreateLobby {
            lobby_name: "friday".to_string(),
            game_type: GameType::SevenCardStud,
        }
        .to_frame()
        .unwrap();
        assert_eq!(
            frame,
            r#"{"action":"CreateLobby","data":{"lobby_name":"friday","game_type":11}}"#
        );
    }

    #[test]
    fn test_context_message_tags() {
        let message = ContextMessage::SendWebSocket {
            data: "{}".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"type": "sendWebSocket", "data": "{}"})
        );
        let parsed: ContextMessage =
            serde_json::from_value(json!({"type": "navigate", "target": "lobby.html"})).unwrap();
        assert_eq!(
            parsed,
            ContextMessage::Navigate {
                target: "lobby.html".to_string()
            }
        );
    }

    // === Commands ===

    #[test]
    fn test_parse_start_game() {
        let parsed = command(json!({
            "type": "command",
            "command": "startGame",
            "data": {"players": [
                {"name": "alice", "wallet": 100, "hand": [0, 53]},
                {"name": "bob", "chipBalance": 90}
            ]}
        }));
        let GameCommand::StartGame(start) = parsed else {
            panic!("expected startGame");
        };
        assert_eq!(start.players.len(), 2);
        assert_eq!(start.players[0].hand, Some(vec![CardCode(0), CardCode(53)]));
        assert_eq!(start.players[1].wallet, Some(90));
    }

    #[test]
    fn test_parse_start_game_with_broken_players_gives_empty_start() {
        let parsed = command(json!({
            "type": "command",
            "command": "startGame",
            "data": {"players": "nope"}
        }));
        assert_eq!(parsed, GameCommand::StartGame(GameStart::default()));
    }

    #[test]
    fn test_parse_update_players_single_object() {
        let parsed = command(json!({
            "type": "command",
            "command": "updatePlayers",
            "data": {"players": {"name": "alice", "state": 1}, "spectators": "carol"}
        }));
        let GameCommand::UpdatePlayers(update) = parsed else {
            panic!("expected updatePlayers");
        };
        assert_eq!(update.players.len(), 1);
        assert_eq!(update.players[0].state, Some(PlayerState::Folded));
        assert_eq!(update.spectators, Some(vec!["carol".to_string()]));
    }

    #[test]
    fn test_parse_game_info_aliases() {
        let parsed = command(json!({
            "type": "command",
            "command": "updateGameInfo",
            "data": {"pot": 40, "phase": "BETTING", "currentTurn": "bob"}
        }));
        assert_eq!(
            parsed,
            GameCommand::UpdateGameInfo(GameInfoUpdate {
                pot: Some(40),
                phase: Some("BETTING".to_string()),
                current_turn_player_name: Some("bob".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_showdown() {
        let parsed = command(json!({
            "type": "command",
            "command": "showdownHands",
            "data": {
                "hands": [{"name": "alice", "hand": [53], "handName": "Pair", "winner": true}],
                "pot": 120
            }
        }));
        let GameCommand::ShowdownHands(reveal) = parsed else {
            panic!("expected showdownHands");
        };
        assert_eq!(reveal.pot_awarded, Some(120));
        assert_eq!(reveal.hands[0].hand_label.as_deref(), Some("Pair"));
        assert!(reveal.hands[0].winner);
        assert_eq!(reveal.summary_message, None);
    }

    #[test]
    fn test_parse_unknown_command() {
        let result = Inbound::parse(r#"{"type":"command","command":"dance","data":{}}"#);
        assert!(matches!(result, Err(ProtocolError::UnknownCommand(name)) if name == "dance"));
    }

    #[test]
    fn test_parse_command_with_bad_shape() {
        let result = Inbound::parse(r#"{"type":"command","command":"updateGameInfo","data":{"pot":-5}}"#);
        assert!(matches!(result, Err(ProtocolError::Shape(_))));
    }

    // === Envelopes ===

    #[test]
    fn test_parse_message_and_redirect() {
        let parsed = envelope(json!({"message": "Welcome", "redirect": "server_lobby"}));
        assert_eq!(parsed.message.as_deref(), Some("Welcome"));
        assert_eq!(parsed.redirect.as_deref(), Some("server_lobby"));
    }

    #[test]
    fn test_parse_lobby_list() {
        let parsed = envelope(json!({"lobbies": [
            {"name": "l1", "status": "Joinable", "type": "5 Card Draw", "playerCount": 2, "maxPlayers": 5}
        ]}));
        let lobbies = parsed.lobbies.unwrap();
        assert_eq!(lobbies[0].game_type, "5 Card Draw");
        assert!(lobbies[0].is_joinable());
        assert_eq!(lobbies[0].max_players, 5);
    }

    #[test]
    fn test_parse_lobby_info_and_players() {
        let parsed = envelope(json!({
            "lobbyInfo": {"name": "l1", "gameType": "7 Card Stud", "playerCount": 1, "maxPlayers": 7},
            "players": [{"name": "alice", "ready": true}]
        }));
        assert_eq!(parsed.lobby_info.unwrap().game_type, "7 Card Stud");
        assert!(parsed.players.unwrap()[0].ready);
    }

    #[test]
    fn test_parse_stats_and_player_count() {
        let parsed = envelope(json!({
            "stats": {"username": "alice", "gamesPlayed": 4, "gamesWon": 1, "wallet": 950}
        }));
        assert_eq!(parsed.stats.unwrap().games_won, 1);
        assert_eq!(envelope(json!({"playerCount": 3})).player_count, Some(3));
    }

    #[test]
    fn test_parse_unrecognized_envelope() {
        assert!(matches!(
            Inbound::parse(r#"{"hello":"world"}"#),
            Err(ProtocolError::Unrecognized)
        ));
    }

    #[test]
    fn test_parse_non_object() {
        assert!(matches!(Inbound::parse("[1,2]"), Err(ProtocolError::Shape(_))));
    }

    // === Legacy and malformed ===

    #[test]
    fn test_parse_legacy_redirect() {
        assert_eq!(
            Inbound::parse("redirect:lobby").unwrap(),
            Inbound::LegacyRedirect("lobby.html".to_string())
        );
        assert_eq!(
            Inbound::parse("\"redirect:server_lobby\"").unwrap(),
            Inbound::LegacyRedirect("server_lobby.html".to_string())
        );
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            Inbound::parse("{not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            Inbound::parse("redirect:"),
            Err(ProtocolError::Malformed(_))
        ));
    }
}
