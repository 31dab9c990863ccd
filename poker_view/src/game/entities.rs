use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::{cards::CardCode, layout::Seated};

/// Game phase as last reported by the server. Always `Waiting` outside a hand.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Phase {
    #[default]
    Waiting,
    Dealing,
    BringIn,
    Betting,
    Draw,
    Showdown,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown phase '{0}'")]
pub struct UnknownPhase(pub String);

impl FromStr for Phase {
    type Err = UnknownPhase;

    /// Case, spaces, dashes and underscores are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "waiting" | "wait" | "lobby" => Ok(Self::Waiting),
            "dealing" | "deal" => Ok(Self::Dealing),
            "bringin" => Ok(Self::BringIn),
            "betting" | "bet" => Ok(Self::Betting),
            "draw" | "drawing" => Ok(Self::Draw),
            "showdown" => Ok(Self::Showdown),
            _ => Err(UnknownPhase(s.to_string())),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Dealing => "dealing",
            Self::BringIn => "bring-in",
            Self::Betting => "betting",
            Self::Draw => "draw",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

/// A seated player's last reported action state.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(from = "RawPlayerState")]
pub enum PlayerState {
    #[default]
    Active,
    Folded,
    AllIn,
    Checked,
    Called,
    Raised,
}

/// The server sends either its numeric state code or a name.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPlayerState {
    Code(i64),
    Name(String),
}

impl From<RawPlayerState> for PlayerState {
    fn from(raw: RawPlayerState) -> Self {
        match raw {
            RawPlayerState::Code(code) => Self::from_code(code),
            RawPlayerState::Name(name) => Self::from_name(&name),
        }
    }
}

impl PlayerState {
    /// Codes other than the known action states (lobby, ready, spectating)
    /// all mean the player is still in the hand.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Folded,
            2 => Self::AllIn,
            3 => Self::Checked,
            4 => Self::Called,
            8 => Self::Raised,
            _ => Self::Active,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().replace(['_', '-', ' '], "").as_str() {
            "folded" | "fold" => Self::Folded,
            "allin" => Self::AllIn,
            "checked" | "check" => Self::Checked,
            "called" | "call" => Self::Called,
            "raised" | "raise" => Self::Raised,
            _ => Self::Active,
        }
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Active => "active",
            Self::Folded => "folded",
            Self::AllIn => "all-in",
            Self::Checked => "checked",
            Self::Called => "called",
            Self::Raised => "raised",
        };
        write!(f, "{repr}")
    }
}

/// Poker variants a lobby can host. Serialized as the server's numeric code.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum GameType {
    FiveCardDraw,
    SevenCardStud,
    TexasHoldem,
}

pub const GAME_TYPES: [GameType; 3] = [
    GameType::FiveCardDraw,
    GameType::SevenCardStud,
    GameType::TexasHoldem,
];

impl GameType {
    pub fn code(self) -> i32 {
        match self {
            Self::FiveCardDraw => 10,
            Self::SevenCardStud => 11,
            Self::TexasHoldem => 12,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        GAME_TYPES.into_iter().find(|game_type| game_type.code() == code)
    }

    /// The label the server uses in lobby listings.
    pub fn label(self) -> &'static str {
        match self {
            Self::FiveCardDraw => "5 Card Draw",
            Self::SevenCardStud => "7 Card Stud",
            Self::TexasHoldem => "Texas Hold'em",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        GAME_TYPES
            .into_iter()
            .find(|game_type| game_type.label().eq_ignore_ascii_case(label.trim()))
    }

    /// Name of the page that hosts this variant.
    pub fn page_name(self) -> &'static str {
        match self {
            Self::FiveCardDraw => "five_card",
            Self::SevenCardStud => "seven_card",
            Self::TexasHoldem => "texas_holdem",
        }
    }

    /// Only draw poker lets players exchange cards.
    pub fn has_draw_round(self) -> bool {
        matches!(self, Self::FiveCardDraw)
    }
}

impl From<GameType> for i32 {
    fn from(game_type: GameType) -> Self {
        game_type.code()
    }
}

impl TryFrom<i32> for GameType {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown game type code {code}"))
    }
}

impl FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "five" | "draw" | "5" | "five_card" => Ok(Self::FiveCardDraw),
            "seven" | "stud" | "7" | "seven_card" => Ok(Self::SevenCardStud),
            "holdem" | "texas" | "texas_holdem" => Ok(Self::TexasHoldem),
            other => other
                .parse::<i32>()
                .ok()
                .and_then(Self::from_code)
                .or_else(|| Self::from_label(s))
                .ok_or_else(|| format!("unknown game type '{s}'")),
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One participant as the local client currently sees them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PlayerView {
    pub name: String,
    pub chip_balance: i64,
    pub hand: Vec<CardCode>,
    pub state: PlayerState,
    pub is_spectator: bool,
    /// Set once the hand has been revealed at showdown.
    pub revealed: bool,
    pub hand_label: Option<String>,
    pub is_winner: bool,
}

impl PlayerView {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Seated for PlayerView {
    fn seat_name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Seat {
    pub player: PlayerView,
    pub angle: f64,
}

/// The table as of the last game start. Seats never change mid-game.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableView {
    pub seats: Vec<Seat>,
    pub pot: u64,
    pub phase: Phase,
    pub current_turn: Option<String>,
    /// Index into `seats` of the highlighted player.
    pub turn_seat: Option<usize>,
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn seat(&self, name: &str) -> Option<&Seat> {
        self.seats.iter().find(|seat| seat.player.name == name)
    }

    pub fn seat_mut(&mut self, name: &str) -> Option<&mut Seat> {
        self.seats.iter_mut().find(|seat| seat.player.name == name)
    }

    pub fn seat_index(&self, name: &str) -> Option<usize> {
        self.seats.iter().position(|seat| seat.player.name == name)
    }

    pub fn turn_player(&self) -> Option<&PlayerView> {
        self.turn_seat
            .and_then(|idx| self.seats.get(idx))
            .map(|seat| &seat.player)
    }

    pub fn winners(&self) -> impl Iterator<Item = &PlayerView> {
        self.seats
            .iter()
            .map(|seat| &seat.player)
            .filter(|player| player.is_winner)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShowdownEntry {
    pub player_name: String,
    pub revealed_hand: Vec<CardCode>,
    pub hand_label: Option<String>,
    pub is_winner: bool,
}

/// Outcome of a hand, kept on screen until the next game starts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShowdownResult {
    pub entries: Vec<ShowdownEntry>,
    pub pot_awarded: Option<u64>,
    pub summary: String,
}

impl ShowdownResult {
    pub fn winners(&self) -> impl Iterator<Item = &ShowdownEntry> {
        self.entries.iter().filter(|entry| entry.is_winner)
    }
}
