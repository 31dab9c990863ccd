use std::fmt;

use crate::game::entities::GameType;

/// A console command typed by the user. Which page accepts which command
/// is up to the page.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UserCommand {
    Login(Option<String>),
    Register(Option<String>),
    Players,
    Lobbies,
    Create { name: String, game_type: GameType },
    Join { name: String, spectate: bool },
    Stats,
    Back,
    Info,
    Ready,
    Start,
    Quit,
    /// Toggle one card of the local hand in the draw selection.
    Select(usize),
    /// Submit the draw. An empty list submits whatever is selected.
    Draw(Vec<usize>),
    Check,
    Fold,
    Call,
    Raise(u32),
    AllIn,
    Help,
}

impl fmt::Display for UserCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Login(_) => "login",
            Self::Register(_) => "register",
            Self::Players => "players",
            Self::Lobbies => "lobbies",
            Self::Create { .. } => "create",
            Self::Join { .. } => "join",
            Self::Stats => "stats",
            Self::Back => "back",
            Self::Info => "info",
            Self::Ready => "ready",
            Self::Start => "start",
            Self::Quit => "quit",
            Self::Select(_) => "select",
            Self::Draw(_) => "draw",
            Self::Check => "check",
            Self::Fold => "fold",
            Self::Call => "call",
            Self::Raise(_) => "raise",
            Self::AllIn => "all-in",
            Self::Help => "help",
        };
        write!(f, "{repr}")
    }
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid raise amount (not a valid number).
    InvalidRaiseAmount(String),
    /// Raise command missing an amount.
    RaiseMissingAmount,
    /// Card index that isn't a number.
    InvalidCardIndex(String),
    /// Lobby command missing the lobby name.
    MissingLobbyName(&'static str),
    /// Game type that doesn't name a known variant.
    UnknownGameType(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRaiseAmount(value) => write!(
                f,
                "Invalid raise amount '{value}'. Must be a positive number (e.g., 'raise 100')"
            ),
            Self::RaiseMissingAmount => write!(f, "Raise requires an amount (e.g., 'raise 100')"),
            Self::InvalidCardIndex(value) => write!(
                f,
                "Invalid card index '{value}'. Use card positions starting at 0 (e.g., 'draw 0 3')"
            ),
            Self::MissingLobbyName(command) => {
                write!(f, "'{command}' requires a lobby name (e.g., '{command} friday')")
            }
            Self::UnknownGameType(value) => write!(
                f,
                "Unknown game type '{value}'. Use 'five', 'seven', or 'holdem'"
            ),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{cmd}'. Type 'help' to see available commands"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a command string into a UserCommand.
///
/// # Examples
///
/// ```
/// use poker_view::commands::{UserCommand, parse_command};
///
/// assert_eq!(parse_command("call"), Ok(UserCommand::Call));
/// assert_eq!(parse_command("raise 100"), Ok(UserCommand::Raise(100)));
/// assert_eq!(parse_command("draw 0 4"), Ok(UserCommand::Draw(vec![0, 4])));
/// ```
pub fn parse_command(input: &str) -> Result<UserCommand, ParseError> {
    let trimmed = input.trim();

    // Try single-word commands first
    match trimmed {
        "all-in" | "allin" => return Ok(UserCommand::AllIn),
        "back" => return Ok(UserCommand::Back),
        "call" => return Ok(UserCommand::Call),
        "check" => return Ok(UserCommand::Check),
        "fold" => return Ok(UserCommand::Fold),
        "help" => return Ok(UserCommand::Help),
        "info" => return Ok(UserCommand::Info),
        "lobbies" => return Ok(UserCommand::Lobbies),
        "players" => return Ok(UserCommand::Players),
        "quit" => return Ok(UserCommand::Quit),
        "ready" => return Ok(UserCommand::Ready),
        "start" => return Ok(UserCommand::Start),
        "stats" => return Ok(UserCommand::Stats),
        _ => {}
    }

    // Parse multi-word commands
    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.first() {
        Some(&"login") => Ok(UserCommand::Login(parts.get(1).map(|s| s.to_string()))),
        Some(&"register") => Ok(UserCommand::Register(parts.get(1).map(|s| s.to_string()))),
        Some(&"raise") => parse_raise_command(&parts),
        Some(&"create") => parse_create_command(&parts),
        Some(&"join") => parse_join_command(&parts, false),
        Some(&"spectate") => parse_join_command(&parts, true),
        Some(&"select") => match parts.get(1) {
            Some(value) => parse_card_index(value).map(UserCommand::Select),
            None => Err(ParseError::InvalidCardIndex(String::new())),
        },
        Some(&"draw") => parts[1..]
            .iter()
            .map(|value| parse_card_index(value))
            .collect::<Result<Vec<_>, _>>()
            .map(UserCommand::Draw),
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Parse a raise command: "raise AMOUNT"
fn parse_raise_command(parts: &[&str]) -> Result<UserCommand, ParseError> {
    let value = parts.get(1).ok_or(ParseError::RaiseMissingAmount)?;
    let amount = value
        .parse::<u32>()
        .ok()
        .filter(|amount| *amount > 0)
        .ok_or_else(|| ParseError::InvalidRaiseAmount(value.to_string()))?;
    Ok(UserCommand::Raise(amount))
}

/// Parse a create command: "create NAME [five|seven|holdem]"
fn parse_create_command(parts: &[&str]) -> Result<UserCommand, ParseError> {
    let name = parts.get(1).ok_or(ParseError::MissingLobbyName("create"))?;
    let game_type = match parts.get(2) {
        Some(value) => value
            .parse::<GameType>()
            .map_err(|_| ParseError::UnknownGameType(value.to_string()))?,
        None => GameType::FiveCardDraw,
    };
    Ok(UserCommand::Create {
        name: name.to_string(),
        game_type,
    })
}

/// Parse a join command: "join NAME" or "spectate NAME"
fn parse_join_command(parts: &[&str], spectate: bool) -> Result<UserCommand, ParseError> {
    let command = if spectate { "spectate" } else { "join" };
    let name = parts.get(1).ok_or(ParseError::MissingLobbyName(command))?;
    Ok(UserCommand::Join {
        name: name.to_string(),
        spectate,
    })
}

fn parse_card_index(value: &str) -> Result<usize, ParseError> {
    value
        .parse::<usize>()
        .map_err(|_| ParseError::InvalidCardIndex(value.to_string()))
}
