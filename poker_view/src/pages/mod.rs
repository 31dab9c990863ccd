//! Pages hosted by the relay.
//!
//! Exactly one page is active at a time. A page never touches the
//! connection: it receives inbound frames as [`ContextMessage::WebSocket`]
//! and talks back through its [`ParentPort`], which the relay drains after
//! every event. Navigation throws the page away and builds a fresh one, so
//! anything that must survive goes into the [`SessionStore`].

use log::{debug, error};
use std::fmt::{self, Write};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{
    commands::{ParseError, UserCommand},
    game::{GameError, controller::GameController, entities::GameType},
    net::messages::{ClientAction, ContextMessage, Envelope, Inbound, PAGE_EXTENSION},
    store::SessionStore,
};

/// The waiting room of a single lobby.
pub mod lobby;

/// Name entry and login.
pub mod login;

/// Bounded message log rendered by every page.
pub mod records;

/// Lobby browser shown after login.
pub mod server_lobby;

/// Personal statistics.
pub mod stats;

use records::{MessageLog, RecordKind, VISIBLE_RECORDS};

const RULE_WIDTH: usize = 80;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PageKind {
    Login,
    ServerLobby,
    Lobby,
    Stats,
    Game(GameType),
}

impl PageKind {
    /// Resolves a navigation target such as `"lobby"`, `"lobby.html"` or
    /// `"/five_card.html"`. The generic `in_game` target picks the variant
    /// remembered in the store.
    pub fn from_target(target: &str, store: &SessionStore) -> Option<Self> {
        let name = target.trim().trim_start_matches('/');
        let name = name.strip_suffix(PAGE_EXTENSION).unwrap_or(name);
        match name {
            "index" | "login" => Some(Self::Login),
            "server_lobby" => Some(Self::ServerLobby),
            "lobby" => Some(Self::Lobby),
            "stats" => Some(Self::Stats),
            "five_card" => Some(Self::Game(GameType::FiveCardDraw)),
            "seven_card" => Some(Self::Game(GameType::SevenCardStud)),
            "texas_holdem" => Some(Self::Game(GameType::TexasHoldem)),
            "in_game" | "game" => store.game_type().map(Self::Game),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::ServerLobby => "server_lobby",
            Self::Lobby => "lobby",
            Self::Stats => "stats",
            Self::Game(game_type) => game_type.page_name(),
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Self::Login => "login [NAME] | register [NAME] | help",
            Self::ServerLobby => {
                "players | lobbies | create NAME [five|seven|holdem] | join NAME | spectate NAME | stats | help"
            }
            Self::Lobby => "ready | start | info | stats | quit | help",
            Self::Stats => "stats | back | help",
            Self::Game(game_type) if game_type.has_draw_round() => {
                "check | call | fold | raise AMOUNT | all-in | select N | draw [N ...] | quit | help"
            }
            Self::Game(_) => "check | call | fold | raise AMOUNT | all-in | quit | help",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Errors a page reports back to the user for a console command.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("'{command}' isn't available on the {page} page")]
    Unsupported { command: String, page: PageKind },

    #[error("No username given. Use 'login NAME'")]
    MissingUsername,

    #[error(transparent)]
    Game(#[from] GameError),
}

impl PageError {
    pub fn unsupported(command: &UserCommand, page: PageKind) -> Self {
        Self::Unsupported {
            command: command.to_string(),
            page,
        }
    }
}

/// A page's only way to reach the outside world.
#[derive(Clone, Debug)]
pub struct ParentPort {
    tx: mpsc::UnboundedSender<ContextMessage>,
}

impl ParentPort {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ContextMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn post(&self, message: ContextMessage) {
        if self.tx.send(message).is_err() {
            debug!("page is no longer attached; post dropped");
        }
    }

    /// Asks the relay to send `action` to the server.
    pub fn send_action(&self, action: &ClientAction) {
        match action.to_frame() {
            Ok(data) => self.post(ContextMessage::SendWebSocket { data }),
            Err(err) => error!("{err}"),
        }
    }

    pub fn navigate(&self, target: impl Into<String>) {
        self.post(ContextMessage::Navigate {
            target: target.into(),
        });
    }
}

/// Settings every page may need when it's built.
#[derive(Clone, Debug, Default)]
pub struct PageSettings {
    /// Name offered when the user logs in without giving one.
    pub default_username: String,
}

pub trait Page {
    fn kind(&self) -> PageKind;

    fn on_message(&mut self, message: ContextMessage);

    fn on_command(&mut self, command: UserCommand) -> Result<(), PageError>;

    /// Called on the relay's refresh interval.
    fn on_refresh(&mut self) {}

    fn log_mut(&mut self) -> &mut MessageLog;

    fn render(&self) -> String;

    /// The game page, if this is one.
    fn as_game(&self) -> Option<&GameController> {
        None
    }
}

/// Builds a fresh page. Pages may post their initial requests right away.
pub fn open(
    kind: PageKind,
    port: ParentPort,
    store: SessionStore,
    settings: &PageSettings,
) -> Box<dyn Page> {
    match kind {
        PageKind::Login => Box::new(login::LoginPage::new(
            port,
            store,
            settings.default_username.clone(),
        )),
        PageKind::ServerLobby => Box::new(server_lobby::ServerLobbyPage::new(port, store)),
        PageKind::Lobby => Box::new(lobby::LobbyPage::new(port, store)),
        PageKind::Stats => Box::new(stats::StatsPage::new(port)),
        PageKind::Game(game_type) => Box::new(GameController::new(port, store, game_type)),
    }
}

/// Decodes a frame forwarded by the relay. Undecodable frames are logged
/// and dropped.
pub(crate) fn decode_frame(message: ContextMessage) -> Option<Inbound> {
    match message {
        ContextMessage::WebSocket { data } => match Inbound::parse(&data) {
            Ok(inbound) => Some(inbound),
            Err(err) => {
                debug!("dropping frame: {err}");
                None
            }
        },
        other => {
            debug!("ignoring {other:?} posted to a page");
            None
        }
    }
}

/// The envelope fields every page handles the same way.
pub(crate) fn apply_common(envelope: &Envelope, log: &mut MessageLog, port: &ParentPort) {
    if let Some(message) = &envelope.message {
        log.push(RecordKind::Server, message.as_str());
    }
    if let Some(error) = &envelope.error {
        log.push(RecordKind::Error, error.as_str());
    }
    if let Some(target) = &envelope.redirect {
        port.navigate(target.as_str());
    }
}

pub(crate) fn render_header(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", "═".repeat(RULE_WIDTH));
    let _ = writeln!(out, "{}", title.to_uppercase());
    let _ = writeln!(out, "{}", "═".repeat(RULE_WIDTH));
}

pub(crate) fn render_footer(out: &mut String, log: &MessageLog, kind: PageKind) {
    let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));
    for record in log.tail(VISIBLE_RECORDS) {
        let _ = writeln!(out, "{record}");
    }
    let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));
    let _ = writeln!(out, "Commands: {}", kind.help());
}
