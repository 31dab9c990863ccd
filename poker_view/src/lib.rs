//! # Poker View
//!
//! The client side of a multiplayer poker server: one shared WebSocket
//! connection, a set of pages that take turns using it, and the
//! reconstruction of the table from the server's game commands.
//!
//! ## Architecture
//!
//! - The [`Relay`] owns the only connection for the whole session. It
//!   forwards every inbound frame to the active page and sends whatever the
//!   page posts back. Pages never touch the connection themselves.
//! - Pages ([`pages`]) are swapped on navigation: login, the server lobby,
//!   a lobby's waiting room, stats, and one game page per variant.
//! - The game page ([`GameController`]) rebuilds a [`TableView`] from
//!   `startGame`, `updatePlayers`, `updateGameInfo` and `showdownHands`
//!   commands. Seats are laid out with the local player at the bottom
//!   ([`layout`]) and cards decoded from integer codes ([`cards`]).
//!
//! ## Example
//!
//! ```
//! use poker_view::cards::{CardCode, decode, reveal_at_showdown};
//!
//! assert_eq!(decode(CardCode(0)).to_string(), "A/♥");
//! assert_eq!(decode(CardCode(53)).to_string(), "X");
//! assert_eq!(reveal_at_showdown(CardCode(53)).to_string(), "A/♥");
//! ```

/// Integer card codes and their display.
pub mod cards;

/// Console command parsing.
pub mod commands;

/// Game state reconstruction and the game page.
pub mod game;
pub use game::{
    GameError,
    controller::{DrawSelection, GameController},
    entities::{self, GameType, Phase, PlayerState, PlayerView, TableView},
    state::GameState,
};

/// Seat angles around the table.
pub mod layout;

/// Connection, protocol messages and the relay.
pub mod net;
pub use net::{
    connection::{Connection, ConnectionState, Transport},
    errors::{ProtocolError, RelayError, TransportError},
    messages,
    relay::{REFRESH_INTERVAL, Relay},
};

/// Pages hosted by the relay.
pub mod pages;
pub use pages::{Page, PageKind, PageSettings, ParentPort};

/// Session storage shared across pages.
pub mod store;
pub use store::SessionStore;
