//! Reconstruction of the table from server game commands.
//!
//! [`state::GameState`] holds what the server has told us and nothing
//! else; it changes only when a command is applied. The
//! [`controller::GameController`] is the page that feeds it, tracks the
//! local draw selection and turns console commands into actions.

use thiserror::Error;

use entities::GameType;

/// The game page.
pub mod controller;

/// Phases, player views, the table and showdown results.
pub mod entities;

/// Table state driven by inbound commands.
pub mod state;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum GameError {
    #[error("Draw already submitted for this phase")]
    SelectionLocked,

    #[error("Card {index} is out of range for a hand of {hand_len}")]
    CardIndexOutOfRange { index: usize, hand_len: usize },

    #[error("{0} has no draw round")]
    NoDrawRound(GameType),
}
