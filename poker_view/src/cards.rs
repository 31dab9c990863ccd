//! Integer card codes as sent by the server.
//!
//! Codes `0..=51` are face-up cards, laid out suit-major: `code / 13` picks
//! the suit and `code % 13` picks the rank. While a card is face down the
//! server shifts its code by [`HIDDEN_OFFSET`], so the same card can show up
//! as `c` (known) or `c + 53` (hidden). Only [`reveal_at_showdown`] undoes
//! the shift.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of distinct face-up codes.
pub const DECK_SIZE: i32 = 52;

/// Shift applied by the server to a card that must not be shown yet.
pub const HIDDEN_OFFSET: i32 = 53;

const CARDS_PER_SUIT: i32 = 13;

/// Glyph rendered in place of a face-down card.
pub const HIDDEN_GLYPH: &str = "X";

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct CardCode(pub i32);

impl CardCode {
    /// Whether this code stands for a card that isn't face up.
    pub fn is_hidden(self) -> bool {
        !(0..DECK_SIZE).contains(&self.0)
    }
}

impl From<i32> for CardCode {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for CardCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", decode(*self))
    }
}

/// Suits in code order. Hearts own `0..=12`, clubs own `39..=51`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Heart,
    Diamond,
    Spade,
    Club,
}

pub const SUITS: [Suit; 4] = [Suit::Heart, Suit::Diamond, Suit::Spade, Suit::Club];

impl Suit {
    pub fn name(self) -> &'static str {
        match self {
            Self::Heart => "Hearts",
            Self::Diamond => "Diamonds",
            Self::Spade => "Spades",
            Self::Club => "Clubs",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Heart => "♥",
            Self::Diamond => "♦",
            Self::Spade => "♠",
            Self::Club => "♣",
        };
        write!(f, "{repr}")
    }
}

/// Ranks in code order within a suit; aces are low.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

pub const RANKS: [Rank; 13] = [
    Rank::Ace,
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
];

impl Rank {
    pub fn name(self) -> &'static str {
        match self {
            Self::Ace => "Ace",
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "Jack",
            Self::Queen => "Queen",
            Self::King => "King",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Ace => "A",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
            other => other.name(),
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn code(self) -> CardCode {
        CardCode(self.suit as i32 * CARDS_PER_SUIT + self.rank as i32)
    }

    /// e.g. "Queen of Spades".
    pub fn long_name(self) -> String {
        format!("{} of {}", self.rank.name(), self.suit.name())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.rank, self.suit)
    }
}

/// What a card code looks like to the local player.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CardFace {
    Known(Card),
    Hidden,
}

impl CardFace {
    pub fn card(self) -> Option<Card> {
        match self {
            Self::Known(card) => Some(card),
            Self::Hidden => None,
        }
    }

    pub fn long_name(self) -> String {
        match self {
            Self::Known(card) => card.long_name(),
            Self::Hidden => HIDDEN_GLYPH.to_string(),
        }
    }
}

impl fmt::Display for CardFace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Known(card) => write!(f, "{card}"),
            Self::Hidden => write!(f, "{HIDDEN_GLYPH}"),
        }
    }
}

/// Decodes a code for normal display. Anything outside `0..=51` renders as
/// hidden, including the stray code 52 and negative codes.
pub fn decode(code: CardCode) -> CardFace {
    if code.is_hidden() {
        return CardFace::Hidden;
    }
    CardFace::Known(Card {
        rank: RANKS[(code.0 % CARDS_PER_SUIT) as usize],
        suit: SUITS[(code.0 / CARDS_PER_SUIT) as usize],
    })
}

/// Decodes a code from a showdown reveal, where hidden codes are shifted
/// back before decoding.
pub fn reveal_at_showdown(code: CardCode) -> CardFace {
    if code.0 >= HIDDEN_OFFSET {
        decode(CardCode(code.0 - HIDDEN_OFFSET))
    } else {
        decode(code)
    }
}

/// The face-down code the server uses for `card`.
pub fn hide(card: Card) -> CardCode {
    CardCode(card.code().0 + HIDDEN_OFFSET)
}

/// Renders a hand with spaces between cards.
pub fn render_hand(codes: &[CardCode], revealed: bool) -> String {
    codes
        .iter()
        .map(|code| {
            let face = if revealed {
                reveal_at_showdown(*code)
            } else {
                decode(*code)
            };
            face.to_string()
        })
        .collect::<Vec<_>>()
        .join(" ")
}
