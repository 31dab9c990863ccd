use log::{debug, info, warn};
use std::collections::HashSet;

use super::entities::{Phase, PlayerView, Seat, ShowdownEntry, ShowdownResult, TableView};
use crate::{
    layout::compute_seats,
    net::messages::{GameInfoUpdate, GameStart, PlayersUpdate, ShowdownReveal},
};

/// Summary shown when a showdown arrives without a message.
pub const DEFAULT_SHOWDOWN_SUMMARY: &str = "Showdown";

/// What the local client knows about the current game.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameState {
    local_name: String,
    table: TableView,
    showdown: Option<ShowdownResult>,
    is_spectator: bool,
    game_active: bool,
}

impl GameState {
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            ..Default::default()
        }
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn table(&self) -> &TableView {
        &self.table
    }

    pub fn showdown(&self) -> Option<&ShowdownResult> {
        self.showdown.as_ref()
    }

    pub fn is_spectator(&self) -> bool {
        self.is_spectator
    }

    pub fn is_game_active(&self) -> bool {
        self.game_active
    }

    pub fn local_player(&self) -> Option<&PlayerView> {
        self.table.seat(&self.local_name).map(|seat| &seat.player)
    }

    /// Updates balances, hands and states of players already seated.
    /// Never adds or removes seats. Hands revealed at showdown stay
    /// revealed until the next game starts.
    pub fn apply_players_update(&mut self, update: PlayersUpdate) {
        let PlayersUpdate {
            players,
            spectators,
            game_active,
        } = update;
        if let Some(active) = game_active {
            self.game_active = active;
        }
        // Only the latest list counts; an absent list means nobody spectates.
        let spectators = spectators.unwrap_or_default();
        self.is_spectator = spectators.contains(&self.local_name);
        for seat in &mut self.table.seats {
            seat.player.is_spectator = spectators.contains(&seat.player.name);
        }
        let showdown_shown = self.showdown.is_some();
        for payload in players {
            let Some(seat) = self.table.seat_mut(&payload.name) else {
                debug!("ignoring update for unseated player {}", payload.name);
                continue;
            };
            let player = &mut seat.player;
            if let Some(wallet) = payload.wallet {
                player.chip_balance = wallet;
            }
            if let Some(state) = payload.state {
                player.state = state;
            }
            if let Some(hand) = payload.hand {
                if showdown_shown && player.revealed {
                    debug!("keeping revealed hand of {}", player.name);
                } else {
                    player.hand = hand;
                }
            }
        }
    }

    /// Replaces the table with a fresh one seated from `start`. An empty
    /// player list leaves the table empty.
    pub fn apply_game_started(&mut self, start: GameStart) {
        self.table = TableView::default();
        self.showdown = None;
        self.is_spectator = false;
        if start.players.is_empty() {
            warn!("game started without players, table left empty");
            return;
        }

        let players: Vec<PlayerView> = {
            let mut seen = HashSet::new();
            start
                .players
                .iter()
                .filter(|payload| {
                    let fresh = seen.insert(payload.name.as_str());
                    if !fresh {
                        warn!("duplicate seat for {} ignored", payload.name);
                    }
                    fresh
                })
                .map(|payload| PlayerView::new(payload.name.as_str()))
                .collect()
        };
        self.table.seats = compute_seats(players, &self.local_name)
            .into_iter()
            .map(|(player, angle)| Seat { player, angle })
            .collect();
        self.table.phase = Phase::Dealing;
        info!("game started with {} seats", self.table.seats.len());

        self.apply_players_update(PlayersUpdate {
            players: start.players,
            spectators: start.spectators,
            game_active: Some(true),
        });
    }

    /// Applies pot, turn and phase. Returns the new phase if it changed.
    /// A change to `Waiting` resets the table.
    pub fn apply_game_info_update(&mut self, info: GameInfoUpdate) -> Option<Phase> {
        if let Some(pot) = info.pot {
            self.table.pot = pot;
        }
        if let Some(name) = info.current_turn_player_name {
            self.table.turn_seat = self.table.seat_index(&name);
            if self.table.turn_seat.is_none() {
                debug!("turn given to unseated player {name}, nothing highlighted");
            }
            self.table.current_turn = Some(name);
        }

        let raw = info.phase?;
        match raw.parse::<Phase>() {
            Ok(phase) if phase != self.table.phase => {
                debug!("phase {} -> {phase}", self.table.phase);
                if phase == Phase::Waiting {
                    self.reset_to_waiting();
                } else {
                    self.table.phase = phase;
                }
                Some(phase)
            }
            Ok(_) => None,
            Err(err) => {
                warn!("{err}, phase stays {}", self.table.phase);
                None
            }
        }
    }

    /// Reveals hands, labels and winners, and records the result.
    pub fn apply_showdown_revealed(&mut self, reveal: ShowdownReveal) {
        let entries: Vec<ShowdownEntry> = reveal
            .hands
            .into_iter()
            .map(|hand| ShowdownEntry {
                player_name: hand.name,
                revealed_hand: hand.hand,
                hand_label: hand.hand_label,
                is_winner: hand.winner,
            })
            .collect();

        for seat in &mut self.table.seats {
            seat.player.is_winner = false;
        }
        for entry in &entries {
            let Some(seat) = self.table.seat_mut(&entry.player_name) else {
                debug!("showdown entry for unseated player {}", entry.player_name);
                continue;
            };
            let player = &mut seat.player;
            // Without cards in the entry, the hidden codes we hold are revealed.
            if !entry.revealed_hand.is_empty() {
                player.hand = entry.revealed_hand.clone();
            }
            player.revealed = true;
            player.hand_label = entry.hand_label.clone();
            player.is_winner = entry.is_winner;
        }

        let summary = reveal
            .summary_message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SHOWDOWN_SUMMARY.to_string());
        self.showdown = Some(ShowdownResult {
            entries,
            pot_awarded: reveal.pot_awarded,
            summary,
        });
    }

    /// Back to an empty table in the waiting phase.
    pub fn reset_to_waiting(&mut self) {
        self.table = TableView::default();
        self.showdown = None;
        self.game_active = false;
    }
}
