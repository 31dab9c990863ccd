use log::info;
use std::{collections::BTreeSet, fmt::Write};

use super::{
    GameError,
    entities::{GameType, Phase, PlayerView, Seat},
    state::GameState,
};
use crate::{
    cards::render_hand,
    commands::UserCommand,
    layout::compass,
    net::messages::{
        ClientAction, ContextMessage, GameCommand, GameInfoUpdate, GameStart, Inbound,
        PlayersUpdate, ShowdownReveal,
    },
    pages::{
        Page, PageError, PageKind, ParentPort, apply_common, decode_frame, render_footer,
        render_header,
        records::{MessageLog, RecordKind},
    },
    store::SessionStore,
};

/// Cards picked for exchange. Locked once submitted until the phase moves on.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DrawSelection {
    selected: BTreeSet<usize>,
    locked: bool,
}

impl DrawSelection {
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    /// Returns whether `index` is selected afterwards.
    pub fn toggle(&mut self, index: usize) -> Result<bool, GameError> {
        if self.locked {
            return Err(GameError::SelectionLocked);
        }
        if self.selected.remove(&index) {
            Ok(false)
        } else {
            self.selected.insert(index);
            Ok(true)
        }
    }

    fn lock(&mut self, indices: &[usize]) {
        self.selected = indices.iter().copied().collect();
        self.locked = true;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The page for a running game of one variant.
pub struct GameController {
    port: ParentPort,
    game_type: GameType,
    state: GameState,
    selection: DrawSelection,
    log: MessageLog,
}

impl GameController {
    /// The local player is whoever logged in this session. Without a
    /// stored name the client renders as an outside observer.
    pub fn new(port: ParentPort, store: SessionStore, game_type: GameType) -> Self {
        Self {
            port,
            game_type,
            state: GameState::new(store.player_name().unwrap_or_default()),
            selection: DrawSelection::default(),
            log: MessageLog::default(),
        }
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn selection(&self) -> &DrawSelection {
        &self.selection
    }

    pub fn apply(&mut self, command: GameCommand) {
        match command {
            GameCommand::UpdatePlayers(update) => self.apply_players_update(update),
            GameCommand::StartGame(start) => self.apply_game_started(start),
            GameCommand::UpdateGameInfo(update) => self.apply_game_info_update(update),
            GameCommand::ShowdownHands(reveal) => self.apply_showdown_revealed(reveal),
        }
    }

    pub fn apply_players_update(&mut self, update: PlayersUpdate) {
        self.state.apply_players_update(update);
    }

    pub fn apply_game_started(&mut self, start: GameStart) {
        self.state.apply_game_started(start);
        self.selection.reset();
        let names: Vec<&str> = self
            .state
            .table()
            .seats
            .iter()
            .map(|seat| seat.player.name.as_str())
            .collect();
        if !names.is_empty() {
            self.log
                .push(RecordKind::Game, format!("New hand: {}", names.join(", ")));
        }
    }

    pub fn apply_game_info_update(&mut self, update: GameInfoUpdate) {
        let Some(phase) = self.state.apply_game_info_update(update) else {
            return;
        };
        // Every new phase starts with a fresh, unlocked selection.
        self.selection.reset();
        self.log.push(RecordKind::Game, format!("Phase: {phase}"));
    }

    pub fn apply_showdown_revealed(&mut self, reveal: ShowdownReveal) {
        self.state.apply_showdown_revealed(reveal);
        if let Some(result) = self.state.showdown() {
            self.log.push(RecordKind::Game, result.summary.as_str());
        }
    }

    /// Sends one draw request for `indices` and locks the selection. The
    /// phase isn't checked; the server decides whether a draw is allowed.
    pub fn submit_draw_selection(&mut self, indices: Vec<usize>) -> Result<(), GameError> {
        if self.selection.is_locked() {
            return Err(GameError::SelectionLocked);
        }
        self.selection.lock(&indices);
        let action = ClientAction::DrawCards {
            card_indices: indices,
        };
        info!("{action}");
        self.log.push(RecordKind::You, action.to_string());
        self.port.send_action(&action);
        Ok(())
    }

    pub fn reset_to_waiting(&mut self) {
        self.state.reset_to_waiting();
        self.selection.reset();
    }

    /// Toggles a card of the local hand. Out of range indices are
    /// rejected when the local hand is known.
    pub fn toggle_card(&mut self, index: usize) -> Result<bool, GameError> {
        if let Some(player) = self.state.local_player()
            && !player.hand.is_empty()
            && index >= player.hand.len()
        {
            return Err(GameError::CardIndexOutOfRange {
                index,
                hand_len: player.hand.len(),
            });
        }
        self.selection.toggle(index)
    }

    fn require_draw_round(&self) -> Result<(), GameError> {
        if self.game_type.has_draw_round() {
            Ok(())
        } else {
            Err(GameError::NoDrawRound(self.game_type))
        }
    }

    fn send(&mut self, action: ClientAction) {
        self.log.push(RecordKind::You, action.to_string());
        self.port.send_action(&action);
    }

    fn render_seat(&self, out: &mut String, idx: usize, seat: &Seat) {
        let player: &PlayerView = &seat.player;
        let table = self.state.table();
        let turn = if table.turn_seat == Some(idx) { "→" } else { " " };
        let you = if player.name == self.state.local_name() {
            " (you)"
        } else {
            ""
        };
        let winner = if player.is_winner { " ★" } else { "" };
        let hand = if player.hand.is_empty() {
            "--".to_string()
        } else {
            render_hand(&player.hand, player.revealed)
        };
        let label = player
            .hand_label
            .as_deref()
            .map(|label| format!(" [{label}]"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{turn} {:<12} {:<14} ${:<8} {:<8} {hand}{label}{winner}",
            compass(seat.angle),
            format!("{}{you}", player.name),
            player.chip_balance,
            player.state.to_string(),
        );
    }
}

impl Page for GameController {
    fn kind(&self) -> PageKind {
        PageKind::Game(self.game_type)
    }

    fn on_message(&mut self, message: ContextMessage) {
        match decode_frame(message) {
            Some(Inbound::Command(command)) => self.apply(command),
            Some(Inbound::Envelope(envelope)) => {
                apply_common(&envelope, &mut self.log, &self.port);
            }
            Some(Inbound::LegacyRedirect(target)) => self.port.navigate(target),
            None => {}
        }
    }

    fn on_command(&mut self, command: UserCommand) -> Result<(), PageError> {
        match command {
            UserCommand::Check => self.send(ClientAction::Check),
            UserCommand::Call => self.send(ClientAction::Call),
            UserCommand::Fold => self.send(ClientAction::Fold),
            UserCommand::Raise(amount) => self.send(ClientAction::Raise { amount }),
            UserCommand::AllIn => self.send(ClientAction::AllIn),
            UserCommand::Quit => self.send(ClientAction::Quit),
            UserCommand::Select(index) => {
                self.require_draw_round()?;
                let selected = self.toggle_card(index)?;
                let verb = if selected { "Selected" } else { "Unselected" };
                self.log.push(RecordKind::You, format!("{verb} card {index}"));
            }
            UserCommand::Draw(indices) => {
                self.require_draw_round()?;
                let indices = if indices.is_empty() {
                    self.selection.indices()
                } else {
                    indices
                };
                self.submit_draw_selection(indices)?;
            }
            other => return Err(PageError::unsupported(&other, self.kind())),
        }
        Ok(())
    }

    fn log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    fn as_game(&self) -> Option<&GameController> {
        Some(self)
    }

    fn render(&self) -> String {
        let mut out = String::new();
        render_header(&mut out, self.game_type.label());
        let table = self.state.table();
        let role = if self.state.is_spectator() {
            " | spectating"
        } else {
            ""
        };
        let _ = writeln!(out, "Phase: {} | Pot: ${}{role}", table.phase, table.pot);
        if table.is_empty() {
            let _ = writeln!(out, "Waiting for the next hand...");
        }
        for (idx, seat) in table.seats.iter().enumerate() {
            self.render_seat(&mut out, idx, seat);
        }
        if let Some(result) = self.state.showdown() {
            let pot = result
                .pot_awarded
                .map(|pot| format!(" (pot ${pot})"))
                .unwrap_or_default();
            let _ = writeln!(out, "Showdown: {}{pot}", result.summary);
        }
        if self.game_type.has_draw_round() && table.phase != Phase::Waiting {
            let status = if self.selection.is_locked() {
                "submitted"
            } else {
                "open"
            };
            let _ = writeln!(
                out,
                "Draw selection ({status}): {:?}",
                self.selection.indices()
            );
        }
        render_footer(&mut out, &self.log, self.kind());
        out
    }
}
