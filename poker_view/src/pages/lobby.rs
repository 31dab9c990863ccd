use log::debug;
use std::fmt::Write;

use super::{
    Page, PageError, PageKind, ParentPort, apply_common, decode_frame, render_footer,
    render_header,
    records::{MessageLog, RecordKind},
};
use crate::{
    commands::UserCommand,
    game::entities::GameType,
    net::messages::{ClientAction, ContextMessage, Envelope, Inbound, LobbyInfo, LobbyMember},
    store::SessionStore,
};

/// Waiting room for one lobby until the host starts the game.
pub struct LobbyPage {
    port: ParentPort,
    store: SessionStore,
    log: MessageLog,
    info: Option<LobbyInfo>,
    members: Vec<LobbyMember>,
}

impl LobbyPage {
    pub fn new(port: ParentPort, store: SessionStore) -> Self {
        port.send_action(&ClientAction::ShowLobbyInfo);
        Self {
            port,
            store,
            log: MessageLog::default(),
            info: None,
            members: Vec::new(),
        }
    }

    pub fn info(&self) -> Option<&LobbyInfo> {
        self.info.as_ref()
    }

    pub fn members(&self) -> &[LobbyMember] {
        &self.members
    }

    fn apply_envelope(&mut self, mut envelope: Envelope) {
        if let Some(info) = envelope.lobby_info.take() {
            // Needed later to pick the game page for a generic redirect.
            if let Some(game_type) = GameType::from_label(&info.game_type) {
                self.store.set_game_type(game_type);
            }
            self.info = Some(info);
        }
        if let Some(members) = envelope.players.take() {
            self.members = members;
        }
        if let Some(stats) = envelope.stats.take() {
            self.log.push(
                RecordKind::Server,
                format!(
                    "{}: {} played, {} won, ${}",
                    stats.username, stats.games_played, stats.games_won, stats.wallet
                ),
            );
        }
        apply_common(&envelope, &mut self.log, &self.port);
    }

    fn send(&mut self, action: ClientAction) {
        self.log.push(RecordKind::You, action.to_string());
        self.port.send_action(&action);
    }
}

impl Page for LobbyPage {
    fn kind(&self) -> PageKind {
        PageKind::Lobby
    }

    fn on_message(&mut self, message: ContextMessage) {
        match decode_frame(message) {
            Some(Inbound::Envelope(envelope)) => self.apply_envelope(envelope),
            Some(Inbound::LegacyRedirect(target)) => self.port.navigate(target),
            Some(Inbound::Command(command)) => debug!("lobby ignores {command:?}"),
            None => {}
        }
    }

    fn on_command(&mut self, command: UserCommand) -> Result<(), PageError> {
        match command {
            UserCommand::Ready => self.send(ClientAction::Ready),
            UserCommand::Start => self.send(ClientAction::StartGame),
            UserCommand::Info => self.port.send_action(&ClientAction::ShowLobbyInfo),
            UserCommand::Stats => self.port.send_action(&ClientAction::ShowStats),
            UserCommand::Quit => self.send(ClientAction::Quit),
            other => return Err(PageError::unsupported(&other, self.kind())),
        }
        Ok(())
    }

    fn on_refresh(&mut self) {
        self.port.send_action(&ClientAction::ShowLobbyInfo);
    }

    fn log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    fn render(&self) -> String {
        let mut out = String::new();
        match &self.info {
            Some(info) => {
                render_header(&mut out, &format!("Lobby {}", info.name));
                let _ = writeln!(
                    out,
                    "{} | {}/{} players",
                    info.game_type, info.player_count, info.max_players
                );
            }
            None => render_header(&mut out, "Lobby"),
        }
        for member in &self.members {
            let marker = if member.ready { "ready" } else { "not ready" };
            let _ = writeln!(out, "  {:<20} {marker}", member.name);
        }
        render_footer(&mut out, &self.log, self.kind());
        out
    }
}
