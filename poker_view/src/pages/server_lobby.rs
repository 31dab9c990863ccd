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
    net::messages::{ClientAction, ContextMessage, Envelope, Inbound, LobbySummary},
    store::SessionStore,
};

/// Lists open lobbies and the number of players online.
pub struct ServerLobbyPage {
    port: ParentPort,
    store: SessionStore,
    log: MessageLog,
    player_count: Option<u32>,
    lobbies: Vec<LobbySummary>,
}

impl ServerLobbyPage {
    pub fn new(port: ParentPort, store: SessionStore) -> Self {
        let page = Self {
            port,
            store,
            log: MessageLog::default(),
            player_count: None,
            lobbies: Vec::new(),
        };
        page.request_lists();
        page
    }

    fn request_lists(&self) {
        self.port.send_action(&ClientAction::ShowPlayers);
        self.port.send_action(&ClientAction::ShowLobbies);
    }

    pub fn lobbies(&self) -> &[LobbySummary] {
        &self.lobbies
    }

    pub fn player_count(&self) -> Option<u32> {
        self.player_count
    }

    fn apply_envelope(&mut self, mut envelope: Envelope) {
        if let Some(count) = envelope.player_count {
            self.player_count = Some(count);
        }
        if let Some(lobbies) = envelope.lobbies.take() {
            self.lobbies = lobbies;
        }
        apply_common(&envelope, &mut self.log, &self.port);
    }

    fn send(&mut self, action: ClientAction) {
        self.log.push(RecordKind::You, action.to_string());
        self.port.send_action(&action);
    }
}

impl Page for ServerLobbyPage {
    fn kind(&self) -> PageKind {
        PageKind::ServerLobby
    }

    fn on_message(&mut self, message: ContextMessage) {
        match decode_frame(message) {
            Some(Inbound::Envelope(envelope)) => self.apply_envelope(envelope),
            Some(Inbound::LegacyRedirect(target)) => self.port.navigate(target),
            Some(Inbound::Command(command)) => debug!("server lobby ignores {command:?}"),
            None => {}
        }
    }

    fn on_command(&mut self, command: UserCommand) -> Result<(), PageError> {
        match command {
            UserCommand::Players => self.port.send_action(&ClientAction::ShowPlayers),
            UserCommand::Lobbies => self.port.send_action(&ClientAction::ShowLobbies),
            UserCommand::Create { name, game_type } => {
                self.store.set_game_type(game_type);
                self.send(ClientAction::CreateLobby {
                    lobby_name: name,
                    game_type,
                });
            }
            UserCommand::Join { name, spectate } => {
                // Remember the variant now; the game page is picked from it later.
                if let Some(game_type) = self
                    .lobbies
                    .iter()
                    .find(|lobby| lobby.name == name)
                    .and_then(|lobby| GameType::from_label(&lobby.game_type))
                {
                    self.store.set_game_type(game_type);
                }
                self.send(ClientAction::JoinLobby {
                    lobby_name: name,
                    spectate,
                });
            }
            UserCommand::Stats => self.port.navigate(PageKind::Stats.name()),
            other => return Err(PageError::unsupported(&other, self.kind())),
        }
        Ok(())
    }

    fn on_refresh(&mut self) {
        self.request_lists();
    }

    fn log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    fn render(&self) -> String {
        let mut out = String::new();
        render_header(&mut out, "Server Lobby");
        let name = self.store.player_name().unwrap_or_default();
        let online = self
            .player_count
            .map_or_else(|| "?".to_string(), |count| count.to_string());
        let _ = writeln!(out, "Logged in as {name}. Players online: {online}");
        let _ = writeln!(out);
        if self.lobbies.is_empty() {
            let _ = writeln!(out, "No lobbies yet. Create one with 'create NAME'.");
        } else {
            let _ = writeln!(
                out,
                "{:<20} {:<15} {:<14} {:>7}",
                "Lobby", "Game", "Status", "Players"
            );
            for lobby in &self.lobbies {
                let _ = writeln!(
                    out,
                    "{:<20} {:<15} {:<14} {:>3}/{:<3}",
                    lobby.name, lobby.game_type, lobby.status, lobby.player_count, lobby.max_players
                );
            }
        }
        render_footer(&mut out, &self.log, self.kind());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn drain(rx: &mut UnboundedReceiver<ContextMessage>) -> Vec<ContextMessage> {
        let mut posts = Vec::new();
        while let Ok(post) = rx.try_recv() {
            posts.push(post);
        }
        posts
    }

    fn sent(data: &str) -> ContextMessage {
        ContextMessage::SendWebSocket {
            data: data.to_string(),
        }
    }

    fn page() -> (ServerLobbyPage, UnboundedReceiver<ContextMessage>, SessionStore) {
        let (port, mut rx) = ParentPort::channel();
        let store = SessionStore::in_memory();
        let page = ServerLobbyPage::new(port, store.clone());
        drain(&mut rx);
        (page, rx, store)
    }

    #[test]
    fn test_new_page_requests_lists() {
        let (port, mut rx) = ParentPort::channel();
        let _page = ServerLobbyPage::new(port, SessionStore::in_memory());
        assert_eq!(
            drain(&mut rx),
            vec![
                sent(r#"{"action":"ShowPlayers"}"#),
                sent(r#"{"action":"ShowLobbies"}"#)
            ]
        );
    }

    #[test]
    fn test_refresh_requests_lists_again() {
        let (mut page, mut rx, _) = page();
        page.on_refresh();
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[test]
    fn test_lobby_list_and_player_count() {
        let (mut page, _, _) = page();
        page.on_message(ContextMessage::WebSocket {
            data: r#"{"lobbies":[{"name":"l1","status":"Joinable","type":"7 Card Stud","playerCount":1,"maxPlayers":7}]}"#
                .to_string(),
        });
        page.on_message(ContextMessage::WebSocket {
            data: r#"{"playerCount":4}"#.to_string(),
        });
        assert_eq!(page.lobbies().len(), 1);
        assert_eq!(page.player_count(), Some(4));
        assert!(page.render().contains("7 Card Stud"));
    }

    #[test]
    fn test_join_remembers_game_type() {
        let (mut page, mut rx, store) = page();
        page.on_message(ContextMessage::WebSocket {
            data: r#"{"lobbies":{"name":"l1","status":"Joinable","type":"Texas Hold'em","playerCount":0,"maxPlayers":10}}"#
                .to_string(),
        });
        page.on_command(UserCommand::Join {
            name: "l1".to_string(),
            spectate: true,
        })
        .unwrap();
        assert_eq!(store.game_type(), Some(GameType::TexasHoldem));
        assert_eq!(
            drain(&mut rx),
            vec![sent(
                r#"{"action":"JoinLobby","data":{"lobby_name":"l1","spectate":true}}"#
            )]
        );
    }

    #[test]
    fn test_create_remembers_game_type() {
        let (mut page, mut rx, store) = page();
        page.on_command(UserCommand::Create {
            name: "friday".to_string(),
            game_type: GameType::FiveCardDraw,
        })
        .unwrap();
        assert_eq!(store.game_type(), Some(GameType::FiveCardDraw));
        assert_eq!(
            drain(&mut rx),
            vec![sent(
                r#"{"action":"CreateLobby","data":{"lobby_name":"friday","game_type":10}}"#
            )]
        );
    }

    #[test]
    fn test_stats_navigates_locally() {
        let (mut page, mut rx, _) = page();
        page.on_command(UserCommand::Stats).unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![ContextMessage::Navigate {
                target: "stats".to_string()
            }]
        );
    }

    #[test]
    fn test_redirect_after_join() {
        let (mut page, mut rx, _) = page();
        page.on_message(ContextMessage::WebSocket {
            data: r#"{"message":"Joined lobby","redirect":"lobby"}"#.to_string(),
        });
        assert_eq!(
            drain(&mut rx),
            vec![ContextMessage::Navigate {
                target: "lobby".to_string()
            }]
        );
    }
}
