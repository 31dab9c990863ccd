use log::debug;
use std::fmt::Write;

use super::{
    Page, PageError, PageKind, ParentPort, apply_common, decode_frame, render_footer,
    render_header,
    records::{MessageLog, RecordKind},
};
use crate::{
    commands::UserCommand,
    net::messages::{ClientAction, ContextMessage, Inbound},
    store::SessionStore,
};

pub struct LoginPage {
    port: ParentPort,
    store: SessionStore,
    default_username: String,
    log: MessageLog,
}

impl LoginPage {
    pub fn new(port: ParentPort, store: SessionStore, default_username: String) -> Self {
        Self {
            port,
            store,
            default_username,
            log: MessageLog::default(),
        }
    }

    /// An explicit name wins, then the name from an earlier login, then
    /// the configured default.
    fn resolve_username(&self, given: Option<String>) -> Result<String, PageError> {
        given
            .or_else(|| self.store.player_name())
            .or_else(|| Some(self.default_username.clone()))
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or(PageError::MissingUsername)
    }
}

impl Page for LoginPage {
    fn kind(&self) -> PageKind {
        PageKind::Login
    }

    fn on_message(&mut self, message: ContextMessage) {
        match decode_frame(message) {
            Some(Inbound::Envelope(envelope)) => apply_common(&envelope, &mut self.log, &self.port),
            Some(Inbound::LegacyRedirect(target)) => self.port.navigate(target),
            Some(Inbound::Command(command)) => debug!("login page ignores {command:?}"),
            None => {}
        }
    }

    fn on_command(&mut self, command: UserCommand) -> Result<(), PageError> {
        let action = match command {
            UserCommand::Login(name) => ClientAction::Login {
                username: self.resolve_username(name)?,
            },
            UserCommand::Register(name) => ClientAction::Register {
                username: self.resolve_username(name)?,
            },
            other => return Err(PageError::unsupported(&other, self.kind())),
        };
        if let ClientAction::Login { username } | ClientAction::Register { username } = &action {
            self.store.set_player_name(username);
        }
        self.log.push(RecordKind::You, action.to_string());
        self.port.send_action(&action);
        Ok(())
    }

    fn log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    fn render(&self) -> String {
        let mut out = String::new();
        render_header(&mut out, "Login");
        let name = self
            .store
            .player_name()
            .unwrap_or_else(|| self.default_username.clone());
        let _ = writeln!(out, "Name: {name}");
        render_footer(&mut out, &self.log, self.kind());
        out
    }
}
