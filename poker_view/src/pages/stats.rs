use log::debug;
use std::fmt::Write;

use super::{
    Page, PageError, PageKind, ParentPort, apply_common, decode_frame, render_footer,
    render_header, records::MessageLog,
};
use crate::{
    commands::UserCommand,
    net::messages::{ClientAction, ContextMessage, Inbound, PlayerStats},
};

pub struct StatsPage {
    port: ParentPort,
    log: MessageLog,
    stats: Option<PlayerStats>,
}

impl StatsPage {
    pub fn new(port: ParentPort) -> Self {
        port.send_action(&ClientAction::ShowStats);
        Self {
            port,
            log: MessageLog::default(),
            stats: None,
        }
    }

    pub fn stats(&self) -> Option<&PlayerStats> {
        self.stats.as_ref()
    }
}

impl Page for StatsPage {
    fn kind(&self) -> PageKind {
        PageKind::Stats
    }

    fn on_message(&mut self, message: ContextMessage) {
        match decode_frame(message) {
            Some(Inbound::Envelope(mut envelope)) => {
                if let Some(stats) = envelope.stats.take() {
                    self.stats = Some(stats);
                }
                apply_common(&envelope, &mut self.log, &self.port);
            }
            Some(Inbound::LegacyRedirect(target)) => self.port.navigate(target),
            Some(Inbound::Command(command)) => debug!("stats page ignores {command:?}"),
            None => {}
        }
    }

    fn on_command(&mut self, command: UserCommand) -> Result<(), PageError> {
        match command {
            UserCommand::Stats => self.port.send_action(&ClientAction::ShowStats),
            UserCommand::Back => self.port.navigate(PageKind::ServerLobby.name()),
            other => return Err(PageError::unsupported(&other, self.kind())),
        }
        Ok(())
    }

    fn log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    fn render(&self) -> String {
        let mut out = String::new();
        render_header(&mut out, "Stats");
        match &self.stats {
            Some(stats) => {
                let _ = writeln!(out, "Player:       {}", stats.username);
                let _ = writeln!(out, "Games played: {}", stats.games_played);
                let _ = writeln!(out, "Games won:    {}", stats.games_won);
                let _ = writeln!(out, "Wallet:       ${}", stats.wallet);
            }
            None => {
                let _ = writeln!(out, "Loading...");
            }
        }
        render_footer(&mut out, &self.log, self.kind());
        out
    }
}
