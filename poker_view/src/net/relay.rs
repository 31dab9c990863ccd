use log::{debug, error, info, warn};
use std::{future::Future, time::Duration};
use tokio::{
    sync::mpsc,
    time::{self, Instant, MissedTickBehavior},
};

use super::{
    connection::{Connection, ConnectionState, Transport},
    errors::{RelayError, TransportError},
    messages::{ClientAction, ContextMessage},
};
use crate::{
    commands::{UserCommand, parse_command},
    game::controller::GameController,
    pages::{self, Page, PageError, PageKind, PageSettings, ParentPort, records::RecordKind},
    store::SessionStore,
};

/// How often the active page is asked to refresh its lists.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Owns the session's only connection and hosts one page at a time.
///
/// Inbound frames go to the active page unmodified. Whatever the page
/// posts back (outbound frames, navigation) is handled in order right
/// after the event that caused it.
pub struct Relay<T> {
    connection: Connection<T>,
    store: SessionStore,
    settings: PageSettings,
    active: Box<dyn Page>,
    posts: mpsc::UnboundedReceiver<ContextMessage>,
    navigations: u64,
}

impl<T: Transport> Relay<T> {
    /// Opens the connection and shows the `start` page. If the connection
    /// fails, the relay is still built with a closed connection.
    pub async fn open<F>(
        connect: F,
        store: SessionStore,
        settings: PageSettings,
        start: PageKind,
    ) -> Self
    where
        F: Future<Output = Result<T, TransportError>>,
    {
        let connection = Connection::open(connect).await;
        let mut relay = Self::new(connection, store, settings, start);
        relay.drain_posts().await;
        relay
    }

    /// Builds the relay around an existing connection. Requests the start
    /// page makes on creation stay queued until [`Relay::drain_posts`].
    pub fn new(
        connection: Connection<T>,
        store: SessionStore,
        settings: PageSettings,
        start: PageKind,
    ) -> Self {
        let (port, posts) = ParentPort::channel();
        let active = pages::open(start, port, store.clone(), &settings);
        Self {
            connection,
            store,
            settings,
            active,
            posts,
            navigations: 0,
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn active_page(&self) -> PageKind {
        self.active.kind()
    }

    pub fn active_game(&self) -> Option<&GameController> {
        self.active.as_game()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn render(&self) -> String {
        self.active.render()
    }

    /// Hands an inbound frame to the active page, then processes what it
    /// posted.
    pub async fn forward_inbound(&mut self, raw: String) {
        self.active.on_message(ContextMessage::WebSocket { data: raw });
        self.drain_posts().await;
    }

    /// Sends a frame if the connection is open.
    pub async fn forward_outbound(&mut self, data: String) -> Result<(), RelayError> {
        self.connection.send(data).await
    }

    /// Replaces the active page. Anything the old page posted but wasn't
    /// processed yet is discarded along with it.
    pub fn navigate(&mut self, page: PageKind) {
        let (port, posts) = ParentPort::channel();
        self.active = pages::open(page, port, self.store.clone(), &self.settings);
        self.posts = posts;
        self.navigations += 1;
        info!("navigated to {page}");
    }

    /// Parses a console line and hands it to the active page.
    pub async fn handle_input(&mut self, line: &str) -> Result<(), PageError> {
        let command = parse_command(line)?;
        if matches!(command, UserCommand::Help) {
            let help = self.active.kind().help();
            self.active.log_mut().push(RecordKind::Alert, help);
        } else {
            self.active.on_command(command)?;
        }
        self.drain_posts().await;
        Ok(())
    }

    pub async fn refresh(&mut self) {
        self.active.on_refresh();
        self.drain_posts().await;
    }

    /// Processes page posts in order. A navigation swaps the receiver, so
    /// the loop continues with whatever the new page posted on creation.
    pub async fn drain_posts(&mut self) {
        while let Ok(post) = self.posts.try_recv() {
            match post {
                ContextMessage::SendWebSocket { data } => {
                    if let Err(err) = self.forward_outbound(data).await {
                        warn!("{err}");
                    }
                }
                ContextMessage::Navigate { target } => {
                    match PageKind::from_target(&target, &self.store) {
                        Some(page) => self.navigate(page),
                        None => warn!("no page for navigation target '{target}'"),
                    }
                }
                ContextMessage::WebSocket { .. } => {
                    debug!("page posted an inbound frame, ignored");
                }
            }
        }
    }

    /// Says goodbye to the server if still connected, then closes.
    pub async fn teardown(&mut self) {
        if self.connection.is_open() {
            match ClientAction::Disconnect.to_frame() {
                Ok(frame) => {
                    if let Err(err) = self.connection.send(frame).await {
                        warn!("{err}");
                    }
                }
                Err(err) => error!("{err}"),
            }
        }
        self.connection.close().await;
        info!("session closed");
    }

    /// Runs the session until the connection is lost, input ends, or
    /// `shutdown` resolves. `render` receives the active page after every
    /// event.
    pub async fn run<S, R>(
        mut self,
        mut input: mpsc::UnboundedReceiver<String>,
        shutdown: S,
        mut render: R,
    ) where
        S: Future<Output = ()>,
        R: FnMut(&str),
    {
        tokio::pin!(shutdown);
        let mut refresh = time::interval_at(Instant::now() + REFRESH_INTERVAL, REFRESH_INTERVAL);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.drain_posts().await;
        render(&self.render());

        loop {
            let navigations = self.navigations;
            tokio::select! {
                frame = self.connection.recv() => match frame {
                    Some(raw) => self.forward_inbound(raw).await,
                    None => {
                        error!("connection lost, session ended");
                        break;
                    }
                },
                line = input.recv() => match line {
                    Some(line) => {
                        if let Err(err) = self.handle_input(&line).await {
                            self.active.log_mut().push(RecordKind::Error, err.to_string());
                        }
                    }
                    None => break,
                },
                _ = refresh.tick() => self.refresh().await,
                () = &mut shutdown => break,
            }
            // A fresh page gets a full interval before its first refresh.
            if self.navigations != navigations {
                refresh.reset();
            }
            render(&self.render());
        }

        self.teardown().await;
    }
}
