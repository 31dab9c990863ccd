//! Integration tests for the relay and the pages it hosts.
//!
//! A fake transport stands in for the WebSocket: inbound frames are fed
//! through a channel and every outbound frame is recorded.

use async_trait::async_trait;
use poker_view::{
    Connection, ConnectionState, GameError, GameType, PageKind, PageSettings, Phase, Relay,
    RelayError, SessionStore, Transport, TransportError, messages::ClientAction,
    pages::PageError,
};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{sync::mpsc, time::sleep};

struct FakeTransport {
    sent: Arc<Mutex<Vec<String>>>,
    incoming: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        self.incoming.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Handles a test keeps on the fake server side.
struct Server {
    sent: Arc<Mutex<Vec<String>>>,
    frames: mpsc::UnboundedSender<String>,
}

impl Server {
    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    fn push(&self, frame: &str) {
        self.frames.send(frame.to_string()).unwrap();
    }
}

fn fake_transport() -> (FakeTransport, Server) {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let (frames, incoming) = mpsc::unbounded_channel();
    let transport = FakeTransport {
        sent: sent.clone(),
        incoming,
    };
    (transport, Server { sent, frames })
}

/// Relay with an open connection whose start page requests were sent.
async fn relay_at(
    start: PageKind,
    local_name: Option<&str>,
) -> (Relay<FakeTransport>, Server, SessionStore) {
    let (transport, server) = fake_transport();
    let store = SessionStore::in_memory();
    if let Some(name) = local_name {
        store.set_player_name(name);
    }
    let relay = Relay::open(
        async { Ok(transport) },
        store.clone(),
        PageSettings::default(),
        start,
    )
    .await;
    (relay, server, store)
}

fn frame(action: ClientAction) -> String {
    action.to_frame().unwrap()
}

const START_ALICE_BOB: &str = r#"{"type":"command","command":"startGame","data":{"players":[{"name":"Alice","wallet":500},{"name":"Bob","wallet":300}]}}"#;

// === Game page ===

#[tokio::test]
async fn test_start_game_seats_local_player_at_bottom() {
    let (mut relay, _server, _store) =
        relay_at(PageKind::Game(GameType::FiveCardDraw), Some("Bob")).await;

    relay.forward_inbound(START_ALICE_BOB.to_string()).await;

    let game = relay.active_game().expect("game page should be active");
    let table = game.state().table();
    assert_eq!(table.seats.len(), 2);

    let bob = table.seat("Bob").unwrap();
    assert!((bob.angle - 90.0).abs() < 1e-9);
    assert_eq!(bob.player.chip_balance, 300);

    let alice = table.seat("Alice").unwrap();
    assert!((alice.angle - 270.0).abs() < 1e-9);
    assert_eq!(alice.player.chip_balance, 500);
}

#[tokio::test]
async fn test_pot_update_changes_only_the_pot() {
    let (mut relay, _server, _store) =
        relay_at(PageKind::Game(GameType::TexasHoldem), Some("Bob")).await;
    relay.forward_inbound(START_ALICE_BOB.to_string()).await;
    let before = relay.active_game().unwrap().state().table().clone();

    relay
        .forward_inbound(
            r#"{"type":"command","command":"updateGameInfo","data":{"pot":150}}"#.to_string(),
        )
        .await;

    let after = relay.active_game().unwrap().state().table().clone();
    assert_eq!(after.pot, 150);
    assert_eq!(after.phase, before.phase);
    assert_eq!(after.seats, before.seats);
    assert_eq!(after.current_turn, before.current_turn);
}

#[tokio::test]
async fn test_malformed_frame_is_dropped() {
    let (mut relay, _server, _store) =
        relay_at(PageKind::Game(GameType::SevenCardStud), Some("Bob")).await;
    relay.forward_inbound(START_ALICE_BOB.to_string()).await;
    let before = relay.active_game().unwrap().state().clone();

    relay.forward_inbound("not json at all".to_string()).await;
    relay.forward_inbound(r#"{"type":"command""#.to_string()).await;

    assert_eq!(relay.active_game().unwrap().state(), &before);
    assert_eq!(relay.connection_state(), ConnectionState::Open);

    // Later frames are still processed
    relay
        .forward_inbound(
            r#"{"type":"command","command":"updateGameInfo","data":{"phase":"betting"}}"#
                .to_string(),
        )
        .await;
    assert_eq!(
        relay.active_game().unwrap().state().table().phase,
        Phase::Betting
    );
}

#[tokio::test]
async fn test_draw_is_sent_once_and_locks() {
    let (mut relay, server, _store) =
        relay_at(PageKind::Game(GameType::FiveCardDraw), Some("Bob")).await;
    relay.forward_inbound(START_ALICE_BOB.to_string()).await;

    relay.handle_input("draw 1 3").await.unwrap();
    let err = relay.handle_input("draw 2").await.unwrap_err();
    assert!(matches!(err, PageError::Game(GameError::SelectionLocked)));

    let draw = frame(ClientAction::DrawCards {
        card_indices: vec![1, 3],
    });
    let sent = server.sent();
    assert_eq!(sent.iter().filter(|f| f.contains("DrawCards")).count(), 1);
    assert!(sent.contains(&draw));

    let game = relay.active_game().unwrap();
    assert!(game.selection().is_locked());
    assert_eq!(game.selection().indices(), vec![1, 3]);
}

#[tokio::test]
async fn test_new_phase_unlocks_draw() {
    let (mut relay, server, _store) =
        relay_at(PageKind::Game(GameType::FiveCardDraw), Some("Bob")).await;
    relay.forward_inbound(START_ALICE_BOB.to_string()).await;
    relay.handle_input("draw 0").await.unwrap();

    relay
        .forward_inbound(
            r#"{"type":"command","command":"updateGameInfo","data":{"phase":"draw"}}"#.to_string(),
        )
        .await;
    relay.handle_input("draw 4").await.unwrap();

    let draws = server
        .sent()
        .into_iter()
        .filter(|f| f.contains("DrawCards"))
        .count();
    assert_eq!(draws, 2);
}

#[tokio::test]
async fn test_showdown_reveals_hands() {
    let (mut relay, _server, _store) =
        relay_at(PageKind::Game(GameType::TexasHoldem), Some("Bob")).await;
    relay.forward_inbound(START_ALICE_BOB.to_string()).await;

    relay
        .forward_inbound(
            r#"{"type":"command","command":"showdownHands","data":{"hands":[{"name":"Alice","hand":[0,13],"handLabel":"Pair","winner":true}],"potAwarded":150,"summaryMessage":"Alice wins"}}"#
                .to_string(),
        )
        .await;

    let game = relay.active_game().unwrap();
    let alice = &game.state().table().seat("Alice").unwrap().player;
    assert!(alice.revealed);
    assert!(alice.is_winner);
    assert_eq!(alice.hand_label.as_deref(), Some("Pair"));
    let showdown = game.state().showdown().unwrap();
    assert_eq!(showdown.summary, "Alice wins");
    assert_eq!(showdown.pot_awarded, Some(150));
    assert!(relay.render().contains("Alice wins"));
}

#[tokio::test]
async fn test_empty_game_start_drops_spectating() {
    let (mut relay, _server, _store) =
        relay_at(PageKind::Game(GameType::TexasHoldem), Some("Bob")).await;
    relay
        .forward_inbound(
            r#"{"type":"command","command":"updatePlayers","data":{"spectators":["Bob"]}}"#
                .to_string(),
        )
        .await;
    assert!(relay.active_game().unwrap().state().is_spectator());

    relay
        .forward_inbound(
            r#"{"type":"command","command":"startGame","data":{"players":[]}}"#.to_string(),
        )
        .await;
    assert!(!relay.active_game().unwrap().state().is_spectator());

    relay
        .forward_inbound(
            r#"{"type":"command","command":"updatePlayers","data":{"spectators":["Bob"]}}"#
                .to_string(),
        )
        .await;
    relay
        .forward_inbound(r#"{"type":"command","command":"startGame","data":null}"#.to_string())
        .await;
    let state = relay.active_game().unwrap().state();
    assert!(state.table().is_empty());
    assert!(!state.is_spectator());
}

// === Navigation ===

#[tokio::test]
async fn test_start_page_requests_are_sent_on_open() {
    let (_relay, server, _store) = relay_at(PageKind::ServerLobby, Some("Bob")).await;
    assert_eq!(
        server.sent(),
        vec![
            frame(ClientAction::ShowPlayers),
            frame(ClientAction::ShowLobbies)
        ]
    );
}

#[tokio::test]
async fn test_redirect_swaps_page() {
    let (mut relay, server, _store) = relay_at(PageKind::Login, None).await;
    assert!(server.sent().is_empty());

    relay
        .forward_inbound(r#"{"message":"Welcome","redirect":"server_lobby"}"#.to_string())
        .await;

    assert_eq!(relay.active_page(), PageKind::ServerLobby);
    assert_eq!(
        server.sent(),
        vec![
            frame(ClientAction::ShowPlayers),
            frame(ClientAction::ShowLobbies)
        ]
    );
}

#[tokio::test]
async fn test_legacy_redirect_to_game_uses_stored_type() {
    let (mut relay, _server, store) = relay_at(PageKind::Lobby, Some("Bob")).await;
    store.set_game_type(GameType::SevenCardStud);

    relay.forward_inbound("redirect:in_game".to_string()).await;

    assert_eq!(
        relay.active_page(),
        PageKind::Game(GameType::SevenCardStud)
    );
    assert!(relay.active_game().is_some());
}

#[tokio::test]
async fn test_unknown_redirect_keeps_page() {
    let (mut relay, _server, _store) = relay_at(PageKind::ServerLobby, Some("Bob")).await;
    relay
        .forward_inbound(r#"{"redirect":"casino"}"#.to_string())
        .await;
    assert_eq!(relay.active_page(), PageKind::ServerLobby);
}

#[tokio::test]
async fn test_navigation_discards_old_page_posts() {
    let (transport, server) = fake_transport();
    let store = SessionStore::in_memory();
    let mut relay = Relay::new(
        Connection::from_transport(transport),
        store,
        PageSettings::default(),
        PageKind::ServerLobby,
    );

    // The lobby list requests are still queued when the page goes away
    relay.navigate(PageKind::Stats);
    relay.drain_posts().await;

    assert_eq!(server.sent(), vec![frame(ClientAction::ShowStats)]);
}

#[tokio::test]
async fn test_help_is_logged_on_active_page() {
    let (mut relay, _server, _store) = relay_at(PageKind::Stats, None).await;
    let help = PageKind::Stats.help();
    let before = relay.render().matches(help).count();
    relay.handle_input("help").await.unwrap();
    assert_eq!(relay.render().matches(help).count(), before + 1);
}

// === Connection ===

#[tokio::test]
async fn test_send_while_closed_is_rejected() {
    let connection =
        Connection::<FakeTransport>::open(async { Err(TransportError::Connect("refused".into())) })
            .await;
    let mut relay = Relay::new(
        connection,
        SessionStore::in_memory(),
        PageSettings::default(),
        PageKind::Login,
    );
    assert_eq!(relay.connection_state(), ConnectionState::Closed);

    let err = relay
        .forward_outbound(frame(ClientAction::ShowLobbies))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RelayError::TransportUnavailable {
            state: ConnectionState::Closed
        }
    ));
}

#[tokio::test]
async fn test_teardown_says_goodbye() {
    let (mut relay, server, _store) = relay_at(PageKind::Login, None).await;
    relay.teardown().await;
    assert_eq!(server.sent(), vec![frame(ClientAction::Disconnect)]);
    assert_eq!(relay.connection_state(), ConnectionState::Closed);
}

#[tokio::test]
async fn test_run_ends_when_connection_is_lost() {
    let (relay, server, _store) =
        relay_at(PageKind::Game(GameType::FiveCardDraw), Some("Bob")).await;
    let (_input_tx, input_rx) = mpsc::unbounded_channel();

    server.push(START_ALICE_BOB);
    let Server { sent, frames } = server;
    drop(frames);

    let mut screens = Vec::new();
    relay
        .run(input_rx, std::future::pending(), |screen| {
            screens.push(screen.to_string())
        })
        .await;

    // Initial render, then one per event
    assert!(screens.len() >= 2);
    assert!(screens.iter().any(|screen| screen.contains("Alice")));
    // Nothing to say goodbye on once the server is gone
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_run_ends_when_input_closes() {
    let (relay, server, _store) = relay_at(PageKind::Login, None).await;
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();
    drop(input_tx);

    relay.run(input_rx, std::future::pending(), |_| {}).await;

    assert_eq!(server.sent(), vec![frame(ClientAction::Disconnect)]);
}

#[tokio::test]
async fn test_run_forwards_console_input() {
    let (relay, server, _store) = relay_at(PageKind::Login, None).await;
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    input_tx.send("login carol".to_string()).unwrap();
    drop(input_tx);

    relay.run(input_rx, std::future::pending(), |_| {}).await;

    let sent = server.sent();
    assert_eq!(
        sent.first(),
        Some(&frame(ClientAction::Login {
            username: "carol".to_string()
        }))
    );
    assert_eq!(sent.last(), Some(&frame(ClientAction::Disconnect)));
}

// === Refresh ===

#[tokio::test(start_paused = true)]
async fn test_run_refreshes_lobby_lists_every_interval() {
    let (relay, server, _store) = relay_at(PageKind::ServerLobby, Some("Bob")).await;
    let (_input_tx, input_rx) = mpsc::unbounded_channel();

    // Refreshes at 10 s and 20 s
    relay
        .run(input_rx, sleep(Duration::from_secs(25)), |_| {})
        .await;

    let lists = [
        frame(ClientAction::ShowPlayers),
        frame(ClientAction::ShowLobbies),
    ];
    let mut expected = [lists.as_slice(); 3].concat();
    expected.push(frame(ClientAction::Disconnect));
    assert_eq!(server.sent(), expected);
}

/// Runs a login page that is redirected to the server lobby after 5 s.
async fn redirected_lobby_sends(shutdown_after: Duration) -> Vec<String> {
    let (relay, server, _store) = relay_at(PageKind::Login, None).await;
    let (_input_tx, input_rx) = mpsc::unbounded_channel();

    let frames = server.frames.clone();
    tokio::spawn(async move {
        sleep(Duration::from_secs(5)).await;
        frames
            .send(r#"{"redirect":"server_lobby"}"#.to_string())
            .unwrap();
        // Keep the connection open
        std::future::pending::<()>().await;
    });

    relay.run(input_rx, sleep(shutdown_after), |_| {}).await;
    server.sent()
}

#[tokio::test(start_paused = true)]
async fn test_navigation_delays_first_refresh_by_full_interval() {
    let lists = vec![
        frame(ClientAction::ShowPlayers),
        frame(ClientAction::ShowLobbies),
    ];

    // The original schedule would have refreshed at 10 s
    let sent = redirected_lobby_sends(Duration::from_secs(14)).await;
    let mut expected = lists.clone();
    expected.push(frame(ClientAction::Disconnect));
    assert_eq!(sent, expected);

    // The lobby is first refreshed at 15 s, a full interval after it opened
    let sent = redirected_lobby_sends(Duration::from_secs(16)).await;
    let mut expected = [lists.as_slice(); 2].concat();
    expected.push(frame(ClientAction::Disconnect));
    assert_eq!(sent, expected);
}
