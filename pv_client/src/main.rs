//! A console poker client.
//!
//! The client opens one WebSocket to the poker server and keeps it for the
//! whole session while pages (login, lobbies, games) take turns using it.

use anyhow::{Context, Result, anyhow, bail};
use log::info;
use pico_args::Arguments;
use poker_view::{ConnectionState, PageKind, PageSettings, Relay, SessionStore};
use std::{
    io::{self, Write},
    path::PathBuf,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

use pv_client::{
    config::{ClientConfig, Overrides},
    websocket_client,
};

const HELP: &str = "\
Play on a poker server from the console

USAGE:
  pv_client [OPTIONS]

OPTIONS:
  --server URL          WebSocket endpoint  [default: env POKER_SERVER_URL or ws://localhost:1112/connect]
  --username NAME       Name offered at login  [default: env POKER_USERNAME or the OS user]
  --store PATH          Keep session data in a file  [default: env POKER_STORE_PATH or memory only]
  --page PAGE           First page to show  [default: env POKER_START_PAGE or login]

FLAGS:
  -h, --help            Print help information

ENVIRONMENT:
  RUST_LOG              Log level, logs go to stderr
  (A .env file in the working directory is loaded first)
";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        server_url: pargs.opt_value_from_str("--server")?,
        username: pargs.opt_value_from_str("--username")?,
        store_path: pargs.opt_value_from_str::<_, PathBuf>("--store")?,
        start_page: pargs.opt_value_from_str("--page")?,
    };

    env_logger::builder().format_target(false).init();

    let config = ClientConfig::from_env(overrides)?;
    run(config).await
}

async fn run(config: ClientConfig) -> Result<()> {
    let store = match &config.store_path {
        Some(path) => SessionStore::open(path)
            .with_context(|| format!("Failed to open session store {}", path.display()))?,
        None => SessionStore::in_memory(),
    };
    let start = PageKind::from_target(&config.start_page, &store)
        .ok_or_else(|| anyhow!("Unknown start page '{}'", config.start_page))?;
    let settings = PageSettings {
        default_username: config.username.clone(),
    };

    let relay = Relay::open(
        websocket_client::connect(&config.server_url),
        store,
        settings,
        start,
    )
    .await;
    if relay.connection_state() != ConnectionState::Open {
        bail!("Failed to connect to {}", config.server_url);
    }
    info!("connected to {}", config.server_url);

    let (input_tx, input_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            if input_tx.send(line).is_err() {
                break;
            }
        }
    });

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    relay
        .run(input_rx, shutdown, |screen| {
            let mut stdout = io::stdout().lock();
            let _ = write!(stdout, "\x1B[2J\x1B[1;1H{screen}> ");
            let _ = stdout.flush();
        })
        .await;

    println!("\nDisconnected.");
    Ok(())
}
