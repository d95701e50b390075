use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};

use clap::Parser;
use hanabi::{CardId, Command};
use hanabi_client::{ClientConfig, ConnectionManager, Recorder, SendError, WsConnector};
use hanabi_view::{summarize, Projection};
use tracing::{debug, info};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
struct Args {
    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host name of the game server
    #[arg(long)]
    host: Option<String>,

    /// Port of the game server
    #[arg(long)]
    port: Option<u16>,

    /// Updates arriving within this many milliseconds are applied together
    #[arg(long)]
    coalesce_ms: Option<u64>,

    /// Record the commands of every game into this directory
    #[arg(short, long)]
    record_games_to_directory: Option<PathBuf>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

impl Args {
    fn into_config(self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(coalesce_ms) = self.coalesce_ms {
            config.coalesce_window_ms = coalesce_ms;
        }
        if self.record_games_to_directory.is_some() {
            config.record_games_to_directory = self.record_games_to_directory;
        }
        Ok(config)
    }
}

const HELP: &str = "\
Commands:
  PLACE <idx>              play a card from your hand
  DISCARD <idx>            discard a card from your hand
  HINT_COLOR <color> <seat> hint a color (palette index)
  HINT_VALUE <value> <seat> hint a value
  REPLAY <seed|-> <bot>    start a new game
  note <card id> <text>    attach a note to one of your cards
  connect                  (re)connect to the server
  quit                     leave";

enum Flow {
    Continue,
    Quit,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    initialize_logging(args.log_level);
    let config = args.into_config()?;

    let recorder = match &config.record_games_to_directory {
        Some(dir) => Some(Recorder::new(dir.clone())?),
        None => None,
    };
    let mut manager = ConnectionManager::new(WsConnector, &config).with_recorder(recorder);
    manager.subscribe(printer());
    info!(url = manager.url(), "Starting");
    eprintln!("{}", HELP);

    let lines = spawn_stdin_reader();
    // Failures show up as the banner; the player retries with `connect`.
    if let Err(err) = manager.connect() {
        debug!(%err, "Connect failed");
    }

    loop {
        let line = if manager.is_connected() {
            match lines.try_recv() {
                Ok(line) => Some(line),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => break,
            }
        } else {
            match lines.recv_timeout(config.idle_tick()) {
                Ok(line) => Some(line),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        };
        if let Some(line) = line {
            if let Flow::Quit = handle_line(&mut manager, &line) {
                break;
            }
        }
        if manager.is_connected() {
            if let Err(err) = manager.pump() {
                debug!(%err, "Session ended");
            }
        }
    }

    manager.disconnect();
    Ok(())
}

fn handle_line(manager: &mut ConnectionManager<WsConnector>, line: &str) -> Flow {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    match verb {
        "" => {}
        "quit" | "exit" => return Flow::Quit,
        "help" => eprintln!("{}", HELP),
        "connect" => {
            if let Err(err) = manager.connect() {
                debug!(%err, "Connect failed");
            }
        }
        "note" => {
            let (id, text) = rest.trim().split_once(' ').unwrap_or((rest.trim(), ""));
            match id.parse::<u32>() {
                Ok(id) => manager.update_note(CardId(id), String::from(text.trim())),
                Err(_) => eprintln!("Usage: note <card id> <text>"),
            }
        }
        _ => match line.parse::<Command>() {
            Ok(command) => match manager.send_intent(&command) {
                Ok(()) => {}
                Err(SendError::NotConnected) => eprintln!("Not connected. Type `connect` to retry."),
                Err(err) => eprintln!("{}", err),
            },
            Err(err) => eprintln!("{}. Type `help` for a list of commands.", err),
        },
    }
    Flow::Continue
}

/// Prints the table whenever it changes, and every new log line once.
fn printer() -> impl FnMut(&Projection) {
    let mut game_id = 0;
    let mut printed_lines = 0;
    let mut last_summary = String::new();
    move |projection: &Projection| {
        let view = &projection.view;
        if view.game_id != game_id || view.log.len() < printed_lines {
            game_id = view.game_id;
            printed_lines = 0;
        }
        for line in view.log.iter().skip(printed_lines) {
            println!("> {}", line);
        }
        printed_lines = printed_lines.max(view.log.len());
        let summary = summarize(view);
        if summary != last_summary {
            println!("{}", summary);
            for card in &view.own_hand {
                if let (Some(id), Some(note)) = (card.id, &card.note) {
                    println!("   {} {}", id, note);
                }
            }
            last_summary = summary;
        }
        for err in &projection.errors {
            eprintln!("! {}", err);
        }
    }
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Logs go to stderr so they never interleave with the table printed on stdout.
fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().event_format(format).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
