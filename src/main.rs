//! Binary entrypoint for the deskwars session host.
//!
//! Commands:
//! - `init` - write a starter `config.toml` with a fresh player id
//! - `start` - run the session: ticks, ambient simulation and backend sync
//! - `status` - summarize the local snapshot
//! - `act <json>` - apply one gameplay action to the snapshot
//! - `admin <json>` - apply one operator command to the snapshot
//! - `reset` - delete the local snapshot
//!
//! See the library crate docs for module-level details: `deskwars::`.
use std::path::Path;
#[cfg(feature = "remote")]
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::info;

use deskwars::config::Config;
use deskwars::game::{now_millis, AdminCommand, GameAction, GameState};
use deskwars::logutil::escape_log;
use deskwars::session::{DriverTimers, GameStateStore, PlayerProfile, SessionDriver};
use deskwars::storage::SnapshotStorage;
#[cfg(feature = "remote")]
use deskwars::sync::HttpBackend;
#[cfg(not(feature = "remote"))]
use deskwars::sync::Offline;

#[derive(Parser)]
#[command(name = "deskwars")]
#[command(about = "Session host for the Deskwars school tagging game")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Run the session host until Ctrl-C
    Start,
    /// Show the player card and recent activity from the snapshot
    Status,
    /// Apply one action, e.g. '{"type":"join_school","school_id":"maple"}'
    Act {
        /// Action as JSON
        action: String,
    },
    /// Apply one operator command, e.g. '{"command":"set_easter_eggs","value":true}'
    Admin {
        /// Command as JSON
        command: String,
    },
    /// Delete the local snapshot so the next start seeds a new world
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        return init_config(&cli.config).await;
    }

    let config = Config::load(&cli.config).await?;
    init_logging(&config, cli.verbose);

    let storage = SnapshotStorage::new(&config.storage.data_dir, &config.storage.snapshot_file);
    let profile = PlayerProfile {
        id: config.game.player_id.clone(),
        name: config.game.player_name.clone(),
    };

    match cli.command {
        Commands::Init => unreachable!("init returns before the config is loaded"),
        Commands::Start => {
            info!("Starting deskwars v{}", env!("CARGO_PKG_VERSION"));
            let store = GameStateStore::open(storage, &profile, config.game_settings(), now_millis());
            let timers = DriverTimers::from(&config.timers);

            #[cfg(feature = "remote")]
            {
                let backend = config
                    .remote
                    .enabled
                    .then(|| Arc::new(HttpBackend::new(&config.remote)));
                SessionDriver::new(store, backend, timers).run().await?;
            }
            #[cfg(not(feature = "remote"))]
            {
                if config.remote.enabled {
                    log::warn!("built without the 'remote' feature; playing offline");
                }
                SessionDriver::<Offline>::new(store, None, timers).run().await?;
            }
        }
        Commands::Status => match storage.load() {
            Ok(Some(state)) => print_status(&state),
            Ok(None) => println!("No snapshot yet at {}.", storage.path().display()),
            Err(e) => return Err(anyhow!("snapshot at {} is unreadable: {}", storage.path().display(), e)),
        },
        Commands::Act { action } => {
            let action: GameAction =
                serde_json::from_str(&action).map_err(|e| anyhow!("invalid action JSON: {}", e))?;
            let mut store = GameStateStore::open(storage, &profile, config.game_settings(), now_millis());
            match store.dispatch(&action, now_millis()) {
                Ok(outcome) => println!("{:?}", outcome),
                Err(e) => println!("Rejected: {}", e),
            }
        }
        Commands::Admin { command } => {
            let command: AdminCommand =
                serde_json::from_str(&command).map_err(|e| anyhow!("invalid admin JSON: {}", e))?;
            let mut store = GameStateStore::open(storage, &profile, config.game_settings(), now_millis());
            match store.admin(&command, now_millis()) {
                Ok(true) => println!("Applied."),
                Ok(false) => println!("Applied to this process only; settings reset on restart."),
                Err(e) => println!("Rejected: {}", e),
            }
        }
        Commands::Reset => {
            if storage.remove()? {
                println!("Removed {}.", storage.path().display());
            } else {
                println!("Nothing to remove.");
            }
        }
    }

    Ok(())
}

async fn init_config(path: &str) -> Result<()> {
    if Path::new(path).exists() {
        println!("{} already exists, leaving it alone.", path);
        return Ok(());
    }
    Config::create_default(path).await?;
    println!("Wrote {}. Set game.player_name before starting.", path);
    Ok(())
}

fn print_status(state: &GameState) {
    let p = &state.player;
    let school = p
        .school_id
        .as_deref()
        .and_then(|id| state.school(id))
        .map(|s| format!("{} (level {})", s.name, s.level))
        .unwrap_or_else(|| "none".to_string());
    println!("{} [{}]", p.name, p.id);
    println!("  level {}  xp {}  coins {}  fatigue {:.0}", p.level, p.xp, p.coins, p.fatigue);
    println!("  school: {}", school);
    println!("  backpack ({}/{}): {}", p.inventory.len(), p.backpack_size(), p.inventory.join(", "));
    println!(
        "  placed {}  cleaned {}  treasures {}",
        p.stats.tags_placed, p.stats.tags_cleaned, p.stats.treasures_found
    );
    let mine = state.active_tags.iter().filter(|t| t.creator_id == p.id).count();
    println!("  active tags: {} ({} yours)", state.active_tags.len(), mine);
    println!("Recent activity:");
    for entry in state.global_logs.iter().take(5) {
        println!("  - {}", escape_log(&entry.message));
    }
}

fn init_logging(config: &Config, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    let base_level = match verbosity {
        0 => config
            .logging
            .level
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let file = config.logging.file.as_ref().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| eprintln!("cannot open log file {}: {}", path, e))
            .ok()
    });

    match file {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Foreground runs echo to the console as well.
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
