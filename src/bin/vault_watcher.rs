use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use log::info;

use vault_watcher::auth::credentials::load_authorized_user;
use vault_watcher::auth::token_manager::TokenManager;
use vault_watcher::config::{load_config, resolve_credentials_path, resolve_state_path};
use vault_watcher::gmail::client::GmailClient;
use vault_watcher::store::seen::SeenStore;
use vault_watcher::watcher::{GmailWatcher, run, run_cycle};

#[derive(Parser)]
#[command(name = "vault_watcher")]
#[command(about = "Poll Gmail and file unread mail as vault notes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the poll loop until interrupted
    Run {
        /// Seconds between poll cycles (overrides the config file)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Run a single poll cycle and exit
    Once,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;

    let creds = load_authorized_user(&resolve_credentials_path(&cfg)?)?;
    let client = GmailClient::new(TokenManager::new(creds))?;

    let seen = SeenStore::open(resolve_state_path(&cfg)?);
    info!("loaded {} processed ids", seen.len());

    let mut watcher = GmailWatcher::new(client, seen, Path::new(&cfg.vault_path))?;

    match cli.cmd {
        Command::Run { interval } => {
            let secs = interval.or(cfg.poll_interval_secs).unwrap_or(10);

            let running = Arc::new(AtomicBool::new(true));
            let r2 = running.clone();
            ctrlc::set_handler(move || {
                r2.store(false, Ordering::SeqCst);
            })?;

            run(&mut watcher, Duration::from_secs(secs), &running);
            Ok(())
        }

        Command::Once => {
            run_cycle(&mut watcher, None);
            Ok(())
        }
    }
}
