pub mod bookmarks;
pub mod cli;
pub mod config;
pub mod db;
pub mod notify;
pub mod settings;
pub mod storage;
pub mod timer;
pub mod utils;
pub mod video;

use anyhow::Result;
use clap::Parser;

pub use bookmarks::{BookmarkError, BookmarkStore, ImportMode, ImportSummary};
pub use settings::{SettingsStore, TimerSettings};
pub use storage::{MemoryStore, SlotStore};
pub use timer::{PhaseTimer, TimerController, TimerEvent};

pub async fn run() -> Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("tubefocus starting up...");

    cli::dispatch(cli::Cli::parse()).await
}
