use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio::sync::broadcast::error::RecvError;

use crate::{
    bookmarks::{BookmarkStore, ImportMode},
    config::HostConfig,
    db::Database,
    notify::{Notifier, Permission},
    settings::{SettingsStore, TimerSettings},
    storage::SlotStore,
    timer::{AlertRequest, TimerController, TimerEvent},
    video::extract_video_id,
};

#[derive(Debug, Parser)]
#[command(name = "tubefocus", version, about = "Work/break phase timer with video bookmarks")]
pub struct Cli {
    /// Directory holding the database (defaults to $TUBEFOCUS_DATA_DIR or the platform data dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the timer until interrupted with Ctrl-C
    Run {
        /// Stop after the first phase completes
        #[arg(long)]
        once: bool,
    },
    /// Show or change timer durations
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Manage video bookmarks
    Bookmark {
        #[command(subcommand)]
        action: BookmarkAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    Show,
    Set {
        /// Work phase length in minutes (1-60)
        #[arg(long)]
        work: Option<u32>,
        /// Short break length in minutes (1-30)
        #[arg(long = "break")]
        break_minutes: Option<u32>,
        /// Long break length in minutes (5-60)
        #[arg(long)]
        long_break: Option<u32>,
        /// Work phases before a long break (1-10)
        #[arg(long)]
        cycles: Option<u32>,
    },
}

#[derive(Debug, Subcommand)]
pub enum BookmarkAction {
    /// Bookmark a video by URL or id
    Add { video: String, description: String },
    Remove { id: String },
    /// Record a view of a bookmarked video
    View { id: String },
    List,
    /// Show how full the bookmark store is
    Status,
    /// Write bookmarks as CSV to a file or stdout
    Export {
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Load bookmarks from a CSV file (merging by default)
    Import {
        file: PathBuf,
        /// Replace the whole collection instead of merging
        #[arg(long)]
        replace: bool,
    },
}

/// Prints alerts to the terminal. A terminal never needs to ask.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn show(&self, alert: &AlertRequest) {
        println!("\x07[{}] {}", alert.title, alert.body);
    }
}

pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = HostConfig::resolve(cli.data_dir)?;
    let database = Database::new(config.database_path())?;
    info!("Using data at {}", database.path().display());
    let slots: Arc<dyn SlotStore> = Arc::new(database);

    match cli.command {
        Command::Run { once } => run_timer(&config, slots, once).await,
        Command::Settings { action } => settings_command(slots, action),
        Command::Bookmark { action } => bookmark_command(slots, action),
    }
}

async fn run_timer(config: &HostConfig, slots: Arc<dyn SlotStore>, once: bool) -> Result<()> {
    let settings = Arc::new(SettingsStore::new(slots));
    let controller = TimerController::new(settings, Arc::new(TerminalNotifier))
        .with_tick_interval(config.tick_interval)
        .with_heartbeat_every(config.heartbeat_every_ticks);

    let mut events = controller.subscribe();
    let state = controller.start().await;
    println!("{} {}", state.phase, state.clock());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let event = tokio::select! {
            _ = &mut ctrl_c => {
                controller.pause().await;
                println!();
                break;
            }
            event = events.recv() => event,
        };

        match event {
            Ok(TimerEvent::Heartbeat { .. }) => {
                let state = controller.get_state().await;
                println!("{} {}", state.phase, state.clock());
            }
            Ok(TimerEvent::PhaseChanged { phase }) => println!("-> {phase}"),
            Ok(TimerEvent::WorkBoundary { working }) => {
                info!("{} phase begins", if working { "Work" } else { "Rest" });
            }
            Ok(TimerEvent::RunningChanged { running: false }) => {
                if once {
                    break;
                }
                controller.start().await;
            }
            Ok(_) => {}
            Err(RecvError::Lagged(missed)) => warn!("Timer display lagged by {missed} events"),
            Err(RecvError::Closed) => break,
        }
    }

    Ok(())
}

fn settings_command(slots: Arc<dyn SlotStore>, action: SettingsAction) -> Result<()> {
    let store = SettingsStore::new(slots);
    match action {
        SettingsAction::Show => print_settings(&store.timer_settings()),
        SettingsAction::Set {
            work,
            break_minutes,
            long_break,
            cycles,
        } => {
            let current = store.timer_settings();
            let updated = TimerSettings {
                work_minutes: work.unwrap_or(current.work_minutes),
                break_minutes: break_minutes.unwrap_or(current.break_minutes),
                long_break_minutes: long_break.unwrap_or(current.long_break_minutes),
                cycles_before_long_break: cycles.unwrap_or(current.cycles_before_long_break),
            };
            store.update_timer_settings(updated)?;
            print_settings(&updated);
        }
    }
    Ok(())
}

fn print_settings(settings: &TimerSettings) {
    println!(
        "work {}m / break {}m / long break {}m every {} cycles",
        settings.work_minutes,
        settings.break_minutes,
        settings.long_break_minutes,
        settings.cycles_before_long_break
    );
}

fn bookmark_command(slots: Arc<dyn SlotStore>, action: BookmarkAction) -> Result<()> {
    let store = BookmarkStore::new(slots);
    match action {
        BookmarkAction::Add { video, description } => {
            let Some(video_id) = extract_video_id(&video) else {
                bail!("not a video URL or 11-character video id: {video}");
            };
            let bookmark = store.add(&video_id, &description)?;
            println!("Saved {} ({})", bookmark.id, bookmark.description);
        }
        BookmarkAction::Remove { id } => {
            if !store.remove(&id) {
                bail!("no bookmark for {id}");
            }
            println!("Removed {id}");
        }
        BookmarkAction::View { id } => {
            if !store.increment_views(&id) {
                bail!("no bookmark for {id}");
            }
            if let Some(bookmark) = store.get(&id) {
                println!("{} viewed {} times", bookmark.id, bookmark.views);
            }
        }
        BookmarkAction::List => {
            for bookmark in store.list() {
                println!("{:>5}  {}  {}", bookmark.views, bookmark.id, bookmark.description);
            }
        }
        BookmarkAction::Status => {
            let status = store.capacity_status();
            let note = if status.is_at_limit {
                " (full)"
            } else if status.is_near_limit {
                " (almost full)"
            } else {
                ""
            };
            println!("{}/{} bookmarks{note}", status.current, status.max);
        }
        BookmarkAction::Export { output } => {
            let csv = store.export_csv();
            match output {
                Some(path) => fs::write(&path, csv)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{csv}"),
            }
        }
        BookmarkAction::Import { file, replace } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let mode = if replace {
                ImportMode::Replace
            } else {
                ImportMode::Merge
            };
            let summary = store.import_csv(&text, mode)?;
            println!(
                "Imported {}, skipped {}, {} bookmarks total",
                summary.imported, summary.skipped, summary.total
            );
        }
    }
    Ok(())
}
