use std::{env, path::PathBuf, time::Duration};

use anyhow::{anyhow, Result};
use directories::ProjectDirs;

pub const DATA_DIR_ENV: &str = "TUBEFOCUS_DATA_DIR";
pub const DEBUG_ENV: &str = "TUBEFOCUS_DEBUG";

const DATABASE_FILE: &str = "tubefocus.sqlite3";

/// Runtime knobs for the host process. Timer durations are not here; they
/// live in the persisted [`crate::settings::TimerSettings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub data_dir: PathBuf,
    pub tick_interval: Duration,
    pub heartbeat_every_ticks: u32,
}

impl HostConfig {
    /// `data_dir` wins over the environment, which wins over the platform
    /// default location.
    pub fn resolve(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir.or_else(|| env::var_os(DATA_DIR_ENV).map(PathBuf::from)) {
            Some(dir) => dir,
            None => ProjectDirs::from("", "", "tubefocus")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or_else(|| anyhow!("could not determine a data directory; set {DATA_DIR_ENV}"))?,
        };

        Ok(Self {
            data_dir,
            tick_interval: Duration::from_secs(1),
            heartbeat_every_ticks: if debug_enabled() { 1 } else { 10 },
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

fn debug_enabled() -> bool {
    env::var(DEBUG_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
