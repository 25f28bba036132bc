// src/feed/store.rs
// Flat-directory episode store. Names are stable and date-derived so a
// retried run overwrites its own partial file instead of appending a new
// one.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

pub struct EpisodeStore {
    dir: PathBuf,
}

impl EpisodeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn episode_file_name(slug: &str, date: NaiveDate) -> String {
        format!("{slug}-{}.mp3", date.format("%Y-%m-%d"))
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Persist audio bytes under `file_name` via temp file + rename, so no
    /// partially written file is ever addressable under the published name.
    pub fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating episode dir {}", self.dir.display()))?;
        let path = self.path_for(file_name);
        let tmp = path.with_extension("mp3.tmp");
        fs::write(&tmp, bytes).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("renaming {} into place", tmp.display()))?;
        Ok(path)
    }
}
