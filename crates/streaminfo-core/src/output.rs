//! Flat-file output for stream overlay consumers.
//!
//! - `SongName.txt`: the current song title, rewritten each session.
//! - `overlaydata.txt`: overlay geometry, seeded once with defaults.
//! - `session_YYYY-MM-DD.log`: one summary line per finished run.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::Result;
use crate::snapshot::Snapshot;

/// Trailing padding appended to the song name. A legacy fixed-width
/// consumer depends on it; preserve verbatim.
pub const SONG_NAME_PADDING: &str = "               ";

const SONG_NAME_FILE: &str = "SongName.txt";
const OVERLAY_DATA_FILE: &str = "overlaydata.txt";

/// Overlay geometry rows written on first run.
const DEFAULT_GEOMETRY: [&str; 9] = [
    "567,288", "0,40", "75,198", "307,134", "16,132", "87,19", "170,83", "303,19", "0,0",
];

/// Writer for the well-known overlay data files.
pub struct StreamFiles {
    base_dir: PathBuf,
}

impl StreamFiles {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Create the data directory and seed missing files with defaults.
    pub fn ensure_layout(&self) -> Result<()> {
        fs::create_dir_all(&self.base_dir)?;

        let song_name = self.base_dir.join(SONG_NAME_FILE);
        if !song_name.exists() {
            fs::write(&song_name, "")?;
        }

        let overlay_data = self.base_dir.join(OVERLAY_DATA_FILE);
        if !overlay_data.exists() {
            let mut rows = DEFAULT_GEOMETRY.join("\n");
            rows.push('\n');
            fs::write(&overlay_data, rows)?;
        }

        Ok(())
    }

    /// Write the formatted full title, trailing-padded.
    pub fn write_song_name(&self, full_title: &str) -> Result<()> {
        fs::write(
            self.base_dir.join(SONG_NAME_FILE),
            format!("{full_title}{SONG_NAME_PADDING}"),
        )?;
        Ok(())
    }

    pub fn clear_song_name(&self) -> Result<()> {
        fs::write(self.base_dir.join(SONG_NAME_FILE), "")?;
        Ok(())
    }
}

/// End-of-run statistics for the session log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub title: String,
    pub score: u32,
    pub notes_hit: u32,
    pub notes_total: u32,
    pub energy: i32,
}

impl SessionSummary {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            title: snapshot.full_name().to_string(),
            score: snapshot.score(),
            notes_hit: snapshot.notes_hit(),
            notes_total: snapshot.notes_total(),
            energy: snapshot.energy(),
        }
    }
}

/// Appends one line per finished run to a dated log file.
pub struct SessionLog {
    base_dir: PathBuf,
}

impl SessionLog {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn append(&self, summary: &SessionSummary) -> Result<()> {
        let now = Local::now();
        let path = self
            .base_dir
            .join(format!("session_{}.log", now.format("%Y-%m-%d")));
        let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(
            file,
            "[{}] {} | score {} | notes {}/{} | energy {}",
            now.format("%H:%M:%S"),
            summary.title,
            summary.score,
            summary.notes_hit,
            summary.notes_total,
            summary.energy
        )?;
        Ok(())
    }
}
