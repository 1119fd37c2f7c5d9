//! Display sink boundary.
//!
//! The concrete rendering surface (overlay window, OBS text source, log
//! file) is pluggable; the controller only needs `update` and a closed
//! signal. A closed sink ends the session.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// One formatted overlay frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayUpdate {
    pub title: String,
    pub multiplier: u32,
    pub score: u32,
    /// Maximum achievable score for the notes seen so far.
    pub max_score: u32,
    /// `m:ss / m:ss (p%)` progress string.
    pub progress: String,
    pub combo: u32,
    pub notes_hit: u32,
    pub notes_total: u32,
    pub energy: i32,
}

impl fmt::Display for OverlayUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "Score: {} / {}", self.score, self.max_score)?;
        writeln!(f, "Multiplier: x{}", self.multiplier)?;
        writeln!(f, "Combo: {}", self.combo)?;
        writeln!(f, "Notes: {}/{}", self.notes_hit, self.notes_total)?;
        writeln!(f, "Energy: {}", self.energy)?;
        write!(f, "Time: {}", self.progress)
    }
}

pub trait DisplaySink: Send + Sync {
    /// Push one frame. Failures are non-fatal to the session.
    fn update(&self, frame: &OverlayUpdate) -> Result<()>;

    /// Whether the surface has gone away. The render loop stops pushing
    /// within one refresh interval once this turns true.
    fn is_closed(&self) -> bool;
}

/// Sink that writes the frame text to `overlay.txt` in the data directory.
pub struct FileSink {
    path: PathBuf,
    closed: AtomicBool,
}

impl FileSink {
    pub const FILE_NAME: &'static str = "overlay.txt";

    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            path: data_dir.as_ref().join(Self::FILE_NAME),
            closed: AtomicBool::new(false),
        }
    }

    /// Mark the sink closed; later updates fail with `SinkUnavailable`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DisplaySink for FileSink {
    fn update(&self, frame: &OverlayUpdate) -> Result<()> {
        if self.is_closed() {
            return Err(Error::SinkUnavailable);
        }
        fs::write(&self.path, frame.to_string())?;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// In-memory sink for tests: records every frame it receives.
#[cfg(test)]
pub struct MemorySink {
    frames: std::sync::Mutex<Vec<OverlayUpdate>>,
    closed: AtomicBool,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self {
            frames: std::sync::Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().map(|f| f.len()).unwrap_or(0)
    }

    pub fn last_frame(&self) -> Option<OverlayUpdate> {
        self.frames.lock().ok().and_then(|f| f.last().cloned())
    }
}

#[cfg(test)]
impl DisplaySink for MemorySink {
    fn update(&self, frame: &OverlayUpdate) -> Result<()> {
        if self.is_closed() {
            return Err(Error::SinkUnavailable);
        }
        if let Ok(mut frames) = self.frames.lock() {
            frames.push(frame.clone());
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
