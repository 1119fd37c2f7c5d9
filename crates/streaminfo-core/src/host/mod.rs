//! Trust boundary to the host application.
//!
//! The game exposes state through queryable objects and event callbacks.
//! Everything behind these traits belongs to the host; the controller only
//! assumes that queries are idempotent and that objects may not exist yet
//! when a session begins.

mod event;
#[cfg(any(test, feature = "replay"))]
pub mod script;

pub use event::{HostEvent, NoteKind};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::Display;

/// The kinds of host objects a session needs before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum HandleKind {
    #[strum(serialize = "time source")]
    TimeSource,
    #[strum(serialize = "energy source")]
    EnergySource,
    #[strum(serialize = "score source")]
    ScoreSource,
    #[strum(serialize = "level metadata")]
    LevelMetadata,
}

/// Elapsed and total time of the current run, in seconds.
pub trait TimeSource: Send + Sync {
    fn song_time(&self) -> f32;
    fn song_length(&self) -> f32;
}

/// Receiver for host event callbacks.
///
/// Invoked from the host's own dispatch context, so implementations must
/// not block and must never panic on malformed payloads.
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: HostEvent);
}

/// A host object that fires events.
pub trait EventSource: Send + Sync {
    /// Subscribe a listener. Dropping the returned [`Subscription`]
    /// unsubscribes it, on every exit path.
    fn subscribe(&self, listener: Arc<dyn EventListener>) -> Subscription;
}

/// Queryable host. Each finder is an idempotent "first instance of kind K"
/// lookup that may return `None` while the host is still constructing its
/// objects.
pub trait Host: Send + Sync {
    fn find_time_source(&self) -> Option<Arc<dyn TimeSource>>;
    fn find_score_source(&self) -> Option<Arc<dyn EventSource>>;
    fn find_energy_source(&self) -> Option<Arc<dyn EventSource>>;
    fn find_level_info(&self) -> Option<LevelInfo>;
}

/// The full handle set required to observe one session.
pub struct HostHandles {
    pub time: Arc<dyn TimeSource>,
    pub score: Arc<dyn EventSource>,
    pub energy: Arc<dyn EventSource>,
    pub level: LevelInfo,
}

impl std::fmt::Debug for HostHandles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandles")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// Level metadata read once per session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub song_name: String,
    pub song_sub_name: String,
    pub song_author_name: String,
    /// No-fail modifier: energy never reaches a failure state.
    pub no_fail: bool,
}

impl LevelInfo {
    /// Formatted full title, e.g. `"Song" by Sub - Author`.
    pub fn full_title(&self) -> String {
        format!(
            "\"{}\" by {} - {}",
            self.song_name, self.song_sub_name, self.song_author_name
        )
    }
}

/// RAII guard for an event subscription.
///
/// The release closure runs exactly once, when the guard is dropped.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
