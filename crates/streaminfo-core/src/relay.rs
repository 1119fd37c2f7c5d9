//! Chat relay boundary.
//!
//! The actual chat client lives outside this crate; the controller only
//! announces the current song once per session start.

use tracing::info;

pub trait NowPlayingRelay: Send + Sync {
    fn publish_now_playing(&self, song: &str);
}

/// Relay that only logs. Stands in when no chat integration is wired up.
#[derive(Debug, Default)]
pub struct LogRelay;

impl NowPlayingRelay for LogRelay {
    fn publish_now_playing(&self, song: &str) {
        info!("Now playing: {}", song);
    }
}
