//! # streaminfo-core
//!
//! Core library for the StreamInfo overlay controller.
//!
//! This crate provides:
//! - Session lifecycle control driven by scene-transition signals
//! - Retry-until-available discovery of host objects
//! - Event aggregation into a per-session telemetry snapshot
//! - An epoch-guarded background render loop feeding a display sink
//! - Flat-file output for stream overlay consumers
//!
//! ## Feature Flags
//!
//! - `replay`: Enables the scripted host, an in-process stand-in for the
//!   game used by the CLI replay driver. Tests always have it available.

pub mod aggregate;
pub mod cancel;
pub mod config;
pub mod error;
pub mod host;
pub mod output;
pub mod relay;
pub mod render;
pub mod session;
pub mod sink;
pub mod snapshot;

pub use aggregate::EventAggregator;
pub use cancel::CancelToken;
pub use config::{Config, DiscoveryConfig, OverlayConfig, SceneConfig};
pub use error::{Error, Result};
pub use host::{
    EventListener, EventSource, HandleKind, Host, HostEvent, HostHandles, LevelInfo, NoteKind,
    Subscription, TimeSource,
};
pub use output::{SessionLog, SessionSummary, StreamFiles};
pub use relay::{LogRelay, NowPlayingRelay};
pub use render::{build_frame, format_clock, format_progress, max_score_for_notes, run_render_loop};
pub use session::{Epoch, EpochCounter, SessionController, SessionPhase, discover_handles};
pub use sink::{DisplaySink, FileSink, OverlayUpdate};
pub use snapshot::{ENERGY_FAILED, ENERGY_NO_FAIL, Snapshot};
