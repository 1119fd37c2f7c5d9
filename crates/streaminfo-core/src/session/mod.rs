//! Session lifecycle control.
//!
//! The controller reacts to scene-transition signals: a destination in
//! the configured gameplay set starts a session, anything else ends one.
//! Each session gets a fresh snapshot, a new epoch, and one background
//! worker thread that discovers host objects, hooks events, and runs the
//! render loop until the session dies.

mod discovery;
mod epoch;

pub use discovery::discover_handles;
pub use epoch::{Epoch, EpochCounter};

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use strum::Display;
use tracing::{debug, error, info, warn};

use crate::aggregate::EventAggregator;
use crate::cancel::CancelToken;
use crate::config::{Config, DiscoveryConfig};
use crate::error::Result;
use crate::host::{EventListener, Host};
use crate::output::{SessionLog, SessionSummary, StreamFiles};
use crate::relay::NowPlayingRelay;
use crate::render::run_render_loop;
use crate::sink::DisplaySink;
use crate::snapshot::{ENERGY_NO_FAIL, Snapshot};

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[repr(u8)]
pub enum SessionPhase {
    Idle = 0,
    Discovering = 1,
    Running = 2,
    Terminating = 3,
}

impl SessionPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Discovering,
            2 => Self::Running,
            3 => Self::Terminating,
            _ => Self::Idle,
        }
    }
}

/// Session lifecycle state machine.
pub struct SessionController {
    host: Arc<dyn Host>,
    sink: Arc<dyn DisplaySink>,
    relay: Arc<dyn NowPlayingRelay>,
    files: Arc<StreamFiles>,
    log: Arc<SessionLog>,
    config: Config,
    epochs: EpochCounter,
    phase: Arc<AtomicU8>,
    active: Mutex<Option<ActiveSession>>,
}

struct ActiveSession {
    epoch: u64,
    cancel: Arc<CancelToken>,
    snapshot: Arc<Snapshot>,
    worker: JoinHandle<()>,
}

impl SessionController {
    /// Create a controller and make sure the data directory exists.
    pub fn new(
        host: Arc<dyn Host>,
        sink: Arc<dyn DisplaySink>,
        relay: Arc<dyn NowPlayingRelay>,
        config: Config,
    ) -> Result<Self> {
        let files = Arc::new(StreamFiles::new(&config.data_dir));
        files.ensure_layout()?;
        let log = Arc::new(SessionLog::new(&config.data_dir));

        Ok(Self {
            host,
            sink,
            relay,
            files,
            log,
            config,
            epochs: EpochCounter::new(),
            phase: Arc::new(AtomicU8::new(SessionPhase::Idle as u8)),
            active: Mutex::new(None),
        })
    }

    /// React to a scene-transition signal.
    pub fn on_scene_change(&self, scene: &str) {
        if self.config.scenes.is_gameplay(scene) {
            info!("Entered gameplay scene: {}", scene);
            self.start_session();
        } else {
            debug!("Non-gameplay scene: {}", scene);
            self.end_session();
        }
    }

    /// The display surface went away; treat like a session end.
    pub fn on_sink_closed(&self) {
        info!("Display sink closed");
        self.end_session();
    }

    /// Stop any active session and release its resources.
    pub fn shutdown(&self) {
        self.end_session();
    }

    pub fn phase(&self) -> SessionPhase {
        SessionPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    pub fn current_epoch(&self) -> u64 {
        self.epochs.current()
    }

    /// Snapshot of the active session, if one exists.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.active
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| Arc::clone(&s.snapshot)))
    }

    fn start_session(&self) {
        // A gameplay signal while a session is live means the previous
        // run ended without a menu transition; tear it down first.
        self.end_session();

        if !self.config.overlay.enabled {
            debug!("Overlay disabled, ignoring session start");
            return;
        }

        let epoch = self.epochs.advance();
        let snapshot = Arc::new(Snapshot::new());
        let cancel = Arc::new(CancelToken::new());
        self.set_phase(SessionPhase::Discovering);
        debug!("Session starting (epoch {})", epoch.value());

        let worker = SessionWorker {
            host: Arc::clone(&self.host),
            sink: Arc::clone(&self.sink),
            relay: Arc::clone(&self.relay),
            files: Arc::clone(&self.files),
            log: Arc::clone(&self.log),
            discovery: self.config.discovery.clone(),
            refresh: self.config.overlay.refresh_interval(),
            epoch: epoch.clone(),
            cancel: Arc::clone(&cancel),
            snapshot: Arc::clone(&snapshot),
            phase: Arc::clone(&self.phase),
        };

        let spawned = thread::Builder::new()
            .name(format!("session-{}", epoch.value()))
            .spawn(move || worker.run());

        match spawned {
            Ok(handle) => {
                if let Ok(mut active) = self.active.lock() {
                    *active = Some(ActiveSession {
                        epoch: epoch.value(),
                        cancel,
                        snapshot,
                        worker: handle,
                    });
                }
            }
            Err(e) => {
                error!("Failed to spawn session worker: {}", e);
                self.set_phase(SessionPhase::Idle);
            }
        }
    }

    /// End the active session, if any. Cancellation is explicit rather
    /// than relying on epoch drift alone; the worker is joined so every
    /// subscription guard has been dropped before this returns.
    pub fn end_session(&self) {
        let taken = self.active.lock().ok().and_then(|mut guard| guard.take());
        if let Some(session) = taken {
            self.set_phase(SessionPhase::Terminating);
            debug!("Ending session (epoch {})", session.epoch);
            session.cancel.cancel();
            if session.worker.join().is_err() {
                warn!("Session worker panicked (epoch {})", session.epoch);
            }
            if let Err(e) = self.files.clear_song_name() {
                warn!("Failed to clear song name file: {}", e);
            }
            info!("Ready for next session");
        }
        self.set_phase(SessionPhase::Idle);
    }

    fn set_phase(&self, phase: SessionPhase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Everything one background session thread needs, bound to its epoch.
struct SessionWorker {
    host: Arc<dyn Host>,
    sink: Arc<dyn DisplaySink>,
    relay: Arc<dyn NowPlayingRelay>,
    files: Arc<StreamFiles>,
    log: Arc<SessionLog>,
    discovery: DiscoveryConfig,
    refresh: Duration,
    epoch: Epoch,
    cancel: Arc<CancelToken>,
    snapshot: Arc<Snapshot>,
    phase: Arc<AtomicU8>,
}

impl SessionWorker {
    fn run(self) {
        let handles = match discover_handles(
            self.host.as_ref(),
            &self.epoch,
            &self.discovery,
            &self.cancel,
        ) {
            Ok(Some(handles)) => handles,
            Ok(None) => {
                debug!("Session cancelled during discovery (epoch {})", self.epoch.value());
                return;
            }
            Err(e) => {
                error!("Discovery failed: {}", e);
                self.set_phase_if_current(SessionPhase::Idle);
                return;
            }
        };

        if !self.epoch.is_current() || self.cancel.is_cancelled() {
            return;
        }

        let full_title = handles.level.full_title();
        self.snapshot.set_full_name(&full_title);
        if let Err(e) = self.files.write_song_name(&full_title) {
            warn!("Failed to write song name file: {}", e);
        }
        self.relay.publish_now_playing(&full_title);

        let listener: Arc<dyn EventListener> =
            Arc::new(EventAggregator::new(Arc::clone(&self.snapshot)));
        let _score_events = handles.score.subscribe(Arc::clone(&listener));
        let _energy_events = handles.energy.subscribe(Arc::clone(&listener));

        if handles.level.no_fail {
            debug!("No-fail modifier active, latching energy");
            self.snapshot.latch_energy(ENERGY_NO_FAIL);
        }

        self.set_phase_if_current(SessionPhase::Running);
        info!("Session running: {}", full_title);

        run_render_loop(
            &self.snapshot,
            handles.time.as_ref(),
            self.sink.as_ref(),
            &self.epoch,
            &self.cancel,
            self.refresh,
        );

        // End-of-run summary reads only this session's own snapshot.
        if let Err(e) = self.log.append(&SessionSummary::from_snapshot(&self.snapshot)) {
            warn!("Failed to write session log: {}", e);
        }

        self.set_phase_if_current(SessionPhase::Idle);
        debug!("Session worker finished (epoch {})", self.epoch.value());
    }

    /// Phase writes are guarded by the epoch so a stale worker cannot
    /// stomp the state a newer session has already set.
    fn set_phase_if_current(&self, phase: SessionPhase) {
        if self.epoch.is_current() {
            self.phase.store(phase as u8, Ordering::SeqCst);
        }
    }
}
