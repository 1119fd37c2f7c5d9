//! In-process host stand-in.
//!
//! Drives the controller without the real game: object availability is
//! toggled on demand and events are dispatched to whatever listeners are
//! subscribed, from whichever thread calls [`ScriptedHost::emit`].

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::{
    EventListener, EventSource, Host, HostEvent, LevelInfo, Subscription, TimeSource,
};

/// Time source fed by the script.
#[derive(Default)]
pub struct ScriptedTime {
    elapsed_ms: AtomicU32,
    length_ms: AtomicU32,
}

impl ScriptedTime {
    pub fn set(&self, elapsed_secs: f32, length_secs: f32) {
        self.elapsed_ms
            .store(to_millis(elapsed_secs), Ordering::Relaxed);
        self.length_ms
            .store(to_millis(length_secs), Ordering::Relaxed);
    }
}

fn to_millis(seconds: f32) -> u32 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0) as u32
    } else {
        0
    }
}

impl TimeSource for ScriptedTime {
    fn song_time(&self) -> f32 {
        self.elapsed_ms.load(Ordering::Relaxed) as f32 / 1000.0
    }

    fn song_length(&self) -> f32 {
        self.length_ms.load(Ordering::Relaxed) as f32 / 1000.0
    }
}

/// Event source with subscribe/unsubscribe bookkeeping.
#[derive(Default)]
pub struct ScriptedEvents {
    listeners: Arc<Mutex<Vec<(u64, Arc<dyn EventListener>)>>>,
    next_id: AtomicU64,
}

impl ScriptedEvents {
    pub fn emit(&self, event: HostEvent) {
        let listeners: Vec<Arc<dyn EventListener>> = match self.listeners.lock() {
            Ok(guard) => guard.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener.on_event(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }
}

impl EventSource for ScriptedEvents {
    fn subscribe(&self, listener: Arc<dyn EventListener>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, listener));
        }
        let listeners = Arc::clone(&self.listeners);
        Subscription::new(move || {
            if let Ok(mut listeners) = listeners.lock() {
                listeners.retain(|(entry, _)| *entry != id);
            }
        })
    }
}

/// Scriptable [`Host`]: handles exist only after `make_available`.
#[derive(Default)]
pub struct ScriptedHost {
    available: AtomicBool,
    level: Mutex<Option<LevelInfo>>,
    time: Arc<ScriptedTime>,
    score: Arc<ScriptedEvents>,
    energy: Arc<ScriptedEvents>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage the level metadata the next discovery will observe.
    pub fn load_level(&self, level: LevelInfo) {
        if let Ok(mut slot) = self.level.lock() {
            *slot = Some(level);
        }
    }

    /// Make all staged objects discoverable.
    pub fn make_available(&self) {
        self.available.store(true, Ordering::Release);
    }

    /// Tear the objects down again, as a scene unload would.
    pub fn make_unavailable(&self) {
        self.available.store(false, Ordering::Release);
    }

    pub fn set_time(&self, elapsed_secs: f32, length_secs: f32) {
        self.time.set(elapsed_secs, length_secs);
    }

    /// Dispatch an event to the source the real host would fire it from.
    pub fn emit(&self, event: HostEvent) {
        match event {
            HostEvent::EnergyChanged { .. } | HostEvent::EnergyDepleted => self.energy.emit(event),
            _ => self.score.emit(event),
        }
    }

    pub fn score_events(&self) -> &ScriptedEvents {
        &self.score
    }

    pub fn energy_events(&self) -> &ScriptedEvents {
        &self.energy
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }
}

impl Host for ScriptedHost {
    fn find_time_source(&self) -> Option<Arc<dyn TimeSource>> {
        self.is_available()
            .then(|| Arc::clone(&self.time) as Arc<dyn TimeSource>)
    }

    fn find_score_source(&self) -> Option<Arc<dyn EventSource>> {
        self.is_available()
            .then(|| Arc::clone(&self.score) as Arc<dyn EventSource>)
    }

    fn find_energy_source(&self) -> Option<Arc<dyn EventSource>> {
        self.is_available()
            .then(|| Arc::clone(&self.energy) as Arc<dyn EventSource>)
    }

    fn find_level_info(&self) -> Option<LevelInfo> {
        if !self.is_available() {
            return None;
        }
        self.level.lock().ok().and_then(|slot| slot.clone())
    }
}
