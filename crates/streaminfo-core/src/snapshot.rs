//! Per-session telemetry snapshot.
//!
//! One instance exists per active session. Event handlers mutate it from
//! the host's dispatch context while the render loop reads it from the
//! session worker thread, so every field is individually atomic. No
//! consistency is promised across fields; a render tick may observe a
//! value that is one update behind.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

/// Energy sentinel: the run failed (energy reached zero).
pub const ENERGY_FAILED: i32 = -2;

/// Energy sentinel: no-fail modifier active, the run can never fail.
pub const ENERGY_NO_FAIL: i32 = -3;

/// Aggregated telemetry for the active session.
#[derive(Debug, Default)]
pub struct Snapshot {
    full_name: OnceLock<String>,
    combo: AtomicU32,
    multiplier: AtomicU32,
    score: AtomicU32,
    notes_hit: AtomicU32,
    notes_total: AtomicU32,
    /// `[0, 100]` during normal play, or one of the negative sentinels.
    energy: AtomicI32,
    energy_latched: AtomicBool,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the formatted song title. Immutable after the first call;
    /// returns false if a name was already set.
    pub fn set_full_name(&self, name: &str) -> bool {
        self.full_name.set(name.to_string()).is_ok()
    }

    pub fn full_name(&self) -> &str {
        self.full_name.get().map(String::as_str).unwrap_or("")
    }

    pub fn set_combo(&self, combo: u32) {
        self.combo.store(combo, Ordering::Relaxed);
    }

    pub fn combo(&self) -> u32 {
        self.combo.load(Ordering::Relaxed)
    }

    pub fn set_multiplier(&self, multiplier: u32) {
        self.multiplier.store(multiplier, Ordering::Relaxed);
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier.load(Ordering::Relaxed)
    }

    pub fn set_score(&self, score: u32) {
        self.score.store(score, Ordering::Relaxed);
    }

    pub fn score(&self) -> u32 {
        self.score.load(Ordering::Relaxed)
    }

    /// Record a missed scoring note.
    pub fn record_miss(&self) {
        self.notes_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a hit scoring note.
    ///
    /// The total is incremented first so a concurrent reader can never
    /// observe `notes_hit > notes_total`.
    pub fn record_hit(&self) {
        self.notes_total.fetch_add(1, Ordering::Relaxed);
        self.notes_hit.fetch_add(1, Ordering::Relaxed);
    }

    pub fn notes_hit(&self) -> u32 {
        self.notes_hit.load(Ordering::Relaxed)
    }

    pub fn notes_total(&self) -> u32 {
        self.notes_total.load(Ordering::Relaxed)
    }

    /// Apply an energy reading as a fraction in `[0, 1]`.
    ///
    /// Ignored once latched. A non-positive reading latches the failure
    /// sentinel. Non-finite values are dropped rather than allowed to
    /// corrupt the field.
    pub fn set_energy_fraction(&self, fraction: f32) {
        if self.energy_latched.load(Ordering::Acquire) || !fraction.is_finite() {
            return;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        if fraction > 0.0 {
            self.energy
                .store((fraction * 100.0).round() as i32, Ordering::Relaxed);
        } else {
            self.latch_energy(ENERGY_FAILED);
        }
    }

    /// One-way transition: set a terminal energy sentinel and ignore all
    /// further energy mutation for the session's lifetime.
    pub fn latch_energy(&self, sentinel: i32) {
        if !self.energy_latched.swap(true, Ordering::AcqRel) {
            self.energy.store(sentinel, Ordering::Release);
        }
    }

    pub fn energy(&self) -> i32 {
        self.energy.load(Ordering::Acquire)
    }

    pub fn energy_latched(&self) -> bool {
        self.energy_latched.load(Ordering::Acquire)
    }
}
