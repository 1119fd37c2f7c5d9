//! Event aggregation rules.
//!
//! Maps each raw host event to a snapshot mutation. Every transform is
//! idempotent with respect to assignment events; note events are counting
//! and rely on the snapshot keeping `hit <= total` by construction.

use std::sync::Arc;

use crate::host::{EventListener, HostEvent, NoteKind};
use crate::snapshot::{ENERGY_FAILED, Snapshot};

/// Applies host events to a session snapshot.
pub struct EventAggregator {
    snapshot: Arc<Snapshot>,
}

impl EventAggregator {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }

    pub fn apply(&self, event: HostEvent) {
        match event {
            HostEvent::ComboChanged { combo } => self.snapshot.set_combo(combo),
            HostEvent::MultiplierChanged { multiplier } => self.snapshot.set_multiplier(multiplier),
            HostEvent::ScoreChanged { score } => self.snapshot.set_score(score),
            HostEvent::NoteMissed { note } => self.note_missed(note),
            HostEvent::NoteCut { note, good_cut } => {
                if note != NoteKind::Bomb && good_cut {
                    self.snapshot.record_hit();
                } else {
                    // A bad cut counts the same as an outright miss.
                    self.note_missed(note);
                }
            }
            HostEvent::EnergyChanged { energy } => self.snapshot.set_energy_fraction(energy),
            HostEvent::EnergyDepleted => self.snapshot.latch_energy(ENERGY_FAILED),
        }
    }

    fn note_missed(&self, note: NoteKind) {
        if note != NoteKind::Bomb {
            self.snapshot.record_miss();
        }
    }
}

impl EventListener for EventAggregator {
    fn on_event(&self, event: HostEvent) {
        self.apply(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ENERGY_NO_FAIL;

    fn aggregator() -> (EventAggregator, Arc<Snapshot>) {
        let snapshot = Arc::new(Snapshot::new());
        (EventAggregator::new(Arc::clone(&snapshot)), snapshot)
    }

    #[test]
    fn test_assignment_events() {
        let (agg, snapshot) = aggregator();
        agg.apply(HostEvent::ComboChanged { combo: 12 });
        agg.apply(HostEvent::MultiplierChanged { multiplier: 4 });
        agg.apply(HostEvent::ScoreChanged { score: 9870 });
        assert_eq!(snapshot.combo(), 12);
        assert_eq!(snapshot.multiplier(), 4);
        assert_eq!(snapshot.score(), 9870);
    }

    #[test]
    fn test_good_cut_counts_hit_and_total() {
        let (agg, snapshot) = aggregator();
        agg.apply(HostEvent::NoteCut {
            note: NoteKind::Normal,
            good_cut: true,
        });
        assert_eq!(snapshot.notes_hit(), 1);
        assert_eq!(snapshot.notes_total(), 1);
    }

    #[test]
    fn test_bad_cut_counts_as_miss() {
        let (agg, snapshot) = aggregator();
        agg.apply(HostEvent::NoteCut {
            note: NoteKind::Normal,
            good_cut: false,
        });
        assert_eq!(snapshot.notes_hit(), 0);
        assert_eq!(snapshot.notes_total(), 1);
    }

    #[test]
    fn test_bombs_never_counted() {
        let (agg, snapshot) = aggregator();
        agg.apply(HostEvent::NoteCut {
            note: NoteKind::Normal,
            good_cut: true,
        });
        agg.apply(HostEvent::NoteCut {
            note: NoteKind::Bomb,
            good_cut: false,
        });
        agg.apply(HostEvent::NoteCut {
            note: NoteKind::Bomb,
            good_cut: true,
        });
        agg.apply(HostEvent::NoteMissed {
            note: NoteKind::Bomb,
        });
        assert_eq!(snapshot.notes_hit(), 1);
        assert_eq!(snapshot.notes_total(), 1);
    }

    #[test]
    fn test_hit_rate_invariant_over_mixed_sequence() {
        let (agg, snapshot) = aggregator();
        let events = [
            HostEvent::NoteCut {
                note: NoteKind::Normal,
                good_cut: true,
            },
            HostEvent::NoteMissed {
                note: NoteKind::Normal,
            },
            HostEvent::NoteCut {
                note: NoteKind::Bomb,
                good_cut: false,
            },
            HostEvent::NoteCut {
                note: NoteKind::Normal,
                good_cut: false,
            },
            HostEvent::NoteCut {
                note: NoteKind::Normal,
                good_cut: true,
            },
        ];
        for event in events {
            agg.apply(event);
            assert!(snapshot.notes_hit() <= snapshot.notes_total());
        }
        assert_eq!(snapshot.notes_hit(), 2);
        assert_eq!(snapshot.notes_total(), 4);
    }

    #[test]
    fn test_energy_sequence_from_host() {
        let (agg, snapshot) = aggregator();
        agg.apply(HostEvent::EnergyChanged { energy: 0.55 });
        assert_eq!(snapshot.energy(), 55);
        agg.apply(HostEvent::EnergyChanged { energy: 0.0 });
        assert_eq!(snapshot.energy(), ENERGY_FAILED);
        agg.apply(HostEvent::EnergyChanged { energy: 0.9 });
        assert_eq!(snapshot.energy(), ENERGY_FAILED);
    }

    #[test]
    fn test_explicit_depletion_latches_once() {
        let (agg, snapshot) = aggregator();
        agg.apply(HostEvent::EnergyDepleted);
        assert_eq!(snapshot.energy(), ENERGY_FAILED);
        agg.apply(HostEvent::EnergyChanged { energy: 1.0 });
        assert_eq!(snapshot.energy(), ENERGY_FAILED);
    }

    #[test]
    fn test_no_fail_blocks_depletion() {
        let (agg, snapshot) = aggregator();
        snapshot.latch_energy(ENERGY_NO_FAIL);
        agg.apply(HostEvent::EnergyDepleted);
        agg.apply(HostEvent::EnergyChanged { energy: 0.0 });
        assert_eq!(snapshot.energy(), ENERGY_NO_FAIL);
    }
}
