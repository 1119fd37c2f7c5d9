//! Frame building and the background render loop.

use std::time::Duration;

use tracing::debug;

use crate::cancel::CancelToken;
use crate::host::TimeSource;
use crate::session::Epoch;
use crate::sink::{DisplaySink, OverlayUpdate};
use crate::snapshot::Snapshot;

/// Points for a perfectly cut note.
pub const MAX_CUT_SCORE: u32 = 115;

/// Maximum achievable score for a note count.
///
/// Follows the combo multiplier ramp: 1x for the first note, 2x for the
/// next four, 4x for the next eight, 8x for the rest.
pub fn max_score_for_notes(notes: u32) -> u32 {
    let units = match notes {
        0 => 0,
        n if n == 1 => 1,
        n if n <= 5 => 1 + (n - 1) * 2,
        n if n <= 13 => 9 + (n - 5) * 4,
        n => 41 + (n - 13) * 8,
    };
    units * MAX_CUT_SCORE
}

/// Format seconds as `m:ss`, seconds zero-padded.
pub fn format_clock(seconds: f32) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Format `m:ss / m:ss (p%)` progress, percent rounded.
pub fn format_progress(elapsed: f32, total: f32) -> String {
    let percent = if total > 0.0 {
        (((elapsed / total) * 100.0).round() as i64).max(0)
    } else {
        0
    };
    format!(
        "{} / {} ({}%)",
        format_clock(elapsed),
        format_clock(total),
        percent
    )
}

/// Build one overlay frame from the current snapshot and time source.
pub fn build_frame(snapshot: &Snapshot, time: &dyn TimeSource) -> OverlayUpdate {
    let notes_total = snapshot.notes_total();
    OverlayUpdate {
        title: snapshot.full_name().to_string(),
        multiplier: snapshot.multiplier(),
        score: snapshot.score(),
        max_score: max_score_for_notes(notes_total),
        progress: format_progress(time.song_time(), time.song_length()),
        combo: snapshot.combo(),
        notes_hit: snapshot.notes_hit(),
        notes_total,
        energy: snapshot.energy(),
    }
}

/// Push frames to the sink at a fixed cadence while the bound epoch stays
/// current.
///
/// The epoch comparison is the stale-session guard: once the controller
/// advances past this loop's epoch, the loop performs no further sink
/// writes and exits within one interval. Sink failures are logged and
/// skipped, never fatal.
pub fn run_render_loop(
    snapshot: &Snapshot,
    time: &dyn TimeSource,
    sink: &dyn DisplaySink,
    epoch: &Epoch,
    cancel: &CancelToken,
    interval: Duration,
) {
    debug!("Render loop started (epoch {})", epoch.value());
    loop {
        if !epoch.is_current() || cancel.is_cancelled() || sink.is_closed() {
            break;
        }
        let frame = build_frame(snapshot, time);
        if let Err(e) = sink.update(&frame) {
            debug!("Sink update failed: {}", e);
        }
        if cancel.wait(interval) {
            break;
        }
    }
    debug!("Render loop stopped (epoch {})", epoch.value());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::EpochCounter;
    use crate::sink::MemorySink;

    struct FixedTime {
        time: f32,
        length: f32,
    }

    impl TimeSource for FixedTime {
        fn song_time(&self) -> f32 {
            self.time
        }

        fn song_length(&self) -> f32 {
            self.length
        }
    }

    #[test]
    fn test_max_score_tiers() {
        assert_eq!(max_score_for_notes(0), 0);
        assert_eq!(max_score_for_notes(1), 115);
        assert_eq!(max_score_for_notes(2), 3 * 115);
        assert_eq!(max_score_for_notes(5), 9 * 115);
        assert_eq!(max_score_for_notes(6), 13 * 115);
        assert_eq!(max_score_for_notes(13), 41 * 115);
        assert_eq!(max_score_for_notes(14), 49 * 115);
        assert_eq!(max_score_for_notes(27), 153 * 115);
    }

    #[test]
    fn test_clock_formatting() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(59.9), "0:59");
        assert_eq!(format_clock(60.0), "1:00");
        assert_eq!(format_clock(125.7), "2:05");
        assert_eq!(format_clock(-3.0), "0:00");
        assert_eq!(format_clock(f32::NAN), "0:00");
    }

    #[test]
    fn test_progress_formatting() {
        assert_eq!(format_progress(45.0, 192.0), "0:45 / 3:12 (23%)");
        assert_eq!(format_progress(0.0, 0.0), "0:00 / 0:00 (0%)");
        assert_eq!(format_progress(96.0, 192.0), "1:36 / 3:12 (50%)");
    }

    #[test]
    fn test_build_frame_reads_snapshot() {
        let snapshot = Snapshot::new();
        snapshot.set_full_name("\"X\" by Y - Z");
        snapshot.set_score(500);
        snapshot.set_combo(7);
        snapshot.set_multiplier(2);
        snapshot.record_hit();
        snapshot.record_hit();
        snapshot.record_miss();
        snapshot.set_energy_fraction(0.55);

        let time = FixedTime {
            time: 30.0,
            length: 60.0,
        };
        let frame = build_frame(&snapshot, &time);
        assert_eq!(frame.title, "\"X\" by Y - Z");
        assert_eq!(frame.score, 500);
        assert_eq!(frame.max_score, max_score_for_notes(3));
        assert_eq!(frame.notes_hit, 2);
        assert_eq!(frame.notes_total, 3);
        assert_eq!(frame.energy, 55);
        assert_eq!(frame.progress, "0:30 / 1:00 (50%)");
    }

    #[test]
    fn test_stale_epoch_renders_nothing() {
        let counter = EpochCounter::new();
        let stale = counter.advance();
        counter.advance();

        let snapshot = Snapshot::new();
        let time = FixedTime {
            time: 1.0,
            length: 2.0,
        };
        let sink = MemorySink::new();
        let cancel = CancelToken::new();

        run_render_loop(
            &snapshot,
            &time,
            &sink,
            &stale,
            &cancel,
            Duration::from_millis(1),
        );
        assert_eq!(sink.frame_count(), 0);
    }

    #[test]
    fn test_cancel_stops_loop_after_tick() {
        let counter = EpochCounter::new();
        let epoch = counter.advance();

        let snapshot = Snapshot::new();
        snapshot.set_full_name("t");
        let time = FixedTime {
            time: 1.0,
            length: 2.0,
        };
        let sink = MemorySink::new();
        let cancel = CancelToken::new();
        cancel.cancel();

        run_render_loop(
            &snapshot,
            &time,
            &sink,
            &epoch,
            &cancel,
            Duration::from_millis(1),
        );
        assert_eq!(sink.frame_count(), 0);
    }

    #[test]
    fn test_closed_sink_stops_loop() {
        let counter = EpochCounter::new();
        let epoch = counter.advance();

        let snapshot = Snapshot::new();
        let time = FixedTime {
            time: 1.0,
            length: 2.0,
        };
        let sink = MemorySink::new();
        sink.close();
        let cancel = CancelToken::new();

        run_render_loop(
            &snapshot,
            &time,
            &sink,
            &epoch,
            &cancel,
            Duration::from_millis(1),
        );
        assert_eq!(sink.frame_count(), 0);
    }
}
