//! Replay a scripted session against the simulated host.
//!
//! The script is JSON lines, one step per line; blank lines and lines
//! starting with `#` are skipped. Example:
//!
//! ```text
//! {"step":"level","song_name":"X","song_sub_name":"Y","song_author_name":"Z"}
//! {"step":"available"}
//! {"step":"scene","name":"GameplayCore"}
//! {"step":"time","elapsed":45.0,"length":192.0}
//! {"step":"event","kind":"score_changed","score":420}
//! {"step":"wait","ms":500}
//! {"step":"scene","name":"Menu"}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use streaminfo_core::{
    CancelToken, Config, DisplaySink, FileSink, Host, HostEvent, LevelInfo, LogRelay,
    NowPlayingRelay, OverlayUpdate, SessionController,
};
use streaminfo_core::host::script::ScriptedHost;
use tracing::{info, warn};

use crate::keys;

#[derive(Debug, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
enum ScriptStep {
    /// Scene-transition signal.
    Scene { name: String },
    /// Stage level metadata for the next discovery.
    Level {
        song_name: String,
        #[serde(default)]
        song_sub_name: String,
        #[serde(default)]
        song_author_name: String,
        #[serde(default)]
        no_fail: bool,
    },
    /// Make host objects discoverable.
    Available,
    /// Tear host objects down again.
    Unavailable,
    /// Fire a raw host event.
    Event {
        #[serde(flatten)]
        event: HostEvent,
    },
    /// Update the time source.
    Time { elapsed: f32, length: f32 },
    /// Let the session run for a while.
    Wait { ms: u64 },
}

/// Console sink: prints each frame as its text block.
struct ConsoleSink;

impl DisplaySink for ConsoleSink {
    fn update(&self, frame: &OverlayUpdate) -> streaminfo_core::Result<()> {
        println!("{frame}\n");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        false
    }
}

pub fn run(config_path: &Path, script_path: &Path, console: bool) -> Result<()> {
    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        }
    };

    let host = Arc::new(ScriptedHost::new());
    let sink: Arc<dyn DisplaySink> = if console {
        Arc::new(ConsoleSink)
    } else {
        Arc::new(FileSink::new(&config.data_dir))
    };
    let relay: Arc<dyn NowPlayingRelay> = Arc::new(LogRelay);
    let controller = SessionController::new(
        Arc::clone(&host) as Arc<dyn Host>,
        sink,
        relay,
        config,
    )?;

    let shutdown = Arc::new(CancelToken::new());
    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        shutdown_ctrlc.cancel();
    })?;
    let _keys = keys::spawn_quit_monitor(Arc::clone(&shutdown));

    let file = File::open(script_path)
        .with_context(|| format!("failed to open script {}", script_path.display()))?;
    info!("Replaying {}", script_path.display());

    for (number, line) in BufReader::new(file).lines().enumerate() {
        if shutdown.is_cancelled() {
            break;
        }
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step: ScriptStep = serde_json::from_str(line)
            .with_context(|| format!("bad script step on line {}", number + 1))?;
        apply_step(&controller, &host, &shutdown, step);
    }

    controller.shutdown();
    info!("Replay complete");
    Ok(())
}

fn apply_step(
    controller: &SessionController,
    host: &ScriptedHost,
    shutdown: &CancelToken,
    step: ScriptStep,
) {
    match step {
        ScriptStep::Scene { name } => controller.on_scene_change(&name),
        ScriptStep::Level {
            song_name,
            song_sub_name,
            song_author_name,
            no_fail,
        } => host.load_level(LevelInfo {
            song_name,
            song_sub_name,
            song_author_name,
            no_fail,
        }),
        ScriptStep::Available => host.make_available(),
        ScriptStep::Unavailable => host.make_unavailable(),
        ScriptStep::Event { event } => host.emit(event),
        ScriptStep::Time { elapsed, length } => host.set_time(elapsed, length),
        ScriptStep::Wait { ms } => {
            shutdown.wait(Duration::from_millis(ms));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streaminfo_core::NoteKind;

    #[test]
    fn test_script_step_parsing() {
        let step: ScriptStep =
            serde_json::from_str(r#"{"step":"scene","name":"GameplayCore"}"#).unwrap();
        assert!(matches!(step, ScriptStep::Scene { name } if name == "GameplayCore"));

        let step: ScriptStep = serde_json::from_str(
            r#"{"step":"event","kind":"note_cut","note":"normal","good_cut":true}"#,
        )
        .unwrap();
        match step {
            ScriptStep::Event {
                event: HostEvent::NoteCut { note, good_cut },
            } => {
                assert_eq!(note, NoteKind::Normal);
                assert!(good_cut);
            }
            other => panic!("unexpected step: {other:?}"),
        }
    }

    #[test]
    fn test_level_step_defaults() {
        let step: ScriptStep =
            serde_json::from_str(r#"{"step":"level","song_name":"X"}"#).unwrap();
        match step {
            ScriptStep::Level {
                song_name,
                song_sub_name,
                no_fail,
                ..
            } => {
                assert_eq!(song_name, "X");
                assert_eq!(song_sub_name, "");
                assert!(!no_fail);
            }
            other => panic!("unexpected step: {other:?}"),
        }
    }
}
