use serde::{Deserialize, Serialize};
use strum::Display;

/// What kind of note an event refers to. Bombs are not scoring notes and
/// are excluded from hit-rate accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    Normal,
    Bomb,
}

/// Raw event payloads fired by the host during a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostEvent {
    ComboChanged { combo: u32 },
    MultiplierChanged { multiplier: u32 },
    ScoreChanged { score: u32 },
    NoteMissed { note: NoteKind },
    NoteCut { note: NoteKind, good_cut: bool },
    /// Energy as a fraction in `[0, 1]`.
    EnergyChanged { energy: f32 },
    /// Explicit depletion signal, fired once when energy reaches zero.
    EnergyDepleted,
}
