// Data-driven vibe configuration.
//
// Loop length, tempo, register, rhythmic resolution, and the inversion cycle
// are all configuration rather than constants in the engine. `VibeConfig`
// loads from JSON with every field optional (`#[serde(default)]`), so a
// config file only names what it overrides.
//
// `validate()` is called by `Vibe::new`; a vibe never runs with a config
// that would make generation fail midway.

use crate::error::VibeError;
use crate::time::NoteLength;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest inversion index magnitude a cycle may contain.
pub const MAX_INVERSION: i32 = 24;

/// Where the main voice draws its pitches from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MelodySource {
    /// The current bar's chord tones, rotated by the inversion cycle.
    #[default]
    Chord,
    /// The configured scale, rotated by the inversion cycle.
    Scale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VibeConfig {
    /// MIDI note the progression roots are offset from. 60 = middle C.
    pub base_midi_note: i32,
    /// Bars generated per `advance()` call.
    pub bars_per_loop: u32,
    /// Quarter notes per minute. Only the transport uses this.
    pub tempo_bpm: f64,
    /// Main-voice slots per bar. Must divide a bar of sixteenths evenly.
    pub subdivisions_per_bar: u32,
    /// Inversion index per loop iteration, cycled.
    pub inversion_cycle: Vec<i32>,
    /// Scale name, looked up in the theory tables.
    pub scale: String,
    pub melody_source: MelodySource,
}

impl Default for VibeConfig {
    fn default() -> Self {
        VibeConfig {
            base_midi_note: 60,
            bars_per_loop: 4,
            tempo_bpm: 120.0,
            subdivisions_per_bar: 8,
            inversion_cycle: vec![0, -1, 0, -2, 0, -1, 1, 2],
            scale: "major".to_string(),
            melody_source: MelodySource::Chord,
        }
    }
}

impl VibeConfig {
    pub fn from_json(json: &str) -> Result<Self, VibeError> {
        let config: VibeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, VibeError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn validate(&self) -> Result<(), VibeError> {
        if self.bars_per_loop == 0 {
            return Err(invalid("bars_per_loop", "must be at least 1"));
        }
        if !(self.tempo_bpm.is_finite() && self.tempo_bpm > 0.0) {
            return Err(invalid("tempo_bpm", "must be a positive number"));
        }
        if NoteLength::for_subdivisions(self.subdivisions_per_bar).is_none() {
            return Err(invalid("subdivisions_per_bar", "must be one of 1, 2, 4, 8, 16"));
        }
        if self.inversion_cycle.is_empty() {
            return Err(invalid("inversion_cycle", "must not be empty"));
        }
        if let Some(i) = self.inversion_cycle.iter().find(|i| i.abs() > MAX_INVERSION) {
            return Err(VibeError::InvalidConfig {
                field: "inversion_cycle",
                reason: format!("index {i} is outside -{MAX_INVERSION}..={MAX_INVERSION}"),
            });
        }
        if !(0..=127).contains(&self.base_midi_note) {
            return Err(invalid("base_midi_note", "must be a MIDI note (0-127)"));
        }
        Ok(())
    }

    /// Note length of one main-voice slot.
    pub fn subdivision_length(&self) -> Result<NoteLength, VibeError> {
        NoteLength::for_subdivisions(self.subdivisions_per_bar)
            .ok_or_else(|| invalid("subdivisions_per_bar", "must be one of 1, 2, 4, 8, 16"))
    }
}

fn invalid(field: &'static str, reason: &str) -> VibeError {
    VibeError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}
