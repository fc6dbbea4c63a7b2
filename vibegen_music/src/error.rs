// Error taxonomy for the composition engine.
//
// Every variant is a data-integrity defect in the tables or configuration a
// vibe was built from. None are transient: the engine does no I/O of its
// own, so the only I/O errors come from the explicit `load()` helpers in
// `theory.rs` and `config.rs`. Variants carry the offending table and key
// names so a host can report exactly what is broken.

use crate::event::Track;
use thiserror::Error;

/// Errors raised while building or advancing a vibe.
#[derive(Debug, Error)]
pub enum VibeError {
    #[error("cannot choose from empty {table}")]
    EmptyChoice { table: String },
    #[error("progression '{progression}' references undefined chord '{chord}'")]
    InvalidProgression { progression: String, chord: String },
    #[error("unknown scale '{scale}'")]
    UnknownScale { scale: String },
    #[error("invalid {table} entry '{key}': {reason}")]
    InvalidTable {
        table: &'static str,
        key: String,
        reason: String,
    },
    #[error("cannot rotate: {reason}")]
    InvalidRotation { reason: &'static str },
    #[error("invalid config field '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("{track:?} note {note} is outside the MIDI range 0-127")]
    NoteOutOfRange { track: Track, note: i32 },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VibeError {
    pub(crate) fn empty_choice(table: impl Into<String>) -> Self {
        VibeError::EmptyChoice {
            table: table.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_key() {
        let err = VibeError::InvalidProgression {
            progression: "blues".into(),
            chord: "maj13".into(),
        };
        assert_eq!(
            err.to_string(),
            "progression 'blues' references undefined chord 'maj13'"
        );

        let err = VibeError::empty_choice("progression table");
        assert_eq!(err.to_string(), "cannot choose from empty progression table");

        let err = VibeError::NoteOutOfRange {
            track: Track::MainVoice,
            note: 134,
        };
        assert_eq!(err.to_string(), "MainVoice note 134 is outside the MIDI range 0-127");
    }
}
