// Tracks and the timed events the engine emits for them.
//
// The track set is fixed at compile time. `Snare` and `OpenHat` are noise
// instruments and carry no pitch; every other track does. An `Event` is a
// plain value: once produced it is handed to the instrument sink and never
// touched by the engine again.

use crate::pitch::{midi_to_frequency_hz, note_name};
use crate::time::{NoteLength, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The instrument tracks every vibe writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Track {
    Kick = 0,
    Snare = 1,
    OpenHat = 2,
    ChordSupport = 3,
    MainVoice = 4,
}

/// One note trigger, positioned relative to its loop's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub track: Track,
    /// MIDI note number, or `None` for unpitched tracks.
    pub note: Option<i32>,
    pub duration: NoteLength,
    pub offset: Position,
}

impl Event {
    pub fn pitched(track: Track, note: i32, duration: NoteLength, offset: Position) -> Self {
        Event {
            track,
            note: Some(note),
            duration,
            offset,
        }
    }

    pub fn unpitched(track: Track, duration: NoteLength, offset: Position) -> Self {
        Event {
            track,
            note: None,
            duration,
            offset,
        }
    }

    /// Frequency to play, derived from the MIDI note.
    pub fn frequency_hz(&self) -> Option<f64> {
        self.note.map(|n| midi_to_frequency_hz(n as f64))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pitch = match self.note {
            Some(n) => note_name(n),
            None => "-".to_string(),
        };
        write!(
            f,
            "{:>7} {:>12} {:>4} {:>3}",
            self.offset.to_string(),
            format!("{:?}", self.track),
            pitch,
            self.duration.notation()
        )
    }
}
