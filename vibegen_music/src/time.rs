// Musical time: bar/beat/sixteenth positions and symbolic note lengths.
//
// Events carry musical time, never seconds. A bar is four quarter-note
// beats and a beat is four sixteenths, so every position produced by the
// engine falls on the sixteenth grid. Conversion to seconds happens only at
// the transport boundary, given a tempo.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const BEATS_PER_BAR: u32 = 4;
pub const SIXTEENTHS_PER_BEAT: u32 = 4;
pub const SIXTEENTHS_PER_BAR: u32 = BEATS_PER_BAR * SIXTEENTHS_PER_BEAT;

/// A position relative to a loop's origin, in `bars:beats:sixteenths`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub bars: u32,
    pub beats: u32,
    pub sixteenths: u32,
}

impl Position {
    pub fn new(bars: u32, beats: u32, sixteenths: u32) -> Self {
        Position {
            bars,
            beats,
            sixteenths,
        }
    }

    /// Normalize a raw sixteenth count into bars, beats, and sixteenths.
    pub fn from_sixteenths(total: u32) -> Self {
        Position {
            bars: total / SIXTEENTHS_PER_BAR,
            beats: (total % SIXTEENTHS_PER_BAR) / SIXTEENTHS_PER_BEAT,
            sixteenths: total % SIXTEENTHS_PER_BEAT,
        }
    }

    pub fn to_sixteenths(self) -> u32 {
        self.bars * SIXTEENTHS_PER_BAR + self.beats * SIXTEENTHS_PER_BEAT + self.sixteenths
    }

    /// Seconds from the loop origin at `tempo_bpm` quarter notes per minute.
    pub fn to_seconds(self, tempo_bpm: f64) -> f64 {
        self.to_sixteenths() as f64 * sixteenth_seconds(tempo_bpm)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.bars, self.beats, self.sixteenths)
    }
}

/// Symbolic note durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteLength {
    Sixteenth,
    Eighth,
    Quarter,
    Half,
    Whole,
}

impl NoteLength {
    pub fn sixteenths(self) -> u32 {
        match self {
            NoteLength::Sixteenth => 1,
            NoteLength::Eighth => 2,
            NoteLength::Quarter => 4,
            NoteLength::Half => 8,
            NoteLength::Whole => 16,
        }
    }

    /// The note length that fills one slot when a bar is split into
    /// `subdivisions` equal parts, if there is one.
    pub fn for_subdivisions(subdivisions: u32) -> Option<NoteLength> {
        match subdivisions {
            1 => Some(NoteLength::Whole),
            2 => Some(NoteLength::Half),
            4 => Some(NoteLength::Quarter),
            8 => Some(NoteLength::Eighth),
            16 => Some(NoteLength::Sixteenth),
            _ => None,
        }
    }

    pub fn to_seconds(self, tempo_bpm: f64) -> f64 {
        self.sixteenths() as f64 * sixteenth_seconds(tempo_bpm)
    }

    /// Conventional `Nn` notation: "16n", "8n", "4n", "2n", "1n".
    pub fn notation(self) -> &'static str {
        match self {
            NoteLength::Sixteenth => "16n",
            NoteLength::Eighth => "8n",
            NoteLength::Quarter => "4n",
            NoteLength::Half => "2n",
            NoteLength::Whole => "1n",
        }
    }
}

/// Length of one sixteenth note in seconds.
fn sixteenth_seconds(tempo_bpm: f64) -> f64 {
    60.0 / tempo_bpm / SIXTEENTHS_PER_BEAT as f64
}

/// Length of `bars` bars in seconds.
pub fn bars_to_seconds(bars: u32, tempo_bpm: f64) -> f64 {
    Position::new(bars, 0, 0).to_seconds(tempo_bpm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_sixteenths() {
        assert_eq!(Position::from_sixteenths(0), Position::new(0, 0, 0));
        assert_eq!(Position::from_sixteenths(6), Position::new(0, 1, 2));
        assert_eq!(Position::from_sixteenths(37), Position::new(2, 1, 1));
        assert_eq!(Position::new(3, 2, 1).to_sixteenths(), 57);
    }

    #[test]
    fn seconds_at_120_bpm() {
        // A quarter note is half a second at 120 BPM.
        assert!((Position::new(0, 1, 0).to_seconds(120.0) - 0.5).abs() < 1e-12);
        assert!((bars_to_seconds(2, 120.0) - 4.0).abs() < 1e-12);
        assert!((NoteLength::Eighth.to_seconds(120.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn subdivision_lengths() {
        assert_eq!(NoteLength::for_subdivisions(8), Some(NoteLength::Eighth));
        assert_eq!(NoteLength::for_subdivisions(16), Some(NoteLength::Sixteenth));
        assert_eq!(NoteLength::for_subdivisions(3), None);
        for n in [1, 2, 4, 8, 16] {
            let len = NoteLength::for_subdivisions(n).unwrap();
            assert_eq!(len.sixteenths() * n, SIXTEENTHS_PER_BAR);
        }
    }

    #[test]
    fn display() {
        assert_eq!(Position::new(1, 2, 3).to_string(), "1:2:3");
        assert_eq!(NoteLength::Quarter.notation(), "4n");
    }
}
