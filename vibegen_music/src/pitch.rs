// Pitch utilities: MIDI note numbers to frequencies, and note names.
//
// Equal temperament around A4 = MIDI 69 = 440 Hz. Note numbers are `f64`
// so microtonal (fractional) notes convert too. Middle C is MIDI 60 ("C4").

/// MIDI note of A4, the tuning reference.
pub const A4_MIDI: f64 = 69.0;

/// Frequency of A4 in Hz.
pub const A4_HZ: f64 = 440.0;

/// Convert a (possibly fractional) MIDI note number to a frequency in Hz.
pub fn midi_to_frequency_hz(note: f64) -> f64 {
    A4_HZ * 2f64.powf((note - A4_MIDI) / 12.0)
}

/// Compact note name for an integer MIDI note, e.g. 60 → "C4", 66 → "F#4".
pub fn note_name(note: i32) -> String {
    const NAMES: [&str; 12] = [
        "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
    ];
    let pc = note.rem_euclid(12) as usize;
    let octave = note.div_euclid(12) - 1;
    format!("{}{}", NAMES[pc], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert!((midi_to_frequency_hz(69.0) - 440.0).abs() < 1e-9);
    }

    #[test]
    fn octave_doubles() {
        assert!((midi_to_frequency_hz(81.0) - 880.0).abs() < 1e-9);
        assert!((midi_to_frequency_hz(57.0) - 220.0).abs() < 1e-9);
    }

    #[test]
    fn middle_c() {
        assert!((midi_to_frequency_hz(60.0) - 261.625_565_300_598_6).abs() < 1e-9);
    }

    #[test]
    fn quarter_tone() {
        // Halfway (in cents) between A4 and Bb4.
        let hz = midi_to_frequency_hz(69.5);
        assert!(hz > 440.0 && hz < midi_to_frequency_hz(70.0));
    }

    #[test]
    fn names() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(24), "C1");
        assert_eq!(note_name(66), "F#4");
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(0), "C-1");
        assert_eq!(note_name(-1), "B-2");
    }
}
