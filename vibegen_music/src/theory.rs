// Music theory tables: named scales, chords, and chord progressions.
//
// The tables are plain data, injected into each vibe at construction rather
// than read from globals, so tests can substitute fixtures and hosts can load
// their own vocabulary from JSON. All three maps are `BTreeMap`s: iteration
// order is by name, which keeps any RNG draw over table keys (the vibe picks
// its progression this way) reproducible.
//
// Adding a scale, chord, or progression is a data change only; `vibe.rs`
// never names a specific table entry.

use crate::error::VibeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Largest distance, in semitones, of a progression root from the base note.
pub const MAX_ROOT_OFFSET: i32 = 24;

/// Highest offset a chord tone may sit above its root.
pub const MAX_CHORD_SPAN: i32 = 24;

/// One bar slot of a progression: a chord built on `root` semitones above
/// the vibe's base note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionStep {
    pub root: i32,
    pub chord: String,
}

impl ProgressionStep {
    pub fn new(root: i32, chord: &str) -> Self {
        ProgressionStep {
            root,
            chord: chord.to_string(),
        }
    }
}

/// The complete theory vocabulary available to a vibe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheoryTables {
    /// Scale name → ascending semitone offsets within one octave.
    pub scales: BTreeMap<String, Vec<i32>>,
    /// Chord name → semitone offsets from the chord root.
    pub chords: BTreeMap<String, Vec<i32>>,
    /// Progression name → one step per bar, cycled when the loop is longer.
    pub progressions: BTreeMap<String, Vec<ProgressionStep>>,
}

impl Default for TheoryTables {
    fn default() -> Self {
        Self::default_tables()
    }
}

impl TheoryTables {
    /// The built-in vocabulary.
    pub fn default_tables() -> Self {
        let scales = [
            ("major", vec![0, 2, 4, 5, 7, 9, 11]),
            ("minor", vec![0, 2, 3, 5, 7, 8, 10]),
            ("dorian", vec![0, 2, 3, 5, 7, 9, 10]),
            ("phrygian", vec![0, 1, 3, 5, 7, 8, 10]),
            ("lydian", vec![0, 2, 4, 6, 7, 9, 11]),
            ("mixolydian", vec![0, 2, 4, 5, 7, 9, 10]),
        ];

        let chords = [
            ("major", vec![0, 4, 7]),
            ("minor", vec![0, 3, 7]),
            ("maj7", vec![0, 4, 7, 11]),
            ("min7", vec![0, 3, 7, 10]),
            ("dom7", vec![0, 4, 7, 10]),
            ("aug", vec![0, 4, 8]),
            ("dim", vec![0, 3, 6]),
            ("dim7", vec![0, 3, 6, 9]),
            ("half_dim7", vec![0, 3, 6, 10]),
        ];

        use ProgressionStep as S;
        let progressions = [
            // I-V-vi-IV
            (
                "axis",
                vec![
                    S::new(0, "major"),
                    S::new(7, "major"),
                    S::new(9, "minor"),
                    S::new(5, "major"),
                ],
            ),
            // I-vi-IV-V
            (
                "doo_wop",
                vec![
                    S::new(0, "major"),
                    S::new(9, "minor"),
                    S::new(5, "major"),
                    S::new(7, "major"),
                ],
            ),
            // ii7-V7-Imaj7-vi7
            (
                "jazz_turnaround",
                vec![
                    S::new(2, "min7"),
                    S::new(7, "dom7"),
                    S::new(0, "maj7"),
                    S::new(9, "min7"),
                ],
            ),
            // i-bVII-bVI-V
            (
                "andalusian",
                vec![
                    S::new(0, "minor"),
                    S::new(-2, "major"),
                    S::new(-4, "major"),
                    S::new(-5, "major"),
                ],
            ),
            // I-vi (relative minor a third below)
            ("relative_minor", vec![S::new(0, "major"), S::new(-3, "minor")]),
            // i7-iiø7-V7-i7
            (
                "minor_cadence",
                vec![
                    S::new(0, "min7"),
                    S::new(2, "half_dim7"),
                    S::new(7, "dom7"),
                    S::new(0, "min7"),
                ],
            ),
        ];

        TheoryTables {
            scales: scales
                .into_iter()
                .map(|(name, iv)| (name.to_string(), iv))
                .collect(),
            chords: chords
                .into_iter()
                .map(|(name, iv)| (name.to_string(), iv))
                .collect(),
            progressions: progressions
                .into_iter()
                .map(|(name, steps)| (name.to_string(), steps))
                .collect(),
        }
    }

    /// Parse tables from a JSON string and validate them.
    pub fn from_json(json: &str) -> Result<Self, VibeError> {
        let tables: TheoryTables = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Load tables from a JSON file.
    pub fn load(path: &Path) -> Result<Self, VibeError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Check every table invariant.
    ///
    /// - scales: non-empty, start at 0, strictly increasing, below 12
    /// - chords: three or four tones, start at 0, span at most `MAX_CHORD_SPAN`
    /// - progressions: non-empty, every chord name defined, roots within
    ///   `MAX_ROOT_OFFSET` of the base note
    /// - at least one progression exists
    pub fn validate(&self) -> Result<(), VibeError> {
        for (name, intervals) in &self.scales {
            check_starts_at_zero("scale", name, intervals)?;
            if intervals.windows(2).any(|w| w[0] >= w[1]) {
                return Err(invalid("scale", name, "offsets must be strictly increasing"));
            }
            if intervals.iter().any(|&iv| iv >= 12) {
                return Err(invalid("scale", name, "offsets must lie within one octave"));
            }
        }

        for (name, intervals) in &self.chords {
            check_starts_at_zero("chord", name, intervals)?;
            if !(3..=4).contains(&intervals.len()) {
                return Err(invalid("chord", name, "must have three or four tones"));
            }
            if intervals.iter().any(|iv| !(0..=MAX_CHORD_SPAN).contains(iv)) {
                return Err(invalid("chord", name, "offsets must lie within two octaves"));
            }
        }

        if self.progressions.is_empty() {
            return Err(VibeError::empty_choice("progression table"));
        }
        for (name, steps) in &self.progressions {
            if steps.is_empty() {
                return Err(invalid("progression", name, "must have at least one step"));
            }
            for step in steps {
                if step.root.abs() > MAX_ROOT_OFFSET {
                    return Err(invalid(
                        "progression",
                        name,
                        "root offsets must lie within two octaves of the base note",
                    ));
                }
                if !self.chords.contains_key(&step.chord) {
                    return Err(VibeError::InvalidProgression {
                        progression: name.clone(),
                        chord: step.chord.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Intervals of a named scale.
    pub fn scale(&self, name: &str) -> Result<&[i32], VibeError> {
        self.scales
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| VibeError::UnknownScale {
                scale: name.to_string(),
            })
    }

    /// Intervals of a named chord, if defined.
    pub fn chord(&self, name: &str) -> Option<&[i32]> {
        self.chords.get(name).map(Vec::as_slice)
    }

    /// Steps of a named progression, if defined.
    pub fn progression(&self, name: &str) -> Option<&[ProgressionStep]> {
        self.progressions.get(name).map(Vec::as_slice)
    }

    /// Progression names in table (alphabetical) order.
    pub fn progression_names(&self) -> Vec<&str> {
        self.progressions.keys().map(String::as_str).collect()
    }
}

fn invalid(table: &'static str, key: &str, reason: &str) -> VibeError {
    VibeError::InvalidTable {
        table,
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn check_starts_at_zero(
    table: &'static str,
    key: &str,
    intervals: &[i32],
) -> Result<(), VibeError> {
    match intervals.first() {
        None => Err(invalid(table, key, "must have at least one offset")),
        Some(&first) if first != 0 => Err(invalid(table, key, "first offset must be 0")),
        Some(_) => Ok(()),
    }
}
