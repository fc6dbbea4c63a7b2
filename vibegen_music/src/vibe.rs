// The composition engine: one "vibe" generates one loop of events per call.
//
// A vibe is bound to a seed. At construction it seeds its own `VibeRng` and
// draws one progression name from the theory tables; that choice is fixed
// for the vibe's lifetime. Each `advance()` then walks the loop bar by bar:
//
// 1. Look up the bar's progression step (cycled by bar index) and its chord.
// 2. Lay down the fixed drum pattern: kick on every beat, snare on beats
//    1 and 3, open hat on every off-eighth. None of this touches the RNG.
// 3. Hold the chord's lowest tone two octaves below the root for the bar.
// 4. Rotate the melody pitch set (chord tones or scale) by the inversion
//    index for the current iteration, and draw one pitch per subdivision.
//    A pitch equal to the previous emitted one is dropped, and the tracker
//    resets so the next draw is always emitted.
//
// Construction also walks the chosen progression under every inversion index
// in the cycle and rejects the vibe if any reachable pitch falls outside the
// MIDI range, so `advance()` only fails on an internal inconsistency.
//
// The iteration counter increments once per loop and selects the next
// inversion index, so the melody's register drifts over successive loops.
//
// The RNG is consumed only by the progression draw (once) and by one draw
// per main-voice subdivision, in bar order. Any change to that order, or to
// the default tables, changes every downstream event and invalidates the
// golden file in `tests/golden/`.
//
// See `transport.rs` for how vibes are driven at loop boundaries.

use crate::config::{MelodySource, VibeConfig};
use crate::error::VibeError;
use crate::event::{Event, Track};
use crate::inversion::{octave_shift_for, rotate};
use crate::theory::{ProgressionStep, TheoryTables};
use crate::time::{BEATS_PER_BAR, NoteLength, Position, SIXTEENTHS_PER_BAR};
use log::{debug, info};
use vibegen_prng::{Seed, VibeRng};

/// MIDI note for the kick drum (C1).
pub const KICK_NOTE: i32 = 24;

/// How far below the chord root the chord-support voice sits.
const CHORD_SUPPORT_DROP: i32 = 24;

/// A seeded composition engine.
#[derive(Debug, Clone)]
pub struct Vibe {
    seed: Seed,
    rng: VibeRng,
    iteration: u64,
    progression: String,
    config: VibeConfig,
    tables: TheoryTables,
    running: bool,
}

/// Build a vibe with the default configuration and theory tables.
pub fn create_engine(seed: impl Into<Seed>) -> Result<Vibe, VibeError> {
    Vibe::new(seed, VibeConfig::default(), TheoryTables::default_tables())
}

impl Vibe {
    /// Validate `config` and `tables`, seed the stream, and pick a progression.
    pub fn new(
        seed: impl Into<Seed>,
        config: VibeConfig,
        tables: TheoryTables,
    ) -> Result<Self, VibeError> {
        let seed = seed.into();
        config.validate()?;
        tables.validate()?;
        tables.scale(&config.scale)?;

        let mut rng = VibeRng::from_seed(&seed);
        let progression = pick_progression(&tables, &mut rng)?;
        check_register(&config, &tables, &progression)?;
        info!(
            "vibe {seed}: progression '{progression}', {} bars per loop",
            config.bars_per_loop
        );

        Ok(Vibe {
            seed,
            rng,
            iteration: 0,
            progression,
            config,
            tables,
            running: false,
        })
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    /// Loops generated so far.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn progression_name(&self) -> &str {
        &self.progression
    }

    pub fn config(&self) -> &VibeConfig {
        &self.config
    }

    /// Inversion index the next `advance()` will use.
    pub fn current_inversion(&self) -> i32 {
        let cycle = &self.config.inversion_cycle;
        cycle[(self.iteration % cycle.len() as u64) as usize]
    }

    /// Register with the transport. Idempotent; generation state is untouched.
    pub fn start(&mut self) {
        if !self.running {
            debug!("vibe {}: started at iteration {}", self.seed, self.iteration);
        }
        self.running = true;
    }

    /// Unregister from the transport. Idempotent; the iteration counter and
    /// stream position are kept.
    pub fn stop(&mut self) {
        if self.running {
            debug!("vibe {}: stopped at iteration {}", self.seed, self.iteration);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Rewind to the state of a freshly constructed vibe with the same seed.
    pub fn restart(&mut self) -> Result<(), VibeError> {
        let mut rng = VibeRng::from_seed(&self.seed);
        self.progression = pick_progression(&self.tables, &mut rng)?;
        self.rng = rng;
        self.iteration = 0;
        debug!("vibe {}: restarted", self.seed);
        Ok(())
    }

    /// Generate one loop of events, ordered by bar and then by track
    /// (drums, chord support, main voice).
    pub fn advance(&mut self) -> Result<Vec<Event>, VibeError> {
        let inversion = self.current_inversion();
        let shift = octave_shift_for(inversion);
        let slot = self.config.subdivision_length()?;
        let steps = self.steps()?.to_vec();
        let scale = self.tables.scale(&self.config.scale)?.to_vec();

        let mut events = Vec::new();
        for bar in 0..self.config.bars_per_loop {
            let step = &steps[bar as usize % steps.len()];
            let chord = chord_tones(&self.tables, &self.progression, step)?.to_vec();
            let root = self.config.base_midi_note + step.root;

            push_drums(bar, &mut events);

            events.push(Event::pitched(
                Track::ChordSupport,
                chord_support_note(root, &chord, &step.chord)?,
                NoteLength::Whole,
                Position::new(bar, 0, 0),
            ));

            let source = match self.config.melody_source {
                MelodySource::Chord => &chord,
                MelodySource::Scale => &scale,
            };
            let pitch_set = rotate(source, inversion, shift)?;
            let drawn = self.draw_melody(root, &pitch_set)?;

            for (i, note) in suppress_repeats(&drawn).into_iter().enumerate() {
                if let Some(note) = note {
                    let sixteenths = bar * SIXTEENTHS_PER_BAR + i as u32 * slot.sixteenths();
                    events.push(Event::pitched(
                        Track::MainVoice,
                        note,
                        slot,
                        Position::from_sixteenths(sixteenths),
                    ));
                }
            }
        }

        debug!(
            "vibe {}: loop {} (inversion {inversion}) produced {} events",
            self.seed,
            self.iteration,
            events.len()
        );
        self.iteration += 1;
        Ok(events)
    }

    fn steps(&self) -> Result<&[ProgressionStep], VibeError> {
        self.tables
            .progression(&self.progression)
            .ok_or_else(|| VibeError::InvalidTable {
                table: "progression",
                key: self.progression.clone(),
                reason: "not defined".to_string(),
            })
    }

    /// One RNG draw per subdivision.
    fn draw_melody(&mut self, root: i32, pitch_set: &[i32]) -> Result<Vec<i32>, VibeError> {
        (0..self.config.subdivisions_per_bar)
            .map(|_| {
                self.rng
                    .choose(pitch_set)
                    .map(|&interval| root + interval)
                    .map_err(|_| VibeError::empty_choice("melody pitch set"))
            })
            .collect()
    }
}

fn pick_progression(tables: &TheoryTables, rng: &mut VibeRng) -> Result<String, VibeError> {
    let names = tables.progression_names();
    rng.choose(&names)
        .map(|name| name.to_string())
        .map_err(|_| VibeError::empty_choice("progression table"))
}

fn chord_tones<'t>(
    tables: &'t TheoryTables,
    progression: &str,
    step: &ProgressionStep,
) -> Result<&'t [i32], VibeError> {
    tables
        .chord(&step.chord)
        .ok_or_else(|| VibeError::InvalidProgression {
            progression: progression.to_string(),
            chord: step.chord.clone(),
        })
}

fn chord_support_note(root: i32, chord: &[i32], chord_name: &str) -> Result<i32, VibeError> {
    let lowest = chord.iter().copied().min().ok_or_else(|| VibeError::InvalidTable {
        table: "chord",
        key: chord_name.to_string(),
        reason: "must have at least one offset".to_string(),
    })?;
    Ok(root + lowest - CHORD_SUPPORT_DROP)
}

/// Reject a vibe that could emit a pitch outside 0..=127.
///
/// Covers the chord-support note of every step and the rotated melody pitch
/// set of every step under every inversion index in the cycle.
fn check_register(
    config: &VibeConfig,
    tables: &TheoryTables,
    progression: &str,
) -> Result<(), VibeError> {
    let steps = tables
        .progression(progression)
        .ok_or_else(|| VibeError::InvalidTable {
            table: "progression",
            key: progression.to_string(),
            reason: "not defined".to_string(),
        })?;
    let scale = tables.scale(&config.scale)?;

    for step in steps {
        let chord = chord_tones(tables, progression, step)?;
        let root = config.base_midi_note + step.root;
        check_midi(Track::ChordSupport, chord_support_note(root, chord, &step.chord)?)?;

        let source = match config.melody_source {
            MelodySource::Chord => chord,
            MelodySource::Scale => scale,
        };
        for &inversion in &config.inversion_cycle {
            for interval in rotate(source, inversion, octave_shift_for(inversion))? {
                check_midi(Track::MainVoice, root + interval)?;
            }
        }
    }
    Ok(())
}

fn check_midi(track: Track, note: i32) -> Result<(), VibeError> {
    if (0..=127).contains(&note) {
        Ok(())
    } else {
        Err(VibeError::NoteOutOfRange { track, note })
    }
}

/// Fixed 4/4 drum pattern for one bar.
fn push_drums(bar: u32, events: &mut Vec<Event>) {
    for beat in 0..BEATS_PER_BAR {
        events.push(Event::pitched(
            Track::Kick,
            KICK_NOTE,
            NoteLength::Eighth,
            Position::new(bar, beat, 0),
        ));
    }
    for beat in (1..BEATS_PER_BAR).step_by(2) {
        events.push(Event::unpitched(
            Track::Snare,
            NoteLength::Eighth,
            Position::new(bar, beat, 0),
        ));
    }
    for beat in 0..BEATS_PER_BAR {
        events.push(Event::unpitched(
            Track::OpenHat,
            NoteLength::Sixteenth,
            Position::new(bar, beat, 2),
        ));
    }
}

/// Drop a pitch equal to the previous emitted one.
///
/// After a drop the tracker resets to "no pitch", so the next slot is
/// always emitted: two consecutive slots are never both dropped.
pub fn suppress_repeats(drawn: &[i32]) -> Vec<Option<i32>> {
    let mut prev: Option<i32> = None;
    drawn
        .iter()
        .map(|&pitch| {
            if prev == Some(pitch) {
                prev = None;
                None
            } else {
                prev = Some(pitch);
                Some(pitch)
            }
        })
        .collect()
}
