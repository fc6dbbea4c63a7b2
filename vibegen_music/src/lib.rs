// VibeGen composition engine.
//
// A seeded, loop-based procedural music generator. A "vibe" turns a seed
// into an unbounded, reproducible stream of loops; each loop is a bar-by-bar
// list of timed note events for five fixed tracks (kick, snare, open hat,
// chord support, main voice). Harmony comes from a chord progression drawn
// once per vibe; the melody is drawn from the bar's chord tones, rotated by an
// inversion index that cycles with the loop counter.
//
// Architecture:
// - pitch.rs: MIDI note ⇄ frequency conversion and note names
// - theory.rs: Scale, chord, and progression tables (injected, JSON-loadable)
// - inversion.rs: Rotation operator modeling chord inversions
// - time.rs: bars:beats:sixteenths positions and symbolic note lengths
// - event.rs: The fixed track set and the `Event` value type
// - config.rs: `VibeConfig`: loop length, tempo, register, inversion cycle
// - vibe.rs: The composition engine itself
// - transport.rs: Loop-boundary driver and instrument-sink trait
// - error.rs: `VibeError`
//
// Randomness comes only from `vibegen_prng::VibeRng`, owned per vibe. Audio
// rendering and real-time clocks are the host's business.

pub mod config;
pub mod error;
pub mod event;
pub mod inversion;
pub mod pitch;
pub mod theory;
pub mod time;
pub mod transport;
pub mod vibe;

pub use config::{MelodySource, VibeConfig};
pub use error::VibeError;
pub use event::{Event, Track};
pub use theory::{ProgressionStep, TheoryTables};
pub use vibe::{Vibe, create_engine};
pub use vibegen_prng::Seed;
