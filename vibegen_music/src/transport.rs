// Transport and instrument-sink adapters.
//
// The engine knows nothing about wall-clock time. A transport owns the tempo
// and fires a loop boundary once per loop period; at each boundary every
// running vibe is advanced exactly once and its events are forwarded to an
// `InstrumentSink` with absolute times (`t0` + the event's musical offset).
//
// `LoopTransport` is an offline transport: `run()` steps boundaries back to
// back without sleeping, which is what the CLI and the tests need. A real-time
// host would call `fire_boundary()` from its own clock callback instead.
//
// Several vibes can be layered on one transport. Each keeps its own RNG
// stream and iteration counter; they share only the clock.

use crate::config::VibeConfig;
use crate::error::VibeError;
use crate::event::Event;
use crate::time::bars_to_seconds;
use crate::vibe::Vibe;
use log::debug;

/// Receives note triggers. Fire-and-forget: nothing flows back.
pub trait InstrumentSink {
    fn trigger(&mut self, event: &Event, time_seconds: f64);
}

impl<F: FnMut(&Event, f64)> InstrumentSink for F {
    fn trigger(&mut self, event: &Event, time_seconds: f64) {
        self(event, time_seconds)
    }
}

/// One recorded trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    pub event: Event,
    pub time_seconds: f64,
}

/// A sink that records every trigger, for tests and offline rendering.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub triggers: Vec<Trigger>,
}

impl InstrumentSink for CollectingSink {
    fn trigger(&mut self, event: &Event, time_seconds: f64) {
        self.triggers.push(Trigger {
            event: *event,
            time_seconds,
        });
    }
}

/// An offline loop clock driving one or more vibes.
#[derive(Debug)]
pub struct LoopTransport {
    tempo_bpm: f64,
    bars_per_loop: u32,
    layers: Vec<Vibe>,
    boundaries: u64,
}

impl LoopTransport {
    pub fn new(tempo_bpm: f64, bars_per_loop: u32) -> Result<Self, VibeError> {
        let config = VibeConfig {
            tempo_bpm,
            bars_per_loop,
            ..VibeConfig::default()
        };
        config.validate()?;
        Ok(LoopTransport {
            tempo_bpm,
            bars_per_loop,
            layers: Vec::new(),
            boundaries: 0,
        })
    }

    /// A transport matching a vibe config's tempo and loop length.
    pub fn from_config(config: &VibeConfig) -> Result<Self, VibeError> {
        Self::new(config.tempo_bpm, config.bars_per_loop)
    }

    /// Add a vibe as a new layer and return its index. The layer's loop
    /// length must match the transport's.
    pub fn add(&mut self, vibe: Vibe) -> Result<usize, VibeError> {
        if vibe.config().bars_per_loop != self.bars_per_loop {
            return Err(VibeError::InvalidConfig {
                field: "bars_per_loop",
                reason: format!(
                    "layer loops every {} bars but the transport loops every {}",
                    vibe.config().bars_per_loop,
                    self.bars_per_loop
                ),
            });
        }
        self.layers.push(vibe);
        Ok(self.layers.len() - 1)
    }

    pub fn layer(&self, index: usize) -> Option<&Vibe> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Vibe> {
        self.layers.get_mut(index)
    }

    /// Length of one loop in seconds.
    pub fn loop_seconds(&self) -> f64 {
        bars_to_seconds(self.bars_per_loop, self.tempo_bpm)
    }

    /// Boundaries fired so far.
    pub fn boundaries(&self) -> u64 {
        self.boundaries
    }

    /// Fire one loop boundary at `t0`: advance every running layer once and
    /// forward its events. Returns the number of triggers sent.
    pub fn fire_boundary(
        &mut self,
        t0: f64,
        sink: &mut impl InstrumentSink,
    ) -> Result<usize, VibeError> {
        let mut sent = 0;
        for vibe in self.layers.iter_mut().filter(|v| v.is_running()) {
            for event in vibe.advance()? {
                sink.trigger(&event, t0 + event.offset.to_seconds(self.tempo_bpm));
                sent += 1;
            }
        }
        debug!("boundary {} at {t0:.3}s: {sent} triggers", self.boundaries);
        self.boundaries += 1;
        Ok(sent)
    }

    /// Fire `loops` consecutive boundaries, continuing from where the
    /// previous call stopped.
    pub fn run(&mut self, loops: u64, sink: &mut impl InstrumentSink) -> Result<usize, VibeError> {
        let mut sent = 0;
        for _ in 0..loops {
            let t0 = self.boundaries as f64 * self.loop_seconds();
            sent += self.fire_boundary(t0, sink)?;
        }
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Track;
    use crate::theory::TheoryTables;
    use crate::vibe::create_engine;

    fn started(seed: &str) -> Vibe {
        let mut vibe = create_engine(seed).unwrap();
        vibe.start();
        vibe
    }

    #[test]
    fn loop_length_from_tempo() {
        let transport = LoopTransport::new(120.0, 4).unwrap();
        assert!((transport.loop_seconds() - 8.0).abs() < 1e-12);
        assert!(LoopTransport::new(0.0, 4).is_err());
        assert!(LoopTransport::new(120.0, 0).is_err());
    }

    #[test]
    fn triggers_are_absolute() {
        let mut transport = LoopTransport::new(120.0, 4).unwrap();
        transport.add(started("apple")).unwrap();
        let mut reference = create_engine("apple").unwrap();
        let mut sink = CollectingSink::default();
        transport.run(2, &mut sink).unwrap();

        let first = reference.advance().unwrap();
        let second = reference.advance().unwrap();
        assert_eq!(sink.triggers.len(), first.len() + second.len());
        for (t, e) in sink.triggers.iter().zip(first.iter()) {
            assert_eq!(t.event, *e);
            assert!((t.time_seconds - e.offset.to_seconds(120.0)).abs() < 1e-9);
        }
        for (t, e) in sink.triggers[first.len()..].iter().zip(second.iter()) {
            assert_eq!(t.event, *e);
            assert!((t.time_seconds - (8.0 + e.offset.to_seconds(120.0))).abs() < 1e-9);
        }
    }

    #[test]
    fn stopped_layers_emit_nothing() {
        let mut transport = LoopTransport::new(120.0, 4).unwrap();
        let idx = transport.add(started("apple")).unwrap();
        let mut sink = CollectingSink::default();

        transport.run(1, &mut sink).unwrap();
        let after_one = sink.triggers.len();
        assert!(after_one > 0);

        transport.layer_mut(idx).unwrap().stop();
        assert_eq!(transport.run(3, &mut sink).unwrap(), 0);
        assert_eq!(sink.triggers.len(), after_one);
        assert_eq!(transport.layer(idx).unwrap().iteration(), 1);
        assert_eq!(transport.boundaries(), 4);
    }

    #[test]
    fn layers_keep_independent_streams() {
        let mut transport = LoopTransport::new(120.0, 4).unwrap();
        transport.add(started("apple")).unwrap();
        transport.add(started("apple")).unwrap();
        let mut sink = CollectingSink::default();
        transport.run(1, &mut sink).unwrap();

        // Both layers produce the same loop: neither stole draws from the other.
        let half = sink.triggers.len() / 2;
        let (a, b) = sink.triggers.split_at(half);
        assert_eq!(a, b);
    }

    #[test]
    fn mismatched_layer_rejected() {
        let mut transport = LoopTransport::new(120.0, 2).unwrap();
        let vibe = create_engine("apple").unwrap();
        assert!(matches!(
            transport.add(vibe),
            Err(VibeError::InvalidConfig { field: "bars_per_loop", .. })
        ));

        let config = VibeConfig {
            bars_per_loop: 2,
            ..VibeConfig::default()
        };
        let vibe = Vibe::new("apple", config, TheoryTables::default_tables()).unwrap();
        assert_eq!(transport.add(vibe).unwrap(), 0);
    }

    #[test]
    fn closures_are_sinks() {
        let mut transport = LoopTransport::new(90.0, 4).unwrap();
        transport.add(started("closure")).unwrap();
        let mut kicks = 0;
        let mut count_kicks = |e: &Event, _t: f64| {
            if e.track == Track::Kick {
                kicks += 1;
            }
        };
        transport.run(1, &mut count_kicks).unwrap();
        assert_eq!(kicks, 16);
    }
}
