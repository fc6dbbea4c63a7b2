// VibeGen CLI entry point.
//
// Builds one vibe, drives it through an offline `LoopTransport`, and prints
// every trigger to stdout: a readable table by default, or one JSON object
// per line with `--json`. Nothing is written to disk.
//
// Usage:
//   vibegen [--seed SEED] [--loops N] [--bars N] [--tempo BPM] [--base NOTE]
//     [--scale NAME] [--melody chord|scale] [--config FILE] [--tables FILE]
//     [--json]
//
// A seed made only of digits is used as an integer seed; anything else is a
// text seed. Set RUST_LOG=debug to see per-loop engine logging on stderr.

use serde::Serialize;
use std::path::Path;
use vibegen_music::transport::LoopTransport;
use vibegen_music::{Event, MelodySource, Seed, TheoryTables, Vibe, VibeConfig, VibeError};

/// JSON shape of one printed trigger.
#[derive(Serialize)]
struct TriggerLine<'a> {
    time_seconds: f64,
    duration_seconds: f64,
    frequency_hz: Option<f64>,
    #[serde(flatten)]
    event: &'a Event,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), VibeError> {
    let seed = parse_seed(parse_flag(args, "--seed").unwrap_or_else(|| "apple".to_string()));
    let loops: u64 = parse_flag(args, "--loops").unwrap_or(1);
    let json = args.iter().any(|a| a == "--json");

    let mut config = match parse_flag::<String>(args, "--config") {
        Some(path) => VibeConfig::load(Path::new(&path))?,
        None => VibeConfig::default(),
    };
    if let Some(bars) = parse_flag(args, "--bars") {
        config.bars_per_loop = bars;
    }
    if let Some(tempo) = parse_flag(args, "--tempo") {
        config.tempo_bpm = tempo;
    }
    if let Some(base) = parse_flag(args, "--base") {
        config.base_midi_note = base;
    }
    if let Some(scale) = parse_flag(args, "--scale") {
        config.scale = scale;
    }
    if let Some(melody) = parse_flag::<String>(args, "--melody") {
        config.melody_source = parse_melody_source(&melody)?;
    }

    let tables = match parse_flag::<String>(args, "--tables") {
        Some(path) => TheoryTables::load(Path::new(&path))?,
        None => TheoryTables::default_tables(),
    };

    let mut transport = LoopTransport::from_config(&config)?;
    let mut vibe = Vibe::new(seed, config, tables)?;

    if !json {
        println!("=== VibeGen ===");
        println!("Seed: {}", vibe.seed());
        println!("Progression: {}", vibe.progression_name());
        println!(
            "Tempo: {} BPM, {} bars per loop, {} loop(s)",
            vibe.config().tempo_bpm,
            vibe.config().bars_per_loop,
            loops
        );
        println!();
    }

    let tempo_bpm = vibe.config().tempo_bpm;
    vibe.start();
    transport.add(vibe)?;

    let sent = if json {
        transport.run(loops, &mut |event: &Event, t: f64| print_json(event, t, tempo_bpm))?
    } else {
        transport.run(loops, &mut print_text)?
    };

    if !json {
        println!();
        println!("{sent} triggers over {:.1}s", loops as f64 * transport.loop_seconds());
    }
    Ok(())
}

fn print_text(event: &Event, time_seconds: f64) {
    println!("{time_seconds:>8.3}s  {event}");
}

fn print_json(event: &Event, time_seconds: f64, tempo_bpm: f64) {
    let line = TriggerLine {
        time_seconds,
        duration_seconds: event.duration.to_seconds(tempo_bpm),
        frequency_hz: event.frequency_hz(),
        event,
    };
    match serde_json::to_string(&line) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to encode trigger: {e}"),
    }
}

fn parse_seed(raw: String) -> Seed {
    match raw.parse::<u64>() {
        Ok(n) => Seed::Number(n),
        Err(_) => Seed::Text(raw),
    }
}

fn parse_melody_source(name: &str) -> Result<MelodySource, VibeError> {
    match name.to_lowercase().as_str() {
        "chord" => Ok(MelodySource::Chord),
        "scale" => Ok(MelodySource::Scale),
        _ => Err(VibeError::InvalidConfig {
            field: "melody_source",
            reason: format!("unknown melody source '{name}' (expected chord or scale)"),
        }),
    }
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
