// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing_subscriber::EnvFilter;

use midi_scales::config::{ConfigEvent, ConfigWatcher, Settings};
use midi_scales::feedback::mapper::DISPLAY_KEYS;
use midi_scales::feedback::KeyHighlight;
use midi_scales::{
    ChordKind, Controls, KeyboardState, MidiBuffer, MidiEvent, MidiTransformEngine, NoteName,
    Scale, ScaleKind,
};

/// Velocity used for `--play` note-ons that do not give one
const DEFAULT_VELOCITY: u8 = 100;

fn print_usage() {
    println!("midi-scales - Scale-aware MIDI chord generator");
    println!();
    println!("Usage: midi-scales [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --list-scales                         List scale kinds");
    println!("  --list-chords                         List chord kinds");
    println!("  --labels <ROOT> <SCALE>               Show degree labels on the display keys");
    println!("  --play <ROOT> <SCALE> <CHORD> <EV>... Run note events through the engine");
    println!("  --config <FILE> <EV>...               Same, with selections from a settings file");
    println!("  --watch <FILE>                        Print settings reloads as the file changes");
    println!("  --help                                Show this help message");
    println!();
    println!("Events are +NOTE[:VEL]@POS for note-on and -NOTE@POS for note-off,");
    println!("e.g. +60@0 -60@128. ROOT \"none\" disables scale filtering.");
    println!("Set RUST_LOG (e.g. RUST_LOG=midi_scales=trace) for engine logging.");
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_root(arg: &str) -> Result<Option<NoteName>> {
    if arg.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let root = arg.parse().with_context(|| format!("Invalid root note: {}", arg))?;
    Ok(Some(root))
}

/// Parse `+60@0`, `+60:90@0` or `-60@128`
fn parse_event(arg: &str) -> Result<MidiEvent> {
    let invalid = || anyhow!("Invalid event {:?}, expected +NOTE[:VEL]@POS or -NOTE@POS", arg);

    let (body, position) = arg.split_once('@').ok_or_else(invalid)?;
    let position: u32 = position.parse().map_err(|_| invalid())?;

    let (on, body) = if let Some(rest) = body.strip_prefix('+') {
        (true, rest)
    } else if let Some(rest) = body.strip_prefix('-') {
        (false, rest)
    } else {
        return Err(invalid());
    };

    let (note, velocity) = match body.split_once(':') {
        Some((note, velocity)) => (note, velocity.parse::<u8>().map_err(|_| invalid())?),
        None => (body, DEFAULT_VELOCITY),
    };
    let note: u8 = note.parse().map_err(|_| invalid())?;
    if note > 127 || velocity > 127 {
        bail!("Note and velocity must be 0-127: {}", arg);
    }

    Ok(if on {
        MidiEvent::note_on(position, 0, note, velocity)
    } else {
        MidiEvent::note_off(position, 0, note)
    })
}

fn list_scales() {
    for kind in ScaleKind::ALL {
        println!("{:<16} {:?}", kind.name(), kind.intervals());
    }
}

fn list_chords() {
    for kind in ChordKind::ALL {
        println!("{:<16} {:?}", kind.name(), kind.intervals());
    }
}

fn print_labels(root: Option<NoteName>, kind: ScaleKind) {
    let scale = Scale::new(root, kind);
    println!("{}", scale);
    for key in 0..DISPLAY_KEYS {
        match scale.degree_label(key) {
            Some(label) => println!("  key {:>2}  {}", key, label),
            None if scale.allows(key) => println!("  key {:>2}  .", key),
            None => println!("  key {:>2}  -", key),
        }
    }
}

fn run_events(controls: Arc<Controls>, mut engine: MidiTransformEngine, args: &[String]) -> Result<()> {
    let events = args
        .iter()
        .map(|arg| parse_event(arg))
        .collect::<Result<Vec<_>>>()?;

    let keyboard = Arc::new(KeyboardState::new());
    engine = engine.with_keyboard(Arc::clone(&keyboard));

    let mut midi = MidiBuffer::from_events(events);
    let feedback = engine.process(&mut midi).clone();

    println!("Performance:");
    for event in &midi {
        println!("  @{:<6} {:?}", event.sample_offset, event.message);
    }
    println!("Display:");
    for event in &feedback {
        println!(
            "  @{:<6} {:?} key {} {}",
            event.sample_offset,
            event.kind,
            event.key,
            if event.on { "on" } else { "off" }
        );
    }

    let lit: Vec<String> = (0..DISPLAY_KEYS)
        .filter_map(|key| {
            let highlight = keyboard.highlight(key, controls.scale());
            let label = keyboard.label(key, controls.scale()).unwrap_or_default();
            (highlight != KeyHighlight::None)
                .then(|| format!("{}{}={:?}", key, label_suffix(&label), highlight))
        })
        .collect();
    println!("Keyboard: {}", if lit.is_empty() { "-".to_string() } else { lit.join(" ") });

    if midi.has_overflowed() || feedback.has_overflowed() {
        println!("(buffer overflow: some events were dropped)");
    }
    Ok(())
}

fn label_suffix(label: &str) -> String {
    if label.is_empty() {
        String::new()
    } else {
        format!("({})", label)
    }
}

fn play(args: &[String]) -> Result<()> {
    if args.len() < 3 {
        bail!("--play requires <ROOT> <SCALE> <CHORD> followed by events");
    }
    let root = parse_root(&args[0])?;
    let scale: ScaleKind = args[1].parse().with_context(|| format!("Invalid scale: {}", args[1]))?;
    let chord: ChordKind = args[2].parse().with_context(|| format!("Invalid chord: {}", args[2]))?;

    let controls = Arc::new(Controls::new());
    controls.set_scale(root, scale);
    controls.set_chord(chord);

    let engine = MidiTransformEngine::new(Arc::clone(&controls));
    run_events(controls, engine, &args[3..])
}

fn play_with_config(path: &Path, args: &[String]) -> Result<()> {
    let settings = Settings::load(path)?;
    let controls = Arc::new(Controls::new());
    settings.apply(&controls);

    let engine = settings.build_engine(Arc::clone(&controls));
    run_events(controls, engine, args)
}

fn watch(path: &Path) -> Result<()> {
    let controls = Controls::new();
    Settings::load(path)?.apply(&controls);

    let watcher = ConfigWatcher::new(path, None)?;
    println!("Watching {:?} (press Ctrl+C to stop)...", watcher.watched_path());

    while let Some(event) = watcher.recv() {
        match event {
            ConfigEvent::Reloaded(settings) => {
                settings.apply(&controls);
                println!("Reloaded: {}", settings.to_toml()?.replace('\n', " "));
            }
            ConfigEvent::Error(message) => eprintln!("{}", message),
            ConfigEvent::FileCreated(path) => println!("Created {:?}", path),
            ConfigEvent::FileDeleted(path) => println!("Deleted {:?}", path),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("midi-scales - Scale-aware MIDI chord generator");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "--list-scales" => list_scales(),
        "--list-chords" => list_chords(),
        "--labels" => {
            if args.len() < 4 {
                eprintln!("Error: --labels requires a root note and a scale");
                std::process::exit(1);
            }
            let root = parse_root(&args[2])?;
            let kind: ScaleKind = args[3]
                .parse()
                .with_context(|| format!("Invalid scale: {}", args[3]))?;
            print_labels(root, kind);
        }
        "--play" => play(&args[2..])?,
        "--config" => {
            if args.len() < 3 {
                eprintln!("Error: --config requires a settings file");
                std::process::exit(1);
            }
            play_with_config(Path::new(&args[2]), &args[3..])?;
        }
        "--watch" => {
            if args.len() < 3 {
                eprintln!("Error: --watch requires a settings file");
                std::process::exit(1);
            }
            watch(Path::new(&args[2]))?;
        }
        "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
