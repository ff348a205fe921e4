use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use clairkeys_audio::{SimulatedClock, SimulatedRenderer, Transport, TransportClock, WallClockRenderer};
use clairkeys_domain::{build_key_layout, midi_to_note, note_to_midi, AnimationData, Song};
use clairkeys_player::{PlaybackController, PlayerConfig, PlayerEvent};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and simulate ClairKeys piano playback", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play an animation-data file and print note events as they fire
    Play {
        /// Path to the animation JSON produced by the sheet-music converter
        input: PathBuf,
        /// Playback speed multiplier
        #[arg(short, long, default_value_t = 1.0)]
        tempo: f64,
        /// Simulated animation frames per second
        #[arg(long, default_value_t = 60.0)]
        fps: f64,
        #[arg(long)]
        mute: bool,
        /// Player configuration file (YAML, or JSON by extension)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Pace frames against the system clock instead of simulating
        #[arg(long)]
        realtime: bool,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Print the 88-key layout for a white-key width
    Layout {
        #[arg(short, long, default_value_t = 20.0)]
        key_width: f32,
    },
    /// Convert a note name to MIDI or a MIDI number to a note name
    Note { value: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Command::Play {
            input,
            tempo,
            fps,
            mute,
            config,
            realtime,
            json,
        } => {
            if !(fps.is_finite() && fps > 0.0) {
                bail!("fps must be positive");
            }
            let config = match config {
                Some(path) => PlayerConfig::load(&path)
                    .with_context(|| format!("load config {:?}", path))?,
                None => PlayerConfig::default(),
            };
            let bytes = std::fs::read(&input).with_context(|| format!("read {:?}", input))?;
            let data = AnimationData::from_json(&bytes)?;
            let song = Song::from_animation_data(&data);
            info!(title = %song.metadata.title, notes = song.notes().len(), "playing");

            let frame = 1.0 / fps;
            if realtime {
                let transport = TransportClock::new(WallClockRenderer::new());
                let player = PlaybackController::new(transport, config);
                let started = Instant::now();
                run(player, &song, tempo, mute, json, frame, |dt| {
                    std::thread::sleep(Duration::from_secs_f64(dt));
                    started.elapsed().as_secs_f64()
                })
            } else {
                let clock = SimulatedClock::new();
                let transport = TransportClock::new(SimulatedRenderer::new(clock.clone()));
                let player = PlaybackController::new(transport, config);
                run(player, &song, tempo, mute, json, frame, |dt| {
                    clock.advance(dt);
                    clock.now()
                })
            }
        }
        Command::Layout { key_width } => {
            let layout = build_key_layout(key_width)?;
            for key in layout.by_midi.values() {
                println!(
                    "{:>3} {:<4} x={:>8.2} w={:>6.2} {}",
                    key.midi,
                    midi_to_note(key.midi),
                    key.x,
                    key.width,
                    if key.is_black { "black" } else { "white" }
                );
            }
            println!("total width {:.2}", layout.total_width);
            Ok(())
        }
        Command::Note { value } => {
            match value.parse::<u8>() {
                Ok(midi) => println!("{}", midi_to_note(midi)),
                Err(_) => println!("{}", note_to_midi(&value)),
            }
            Ok(())
        }
    }
}

fn run<T, F>(
    mut player: PlaybackController<T>,
    song: &Song,
    tempo: f64,
    mute: bool,
    json: bool,
    frame: f64,
    mut advance: F,
) -> Result<()>
where
    T: Transport,
    F: FnMut(f64) -> f64,
{
    player.load_song(song);
    player.on_any(move |event| print_event(event, json));
    player.set_tempo_scale(tempo)?;
    player.set_mute(mute)?;
    player.play()?;

    // `advance` waits out one frame and returns the host's wall time
    while let Some(token) = player.pending_frame() {
        let wall = advance(frame);
        player.on_animation_frame(token, wall);
    }
    info!(
        drift_corrections = player.drift_corrections(),
        "playback finished"
    );
    Ok(())
}

fn print_event(event: &PlayerEvent, json: bool) {
    if json {
        if !matches!(event, PlayerEvent::TimeUpdate { .. }) {
            if let Ok(line) = serde_json::to_string(event) {
                println!("{line}");
            }
        }
        return;
    }
    match event {
        PlayerEvent::NoteStart { note, .. } => println!(
            "{:>8.3}s  on  {:<4} hand={} finger={}",
            note.start,
            midi_to_note(note.midi),
            note.hand.map_or("-", |h| h.as_str()),
            note.finger.map_or(0, |f| f.get())
        ),
        PlayerEvent::NoteEnd { note, .. } => {
            println!("{:>8.3}s  off {:<4}", note.end(), midi_to_note(note.midi))
        }
        PlayerEvent::PlayStateChange { is_playing } => {
            println!("{}", if *is_playing { "playing" } else { "stopped" })
        }
        PlayerEvent::SpeedChange { tempo_scale } => println!("speed x{tempo_scale}"),
        _ => {}
    }
}
