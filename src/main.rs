use clap::Parser;
use log::{debug, error, info};
use std::fs;
use std::num::NonZeroU16;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use midivis::configlang::{line_col, Schema};
use midivis::input::{DeviceConfig, DeviceInput, FileInput, MidiInput};
use midivis::player::{PlaybackSignal, Player};
use midivis::runtime::{PlaybackMode, Reader};
use midivis::Error;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Standard MIDI File to play
    #[arg(required_unless_present_any = ["device", "list_properties"])]
    midi: Option<PathBuf>,

    /// Config script to load before playback starts
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Raw MIDI device to follow instead of a file
    #[arg(short, long, conflicts_with = "midi")]
    device: Option<PathBuf>,

    /// Updates per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// Live events kept before the oldest are dropped
    #[arg(long, default_value_t = 4096)]
    max_live_events: usize,

    /// Capacity of the device event queue
    #[arg(long, default_value_t = 1024)]
    queue_capacity: usize,

    /// Ticks per quarter note assumed for live input
    #[arg(long, default_value = "30")]
    device_tpq: NonZeroU16,

    /// `play` or `realtime`; defaults to `realtime` for devices
    #[arg(long, value_parser = parse_mode)]
    mode: Option<PlaybackMode>,

    /// Print the config properties and exit
    #[arg(long)]
    list_properties: bool,

    /// More logging; repeat for trace output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_mode(name: &str) -> Result<PlaybackMode, String> {
    PlaybackMode::from_name(name).ok_or_else(|| format!("unknown mode {:?}", name))
}

fn load_config(reader: &mut Reader, path: &Path, schema: &Schema) -> Result<(), Error> {
    let source = fs::read_to_string(path)?;
    if let Err(err) = reader.load(&source, schema) {
        let (line, col) = line_col(&source, err.offset());
        error!("{}:{}:{}: {}", path.display(), line, col, err);
        return Err(err.into());
    }
    info!("Loaded {}", path.display());
    Ok(())
}

fn open_input(cli: &Cli) -> Result<MidiInput, Error> {
    match (&cli.device, &cli.midi) {
        (Some(device), _) => {
            let config = DeviceConfig {
                max_events: cli.max_live_events,
                queue_capacity: cli.queue_capacity,
                ticks_per_quarter: cli.device_tpq,
            };
            Ok(DeviceInput::open(device, config).into())
        }
        (None, Some(path)) => Ok(FileInput::open(path)?.into()),
        (None, None) => Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "no MIDI file or device given",
        ))),
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let schema = Schema::standard();
    if cli.list_properties {
        print!("{}", schema.usage());
        return Ok(());
    }

    let mut reader = Reader::new();
    if let Some(path) = &cli.config {
        load_config(&mut reader, path, &schema)?;
    }
    info!("{}", reader.scene().title());

    let input = open_input(&cli)?;
    let mode = cli.mode.unwrap_or(match input {
        MidiInput::File(_) => PlaybackMode::Play,
        MidiInput::Device(_) => PlaybackMode::Realtime,
    });
    let mut player = Player::new(input, reader);

    let frame = Duration::from_secs(1) / cli.fps;
    let mut last = Instant::now();
    loop {
        thread::sleep(frame);
        let now = Instant::now();
        let elapsed = now.duration_since(last);
        last = now;

        for signal in player.update(elapsed, mode)? {
            match signal {
                PlaybackSignal::NoteOn {
                    channel,
                    key,
                    velocity,
                    color,
                    tick,
                } => debug!(
                    "{} on  ch {} key {} vel {} {}",
                    tick,
                    channel.as_u8(),
                    key.as_u8(),
                    velocity.as_u8(),
                    color
                ),
                PlaybackSignal::NoteOff { channel, key, tick } => {
                    debug!("{} off ch {} key {}", tick, channel.as_u8(), key.as_u8())
                }
                PlaybackSignal::Finished => return Ok(()),
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
