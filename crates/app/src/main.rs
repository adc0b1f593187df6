mod keyboard;
mod scenes;

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use column_vj_core::audio::list_input_devices;
use column_vj_core::surface::transport::{list_input_ports, list_output_ports};
use column_vj_core::{
    AppConfig, CompositionScheduler, ControlSurfaceDriver, FrameBuffer, FrameInputs,
    MidirTransport, NullTransport, SignalNormalizer, SurfaceTransport, TempoTracker,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const OVERLAY_INTERVAL: Duration = Duration::from_secs(1);

fn main() -> column_vj_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Live(args) => run_live(args),
        Commands::Ports => list_ports(),
    }
}

fn run_live(args: LiveArgs) -> column_vj_core::Result<()> {
    let config = load_config(&args)?;
    info!(
        width = args.width,
        height = args.height,
        fps = args.fps,
        "starting live mode"
    );

    let transport: Box<dyn SurfaceTransport> = match MidirTransport::connect(
        config.surface.port_name.as_deref(),
        config.surface.queue_capacity,
    ) {
        Ok(transport) => {
            info!(port = transport.port(), "control surface opened");
            Box::new(transport)
        }
        Err(err) => {
            warn!(error = %err, "no control surface; keyboard fallback active");
            Box::new(NullTransport)
        }
    };

    let driver = ControlSurfaceDriver::new(&config.surface, transport);
    let library = scenes::default_library();
    let mut scheduler = CompositionScheduler::new(
        driver,
        &library,
        &config.compositor,
        args.width,
        args.height,
    );

    let mut tempo = TempoTracker::new(&config.tempo);
    tempo.start();

    let mut audio = SignalNormalizer::new(config.audio.clone());
    if args.debug_audio {
        audio.set_debug_mode(true);
    } else if let Err(err) = audio.start() {
        warn!(error = %err, "microphone unavailable; using debug audio");
        audio.set_debug_mode(true);
    }

    let keys = keyboard::spawn_reader();
    let mut canvas = FrameBuffer::new(args.width, args.height);
    let frame_duration = Duration::from_secs_f64(1.0 / args.fps);

    let mut last_frame = Instant::now();
    let mut last_overlay = last_frame;
    let mut frame_rate = args.fps as f32;
    let mut frame: u64 = 0;

    while args.frames.map_or(true, |limit| frame < limit) {
        let frame_start = Instant::now();
        let delta = frame_start.duration_since(last_frame).as_secs_f32();
        last_frame = frame_start;
        if delta > 0.0 {
            frame_rate = frame_rate * 0.9 + (1.0 / delta) * 0.1;
        }

        while let Ok(command) = keys.try_recv() {
            command.apply(&mut scheduler, &mut tempo, &mut audio);
        }

        tempo.update();
        audio.update();
        scheduler.update(
            delta,
            FrameInputs {
                audio_level: audio.level(),
                audio_debug: audio.is_debug_mode(),
                spectrum: audio.spectrum(),
                beat: tempo.snapshot(),
            },
        );
        scheduler.composite(&mut canvas);

        if frame_start.duration_since(last_overlay) >= OVERLAY_INTERVAL {
            last_overlay = frame_start;
            if let Some(lines) = scheduler.debug_overlay(frame_rate) {
                eprintln!("{}", lines.join("\n"));
            }
        }

        frame += 1;
        if let Some(remaining) = frame_duration.checked_sub(frame_start.elapsed()) {
            thread::sleep(remaining);
        }
    }

    info!(frames = frame, "live mode finished");
    if let Some(path) = &args.snapshot {
        canvas.write_ppm(path)?;
        info!(?path, "wrote snapshot");
    }
    Ok(())
}

fn load_config(args: &LiveArgs) -> column_vj_core::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::live_defaults(),
    };

    if let Some(port) = &args.midi_port {
        config.surface.port_name = Some(port.clone());
    }
    if let Some(device) = &args.audio_device {
        config.audio.device = Some(device.clone());
    }
    if let Some(bpm) = args.bpm {
        config.tempo.initial_bpm = bpm;
    }
    config.validate()?;

    if !(args.fps.is_finite() && args.fps > 0.0) {
        return Err(column_vj_core::ColumnVjError::InvalidConfig(format!(
            "frame rate must be positive, got {}",
            args.fps
        )));
    }
    Ok(config)
}

fn list_ports() -> column_vj_core::Result<()> {
    let sections: [(&str, column_vj_core::Result<Vec<String>>); 3] = [
        ("MIDI inputs", list_input_ports()),
        ("MIDI outputs", list_output_ports()),
        ("Audio inputs", list_input_devices()),
    ];
    for (title, ports) in sections {
        println!("{title}:");
        match ports {
            Ok(ports) if ports.is_empty() => println!("  (none)"),
            Ok(ports) => ports.iter().for_each(|port| println!("  {port}")),
            Err(err) => warn!(error = %err, "failed to list {title}"),
        }
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Column-based live visual mixer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the performance loop.
    Live(LiveArgs),
    /// List MIDI ports and audio input devices.
    Ports,
}

#[derive(Args, Debug)]
struct LiveArgs {
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 640)]
    width: usize,
    #[arg(long, default_value_t = 360)]
    height: usize,
    #[arg(long, default_value_t = 60.0)]
    fps: f64,
    /// Stop after this many frames.
    #[arg(long)]
    frames: Option<u64>,
    /// Substring of the MIDI port to open.
    #[arg(long)]
    midi_port: Option<String>,
    #[arg(long)]
    audio_device: Option<String>,
    /// Use the synthetic audio source instead of the microphone.
    #[arg(long)]
    debug_audio: bool,
    #[arg(long)]
    bpm: Option<f64>,
    /// Write the final canvas as a PPM image.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}
