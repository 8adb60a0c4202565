//! haptic - dry-run haptic requests against a recording backend
//!
//! Every request goes through the same validation and dispatch as the
//! native bindings; the backend calls it would produce are printed
//! instead of reaching a vibrator.

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use colored::*;
use haptic_core::{
    BackendCall, CallLog, Composition, Direction, HapticConfig, HapticEngine, Pattern, Primitive, Pulse,
    RangePolicy, RecordingBackend, Waveform,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "haptic")]
#[command(author = "SIL Contributors")]
#[command(version = "2026.1.16")]
#[command(about = "Validate and dry-run haptic requests", long_about = None)]
struct Cli {
    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
struct EngineArgs {
    /// haptic.toml to load (defaults to HAPTIC_CONFIG / HAPTIC_* variables)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of actuators the simulated device exposes
    #[arg(short, long, global = true, default_value_t = 1)]
    actuators: usize,

    /// Primitive ids the simulated device supports (default: all)
    #[arg(long, global = true, value_delimiter = ',', value_name = "IDS")]
    primitives: Option<Vec<i32>>,

    /// Reject out-of-range values instead of clamping them
    #[arg(long, global = true)]
    reject: bool,

    /// Print backend calls as JSON lines
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single pulse
    OneShot {
        /// Duration in seconds
        #[arg(value_name = "SECONDS")]
        duration: f64,

        /// Intensity in [0, 1]
        #[arg(short, long, default_value_t = 1.0)]
        intensity: f32,

        /// Sharpness in [0, 1]
        #[arg(short, long, default_value_t = 0.5)]
        sharpness: f32,
    },

    /// Play a pattern from a JSON file (array of pulses)
    Pattern {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Spread over actuators towards this direction (x component)
        #[arg(long, allow_hyphen_values = true, requires = "dy")]
        dx: Option<f64>,

        /// Direction y component
        #[arg(long, allow_hyphen_values = true, requires = "dx")]
        dy: Option<f64>,
    },

    /// Pass a file's bytes through as an opaque pattern payload
    Data {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Play a single pulse weighted towards a direction
    Directional {
        #[arg(value_name = "SECONDS")]
        duration: f64,

        #[arg(allow_hyphen_values = true)]
        dx: f64,

        #[arg(allow_hyphen_values = true)]
        dy: f64,

        #[arg(short, long, default_value_t = 1.0)]
        intensity: f32,

        #[arg(short, long, default_value_t = 0.5)]
        sharpness: f32,
    },

    /// Play predefined primitives in sequence
    Compose {
        /// Primitive ids (1 = click ... 8 = low tick)
        #[arg(value_name = "ID", required = true)]
        ids: Vec<i32>,

        /// Scale applied to every primitive
        #[arg(long, default_value_t = 1.0)]
        scale: f32,

        /// Delay before each primitive after the first, in milliseconds
        #[arg(long, default_value_t = 0)]
        delay: i32,
    },

    /// Print the timings/amplitudes form of a JSON pattern
    Waveform {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the resolved configuration as TOML
    Config,

    /// Show information about the haptic engine
    Info,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("HAPTIC_LOG").unwrap_or_else(|_| "haptic=info,haptic_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli.engine, cli.command) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &EngineArgs, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::OneShot {
            duration,
            intensity,
            sharpness,
        } => play(args, "one-shot", |engine| {
            engine.vibrate_one_shot(duration, intensity, sharpness)
        }),

        Commands::Pattern { file, dx, dy } => {
            let pattern = read_pattern(&file)?;
            match (dx, dy) {
                (Some(x), Some(y)) => play(args, "directional pattern", |engine| {
                    engine.vibrate_directional_pattern(&pattern, Direction::new(x, y))
                }),
                _ => play(args, "pattern", |engine| engine.vibrate_pattern(&pattern)),
            }
        }

        Commands::Data { file } => {
            let bytes = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            play(args, "data", |engine| engine.vibrate_pattern_from_data(&bytes))
        }

        Commands::Directional {
            duration,
            dx,
            dy,
            intensity,
            sharpness,
        } => {
            let pulse = Pulse::new(duration, intensity, sharpness);
            play(args, "directional", |engine| {
                engine.vibrate_directional_one_shot(&pulse, Direction::new(dx, dy))
            })
        }

        Commands::Compose { ids, scale, delay } => {
            let scales = vec![scale; ids.len()];
            let delays: Vec<i32> = (0..ids.len()).map(|i| if i == 0 { 0 } else { delay }).collect();
            let composition = Composition::from_parallel(&ids, &scales, &delays)?;
            play(args, "composition", |engine| engine.vibrate_composition(&composition))
        }

        Commands::Waveform { file } => waveform_command(&file),

        Commands::Config => {
            print!("{}", load_config(args)?.to_toml()?);
            Ok(())
        }

        Commands::Info => {
            info_command();
            Ok(())
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE SESSION
// ═══════════════════════════════════════════════════════════════════════════════

fn load_config(args: &EngineArgs) -> anyhow::Result<HapticConfig> {
    let mut config = match &args.config {
        Some(path) => HapticConfig::from_file(path)?,
        None => HapticConfig::from_env()?,
    };
    if args.reject {
        config.range_policy = RangePolicy::Reject;
    }
    Ok(config)
}

fn recording_backend(args: &EngineArgs) -> anyhow::Result<RecordingBackend> {
    let primitives = match &args.primitives {
        Some(ids) => ids
            .iter()
            .map(|id| Primitive::from_id(*id))
            .collect::<Result<Vec<_>, _>>()?,
        None => Primitive::ALL.to_vec(),
    };
    if args.actuators == 0 {
        bail!("--actuators must be at least 1");
    }
    Ok(RecordingBackend::new()
        .with_actuators(args.actuators)
        .with_primitives(&primitives))
}

/// Runs one request on a fresh engine and returns what reached the backend
fn dry_run<F>(args: &EngineArgs, request: F) -> anyhow::Result<(Vec<BackendCall>, haptic_core::EngineStats)>
where
    F: FnOnce(&HapticEngine) -> haptic_core::HapticResult<()>,
{
    let backend = recording_backend(args)?;
    let log: CallLog = backend.log();
    let engine = HapticEngine::with_config(Box::new(backend), load_config(args)?)?;

    engine.initialize()?;
    log.clear();
    request(&engine)?;
    let calls = log.playback_calls();
    let stats = engine.stats()?;
    engine.dispose()?;

    Ok((calls, stats))
}

fn play<F>(args: &EngineArgs, label: &str, request: F) -> anyhow::Result<()>
where
    F: FnOnce(&HapticEngine) -> haptic_core::HapticResult<()>,
{
    let (calls, stats) = dry_run(args, request).with_context(|| format!("{} request failed", label))?;
    info!(request = label, calls = calls.len(), skipped = stats.skipped, "dry run finished");

    if args.json {
        for call in &calls {
            println!("{}", serde_json::to_string(call)?);
        }
        return Ok(());
    }

    println!("{} {}", "     Playing".green().bold(), label.cyan());
    if calls.is_empty() {
        println!("{} nothing to play", "     Skipped".yellow().bold());
    }
    for call in &calls {
        print_call(call);
    }
    println!(
        "{} {} request(s), {} skipped",
        "    Finished".green().bold(),
        stats.requests,
        stats.skipped
    );
    Ok(())
}

fn print_call(call: &BackendCall) {
    match call {
        BackendCall::Pulse { pulse } => println!("  pulse      {}", describe_pulse(pulse)),
        BackendCall::Pattern { pattern } => {
            println!(
                "  pattern    {} pulse(s), {:?}",
                pattern.len(),
                pattern.total_duration()
            );
            for pulse in pattern {
                println!("             {}", describe_pulse(pulse));
            }
        }
        BackendCall::Data { bytes } => println!("  data       {} byte(s)", bytes.len()),
        BackendCall::Parallel { tracks } => {
            println!("  parallel   {} track(s)", tracks.len());
            for (actuator, pattern) in tracks {
                let peak = pattern.iter().map(|p| p.intensity).fold(0.0f32, f32::max);
                println!("             actuator {} peak {:.3}", actuator, peak);
            }
        }
        BackendCall::Composition { composition } => {
            println!("  compose    {} step(s)", composition.len());
            for step in composition.steps() {
                println!(
                    "             {:?} scale {:.2} after {} ms",
                    step.primitive, step.scale, step.delay_ms
                );
            }
        }
        other => println!("  {:?}", other),
    }
}

fn describe_pulse(pulse: &Pulse) -> String {
    format!(
        "{:.3}s intensity {:.3} sharpness {:.3}",
        pulse.duration_secs, pulse.intensity, pulse.sharpness
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// OTHER COMMANDS
// ═══════════════════════════════════════════════════════════════════════════════

fn read_pattern(path: &Path) -> anyhow::Result<Pattern> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Pattern::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

fn waveform_command(path: &Path) -> anyhow::Result<()> {
    let waveform = Waveform::from_pattern(&read_pattern(path)?);
    println!("{}", serde_json::to_string_pretty(&waveform)?);
    println!(
        "{} {} segment(s), {} ms",
        "       Total".green().bold(),
        waveform.len(),
        waveform.total_ms()
    );
    Ok(())
}

fn info_command() {
    let defaults = HapticConfig::default();

    println!("{}", "haptic - native haptic feedback bindings".bold());
    println!("Version: 2026.1.16");
    println!();
    println!("{}", "Engine operations:".bold());
    println!("  initialize / dispose / cancel");
    println!("  vibrate_one_shot, vibrate_pattern, vibrate_pattern_from_data");
    println!("  vibrate_directional_one_shot, vibrate_directional_pattern");
    println!("  vibrate_composition");
    println!();
    println!("{}", "Primitives:".bold());
    for primitive in Primitive::ALL {
        println!("  {} {:?}", primitive.id(), primitive);
    }
    println!();
    println!("{}", "Defaults:".bold());
    println!("  range_policy        {:?}", defaults.range_policy);
    println!("  max_pulse_secs      {}", defaults.max_pulse_secs);
    println!("  max_pattern_pulses  {}", defaults.max_pattern_pulses);
    println!("  max_data_len        {}", defaults.max_data_len);
    println!("  cancel_before_play  {}", defaults.cancel_before_play);
}
