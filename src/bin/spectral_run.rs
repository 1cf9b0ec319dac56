//! Headless simulation runner.
//!
//! Drives the engine with a fixed 60 Hz manual clock and prints one line per
//! step: a human-readable summary, or a JSON `HistoryRecord` with `--json`.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use spectral_attention::telemetry::init_tracing;
use spectral_attention::{
    EngineConfig, FrameClock, ManualClock, SimulationEngine, SimulationMode, SimulationParams,
};

const FRAME: Duration = Duration::from_nanos(16_666_667);

/// Runner configuration
struct Args {
    mode: SimulationMode,
    steps: u64,
    seed: Option<u64>,
    config: Option<PathBuf>,
    json: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            mode: SimulationMode::Stable,
            steps: 300,
            seed: None,
            config: None,
            json: false,
        }
    }
}

fn value_of(args: &[String], i: usize, flag: &str) -> String {
    args.get(i + 1).cloned().unwrap_or_else(|| {
        eprintln!("error: {flag} requires a value");
        std::process::exit(1);
    })
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--mode" | "-m" => {
                let raw = value_of(&args, i, "--mode");
                parsed.mode = raw.parse().unwrap_or_else(|e| {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                });
                i += 2;
            }
            "--steps" | "-n" => {
                let raw = value_of(&args, i, "--steps");
                parsed.steps = raw.parse().unwrap_or_else(|_| {
                    eprintln!("error: invalid step count: {raw}");
                    std::process::exit(1);
                });
                i += 2;
            }
            "--seed" | "-s" => {
                let raw = value_of(&args, i, "--seed");
                parsed.seed = Some(raw.parse().unwrap_or_else(|_| {
                    eprintln!("error: invalid seed: {raw}");
                    std::process::exit(1);
                }));
                i += 2;
            }
            "--config" | "-c" => {
                parsed.config = Some(PathBuf::from(value_of(&args, i, "--config")));
                i += 2;
            }
            "--json" => {
                parsed.json = true;
                i += 1;
            }
            "--help" | "-h" => {
                println!("spectral-run - headless spectral attention simulation");
                println!();
                println!("USAGE:");
                println!("    spectral-run [OPTIONS]");
                println!();
                println!("OPTIONS:");
                println!("    -m, --mode <MODE>       stable | dissonance | aha | altered [default: stable]");
                println!("    -n, --steps <N>         Number of frames to run [default: 300]");
                println!("    -s, --seed <SEED>       Seed the random source");
                println!("    -c, --config <FILE>     Engine configuration (TOML)");
                println!("        --json              Print each history record as JSON");
                println!("    -h, --help              Print help information");
                std::process::exit(0);
            }
            arg => {
                eprintln!("error: unknown argument: {arg}");
                std::process::exit(1);
            }
        }
    }

    parsed
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("spectral_attention=info");
    let args = parse_args();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let params = SimulationParams::default().with_mode(args.mode);
    let mut engine = SimulationEngine::with_params(config, params)?;
    let clock = ManualClock::new();
    engine.start();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for _ in 0..args.steps {
        clock.advance(FRAME);
        let Some(record) = engine.tick(clock.now()) else {
            break;
        };
        if args.json {
            serde_json::to_writer(&mut out, &record)?;
            writeln!(out)?;
        } else {
            writeln!(
                out,
                "{:>5}  intensity={:.4}  entropy={:.4}  focus={:.4}  eigenvalues={:?}",
                record.sequence,
                record.intensity,
                record.entropy,
                record.focus,
                record.eigenvalues.as_slice()
            )?;
        }
    }

    engine.stop();
    Ok(())
}
