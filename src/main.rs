//! CNC Twin - Predictive-Maintenance Digital Twin
//!
//! Headless driver for a simulated CNC production floor.
//!
//! # Usage
//!
//! ```bash
//! # Real-time run, 3 machines, one simulated hour per real second
//! cargo run --release -- run --machines 3 --multiplier 3600
//!
//! # 200 forced iterations, final snapshot as JSON
//! cargo run --release -- --seed 7 --json step --count 200
//!
//! # Interactive command console
//! cargo run --release -- console
//!
//! # Print the effective configuration
//! cargo run --release -- config
//! ```
//!
//! # Environment Variables
//!
//! - `CNC_TWIN_CONFIG`: Path to a TOML config file (default: ./twin_config.toml)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use cnc_twin::config::{SweepMode, TwinConfig};
use cnc_twin::console::{self, Command, Console};
use cnc_twin::{FloorEvent, ProductionFloor};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "cnc-twin")]
#[command(about = "CNC production floor predictive-maintenance digital twin")]
#[command(version)]
struct CliArgs {
    /// Load configuration from this TOML file (errors are fatal)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// RNG seed for bearing sampling and machine creation
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print the final floor snapshot as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Evaluate machines and bearings on the rayon pool
    #[arg(long, global = true)]
    parallel: bool,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Real-time loop driven by wall-clock deltas
    Run {
        /// Machines to place on the floor (all powered on)
        #[arg(short, long, default_value = "3")]
        machines: usize,

        /// Simulated seconds per real second
        #[arg(long, default_value = "3600")]
        multiplier: f64,

        /// Stop after this many iterations
        #[arg(long)]
        max_iterations: Option<u64>,
    },

    /// Run forced iterations without the clock
    Step {
        /// Machines to place on the floor (all powered on)
        #[arg(short, long, default_value = "3")]
        machines: usize,

        /// Number of iterations
        #[arg(short, long, default_value = "1")]
        count: u32,
    },

    /// Read commands from stdin, one per line
    Console,

    /// Print the effective configuration as TOML
    Config,
}

// ============================================================================
// Setup
// ============================================================================

fn load_config(args: &CliArgs) -> Result<TwinConfig> {
    let mut config = match &args.config {
        Some(path) => TwinConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TwinConfig::load(),
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }
    if args.parallel {
        config.simulation.sweep = SweepMode::Parallel;
    }
    Ok(config)
}

fn build_console(config: &TwinConfig, machines: usize) -> Result<Console> {
    let mut floor = ProductionFloor::from_config(config).context("Failed to start production floor")?;
    for _ in 0..machines {
        floor.add_new_machine(None);
    }
    Ok(Console::new(floor))
}

fn print_report(console: &Console, json: bool) -> Result<()> {
    if json {
        let snapshot = console.floor().snapshot();
        println!("{}", snapshot.to_json().context("Failed to serialize snapshot")?);
    } else {
        for line in console::status_lines(console.floor()) {
            println!("{line}");
        }
        if !console.alerts().is_empty() {
            println!();
            for alert in console.alerts().recent() {
                println!("{alert}");
            }
        }
    }
    Ok(())
}

// ============================================================================
// Modes
// ============================================================================

fn run_realtime(console: &mut Console, tick_interval_ms: u64, max_iterations: Option<u64>) -> Result<()> {
    let interval = Duration::from_millis(tick_interval_ms);
    let start = Instant::now();
    let mut last = start;

    loop {
        if console.floor().active_machine_count() == 0 {
            info!("No machines running, stopping");
            break;
        }
        if max_iterations.is_some_and(|max| console.floor().total_iterations() >= max) {
            info!(iterations = console.floor().total_iterations(), "Iteration limit reached");
            break;
        }

        std::thread::sleep(interval);
        let now = Instant::now();
        let delta = now.duration_since(last).as_secs_f64();
        last = now;

        for event in console.tick(delta)? {
            if let FloorEvent::IterationComplete { iteration } = event {
                if iteration % 10 == 0 {
                    let floor = console.floor();
                    info!(
                        iteration,
                        active = floor.active_machine_count(),
                        failed = floor.failed_machine_count(),
                        "Progress"
                    );
                }
            }
        }
    }

    info!(
        iterations = console.floor().total_iterations(),
        real_seconds = start.elapsed().as_secs_f64(),
        "Simulation complete"
    );
    Ok(())
}

fn run_console(console: &mut Console) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if !line.trim().is_empty() {
            match console.run_line(&line) {
                Ok(outcome) => {
                    for text in &outcome.lines {
                        writeln!(stdout, "{text}")?;
                    }
                    if outcome.quit {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Command failed");
                    writeln!(stdout, "error: {e}")?;
                }
            }
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    writeln!(stdout)?;
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    let command = args.command.as_ref().unwrap_or(&SubCommand::Console);
    if let SubCommand::Config = command {
        print!("{}", config.to_toml().context("Failed to serialize config")?);
        return Ok(());
    }

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  CNC Twin - Predictive-Maintenance Digital Twin");
    info!(
        "  Iteration: {:.1} min | {} rev | sweep: {:?}",
        config.simulation.seconds_per_iteration / 60.0,
        config.simulation.revolutions_per_iteration,
        config.simulation.sweep
    );
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match command {
        SubCommand::Run {
            machines,
            multiplier,
            max_iterations,
        } => {
            let mut console = build_console(&config, *machines)?;
            console.floor_mut().set_time_multiplier(*multiplier);
            console.floor_mut().turn_all_on();
            run_realtime(&mut console, config.simulation.tick_interval_ms, *max_iterations)?;
            print_report(&console, args.json)?;
        }
        SubCommand::Step { machines, count } => {
            let mut console = build_console(&config, *machines)?;
            console.floor_mut().turn_all_on();
            let outcome = console.execute(&Command::Step((*count).max(1)))?;
            if !args.json {
                for line in &outcome.lines {
                    println!("{line}");
                }
            }
            print_report(&console, args.json)?;
        }
        SubCommand::Console => {
            let mut console = build_console(&config, 0)?;
            run_console(&mut console)?;
            if args.json {
                print_report(&console, true)?;
            }
        }
        SubCommand::Config => {}
    }

    Ok(())
}
