//! Headless hex skirmish runner.
//!
//! Plays AI-vs-AI matches without graphics. Match results go to stdout
//! as JSON; logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Play one match
//! cargo run -p hex_headless -- run --scenario skirmish --seed 42
//!
//! # Run a batch of matches in parallel
//! cargo run -p hex_headless -- batch --scenario duel --count 1000 --output results/
//!
//! # Verify determinism
//! cargo run -p hex_headless -- verify --scenario skirmish --seed 12345 --runs 5
//!
//! # Show the board after setup or after a few turns
//! cargo run -p hex_headless -- show --seed 3 --turns 10
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hex_headless::{
    ascii_visualizer::{render_session, AsciiConfig},
    batch::{run_batch, verify_determinism, BatchConfig, BatchResults},
    runner::MatchRunner,
    scenario::Scenario,
};

#[derive(Parser)]
#[command(name = "hex_headless")]
#[command(about = "Headless hex skirmish runner for AI testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single match and print its result as JSON
    Run {
        /// Built-in scenario name or path to a RON file
        #[arg(short, long, default_value = "skirmish")]
        scenario: String,

        /// Map seed (defaults to the scenario's seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Print the board to stderr after every turn
        #[arg(long)]
        watch: bool,
    },

    /// Run a batch of matches for balance testing
    Batch {
        /// Built-in scenario name or path to a RON file
        #[arg(short, long, default_value = "skirmish")]
        scenario: String,

        /// Number of matches to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting seed
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Verify determinism by running the same seed multiple times
    Verify {
        /// Built-in scenario name or path to a RON file
        #[arg(short, long, default_value = "skirmish")]
        scenario: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Print the board as ASCII
    Show {
        /// Built-in scenario name or path to a RON file
        #[arg(short, long, default_value = "skirmish")]
        scenario: String,

        /// Map seed (defaults to the scenario's seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Player turns to play before printing
        #[arg(short, long, default_value = "0")]
        turns: u32,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr (stdout is for results)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let outcome = match cli.command {
        Commands::Run {
            scenario,
            seed,
            watch,
        } => cmd_run(&scenario, seed, watch),
        Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
        } => cmd_batch(&scenario, count, parallel, output, seed),
        Commands::Verify {
            scenario,
            seed,
            runs,
        } => cmd_verify(&scenario, seed, runs),
        Commands::Show {
            scenario,
            seed,
            turns,
            no_color,
        } => cmd_show(&scenario, seed, turns, no_color),
    };

    match outcome {
        Ok(code) => code,
        Err(message) => {
            tracing::error!("{message}");
            eprintln!("FATAL: {message}");
            ExitCode::FAILURE
        }
    }
}

fn load_scenario(name: &str) -> Result<Scenario, String> {
    Scenario::resolve(name).map_err(|e| e.to_string())
}

/// Play one match
fn cmd_run(scenario: &str, seed: Option<u64>, watch: bool) -> Result<ExitCode, String> {
    let scenario = load_scenario(scenario)?;
    let seed = seed.unwrap_or(scenario.map.seed);
    tracing::info!(scenario = %scenario.name, seed, "starting match");

    let config = AsciiConfig::default();
    let runner = MatchRunner::new(scenario, seed);
    let result = runner.run_with(|session| {
        if watch {
            eprintln!("{}", render_session(session, &config));
        }
    });

    let json = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

/// Run a batch of matches
fn cmd_batch(
    scenario: &str,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
) -> Result<ExitCode, String> {
    let scenario = load_scenario(scenario)?;
    tracing::info!(
        scenario = %scenario.name,
        count,
        parallel,
        seed,
        output = %output.display(),
        "Batch configuration"
    );

    std::fs::create_dir_all(&output)
        .map_err(|e| format!("Cannot create output directory '{}': {e}", output.display()))?;

    let config = BatchConfig::new(scenario, count)
        .with_seed(seed)
        .with_parallelism(parallel);
    let results = run_batch(config);

    let path = BatchResults::default_path(&output);
    results
        .save(&path)
        .map_err(|e| format!("Failed to save results to '{}': {e}", path.display()))?;

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Games played: {}", summary.total_games);
    for (player, wins) in &summary.wins {
        eprintln!(
            "  {player} wins: {wins} ({:.1}%)",
            summary.win_rate(player) * 100.0
        );
    }
    eprintln!("  Draws: {}", summary.draws);
    eprintln!(
        "Turns: avg {:.1}, min {}, max {}",
        summary.avg_turns, summary.min_turns, summary.max_turns
    );
    eprintln!("Results saved to: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

/// Verify determinism
fn cmd_verify(scenario: &str, seed: u64, runs: u32) -> Result<ExitCode, String> {
    let scenario = load_scenario(scenario)?;
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario.name,
        seed,
        runs
    );

    if verify_determinism(&scenario, seed, runs) {
        eprintln!("PASS: All {runs} runs produced identical results");
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        Ok(ExitCode::FAILURE)
    }
}

/// Print the board after `turns` player turns
fn cmd_show(scenario: &str, seed: Option<u64>, turns: u32, no_color: bool) -> Result<ExitCode, String> {
    let scenario = load_scenario(scenario)?;
    let seed = seed.unwrap_or(scenario.map.seed);
    let mut runner = MatchRunner::new(scenario, seed);
    for _ in 0..turns {
        if !runner.step() {
            break;
        }
    }
    let config = AsciiConfig {
        use_color: !no_color,
        ..AsciiConfig::default()
    };
    print!("{}", render_session(runner.session(), &config));
    Ok(ExitCode::SUCCESS)
}
