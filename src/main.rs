#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vector_race::config::RaceConfig;
use vector_race::engine::{Phase, RaceResult, RaceSettings, DEFAULT_MAX_ROUNDS};
use vector_race::render::render;

/// Turn-based vector racing on a text grid.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Race configuration file (.json).
    config: PathBuf,

    /// Seed for the random strategy.
    #[arg(long)]
    seed: Option<u64>,

    /// Call the race off after this many rounds.
    #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
    max_rounds: usize,

    /// Where the JSON race log goes.
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Only print the result.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = RaceConfig::load(&cli.config)
        .wrap_err_with(|| format!("cannot use {}", cli.config.display()))?;
    info!(
        width = config.width,
        height = config.height,
        players = config.num_players,
        direction = ?config.direction,
        "configuration loaded"
    );

    let settings = RaceSettings {
        max_rounds: cli.max_rounds,
        seed: cli.seed,
    };
    let base_dir = cli.config.parent().unwrap_or_else(|| Path::new("."));
    let mut engine = config.build_engine(settings, base_dir)?;
    engine.start()?;

    if !cli.quiet {
        print!("{}", render(engine.track(), engine.cars()));
    }
    while engine.phase() == Phase::Running {
        engine.play_round()?;
        if !cli.quiet {
            println!("\nRound {}", engine.round());
            print!("{}", render(engine.track(), engine.cars()));
        }
    }

    match engine.result() {
        Some(RaceResult::Winner(id)) => {
            let label = engine.cars().get(id.0).map_or("?", |car| car.label.as_str());
            println!("Winner: {label} (car {id}) after {} rounds", engine.round());
        }
        Some(RaceResult::NoWinner) => println!("Every car crashed, no winner"),
        Some(RaceResult::RoundLimit) | None => {
            println!("No winner after {} rounds", engine.round());
        }
    }

    let path = engine
        .export_log_file(&cli.log_dir)
        .wrap_err("cannot write the race log")?;
    println!("Race log: {}", path.display());
    Ok(())
}
