use anyhow::{bail, Context};
use clap::Parser;
use fleet_inference::{init_logging, FleetConfig, OracleGame, SessionStatus, MINI_FLEET};
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;

/// Play one oracle game guided by the inference core and print a JSON summary.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Side length of the square board.
    #[arg(long, default_value_t = 6)]
    size: usize,
    /// Boat lengths, comma separated.
    #[arg(long, value_delimiter = ',', default_values_t = MINI_FLEET.to_vec())]
    fleet: Vec<usize>,
    #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
    seed: Option<u64>,
    /// Sample guesses with this temperature instead of always taking the best cell.
    #[arg(long)]
    temperature: Option<f64>,
    /// Give up after this many guesses.
    #[arg(long, default_value_t = 200)]
    max_turns: usize,
    /// Ceiling on the number of fleets enumerated.
    #[arg(long)]
    fleet_limit: Option<usize>,
    /// Fleets drawn per heatmap while the fleet set is too large to hold.
    #[arg(long)]
    samples: Option<usize>,
}

#[derive(Serialize)]
struct Report {
    board_size: usize,
    fleet: Vec<usize>,
    seed: Option<u64>,
    initial_fleets: Option<usize>,
    guesses: usize,
    hits: usize,
    won: bool,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = FleetConfig::new(cli.size, cli.fleet.clone())?;
    if let Some(limit) = cli.fleet_limit {
        config = config.with_fleet_limit(limit);
    }
    if let Some(samples) = cli.samples {
        config = config.with_sample_count(samples);
    }
    let mut rng = match cli.seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_rng(&mut rand::rng()),
    };

    let mut game = OracleGame::random(config, &mut rng).context("failed to start game")?;
    let initial_fleets = game.state().live_fleets().map(<[_]>::len);
    info!("hidden fleet: {:?}", game.hidden());

    let mut guesses = 0;
    while game.status() == SessionStatus::InProgress {
        if guesses == cli.max_turns {
            bail!("no win after {} guesses", guesses);
        }
        let heatmap = game.state().heatmap()?;
        let target = match cli.temperature {
            Some(t) => heatmap.sample(&mut rng, t, &game.state().guessed()),
            None => heatmap.suggestion(),
        }
        .context("every cell was guessed without sinking the fleet")?;
        let outcome = game.fire(target)?;
        guesses += 1;
        info!(
            "guess {} at {}: {:?}, {:?} fleets left",
            guesses,
            target,
            outcome,
            game.state().live_fleets().map(<[_]>::len)
        );
    }

    let report = Report {
        board_size: cli.size,
        fleet: cli.fleet,
        seed: cli.seed,
        initial_fleets,
        guesses,
        hits: game.state().hits().count_ones(),
        won: game.status() == SessionStatus::Won,
    };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
