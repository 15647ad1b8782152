use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sweeper_core::{Board, GameResult};
use sweeper_scores::{MAX_SCORES, ScoreBoard, ScoreStore};

mod options;
mod play;

use options::{BoardArgs, ScoreFileArgs};

#[derive(Parser, Debug)]
#[command(name = "sweeper", version, about = "Mine-field engine driven by a local solver", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Let the solver play one game, printing the board after every move
    Autoplay {
        #[command(flatten)]
        board: BoardArgs,

        /// Delay between solver moves
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,

        /// Name to record a winning time under
        #[arg(long, default_value = "Solver")]
        name: String,

        #[command(flatten)]
        scores: ScoreFileArgs,

        /// Only print the final result
        #[arg(long)]
        hide_board: bool,
    },
    /// Play many games without delay and report how often the solver wins
    Batch {
        #[command(flatten)]
        board: BoardArgs,

        #[arg(short = 'n', long, default_value_t = 100)]
        games: u32,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the best times
    Scores {
        #[command(flatten)]
        scores: ScoreFileArgs,

        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    match args.command {
        Command::Autoplay {
            board,
            interval_ms,
            name,
            scores,
            hide_board,
        } => autoplay(&board, interval_ms, &name, &scores, hide_board),
        Command::Batch { board, games, json } => batch(&board, games, json),
        Command::Scores { scores, json } => show_scores(&scores, json),
    }
}

fn autoplay(
    args: &BoardArgs,
    interval_ms: u64,
    name: &str,
    scores: &ScoreFileArgs,
    hide_board: bool,
) -> Result<()> {
    let config = args.game_config().context("Invalid board options")?;
    let seed = args.seed_or_random();
    log::info!(
        "Playing {}x{} with {} mines, seed {}",
        config.rows(),
        config.cols(),
        config.mines,
        seed
    );

    let mut board = Board::new(config, seed).context("Could not create board")?;
    let interval = Duration::from_millis(interval_ms);
    let report = play::play_paced(&mut board, seed, interval, |mv, board| {
        if !hide_board {
            println!("{:?}, {} mines left", mv, board.mines_left());
            println!("{board}");
        }
    });

    match report.result {
        Some(GameResult::Won) => {
            let time = board.elapsed_secs();
            println!(
                "Won in {}s after {} moves ({} guesses)",
                time, report.steps, report.guesses
            );

            let store = ScoreStore::new(scores.path.clone());
            if let Some(rank) = play::record_win(&store, name, time) {
                println!("New best time, rank {}", rank + 1);
            }
        }
        Some(GameResult::Lost) => {
            let at = board.triggered_mine();
            println!("Hit a mine at {:?} after {} moves", at, report.steps);
        }
        Some(GameResult::Stuck) | None => {
            println!("Solver got stuck after {} moves", report.steps)
        }
    }
    Ok(())
}

fn batch(args: &BoardArgs, games: u32, json: bool) -> Result<()> {
    let config = args.game_config().context("Invalid board options")?;
    let seed = args.seed_or_random();
    log::info!("Running {} games from seed {}", games, seed);

    let summary = play::run_batch(config, games, seed)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} games: {} won, {} lost, {} stuck, win rate {:.1}%",
            summary.games,
            summary.won,
            summary.lost,
            summary.stuck,
            summary.win_rate() * 100.0
        );
    }
    Ok(())
}

fn show_scores(scores: &ScoreFileArgs, json: bool) -> Result<()> {
    let records = ScoreStore::new(scores.path.clone()).load(MAX_SCORES);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", ScoreBoard::from_records(records, MAX_SCORES));
    }
    Ok(())
}
