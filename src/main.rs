use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use rand::rngs::StdRng;
use rand::SeedableRng;

use agent48::agent::{Agent, AgentConfig, DEFAULT_DEPTH, DEFAULT_SCORE_CUTOFF};
use agent48::engine::board::{Board, Score};
use agent48::engine::direction::Direction;
use agent48::engine::game::Game;
use agent48::engine::grid::Grid;

/// Automated 2048 player driven by expectimax search.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Search depth in plies.
    #[arg(long, global = true, default_value_t = DEFAULT_DEPTH)]
    depth: u32,

    /// Score below which the agent skips the search.
    #[arg(long, global = true, default_value_t = DEFAULT_SCORE_CUTOFF)]
    score_cutoff: Score,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Let the agent play whole games.
    Play {
        #[arg(long, default_value_t = 1)]
        games: usize,

        /// Seed for tile spawns; random when omitted.
        #[arg(long)]
        seed: Option<u64>,

        /// Stop a game after this many moves.
        #[arg(long)]
        max_moves: Option<usize>,
    },
    /// Print the move the agent picks for a board.
    Suggest {
        #[arg(long, default_value_t = 0)]
        score: Score,

        /// 16 values by row, separated by spaces or commas, 0 for empty cells.
        board: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = AgentConfig {
        depth: cli.depth,
        score_cutoff: cli.score_cutoff,
    };
    let mut agent = Agent::new(config);

    match cli.command {
        Command::Play {
            games,
            seed,
            max_moves,
        } => {
            for n in 0..games {
                let rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(n as u64)),
                    None => StdRng::from_entropy(),
                };
                let game = play(&mut agent, Game::new(rng)?, max_moves);
                println!(
                    "game {}: score {} after {} moves, largest tile {}",
                    n + 1,
                    game.score(),
                    game.moves(),
                    game.max_tile()
                );
            }
        }
        Command::Suggest { score, board } => {
            let grid: Grid = board.parse()?;
            let board = Board::new(grid, score);
            log::debug!("suggesting for\n{}", board);
            println!("{}", agent.select_move(&board));
        }
    }

    Ok(())
}

fn play(agent: &mut Agent, mut game: Game, max_moves: Option<usize>) -> Game {
    while !game.is_game_over() && max_moves.map_or(true, |max| game.moves() < max) {
        let direction = agent.select_move(&game);
        if !game.shift(direction) {
            // the shortcut never plays Up, so it can pick a move that does nothing
            match Direction::ALL.into_iter().find(|d| game.shift(*d)) {
                Some(played) => log::warn!("{} changed nothing, played {}", direction, played),
                None => break,
            }
        }
        log::debug!("move {}: {} -> score {}", game.moves(), direction, game.score());
        log::trace!("\n{}", game.current());
    }
    log::info!(
        "finished with score {} and largest tile {}",
        game.score(),
        game.max_tile()
    );
    game
}

fn init_logging(cli: &Cli) -> Result<()> {
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message,
            ))
        })
        .level(cli.verbose.log_level_filter());

    let dispatch = match &cli.log_file {
        Some(path) => dispatch.chain(fern::log_file(path)?),
        None => dispatch.chain(std::io::stderr()),
    };
    dispatch.apply()?;
    Ok(())
}
