use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

use ai_2048_core::engine::{Move, Score, Tile, WIN_TILE};
use ai_2048_core::expectimax::{Expectimax, ExpectimaxConfig, Strategy, DEFAULT_DEPTH};
use ai_2048_core::session::{Game, MoveOutcome};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "ai-2048", version, about = "2048 with an expectimax player")]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Cmd>,

    /// Search depth below each root move (max and chance layers both count)
    #[arg(long, default_value_t = DEFAULT_DEPTH, global = true)]
    depth: u64,

    /// Search strategy: expectimax or alphabeta
    #[arg(long, default_value_t = Strategy::Expectimax, global = true)]
    strategy: Strategy,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Let the AI play one game (default)
    Auto {
        /// RNG seed for tile spawns (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Show a status line instead of printing every board
        #[arg(long)]
        quiet: bool,
        /// Pause between moves, in milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,
        /// Stop after this many moves
        #[arg(long)]
        max_moves: Option<u64>,
    },
    /// Play in the terminal: w/a/s/d or up/down/left/right, plus undo, hint, new, quit
    Play {
        /// RNG seed for tile spawns (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Play many seeded games in parallel and summarize the results
    Bench {
        /// Number of games
        #[arg(long, default_value_t = 16)]
        games: u64,
        /// Seed of the first game; game i uses seed + i
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Per-game: stop after this many moves
        #[arg(long)]
        max_moves: Option<u64>,
        /// Worker threads (rayon default if omitted)
        #[arg(long)]
        threads: Option<usize>,
        /// Suppress the progress bar
        #[arg(long)]
        quiet: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let cfg = ExpectimaxConfig { depth: cli.depth, strategy: cli.strategy };
    cfg.validate()?;

    match cli.cmd {
        None => run_auto(cfg, rand::random(), false, 0, None),
        Some(Cmd::Auto { seed, quiet, delay_ms, max_moves }) => {
            run_auto(cfg, seed.unwrap_or_else(rand::random), quiet, delay_ms, max_moves)
        }
        Some(Cmd::Play { seed }) => run_play(cfg, seed.unwrap_or_else(rand::random)),
        Some(Cmd::Bench { games, seed, max_moves, threads, quiet }) => {
            run_bench(cfg, games, seed, max_moves, threads, quiet)
        }
    }
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run_auto(
    cfg: ExpectimaxConfig,
    seed: u64,
    quiet: bool,
    delay_ms: u64,
    max_moves: Option<u64>,
) -> anyhow::Result<()> {
    info!(seed, depth = cfg.depth, strategy = %cfg.strategy, "starting game");
    let mut policy = Expectimax::try_with_config(cfg)?;
    let mut game = Game::new(seed);

    let pb = if quiet {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} | Moves: {msg}")?
                .tick_chars("⠁⠃⠇⠧⠷⠿⠻⠟⠯⠷⠧⠇⠃"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        println!("{}", game.board());
        None
    };

    let start = Instant::now();
    let mut move_count: u64 = 0;
    let mut total_states: u64 = 0;
    while let Some(outcome) = game.autoplay_step(&mut policy) {
        move_count += 1;
        total_states = total_states.saturating_add(policy.last_stats().nodes);
        match &pb {
            Some(pb) => pb.set_message(format!("{} | score: {}", move_count, game.score())),
            None => println!("{}", game.board()),
        }
        match outcome {
            MoveOutcome::Won => {
                eprintln!("Reached {} after {} moves, playing on", WIN_TILE, move_count)
            }
            MoveOutcome::GameOver => break,
            MoveOutcome::Moved | MoveOutcome::Blocked => {}
        }
        if max_moves.is_some_and(|limit| move_count >= limit) {
            break;
        }
        if delay_ms > 0 {
            thread::sleep(Duration::from_millis(delay_ms));
        }
    }
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let elapsed = start.elapsed().as_secs_f64().max(1e-6);
    println!(
        "Moves made: {}, Score: {}, Highest tile: {}, moves/sec: {:.1}, \
         States considered: {}, Max states considered for a move: {}",
        move_count,
        game.score(),
        game.board().highest_tile(),
        move_count as f64 / elapsed,
        total_states,
        policy.last_stats().peak_nodes
    );
    Ok(())
}

fn run_play(cfg: ExpectimaxConfig, seed: u64) -> anyhow::Result<()> {
    let mut policy = Expectimax::try_with_config(cfg)?;
    let mut game = Game::new(seed);
    let mut out = io::stdout();

    println!("{}", game.board());
    prompt(&mut out)?;
    for line in io::stdin().lock().lines() {
        let line = line?;
        let cmd = line.trim();
        match cmd {
            "" => {}
            "q" | "quit" | "exit" => break,
            "u" | "undo" => {
                if !game.undo() {
                    println!("nothing to undo");
                }
            }
            "h" | "hint" => match game.hint(&mut policy) {
                Some(dir) => println!("hint: {dir}"),
                None => println!("no move changes the board"),
            },
            "n" | "new" => game.new_game(),
            _ => match cmd.parse::<Move>() {
                Ok(dir) => match game.step(dir) {
                    MoveOutcome::Blocked => println!("can't move {dir}"),
                    MoveOutcome::Won => {
                        println!("You reached {WIN_TILE}! Keep going, or type quit.")
                    }
                    MoveOutcome::GameOver => println!("Game over! Final score: {}", game.score()),
                    MoveOutcome::Moved => {}
                },
                Err(e) => println!("{e}"),
            },
        }
        println!("{}", game.board());
        prompt(&mut out)?;
    }
    Ok(())
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

#[derive(Debug, Clone, Copy)]
struct GameSummary {
    moves: u64,
    score: Score,
    highest_tile: Tile,
}

fn play_to_end(cfg: ExpectimaxConfig, seed: u64, max_moves: Option<u64>) -> GameSummary {
    let mut policy = Expectimax::with_config(cfg);
    let mut game = Game::new(seed);
    let mut moves = 0;
    while let Some(outcome) = game.autoplay_step(&mut policy) {
        moves += 1;
        if outcome == MoveOutcome::GameOver || max_moves.is_some_and(|limit| moves >= limit) {
            break;
        }
    }
    GameSummary { moves, score: game.score(), highest_tile: game.board().highest_tile() }
}

fn run_bench(
    cfg: ExpectimaxConfig,
    games: u64,
    seed: u64,
    max_moves: Option<u64>,
    threads: Option<usize>,
    quiet: bool,
) -> anyhow::Result<()> {
    if games == 0 {
        anyhow::bail!("--games must be at least 1");
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    let pool = builder.build()?;

    let pb = if quiet { ProgressBar::hidden() } else { ProgressBar::new(games) };
    pb.set_style(
        ProgressStyle::with_template(concat!(
            "{spinner:.green} [{elapsed_precise}] ",
            "[{wide_bar:.cyan/blue}] {pos}/{len} games ({eta})"
        ))?
        .progress_chars("=>-"),
    );

    let start = Instant::now();
    let results: Vec<GameSummary> = pool.install(|| {
        (0..games)
            .into_par_iter()
            .map(|i| {
                let summary = play_to_end(cfg.clone(), seed.wrapping_add(i), max_moves);
                pb.inc(1);
                summary
            })
            .collect()
    });
    pb.finish_and_clear();

    let total_moves: u64 = results.iter().map(|r| r.moves).sum();
    let total_score: Score = results.iter().map(|r| r.score).sum();
    let max_score = results.iter().map(|r| r.score).max().unwrap_or(0);
    let wins = results.iter().filter(|r| r.highest_tile >= WIN_TILE).count();
    let mut tiles: BTreeMap<Tile, usize> = BTreeMap::new();
    for r in &results {
        *tiles.entry(r.highest_tile).or_default() += 1;
    }

    println!(
        "games: {} | strategy: {} | depth: {} | elapsed: {:.1}s",
        games,
        cfg.strategy,
        cfg.depth,
        start.elapsed().as_secs_f64()
    );
    println!("mean score: {:.1} | max score: {}", total_score as f64 / games as f64, max_score);
    println!("mean moves: {:.1}", total_moves as f64 / games as f64);
    let win_rate = 100.0 * wins as f64 / games as f64;
    println!("reached {}: {}/{} ({:.1}%)", WIN_TILE, wins, games, win_rate);
    for (tile, count) in tiles.iter().rev() {
        println!("  highest {:>6}: {}", tile, count);
    }
    Ok(())
}
