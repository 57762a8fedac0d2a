//! Kifu: a Go game record editor.
//!
//! ## Usage
//!
//! - `kifu` - Show a demo
//! - `kifu shell` - Edit a record over a line protocol on stdin/stdout
//! - `kifu demo` - Play a random game with variations and print it

use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use kifu::game::Game;
use kifu::options::Options;
use kifu::shell::{Shell, str_vertex};

/// Kifu: a Go game record with variations
#[derive(Parser)]
#[command(name = "kifu")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit a record from stdin, one command per line
    Shell {
        /// Board size: `19`, `19x13` or `19:13`
        #[arg(long, default_value = "19")]
        size: String,
        /// Forbid immediate recapture of a single-stone ko
        #[arg(long)]
        ko: bool,
        /// SGF file to start from
        #[arg(long)]
        sgf: Option<String>,
    },
    /// Play random moves, branching now and then, and print the record
    Demo {
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        /// Board size: `19`, `19x13` or `19:13`
        #[arg(long, default_value = "9")]
        size: String,
        /// Number of moves to attempt
        #[arg(long, default_value_t = 40)]
        moves: usize,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Shell { size, ko, sgf }) => {
            let mut options = Options::default().with_board_size(size).with_ko(ko);
            if let Some(path) = sgf {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {path}"))?;
                options = options.with_data(text);
            }
            let game = Game::new(options).context("creating game")?;
            let mut shell = Shell::new(game);
            shell
                .run(io::stdin().lock(), io::stdout())
                .context("shell i/o")?;
        }
        Some(Commands::Demo { seed, size, moves }) => run_demo(seed, &size, moves)?,
        None => run_demo(None, "9", 40)?,
    }
    Ok(())
}

fn run_demo(seed: Option<u64>, size: &str, moves: usize) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let options = Options::default().with_board_size(size).with_ko(true);
    let mut game = Game::new(options).context("creating game")?;
    let (width, height) = (game.board().width(), game.board().height());

    println!("Kifu: random game on {}\n", game.metadata().board_size());

    for _ in 0..moves {
        // Now and then step back and try something else
        if game.ply() > 2 && rng.u8(..8) == 0 {
            for _ in 0..rng.usize(1..=2) {
                game.back();
            }
        }
        let color = game.turn();
        for _ in 0..16 {
            let coord = kifu::board::Coord::new(rng.usize(..width), rng.usize(..height));
            if let Ok(placed) = game.put_stone(coord, color) {
                let note = if placed.switched { " (variation)" } else { "" };
                println!(
                    "{:>3} {color} {}{note}",
                    game.ply(),
                    str_vertex(coord, height)
                );
                break;
            }
        }
    }

    println!("\nFinal position at {}:", game.route());
    println!("{}", game.board());
    println!("{} moves recorded", game.tree().node_count());
    println!("{}", game.to_sgf());
    Ok(())
}
