//! Kifu: a Go game record with variations.
//!
//! A [`game::Game`] keeps a tree of moves, a cursor into it and the board
//! position at the cursor. Playing a stone either extends the record,
//! follows an existing continuation, or opens a new variation. Records are
//! read and written as SGF.
//!
//! ## Modules
//!
//! - [`board`] - Board position and the capture ledger
//! - [`rules`] - Legality checks: captures, suicide, optional simple ko
//! - [`step`] - Recorded moves and their marks
//! - [`route`] - Addresses into the tree
//! - [`tree`] - The variation tree
//! - [`cursor`] - The active position
//! - [`game`] - The orchestrator tying it all together
//! - [`viewer`] - Display and event callbacks
//! - [`options`] - Construction options and root metadata
//! - [`sgf`] - SGF reader and writer
//! - [`shell`] - Text protocol for driving a game
//! - [`constants`] - Defaults and limits
//!
//! ## Example
//!
//! ```
//! use kifu::board::{Color, Coord};
//! use kifu::game::Game;
//!
//! let mut game = Game::default();
//! game.put_stone(Coord::new(3, 3), Color::Black).unwrap();
//! game.put_stone(Coord::new(15, 15), Color::White).unwrap();
//! game.back();
//!
//! // A different reply opens a variation
//! game.put_stone(Coord::new(15, 3), Color::White).unwrap();
//! assert_eq!(game.route().to_string(), "[1, 1, 1]");
//! println!("{}", game.to_sgf());
//! ```

pub mod board;
pub mod constants;
pub mod cursor;
pub mod game;
pub mod options;
pub mod route;
pub mod rules;
pub mod sgf;
pub mod shell;
pub mod step;
pub mod tree;
pub mod viewer;
