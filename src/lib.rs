//! term-2048: the 2048 sliding-tile puzzle in a terminal
//!
//! This crate provides:
//! - A 4x4 `Board` and a `Game` state (`engine` module) with the four moves,
//!   random tile spawning, and win / game-over bookkeeping
//! - A persisted top-10 score table (`scores` module)
//! - Run settings for the binary (`config` module)
//! - The crossterm front end (`ui` module)
//!
//! Quick start:
//! ```
//! use term_2048::engine::{Game, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic game with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut game = Game::new(&mut rng);
//! while !game.game_over() {
//!     if !Move::ALL.iter().any(|&dir| game.play(dir, &mut rng)) {
//!         break;
//!     }
//! }
//! assert!(!game.can_move());
//! let _result = game.result();
//! ```
//!
//! The engine never reads a global RNG or touches the terminal: every
//! operation that needs randomness takes `&mut impl Rng`.
pub mod config;
pub mod engine;
pub mod scores;
pub mod ui;
