//! Ninuki decision engine
//!
//! A game core and AI for the Ninuki (Pente family) variant of five-in-a-row:
//! - 19x19 board by default
//! - Five or more aligned stones win, unless the alignment can still be
//!   broken by an immediate capture
//! - Capture win: 10 captured stones (5 pairs)
//! - Pair capture rule: X-O-O-X captures the O-O pair
//! - Moves creating a double free-three are forbidden
//!
//! # Architecture
//!
//! - [`board`]: grid, stones, coordinates, text round-trip
//! - [`rules`]: captures, alignment wins, forbidden moves
//! - [`game`]: the mutable [`game::GameHandler`] all agents search on,
//!   with full undo
//! - [`eval`]: incremental position scoring
//! - [`search`]: minimax-family and Monte-Carlo agents
//!
//! # Quick Start
//!
//! ```
//! use ninuki::{Agent, EngineKind, GameHandler, MiniMaxAgent, Pos, Stone};
//!
//! let mut game = GameHandler::default();
//! game.play(Pos::new(9, 9));
//!
//! // The AI answers as White.
//! let mut agent = MiniMaxAgent::new(Stone::White, 2, EngineKind::AlphaBetaMemory, 19);
//! let reply = agent.find_move(&mut game).unwrap();
//! assert!(game.play(reply));
//! ```

pub mod board;
pub mod eval;
pub mod game;
pub mod rules;
pub mod search;

pub use board::{Board, Pos, Stone, DEFAULT_BOARD_SIZE};
pub use game::{GameHandler, PlaceError, Player};
pub use search::{Agent, EngineKind, MctsAgent, MiniMaxAgent, RandomAgent, SearchError};
