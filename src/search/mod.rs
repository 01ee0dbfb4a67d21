//! Move-finding agents
//!
//! All agents share one mutable `GameHandler` and explore by applying and
//! undoing moves on it. They answer within a wall-clock budget; blowing the
//! budget forfeits the game rather than stalling it.

pub mod mcts;
pub mod minimax;
pub mod tt;
pub mod zobrist;

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::board::{Pos, Stone};
use crate::game::GameHandler;

pub use mcts::MctsAgent;
pub use minimax::{EngineKind, MiniMaxAgent};
pub use tt::{TranspositionTable, TtEntry};
pub use zobrist::ZobristTable;

/// Why an agent failed to answer.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The move took longer than the whole-turn budget; the agent forfeits.
    /// The move it would have played is still carried, and is legal.
    #[error("search took {elapsed:?}, over the {limit:?} budget; forfeiting")]
    BudgetExceeded {
        pos: Pos,
        elapsed: Duration,
        limit: Duration,
    },
    #[error("no legal move available")]
    NoLegalMove,
}

/// A move-finding strategy. Implementations may mutate the handler during
/// search but must hand it back in the state they received it.
pub trait Agent {
    fn color(&self) -> Stone;

    /// Produce the next move for this agent's color. On a budget forfeit the
    /// handler's winner is set to the opponent and an error is returned.
    fn find_move(&mut self, gh: &mut GameHandler) -> Result<Pos, SearchError>;
}

/// Plays uniformly random legal moves. A baseline opponent for tests.
pub struct RandomAgent {
    color: Stone,
    rng: StdRng,
}

impl RandomAgent {
    #[must_use]
    pub fn new(color: Stone, seed: u64) -> Self {
        Self {
            color,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn color(&self) -> Stone {
        self.color
    }

    fn find_move(&mut self, gh: &mut GameHandler) -> Result<Pos, SearchError> {
        if gh.board().is_board_empty() {
            return Ok(gh.board().center());
        }
        let size = gh.board().size();
        for _ in 0..size * size {
            let pos = Pos::new(
                self.rng.gen_range(0..size) as u8,
                self.rng.gen_range(0..size) as u8,
            );
            if gh.can_place(pos) {
                return Ok(pos);
            }
        }
        // Dense board: fall back to scanning.
        let remaining: Vec<Pos> = gh.board().positions().collect();
        for pos in remaining {
            if gh.can_place(pos) {
                return Ok(pos);
            }
        }
        Err(SearchError::NoLegalMove)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_agent_plays_center_first() {
        let mut gh = GameHandler::default();
        let mut agent = RandomAgent::new(Stone::Black, 7);
        assert_eq!(agent.find_move(&mut gh).unwrap(), Pos::new(9, 9));
    }

    #[test]
    fn test_random_agent_plays_legal_moves() {
        let mut gh = GameHandler::default();
        gh.play(Pos::new(9, 9));
        let mut agent = RandomAgent::new(Stone::White, 7);
        for _ in 0..10 {
            let mv = agent.find_move(&mut gh).unwrap();
            assert!(gh.play(mv));
            if gh.winner().is_some() {
                break;
            }
            // Black answers deterministically far from the action.
            let open: Vec<Pos> = gh.board().positions().collect();
            let filler = open
                .into_iter()
                .find(|&p| gh.board().is_empty(p) && gh.can_place(p))
                .unwrap();
            if !gh.play(filler) {
                break;
            }
            if gh.winner().is_some() {
                break;
            }
        }
    }
}
