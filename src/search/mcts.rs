//! Monte-Carlo tree search agent
//!
//! Keeps one tree across the whole game and re-roots it as moves are
//! played, so statistics gathered on earlier turns keep paying off. Each
//! iteration descends by UCB1, expands one unvisited candidate, plays a
//! bounded random rollout and backs the result up while unwinding the
//! shared handler.

use std::time::{Duration, Instant};

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

use crate::board::{Pos, Stone};
use crate::game::GameHandler;

use super::minimax::TIME_LIMIT;
use super::{Agent, SearchError};

/// UCB1 exploration constant.
const EXPLORATION: f64 = 2.0;
/// Rollouts stop after this many plies when nobody aligns five.
const ROLLOUT_CAP: usize = 64;
/// Share of the turn budget spent iterating; the rest is slack for the
/// final pick.
const SEARCH_SHARE: f64 = 0.9;

/// One position in the search tree. `value` accumulates rollout results
/// from this agent's point of view.
#[derive(Debug, Default)]
struct TreeNode {
    value: f64,
    visits: u32,
    children: FxHashMap<Pos, TreeNode>,
}

impl TreeNode {
    fn ucb1(&self, parent_visits: u32) -> f64 {
        let n = f64::from(self.visits) + 1.0;
        self.value / n + EXPLORATION * (f64::from(parent_visits + 1).ln() / n).sqrt()
    }
}

pub struct MctsAgent {
    color: Stone,
    root: TreeNode,
    /// Moves of the game already folded into the root.
    seen_moves: usize,
    rng: StdRng,
    time_limit: Duration,
    start: Instant,
}

impl MctsAgent {
    #[must_use]
    pub fn new(color: Stone, seed: u64) -> Self {
        Self {
            color,
            root: TreeNode::default(),
            seen_moves: 0,
            rng: StdRng::seed_from_u64(seed),
            time_limit: TIME_LIMIT,
            start: Instant::now(),
        }
    }

    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Follow the moves played since the last call, keeping the matching
    /// subtree and dropping its siblings. A shrunken history means the
    /// handler was restarted; the tree starts over with it.
    fn reroot(&mut self, gh: &GameHandler) {
        if gh.move_count() < self.seen_moves {
            self.root = TreeNode::default();
            self.seen_moves = 0;
        }
        for &mv in &gh.move_history()[self.seen_moves..] {
            self.root = self.root.children.remove(&mv).unwrap_or_default();
        }
        self.seen_moves = gh.move_count();
    }

    /// Rollout result from the agent's point of view.
    fn outcome(color: Stone, winner: Option<Stone>) -> f64 {
        match winner {
            Some(w) if w == color => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        }
    }

    /// A legal candidate this node has not expanded yet, newest first.
    fn unexplored_move(gh: &mut GameHandler, node: &TreeNode) -> Option<Pos> {
        let fresh: Vec<Pos> = gh
            .child_list()
            .iter()
            .rev()
            .copied()
            .filter(|mv| !node.children.contains_key(mv))
            .collect();
        fresh.into_iter().find(|&mv| gh.can_place(mv))
    }

    /// Uniform random playout over the candidate set, unwound before
    /// returning.
    fn rollout(rng: &mut StdRng, color: Stone, gh: &mut GameHandler) -> f64 {
        let mut played = 0;
        let mut winner = gh.check_winner_basic();
        while winner.is_none() && played < ROLLOUT_CAP && !gh.board().is_full() {
            let candidates: Vec<Pos> = gh.child_list().to_vec();
            let mut choice = None;
            for _ in 0..candidates.len() {
                let mv = candidates[rng.gen_range(0..candidates.len())];
                if gh.can_place(mv) {
                    choice = Some(mv);
                    break;
                }
            }
            let mv = match choice.or_else(|| {
                let all: Vec<Pos> = gh.child_list().to_vec();
                all.into_iter().find(|&mv| gh.can_place(mv))
            }) {
                Some(mv) => mv,
                None => break,
            };
            gh.do_move(mv);
            played += 1;
            winner = gh.check_winner_basic();
        }
        for _ in 0..played {
            gh.undo_move();
        }
        Self::outcome(color, winner)
    }

    /// One selection/expansion/rollout/backpropagation pass. The handler is
    /// returned to the state it was given in.
    fn simulate(rng: &mut StdRng, color: Stone, gh: &mut GameHandler, node: &mut TreeNode) -> f64 {
        node.visits += 1;
        let result = if let Some(winner) = gh.check_winner_basic() {
            Self::outcome(color, Some(winner))
        } else if gh.board().is_full() {
            0.0
        } else if let Some(mv) = Self::unexplored_move(gh, node) {
            gh.do_move(mv);
            let child = node.children.entry(mv).or_default();
            child.visits += 1;
            let result = Self::rollout(rng, color, gh);
            child.value += result;
            gh.undo_move();
            result
        } else if node.children.is_empty() {
            0.0
        } else {
            let parent_visits = node.visits;
            let mv = node
                .children
                .iter()
                .max_by(|a, b| a.1.ucb1(parent_visits).total_cmp(&b.1.ucb1(parent_visits)))
                .map(|(&mv, _)| mv)
                .unwrap();
            gh.do_move(mv);
            let result = Self::simulate(rng, color, gh, node.children.get_mut(&mv).unwrap());
            gh.undo_move();
            result
        };
        node.value += result;
        result
    }

    /// The expanded move with the highest accumulated value.
    fn best_child(&self) -> Option<Pos> {
        self.root
            .children
            .iter()
            .max_by(|a, b| a.1.value.total_cmp(&b.1.value))
            .map(|(&mv, _)| mv)
    }
}

impl Agent for MctsAgent {
    fn color(&self) -> Stone {
        self.color
    }

    fn find_move(&mut self, gh: &mut GameHandler) -> Result<Pos, SearchError> {
        self.start = Instant::now();
        if gh.board().is_board_empty() {
            return Ok(gh.board().center());
        }
        self.reroot(gh);

        let budget = self.time_limit.mul_f64(SEARCH_SHARE);
        let mut iterations = 0u32;
        while self.start.elapsed() < budget {
            Self::simulate(&mut self.rng, self.color, gh, &mut self.root);
            iterations += 1;
        }

        let mv = match self.best_child() {
            Some(mv) if gh.can_place(mv) => mv,
            _ => {
                let all: Vec<Pos> = gh.child_list().to_vec();
                match all.into_iter().rev().find(|&mv| gh.can_place(mv)) {
                    Some(mv) => mv,
                    None => return Err(SearchError::NoLegalMove),
                }
            }
        };

        let elapsed = self.start.elapsed();
        if elapsed > self.time_limit {
            warn!("mcts took {elapsed:?} (> {:?}) and forfeits", self.time_limit);
            gh.set_winner(self.color.opponent());
            return Err(SearchError::BudgetExceeded {
                pos: mv,
                elapsed,
                limit: self.time_limit,
            });
        }
        debug!(
            "mcts plays {mv:?} after {iterations} iterations, {} root children, {elapsed:?}",
            self.root.children.len()
        );
        Ok(mv)
    }
}
