//! Depth-bounded search agents: minimax, alpha-beta, alpha-beta with
//! memory, MTD-f
//!
//! All four engines share one node shape: `evaluate_move(move, depth)`
//! scores the position reached after `move`, with max and min levels unified
//! by a sign multiplier. The agent pre-selects a handful of candidates with
//! a depth-0 score map, deepens them iteratively under a wall-clock budget,
//! and always answers from the deepest completed iteration.

use std::time::{Duration, Instant};

use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::board::{Pos, Stone};
use crate::eval::{
    capture_heuristic, heuristic, past_heuristic, ScoreCache, FIVE_SCORE,
};
use crate::game::GameHandler;
use crate::rules::has_five_at_pos;

use super::tt::{TranspositionTable, TtEntry};
use super::{Agent, SearchError};

/// Whole-turn budget.
pub const TIME_LIMIT: Duration = Duration::from_millis(500);
/// Branching bound per node.
const MAX_CHILD: usize = 32;
/// Candidates kept from the depth-0 score map.
const MAX_TOP_MOVES: usize = 5;

/// Share of the turn budget granted to each search phase.
const SIMPLE_EVAL_SHARE: f64 = 0.35;
const ITE_SHARE: f64 = 0.5;
const MTDF_SHARE: f64 = 0.5;

/// Which engine scores candidate moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Minimax,
    AlphaBeta,
    AlphaBetaMemory,
    Mtdf,
}

impl EngineKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            EngineKind::Minimax => "minimax",
            EngineKind::AlphaBeta => "alpha_beta",
            EngineKind::AlphaBetaMemory => "alpha_beta_memory",
            EngineKind::Mtdf => "mtdf",
        }
    }
}

/// The minimax-family agent.
pub struct MiniMaxAgent {
    color: Stone,
    depth: u32,
    max_top_moves: usize,
    engine: EngineKind,
    time_limit: Duration,
    start: Instant,
    table: TranspositionTable,
    undo_table: TranspositionTable,
    scores: ScoreCache,
    undo_scores: ScoreCache,
    /// Speculative caches keyed by the move whose evaluation produced them;
    /// the chosen move's cache is committed after the search.
    cache_by_move: FxHashMap<Pos, ScoreCache>,
    primed: bool,
}

impl MiniMaxAgent {
    #[must_use]
    pub fn new(color: Stone, depth: u32, engine: EngineKind, board_size: usize) -> Self {
        Self {
            color,
            depth,
            max_top_moves: MAX_TOP_MOVES,
            engine,
            time_limit: TIME_LIMIT,
            start: Instant::now(),
            table: TranspositionTable::new(),
            undo_table: TranspositionTable::new(),
            scores: ScoreCache::new(board_size),
            undo_scores: ScoreCache::new(board_size),
            cache_by_move: FxHashMap::default(),
            primed: false,
        }
    }

    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    fn share(&self, ratio: f64) -> Duration {
        self.time_limit.mul_f64(ratio)
    }

    /// Restore the caches saved by the last commit, for an external undo of
    /// the agent's own move.
    pub fn revert_last_commit(&mut self) {
        self.scores = self.undo_scores.clone();
        self.table = self.undo_table.clone();
    }

    /// Score the position after the last applied move, as seen by this
    /// agent's color. Caches the updated score grid under that move.
    fn evaluation(&mut self, gh: &GameHandler, my_turn: bool) -> f64 {
        let mover = gh.current_color().opponent();
        let player = *gh.player(mover);
        let opponent = *gh.player(mover.opponent());

        let mut changed = gh.retrieve_captured_stones();
        changed.extend(player.last_move);
        changed.extend(opponent.last_move);

        let mut cache = self.scores.clone();
        let h = heuristic(gh.board(), self.color, my_turn, &changed, &mut cache);
        if let Some(mv) = player.last_move {
            self.cache_by_move.insert(mv, cache);
        }

        h + capture_heuristic(&player, &opponent, player.color == self.color)
            + past_heuristic(opponent.last_move, player.last_move)
    }

    /// Refresh the committed score grid with the opponent's latest move.
    fn update_because_opponent_played(&mut self, gh: &GameHandler) {
        self.evaluation(gh, true);
        if let Some(last) = gh.player(self.color.opponent()).last_move {
            if let Some(cache) = self.cache_by_move.remove(&last) {
                self.scores = cache;
            }
        }
    }

    /// Depth-0 score for every candidate, newest candidates first, stopping
    /// when this phase's budget share runs out.
    fn simple_evaluation(&mut self, gh: &mut GameHandler) -> Vec<(Pos, f64)> {
        let budget = self.share(SIMPLE_EVAL_SHARE);
        let moves: Vec<Pos> = gh.child_list().to_vec();
        let mut scored = Vec::with_capacity(moves.len());
        for &mv in moves.iter().rev() {
            if self.start.elapsed() >= budget {
                break;
            }
            let val = gh.with_move(mv, |g| self.evaluation(g, false));
            scored.push((mv, val));
        }
        scored
    }

    /// Opponent replies to explore from the current node, branching-bounded
    /// to the newest candidates.
    fn bounded_children(gh: &GameHandler) -> Vec<Pos> {
        let list = gh.child_list();
        let start = list.len().saturating_sub(MAX_CHILD);
        list[start..].to_vec()
    }

    fn evaluate_move(&mut self, gh: &mut GameHandler, mv: Pos, depth: u32, seed: f64) -> f64 {
        match self.engine {
            EngineKind::Minimax => self.minimax(gh, mv, depth, true),
            EngineKind::AlphaBeta => {
                self.alpha_beta(gh, mv, depth, true, f64::NEG_INFINITY, f64::INFINITY)
            }
            EngineKind::AlphaBetaMemory => {
                self.alpha_beta_memory(gh, mv, depth, true, f64::NEG_INFINITY, f64::INFINITY)
            }
            EngineKind::Mtdf => self.mtdf(gh, mv, depth, seed),
        }
    }

    /// Value of the position after `mv`. `max_player` marks whose move `mv`
    /// is: the agent's when true. Children of the node are the other side's
    /// replies, so a max node takes the minimum over them (sign trick).
    fn minimax(&mut self, gh: &mut GameHandler, mv: Pos, depth: u32, max_player: bool) -> f64 {
        gh.with_move(mv, |g| {
            let mover = if max_player {
                self.color
            } else {
                self.color.opponent()
            };
            // Completing a five ends the line; no need to expand further.
            if has_five_at_pos(g.board(), mv, mover) {
                self.cache_by_move.insert(mv, self.scores.clone());
                return if mover == self.color {
                    FIVE_SCORE
                } else {
                    -FIVE_SCORE
                };
            }
            if depth == 0 {
                return self.evaluation(g, !max_player);
            }
            let sign = if max_player { 1.0 } else { -1.0 };
            let mut val = sign * f64::INFINITY;
            for child in Self::bounded_children(g) {
                let v = self.minimax(g, child, depth - 1, !max_player);
                val = sign * f64::min(sign * val, sign * v);
            }
            val
        })
    }

    fn alpha_beta(
        &mut self,
        gh: &mut GameHandler,
        mv: Pos,
        depth: u32,
        max_player: bool,
        alpha: f64,
        beta: f64,
    ) -> f64 {
        gh.with_move(mv, |g| {
            let mover = if max_player {
                self.color
            } else {
                self.color.opponent()
            };
            if has_five_at_pos(g.board(), mv, mover) {
                self.cache_by_move.insert(mv, self.scores.clone());
                return if mover == self.color {
                    FIVE_SCORE
                } else {
                    -FIVE_SCORE
                };
            }
            if depth == 0 {
                return self.evaluation(g, !max_player);
            }
            let sign = if max_player { 1.0 } else { -1.0 };
            let me = usize::from(max_player);
            let mut val = sign * f64::INFINITY;
            let mut lim = [alpha, beta];
            for child in Self::bounded_children(g) {
                let v = self.alpha_beta(g, child, depth - 1, !max_player, lim[0], lim[1]);
                val = sign * f64::min(sign * val, sign * v);
                if sign * (lim[1 - me] - val) >= 0.0 {
                    break;
                }
                lim[me] = sign * f64::min(sign * lim[me], sign * val);
            }
            val
        })
    }

    /// Alpha-beta backed by the transposition table. Bounds are trusted only
    /// from entries searched at least as deep as this request.
    fn alpha_beta_memory(
        &mut self,
        gh: &mut GameHandler,
        mv: Pos,
        depth: u32,
        max_player: bool,
        alpha: f64,
        beta: f64,
    ) -> f64 {
        let mut store: Option<(u64, TtEntry)> = None;
        let val = gh.with_move(mv, |g| {
            let mover = if max_player {
                self.color
            } else {
                self.color.opponent()
            };
            if has_five_at_pos(g.board(), mv, mover) {
                self.cache_by_move.insert(mv, self.scores.clone());
                return if mover == self.color {
                    FIVE_SCORE
                } else {
                    -FIVE_SCORE
                };
            }

            let key = g.position_key();
            let (mut alpha, mut beta) = (alpha, beta);
            if let Some(n) = self.table.probe(key, depth) {
                if n.lowerbound >= beta {
                    return n.lowerbound;
                }
                if n.upperbound <= alpha {
                    return n.upperbound;
                }
                alpha = alpha.max(n.lowerbound);
                beta = beta.min(n.upperbound);
            }

            let val = if depth == 0 {
                self.evaluation(g, !max_player)
            } else {
                let sign = if max_player { 1.0 } else { -1.0 };
                let me = usize::from(max_player);
                let mut val = sign * f64::INFINITY;
                let mut lim = [alpha, beta];
                for child in Self::bounded_children(g) {
                    let v =
                        self.alpha_beta_memory(g, child, depth - 1, !max_player, lim[0], lim[1]);
                    val = sign * f64::min(sign * val, sign * v);
                    if sign * (lim[1 - me] - val) >= 0.0 {
                        break;
                    }
                    lim[me] = sign * f64::min(sign * lim[me], sign * val);
                }
                val
            };

            let mut entry = TtEntry::new(depth);
            if val <= alpha {
                entry.upperbound = val;
            } else if val < beta {
                entry.lowerbound = val;
                entry.upperbound = val;
            } else {
                entry.lowerbound = val;
            }
            store = Some((key, entry));
            val
        });
        if let Some((key, entry)) = store {
            self.table.store(key, entry);
        }
        val
    }

    /// MTD-f: a run of null-window alpha-beta-memory probes converging on
    /// the true value, seeded with the previous depth's estimate.
    fn mtdf(&mut self, gh: &mut GameHandler, mv: Pos, depth: u32, seed: f64) -> f64 {
        let budget = self.share(MTDF_SHARE);
        let mut g = seed;
        let (mut lower, mut upper) = (f64::NEG_INFINITY, f64::INFINITY);
        while lower < upper {
            if self.start.elapsed() >= budget {
                return g;
            }
            let beta = if g == lower { g + 1.0 } else { g };
            // At saturated magnitudes g + 1.0 == g; the window cannot move.
            if beta <= lower {
                break;
            }
            g = self.alpha_beta_memory(gh, mv, depth, true, beta - 1.0, beta);
            if g < beta {
                upper = g;
            } else {
                lower = g;
            }
        }
        g
    }

    /// Deepen the candidates one depth at a time. Returns the values of the
    /// deepest completed (or usefully partial) iteration; the returned
    /// vector indexes a prefix of `moves`.
    fn iterative_deepening(&mut self, gh: &mut GameHandler, moves: &[Pos], initial: &[f64]) -> Vec<f64> {
        let budget = self.share(ITE_SHARE);
        let mut prev: Vec<f64> = initial.to_vec();
        for depth in 1..self.depth {
            let mut row = vec![0.0; moves.len()];
            for (i, &mv) in moves.iter().enumerate() {
                if self.start.elapsed() >= budget {
                    // A partial row beats the previous depth only once it
                    // covers enough moves to choose between.
                    if i < 2 {
                        return prev;
                    }
                    row.truncate(i);
                    return row;
                }
                row[i] = self.evaluate_move(gh, mv, depth, prev[i]);
            }
            prev = row;
        }
        prev
    }

    fn argmax(values: &[f64]) -> usize {
        values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Commit the chosen move's cache and table, keeping undo copies.
    fn commit(&mut self, mv: Pos) {
        self.undo_scores = self.scores.clone();
        self.undo_table = self.table.clone();
        if let Some(cache) = self.cache_by_move.get(&mv) {
            self.scores = cache.clone();
        }
    }
}

impl Agent for MiniMaxAgent {
    fn color(&self) -> Stone {
        self.color
    }

    fn find_move(&mut self, gh: &mut GameHandler) -> Result<Pos, SearchError> {
        self.start = Instant::now();
        if gh.board().is_board_empty() {
            return Ok(gh.board().center());
        }

        self.cache_by_move.clear();
        if self.primed {
            self.update_because_opponent_played(gh);
        } else {
            self.scores.rebuild(gh.board());
            self.primed = true;
        }

        let scored = self.simple_evaluation(gh);
        let (mut moves, mut values): (Vec<Pos>, Vec<f64>) = {
            let mut scored = scored;
            scored.sort_by(|a, b| b.1.total_cmp(&a.1));
            scored.truncate(self.max_top_moves);
            scored.into_iter().unzip()
        };
        if moves.is_empty() {
            // Budget consumed before any scoring: fall back to the newest
            // candidates so a move is still produced.
            moves = gh.child_list().iter().rev().take(self.max_top_moves).copied().collect();
            values = vec![0.0; moves.len()];
        }

        // Drop double-free-three candidates.
        let mut legal_moves = Vec::with_capacity(moves.len());
        let mut legal_values = Vec::with_capacity(values.len());
        for (mv, val) in moves.into_iter().zip(values) {
            if gh.can_place(mv) {
                legal_moves.push(mv);
                legal_values.push(val);
            }
        }
        if legal_moves.is_empty() {
            let all: Vec<Pos> = gh.child_list().to_vec();
            match all.into_iter().rev().find(|&mv| gh.can_place(mv)) {
                Some(mv) => {
                    legal_moves.push(mv);
                    legal_values.push(0.0);
                }
                None => return Err(SearchError::NoLegalMove),
            }
        }

        let deep = self.iterative_deepening(gh, &legal_moves, &legal_values);
        let best = Self::argmax(&deep);
        let mv = legal_moves[best];
        self.commit(mv);

        let elapsed = self.start.elapsed();
        if elapsed > self.time_limit {
            warn!(
                "{} agent took {elapsed:?} (> {:?}) and forfeits",
                self.engine.name(),
                self.time_limit
            );
            gh.set_winner(self.color.opponent());
            return Err(SearchError::BudgetExceeded {
                pos: mv,
                elapsed,
                limit: self.time_limit,
            });
        }
        debug!(
            "{} plays {:?} value {:.3e} after {elapsed:?} ({} tt entries)",
            self.engine.name(),
            mv,
            deep[best],
            self.table.len()
        );
        Ok(mv)
    }
}
