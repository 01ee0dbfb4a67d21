//! Incrementally cached position evaluation
//!
//! The evaluator keeps, per color, a grid of per-cell score contributions.
//! A cell's contribution depends only on its 4 lines, so after a move only
//! cells whose lines pass near a changed stone are recomputed. Both turn
//! parities are computed at recompute time; search flips parity every ply
//! and must not pay a rescan for it.

use crate::board::{Board, Pos, Stone};
use crate::game::Player;
use crate::rules::{capture::DIRECTIONS, CAPTURES_TO_WIN};

use super::patterns::{
    advantage_combinations, nb_consecutives, nb_open_ends, possible_five, score, winning_stones,
    CAPTURE_THREAT, SLOPES,
};

/// Contribution of one cell for one color.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct CellScore {
    /// Score when it is this color's turn.
    mine: f64,
    /// Score when it is the opponent's turn.
    theirs: f64,
    winning: u32,
}

impl CellScore {
    fn add(&mut self, other: CellScore) {
        self.mine += other.mine;
        self.theirs += other.theirs;
        self.winning += other.winning;
    }

    fn sub(&mut self, other: CellScore) {
        self.mine -= other.mine;
        self.theirs -= other.theirs;
        self.winning -= other.winning;
    }
}

/// Per-color cached cell contributions plus running totals.
#[derive(Debug, Clone)]
pub struct ScoreCache {
    size: usize,
    grids: [Vec<CellScore>; 2],
    totals: [CellScore; 2],
}

#[inline]
fn color_index(color: Stone) -> usize {
    usize::from(color == Stone::White)
}

/// Whether a change at `stone` can affect the lines through (x, y).
#[inline]
fn impacted(stone: Pos, x: i32, y: i32) -> bool {
    let dx = (i32::from(stone.x) - x).abs();
    let dy = (i32::from(stone.y) - y).abs();
    (dx == 0 && dy <= 4) || (dy == 0 && dx <= 4) || (dx == dy && dx <= 4)
}

impl ScoreCache {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            grids: [
                vec![CellScore::default(); size * size],
                vec![CellScore::default(); size * size],
            ],
            totals: [CellScore::default(); 2],
        }
    }

    /// Recompute every cell. Used after loading a position; play goes
    /// through [`Self::update`].
    pub fn rebuild(&mut self, board: &Board) {
        for grid in &mut self.grids {
            grid.fill(CellScore::default());
        }
        self.totals = [CellScore::default(); 2];
        for pos in board.positions() {
            for color in [Stone::Black, Stone::White] {
                self.recompute_cell(board, pos, color);
            }
        }
    }

    /// Recompute only the cells whose lines pass near a changed stone.
    pub fn update(&mut self, board: &Board, changed: &[Pos]) {
        if changed.is_empty() {
            return;
        }
        for x in 0..self.size as i32 {
            for y in 0..self.size as i32 {
                if changed.iter().any(|&stone| impacted(stone, x, y)) {
                    let pos = Pos::new(x as u8, y as u8);
                    self.recompute_cell(board, pos, Stone::Black);
                    self.recompute_cell(board, pos, Stone::White);
                }
            }
        }
    }

    fn recompute_cell(&mut self, board: &Board, pos: Pos, color: Stone) {
        let ci = color_index(color);
        let idx = pos.to_index(self.size);
        let fresh = compute_cell(board, pos, color);
        let old = self.grids[ci][idx];
        if fresh != old {
            self.totals[ci].sub(old);
            self.totals[ci].add(fresh);
            self.grids[ci][idx] = fresh;
        }
    }

    /// Aggregate score of `color`'s stones at the given turn parity.
    #[must_use]
    pub fn score_for_color(&self, color: Stone, my_turn: bool) -> f64 {
        let t = self.totals[color_index(color)];
        let base = if my_turn { t.mine } else { t.theirs };
        base + advantage_combinations(t.winning as usize)
    }
}

/// Score of the stone at `pos` for `color`, both parities at once.
fn compute_cell(board: &Board, pos: Pos, color: Stone) -> CellScore {
    if board.stone_at(pos) != color {
        return CellScore::default();
    }
    let (x, y) = (i32::from(pos.x), i32::from(pos.y));
    let mut cell = CellScore::default();

    for &(dx, dy) in &SLOPES {
        let n = nb_consecutives(board, x, y, dx, dy, color);
        if n == 0 {
            continue;
        }
        let ends = nb_open_ends(board, x, y, dx, dy, n);
        let mult = if possible_five(board, x, y, dx, dy, n) {
            11.0
        } else {
            1.0
        };
        cell.mine += score(n, ends, true) * mult;
        cell.theirs += score(n, ends, false) * mult;
        if winning_stones(n, ends) {
            cell.winning += 1;
        }
    }

    // Pair captures ready to take: self, opp, opp, empty along a line.
    let opponent = color.opponent();
    for &(dx, dy) in &DIRECTIONS {
        for sign in [-1i32, 1i32] {
            let dx = dx * sign;
            let dy = dy * sign;
            if board.stone_at_checked(x + dx, y + dy) == Some(opponent)
                && board.stone_at_checked(x + dx * 2, y + dy * 2) == Some(opponent)
                && board.stone_at_checked(x + dx * 3, y + dy * 3) == Some(Stone::Empty)
            {
                cell.mine += 2.0 * CAPTURE_THREAT;
                cell.theirs += CAPTURE_THREAT;
            }
        }
    }

    cell
}

/// Position value for `color`, updating the cache for the changed stones.
pub fn heuristic(
    board: &Board,
    color: Stone,
    my_turn: bool,
    changed: &[Pos],
    cache: &mut ScoreCache,
) -> f64 {
    cache.update(board, changed);
    cache.score_for_color(color, my_turn) - cache.score_for_color(color.opponent(), !my_turn)
}

/// Capture-count component: saturates once a player has won on captures.
#[must_use]
pub fn capture_heuristic(player: &Player, opponent: &Player, ours: bool) -> f64 {
    if player.captures >= CAPTURES_TO_WIN {
        return if ours {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        };
    }
    let sign = if ours { 1.0 } else { -1.0 };
    let diff = f64::from(player.captures) - f64::from(opponent.captures);
    sign * diff * 1e8
}

/// Locality tie-break: prefer answers close to the opponent's last stone.
#[must_use]
pub fn past_heuristic(opponent_last: Option<Pos>, current: Option<Pos>) -> f64 {
    match (opponent_last, current) {
        (Some(a), Some(b)) => {
            let dx = f64::from(a.x) - f64::from(b.x);
            let dy = f64::from(a.y) - f64::from(b.y);
            -(dx * dx + dy * dy).sqrt()
        }
        _ => 0.0,
    }
}
