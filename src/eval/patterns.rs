//! Shape scoring primitives
//!
//! Runs are classified by `(length, open ends)` and scored on a sharply
//! increasing scale so that a live four dwarfs every three and a five dwarfs
//! everything. Scores differ by turn parity: the same shape is worth far
//! more to the side about to play it out.

use crate::board::{Board, Pos, Stone};

/// Slopes for run counting. Each run is counted once, from its first stone
/// along the slope.
pub const SLOPES: [(i32, i32); 4] = [(1, 0), (-1, 1), (0, 1), (1, 1)];

/// Value of a completed five.
pub const FIVE_SCORE: f64 = 1e16;

/// Bonus for two or more simultaneous winning threats.
pub const DOUBLE_THREAT_BONUS: f64 = 1e8;

/// Value of a pair capture available on the next move.
pub const CAPTURE_THREAT: f64 = 1e4;

/// Length of the run of `color` starting at (x, y) along (dx, dy).
///
/// Returns 0 when the cell is not `color` or is not the first stone of the
/// run, so each run is counted exactly once per slope.
#[must_use]
pub fn nb_consecutives(board: &Board, x: i32, y: i32, dx: i32, dy: i32, color: Stone) -> usize {
    if board.stone_at_checked(x, y) != Some(color) {
        return 0;
    }
    if board.stone_at_checked(x - dx, y - dy) == Some(color) {
        return 0;
    }
    let mut n = 1;
    while board.stone_at_checked(x + dx * n, y + dy * n) == Some(color) {
        n += 1;
    }
    n as usize
}

/// Number of empty cells (0, 1 or 2) flanking a run of length `n`.
#[must_use]
pub fn nb_open_ends(board: &Board, x: i32, y: i32, dx: i32, dy: i32, n: usize) -> usize {
    let n = n as i32;
    let mut ends = 0;
    if board.stone_at_checked(x - dx, y - dy) == Some(Stone::Empty) {
        ends += 1;
    }
    if board.stone_at_checked(x + dx * n, y + dy * n) == Some(Stone::Empty) {
        ends += 1;
    }
    ends
}

/// Whether a run has enough free room on its line to grow into a five.
#[must_use]
pub fn possible_five(board: &Board, x: i32, y: i32, dx: i32, dy: i32, nb_consec: usize) -> bool {
    if nb_consec >= 5 {
        return true;
    }
    let left = 5 - nb_consec as i32;
    // Try every split of the missing stones before/after the run.
    'split: for i in 0..=left {
        let (sx, sy) = (x - i * dx, y - i * dy);
        for k in 0..5i32 {
            let (cx, cy) = (sx + k * dx, sy + k * dy);
            let in_run = k >= i && k < i + nb_consec as i32;
            if in_run {
                continue;
            }
            if board.stone_at_checked(cx, cy) != Some(Stone::Empty) {
                continue 'split;
            }
        }
        return true;
    }
    false
}

/// Whether a run is one move from being unanswerable.
#[inline]
#[must_use]
pub fn winning_stones(consecutive: usize, open_ends: usize) -> bool {
    (consecutive == 3 && open_ends == 2) || (consecutive == 4 && open_ends >= 1) || consecutive >= 5
}

/// Bonus for holding several winning shapes at once: the opponent can only
/// answer one of them.
#[inline]
#[must_use]
pub fn advantage_combinations(winning_groups: usize) -> f64 {
    if winning_groups >= 2 {
        DOUBLE_THREAT_BONUS
    } else {
        0.0
    }
}

/// Score of a run by `(length, open ends)` and turn parity.
///
/// The two-with-one-end shapes score negative: a pair flanked on one side is
/// a capture waiting to happen.
#[must_use]
pub fn score(consecutive: usize, open_ends: usize, my_turn: bool) -> f64 {
    if consecutive >= 5 {
        return FIVE_SCORE;
    }
    match (consecutive, open_ends) {
        (4, 1) => {
            if my_turn {
                1e10
            } else {
                5e1
            }
        }
        (4, 2) => {
            if my_turn {
                1e12
            } else {
                1e11
            }
        }
        (3, 1) => {
            if my_turn {
                1e2
            } else {
                5e1
            }
        }
        (3, 2) => {
            if my_turn {
                1e5
            } else {
                5e4
            }
        }
        (2, 1) => {
            if my_turn {
                -1e4
            } else {
                -1e8
            }
        }
        (2, 2) => 5.0,
        (1, 1) => 0.5,
        (1, 2) => 1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(board: &mut Board, x: u8, cols: std::ops::Range<u8>, stone: Stone) {
        for y in cols {
            board.place(Pos::new(x, y), stone);
        }
    }

    #[test]
    fn test_run_counted_once() {
        let mut board = Board::new(19);
        row(&mut board, 9, 5..9, Stone::Black);
        // Only the first stone of the run reports it.
        assert_eq!(nb_consecutives(&board, 9, 5, 0, 1, Stone::Black), 4);
        assert_eq!(nb_consecutives(&board, 9, 6, 0, 1, Stone::Black), 0);
        assert_eq!(nb_consecutives(&board, 9, 5, 1, 0, Stone::Black), 1);
    }

    #[test]
    fn test_open_ends() {
        let mut board = Board::new(19);
        row(&mut board, 9, 5..8, Stone::Black);
        assert_eq!(nb_open_ends(&board, 9, 5, 0, 1, 3), 2);

        board.place(Pos::new(9, 4), Stone::White);
        assert_eq!(nb_open_ends(&board, 9, 5, 0, 1, 3), 1);
        board.place(Pos::new(9, 8), Stone::White);
        assert_eq!(nb_open_ends(&board, 9, 5, 0, 1, 3), 0);
    }

    #[test]
    fn test_open_ends_at_edge() {
        let mut board = Board::new(19);
        row(&mut board, 0, 0..3, Stone::Black);
        assert_eq!(nb_open_ends(&board, 0, 0, 0, 1, 3), 1);
    }

    #[test]
    fn test_possible_five_open_line() {
        let mut board = Board::new(19);
        row(&mut board, 9, 5..8, Stone::Black);
        assert!(possible_five(&board, 9, 5, 0, 1, 3));
    }

    #[test]
    fn test_possible_five_boxed_in() {
        let mut board = Board::new(19);
        // Three blacks with white walls leaving only 4 cells of line space.
        row(&mut board, 9, 5..8, Stone::Black);
        board.place(Pos::new(9, 4), Stone::White);
        board.place(Pos::new(9, 9), Stone::White);
        assert!(!possible_five(&board, 9, 5, 0, 1, 3));
    }

    #[test]
    fn test_possible_five_near_edge() {
        let mut board = Board::new(19);
        row(&mut board, 0, 0..3, Stone::Black);
        board.place(Pos::new(0, 4), Stone::White);
        assert!(!possible_five(&board, 0, 0, 0, 1, 3));
        board.remove(Pos::new(0, 4));
        assert!(possible_five(&board, 0, 0, 0, 1, 3));
    }

    #[test]
    fn test_score_ordering() {
        // Live shapes must dominate smaller ones by orders of magnitude.
        assert!(score(5, 0, false) > score(4, 2, true));
        assert!(score(4, 2, true) > score(3, 2, true));
        assert!(score(3, 2, true) > score(3, 1, true));
        assert!(score(2, 1, false) < 0.0);
        assert_eq!(score(4, 0, true), 0.0);
    }

    #[test]
    fn test_winning_stones() {
        assert!(winning_stones(3, 2));
        assert!(winning_stones(4, 1));
        assert!(winning_stones(5, 0));
        assert!(!winning_stones(3, 1));
        assert!(!winning_stones(2, 2));
    }

    #[test]
    fn test_advantage_combinations() {
        assert_eq!(advantage_combinations(0), 0.0);
        assert_eq!(advantage_combinations(1), 0.0);
        assert_eq!(advantage_combinations(2), DOUBLE_THREAT_BONUS);
    }
}
