//! Pair-capture rules (Pente-style)
//!
//! Capture pattern: X-O-O-X where X is the capturing player's stone
//! and O is the opponent's stone. Exactly 2 stones are taken per line.

use crate::board::{Board, Pos, Stone};

/// Direction vectors for line scanning (4 slopes, both signs checked)
pub const DIRECTIONS: [(i32, i32); 4] = [
    (0, 1),  // Horizontal →
    (1, 0),  // Vertical ↓
    (1, 1),  // Diagonal ↘
    (1, -1), // Diagonal ↙
];

/// Find positions that would be captured if `stone` is placed at `pos`.
///
/// Pattern per direction: placed(pos) - opp(+1) - opp(+2) - ours(+3).
///
/// # Returns
/// Positions that would be captured (always even, pairs of stones)
pub fn get_captured_positions(board: &Board, pos: Pos, stone: Stone) -> Vec<Pos> {
    let mut captured = Vec::new();
    let opponent = stone.opponent();

    for &(dx, dy) in &DIRECTIONS {
        for sign in [-1i32, 1i32] {
            let dx = dx * sign;
            let dy = dy * sign;

            let (x3, y3) = pos.step(dx, dy, 3);
            if !board.in_bounds(x3, y3) {
                continue;
            }

            let (x1, y1) = pos.step(dx, dy, 1);
            let (x2, y2) = pos.step(dx, dy, 2);
            let p1 = Pos::new(x1 as u8, y1 as u8);
            let p2 = Pos::new(x2 as u8, y2 as u8);
            let p3 = Pos::new(x3 as u8, y3 as u8);

            if board.stone_at(p1) == opponent
                && board.stone_at(p2) == opponent
                && board.stone_at(p3) == stone
            {
                captured.push(p1);
                captured.push(p2);
            }
        }
    }

    captured
}

/// Remove the stones a placement at `pos` captures and return them.
///
/// The caller is responsible for crediting the capture count; each removed
/// stone counts for one point.
pub fn execute_captures(board: &mut Board, pos: Pos, stone: Stone) -> Vec<Pos> {
    let captured = get_captured_positions(board, pos, stone);
    for &cap in &captured {
        board.remove(cap);
    }
    captured
}

/// Check if placing `stone` at `pos` would capture anything.
#[inline]
#[must_use]
pub fn has_capture(board: &Board, pos: Pos, stone: Stone) -> bool {
    let opponent = stone.opponent();

    for &(dx, dy) in &DIRECTIONS {
        for sign in [-1i32, 1i32] {
            let dx = dx * sign;
            let dy = dy * sign;

            let (x3, y3) = pos.step(dx, dy, 3);
            if !board.in_bounds(x3, y3) {
                continue;
            }

            let (x1, y1) = pos.step(dx, dy, 1);
            let (x2, y2) = pos.step(dx, dy, 2);

            if board.stone_at(Pos::new(x1 as u8, y1 as u8)) == opponent
                && board.stone_at(Pos::new(x2 as u8, y2 as u8)) == opponent
                && board.stone_at(Pos::new(x3 as u8, y3 as u8)) == stone
            {
                return true;
            }
        }
    }

    false
}

/// Whether `stone` has ANY capturing placement available on the board.
///
/// Used by win arbitration: a player two captures away from the capture
/// threshold denies the opponent's five as long as a capture exists.
#[must_use]
pub fn can_capture_somewhere(board: &Board, stone: Stone) -> bool {
    board
        .positions()
        .any(|pos| board.is_empty(pos) && has_capture(board, pos, stone))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_horizontal_capture() {
        let mut board = Board::new(19);
        // X O O _ , X plays at the gap: X O O X
        board.place(Pos::new(9, 5), Stone::Black);
        board.place(Pos::new(9, 6), Stone::White);
        board.place(Pos::new(9, 7), Stone::White);

        let captured = get_captured_positions(&board, Pos::new(9, 8), Stone::Black);
        assert_eq!(captured.len(), 2);
        assert!(captured.contains(&Pos::new(9, 6)));
        assert!(captured.contains(&Pos::new(9, 7)));
    }

    #[test]
    fn test_no_capture_three_stones() {
        let mut board = Board::new(19);
        // X O O O X is not a capture, only exact pairs are taken
        board.place(Pos::new(9, 4), Stone::Black);
        board.place(Pos::new(9, 5), Stone::White);
        board.place(Pos::new(9, 6), Stone::White);
        board.place(Pos::new(9, 7), Stone::White);

        assert!(get_captured_positions(&board, Pos::new(9, 8), Stone::Black).is_empty());
    }

    #[test]
    fn test_no_capture_open_end() {
        let mut board = Board::new(19);
        // O O X with no flanking stone behind the pair
        board.place(Pos::new(9, 6), Stone::White);
        board.place(Pos::new(9, 7), Stone::White);

        assert!(!has_capture(&board, Pos::new(9, 8), Stone::Black));
    }

    #[test]
    fn test_moving_into_pair_is_safe() {
        let mut board = Board::new(19);
        // X _ O X : White playing into the gap forms X O O X but is NOT
        // captured, only a newly placed flanking stone captures.
        board.place(Pos::new(9, 5), Stone::Black);
        board.place(Pos::new(9, 7), Stone::White);
        board.place(Pos::new(9, 8), Stone::Black);

        assert!(get_captured_positions(&board, Pos::new(9, 6), Stone::White).is_empty());
    }

    #[test]
    fn test_multi_direction_capture() {
        let mut board = Board::new(19);
        // Two pair captures completed by a single placement at (9,9)
        board.place(Pos::new(9, 10), Stone::White);
        board.place(Pos::new(9, 11), Stone::White);
        board.place(Pos::new(9, 12), Stone::Black);
        board.place(Pos::new(10, 9), Stone::White);
        board.place(Pos::new(11, 9), Stone::White);
        board.place(Pos::new(12, 9), Stone::Black);

        let captured = get_captured_positions(&board, Pos::new(9, 9), Stone::Black);
        assert_eq!(captured.len(), 4);
    }

    #[test]
    fn test_execute_captures_clears_board() {
        let mut board = Board::new(19);
        board.place(Pos::new(9, 5), Stone::Black);
        board.place(Pos::new(9, 6), Stone::White);
        board.place(Pos::new(9, 7), Stone::White);
        board.place(Pos::new(9, 8), Stone::Black);

        let captured = execute_captures(&mut board, Pos::new(9, 8), Stone::Black);
        assert_eq!(captured.len(), 2);
        assert!(board.is_empty(Pos::new(9, 6)));
        assert!(board.is_empty(Pos::new(9, 7)));
    }

    #[test]
    fn test_diagonal_capture() {
        let mut board = Board::new(19);
        board.place(Pos::new(5, 5), Stone::Black);
        board.place(Pos::new(6, 6), Stone::White);
        board.place(Pos::new(7, 7), Stone::White);

        let captured = get_captured_positions(&board, Pos::new(8, 8), Stone::Black);
        assert_eq!(captured.len(), 2);
        assert!(captured.contains(&Pos::new(6, 6)));
    }

    #[test]
    fn test_can_capture_somewhere() {
        let mut board = Board::new(19);
        board.place(Pos::new(9, 5), Stone::Black);
        board.place(Pos::new(9, 6), Stone::White);
        board.place(Pos::new(9, 7), Stone::White);

        assert!(can_capture_somewhere(&board, Stone::Black));
        assert!(!can_capture_somewhere(&board, Stone::White));
    }

    #[test]
    fn test_capture_at_board_edge() {
        let mut board = Board::new(19);
        board.place(Pos::new(0, 0), Stone::Black);
        board.place(Pos::new(0, 1), Stone::White);
        board.place(Pos::new(0, 2), Stone::White);

        let captured = get_captured_positions(&board, Pos::new(0, 3), Stone::Black);
        assert_eq!(captured.len(), 2);
        // And nothing off-board blows up
        assert!(!has_capture(&board, Pos::new(18, 18), Stone::Black));
    }
}
