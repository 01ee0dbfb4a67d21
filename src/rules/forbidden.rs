//! No-double-free-threes rule
//!
//! A move may not create two free threes at once, unless the threes are
//! defensible. A free three is a 5-window holding exactly 3 of the mover's
//! stones and 2 empties; it is indefensible when one hypothetical extension
//! turns it into a four open on both sides.
//!
//! The board is mutated for the hypothetical placements and always restored
//! before returning.

use crate::board::{Board, Pos, Stone};

use super::capture::DIRECTIONS;

/// Count extensions of a 7-cell window that yield a four open at both ends.
///
/// `coords` is the free-three's 5-window padded by one cell on each side;
/// cells may lie off board, which counts as blocked.
fn indefensible_four(board: &mut Board, coords: &[(i32, i32); 7], color: Stone) -> usize {
    let mut indefensibles = 0;

    for i in 1..=5 {
        let (v, w) = coords[i];
        if board.stone_at_checked(v, w) != Some(Stone::Empty) {
            continue;
        }
        let probe = Pos::new(v as u8, w as u8);
        board.place(probe, color);

        let mut same = 0;
        let mut empty = 0;
        for &(x, y) in coords {
            match board.stone_at_checked(x, y) {
                Some(Stone::Empty) => {
                    if same == 0 {
                        empty = 1;
                        continue;
                    }
                    if same == 4 {
                        empty += 1;
                    }
                    break;
                }
                Some(s) if s == color => same += 1,
                // Opponent stone or board edge: skip leading blockers,
                // otherwise the run ends here.
                _ => {
                    if same == 0 {
                        continue;
                    }
                    break;
                }
            }
        }

        if same >= 4 && empty >= 2 {
            indefensibles += 1;
        }
        board.remove(probe);
    }

    indefensibles
}

/// Count indefensible free threes created through `pos` for `color`.
///
/// The stone at `pos` must already be on the board (speculatively placed by
/// the caller). The board is left unchanged.
pub fn count_indefensible_threes(board: &mut Board, pos: Pos, color: Stone) -> usize {
    let mut threes = 0;

    for &(dx, dy) in &DIRECTIONS {
        let mut i = 0i32;
        while i != 5 {
            let (sx, sy) = pos.step(-dx, -dy, i);
            let (bx, by) = (sx + dx * 4, sy + dy * 4);
            if !board.in_bounds(sx, sy) || !board.in_bounds(bx, by) {
                i += 1;
                continue;
            }

            let mut same = 0;
            let mut free = 0;
            for j in 0..5 {
                match board.stone_at_checked(sx + dx * j, sy + dy * j) {
                    Some(Stone::Empty) => free += 1,
                    Some(s) if s == color => same += 1,
                    _ => {}
                }
            }

            if same == 3 && free == 2 {
                let mut coords = [(0i32, 0i32); 7];
                for (k, slot) in coords.iter_mut().enumerate() {
                    *slot = (sx + dx * (k as i32 - 1), sy + dy * (k as i32 - 1));
                }
                if indefensible_four(board, &coords, color) >= 1 {
                    threes += 1;
                }
                // Later windows on this slope cover the same three.
                if i == 0 {
                    i = 4;
                } else {
                    break;
                }
            }
            i += 1;
        }
    }

    threes
}

/// The double-free-three legality check for a stone already placed at `pos`.
#[must_use]
pub fn no_double_threes(board: &mut Board, pos: Pos, color: Stone) -> bool {
    count_indefensible_threes(board, pos, color) <= 1
}
