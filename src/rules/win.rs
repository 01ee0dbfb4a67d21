//! Alignment detection and the capture-break endgame rule
//!
//! A five-in-a-row only wins outright when the opponent cannot answer it,
//! either by capturing a pair out of the line or by reaching the capture
//! threshold themselves. The arbitration itself lives in the game layer;
//! this module provides the line primitives.

use crate::board::{Board, Pos, Stone};

use super::capture::{get_captured_positions, DIRECTIONS};

/// Fast five-in-a-row check through a specific position. No allocation.
#[inline]
#[must_use]
pub fn has_five_at_pos(board: &Board, pos: Pos, color: Stone) -> bool {
    if board.stone_at(pos) != color {
        return false;
    }
    for &(dx, dy) in &DIRECTIONS {
        let mut count = 1i32;
        for sign in [1i32, -1i32] {
            for i in 1..5 {
                let (x, y) = pos.step(dx * sign, dy * sign, i);
                if board.stone_at_checked(x, y) == Some(color) {
                    count += 1;
                } else {
                    break;
                }
            }
        }
        if count >= 5 {
            return true;
        }
    }
    false
}

/// The maximal run of 5+ through `pos`, if one exists.
///
/// Positions are returned in line order.
pub fn find_five_through(board: &Board, pos: Pos, color: Stone) -> Option<Vec<Pos>> {
    if board.stone_at(pos) != color {
        return None;
    }
    for &(dx, dy) in &DIRECTIONS {
        let mut line = vec![pos];

        let mut i = 1;
        loop {
            let (x, y) = pos.step(-dx, -dy, i);
            if board.stone_at_checked(x, y) == Some(color) {
                line.insert(0, Pos::new(x as u8, y as u8));
                i += 1;
            } else {
                break;
            }
        }
        let mut i = 1;
        loop {
            let (x, y) = pos.step(dx, dy, i);
            if board.stone_at_checked(x, y) == Some(color) {
                line.push(Pos::new(x as u8, y as u8));
                i += 1;
            } else {
                break;
            }
        }

        if line.len() >= 5 {
            return Some(line);
        }
    }
    None
}

/// Find any 5+ alignment for `color`, scanning the whole board.
pub fn find_five_positions(board: &Board, color: Stone) -> Option<Vec<Pos>> {
    if color == Stone::Empty {
        return None;
    }
    board
        .positions()
        .filter(|&pos| board.stone_at(pos) == color)
        .find_map(|pos| find_five_through(board, pos, color))
}

/// Whether `color` has any 5+ alignment on the board.
#[must_use]
pub fn has_five_in_row(board: &Board, color: Stone) -> bool {
    find_five_positions(board, color).is_some()
}

/// Check if the opponent can break a 5-in-a-row by capture.
///
/// True when some empty cell near the line lets the opponent capture a pair
/// that leaves fewer than 5 contiguous stones of it. Capturing an end stone
/// of an overline does not break it.
#[must_use]
pub fn can_break_five_by_capture(board: &Board, five_positions: &[Pos], five_color: Stone) -> bool {
    let opponent = five_color.opponent();

    for &pos in five_positions {
        for dx in -1i32..=1 {
            for dy in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (x, y) = pos.step(dx, dy, 1);
                if board.stone_at_checked(x, y) != Some(Stone::Empty) {
                    continue;
                }
                let adj = Pos::new(x as u8, y as u8);
                let would_capture = get_captured_positions(board, adj, opponent);
                if would_capture.iter().any(|cap| five_positions.contains(cap))
                    && !five_survives(five_positions, &would_capture)
                {
                    return true;
                }
            }
        }
    }

    false
}

/// Whether 5 contiguous stones of a line (given in line order) remain after
/// removing the captured ones.
fn five_survives(line: &[Pos], captured: &[Pos]) -> bool {
    let mut run = 0;
    for pos in line {
        if captured.contains(pos) {
            run = 0;
        } else {
            run += 1;
            if run >= 5 {
                return true;
            }
        }
    }
    false
}
