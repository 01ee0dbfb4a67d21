//! Text rendering and parsing of board positions
//!
//! Format: a header row of 1-indexed column numbers, then one line per row,
//! prefixed with the 1-indexed row number. Cells render as `.` (empty),
//! `X` (black), `O` (white); empty star points render as `*`.
//!
//! Parsing is lenient the other way: a malformed position is recoverable and
//! falls back to an empty board with a warning, per the game's loading rules.

use std::fmt;

use log::warn;
use thiserror::Error;

use super::{Board, Pos, Stone};

const EMPTY_SYMBOL: &str = ".";
const BLACK_SYMBOL: &str = "X";
const WHITE_SYMBOL: &str = "O";
const STAR_SYMBOL: &str = "*";

/// Why a board text could not be parsed. Callers that want the recoverable
/// behavior use [`Board::from_text`], which logs and falls back.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardParseError {
    #[error("board text has {found} rows, expected {expected}")]
    WrongRowCount { expected: usize, found: usize },
    #[error("row {row} has {found} cells, expected {expected}")]
    WrongCellCount {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unrecognized cell symbol {0:?}")]
    BadSymbol(String),
}

/// Star-point rows/columns for the rendered grid (matches a 19x19 goban;
/// indexes falling off smaller boards are simply never hit).
fn is_star_point(board: &Board, pos: Pos) -> bool {
    let marks = [3usize, board.size() / 2, board.size().saturating_sub(4)];
    marks.contains(&(pos.x as usize)) && marks.contains(&(pos.y as usize))
}

fn symbol_for(board: &Board, pos: Pos) -> &'static str {
    match board.stone_at(pos) {
        Stone::Black => BLACK_SYMBOL,
        Stone::White => WHITE_SYMBOL,
        Stone::Empty => {
            if is_star_point(board, pos) {
                STAR_SYMBOL
            } else {
                EMPTY_SYMBOL
            }
        }
    }
}

fn stone_for(symbol: &str) -> Result<Stone, BoardParseError> {
    match symbol {
        EMPTY_SYMBOL | STAR_SYMBOL => Ok(Stone::Empty),
        BLACK_SYMBOL => Ok(Stone::Black),
        WHITE_SYMBOL => Ok(Stone::White),
        other => Err(BoardParseError::BadSymbol(other.to_string())),
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x\\y")?;
        for y in 0..self.size() {
            write!(f, "{:>2} ", y + 1)?;
        }
        writeln!(f)?;
        for x in 0..self.size() {
            write!(f, "{:>2} ", x + 1)?;
            for y in 0..self.size() {
                write!(f, "{:>2} ", symbol_for(self, Pos::new(x as u8, y as u8)))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Board {
    /// Parse a rendered board of the given size.
    ///
    /// Malformed input is recoverable: the error is logged and an empty
    /// board is returned instead.
    #[must_use]
    pub fn from_text(input: &str, size: usize) -> Board {
        match Self::try_from_text(input, size) {
            Ok(board) => board,
            Err(err) => {
                warn!("could not parse board text ({err}), starting with an empty board");
                Board::new(size)
            }
        }
    }

    /// Strict parse, used by `from_text` and directly by tests.
    pub fn try_from_text(input: &str, size: usize) -> Result<Board, BoardParseError> {
        // Skip the column-number header; every remaining line starts with a
        // row number we also drop.
        let rows: Vec<Vec<&str>> = input
            .lines()
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split_whitespace().skip(1).collect())
            .collect();

        if rows.len() != size {
            return Err(BoardParseError::WrongRowCount {
                expected: size,
                found: rows.len(),
            });
        }

        let mut board = Board::new(size);
        for (x, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(BoardParseError::WrongCellCount {
                    row: x + 1,
                    expected: size,
                    found: row.len(),
                });
            }
            for (y, symbol) in row.iter().enumerate() {
                let stone = stone_for(symbol)?;
                board.place(Pos::new(x as u8, y as u8), stone);
            }
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut board = Board::new(19);
        board.place(Pos::new(9, 9), Stone::Black);
        board.place(Pos::new(0, 18), Stone::White);
        board.place(Pos::new(3, 3), Stone::Black); // on a star point

        let rendered = board.to_string();
        let parsed = Board::try_from_text(&rendered, 19).unwrap();
        assert_eq!(parsed, board);
    }

    #[test]
    fn test_star_points_parse_as_empty() {
        let board = Board::new(19);
        let rendered = board.to_string();
        assert!(rendered.contains('*'));
        let parsed = Board::try_from_text(&rendered, 19).unwrap();
        assert!(parsed.is_board_empty());
    }

    #[test]
    fn test_wrong_row_count() {
        let err = Board::try_from_text("header\n 1 . .\n", 19).unwrap_err();
        assert_eq!(
            err,
            BoardParseError::WrongRowCount {
                expected: 19,
                found: 1
            }
        );
    }

    #[test]
    fn test_bad_symbol() {
        let mut board = Board::new(5);
        board.place(Pos::new(2, 2), Stone::Black);
        let rendered = board.to_string().replace('X', "?");
        let err = Board::try_from_text(&rendered, 5).unwrap_err();
        assert_eq!(err, BoardParseError::BadSymbol("?".to_string()));
    }

    #[test]
    fn test_malformed_falls_back_to_empty() {
        let board = Board::from_text("not a board at all", 19);
        assert!(board.is_board_empty());
        assert_eq!(board.size(), 19);
    }
}
