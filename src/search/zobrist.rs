//! Zobrist hashing for position identification
//!
//! XOR-based hashing with precomputed values per (cell, color), a
//! side-to-move component and a capture-count component. Placing, removing
//! and capturing are O(1) hash updates, so the game handler can carry the
//! key incrementally through `do_move`/`undo_move`.

use crate::board::{Board, Pos, Stone};
use crate::rules::CAPTURES_TO_WIN;

const CAPTURE_SLOTS: usize = CAPTURES_TO_WIN as usize + 1;

/// Zobrist hash table for one board size.
pub struct ZobristTable {
    black: Vec<u64>,
    white: Vec<u64>,
    black_to_move: u64,
    /// [color][captured stones 0..=10]
    captures: [[u64; CAPTURE_SLOTS]; 2],
    size: usize,
}

impl ZobristTable {
    /// Create a table with deterministic values.
    ///
    /// Uses an LCG with a fixed seed so the same position always hashes to
    /// the same key across runs. Constants from Knuth's MMIX LCG.
    #[must_use]
    pub fn new(size: usize) -> Self {
        let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
        let mut next_rand = || {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1);
            seed
        };

        let cells = size * size;
        let black: Vec<u64> = (0..cells).map(|_| next_rand()).collect();
        let white: Vec<u64> = (0..cells).map(|_| next_rand()).collect();

        let mut captures = [[0u64; CAPTURE_SLOTS]; 2];
        for color in &mut captures {
            for slot in color.iter_mut() {
                *slot = next_rand();
            }
        }

        Self {
            black,
            white,
            black_to_move: next_rand(),
            captures,
            size,
        }
    }

    #[inline]
    fn stone_value(&self, pos: Pos, stone: Stone) -> u64 {
        let idx = pos.to_index(self.size);
        match stone {
            Stone::Black => self.black[idx],
            Stone::White => self.white[idx],
            Stone::Empty => 0,
        }
    }

    /// Full hash of a position. Incremental updates are preferred in search.
    #[must_use]
    pub fn hash(
        &self,
        board: &Board,
        side_to_move: Stone,
        black_captures: u32,
        white_captures: u32,
    ) -> u64 {
        let mut h = 0u64;

        for pos in board.positions() {
            h ^= self.stone_value(pos, board.stone_at(pos));
        }
        if side_to_move == Stone::Black {
            h ^= self.black_to_move;
        }
        h ^= self.capture_value(Stone::Black, black_captures);
        h ^= self.capture_value(Stone::White, white_captures);

        h
    }

    /// Hash update after placing a stone. Toggles side to move.
    #[inline]
    #[must_use]
    pub fn update_place(&self, hash: u64, pos: Pos, stone: Stone) -> u64 {
        hash ^ self.stone_value(pos, stone) ^ self.black_to_move
    }

    /// Hash update after removing a placed stone. XOR is its own inverse.
    #[inline]
    #[must_use]
    pub fn update_remove(&self, hash: u64, pos: Pos, stone: Stone) -> u64 {
        self.update_place(hash, pos, stone)
    }

    /// Hash update for a captured stone. Does not toggle side to move.
    #[inline]
    #[must_use]
    pub fn update_capture(&self, hash: u64, pos: Pos, stone: Stone) -> u64 {
        hash ^ self.stone_value(pos, stone)
    }

    /// Hash update when a color's capture count changes.
    #[inline]
    #[must_use]
    pub fn update_capture_count(&self, hash: u64, color: Stone, old: u32, new: u32) -> u64 {
        hash ^ self.capture_value(color, old) ^ self.capture_value(color, new)
    }

    #[inline]
    fn capture_value(&self, color: Stone, count: u32) -> u64 {
        let cidx = usize::from(color == Stone::White);
        self.captures[cidx][(count as usize).min(CAPTURE_SLOTS - 1)]
    }
}
