//! Search candidate set
//!
//! Empty cells within Chebyshev distance 1 of any stone. Maintained
//! incrementally across `do_move`/`undo_move`: every mutation is recorded in
//! a per-move op log whose exact reversal restores the set bit-identically,
//! including the internal ordering of the backing vector. Search move
//! ordering depends on that ordering, so a full rescan is never an
//! acceptable substitute for replaying the log.

use rustc_hash::FxHashSet;

use crate::board::{Board, Pos, Stone};

/// One reversible mutation of the candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOp {
    /// Position appended to the end of the vector.
    Added(Pos),
    /// Position swap-removed from the given index.
    Removed(Pos, usize),
}

/// The candidate set plus O(1) membership.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    list: Vec<Pos>,
    members: FxHashSet<Pos>,
}

impl Candidates {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, pos: Pos) -> bool {
        self.members.contains(&pos)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Candidates in insertion order; search iterates this newest-first.
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Pos> + '_ {
        self.list.iter().copied()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Pos] {
        &self.list
    }

    fn add(&mut self, pos: Pos, log: &mut Vec<ChildOp>) {
        if self.members.insert(pos) {
            self.list.push(pos);
            log.push(ChildOp::Added(pos));
        }
    }

    fn remove(&mut self, pos: Pos, log: &mut Vec<ChildOp>) {
        if self.members.remove(&pos) {
            let idx = self
                .list
                .iter()
                .position(|&p| p == pos)
                .expect("membership set and vector out of sync");
            self.list.swap_remove(idx);
            log.push(ChildOp::Removed(pos, idx));
        }
    }

    /// Update for a stone placed at `pos`, with `captured` already removed
    /// from the board. Returns the op log to pass back to [`Self::undo`].
    pub fn apply_move(&mut self, board: &Board, pos: Pos, captured: &[Pos]) -> Vec<ChildOp> {
        let mut log = Vec::new();

        // The move's cell is no longer playable.
        self.remove(pos, &mut log);

        // Its empty neighbors become candidates.
        for dx in -1i32..=1 {
            for dy in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (x, y) = pos.step(dx, dy, 1);
                if board.stone_at_checked(x, y) == Some(Stone::Empty) {
                    self.add(Pos::new(x as u8, y as u8), &mut log);
                }
            }
        }

        // Captured cells reopen if they still touch a stone; their neighbors
        // drop out if the capture stranded them.
        for &cap in captured {
            if board.has_stone_neighbor(cap) {
                self.add(cap, &mut log);
            }
            for dx in -1i32..=1 {
                for dy in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let (x, y) = cap.step(dx, dy, 1);
                    if board.stone_at_checked(x, y) == Some(Stone::Empty) {
                        let neigh = Pos::new(x as u8, y as u8);
                        if !board.has_stone_neighbor(neigh) {
                            self.remove(neigh, &mut log);
                        }
                    }
                }
            }
        }

        log
    }

    /// Replay an op log backwards. Restores the vector ordering exactly:
    /// `Added` pops, `Removed(pos, idx)` re-inserts at `idx` by undoing the
    /// swap_remove.
    pub fn undo(&mut self, log: &[ChildOp]) {
        for &op in log.iter().rev() {
            match op {
                ChildOp::Added(pos) => {
                    let popped = self.list.pop();
                    debug_assert_eq!(popped, Some(pos));
                    self.members.remove(&pos);
                }
                ChildOp::Removed(pos, idx) => {
                    if idx == self.list.len() {
                        self.list.push(pos);
                    } else {
                        let moved = self.list[idx];
                        self.list.push(moved);
                        self.list[idx] = pos;
                    }
                    self.members.insert(pos);
                }
            }
        }
    }
}
