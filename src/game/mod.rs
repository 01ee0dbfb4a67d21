//! Game state and turn handling
//!
//! `GameHandler` owns the board, both players and the move history. Search
//! agents mutate it in place through `do_move`/`undo_move`; undo is an exact
//! inverse, down to the candidate set's internal ordering, so a position
//! explored and unwound leaves no trace.

pub mod candidates;

use log::debug;
use thiserror::Error;

use crate::board::{Board, Pos, Stone, DEFAULT_BOARD_SIZE};
use crate::rules::{
    self, can_break_five_by_capture, can_capture_somewhere, find_five_positions, CAPTURES_TO_WIN,
};
use crate::search::zobrist::ZobristTable;
use candidates::{Candidates, ChildOp};

/// Why a placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("intersection out of bounds")]
    OutOfBounds,
    #[error("intersection must be empty")]
    Occupied,
    #[error("no double free-threes allowed")]
    DoubleFreeThree,
}

/// One side of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    pub color: Stone,
    /// Captured opponent stones, counted per stone. 10 wins.
    pub captures: u32,
    pub last_move: Option<Pos>,
    /// Set when this player aligned five but the opponent still had a
    /// capture answer; a five surviving one more turn wins.
    pub aligned_five_prev: bool,
}

impl Player {
    fn new(color: Stone) -> Self {
        Self {
            color,
            captures: 0,
            last_move: None,
            aligned_five_prev: false,
        }
    }
}

/// Mover fields saved by `do_move` and restored by `undo_move`.
#[derive(Debug, Clone, Copy)]
struct MoverSnapshot {
    last_move: Option<Pos>,
    captures: u32,
    aligned_five_prev: bool,
}

/// The shared game position. One instance serves the whole search tree.
pub struct GameHandler {
    board: Board,
    players: [Player; 2],
    current: usize,
    candidates: Candidates,
    move_history: Vec<Pos>,
    capture_history: Vec<Vec<Pos>>,
    state_history: Vec<MoverSnapshot>,
    child_ops: Vec<Vec<ChildOp>>,
    zobrist: ZobristTable,
    hash: u64,
    winner: Option<Stone>,
    last_error: Option<PlaceError>,
}

impl GameHandler {
    #[must_use]
    pub fn new(size: usize) -> Self {
        let zobrist = ZobristTable::new(size);
        let board = Board::new(size);
        let hash = zobrist.hash(&board, Stone::Black, 0, 0);
        Self {
            board,
            players: [Player::new(Stone::Black), Player::new(Stone::White)],
            current: 0,
            candidates: Candidates::new(),
            move_history: Vec::new(),
            capture_history: Vec::new(),
            state_history: Vec::new(),
            child_ops: Vec::new(),
            zobrist,
            hash,
            winner: None,
            last_error: None,
        }
    }

    /// Reset to an empty position, keeping the board size.
    pub fn restart(&mut self) {
        *self = Self::new(self.board.size());
    }

    #[inline]
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    #[must_use]
    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    #[must_use]
    pub fn player(&self, color: Stone) -> &Player {
        if self.players[0].color == color {
            &self.players[0]
        } else {
            &self.players[1]
        }
    }

    /// The side to move.
    #[inline]
    #[must_use]
    pub fn current_color(&self) -> Stone {
        self.players[self.current].color
    }

    #[inline]
    #[must_use]
    pub fn candidates(&self) -> &Candidates {
        &self.candidates
    }

    /// Candidate cells in insertion order, newest last.
    #[inline]
    #[must_use]
    pub fn child_list(&self) -> &[Pos] {
        self.candidates.as_slice()
    }

    #[inline]
    #[must_use]
    pub fn winner(&self) -> Option<Stone> {
        self.winner
    }

    /// Force the game's outcome. Used when an agent forfeits on time.
    pub fn set_winner(&mut self, color: Stone) {
        self.winner = Some(color);
    }

    #[inline]
    #[must_use]
    pub fn last_error(&self) -> Option<PlaceError> {
        self.last_error
    }

    /// Zobrist key of the current position, maintained incrementally.
    #[inline]
    #[must_use]
    pub fn position_key(&self) -> u64 {
        self.hash
    }

    #[inline]
    #[must_use]
    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    /// Every move applied so far, oldest first.
    #[must_use]
    pub fn move_history(&self) -> &[Pos] {
        &self.move_history
    }

    /// Validate a placement for the side to move. The double-free-three
    /// check places the stone speculatively and rolls it back.
    pub fn try_place(&mut self, pos: Pos) -> Result<(), PlaceError> {
        let (x, y) = (i32::from(pos.x), i32::from(pos.y));
        if !self.board.in_bounds(x, y) {
            return Err(PlaceError::OutOfBounds);
        }
        if !self.board.is_empty(pos) {
            return Err(PlaceError::Occupied);
        }

        let color = self.current_color();
        self.board.place(pos, color);
        let legal = rules::no_double_threes(&mut self.board, pos, color);
        self.board.remove(pos);

        if legal {
            Ok(())
        } else {
            Err(PlaceError::DoubleFreeThree)
        }
    }

    /// `try_place` with the error kept on the handler for UIs to report.
    pub fn can_place(&mut self, pos: Pos) -> bool {
        match self.try_place(pos) {
            Ok(()) => {
                self.last_error = None;
                true
            }
            Err(err) => {
                self.last_error = Some(err);
                false
            }
        }
    }

    /// Apply a move for the side to move. No legality check; callers
    /// validate with `can_place` first. Flips the turn.
    pub fn do_move(&mut self, pos: Pos) {
        let color = self.current_color();
        let mover = &self.players[self.current];
        self.state_history.push(MoverSnapshot {
            last_move: mover.last_move,
            captures: mover.captures,
            aligned_five_prev: mover.aligned_five_prev,
        });

        self.board.place(pos, color);
        self.hash = self.zobrist.update_place(self.hash, pos, color);

        let captured = rules::execute_captures(&mut self.board, pos, color);
        for &cap in &captured {
            self.hash = self.zobrist.update_capture(self.hash, cap, color.opponent());
        }
        if !captured.is_empty() {
            let old = self.players[self.current].captures;
            let new = old + captured.len() as u32;
            self.hash = self.zobrist.update_capture_count(self.hash, color, old, new);
            self.players[self.current].captures = new;
        }
        self.players[self.current].last_move = Some(pos);

        let ops = self.candidates.apply_move(&self.board, pos, &captured);
        self.child_ops.push(ops);
        self.move_history.push(pos);
        self.capture_history.push(captured);
        self.current = 1 - self.current;
    }

    /// Exact inverse of the last `do_move`.
    pub fn undo_move(&mut self) {
        let pos = match self.move_history.pop() {
            Some(pos) => pos,
            None => return,
        };
        self.current = 1 - self.current;
        let color = self.current_color();

        let ops = self.child_ops.pop().unwrap_or_default();
        self.candidates.undo(&ops);

        let captured = self.capture_history.pop().unwrap_or_default();
        let snapshot = self
            .state_history
            .pop()
            .unwrap_or(MoverSnapshot {
                last_move: None,
                captures: 0,
                aligned_five_prev: false,
            });

        if !captured.is_empty() {
            let new = self.players[self.current].captures;
            self.hash = self
                .zobrist
                .update_capture_count(self.hash, color, new, snapshot.captures);
        }
        for &cap in &captured {
            self.board.place(cap, color.opponent());
            self.hash = self.zobrist.update_capture(self.hash, cap, color.opponent());
        }
        self.board.remove(pos);
        self.hash = self.zobrist.update_remove(self.hash, pos, color);

        let mover = &mut self.players[self.current];
        mover.last_move = snapshot.last_move;
        mover.captures = snapshot.captures;
        mover.aligned_five_prev = snapshot.aligned_five_prev;
    }

    /// Run `f` on the position after `pos`, then undo. Early returns inside
    /// `f` cannot leave the move applied.
    pub fn with_move<T>(&mut self, pos: Pos, f: impl FnOnce(&mut Self) -> T) -> T {
        self.do_move(pos);
        let out = f(self);
        self.undo_move();
        out
    }

    /// Stones captured around the latest move: this half-move's and the
    /// previous one's, minus any the half-move before that had already
    /// accounted for.
    #[must_use]
    pub fn retrieve_captured_stones(&self) -> Vec<Pos> {
        let n = self.capture_history.len();
        let mut stones: Vec<Pos> = Vec::new();
        if n >= 1 {
            stones.extend_from_slice(&self.capture_history[n - 1]);
        }
        if n >= 2 {
            stones.extend_from_slice(&self.capture_history[n - 2]);
        }
        if n >= 3 {
            let older = &self.capture_history[n - 3];
            stones.retain(|pos| !older.contains(pos));
        }
        stones
    }

    /// Full arbitration after a real move, including the one-turn grace
    /// period for a five the opponent can still answer by capture.
    pub fn check_winner(&mut self) -> Option<Stone> {
        // A five that survived the opponent's reply wins now.
        for i in 0..2 {
            if self.players[i].aligned_five_prev
                && find_five_positions(&self.board, self.players[i].color).is_some()
            {
                return Some(self.players[i].color);
            }
        }

        for i in 0..2 {
            let player = self.players[i];
            let opponent = self.players[1 - i];

            if player.captures >= CAPTURES_TO_WIN {
                return Some(player.color);
            }

            if let Some(five) = find_five_positions(&self.board, player.color) {
                let capture_race = opponent.captures >= CAPTURES_TO_WIN - 2
                    && can_capture_somewhere(&self.board, opponent.color);
                let breakable = can_break_five_by_capture(&self.board, &five, player.color);
                if !capture_race && !breakable {
                    return Some(player.color);
                }
                debug!(
                    "{:?} aligned five but {:?} can still answer by capture",
                    player.color, opponent.color
                );
                self.players[i].aligned_five_prev = true;
            } else {
                self.players[i].aligned_five_prev = false;
            }
        }

        None
    }

    /// Alignment-only winner check, for rollouts. No capture defense, no
    /// grace period; looks only at each player's latest stone.
    #[must_use]
    pub fn check_winner_basic(&self) -> Option<Stone> {
        for player in &self.players {
            if let Some(last) = player.last_move {
                if rules::has_five_at_pos(&self.board, last, player.color) {
                    return Some(player.color);
                }
            }
        }
        None
    }

    /// Validate and apply a move for the side to move, then arbitrate.
    /// Returns false (and records the error) if the move is illegal or the
    /// game is already over.
    pub fn play(&mut self, pos: Pos) -> bool {
        if self.winner.is_some() {
            return false;
        }
        if !self.can_place(pos) {
            return false;
        }
        self.do_move(pos);
        self.winner = self.check_winner();
        true
    }
}

impl Default for GameHandler {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_alternates_turns() {
        let mut gh = GameHandler::default();
        assert_eq!(gh.current_color(), Stone::Black);
        assert!(gh.play(Pos::new(9, 9)));
        assert_eq!(gh.current_color(), Stone::White);
        assert!(gh.play(Pos::new(9, 10)));
        assert_eq!(gh.current_color(), Stone::Black);
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let mut gh = GameHandler::default();
        assert!(gh.play(Pos::new(9, 9)));
        assert!(!gh.play(Pos::new(9, 9)));
        assert_eq!(gh.last_error(), Some(PlaceError::Occupied));
    }

    #[test]
    fn test_double_free_three_rejected() {
        let mut gh = GameHandler::default();
        // Black builds two crossing pairs, White plays far away.
        for (black, white) in [
            ((9, 7), (0, 0)),
            ((9, 8), (0, 1)),
            ((7, 9), (0, 2)),
            ((8, 9), (0, 3)),
        ] {
            assert!(gh.play(Pos::new(black.0, black.1)));
            assert!(gh.play(Pos::new(white.0, white.1)));
        }
        assert!(!gh.play(Pos::new(9, 9)));
        assert_eq!(gh.last_error(), Some(PlaceError::DoubleFreeThree));
    }

    #[test]
    fn test_capture_counts_stones() {
        let mut gh = GameHandler::default();
        gh.play(Pos::new(9, 5)); // B
        gh.play(Pos::new(9, 6)); // W
        gh.play(Pos::new(0, 0)); // B elsewhere
        gh.play(Pos::new(9, 7)); // W
        gh.play(Pos::new(9, 8)); // B captures (9,6)-(9,7)

        assert_eq!(gh.player(Stone::Black).captures, 2);
        assert!(gh.board().is_empty(Pos::new(9, 6)));
        assert!(gh.board().is_empty(Pos::new(9, 7)));
        let captured = gh.retrieve_captured_stones();
        assert!(captured.contains(&Pos::new(9, 6)));
        assert!(captured.contains(&Pos::new(9, 7)));
    }

    #[test]
    fn test_undo_is_exact_inverse() {
        let mut gh = GameHandler::default();
        gh.play(Pos::new(9, 5));
        gh.play(Pos::new(9, 6));
        gh.play(Pos::new(0, 0));
        gh.play(Pos::new(9, 7));

        let board_before = gh.board().clone();
        let key_before = gh.position_key();
        let players_before = *gh.players();
        let cands_before: Vec<Pos> = gh.candidates().iter().collect();

        // A capturing move and its undo.
        gh.do_move(Pos::new(9, 8));
        assert_eq!(gh.player(Stone::Black).captures, 2);
        gh.undo_move();

        assert_eq!(*gh.board(), board_before);
        assert_eq!(gh.position_key(), key_before);
        assert_eq!(*gh.players(), players_before);
        let cands_after: Vec<Pos> = gh.candidates().iter().collect();
        assert_eq!(cands_after, cands_before);
    }

    #[test]
    fn test_with_move_unwinds_on_early_return() {
        let mut gh = GameHandler::default();
        gh.play(Pos::new(9, 9));
        let key = gh.position_key();

        let value: i32 = gh.with_move(Pos::new(9, 10), |inner| {
            assert_ne!(inner.position_key(), key);
            42
        });
        assert_eq!(value, 42);
        assert_eq!(gh.position_key(), key);
    }

    #[test]
    fn test_capture_win() {
        let mut gh = GameHandler::default();
        // Five pair captures for Black along separate columns.
        for col in 0..5u8 {
            let c = col * 3;
            gh.play(Pos::new(0, c)); // B
            gh.play(Pos::new(1, c)); // W
            gh.play(Pos::new(18, c)); // B elsewhere
            gh.play(Pos::new(2, c)); // W
            gh.play(Pos::new(3, c)); // B captures the white pair
            if gh.winner().is_some() {
                break;
            }
            gh.play(Pos::new(17, c)); // W elsewhere
        }
        assert_eq!(gh.player(Stone::Black).captures, 10);
        assert_eq!(gh.winner(), Some(Stone::Black));
    }

    #[test]
    fn test_unbreakable_five_wins() {
        let mut gh = GameHandler::default();
        for i in 0..4u8 {
            gh.play(Pos::new(9, 5 + i)); // B
            gh.play(Pos::new(0, i)); // W far away
        }
        gh.play(Pos::new(9, 9)); // fifth stone
        assert_eq!(gh.winner(), Some(Stone::Black));
    }

    #[test]
    fn test_breakable_five_gets_grace_period() {
        let mut gh = GameHandler::default();
        // Black builds a row five at (9, 5..10); White prepares a vertical
        // capture through (8,7)-(9,7): White at (7,7), gap at (10,7).
        gh.play(Pos::new(9, 5)); // B
        gh.play(Pos::new(7, 7)); // W
        gh.play(Pos::new(9, 6)); // B
        gh.play(Pos::new(0, 0)); // W
        gh.play(Pos::new(8, 7)); // B (capture fodder)
        gh.play(Pos::new(0, 1)); // W
        gh.play(Pos::new(9, 7)); // B
        gh.play(Pos::new(0, 2)); // W
        gh.play(Pos::new(9, 8)); // B
        gh.play(Pos::new(0, 3)); // W
        gh.play(Pos::new(9, 9)); // B completes the five

        // Not a win yet: White can capture into the line.
        assert_eq!(gh.winner(), None);
        assert!(gh.player(Stone::Black).aligned_five_prev);

        // White takes the capture, breaking the five.
        assert!(gh.play(Pos::new(10, 7)));
        assert_eq!(gh.winner(), None);
        assert_eq!(gh.player(Stone::White).captures, 2);
        assert!(gh.board().is_empty(Pos::new(9, 7)));

        // Black's flag clears once the five is gone.
        gh.play(Pos::new(18, 18));
        assert!(!gh.player(Stone::Black).aligned_five_prev);
    }

    #[test]
    fn test_unanswered_five_wins_next_turn() {
        let mut gh = GameHandler::default();
        // Same setup, but White ignores the capture.
        gh.play(Pos::new(9, 5));
        gh.play(Pos::new(7, 7));
        gh.play(Pos::new(9, 6));
        gh.play(Pos::new(0, 0));
        gh.play(Pos::new(8, 7));
        gh.play(Pos::new(0, 1));
        gh.play(Pos::new(9, 7));
        gh.play(Pos::new(0, 2));
        gh.play(Pos::new(9, 8));
        gh.play(Pos::new(0, 3));
        gh.play(Pos::new(9, 9));
        assert_eq!(gh.winner(), None);

        gh.play(Pos::new(5, 0)); // White plays elsewhere
        assert_eq!(gh.winner(), Some(Stone::Black));
    }

    #[test]
    fn test_check_winner_basic_ignores_captures() {
        let mut gh = GameHandler::default();
        gh.play(Pos::new(9, 5));
        gh.play(Pos::new(7, 7));
        gh.play(Pos::new(9, 6));
        gh.play(Pos::new(0, 0));
        gh.play(Pos::new(8, 7));
        gh.play(Pos::new(0, 1));
        gh.play(Pos::new(9, 7));
        gh.play(Pos::new(0, 2));
        gh.play(Pos::new(9, 8));
        gh.play(Pos::new(0, 3));
        gh.do_move(Pos::new(9, 9));

        // Full arbitration defers; the rollout check does not.
        assert_eq!(gh.check_winner_basic(), Some(Stone::Black));
    }

    #[test]
    fn test_restart() {
        let mut gh = GameHandler::default();
        gh.play(Pos::new(9, 9));
        gh.play(Pos::new(9, 10));
        gh.restart();
        assert!(gh.board().is_board_empty());
        assert_eq!(gh.current_color(), Stone::Black);
        assert_eq!(gh.move_count(), 0);
        assert!(gh.candidates().is_empty());
    }
}
