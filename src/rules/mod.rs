//! Game rules: pair captures, alignment wins, forbidden moves
//!
//! Rule set (Ninuki / Pente family):
//! 1. Five or more aligned stones win, unless the opponent can immediately
//!    answer by capture.
//! 2. Capturing 10 opponent stones (5 pairs) wins.
//! 3. A move may not create a double indefensible free-three.

pub mod capture;
pub mod forbidden;
pub mod win;

pub use capture::{can_capture_somewhere, execute_captures, get_captured_positions, has_capture};
pub use forbidden::{count_indefensible_threes, no_double_threes};
pub use win::{
    can_break_five_by_capture, find_five_positions, find_five_through, has_five_at_pos,
    has_five_in_row,
};

/// Captured stones needed to win (counted per stone, not per pair).
pub const CAPTURES_TO_WIN: u32 = 10;
