//! Board representation for Ninuki (five-in-a-row with captures)

pub mod text;

/// Default board size (19x19)
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Stone colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stone {
    Empty,
    Black,
    White,
}

impl Stone {
    /// Get opponent color
    #[inline]
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            Stone::Empty => Stone::Empty,
        }
    }
}

/// Intersection on the board, 0-indexed. `x` is the row, `y` the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: u8,
    pub y: u8,
}

impl Pos {
    #[inline]
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn to_index(self, size: usize) -> usize {
        self.x as usize * size + self.y as usize
    }

    /// Offset by `i` steps along slope `(dx, dy)`; may leave the board.
    #[inline]
    pub fn step(self, dx: i32, dy: i32, i: i32) -> (i32, i32) {
        (i32::from(self.x) + dx * i, i32::from(self.y) + dy * i)
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.x, self.y).cmp(&(other.x, other.y))
    }
}

/// Game board. Pure storage: no legality knowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Stone>,
    size: usize,
}

impl Board {
    /// Create an empty board of the given side length.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![Stone::Empty; size * size],
            size,
        }
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether integer coordinates designate a cell on the board.
    #[inline]
    #[must_use]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.size as i32 && y >= 0 && y < self.size as i32
    }

    /// Get stone at position
    #[inline]
    #[must_use]
    pub fn stone_at(&self, pos: Pos) -> Stone {
        self.cells[pos.to_index(self.size)]
    }

    /// Stone at integer coordinates, or `None` when off board.
    #[inline]
    #[must_use]
    pub fn stone_at_checked(&self, x: i32, y: i32) -> Option<Stone> {
        if self.in_bounds(x, y) {
            Some(self.cells[x as usize * self.size + y as usize])
        } else {
            None
        }
    }

    /// Check if position is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.stone_at(pos) == Stone::Empty
    }

    /// Place a stone. Capture processing lives in `rules`, not here.
    #[inline]
    pub fn place(&mut self, pos: Pos, stone: Stone) {
        let idx = pos.to_index(self.size);
        self.cells[idx] = stone;
    }

    /// Remove a stone
    #[inline]
    pub fn remove(&mut self, pos: Pos) {
        let idx = pos.to_index(self.size);
        self.cells[idx] = Stone::Empty;
    }

    /// The central intersection.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Pos {
        let mid = (self.size / 2) as u8;
        Pos::new(mid, mid)
    }

    /// Total stones on board
    #[must_use]
    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != Stone::Empty).count()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&c| c != Stone::Empty)
    }

    #[must_use]
    pub fn is_board_empty(&self) -> bool {
        self.cells.iter().all(|&c| c == Stone::Empty)
    }

    /// Iterate all positions, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        let size = self.size;
        (0..size).flat_map(move |x| (0..size).map(move |y| Pos::new(x as u8, y as u8)))
    }

    /// Whether any of the 8 neighbors of `pos` holds a stone.
    #[must_use]
    pub fn has_stone_neighbor(&self, pos: Pos) -> bool {
        for dx in -1i32..=1 {
            for dy in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = pos.step(dx, dy, 1);
                if let Some(stone) = self.stone_at_checked(nx, ny) {
                    if stone != Stone::Empty {
                        return true;
                    }
                }
            }
        }
        false
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE)
    }
}
