use std::fmt::{self, Write};

use crossterm::style::Stylize;
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use crate::apple::AppleKind;

const BORDER_SIZE: usize = 1;

const SNAKE_BODY_CHAR: char = '∗';
const EMPTY_CHAR: char = ' ';

/// A cell in unpadded board coordinates. The border lives at `-1` and at
/// `width`/`height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Horizontal,
    Vertical,
}

impl Border {
    pub fn glyph(self) -> char {
        match self {
            Border::TopLeft => '╔',
            Border::TopRight => '╗',
            Border::BottomLeft => '╚',
            Border::BottomRight => '╝',
            Border::Horizontal => '═',
            Border::Vertical => '║',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Border(Border),
    SnakeBody,
    SnakeDeath,
    Apple(AppleKind),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => f.write_char(EMPTY_CHAR),
            Cell::Border(border) => f.write_char(border.glyph()),
            Cell::SnakeBody => write!(f, "{}", SNAKE_BODY_CHAR.green()),
            Cell::SnakeDeath => write!(f, "{}", SNAKE_BODY_CHAR.red()),
            Cell::Apple(kind) => write!(f, "{}", kind.glyph()),
        }
    }
}

/// Flat indices of every empty cell. Dense storage plus a slot table keeps
/// insert, remove and uniform sampling O(1).
#[derive(Debug, Clone)]
struct FreeCells {
    cells: Vec<usize>,
    slots: Vec<Option<usize>>,
}

impl FreeCells {
    fn with_capacity(len: usize) -> Self {
        FreeCells { cells: Vec::with_capacity(len), slots: vec![None; len] }
    }

    fn insert(&mut self, index: usize) {
        if self.slots[index].is_none() {
            self.slots[index] = Some(self.cells.len());
            self.cells.push(index);
        }
    }

    fn remove(&mut self, index: usize) {
        if let Some(slot) = self.slots[index].take() {
            self.cells.swap_remove(slot);
            // The last entry was moved into the hole
            if let Some(&moved) = self.cells.get(slot) {
                self.slots[moved] = Some(slot);
            }
        }
    }

    fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        self.cells.choose(rng).copied()
    }

    fn len(&self) -> usize {
        self.cells.len()
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    padded_width: usize,
    padded_height: usize,
    cells: Vec<Cell>,
    free: FreeCells,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        let padded_width = width + 2 * BORDER_SIZE;
        let padded_height = height + 2 * BORDER_SIZE;
        let len = padded_width * padded_height;

        let mut board = Board {
            width,
            height,
            padded_width,
            padded_height,
            cells: Vec::with_capacity(len),
            free: FreeCells::with_capacity(len),
        };

        for y in 0..padded_height {
            for x in 0..padded_width {
                let cell = board.default_cell(x, y);
                if cell == Cell::Empty {
                    board.free.insert(board.cells.len());
                }
                board.cells.push(cell);
            }
        }

        board
    }

    /// What a cell holds on a fresh board, in padded coordinates.
    pub fn default_cell(&self, x: usize, y: usize) -> Cell {
        let top = y < BORDER_SIZE;
        let bottom = y >= self.height + BORDER_SIZE;

        if x < BORDER_SIZE {
            return match (top, bottom) {
                (true, _) => Cell::Border(Border::TopLeft),
                (_, true) => Cell::Border(Border::BottomLeft),
                _ => Cell::Border(Border::Vertical),
            };
        }

        if x >= self.width + BORDER_SIZE {
            return match (top, bottom) {
                (true, _) => Cell::Border(Border::TopRight),
                (_, true) => Cell::Border(Border::BottomRight),
                _ => Cell::Border(Border::Vertical),
            };
        }

        if top || bottom {
            return Cell::Border(Border::Horizontal);
        }

        Cell::Empty
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `None` for positions beyond the padded grid.
    pub fn get(&self, position: Position) -> Option<Cell> {
        self.index_of(position).map(|index| self.cells[index])
    }

    pub fn set(&mut self, position: Position, cell: Cell) {
        let index = match self.index_of(position) {
            Some(index) => index,
            None => {
                debug!(?position, ?cell, "ignoring write outside the grid");
                return;
            }
        };

        self.cells[index] = cell;

        if cell == Cell::Empty {
            self.free.insert(index);
        } else {
            self.free.remove(index);
        }
    }

    pub fn in_bounds(&self, position: Position) -> bool {
        (0..self.width as i32).contains(&position.x) && (0..self.height as i32).contains(&position.y)
    }

    pub fn free_cells(&self) -> usize {
        self.free.len()
    }

    pub fn random_empty_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        self.free.choose(rng).map(|index| self.position_of(index))
    }

    fn index_of(&self, position: Position) -> Option<usize> {
        let x = usize::try_from(position.x + BORDER_SIZE as i32).ok()?;
        let y = usize::try_from(position.y + BORDER_SIZE as i32).ok()?;

        if x >= self.padded_width || y >= self.padded_height {
            return None;
        }

        Some(y * self.padded_width + x)
    }

    fn position_of(&self, index: usize) -> Position {
        let y = index / self.padded_width;
        let x = index % self.padded_width;
        Position::new(x as i32 - BORDER_SIZE as i32, y as i32 - BORDER_SIZE as i32)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.padded_width) {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn empty_positions(board: &Board) -> HashSet<Position> {
        let mut positions = HashSet::new();
        for y in -1..=board.height() as i32 {
            for x in -1..=board.width() as i32 {
                let position = Position::new(x, y);
                if board.get(position) == Some(Cell::Empty) {
                    positions.insert(position);
                }
            }
        }
        positions
    }

    fn free_positions(board: &Board) -> HashSet<Position> {
        board.free.cells.iter().map(|&index| board.position_of(index)).collect()
    }

    #[test]
    fn test_new_board_interior_is_free() {
        let board = Board::new(10, 7);
        assert_eq!(board.free_cells(), 70);

        for y in 0..7 {
            for x in 0..10 {
                assert_eq!(board.get(Position::new(x, y)), Some(Cell::Empty));
            }
        }
        assert_eq!(free_positions(&board), empty_positions(&board));
    }

    #[test]
    fn test_border_cells() {
        let board = Board::new(4, 3);
        assert_eq!(board.get(Position::new(-1, -1)), Some(Cell::Border(Border::TopLeft)));
        assert_eq!(board.get(Position::new(4, -1)), Some(Cell::Border(Border::TopRight)));
        assert_eq!(board.get(Position::new(-1, 3)), Some(Cell::Border(Border::BottomLeft)));
        assert_eq!(board.get(Position::new(4, 3)), Some(Cell::Border(Border::BottomRight)));
        assert_eq!(board.get(Position::new(2, -1)), Some(Cell::Border(Border::Horizontal)));
        assert_eq!(board.get(Position::new(2, 3)), Some(Cell::Border(Border::Horizontal)));
        assert_eq!(board.get(Position::new(-1, 1)), Some(Cell::Border(Border::Vertical)));
        assert_eq!(board.get(Position::new(4, 1)), Some(Cell::Border(Border::Vertical)));
    }

    #[test]
    fn test_free_index_tracks_writes() {
        let mut board = Board::new(5, 5);
        let mut rng = StdRng::seed_from_u64(7);

        let cells = [
            Cell::SnakeBody,
            Cell::Empty,
            Cell::Apple(AppleKind::Standard),
            Cell::SnakeDeath,
            Cell::Apple(AppleKind::Super),
        ];

        for _ in 0..500 {
            let position = Position::new(rng.gen_range(-1..6), rng.gen_range(-1..6));
            let cell = *cells.choose(&mut rng).unwrap();
            board.set(position, cell);
            assert_eq!(free_positions(&board), empty_positions(&board));
            assert_eq!(board.free_cells(), empty_positions(&board).len());
        }
    }

    #[test]
    fn test_in_bounds() {
        let board = Board::new(10, 12);
        assert!(board.in_bounds(Position::new(0, 0)));
        assert!(board.in_bounds(Position::new(9, 11)));
        assert!(!board.in_bounds(Position::new(10, 0)));
        assert!(!board.in_bounds(Position::new(0, 12)));
        assert!(!board.in_bounds(Position::new(-1, 5)));
        assert!(!board.in_bounds(Position::new(5, -1)));
    }

    #[test]
    fn test_outside_grid_is_ignored() {
        let mut board = Board::new(3, 3);
        let far = Position::new(-2, 0);
        assert_eq!(board.get(far), None);

        board.set(far, Cell::SnakeBody);
        board.set(Position::new(3, 9), Cell::Empty);
        assert_eq!(board.free_cells(), 9);
        assert_eq!(board.to_string(), Board::new(3, 3).to_string());
    }

    #[test]
    fn test_random_empty_position() {
        let mut board = Board::new(3, 3);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..8 {
            let position = board.random_empty_position(&mut rng).unwrap();
            assert!(board.in_bounds(position));
            assert_eq!(board.get(position), Some(Cell::Empty));
            board.set(position, Cell::SnakeBody);
        }

        let last = board.random_empty_position(&mut rng).unwrap();
        board.set(last, Cell::SnakeBody);
        assert_eq!(board.random_empty_position(&mut rng), None);
    }

    #[test]
    fn test_render_small_board() {
        let board = Board::new(3, 3);
        let rendered = board.to_string();
        let rows: Vec<&str> = rendered.lines().collect();

        assert_eq!(rows, vec!["╔═══╗", "║   ║", "║   ║", "║   ║", "╚═══╝"]);
        assert!(rows.iter().all(|row| row.chars().count() == 5));
    }
}
