use crate::board::{Board, Cell, Position};
use Direction::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn offset(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn step(self, from: Position) -> Position {
        let (dx, dy) = self.offset();
        Position::new(from.x + dx, from.y + dy)
    }
}

/// Outcome of one move: where the head ended up and what was in that cell
/// before the snake took it. `consumed` is `None` when the snake is dead or
/// the head left the grid entirely.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Step {
    pub head: Position,
    pub consumed: Option<Cell>,
}

/// The body is a ring: `segments[head]` is the head and the slot right after
/// it (wrapping) is the tail. Moving overwrites the tail slot with the new
/// head, so a step never shifts the body.
#[derive(Debug, Clone)]
pub struct Snake {
    segments: Vec<Position>,
    head: usize,
    growth_pending: usize,
    direction: Direction,
    dead: bool,
}

impl Snake {
    pub fn new(direction: Direction, position: Position, board: &mut Board) -> Self {
        board.set(position, Cell::SnakeBody);
        Snake { segments: vec![position], head: 0, growth_pending: 0, direction, dead: false }
    }

    pub fn size(&self) -> usize {
        self.segments.len()
    }

    pub fn head(&self) -> Position {
        self.segments[self.head]
    }

    pub fn growth_pending(&self) -> usize {
        self.growth_pending
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Growing stacks copies of the head right behind it; they spread out
    /// one per move. Shrinking eats from the tail but never below one segment.
    pub fn set_size(&mut self, target: usize, board: &mut Board) {
        let size = self.segments.len();

        if target > size {
            let extra = target - size;
            let head = self.head();
            self.segments.splice(self.head..self.head, std::iter::repeat(head).take(extra));
            self.growth_pending += extra;
            return;
        }

        let excess = size - target;

        // Copies still waiting to be grown into sit right after the head and
        // share their cell with a live segment.
        let placeholders = excess.min(self.growth_pending);
        self.growth_pending -= placeholders;

        for removed in 0..excess {
            if self.segments.len() == 1 {
                break;
            }

            let tail = self.tail_index();
            let position = self.segments.remove(tail);
            if removed >= placeholders {
                board.set(position, Cell::Empty);
            }

            if tail < self.head {
                self.head -= 1;
            }
        }
    }

    pub fn move_forward(&mut self, board: &mut Board) -> Step {
        if self.dead {
            return Step { head: self.head(), consumed: None };
        }

        let new_head = self.direction.step(self.head());
        let tail = self.tail_index();

        if self.growth_pending > 0 {
            self.growth_pending -= 1;
        } else {
            board.set(self.segments[tail], Cell::Empty);
        }

        self.segments[tail] = new_head;
        self.head = tail;

        let consumed = board.get(new_head);
        board.set(new_head, Cell::SnakeBody);

        Step { head: new_head, consumed }
    }

    pub fn kill(&mut self, board: &mut Board) {
        self.dead = true;
        board.set(self.head(), Cell::SnakeDeath);
    }

    fn tail_index(&self) -> usize {
        (self.head + 1) % self.segments.len()
    }
}
