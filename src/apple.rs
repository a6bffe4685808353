use crossterm::style::{StyledContent, Stylize};

use crate::board::{Board, Cell, Position};
use crate::game::Game;

const STANDARD_APPLE_CHAR: char = 'O';
const SUPER_APPLE_CHAR: char = 'S';

/// Multiplier applied to the tick interval each time a super apple is eaten.
pub const SUPER_APPLE_SPEEDUP: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppleKind {
    Standard,
    Super,
}

impl AppleKind {
    /// Every kind that can be spawned, each equally likely.
    pub const ALL: [AppleKind; 2] = [AppleKind::Standard, AppleKind::Super];

    pub fn score(self) -> u64 {
        match self {
            AppleKind::Standard => 1,
            AppleKind::Super => 10,
        }
    }

    pub fn growth(self) -> usize {
        match self {
            AppleKind::Standard => 4,
            AppleKind::Super => 3,
        }
    }

    pub fn glyph(self) -> StyledContent<char> {
        match self {
            AppleKind::Standard => STANDARD_APPLE_CHAR.red(),
            AppleKind::Super => SUPER_APPLE_CHAR.cyan(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Apple {
    kind: AppleKind,
    position: Position,
}

impl Apple {
    /// Creates the apple and puts it on the board right away.
    pub fn place(kind: AppleKind, position: Position, board: &mut Board) -> Self {
        board.set(position, Cell::Apple(kind));
        Apple { kind, position }
    }

    pub fn kind(&self) -> AppleKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    // No rule moves an apple yet
    #[allow(dead_code)]
    pub fn set_position(&mut self, position: Position, board: &mut Board) {
        board.set(self.position, Cell::Empty);
        self.position = position;
        board.set(position, Cell::Apple(self.kind));
    }

    /// Applies this apple's effect to the game that owned it.
    pub fn eat(self, game: &mut Game) {
        game.add_score(self.kind.score());
        game.grow_snake(self.kind.growth());

        if self.kind == AppleKind::Super {
            game.scale_tick_interval(SUPER_APPLE_SPEEDUP);
        }
    }
}
