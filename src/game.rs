use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::apple::{Apple, AppleKind};
use crate::board::{Board, Cell, Position};
use crate::snake::{Direction, Snake, Step};

/// Seconds between ticks at the start of a game.
pub const INITIAL_TICK_INTERVAL: f64 = 0.5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EndReason {
    SelfCollision,
    OutOfBounds,
    Win,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            EndReason::SelfCollision => "Ouch!",
            EndReason::OutOfBounds => "Don't Run Away!",
            EndReason::Win => "You Win!",
        };
        f.write_str(message)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameState {
    Running,
    Ended(EndReason),
}

pub struct Game {
    board: Board,
    snake: Snake,
    apples: HashMap<Position, Apple>,
    score: u64,
    tick_interval: f64,
    state: GameState,
    rng: StdRng,
}

impl Game {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_rng(width, height, StdRng::from_entropy())
    }

    /// Same board, same apples: for replays and tests.
    pub fn with_seed(width: usize, height: usize, seed: u64) -> Self {
        Self::with_rng(width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: usize, height: usize, rng: StdRng) -> Self {
        let mut board = Board::new(width, height);
        let start = Position::new(width as i32 / 2, height as i32 / 2);
        let snake = Snake::new(Direction::Right, start, &mut board);

        let mut game = Game {
            board,
            snake,
            apples: HashMap::new(),
            score: 0,
            tick_interval: INITIAL_TICK_INTERVAL,
            state: GameState::Running,
            rng,
        };

        game.spawn_apple();
        info!(width, height, ?start, "new game");
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    #[cfg(test)]
    pub fn apples(&self) -> impl Iterator<Item = &Apple> {
        self.apples.values()
    }

    /// Read this right before sleeping; super apples shorten it mid-game.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(self.tick_interval)
    }

    /// Points the snake somewhere new. Turning back into the body is allowed
    /// and ends the game on the next tick.
    pub fn process_input(&mut self, direction: Direction) {
        self.snake.set_direction(direction);
    }

    /// Puts a random apple on a random empty cell. `false` when the board is
    /// full.
    pub fn spawn_apple(&mut self) -> bool {
        let position = match self.board.random_empty_position(&mut self.rng) {
            Some(position) => position,
            None => return false,
        };

        let kind = AppleKind::ALL[self.rng.gen_range(0..AppleKind::ALL.len())];
        debug!(?kind, ?position, "apple spawned");
        self.apples.insert(position, Apple::place(kind, position, &mut self.board));

        true
    }

    /// Advances one tick. Returns whether the game is still running.
    pub fn update(&mut self) -> bool {
        if self.state != GameState::Running {
            return false;
        }

        let Step { head, consumed } = self.snake.move_forward(&mut self.board);
        trace!(?head, ?consumed, direction = ?self.snake.direction(), "tick");

        // Eating comes first so the winning move still scores
        if let Some(apple) = self.apples.remove(&head) {
            apple.eat(self);
            debug!(
                kind = ?apple.kind(),
                position = ?apple.position(),
                score = self.score,
                size = self.snake.size(),
                growth_pending = self.snake.growth_pending(),
                "apple eaten"
            );

            if !self.spawn_apple() {
                self.end(EndReason::Win);
                return false;
            }
        }

        if consumed == Some(Cell::SnakeBody) {
            self.snake.kill(&mut self.board);
            self.end(EndReason::SelfCollision);
            return false;
        }

        if !self.board.in_bounds(head) {
            self.snake.kill(&mut self.board);
            self.end(EndReason::OutOfBounds);
            return false;
        }

        true
    }

    /// Score line followed by the board, one row per line.
    pub fn render(&self) -> String {
        format!("Score: {}\n{}", self.score, self.board)
    }

    pub(crate) fn add_score(&mut self, points: u64) {
        self.score += points;
    }

    pub(crate) fn grow_snake(&mut self, segments: usize) {
        let target = self.snake.size() + segments;
        self.snake.set_size(target, &mut self.board);
    }

    pub(crate) fn scale_tick_interval(&mut self, factor: f64) {
        self.tick_interval *= factor;
    }

    fn end(&mut self, reason: EndReason) {
        info!(%reason, score = self.score, size = self.snake.size(), "game over");
        self.state = GameState::Ended(reason);
    }
}
