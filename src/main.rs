mod apple;
mod board;
mod config;
mod game;
mod input;
mod snake;
mod term;

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::sleep;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::game::{EndReason, Game, GameState};
use crate::input::{InputListener, InputSlot};
use crate::term::TermManager;

const GAME_OVER_BANNER: &str = "! GAME OVER !";

enum Outcome {
    Ended(EndReason),
    Quit,
}

fn main() -> Result<()> {
    let mut config = Config::parse();
    init_logging(config.log_file.as_deref())?;

    if config.prompt {
        config
            .prompt_dimensions(&mut io::stdin().lock(), &mut io::stdout())
            .context("failed to read the board size")?;
    }

    let (width, height) = (config.width as usize, config.height as usize);
    let mut game = match config.seed {
        Some(seed) => Game::with_seed(width, height, seed),
        None => Game::new(width, height),
    };

    let mut term = TermManager::new();
    term.setup().context("failed to set up the terminal")?;

    let slot = Arc::new(InputSlot::default());
    let listener = InputListener::spawn(Arc::clone(&slot)).context("failed to start the key listener")?;

    let outcome = play(&mut game, &mut term, &slot);
    let listener_res = listener.stop();
    let outcome = outcome?;
    listener_res.context("key listener failed")?;

    let board = game.board();
    info!(
        score = game.score(),
        size = game.snake().size(),
        dead = game.snake().is_dead(),
        free_cells = board.free_cells(),
        width = board.width(),
        height = board.height(),
        "session finished"
    );

    // Quitting leaves right away; a finished game stays up until a key press
    if let Some(frame) = game_over_frame(&game, &outcome) {
        term.draw(&frame)?;
        term.read_key_blocking()?;
    }

    term.restore().context("failed to restore the terminal")?;
    Ok(())
}

fn game_over_frame(game: &Game, outcome: &Outcome) -> Option<String> {
    match outcome {
        Outcome::Ended(reason) => Some(format!("{}{}\n~ {}\n", game.render(), GAME_OVER_BANNER, reason)),
        Outcome::Quit => None,
    }
}

/// Render, sleep, update until the game ends or the player quits.
fn play(game: &mut Game, term: &mut TermManager, slot: &InputSlot) -> Result<Outcome> {
    loop {
        term.draw(&game.render())?;
        sleep(game.tick_interval());

        if slot.quit_requested() {
            return Ok(Outcome::Quit);
        }

        if let Some(direction) = slot.take() {
            game.process_input(direction);
        }

        if !game.update() {
            break;
        }
    }

    match game.state() {
        GameState::Ended(reason) => Ok(Outcome::Ended(reason)),
        GameState::Running => Ok(Outcome::Quit),
    }
}

/// The screen belongs to the game, so logs only go to a file when asked.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => return Ok(()),
    };

    let file = File::create(path).with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, Position};
    use crate::snake::Direction;

    fn finished_game() -> (Game, EndReason) {
        let mut game = Game::with_seed(10, 10, 3);
        game.process_input(Direction::Up);
        while game.update() {}

        match game.state() {
            GameState::Ended(reason) => (game, reason),
            GameState::Running => unreachable!("update only stops once the game ended"),
        }
    }

    #[test]
    fn test_game_over_frame_shows_reason() {
        let (game, reason) = finished_game();
        let frame = game_over_frame(&game, &Outcome::Ended(reason)).unwrap();

        assert!(frame.starts_with(&game.render()));
        assert!(frame.ends_with(&format!("! GAME OVER !\n~ {}\n", reason)));
    }

    #[test]
    fn test_finished_game_summary() {
        let (game, reason) = finished_game();
        let board = game.board();

        assert_eq!(reason, EndReason::OutOfBounds);
        assert!(game.snake().is_dead());
        assert_eq!((board.width(), board.height()), (10, 10));
        let taken = (0..10)
            .flat_map(|y| (0..10).map(move |x| Position::new(x, y)))
            .filter(|&position| board.get(position) != Some(Cell::Empty))
            .count();
        assert_eq!(board.free_cells(), 100 - taken);
    }

    #[test]
    fn test_quit_has_no_game_over_frame() {
        let (game, _) = finished_game();
        assert_eq!(game_over_frame(&game, &Outcome::Quit), None);
    }
}
