use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

pub const MIN_DIMENSION: u16 = 10;
pub const MAX_DIMENSION: u16 = 100;
pub const DEFAULT_DIMENSION: u16 = 10;

/// Startup options.
#[derive(Debug, Clone, Parser)]
#[command(name = "snake", version, about = "Snake in the terminal. Arrow keys to move, Esc to quit.")]
pub struct Config {
    /// Playable board width in cells
    #[arg(long, default_value_t = DEFAULT_DIMENSION, value_parser = clap::value_parser!(u16).range(MIN_DIMENSION as i64..=MAX_DIMENSION as i64))]
    pub width: u16,

    /// Playable board height in cells
    #[arg(long, default_value_t = DEFAULT_DIMENSION, value_parser = clap::value_parser!(u16).range(MIN_DIMENSION as i64..=MAX_DIMENSION as i64))]
    pub height: u16,

    /// Ask for the board size on the console before starting
    #[arg(long)]
    pub prompt: bool,

    /// Seed for apple placement, for reproducible games
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write logs to this file, filtered with RUST_LOG
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: DEFAULT_DIMENSION,
            height: DEFAULT_DIMENSION,
            prompt: false,
            seed: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Replaces width and height with values typed in by the player.
    pub fn prompt_dimensions<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> io::Result<()> {
        self.width = prompt_dimension("Board Width", input, output)?;
        self.height = prompt_dimension("Board Height", input, output)?;
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DimensionError {
    #[error("Invalid Input!")]
    NotAnInteger,
    #[error("Please enter an integer between {min} and {max}")]
    OutOfRange { min: u16, max: u16 },
}

pub fn parse_dimension(input: &str) -> Result<u16, DimensionError> {
    let value: i64 = input.trim().parse().map_err(|_| DimensionError::NotAnInteger)?;

    if value < MIN_DIMENSION as i64 || value > MAX_DIMENSION as i64 {
        return Err(DimensionError::OutOfRange { min: MIN_DIMENSION, max: MAX_DIMENSION });
    }

    Ok(value as u16)
}

/// Keeps asking until a valid dimension is entered. Running out of input is
/// the only way out besides a valid answer.
pub fn prompt_dimension<R: BufRead, W: Write>(label: &str, input: &mut R, output: &mut W) -> io::Result<u16> {
    loop {
        write!(output, "{}: ", label)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed before a board size was given"));
        }

        match parse_dimension(&line) {
            Ok(value) => return Ok(value),
            Err(err) => writeln!(output, "{}", err)?,
        }
    }
}
