use std::io;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, error, trace};

use crate::snake::Direction::{self, *};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

const NO_DIRECTION: u8 = 0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Turn(Direction),
    Quit,
}

/// Maps a key press to what the player asked for; anything else is ignored.
pub fn action_for(key: &KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    match key.code {
        KeyCode::Up => Some(Action::Turn(Up)),
        KeyCode::Down => Some(Action::Turn(Down)),
        KeyCode::Left => Some(Action::Turn(Left)),
        KeyCode::Right => Some(Action::Turn(Right)),
        KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        _ => None,
    }
}

/// Hand-off between the key listener and the tick loop. Holds at most one
/// direction; publishing overwrites whatever was not taken yet.
#[derive(Debug, Default)]
pub struct InputSlot {
    direction: AtomicU8,
    quit: AtomicBool,
}

impl InputSlot {
    pub fn publish(&self, direction: Direction) {
        self.direction.store(encode(direction), Ordering::Release);
    }

    pub fn take(&self) -> Option<Direction> {
        decode(self.direction.swap(NO_DIRECTION, Ordering::AcqRel))
    }

    pub fn request_quit(&self) {
        self.quit.store(true, Ordering::Release);
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }
}

fn encode(direction: Direction) -> u8 {
    match direction {
        Up => 1,
        Down => 2,
        Left => 3,
        Right => 4,
    }
}

fn decode(value: u8) -> Option<Direction> {
    match value {
        1 => Some(Up),
        2 => Some(Down),
        3 => Some(Left),
        4 => Some(Right),
        _ => None,
    }
}

/// Background thread reading key events into an [`InputSlot`].
pub struct InputListener {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<io::Result<()>>>,
}

impl InputListener {
    pub fn spawn(slot: Arc<InputSlot>) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));

        let handle = thread::Builder::new().name("input".into()).spawn({
            let stop = Arc::clone(&stop);
            move || {
                let res = listen(&slot, &stop);
                if let Err(err) = &res {
                    error!(?err, "input listener failed");
                    // Nobody is steering anymore, end the game
                    slot.request_quit();
                }
                res
            }
        })?;

        debug!("input listener started");
        Ok(InputListener { stop, handle: Some(handle) })
    }

    /// Stops the thread and reports any error it hit while reading keys.
    pub fn stop(mut self) -> io::Result<()> {
        self.stop.store(true, Ordering::Release);

        match self.handle.take() {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "input thread panicked"))),
            None => Ok(()),
        }
    }
}

impl Drop for InputListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

fn listen(slot: &InputSlot, stop: &AtomicBool) -> io::Result<()> {
    while !stop.load(Ordering::Acquire) {
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            match action_for(&key) {
                Some(Action::Turn(direction)) => {
                    trace!(?direction, "direction published");
                    slot.publish(direction);
                }
                Some(Action::Quit) => slot.request_quit(),
                None => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_starts_empty() {
        let slot = InputSlot::default();
        assert_eq!(slot.take(), None);
        assert!(!slot.quit_requested());
    }

    #[test]
    fn test_latest_direction_wins() {
        let slot = InputSlot::default();
        slot.publish(Up);
        slot.publish(Left);
        slot.publish(Down);

        assert_eq!(slot.take(), Some(Down));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_publish_from_another_thread() {
        let slot = Arc::new(InputSlot::default());

        let producer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                slot.publish(Right);
                slot.request_quit();
            })
        };
        producer.join().unwrap();

        assert_eq!(slot.take(), Some(Right));
        assert!(slot.quit_requested());
    }

    #[test]
    fn test_key_mapping() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);

        assert_eq!(action_for(&key(KeyCode::Up)), Some(Action::Turn(Up)));
        assert_eq!(action_for(&key(KeyCode::Down)), Some(Action::Turn(Down)));
        assert_eq!(action_for(&key(KeyCode::Left)), Some(Action::Turn(Left)));
        assert_eq!(action_for(&key(KeyCode::Right)), Some(Action::Turn(Right)));
        assert_eq!(action_for(&key(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(action_for(&key(KeyCode::Char('w'))), None);
        assert_eq!(action_for(&key(KeyCode::Enter)), None);
        assert_eq!(action_for(&key(KeyCode::Char('c'))), None);
        assert_eq!(
            action_for(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_key_release_ignored() {
        let release = KeyEvent::new_with_kind(KeyCode::Up, KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(action_for(&release), None);
    }
}
