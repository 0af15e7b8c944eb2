//! Periodic fruit spawning.
//!
//! A background thread that calls [`Game::add_fruit`] with random
//! placement on a fixed interval. The thread shares the engine through
//! a mutex, so a spawn tick is serialized with external commands and
//! performs the same mutate-then-notify sequence they do.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use super::game::Game;

/// Default spawn interval (5 seconds).
pub const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_millis(5000);

/// Handle to one running spawn timer.
///
/// Each handle owns one timer thread; starting two schedulers over the
/// same game yields two independent timers. Dropping the handle stops
/// the thread.
#[derive(Debug)]
pub struct SpawnScheduler {
    stop_tx: mpsc::Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SpawnScheduler {
    /// Start spawning fruit on `game` every `interval`.
    ///
    /// A tick that finds the screen unconfigured logs a warning and
    /// skips the spawn; the timer keeps running.
    pub fn start(game: Arc<Mutex<Game>>, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel();

        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if let Err(err) = game.lock().add_fruit(None, None) {
                        tracing::warn!(error = %err, "fruit spawn skipped");
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        tracing::info!(interval_ms = interval.as_millis() as u64, "spawn scheduler started");

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Stop the timer and wait for its thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SpawnScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::events::GameEvent;
    use crate::state::game::Screen;

    #[test]
    fn test_spawns_fruit_on_interval() {
        let game = Arc::new(Mutex::new(Game::with_seed(7)));
        let events = Arc::new(Mutex::new(Vec::new()));
        {
            let mut game = game.lock();
            game.set_screen_size(Screen::new(10, 10));
            let sink = events.clone();
            game.subscribe(move |event: &GameEvent| sink.lock().push(event.clone()));
        }

        let scheduler = SpawnScheduler::start(game.clone(), Duration::from_millis(10));
        thread::sleep(Duration::from_millis(100));
        scheduler.stop();

        let events = events.lock();
        let spawned = events
            .iter()
            .filter(|event| matches!(event, GameEvent::AddFruit { .. }))
            .count();
        assert!(spawned >= 1, "expected at least one spawn, got {}", spawned);

        let game = game.lock();
        assert!(game.fruit_count() >= 1);
        assert!(game.fruits().all(|(_, fruit)| fruit.x < 10 && fruit.y < 10));
    }

    #[test]
    fn test_stop_halts_spawning() {
        let game = Arc::new(Mutex::new(Game::with_seed(11)));
        game.lock().set_screen_size(Screen::new(8, 8));

        let scheduler = SpawnScheduler::start(game.clone(), Duration::from_millis(10));
        thread::sleep(Duration::from_millis(50));
        scheduler.stop();

        // stop() joins the thread, so the count is frozen afterwards
        let frozen = game.lock().fruit_count();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(game.lock().fruit_count(), frozen);
    }

    #[test]
    fn test_survives_unconfigured_screen() {
        let game = Arc::new(Mutex::new(Game::new()));

        let scheduler = SpawnScheduler::start(game.clone(), Duration::from_millis(10));
        thread::sleep(Duration::from_millis(50));
        scheduler.stop();

        assert_eq!(game.lock().fruit_count(), 0);
    }

    #[test]
    fn test_drop_stops_the_timer() {
        let game = Arc::new(Mutex::new(Game::with_seed(5)));
        game.lock().set_screen_size(Screen::new(8, 8));

        {
            let _scheduler = SpawnScheduler::start(game.clone(), Duration::from_millis(10));
            thread::sleep(Duration::from_millis(30));
        }

        let frozen = game.lock().fruit_count();
        thread::sleep(Duration::from_millis(40));
        assert_eq!(game.lock().fruit_count(), frozen);
    }
}
