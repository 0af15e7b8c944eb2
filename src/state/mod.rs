//! State management module for FruitGrid.
//!
//! This module provides the core state types:
//!
//! - `game` - The state engine (players, fruits, screen, commands)
//! - `player` - Player records and grid movement
//! - `events` - Event notification to subscribers
//! - `scheduler` - Periodic fruit spawning
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         GameSession                          │
//! │                                                              │
//! │  ┌───────────────────────────┐    ┌───────────────────────┐  │
//! │  │       Game (engine)       │    │    SpawnScheduler     │  │
//! │  │                           │    │                       │  │
//! │  │  player_id → Player       │◀───│  add_fruit on a       │  │
//! │  │  fruit_id  → Fruit        │    │  fixed interval       │  │
//! │  │  screen bounds            │    └───────────────────────┘  │
//! │  │                           │                               │
//! │  │  EventBus ────────────────┼──▶  subscribers, invoked      │
//! │  │  (ordered callbacks)      │     in subscription order     │
//! │  └───────────────────────────┘                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Control flow: a transport invokes a command handler (directly or via
//! [`Game::apply`]) → the handler mutates the store → the handler fans
//! the resulting event out to every subscriber, synchronously, before
//! returning.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fruitgrid_state::state::{Command, GameSession, Screen};
//!
//! let mut session = GameSession::new();
//! {
//!     let game = session.game();
//!     let mut game = game.lock();
//!     game.set_screen_size(Screen::new(20, 20));
//!     game.subscribe(|event| broadcast_to_clients(event));
//!     game.apply(Command::AddPlayer {
//!         player_id: "alice".into(),
//!         player_x: None,
//!         player_y: None,
//!     })?;
//! }
//!
//! // Begin dropping a fruit every five seconds
//! session.start();
//! ```

pub mod events;
pub mod game;
pub mod player;
pub mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

// Re-export commonly used types
pub use events::{EventBus, GameEvent, Subscriber, SubscriptionId};
pub use game::{Command, Fruit, Game, GameError, Screen, StatePatch, FRUIT_ID_RANGE};
pub use player::{apply_direction, Direction, Player, Position};
pub use scheduler::{SpawnScheduler, DEFAULT_SPAWN_INTERVAL};

/// A game engine plus its spawn timers.
///
/// This is an optional convenience struct that ties scheduler lifetime
/// to the session. You can also use [`Game`] and [`SpawnScheduler`]
/// directly.
#[derive(Debug)]
pub struct GameSession {
    game: Arc<Mutex<Game>>,
    spawners: Vec<SpawnScheduler>,
}

impl GameSession {
    pub fn new() -> Self {
        Self::from_game(Game::new())
    }

    /// Session with deterministic placement, for tests and replays.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_game(Game::with_seed(seed))
    }

    fn from_game(game: Game) -> Self {
        Self {
            game: Arc::new(Mutex::new(game)),
            spawners: Vec::new(),
        }
    }

    /// Shared handle to the engine.
    pub fn game(&self) -> Arc<Mutex<Game>> {
        self.game.clone()
    }

    /// Start a spawn timer at the default interval.
    ///
    /// Not idempotent: every call adds one more independent timer.
    pub fn start(&mut self) {
        self.start_with_interval(DEFAULT_SPAWN_INTERVAL);
    }

    /// Start a spawn timer at a custom interval.
    pub fn start_with_interval(&mut self, interval: Duration) {
        self.game
            .lock()
            .started_at
            .get_or_insert_with(chrono::Utc::now);
        self.spawners
            .push(SpawnScheduler::start(self.game.clone(), interval));
    }

    /// Stop every spawn timer. Also happens on drop.
    pub fn stop(&mut self) {
        self.spawners.clear();
    }

    /// Number of running spawn timers.
    pub fn spawner_count(&self) -> usize {
        self.spawners.len()
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
