//! Game state engine.
//!
//! Owns the authoritative state store (players, fruits, screen bounds),
//! mutates it in response to commands, and fans the resulting events
//! out to subscribers. All handlers are synchronous: subscribers have
//! seen every event before the command call returns.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::events::{EventBus, GameEvent, SubscriptionId};
use super::player::{apply_direction, Direction, Player, Position};

/// Fruit ids are drawn uniformly from `[0, FRUIT_ID_RANGE)`.
pub const FRUIT_ID_RANGE: u32 = 10_000_000;

/// Screen bounds used for random placement and movement clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub width: u32,
    pub height: u32,
}

impl Screen {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check if a position lies within the bounds.
    pub fn contains(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// A zero-area screen cannot place anything.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A collectible fruit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fruit {
    pub x: u32,
    pub y: u32,
}

impl Fruit {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Game errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Random placement requested before the screen size was configured.
    ScreenNotConfigured,
    /// A score was recorded for a player that does not exist.
    UnknownPlayer(String),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScreenNotConfigured => {
                write!(f, "Screen size must be configured before random placement")
            }
            Self::UnknownPlayer(player_id) => {
                write!(f, "No such player: {}", player_id)
            }
        }
    }
}

impl std::error::Error for GameError {}

/// A partial state for [`Game::set_state`].
///
/// Each present key replaces the corresponding store wholesale; absent
/// keys leave the current value untouched. Last write wins, nothing is
/// validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatePatch {
    pub players: Option<HashMap<String, Player>>,
    pub fruits: Option<BTreeMap<u32, Fruit>>,
    pub screen: Option<Screen>,
}

/// A state-changing request from the transport layer.
///
/// Deserializes from the tagged wire shape clients send, e.g.
/// `{"type": "move-player", "playerId": "p1", "keyPressed": "ArrowUp"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    SetScreenSize { width: u32, height: u32 },
    #[serde(rename_all = "camelCase")]
    AddPlayer {
        player_id: String,
        player_x: Option<u32>,
        player_y: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    RemovePlayer { player_id: String },
    #[serde(rename_all = "camelCase")]
    AddFruit {
        fruit_x: Option<u32>,
        fruit_y: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    RemoveFruit { fruit_id: u32 },
    #[serde(rename_all = "camelCase")]
    MovePlayer {
        player_id: String,
        key_pressed: String,
    },
}

/// The authoritative game state engine.
///
/// One instance per game session. The engine owns the state store and
/// the subscriber list; nothing mutates the store except its own
/// handlers (and [`set_state`](Self::set_state), the wholesale merge).
#[derive(Debug)]
pub struct Game {
    /// Players indexed by caller-supplied id
    players: HashMap<String, Player>,

    /// Fruits indexed by generated id. A `BTreeMap` keeps the collision
    /// scan in ascending id order.
    fruits: BTreeMap<u32, Fruit>,

    /// Screen bounds; unset until `set_screen_size`
    screen: Option<Screen>,

    /// Subscriber callbacks
    bus: EventBus,

    /// RNG for placement and fruit ids
    rng: StdRng,

    /// When this engine was created
    pub created_at: chrono::DateTime<chrono::Utc>,

    /// When periodic spawning first started
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Game {
    /// Create an engine seeded from entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an engine with deterministic placement, for tests and
    /// replays.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            players: HashMap::new(),
            fruits: BTreeMap::new(),
            screen: None,
            bus: EventBus::new(),
            rng,
            created_at: chrono::Utc::now(),
            started_at: None,
        }
    }

    // --- Subscriptions ---

    /// Register a subscriber; it receives every subsequent event.
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.bus.subscribe(subscriber)
    }

    /// Cancel a single subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Cancel every subscription.
    pub fn unsubscribe_all(&mut self) {
        self.bus.unsubscribe_all();
    }

    /// Current subscriber count.
    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    // --- Command handlers ---

    /// Replace the screen record. Must be called before any
    /// random-placement operation.
    pub fn set_screen_size(&mut self, screen: Screen) {
        self.screen = Some(screen);
    }

    /// Shallow-merge a partial state. Present keys replace the
    /// corresponding store wholesale. No events are emitted.
    pub fn set_state(&mut self, patch: StatePatch) {
        if let Some(players) = patch.players {
            self.players = players;
        }
        if let Some(fruits) = patch.fruits {
            self.fruits = fruits;
        }
        if let Some(screen) = patch.screen {
            self.screen = Some(screen);
        }
    }

    /// Add a player, silently overwriting any existing player with the
    /// same id. Missing coordinates are rolled uniformly within the
    /// screen, independently per axis.
    pub fn add_player(
        &mut self,
        player_id: &str,
        x: Option<u32>,
        y: Option<u32>,
    ) -> Result<Position, GameError> {
        let position = self.resolve_position(x, y)?;
        self.players
            .insert(player_id.to_string(), Player::new(position.x, position.y));

        tracing::debug!(player_id, x = position.x, y = position.y, "player added");
        self.bus.notify_all(&GameEvent::AddPlayer {
            player_id: player_id.to_string(),
            player_x: position.x,
            player_y: position.y,
        });

        Ok(position)
    }

    /// Remove a player. A no-op for an unknown id, but the event is
    /// emitted regardless.
    pub fn remove_player(&mut self, player_id: &str) -> Option<Player> {
        let removed = self.players.remove(player_id);

        self.bus.notify_all(&GameEvent::RemovePlayer {
            player_id: player_id.to_string(),
        });

        removed
    }

    /// Add a fruit under a freshly rolled id. Missing coordinates are
    /// rolled uniformly within the screen. Returns the fruit id.
    pub fn add_fruit(&mut self, x: Option<u32>, y: Option<u32>) -> Result<u32, GameError> {
        let fruit_id = self.rng.gen_range(0..FRUIT_ID_RANGE);
        let position = self.resolve_position(x, y)?;
        self.fruits
            .insert(fruit_id, Fruit::new(position.x, position.y));

        tracing::debug!(fruit_id, x = position.x, y = position.y, "fruit added");
        self.bus.notify_all(&GameEvent::AddFruit {
            fruit_id,
            fruit_x: position.x,
            fruit_y: position.y,
        });

        Ok(fruit_id)
    }

    /// Remove a fruit. A no-op for an unknown id, but the event is
    /// emitted regardless.
    pub fn remove_fruit(&mut self, fruit_id: u32) -> Option<Fruit> {
        let removed = self.fruits.remove(&fruit_id);

        self.bus.notify_all(&GameEvent::RemoveFruit { fruit_id });

        removed
    }

    /// Move a player one cell and resolve fruit collisions.
    ///
    /// The raw request is echoed to subscribers first, before the key
    /// is resolved or the player looked up, so every attempt is
    /// broadcast even when nothing moves. Unknown keys, unknown
    /// players, and an unconfigured screen are no-ops after the echo.
    pub fn move_player(&mut self, player_id: &str, key_pressed: &str) -> Result<(), GameError> {
        self.bus.notify_all(&GameEvent::MovePlayer {
            player_id: player_id.to_string(),
            key_pressed: key_pressed.to_string(),
        });

        let direction = match Direction::from_key(key_pressed) {
            Some(direction) => direction,
            None => return Ok(()),
        };
        let screen = match self.screen {
            Some(screen) => screen,
            None => return Ok(()),
        };
        let player = match self.players.get_mut(player_id) {
            Some(player) => player,
            None => return Ok(()),
        };

        let moved = apply_direction(player.position(), direction, screen);
        player.x = moved.x;
        player.y = moved.y;

        self.check_fruit_collision(player_id)
    }

    /// Apply a transport-level command.
    pub fn apply(&mut self, command: Command) -> Result<(), GameError> {
        match command {
            Command::SetScreenSize { width, height } => {
                self.set_screen_size(Screen::new(width, height));
                Ok(())
            }
            Command::AddPlayer {
                player_id,
                player_x,
                player_y,
            } => self.add_player(&player_id, player_x, player_y).map(|_| ()),
            Command::RemovePlayer { player_id } => {
                self.remove_player(&player_id);
                Ok(())
            }
            Command::AddFruit { fruit_x, fruit_y } => {
                self.add_fruit(fruit_x, fruit_y).map(|_| ())
            }
            Command::RemoveFruit { fruit_id } => {
                self.remove_fruit(fruit_id);
                Ok(())
            }
            Command::MovePlayer {
                player_id,
                key_pressed,
            } => self.move_player(&player_id, &key_pressed),
        }
    }

    // --- Scoring & collision ---

    /// Record one point for a player. Only reachable through the
    /// collision scan, which has already verified the player exists.
    fn score(&mut self, player_id: &str) -> Result<(), GameError> {
        let player = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;
        player.score += 1;
        let score = player.score;

        self.bus.notify_all(&GameEvent::Score {
            player_id: player_id.to_string(),
            score,
        });

        Ok(())
    }

    /// Score and remove every fruit on the player's cell.
    ///
    /// The whole current fruit set is scanned once, in ascending id
    /// order, before anything is removed: several fruits on one cell
    /// all score within the same move.
    fn check_fruit_collision(&mut self, player_id: &str) -> Result<(), GameError> {
        let player_position = match self.players.get(player_id) {
            Some(player) => player.position(),
            None => return Ok(()),
        };

        let eaten: Vec<u32> = self
            .fruits
            .iter()
            .filter(|(_, fruit)| fruit.position() == player_position)
            .map(|(id, _)| *id)
            .collect();

        for fruit_id in eaten {
            self.score(player_id)?;
            self.remove_fruit(fruit_id);
        }

        Ok(())
    }

    // --- Read access ---

    /// Get a player.
    pub fn get_player(&self, player_id: &str) -> Option<&Player> {
        self.players.get(player_id)
    }

    /// Check if a player exists.
    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.contains_key(player_id)
    }

    /// All players with their ids.
    pub fn players(&self) -> impl Iterator<Item = (&str, &Player)> {
        self.players.iter().map(|(id, player)| (id.as_str(), player))
    }

    /// Player count.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a fruit.
    pub fn get_fruit(&self, fruit_id: u32) -> Option<&Fruit> {
        self.fruits.get(&fruit_id)
    }

    /// All fruits with their ids, in ascending id order.
    pub fn fruits(&self) -> impl Iterator<Item = (u32, &Fruit)> {
        self.fruits.iter().map(|(id, fruit)| (*id, fruit))
    }

    /// Fruit count.
    pub fn fruit_count(&self) -> usize {
        self.fruits.len()
    }

    /// Current screen bounds, if configured.
    pub fn screen(&self) -> Option<Screen> {
        self.screen
    }

    /// Convert the full store to a JSON snapshot, the payload a
    /// transport sends to a newly connected client.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "players": &self.players,
            "fruits": &self.fruits,
            "screen": &self.screen,
        })
    }

    // --- Internals ---

    /// Resolve per-axis optional coordinates, rolling missing axes
    /// uniformly within the screen. A missing or zero-area screen makes
    /// random placement impossible.
    fn resolve_position(&mut self, x: Option<u32>, y: Option<u32>) -> Result<Position, GameError> {
        if let (Some(x), Some(y)) = (x, y) {
            return Ok(Position::new(x, y));
        }

        let screen = self
            .screen
            .filter(|screen| !screen.is_empty())
            .ok_or(GameError::ScreenNotConfigured)?;

        let px = match x {
            Some(x) => x,
            None => self.rng.gen_range(0..screen.width),
        };
        let py = match y {
            Some(y) => y,
            None => self.rng.gen_range(0..screen.height),
        };
        Ok(Position::new(px, py))
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
