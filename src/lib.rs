//! FruitGrid State Library
//!
//! This crate provides state management for FruitGrid game logic.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Game Engine** - The authoritative state store (players, fruits,
//!   screen bounds) with synchronous command handlers and collision
//!   detection.
//!
//! - **Event Notification** - An ordered subscriber list that receives
//!   every state-changing event, synchronously, from within the command
//!   that produced it.
//!
//! - **Spawn Scheduling** - A cancellable periodic timer that drops a
//!   fruit at a random in-bounds cell.
//!
//! # Design Principles
//!
//! 1. **Commands are validated at the boundary** - Transport input
//!    arrives as a tagged [`state::Command`] union, not loose maps.
//!
//! 2. **Events fan out in subscription order** - Subscribers see every
//!    event, in order, before the command call returns.
//!
//! 3. **No networking** - This crate is pure state plus one timer
//!    thread; any transport can drive it.
//!
//! 4. **Serialization-ready** - Commands, events, and the full state
//!    snapshot all convert to JSON for clients.
//!
//! # Example
//!
//! ```rust
//! use fruitgrid_state::state::{Game, Screen};
//!
//! let mut game = Game::new();
//! game.set_screen_size(Screen::new(10, 10));
//!
//! // Watch state changes as they happen
//! game.subscribe(|event| println!("{:?}", event));
//!
//! game.add_player("alice", Some(0), Some(0)).unwrap();
//! game.move_player("alice", "ArrowRight").unwrap();
//!
//! assert_eq!(game.get_player("alice").unwrap().x, 1);
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
