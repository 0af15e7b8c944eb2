//! Player records and grid movement.
//!
//! Movement resolves a browser key name to one of four directions and
//! applies a single-cell step clamped at the screen edges.

use serde::{Deserialize, Serialize};

use super::game::Screen;

/// A grid cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// A player on the grid.
///
/// Serializes as `{"x": .., "y": .., "score": ..}`, the shape clients
/// read out of state snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub x: u32,
    pub y: u32,
    pub score: u32,
}

impl Player {
    /// Create a player at a position with zero score.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y, score: 0 }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// The four movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Resolve a browser key name. Anything other than the four arrow
    /// keys is not a move.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Self::Up),
            "ArrowRight" => Some(Self::Right),
            "ArrowDown" => Some(Self::Down),
            "ArrowLeft" => Some(Self::Left),
            _ => None,
        }
    }

    /// Key name for this direction.
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Up => "ArrowUp",
            Self::Right => "ArrowRight",
            Self::Down => "ArrowDown",
            Self::Left => "ArrowLeft",
        }
    }
}

/// Apply a single-cell move, clamped at the screen edges.
///
/// A step into a wall is absorbed: the returned position equals the
/// input whenever the step would leave `[0, width) x [0, height)`.
pub fn apply_direction(position: Position, direction: Direction, screen: Screen) -> Position {
    let Position { x, y } = position;
    let stepped = match direction {
        Direction::Up => y.checked_sub(1).map(|y| Position::new(x, y)),
        Direction::Right => x.checked_add(1).map(|x| Position::new(x, y)),
        Direction::Down => y.checked_add(1).map(|y| Position::new(x, y)),
        Direction::Left => x.checked_sub(1).map(|x| Position::new(x, y)),
    };
    match stepped {
        Some(stepped) if screen.contains(stepped) => stepped,
        _ => position,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SCREEN: Screen = Screen {
        width: 5,
        height: 5,
    };

    #[test]
    fn test_direction_from_key() {
        assert_eq!(Direction::from_key("ArrowUp"), Some(Direction::Up));
        assert_eq!(Direction::from_key("ArrowRight"), Some(Direction::Right));
        assert_eq!(Direction::from_key("ArrowDown"), Some(Direction::Down));
        assert_eq!(Direction::from_key("ArrowLeft"), Some(Direction::Left));

        assert_eq!(Direction::from_key("Enter"), None);
        assert_eq!(Direction::from_key("arrowup"), None); // case sensitive
        assert_eq!(Direction::from_key(""), None);
    }

    #[test]
    fn test_key_round_trip() {
        for direction in [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ] {
            assert_eq!(Direction::from_key(direction.as_key()), Some(direction));
        }
    }

    #[test]
    fn test_moves_in_interior() {
        let center = Position::new(2, 2);
        assert_eq!(
            apply_direction(center, Direction::Up, SCREEN),
            Position::new(2, 1)
        );
        assert_eq!(
            apply_direction(center, Direction::Right, SCREEN),
            Position::new(3, 2)
        );
        assert_eq!(
            apply_direction(center, Direction::Down, SCREEN),
            Position::new(2, 3)
        );
        assert_eq!(
            apply_direction(center, Direction::Left, SCREEN),
            Position::new(1, 2)
        );
    }

    #[test]
    fn test_walls_absorb_moves() {
        let origin = Position::new(0, 0);
        assert_eq!(apply_direction(origin, Direction::Up, SCREEN), origin);
        assert_eq!(apply_direction(origin, Direction::Left, SCREEN), origin);

        let corner = Position::new(4, 4);
        assert_eq!(apply_direction(corner, Direction::Right, SCREEN), corner);
        assert_eq!(apply_direction(corner, Direction::Down, SCREEN), corner);
    }

    #[test]
    fn test_moves_never_leave_bounds() {
        for x in 0..SCREEN.width {
            for y in 0..SCREEN.height {
                for direction in [
                    Direction::Up,
                    Direction::Right,
                    Direction::Down,
                    Direction::Left,
                ] {
                    let moved = apply_direction(Position::new(x, y), direction, SCREEN);
                    assert!(moved.x < SCREEN.width && moved.y < SCREEN.height);
                }
            }
        }
    }

    #[test]
    fn test_degenerate_screen_absorbs_everything() {
        let screen = Screen {
            width: 1,
            height: 1,
        };
        let origin = Position::new(0, 0);
        for direction in [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ] {
            assert_eq!(apply_direction(origin, direction, screen), origin);
        }
    }

    #[test]
    fn test_player_new_starts_at_zero_score() {
        let player = Player::new(3, 4);
        assert_eq!(player.score, 0);
        assert_eq!(player.position(), Position::new(3, 4));
    }
}
