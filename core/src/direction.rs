//! Cardinal headings and the turn classification used by entity movement.

use std::f32::consts::PI;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Cardinal headings available on the tile grid.
///
/// North points toward increasing row indices (world `+z`) and East toward
/// increasing column indices (world `+x`). The discriminants advance clockwise
/// so that turning right is always "the next heading".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Heading toward increasing row indices.
    North,
    /// Heading toward increasing column indices.
    East,
    /// Heading toward decreasing row indices.
    South,
    /// Heading toward decreasing column indices.
    West,
}

/// Classification of the turn between two consecutive headings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectionChange {
    /// The heading is unchanged.
    None,
    /// The heading rotates a quarter turn clockwise.
    TurnRight,
    /// The heading rotates a quarter turn counter-clockwise.
    TurnLeft,
    /// The heading reverses.
    TurnAround,
}

impl Direction {
    /// All headings in clockwise order starting at North.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    const fn index(self) -> u8 {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    const fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Self::North,
            1 => Self::East,
            2 => Self::South,
            _ => Self::West,
        }
    }

    /// Heading angle in degrees, measured clockwise from North.
    #[must_use]
    pub fn angle(self) -> f32 {
        f32::from(self.index()) * 90.0
    }

    /// Rotation about the vertical axis that faces an entity along the heading.
    #[must_use]
    pub fn rotation(self) -> Quat {
        rotation_from_angle(self.angle())
    }

    /// Offset from a tile centre to the midpoint of the edge crossed when
    /// leaving the tile along this heading.
    #[must_use]
    pub fn half_vector(self) -> Vec3 {
        match self {
            Self::North => Vec3::new(0.0, 0.0, 0.5),
            Self::East => Vec3::new(0.5, 0.0, 0.0),
            Self::South => Vec3::new(0.0, 0.0, -0.5),
            Self::West => Vec3::new(-0.5, 0.0, 0.0),
        }
    }

    /// Column and row delta of the neighbouring tile in this heading.
    #[must_use]
    pub const fn grid_offset(self) -> (i64, i64) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }

    /// Heading pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Classifies the turn required to go from `self` to `next`.
    #[must_use]
    pub const fn change_to(self, next: Direction) -> DirectionChange {
        if self.index() == next.index() {
            DirectionChange::None
        } else if (self.index() + 1) % 4 == next.index() {
            DirectionChange::TurnRight
        } else if (self.index() + 3) % 4 == next.index() {
            DirectionChange::TurnLeft
        } else {
            DirectionChange::TurnAround
        }
    }
}

/// Rotation about the vertical axis for a heading angle in degrees.
///
/// Positive angles turn clockwise when viewed from above, so `+z` rotates
/// toward `+x`.
#[must_use]
pub fn rotation_from_angle(degrees: f32) -> Quat {
    Quat::from_rotation_y(degrees * PI / 180.0)
}
