//! Grid geometry: positions, sides, level sizes, level types and tile references

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::value_objects::ResourceType;
use crate::DomainError;

/// A position on a level's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn translate(self, side: Side) -> Self {
        let (dx, dy) = side.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance; the number of 4-directional steps between two positions.
    pub fn distance_to(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// All four adjacent positions, in `Side::ALL` order. Not bounds-checked.
    pub fn neighbours(self) -> [Position; 4] {
        Side::ALL.map(|side| self.translate(side))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

impl FromStr for Side {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Self::North),
            "e" | "east" => Ok(Self::East),
            "s" | "south" => Ok(Self::South),
            "w" | "west" => Ok(Self::West),
            other => Err(DomainError::parse(format!("Unknown side: {other}"))),
        }
    }
}

/// Dimensions of every level in a game. Valid by construction: both sides are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    width: u32,
    height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::validation(format!(
                "level size must be positive, got {width}x{height}"
            )));
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(DomainError::validation(format!(
                "level size {width}x{height} exceeds the addressable grid"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    /// Row-major index of a position, if it lies on the grid.
    pub fn index_of(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.y as usize * self.width as usize + position.x as usize)
    }

    pub fn position_of(&self, index: usize) -> Position {
        let width = self.width as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Vertical layer of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelType {
    Ground,
    Sky,
    Space,
}

impl LevelType {
    pub const ALL: [LevelType; 3] = [LevelType::Ground, LevelType::Sky, LevelType::Space];

    pub fn index(self) -> usize {
        match self {
            Self::Ground => 0,
            Self::Sky => 1,
            Self::Space => 2,
        }
    }

    pub fn supported_resources(self) -> &'static [ResourceType] {
        match self {
            Self::Ground => &[ResourceType::Metals, ResourceType::Silicon],
            Self::Sky => &[ResourceType::Fuel],
            Self::Space => &[ResourceType::Silicon, ResourceType::Radioactive],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ground => "ground",
            Self::Sky => "sky",
            Self::Space => "space",
        }
    }
}

impl fmt::Display for LevelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LevelType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ground" => Ok(Self::Ground),
            "sky" => Ok(Self::Sky),
            "space" => Ok(Self::Space),
            other => Err(DomainError::parse(format!("Unknown level type: {other}"))),
        }
    }
}

/// Identity of a tile: its level and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileRef {
    pub level: LevelType,
    pub position: Position,
}

impl TileRef {
    pub const fn new(level: LevelType, position: Position) -> Self {
        Self { level, position }
    }

    /// The tile at the same position on another level.
    pub fn on_level(self, level: LevelType) -> Self {
        Self::new(level, self.position)
    }

    pub fn neighbour(self, side: Side) -> Self {
        Self::new(self.level, self.position.translate(side))
    }

    /// Planar distance, ignoring levels.
    pub fn distance_to(self, other: TileRef) -> u32 {
        self.position.distance_to(other.position)
    }
}

impl fmt::Display for TileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.level, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_rejects_zero_dimensions() {
        assert!(Size::new(0, 10).is_err());
        assert!(Size::new(10, 0).is_err());
        assert!(Size::new(3, 2).is_ok());
    }

    #[test]
    fn size_indexing_is_row_major() {
        let size = Size::new(3, 2).expect("valid size");
        assert_eq!(size.index_of(Position::new(2, 1)), Some(5));
        assert_eq!(size.index_of(Position::new(3, 0)), None);
        assert_eq!(size.index_of(Position::new(-1, 0)), None);
        assert_eq!(size.position_of(5), Position::new(2, 1));
    }

    #[test]
    fn distance_is_manhattan() {
        assert_eq!(Position::new(0, 0).distance_to(Position::new(2, -3)), 5);
        let a = TileRef::new(LevelType::Ground, Position::new(1, 1));
        assert_eq!(a.distance_to(a.on_level(LevelType::Sky)), 0);
    }

    #[test]
    fn neighbours_follow_sides() {
        let around = Position::new(5, 5).neighbours();
        assert_eq!(
            around,
            [
                Position::new(5, 4),
                Position::new(6, 5),
                Position::new(5, 6),
                Position::new(4, 5),
            ]
        );
    }

    #[test]
    fn parse_level_and_side() {
        assert_eq!("Sky".parse::<LevelType>(), Ok(LevelType::Sky));
        assert_eq!("w".parse::<Side>(), Ok(Side::West));
        assert!("up".parse::<Side>().is_err());
    }
}
