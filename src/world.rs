//! Block coordinates, faces, and the read-only view of the host world.

use serde::{Deserialize, Serialize};

/// Block a tilled block turns into
pub const FARMLAND: &str = "FARMLAND";
/// Block a pathed block turns into
pub const DIRT_PATH: &str = "DIRT_PATH";

/// Integer block coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Side of a block the actor was facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Up,
    Down,
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
    /// The host could not determine a face
    Unknown,
}

impl Face {
    /// Get face name for display
    pub fn name(&self) -> &'static str {
        match self {
            Face::Up => "up",
            Face::Down => "down",
            Face::North => "north",
            Face::South => "south",
            Face::East => "east",
            Face::West => "west",
            Face::NorthEast => "northeast",
            Face::NorthWest => "northwest",
            Face::SouthEast => "southeast",
            Face::SouthWest => "southwest",
            Face::Unknown => "unknown",
        }
    }

    /// Parse face from string
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_lowercase().replace('_', "");
        match s.as_str() {
            "u" | "up" => Some(Face::Up),
            "d" | "down" => Some(Face::Down),
            "n" | "north" => Some(Face::North),
            "s" | "south" => Some(Face::South),
            "e" | "east" => Some(Face::East),
            "w" | "west" => Some(Face::West),
            "ne" | "northeast" => Some(Face::NorthEast),
            "nw" | "northwest" => Some(Face::NorthWest),
            "se" | "southeast" => Some(Face::SouthEast),
            "sw" | "southwest" => Some(Face::SouthWest),
            "self" | "unknown" => Some(Face::Unknown),
            _ => None,
        }
    }
}

/// Read access to block identities in the host world
pub trait BlockSource {
    /// Block identity at a position, `None` if the position is not loaded
    fn block_at(&self, pos: BlockPos) -> Option<String>;
}

/// Air variants never count as breakable
pub fn is_air(block: &str) -> bool {
    matches!(block, "AIR" | "CAVE_AIR" | "VOID_AIR")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_face() {
        assert_eq!(Face::parse("UP"), Some(Face::Up));
        assert_eq!(Face::parse("north_east"), Some(Face::NorthEast));
        assert_eq!(Face::parse("w"), Some(Face::West));
        assert_eq!(Face::parse("sideways"), None);
    }

    #[test]
    fn test_air() {
        assert!(is_air("CAVE_AIR"));
        assert!(!is_air("STONE"));
    }
}
