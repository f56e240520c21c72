use glam::IVec3;
use serde::{Deserialize, Serialize};

pub const SUB_CHUNK_SIZE: usize = 16;

/// Horizontal position of a chunk column, in chunk units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// The six axis directions a block face can point in.
///
/// North is -Z and east is +X.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Down,
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn delta(self) -> IVec3 {
        match self {
            Direction::Up => IVec3::Y,
            Direction::Down => IVec3::NEG_Y,
            Direction::North => IVec3::NEG_Z,
            Direction::South => IVec3::Z,
            Direction::East => IVec3::X,
            Direction::West => IVec3::NEG_X,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

/// World-space origin of a chunk column.
pub fn chunk_origin(chunk_pos: ChunkPos) -> IVec3 {
    let size = SUB_CHUNK_SIZE as i32;
    IVec3::new(chunk_pos.x * size, 0, chunk_pos.z * size)
}

/// Offset of a section relative to its chunk origin.
pub fn section_offset(section_y: i32) -> IVec3 {
    IVec3::new(0, section_y * SUB_CHUNK_SIZE as i32, 0)
}
