use std::collections::BTreeMap;
use std::sync::Arc;

use glam::IVec3;

use crate::block::{BlockId, BlockPalette};
use crate::coords::{chunk_origin, ChunkPos, SUB_CHUNK_SIZE};
use crate::volume::BlockVolume;

const SECTION_DIMS: [usize; 3] = [SUB_CHUNK_SIZE; 3];

/// A chunk column: a stack of 16³ sections sharing one block palette.
///
/// Chunks of the same world should share the same palette `Arc` so that ids from
/// neighbouring chunks refer to the same blocks.
#[derive(Clone, Debug)]
pub struct Chunk {
    pos: ChunkPos,
    palette: Arc<BlockPalette>,
    sections: BTreeMap<i32, BlockVolume>,
}

impl Chunk {
    pub fn new(pos: ChunkPos, palette: Arc<BlockPalette>) -> Self {
        Self {
            pos,
            palette,
            sections: BTreeMap::new(),
        }
    }

    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    pub fn origin(&self) -> IVec3 {
        chunk_origin(self.pos)
    }

    pub fn palette(&self) -> &Arc<BlockPalette> {
        &self.palette
    }

    pub fn shares_palette(&self, other: &Chunk) -> bool {
        Arc::ptr_eq(&self.palette, &other.palette)
    }

    /// Replaces a section. Returns the volume back if it is not 16³.
    pub fn set_section(&mut self, section_y: i32, volume: BlockVolume) -> Result<(), BlockVolume> {
        if volume.dims() != SECTION_DIMS {
            return Err(volume);
        }
        self.sections.insert(section_y, volume);
        Ok(())
    }

    pub fn section(&self, section_y: i32) -> Option<&BlockVolume> {
        self.sections.get(&section_y)
    }

    /// Sections in ascending section-y order.
    pub fn sections(&self) -> impl Iterator<Item = (i32, &BlockVolume)> {
        self.sections.iter().map(|(&cy, volume)| (cy, volume))
    }

    /// Reads a block by chunk-relative x/z and world y. Missing sections read as air;
    /// `x` or `z` outside the column gives `None`.
    pub fn get_block(&self, x: usize, y: i32, z: usize) -> Option<BlockId> {
        if x >= SUB_CHUNK_SIZE || z >= SUB_CHUNK_SIZE {
            return None;
        }
        let (section_y, local_y) = split_y(y);
        Some(
            self.sections
                .get(&section_y)
                .map_or(BlockId::AIR, |section| section.get([x, local_y, z])),
        )
    }

    /// Writes a block by chunk-relative x/z and world y, creating the section on demand.
    ///
    /// # Panics
    ///
    /// If `x` or `z` is not below [`SUB_CHUNK_SIZE`].
    pub fn set_block(&mut self, x: usize, y: i32, z: usize, block: BlockId) {
        assert!(
            x < SUB_CHUNK_SIZE && z < SUB_CHUNK_SIZE,
            "chunk column position out of bounds: x={x}, z={z}"
        );
        let (section_y, local_y) = split_y(y);
        self.sections
            .entry(section_y)
            .or_insert_with(|| BlockVolume::new_empty(SECTION_DIMS))
            .set([x, local_y, z], block);
    }
}

fn split_y(y: i32) -> (i32, usize) {
    let size = SUB_CHUNK_SIZE as i32;
    (y.div_euclid(size), y.rem_euclid(size) as usize)
}
