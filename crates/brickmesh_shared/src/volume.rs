use glam::IVec3;

use crate::block::BlockId;

/// Dense 3-D grid of block ids, stored x-major: `index = (x * dy + y) * dz + z`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockVolume {
    dims: [usize; 3],
    blocks: Vec<BlockId>,
}

impl BlockVolume {
    pub fn new_empty(dims: [usize; 3]) -> Self {
        Self::new_filled(dims, BlockId::AIR)
    }

    pub fn new_filled(dims: [usize; 3], block: BlockId) -> Self {
        Self {
            dims,
            blocks: vec![block; dims[0] * dims[1] * dims[2]],
        }
    }

    /// Wraps an existing x-major block array. Returns `None` if the length does not match `dims`.
    pub fn from_blocks(dims: [usize; 3], blocks: Vec<BlockId>) -> Option<Self> {
        if blocks.len() != dims[0] * dims[1] * dims[2] {
            return None;
        }
        Some(Self { dims, blocks })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn index(&self, pos: [usize; 3]) -> usize {
        linear_index(self.dims, pos)
    }

    pub fn contains(&self, pos: IVec3) -> bool {
        pos.cmpge(IVec3::ZERO).all()
            && (pos.x as usize) < self.dims[0]
            && (pos.y as usize) < self.dims[1]
            && (pos.z as usize) < self.dims[2]
    }

    pub fn get(&self, pos: [usize; 3]) -> BlockId {
        self.blocks[self.index(pos)]
    }

    pub fn get_checked(&self, pos: IVec3) -> Option<BlockId> {
        if !self.contains(pos) {
            return None;
        }
        Some(self.get([pos.x as usize, pos.y as usize, pos.z as usize]))
    }

    pub fn set(&mut self, pos: [usize; 3], block: BlockId) {
        let index = self.index(pos);
        self.blocks[index] = block;
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Sorted, deduplicated ids present in the volume.
    pub fn unique_blocks(&self) -> Vec<BlockId> {
        unique_sorted(&self.blocks)
    }
}

/// Volumes adjacent to the one being padded. Missing sides fall back to [`BlockId::AIR`].
#[derive(Clone, Copy, Debug, Default)]
pub struct VolumeNeighbors<'a> {
    pub pos_x: Option<&'a BlockVolume>,
    pub neg_x: Option<&'a BlockVolume>,
    pub pos_y: Option<&'a BlockVolume>,
    pub neg_y: Option<&'a BlockVolume>,
    pub pos_z: Option<&'a BlockVolume>,
    pub neg_z: Option<&'a BlockVolume>,
}

impl<'a> VolumeNeighbors<'a> {
    fn for_axis(&self, axis: usize, positive: bool) -> Option<&'a BlockVolume> {
        match (axis, positive) {
            (0, true) => self.pos_x,
            (0, false) => self.neg_x,
            (1, true) => self.pos_y,
            (1, false) => self.neg_y,
            (2, true) => self.pos_z,
            _ => self.neg_z,
        }
    }
}

/// A block volume surrounded by a one-cell halo on every side.
///
/// Interior cell `(x, y, z)` lives at padded position `(x + 1, y + 1, z + 1)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaddedVolume {
    interior: [usize; 3],
    blocks: Vec<BlockId>,
}

impl PaddedVolume {
    /// Pads `volume` with an air halo.
    pub fn pad(volume: &BlockVolume) -> Self {
        Self::pad_with_neighbors(volume, &VolumeNeighbors::default())
    }

    /// Pads `volume`, filling each face of the halo from the matching neighbour's boundary
    /// layer. Edge and corner halo cells, and cells a neighbour does not cover, stay air.
    pub fn pad_with_neighbors(volume: &BlockVolume, neighbors: &VolumeNeighbors<'_>) -> Self {
        let interior = volume.dims();
        let padded = padded_dims(interior);
        let mut blocks = vec![BlockId::AIR; padded[0] * padded[1] * padded[2]];

        for (index, slot) in blocks.iter_mut().enumerate() {
            let [px, py, pz] = delinearize(padded, index);
            let pos = IVec3::new(px as i32 - 1, py as i32 - 1, pz as i32 - 1);
            if let Some(block) = volume.get_checked(pos) {
                *slot = block;
                continue;
            }
            if let Some(block) = sample_halo(interior, neighbors, pos) {
                *slot = block;
            }
        }

        Self { interior, blocks }
    }

    pub fn interior_dims(&self) -> [usize; 3] {
        self.interior
    }

    pub fn padded_dims(&self) -> [usize; 3] {
        padded_dims(self.interior)
    }

    pub fn interior_len(&self) -> usize {
        self.interior[0] * self.interior[1] * self.interior[2]
    }

    #[inline]
    pub fn padded_index(&self, padded_pos: [usize; 3]) -> usize {
        linear_index(self.padded_dims(), padded_pos)
    }

    pub fn get_padded(&self, padded_pos: [usize; 3]) -> BlockId {
        self.blocks[self.padded_index(padded_pos)]
    }

    /// Reads a cell in interior coordinates; the halo is reachable at `-1` and `dims`.
    pub fn get(&self, pos: IVec3) -> Option<BlockId> {
        let padded = self.padded_dims();
        let shifted = pos + IVec3::ONE;
        if shifted.cmplt(IVec3::ZERO).any()
            || shifted.x as usize >= padded[0]
            || shifted.y as usize >= padded[1]
            || shifted.z as usize >= padded[2]
        {
            return None;
        }
        Some(self.get_padded([shifted.x as usize, shifted.y as usize, shifted.z as usize]))
    }

    /// The padded array, x-major over [`Self::padded_dims`].
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Sorted, deduplicated ids of the padded array, halo included.
    pub fn unique_blocks(&self) -> Vec<BlockId> {
        unique_sorted(&self.blocks)
    }
}

fn sample_halo(interior: [usize; 3], neighbors: &VolumeNeighbors<'_>, pos: IVec3) -> Option<BlockId> {
    let coords = pos.to_array();
    let mut outside = None;
    for axis in 0..3 {
        let value = coords[axis];
        if value < 0 || value as usize >= interior[axis] {
            if outside.is_some() {
                return None;
            }
            outside = Some((axis, value >= 0));
        }
    }

    let (axis, positive) = outside?;
    let neighbor = neighbors.for_axis(axis, positive)?;
    let mut neighbor_pos = coords;
    neighbor_pos[axis] = if positive {
        0
    } else {
        neighbor.dims()[axis] as i32 - 1
    };
    neighbor.get_checked(IVec3::from_array(neighbor_pos))
}

fn padded_dims(interior: [usize; 3]) -> [usize; 3] {
    [interior[0] + 2, interior[1] + 2, interior[2] + 2]
}

#[inline]
pub fn linear_index(dims: [usize; 3], pos: [usize; 3]) -> usize {
    debug_assert!(
        pos[0] < dims[0] && pos[1] < dims[1] && pos[2] < dims[2],
        "volume position {pos:?} out of bounds for {dims:?}"
    );
    (pos[0] * dims[1] + pos[1]) * dims[2] + pos[2]
}

#[inline]
pub fn delinearize(dims: [usize; 3], index: usize) -> [usize; 3] {
    let z = index % dims[2];
    let rest = index / dims[2];
    let y = rest % dims[1];
    let x = rest / dims[1];
    [x, y, z]
}

fn unique_sorted(blocks: &[BlockId]) -> Vec<BlockId> {
    let mut unique = blocks.to_vec();
    unique.sort_unstable();
    unique.dedup();
    unique
}
