//! Face culling and vertex emission for one padded sub-volume.

use std::borrow::Cow;
use std::collections::BTreeMap;

use bitvec::vec::BitVec;
use brickmesh_resources::{BlockModel, CullDir, FaceGeometry};
use brickmesh_shared::block::BlockId;
use brickmesh_shared::coords::Direction;
use brickmesh_shared::volume::{delinearize, linear_index, PaddedVolume};
use glam::IVec3;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::MeshError;
use crate::resolve::ResolvedResources;
use crate::shading::{brightness_multiplier, shade};
use crate::vertex::{ChunkVertex, VERT_LEN};

/// Packed vertex tables, one per (block type, cull direction) that produced triangles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkGeometry {
    pub opaque: Vec<Vec<f32>>,
    pub translucent: Vec<Vec<f32>>,
}

impl ChunkGeometry {
    pub fn append(&mut self, mut other: ChunkGeometry) {
        self.opaque.append(&mut other.opaque);
        self.translucent.append(&mut other.translucent);
    }

    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.translucent.is_empty()
    }

    pub fn opaque_len(&self) -> usize {
        self.opaque.iter().map(Vec::len).sum()
    }

    pub fn translucent_len(&self) -> usize {
        self.translucent.iter().map(Vec::len).sum()
    }
}

/// Per-direction face visibility over the interior cells of a padded volume.
pub struct VisibilityMasks {
    masks: [BitVec; 6],
}

impl VisibilityMasks {
    pub fn compute(padded: &PaddedVolume, classes: &[u8]) -> Self {
        let interior = padded.interior_dims();
        let padded_dims = padded.padded_dims();
        let mut masks: [BitVec; 6] =
            std::array::from_fn(|_| BitVec::repeat(false, padded.interior_len()));

        for index in 0..padded.interior_len() {
            let [x, y, z] = delinearize(interior, index);
            let center = IVec3::new(x as i32 + 1, y as i32 + 1, z as i32 + 1);
            let center_class = classes[linear_index(padded_dims, to_index(center))];
            for direction in Direction::ALL {
                let neighbor = to_index(center + direction.delta());
                let neighbor_class = classes[linear_index(padded_dims, neighbor)];
                masks[direction.index()].set(index, face_visible(center_class, neighbor_class));
            }
        }

        Self { masks }
    }

    pub fn is_visible(&self, direction: Direction, index: usize) -> bool {
        self.masks[direction.index()][index]
    }

    pub fn visible_count(&self, direction: Direction) -> usize {
        self.masks[direction.index()].count_ones()
    }
}

/// A face shows when its neighbour is see-through, unless both are translucent-distinct.
#[inline]
pub fn face_visible(center: u8, neighbor: u8) -> bool {
    neighbor != 0 && !(neighbor == 1 && neighbor == center)
}

fn to_index(pos: IVec3) -> [usize; 3] {
    [pos.x as usize, pos.y as usize, pos.z as usize]
}

/// Builds the vertex tables for the interior of `padded`.
///
/// `unique_blocks` must list every id in the padded array, halo included. Emitted positions
/// are `model vertex + cell + chunk_offset + sub_chunk_offset`.
pub fn create_lod0_array(
    padded: &PaddedVolume,
    unique_blocks: &[BlockId],
    resources: &ResolvedResources,
    vert_len: usize,
    chunk_offset: IVec3,
    sub_chunk_offset: Option<IVec3>,
) -> Result<ChunkGeometry, MeshError> {
    if vert_len < VERT_LEN {
        return Err(MeshError::VertLenTooSmall { vert_len });
    }
    let base_offset = chunk_offset + sub_chunk_offset.unwrap_or(IVec3::ZERO);

    let classes = classify_transparency(padded, unique_blocks, resources)?;
    let masks = VisibilityMasks::compute(padded, &classes);
    let groups = group_by_block(padded);

    let mut geometry = ChunkGeometry::default();
    for (&block, cells) in &groups {
        let model = resources.model(block)?;
        for (&cull, face) in &model.faces {
            let selected: Cow<'_, [usize]> = match cull.direction() {
                None => Cow::Borrowed(cells),
                Some(direction) => Cow::Owned(
                    cells
                        .iter()
                        .copied()
                        .filter(|&index| masks.is_visible(direction, index))
                        .collect(),
                ),
            };
            if selected.is_empty() || face.triangles.is_empty() {
                continue;
            }

            let emit = FaceEmit {
                model,
                face,
                cull,
                interior: padded.interior_dims(),
                base_offset,
                vert_len,
            };
            let table = emit.build(&selected, resources)?;
            if model.transparency.is_opaque() {
                geometry.opaque.push(table);
            } else {
                geometry.translucent.push(table);
            }
        }
    }

    debug!(
        "lod0: {} block types, {} opaque floats, {} translucent floats",
        groups.len(),
        geometry.opaque_len(),
        geometry.translucent_len()
    );
    Ok(geometry)
}

fn classify_transparency(
    padded: &PaddedVolume,
    unique_blocks: &[BlockId],
    resources: &ResolvedResources,
) -> Result<Vec<u8>, MeshError> {
    let mut classes = FxHashMap::default();
    for &block in unique_blocks {
        classes.insert(block, resources.model(block)?.transparency.as_u8());
    }
    padded
        .blocks()
        .iter()
        .map(|block| {
            classes
                .get(block)
                .copied()
                .ok_or(MeshError::MissingModel(*block))
        })
        .collect()
}

/// Interior cell indices keyed by block id, in linear order within each id.
fn group_by_block(padded: &PaddedVolume) -> BTreeMap<BlockId, Vec<usize>> {
    let interior = padded.interior_dims();
    let mut groups: BTreeMap<BlockId, Vec<usize>> = BTreeMap::new();
    for index in 0..padded.interior_len() {
        let [x, y, z] = delinearize(interior, index);
        let block = padded.get_padded([x + 1, y + 1, z + 1]);
        groups.entry(block).or_default().push(index);
    }
    groups
}

struct FaceEmit<'a> {
    model: &'a BlockModel,
    face: &'a FaceGeometry,
    cull: CullDir,
    interior: [usize; 3],
    base_offset: IVec3,
    vert_len: usize,
}

impl FaceEmit<'_> {
    fn build(&self, cells: &[usize], resources: &ResolvedResources) -> Result<Vec<f32>, MeshError> {
        // Texture indices were validated when the model was resolved.
        let triangle_bounds = self
            .face
            .texture_index
            .iter()
            .map(|&texture| {
                resources
                    .texture_bounds(&self.model.textures[texture])
                    .map(|bounds| bounds.to_array())
            })
            .collect::<Result<Vec<_>, _>>()?;
        let multiplier = brightness_multiplier(self.cull);

        let mut table = vec![0.0f32; cells.len() * self.face.vertex_count() * self.vert_len];
        let mut records = table.chunks_exact_mut(self.vert_len);
        for &cell in cells {
            let [x, y, z] = delinearize(self.interior, cell);
            let origin = (self.base_offset + IVec3::new(x as i32, y as i32, z as i32)).as_vec3();
            for (triangle, corners) in self.face.triangles.iter().enumerate() {
                for &corner in corners {
                    let corner = corner as usize;
                    let local = self.face.verts[corner];
                    let position = [
                        local[0] + origin.x,
                        local[1] + origin.y,
                        local[2] + origin.z,
                    ];
                    let vertex = ChunkVertex {
                        position,
                        tex_coord: self.face.tex_coords[corner],
                        tex_bounds: triangle_bounds[triangle],
                        tint: shade(self.face.tint_verts[corner], multiplier, position[1]),
                    };
                    if let Some(record) = records.next() {
                        vertex.write(record);
                    }
                }
            }
        }
        Ok(table)
    }
}
