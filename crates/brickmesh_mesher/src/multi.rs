use brickmesh_resources::ResourcePack;
use brickmesh_shared::block::{BlockId, BlockPalette};
use brickmesh_shared::volume::PaddedVolume;
use glam::IVec3;
use tracing::debug;

use crate::error::MeshError;
use crate::lod0::{create_lod0_array, ChunkGeometry};
use crate::resolve::ResolvedResources;
use crate::vertex::VERT_LEN;

/// Meshes several padded sub-volumes of one chunk, each placed at its own offset.
///
/// Every id across all sub-volumes is resolved up front, so a missing model or texture fails
/// the call before any vertex is built.
pub fn create_lod0_multi(
    pack: &dyn ResourcePack,
    palette: &BlockPalette,
    blocks: &[(PaddedVolume, IVec3)],
    vert_len: usize,
    chunk_offset: IVec3,
) -> Result<ChunkGeometry, MeshError> {
    if vert_len < VERT_LEN {
        return Err(MeshError::VertLenTooSmall { vert_len });
    }

    let unique_per_volume: Vec<Vec<BlockId>> = blocks
        .iter()
        .map(|(padded, _)| padded.unique_blocks())
        .collect();
    let mut unique: Vec<BlockId> = unique_per_volume.iter().flatten().copied().collect();
    unique.sort_unstable();
    unique.dedup();

    let resources = ResolvedResources::resolve(pack, palette, &unique)?;

    let mut geometry = ChunkGeometry::default();
    for ((padded, offset), volume_unique) in blocks.iter().zip(&unique_per_volume) {
        geometry.append(create_lod0_array(
            padded,
            volume_unique,
            &resources,
            vert_len,
            chunk_offset,
            Some(*offset),
        )?);
    }

    debug!(
        "Meshed {} sub-chunks at {:?}: {} block types, {} textures, {} opaque + {} translucent vertices",
        blocks.len(),
        chunk_offset,
        resources.model_count(),
        resources.texture_count(),
        geometry.opaque_len() / vert_len,
        geometry.translucent_len() / vert_len
    );
    Ok(geometry)
}
