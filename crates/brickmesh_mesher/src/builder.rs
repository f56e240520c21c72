use std::ops::Range;

use brickmesh_resources::{AtlasHandle, ResourcePack};
use brickmesh_shared::block::BlockId;
use brickmesh_shared::chunk::Chunk;
use brickmesh_shared::volume::{BlockVolume, PaddedVolume, VolumeNeighbors};
use glam::IVec3;

use crate::error::MeshError;
use crate::lod0::ChunkGeometry;
use crate::multi;
use crate::vertex::{vertices, ChunkVertex, VERT_LEN};

/// Pads `blocks` with an air halo and lists the ids of the padded array.
pub fn get_block_data(blocks: &BlockVolume) -> (PaddedVolume, Vec<BlockId>) {
    get_block_data_with_neighbors(blocks, &VolumeNeighbors::default())
}

/// Like [`get_block_data`], with the halo filled from neighbouring volumes where present.
pub fn get_block_data_with_neighbors(
    blocks: &BlockVolume,
    neighbors: &VolumeNeighbors<'_>,
) -> (PaddedVolume, Vec<BlockId>) {
    let padded = PaddedVolume::pad_with_neighbors(blocks, neighbors);
    let unique = padded.unique_blocks();
    (padded, unique)
}

/// Final vertex buffer of one chunk: opaque records first, translucent records after.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMesh {
    context_identifier: String,
    texture: AtlasHandle,
    vert_len: usize,
    verts: Vec<f32>,
    verts_translucent: usize,
    draw_count: usize,
}

impl ChunkMesh {
    pub fn new(
        context_identifier: &str,
        resource_pack: &dyn ResourcePack,
        vert_len: usize,
    ) -> Result<Self, MeshError> {
        if vert_len < VERT_LEN {
            return Err(MeshError::VertLenTooSmall { vert_len });
        }
        Ok(Self {
            context_identifier: context_identifier.to_string(),
            texture: resource_pack.atlas_id(context_identifier),
            vert_len,
            verts: Self::new_empty_verts(),
            verts_translucent: 0,
            draw_count: 0,
        })
    }

    /// The buffer used when a build produced no opaque tables.
    pub fn new_empty_verts() -> Vec<f32> {
        Vec::new()
    }

    /// Replaces the buffers with `geometry`.
    pub fn set_verts(&mut self, geometry: ChunkGeometry) {
        let mut verts = if geometry.opaque.is_empty() {
            Self::new_empty_verts()
        } else {
            geometry.opaque.concat()
        };
        self.verts_translucent = verts.len();
        verts.reserve(geometry.translucent_len());
        for table in &geometry.translucent {
            verts.extend_from_slice(table);
        }
        self.draw_count = verts.len() / self.vert_len;
        self.verts = verts;
    }

    pub fn rebind_atlas(&mut self, resource_pack: &dyn ResourcePack) {
        self.texture = resource_pack.atlas_id(&self.context_identifier);
    }

    pub fn context_identifier(&self) -> &str {
        &self.context_identifier
    }

    pub fn texture(&self) -> AtlasHandle {
        self.texture
    }

    pub fn vert_len(&self) -> usize {
        self.vert_len
    }

    pub fn verts(&self) -> &[f32] {
        &self.verts
    }

    /// Float offset where translucent records begin.
    pub fn translucent_start(&self) -> usize {
        self.verts_translucent
    }

    /// Vertex count of the whole buffer.
    pub fn draw_count(&self) -> usize {
        self.draw_count
    }

    pub fn is_empty(&self) -> bool {
        self.draw_count == 0
    }

    /// Opaque vertices, in vertex units.
    pub fn opaque_range(&self) -> Range<usize> {
        0..self.verts_translucent / self.vert_len
    }

    /// Translucent vertices, in vertex units.
    pub fn translucent_range(&self) -> Range<usize> {
        self.verts_translucent / self.vert_len..self.draw_count
    }

    pub fn vertices(&self) -> impl Iterator<Item = ChunkVertex> + '_ {
        vertices(&self.verts, self.vert_len)
    }

    /// The buffer as raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.verts)
    }
}

/// A chunk that can build its own [`ChunkMesh`].
///
/// Implementors supply the source chunk, its world offset, the resource pack and the mesh
/// storage; the provided methods run the mesher and install the result.
pub trait RenderChunkBuilder {
    fn chunk(&self) -> &Chunk;

    /// World-space origin of [`Self::chunk`].
    fn offset(&self) -> IVec3;

    fn resource_pack(&self) -> &dyn ResourcePack;

    fn mesh(&self) -> &ChunkMesh;

    fn mesh_mut(&mut self) -> &mut ChunkMesh;

    /// Rebuilds the mesh from the current chunk contents.
    fn create_geometry(&mut self) -> Result<(), MeshError>;

    fn create_lod0_multi(
        &self,
        blocks: &[(PaddedVolume, IVec3)],
    ) -> Result<ChunkGeometry, MeshError> {
        multi::create_lod0_multi(
            self.resource_pack(),
            self.chunk().palette(),
            blocks,
            self.mesh().vert_len(),
            self.offset(),
        )
    }

    fn set_verts(&mut self, geometry: ChunkGeometry) {
        self.mesh_mut().set_verts(geometry);
    }
}

#[cfg(test)]
mod tests {
    use brickmesh_resources::{AtlasHandle, StaticResourcePack};
    use brickmesh_shared::block::BlockId;
    use brickmesh_shared::volume::{BlockVolume, VolumeNeighbors};

    use super::{get_block_data, get_block_data_with_neighbors, ChunkMesh};
    use crate::error::MeshError;
    use crate::lod0::ChunkGeometry;
    use crate::testing::fixture;
    use crate::vertex::VERT_LEN;

    fn records(count: usize, value: f32) -> Vec<f32> {
        vec![value; count * VERT_LEN]
    }

    #[test]
    fn block_data_pads_with_air_and_lists_ids() {
        let fixture = fixture();
        let mut volume = BlockVolume::new_filled([2, 2, 2], fixture.stone);
        volume.set([0, 0, 0], fixture.glass);

        let (padded, unique) = get_block_data(&volume);
        assert_eq!(padded.padded_dims(), [4, 4, 4]);
        assert_eq!(unique, vec![BlockId::AIR, fixture.stone, fixture.glass]);

        let water = BlockVolume::new_filled([2, 2, 2], fixture.water);
        let neighbors = VolumeNeighbors {
            pos_y: Some(&water),
            ..VolumeNeighbors::default()
        };
        let (padded, unique) = get_block_data_with_neighbors(&volume, &neighbors);
        assert_eq!(padded.get_padded([1, 3, 1]), fixture.water);
        assert!(unique.contains(&fixture.water));
    }

    #[test]
    fn set_verts_places_translucent_after_opaque() {
        let fixture = fixture();
        let mut mesh = ChunkMesh::new("main", fixture.pack.as_ref(), VERT_LEN).expect("12 floats");

        mesh.set_verts(ChunkGeometry {
            opaque: vec![records(3, 1.0), records(6, 1.0)],
            translucent: vec![records(3, 2.0)],
        });

        assert_eq!(mesh.translucent_start(), 9 * VERT_LEN);
        assert_eq!(mesh.draw_count(), 12);
        assert_eq!(mesh.opaque_range(), 0..9);
        assert_eq!(mesh.translucent_range(), 9..12);
        assert!(mesh.verts()[..9 * VERT_LEN].iter().all(|&value| value == 1.0));
        assert!(mesh.verts()[9 * VERT_LEN..].iter().all(|&value| value == 2.0));
        assert_eq!(mesh.as_bytes().len(), 12 * VERT_LEN * 4);
    }

    #[test]
    fn set_verts_without_opaque_starts_translucent_at_zero() {
        let fixture = fixture();
        let mut mesh = ChunkMesh::new("main", fixture.pack.as_ref(), VERT_LEN).expect("12 floats");

        mesh.set_verts(ChunkGeometry {
            opaque: Vec::new(),
            translucent: vec![records(6, 2.0)],
        });
        assert_eq!(mesh.translucent_start(), 0);
        assert_eq!(mesh.draw_count(), 6);
        assert!(mesh.opaque_range().is_empty());

        mesh.set_verts(ChunkGeometry::default());
        assert!(mesh.is_empty());
        assert_eq!(mesh.verts(), ChunkMesh::new_empty_verts().as_slice());
        assert_eq!(mesh.translucent_start(), 0);
    }

    #[test]
    fn binds_the_atlas_for_its_context() {
        let fixture = fixture();
        let mut pack = StaticResourcePack::clone(&fixture.pack);
        pack.bind_atlas("minimap", AtlasHandle(4));

        let mesh = ChunkMesh::new("minimap", &pack, VERT_LEN).expect("12 floats");
        assert_eq!(mesh.texture(), AtlasHandle(4));
        assert_eq!(mesh.context_identifier(), "minimap");

        let err = ChunkMesh::new("main", &pack, 4).expect_err("4 floats is too few");
        assert!(matches!(err, MeshError::VertLenTooSmall { vert_len: 4 }));
    }
}
