use std::sync::Arc;

use brickmesh_resources::ResourcePack;
use brickmesh_shared::chunk::Chunk;
use brickmesh_shared::coords::{section_offset, ChunkPos};
use brickmesh_shared::volume::{PaddedVolume, VolumeNeighbors};
use glam::IVec3;
use tracing::warn;

use crate::builder::{get_block_data_with_neighbors, ChunkMesh, RenderChunkBuilder};
use crate::error::MeshError;

/// Horizontally adjacent chunk columns used to fill section halos.
#[derive(Clone, Debug, Default)]
pub struct ChunkNeighbors {
    pub pos_x: Option<Arc<Chunk>>,
    pub neg_x: Option<Arc<Chunk>>,
    pub pos_z: Option<Arc<Chunk>>,
    pub neg_z: Option<Arc<Chunk>>,
}

/// A chunk column together with the mesh built from it.
pub struct RenderChunk {
    chunk: Arc<Chunk>,
    neighbors: ChunkNeighbors,
    resource_pack: Arc<dyn ResourcePack>,
    mesh: ChunkMesh,
    needs_rebuild: bool,
}

impl RenderChunk {
    pub fn new(
        context_identifier: &str,
        resource_pack: Arc<dyn ResourcePack>,
        chunk: Arc<Chunk>,
        neighbors: ChunkNeighbors,
        vert_len: usize,
    ) -> Result<Self, MeshError> {
        let mesh = ChunkMesh::new(context_identifier, resource_pack.as_ref(), vert_len)?;
        Ok(Self {
            chunk,
            neighbors,
            resource_pack,
            mesh,
            needs_rebuild: true,
        })
    }

    pub fn pos(&self) -> ChunkPos {
        self.chunk.pos()
    }

    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    pub fn set_chunk(&mut self, chunk: Arc<Chunk>, neighbors: ChunkNeighbors) {
        self.chunk = chunk;
        self.neighbors = neighbors;
        self.needs_rebuild = true;
    }

    /// Switches packs. The mesh keeps its old buffers and atlas binding until the next
    /// successful build, so the two never disagree.
    pub fn set_resource_pack(&mut self, resource_pack: Arc<dyn ResourcePack>) {
        self.resource_pack = resource_pack;
        self.needs_rebuild = true;
    }

    pub fn into_mesh(self) -> ChunkMesh {
        self.mesh
    }

    /// Every section padded with its neighbours' boundary layers, at its offset in the chunk.
    fn padded_sections(&self) -> Vec<(PaddedVolume, IVec3)> {
        let center = self.chunk.as_ref();
        let pos_x = same_palette(center, &self.neighbors.pos_x);
        let neg_x = same_palette(center, &self.neighbors.neg_x);
        let pos_z = same_palette(center, &self.neighbors.pos_z);
        let neg_z = same_palette(center, &self.neighbors.neg_z);

        center
            .sections()
            .map(|(section_y, volume)| {
                let neighbors = VolumeNeighbors {
                    pos_x: pos_x.and_then(|chunk| chunk.section(section_y)),
                    neg_x: neg_x.and_then(|chunk| chunk.section(section_y)),
                    pos_y: center.section(section_y + 1),
                    neg_y: center.section(section_y - 1),
                    pos_z: pos_z.and_then(|chunk| chunk.section(section_y)),
                    neg_z: neg_z.and_then(|chunk| chunk.section(section_y)),
                };
                let (padded, _) = get_block_data_with_neighbors(volume, &neighbors);
                (padded, section_offset(section_y))
            })
            .collect()
    }
}

fn same_palette<'a>(center: &Chunk, neighbor: &'a Option<Arc<Chunk>>) -> Option<&'a Chunk> {
    let neighbor = neighbor.as_deref()?;
    if neighbor.shares_palette(center) {
        Some(neighbor)
    } else {
        warn!(
            "Chunk {:?} uses a different palette than {:?}; treating it as missing",
            neighbor.pos(),
            center.pos()
        );
        None
    }
}

impl RenderChunkBuilder for RenderChunk {
    fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    fn offset(&self) -> IVec3 {
        self.chunk.origin()
    }

    fn resource_pack(&self) -> &dyn ResourcePack {
        self.resource_pack.as_ref()
    }

    fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    fn mesh_mut(&mut self) -> &mut ChunkMesh {
        &mut self.mesh
    }

    fn create_geometry(&mut self) -> Result<(), MeshError> {
        let sections = self.padded_sections();
        let geometry = self.create_lod0_multi(&sections)?;
        self.mesh.rebind_atlas(self.resource_pack.as_ref());
        self.set_verts(geometry);
        self.needs_rebuild = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use brickmesh_resources::{AtlasHandle, ResourcePack, StaticResourcePack};
    use brickmesh_shared::block::{BlockId, BlockPalette};
    use brickmesh_shared::chunk::Chunk;
    use brickmesh_shared::coords::ChunkPos;

    use super::{ChunkNeighbors, RenderChunk};
    use crate::builder::RenderChunkBuilder;
    use crate::error::MeshError;
    use crate::testing::{fixture, Fixture};
    use crate::vertex::VERT_LEN;

    const FACE_VERTS: usize = 6;

    fn pack(fixture: &Fixture) -> Arc<dyn ResourcePack> {
        fixture.pack.clone()
    }

    fn render_chunk(fixture: &Fixture, chunk: Chunk, neighbors: ChunkNeighbors) -> RenderChunk {
        RenderChunk::new("main", pack(fixture), Arc::new(chunk), neighbors, VERT_LEN)
            .expect("12 floats")
    }

    #[test]
    fn builds_world_space_geometry() {
        let fixture = fixture();
        let mut chunk = Chunk::new(ChunkPos::new(2, -1), fixture.palette.clone());
        chunk.set_block(3, 20, 4, fixture.stone);

        let mut render = render_chunk(&fixture, chunk, ChunkNeighbors::default());
        assert!(render.needs_rebuild());
        render.create_geometry().expect("stone meshes");
        assert!(!render.needs_rebuild());

        let mesh = render.mesh();
        assert_eq!(mesh.draw_count(), 6 * FACE_VERTS);
        assert_eq!(mesh.translucent_start(), mesh.verts().len());
        for vertex in mesh.vertices() {
            assert!((35.0..=36.0).contains(&vertex.position[0]));
            assert!((20.0..=21.0).contains(&vertex.position[1]));
            assert!((-12.0..=-11.0).contains(&vertex.position[2]));
        }
    }

    #[test]
    fn sections_above_and_below_fill_the_halo() {
        let fixture = fixture();
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), fixture.palette.clone());
        chunk.set_block(5, 15, 5, fixture.stone);
        chunk.set_block(5, 16, 5, fixture.stone);

        let mut render = render_chunk(&fixture, chunk, ChunkNeighbors::default());
        render.create_geometry().expect("stone meshes");
        assert_eq!(render.mesh().draw_count(), 10 * FACE_VERTS);
    }

    #[test]
    fn neighbour_chunks_cull_shared_faces_when_palettes_match() {
        let fixture = fixture();
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), fixture.palette.clone());
        chunk.set_block(15, 0, 0, fixture.stone);

        let mut east = Chunk::new(ChunkPos::new(1, 0), fixture.palette.clone());
        east.set_block(0, 0, 0, fixture.stone);
        let neighbors = ChunkNeighbors {
            pos_x: Some(Arc::new(east)),
            ..ChunkNeighbors::default()
        };
        let mut render = render_chunk(&fixture, chunk.clone(), neighbors);
        render.create_geometry().expect("stone meshes");
        assert_eq!(render.mesh().draw_count(), 5 * FACE_VERTS);

        let mut foreign_palette = BlockPalette::new();
        foreign_palette.get_add_block("stone").expect("palette has room");
        let mut foreign = Chunk::new(ChunkPos::new(1, 0), Arc::new(foreign_palette));
        foreign.set_block(0, 0, 0, BlockId(1));
        let neighbors = ChunkNeighbors {
            pos_x: Some(Arc::new(foreign)),
            ..ChunkNeighbors::default()
        };
        let mut render = render_chunk(&fixture, chunk, neighbors);
        render.create_geometry().expect("stone meshes");
        assert_eq!(render.mesh().draw_count(), 6 * FACE_VERTS);
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let fixture = fixture();
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), fixture.palette.clone());
        for (i, block) in [fixture.stone, fixture.glass, fixture.water, fixture.torch]
            .into_iter()
            .enumerate()
        {
            chunk.set_block(i * 2, i as i32 * 7, 3, block);
            chunk.set_block(i * 2 + 1, i as i32 * 7, 3, block);
        }

        let mut render = render_chunk(&fixture, chunk, ChunkNeighbors::default());
        render.create_geometry().expect("first build");
        let first = render.mesh().as_bytes().to_vec();
        render.create_geometry().expect("second build");
        assert_eq!(render.mesh().as_bytes(), first.as_slice());
        assert!(!render.mesh().translucent_range().is_empty());
    }

    #[test]
    fn failed_builds_keep_the_previous_buffers() {
        let fixture = fixture();
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), fixture.palette.clone());
        chunk.set_block(0, 0, 0, fixture.stone);
        let mut render = render_chunk(&fixture, chunk, ChunkNeighbors::default());
        render.create_geometry().expect("stone meshes");
        let before = render.mesh().clone();

        let mut broken = Chunk::new(ChunkPos::new(0, 0), fixture.palette.clone());
        broken.set_block(0, 0, 0, BlockId(99));
        render.set_chunk(Arc::new(broken), ChunkNeighbors::default());
        let err = render.create_geometry().expect_err("id 99 is unknown");
        assert!(matches!(err, MeshError::MissingPaletteEntry(BlockId(99))));
        assert_eq!(render.mesh(), &before);
        assert!(render.needs_rebuild());
    }

    #[test]
    fn empty_chunks_produce_empty_meshes() {
        let fixture = fixture();
        let chunk = Chunk::new(ChunkPos::new(0, 0), fixture.palette.clone());
        let mut render = render_chunk(&fixture, chunk, ChunkNeighbors::default());
        render.create_geometry().expect("nothing to mesh");
        assert!(render.mesh().is_empty());
        assert_eq!(render.mesh().draw_count(), 0);
    }

    #[test]
    fn swapping_packs_rebinds_the_atlas_on_the_next_build() {
        let fixture = fixture();
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), fixture.palette.clone());
        chunk.set_block(0, 0, 0, fixture.stone);
        let mut render = render_chunk(&fixture, chunk, ChunkNeighbors::default());
        render.create_geometry().expect("stone meshes");
        let old_texture = render.mesh().texture();

        let mut other = StaticResourcePack::clone(&fixture.pack);
        other.set_default_atlas(AtlasHandle(2));
        render.set_resource_pack(Arc::new(other));
        assert!(render.needs_rebuild());
        assert_eq!(render.mesh().texture(), old_texture);

        render.create_geometry().expect("stone meshes");
        assert_eq!(render.mesh().texture(), AtlasHandle(2));
    }

    #[test]
    fn failed_builds_after_a_pack_swap_keep_the_old_atlas() {
        let fixture = fixture();
        let mut chunk = Chunk::new(ChunkPos::new(0, 0), fixture.palette.clone());
        chunk.set_block(0, 0, 0, fixture.stone);
        let mut render = render_chunk(&fixture, chunk, ChunkNeighbors::default());
        render.create_geometry().expect("stone meshes");
        let before = render.mesh().clone();

        let mut broken = Chunk::new(ChunkPos::new(0, 0), fixture.palette.clone());
        broken.set_block(0, 0, 0, BlockId(99));
        render.set_chunk(Arc::new(broken), ChunkNeighbors::default());
        let mut other = StaticResourcePack::clone(&fixture.pack);
        other.set_default_atlas(AtlasHandle(2));
        render.set_resource_pack(Arc::new(other));

        render.create_geometry().expect_err("id 99 is unknown");
        assert_eq!(render.mesh(), &before);
        assert_ne!(render.mesh().texture(), AtlasHandle(2));
    }
}
