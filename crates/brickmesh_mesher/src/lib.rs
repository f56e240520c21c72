//! Face-culling voxel mesher: turns block volumes into packed vertex buffers split into
//! opaque and translucent batches.

pub mod builder;
pub mod config;
pub mod error;
pub mod lod0;
pub mod mesh_worker;
pub mod multi;
pub mod render_chunk;
pub mod resolve;
pub mod shading;
pub mod vertex;

#[cfg(test)]
mod testing;

pub use builder::{get_block_data, get_block_data_with_neighbors, ChunkMesh, RenderChunkBuilder};
pub use config::{ConfigError, MesherConfig};
pub use error::MeshError;
pub use lod0::{create_lod0_array, ChunkGeometry};
pub use mesh_worker::{MeshRequest, MeshResult, MeshWorker};
pub use multi::create_lod0_multi;
pub use render_chunk::{ChunkNeighbors, RenderChunk};
pub use resolve::ResolvedResources;
pub use vertex::{ChunkVertex, VERT_LEN};
