use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use brickmesh_resources::ResourcePack;
use brickmesh_shared::chunk::Chunk;
use brickmesh_shared::coords::ChunkPos;
use tracing::{debug, warn};

use crate::builder::{ChunkMesh, RenderChunkBuilder};
use crate::config::MesherConfig;
use crate::error::MeshError;
use crate::render_chunk::{ChunkNeighbors, RenderChunk};

pub struct MeshRequest {
    pub chunk: Arc<Chunk>,
    pub neighbors: ChunkNeighbors,
    pub resource_pack: Arc<dyn ResourcePack>,
    /// Returned unchanged so callers can drop stale results.
    pub version: u64,
}

pub struct MeshResult {
    pub pos: ChunkPos,
    pub version: u64,
    pub mesh: Result<ChunkMesh, MeshError>,
}

/// Builds chunk meshes on a background thread pool.
pub struct MeshWorker {
    pool: ThreadPool,
    context_identifier: String,
    vert_len: usize,
    completed_rx: Receiver<MeshResult>,
    completed_tx: Sender<MeshResult>,
}

impl MeshWorker {
    pub fn new(config: &MesherConfig) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_thread_count())
            .thread_name(|index| format!("mesh-worker-{index}"))
            .build()?;
        let (completed_tx, completed_rx) = mpsc::channel();

        Ok(Self {
            pool,
            context_identifier: config.context_identifier.clone(),
            vert_len: config.vert_len,
            completed_rx,
            completed_tx,
        })
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn submit(&self, request: MeshRequest) {
        let completed_tx = self.completed_tx.clone();
        let context_identifier = self.context_identifier.clone();
        let vert_len = self.vert_len;
        self.pool.spawn(move || {
            let pos = request.chunk.pos();
            let mesh = build_mesh(
                &context_identifier,
                vert_len,
                request.chunk,
                request.neighbors,
                request.resource_pack,
            );
            match &mesh {
                Ok(mesh) => debug!("Meshed chunk {:?}: {} vertices", pos, mesh.draw_count()),
                Err(err) => warn!("Failed to mesh chunk {:?}: {err}", pos),
            }
            let _ = completed_tx.send(MeshResult {
                pos,
                version: request.version,
                mesh,
            });
        });
    }

    pub fn poll(&self) -> Vec<MeshResult> {
        let mut completed = Vec::new();
        while let Ok(result) = self.completed_rx.try_recv() {
            completed.push(result);
        }
        completed
    }
}

fn build_mesh(
    context_identifier: &str,
    vert_len: usize,
    chunk: Arc<Chunk>,
    neighbors: ChunkNeighbors,
    resource_pack: Arc<dyn ResourcePack>,
) -> Result<ChunkMesh, MeshError> {
    let mut render =
        RenderChunk::new(context_identifier, resource_pack, chunk, neighbors, vert_len)?;
    render.create_geometry()?;
    Ok(render.into_mesh())
}
