use std::sync::Arc;

use brickmesh_shared::block::BlockKey;
use rustc_hash::FxHashMap;

use crate::atlas::{AtlasHandle, AtlasMapping, TextureBounds};
use crate::error::PackError;
use crate::model::{BlockModel, Transparency};

/// Source of block geometry and atlas placement for the mesher.
///
/// Implementations must be read-only while meshes are being built; builds may run on
/// several threads at once.
pub trait ResourcePack: Send + Sync {
    fn name(&self) -> &str;

    fn block_model(&self, block: &BlockKey) -> Result<Arc<BlockModel>, PackError>;

    fn texture_bounds(&self, texture: &str) -> Result<TextureBounds, PackError>;

    /// Atlas texture to bind when drawing meshes for `context`.
    fn atlas_id(&self, context: &str) -> AtlasHandle;
}

/// In-memory resource pack.
///
/// Air is always present as an empty [`Transparency::TranslucentMerge`] model so that halo
/// cells resolve.
#[derive(Debug, Clone)]
pub struct StaticResourcePack {
    name: String,
    models: FxHashMap<BlockKey, Arc<BlockModel>>,
    atlas: AtlasMapping,
    default_atlas: AtlasHandle,
    atlas_handles: FxHashMap<String, AtlasHandle>,
}

impl StaticResourcePack {
    pub fn new(name: impl Into<String>, atlas: AtlasMapping) -> Self {
        let mut models = FxHashMap::default();
        models.insert(
            BlockKey::air(),
            Arc::new(BlockModel::empty(Transparency::TranslucentMerge)),
        );
        Self {
            name: name.into(),
            models,
            atlas,
            default_atlas: AtlasHandle::default(),
            atlas_handles: FxHashMap::default(),
        }
    }

    /// Registers or replaces the model for `block` after validating it.
    pub fn insert_model(
        &mut self,
        block: impl Into<BlockKey>,
        model: BlockModel,
    ) -> Result<(), PackError> {
        let block = block.into();
        if let Err(source) = model.validate() {
            return Err(PackError::InvalidModel { block, source });
        }
        self.models.insert(block, Arc::new(model));
        Ok(())
    }

    pub fn set_default_atlas(&mut self, handle: AtlasHandle) {
        self.default_atlas = handle;
    }

    pub fn bind_atlas(&mut self, context: &str, handle: AtlasHandle) {
        self.atlas_handles.insert(context.to_string(), handle);
    }

    pub fn atlas(&self) -> &AtlasMapping {
        &self.atlas
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}

impl ResourcePack for StaticResourcePack {
    fn name(&self) -> &str {
        &self.name
    }

    fn block_model(&self, block: &BlockKey) -> Result<Arc<BlockModel>, PackError> {
        self.models
            .get(block)
            .cloned()
            .ok_or_else(|| PackError::MissingModel {
                pack: self.name.clone(),
                block: block.clone(),
            })
    }

    fn texture_bounds(&self, texture: &str) -> Result<TextureBounds, PackError> {
        self.atlas
            .bounds(texture)
            .ok_or_else(|| PackError::MissingTexture {
                pack: self.name.clone(),
                texture: texture.to_string(),
            })
    }

    fn atlas_id(&self, context: &str) -> AtlasHandle {
        self.atlas_handles
            .get(context)
            .copied()
            .unwrap_or(self.default_atlas)
    }
}

/// Named resource packs handed to the mesher at construction time.
#[derive(Clone, Default)]
pub struct ResourcePackRegistry {
    packs: Vec<Arc<dyn ResourcePack>>,
}

impl ResourcePackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pack, replacing any earlier pack with the same name.
    pub fn register(&mut self, pack: Arc<dyn ResourcePack>) {
        if let Some(existing) = self
            .packs
            .iter_mut()
            .find(|existing| existing.name() == pack.name())
        {
            *existing = pack;
            return;
        }
        self.packs.push(pack);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ResourcePack>> {
        self.packs.iter().find(|pack| pack.name() == name).cloned()
    }

    /// Pack names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packs.iter().map(|pack| pack.name())
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}
