use std::collections::BTreeSet;
use std::sync::Arc;

use brickmesh_resources::{BlockModel, PackError, ResourcePack, TextureBounds};
use brickmesh_shared::block::{BlockId, BlockPalette};
use rustc_hash::FxHashMap;

use crate::error::MeshError;

/// Models and atlas bounds looked up once before any vertex is emitted.
///
/// Every model held here has passed [`BlockModel::validate`], so its triangle and texture
/// indices are in range.
#[derive(Debug, Clone, Default)]
pub struct ResolvedResources {
    models: FxHashMap<BlockId, Arc<BlockModel>>,
    texture_bounds: FxHashMap<String, TextureBounds>,
}

impl ResolvedResources {
    /// Resolves `blocks` through the palette and pack, then every texture their models use.
    pub fn resolve(
        pack: &dyn ResourcePack,
        palette: &BlockPalette,
        blocks: &[BlockId],
    ) -> Result<Self, MeshError> {
        let mut models = FxHashMap::default();
        for &block in blocks {
            let key = palette
                .get(block)
                .ok_or(MeshError::MissingPaletteEntry(block))?;
            let model = pack.block_model(key)?;
            model.validate().map_err(|source| PackError::InvalidModel {
                block: key.clone(),
                source,
            })?;
            models.insert(block, model);
        }

        let textures: BTreeSet<&str> = models
            .values()
            .flat_map(|model| model.textures.iter().map(String::as_str))
            .collect();
        let mut texture_bounds = FxHashMap::default();
        for texture in textures {
            texture_bounds.insert(texture.to_string(), pack.texture_bounds(texture)?);
        }

        Ok(Self {
            models,
            texture_bounds,
        })
    }

    pub fn model(&self, block: BlockId) -> Result<&BlockModel, MeshError> {
        self.models
            .get(&block)
            .map(Arc::as_ref)
            .ok_or(MeshError::MissingModel(block))
    }

    pub fn texture_bounds(&self, texture: &str) -> Result<TextureBounds, MeshError> {
        self.texture_bounds
            .get(texture)
            .copied()
            .ok_or_else(|| MeshError::MissingTextureBounds(texture.to_string()))
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn texture_count(&self) -> usize {
        self.texture_bounds.len()
    }
}

#[cfg(test)]
mod tests {
    use brickmesh_resources::{
        AtlasMapping, BlockModel, CubeTextures, PackError, StaticResourcePack, Transparency,
    };
    use brickmesh_shared::block::{BlockId, BlockPalette};

    use super::ResolvedResources;
    use crate::error::MeshError;

    fn pack() -> StaticResourcePack {
        let atlas = AtlasMapping::pack_grid(["stone", "grass_top", "dirt"], 64, 16)
            .expect("atlas fits");
        let mut pack = StaticResourcePack::new("test", atlas);
        pack.insert_model(
            "stone",
            BlockModel::cube(&CubeTextures::all("stone"), Transparency::Opaque),
        )
        .expect("stone is valid");
        pack.insert_model(
            "grass_block",
            BlockModel::cube(
                &CubeTextures::top_bottom_side("grass_top", "dirt", "grass_side"),
                Transparency::Opaque,
            ),
        )
        .expect("grass is valid");
        pack
    }

    #[test]
    fn resolves_models_and_their_textures() {
        let mut palette = BlockPalette::new();
        let stone = palette.get_add_block("stone").expect("palette has room");

        let resolved = ResolvedResources::resolve(&pack(), &palette, &[BlockId::AIR, stone])
            .expect("stone and air resolve");
        assert_eq!(resolved.model_count(), 2);
        assert_eq!(resolved.texture_count(), 1);
        assert!(resolved.model(stone).is_ok());
        assert!(resolved.texture_bounds("stone").is_ok());
        assert!(matches!(
            resolved.model(BlockId(9)),
            Err(MeshError::MissingModel(BlockId(9)))
        ));
        assert!(matches!(
            resolved.texture_bounds("dirt"),
            Err(MeshError::MissingTextureBounds(_))
        ));
    }

    #[test]
    fn unknown_palette_ids_fail() {
        let palette = BlockPalette::new();
        let err = ResolvedResources::resolve(&pack(), &palette, &[BlockId(3)])
            .expect_err("id 3 is not in the palette");
        assert!(matches!(err, MeshError::MissingPaletteEntry(BlockId(3))));
    }

    #[test]
    fn textures_missing_from_the_atlas_fail() {
        let mut palette = BlockPalette::new();
        let grass = palette.get_add_block("grass_block").expect("palette has room");
        // grass_side is not packed.
        let err = ResolvedResources::resolve(&pack(), &palette, &[grass])
            .expect_err("grass_side has no atlas slot");
        assert!(matches!(
            err,
            MeshError::Pack(PackError::MissingTexture { .. })
        ));
    }
}
