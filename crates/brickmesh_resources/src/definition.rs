//! TOML resource pack definitions.
//!
//! ```toml
//! name = "vanilla"
//!
//! [atlas]
//! size = 512
//! tile_size = 16
//!
//! [blocks."minecraft:grass_block"]
//! cube = { top = "grass_top", bottom = "dirt", side = "grass_side" }
//! tint = [0.55, 0.8, 0.35]
//!
//! [blocks."minecraft:water"]
//! transparency = 2
//! cube = { all = "water" }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::atlas::{AtlasHandle, AtlasMapping, DEFAULT_ATLAS_SIZE, DEFAULT_TILE_SIZE};
use crate::error::PackError;
use crate::model::{BlockModel, CubeTextures, CullDir, FaceGeometry, Transparency};
use crate::pack::StaticResourcePack;

#[derive(Debug, Clone, Deserialize)]
pub struct ResourcePackDef {
    pub name: String,
    #[serde(default)]
    pub atlas: AtlasDef,
    #[serde(default)]
    pub blocks: BTreeMap<String, BlockDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AtlasDef {
    pub size: u32,
    pub tile_size: u32,
    pub handle: u32,
    /// Textures placed first, in this order. Textures only referenced by blocks follow in
    /// name order.
    pub textures: Vec<String>,
}

impl Default for AtlasDef {
    fn default() -> Self {
        Self {
            size: DEFAULT_ATLAS_SIZE,
            tile_size: DEFAULT_TILE_SIZE,
            handle: 0,
            textures: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockDef {
    #[serde(default)]
    pub transparency: u8,
    pub cube: Option<CubeDef>,
    pub tint: Option<[f32; 3]>,
    /// Textures referenced by `faces[*].texture_index`.
    #[serde(default)]
    pub textures: Vec<String>,
    /// Explicit faces keyed by cull direction name.
    #[serde(default)]
    pub faces: BTreeMap<String, FaceDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CubeDef {
    pub all: Option<String>,
    pub top: Option<String>,
    pub bottom: Option<String>,
    pub side: Option<String>,
    pub up: Option<String>,
    pub down: Option<String>,
    pub north: Option<String>,
    pub south: Option<String>,
    pub east: Option<String>,
    pub west: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaceDef {
    pub verts: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub tint_verts: Option<Vec<[f32; 3]>>,
    pub triangles: Vec<[u32; 3]>,
    pub texture_index: Vec<usize>,
}

impl ResourcePackDef {
    pub fn from_toml_str(source: &str) -> Result<Self, PackError> {
        toml::from_str(source).map_err(|source| PackError::Parse { source })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PackError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| PackError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Builds the models and packs every referenced texture into the atlas.
    pub fn into_pack(self) -> Result<StaticResourcePack, PackError> {
        let mut models = Vec::with_capacity(self.blocks.len());
        for (block, def) in &self.blocks {
            models.push((block.as_str(), def.to_model(block)?));
        }

        let listed: BTreeSet<&str> = self.atlas.textures.iter().map(String::as_str).collect();
        let referenced: BTreeSet<&str> = models
            .iter()
            .flat_map(|(_, model)| model.textures.iter().map(String::as_str))
            .filter(|texture| !listed.contains(texture))
            .collect();
        let atlas = AtlasMapping::pack_grid(
            self.atlas
                .textures
                .iter()
                .map(String::as_str)
                .chain(referenced),
            self.atlas.size,
            self.atlas.tile_size,
        )?;
        let texture_count = atlas.len();

        let mut pack = StaticResourcePack::new(self.name.clone(), atlas);
        pack.set_default_atlas(AtlasHandle(self.atlas.handle));
        for (block, model) in models {
            pack.insert_model(block, model)?;
        }

        info!(
            "Loaded resource pack '{}' with {} block models and {} textures",
            self.name,
            pack.model_count(),
            texture_count
        );
        Ok(pack)
    }
}

impl BlockDef {
    fn to_model(&self, block: &str) -> Result<BlockModel, PackError> {
        let transparency =
            Transparency::from_u8(self.transparency).ok_or_else(|| PackError::InvalidTransparency {
                block: block.to_string(),
                value: self.transparency,
            })?;

        let mut model = match &self.cube {
            Some(cube) => BlockModel::cube(&cube.resolve(block)?, transparency),
            None => BlockModel::empty(transparency),
        };

        let texture_base = model.textures.len();
        for texture in &self.textures {
            model.textures.push(texture.clone());
        }

        for (key, face) in &self.faces {
            let Some(cull) = CullDir::from_key(key) else {
                warn!("Ignoring unknown face direction '{key}' on block '{block}'");
                continue;
            };
            let tint_verts = face
                .tint_verts
                .clone()
                .unwrap_or_else(|| vec![[1.0, 1.0, 1.0]; face.verts.len()]);
            model.faces.insert(
                cull,
                FaceGeometry {
                    verts: face.verts.clone(),
                    tex_coords: face.tex_coords.clone(),
                    tint_verts,
                    triangles: face.triangles.clone(),
                    texture_index: face
                        .texture_index
                        .iter()
                        .map(|index| index + texture_base)
                        .collect(),
                },
            );
        }

        Ok(match self.tint {
            Some(tint) => model.with_tint(tint),
            None => model,
        })
    }
}

impl CubeDef {
    fn resolve(&self, block: &str) -> Result<CubeTextures, PackError> {
        let pick = |specific: &Option<String>, group: &Option<String>, side: &str| {
            specific
                .as_ref()
                .or(group.as_ref())
                .or(self.all.as_ref())
                .cloned()
                .ok_or_else(|| PackError::InvalidDefinition {
                    block: block.to_string(),
                    reason: format!("cube has no texture for the {side} side"),
                })
        };

        Ok(CubeTextures {
            up: pick(&self.up, &self.top, "up")?,
            down: pick(&self.down, &self.bottom, "down")?,
            north: pick(&self.north, &self.side, "north")?,
            south: pick(&self.south, &self.side, "south")?,
            east: pick(&self.east, &self.side, "east")?,
            west: pick(&self.west, &self.side, "west")?,
        })
    }
}
