use rustc_hash::FxHashMap;

use crate::error::PackError;

pub const DEFAULT_ATLAS_SIZE: u32 = 512;
pub const DEFAULT_TILE_SIZE: u32 = 16;

/// Normalized rectangle of a texture inside the shared atlas.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TextureBounds {
    pub u_min: f32,
    pub v_min: f32,
    pub u_max: f32,
    pub v_max: f32,
}

impl TextureBounds {
    pub const fn new(u_min: f32, v_min: f32, u_max: f32, v_max: f32) -> Self {
        Self {
            u_min,
            v_min,
            u_max,
            v_max,
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.u_min, self.v_min, self.u_max, self.v_max]
    }
}

/// Opaque handle of the GPU atlas texture a mesh samples from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AtlasHandle(pub u32);

/// Texture name to atlas bounds lookup.
#[derive(Debug, Clone, Default)]
pub struct AtlasMapping {
    bounds: FxHashMap<String, TextureBounds>,
}

impl AtlasMapping {
    /// Lays `textures` out row-major as square tiles of a square atlas.
    /// Duplicate names keep their first slot.
    pub fn pack_grid<'a>(
        textures: impl IntoIterator<Item = &'a str>,
        atlas_size: u32,
        tile_size: u32,
    ) -> Result<Self, PackError> {
        let tiles_per_row = u64::from(atlas_size.checked_div(tile_size).unwrap_or(0));
        // 65536 tiles per row already overflows u32
        let slots = tiles_per_row * tiles_per_row;
        let capacity = usize::try_from(slots).unwrap_or(usize::MAX);
        let mut mapping = Self::default();
        let mut slot = 0u64;

        for texture in textures {
            if mapping.bounds.contains_key(texture) {
                continue;
            }
            if slot >= slots {
                return Err(PackError::AtlasFull {
                    capacity,
                    texture: texture.to_string(),
                });
            }

            let tile_x = slot % tiles_per_row;
            let tile_y = slot / tiles_per_row;
            let u_offset = (tile_x * u64::from(tile_size)) as f32 / atlas_size as f32;
            let v_offset = (tile_y * u64::from(tile_size)) as f32 / atlas_size as f32;
            let extent = tile_size as f32 / atlas_size as f32;
            mapping.set_bounds(
                texture,
                TextureBounds::new(u_offset, v_offset, u_offset + extent, v_offset + extent),
            );
            slot += 1;
        }

        Ok(mapping)
    }

    pub fn set_bounds(&mut self, texture: &str, bounds: TextureBounds) {
        self.bounds.insert(texture.to_string(), bounds);
    }

    pub fn bounds(&self, texture: &str) -> Option<TextureBounds> {
        self.bounds.get(texture).copied()
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}
