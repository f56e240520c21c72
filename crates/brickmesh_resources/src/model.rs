use std::collections::BTreeMap;
use std::fmt;

use brickmesh_shared::coords::Direction;

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// How a block lets light and neighbouring faces through.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Transparency {
    #[default]
    Opaque = 0,
    /// Faces towards another `TranslucentDistinct` block are culled, like the inside of a
    /// body of water. Faces towards any other transparent neighbour are drawn.
    TranslucentDistinct = 1,
    /// Never culled by a transparent neighbour, so two touching `TranslucentMerge` blocks
    /// both keep their shared faces.
    TranslucentMerge = 2,
}

impl Transparency {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Opaque),
            1 => Some(Self::TranslucentDistinct),
            2 => Some(Self::TranslucentMerge),
            _ => None,
        }
    }

    pub fn is_opaque(self) -> bool {
        self == Self::Opaque
    }
}

/// The condition under which a group of model faces is drawn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CullDir {
    Up,
    Down,
    North,
    South,
    East,
    West,
    /// Never culled.
    Always,
}

impl CullDir {
    pub const ALL: [CullDir; 7] = [
        CullDir::Up,
        CullDir::Down,
        CullDir::North,
        CullDir::South,
        CullDir::East,
        CullDir::West,
        CullDir::Always,
    ];

    pub fn direction(self) -> Option<Direction> {
        match self {
            CullDir::Up => Some(Direction::Up),
            CullDir::Down => Some(Direction::Down),
            CullDir::North => Some(Direction::North),
            CullDir::South => Some(Direction::South),
            CullDir::East => Some(Direction::East),
            CullDir::West => Some(Direction::West),
            CullDir::Always => None,
        }
    }

    pub fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::Up => CullDir::Up,
            Direction::Down => CullDir::Down,
            Direction::North => CullDir::North,
            Direction::South => CullDir::South,
            Direction::East => CullDir::East,
            Direction::West => CullDir::West,
        }
    }

    /// Parses a resource-pack face key. `none` is accepted as an alias for `always`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "up" => Some(CullDir::Up),
            "down" => Some(CullDir::Down),
            "north" => Some(CullDir::North),
            "south" => Some(CullDir::South),
            "east" => Some(CullDir::East),
            "west" => Some(CullDir::West),
            "always" | "none" => Some(CullDir::Always),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self.direction() {
            Some(direction) => direction.name(),
            None => "always",
        }
    }
}

impl fmt::Display for CullDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Triangles of a model drawn under one cull direction.
///
/// `verts`, `tex_coords` and `tint_verts` are parallel; `texture_index` has one entry per
/// triangle and indexes [`BlockModel::textures`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceGeometry {
    pub verts: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub tint_verts: Vec<[f32; 3]>,
    pub triangles: Vec<[u32; 3]>,
    pub texture_index: Vec<usize>,
}

impl FaceGeometry {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Vertices emitted per block instance.
    pub fn vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }

    /// Appends a quad as two triangles sharing the first corner.
    pub fn push_quad(&mut self, corners: [[f32; 3]; 4], uvs: [[f32; 2]; 4], texture: usize) {
        let base = self.verts.len() as u32;
        self.verts.extend_from_slice(&corners);
        self.tex_coords.extend_from_slice(&uvs);
        self.tint_verts.extend_from_slice(&[WHITE; 4]);
        self.triangles.push([base, base + 1, base + 2]);
        self.triangles.push([base, base + 2, base + 3]);
        self.texture_index.extend_from_slice(&[texture, texture]);
    }

    fn validate(&self, cull: CullDir, texture_count: usize) -> Result<(), ModelError> {
        if self.tex_coords.len() != self.verts.len() || self.tint_verts.len() != self.verts.len() {
            return Err(ModelError::ParallelLengthMismatch {
                cull,
                verts: self.verts.len(),
                tex_coords: self.tex_coords.len(),
                tint_verts: self.tint_verts.len(),
            });
        }
        if self.texture_index.len() != self.triangles.len() {
            return Err(ModelError::TextureIndexCount {
                cull,
                triangles: self.triangles.len(),
                texture_indices: self.texture_index.len(),
            });
        }
        for (triangle, corners) in self.triangles.iter().enumerate() {
            if let Some(&index) = corners.iter().find(|&&i| i as usize >= self.verts.len()) {
                return Err(ModelError::VertexIndexOutOfRange {
                    cull,
                    triangle,
                    index,
                    vertex_count: self.verts.len(),
                });
            }
        }
        for (triangle, &index) in self.texture_index.iter().enumerate() {
            if index >= texture_count {
                return Err(ModelError::TextureIndexOutOfRange {
                    cull,
                    triangle,
                    index,
                    texture_count,
                });
            }
        }
        Ok(())
    }
}

/// Per-side texture names for a full cube.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CubeTextures {
    pub up: String,
    pub down: String,
    pub north: String,
    pub south: String,
    pub east: String,
    pub west: String,
}

impl CubeTextures {
    pub fn all(texture: &str) -> Self {
        Self::top_bottom_side(texture, texture, texture)
    }

    pub fn top_bottom_side(top: &str, bottom: &str, side: &str) -> Self {
        Self {
            up: top.to_string(),
            down: bottom.to_string(),
            north: side.to_string(),
            south: side.to_string(),
            east: side.to_string(),
            west: side.to_string(),
        }
    }

    pub fn for_direction(&self, direction: Direction) -> &str {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
            Direction::North => &self.north,
            Direction::South => &self.south,
            Direction::East => &self.east,
            Direction::West => &self.west,
        }
    }
}

/// Renderable geometry of one block state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockModel {
    pub faces: BTreeMap<CullDir, FaceGeometry>,
    pub textures: Vec<String>,
    pub transparency: Transparency,
}

impl BlockModel {
    /// A model with no faces, e.g. air.
    pub fn empty(transparency: Transparency) -> Self {
        Self {
            faces: BTreeMap::new(),
            textures: Vec::new(),
            transparency,
        }
    }

    /// A unit cube with one quad per side, each culled by the side it faces.
    pub fn cube(textures: &CubeTextures, transparency: Transparency) -> Self {
        let mut model = Self::empty(transparency);
        for direction in Direction::ALL {
            let texture = model.texture_slot(textures.for_direction(direction));
            model
                .faces
                .entry(CullDir::from_direction(direction))
                .or_default()
                .push_quad(cube_face_corners(direction), CUBE_FACE_UVS, texture);
        }
        model
    }

    /// Multiplies every vertex tint in the model.
    pub fn with_tint(mut self, tint: [f32; 3]) -> Self {
        for face in self.faces.values_mut() {
            for vertex_tint in &mut face.tint_verts {
                for (channel, factor) in vertex_tint.iter_mut().zip(tint) {
                    *channel *= factor;
                }
            }
        }
        self
    }

    /// Returns the index of `texture` in [`Self::textures`], appending it if needed.
    pub fn texture_slot(&mut self, texture: &str) -> usize {
        if let Some(index) = self.textures.iter().position(|name| name == texture) {
            return index;
        }
        self.textures.push(texture.to_string());
        self.textures.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.faces.values().all(|face| face.triangles.is_empty())
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for (&cull, face) in &self.faces {
            face.validate(cull, self.textures.len())?;
        }
        Ok(())
    }
}

const CUBE_FACE_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

// Counter-clockwise when seen from outside the cube.
fn cube_face_corners(direction: Direction) -> [[f32; 3]; 4] {
    match direction {
        Direction::Up => [
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 1.0, 0.0],
        ],
        Direction::Down => [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
        ],
        Direction::North => [
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
        ],
        Direction::South => [
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ],
        Direction::East => [
            [1.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [1.0, 1.0, 1.0],
        ],
        Direction::West => [
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
            [0.0, 1.0, 0.0],
        ],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    ParallelLengthMismatch {
        cull: CullDir,
        verts: usize,
        tex_coords: usize,
        tint_verts: usize,
    },
    TextureIndexCount {
        cull: CullDir,
        triangles: usize,
        texture_indices: usize,
    },
    VertexIndexOutOfRange {
        cull: CullDir,
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
    TextureIndexOutOfRange {
        cull: CullDir,
        triangle: usize,
        index: usize,
        texture_count: usize,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParallelLengthMismatch {
                cull,
                verts,
                tex_coords,
                tint_verts,
            } => write!(
                f,
                "{cull} faces have {verts} verts, {tex_coords} tex coords and {tint_verts} tints"
            ),
            Self::TextureIndexCount {
                cull,
                triangles,
                texture_indices,
            } => write!(
                f,
                "{cull} faces have {triangles} triangles but {texture_indices} texture indices"
            ),
            Self::VertexIndexOutOfRange {
                cull,
                triangle,
                index,
                vertex_count,
            } => write!(
                f,
                "{cull} triangle {triangle} references vertex {index} of {vertex_count}"
            ),
            Self::TextureIndexOutOfRange {
                cull,
                triangle,
                index,
                texture_count,
            } => write!(
                f,
                "{cull} triangle {triangle} references texture {index} of {texture_count}"
            ),
        }
    }
}

impl std::error::Error for ModelError {}
