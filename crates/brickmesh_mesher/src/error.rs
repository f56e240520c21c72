use std::fmt;

use brickmesh_resources::PackError;
use brickmesh_shared::block::BlockId;

#[derive(Debug)]
pub enum MeshError {
    /// A cell holds an id the chunk palette does not know.
    MissingPaletteEntry(BlockId),
    /// A cell holds an id whose model was not resolved for this build.
    MissingModel(BlockId),
    MissingTextureBounds(String),
    VertLenTooSmall { vert_len: usize },
    Pack(PackError),
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPaletteEntry(block) => {
                write!(f, "block id {block} is not in the chunk palette")
            }
            Self::MissingModel(block) => write!(f, "no model resolved for block id {block}"),
            Self::MissingTextureBounds(texture) => {
                write!(f, "no atlas bounds resolved for texture '{texture}'")
            }
            Self::VertLenTooSmall { vert_len } => write!(
                f,
                "vertex length {vert_len} is too small; at least {} floats are required",
                crate::vertex::VERT_LEN
            ),
            Self::Pack(err) => write!(f, "resource pack error: {err}"),
        }
    }
}

impl std::error::Error for MeshError {}

impl From<PackError> for MeshError {
    fn from(err: PackError) -> Self {
        Self::Pack(err)
    }
}
