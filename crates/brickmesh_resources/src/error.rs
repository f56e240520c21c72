use std::fmt;
use std::path::PathBuf;

use brickmesh_shared::block::BlockKey;

use crate::model::ModelError;

#[derive(Debug)]
pub enum PackError {
    MissingModel {
        pack: String,
        block: BlockKey,
    },
    MissingTexture {
        pack: String,
        texture: String,
    },
    InvalidModel {
        block: BlockKey,
        source: ModelError,
    },
    InvalidDefinition {
        block: String,
        reason: String,
    },
    InvalidTransparency {
        block: String,
        value: u8,
    },
    AtlasFull {
        capacity: usize,
        texture: String,
    },
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        source: toml::de::Error,
    },
}

impl fmt::Display for PackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingModel { pack, block } => {
                write!(f, "resource pack '{pack}' has no model for block '{block}'")
            }
            Self::MissingTexture { pack, texture } => {
                write!(f, "resource pack '{pack}' has no atlas entry for texture '{texture}'")
            }
            Self::InvalidModel { block, source } => {
                write!(f, "invalid model for block '{block}': {source}")
            }
            Self::InvalidDefinition { block, reason } => {
                write!(f, "invalid definition for block '{block}': {reason}")
            }
            Self::InvalidTransparency { block, value } => write!(
                f,
                "block '{block}' has transparency {value}; expected 0, 1 or 2"
            ),
            Self::AtlasFull { capacity, texture } => write!(
                f,
                "atlas is full ({capacity} tiles); cannot place texture '{texture}'"
            ),
            Self::ReadFile { path, source } => {
                write!(f, "failed to read resource pack {}: {source}", path.display())
            }
            Self::Parse { source } => write!(f, "failed to parse resource pack: {source}"),
        }
    }
}

impl std::error::Error for PackError {}
