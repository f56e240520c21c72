pub mod atlas;
pub mod definition;
pub mod error;
pub mod model;
pub mod pack;

pub use atlas::{AtlasHandle, AtlasMapping, TextureBounds};
pub use error::PackError;
pub use model::{BlockModel, CubeTextures, CullDir, FaceGeometry, ModelError, Transparency};
pub use pack::{ResourcePack, ResourcePackRegistry, StaticResourcePack};
