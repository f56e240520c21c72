use std::sync::Arc;

use brickmesh_resources::{
    AtlasMapping, BlockModel, CubeTextures, CullDir, FaceGeometry, StaticResourcePack,
    Transparency,
};
use brickmesh_shared::block::{BlockId, BlockPalette};

pub(crate) struct Fixture {
    pub pack: Arc<StaticResourcePack>,
    pub palette: Arc<BlockPalette>,
    pub stone: BlockId,
    pub glass: BlockId,
    pub water: BlockId,
    pub torch: BlockId,
}

pub(crate) const TEXTURES: [&str; 5] = ["stone", "glass", "water", "torch", "torch_flame"];

/// stone (opaque cube), glass (class 1 cube), water (class 2 cube) and a torch with a single
/// always-visible quad whose two triangles use different textures.
pub(crate) fn fixture() -> Fixture {
    let atlas = AtlasMapping::pack_grid(TEXTURES, 64, 16).expect("atlas fits");
    let mut pack = StaticResourcePack::new("test", atlas);
    pack.insert_model(
        "stone",
        BlockModel::cube(&CubeTextures::all("stone"), Transparency::Opaque),
    )
    .expect("stone is valid");
    pack.insert_model(
        "glass",
        BlockModel::cube(&CubeTextures::all("glass"), Transparency::TranslucentDistinct),
    )
    .expect("glass is valid");
    pack.insert_model(
        "water",
        BlockModel::cube(&CubeTextures::all("water"), Transparency::TranslucentMerge),
    )
    .expect("water is valid");
    pack.insert_model("torch", torch_model()).expect("torch is valid");

    let mut palette = BlockPalette::new();
    let stone = palette.get_add_block("stone").expect("palette has room");
    let glass = palette.get_add_block("glass").expect("palette has room");
    let water = palette.get_add_block("water").expect("palette has room");
    let torch = palette.get_add_block("torch").expect("palette has room");

    Fixture {
        pack: Arc::new(pack),
        palette: Arc::new(palette),
        stone,
        glass,
        water,
        torch,
    }
}

fn torch_model() -> BlockModel {
    let mut model = BlockModel::empty(Transparency::Opaque);
    let stick = model.texture_slot("torch");
    let flame = model.texture_slot("torch_flame");
    let mut face = FaceGeometry::default();
    face.push_quad(
        [
            [0.5, 0.0, 0.4],
            [0.5, 0.0, 0.6],
            [0.5, 1.0, 0.6],
            [0.5, 1.0, 0.4],
        ],
        [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
        stick,
    );
    face.texture_index[1] = flame;
    model.faces.insert(CullDir::Always, face);
    model
}
