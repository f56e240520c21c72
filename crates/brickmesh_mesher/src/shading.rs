//! Directional face shading and the world-Y brightness band.

use brickmesh_resources::CullDir;

/// Brightness lost per shading level.
pub const BRIGHTNESS_STEP: f32 = 0.15;

/// Height of one half of the brightness band, in blocks.
const BAND_HEIGHT: f32 = 32.0;

pub fn brightness_multiplier(cull: CullDir) -> f32 {
    let levels = match cull {
        CullDir::Up | CullDir::Always => 0.0,
        CullDir::North | CullDir::South => 1.0,
        CullDir::East | CullDir::West => 2.0,
        CullDir::Down => 3.0,
    };
    1.0 - levels * BRIGHTNESS_STEP
}

/// Triangle wave between 0.9 and 1.1 with a period of 64 blocks.
pub fn y_banding(world_y: f32) -> f32 {
    0.9 + 0.2 * ((world_y / BAND_HEIGHT).rem_euclid(2.0) - 1.0).abs()
}

pub fn shade(tint: [f32; 3], multiplier: f32, world_y: f32) -> [f32; 3] {
    let band = y_banding(world_y);
    tint.map(|channel| channel * multiplier * band)
}
