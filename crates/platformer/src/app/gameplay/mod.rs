use engine::{InputSnapshot, Scene, Tilemap};

mod collision;
mod player;
mod scene_impl;

pub(crate) use collision::{clamp_to_world, resolve_collisions, TileSource};
pub(crate) use player::Player;
pub(crate) use scene_impl::GameplayScene;

pub(crate) const WORLD_WIDTH: f32 = 640.0;
pub(crate) const WORLD_HEIGHT: f32 = 480.0;
pub(crate) const CELL_SIZE: f32 = 16.0;
pub(crate) const PLAYER_TEXTURE_KEY: &str = "guy.png";

pub(crate) fn build_scene(tilemap: Tilemap) -> Box<dyn Scene> {
    Box::new(GameplayScene::new(tilemap, PLAYER_TEXTURE_KEY))
}

/// One simulation step: kinematics, then the world clamp, then tile collisions.
pub(crate) fn step_player(
    player: &mut Player,
    delta_seconds: f32,
    input: &InputSnapshot,
    tiles: Option<&impl TileSource>,
) {
    player.update(delta_seconds, input);
    clamp_to_world(player);
    if let Some(tiles) = tiles {
        resolve_collisions(player, tiles);
    }
}
