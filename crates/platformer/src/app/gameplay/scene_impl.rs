use engine::{DrawList, InputSnapshot, Scene, SceneCommand, SceneWorld, Tilemap};
use tracing::info;

use super::{step_player, Player};

/// Single-level scene: the loaded map plus one player spawned at the world origin.
pub(crate) struct GameplayScene {
    tilemap: Tilemap,
    player_texture_key: &'static str,
    player: Player,
}

impl GameplayScene {
    pub(crate) fn new(tilemap: Tilemap, player_texture_key: &'static str) -> Self {
        Self {
            tilemap,
            player_texture_key,
            player: Player::new(player_texture_key),
        }
    }
}

impl Scene for GameplayScene {
    fn load(&mut self, world: &mut SceneWorld) {
        world.set_tilemap(self.tilemap.clone());
        self.player = Player::new(self.player_texture_key);
        info!(
            map_width = self.tilemap.width(),
            map_height = self.tilemap.height(),
            player_x = self.player.x(),
            player_y = self.player.y(),
            "level_started"
        );
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.restart_pressed() {
            return SceneCommand::HardReset;
        }

        step_player(&mut self.player, fixed_dt_seconds, input, world.tilemap());
        SceneCommand::None
    }

    fn render(&mut self, _world: &SceneWorld, draw: &mut DrawList) {
        self.player.draw(draw);
        self.player.draw_debug(draw);
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        world.clear_tilemap();
        info!("level_unloaded");
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        Some(format!(
            "Platformer | pos ({:.0}, {:.0}) | vy {:.0} | jump {:.0}{}",
            self.player.x(),
            self.player.y(),
            self.player.y_speed(),
            self.player.jump_y_distance(),
            if self.player.block_jump() { " (blocked)" } else { "" }
        ))
    }
}

#[cfg(test)]
mod tests {
    use engine::{InputAction, Rect, Vec2};

    use super::*;

    fn ground_map() -> Tilemap {
        let width = 40u32;
        let height = 30u32;
        let mut tiles = vec![0u32; (width * height) as usize];
        tiles[..width as usize].fill(1);
        Tilemap::new(width, height, 16, 16, tiles).expect("tilemap")
    }

    fn loaded_scene() -> (GameplayScene, SceneWorld) {
        let mut scene = GameplayScene::new(ground_map(), "guy.png");
        let mut world = SceneWorld::default();
        scene.load(&mut world);
        (scene, world)
    }

    #[test]
    fn load_publishes_tilemap_to_world() {
        let (_scene, world) = loaded_scene();
        assert_eq!(world.tilemap().map(Tilemap::width), Some(40));
    }

    #[test]
    fn update_runs_kinematics_clamp_and_collision() {
        let (mut scene, mut world) = loaded_scene();
        scene.player.set_position(100.0, 16.0);
        let right = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);

        let command = scene.update(1.0 / 60.0, &right, &mut world);

        assert_eq!(command, SceneCommand::None);
        assert_eq!((scene.player.x(), scene.player.y()), (102.0, 16.0));
        assert_eq!(scene.player.y_speed(), 0.0);
    }

    #[test]
    fn spawn_inside_solid_cell_is_clamped_but_not_pushed_out() {
        let (mut scene, mut world) = loaded_scene();
        scene.update(1.0 / 60.0, &InputSnapshot::empty(), &mut world);

        assert_eq!((scene.player.x(), scene.player.y()), (0.0, 0.0));
        assert_eq!(scene.player.y_speed(), 0.0);
    }

    #[test]
    fn restart_requests_hard_reset_without_moving() {
        let (mut scene, mut world) = loaded_scene();
        scene.player.set_position(50.0, 50.0);
        let input = InputSnapshot::empty().with_restart_pressed(true);

        let command = scene.update(1.0 / 60.0, &input, &mut world);

        assert_eq!(command, SceneCommand::HardReset);
        assert_eq!((scene.player.x(), scene.player.y()), (50.0, 50.0));
    }

    #[test]
    fn reload_respawns_player_at_origin() {
        let (mut scene, mut world) = loaded_scene();
        scene.player.set_position(50.0, 50.0);
        scene.unload(&mut world);
        assert!(world.tilemap().is_none());

        scene.load(&mut world);
        assert_eq!((scene.player.x(), scene.player.y()), (0.0, 0.0));
    }

    #[test]
    fn render_emits_sprite_then_debug_rect() {
        let (mut scene, world) = loaded_scene();
        scene.player.set_position(64.0, 32.0);
        let mut draw = DrawList::default();

        scene.render(&world, &mut draw);

        assert_eq!(draw.sprites().len(), 1);
        assert_eq!(draw.sprites()[0].position, Vec2::new(64.0, 32.0));
        assert_eq!(draw.debug_rects()[0].rect, Rect::new(64.0, 32.0, 16.0, 16.0));
    }

    #[test]
    fn walking_left_flips_only_the_walk_region() {
        let (mut scene, mut world) = loaded_scene();
        scene.player.set_position(200.0, 16.0);
        let left = InputSnapshot::empty().with_action_down(InputAction::MoveLeft, true);
        let mut draw = DrawList::default();

        scene.update(0.1, &left, &mut world);
        scene.render(&world, &mut draw);
        assert_eq!(draw.sprites()[0].region.x, 16);
        assert!(draw.sprites()[0].flip_x);

        draw.clear();
        scene.update(0.1, &InputSnapshot::empty(), &mut world);
        scene.render(&world, &mut draw);
        assert_eq!(draw.sprites()[0].region.x, 0);
        assert!(!draw.sprites()[0].flip_x);
    }

    #[test]
    fn debug_title_reports_position() {
        let (mut scene, world) = loaded_scene();
        scene.player.set_position(12.0, 34.0);

        let title = scene.debug_title(&world).expect("title");
        assert!(title.contains("pos (12, 34)"));
    }
}
