use engine::{DrawList, InputAction, InputSnapshot, Rect, TextureRegion, Vec2};

const MAX_X_SPEED: f32 = 2.0;
const MAX_Y_SPEED: f32 = 2.0;
pub(crate) const WIDTH: f32 = 16.0;
const HEIGHT: f32 = 16.0;
const MAX_JUMP_DISTANCE: f32 = 4.0 * HEIGHT;
const WALK_FRAME_SECONDS: f32 = 0.25;

const STANDING_REGION: usize = 0;
const WALK_REGIONS: [usize; 2] = [1, 2];
const JUMP_UP_REGION: usize = 3;
const JUMP_DOWN_REGION: usize = 3;
const REGION_COUNT: u32 = 4;

/// Player kinematics. Speeds are in world units per update call and are not
/// scaled by the elapsed time.
#[derive(Debug, Clone)]
pub(crate) struct Player {
    x: f32,
    y: f32,
    x_speed: f32,
    y_speed: f32,
    block_jump: bool,
    jump_y_distance: f32,
    collision_rectangle: Rect,
    animation_timer: f32,
    regions: Vec<TextureRegion>,
    // Flip state lives on each region and persists while standing still.
    region_flipped: [bool; REGION_COUNT as usize],
}

impl Player {
    pub(crate) fn new(texture_key: &str) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            x_speed: 0.0,
            y_speed: 0.0,
            block_jump: false,
            jump_y_distance: 0.0,
            collision_rectangle: Rect::new(0.0, 0.0, WIDTH, HEIGHT),
            animation_timer: 0.0,
            regions: TextureRegion::split_row(
                texture_key,
                WIDTH as u32,
                HEIGHT as u32,
                REGION_COUNT,
            ),
            region_flipped: [false; REGION_COUNT as usize],
        }
    }

    pub(crate) fn update(&mut self, delta_seconds: f32, input: &InputSnapshot) {
        self.animation_timer += delta_seconds;

        self.x_speed = if input.is_down(InputAction::MoveRight) {
            MAX_X_SPEED
        } else if input.is_down(InputAction::MoveLeft) {
            -MAX_X_SPEED
        } else {
            0.0
        };

        if input.is_down(InputAction::MoveUp) && !self.block_jump {
            self.y_speed = MAX_Y_SPEED;
            self.jump_y_distance += self.y_speed;
            self.block_jump = self.jump_y_distance > MAX_JUMP_DISTANCE;
        } else {
            // Falling reuses the horizontal limit.
            self.y_speed = -MAX_X_SPEED;
            self.block_jump = self.jump_y_distance > 0.0;
        }

        self.x += self.x_speed;
        self.y += self.y_speed;
        self.sync_collision_rectangle();
    }

    pub(crate) fn landed(&mut self) {
        self.block_jump = false;
        self.jump_y_distance = 0.0;
        self.y_speed = 0.0;
    }

    pub(crate) fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.sync_collision_rectangle();
    }

    pub(crate) fn x(&self) -> f32 {
        self.x
    }

    pub(crate) fn y(&self) -> f32 {
        self.y
    }

    pub(crate) fn y_speed(&self) -> f32 {
        self.y_speed
    }

    pub(crate) fn block_jump(&self) -> bool {
        self.block_jump
    }

    pub(crate) fn jump_y_distance(&self) -> f32 {
        self.jump_y_distance
    }

    pub(crate) fn collision_rectangle(&self) -> Rect {
        self.collision_rectangle
    }

    pub(crate) fn draw(&mut self, draw: &mut DrawList) {
        let index = self.visual_region_index();
        if self.x_speed < 0.0 {
            self.region_flipped[index] = true;
        } else if self.x_speed > 0.0 {
            self.region_flipped[index] = false;
        }

        if let Some(region) = self.regions.get(index) {
            draw.draw_region(
                region,
                Vec2::new(self.x, self.y),
                self.region_flipped[index],
            );
        }
    }

    pub(crate) fn draw_debug(&self, draw: &mut DrawList) {
        draw.debug_rect(self.collision_rectangle);
    }

    fn visual_region_index(&self) -> usize {
        let mut index = STANDING_REGION;
        if self.x_speed != 0.0 {
            index = walk_region_at(self.animation_timer);
        }
        if self.y_speed > 0.0 {
            index = JUMP_UP_REGION;
        } else if self.y_speed < 0.0 {
            index = JUMP_DOWN_REGION;
        }
        index
    }

    fn sync_collision_rectangle(&mut self) {
        self.collision_rectangle.set_position(self.x, self.y);
    }
}

fn walk_region_at(elapsed_seconds: f32) -> usize {
    let frame = (elapsed_seconds / WALK_FRAME_SECONDS) as usize % WALK_REGIONS.len();
    WALK_REGIONS[frame]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(actions: &[InputAction]) -> InputSnapshot {
        let mut snapshot = InputSnapshot::empty();
        for action in actions {
            snapshot = snapshot.with_action_down(*action, true);
        }
        snapshot
    }

    #[test]
    fn right_takes_priority_over_left() {
        let mut player = Player::new("guy.png");
        player.update(0.016, &held(&[InputAction::MoveLeft, InputAction::MoveRight]));

        assert_eq!(player.x(), 2.0);
    }

    #[test]
    fn movement_is_per_call_and_ignores_delta() {
        let mut player = Player::new("guy.png");
        player.update(1.0, &held(&[InputAction::MoveLeft]));
        player.update(0.001, &held(&[InputAction::MoveLeft]));

        assert_eq!(player.x(), -4.0);
    }

    #[test]
    fn falling_uses_horizontal_speed_limit() {
        let mut player = Player::new("guy.png");
        player.set_position(10.0, 100.0);
        player.update(0.016, &InputSnapshot::empty());

        assert_eq!(player.y_speed(), -2.0);
        assert_eq!(player.y(), 98.0);
    }

    #[test]
    fn jump_distance_stops_growing_past_cap() {
        let mut player = Player::new("guy.png");
        let up = held(&[InputAction::MoveUp]);
        for _ in 0..33 {
            player.update(0.016, &up);
        }
        assert_eq!(player.jump_y_distance(), 66.0);
        assert!(player.block_jump());
        assert_eq!(player.y(), 66.0);

        for _ in 0..5 {
            player.update(0.016, &up);
        }
        assert_eq!(player.jump_y_distance(), 66.0);
        assert!(player.block_jump());
        assert_eq!(player.y_speed(), -2.0);
    }

    #[test]
    fn releasing_up_mid_jump_keeps_jump_blocked_until_landed() {
        let mut player = Player::new("guy.png");
        player.update(0.016, &held(&[InputAction::MoveUp]));
        player.update(0.016, &InputSnapshot::empty());
        player.update(0.016, &held(&[InputAction::MoveUp]));

        assert!(player.block_jump());
        assert_eq!(player.y_speed(), -2.0);

        player.landed();
        assert!(!player.block_jump());
        assert_eq!(player.jump_y_distance(), 0.0);
        assert_eq!(player.y_speed(), 0.0);

        player.update(0.016, &held(&[InputAction::MoveUp]));
        assert_eq!(player.y_speed(), 2.0);
    }

    #[test]
    fn set_position_keeps_collision_rectangle_in_sync() {
        let mut player = Player::new("guy.png");
        player.set_position(40.0, 72.0);
        assert_eq!(
            player.collision_rectangle(),
            Rect::new(40.0, 72.0, 16.0, 16.0)
        );

        player.set_position(40.0, 72.0);
        assert_eq!(
            player.collision_rectangle(),
            Rect::new(40.0, 72.0, 16.0, 16.0)
        );
    }

    #[test]
    fn update_moves_collision_rectangle() {
        let mut player = Player::new("guy.png");
        player.set_position(100.0, 100.0);
        player.update(0.016, &held(&[InputAction::MoveRight]));

        assert_eq!(
            player.collision_rectangle(),
            Rect::new(102.0, 98.0, 16.0, 16.0)
        );
    }

    #[test]
    fn airborne_player_draws_jump_region() {
        let mut player = Player::new("guy.png");
        let mut draw = DrawList::default();
        player.update(0.016, &held(&[InputAction::MoveUp]));
        player.draw(&mut draw);

        let sprite = &draw.sprites()[0];
        assert_eq!(sprite.region.x, 48);
        assert_eq!(sprite.position, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn walk_animation_loops_every_quarter_second() {
        assert_eq!(walk_region_at(0.0), 1);
        assert_eq!(walk_region_at(0.3), 2);
        assert_eq!(walk_region_at(0.6), 1);
        assert_eq!(walk_region_at(0.8), 2);
    }

    #[test]
    fn debug_rect_matches_collision_rectangle() {
        let mut player = Player::new("guy.png");
        player.set_position(8.0, 24.0);
        let mut draw = DrawList::default();
        player.draw_debug(&mut draw);

        assert_eq!(draw.debug_rects()[0].rect, Rect::new(8.0, 24.0, 16.0, 16.0));
    }
}
