use super::draw_list::{DrawList, TextureRegion};
use super::geometry::Vec2;
use super::input::{ActionStates, InputAction};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    HardReset,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    restart_pressed: bool,
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(restart_pressed: bool, actions: ActionStates) -> Self {
        Self {
            restart_pressed,
            actions,
        }
    }

    pub fn restart_pressed(&self) -> bool {
        self.restart_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_restart_pressed(mut self, restart_pressed: bool) -> Self {
        self.restart_pressed = restart_pressed;
        self
    }
}

/// Global tile id as stored in the map layer. Empty cells have no id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tileset {
    pub first_gid: u32,
    pub texture_key: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
}

impl Tileset {
    pub fn region_for(&self, id: TileId) -> Option<TextureRegion> {
        if self.columns == 0 {
            return None;
        }
        let local = id.0.checked_sub(self.first_gid)?;
        Some(TextureRegion {
            texture_key: self.texture_key.clone(),
            x: (local % self.columns) * self.tile_width,
            y: (local / self.columns) * self.tile_height,
            width: self.tile_width,
            height: self.tile_height,
        })
    }
}

/// Tilemap origin convention:
/// - cell (0,0) is the bottom-left cell at world origin; x grows right, y grows up.
/// - cell (x,y) covers `[x * tile_width, (x + 1) * tile_width)` horizontally and the
///   matching band vertically.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    tiles: Vec<u32>,
    tileset: Option<Tileset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
}

impl Tilemap {
    /// `tiles` is row-major starting at the bottom row; `0` marks an empty cell.
    pub fn new(
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
        tiles: Vec<u32>,
    ) -> Result<Self, TilemapError> {
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            tile_width,
            tile_height,
            tiles,
            tileset: None,
        })
    }

    pub fn with_tileset(mut self, tileset: Tileset) -> Self {
        self.tileset = Some(tileset);
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn tileset(&self) -> Option<&Tileset> {
        self.tileset.as_ref()
    }

    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Out-of-range coordinates, negative ones included, read as empty.
    pub fn tile_at(&self, x: i32, y: i32) -> Option<TileId> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        self.index_of(x, y)
            .and_then(|index| self.tiles.get(index).copied())
            .filter(|gid| *gid != 0)
            .map(TileId)
    }

    pub fn tile_origin_world(&self, x: u32, y: u32) -> Option<Vec2> {
        self.index_of(x, y)?;
        Some(Vec2 {
            x: (x * self.tile_width) as f32,
            y: (y * self.tile_height) as f32,
        })
    }
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    tilemap: Option<Tilemap>,
}

impl SceneWorld {
    pub fn set_tilemap(&mut self, tilemap: Tilemap) {
        self.tilemap = Some(tilemap);
    }

    pub fn clear_tilemap(&mut self) {
        self.tilemap = None;
    }

    pub fn tilemap(&self) -> Option<&Tilemap> {
        self.tilemap.as_ref()
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn render(&mut self, world: &SceneWorld, draw: &mut DrawList);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

pub(crate) struct SceneHost {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    draw_list: DrawList,
    is_loaded: bool,
}

impl SceneHost {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            draw_list: DrawList::default(),
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load(&mut self.world);
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        self.scene.update(fixed_dt_seconds, input, &mut self.world)
    }

    pub(crate) fn render(&mut self) {
        self.draw_list.clear();
        self.scene.render(&self.world, &mut self.draw_list);
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub(crate) fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title(&self.world)
    }

    pub(crate) fn hard_reset(&mut self) {
        if self.is_loaded {
            self.scene.unload(&mut self.world);
        }
        self.world.clear_tilemap();
        self.scene.load(&mut self.world);
        self.is_loaded = true;
    }

    pub(crate) fn shutdown(&mut self) {
        if !self.is_loaded {
            return;
        }
        self.scene.unload(&mut self.world);
        self.world.clear_tilemap();
        self.is_loaded = false;
    }
}
