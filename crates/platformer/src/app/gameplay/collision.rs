use engine::{Rect, TileId, Tilemap};
use tracing::trace;

use super::player::{Player, WIDTH as PLAYER_WIDTH};
use super::{CELL_SIZE, WORLD_WIDTH};

/// Tile id drawn in the map but passable.
const PASS_THROUGH_TILE: TileId = TileId(4);

/// Grid lookup used by the coverage query. `row` indexes the horizontal axis and
/// `col` the vertical one; out-of-range cells read as empty.
pub(crate) trait TileSource {
    fn tile_at(&self, row: i32, col: i32) -> Option<TileId>;
}

impl TileSource for Tilemap {
    fn tile_at(&self, row: i32, col: i32) -> Option<TileId> {
        Tilemap::tile_at(self, row, col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CollisionCell {
    pub(crate) tile: Option<TileId>,
    pub(crate) row: i32,
    pub(crate) col: i32,
}

impl CollisionCell {
    fn at(tiles: &impl TileSource, row: i32, col: i32) -> Self {
        Self {
            tile: tiles.tile_at(row, col),
            row,
            col,
        }
    }

    pub(crate) fn is_solid(&self) -> bool {
        matches!(self.tile, Some(tile) if tile != PASS_THROUGH_TILE)
    }

    pub(crate) fn world_rect(&self) -> Rect {
        Rect::new(
            self.row as f32 * CELL_SIZE,
            self.col as f32 * CELL_SIZE,
            CELL_SIZE,
            CELL_SIZE,
        )
    }
}

/// Cells under a box whose bottom-left corner is at `(x, y)`, bottom-left cell first,
/// then the diagonal, row-shifted and col-shifted neighbours when the position is
/// not aligned on that axis.
pub(crate) fn covered_cells(x: f32, y: f32, tiles: &impl TileSource) -> Vec<CollisionCell> {
    let cell_row = x / CELL_SIZE;
    let cell_col = y / CELL_SIZE;
    let row = cell_row.floor() as i32;
    let col = cell_col.floor() as i32;
    let row_offset = cell_row.fract() != 0.0;
    let col_offset = cell_col.fract() != 0.0;

    let mut cells = Vec::with_capacity(4);
    cells.push(CollisionCell::at(tiles, row, col));
    if row_offset && col_offset {
        cells.push(CollisionCell::at(tiles, row + 1, col + 1));
    }
    if row_offset {
        cells.push(CollisionCell::at(tiles, row + 1, col));
    }
    if col_offset {
        cells.push(CollisionCell::at(tiles, row, col + 1));
    }
    cells
}

pub(crate) fn solid_cells(cells: &[CollisionCell]) -> Vec<CollisionCell> {
    cells.iter().copied().filter(CollisionCell::is_solid).collect()
}

/// Resolves each solid cell in coverage order with no re-check between cells.
/// Shallow vertical overlaps always push the player up onto the cell. Returns the
/// cells covered at the resolved position.
pub(crate) fn resolve_collisions(
    player: &mut Player,
    tiles: &impl TileSource,
) -> Vec<CollisionCell> {
    let covered = covered_cells(player.x(), player.y(), tiles);
    for cell in solid_cells(&covered) {
        let Some(intersection) = player.collision_rectangle().intersection(&cell.world_rect())
        else {
            continue;
        };

        if intersection.height < intersection.width {
            player.set_position(player.x(), intersection.top());
            player.landed();
        } else if intersection.width < intersection.height {
            if intersection.x == player.x() {
                player.set_position(intersection.right(), player.y());
            } else if intersection.x > player.x() {
                player.set_position(intersection.x - PLAYER_WIDTH, player.y());
            }
        }
    }

    let resolved = covered_cells(player.x(), player.y(), tiles);
    trace!(cells = ?resolved, "player_cells_covered");
    resolved
}

/// Keeps the player inside the left, right and bottom world edges. The top is open.
pub(crate) fn clamp_to_world(player: &mut Player) {
    if player.y() < 0.0 {
        player.set_position(player.x(), 0.0);
        player.landed();
    }
    if player.x() < 0.0 {
        player.set_position(0.0, player.y());
    }
    if player.x() + PLAYER_WIDTH > WORLD_WIDTH {
        player.set_position(WORLD_WIDTH - PLAYER_WIDTH, player.y());
    }
}
