use super::geometry::{Rect, Vec2};

pub const DEBUG_RECT_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Sub-rectangle of a texture, in texture pixels with a top-left origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRegion {
    pub texture_key: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TextureRegion {
    /// Cuts the top strip of a texture into `count` equally sized regions, left to right.
    pub fn split_row(texture_key: &str, width: u32, height: u32, count: u32) -> Vec<TextureRegion> {
        (0..count)
            .map(|index| TextureRegion {
                texture_key: texture_key.to_string(),
                x: index * width,
                y: 0,
                width,
                height,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDraw {
    pub region: TextureRegion,
    /// World position of the region's bottom-left corner.
    pub position: Vec2,
    pub flip_x: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugRect {
    pub rect: Rect,
    pub color: [u8; 4],
}

/// Per-frame draw requests collected from a scene. The renderer paints the tile layer
/// first, then sprites in submission order, then the debug rectangles.
#[derive(Debug, Default)]
pub struct DrawList {
    sprites: Vec<SpriteDraw>,
    debug_rects: Vec<DebugRect>,
}

impl DrawList {
    pub fn draw_region(&mut self, region: &TextureRegion, position: Vec2, flip_x: bool) {
        self.sprites.push(SpriteDraw {
            region: region.clone(),
            position,
            flip_x,
        });
    }

    pub fn debug_rect(&mut self, rect: Rect) {
        self.debug_rects.push(DebugRect {
            rect,
            color: DEBUG_RECT_COLOR,
        });
    }

    pub fn sprites(&self) -> &[SpriteDraw] {
        &self.sprites
    }

    pub fn debug_rects(&self) -> &[DebugRect] {
        &self.debug_rects
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
        self.debug_rects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_row_lays_regions_left_to_right() {
        let regions = TextureRegion::split_row("guy.png", 16, 16, 4);
        assert_eq!(regions.len(), 4);
        assert_eq!(
            regions.iter().map(|region| region.x).collect::<Vec<_>>(),
            vec![0, 16, 32, 48]
        );
        assert!(regions.iter().all(|region| region.y == 0 && region.height == 16));
    }

    #[test]
    fn clear_drops_sprites_and_debug_rects() {
        let region = TextureRegion::split_row("guy.png", 16, 16, 1).remove(0);
        let mut draw = DrawList::default();
        draw.draw_region(&region, Vec2::new(3.0, 4.0), true);
        draw.debug_rect(Rect::new(3.0, 4.0, 16.0, 16.0));

        assert_eq!(draw.sprites().len(), 1);
        assert!(draw.sprites()[0].flip_x);
        assert_eq!(draw.debug_rects()[0].color, DEBUG_RECT_COLOR);

        draw.clear();
        assert!(draw.sprites().is_empty());
        assert!(draw.debug_rects().is_empty());
    }
}
