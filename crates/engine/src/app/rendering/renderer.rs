use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use tracing::warn;
use winit::window::Window;

use crate::app::{DrawList, SceneWorld, TextureRegion, Tilemap, Vec2};

use super::{world_to_buffer_px, Viewport};

const CLEAR_COLOR: [u8; 4] = [255, 0, 0, 255];
const PLACEHOLDER_COLOR: [u8; 4] = [220, 220, 240, 255];
const TILE_FALLBACK_COLORS: [[u8; 4]; 4] = [
    [74, 112, 56, 255],
    [112, 83, 58, 255],
    [96, 96, 110, 255],
    [68, 74, 62, 255],
];

struct LoadedTexture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// Software renderer painting into a world-sized pixel buffer. `pixels` scales the
/// buffer into the window surface and letterboxes the remainder.
pub struct Renderer {
    pixels: Pixels<'static>,
    viewport: Viewport,
    textures_dir: PathBuf,
    texture_cache: HashMap<String, Option<LoadedTexture>>,
    warned_texture_keys: HashSet<String>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, viewport: Viewport, textures_dir: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, window);
        let pixels = Pixels::new(viewport.width, viewport.height, surface)?;
        Ok(Self {
            pixels,
            viewport,
            textures_dir,
            texture_cache: HashMap::new(),
            warned_texture_keys: HashSet::new(),
        })
    }

    /// Only the output surface changes; the world-sized buffer stays fixed.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    pub(crate) fn render_frame(
        &mut self,
        world: &SceneWorld,
        draw: &DrawList,
        draw_debug: bool,
    ) -> Result<(), Error> {
        let viewport = self.viewport;
        let textures_dir = self.textures_dir.as_path();
        let texture_cache = &mut self.texture_cache;
        let warned_texture_keys = &mut self.warned_texture_keys;
        let frame = self.pixels.frame_mut();

        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }

        if let Some(tilemap) = world.tilemap() {
            draw_tilemap(
                frame,
                viewport,
                tilemap,
                texture_cache,
                warned_texture_keys,
                textures_dir,
            );
        }

        for sprite in draw.sprites() {
            let region = &sprite.region;
            let (left, top) = world_to_buffer_px(sprite.position, region.height as f32, viewport);
            match resolve_cached_texture(
                texture_cache,
                warned_texture_keys,
                textures_dir,
                &region.texture_key,
            ) {
                Some(texture) => {
                    blit_region(frame, viewport, texture, region, left, top, sprite.flip_x)
                }
                None => fill_rect(
                    frame,
                    viewport,
                    left,
                    top,
                    region.width,
                    region.height,
                    PLACEHOLDER_COLOR,
                ),
            }
        }

        if draw_debug {
            for debug in draw.debug_rects() {
                let origin = Vec2::new(debug.rect.x, debug.rect.y);
                let (left, top) = world_to_buffer_px(origin, debug.rect.height, viewport);
                draw_rect_outline(
                    frame,
                    viewport,
                    left,
                    top,
                    debug.rect.width.round() as u32,
                    debug.rect.height.round() as u32,
                    debug.color,
                );
            }
        }

        self.pixels.render()
    }
}

fn draw_tilemap(
    frame: &mut [u8],
    viewport: Viewport,
    tilemap: &Tilemap,
    texture_cache: &mut HashMap<String, Option<LoadedTexture>>,
    warned_texture_keys: &mut HashSet<String>,
    textures_dir: &Path,
) {
    let tile_height = tilemap.tile_height() as f32;
    for y in 0..tilemap.height() {
        for x in 0..tilemap.width() {
            let Some(tile_id) = tilemap.tile_at(x as i32, y as i32) else {
                continue;
            };
            let Some(origin) = tilemap.tile_origin_world(x, y) else {
                continue;
            };
            let (left, top) = world_to_buffer_px(origin, tile_height, viewport);

            let region = tilemap
                .tileset()
                .and_then(|tileset| tileset.region_for(tile_id));
            if let Some(region) = region {
                if let Some(texture) = resolve_cached_texture(
                    texture_cache,
                    warned_texture_keys,
                    textures_dir,
                    &region.texture_key,
                ) {
                    blit_region(frame, viewport, texture, &region, left, top, false);
                    continue;
                }
            }

            let color = TILE_FALLBACK_COLORS[tile_id.0 as usize % TILE_FALLBACK_COLORS.len()];
            fill_rect(
                frame,
                viewport,
                left,
                top,
                tilemap.tile_width(),
                tilemap.tile_height(),
                color,
            );
        }
    }
}

fn resolve_cached_texture<'a>(
    cache: &'a mut HashMap<String, Option<LoadedTexture>>,
    warned_texture_keys: &mut HashSet<String>,
    textures_dir: &Path,
    key: &str,
) -> Option<&'a LoadedTexture> {
    if !cache.contains_key(key) {
        let path = textures_dir.join(key);
        let loaded = match load_texture_rgba(&path) {
            Ok(texture) => Some(texture),
            Err(reason) => {
                warn_texture_load_once(warned_texture_keys, key, &path, &reason);
                None
            }
        };
        cache.insert(key.to_string(), loaded);
    }
    cache.get(key).and_then(Option::as_ref)
}

fn load_texture_rgba(path: &Path) -> Result<LoadedTexture, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedTexture {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn warn_texture_load_once(warned_keys: &mut HashSet<String>, key: &str, path: &Path, reason: &str) {
    if !warned_keys.insert(key.to_string()) {
        return;
    }
    warn!(
        texture_key = key,
        path = %path.display(),
        reason = reason,
        "renderer_texture_load_failed_using_placeholder"
    );
}

fn write_pixel_rgba_clipped(frame: &mut [u8], viewport: Viewport, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x >= viewport.width as i32 || y >= viewport.height as i32 {
        return;
    }
    let offset = (y as usize * viewport.width as usize + x as usize) * 4;
    if let Some(pixel) = frame.get_mut(offset..offset + 4) {
        pixel.copy_from_slice(&color);
    }
}

fn fill_rect(
    frame: &mut [u8],
    viewport: Viewport,
    left: i32,
    top: i32,
    width: u32,
    height: u32,
    color: [u8; 4],
) {
    for y in top..top + height as i32 {
        for x in left..left + width as i32 {
            write_pixel_rgba_clipped(frame, viewport, x, y, color);
        }
    }
}

fn draw_rect_outline(
    frame: &mut [u8],
    viewport: Viewport,
    left: i32,
    top: i32,
    width: u32,
    height: u32,
    color: [u8; 4],
) {
    if width == 0 || height == 0 {
        return;
    }
    let right = left + width as i32 - 1;
    let bottom = top + height as i32 - 1;
    for x in left..=right {
        write_pixel_rgba_clipped(frame, viewport, x, top, color);
        write_pixel_rgba_clipped(frame, viewport, x, bottom, color);
    }
    for y in top..=bottom {
        write_pixel_rgba_clipped(frame, viewport, left, y, color);
        write_pixel_rgba_clipped(frame, viewport, right, y, color);
    }
}

/// Copies `region` of `texture` with its top-left at `(left, top)`. Fully transparent
/// texels are skipped; regions reaching past the texture edge are cropped.
fn blit_region(
    frame: &mut [u8],
    viewport: Viewport,
    texture: &LoadedTexture,
    region: &TextureRegion,
    left: i32,
    top: i32,
    flip_x: bool,
) {
    let expected_len = texture.width as usize * texture.height as usize * 4;
    if texture.rgba.len() < expected_len {
        return;
    }
    let region_width = region
        .width
        .min(texture.width.saturating_sub(region.x));
    let region_height = region
        .height
        .min(texture.height.saturating_sub(region.y));

    for dy in 0..region_height {
        let src_y = (region.y + dy) as usize;
        for dx in 0..region_width {
            let src_dx = if flip_x { region_width - 1 - dx } else { dx };
            let src_x = (region.x + src_dx) as usize;
            let src_offset = (src_y * texture.width as usize + src_x) * 4;
            let texel = &texture.rgba[src_offset..src_offset + 4];
            if texel[3] == 0 {
                continue;
            }
            write_pixel_rgba_clipped(
                frame,
                viewport,
                left + dx as i32,
                top + dy as i32,
                [texel[0], texel[1], texel[2], texel[3]],
            );
        }
    }
}
