use std::path::PathBuf;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use winit::window::Window;

use crate::app::{Drawable, SceneWorld, Vec2};

use super::font::draw_text;
use super::raster::Frame;
use super::sprites::{LoadedSprite, SpriteCache};

/// Presents a fixed-size scene buffer scaled into the window surface.
pub struct Renderer {
    pixels: Pixels<'static>,
    buffer_width: u32,
    buffer_height: u32,
    sprites: SpriteCache,
}

impl Renderer {
    pub fn new(
        window: Arc<Window>,
        buffer_size: (u32, u32),
        sprites_dir: PathBuf,
    ) -> Result<Self, Error> {
        let size = window.inner_size();
        let (buffer_width, buffer_height) = (buffer_size.0.max(1), buffer_size.1.max(1));
        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(buffer_width, buffer_height, surface)?;
        Ok(Self {
            pixels,
            buffer_width,
            buffer_height,
            sprites: SpriteCache::new(sprites_dir),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    /// Maps a physical window position to scene buffer pixels.
    pub fn window_to_buffer_px(&self, x: f32, y: f32) -> Option<Vec2> {
        self.pixels
            .window_pos_to_pixel((x, y))
            .ok()
            .map(|(px, py)| Vec2::new(px as f32, py as f32))
    }

    pub fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        let frame = self.pixels.frame_mut();
        draw_world(
            frame,
            self.buffer_width,
            self.buffer_height,
            world,
            &mut self.sprites,
        );
        self.pixels.render()
    }
}

pub(crate) fn draw_world(
    pixels: &mut [u8],
    width: u32,
    height: u32,
    world: &SceneWorld,
    sprites: &mut SpriteCache,
) {
    if width == 0 || height == 0 {
        return;
    }
    let mut frame = Frame::new(pixels, width, height);
    frame.fill(world.clear_color());
    for layer in world.layers() {
        for drawable in &layer.drawables {
            draw_drawable(&mut frame, drawable, sprites);
        }
    }
}

fn draw_drawable(frame: &mut Frame<'_>, drawable: &Drawable, sprites: &mut SpriteCache) {
    match drawable {
        Drawable::Rect { rect, color } => frame.fill_rect(
            rect.x.round() as i32,
            rect.y.round() as i32,
            rect.width.round() as i32,
            rect.height.round() as i32,
            *color,
        ),
        Drawable::RectOutline {
            rect,
            thickness,
            color,
        } => frame.outline_rect(
            rect.x.round() as i32,
            rect.y.round() as i32,
            rect.width.round() as i32,
            rect.height.round() as i32,
            *thickness,
            *color,
        ),
        Drawable::Circle {
            center,
            radius,
            color,
        } => frame.fill_ellipse(center.x, center.y, *radius, *radius, *color),
        Drawable::Ellipse {
            center,
            radius_x,
            radius_y,
            color,
        } => frame.fill_ellipse(center.x, center.y, *radius_x, *radius_y, *color),
        Drawable::Diamond {
            center,
            half_width,
            half_height,
            color,
        } => frame.fill_diamond(center.x, center.y, *half_width, *half_height, *color),
        Drawable::Text {
            position,
            text,
            style,
        } => draw_text(
            frame,
            position.x.round() as i32,
            position.y.round() as i32,
            text,
            *style,
        ),
        Drawable::Sprite {
            key,
            center,
            scale,
            fallback,
        } => match sprites.resolve(key) {
            Some(sprite) => draw_sprite_centered_scaled(frame, *center, sprite, *scale),
            None => {
                for part in fallback {
                    draw_drawable(frame, part, sprites);
                }
            }
        },
    }
}

fn normalized_sprite_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

fn draw_sprite_centered_scaled(
    frame: &mut Frame<'_>,
    center: Vec2,
    sprite: &LoadedSprite,
    scale: f32,
) {
    if sprite.width == 0 || sprite.height == 0 {
        return;
    }
    if sprite.rgba.len() < sprite.width as usize * sprite.height as usize * 4 {
        return;
    }

    let scale = normalized_sprite_scale(scale);
    let inv_scale = scale.recip();
    let scaled_w = (sprite.width as f32 * scale).round().max(1.0) as i32;
    let scaled_h = (sprite.height as f32 * scale).round().max(1.0) as i32;
    let left = center.x.round() as i32 - scaled_w / 2;
    let top = center.y.round() as i32 - scaled_h / 2;

    for dy in 0..scaled_h {
        let src_y = ((dy as f32 * inv_scale) as u32).min(sprite.height - 1) as usize;
        for dx in 0..scaled_w {
            let src_x = ((dx as f32 * inv_scale) as u32).min(sprite.width - 1) as usize;
            let offset = (src_y * sprite.width as usize + src_x) * 4;
            let color = [
                sprite.rgba[offset],
                sprite.rgba[offset + 1],
                sprite.rgba[offset + 2],
                sprite.rgba[offset + 3],
            ];
            frame.blend_pixel(left + dx, top + dy, color);
        }
    }
}
