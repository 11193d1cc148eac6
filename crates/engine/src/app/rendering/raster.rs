//! Clipped software rasterisation into an RGBA8 frame.

pub(crate) struct Frame<'a> {
    pub(crate) pixels: &'a mut [u8],
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(pixels: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }

    pub(crate) fn fill(&mut self, color: [u8; 4]) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    /// Source-over blend; out-of-bounds coordinates are ignored.
    pub(crate) fn blend_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let alpha = color[3];
        if alpha == 0 {
            return;
        }
        let Some(offset) = (y as usize)
            .checked_mul(self.width as usize)
            .and_then(|row| row.checked_add(x as usize))
            .and_then(|pixel| pixel.checked_mul(4))
        else {
            return;
        };
        let Some(dst) = self.pixels.get_mut(offset..offset + 4) else {
            return;
        };
        if alpha == 255 {
            dst.copy_from_slice(&color);
            return;
        }
        let a = alpha as u32;
        for channel in 0..3 {
            let src = color[channel] as u32;
            let base = dst[channel] as u32;
            dst[channel] = ((src * a + base * (255 - a) + 127) / 255) as u8;
        }
        dst[3] = 255;
    }

    pub(crate) fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: [u8; 4]) {
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = x.saturating_add(width).min(self.width as i32);
        let end_y = y.saturating_add(height).min(self.height as i32);
        for py in start_y..end_y {
            for px in start_x..end_x {
                self.blend_pixel(px, py, color);
            }
        }
    }

    pub(crate) fn outline_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        thickness: i32,
        color: [u8; 4],
    ) {
        let thickness = thickness.max(1);
        if width <= thickness * 2 || height <= thickness * 2 {
            self.fill_rect(x, y, width, height, color);
            return;
        }
        self.fill_rect(x, y, width, thickness, color);
        self.fill_rect(x, y + height - thickness, width, thickness, color);
        self.fill_rect(x, y + thickness, thickness, height - thickness * 2, color);
        self.fill_rect(
            x + width - thickness,
            y + thickness,
            thickness,
            height - thickness * 2,
            color,
        );
    }

    pub(crate) fn fill_ellipse(
        &mut self,
        center_x: f32,
        center_y: f32,
        radius_x: f32,
        radius_y: f32,
        color: [u8; 4],
    ) {
        if !(radius_x > 0.0 && radius_y > 0.0) {
            return;
        }
        let top = (center_y - radius_y).floor() as i32;
        let bottom = (center_y + radius_y).ceil() as i32;
        let left = (center_x - radius_x).floor() as i32;
        let right = (center_x + radius_x).ceil() as i32;
        for py in top..=bottom {
            let dy = (py as f32 + 0.5 - center_y) / radius_y;
            for px in left..=right {
                let dx = (px as f32 + 0.5 - center_x) / radius_x;
                if dx * dx + dy * dy <= 1.0 {
                    self.blend_pixel(px, py, color);
                }
            }
        }
    }

    pub(crate) fn fill_diamond(
        &mut self,
        center_x: f32,
        center_y: f32,
        half_width: f32,
        half_height: f32,
        color: [u8; 4],
    ) {
        if !(half_width > 0.0 && half_height > 0.0) {
            return;
        }
        let top = (center_y - half_height).floor() as i32;
        let bottom = (center_y + half_height).ceil() as i32;
        let left = (center_x - half_width).floor() as i32;
        let right = (center_x + half_width).ceil() as i32;
        for py in top..=bottom {
            let dy = ((py as f32 + 0.5 - center_y) / half_height).abs();
            for px in left..=right {
                let dx = ((px as f32 + 0.5 - center_x) / half_width).abs();
                if dx + dy <= 1.0 {
                    self.blend_pixel(px, py, color);
                }
            }
        }
    }
}
