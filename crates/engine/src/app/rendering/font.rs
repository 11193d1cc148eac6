use super::raster::Frame;

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub scale: i32,
    pub color: [u8; 4],
    pub shadow: Option<[u8; 4]>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            scale: 2,
            color: [255, 255, 255, 255],
            shadow: Some([0, 0, 0, 255]),
        }
    }
}

impl TextStyle {
    pub fn advance(&self) -> i32 {
        (GLYPH_WIDTH + 1) * self.scale.max(1)
    }

    pub fn line_height(&self) -> i32 {
        (GLYPH_HEIGHT + 2) * self.scale.max(1)
    }

    pub fn text_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * self.advance()
    }
}

const FALLBACK_CHAR: char = '?';

// Printable ASCII from ' ' to '~'; five 3-bit rows, top row in the high bits.
const GLYPH_ROWS: [u16; 95] = [
    0x0000, 0x2482, 0x5a00, 0x5f7d, 0x7ddf, 0x52a5, 0x2aab, 0x2400,
    0x1491, 0x4494, 0x0aa8, 0x05d0, 0x0014, 0x01c0, 0x0002, 0x12a4,
    0x7b6f, 0x2c97, 0x73e7, 0x73cf, 0x5bc9, 0x79cf, 0x79ef, 0x7292,
    0x7bef, 0x7bcf, 0x0410, 0x0414, 0x1511, 0x0e38, 0x4454, 0x72c2,
    0x7be7, 0x2bed, 0x6bae, 0x7927, 0x6b6e, 0x79a7, 0x79a4, 0x796f,
    0x5bed, 0x7497, 0x726f, 0x5bad, 0x4927, 0x5fed, 0x5ffd, 0x7b6f,
    0x6ba4, 0x7b79, 0x6bad, 0x79cf, 0x7492, 0x5b6f, 0x5b6a, 0x5bfd,
    0x5aad, 0x5a92, 0x72a7, 0x6926, 0x4889, 0x324b, 0x2a00, 0x0007,
    0x4400, 0x0e7f, 0x49ae, 0x0f27, 0x13ef, 0x0fa7, 0x39a4, 0x0f79,
    0x49ad, 0x2092, 0x106a, 0x4bad, 0x4927, 0x0ded, 0x0d6d, 0x0f6f,
    0x0d74, 0x0f79, 0x0d64, 0x0f8f, 0x2e93, 0x0b6f, 0x0b6a, 0x0b7a,
    0x0a95, 0x0b79, 0x0e57, 0x3593, 0x2492, 0x64d6, 0x0780,
];

fn glyph_bits(ch: char) -> u16 {
    let index = match ch {
        ' '..='~' => ch as usize - ' ' as usize,
        _ => FALLBACK_CHAR as usize - ' ' as usize,
    };
    GLYPH_ROWS[index]
}

fn glyph_pixel_set(bits: u16, row: i32, col: i32) -> bool {
    let shift = (GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH + (GLYPH_WIDTH - 1 - col);
    bits & (1 << shift) != 0
}

pub(crate) fn draw_text(frame: &mut Frame<'_>, x: i32, y: i32, text: &str, style: TextStyle) {
    if let Some(shadow) = style.shadow {
        draw_text_pass(frame, x + 1, y + 1, text, style.scale, shadow);
    }
    draw_text_pass(frame, x, y, text, style.scale, style.color);
}

fn draw_text_pass(frame: &mut Frame<'_>, x: i32, y: i32, text: &str, scale: i32, color: [u8; 4]) {
    let scale = scale.max(1);
    let advance = (GLYPH_WIDTH + 1) * scale;
    let mut pen_x = x;
    for ch in text.chars() {
        let bits = glyph_bits(ch);
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if glyph_pixel_set(bits, row, col) {
                    frame.fill_rect(pen_x + col * scale, y + row * scale, scale, scale, color);
                }
            }
        }
        pen_x += advance;
    }
}
