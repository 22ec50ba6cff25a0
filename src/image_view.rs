//! Half-block rendering of generated landmark images

use crate::content::GeneratedImage;
use crate::terminal::Terminal;
use crossterm::style::Color;
use image::{DynamicImage, RgbaImage};
use std::sync::Arc;

/// Alpha threshold below which a pixel is considered transparent
const ALPHA_THRESHOLD: u8 = 10;

/// Decoded image plus its last resize, keyed by the image it came from
pub struct ImageView {
    source: Option<Arc<GeneratedImage>>,
    decoded: Option<DynamicImage>,
    resized: Option<(u16, u16, RgbaImage)>,
}

impl Default for ImageView {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageView {
    pub fn new() -> Self {
        Self { source: None, decoded: None, resized: None }
    }

    /// Swap in `image`, decoding only when it is a different image than last time.
    /// Returns false when the bytes could not be decoded.
    pub fn show(&mut self, image: &Arc<GeneratedImage>) -> bool {
        let same = self.source.as_ref().is_some_and(|s| Arc::ptr_eq(s, image));
        if !same {
            self.source = Some(Arc::clone(image));
            self.resized = None;
            self.decoded = match image::load_from_memory(&image.bytes) {
                Ok(img) => Some(img),
                Err(e) => {
                    tracing::warn!(error = %e, mime = %image.mime_type, "generated image did not decode");
                    None
                }
            };
        }
        self.decoded.is_some()
    }

    pub fn clear(&mut self) {
        self.source = None;
        self.decoded = None;
        self.resized = None;
    }

    /// Draw the current image centered inside the given cell rectangle
    pub fn render(&mut self, term: &mut Terminal, x: u16, y: u16, w: u16, h: u16) {
        let Some(decoded) = &self.decoded else { return };
        let (art_w, art_h) = fit_dimensions(decoded.width(), decoded.height(), w, h);
        if art_w == 0 || art_h == 0 {
            return;
        }

        let stale = !matches!(&self.resized, Some((rw, rh, _)) if *rw == art_w && *rh == art_h);
        if stale {
            let rgba = decoded
                .resize_exact(art_w as u32, art_h as u32 * 2, image::imageops::FilterType::Triangle)
                .to_rgba8();
            self.resized = Some((art_w, art_h, rgba));
        }
        let Some((_, _, rgba)) = &self.resized else { return };

        let x_offset = x + (w - art_w) / 2;
        let y_offset = y + (h - art_h) / 2;
        render_halfblock(term, rgba, x_offset, y_offset, art_w, art_h);
    }
}

/// Largest (cells wide, cells tall) that keeps the image aspect inside `w` x `h`.
/// Each cell shows one pixel across and two down.
pub fn fit_dimensions(img_w: u32, img_h: u32, w: u16, h: u16) -> (u16, u16) {
    if img_w == 0 || img_h == 0 || w == 0 || h == 0 {
        return (0, 0);
    }
    let aspect = img_w as f32 / img_h as f32;
    let width_for_full_height = (h as f32 * 2.0 * aspect).floor() as u16;
    if width_for_full_height <= w {
        (width_for_full_height.max(1), h)
    } else {
        let cells_tall = (w as f32 / aspect / 2.0).floor() as u16;
        (w, cells_tall.clamp(1, h))
    }
}

/// Render an `art_w` x `art_h * 2` pixel image with upper half blocks
pub fn render_halfblock(term: &mut Terminal, rgba: &RgbaImage, x_offset: u16, y_offset: u16, art_w: u16, art_h: u16) {
    for cy in 0..art_h as u32 {
        let top_row = cy * 2;
        let bot_row = cy * 2 + 1;

        for cx in 0..(art_w as u32).min(rgba.width()) {
            if top_row >= rgba.height() {
                return;
            }
            let [tr, tg, tb, ta] = rgba.get_pixel(cx, top_row).0;
            let has_bot = bot_row < rgba.height();
            let [br, bg, bb, ba] = if has_bot { rgba.get_pixel(cx, bot_row).0 } else { [0; 4] };

            let tx = x_offset as i32 + cx as i32;
            let ty = y_offset as i32 + cy as i32;
            let top = Color::Rgb { r: tr, g: tg, b: tb };
            let bot = Color::Rgb { r: br, g: bg, b: bb };

            match (ta >= ALPHA_THRESHOLD, has_bot && ba >= ALPHA_THRESHOLD) {
                (false, false) => {}
                (false, true) => term.set(tx, ty, '▄', Some(bot), false),
                (true, false) => term.set(tx, ty, '▀', Some(top), false),
                (true, true) => term.set_with_bg(tx, ty, '▀', Some(top), Some(bot), false),
            }
        }
    }
}
