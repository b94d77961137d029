use image::{Rgba, RgbaImage};

use crate::foundation::core::Color;
use crate::surface::{CellPaint, GridSurface, Layer, RenderSurface};

const ZONE_TINT: f64 = 0.35;
const COARSE_EFFECT_MIX: f64 = 0.5;

/// Options for [`rasterize`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterOpts {
    /// Area outside the grid.
    pub background: Color,
    /// Unlit fine cell.
    pub cell: Color,
    /// Output pixels per viewport pixel.
    pub scale: f64,
    /// Leave a one-pixel gutter between fine cells when they are large enough.
    pub gutter: bool,
}

impl Default for RasterOpts {
    fn default() -> Self {
        Self {
            background: Color::rgb(0x0b, 0x0c, 0x10),
            cell: Color::rgb(0x1a, 0x1c, 0x24),
            scale: 1.0,
            gutter: true,
        }
    }
}

/// Render the surface as it looks at `now_ms`.
///
/// An unmounted surface renders as a 1x1 background image.
pub fn rasterize(surface: &GridSurface, now_ms: f64, opts: &RasterOpts) -> RgbaImage {
    let bg = Rgba(opts.background.to_rgba8());
    let (Some(grid), Some(viewport)) = (surface.grid(), surface.viewport()) else {
        return RgbaImage::from_pixel(1, 1, bg);
    };
    let scale = if opts.scale.is_finite() && opts.scale > 0.0 {
        opts.scale
    } else {
        1.0
    };
    let width = ((viewport.width * scale).round() as u32).max(1);
    let height = ((viewport.height * scale).round() as u32).max(1);
    let mut img = RgbaImage::from_pixel(width, height, bg);

    let cell_px = grid.cell_px * scale;
    if cell_px <= 0.0 {
        return img;
    }
    let ox = (f64::from(width) - cell_px * f64::from(grid.fine_cols())) / 2.0;
    let oy = (f64::from(height) - cell_px * f64::from(grid.fine_rows())) / 2.0;
    let gutter = if opts.gutter && cell_px >= 4.0 { 1 } else { 0 };
    let pulse = surface
        .globals()
        .pulse
        .map(|p| p.color)
        .unwrap_or(Color::WHITE);

    for (at, fine) in surface.fine().iter() {
        let coarse = surface.cell(Layer::Coarse, at.coarse());
        let color = cell_color(opts.cell, coarse, fine, pulse, now_ms);

        let x0 = (ox + f64::from(at.x) * cell_px).round() as i64;
        let y0 = (oy + f64::from(at.y) * cell_px).round() as i64;
        let x1 = (ox + f64::from(at.x + 1) * cell_px).round() as i64 - gutter;
        let y1 = (oy + f64::from(at.y + 1) * cell_px).round() as i64 - gutter;
        fill(&mut img, (x0, y0), (x1, y1), Rgba(color.to_rgba8()));
    }
    img
}

fn cell_color(
    base: Color,
    coarse: Option<&CellPaint>,
    fine: &CellPaint,
    pulse: Color,
    now_ms: f64,
) -> Color {
    let mut c = base;
    if let Some(coarse) = coarse {
        if let (Some(_), Some(zone)) = (coarse.zone, coarse.color) {
            c = c.mix(zone, ZONE_TINT);
        }
        if let Some(hold) = coarse.hold_at(now_ms) {
            c = c.mix(hold.color.unwrap_or(pulse), COARSE_EFFECT_MIX);
        }
        if let Some(anim) = coarse.anim {
            c = c.mix(anim.color, anim.intensity(now_ms) * COARSE_EFFECT_MIX);
        }
    }
    if let Some(hold) = fine.hold_at(now_ms) {
        c = hold.color.unwrap_or(pulse);
    }
    if let Some(anim) = fine.anim {
        c = c.mix(anim.color, anim.intensity(now_ms));
    }
    if fine.is_marked() {
        c = c.mix(pulse, f64::from(fine.opacity));
    }
    c
}

fn fill(img: &mut RgbaImage, (x0, y0): (i64, i64), (x1, y1): (i64, i64), px: Rgba<u8>) {
    let clamp_x = |v: i64| v.clamp(0, i64::from(img.width())) as u32;
    let clamp_y = |v: i64| v.clamp(0, i64::from(img.height())) as u32;
    let (x0, x1, y0, y1) = (clamp_x(x0), clamp_x(x1), clamp_y(y0), clamp_y(y1));
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, px);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/raster.rs"]
mod tests;
