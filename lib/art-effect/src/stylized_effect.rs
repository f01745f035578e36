//! Effects that read a stable copy of the image and commit a derived
//! buffer (or whole tiles) in one go.

use crate::{
    ArtEffectError, ArtEffectResult, CancelSignal, Effect, EffectContext, EffectParameters,
    RasterBuffer,
    blend::{BlendMode, BrushMask, MASK_INK},
    colour_space::rgb_to_hsl,
};
use derivative::Derivative;
use derive_setters::Setters;
use image::{Rgba, RgbaImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use rayon::prelude::*;

/// Run `f` over every row of `samples` in parallel, stopping early once
/// `cancel` fires.
pub(crate) fn par_rows(
    samples: &mut [u8],
    width: u32,
    cancel: &CancelSignal,
    f: impl Fn(&mut [u8]) + Sync + Send,
) -> ArtEffectResult<()> {
    samples
        .par_chunks_mut(width as usize * 4)
        .try_for_each(|row| {
            if cancel.is_cancelled() {
                return Err(ArtEffectError::Cancelled);
            }

            row.chunks_exact_mut(4).for_each(&f);
            Ok(())
        })
}

/// Oil painting: box-filter the neighbourhood of every other pixel and
/// dab the average onto a 3x3 patch.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct OilPaintingConfig {
    #[derivative(Default(value = "15"))]
    brush_size: u32,
}

impl OilPaintingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn radius(&self) -> u32 {
        (self.brush_size / 5).max(1)
    }
}

impl From<&EffectParameters> for OilPaintingConfig {
    fn from(params: &EffectParameters) -> Self {
        Self::new().with_brush_size(params.brush_size_u32())
    }
}

fn neighbourhood_mean(image: &RgbaImage, cx: u32, cy: u32, radius: u32) -> [u8; 3] {
    let mut total = [0u32; 3];
    let mut count = 0u32;

    for y in cy - radius..=cy + radius {
        for x in cx - radius..=cx + radius {
            let px = image.get_pixel(x, y);
            total[0] += px[0] as u32;
            total[1] += px[1] as u32;
            total[2] += px[2] as u32;
            count += 1;
        }
    }

    total.map(|sum| (sum as f32 / count as f32).round() as u8)
}

impl Effect for OilPaintingConfig {
    fn apply(&self, buffer: &mut RasterBuffer, ctx: &mut EffectContext) -> ArtEffectResult<()> {
        let (width, height) = buffer.dimensions();
        let radius = self.radius();

        if width <= radius * 2 || height <= radius * 2 {
            log::debug!("oil-painting: {width}x{height} smaller than the {radius}px margin");
            return Ok(());
        }

        let rows: Vec<u32> = (radius..height - radius).step_by(2).collect();
        let cols: Vec<u32> = (radius..width - radius).step_by(2).collect();
        let cancel = ctx.cancel_signal().clone();
        let source = buffer.as_image();

        let averages = rows
            .par_iter()
            .map(|&y| {
                if cancel.is_cancelled() {
                    return Err(ArtEffectError::Cancelled);
                }

                Ok(cols
                    .iter()
                    .map(|&x| neighbourhood_mean(source, x, y, radius))
                    .collect::<Vec<_>>())
            })
            .collect::<ArtEffectResult<Vec<_>>>()?;

        // Patches overlap; keep row-major write order so the last sample wins.
        let mut output = source.clone();
        for (&y, row) in rows.iter().zip(&averages) {
            ctx.checkpoint()?;

            for (&x, avg) in cols.iter().zip(row) {
                for py in y - 1..=y + 1 {
                    for px in x - 1..=x + 1 {
                        let pixel = output.get_pixel_mut(px, py);
                        pixel[0] = avg[0];
                        pixel[1] = avg[1];
                        pixel[2] = avg[2];
                    }
                }
            }
        }

        log::debug!(
            "oil-painting: radius {radius}, {} samples",
            rows.len() * cols.len()
        );
        buffer.replace(output.into_raw())
    }
}

/// Mosaic: square tiles filled with their mean colour plus a random
/// per-channel jitter.
///
/// The faint tile outline is opt-in through [`MosaicConfig::with_border_alpha`].
/// Configs built from [`EffectParameters`] leave it at 0, so a uniform image
/// with no colour variance comes back unchanged and every tile holds exactly
/// its mean colour.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct MosaicConfig {
    #[derivative(Default(value = "15"))]
    brush_size: u32,
    #[derivative(Default(value = "30"))]
    color_variance: u32,
    /// Opacity of the black tile outline; 0 disables it.
    #[derivative(Default(value = "0.0"))]
    border_alpha: f32,
}

impl MosaicConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tile_size(&self) -> u32 {
        (self.brush_size / 3).max(5)
    }
}

impl From<&EffectParameters> for MosaicConfig {
    fn from(params: &EffectParameters) -> Self {
        Self::new()
            .with_brush_size(params.brush_size_u32())
            .with_color_variance(params.color_variance_u32())
    }
}

fn tile_mean(image: &RgbaImage, x0: u32, y0: u32, tile: u32) -> [u32; 3] {
    let x1 = (x0 + tile).min(image.width());
    let y1 = (y0 + tile).min(image.height());
    let mut total = [0u64; 3];

    for y in y0..y1 {
        for x in x0..x1 {
            let px = image.get_pixel(x, y);
            total[0] += px[0] as u64;
            total[1] += px[1] as u64;
            total[2] += px[2] as u64;
        }
    }

    let count = ((x1 - x0) * (y1 - y0)) as u64;
    total.map(|sum| (sum / count) as u32)
}

impl Effect for MosaicConfig {
    fn apply(&self, buffer: &mut RasterBuffer, ctx: &mut EffectContext) -> ArtEffectResult<()> {
        let (width, height) = buffer.dimensions();
        let tile = self.tile_size();
        let variance = self.color_variance as f32 / 100.0;

        let rows: Vec<u32> = (0..height).step_by(tile as usize).collect();
        let cols: Vec<u32> = (0..width).step_by(tile as usize).collect();
        let cancel = ctx.cancel_signal().clone();
        let source = buffer.as_image();

        let means = rows
            .par_iter()
            .map(|&y| {
                if cancel.is_cancelled() {
                    return Err(ArtEffectError::Cancelled);
                }

                Ok(cols
                    .iter()
                    .map(|&x| tile_mean(source, x, y, tile))
                    .collect::<Vec<_>>())
            })
            .collect::<ArtEffectResult<Vec<_>>>()?;

        for (&y, row) in rows.iter().zip(&means) {
            ctx.checkpoint()?;

            for (&x, mean) in cols.iter().zip(row) {
                let mut color = [0u8; 3];
                for (channel, &base) in color.iter_mut().zip(mean) {
                    let jitter = ctx.random_centered() * 255.0 * variance;
                    *channel = (base as f32 + jitter).clamp(0.0, 255.0).round() as u8;
                }

                buffer.fill_region(x, y, tile, tile, Rgba([color[0], color[1], color[2], 255]));

                if self.border_alpha > 0.0 {
                    let mut mask = BrushMask::for_buffer(buffer);
                    draw_hollow_rect_mut(&mut mask, Rect::at(x as i32, y as i32).of_size(tile, tile), MASK_INK);
                    mask.paint(buffer, [0, 0, 0], BlendMode::Multiply, self.border_alpha);
                }
            }
        }

        log::debug!("mosaic: {}x{} tiles of {tile}px", cols.len(), rows.len());
        Ok(())
    }
}

/// Pop art: posterise every channel, then push saturation up.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct PopArtConfig {
    #[derivative(Default(value = "50"))]
    intensity: u32,
    #[derivative(Default(value = "30"))]
    color_variance: u32,
}

impl PopArtConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn levels(&self) -> u32 {
        8u32.saturating_sub(self.intensity / 20).max(2)
    }

    pub fn saturation_boost(&self) -> f32 {
        1.0 + self.color_variance as f32 / 100.0
    }
}

impl From<&EffectParameters> for PopArtConfig {
    fn from(params: &EffectParameters) -> Self {
        Self::new()
            .with_intensity(params.intensity_u32())
            .with_color_variance(params.color_variance_u32())
    }
}

#[inline]
fn posterize_channel(value: u8, step: f32) -> u8 {
    ((value as f32 / step).round() * step).round().clamp(0.0, 255.0) as u8
}

impl Effect for PopArtConfig {
    fn apply(&self, buffer: &mut RasterBuffer, ctx: &mut EffectContext) -> ArtEffectResult<()> {
        let levels = self.levels();
        let step = 255.0 / (levels - 1) as f32;
        let boost = self.saturation_boost();

        let mut samples = buffer.as_raw().to_vec();
        par_rows(&mut samples, buffer.width(), ctx.cancel_signal(), |pixel| {
            let r = posterize_channel(pixel[0], step);
            let g = posterize_channel(pixel[1], step);
            let b = posterize_channel(pixel[2], step);

            let [r, g, b] = rgb_to_hsl(r as f32, g as f32, b as f32)
                .scale_saturation(boost)
                .to_rgb();

            pixel[0] = r;
            pixel[1] = g;
            pixel[2] = b;
        })?;

        log::debug!("pop-art: {levels} levels, saturation x{boost:.2}");
        buffer.replace(samples)
    }
}
