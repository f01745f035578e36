//! Generative effects that sample the live buffer while painting over it,
//! so later strokes pick up colour laid down by earlier ones.

use crate::{
    ArtEffectResult, Effect, EffectContext, EffectParameters, RasterBuffer,
    blend::{BlendMode, BrushMask, MASK_INK},
    colour_space::rgb_to_hsl,
};
use derivative::Derivative;
use derive_setters::Setters;
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut},
    point::Point,
    rect::Rect,
};
use std::f32::consts::TAU;

const MIN_STROKE_SIZE: f32 = 5.0;

fn sample_rgb(buffer: &RasterBuffer, x: f32, y: f32) -> [u8; 3] {
    let px = buffer.pixel(x as u32, y as u32);
    [px[0], px[1], px[2]]
}

/// Impressionist brush strokes: rotated elliptical dabs in hue-jittered
/// colours, multiplied onto the canvas.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ImpressionistConfig {
    #[derivative(Default(value = "50"))]
    intensity: u32,
    #[derivative(Default(value = "30"))]
    color_variance: u32,
    #[derivative(Default(value = "15"))]
    brush_size: u32,
}

impl ImpressionistConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stroke_count(&self) -> u32 {
        200 + self.intensity * 5
    }

    pub fn max_stroke_size(&self) -> f32 {
        self.brush_size as f32 + self.intensity as f32 * 0.5
    }

    pub fn stroke_alpha(&self) -> f32 {
        0.1 + self.intensity as f32 * 0.005
    }
}

impl From<&EffectParameters> for ImpressionistConfig {
    fn from(params: &EffectParameters) -> Self {
        Self::new()
            .with_intensity(params.intensity_u32())
            .with_color_variance(params.color_variance_u32())
            .with_brush_size(params.brush_size_u32())
    }
}

impl Effect for ImpressionistConfig {
    fn apply(&self, buffer: &mut RasterBuffer, ctx: &mut EffectContext) -> ArtEffectResult<()> {
        let (width, height) = buffer.dimensions();
        let max_size = self.max_stroke_size().max(MIN_STROKE_SIZE);
        let alpha = self.stroke_alpha();
        let strokes = self.stroke_count();

        for _ in 0..strokes {
            ctx.checkpoint()?;

            let (x, y) = ctx.random_point(width, height);
            let size = MIN_STROKE_SIZE + ctx.random() * (max_size - MIN_STROKE_SIZE);

            let [r, g, b] = sample_rgb(buffer, x, y);
            let hue_shift = ctx.random_centered() * self.color_variance as f32 * 2.0;
            let color = rgb_to_hsl(r as f32, g as f32, b as f32)
                .rotate_hue(hue_shift / 360.0)
                .to_rgb();

            let angle = ctx.random() * TAU;

            let mut mask = BrushMask::for_buffer(buffer);
            mask.fill_ellipse(x, y, size, size * 0.3, angle);
            mask.paint(buffer, color, BlendMode::Multiply, alpha);
        }

        log::debug!("impressionist: {strokes} strokes, alpha {alpha:.3}");
        Ok(())
    }
}

/// Watercolour bleeding: soft radial blobs whose opacity fades to zero at
/// the rim, multiplied onto the canvas.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct WatercolorConfig {
    #[derivative(Default(value = "50"))]
    intensity: u32,
}

impl WatercolorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blob_count(&self) -> u32 {
        50 + self.intensity
    }

    pub fn center_alpha(&self) -> f32 {
        0.1 + self.intensity as f32 * 0.003
    }
}

impl From<&EffectParameters> for WatercolorConfig {
    fn from(params: &EffectParameters) -> Self {
        Self::new().with_intensity(params.intensity_u32())
    }
}

/// Opacity of the radial gradient at normalised distance `t` from the
/// centre: full at 0, half at 0.7, zero at the rim.
pub fn watercolor_falloff(alpha: f32, t: f32) -> f32 {
    if t <= 0.7 {
        alpha * (1.0 - 0.5 * t / 0.7)
    } else if t <= 1.0 {
        alpha * 0.5 * (1.0 - (t - 0.7) / 0.3)
    } else {
        0.0
    }
}

impl Effect for WatercolorConfig {
    fn apply(&self, buffer: &mut RasterBuffer, ctx: &mut EffectContext) -> ArtEffectResult<()> {
        let (width, height) = buffer.dimensions();
        let alpha = self.center_alpha();
        let blobs = self.blob_count();

        for _ in 0..blobs {
            ctx.checkpoint()?;

            let (x, y) = ctx.random_point(width, height);
            let radius = 20.0 + ctx.random() * (self.intensity as f32 * 2.0);
            let color = sample_rgb(buffer, x, y);

            let mut mask = BrushMask::for_buffer(buffer);
            mask.fill_disc(x, y, radius);
            mask.paint_with(buffer, color, BlendMode::Multiply, |px, py| {
                let dx = px as f32 + 0.5 - x;
                let dy = py as f32 + 0.5 - y;
                watercolor_falloff(alpha, (dx * dx + dy * dy).sqrt() / radius)
            });
        }

        log::debug!("watercolor: {blobs} blobs, center alpha {alpha:.3}");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstractShape {
    Circle,
    Square,
    Triangle,
}

impl AbstractShape {
    fn pick(ctx: &mut EffectContext) -> Self {
        match (ctx.random() * 3.0) as u32 {
            0 => AbstractShape::Circle,
            1 => AbstractShape::Square,
            _ => AbstractShape::Triangle,
        }
    }

    fn rasterize(self, mask: &mut BrushMask, x: f32, y: f32, size: f32) {
        let half = size / 2.0;

        match self {
            AbstractShape::Circle => {
                draw_filled_circle_mut(mask, (x as i32, y as i32), half as i32, MASK_INK);
            }
            AbstractShape::Square => {
                let rect = Rect::at((x - half) as i32, (y - half) as i32)
                    .of_size(size as u32, size as u32);
                draw_filled_rect_mut(mask, rect, MASK_INK);
            }
            AbstractShape::Triangle => {
                let poly = [
                    Point::new(x as i32, (y - half) as i32),
                    Point::new((x + half) as i32, (y + half) as i32),
                    Point::new((x - half) as i32, (y + half) as i32),
                ];
                draw_polygon_mut(mask, &poly, MASK_INK);
            }
        }
    }
}

/// Abstract composition: translucent circles, squares and triangles in
/// saturated, hue-shifted versions of the colour underneath, overlaid.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct AbstractConfig {
    #[derivative(Default(value = "60"))]
    complexity: u32,
    #[derivative(Default(value = "30"))]
    color_variance: u32,
    #[derivative(Default(value = "0.3"))]
    alpha: f32,
}

impl AbstractConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl From<&EffectParameters> for AbstractConfig {
    fn from(params: &EffectParameters) -> Self {
        Self::new()
            .with_complexity(params.complexity_u32())
            .with_color_variance(params.color_variance_u32())
    }
}

impl Effect for AbstractConfig {
    fn apply(&self, buffer: &mut RasterBuffer, ctx: &mut EffectContext) -> ArtEffectResult<()> {
        let (width, height) = buffer.dimensions();

        for _ in 0..self.complexity {
            ctx.checkpoint()?;

            let (x, y) = ctx.random_point(width, height);
            let size = ctx.random() * 100.0 + 20.0;

            let [r, g, b] = sample_rgb(buffer, x, y);
            let hue_shift = ctx.random_centered() * self.color_variance as f32 / 100.0;
            let color = rgb_to_hsl(r as f32, g as f32, b as f32)
                .rotate_hue(hue_shift)
                .scale_saturation(1.5)
                .to_rgb();

            let shape = AbstractShape::pick(ctx);

            let mut mask = BrushMask::for_buffer(buffer);
            shape.rasterize(&mut mask, x, y, size);
            mask.paint(buffer, color, BlendMode::Overlay, self.alpha);
        }

        log::debug!("abstract: {} shapes", self.complexity);
        Ok(())
    }
}
