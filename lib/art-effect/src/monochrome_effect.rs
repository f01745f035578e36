use crate::{
    ArtEffectResult, Effect, EffectContext, EffectParameters, RasterBuffer,
    blend::{BlendMode, BrushMask, MASK_INK},
    stylized_effect::par_rows,
};
use derivative::Derivative;
use derive_setters::Setters;
use imageproc::drawing::draw_line_segment_mut;
use std::f32::consts::TAU;

/// Human perception: 0.299*R + 0.587*G + 0.114*B
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Pencil sketch: luma grayscale, then short dark hatching strokes.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct SketchConfig {
    #[derivative(Default(value = "50"))]
    intensity: u32,
    #[derivative(Default(value = "60"))]
    complexity: u32,
    #[derivative(Default(value = "0.3"))]
    stroke_alpha: f32,
}

impl SketchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stroke_count(&self) -> u32 {
        self.complexity * 2
    }

    /// Desaturate every pixel and commit the result as a whole.
    pub fn grayscale(&self, buffer: &mut RasterBuffer, ctx: &EffectContext) -> ArtEffectResult<()> {
        let mut samples = buffer.as_raw().to_vec();

        par_rows(&mut samples, buffer.width(), ctx.cancel_signal(), |pixel| {
            let gray = luma(pixel[0], pixel[1], pixel[2]);
            pixel[0] = gray;
            pixel[1] = gray;
            pixel[2] = gray;
        })?;

        buffer.replace(samples)
    }
}

impl From<&EffectParameters> for SketchConfig {
    fn from(params: &EffectParameters) -> Self {
        Self::new()
            .with_intensity(params.intensity_u32())
            .with_complexity(params.complexity_u32())
    }
}

impl Effect for SketchConfig {
    fn apply(&self, buffer: &mut RasterBuffer, ctx: &mut EffectContext) -> ArtEffectResult<()> {
        self.grayscale(buffer, ctx)?;

        let (width, height) = buffer.dimensions();
        let strokes = self.stroke_count();

        for _ in 0..strokes {
            ctx.checkpoint()?;

            let (x1, y1) = ctx.random_point(width, height);
            let length = 10.0 + ctx.random() * (self.intensity as f32 / 2.0);
            let angle = ctx.random() * TAU;
            let x2 = x1 + angle.cos() * length;
            let y2 = y1 + angle.sin() * length;

            let mut mask = BrushMask::for_buffer(buffer);
            draw_line_segment_mut(&mut mask, (x1, y1), (x2, y2), MASK_INK);
            mask.paint(buffer, [0, 0, 0], BlendMode::Multiply, self.stroke_alpha);
        }

        log::debug!("sketch: {strokes} strokes");
        Ok(())
    }
}
