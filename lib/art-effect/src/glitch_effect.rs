use crate::{ArtEffectResult, Effect, EffectContext, EffectParameters, RasterBuffer};
use derivative::Derivative;
use derive_setters::Setters;

/// Digital glitch: horizontal slices torn sideways, then sparse red/blue
/// channel shifts.
///
/// Torn slices are clipped at the buffer edge: samples pushed past the left
/// or right border are dropped, and the uncovered strip keeps the pixels that
/// were already there.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GlitchConfig {
    #[derivative(Default(value = "50"))]
    intensity: u32,
    #[derivative(Default(value = "60"))]
    complexity: u32,
}

impl GlitchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slice_count(&self) -> u32 {
        self.complexity / 10
    }

    pub fn shift_probability(&self) -> f32 {
        self.intensity as f32 / 1000.0
    }

    fn tear_slices(&self, buffer: &mut RasterBuffer, ctx: &mut EffectContext) -> ArtEffectResult<()> {
        let (width, height) = buffer.dimensions();

        for _ in 0..self.slice_count() {
            ctx.checkpoint()?;

            let y = ((ctx.random() * height as f32) as u32).min(height - 1);
            let rows = (1.0 + ctx.random() * (self.intensity as f32 / 10.0)) as u32;
            let offset = (ctx.random_centered() * (self.intensity as f32 / 2.0)) as i64;

            let slice = buffer.get_region(0, y, width, rows);
            buffer.paste(&slice, offset, y as i64);
        }

        Ok(())
    }

    fn shift_channels(&self, buffer: &mut RasterBuffer, ctx: &mut EffectContext) -> ArtEffectResult<u32> {
        let probability = self.shift_probability();
        let mut samples = buffer.as_raw().to_vec();
        let row_len = buffer.width() as usize * 4;
        let mut shifted = 0;

        for row in samples.chunks_mut(row_len) {
            ctx.checkpoint()?;

            for pixel in row.chunks_exact_mut(4) {
                if ctx.random() >= probability {
                    continue;
                }

                let shift = (ctx.random_centered() * self.intensity as f32).floor() as i32;
                pixel[0] = (pixel[0] as i32 + shift).clamp(0, 255) as u8;
                pixel[2] = (pixel[2] as i32 - shift).clamp(0, 255) as u8;
                shifted += 1;
            }
        }

        buffer.replace(samples)?;
        Ok(shifted)
    }
}

impl From<&EffectParameters> for GlitchConfig {
    fn from(params: &EffectParameters) -> Self {
        Self::new()
            .with_intensity(params.intensity_u32())
            .with_complexity(params.complexity_u32())
    }
}

impl Effect for GlitchConfig {
    fn apply(&self, buffer: &mut RasterBuffer, ctx: &mut EffectContext) -> ArtEffectResult<()> {
        self.tear_slices(buffer, ctx)?;
        let shifted = self.shift_channels(buffer, ctx)?;

        log::debug!(
            "digital-glitch: {} slices, {shifted} pixels channel-shifted",
            self.slice_count()
        );
        Ok(())
    }
}
