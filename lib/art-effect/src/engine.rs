use crate::{
    ArtEffect, ArtEffectError, ArtEffectResult, CancelSignal, Effect, EffectContext,
    EffectParameters, RasterBuffer,
};
use derivative::Derivative;
use derive_setters::Setters;
use image::{RgbaImage, imageops, imageops::FilterType};
use std::{
    borrow::Cow,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct EngineConfig {
    /// Fixed seed for reproducible output; `None` draws from OS entropy.
    #[derivative(Default(value = "None"))]
    seed: Option<u64>,

    #[derivative(Default(value = "FilterType::Triangle"))]
    resize_filter: FilterType,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn resize_filter(&self) -> FilterType {
        self.resize_filter
    }
}

/// Scale `source` into `buffer` preserving its aspect ratio, centred.
/// Pixels outside the scaled image keep whatever the buffer held.
pub fn fit_image(
    buffer: &mut RasterBuffer,
    source: &RgbaImage,
    filter: FilterType,
) -> ArtEffectResult<()> {
    let (src_w, src_h) = source.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(ArtEffectError::InvalidDimensions {
            width: src_w,
            height: src_h,
        });
    }

    let (dst_w, dst_h) = buffer.dimensions();
    let ratio = (dst_w as f64 / src_w as f64).min(dst_h as f64 / src_h as f64);
    let width = ((src_w as f64 * ratio).round() as u32).clamp(1, dst_w);
    let height = ((src_h as f64 * ratio).round() as u32).clamp(1, dst_h);

    let scaled = if (width, height) == (src_w, src_h) {
        Cow::Borrowed(source)
    } else {
        Cow::Owned(imageops::resize(source, width, height, filter))
    };

    let x = (dst_w - width) / 2;
    let y = (dst_h - height) / 2;
    imageops::overlay(buffer.image_mut(), scaled.as_ref(), x as i64, y as i64);

    log::debug!("fit {src_w}x{src_h} source as {width}x{height} at ({x}, {y})");
    Ok(())
}

/// Runs generation requests: fit the source photo, then apply one effect.
///
/// Each request is stamped with a generation number. Starting a new request
/// makes every older one report cancelled at its next checkpoint, so the
/// latest request always wins and superseded output is discarded.
#[derive(Debug, Default)]
pub struct EffectEngine {
    config: EngineConfig,
    latest: Arc<AtomicU64>,
}

impl EffectEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(EngineConfig::new().with_seed(Some(seed)))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open a new request, superseding any request still in flight.
    pub fn begin_request(&self) -> CancelSignal {
        let id = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        CancelSignal::for_generation(self.latest.clone(), id)
    }

    pub fn apply(
        &self,
        buffer: RasterBuffer,
        source: &RgbaImage,
        params: &EffectParameters,
    ) -> ArtEffectResult<RasterBuffer> {
        let signal = self.begin_request();
        self.apply_with_signal(buffer, source, params, &signal)
    }

    /// Allocate a transparent `width` x `height` buffer and run [`apply`] on it.
    ///
    /// [`apply`]: EffectEngine::apply
    pub fn generate(
        &self,
        width: u32,
        height: u32,
        source: &RgbaImage,
        params: &EffectParameters,
    ) -> ArtEffectResult<RasterBuffer> {
        self.apply(RasterBuffer::new(width, height)?, source, params)
    }

    /// Like [`apply`], under a signal obtained from [`begin_request`] (or any
    /// caller-owned [`CancelSignal`]).
    ///
    /// [`apply`]: EffectEngine::apply
    /// [`begin_request`]: EffectEngine::begin_request
    pub fn apply_with_signal(
        &self,
        mut buffer: RasterBuffer,
        source: &RgbaImage,
        params: &EffectParameters,
        signal: &CancelSignal,
    ) -> ArtEffectResult<RasterBuffer> {
        let start = Instant::now();

        let clamped = params.clamped();
        if clamped != *params {
            log::debug!("clamped parameters {params:?} -> {clamped:?}");
        }

        fit_image(&mut buffer, source, self.config.resize_filter)?;

        let effect = ArtEffect::from(&clamped);
        let mut ctx = EffectContext::from_seed(self.config.seed).with_cancel(signal.clone());

        log::debug!(
            "applying {} to {}x{} buffer (seed: {:?})",
            effect.kind(),
            buffer.width(),
            buffer.height(),
            self.config.seed
        );

        // A newer request may have started after the last checkpoint.
        let result = effect
            .apply(&mut buffer, &mut ctx)
            .and_then(|_| ctx.checkpoint());

        if let Err(ArtEffectError::Cancelled) = result {
            log::warn!("{} request superseded, output discarded", effect.kind());
        }
        result?;

        log::info!(
            "{} applied to {}x{} in {:.2?}",
            effect.kind(),
            buffer.width(),
            buffer.height(),
            start.elapsed()
        );
        Ok(buffer)
    }
}
