use crate::{ArtEffectError, ArtEffectResult};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

/// Cooperative cancellation flag shared between a request and whoever may
/// supersede it.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    cancel_sig: Arc<AtomicBool>,
    generation: Option<(Arc<AtomicU64>, u64)>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal that also reports cancelled once `latest` moves past `id`.
    pub(crate) fn for_generation(latest: Arc<AtomicU64>, id: u64) -> Self {
        Self {
            cancel_sig: Arc::new(AtomicBool::new(false)),
            generation: Some((latest, id)),
        }
    }

    pub fn cancel(&self) {
        self.cancel_sig.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        if self.cancel_sig.load(Ordering::Relaxed) {
            return true;
        }

        match &self.generation {
            Some((latest, id)) => latest.load(Ordering::Acquire) != *id,
            None => false,
        }
    }
}

/// Per-invocation state handed to every effect: the random source and the
/// cancellation signal.
#[derive(Debug)]
pub struct EffectContext {
    rng: StdRng,
    cancel: CancelSignal,
}

impl EffectContext {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::seeded)
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            cancel: CancelSignal::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    /// Uniform sample in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform sample in `[-0.5, 0.5)`.
    #[inline]
    pub fn random_centered(&mut self) -> f32 {
        self.random() - 0.5
    }

    /// Random point inside `[0, width) x [0, height)`.
    pub fn random_point(&mut self, width: u32, height: u32) -> (f32, f32) {
        let x = self.random() * width as f32;
        let y = self.random() * height as f32;
        (
            x.min(width as f32 - 0.5).max(0.0),
            y.min(height as f32 - 0.5).max(0.0),
        )
    }

    /// Bail out with [`ArtEffectError::Cancelled`] once the signal fires.
    #[inline]
    pub fn checkpoint(&self) -> ArtEffectResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ArtEffectError::Cancelled);
        }
        Ok(())
    }
}

impl Default for EffectContext {
    fn default() -> Self {
        Self::new()
    }
}
