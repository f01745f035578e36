pub mod blend;
pub mod brush_effect;
pub mod colour_space;
pub mod context;
pub mod engine;
pub mod glitch_effect;
pub mod monochrome_effect;
pub mod params;
pub mod raster;
pub mod stylized_effect;

pub use context::{CancelSignal, EffectContext};
pub use engine::{EffectEngine, EngineConfig, fit_image};
pub use params::{DEFAULT_CANVAS_SIZE, EffectKind, EffectParameters};
pub use raster::RasterBuffer;

pub type ArtEffectResult<T> = Result<T, ArtEffectError>;

#[derive(thiserror::Error, Debug)]
pub enum ArtEffectError {
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Pixel ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfRange {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    #[error("Unknown effect: {0}")]
    UnknownEffect(String),
    #[error("Expected {expected} samples, got {actual}")]
    SampleLength { expected: usize, actual: usize },
    #[error("Effect cancelled")]
    Cancelled,
}

pub trait Effect {
    fn apply(&self, buffer: &mut RasterBuffer, ctx: &mut EffectContext) -> ArtEffectResult<()>;
}

#[derive(Debug, Clone)]
pub enum ArtEffect {
    // Painted over the live buffer
    Impressionist(brush_effect::ImpressionistConfig),
    Watercolor(brush_effect::WatercolorConfig),
    Abstract(brush_effect::AbstractConfig),

    // Derived from a stable copy
    OilPainting(stylized_effect::OilPaintingConfig),
    Mosaic(stylized_effect::MosaicConfig),
    PopArt(stylized_effect::PopArtConfig),
    DigitalGlitch(glitch_effect::GlitchConfig),
    Sketch(monochrome_effect::SketchConfig),
}

impl ArtEffect {
    pub fn kind(&self) -> EffectKind {
        match self {
            ArtEffect::Impressionist(_) => EffectKind::Impressionist,
            ArtEffect::Watercolor(_) => EffectKind::Watercolor,
            ArtEffect::Abstract(_) => EffectKind::Abstract,
            ArtEffect::OilPainting(_) => EffectKind::OilPainting,
            ArtEffect::Mosaic(_) => EffectKind::Mosaic,
            ArtEffect::PopArt(_) => EffectKind::PopArt,
            ArtEffect::DigitalGlitch(_) => EffectKind::DigitalGlitch,
            ArtEffect::Sketch(_) => EffectKind::Sketch,
        }
    }
}

impl From<&EffectParameters> for ArtEffect {
    fn from(params: &EffectParameters) -> Self {
        match params.effect {
            EffectKind::Impressionist => ArtEffect::Impressionist(params.into()),
            EffectKind::Watercolor => ArtEffect::Watercolor(params.into()),
            EffectKind::Abstract => ArtEffect::Abstract(params.into()),
            EffectKind::OilPainting => ArtEffect::OilPainting(params.into()),
            EffectKind::Mosaic => ArtEffect::Mosaic(params.into()),
            EffectKind::PopArt => ArtEffect::PopArt(params.into()),
            EffectKind::DigitalGlitch => ArtEffect::DigitalGlitch(params.into()),
            EffectKind::Sketch => ArtEffect::Sketch(params.into()),
        }
    }
}

impl Effect for ArtEffect {
    fn apply(&self, buffer: &mut RasterBuffer, ctx: &mut EffectContext) -> ArtEffectResult<()> {
        match self {
            ArtEffect::Impressionist(config) => config.apply(buffer, ctx),
            ArtEffect::Watercolor(config) => config.apply(buffer, ctx),
            ArtEffect::Abstract(config) => config.apply(buffer, ctx),
            ArtEffect::OilPainting(config) => config.apply(buffer, ctx),
            ArtEffect::Mosaic(config) => config.apply(buffer, ctx),
            ArtEffect::PopArt(config) => config.apply(buffer, ctx),
            ArtEffect::DigitalGlitch(config) => config.apply(buffer, ctx),
            ArtEffect::Sketch(config) => config.apply(buffer, ctx),
        }
    }
}
