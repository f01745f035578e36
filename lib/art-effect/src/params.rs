use crate::ArtEffectError;
use derivative::Derivative;
use derive_setters::Setters;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const INTENSITY_RANGE: (i32, i32) = (0, 100);
pub const COLOR_VARIANCE_RANGE: (i32, i32) = (0, 100);
pub const BRUSH_SIZE_RANGE: (i32, i32) = (5, 50);
pub const COMPLEXITY_RANGE: (i32, i32) = (0, 100);

/// Side of the square display buffer the UI allocates by default.
pub const DEFAULT_CANVAS_SIZE: u32 = 600;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
#[repr(u8)]
pub enum EffectKind {
    Impressionist = 0,
    Watercolor,
    OilPainting,
    DigitalGlitch,
    Mosaic,
    Sketch,
    PopArt,
    Abstract,
}

impl EffectKind {
    /// Stable identifier used in persisted settings.
    pub fn id(&self) -> &'static str {
        match self {
            EffectKind::Impressionist => "impressionist",
            EffectKind::Watercolor => "watercolor",
            EffectKind::OilPainting => "oil-painting",
            EffectKind::DigitalGlitch => "digital-glitch",
            EffectKind::Mosaic => "mosaic",
            EffectKind::Sketch => "sketch",
            EffectKind::PopArt => "pop-art",
            EffectKind::Abstract => "abstract",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Impressionist => "Impressionist",
            EffectKind::Watercolor => "Watercolor",
            EffectKind::OilPainting => "Oil Painting",
            EffectKind::DigitalGlitch => "Digital Glitch",
            EffectKind::Mosaic => "Mosaic",
            EffectKind::Sketch => "Sketch",
            EffectKind::PopArt => "Pop Art",
            EffectKind::Abstract => "Abstract",
        }
    }

    pub fn all_effects() -> &'static [EffectKind] {
        &[
            EffectKind::Impressionist,
            EffectKind::Watercolor,
            EffectKind::OilPainting,
            EffectKind::DigitalGlitch,
            EffectKind::Mosaic,
            EffectKind::Sketch,
            EffectKind::PopArt,
            EffectKind::Abstract,
        ]
    }

    /// Look an effect up by its numeric id (UI list index).
    pub fn from_index(index: u8) -> Result<Self, ArtEffectError> {
        Self::try_from(index).map_err(|e| ArtEffectError::UnknownEffect(e.number.to_string()))
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for EffectKind {
    type Err = ArtEffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all_effects()
            .iter()
            .copied()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| ArtEffectError::UnknownEffect(s.to_string()))
    }
}

impl TryFrom<String> for EffectKind {
    type Error = ArtEffectError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EffectKind> for String {
    fn from(kind: EffectKind) -> Self {
        kind.id().to_string()
    }
}

/// The settings record the UI hands over for one generation request.
///
/// Values outside the slider ranges are accepted here and clamped by
/// [`EffectParameters::clamped`] before any effect sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Derivative, Setters, Serialize, Deserialize)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[serde(rename_all = "camelCase", default)]
pub struct EffectParameters {
    #[derivative(Default(value = "EffectKind::Impressionist"))]
    pub effect: EffectKind,

    #[derivative(Default(value = "50"))]
    pub intensity: i32,

    #[derivative(Default(value = "30"))]
    pub color_variance: i32,

    #[derivative(Default(value = "15"))]
    pub brush_size: i32,

    #[derivative(Default(value = "60"))]
    pub complexity: i32,
}

impl EffectParameters {
    pub fn new(effect: EffectKind) -> Self {
        Self::default().with_effect(effect)
    }

    /// Build from an effect name as received from outside the crate.
    pub fn from_named(
        effect: &str,
        intensity: i32,
        color_variance: i32,
        brush_size: i32,
        complexity: i32,
    ) -> Result<Self, ArtEffectError> {
        Ok(Self {
            effect: effect.parse()?,
            intensity,
            color_variance,
            brush_size,
            complexity,
        })
    }

    pub fn clamped(self) -> Self {
        Self {
            effect: self.effect,
            intensity: clamp_to(self.intensity, INTENSITY_RANGE),
            color_variance: clamp_to(self.color_variance, COLOR_VARIANCE_RANGE),
            brush_size: clamp_to(self.brush_size, BRUSH_SIZE_RANGE),
            complexity: clamp_to(self.complexity, COMPLEXITY_RANGE),
        }
    }

    pub fn is_within_range(&self) -> bool {
        *self == self.clamped()
    }

    pub(crate) fn intensity_u32(&self) -> u32 {
        clamp_to(self.intensity, INTENSITY_RANGE) as u32
    }

    pub(crate) fn color_variance_u32(&self) -> u32 {
        clamp_to(self.color_variance, COLOR_VARIANCE_RANGE) as u32
    }

    pub(crate) fn brush_size_u32(&self) -> u32 {
        clamp_to(self.brush_size, BRUSH_SIZE_RANGE) as u32
    }

    pub(crate) fn complexity_u32(&self) -> u32 {
        clamp_to(self.complexity, COMPLEXITY_RANGE) as u32
    }
}

fn clamp_to(value: i32, (min, max): (i32, i32)) -> i32 {
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = EffectParameters::default();

        assert_eq!(params.effect, EffectKind::Impressionist);
        assert_eq!(params.intensity, 50);
        assert_eq!(params.color_variance, 30);
        assert_eq!(params.brush_size, 15);
        assert_eq!(params.complexity, 60);
        assert!(params.is_within_range());
    }

    #[test]
    fn test_clamping() {
        let params = EffectParameters::new(EffectKind::Mosaic)
            .with_intensity(150)
            .with_color_variance(-20)
            .with_brush_size(1)
            .with_complexity(101)
            .clamped();

        assert_eq!(params.intensity, 100);
        assert_eq!(params.color_variance, 0);
        assert_eq!(params.brush_size, 5);
        assert_eq!(params.complexity, 100);
        assert_eq!(params.effect, EffectKind::Mosaic);
    }

    #[test]
    fn test_effect_ids() {
        for kind in EffectKind::all_effects() {
            assert_eq!(kind.id().parse::<EffectKind>().unwrap(), *kind);
        }

        assert_eq!("pop-art".parse::<EffectKind>().unwrap(), EffectKind::PopArt);
        assert!(matches!(
            "sepia".parse::<EffectKind>(),
            Err(ArtEffectError::UnknownEffect(name)) if name == "sepia"
        ));
    }

    #[test]
    fn test_from_index() {
        assert_eq!(EffectKind::from_index(2).unwrap(), EffectKind::OilPainting);
        assert_eq!(u8::from(EffectKind::Abstract), 7);
        assert!(matches!(
            EffectKind::from_index(8),
            Err(ArtEffectError::UnknownEffect(_))
        ));
    }

    #[test]
    fn test_from_named() {
        let params = EffectParameters::from_named("digital-glitch", 10, 20, 30, 40).unwrap();
        assert_eq!(params.effect, EffectKind::DigitalGlitch);
        assert_eq!(params.complexity, 40);

        assert!(EffectParameters::from_named("blur", 10, 20, 30, 40).is_err());
    }
}
