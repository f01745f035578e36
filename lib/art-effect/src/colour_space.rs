//! RGB <-> HSL conversion for single pixels.
//!
//! Channels go in as 0-255 values (fractional values are accepted) and the
//! HSL triple is normalised to `[0, 1]` on every axis.

/// Hue, saturation and lightness, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    /// Shift the hue by `turns` (1.0 is a full revolution), wrapping into `[0, 1)`.
    pub fn rotate_hue(self, turns: f32) -> Self {
        Self {
            h: (self.h + turns).rem_euclid(1.0),
            ..self
        }
    }

    /// Multiply saturation by `factor`, capped at 1.
    pub fn scale_saturation(self, factor: f32) -> Self {
        Self {
            s: (self.s * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn to_rgb(self) -> [u8; 3] {
        hsl_to_rgb(self)
    }
}

pub fn rgb_to_hsl(r: f32, g: f32, b: f32) -> Hsl {
    let (r, g, b) = (r / 255.0, g / 255.0, b / 255.0);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsl::new(0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl::new((h / 6.0).rem_euclid(1.0), s, l)
}

pub fn hsl_to_rgb(hsl: Hsl) -> [u8; 3] {
    let Hsl { h, s, l } = hsl;

    if s == 0.0 {
        let v = to_channel(l);
        return [v, v, v];
    }

    let h = h.rem_euclid(1.0);
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    [
        to_channel(hue_to_channel(p, q, h + 1.0 / 3.0)),
        to_channel(hue_to_channel(p, q, h)),
        to_channel(hue_to_channel(p, q, h - 1.0 / 3.0)),
    ]
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[inline]
fn to_channel(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}
