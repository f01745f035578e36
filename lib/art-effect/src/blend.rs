//! Straight-alpha compositing and brush coverage masks.

use crate::RasterBuffer;
use image::Rgba;
use imageproc::drawing::Canvas;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Overlay,
}

impl BlendMode {
    /// Separable blend function `B(cb, cs)` on normalised channels.
    #[inline]
    pub fn blend(self, backdrop: f32, source: f32) -> f32 {
        match self {
            BlendMode::Normal => source,
            BlendMode::Multiply => backdrop * source,
            BlendMode::Overlay => {
                if backdrop <= 0.5 {
                    2.0 * source * backdrop
                } else {
                    let b = 2.0 * backdrop - 1.0;
                    source + b - source * b
                }
            }
        }
    }
}

/// Composite an opaque `source` colour painted at `alpha` over `backdrop`
/// with the given blend mode. Both sides are straight (non-premultiplied).
pub fn composite(backdrop: Rgba<u8>, source: [u8; 3], alpha: f32, mode: BlendMode) -> Rgba<u8> {
    let alpha_s = alpha.clamp(0.0, 1.0);
    if alpha_s <= 0.0 {
        return backdrop;
    }

    let alpha_b = backdrop[3] as f32 / 255.0;
    let alpha_o = alpha_s + alpha_b * (1.0 - alpha_s);

    let mut out = [0u8; 4];
    for i in 0..3 {
        let cs = source[i] as f32 / 255.0;
        let cb = backdrop[i] as f32 / 255.0;

        let co = alpha_s * (1.0 - alpha_b) * cs
            + alpha_s * alpha_b * mode.blend(cb, cs)
            + (1.0 - alpha_s) * alpha_b * cb;

        out[i] = to_byte(co / alpha_o);
    }
    out[3] = to_byte(alpha_o);

    Rgba(out)
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// The set of pixels one brush stroke covers.
///
/// Shapes are rasterised into the mask first and painted afterwards, so a
/// pixel touched twice by the rasteriser is still composited only once.
#[derive(Debug, Clone)]
pub struct BrushMask {
    width: u32,
    height: u32,
    covered: Vec<(u32, u32)>,
}

impl BrushMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            covered: vec![],
        }
    }

    pub fn for_buffer(buffer: &RasterBuffer) -> Self {
        Self::new(buffer.width(), buffer.height())
    }

    pub fn is_empty(&self) -> bool {
        self.covered.is_empty()
    }

    /// Ellipse centred on `(cx, cy)` with semi-axes `rx`/`ry`, rotated by
    /// `angle` radians. A pixel is covered when its centre falls inside.
    pub fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, angle: f32) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }

        let (sin, cos) = angle.sin_cos();
        let reach = rx.max(ry);

        self.fill_bounded(cx, cy, reach, |dx, dy| {
            let u = dx * cos + dy * sin;
            let v = -dx * sin + dy * cos;
            (u / rx).powi(2) + (v / ry).powi(2) <= 1.0
        });
    }

    pub fn fill_disc(&mut self, cx: f32, cy: f32, radius: f32) {
        if radius <= 0.0 {
            return;
        }

        let r2 = radius * radius;
        self.fill_bounded(cx, cy, radius, |dx, dy| dx * dx + dy * dy <= r2);
    }

    fn fill_bounded(&mut self, cx: f32, cy: f32, reach: f32, inside: impl Fn(f32, f32) -> bool) {
        let x0 = (cx - reach).floor().max(0.0) as u32;
        let y0 = (cy - reach).floor().max(0.0) as u32;
        let x1 = ((cx + reach).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((cy + reach).ceil().max(0.0) as u32).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                if inside(x as f32 + 0.5 - cx, y as f32 + 0.5 - cy) {
                    self.covered.push((x, y));
                }
            }
        }
    }

    /// Paint every covered pixel with `color` at a constant `alpha`.
    pub fn paint(self, buffer: &mut RasterBuffer, color: [u8; 3], mode: BlendMode, alpha: f32) {
        self.paint_with(buffer, color, mode, |_, _| alpha);
    }

    /// Paint every covered pixel with `color`, asking `alpha_at` for the
    /// per-pixel opacity (used for gradients).
    pub fn paint_with(
        mut self,
        buffer: &mut RasterBuffer,
        color: [u8; 3],
        mode: BlendMode,
        alpha_at: impl Fn(u32, u32) -> f32,
    ) {
        self.covered.sort_unstable_by_key(|&(x, y)| (y, x));
        self.covered.dedup();

        for (x, y) in self.covered {
            let backdrop = buffer.pixel(x, y);
            *buffer.pixel_mut(x, y) = composite(backdrop, color, alpha_at(x, y), mode);
        }
    }
}

impl Canvas for BrushMask {
    type Pixel = Rgba<u8>;

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn get_pixel(&self, _x: u32, _y: u32) -> Self::Pixel {
        Rgba([0, 0, 0, 0])
    }

    fn draw_pixel(&mut self, x: u32, y: u32, _color: Self::Pixel) {
        if x < self.width && y < self.height {
            self.covered.push((x, y));
        }
    }
}

/// Colour handed to `imageproc` drawing calls on a [`BrushMask`]; only the
/// coverage matters.
pub const MASK_INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
