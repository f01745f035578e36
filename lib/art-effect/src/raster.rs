use crate::{ArtEffectError, ArtEffectResult};
use image::{Rgba, RgbaImage, imageops};

/// A width x height grid of RGBA8 samples.
///
/// The dimensions never change once the buffer exists: effects either
/// mutate it in place or commit a same-sized sample array with [`replace`].
///
/// [`replace`]: RasterBuffer::replace
#[derive(Debug, Clone, PartialEq)]
pub struct RasterBuffer {
    image: RgbaImage,
}

impl RasterBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> ArtEffectResult<Self> {
        Self::filled(width, height, Rgba([0, 0, 0, 0]))
    }

    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> ArtEffectResult<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            image: RgbaImage::from_pixel(width, height, color),
        })
    }

    pub fn from_image(image: RgbaImage) -> ArtEffectResult<Self> {
        check_dimensions(image.width(), image.height())?;
        Ok(Self { image })
    }

    pub fn from_raw(width: u32, height: u32, samples: Vec<u8>) -> ArtEffectResult<Self> {
        check_dimensions(width, height)?;

        let image = image_from_samples(width, height, samples)?;
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn get(&self, x: u32, y: u32) -> ArtEffectResult<Rgba<u8>> {
        self.check_bounds(x, y)?;
        Ok(*self.image.get_pixel(x, y))
    }

    pub fn set(&mut self, x: u32, y: u32, color: Rgba<u8>) -> ArtEffectResult<()> {
        self.check_bounds(x, y)?;
        self.image.put_pixel(x, y, color);
        Ok(())
    }

    /// Copy of the rectangle at `(x, y)`, clipped to the buffer edges.
    /// A rectangle entirely outside the buffer yields an empty image.
    pub fn get_region(&self, x: u32, y: u32, width: u32, height: u32) -> RgbaImage {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);

        imageops::crop_imm(&self.image, x, y, width, height).to_image()
    }

    /// Fill the rectangle at `(x, y)` with `color`, clipped to the buffer edges.
    pub fn fill_region(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
        let x_end = x.saturating_add(width).min(self.width());
        let y_end = y.saturating_add(height).min(self.height());

        for py in y.min(y_end)..y_end {
            for px in x.min(x_end)..x_end {
                self.image.put_pixel(px, py, color);
            }
        }
    }

    /// Write `region` with its top-left corner at `(x, y)`. Samples that land
    /// outside the buffer are dropped.
    pub fn paste(&mut self, region: &RgbaImage, x: i64, y: i64) {
        imageops::replace(&mut self.image, region, x, y);
    }

    /// Swap the whole backing array for `samples`, which must be exactly
    /// `width * height * 4` bytes long.
    pub fn replace(&mut self, samples: Vec<u8>) -> ArtEffectResult<()> {
        let (width, height) = self.dimensions();
        self.image = image_from_samples(width, height, samples)?;
        Ok(())
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.image.into_raw()
    }

    pub(crate) fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    /// Unchecked read for loops whose coordinates are already in range.
    #[inline]
    pub(crate) fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }

    #[inline]
    pub(crate) fn pixel_mut(&mut self, x: u32, y: u32) -> &mut Rgba<u8> {
        self.image.get_pixel_mut(x, y)
    }

    fn check_bounds(&self, x: u32, y: u32) -> ArtEffectResult<()> {
        if x >= self.width() || y >= self.height() {
            return Err(ArtEffectError::OutOfRange {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(())
    }
}

fn check_dimensions(width: u32, height: u32) -> ArtEffectResult<()> {
    if width == 0 || height == 0 {
        return Err(ArtEffectError::InvalidDimensions { width, height });
    }
    Ok(())
}

fn image_from_samples(width: u32, height: u32, samples: Vec<u8>) -> ArtEffectResult<RgbaImage> {
    let expected = width as usize * height as usize * 4;
    let actual = samples.len();

    if actual != expected {
        return Err(ArtEffectError::SampleLength { expected, actual });
    }

    RgbaImage::from_raw(width, height, samples)
        .ok_or(ArtEffectError::SampleLength { expected, actual })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            RasterBuffer::new(0, 10),
            Err(ArtEffectError::InvalidDimensions {
                width: 0,
                height: 10
            })
        ));
        assert!(RasterBuffer::from_image(RgbaImage::new(4, 0)).is_err());
    }

    #[test]
    fn test_get_out_of_range() {
        let buffer = RasterBuffer::filled(3, 2, Rgba([1, 2, 3, 4])).unwrap();

        assert_eq!(buffer.get(2, 1).unwrap(), Rgba([1, 2, 3, 4]));
        assert!(matches!(
            buffer.get(3, 0),
            Err(ArtEffectError::OutOfRange { x: 3, y: 0, .. })
        ));
        assert!(buffer.get(0, 2).is_err());
    }

    #[test]
    fn test_set_out_of_range() {
        let mut buffer = RasterBuffer::new(2, 2).unwrap();
        assert!(buffer.set(5, 5, Rgba([0; 4])).is_err());

        buffer.set(1, 1, Rgba([9, 9, 9, 9])).unwrap();
        assert_eq!(buffer.get(1, 1).unwrap(), Rgba([9, 9, 9, 9]));
    }

    #[test]
    fn test_get_region_is_clipped() {
        let buffer = RasterBuffer::filled(10, 8, Rgba([5, 5, 5, 255])).unwrap();

        let region = buffer.get_region(7, 6, 5, 5);
        assert_eq!(region.dimensions(), (3, 2));

        let region = buffer.get_region(20, 20, 5, 5);
        assert_eq!(region.dimensions(), (0, 0));
    }

    #[test]
    fn test_fill_region_is_clipped() {
        let mut buffer = RasterBuffer::new(4, 4).unwrap();
        buffer.fill_region(2, 2, 10, 10, Rgba([255, 0, 0, 255]));

        assert_eq!(buffer.get(3, 3).unwrap(), Rgba([255, 0, 0, 255]));
        assert_eq!(buffer.get(1, 1).unwrap(), Rgba([0, 0, 0, 0]));

        buffer.fill_region(9, 9, 3, 3, Rgba([1, 1, 1, 1]));
        assert_eq!(buffer.get(3, 3).unwrap(), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_paste_drops_off_buffer_samples() {
        let mut buffer = RasterBuffer::new(4, 1).unwrap();
        let region = RgbaImage::from_pixel(4, 1, Rgba([7, 7, 7, 255]));

        buffer.paste(&region, 2, 0);

        assert_eq!(buffer.get(1, 0).unwrap(), Rgba([0, 0, 0, 0]));
        assert_eq!(buffer.get(2, 0).unwrap(), Rgba([7, 7, 7, 255]));
        assert_eq!(buffer.get(3, 0).unwrap(), Rgba([7, 7, 7, 255]));
    }

    #[test]
    fn test_replace_checks_length() {
        let mut buffer = RasterBuffer::new(2, 2).unwrap();

        assert!(matches!(
            buffer.replace(vec![0; 3]),
            Err(ArtEffectError::SampleLength {
                expected: 16,
                actual: 3
            })
        ));

        buffer.replace(vec![200; 16]).unwrap();
        assert_eq!(buffer.get(0, 1).unwrap(), Rgba([200; 4]));
    }

    #[test]
    fn test_from_raw() {
        assert!(RasterBuffer::from_raw(2, 2, vec![0; 15]).is_err());

        let buffer = RasterBuffer::from_raw(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(buffer.get(1, 0).unwrap(), Rgba([5, 6, 7, 8]));
        assert_eq!(buffer.into_raw().len(), 8);
    }
}
