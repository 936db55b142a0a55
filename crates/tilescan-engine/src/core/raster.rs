/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("RGBA buffer of {actual} bytes does not match {width}x{height} image")]
pub struct RasterSizeError {
    pub width: usize,
    pub height: usize,
    pub actual: usize,
}

fn check_len(width: usize, height: usize, actual: usize) -> Result<(), RasterSizeError> {
    if width * height * CHANNELS == actual {
        Ok(())
    } else {
        Err(RasterSizeError {
            width,
            height,
            actual,
        })
    }
}

/// Borrowed, row-major RGBA8 image.
#[derive(Debug, Clone, Copy)]
pub struct RgbaImageView<'a> {
    width: usize,
    height: usize,
    data: &'a [u8],
}

impl<'a> RgbaImageView<'a> {
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, RasterSizeError> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * CHANNELS;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Relative luminance (Rec. 709 weights) of the pixel at `(x, y)`.
    #[inline]
    #[must_use]
    pub fn luminance(&self, x: usize, y: usize) -> f64 {
        let [r, g, b, _] = self.pixel(x, y);
        0.2126 * f64::from(r) + 0.7152 * f64::from(g) + 0.0722 * f64::from(b)
    }

    /// Reads the RGB channels of the pixel containing the point `(x, y)`.
    ///
    /// The point is floored to a pixel index and clamped to the image, so
    /// points on or past the far edge read the last row/column.
    ///
    /// # Panics
    ///
    /// Panics if the image is empty.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn rgb_at(&self, x: f64, y: f64) -> [u8; 3] {
        assert!(!self.is_empty(), "cannot sample an empty image");
        let clamp = |v: f64, len: usize| -> usize {
            let v = v.floor();
            if v.is_nan() || v <= 0.0 {
                0
            } else {
                (v as usize).min(len - 1)
            }
        };
        let [r, g, b, _] = self.pixel(clamp(x, self.width), clamp(y, self.height));
        [r, g, b]
    }
}

/// Owned, row-major RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaRaster {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbaRaster {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, RasterSizeError> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates an image where every pixel has the same color.
    #[must_use]
    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> Self {
        Self::from_fn(width, height, |_, _| rgba)
    }

    /// Creates an image by evaluating `f(x, y)` for every pixel.
    #[must_use]
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> [u8; 4],
    {
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    #[must_use]
    pub fn view(&self) -> RgbaImageView<'_> {
        RgbaImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}
