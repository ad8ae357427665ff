//! Pixel layout descriptors.
//!
//! [`PixelLayout`] owns the row-major interleaved addressing contract shared
//! by every [`PixelBuffer`](crate::PixelBuffer): pixel `(x, y)` starts at
//! byte `y * width * channels + x * channels`, and the next pixel in the row
//! starts `channels` bytes later.

use crate::buffer::BufferError;

// ---------------------------------------------------------------------------
// ChannelLayout
// ---------------------------------------------------------------------------

/// Named channel sets for common 8-bit interleaved formats.
///
/// The buffer itself only cares about the channel count; this enum exists so
/// decoders and dithering passes can agree on what the channels mean.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum ChannelLayout {
    /// Single luminance channel.
    Gray = 1,
    /// Luminance + alpha.
    GrayAlpha = 2,
    /// Red, green, blue.
    Rgb = 3,
    /// Red, green, blue, alpha.
    Rgba = 4,
    /// Blue, green, red, alpha (Windows/DirectX byte order).
    Bgra = 5,
}

impl ChannelLayout {
    /// Number of channels in this layout.
    #[inline]
    pub const fn channels(self) -> u8 {
        match self {
            Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba | Self::Bgra => 4,
        }
    }

    /// Whether this layout includes an alpha channel.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::GrayAlpha | Self::Rgba | Self::Bgra)
    }
}

// ---------------------------------------------------------------------------
// PixelLayout
// ---------------------------------------------------------------------------

/// Dimensions and channel count of a tightly packed interleaved image.
///
/// Always non-empty: width, height and channel count are at least 1 and the
/// total byte length fits in `usize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelLayout {
    width: u32,
    height: u32,
    channels: u8,
}

impl PixelLayout {
    /// Validate and create a layout.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidDimensions`] if any argument is zero or
    /// `width * height * channels` overflows `usize`.
    pub fn new(width: u32, height: u32, channels: u8) -> Result<Self, BufferError> {
        if width == 0 || height == 0 || channels == 0 {
            return Err(BufferError::InvalidDimensions);
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(channels as usize))
            .ok_or(BufferError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            channels,
        })
    }

    /// Layout for a named channel set.
    pub fn with_channel_layout(
        width: u32,
        height: u32,
        layout: ChannelLayout,
    ) -> Result<Self, BufferError> {
        Self::new(width, height, layout.channels())
    }

    /// Image width in pixels.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Channels per pixel (one byte each).
    #[inline]
    pub const fn channels(&self) -> u8 {
        self.channels
    }

    /// Number of pixels.
    #[inline]
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bytes in one row (`width * channels`; rows carry no padding).
    #[inline]
    pub const fn row_bytes(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// Total byte length of a buffer with this layout.
    #[inline]
    pub const fn byte_len(&self) -> usize {
        self.pixel_count() * self.channels as usize
    }

    /// Whether `(x, y)` lies inside the image.
    #[inline]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Byte offset of the first channel of pixel `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfRange`] if `x >= width` or `y >= height`.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> Result<usize, BufferError> {
        if !self.contains(x, y) {
            return Err(BufferError::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.offset_unchecked(x, y))
    }

    /// Byte offset of pixel `(x, y)` without a range check.
    ///
    /// The result is only meaningful for coordinates inside the image; an
    /// out-of-range result simply fails later slice indexing.
    #[inline]
    pub const fn offset_unchecked(&self, x: u32, y: u32) -> usize {
        let channels = self.channels as usize;
        y as usize * self.width as usize * channels + x as usize * channels
    }

    /// Pixel coordinates of the pixel starting at byte `offset`, if any.
    ///
    /// Inverse of [`offset`](Self::offset) for offsets on a pixel boundary.
    pub const fn coords_of(&self, offset: usize) -> Option<(u32, u32)> {
        let channels = self.channels as usize;
        if offset >= self.byte_len() || offset % channels != 0 {
            return None;
        }
        let pixel = offset / channels;
        let width = self.width as usize;
        Some(((pixel % width) as u32, (pixel / width) as u32))
    }
}
