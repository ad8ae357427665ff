//! Interleaved 8-bit pixel buffer.
//!
//! [`PixelBuffer`] stores `width * height` pixels of `channels` bytes each,
//! row-major with channels interleaved, in a [`SharedBytes`] handle. It is the
//! passive store an error-diffusion pass reads from and writes into:
//!
//! ```
//! use zendither_buffer::PixelBuffer;
//!
//! let buf = PixelBuffer::from_bytes(&[200, 50, 10, 0, 0, 0], 2, 1, 3).unwrap();
//! let original = buf.get_pixel(0, 0).unwrap();
//! let quantized = [190, 60, 10];
//! let error = buf.quantization_error(&original, &quantized).unwrap();
//! assert_eq!(error, [10.0, -10.0, 0.0]);
//!
//! buf.set_pixel(0, 0, &quantized).unwrap();
//! buf.diffuse_error(1, 0, &error, 7.0 / 16.0).unwrap();
//! assert_eq!(buf.get_pixel(1, 0).unwrap(), [4, 0, 0]);
//! ```

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use enough::{Stop, StopReason};
use thiserror::Error;

use crate::layout::{ChannelLayout, PixelLayout};
use crate::limits::{BufferLimits, LimitExceeded};
use crate::quantize;
use crate::storage::SharedBytes;

// ---------------------------------------------------------------------------
// BufferError
// ---------------------------------------------------------------------------

/// Errors from pixel buffer operations.
///
/// Every variant except [`Stopped`](Self::Stopped) is a caller precondition
/// violation; none are retried internally. Arithmetic never fails.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BufferError {
    /// Width, height or channel count is zero, or the byte size overflows.
    #[error("width, height or channel count is zero or the buffer size overflows")]
    InvalidDimensions,
    /// Storage length does not equal `width * height * channels`.
    #[error("storage holds {actual} bytes but the layout needs {expected}")]
    InvalidLayout {
        /// Bytes required by the layout.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
    /// Coordinates outside `[0, width) × [0, height)`.
    #[error("pixel ({x}, {y}) is outside the {width}x{height} image")]
    OutOfRange {
        /// Requested column.
        x: u32,
        /// Requested row.
        y: u32,
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },
    /// A channel slice whose length is not the buffer's channel count.
    #[error("channel slice has {actual} values, expected {expected}")]
    ChannelCount {
        /// Channels per pixel.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },
    /// A configured [`BufferLimits`] cap was exceeded.
    #[error(transparent)]
    Limit(#[from] LimitExceeded),
    /// A bulk pass was cancelled through its [`Stop`] token.
    #[error("pixel pass stopped: {0:?}")]
    Stopped(StopReason),
}

impl From<StopReason> for BufferError {
    fn from(reason: StopReason) -> Self {
        Self::Stopped(reason)
    }
}

// ---------------------------------------------------------------------------
// ScanOrder
// ---------------------------------------------------------------------------

/// Pixel visiting order for [`PixelBuffer::scan`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ScanOrder {
    /// Every row left to right, top to bottom.
    #[default]
    RowMajor,
    /// Even rows left to right, odd rows right to left (boustrophedon).
    Serpentine,
}

// ---------------------------------------------------------------------------
// PixelBuffer
// ---------------------------------------------------------------------------

/// Flat interleaved `u8` pixel buffer.
///
/// The byte length is fixed at construction and always equals
/// `width * height * channels`. Pixel `(x, y)` occupies bytes
/// `offset(x, y)..offset(x, y) + channels`, where
/// `offset(x, y) = y * width * channels + x * channels`.
///
/// Storage may be aliased: buffers built with [`from_shared`](Self::from_shared)
/// or [`duplicate`](Self::duplicate) see each other's writes. Accessors take
/// `&self` and borrow the storage only for the duration of the call.
pub struct PixelBuffer {
    storage: SharedBytes,
    layout: PixelLayout,
}

impl PixelBuffer {
    /// Allocate a zero-filled buffer.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidDimensions`] for zero or overflowing
    /// dimensions.
    pub fn new(width: u32, height: u32, channels: u8) -> Result<Self, BufferError> {
        let layout = PixelLayout::new(width, height, channels)?;
        tracing::debug!(width, height, channels, "allocating pixel buffer");
        Ok(Self {
            storage: SharedBytes::new(vec![0u8; layout.byte_len()]),
            layout,
        })
    }

    /// Allocate a zero-filled buffer after checking `limits`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Limit`] before allocating if the buffer would
    /// exceed `limits`.
    pub fn new_with_limits(
        width: u32,
        height: u32,
        channels: u8,
        limits: &BufferLimits,
    ) -> Result<Self, BufferError> {
        check_limits(&PixelLayout::new(width, height, channels)?, limits)?;
        Self::new(width, height, channels)
    }

    /// Allocate a zero-filled buffer for a named channel layout.
    pub fn with_channel_layout(
        width: u32,
        height: u32,
        layout: ChannelLayout,
    ) -> Result<Self, BufferError> {
        Self::new(width, height, layout.channels())
    }

    /// Copy `bytes` into a new buffer with exclusive storage.
    ///
    /// Later changes to `bytes` are not visible through the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidLayout`] if `bytes.len()` is not
    /// `width * height * channels`.
    pub fn from_bytes(
        bytes: &[u8],
        width: u32,
        height: u32,
        channels: u8,
    ) -> Result<Self, BufferError> {
        let layout = validated_layout(bytes.len(), width, height, channels)?;
        tracing::debug!(width, height, channels, "copying pixel buffer");
        Ok(Self {
            storage: SharedBytes::from_slice(bytes),
            layout,
        })
    }

    /// [`from_bytes`](Self::from_bytes), rejecting oversized input before
    /// copying.
    pub fn from_bytes_with_limits(
        bytes: &[u8],
        width: u32,
        height: u32,
        channels: u8,
        limits: &BufferLimits,
    ) -> Result<Self, BufferError> {
        check_limits(&validated_layout(bytes.len(), width, height, channels)?, limits)?;
        Self::from_bytes(bytes, width, height, channels)
    }

    /// Take ownership of `bytes` without copying.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidLayout`] if `bytes.len()` is not
    /// `width * height * channels`.
    pub fn from_vec(
        bytes: Vec<u8>,
        width: u32,
        height: u32,
        channels: u8,
    ) -> Result<Self, BufferError> {
        Self::from_shared(SharedBytes::new(bytes), width, height, channels)
    }

    /// Wrap existing storage without copying.
    ///
    /// The caller's handle and the buffer alias the same bytes; writes through
    /// either are visible to both.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidLayout`] if the storage length is not
    /// `width * height * channels`.
    pub fn from_shared(
        storage: SharedBytes,
        width: u32,
        height: u32,
        channels: u8,
    ) -> Result<Self, BufferError> {
        let layout = validated_layout(storage.len(), width, height, channels)?;
        tracing::debug!(
            width,
            height,
            channels,
            handles = storage.handle_count(),
            "wrapping pixel storage"
        );
        Ok(Self { storage, layout })
    }

    /// Shallow duplicate sharing this buffer's storage and layout.
    ///
    /// Writes through either buffer are visible through the other.
    pub fn duplicate(&self) -> Self {
        tracing::trace!(handles = self.storage.handle_count() + 1, "duplicating pixel buffer");
        Self {
            storage: self.storage.share(),
            layout: self.layout,
        }
    }

    /// Independent copy with its own storage.
    pub fn deep_copy(&self) -> Self {
        tracing::trace!(bytes = self.layout.byte_len(), "deep-copying pixel buffer");
        Self {
            storage: SharedBytes::new(self.storage.to_vec()),
            layout: self.layout,
        }
    }

    /// Consume the buffer and return the backing `Vec<u8>`.
    ///
    /// # Errors
    ///
    /// Returns the buffer unchanged while other handles alias its storage.
    pub fn into_vec(self) -> Result<Vec<u8>, Self> {
        let layout = self.layout;
        self.storage
            .try_unwrap()
            .map_err(|storage| Self { storage, layout })
    }

    // Accessors ---------------------------------------------------------------

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.layout.width()
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.layout.height()
    }

    /// Channels per pixel.
    #[inline]
    pub fn channels(&self) -> u8 {
        self.layout.channels()
    }

    /// Dimensions and channel count.
    #[inline]
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Total byte length (`width * height * channels`).
    #[inline]
    pub fn len(&self) -> usize {
        self.layout.byte_len()
    }

    /// Always `false`; layouts are never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.layout.pixel_count()
    }

    /// Live handle to the underlying bytes (not a copy).
    ///
    /// Writes through the handle bypass the channel accessors and are
    /// visible to every buffer sharing the storage.
    pub fn storage(&self) -> SharedBytes {
        self.storage.share()
    }

    /// Whether `self` and `other` alias the same bytes.
    #[inline]
    pub fn shares_storage_with(&self, other: &PixelBuffer) -> bool {
        SharedBytes::ptr_eq(&self.storage, &other.storage)
    }

    /// Run `f` over the raw bytes.
    ///
    /// # Panics
    ///
    /// The storage stays borrowed while `f` runs; `f` must not write through
    /// this buffer or any buffer sharing its storage.
    pub fn with_raw<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(&self.storage.borrow())
    }

    /// Run `f` over the raw bytes, mutably.
    ///
    /// # Panics
    ///
    /// The storage stays mutably borrowed while `f` runs; `f` must not call
    /// back into this buffer or any buffer sharing its storage.
    pub fn with_raw_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        f(&mut self.storage.borrow_mut())
    }

    /// Byte offset of pixel `(x, y)`; see [`PixelLayout::offset`].
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> Result<usize, BufferError> {
        self.layout.offset(x, y)
    }

    // Channel read/write ------------------------------------------------------

    /// Overwrite the channels of pixel `(x, y)` with `values`.
    ///
    /// # Errors
    ///
    /// [`BufferError::OutOfRange`] for coordinates outside the image,
    /// [`BufferError::ChannelCount`] if `values.len() != channels`.
    #[inline]
    pub fn set_pixel(&self, x: u32, y: u32, values: &[u8]) -> Result<(), BufferError> {
        self.check_channels(values.len())?;
        let range = self.pixel_range(x, y)?;
        self.storage.borrow_mut()[range].copy_from_slice(values);
        Ok(())
    }

    /// Channels of pixel `(x, y)` in a freshly allocated vec.
    ///
    /// # Errors
    ///
    /// [`BufferError::OutOfRange`] for coordinates outside the image.
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Vec<u8>, BufferError> {
        let range = self.pixel_range(x, y)?;
        Ok(self.storage.borrow()[range].to_vec())
    }

    /// Copy the channels of pixel `(x, y)` into `out` without allocating.
    ///
    /// # Errors
    ///
    /// [`BufferError::OutOfRange`] for coordinates outside the image,
    /// [`BufferError::ChannelCount`] if `out.len() != channels`.
    #[inline]
    pub fn get_pixel_into(&self, x: u32, y: u32, out: &mut [u8]) -> Result<(), BufferError> {
        self.check_channels(out.len())?;
        let range = self.pixel_range(x, y)?;
        out.copy_from_slice(&self.storage.borrow()[range]);
        Ok(())
    }

    /// Set every pixel to `values`.
    pub fn fill(&self, values: &[u8]) -> Result<(), BufferError> {
        self.check_channels(values.len())?;
        for pixel in self.storage.borrow_mut().chunks_exact_mut(values.len()) {
            pixel.copy_from_slice(values);
        }
        Ok(())
    }

    // Quantization error ------------------------------------------------------

    /// Per-channel `original - quantized` as signed reals in `[-255, 255]`.
    ///
    /// # Errors
    ///
    /// [`BufferError::ChannelCount`] if either slice is not `channels` long.
    pub fn quantization_error(
        &self,
        original: &[u8],
        quantized: &[u8],
    ) -> Result<Vec<f64>, BufferError> {
        let mut errors = vec![0.0; self.channels() as usize];
        self.quantization_error_into(original, quantized, &mut errors)?;
        Ok(errors)
    }

    /// [`quantization_error`](Self::quantization_error) into caller storage.
    ///
    /// # Errors
    ///
    /// [`BufferError::ChannelCount`] if any slice is not `channels` long.
    #[inline]
    pub fn quantization_error_into(
        &self,
        original: &[u8],
        quantized: &[u8],
        out: &mut [f64],
    ) -> Result<(), BufferError> {
        self.check_channels(original.len())?;
        self.check_channels(quantized.len())?;
        self.check_channels(out.len())?;
        quantize::quantization_error_into(original, quantized, out);
        Ok(())
    }

    /// Add `errors * multiplier` to `values` in place, saturating at
    /// `[0, 255]` and truncating toward zero.
    ///
    /// # Errors
    ///
    /// [`BufferError::ChannelCount`] if either slice is not `channels` long.
    #[inline]
    pub fn apply_quantization_error(
        &self,
        values: &mut [u8],
        errors: &[f64],
        multiplier: f64,
    ) -> Result<(), BufferError> {
        self.check_channels(values.len())?;
        self.check_channels(errors.len())?;
        quantize::apply_quantization_error(values, errors, multiplier);
        Ok(())
    }

    /// Apply `errors * multiplier` directly to the stored pixel `(x, y)`.
    ///
    /// Same arithmetic as [`apply_quantization_error`](Self::apply_quantization_error),
    /// without copying the pixel out and back.
    ///
    /// # Errors
    ///
    /// [`BufferError::OutOfRange`] for coordinates outside the image,
    /// [`BufferError::ChannelCount`] if `errors.len() != channels`.
    #[inline]
    pub fn diffuse_error(
        &self,
        x: u32,
        y: u32,
        errors: &[f64],
        multiplier: f64,
    ) -> Result<(), BufferError> {
        self.check_channels(errors.len())?;
        let range = self.pixel_range(x, y)?;
        quantize::apply_quantization_error(
            &mut self.storage.borrow_mut()[range],
            errors,
            multiplier,
        );
        Ok(())
    }

    /// [`diffuse_error`](Self::diffuse_error) for kernel neighbors that may
    /// fall outside the image.
    ///
    /// Returns `Ok(false)` and leaves the buffer untouched when `(x, y)` is
    /// outside the image.
    ///
    /// # Errors
    ///
    /// [`BufferError::ChannelCount`] if `errors.len() != channels`.
    pub fn try_diffuse_error(
        &self,
        x: i64,
        y: i64,
        errors: &[f64],
        multiplier: f64,
    ) -> Result<bool, BufferError> {
        self.check_channels(errors.len())?;
        match (u32::try_from(x), u32::try_from(y)) {
            (Ok(x), Ok(y)) if self.layout.contains(x, y) => {
                self.diffuse_error(x, y, errors, multiplier)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    // Bulk passes -------------------------------------------------------------

    /// Visit every pixel coordinate in `order`, calling `visit(self, x, y)`.
    ///
    /// No storage borrow is held across calls, so `visit` may read and write
    /// any pixel (typically the current pixel and its diffusion neighbors).
    /// `stop` is checked once per row.
    ///
    /// # Errors
    ///
    /// [`BufferError::Stopped`] when cancelled, or the first error returned by
    /// `visit`.
    pub fn scan(
        &self,
        order: ScanOrder,
        stop: &dyn Stop,
        mut visit: impl FnMut(&PixelBuffer, u32, u32) -> Result<(), BufferError>,
    ) -> Result<(), BufferError> {
        let width = self.width();
        for y in 0..self.height() {
            self.check_stop(stop, y)?;
            let reverse = order == ScanOrder::Serpentine && y % 2 == 1;
            if reverse {
                for x in (0..width).rev() {
                    visit(self, x, y)?;
                }
            } else {
                for x in 0..width {
                    visit(self, x, y)?;
                }
            }
        }
        Ok(())
    }

    /// Transform every pixel in place, row by row.
    ///
    /// The storage stays mutably borrowed for the whole pass; `f` must not
    /// call back into any buffer sharing it.
    ///
    /// # Errors
    ///
    /// [`BufferError::Stopped`] when cancelled; rows already processed keep
    /// their new values.
    pub fn map_pixels(
        &self,
        stop: &dyn Stop,
        mut f: impl FnMut(&mut [u8]),
    ) -> Result<(), BufferError> {
        let channels = self.channels() as usize;
        let row_bytes = self.layout.row_bytes();
        let mut bytes = self.storage.borrow_mut();
        for (y, row) in bytes.chunks_exact_mut(row_bytes).enumerate() {
            self.check_stop(stop, y as u32)?;
            row.chunks_exact_mut(channels).for_each(&mut f);
        }
        Ok(())
    }

    // Private helpers ---------------------------------------------------------

    #[inline]
    fn check_channels(&self, actual: usize) -> Result<(), BufferError> {
        let expected = self.channels() as usize;
        if actual != expected {
            return Err(BufferError::ChannelCount { expected, actual });
        }
        Ok(())
    }

    #[inline]
    fn pixel_range(&self, x: u32, y: u32) -> Result<Range<usize>, BufferError> {
        let start = self.layout.offset(x, y)?;
        Ok(start..start + self.channels() as usize)
    }

    fn check_stop(&self, stop: &dyn Stop, row: u32) -> Result<(), BufferError> {
        stop.check().map_err(|reason| {
            tracing::debug!(row, height = self.height(), ?reason, "pixel pass stopped");
            BufferError::from(reason)
        })
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelBuffer({}x{}, {} channels)",
            self.width(),
            self.height(),
            self.channels()
        )
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Layout for `width × height × channels`, checked against the supplied length.
fn validated_layout(
    len: usize,
    width: u32,
    height: u32,
    channels: u8,
) -> Result<PixelLayout, BufferError> {
    let layout = PixelLayout::new(width, height, channels)?;
    if len != layout.byte_len() {
        return Err(BufferError::InvalidLayout {
            expected: layout.byte_len(),
            actual: len,
        });
    }
    Ok(layout)
}

fn check_limits(layout: &PixelLayout, limits: &BufferLimits) -> Result<(), BufferError> {
    limits.check_layout(layout).map_err(|err| {
        tracing::debug!(%err, "pixel buffer rejected by limits");
        BufferError::from(err)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
