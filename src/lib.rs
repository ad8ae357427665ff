//! Flat interleaved 8-bit pixel buffer for dithering and quantization.
//!
//! This crate is the pixel store that error-diffusion passes run on:
//!
//! - [`PixelBuffer`] — `width × height × channels` bytes, row-major with
//!   channels interleaved, addressed by `(x, y)`
//! - [`PixelLayout`] / [`ChannelLayout`] — the offset contract
//!   `y * width * channels + x * channels`
//! - [`SharedBytes`] — reference-counted storage for aliasing buffers
//! - [`quantize`] — per-channel quantization error and clamped error
//!   application (saturating at `[0, 255]`, truncating toward zero)
//! - [`BufferLimits`] — caps checked before allocating or copying
//!
//! Dithering algorithms, decoders and encoders live elsewhere and talk to the
//! buffer through this interface.
//!
//! ```
//! use zendither_buffer::{PixelBuffer, ScanOrder, Unstoppable};
//!
//! // 1-bit Floyd-Steinberg over flat mid-dark gray
//! let buf = PixelBuffer::from_vec(vec![96; 16], 4, 4, 1).unwrap();
//! let (mut px, mut err) = ([0u8], [0.0f64]);
//! buf.scan(ScanOrder::RowMajor, &Unstoppable, |b, x, y| {
//!     b.get_pixel_into(x, y, &mut px)?;
//!     let q = [if px[0] < 128 { 0 } else { 255 }];
//!     b.quantization_error_into(&px, &q, &mut err)?;
//!     b.set_pixel(x, y, &q)?;
//!     let (x, y) = (i64::from(x), i64::from(y));
//!     b.try_diffuse_error(x + 1, y, &err, 7.0 / 16.0)?;
//!     b.try_diffuse_error(x - 1, y + 1, &err, 3.0 / 16.0)?;
//!     b.try_diffuse_error(x, y + 1, &err, 5.0 / 16.0)?;
//!     b.try_diffuse_error(x + 1, y + 1, &err, 1.0 / 16.0)?;
//!     Ok(())
//! })
//! .unwrap();
//! buf.with_raw(|bytes| assert!(bytes.iter().all(|&b| b == 0 || b == 255)));
//! ```
//!
//! # Sharing and threads
//!
//! Buffers built without copying, or with [`PixelBuffer::duplicate`], alias
//! one [`SharedBytes`] allocation. The handle is `!Send`, so aliased storage
//! never crosses threads and needs no locking. To parallelize, give each
//! worker its own buffer.

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

mod buffer;
mod interop;
mod layout;
mod limits;
pub mod quantize;
mod storage;

pub use buffer::{BufferError, PixelBuffer, ScanOrder};
pub use layout::{ChannelLayout, PixelLayout};
pub use limits::{BufferLimits, LimitExceeded};
pub use storage::SharedBytes;

// Re-exports for callers driving bulk passes and converting decoder output.
pub use enough::{Stop, StopReason, Unstoppable};
pub use imgref::{Img, ImgRef};
pub use rgb;
