//! Conversions from decoder output.
//!
//! Decoders commonly hand out `imgref` images of `rgb` pixel structs (or of
//! plain `u8` for grayscale), possibly with a stride wider than the image.
//! These conversions repack the pixels into a tightly packed [`PixelBuffer`]
//! with exclusive storage.

use alloc::vec::Vec;

use imgref::ImgRef;
use rgb::alt::BGRA8;
use rgb::{Gray, RGB8, RGBA8};

use crate::buffer::{BufferError, PixelBuffer};
use crate::layout::{ChannelLayout, PixelLayout};

macro_rules! impl_try_from_imgref {
    ($pixel:ty, $layout:expr, |$px:ident| $channels:expr) => {
        impl<'a> TryFrom<ImgRef<'a, $pixel>> for PixelBuffer {
            type Error = BufferError;

            fn try_from(img: ImgRef<'a, $pixel>) -> Result<Self, BufferError> {
                let width =
                    u32::try_from(img.width()).map_err(|_| BufferError::InvalidDimensions)?;
                let height =
                    u32::try_from(img.height()).map_err(|_| BufferError::InvalidDimensions)?;
                let layout = PixelLayout::with_channel_layout(width, height, $layout)?;
                let mut bytes = Vec::with_capacity(layout.byte_len());
                for row in img.rows() {
                    for $px in row {
                        bytes.extend_from_slice(&$channels);
                    }
                }
                PixelBuffer::from_vec(bytes, width, height, layout.channels())
            }
        }
    };
}

impl_try_from_imgref!(u8, ChannelLayout::Gray, |px| [*px]);
impl_try_from_imgref!(Gray<u8>, ChannelLayout::Gray, |px| [px.value()]);
impl_try_from_imgref!(RGB8, ChannelLayout::Rgb, |px| [px.r, px.g, px.b]);
impl_try_from_imgref!(RGBA8, ChannelLayout::Rgba, |px| [px.r, px.g, px.b, px.a]);
impl_try_from_imgref!(BGRA8, ChannelLayout::Bgra, |px| [px.b, px.g, px.r, px.a]);

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use imgref::Img;

    #[test]
    fn rgb8_image_repacks_interleaved() {
        let pixels = vec![
            RGB8::new(10, 20, 30),
            RGB8::new(40, 50, 60),
            RGB8::new(70, 80, 90),
            RGB8::new(100, 110, 120),
        ];
        let buf = PixelBuffer::try_from(Img::new(pixels.as_slice(), 2, 2)).unwrap();
        assert_eq!(buf.channels(), 3);
        assert_eq!(buf.get_pixel(1, 0).unwrap(), [40, 50, 60]);
        assert_eq!(buf.get_pixel(0, 1).unwrap(), [70, 80, 90]);
    }

    #[test]
    fn strided_image_drops_padding() {
        // width 2, stride 3: the third pixel of each row is padding
        let pixels = vec![1u8, 2, 255, 3, 4, 255];
        let img = Img::new_stride(pixels.as_slice(), 2, 2, 3);
        let buf = PixelBuffer::try_from(img).unwrap();
        assert_eq!(buf.len(), 4);
        buf.with_raw(|bytes| assert_eq!(bytes, &[1, 2, 3, 4]));
    }

    #[test]
    fn bgra_keeps_memory_order() {
        let pixels = vec![BGRA8 {
            b: 1,
            g: 2,
            r: 3,
            a: 4,
        }];
        let buf = PixelBuffer::try_from(Img::new(pixels.as_slice(), 1, 1)).unwrap();
        assert_eq!(buf.get_pixel(0, 0).unwrap(), [1, 2, 3, 4]);
    }

    #[test]
    fn rgba_keeps_alpha() {
        let rgba = vec![RGBA8::new(1, 2, 3, 4)];
        let buf = PixelBuffer::try_from(Img::new(rgba.as_slice(), 1, 1)).unwrap();
        assert_eq!(buf.get_pixel(0, 0).unwrap(), [1, 2, 3, 4]);
    }

    #[test]
    fn gray_pixels_match_plain_bytes() {
        let gray = vec![Gray::new(5u8), Gray::new(6), Gray::new(7), Gray::new(8)];
        let buf = PixelBuffer::try_from(Img::new(gray.as_slice(), 2, 2)).unwrap();
        assert_eq!(buf.channels(), 1);
        buf.with_raw(|bytes| assert_eq!(bytes, &[5, 6, 7, 8]));
    }

    #[test]
    fn zero_width_image_is_invalid_dimensions() {
        let img = Img::new_stride(&[] as &[u8], 0, 1, 1);
        assert_eq!(
            PixelBuffer::try_from(img).unwrap_err(),
            BufferError::InvalidDimensions
        );
    }
}
