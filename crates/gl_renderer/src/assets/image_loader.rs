//! Image loading utilities for texture data
//!
//! Images are decoded with the `image` crate, flipped vertically so the
//! first row is the bottom of the texture (OpenGL's origin), and kept in
//! their own channel count. Only 1, 3 and 4 channel images are accepted.

use std::path::Path;

use crate::assets::AssetError;

/// GL pixel layout matching an image's channel count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One channel
    Red,
    /// Three channels
    Rgb,
    /// Four channels
    Rgba,
}

impl PixelFormat {
    /// Format for a decoded channel count
    pub fn from_channels(channels: u8) -> Result<Self, AssetError> {
        match channels {
            1 => Ok(Self::Red),
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            other => Err(AssetError::UnsupportedChannelCount(other)),
        }
    }

    /// `GL_RED`, `GL_RGB` or `GL_RGBA`
    pub fn gl_format(self) -> u32 {
        match self {
            Self::Red => glow::RED,
            Self::Rgb => glow::RGB,
            Self::Rgba => glow::RGBA,
        }
    }

    /// Bytes per pixel
    pub fn channels(self) -> u8 {
        match self {
            Self::Red => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Loaded image data ready for GPU upload
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Tightly packed 8-bit pixel rows, bottom row first
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Pixel layout
    pub format: PixelFormat,
}

impl ImageData {
    /// Load an image from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        log::debug!("Loading image from: {:?}", path);

        let image = image::open(path).map_err(|e| AssetError::Image {
            path: path.display().to_string(),
            source: e,
        })?;
        let data = Self::from_dynamic(image)?;

        log::info!(
            "Loaded image {}x{} ({:?}) from {:?}",
            data.width,
            data.height,
            data.format,
            path
        );
        Ok(data)
    }

    /// Convert a decoded image, keeping its channel count
    pub fn from_dynamic(image: image::DynamicImage) -> Result<Self, AssetError> {
        let format = PixelFormat::from_channels(image.color().channel_count())?;
        let image = image.flipv();
        let (width, height) = (image.width(), image.height());

        let data = match format {
            PixelFormat::Red => image.to_luma8().into_raw(),
            PixelFormat::Rgb => image.to_rgb8().into_raw(),
            PixelFormat::Rgba => image.to_rgba8().into_raw(),
        };

        Ok(Self { data, width, height, format })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage};

    #[test]
    fn test_channel_mapping() {
        assert_eq!(PixelFormat::from_channels(1).expect("red").gl_format(), glow::RED);
        assert_eq!(PixelFormat::from_channels(3).expect("rgb").gl_format(), glow::RGB);
        assert_eq!(PixelFormat::from_channels(4).expect("rgba").gl_format(), glow::RGBA);

        for channels in [0, 2, 5] {
            assert!(matches!(
                PixelFormat::from_channels(channels),
                Err(AssetError::UnsupportedChannelCount(c)) if c == channels
            ));
        }
    }

    #[test]
    fn test_rows_are_flipped() {
        // Top row 10, bottom row 20
        let gray = GrayImage::from_raw(2, 2, vec![10, 10, 20, 20]).expect("buffer size");
        let data = ImageData::from_dynamic(DynamicImage::ImageLuma8(gray)).expect("convert");

        assert_eq!(data.format, PixelFormat::Red);
        assert_eq!(data.data, vec![20, 20, 10, 10]);
    }

    #[test]
    fn test_rgb_keeps_three_channels() {
        let rgb = RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3]));
        let data = ImageData::from_dynamic(DynamicImage::ImageRgb8(rgb)).expect("convert");

        assert_eq!(data.format, PixelFormat::Rgb);
        assert_eq!(data.data.len(), 3 * 2 * 3);
        assert_eq!(&data.data[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_gray_alpha_is_rejected() {
        let image = GrayAlphaImage::new(1, 1);
        let result = ImageData::from_dynamic(DynamicImage::ImageLumaA8(image));
        assert!(matches!(result, Err(AssetError::UnsupportedChannelCount(2))));
    }
}
