//! Image-decoding factory.

use anyhow::{Context, Result};

use crate::coords::PixelSize;

/// Decoded image in tightly packed RGBA8, ready for `Queue::write_texture`.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub size: PixelSize,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    /// Bytes per row of `rgba`.
    pub fn stride(&self) -> u32 {
        self.size.width * 4
    }
}

/// Decodes encoded image bytes for upload to the device.
///
/// Holds no GPU state and is shared across device generations.
#[derive(Debug, Default)]
pub struct ImageFactory {
    decoded: u64,
}

impl ImageFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `bytes`, sniffing the container format from its header.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<DecodedImage> {
        anyhow::ensure!(!bytes.is_empty(), "cannot decode an empty image buffer");

        let format = image::guess_format(bytes).context("unrecognized image format")?;
        let rgba = image::load_from_memory_with_format(bytes, format)
            .with_context(|| format!("failed to decode {format:?} image"))?
            .into_rgba8();

        self.decoded += 1;
        let (width, height) = rgba.dimensions();
        log::trace!("decoded {format:?} image {width}x{height}");

        Ok(DecodedImage { size: PixelSize::new(width, height), rgba: rgba.into_raw() })
    }

    /// Number of images decoded so far.
    pub fn decoded_count(&self) -> u64 {
        self.decoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png_to_rgba() {
        let mut factory = ImageFactory::new();
        let decoded = factory.decode(&encode_png(3, 2)).unwrap();
        assert_eq!(decoded.size, PixelSize::new(3, 2));
        assert_eq!(decoded.stride(), 12);
        assert_eq!(decoded.rgba.len(), 24);
        assert_eq!(&decoded.rgba[..4], &[10, 20, 30, 255]);
        assert_eq!(factory.decoded_count(), 1);
    }

    #[test]
    fn rejects_empty_and_unknown_input() {
        let mut factory = ImageFactory::new();
        assert!(factory.decode(&[]).is_err());
        assert!(factory.decode(b"definitely not an image").is_err());
        assert_eq!(factory.decoded_count(), 0);
    }
}
