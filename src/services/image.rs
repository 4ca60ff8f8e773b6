/// Image processing for uploads: resize to fit 800x800 and re-encode as
/// JPEG at quality 80 before storage.
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use std::io::Cursor;
use thiserror::Error;

const MAX_DIMENSION: u32 = 800;
const JPEG_QUALITY: u8 = 80;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Invalid image data: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Empty image upload")]
    Empty,
}

/// Decode, downscale to fit within 800x800 (no upscaling, aspect ratio
/// preserved) and re-encode as JPEG q80.
pub fn optimize(data: &[u8]) -> Result<Vec<u8>, ImageError> {
    if data.is_empty() {
        return Err(ImageError::Empty);
    }

    let img = image::load_from_memory(data)?;

    let (width, height) = img.dimensions();
    let img = if width > MAX_DIMENSION || height > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();

    let mut out = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder.encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        image::ColorType::Rgb8,
    )?;

    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 0]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn large_image_is_downscaled_to_fit() {
        let data = png_bytes(1600, 1200);
        let optimized = optimize(&data).unwrap();

        let result = image::load_from_memory(&optimized).unwrap();
        let (w, h) = result.dimensions();
        assert!(w <= MAX_DIMENSION && h <= MAX_DIMENSION);
        // Aspect ratio 4:3 preserved.
        assert_eq!(w, 800);
        assert_eq!(h, 600);
    }

    #[test]
    fn small_image_is_not_upscaled() {
        let data = png_bytes(200, 100);
        let optimized = optimize(&data).unwrap();

        let result = image::load_from_memory(&optimized).unwrap();
        assert_eq!(result.dimensions(), (200, 100));
    }

    #[test]
    fn output_is_jpeg() {
        let data = png_bytes(100, 100);
        let optimized = optimize(&data).unwrap();
        assert_eq!(
            image::guess_format(&optimized).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn garbage_input_is_rejected() {
        assert!(optimize(b"definitely not an image").is_err());
        assert!(matches!(optimize(b""), Err(ImageError::Empty)));
    }
}
