//! Image decoding.

use image::DynamicImage;
use tracing::debug;

use crate::error::{DetectError, DetectResult};

/// Decode an uploaded image payload into a pixel grid.
///
/// Accepts any encoding the `image` crate understands (JPEG and PNG at
/// minimum). Empty payloads and unparsable byte streams fail; there is
/// no degenerate zero-size image on the success path.
pub fn decode_image(bytes: &[u8]) -> DetectResult<DynamicImage> {
    if bytes.is_empty() {
        return Err(DetectError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    debug!(
        width = img.width(),
        height = img.height(),
        "Decoded uploaded image"
    );
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_valid_png() {
        let img = decode_image(&png_bytes(32, 24)).unwrap();
        assert_eq!(img.width(), 32);
        assert_eq!(img.height(), 24);
    }

    #[test]
    fn test_decode_empty_input() {
        assert!(matches!(decode_image(&[]), Err(DetectError::EmptyInput)));
    }

    #[test]
    fn test_decode_garbage_bytes() {
        let garbage = [0x00, 0x01, 0x02, 0xff, 0xfe, 0xfd, 0x42, 0x42];
        assert!(matches!(decode_image(&garbage), Err(DetectError::Decode(_))));
    }
}
