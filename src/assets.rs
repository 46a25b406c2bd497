use std::path::Path;

use anyhow::Context;

use crate::{error::SlidereelResult, frame::FrameRgb};

/// Decode encoded image bytes into an RGB8 frame of the image's native
/// size. Effects resize and crop later, so no scaling happens here.
pub fn decode_image(bytes: &[u8]) -> SlidereelResult<FrameRgb> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgb = dyn_img.to_rgb8();
    let (width, height) = rgb.dimensions();
    FrameRgb::new(width, height, rgb.into_raw())
}

/// Read and decode an image file. Missing files and undecodable bytes fail
/// with the path in the error chain.
pub fn load_image(path: &Path) -> SlidereelResult<FrameRgb> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes).map_err(|e| {
        crate::error::SlidereelError::validation(format!(
            "decode image '{}': {e}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 42])
        });
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    #[test]
    fn decode_round_trips_dimensions_and_pixels() {
        let frame = decode_image(&png_bytes(5, 4)).unwrap();
        assert_eq!((frame.width, frame.height), (5, 4));
        assert_eq!(frame.pixel(3, 2), [3, 2, 42]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode_image(b"definitely not an image").is_err());
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = load_image(Path::new("no/such/image.png")).unwrap_err();
        assert!(err.to_string().contains("no/such/image.png"));
    }
}
