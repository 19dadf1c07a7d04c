//! Writing captured frames to image files.

use image::{ImageBuffer, Rgba};
use std::path::Path;

/// Saves tightly packed RGBA8 pixel data to an image file.
///
/// # Arguments
/// * `path` - Output filename (supports .png, .jpg, .jpeg)
/// * `data` - Raw RGBA pixel data, rows top to bottom
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Errors
/// Returns an error if the file cannot be written or format is unsupported.
pub fn save_image(
    path: impl AsRef<Path>,
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<(), ScreenshotError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let img = to_image(data, width, height)?;

    match extension.as_str() {
        "png" => {
            img.save_with_format(path, image::ImageFormat::Png)?;
        }
        "jpg" | "jpeg" => {
            // JPEG has no alpha
            let rgb_img = image::DynamicImage::ImageRgba8(img).to_rgb8();
            rgb_img.save_with_format(path, image::ImageFormat::Jpeg)?;
        }
        _ => {
            return Err(ScreenshotError::UnsupportedFormat(extension));
        }
    }

    log::info!("saved {width}x{height} image to {}", path.display());
    Ok(())
}

fn to_image(
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<ImageBuffer<Rgba<u8>, Vec<u8>>, ScreenshotError> {
    // wgpu uses top-left origin, so no vertical flip needed
    ImageBuffer::from_raw(width, height, data.to_vec()).ok_or(ScreenshotError::InvalidImageData)
}

/// Error type for screenshot operations.
#[derive(Debug, thiserror::Error)]
pub enum ScreenshotError {
    #[error("Failed to save image: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid image data")]
    InvalidImageData,

    #[error("GPU buffer mapping failed")]
    BufferMapFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_data_is_invalid() {
        let path = std::env::temp_dir().join("cumulus_screenshot_short.png");
        assert!(matches!(
            save_image(&path, &[0, 0, 0], 1, 1),
            Err(ScreenshotError::InvalidImageData)
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let path = std::env::temp_dir().join("cumulus_screenshot_test.bmpx");
        assert!(matches!(
            save_image(&path, &[0; 4], 1, 1),
            Err(ScreenshotError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_save_png_round_trip() {
        let path = std::env::temp_dir().join("cumulus_screenshot_test.png");
        let data = [10, 20, 30, 255, 40, 50, 60, 255];
        save_image(&path, &data, 2, 1).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.as_raw().as_slice(), &data);
        let _ = std::fs::remove_file(&path);
    }
}
