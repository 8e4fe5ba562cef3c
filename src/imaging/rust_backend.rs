//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF) | `image` crate (pure Rust decoders) |
//! | Identify | `image::image_dimensions` (header only, no full decode) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Crop to fill | `DynamicImage::resize_to_fill` |
//! | Encode JPEG | `image::codecs::jpeg::JpegEncoder` with configured quality |
//! | Encode PNG / GIF | `DynamicImage::save_with_format` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::ResizeParams;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;

/// Pure Rust backend using the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Save a DynamicImage to the given path, inferring format from extension.
fn save_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => save_jpeg(img, path, quality),
        "png" => save_with(img, path, ImageFormat::Png),
        "gif" => save_with(img, path, ImageFormat::Gif),
        other => Err(BackendError::ProcessingFailed(format!(
            "Unsupported output format: {}",
            other
        ))),
    }
}

fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality as u8);
    // JPEG has no alpha channel
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

fn save_with(img: &DynamicImage, path: &Path, format: ImageFormat) -> Result<(), BackendError> {
    img.save_with_format(path, format).map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to write {}: {}", path.display(), e))
    })
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = if params.crop {
            img.resize_to_fill(params.width, params.height, FilterType::Lanczos3)
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };
        save_image(&resized, &params.output, params.quality.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use image::{ImageEncoder, RgbImage};

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let backend = RustBackend::new();
        let dims = backend.identify(&path).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 150);
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let backend = RustBackend::new();
        let result = backend.identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn resize_writes_scaled_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo.jpg");
        let output = tmp.path().join("photo.100x.jpg");
        create_test_jpeg(&source, 400, 300);

        let backend = RustBackend::new();
        backend
            .resize(&ResizeParams {
                source: source.clone(),
                output: output.clone(),
                width: 100,
                height: 75,
                crop: false,
                quality: Quality::new(80),
            })
            .unwrap();

        let dims = backend.identify(&output).unwrap();
        assert_eq!((dims.width, dims.height), (100, 75));
    }

    #[test]
    fn resize_crop_fills_exact_box_as_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo.jpg");
        let output = tmp.path().join("photo.50x50.png");
        create_test_jpeg(&source, 400, 300);

        let backend = RustBackend::new();
        backend
            .resize(&ResizeParams {
                source,
                output: output.clone(),
                width: 50,
                height: 50,
                crop: true,
                quality: Quality::default(),
            })
            .unwrap();

        let dims = backend.identify(&output).unwrap();
        assert_eq!((dims.width, dims.height), (50, 50));
    }

    #[test]
    fn resize_corrupt_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"not really a jpeg").unwrap();

        let backend = RustBackend::new();
        let result = backend.resize(&ResizeParams {
            source,
            output: tmp.path().join("broken.100x.jpg"),
            width: 100,
            height: 100,
            crop: false,
            quality: Quality::default(),
        });
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }

    #[test]
    fn unsupported_output_extension_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo.jpg");
        create_test_jpeg(&source, 40, 30);

        let backend = RustBackend::new();
        let result = backend.resize(&ResizeParams {
            source,
            output: tmp.path().join("photo.20x.tiff"),
            width: 20,
            height: 15,
            crop: false,
            quality: Quality::default(),
        });
        assert!(matches!(result, Err(BackendError::ProcessingFailed(msg)) if msg.contains("tiff")));
    }
}
