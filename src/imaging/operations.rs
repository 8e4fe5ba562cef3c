//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_target_dimensions;
use super::params::{Quality, ResizeParams, ThumbnailSize};
use crate::naming::sized_filename;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// A resized sibling written next to its source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedVariant {
    /// Size token the variant was generated for (`"400x"`).
    pub token: String,
    /// Output filename, e.g. `cover.400x.jpg`.
    pub filename: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Build the resize parameters for one variant without executing it.
///
/// Useful for testing parameter generation.
pub fn plan_variant(
    source: &Path,
    output_dir: &Path,
    original_dims: (u32, u32),
    size: ThumbnailSize,
    quality: Quality,
) -> ResizeParams {
    let filename = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (width, height) = calculate_target_dimensions(original_dims, size);

    ResizeParams {
        source: source.to_path_buf(),
        output: output_dir.join(sized_filename(&filename, &size.token())),
        width,
        height,
        crop: size.is_crop(),
        quality,
    }
}

/// Create one resized variant of `source` inside `output_dir`.
pub fn create_variant(
    backend: &dyn ImageBackend,
    source: &Path,
    output_dir: &Path,
    size: ThumbnailSize,
    quality: Quality,
) -> Result<GeneratedVariant> {
    let dims = backend.identify(source)?;
    let params = plan_variant(source, output_dir, (dims.width, dims.height), size, quality);
    backend.resize(&params)?;

    let filename = params
        .output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(GeneratedVariant {
        token: size.token(),
        filename,
        path: params.output,
        width: params.width,
        height: params.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    fn size(token: &str) -> ThumbnailSize {
        ThumbnailSize::parse(token).unwrap()
    }

    #[test]
    fn plan_variant_names_output_with_size_token() {
        let params = plan_variant(
            Path::new("/content/post/photo.JPG"),
            Path::new("/build/article/2020/05/post"),
            (1600, 1200),
            size("400x"),
            Quality::default(),
        );

        assert_eq!(
            params.output,
            Path::new("/build/article/2020/05/post/photo.400x.jpg")
        );
        assert_eq!((params.width, params.height), (400, 300));
        assert!(!params.crop);
    }

    #[test]
    fn plan_variant_crop_box() {
        let params = plan_variant(
            Path::new("/src/a.png"),
            Path::new("/out"),
            (2000, 2000),
            size("400x300"),
            Quality::new(70),
        );

        assert!(params.crop);
        assert_eq!((params.width, params.height), (400, 300));
        assert_eq!(params.quality.value(), 70);
    }

    #[test]
    fn create_variant_identifies_then_resizes() {
        let backend = MockBackend::with_dimensions(2400, 1600);

        let variant = create_variant(
            &backend,
            Path::new("/src/cover.jpg"),
            Path::new("/out"),
            size("1200x"),
            Quality::default(),
        )
        .unwrap();

        assert_eq!(variant.filename, "cover.1200x.jpg");
        assert_eq!(variant.token, "1200x");
        assert_eq!((variant.width, variant.height), (1200, 800));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/src/cover.jpg"));
        assert!(matches!(
            &ops[1],
            RecordedOp::Resize { output, width: 1200, height: 800, .. } if output == "/out/cover.1200x.jpg"
        ));
    }

    #[test]
    fn create_variant_propagates_backend_failure() {
        let backend = MockBackend::failing_on("cover");

        let result = create_variant(
            &backend,
            Path::new("/src/cover.jpg"),
            Path::new("/out"),
            size("400x"),
            Quality::default(),
        );

        assert!(result.is_err());
    }
}
