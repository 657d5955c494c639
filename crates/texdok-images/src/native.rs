//! In-process SVG rasterization
//!
//! Requires the `native` feature:
//! ```toml
//! texdok-images = { version = "0.1", features = ["native"] }
//! ```

use std::fs;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::{ImageError, Result};
use crate::strategy::{ConversionRequest, ConversionStrategy};

/// Upper bound on upscaling small drawings
const MAX_UPSCALE: f32 = 2.0;

/// System fonts, loaded once per process
static FONT_DB: Lazy<Arc<usvg::fontdb::Database>> = Lazy::new(|| {
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();
    if fontdb.is_empty() {
        log::warn!("No system fonts found, SVG text may not render");
    }
    Arc::new(fontdb)
});

/// SVG to PNG with resvg
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeSvgStrategy;

impl NativeSvgStrategy {
    /// Create the strategy
    pub fn new() -> Self {
        Self
    }
}

/// Scale factor and pixel size that fit `width`×`height` inside a
/// `max`×`max` box, keeping the aspect ratio
pub fn fit_within(width: f32, height: f32, max: u32) -> (u32, u32, f32) {
    let longest = width.max(height).max(1.0);
    let scale = (max as f32 / longest).min(MAX_UPSCALE);
    let w = ((width * scale).round() as u32).clamp(1, max.max(1));
    let h = ((height * scale).round() as u32).clamp(1, max.max(1));
    (w, h, scale)
}

impl ConversionStrategy for NativeSvgStrategy {
    fn name(&self) -> &'static str {
        "native"
    }

    fn supports(&self, extension: &str) -> bool {
        matches!(extension, "svg" | "svgz")
    }

    fn is_available(&self) -> bool {
        true
    }

    fn convert(&self, request: &ConversionRequest<'_>) -> Result<()> {
        let data = fs::read(request.source)?;

        let mut options = usvg::Options::default();
        options.resources_dir = request.source.parent().map(|p| p.to_path_buf());
        options.fontdb = Arc::clone(&FONT_DB);

        let tree = usvg::Tree::from_data(&data, &options)
            .map_err(|e| ImageError::InvalidSource(format!("SVG parsing failed: {}", e)))?;

        let size = tree.size();
        let (width, height, scale) =
            fit_within(size.width(), size.height(), request.max_dimension);

        let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            ImageError::ConversionFailed {
                tool: self.name().to_string(),
                message: format!("failed to create pixmap ({}x{})", width, height),
            }
        })?;
        // Flatten transparency onto white
        pixmap.fill(tiny_skia::Color::WHITE);

        let transform = tiny_skia::Transform::from_scale(scale, scale);
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        let png = pixmap.encode_png().map_err(|e| ImageError::ConversionFailed {
            tool: self.name().to_string(),
            message: format!("PNG encoding failed: {}", e),
        })?;
        fs::write(request.target, png)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fit_within_downscales() {
        let (w, h, scale) = fit_within(4000.0, 2000.0, 2048);
        assert_eq!((w, h), (2048, 1024));
        assert!((scale - 0.512).abs() < 1e-4);
    }

    #[test]
    fn test_fit_within_caps_upscale() {
        let (w, h, scale) = fit_within(100.0, 50.0, 2048);
        assert_eq!((w, h), (200, 100));
        assert_eq!(scale, MAX_UPSCALE);
    }

    #[test]
    fn test_svg_to_png() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("box.svg");
        let target = dir.path().join("box.png");
        fs::write(
            &source,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><rect width="40" height="20" fill="red"/></svg>"#,
        )
        .unwrap();

        let request = ConversionRequest {
            source: &source,
            target: &target,
            max_dimension: 64,
            timeout: Duration::from_secs(5),
        };
        NativeSvgStrategy::new().convert(&request).unwrap();

        let png = fs::read(&target).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_invalid_svg() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("bad.svg");
        fs::write(&source, "this is not svg").unwrap();
        let target = dir.path().join("bad.png");
        let request = ConversionRequest {
            source: &source,
            target: &target,
            max_dimension: 64,
            timeout: Duration::from_secs(5),
        };
        assert!(matches!(
            NativeSvgStrategy::new().convert(&request),
            Err(ImageError::InvalidSource(_))
        ));
        assert!(!target.exists());
    }
}
