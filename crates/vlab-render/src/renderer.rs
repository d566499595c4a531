//! Open an image and draw detection results over it.

use std::path::Path;

use ab_glyph::FontVec;
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::{debug, info, warn};
use vlab_models::{DetectionResults, FaceDetection, ObjectDetection};

use crate::draw::{draw_overlay, LabelStyle};
use crate::error::RenderResult;
use crate::overlay::Overlay;
use crate::palette::Palette;

/// Open an image file, format guessed from its content.
pub fn open_image(path: impl AsRef<Path>) -> RenderResult<DynamicImage> {
    let path = path.as_ref();
    debug!("Opening {}", path.display());
    let image = image::ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(image)
}

/// Save an annotated image, format chosen by extension.
///
/// Alpha is dropped for formats without it (JPEG).
pub fn save_image(image: RgbaImage, path: impl AsRef<Path>) -> RenderResult<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)?;
    let image = DynamicImage::ImageRgba8(image);

    match format {
        ImageFormat::Jpeg => image.to_rgb8().save_with_format(path, format)?,
        _ => image.save_with_format(path, format)?,
    }

    info!("Saved {}", path.display());
    Ok(())
}

/// Draws results with a fixed font, style and color source.
pub struct Renderer {
    font: Option<FontVec>,
    style: LabelStyle,
    palette: Palette,
}

impl Renderer {
    pub fn new(font: Option<FontVec>, style: LabelStyle, palette: Palette) -> Self {
        if font.is_none() {
            warn!("No label font configured, drawing boxes without labels");
        }
        Self {
            font,
            style,
            palette,
        }
    }

    /// Object boxes for detections scoring at least `threshold`.
    pub fn render_objects(
        &mut self,
        image: &DynamicImage,
        results: &DetectionResults<ObjectDetection>,
        threshold: f64,
    ) -> RgbaImage {
        let overlay = Overlay::for_objects(
            results,
            image.width(),
            image.height(),
            threshold,
            &mut self.palette,
        );
        info!(
            "Drawing {} of {} objects (threshold {})",
            overlay.len(),
            results.len(),
            threshold
        );
        self.draw(image, &overlay)
    }

    /// Face boxes with emotion labels.
    pub fn render_faces(&mut self, image: &DynamicImage, results: &DetectionResults<FaceDetection>) -> RgbaImage {
        let overlay = Overlay::for_faces(results, &mut self.palette);
        info!("Drawing {} faces", overlay.len());
        self.draw(image, &overlay)
    }

    fn draw(&self, image: &DynamicImage, overlay: &Overlay) -> RgbaImage {
        let mut canvas = image.to_rgba8();
        draw_overlay(&mut canvas, overlay, self.font.as_ref(), &self.style);
        canvas
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(None, LabelStyle::default(), Palette::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use vlab_models::Likelihood;

    fn white(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
    }

    #[test]
    fn test_render_objects_scales_to_image() {
        let results = DetectionResults::new(vec![
            ObjectDetection {
                name: "Cup".to_string(),
                score: 0.9,
                vertices: vec![(0.25, 0.25), (0.75, 0.25), (0.75, 0.75), (0.25, 0.75)],
            },
            ObjectDetection {
                name: "Spoon".to_string(),
                score: 0.3,
                vertices: vec![(0.0, 0.0), (0.1, 0.0), (0.1, 0.1), (0.0, 0.1)],
            },
        ]);

        let mut renderer = Renderer::new(None, LabelStyle::default(), Palette::seeded(42));
        let out = renderer.render_objects(&white(80, 40), &results, 0.8);

        assert_eq!(out.dimensions(), (80, 40));
        assert_eq!(out.get_pixel(20, 10).0[0], 255);
        assert_ne!(out.get_pixel(20, 10).0[1..3], [255, 255]);
        // Spoon is below threshold.
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_render_faces() {
        let results = DetectionResults::new(vec![FaceDetection {
            anger: Likelihood::Likely,
            joy: Likelihood::Unknown,
            surprise: Likelihood::Unknown,
            vertices: vec![(2.0, 3.0), (12.0, 3.0), (12.0, 13.0), (2.0, 13.0)],
        }]);

        let mut renderer = Renderer::new(None, LabelStyle::default(), Palette::seeded(9));
        let out = renderer.render_faces(&white(20, 20), &results);
        assert_ne!(out.get_pixel(2, 3).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(7, 8).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_render_faces_with_font_draws_label() {
        let font = crate::load_font(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSansMono.ttf")).unwrap();
        let results = DetectionResults::new(vec![FaceDetection {
            anger: Likelihood::Unknown,
            joy: Likelihood::VeryLikely,
            surprise: Likelihood::Unknown,
            vertices: vec![(10.0, 10.0), (90.0, 10.0), (90.0, 60.0), (10.0, 60.0)],
        }]);

        let mut labelled = Renderer::new(Some(font), LabelStyle::default(), Palette::seeded(5));
        let with_label = labelled.render_faces(&white(100, 70), &results);
        let mut plain = Renderer::new(None, LabelStyle::default(), Palette::seeded(5));
        let without_label = plain.render_faces(&white(100, 70), &results);

        // Same box, plus a tinted background and dark "JOY" text near (16, 28).
        assert_eq!(with_label.get_pixel(10, 10), without_label.get_pixel(10, 10));
        assert_ne!(with_label.get_pixel(15, 20).0, [255, 255, 255, 255]);
        assert_eq!(without_label.get_pixel(15, 20).0, [255, 255, 255, 255]);
        assert!(with_label.pixels().any(|p| p.0[0] < 100));
        assert!(!without_label.pixels().any(|p| p.0[0] < 100));
    }

    #[test]
    fn test_open_image_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.png");
        RgbImage::from_pixel(3, 2, Rgb([1, 2, 3])).save(&path).unwrap();

        let image = open_image(&path).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
    }

    #[test]
    fn test_save_image_as_jpeg_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        save_image(RgbaImage::from_pixel(8, 8, image::Rgba([200, 10, 10, 255])), &path).unwrap();

        let reopened = open_image(&path).unwrap();
        assert_eq!((reopened.width(), reopened.height()), (8, 8));
        assert!(!reopened.color().has_alpha());
    }

    #[test]
    fn test_save_image_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.unknown");
        assert!(save_image(RgbaImage::new(1, 1), &path).is_err());
    }
}
