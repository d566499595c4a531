//! Boxes and labels to draw, computed from detection results.

use image::Rgb;
use tracing::warn;
use vlab_models::{DetectionRecord, DetectionResults, FaceDetection, ObjectDetection, PixelBox};

use crate::palette::Palette;

/// Objects scoring below this are not drawn unless the caller says otherwise.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.80;

/// One box to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayBox {
    /// Key of the detection in the results document
    pub id: usize,
    pub rect: PixelBox,
    pub label: String,
    pub color: Rgb<u8>,
}

/// Everything drawn over one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub boxes: Vec<OverlayBox>,
}

impl Overlay {
    /// Boxes for objects scoring at least `threshold`, scaled to the image.
    pub fn for_objects(
        results: &DetectionResults<ObjectDetection>,
        image_width: u32,
        image_height: u32,
        threshold: f64,
        palette: &mut Palette,
    ) -> Self {
        let boxes = results
            .iter()
            .filter(|(_, object)| object.passes(threshold))
            .filter_map(|(id, object)| {
                let rect = object.pixel_box(image_width, image_height);
                place(id, object, rect, palette)
            })
            .collect();

        Self { boxes }
    }

    /// Boxes for every face, labelled with its likely emotions.
    pub fn for_faces(results: &DetectionResults<FaceDetection>, palette: &mut Palette) -> Self {
        let boxes = results
            .iter()
            .filter_map(|(id, face)| place(id, face, face.pixel_box(), palette))
            .collect();

        Self { boxes }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

fn place<T: DetectionRecord>(
    id: usize,
    record: &T,
    rect: Option<PixelBox>,
    palette: &mut Palette,
) -> Option<OverlayBox> {
    let Some(rect) = rect else {
        warn!(
            id,
            vertices = record.vertices().len(),
            "Skipping detection without a usable bounding polygon"
        );
        return None;
    };

    Some(OverlayBox {
        id,
        rect,
        label: record.label(),
        color: palette.next_color(),
    })
}
