//! Object detector interface.
//!
//! Inference backends live outside this crate; they plug in through
//! [`InferenceProvider`]. A failing backend must yield an empty detection
//! list rather than an error.

use std::path::Path;

use crate::annotation::BoundingBox;
use crate::model::ClassNames;

/// A single detector output in normalized center/size form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub class_id: u32,
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

impl From<Detection> for BoundingBox {
    fn from(d: Detection) -> Self {
        BoundingBox::new(d.class_id, d.center_x, d.center_y, d.width, d.height)
            .with_confidence(d.confidence)
    }
}

/// A detection model that can be run on an image file.
pub trait InferenceProvider {
    /// Whether a model is loaded and [`InferenceProvider::run`] can produce output.
    fn is_loaded(&self) -> bool;

    /// Short model name for display, e.g. the weights file name.
    fn name(&self) -> String;

    /// Class names embedded in the model, if any.
    fn class_names(&self) -> ClassNames {
        ClassNames::new()
    }

    /// Detect objects with confidence at or above `confidence_threshold`.
    fn run(&self, image_path: &Path, confidence_threshold: f32) -> Vec<Detection>;
}

/// Provider used when no model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModel;

impl InferenceProvider for NoModel {
    fn is_loaded(&self) -> bool {
        false
    }

    fn name(&self) -> String {
        "Not loaded".to_string()
    }

    fn run(&self, _image_path: &Path, _confidence_threshold: f32) -> Vec<Detection> {
        Vec::new()
    }
}

/// Run a provider and convert its output into boxes.
pub fn detect_boxes(
    provider: &dyn InferenceProvider,
    image_path: &Path,
    confidence_threshold: f32,
) -> Vec<BoundingBox> {
    if !provider.is_loaded() {
        return Vec::new();
    }
    let detections = provider.run(image_path, confidence_threshold);
    log::info!(
        "{} detected {} objects in {:?}",
        provider.name(),
        detections.len(),
        image_path
    );
    detections.into_iter().map(BoundingBox::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedModel(Vec<Detection>);

    impl InferenceProvider for FixedModel {
        fn is_loaded(&self) -> bool {
            true
        }

        fn name(&self) -> String {
            "fixed".to_string()
        }

        fn run(&self, _image_path: &Path, threshold: f32) -> Vec<Detection> {
            self.0
                .iter()
                .filter(|d| d.confidence >= threshold)
                .copied()
                .collect()
        }
    }

    fn detection(confidence: f32) -> Detection {
        Detection {
            class_id: 3,
            center_x: 0.5,
            center_y: 0.4,
            width: 0.2,
            height: 0.1,
            confidence,
        }
    }

    #[test]
    fn test_no_model_yields_nothing() {
        assert!(detect_boxes(&NoModel, Path::new("a.jpg"), 0.0).is_empty());
        assert_eq!(NoModel.name(), "Not loaded");
    }

    #[test]
    fn test_detections_become_boxes() {
        let model = FixedModel(vec![detection(0.9), detection(0.1)]);
        let boxes = detect_boxes(&model, Path::new("a.jpg"), 0.25);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].class_id, 3);
        assert_eq!(boxes[0].confidence, 0.9);
        assert_eq!(boxes[0].rect.width, 0.2);
    }
}
