use std::path::Path;

use crate::crop::Rect;
use crate::error::CropError;
use crate::face_detector::{Detection, FaceDetector};

/// Tuning knobs for the SeetaFace detector.
#[derive(Debug, Clone)]
pub struct RustfaceConfig {
    /// Faces smaller than this many pixels are not reported.
    pub min_face_size: u32,
    /// Minimum classifier score for a window to count as a face.
    pub score_thresh: f64,
    /// Scale step between image pyramid levels (closer to 1 is slower).
    pub pyramid_scale_factor: f32,
    /// Sliding window step in pixels, horizontal and vertical.
    pub slide_window_step: (u32, u32),
}

impl Default for RustfaceConfig {
    fn default() -> Self {
        Self {
            min_face_size: 20,
            score_thresh: 2.0,
            pyramid_scale_factor: 0.8,
            slide_window_step: (4, 4),
        }
    }
}

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The model is loaded once on construction; the caller owns the detector
/// and hands it to every [`crate::PhotoCropper`] that needs it.
pub struct RustfaceDetector {
    model: rustface::Model,
    config: RustfaceConfig,
}

impl RustfaceDetector {
    /// Load a SeetaFace model from its serialized bytes.
    pub fn from_bytes(model_data: &[u8]) -> Result<Self, CropError> {
        let model = rustface::read_model(std::io::Cursor::new(model_data))
            .map_err(|e| CropError::DetectorInit(e.to_string()))?;
        log::debug!("loaded SeetaFace model ({} bytes)", model_data.len());
        Ok(Self {
            model,
            config: RustfaceConfig::default(),
        })
    }

    /// Load a SeetaFace model from a file such as `seeta_fd_frontal_v1.0.bin`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CropError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| CropError::DetectorInit(format!("{}: {e}", path.display())))?;
        Self::from_bytes(&data)
    }

    /// Replace the detector tuning.
    pub fn with_config(mut self, config: RustfaceConfig) -> Self {
        self.config = config;
        self
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<Detection> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.config.min_face_size);
        detector.set_score_thresh(self.config.score_thresh);
        detector.set_pyramid_scale_factor(self.config.pyramid_scale_factor);
        let (step_x, step_y) = self.config.slide_window_step;
        detector.set_slide_window_step(step_x, step_y);

        let faces = detector.detect(&rustface::ImageData::new(gray, width, height));

        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                Detection::new(
                    Rect::new(
                        bbox.x() as f64,
                        bbox.y() as f64,
                        bbox.width() as f64,
                        bbox.height() as f64,
                    ),
                    face.score(),
                )
            })
            .collect()
    }
}
