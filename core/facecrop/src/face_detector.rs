use crate::crop::Rect;
use crate::error::CropError;

/// A single candidate region reported by a face detector.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding box in the coordinate space of the image the detector saw.
    /// Some backends report candidates without one; those are never cropped.
    pub bounds: Option<Rect>,
    /// Detection confidence score.
    pub score: f64,
}

impl Detection {
    /// A candidate with a bounding box.
    pub fn new(bounds: Rect, score: f64) -> Self {
        Self {
            bounds: Some(bounds),
            score,
        }
    }

    /// The bounding box, or [`CropError::MissingBoundingBox`].
    pub fn bounds(&self) -> Result<Rect, CropError> {
        self.bounds.ok_or(CropError::MissingBoundingBox)
    }
}

/// Pluggable face detection backend.
///
/// Implement this trait to provide a custom face detector and pass it to
/// [`crate::PhotoCropper::face_detector`]. A detector is built once by the
/// caller and shared between crops.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` × `height` bytes.
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<Detection>;
}

/// Pick the candidate with the largest bounding-box area.
///
/// Candidates without a bounding box are skipped. Ties go to the first one
/// reported.
pub fn select_largest(detections: &[Detection]) -> Result<Rect, CropError> {
    let mut best: Option<Rect> = None;

    for (index, detection) in detections.iter().enumerate() {
        let bounds = match detection.bounds() {
            Ok(bounds) => bounds,
            Err(e) => {
                log::warn!("skipping detection {index} (score {:.2}): {e}", detection.score);
                continue;
            }
        };
        if best.map_or(true, |current| bounds.area() > current.area()) {
            best = Some(bounds);
        }
    }

    best.ok_or(CropError::NoFaceDetected)
}
