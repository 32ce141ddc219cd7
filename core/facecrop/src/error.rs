use thiserror::Error;

/// Errors returned by cropping, detection and preview operations.
#[derive(Debug, Error)]
pub enum CropError {
    /// The input bytes are not a supported image.
    #[error("failed to decode image: {0}")]
    ImageDecodeFailed(String),

    /// The decoded image has no pixels.
    #[error("image dimensions are zero")]
    ZeroDimensions,

    /// The detector found no usable face.
    #[error("no face detected")]
    NoFaceDetected,

    /// A detection was reported without a bounding box.
    #[error("detection has no bounding box")]
    MissingBoundingBox,

    /// The region to crop has no area after clamping.
    #[error("crop region is empty")]
    EmptyCropRegion,

    /// PNG encoding failed.
    #[error("failed to encode image: {0}")]
    EncodeFailed(String),

    /// Requested output width or height is zero.
    #[error("output size must be > 0, got {0}x{1}")]
    InvalidOutputSize(u32, u32),

    /// Padding multiplier is not a finite positive number.
    #[error("padding scale must be a positive number, got {0}")]
    InvalidPaddingScale(f64),

    /// `CropMode::AutoFace` was used without a face detector.
    #[error("face detection requested but no detector was provided")]
    DetectorUnavailable,

    /// The face detection model could not be loaded.
    #[error("failed to load face detection model: {0}")]
    DetectorInit(String),
}
