//! Photo cropping for the Skin Analyzer front end: crop around a detected
//! face, crop a hand-dragged rectangle, or pass the photo through as a plain
//! preview.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use facecrop::{CropMode, FaceDetector, Detection, PhotoCropper};
//!
//! struct MyDetector;
//! impl FaceDetector for MyDetector {
//!     fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<Detection> {
//!         vec![]
//!     }
//! }
//!
//! let raw_bytes = std::fs::read("photo.jpg").unwrap();
//! let result = PhotoCropper::new(raw_bytes)
//!     .unwrap()
//!     .crop_mode(CropMode::AutoFace)
//!     .face_detector(Arc::new(MyDetector))
//!     .crop()
//!     .unwrap();
//! println!("Cropped: {}x{} PNG", result.width, result.height);
//! ```
#![warn(missing_docs)]

mod crop;
mod error;
/// Face detection traits and data types.
pub mod face_detector;
/// Static document head metadata.
pub mod metadata;
mod pipeline;
/// Current-preview slot with stale-result protection.
pub mod preview;
#[cfg(feature = "rustface")]
/// Built-in SeetaFace-based face detector backend.
pub mod rustface_backend;
/// Drag-to-select state machine.
pub mod selection;

use std::sync::Arc;

use image::DynamicImage;

/// Geometry shared by every crop mode.
pub use crop::{
    clamp_to_bounds, compute_selection, map_to_source_space, pad_and_center_square, CropRegion,
    Point, Rect, ScaleFactor,
};
/// Error type returned by facecrop operations.
pub use error::CropError;
/// Face detection trait and candidate type.
pub use face_detector::{select_largest, Detection, FaceDetector};
/// Rasterize a source rectangle into a fixed-size PNG.
pub use pipeline::rasterize_crop;
pub use preview::{PreviewSlot, PreviewState, RequestTicket};
#[cfg(feature = "rustface")]
/// Built-in detector that loads a SeetaFace model.
pub use rustface_backend::{RustfaceConfig, RustfaceDetector};
pub use selection::{SelectionOutcome, SelectionSession, SelectionState};

use pipeline::CropSettings;

/// How to choose the region of the photo to keep.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CropMode {
    /// Detect the largest face and crop a padded square around it.
    #[default]
    AutoFace,

    /// Crop a rectangle the user dragged over the displayed photo.
    ManualDrag {
        /// Selection in display space.
        selection: Rect,
        /// Width the photo was displayed at.
        display_width: f64,
        /// Height the photo was displayed at.
        display_height: f64,
    },

    /// No crop: the whole photo as a plain preview.
    None,
}

impl CropMode {
    /// Drag over a displayed crop of the photo instead of the whole photo.
    ///
    /// `region` is the part of the photo shown at
    /// `display_width × display_height` (e.g. the `source_region` of a face
    /// crop preview). The selection is offset and scaled through it so the
    /// resulting `ManualDrag` lands on the same pixels of the full
    /// `natural_width × natural_height` photo.
    pub fn drag_over_region(
        selection: Rect,
        display_width: f64,
        display_height: f64,
        region: CropRegion,
        natural_width: u32,
        natural_height: u32,
    ) -> CropMode {
        let scale = ScaleFactor::between(
            region.width as f64,
            region.height as f64,
            display_width,
            display_height,
        );
        CropMode::ManualDrag {
            selection: Rect::new(
                selection.x + region.x as f64 * scale.x,
                selection.y + region.y as f64 * scale.y,
                selection.width,
                selection.height,
            ),
            display_width: natural_width as f64 * scale.x,
            display_height: natural_height as f64 * scale.y,
        }
    }
}

/// An encoded PNG image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// PNG bytes.
    pub data: Vec<u8>,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

/// Result of a single crop operation.
#[derive(Debug, Clone)]
pub struct CroppedPhoto {
    /// The cropped image as PNG bytes.
    pub data: Vec<u8>,

    /// Width of the output image in pixels.
    pub width: u32,

    /// Height of the output image in pixels.
    pub height: u32,

    /// Region of the original photo that was kept.
    pub source_region: Option<CropRegion>,

    /// Bounding box of the detected face in original photo coordinates, if any.
    pub face_bounds: Option<Rect>,

    /// Size of the original input in bytes.
    pub original_size: usize,
}

impl From<CroppedPhoto> for RasterImage {
    fn from(photo: CroppedPhoto) -> Self {
        RasterImage {
            data: photo.data,
            width: photo.width,
            height: photo.height,
        }
    }
}

/// Default side of the face crop output.
pub const DEFAULT_OUTPUT_SIZE: u32 = 256;

/// Default padding around a detected face (side = max(w, h) × 1.4).
pub const DEFAULT_PADDING_SCALE: f64 = 1.4;

/// Longest side of the image handed to the face detector.
pub const DEFAULT_DETECTION_MAX_DIMENSION: u32 = 320;

/// Builder for cropping a photo.
///
/// Decodes the input image on construction, then crops it according to the
/// configured [`CropMode`]. The same cropper can be cropped repeatedly, e.g.
/// once per drag gesture.
pub struct PhotoCropper {
    image: DynamicImage,
    original_size: usize,
    crop_mode: CropMode,
    output_width: u32,
    output_height: u32,
    padding_scale: f64,
    detection_max_dimension: u32,
    min_selection_size: f64,
    /// Injected by the caller; there is no implicit global detector.
    detector: Option<Arc<dyn FaceDetector>>,
}

impl PhotoCropper {
    /// Create a new cropper from raw image bytes (JPEG or PNG).
    pub fn new(input: Vec<u8>) -> Result<Self, CropError> {
        let image = pipeline::decode_image(&input)?;
        log::debug!(
            "decoded {}x{} photo ({} bytes)",
            image.width(),
            image.height(),
            input.len()
        );

        Ok(Self {
            image,
            original_size: input.len(),
            crop_mode: CropMode::default(),
            output_width: DEFAULT_OUTPUT_SIZE,
            output_height: DEFAULT_OUTPUT_SIZE,
            padding_scale: DEFAULT_PADDING_SCALE,
            detection_max_dimension: DEFAULT_DETECTION_MAX_DIMENSION,
            min_selection_size: selection::DEFAULT_MIN_SELECTION_SIZE,
            detector: None,
        })
    }

    /// Natural width of the decoded photo.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Natural height of the decoded photo.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Set the crop mode (default: `CropMode::AutoFace`).
    pub fn crop_mode(mut self, mode: CropMode) -> Self {
        self.crop_mode = mode;
        self
    }

    /// Set the face crop output size in pixels (default: 256×256).
    ///
    /// Manual crops keep their natural size and plain previews keep the
    /// photo's size; this only applies to `CropMode::AutoFace`.
    pub fn output_size(mut self, width: u32, height: u32) -> Self {
        self.output_width = width;
        self.output_height = height;
        self
    }

    /// Set the padding multiplier around a detected face (default: 1.4).
    pub fn padding_scale(mut self, scale: f64) -> Self {
        self.padding_scale = scale;
        self
    }

    /// Set the longest side of the downscaled detection image (default: 320).
    /// Larger values find smaller faces at the cost of speed.
    pub fn detection_max_dimension(mut self, dimension: u32) -> Self {
        self.detection_max_dimension = dimension;
        self
    }

    /// Set the minimum drag selection size in display pixels (default: 2).
    pub fn min_selection_size(mut self, size: f64) -> Self {
        self.min_selection_size = size;
        self
    }

    /// Provide the face detector used by `CropMode::AutoFace`.
    ///
    /// Build the detector once and share the `Arc` between croppers.
    pub fn face_detector(mut self, detector: Arc<dyn FaceDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Crop the photo with the configured settings.
    pub fn crop(&self) -> Result<CroppedPhoto, CropError> {
        self.crop_with(&self.crop_mode)
    }

    /// Crop the photo with `mode` instead of the configured one.
    pub fn crop_with(&self, mode: &CropMode) -> Result<CroppedPhoto, CropError> {
        if self.output_width == 0 || self.output_height == 0 {
            return Err(CropError::InvalidOutputSize(
                self.output_width,
                self.output_height,
            ));
        }
        if !(self.padding_scale.is_finite() && self.padding_scale > 0.0) {
            return Err(CropError::InvalidPaddingScale(self.padding_scale));
        }

        let settings = CropSettings {
            output_width: self.output_width,
            output_height: self.output_height,
            padding_scale: self.padding_scale,
            detection_max_dimension: self.detection_max_dimension,
            min_selection_size: self.min_selection_size,
        };

        pipeline::crop_pipeline(
            &self.image,
            self.original_size,
            mode,
            &settings,
            self.detector.as_deref(),
        )
    }
}
