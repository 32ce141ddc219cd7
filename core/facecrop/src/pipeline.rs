use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageEncoder};

use crate::crop::{
    clamp_to_bounds, map_to_source_space, pad_and_center_square, Rect, ScaleFactor,
};
use crate::error::CropError;
use crate::face_detector::{select_largest, FaceDetector};
use crate::{CropMode, CroppedPhoto, RasterImage};

/// Settings shared by every crop mode.
#[derive(Debug, Clone)]
pub(crate) struct CropSettings {
    pub output_width: u32,
    pub output_height: u32,
    pub padding_scale: f64,
    pub detection_max_dimension: u32,
    pub min_selection_size: f64,
}

/// Decode input bytes into a `DynamicImage`.
pub(crate) fn decode_image(input: &[u8]) -> Result<DynamicImage, CropError> {
    let image =
        image::load_from_memory(input).map_err(|e| CropError::ImageDecodeFailed(e.to_string()))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(CropError::ZeroDimensions);
    }
    Ok(image)
}

/// Encode an image as PNG (RGBA, so transparency survives).
pub(crate) fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, CropError> {
    let rgba = image.to_rgba8();
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| CropError::EncodeFailed(e.to_string()))?;
    Ok(buffer)
}

/// Downscale so the longest side is at most `max_dimension` (never upscale)
/// and convert to grayscale for the detector.
///
/// Returns the detection image together with the source → detection factors.
pub(crate) fn detection_input(image: &DynamicImage, max_dimension: u32) -> (GrayImage, ScaleFactor) {
    let (src_w, src_h) = (image.width(), image.height());
    let longest = src_w.max(src_h);

    if max_dimension == 0 || longest <= max_dimension {
        return (
            image::imageops::grayscale(image),
            ScaleFactor { x: 1.0, y: 1.0 },
        );
    }

    let ratio = max_dimension as f64 / longest as f64;
    let det_w = ((src_w as f64 * ratio).round() as u32).max(1);
    let det_h = ((src_h as f64 * ratio).round() as u32).max(1);
    let scaled = image.resize_exact(det_w, det_h, FilterType::Triangle);

    (
        image::imageops::grayscale(&scaled),
        ScaleFactor::between(src_w as f64, src_h as f64, det_w as f64, det_h as f64),
    )
}

/// Run the detector and return the largest face in source space.
pub(crate) fn detect_face(
    image: &DynamicImage,
    detector: &dyn FaceDetector,
    max_dimension: u32,
) -> Result<Rect, CropError> {
    let (gray, scale) = detection_input(image, max_dimension);
    log::debug!(
        "running face detection on {}x{} (scale {:.3}x{:.3})",
        gray.width(),
        gray.height(),
        scale.x,
        scale.y
    );

    let detections = detector.detect(gray.as_raw(), gray.width(), gray.height());
    log::debug!("detector returned {} candidate(s)", detections.len());

    let best = select_largest(&detections)?;
    Ok(map_to_source_space(best, scale.inverse()))
}

/// Padded square around the face, clamped to the image.
pub(crate) fn face_region(face: Rect, padding_scale: f64, width: u32, height: u32) -> Rect {
    let square = pad_and_center_square(face, padding_scale);
    clamp_to_bounds(square, width as f64, height as f64)
}

/// Map a display-space drag selection onto the image's natural pixels.
///
/// Selections smaller than `min_size` on either axis are treated as no crop.
pub(crate) fn manual_region(
    selection: Rect,
    display_width: f64,
    display_height: f64,
    natural_width: u32,
    natural_height: u32,
    min_size: f64,
) -> Result<Rect, CropError> {
    if selection.width < min_size || selection.height < min_size {
        return Err(CropError::EmptyCropRegion);
    }
    if !(display_width > 0.0 && display_height > 0.0) {
        return Err(CropError::EmptyCropRegion);
    }

    let scale = ScaleFactor::between(
        display_width,
        display_height,
        natural_width as f64,
        natural_height as f64,
    );
    let source = map_to_source_space(selection, scale);
    let clamped = clamp_to_bounds(source, natural_width as f64, natural_height as f64);
    if clamped.is_empty() {
        return Err(CropError::EmptyCropRegion);
    }
    Ok(clamped)
}

/// Cut `source` out of `image` and scale it to fill
/// `output_width × output_height`, encoded as PNG.
///
/// `source` is first clamped to the image with [`clamp_to_bounds`], so a
/// rectangle hanging over the edge keeps only its on-image part.
pub fn rasterize_crop(
    image: &DynamicImage,
    source: Rect,
    output_width: u32,
    output_height: u32,
) -> Result<RasterImage, CropError> {
    if output_width == 0 || output_height == 0 {
        return Err(CropError::InvalidOutputSize(output_width, output_height));
    }
    let source = clamp_to_bounds(source, image.width() as f64, image.height() as f64);
    let region = source.to_crop_region().ok_or(CropError::EmptyCropRegion)?;

    // Rounding can still push the region one pixel past the edge.
    let cropped = image.crop_imm(region.x, region.y, region.width, region.height);
    if cropped.width() == 0 || cropped.height() == 0 {
        return Err(CropError::EmptyCropRegion);
    }

    let scaled = if (cropped.width(), cropped.height()) == (output_width, output_height) {
        cropped
    } else {
        cropped.resize_exact(output_width, output_height, FilterType::Lanczos3)
    };

    Ok(RasterImage {
        data: encode_png(&scaled)?,
        width: output_width,
        height: output_height,
    })
}

/// Full crop pipeline on an already decoded image.
pub(crate) fn crop_pipeline(
    image: &DynamicImage,
    original_size: usize,
    mode: &CropMode,
    settings: &CropSettings,
    detector: Option<&dyn FaceDetector>,
) -> Result<CroppedPhoto, CropError> {
    let (width, height) = (image.width(), image.height());

    let (source, face_bounds, output_width, output_height) = match mode {
        CropMode::None => (
            Rect::new(0.0, 0.0, width as f64, height as f64),
            None,
            width,
            height,
        ),
        CropMode::AutoFace => {
            let detector = detector.ok_or(CropError::DetectorUnavailable)?;
            let face = detect_face(image, detector, settings.detection_max_dimension)?;
            let region = face_region(face, settings.padding_scale, width, height);
            (
                region,
                Some(face),
                settings.output_width,
                settings.output_height,
            )
        }
        CropMode::ManualDrag {
            selection,
            display_width,
            display_height,
        } => {
            let region = manual_region(
                *selection,
                *display_width,
                *display_height,
                width,
                height,
                settings.min_selection_size,
            )?;
            let natural = region.to_crop_region().ok_or(CropError::EmptyCropRegion)?;
            (region, None, natural.width, natural.height)
        }
    };

    log::debug!("cropping {source:?} to {output_width}x{output_height}");
    let raster = rasterize_crop(image, source, output_width, output_height)?;

    Ok(CroppedPhoto {
        data: raster.data,
        width: raster.width,
        height: raster.height,
        source_region: source.to_crop_region(),
        face_bounds,
        original_size,
    })
}
