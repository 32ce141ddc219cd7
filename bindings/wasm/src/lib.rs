use std::sync::Arc;

use facecrop::metadata::{HeadSink, PageMetadata};
use facecrop::{
    CropError, CropMode, CropRegion, CroppedPhoto, FaceDetector, PhotoCropper, Point,
    PreviewSlot, PreviewState, RasterImage, Rect, RequestTicket, SelectionOutcome,
    SelectionSession,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

/// A rectangle as passed from JavaScript.
#[derive(Deserialize, Clone, Copy)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Options for cropping, passed as a JavaScript object.
///
/// All fields are optional. `selection`, `displayWidth` and `displayHeight`
/// are required when `cropMode` is `"manual-drag"`.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CropOptions {
    pub crop_mode: Option<String>,
    pub output_width: Option<u32>,
    pub output_height: Option<u32>,
    pub padding_scale: Option<f64>,
    pub detection_max_dimension: Option<u32>,
    pub min_selection_size: Option<f64>,
    pub selection: Option<SelectionRect>,
    pub display_width: Option<f64>,
    pub display_height: Option<f64>,
}

fn string_to_crop_mode(mode: &str, opts: &CropOptions) -> Result<CropMode, JsValue> {
    match mode {
        "auto-face" => Ok(CropMode::AutoFace),
        "none" => Ok(CropMode::None),
        "manual-drag" => match (opts.selection, opts.display_width, opts.display_height) {
            (Some(s), Some(display_width), Some(display_height)) => Ok(CropMode::ManualDrag {
                selection: Rect::new(s.x, s.y, s.width, s.height),
                display_width,
                display_height,
            }),
            _ => Err(make_error(
                "INVALID_OPTIONS",
                "manual-drag needs selection, displayWidth and displayHeight",
            )),
        },
        _ => Err(make_error(
            "INVALID_OPTIONS",
            &format!("unknown crop mode: {mode}"),
        )),
    }
}

fn options_crop_mode(opts: &CropOptions) -> Result<CropMode, JsValue> {
    string_to_crop_mode(opts.crop_mode.as_deref().unwrap_or("auto-face"), opts)
}

/// Create a JS `Error` with a `code` property.
fn make_error(code: &str, message: &str) -> JsValue {
    let err = js_sys::Error::new(message);
    // Setting a property on a fresh Error object cannot throw.
    let _ = js_sys::Reflect::set(&err, &"code".into(), &JsValue::from_str(code));
    JsValue::from(err)
}

fn error_code(e: &CropError) -> &'static str {
    match e {
        CropError::ImageDecodeFailed(_) => "IMAGE_DECODE_FAILED",
        CropError::ZeroDimensions => "ZERO_DIMENSIONS",
        CropError::NoFaceDetected => "NO_FACE_DETECTED",
        CropError::MissingBoundingBox => "MISSING_BOUNDING_BOX",
        CropError::EmptyCropRegion => "EMPTY_CROP_REGION",
        CropError::EncodeFailed(_) => "ENCODE_FAILED",
        CropError::InvalidOutputSize(..) => "INVALID_OUTPUT_SIZE",
        CropError::InvalidPaddingScale(_) => "INVALID_PADDING_SCALE",
        CropError::DetectorUnavailable => "DETECTOR_UNAVAILABLE",
        CropError::DetectorInit(_) => "DETECTOR_INIT_FAILED",
    }
}

/// Convert a `CropError` into a JS `Error` with a machine-readable `code` property.
fn to_js_error(e: CropError) -> JsValue {
    make_error(error_code(&e), &e.to_string())
}

fn parse_options(options: JsValue) -> Result<CropOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(CropOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| make_error("INVALID_OPTIONS", &format!("invalid options: {e}")))
    }
}

/// Apply the numeric settings of `opts` to a cropper. The crop mode is
/// handled separately since a session picks it per gesture.
fn apply_settings(mut cropper: PhotoCropper, opts: &CropOptions) -> PhotoCropper {
    let (width, height) = (
        opts.output_width.unwrap_or(facecrop::DEFAULT_OUTPUT_SIZE),
        opts.output_height.unwrap_or(facecrop::DEFAULT_OUTPUT_SIZE),
    );
    cropper = cropper.output_size(width, height);
    if let Some(scale) = opts.padding_scale {
        cropper = cropper.padding_scale(scale);
    }
    if let Some(dim) = opts.detection_max_dimension {
        cropper = cropper.detection_max_dimension(dim);
    }
    if let Some(size) = opts.min_selection_size {
        cropper = cropper.min_selection_size(size);
    }
    cropper
}

fn rect_to_js(rect: Rect) -> Result<JsValue, JsValue> {
    let obj = js_sys::Object::new();
    js_sys::Reflect::set(&obj, &"x".into(), &JsValue::from(rect.x))?;
    js_sys::Reflect::set(&obj, &"y".into(), &JsValue::from(rect.y))?;
    js_sys::Reflect::set(&obj, &"width".into(), &JsValue::from(rect.width))?;
    js_sys::Reflect::set(&obj, &"height".into(), &JsValue::from(rect.height))?;
    Ok(JsValue::from(obj))
}

/// Build a plain JS object from a `CroppedPhoto`.
fn build_photo_object(photo: &CroppedPhoto) -> Result<JsValue, JsValue> {
    let obj = js_sys::Object::new();
    let data = js_sys::Uint8Array::from(&photo.data[..]);
    js_sys::Reflect::set(&obj, &"data".into(), &data)?;
    js_sys::Reflect::set(&obj, &"width".into(), &JsValue::from(photo.width))?;
    js_sys::Reflect::set(&obj, &"height".into(), &JsValue::from(photo.height))?;
    js_sys::Reflect::set(
        &obj,
        &"originalSize".into(),
        &JsValue::from(photo.original_size as u32),
    )?;

    let region = match photo.source_region {
        Some(r) => rect_to_js(Rect::new(
            r.x as f64,
            r.y as f64,
            r.width as f64,
            r.height as f64,
        ))?,
        None => JsValue::NULL,
    };
    js_sys::Reflect::set(&obj, &"sourceRegion".into(), &region)?;

    let face = match photo.face_bounds {
        Some(bounds) => rect_to_js(bounds)?,
        None => JsValue::NULL,
    };
    js_sys::Reflect::set(&obj, &"faceBounds".into(), &face)?;

    Ok(JsValue::from(obj))
}

fn crop_with_detector(
    input: Vec<u8>,
    options: JsValue,
    detector: Option<Arc<dyn FaceDetector>>,
) -> Result<JsValue, JsValue> {
    let opts = parse_options(options)?;
    let mode = options_crop_mode(&opts)?;

    let mut cropper = PhotoCropper::new(input).map_err(to_js_error)?;
    cropper = apply_settings(cropper, &opts).crop_mode(mode);
    if let Some(detector) = detector {
        cropper = cropper.face_detector(detector);
    }

    let result = cropper.crop().map_err(to_js_error)?;
    build_photo_object(&result)
}

/// Crop a photo with the given options.
///
/// Without a detector only `"none"` and `"manual-drag"` succeed; use
/// `FaceCropper` for `"auto-face"`.
///
/// @param input - Raw image bytes (JPEG or PNG)
/// @param options - Optional object with fields: cropMode, outputWidth,
///   outputHeight, paddingScale, detectionMaxDimension, minSelectionSize,
///   selection, displayWidth, displayHeight
#[wasm_bindgen]
pub fn crop(input: Vec<u8>, options: JsValue) -> Result<JsValue, JsValue> {
    crop_with_detector(input, options, None)
}

/// Rectangle spanned by a drag from `(startX, startY)` to `(x, y)`.
#[wasm_bindgen(js_name = "computeSelection")]
pub fn compute_selection(start_x: f64, start_y: f64, x: f64, y: f64) -> Result<JsValue, JsValue> {
    rect_to_js(facecrop::compute_selection(
        Point::new(start_x, start_y),
        Point::new(x, y),
    ))
}

/// Collects head metadata into a JS object `{ title, meta: [{ name, content }] }`.
///
/// `HeadSink` cannot fail, so the first `Reflect::set` error is kept and
/// returned by `finish`.
struct JsHead {
    obj: js_sys::Object,
    meta: js_sys::Array,
    error: Option<JsValue>,
}

impl JsHead {
    fn new() -> Self {
        Self {
            obj: js_sys::Object::new(),
            meta: js_sys::Array::new(),
            error: None,
        }
    }

    fn set(&mut self, target: &JsValue, key: &str, value: &str) {
        if let Err(e) = js_sys::Reflect::set(target, &key.into(), &JsValue::from_str(value)) {
            self.error.get_or_insert(e);
        }
    }

    fn finish(self) -> Result<JsValue, JsValue> {
        if let Some(e) = self.error {
            return Err(e);
        }
        js_sys::Reflect::set(&self.obj, &"meta".into(), &self.meta)?;
        Ok(JsValue::from(self.obj))
    }
}

impl HeadSink for JsHead {
    fn set_title(&mut self, title: &str) {
        let obj = JsValue::from(self.obj.clone());
        self.set(&obj, "title", title);
    }

    fn set_meta(&mut self, name: &str, content: &str) {
        let tag = JsValue::from(js_sys::Object::new());
        self.set(&tag, "name", name);
        self.set(&tag, "content", content);
        self.meta.push(&tag);
    }
}

/// Static page metadata for the host page to write into `<head>` at startup.
#[wasm_bindgen(js_name = "pageMetadata")]
pub fn page_metadata() -> Result<JsValue, JsValue> {
    let mut head = JsHead::new();
    PageMetadata::new().apply_once(&mut head);
    head.finish()
}

/// Face detector loaded once from SeetaFace model bytes and reused for
/// every photo.
#[cfg(feature = "rustface")]
#[wasm_bindgen]
pub struct FaceCropper {
    detector: Arc<dyn FaceDetector>,
}

#[cfg(feature = "rustface")]
#[wasm_bindgen]
impl FaceCropper {
    /// @param model - Bytes of `seeta_fd_frontal_v1.0.bin`
    #[wasm_bindgen(constructor)]
    pub fn new(model: &[u8]) -> Result<FaceCropper, JsValue> {
        let detector = facecrop::RustfaceDetector::from_bytes(model).map_err(to_js_error)?;
        Ok(FaceCropper {
            detector: Arc::new(detector),
        })
    }

    /// Same as the free `crop` function, with this detector available.
    pub fn crop(&self, input: Vec<u8>, options: JsValue) -> Result<JsValue, JsValue> {
        crop_with_detector(input, options, Some(self.detector.clone()))
    }
}

/// Preview mode of a `CropSession` created without `cropMode`. Face
/// previews need a detector, which only the `rustface` build can load.
#[cfg(feature = "rustface")]
const DEFAULT_SESSION_MODE: &str = "auto-face";
#[cfg(not(feature = "rustface"))]
const DEFAULT_SESSION_MODE: &str = "manual-drag";

/// State behind the photo picker: the current preview and the drag
/// selection over it.
///
/// Call `begin()` when a file is chosen and `load(ticket, bytes)` once it has
/// been read. A `load` for an older ticket is ignored.
#[wasm_bindgen]
pub struct CropSession {
    preview: PreviewSlot,
    selection: SelectionSession,
    options: CropOptions,
    auto_face: bool,
    photo: Option<PhotoCropper>,
    /// Part of `photo` shown in the preview; drags are mapped through it.
    preview_region: Option<CropRegion>,
    cropped: Option<RasterImage>,
    detector: Option<Arc<dyn FaceDetector>>,
}

#[wasm_bindgen]
impl CropSession {
    /// @param options - Same object as for `crop`; `cropMode` chooses
    ///   whether the preview is a face crop (`"auto-face"`) or the whole photo.
    ///   Defaults to `"auto-face"` in builds with face detection and to
    ///   `"manual-drag"` otherwise, where `"auto-face"` is rejected.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<CropSession, JsValue> {
        let options = parse_options(options)?;
        let auto_face = match options.crop_mode.as_deref().unwrap_or(DEFAULT_SESSION_MODE) {
            "auto-face" if cfg!(feature = "rustface") => true,
            "auto-face" => return Err(to_js_error(CropError::DetectorUnavailable)),
            "manual-drag" | "none" => false,
            other => {
                return Err(make_error(
                    "INVALID_OPTIONS",
                    &format!("unknown crop mode: {other}"),
                ))
            }
        };
        let mut selection = SelectionSession::new(0.0, 0.0);
        if let Some(size) = options.min_selection_size {
            selection = selection.with_min_size(size);
        }

        Ok(CropSession {
            preview: PreviewSlot::new().map_err(to_js_error)?,
            selection,
            options,
            auto_face,
            photo: None,
            preview_region: None,
            cropped: None,
            detector: None,
        })
    }

    /// Load the SeetaFace model used for `"auto-face"` previews.
    #[cfg(feature = "rustface")]
    #[wasm_bindgen(js_name = "setFaceModel")]
    pub fn set_face_model(&mut self, model: &[u8]) -> Result<(), JsValue> {
        let detector = facecrop::RustfaceDetector::from_bytes(model).map_err(to_js_error)?;
        self.detector = Some(Arc::new(detector));
        Ok(())
    }

    /// A new file was chosen. Returns the ticket to pass to `load`.
    pub fn begin(&mut self) -> f64 {
        self.photo = None;
        self.preview_region = None;
        self.cropped = None;
        self.selection.reset();
        self.preview.begin().generation() as f64
    }

    /// Process the bytes read for `ticket`. Returns `false` if a newer file
    /// was chosen in the meantime.
    pub fn load(&mut self, ticket: f64, input: Vec<u8>) -> bool {
        let ticket = RequestTicket::from_generation(ticket as u64);
        if !self.preview.is_current(ticket) {
            return false;
        }

        let result = PhotoCropper::new(input).and_then(|cropper| {
            let mut cropper = apply_settings(cropper, &self.options);
            if let Some(detector) = &self.detector {
                cropper = cropper.face_detector(detector.clone());
            }
            let mode = if self.auto_face {
                CropMode::AutoFace
            } else {
                CropMode::None
            };
            let preview = cropper.crop_with(&mode)?;
            Ok((cropper, preview))
        });

        match result {
            Ok((cropper, preview)) => {
                self.photo = Some(cropper);
                self.preview_region = preview.source_region;
                self.preview.complete(ticket, Ok::<_, CropError>(preview))
            }
            Err(e) => self.preview.complete::<RasterImage>(ticket, Err(e)),
        }
    }

    /// Reading the file for `ticket` failed on the JS side.
    pub fn fail(&mut self, ticket: f64, message: String) -> bool {
        let ticket = RequestTicket::from_generation(ticket as u64);
        self.preview
            .complete::<RasterImage>(ticket, Err(CropError::ImageDecodeFailed(message)))
    }

    /// `"idle"`, `"loading"`, `"ready"` or `"failed"`.
    pub fn status(&self) -> String {
        match self.preview.state() {
            PreviewState::Idle => "idle",
            PreviewState::Loading => "loading",
            PreviewState::Ready(_) => "ready",
            PreviewState::Failed { .. } => "failed",
        }
        .to_string()
    }

    /// PNG to show in the preview area: the photo, or the fallback image
    /// after a failure.
    #[wasm_bindgen(js_name = "previewPng")]
    pub fn preview_png(&self) -> Option<js_sys::Uint8Array> {
        match self.preview.state() {
            PreviewState::Ready(image) | PreviewState::Failed { fallback: image, .. } => {
                Some(js_sys::Uint8Array::from(&image.data[..]))
            }
            PreviewState::Idle | PreviewState::Loading => None,
        }
    }

    /// Message to show after a failure.
    #[wasm_bindgen(js_name = "errorMessage")]
    pub fn error_message(&self) -> Option<String> {
        match self.preview.state() {
            PreviewState::Failed { message, .. } => Some(message.clone()),
            _ => None,
        }
    }

    /// Size the photo is laid out at, in CSS pixels.
    #[wasm_bindgen(js_name = "setDisplaySize")]
    pub fn set_display_size(&mut self, width: f64, height: f64) {
        self.selection.set_display_size(width, height);
    }

    /// Returns `true` if a drag started.
    #[wasm_bindgen(js_name = "pointerDown")]
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        if self.photo.is_none() {
            return false;
        }
        let started = self.selection.pointer_down(Point::new(x, y));
        if started {
            self.cropped = None;
        }
        started
    }

    /// Returns the updated selection rectangle, or `null` outside a drag.
    #[wasm_bindgen(js_name = "pointerMove")]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        match self.selection.pointer_move(Point::new(x, y)) {
            Some(rect) => rect_to_js(rect),
            None => Ok(JsValue::NULL),
        }
    }

    /// Finish the drag (pointer up, cancel or leave). Pass `undefined` for
    /// both coordinates when the event had no usable position.
    ///
    /// Returns the cropped PNG, or `undefined` when the selection was too
    /// small or no drag was in progress.
    #[wasm_bindgen(js_name = "pointerUp")]
    pub fn pointer_up(
        &mut self,
        x: Option<f64>,
        y: Option<f64>,
    ) -> Result<Option<js_sys::Uint8Array>, JsValue> {
        let point = x.zip(y).map(|(x, y)| Point::new(x, y));
        let Some(outcome) = self.selection.pointer_up(point) else {
            return Ok(None);
        };
        let (Some(photo), SelectionOutcome::Crop(selection)) = (&self.photo, outcome) else {
            self.cropped = None;
            return Ok(None);
        };

        let (display_width, display_height) = self.selection.display_size();
        let mode = match self.preview_region {
            Some(region) => CropMode::drag_over_region(
                selection,
                display_width,
                display_height,
                region,
                photo.width(),
                photo.height(),
            ),
            None => CropMode::ManualDrag {
                selection,
                display_width,
                display_height,
            },
        };
        match photo.crop_with(&mode) {
            Ok(cropped) => {
                let png = js_sys::Uint8Array::from(&cropped.data[..]);
                self.cropped = Some(cropped.into());
                Ok(Some(png))
            }
            Err(CropError::EmptyCropRegion) => {
                self.cropped = None;
                Ok(None)
            }
            Err(e) => Err(to_js_error(e)),
        }
    }

    /// Selection rectangle to draw, or `null`.
    pub fn selection(&self) -> Result<JsValue, JsValue> {
        match self.selection.selection() {
            Some(rect) => rect_to_js(rect),
            None => Ok(JsValue::NULL),
        }
    }

    /// Most recent manual crop, if any.
    #[wasm_bindgen(js_name = "croppedPng")]
    pub fn cropped_png(&self) -> Option<js_sys::Uint8Array> {
        self.cropped
            .as_ref()
            .map(|image| js_sys::Uint8Array::from(&image.data[..]))
    }

    /// Forget the photo, preview and selection.
    pub fn reset(&mut self) {
        self.photo = None;
        self.preview_region = None;
        self.cropped = None;
        self.selection.reset();
        self.preview.reset();
    }
}
