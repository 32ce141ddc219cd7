use facecrop_wasm::{compute_selection, crop, page_metadata, CropSession};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

fn make_test_png(width: u32, height: u32) -> Vec<u8> {
    let mut img = RgbImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ]);
    }

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buffer
}

fn get(obj: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(obj, &key.into()).unwrap()
}

fn set(obj: &js_sys::Object, key: &str, value: JsValue) {
    js_sys::Reflect::set(obj, &key.into(), &value).unwrap();
}

fn mode_options(mode: &str) -> js_sys::Object {
    let opts = js_sys::Object::new();
    set(&opts, "cropMode", mode.into());
    opts
}

#[wasm_bindgen_test]
fn plain_preview_keeps_size() {
    let png = make_test_png(200, 300);
    let result = crop(png.clone(), mode_options("none").into()).unwrap();

    assert_eq!(get(&result, "width").as_f64(), Some(200.0));
    assert_eq!(get(&result, "height").as_f64(), Some(300.0));
    assert_eq!(get(&result, "originalSize").as_f64(), Some(png.len() as f64));
    assert!(get(&result, "faceBounds").is_null());
}

#[wasm_bindgen_test]
fn manual_drag_crop() {
    let opts = mode_options("manual-drag");
    let selection = js_sys::Object::new();
    set(&selection, "x", 10.0.into());
    set(&selection, "y", 20.0.into());
    set(&selection, "width", 50.0.into());
    set(&selection, "height", 40.0.into());
    set(&opts, "selection", selection.into());
    set(&opts, "displayWidth", 100.0.into());
    set(&opts, "displayHeight", 150.0.into());

    let result = crop(make_test_png(200, 300), opts.into()).unwrap();
    assert_eq!(get(&result, "width").as_f64(), Some(100.0));
    assert_eq!(get(&result, "height").as_f64(), Some(80.0));
    let region = get(&result, "sourceRegion");
    assert_eq!(get(&region, "x").as_f64(), Some(20.0));
    assert_eq!(get(&region, "y").as_f64(), Some(40.0));
}

#[wasm_bindgen_test]
fn auto_face_without_detector_has_error_code() {
    let err = crop(make_test_png(64, 64), JsValue::UNDEFINED).unwrap_err();
    assert_eq!(
        get(&err, "code").as_string().as_deref(),
        Some("DETECTOR_UNAVAILABLE")
    );
}

#[wasm_bindgen_test]
fn invalid_input_returns_error() {
    let err = crop(b"not an image".to_vec(), mode_options("none").into()).unwrap_err();
    assert_eq!(
        get(&err, "code").as_string().as_deref(),
        Some("IMAGE_DECODE_FAILED")
    );
}

#[wasm_bindgen_test]
fn unknown_mode_is_rejected() {
    let err = crop(make_test_png(8, 8), mode_options("sideways").into()).unwrap_err();
    assert_eq!(
        get(&err, "code").as_string().as_deref(),
        Some("INVALID_OPTIONS")
    );
}

#[wasm_bindgen_test]
fn selection_is_normalized() {
    let rect = compute_selection(30.0, 40.0, 10.0, 5.0).unwrap();
    assert_eq!(get(&rect, "x").as_f64(), Some(10.0));
    assert_eq!(get(&rect, "y").as_f64(), Some(5.0));
    assert_eq!(get(&rect, "width").as_f64(), Some(20.0));
    assert_eq!(get(&rect, "height").as_f64(), Some(35.0));
}

#[wasm_bindgen_test]
fn metadata_has_title_and_tags() {
    let meta = page_metadata().unwrap();
    assert_eq!(
        get(&meta, "title").as_string().as_deref(),
        Some("Skin Analyzer")
    );
    let tags = js_sys::Array::from(&get(&meta, "meta"));
    assert!(tags.length() > 0);
    for tag in tags.iter() {
        assert!(get(&tag, "name").as_string().is_some());
        assert!(get(&tag, "content").as_string().is_some());
    }
}

#[wasm_bindgen_test]
fn session_drag_produces_crop() {
    let mut session = CropSession::new(mode_options("manual-drag").into()).unwrap();
    let ticket = session.begin();
    assert_eq!(session.status(), "loading");

    assert!(session.load(ticket, make_test_png(400, 300)));
    assert_eq!(session.status(), "ready");
    assert!(session.preview_png().is_some());

    session.set_display_size(200.0, 150.0);
    assert!(session.pointer_down(20.0, 20.0));
    assert!(!session.pointer_move(60.0, 50.0).unwrap().is_null());
    let png = session.pointer_up(Some(70.0), Some(60.0)).unwrap().unwrap();
    assert!(png.length() > 0);
    assert!(session.cropped_png().is_some());
}

#[wasm_bindgen_test]
fn session_tiny_drag_clears_crop() {
    let mut session = CropSession::new(mode_options("none").into()).unwrap();
    let ticket = session.begin();
    session.load(ticket, make_test_png(100, 100));
    session.set_display_size(100.0, 100.0);

    session.pointer_down(10.0, 10.0);
    assert!(session.pointer_up(Some(11.0), Some(11.0)).unwrap().is_none());
    assert!(session.cropped_png().is_none());
}

#[wasm_bindgen_test]
fn session_ignores_stale_load() {
    let mut session = CropSession::new(mode_options("none").into()).unwrap();
    let first = session.begin();
    let second = session.begin();

    assert!(session.load(second, make_test_png(20, 20)));
    assert!(!session.load(first, make_test_png(40, 40)));
    assert_eq!(session.status(), "ready");
}

#[wasm_bindgen_test]
fn session_failure_shows_fallback() {
    let mut session = CropSession::new(mode_options("none").into()).unwrap();
    let ticket = session.begin();
    session.load(ticket, b"garbage".to_vec());

    assert_eq!(session.status(), "failed");
    assert!(session.error_message().is_some());
    assert!(session.preview_png().is_some());
}

#[wasm_bindgen_test]
fn session_drag_maps_preview_to_photo_pixels() {
    let mut session = CropSession::new(mode_options("none").into()).unwrap();
    let ticket = session.begin();
    assert!(session.load(ticket, make_test_png(400, 300)));

    session.set_display_size(200.0, 150.0);
    session.pointer_down(20.0, 20.0);
    let png = session.pointer_up(Some(70.0), Some(60.0)).unwrap().unwrap();

    let decoded = image::load_from_memory(&png.to_vec()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (100, 80));
}

#[cfg(not(feature = "rustface"))]
#[wasm_bindgen_test]
fn default_session_allows_dragging() {
    let mut session = CropSession::new(JsValue::UNDEFINED).unwrap();
    let ticket = session.begin();
    assert!(session.load(ticket, make_test_png(120, 90)));
    assert_eq!(session.status(), "ready");

    session.set_display_size(120.0, 90.0);
    assert!(session.pointer_down(10.0, 10.0));
    assert!(session.pointer_up(Some(50.0), Some(40.0)).unwrap().is_some());
}

#[cfg(not(feature = "rustface"))]
#[wasm_bindgen_test]
fn auto_face_session_needs_detector_build() {
    let err = CropSession::new(mode_options("auto-face").into())
        .err()
        .unwrap();
    assert_eq!(
        get(&err, "code").as_string().as_deref(),
        Some("DETECTOR_UNAVAILABLE")
    );
}
