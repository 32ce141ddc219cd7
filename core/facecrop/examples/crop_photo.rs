//! Crop a photo around the largest detected face and write it as PNG.
//!
//! Usage:
//!   cargo run --example crop_photo --features rustface -- \
//!     model/seeta_fd_frontal_v1.0.bin input.jpg output.png [padding]
//!
//! Set `RUST_LOG=debug` to see the detection and crop geometry.

use std::process::ExitCode;
use std::sync::Arc;

use facecrop::{CropMode, PhotoCropper, RustfaceDetector};

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!("usage: crop_photo <model.bin> <input> <output.png> [padding]");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let detector = Arc::new(RustfaceDetector::from_path(&args[0])?);
    let input = std::fs::read(&args[1])?;

    let mut cropper = PhotoCropper::new(input)?
        .crop_mode(CropMode::AutoFace)
        .face_detector(detector);
    if let Some(padding) = args.get(3) {
        cropper = cropper.padding_scale(padding.parse()?);
    }

    let result = cropper.crop()?;
    if let (Some(face), Some(region)) = (result.face_bounds, result.source_region) {
        println!(
            "face ({}, {}, {}x{}) -> crop ({}, {}, {}x{})",
            face.x, face.y, face.width, face.height, region.x, region.y, region.width, region.height
        );
    }
    std::fs::write(&args[2], &result.data)?;
    println!("wrote {}x{} PNG to {}", result.width, result.height, args[2]);
    Ok(())
}
