use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::CropError;
use crate::pipeline::encode_png;
use crate::RasterImage;

const FALLBACK_SIZE: u32 = 64;
const FALLBACK_FILL: Rgba<u8> = Rgba([0xf3, 0xf4, 0xf6, 0xff]);
const FALLBACK_BORDER: Rgba<u8> = Rgba([0xd1, 0xd5, 0xdb, 0xff]);

/// Render the placeholder shown when a photo cannot be previewed.
pub fn fallback_image() -> Result<RasterImage, CropError> {
    let last = FALLBACK_SIZE - 1;
    let img = RgbaImage::from_fn(FALLBACK_SIZE, FALLBACK_SIZE, |x, y| {
        if x == 0 || y == 0 || x == last || y == last {
            FALLBACK_BORDER
        } else {
            FALLBACK_FILL
        }
    });
    Ok(RasterImage {
        data: encode_png(&DynamicImage::ImageRgba8(img))?,
        width: FALLBACK_SIZE,
        height: FALLBACK_SIZE,
    })
}

/// What the preview area should show.
#[derive(Debug, Clone)]
pub enum PreviewState {
    /// Nothing chosen yet.
    Idle,
    /// A photo is being processed.
    Loading,
    /// Processing finished.
    Ready(RasterImage),
    /// Processing failed; show `fallback` and `message`.
    Failed {
        /// Human-readable reason.
        message: String,
        /// Placeholder image.
        fallback: RasterImage,
    },
}

/// Handle for one processing request. Only the newest ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
}

impl RequestTicket {
    /// Rebuild a ticket from its generation, for hosts that carry tickets
    /// across an FFI boundary as plain numbers.
    pub fn from_generation(generation: u64) -> Self {
        Self { generation }
    }

    /// Monotonically increasing request number.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The single "current preview" slot.
///
/// Every new photo takes a ticket with [`PreviewSlot::begin`]. A result that
/// arrives after a newer request was started is dropped, so a slow decode of
/// an earlier photo can never replace the preview of a later one.
#[derive(Debug, Clone)]
pub struct PreviewSlot {
    generation: u64,
    state: PreviewState,
    fallback: RasterImage,
}

impl PreviewSlot {
    /// Empty slot with the built-in placeholder.
    pub fn new() -> Result<Self, CropError> {
        Ok(Self::with_fallback(fallback_image()?))
    }

    /// Empty slot with a caller-supplied placeholder.
    pub fn with_fallback(fallback: RasterImage) -> Self {
        Self {
            generation: 0,
            state: PreviewState::Idle,
            fallback,
        }
    }

    /// Current state.
    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    /// Start a new request, invalidating every earlier ticket.
    pub fn begin(&mut self) -> RequestTicket {
        self.generation += 1;
        self.state = PreviewState::Loading;
        RequestTicket {
            generation: self.generation,
        }
    }

    /// `true` if `ticket` belongs to the newest request.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Store the outcome of `ticket`'s request.
    ///
    /// Returns `false` and leaves the slot untouched when the ticket is stale.
    pub fn complete<T>(&mut self, ticket: RequestTicket, result: Result<T, CropError>) -> bool
    where
        T: Into<RasterImage>,
    {
        if !self.is_current(ticket) {
            log::debug!(
                "discarding stale preview result {} (current {})",
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.state = match result {
            Ok(image) => PreviewState::Ready(image.into()),
            Err(e) => {
                log::warn!("preview failed: {e}");
                PreviewState::Failed {
                    message: e.to_string(),
                    fallback: self.fallback.clone(),
                }
            }
        };
        true
    }

    /// Clear the preview and invalidate outstanding tickets.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = PreviewState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(width: u32) -> RasterImage {
        RasterImage {
            data: vec![1, 2, 3],
            width,
            height: 1,
        }
    }

    #[test]
    fn fallback_is_a_png() {
        let fallback = fallback_image().unwrap();
        let decoded = image::load_from_memory(&fallback.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }

    #[test]
    fn begin_moves_to_loading() {
        let mut slot = PreviewSlot::with_fallback(raster(1));
        assert!(matches!(slot.state(), PreviewState::Idle));
        slot.begin();
        assert!(matches!(slot.state(), PreviewState::Loading));
    }

    #[test]
    fn current_result_is_applied() {
        let mut slot = PreviewSlot::with_fallback(raster(1));
        let ticket = slot.begin();
        assert!(slot.complete(ticket, Ok(raster(7))));
        assert!(matches!(slot.state(), PreviewState::Ready(img) if img.width == 7));
    }

    #[test]
    fn stale_result_is_discarded() {
        let mut slot = PreviewSlot::with_fallback(raster(1));
        let first = slot.begin();
        let second = slot.begin();

        assert!(slot.complete(second, Ok(raster(2))));
        assert!(!slot.complete(first, Ok(raster(1))));
        assert!(matches!(slot.state(), PreviewState::Ready(img) if img.width == 2));
    }

    #[test]
    fn stale_result_does_not_end_loading() {
        let mut slot = PreviewSlot::with_fallback(raster(1));
        let first = slot.begin();
        let _second = slot.begin();
        assert!(!slot.complete::<RasterImage>(first, Err(CropError::NoFaceDetected)));
        assert!(matches!(slot.state(), PreviewState::Loading));
    }

    #[test]
    fn failure_shows_fallback_and_message() {
        let mut slot = PreviewSlot::with_fallback(raster(64));
        let ticket = slot.begin();
        slot.complete::<RasterImage>(ticket, Err(CropError::NoFaceDetected));
        match slot.state() {
            PreviewState::Failed { message, fallback } => {
                assert_eq!(message, "no face detected");
                assert_eq!(fallback.width, 64);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn reset_invalidates_tickets() {
        let mut slot = PreviewSlot::with_fallback(raster(1));
        let ticket = slot.begin();
        slot.reset();
        assert!(!slot.complete(ticket, Ok(raster(5))));
        assert!(matches!(slot.state(), PreviewState::Idle));
    }

    #[test]
    fn ticket_survives_round_trip_as_number() {
        let mut slot = PreviewSlot::with_fallback(raster(1));
        let ticket = slot.begin();
        let rebuilt = RequestTicket::from_generation(ticket.generation());
        assert!(slot.is_current(rebuilt));
    }
}
