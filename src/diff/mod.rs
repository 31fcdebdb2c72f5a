//! Pending-diff state machine: accumulates pre-images of buffer mutations and
//! emits a compact, self-contained [`patch::PackedDiffs`] for undo/redo.

pub mod patch;

use crate::buffer::BoundBox;
use crate::codec::ImageCodec;
use crate::color::Rgba;
use patch::{pack_pixel, PackedDiffs, PackedPartial, PackedWhole};
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    PartialSizeMismatch { expected: usize, actual: usize },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::PartialSizeMismatch { expected, actual } => write!(
                f,
                "partial diff buffer size mismatch: expected {expected} bytes, got {actual}"
            ),
        }
    }
}

impl std::error::Error for Error {}

struct PendingPixel {
    x: u32,
    y: u32,
    color_before: Rgba,
}

/// Three diff kinds, fine to coarse: pixel, partial, whole. Ingesting a
/// coarser kind discards pending finer ones it would override (the
/// "coercion lattice").
#[derive(Default)]
pub struct DiffController {
    pixels: Vec<PendingPixel>,
    partial: Option<PackedPartial>,
    whole: Option<PackedWhole>,
}

impl DiffController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `(x, y)`'s pre-mutation color. Marking the tile dirty is the
    /// facade's job, not this controller's.
    pub fn add_pixel(&mut self, x: u32, y: u32, color_before: Rgba) {
        self.pixels.push(PendingPixel { x, y, color_before });
    }

    /// Packs `swap_buffer` via `codec.raw_to_webp` and records it as the
    /// pending partial. Clears pending pixels. A no-op if a whole diff is
    /// already pending, since the whole already covers this region.
    pub fn add_partial(
        &mut self,
        bound_box: BoundBox,
        swap_buffer: &[u8],
        codec: &impl ImageCodec,
    ) -> Result<(), Error> {
        let expected = bound_box.area() * 4;
        if swap_buffer.len() != expected {
            return Err(Error::PartialSizeMismatch {
                expected,
                actual: swap_buffer.len(),
            });
        }

        if self.whole.is_some() {
            log::debug!("add_partial: ignored, a whole diff is already pending");
            return Ok(());
        }

        let swap_webp = codec.raw_to_webp(swap_buffer, bound_box.width, bound_box.height);
        self.partial = Some(PackedPartial { bound_box, swap_webp });
        self.discard_coerced_pixels();

        Ok(())
    }

    /// Packs `swap_buffer` via `codec.raw_to_webp` and records it as the
    /// pending whole-buffer diff. Clears pending pixels and partial.
    pub fn add_whole(&mut self, width: u32, height: u32, swap_buffer: &[u8], codec: &impl ImageCodec) {
        let swap_webp = codec.raw_to_webp(swap_buffer, width, height);
        self.add_whole_packed(PackedWhole { width, height, swap_webp });
    }

    /// Shortcut for when the pre-image has already been WebP-encoded (e.g.
    /// the facade's `add_current_whole_diff`, which reuses an export).
    pub fn add_whole_packed(&mut self, packed: PackedWhole) {
        self.whole = Some(packed);
        if self.partial.take().is_some() {
            log::debug!("add_whole: discarded a pending partial diff, superseded");
        }
        self.discard_coerced_pixels();
    }

    fn discard_coerced_pixels(&mut self) {
        if !self.pixels.is_empty() {
            log::debug!(
                "discarding {} pending pixel diffs, superseded by a coarser diff",
                self.pixels.len()
            );
            self.pixels.clear();
        }
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pixels.is_empty() || self.partial.is_some() || self.whole.is_some()
    }

    /// Builds the current `PackedDiffs` without clearing pending state.
    pub fn preview_patch(&self) -> PackedDiffs {
        PackedDiffs {
            pixels: self
                .pixels
                .iter()
                .map(|p| pack_pixel(p.x, p.y, p.color_before))
                .collect(),
            partial: self.partial.clone(),
            whole: self.whole.clone(),
        }
    }

    /// Returns the current patch and resets all pending state.
    pub fn flush(&mut self) -> PackedDiffs {
        let patch = self.preview_patch();
        self.discard();
        patch
    }

    pub fn discard(&mut self) {
        self.pixels.clear();
        self.partial = None;
        self.whole = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::WebpPngCodec;

    #[test]
    fn partial_supersedes_pixels() {
        let mut ctrl = DiffController::new();
        ctrl.add_pixel(1, 1, (255, 0, 0, 255));

        let bb = BoundBox::new(0, 0, 2, 2);
        ctrl.add_partial(bb, &[128u8; 16], &WebpPngCodec).unwrap();

        let preview = ctrl.preview_patch();
        assert!(preview.pixels.is_empty());
        assert!(preview.partial.is_some());
    }

    #[test]
    fn whole_supersedes_partial_and_pixels() {
        let mut ctrl = DiffController::new();
        ctrl.add_pixel(1, 1, (255, 0, 0, 255));
        let bb = BoundBox::new(0, 0, 2, 2);
        ctrl.add_partial(bb, &[128u8; 16], &WebpPngCodec).unwrap();

        ctrl.add_whole(4, 4, &[0xffu8; 64], &WebpPngCodec);

        let preview = ctrl.preview_patch();
        assert!(preview.pixels.is_empty());
        assert!(preview.partial.is_none());
        assert!(preview.whole.is_some());
    }

    #[test]
    fn add_partial_validates_size() {
        let mut ctrl = DiffController::new();
        let bb = BoundBox::new(0, 0, 2, 2);
        let err = ctrl.add_partial(bb, &[0u8; 4], &WebpPngCodec).unwrap_err();
        assert_eq!(
            err,
            Error::PartialSizeMismatch {
                expected: 16,
                actual: 4
            }
        );
    }

    #[test]
    fn add_partial_ignored_once_whole_pending() {
        let mut ctrl = DiffController::new();
        ctrl.add_whole(2, 2, &[1u8; 16], &WebpPngCodec);
        let bb = BoundBox::new(0, 0, 1, 1);
        ctrl.add_partial(bb, &[1u8; 4], &WebpPngCodec).unwrap();

        let preview = ctrl.preview_patch();
        assert!(preview.partial.is_none());
        assert!(preview.whole.is_some());
    }

    #[test]
    fn flush_resets_state_and_repeated_flush_is_empty() {
        let mut ctrl = DiffController::new();
        ctrl.add_pixel(0, 0, (1, 2, 3, 4));
        assert!(ctrl.has_pending_changes());

        let patch = ctrl.flush();
        assert_eq!(patch.pixels.len(), 1);
        assert!(!ctrl.has_pending_changes());

        let empty = ctrl.flush();
        assert!(empty.is_empty());
    }

    #[test]
    fn pixels_do_not_coalesce_duplicates() {
        let mut ctrl = DiffController::new();
        ctrl.add_pixel(2, 2, (1, 1, 1, 1));
        ctrl.add_pixel(2, 2, (2, 2, 2, 2));

        let patch = ctrl.flush();
        assert_eq!(patch.pixels.len(), 2);
    }
}
