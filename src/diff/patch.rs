//! The packed (transport) shapes a [`super::DiffController`] emits, and the
//! pack/unpack glue between them and their unpacked in-memory counterparts.

use crate::buffer::BoundBox;
use crate::color::{packed_to_rgba, rgba_to_packed, Rgba};

/// A single pre-mutation pixel, packed for transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedPixelPatch {
    pub x: u32,
    pub y: u32,
    pub color: u32,
}

impl PackedPixelPatch {
    pub fn color_rgba(&self) -> Rgba {
        packed_to_rgba(self.color)
    }
}

/// A rectangular pre-image, WebP-encoded at ingest time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedPartial {
    pub bound_box: BoundBox,
    pub swap_webp: Vec<u8>,
}

/// A whole-buffer pre-image, WebP-encoded at ingest time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedWhole {
    pub width: u32,
    pub height: u32,
    pub swap_webp: Vec<u8>,
}

/// The transport form of a [`super::DiffController`]'s pending state. Empty
/// fields are genuinely empty, not merely unset, so a caller can persist this
/// directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedDiffs {
    pub pixels: Vec<PackedPixelPatch>,
    pub partial: Option<PackedPartial>,
    pub whole: Option<PackedWhole>,
}

impl PackedDiffs {
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty() && self.partial.is_none() && self.whole.is_none()
    }
}

/// Whether [`crate::Anvil::apply_patch`] is being asked to undo or redo a
/// patch. Every kind carries both pre- and post-image via the swap, so the
/// procedure is symmetric; `mode` is informational, used only for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    Undo,
    Redo,
}

/// Packs an unpacked pixel pre-image (`{x, y, color}`) into its transport form.
pub(super) fn pack_pixel(x: u32, y: u32, color_before: Rgba) -> PackedPixelPatch {
    PackedPixelPatch {
        x,
        y,
        color: rgba_to_packed(color_before),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_diffs_is_empty_requires_every_field_empty() {
        let mut diffs = PackedDiffs::default();
        assert!(diffs.is_empty());

        diffs.pixels.push(pack_pixel(0, 0, (1, 2, 3, 4)));
        assert!(!diffs.is_empty());
    }

    #[test]
    fn pixel_patch_color_roundtrips() {
        let packed = pack_pixel(3, 4, (10, 20, 30, 255));
        assert_eq!(packed.color_rgba(), (10, 20, 30, 255));
    }
}
