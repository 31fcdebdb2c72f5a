//! Wires [`PixelBuffer`], [`TileGrid`], and [`DiffController`] together and
//! exposes the operations a layer actually needs. Every mutator that touches
//! pixels is responsible for keeping all three in step.

use crate::buffer::{Antialias, BoundBox, MaskMode, PixelBuffer};
use crate::codec::{ImageCodec, WebpPngCodec};
use crate::color::Rgba;
use crate::diff::patch::{ApplyMode, PackedDiffs, PackedWhole};
use crate::diff::DiffController;
use crate::tile::{TileGrid, TileIndex};
use crate::Error;

pub const DEFAULT_TILE_SIZE: u32 = 256;

/// The facade a layer owns: one buffer, one tile grid, one diff controller,
/// and the codec used to pack/unpack WebP payloads.
pub struct Anvil<C: ImageCodec = WebpPngCodec> {
    buffer: PixelBuffer,
    tiles: TileGrid,
    diffs: DiffController,
    codec: C,
}

impl Anvil<WebpPngCodec> {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_tile_size(width, height, DEFAULT_TILE_SIZE)
    }

    pub fn with_tile_size(width: u32, height: u32, tile_size: u32) -> Self {
        Self::with_codec(width, height, tile_size, WebpPngCodec)
    }
}

impl<C: ImageCodec> Anvil<C> {
    pub fn with_codec(width: u32, height: u32, tile_size: u32, codec: C) -> Self {
        Self {
            buffer: PixelBuffer::new(width, height),
            tiles: TileGrid::new(width, height, tile_size),
            diffs: DiffController::new(),
            codec,
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn tile_size(&self) -> u32 {
        self.tiles.tile_size()
    }

    pub fn get_pixel(&self, x: i64, y: i64) -> Rgba {
        self.buffer.get(x, y)
    }

    /// Bounds-checked write. Fails with `Error::OutOfBounds` rather than the
    /// buffer's own silent no-op, since a caller-facing coordinate mistake
    /// here is a programmer error worth surfacing (see SPEC_FULL.md §7).
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Rgba) -> Result<bool, Error> {
        if !self.buffer.is_in_bounds(x, y) {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.buffer.width(),
                height: self.buffer.height(),
            });
        }

        let before = self.buffer.get(x, y);
        let changed = self.buffer.set(x, y, color);
        self.tiles.mark_dirty_by_pixel(x as u32, y as u32);
        self.diffs.add_pixel(x as u32, y as u32, before);
        Ok(changed)
    }

    /// Per-pixel fill over a rectangle, clipped to the buffer. Records one
    /// pixel diff per in-bounds pixel touched and dirties every tile the
    /// rectangle intersects.
    pub fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: Rgba) {
        for row in 0..h {
            let py = y + i64::from(row);
            for col in 0..w {
                let px = x + i64::from(col);
                if self.buffer.is_in_bounds(px, py) {
                    let _ = self.set_pixel(px, py, color);
                }
            }
        }
    }

    /// Fills the whole buffer. Like `flood_fill`, does not record a diff by
    /// itself — callers that need undo should `add_current_whole_diff`
    /// first.
    pub fn fill_all(&mut self, color: Rgba) {
        self.buffer.fill(color);
        self.tiles.set_all_dirty();
    }

    /// Fills every pixel where `mask` is eligible under `mode`. Records a
    /// pixel diff per pixel actually touched.
    pub fn fill_mask_area(&mut self, mask: &[u8], color: Rgba, mode: MaskMode) {
        let (width, height) = (self.buffer.width(), self.buffer.height());
        for y in 0..height {
            for x in 0..width {
                let idx = (y as usize * width as usize + x as usize);
                let eligible = mask.get(idx).copied().unwrap_or(0) != 0;
                let eligible = match mode {
                    MaskMode::Inside => eligible,
                    MaskMode::Outside => !eligible,
                };
                if eligible {
                    let _ = self.set_pixel(i64::from(x), i64::from(y), color);
                }
            }
        }
    }

    /// Delegates to `PixelBuffer::flood_fill`. Does not record per-pixel
    /// diffs (see SPEC_FULL.md Open Questions) — callers needing undo should
    /// wrap this with `add_partial_diff`/`add_current_whole_diff`. Marks all
    /// tiles dirty as an accepted over-approximation of the visited region.
    pub fn flood_fill(&mut self, start_x: i64, start_y: i64, color: Rgba, threshold: u8) -> bool {
        let changed = self.buffer.flood_fill(start_x, start_y, color, threshold);
        if changed {
            self.tiles.set_all_dirty();
        }
        changed
    }

    pub fn flood_fill_with_mask(
        &mut self,
        start_x: i64,
        start_y: i64,
        color: Rgba,
        threshold: u8,
        mask: &[u8],
        mode: MaskMode,
    ) -> bool {
        let changed = self
            .buffer
            .flood_fill_with_mask(start_x, start_y, color, threshold, mask, mode);
        if changed {
            self.tiles.set_all_dirty();
        }
        changed
    }

    /// Affine blit, composited with source-over alpha. Marks every tile
    /// intersecting the transformed source bounding box dirty.
    #[allow(clippy::too_many_arguments)]
    pub fn transfer_from_raw(
        &mut self,
        src: &[u8],
        src_w: u32,
        src_h: u32,
        offset_x: i64,
        offset_y: i64,
        scale_x: f64,
        scale_y: f64,
        rotate_deg: f64,
        antialias: Antialias,
        flip_x: bool,
        flip_y: bool,
    ) {
        let touched = self.buffer.blit_from_raw(
            src, src_w, src_h, offset_x, offset_y, scale_x, scale_y, rotate_deg, antialias,
            flip_x, flip_y,
        );
        self.mark_dirty_rect(touched);
    }

    pub fn write_rect(&mut self, x: i64, y: i64, w: u32, h: u32, src: &[u8]) -> Result<(), Error> {
        self.buffer.write_rect(x, y, w, h, src)?;
        self.mark_dirty_rect(BoundBox::new(x, y, w, h));
        Ok(())
    }

    pub fn read_rect(&self, x: i64, y: i64, w: u32, h: u32) -> Vec<u8> {
        self.buffer.read_rect(x, y, w, h)
    }

    pub fn write_pixels(&mut self, coords: &[u32], colors: &[u8]) {
        self.buffer.write_pixels(coords, colors);
        for pair in coords.chunks_exact(2) {
            self.tiles.mark_dirty_by_pixel(pair[0], pair[1]);
        }
    }

    fn mark_dirty_rect(&mut self, box_: BoundBox) {
        if box_.width == 0 || box_.height == 0 {
            return;
        }
        for row in 0..box_.height {
            for col in 0..box_.width {
                let px = box_.x + i64::from(col);
                let py = box_.y + i64::from(row);
                if px >= 0 && py >= 0 {
                    self.tiles.mark_dirty_by_pixel(px as u32, py as u32);
                }
            }
        }
    }

    /// Replaces the buffer with a new size, translating content per
    /// `resize_with_origins`, and reallocates the tile grid. Discards
    /// pending diffs — a resize isn't representable as a pixel/partial/whole
    /// diff, so callers should flush or snapshot beforehand.
    pub fn resize_with_offset(
        &mut self,
        new_width: u32,
        new_height: u32,
        src_origin_x: u32,
        src_origin_y: u32,
        dest_origin_x: u32,
        dest_origin_y: u32,
    ) {
        self.buffer.resize_with_origins(
            new_width,
            new_height,
            src_origin_x,
            src_origin_y,
            dest_origin_x,
            dest_origin_y,
        );
        self.tiles.resize(new_width, new_height);
        self.diffs.discard();
    }

    pub fn import_raw(&mut self, width: u32, height: u32, bytes: &[u8]) -> bool {
        let ok = self.buffer.import_raw(width, height, bytes);
        if ok {
            self.tiles.resize(width, height);
            self.tiles.set_all_dirty();
        }
        ok
    }

    pub fn import_webp(&mut self, bytes: &[u8], width: u32, height: u32) -> bool {
        let ok = self.buffer.import_webp(bytes, width, height, &self.codec);
        if ok {
            self.tiles.resize(width, height);
            self.tiles.set_all_dirty();
        }
        ok
    }

    pub fn import_png(&mut self, bytes: &[u8], width: u32, height: u32) -> bool {
        let ok = self.buffer.import_png(bytes, width, height, &self.codec);
        if ok {
            self.tiles.resize(width, height);
            self.tiles.set_all_dirty();
        }
        ok
    }

    pub fn export_webp(&self) -> Vec<u8> {
        self.buffer.export_webp(&self.codec)
    }

    pub fn export_png(&self) -> Vec<u8> {
        self.buffer.export_png(&self.codec)
    }

    pub fn add_partial_diff(&mut self, bound_box: BoundBox, swap_buffer: &[u8], set_dirty: bool) -> Result<(), Error> {
        self.diffs.add_partial(bound_box, swap_buffer, &self.codec)?;
        if set_dirty {
            self.mark_dirty_rect(bound_box);
        }
        Ok(())
    }

    pub fn add_pixel_diff(&mut self, x: u32, y: u32, color_before: Rgba) {
        self.diffs.add_pixel(x, y, color_before);
    }

    /// Snapshots the current buffer as the pre-image of a whole-buffer diff:
    /// "save before you mutate".
    pub fn add_current_whole_diff(&mut self) {
        let swap_webp = self.export_webp();
        self.diffs.add_whole_packed(PackedWhole {
            width: self.width(),
            height: self.height(),
            swap_webp,
        });
    }

    pub fn has_pending_changes(&self) -> bool {
        self.diffs.has_pending_changes()
    }

    pub fn preview_patch(&self) -> PackedDiffs {
        self.diffs.preview_patch()
    }

    /// Returns the pending patch and clears pending state. Does not clear
    /// tile dirtiness — the renderer's own upload loop does that via
    /// `clear_dirty_tiles`.
    pub fn flush_diffs(&mut self) -> PackedDiffs {
        self.diffs.flush()
    }

    pub fn discard_diffs(&mut self) {
        self.diffs.discard();
    }

    pub fn get_dirty_tiles(&self) -> Vec<TileIndex> {
        self.tiles.dirty_tile_indices()
    }

    pub fn clear_dirty_tiles(&mut self) {
        self.tiles.clear_all_dirty();
    }

    pub fn set_all_dirty(&mut self) {
        self.tiles.set_all_dirty();
    }

    pub fn get_tile_info(&self, index: TileIndex) -> Option<(u32, u32, u32, u32)> {
        self.tiles.tile_bounds(index)
    }

    /// Mutates the buffer per `patch`'s kinds (whole, then partial, then
    /// pixels) and rewrites `patch` in place so it becomes its own inverse.
    /// Every intersecting tile ends up dirty.
    pub fn apply_patch(&mut self, patch: &mut PackedDiffs, mode: ApplyMode) {
        log::debug!(
            "applying {mode:?} patch: whole={} partial={} pixels={}",
            patch.whole.is_some(),
            patch.partial.is_some(),
            patch.pixels.len()
        );

        if let Some(whole) = &mut patch.whole {
            let new_bytes = match self.codec.webp_to_raw(&whole.swap_webp, whole.width, whole.height) {
                Ok(bytes) => bytes,
                Err(_) => {
                    log::warn!("apply_patch: failed to decode whole diff, skipping");
                    Vec::new()
                }
            };

            if !new_bytes.is_empty() {
                let cur_webp = self.export_webp();
                self.buffer.import_raw(whole.width, whole.height, &new_bytes);
                self.tiles.resize(whole.width, whole.height);
                whole.swap_webp = cur_webp;
                self.tiles.set_all_dirty();
            }
        }

        if let Some(partial) = &mut patch.partial {
            let bb = partial.bound_box;
            match self.codec.webp_to_raw(&partial.swap_webp, bb.width, bb.height) {
                Ok(new_bytes) => {
                    let cur_bytes = self.buffer.read_rect(bb.x, bb.y, bb.width, bb.height);
                    let cur_webp = self.codec.raw_to_webp(&cur_bytes, bb.width, bb.height);
                    let _ = self.buffer.write_rect(bb.x, bb.y, bb.width, bb.height, &new_bytes);
                    self.mark_dirty_rect(bb);
                    partial.swap_webp = cur_webp;
                }
                Err(_) => log::warn!("apply_patch: failed to decode partial diff, skipping"),
            }
        }

        for entry in &mut patch.pixels {
            let cur = self.buffer.get(i64::from(entry.x), i64::from(entry.y));
            self.buffer
                .set(i64::from(entry.x), i64::from(entry.y), entry.color_rgba());
            self.tiles.mark_dirty_by_pixel(entry.x, entry.y);
            entry.color = crate::color::rgba_to_packed(cur);
        }
    }
}
