//! The authoritative RGBA8 grid. Every mutation to a layer's pixels goes
//! through a `PixelBuffer` so ownership of the bytes stays unambiguous.

use crate::codec::ImageCodec;
use crate::color::{within_threshold, Rgba, TRANSPARENT};
use std::fmt::{self, Display, Formatter};

/// Axis-aligned rectangle. `width`/`height` are unsigned so a box can never
/// describe a negative extent; a box entirely outside the buffer is a valid
/// value that every operation treats as a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundBox {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl BoundBox {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Eligibility test for mask-constrained operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskMode {
    /// Non-zero mask bytes are eligible.
    Inside,
    /// Zero mask bytes are eligible.
    Outside,
}

/// Resampling filter for [`PixelBuffer::blit_from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Antialias {
    Nearest,
    Bilinear,
    Bicubic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    SizeMismatch { expected: usize, actual: usize },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::SizeMismatch { expected, actual } => write!(
                f,
                "expected a buffer of {expected} bytes, got {actual}"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A row-major, unpadded RGBA8 pixel grid.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

fn read_pixel(bytes: &[u8], x: u32, y: u32, width: u32) -> Rgba {
    let off = (y as usize * width as usize + x as usize) * 4;
    (bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3])
}

fn write_pixel(bytes: &mut [u8], x: u32, y: u32, width: u32, color: Rgba) -> bool {
    let off = (y as usize * width as usize + x as usize) * 4;
    let new = [color.0, color.1, color.2, color.3];
    if bytes[off..off + 4] == new {
        return false;
    }
    bytes[off..off + 4].copy_from_slice(&new);
    true
}

fn mask_eligible(mask: &[u8], mode: MaskMode, x: u32, y: u32, mask_width: u32) -> bool {
    let idx = y as usize * mask_width as usize + x as usize;
    let set = mask.get(idx).copied().unwrap_or(0) != 0;
    match mode {
        MaskMode::Inside => set,
        MaskMode::Outside => !set,
    }
}

/// Non-premultiplied source-over compositing of `src` onto `dst`.
fn composite_over(dst: Rgba, src: Rgba) -> Rgba {
    if src.3 == 0 {
        return dst;
    }
    if src.3 == 255 {
        return src;
    }

    let sa = f32::from(src.3) / 255.0;
    let da = f32::from(dst.3) / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a <= 0.0 {
        return TRANSPARENT;
    }

    let blend = |s: u8, d: u8| -> u8 {
        let s = f32::from(s) / 255.0;
        let d = f32::from(d) / 255.0;
        let out = (s * sa + d * da * (1.0 - sa)) / out_a;
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };

    (
        blend(src.0, dst.0),
        blend(src.1, dst.1),
        blend(src.2, dst.2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}

fn cubic_weight(t: f64) -> f64 {
    // Catmull-Rom kernel (a = -0.5).
    let a = -0.5;
    let t = t.abs();
    if t <= 1.0 {
        (a + 2.0) * t.powi(3) - (a + 3.0) * t.powi(2) + 1.0
    } else if t < 2.0 {
        a * t.powi(3) - 5.0 * a * t.powi(2) + 8.0 * a * t - 4.0 * a
    } else {
        0.0
    }
}

impl PixelBuffer {
    /// An all-zero (transparent black) buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bytes: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, Error> {
        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self { width, height, bytes })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < u64::from(self.width) && (y as u64) < u64::from(self.height)
    }

    /// Out-of-bounds reads return transparent black rather than signalling.
    pub fn get(&self, x: i64, y: i64) -> Rgba {
        if !self.is_in_bounds(x, y) {
            return TRANSPARENT;
        }
        read_pixel(&self.bytes, x as u32, y as u32, self.width)
    }

    /// Returns whether the pixel's bytes actually changed. Out-of-bounds is a
    /// no-op that returns `false`.
    pub fn set(&mut self, x: i64, y: i64, color: Rgba) -> bool {
        if !self.is_in_bounds(x, y) {
            return false;
        }
        write_pixel(&mut self.bytes, x as u32, y as u32, self.width, color)
    }

    pub fn fill(&mut self, color: Rgba) {
        for px in self.bytes.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.0, color.1, color.2, color.3]);
        }
    }

    /// Reads a rectangle, zero-filling any part outside the buffer.
    pub fn read_rect(&self, x: i64, y: i64, w: u32, h: u32) -> Vec<u8> {
        let mut out = vec![0u8; w as usize * h as usize * 4];
        if w == 0 || h == 0 {
            return out;
        }

        for row in 0..h {
            let sy = y + i64::from(row);
            for col in 0..w {
                let sx = x + i64::from(col);
                if self.is_in_bounds(sx, sy) {
                    let color = read_pixel(&self.bytes, sx as u32, sy as u32, self.width);
                    let off = (row as usize * w as usize + col as usize) * 4;
                    out[off..off + 4].copy_from_slice(&[color.0, color.1, color.2, color.3]);
                }
            }
        }

        out
    }

    /// Writes `src` into the buffer at `(x, y)`, clipping to bounds.
    pub fn write_rect(&mut self, x: i64, y: i64, w: u32, h: u32, src: &[u8]) -> Result<(), Error> {
        let expected = w as usize * h as usize * 4;
        if src.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: src.len(),
            });
        }

        for row in 0..h {
            let dy = y + i64::from(row);
            for col in 0..w {
                let dx = x + i64::from(col);
                if self.is_in_bounds(dx, dy) {
                    let off = (row as usize * w as usize + col as usize) * 4;
                    let color = (src[off], src[off + 1], src[off + 2], src[off + 3]);
                    write_pixel(&mut self.bytes, dx as u32, dy as u32, self.width, color);
                }
            }
        }

        Ok(())
    }

    /// Bulk scatter-write. `coords` is `[x0, y0, x1, y1, ...]`; `colors` is
    /// `[r0,g0,b0,a0, r1,g1,b1,a1, ...]`. Out-of-bounds coordinates are
    /// skipped.
    pub fn write_pixels(&mut self, coords: &[u32], colors: &[u8]) {
        for (i, pair) in coords.chunks_exact(2).enumerate() {
            let (x, y) = (pair[0], pair[1]);
            let off = i * 4;
            if off + 4 > colors.len() {
                break;
            }
            let color = (colors[off], colors[off + 1], colors[off + 2], colors[off + 3]);
            self.set(i64::from(x), i64::from(y), color);
        }
    }

    pub fn flood_fill(&mut self, start_x: i64, start_y: i64, color: Rgba, threshold: u8) -> bool {
        self.flood_fill_impl(start_x, start_y, color, threshold, None)
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
        self.flood_fill_impl(start_x, start_y, color, threshold, Some((mask, mode)))
    }

    fn flood_fill_impl(
        &mut self,
        start_x: i64,
        start_y: i64,
        color: Rgba,
        threshold: u8,
        mask: Option<(&[u8], MaskMode)>,
    ) -> bool {
        if !self.is_in_bounds(start_x, start_y) {
            return false;
        }
        let (start_x, start_y) = (start_x as u32, start_y as u32);

        if let Some((mask, mode)) = mask {
            if !mask_eligible(mask, mode, start_x, start_y, self.width) {
                return false;
            }
        }

        let seed = read_pixel(&self.bytes, start_x, start_y, self.width);
        if within_threshold(seed, color, threshold) {
            return false;
        }

        let width = self.width;
        let height = self.height;

        let eligible = |x: u32, y: u32| match mask {
            Some((m, mode)) => mask_eligible(m, mode, x, y, width),
            None => true,
        };
        let matches = |bytes: &[u8], x: u32, y: u32| {
            let c = read_pixel(bytes, x, y, width);
            c != color && within_threshold(c, seed, threshold)
        };

        let mut changed = false;
        let mut stack = vec![(start_x, start_y)];

        while let Some((x, y)) = stack.pop() {
            if !eligible(x, y) || !matches(&self.bytes, x, y) {
                continue;
            }

            let mut x1 = x;
            while x1 > 0 && eligible(x1 - 1, y) && matches(&self.bytes, x1 - 1, y) {
                x1 -= 1;
            }
            let mut x2 = x;
            while x2 + 1 < width && eligible(x2 + 1, y) && matches(&self.bytes, x2 + 1, y) {
                x2 += 1;
            }

            for xx in x1..=x2 {
                if write_pixel(&mut self.bytes, xx, y, width, color) {
                    changed = true;
                }
            }

            for yy in [y.checked_sub(1), (y + 1 < height).then_some(y + 1)]
                .into_iter()
                .flatten()
            {
                let mut xx = x1;
                while xx <= x2 {
                    if eligible(xx, yy) && matches(&self.bytes, xx, yy) {
                        stack.push((xx, yy));
                        while xx <= x2 && eligible(xx, yy) && matches(&self.bytes, xx, yy) {
                            xx += 1;
                        }
                    } else {
                        xx += 1;
                    }
                }
            }
        }

        changed
    }

    /// Samples `src` (a `src_w x src_h` RGBA8 buffer) through `scale ->
    /// flip -> rotate -> translate` and composites it onto `self` with
    /// source-over alpha. A `scale` of exactly `0.0` on either axis is
    /// undefined per the engine's contract and is treated as a no-op.
    ///
    /// Returns the destination-space bounding box `(x, y, w, h)` that could
    /// have been touched, clipped to the buffer — empty if nothing was drawn.
    /// Callers use this to mark exactly the tiles that might have changed
    /// without re-deriving the transform.
    #[allow(clippy::too_many_arguments)]
    pub fn blit_from_raw(
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
    ) -> BoundBox {
        if scale_x == 0.0 || scale_y == 0.0 {
            log::warn!("blit_from_raw: scale of 0 is undefined, skipping blit");
            return BoundBox::new(0, 0, 0, 0);
        }
        if src_w == 0 || src_h == 0 {
            return BoundBox::new(0, 0, 0, 0);
        }

        let sx = scale_x * if flip_x { -1.0 } else { 1.0 };
        let sy = scale_y * if flip_y { -1.0 } else { 1.0 };
        let theta = rotate_deg.to_radians();
        let (sin, cos) = theta.sin_cos();

        let cx = f64::from(src_w) / 2.0;
        let cy = f64::from(src_h) / 2.0;

        // Forward-transform the source corners to find the destination
        // bounding box worth iterating, instead of scanning the whole buffer.
        let forward = |u: f64, v: f64| -> (f64, f64) {
            let (u, v) = (u - cx, v - cy);
            let (u, v) = (u * sx, v * sy);
            let rx = u * cos - v * sin;
            let ry = u * sin + v * cos;
            (rx + cx + offset_x as f64, ry + cy + offset_y as f64)
        };

        let corners = [
            forward(0.0, 0.0),
            forward(f64::from(src_w), 0.0),
            forward(0.0, f64::from(src_h)),
            forward(f64::from(src_w), f64::from(src_h)),
        ];

        let min_x = corners.iter().map(|c| c.0).fold(f64::MAX, f64::min).floor().max(0.0) as i64;
        let max_x = corners
            .iter()
            .map(|c| c.0)
            .fold(f64::MIN, f64::max)
            .ceil()
            .min(f64::from(self.width)) as i64;
        let min_y = corners.iter().map(|c| c.1).fold(f64::MAX, f64::min).floor().max(0.0) as i64;
        let max_y = corners
            .iter()
            .map(|c| c.1)
            .fold(f64::MIN, f64::max)
            .ceil()
            .min(f64::from(self.height)) as i64;

        for dy in min_y..max_y {
            for dx in min_x..max_x {
                let ddx = (dx as f64 + 0.5) - offset_x as f64 - cx;
                let ddy = (dy as f64 + 0.5) - offset_y as f64 - cy;

                let u = cx + (cos * ddx + sin * ddy) / sx;
                let v = cy + (-sin * ddx + cos * ddy) / sy;

                if u < 0.0 || v < 0.0 || u >= f64::from(src_w) || v >= f64::from(src_h) {
                    continue;
                }

                let sample = Self::sample_src(src, src_w, src_h, u, v, antialias);
                if sample.3 == 0 {
                    continue;
                }

                let dst = self.get(dx, dy);
                self.set(dx, dy, composite_over(dst, sample));
            }
        }

        if max_x <= min_x || max_y <= min_y {
            BoundBox::new(0, 0, 0, 0)
        } else {
            BoundBox::new(min_x, min_y, (max_x - min_x) as u32, (max_y - min_y) as u32)
        }
    }

    fn sample_src(src: &[u8], w: u32, h: u32, u: f64, v: f64, antialias: Antialias) -> Rgba {
        let at = |x: i64, y: i64| -> Rgba {
            let x = x.clamp(0, w as i64 - 1) as u32;
            let y = y.clamp(0, h as i64 - 1) as u32;
            read_pixel(src, x, y, w)
        };

        match antialias {
            Antialias::Nearest => at(u.floor() as i64, v.floor() as i64),
            Antialias::Bilinear => {
                let x0 = u.floor();
                let y0 = v.floor();
                let fx = u - x0;
                let fy = v - y0;

                let lerp_channel = |get: &dyn Fn(i64, i64) -> u8| -> f64 {
                    let c00 = f64::from(get(x0 as i64, y0 as i64));
                    let c10 = f64::from(get(x0 as i64 + 1, y0 as i64));
                    let c01 = f64::from(get(x0 as i64, y0 as i64 + 1));
                    let c11 = f64::from(get(x0 as i64 + 1, y0 as i64 + 1));
                    let top = c00 * (1.0 - fx) + c10 * fx;
                    let bottom = c01 * (1.0 - fx) + c11 * fx;
                    top * (1.0 - fy) + bottom * fy
                };

                let ch = |i: usize| -> f64 {
                    lerp_channel(&|x, y| {
                        let p = at(x, y);
                        [p.0, p.1, p.2, p.3][i]
                    })
                };

                (
                    ch(0).round().clamp(0.0, 255.0) as u8,
                    ch(1).round().clamp(0.0, 255.0) as u8,
                    ch(2).round().clamp(0.0, 255.0) as u8,
                    ch(3).round().clamp(0.0, 255.0) as u8,
                )
            }
            Antialias::Bicubic => {
                let x0 = u.floor();
                let y0 = v.floor();
                let fx = u - x0;
                let fy = v - y0;

                let ch = |i: usize| -> f64 {
                    let mut sum = 0.0;
                    for m in -1..=2i64 {
                        let wy = cubic_weight(fy - m as f64);
                        if wy == 0.0 {
                            continue;
                        }
                        for n in -1..=2i64 {
                            let wx = cubic_weight(fx - n as f64);
                            if wx == 0.0 {
                                continue;
                            }
                            let p = at(x0 as i64 + n, y0 as i64 + m);
                            let channel = f64::from([p.0, p.1, p.2, p.3][i]);
                            sum += channel * wx * wy;
                        }
                    }
                    sum
                };

                (
                    ch(0).round().clamp(0.0, 255.0) as u8,
                    ch(1).round().clamp(0.0, 255.0) as u8,
                    ch(2).round().clamp(0.0, 255.0) as u8,
                    ch(3).round().clamp(0.0, 255.0) as u8,
                )
            }
        }
    }

    /// A `mask_w x mask_h` buffer sampled from `(mask_off + xy)` where the
    /// mask is non-zero, transparent black elsewhere.
    pub fn slice_with_mask(
        &self,
        mask: &[u8],
        mask_w: u32,
        mask_h: u32,
        mask_off_x: i64,
        mask_off_y: i64,
    ) -> Vec<u8> {
        let mut out = vec![0u8; mask_w as usize * mask_h as usize * 4];

        for y in 0..mask_h {
            for x in 0..mask_w {
                let idx = (y as usize * mask_w as usize + x as usize);
                if mask.get(idx).copied().unwrap_or(0) == 0 {
                    continue;
                }

                let sx = mask_off_x + i64::from(x);
                let sy = mask_off_y + i64::from(y);
                if self.is_in_bounds(sx, sy) {
                    let color = read_pixel(&self.bytes, sx as u32, sy as u32, self.width);
                    let off = idx * 4;
                    out[off..off + 4].copy_from_slice(&[color.0, color.1, color.2, color.3]);
                }
            }
        }

        out
    }

    /// A buffer the size of `self`, keeping only pixels where `mask`
    /// (positioned at `mask_off`) is non-zero.
    pub fn crop_with_mask(
        &self,
        mask: &[u8],
        mask_w: u32,
        mask_h: u32,
        mask_off_x: i64,
        mask_off_y: i64,
    ) -> Vec<u8> {
        let mut out = vec![0u8; self.bytes.len()];

        for y in 0..self.height {
            for x in 0..self.width {
                let mx = i64::from(x) - mask_off_x;
                let my = i64::from(y) - mask_off_y;
                if mx < 0 || my < 0 || mx >= i64::from(mask_w) || my >= i64::from(mask_h) {
                    continue;
                }
                let mask_idx = my as usize * mask_w as usize + mx as usize;
                if mask.get(mask_idx).copied().unwrap_or(0) == 0 {
                    continue;
                }

                let color = read_pixel(&self.bytes, x, y, self.width);
                let off = (y as usize * self.width as usize + x as usize) * 4;
                out[off..off + 4].copy_from_slice(&[color.0, color.1, color.2, color.3]);
            }
        }

        out
    }

    /// Allocates a new zeroed buffer of `new_width x new_height` and copies
    /// the intersection of the source rectangle `(src_origin, old size -
    /// src_origin)` into `(dest_origin, ...)`. Supersedes plain resize.
    pub fn resize_with_origins(
        &mut self,
        new_width: u32,
        new_height: u32,
        src_origin_x: u32,
        src_origin_y: u32,
        dest_origin_x: u32,
        dest_origin_y: u32,
    ) {
        let mut new_bytes = vec![0u8; new_width as usize * new_height as usize * 4];

        let src_w = self.width.saturating_sub(src_origin_x);
        let src_h = self.height.saturating_sub(src_origin_y);
        let copy_w = src_w.min(new_width.saturating_sub(dest_origin_x));
        let copy_h = src_h.min(new_height.saturating_sub(dest_origin_y));

        for row in 0..copy_h {
            let src_start = ((src_origin_y + row) as usize * self.width as usize
                + src_origin_x as usize)
                * 4;
            let dest_start = ((dest_origin_y + row) as usize * new_width as usize
                + dest_origin_x as usize)
                * 4;
            let row_bytes = copy_w as usize * 4;

            new_bytes[dest_start..dest_start + row_bytes]
                .copy_from_slice(&self.bytes[src_start..src_start + row_bytes]);
        }

        self.width = new_width;
        self.height = new_height;
        self.bytes = new_bytes;
    }

    /// Overwrites the entire buffer, possibly changing dimensions. Fails
    /// (returning `false`, leaving the buffer untouched) on a size mismatch.
    pub fn import_raw(&mut self, width: u32, height: u32, bytes: &[u8]) -> bool {
        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            log::warn!("import_raw: expected {expected} bytes, got {}", bytes.len());
            return false;
        }
        self.width = width;
        self.height = height;
        self.bytes = bytes.to_vec();
        true
    }

    pub fn import_webp(
        &mut self,
        bytes: &[u8],
        width: u32,
        height: u32,
        codec: &impl ImageCodec,
    ) -> bool {
        match codec.webp_to_raw(bytes, width, height) {
            Ok(raw) => self.import_raw(width, height, &raw),
            Err(_) => {
                log::warn!("import_webp: decode failed");
                false
            }
        }
    }

    pub fn import_png(
        &mut self,
        bytes: &[u8],
        width: u32,
        height: u32,
        codec: &impl ImageCodec,
    ) -> bool {
        match codec.png_to_raw(bytes, width, height) {
            Ok(raw) => self.import_raw(width, height, &raw),
            Err(_) => {
                log::warn!("import_png: decode failed");
                false
            }
        }
    }

    pub fn export_webp(&self, codec: &impl ImageCodec) -> Vec<u8> {
        codec.raw_to_webp(&self.bytes, self.width, self.height)
    }

    pub fn export_png(&self, codec: &impl ImageCodec) -> Vec<u8> {
        codec.raw_to_png(&self.bytes, self.width, self.height)
    }
}

/// Deterministic test fixture: `(x, y, (x+y) mod 256, 255)`.
#[cfg(test)]
pub(crate) fn coordinate_color(x: u32, y: u32) -> Rgba {
    (
        x as u8,
        y as u8,
        ((x.wrapping_add(y)) % 256) as u8,
        255,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_out_of_bounds_is_transparent_and_side_effect_free() {
        let buf = PixelBuffer::new(4, 4);
        assert_eq!(buf.get(-1, 0), TRANSPARENT);
        assert_eq!(buf.get(4, 0), TRANSPARENT);
        assert_eq!(buf.get(0, 100), TRANSPARENT);
    }

    #[test]
    fn set_out_of_bounds_is_a_noop() {
        let mut buf = PixelBuffer::new(4, 4);
        let before = buf.bytes.clone();
        assert!(!buf.set(-1, 0, (1, 2, 3, 4)));
        assert_eq!(buf.bytes, before);
    }

    #[test]
    fn set_get_roundtrip_and_change_detection() {
        let mut buf = PixelBuffer::new(4, 4);
        assert!(buf.set(1, 1, (10, 20, 30, 40)));
        assert_eq!(buf.get(1, 1), (10, 20, 30, 40));
        assert!(!buf.set(1, 1, (10, 20, 30, 40)));
    }

    #[test]
    fn from_raw_rejects_size_mismatch() {
        let err = PixelBuffer::from_raw(2, 2, vec![0; 10]).unwrap_err();
        assert_eq!(
            err,
            Error::SizeMismatch {
                expected: 16,
                actual: 10
            }
        );
    }

    #[test]
    fn read_rect_zero_pads_outside_buffer() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set(0, 0, (9, 9, 9, 9));
        let rect = buf.read_rect(-1, -1, 3, 3);
        // (1,1) in the rect corresponds to (0,0) in the buffer.
        let off = (1 * 3 + 1) * 4;
        assert_eq!(&rect[off..off + 4], &[9, 9, 9, 9]);
        assert_eq!(&rect[0..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn write_rect_clips_to_bounds() {
        let mut buf = PixelBuffer::new(2, 2);
        let src = vec![5u8; 3 * 3 * 4];
        buf.write_rect(-1, -1, 3, 3, &src).unwrap();
        assert_eq!(buf.get(0, 0), (5, 5, 5, 5));
        assert_eq!(buf.get(1, 1), (5, 5, 5, 5));
    }

    #[test]
    fn write_rect_rejects_size_mismatch() {
        let mut buf = PixelBuffer::new(2, 2);
        assert!(buf.write_rect(0, 0, 2, 2, &[0; 4]).is_err());
    }

    #[test]
    fn flood_fill_respects_threshold_and_is_idempotent() {
        let mut buf = PixelBuffer::new(16, 16);
        assert!(buf.flood_fill(0, 0, (255, 0, 0, 255), 0));
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(buf.get(x, y), (255, 0, 0, 255));
            }
        }
        assert!(!buf.flood_fill(0, 0, (255, 0, 0, 255), 0));
    }

    #[test]
    fn flood_fill_out_of_bounds_seed_is_noop() {
        let mut buf = PixelBuffer::new(4, 4);
        assert!(!buf.flood_fill(10, 10, (1, 2, 3, 4), 0));
    }

    #[test]
    fn flood_fill_with_mask_restricts_eligibility() {
        let mut buf = PixelBuffer::new(4, 1);
        let mask = [1u8, 1, 0, 0];
        assert!(buf.flood_fill_with_mask(0, 0, (255, 0, 0, 255), 0, &mask, MaskMode::Inside));
        assert_eq!(buf.get(0, 0), (255, 0, 0, 255));
        assert_eq!(buf.get(1, 0), (255, 0, 0, 255));
        assert_eq!(buf.get(2, 0), (0, 0, 0, 0));
        assert_eq!(buf.get(3, 0), (0, 0, 0, 0));
    }

    #[test]
    fn resize_with_origins_preserves_translated_content() {
        let mut buf = PixelBuffer::new(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                buf.set(x, y, coordinate_color(x as u32, y as u32));
            }
        }

        buf.resize_with_origins(6, 4, 0, 0, 1, 1);

        assert_eq!(buf.get(0, 0), TRANSPARENT);
        assert_eq!(buf.get(1, 1), coordinate_color(0, 0));
        assert_eq!(buf.get(4, 2), coordinate_color(3, 1));
    }

    #[test]
    fn slice_with_mask_samples_offset_region() {
        let mut buf = PixelBuffer::new(4, 4);
        buf.set(1, 1, (7, 7, 7, 7));
        let mask = [1u8, 0, 0, 1];
        let out = buf.slice_with_mask(&mask, 2, 2, 0, 0);
        assert_eq!(&out[0..4], &[0, 0, 0, 0]);
        let off = 3 * 4;
        assert_eq!(&out[off..off + 4], &[7, 7, 7, 7]);
    }

    #[test]
    fn blit_from_raw_composites_source_over() {
        let mut dst = PixelBuffer::new(4, 4);
        dst.fill((0, 0, 0, 255));
        let src = vec![255u8, 0, 0, 255, 255, 0, 0, 255, 255, 0, 0, 255, 255, 0, 0, 255];
        dst.blit_from_raw(&src, 2, 2, 1, 1, 1.0, 1.0, 0.0, Antialias::Nearest, false, false);
        assert_eq!(dst.get(1, 1), (255, 0, 0, 255));
    }

    #[test]
    fn blit_from_raw_zero_scale_is_noop() {
        let mut dst = PixelBuffer::new(4, 4);
        let before = dst.bytes.clone();
        let src = vec![255u8; 2 * 2 * 4];
        dst.blit_from_raw(&src, 2, 2, 0, 0, 0.0, 1.0, 0.0, Antialias::Nearest, false, false);
        assert_eq!(dst.bytes, before);
    }

    #[test]
    fn import_raw_rejects_mismatch_and_leaves_buffer_untouched() {
        let mut buf = PixelBuffer::new(2, 2);
        let before = buf.bytes.clone();
        assert!(!buf.import_raw(2, 2, &[0; 3]));
        assert_eq!(buf.bytes, before);
    }

    #[test]
    fn import_raw_replaces_dimensions_and_bytes() {
        let mut buf = PixelBuffer::new(2, 2);
        assert!(buf.import_raw(1, 1, &[1, 2, 3, 4]));
        assert_eq!(buf.width(), 1);
        assert_eq!(buf.height(), 1);
        assert_eq!(buf.get(0, 0), (1, 2, 3, 4));
    }
}
