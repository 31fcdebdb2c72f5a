//! RGBA8 <-> packed `u32` conversions and the small per-channel helpers the
//! rest of the crate builds on.

/// Non-premultiplied RGBA, one byte per channel.
pub type Rgba = (u8, u8, u8, u8);

pub const TRANSPARENT: Rgba = (0, 0, 0, 0);

/// Packs `(r, g, b, a)` into a `u32` laid out as `(a<<24)|(r<<16)|(g<<8)|b`.
#[inline]
pub fn rgba_to_packed(color: Rgba) -> u32 {
    let (r, g, b, a) = color;
    (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Inverse of [`rgba_to_packed`].
#[inline]
pub fn packed_to_rgba(packed: u32) -> Rgba {
    let a = (packed >> 24) as u8;
    let r = (packed >> 16) as u8;
    let g = (packed >> 8) as u8;
    let b = packed as u8;
    (r, g, b, a)
}

/// `true` iff every channel of `a` is within `threshold` of the matching
/// channel of `b`. Used by flood fill's tolerance check.
#[inline]
pub fn within_threshold(a: Rgba, b: Rgba, threshold: u8) -> bool {
    let diff = |x: u8, y: u8| x.abs_diff(y);
    diff(a.0, b.0) <= threshold
        && diff(a.1, b.1) <= threshold
        && diff(a.2, b.2) <= threshold
        && diff(a.3, b.3) <= threshold
}

/// Linear pixel index `(y * width + x) * 4` as a byte offset, or `None` if
/// `(x, y)` is outside `width x height`.
#[inline]
pub fn pixel_offset(x: u32, y: u32, width: u32, height: u32) -> Option<usize> {
    if x >= width || y >= height {
        return None;
    }
    Some((y as usize * width as usize + x as usize) * 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_roundtrip() {
        for color in [
            (0, 0, 0, 0),
            (255, 255, 255, 255),
            (255, 128, 64, 200),
            (1, 2, 3, 4),
        ] {
            assert_eq!(packed_to_rgba(rgba_to_packed(color)), color);
        }
    }

    #[test]
    fn packed_layout_matches_spec() {
        // (A<<24)|(R<<16)|(G<<8)|B
        assert_eq!(rgba_to_packed((0x11, 0x22, 0x33, 0x44)), 0x4411_2233);
    }

    #[test]
    fn threshold_is_per_channel_and_inclusive() {
        assert!(within_threshold((10, 10, 10, 10), (15, 5, 10, 10), 5));
        assert!(!within_threshold((10, 10, 10, 10), (16, 10, 10, 10), 5));
    }

    #[test]
    fn offset_rejects_out_of_bounds() {
        assert_eq!(pixel_offset(3, 2, 4, 4), Some((2 * 4 + 3) * 4));
        assert_eq!(pixel_offset(4, 0, 4, 4), None);
        assert_eq!(pixel_offset(0, 4, 4, 4), None);
    }
}
