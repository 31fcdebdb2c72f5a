//! The `ImageCodec` boundary: raw RGBA8 <-> WebP/PNG. This crate only consumes
//! this interface (per the non-goal on codec internals); [`WebpPngCodec`] is
//! the default adapter so the crate is usable standalone, but `Anvil` stays
//! generic over any `C: ImageCodec` a host wants to supply instead.

use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeFailure;

impl Display for DecodeFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "failed to decode image bytes")
    }
}

impl std::error::Error for DecodeFailure {}

/// Raw RGBA8 <-> encoded-bytes conversions. `webp_to_raw`/`png_to_raw` must
/// always return exactly `4 * width * height` bytes on success.
pub trait ImageCodec {
    fn raw_to_webp(&self, rgba: &[u8], width: u32, height: u32) -> Vec<u8>;
    fn webp_to_raw(&self, bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>, DecodeFailure>;

    fn raw_to_png(&self, rgba: &[u8], width: u32, height: u32) -> Vec<u8>;
    fn png_to_raw(&self, bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>, DecodeFailure>;
}

/// Default [`ImageCodec`]: lossless WebP via the `webp` crate, PNG via the
/// teacher's own `png` dependency (see `internals::image::PngImage` in the
/// codebase this crate grew out of).
#[derive(Debug, Default, Clone, Copy)]
pub struct WebpPngCodec;

impl ImageCodec for WebpPngCodec {
    #[cfg(feature = "webp")]
    fn raw_to_webp(&self, rgba: &[u8], width: u32, height: u32) -> Vec<u8> {
        webp::Encoder::from_rgba(rgba, width, height)
            .encode_lossless()
            .to_vec()
    }

    #[cfg(not(feature = "webp"))]
    fn raw_to_webp(&self, rgba: &[u8], _width: u32, _height: u32) -> Vec<u8> {
        rgba.to_vec()
    }

    #[cfg(feature = "webp")]
    fn webp_to_raw(
        &self,
        bytes: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, DecodeFailure> {
        let decoded = webp::Decoder::new(bytes).decode().ok_or(DecodeFailure)?;
        let decoded: Vec<u8> = decoded.to_vec();
        let expected = (width as usize) * (height as usize) * 4;
        if decoded.len() != expected {
            log::warn!(
                "webp decode returned {} bytes, expected {expected}",
                decoded.len()
            );
            return Err(DecodeFailure);
        }
        Ok(decoded)
    }

    #[cfg(not(feature = "webp"))]
    fn webp_to_raw(
        &self,
        bytes: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, DecodeFailure> {
        let expected = (width as usize) * (height as usize) * 4;
        if bytes.len() != expected {
            return Err(DecodeFailure);
        }
        Ok(bytes.to_vec())
    }

    #[cfg(feature = "png")]
    fn raw_to_png(&self, rgba: &[u8], width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            match encoder.write_header() {
                Ok(mut writer) => {
                    if let Err(err) = writer.write_image_data(rgba) {
                        log::warn!("png encode failed: {err}");
                    }
                }
                Err(err) => log::warn!("png header write failed: {err}"),
            }
        }
        out
    }

    #[cfg(not(feature = "png"))]
    fn raw_to_png(&self, rgba: &[u8], _width: u32, _height: u32) -> Vec<u8> {
        rgba.to_vec()
    }

    #[cfg(feature = "png")]
    fn png_to_raw(&self, bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>, DecodeFailure> {
        let decoder = png::Decoder::new(bytes);
        let mut reader = decoder.read_info().map_err(|_| DecodeFailure)?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).map_err(|_| DecodeFailure)?;
        buf.truncate(info.buffer_size());

        let expected = (width as usize) * (height as usize) * 4;
        if buf.len() != expected || info.color_type != png::ColorType::Rgba {
            log::warn!("png decode shape mismatch: expected {expected} rgba bytes");
            return Err(DecodeFailure);
        }
        Ok(buf)
    }

    #[cfg(not(feature = "png"))]
    fn png_to_raw(
        &self,
        bytes: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, DecodeFailure> {
        let expected = (width as usize) * (height as usize) * 4;
        if bytes.len() != expected {
            return Err(DecodeFailure);
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(all(test, feature = "webp", feature = "png"))]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; (width * height * 4) as usize];
        for (i, px) in bytes.chunks_exact_mut(4).enumerate() {
            let on = i % 2 == 0;
            px.copy_from_slice(&if on { [255, 0, 0, 255] } else { [0, 0, 0, 0] });
        }
        bytes
    }

    #[test]
    fn webp_roundtrip_is_lossless() {
        let codec = WebpPngCodec;
        let raw = checkerboard(8, 8);
        let packed = codec.raw_to_webp(&raw, 8, 8);
        let decoded = codec.webp_to_raw(&packed, 8, 8).unwrap();
        assert_eq!(decoded, raw);
    }

    #[test]
    fn png_roundtrip_is_lossless() {
        let codec = WebpPngCodec;
        let raw = checkerboard(8, 8);
        let packed = codec.raw_to_png(&raw, 8, 8);
        let decoded = codec.png_to_raw(&packed, 8, 8).unwrap();
        assert_eq!(decoded, raw);
    }

    #[test]
    fn webp_decode_rejects_wrong_dimensions() {
        let codec = WebpPngCodec;
        let raw = checkerboard(8, 8);
        let packed = codec.raw_to_webp(&raw, 8, 8);
        assert!(codec.webp_to_raw(&packed, 4, 4).is_err());
    }
}
