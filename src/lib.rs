#![deny(unsafe_op_in_unsafe_fn)]
#![warn(rust_2018_idioms, clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::must_use_candidate,
    clippy::unreadable_literal,
    clippy::module_name_repetitions
)]

pub mod anvil;
pub mod buffer;
pub mod codec;
pub mod color;
pub mod diff;
pub mod tile;

pub use anvil::Anvil;
pub use buffer::{BoundBox, PixelBuffer};
pub use codec::{ImageCodec, WebpPngCodec};
pub use diff::patch::{ApplyMode, PackedDiffs};
pub use tile::{TileGrid, TileIndex};

use std::fmt::{self, Display, Formatter};

pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level error, aggregating the per-component errors that can surface
/// synchronously across the facade. See `buffer::Error` and `diff::Error` for
/// the component-local variants this wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A raw byte slice did not have length `width * height * 4`.
    BufferSizeMismatch { expected: usize, actual: usize },
    /// A partial diff's swap buffer did not match its bound box's area.
    PartialBufferSizeMismatch { expected: usize, actual: usize },
    /// `(x, y)` fell outside `[0, width) x [0, height)`.
    OutOfBounds { x: i64, y: i64, width: u32, height: u32 },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::BufferSizeMismatch { expected, actual } => write!(
                f,
                "buffer size mismatch: expected {expected} bytes, got {actual}"
            ),
            Error::PartialBufferSizeMismatch { expected, actual } => write!(
                f,
                "partial diff size mismatch: expected {expected} bytes, got {actual}"
            ),
            Error::OutOfBounds { x, y, width, height } => write!(
                f,
                "({x}, {y}) is out of bounds for a {width}x{height} buffer"
            ),
        }
    }
}

impl std::error::Error for Error {}

impl From<buffer::Error> for Error {
    fn from(err: buffer::Error) -> Self {
        match err {
            buffer::Error::SizeMismatch { expected, actual } => {
                Error::BufferSizeMismatch { expected, actual }
            }
        }
    }
}

impl From<diff::Error> for Error {
    fn from(err: diff::Error) -> Self {
        match err {
            diff::Error::PartialSizeMismatch { expected, actual } => {
                Error::PartialBufferSizeMismatch { expected, actual }
            }
        }
    }
}
