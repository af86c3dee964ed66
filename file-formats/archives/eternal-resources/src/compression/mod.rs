//! Compression boundary
//!
//! Archive entries and streamed geometry are compressed with Oodle Kraken.
//! The library is proprietary and ships with the game, so it is loaded at
//! runtime and reached only through the [`Codec`] trait. Anything that needs
//! compressed data takes a `&dyn Codec`.

mod oodle;

pub use oodle::{OODLE_ENV_VAR, Oodle, OodleCompressor, OodleLevel};

use crate::error::Result;

/// A lossless block codec
pub trait Codec {
    /// Short name for diagnostics
    fn name(&self) -> &str;

    /// Compress a whole buffer
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress a buffer whose original length is known
    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>>;
}

impl<C: Codec + ?Sized> Codec for &C {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).compress(data)
    }

    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
        (**self).decompress(data, expected_size)
    }
}
