//! Test utilities for resources archives
//!
//! The [`resource_builder`] module writes small but structurally complete
//! `IDCL` containers, and [`TestCodec`] stands in for Oodle so compressed
//! entries can be exercised without the proprietary runtime.

pub mod resource_builder;

pub use resource_builder::ResourceArchiveBuilder;

use crate::compression::Codec;
use crate::error::{Error, Result};

/// Tag prepended by [`TestCodec::compress`]
pub const TEST_CODEC_TAG: &[u8; 4] = b"TCMP";

/// Reversible codec that frames data with a 4-byte tag
///
/// The "compressed" form is always longer than the input, so archives built
/// with it take the decompression path on extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestCodec;

impl Codec for TestCodec {
    fn name(&self) -> &str {
        "test"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len() + TEST_CODEC_TAG.len());
        out.extend_from_slice(TEST_CODEC_TAG);
        out.extend_from_slice(data);
        Ok(out)
    }

    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
        let body = data
            .strip_prefix(TEST_CODEC_TAG.as_slice())
            .ok_or_else(|| Error::decompression("missing test codec tag"))?;
        if body.len() != expected_size {
            return Err(Error::SizeMismatch {
                expected: expected_size as u64,
                actual: body.len() as u64,
            });
        }
        Ok(body.to_vec())
    }
}
