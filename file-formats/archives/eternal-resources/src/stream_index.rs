//! Stream index derivation
//!
//! Streamed geometry lives in `.streamdb` containers keyed by a secondary
//! 64-bit index. The engine derives it from the primary resource hash by
//! shuffling hex digits: swap the two nibbles of every byte, rotate the whole
//! value right by one nibble, swap the nibbles again and finally overwrite the
//! second-highest nibble with a digit taken from the LOD count.

/// Adjustment the converter uses; yields digit `0`
pub const DEFAULT_LOD_ADJUSTMENT: i32 = -6;

const LOW_NIBBLES: u64 = 0x0F0F_0F0F_0F0F_0F0F;
const LOD_DIGIT_SHIFT: u32 = 56;

fn swap_nibbles(value: u64) -> u64 {
    ((value & LOW_NIBBLES) << 4) | ((value >> 4) & LOW_NIBBLES)
}

/// Digit stored for a LOD adjustment
///
/// `6 + adjustment` is truncated to a signed byte and rendered in hex; the
/// second character of that rendering is the digit. Negative bytes print
/// sign-extended, so their second character is always `f`.
pub fn lod_digit(lod_adjustment: i32) -> u8 {
    let byte = 6i32.wrapping_add(lod_adjustment) as i8;
    if byte < 0 { 0xF } else { (byte as u8) & 0x0F }
}

/// Derive the stream index for a hash in its big-endian digit order
///
/// Pure and deterministic. `lod_adjustment` only affects the second hex digit
/// of the result.
pub fn derive_stream_index(resource_hash: u64, lod_adjustment: i32) -> u64 {
    let shuffled = swap_nibbles(swap_nibbles(resource_hash).rotate_right(4));
    let digit = u64::from(lod_digit(lod_adjustment));
    (shuffled & !(0xF << LOD_DIGIT_SHIFT)) | (digit << LOD_DIGIT_SHIFT)
}

/// Stream index for a hash as stored in an entry record
///
/// Entry hashes are little-endian on disk while the digit shuffle works on
/// the big-endian rendering, so the value is byte-swapped around
/// [`derive_stream_index`].
pub fn streamdb_index(resource_hash: u64, lod_adjustment: i32) -> u64 {
    derive_stream_index(resource_hash.swap_bytes(), lod_adjustment).swap_bytes()
}
