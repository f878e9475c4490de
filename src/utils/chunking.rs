// ============================================================================
// Chunk Decomposition
// Fixed-width slices of native integers and float significands
// ============================================================================

use arrayvec::ArrayVec;
use smallvec::SmallVec;

/// Width of an integer chunk in bits.
pub const INT_CHUNK_BITS: u32 = 16;

/// Width of a float significand chunk in bits.
pub const FLOAT_CHUNK_BITS: u32 = 30;

/// A slice of a binary significand: the value `bits × 2^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatChunk {
    pub bits: u32,
    pub exponent: i64,
}

/// Split a magnitude into 16-bit chunks, least significant first.
///
/// Chunk `i` contributes `chunk << (16 * i)`. Zero yields no chunks.
pub fn int_chunks(mut magnitude: u128) -> SmallVec<[u16; 8]> {
    let mut chunks = SmallVec::new();
    while magnitude != 0 {
        chunks.push((magnitude & 0xffff) as u16);
        magnitude >>= INT_CHUNK_BITS;
    }
    chunks
}

/// Split the significand `mantissa × 2^exponent` into 30-bit chunks, most
/// significant first.
///
/// Mirrors taking the frexp fraction, scaling it by 2^30, peeling off the
/// integer part and repeating until nothing remains.
pub fn float_chunks(mantissa: u64, exponent: i64) -> ArrayVec<FloatChunk, 3> {
    let mut chunks = ArrayVec::new();
    if mantissa == 0 {
        return chunks;
    }
    let width = 64 - mantissa.leading_zeros();
    // fraction = remaining / 2^denominator_bits, value = fraction × 2^scale
    let mut scale = exponent + i64::from(width);
    let mut remaining = mantissa;
    let mut denominator_bits = width;
    while remaining != 0 {
        scale -= i64::from(FLOAT_CHUNK_BITS);
        let bits = if denominator_bits > FLOAT_CHUNK_BITS {
            let shift = denominator_bits - FLOAT_CHUNK_BITS;
            let top = remaining >> shift;
            remaining -= top << shift;
            denominator_bits = shift;
            top
        } else {
            let top = remaining << (FLOAT_CHUNK_BITS - denominator_bits);
            remaining = 0;
            top
        };
        chunks.push(FloatChunk {
            bits: bits as u32,
            exponent: scale,
        });
    }
    chunks
}
