//! Element decoding from raw `.npy` data bytes
//!
//! Every supported element type is widened to `f64` for normalization.
//! 64-bit integers beyond 2^53 lose precision, which is irrelevant once the
//! values are rescaled to 8 bits.

use super::dtype::{ByteOrder, Dtype, ElementType};

macro_rules! decode_as {
    ($bytes:expr, $order:expr, $ty:ty) => {{
        const SIZE: usize = std::mem::size_of::<$ty>();
        $bytes
            .chunks_exact(SIZE)
            .map(|chunk| {
                let mut raw = [0u8; SIZE];
                raw.copy_from_slice(chunk);
                let value = match $order {
                    ByteOrder::Little => <$ty>::from_le_bytes(raw),
                    ByteOrder::Big => <$ty>::from_be_bytes(raw),
                };
                value as f64
            })
            .collect::<Vec<f64>>()
    }};
}

/// Decode `bytes` (exactly `count * size` long) into `f64` values
#[must_use]
pub fn decode_to_f64(bytes: &[u8], dtype: Dtype) -> Vec<f64> {
    let order = dtype.order;
    match dtype.element {
        ElementType::Bool => bytes.iter().map(|&b| if b == 0 { 0.0 } else { 1.0 }).collect(),
        ElementType::U8 => bytes.iter().map(|&b| f64::from(b)).collect(),
        ElementType::I8 => bytes.iter().map(|&b| f64::from(b as i8)).collect(),
        ElementType::I16 => decode_as!(bytes, order, i16),
        ElementType::U16 => decode_as!(bytes, order, u16),
        ElementType::I32 => decode_as!(bytes, order, i32),
        ElementType::U32 => decode_as!(bytes, order, u32),
        ElementType::I64 => decode_as!(bytes, order, i64),
        ElementType::U64 => decode_as!(bytes, order, u64),
        ElementType::F32 => decode_as!(bytes, order, f32),
        ElementType::F64 => decode_as!(bytes, order, f64),
    }
}

/// Convert a decoded value to `u8` with saturation.
///
/// NaN maps to 0. Fractional values are truncated.
#[inline]
#[must_use]
pub fn saturate_u8(value: f64) -> u8 {
    // `as` casts from float saturate at the bounds and map NaN to 0
    value as u8
}
