//! Декодер intset — отсортированного массива целых фиксированной ширины.
//!
//! ```text
//! <encoding:u32le> <length:u32le> <element:encoding bytes, LE>...
//! ```
//!
//! Ширина элемента — 2, 4 или 8 байт. Порядок возрастания не проверяется:
//! значения отдаются в том порядке, в котором лежат в блобе.

use rdbstream_error::RdbResult;

use super::{cursor::SliceCursor, Scalar};

/// Ширина элемента intset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Int16,
    Int32,
    Int64,
}

impl Encoding {
    fn from_width(width: u32) -> Option<Self> {
        match width {
            2 => Some(Encoding::Int16),
            4 => Some(Encoding::Int32),
            8 => Some(Encoding::Int64),
            _ => None,
        }
    }

    #[inline]
    pub fn width(self) -> usize {
        match self {
            Encoding::Int16 => 2,
            Encoding::Int32 => 4,
            Encoding::Int64 => 8,
        }
    }
}

/// Разбирает intset в значения в порядке хранения.
pub fn decode(blob: &[u8]) -> RdbResult<Vec<Scalar>> {
    let mut cur = SliceCursor::new(blob, "intset");

    let width = cur.u32_le()?;
    let enc = Encoding::from_width(width)
        .ok_or_else(|| cur.corrupt(format!("unsupported element width {width}")))?;
    let length = cur.u32_le()? as usize;

    let expected = length.checked_mul(enc.width());
    if expected != Some(cur.remaining()) {
        return Err(cur
            .corrupt(format!(
                "{length} elements of {} bytes do not fit {} remaining bytes",
                enc.width(),
                cur.remaining()
            ))
            .into());
    }

    let mut values = Vec::with_capacity(length);
    for _ in 0..length {
        let v = match enc {
            Encoding::Int16 => i64::from(cur.i16_le()?),
            Encoding::Int32 => i64::from(cur.i32_le()?),
            Encoding::Int64 => cur.i64_le()?,
        };
        values.push(Scalar::Int(v));
    }

    Ok(values)
}
