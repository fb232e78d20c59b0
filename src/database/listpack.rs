//! Декодер listpack — преемника ziplist в новых версиях дампа.
//!
//! ```text
//! <total:u32le> <count:u16le> (<encoding> [payload] <backlen>)... <0xFF>
//! ```
//!
//! В отличие от ziplist, длина элемента хранится после него (`backlen`,
//! 1–5 байт) и вычисляется из размера закодированного элемента.

use rdbstream_error::{EncodingSite, RdbError, RdbResult};

use super::{cursor::SliceCursor, Scalar};

const LISTPACK_HEADER_LEN: usize = 6;
const LISTPACK_UNKNOWN_COUNT: u16 = u16::MAX;

const LP_ENCODING_32BIT_STR: u8 = 0xF0;
const LP_ENCODING_16BIT_INT: u8 = 0xF1;
const LP_ENCODING_24BIT_INT: u8 = 0xF2;
const LP_ENCODING_32BIT_INT: u8 = 0xF3;
const LP_ENCODING_64BIT_INT: u8 = 0xF4;
const LP_EOF: u8 = 0xFF;

/// Разбирает listpack в упорядоченную последовательность значений.
pub fn decode(blob: &[u8]) -> RdbResult<Vec<Scalar>> {
    let mut cur = SliceCursor::new(blob, "listpack");

    let total = cur.u32_le()? as usize;
    let count = cur.u16_le()?;
    if total != blob.len() {
        return Err(cur
            .corrupt(format!(
                "header declares {total} bytes, blob has {}",
                blob.len()
            ))
            .into());
    }

    let capacity = (count as usize).min(blob.len().saturating_sub(LISTPACK_HEADER_LEN));
    let mut values = Vec::with_capacity(capacity);

    while cur.peek()? != LP_EOF {
        let start = cur.position();
        let value = read_entry(&mut cur)?;
        let entry_len = cur.position() - start;
        cur.skip(backlen_size(entry_len))?;
        values.push(value);
    }
    cur.expect_terminator()?;

    if count != LISTPACK_UNKNOWN_COUNT && count as usize != values.len() {
        return Err(cur
            .corrupt(format!(
                "header declares {count} entries, found {}",
                values.len()
            ))
            .into());
    }
    if !cur.is_empty() {
        return Err(cur
            .corrupt(format!("{} trailing bytes after terminator", cur.remaining()))
            .into());
    }

    Ok(values)
}

/// Размер поля `backlen` для элемента длиной `entry_len` байт.
pub fn backlen_size(entry_len: usize) -> usize {
    match entry_len {
        0..=127 => 1,
        128..=16_382 => 2,
        16_383..=2_097_150 => 3,
        2_097_151..=268_435_454 => 4,
        _ => 5,
    }
}

fn read_entry(cur: &mut SliceCursor<'_>) -> RdbResult<Scalar> {
    let enc = cur.u8()?;

    if enc & 0x80 == 0 {
        return Ok(Scalar::Int(i64::from(enc & 0x7F)));
    }
    if enc & 0xC0 == 0x80 {
        let len = (enc & 0x3F) as usize;
        return cur.take_bytes(len).map(Scalar::Bytes);
    }
    if enc & 0xE0 == 0xC0 {
        let uv = (((enc & 0x1F) as i64) << 8) | cur.u8()? as i64;
        let v = if uv >= 1 << 12 { uv - (1 << 13) } else { uv };
        return Ok(Scalar::Int(v));
    }
    if enc & 0xF0 == 0xE0 {
        let len = (((enc & 0x0F) as usize) << 8) | cur.u8()? as usize;
        return cur.take_bytes(len).map(Scalar::Bytes);
    }

    match enc {
        LP_ENCODING_32BIT_STR => {
            let len = cur.u32_le()? as usize;
            cur.take_bytes(len).map(Scalar::Bytes)
        }
        LP_ENCODING_16BIT_INT => cur.i16_le().map(|v| Scalar::Int(v.into())),
        LP_ENCODING_24BIT_INT => cur.i24_le().map(|v| Scalar::Int(v.into())),
        LP_ENCODING_32BIT_INT => cur.i32_le().map(|v| Scalar::Int(v.into())),
        LP_ENCODING_64BIT_INT => cur.i64_le().map(Scalar::Int),
        other => Err(RdbError::unsupported(EncodingSite::ListpackEntry, other).into()),
    }
}
