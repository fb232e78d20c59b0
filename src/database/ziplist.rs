//! Декодер ziplist — старой компактной кодировки списков, хешей и zset.
//!
//! ```text
//! <zlbytes:u32le> <zltail:u32le> <zllen:u16le> <entry>... <0xFF>
//! entry = <prevlen> <encoding> [payload]
//! ```
//!
//! `prevlen` нужен только для обхода с конца, при чтении вперёд он
//! пропускается. Целочисленные кодировки возвращаются как [`Scalar::Int`].

use rdbstream_error::{EncodingSite, RdbError, RdbResult};

use super::{cursor::SliceCursor, Scalar};

const ZIPLIST_HEADER_LEN: usize = 10;
/// `zllen` с этим значением означает «считать до терминатора».
const ZIPLIST_UNKNOWN_LEN: u16 = u16::MAX;
const PREVLEN_WIDE: u8 = 0xFE;

const ZIP_INT_16B: u8 = 0xC0;
const ZIP_INT_32B: u8 = 0xD0;
const ZIP_INT_64B: u8 = 0xE0;
const ZIP_INT_24B: u8 = 0xF0;
const ZIP_INT_8B: u8 = 0xFE;
const ZIP_IMM_MIN: u8 = 0xF1;
const ZIP_IMM_MAX: u8 = 0xFD;
const ZIP_END: u8 = 0xFF;

/// Разбирает ziplist целиком в упорядоченную последовательность значений.
pub fn decode(blob: &[u8]) -> RdbResult<Vec<Scalar>> {
    let mut cur = SliceCursor::new(blob, "ziplist");

    let zlbytes = cur.u32_le()? as usize;
    let _zltail = cur.u32_le()?;
    let zllen = cur.u16_le()?;

    if zlbytes != blob.len() {
        return Err(cur
            .corrupt(format!(
                "header declares {zlbytes} bytes, blob has {}",
                blob.len()
            ))
            .into());
    }

    let capacity = (zllen as usize).min(blob.len().saturating_sub(ZIPLIST_HEADER_LEN));
    let mut values = Vec::with_capacity(capacity);

    if zllen == ZIPLIST_UNKNOWN_LEN {
        while cur.peek()? != ZIP_END {
            values.push(read_entry(&mut cur)?);
        }
    } else {
        for _ in 0..zllen {
            values.push(read_entry(&mut cur)?);
        }
    }

    cur.expect_terminator()?;
    if !cur.is_empty() {
        return Err(cur
            .corrupt(format!("{} trailing bytes after terminator", cur.remaining()))
            .into());
    }

    Ok(values)
}

fn read_entry(cur: &mut SliceCursor<'_>) -> RdbResult<Scalar> {
    let prevlen = cur.u8()?;
    if prevlen == PREVLEN_WIDE {
        cur.skip(4)?;
    } else if prevlen == ZIP_END {
        return Err(cur.corrupt("terminator inside entry list").into());
    }

    let enc = cur.u8()?;
    match enc >> 6 {
        0b00 => {
            let len = (enc & 0x3F) as usize;
            cur.take_bytes(len).map(Scalar::Bytes)
        }
        0b01 => {
            let len = (((enc & 0x3F) as usize) << 8) | cur.u8()? as usize;
            cur.take_bytes(len).map(Scalar::Bytes)
        }
        0b10 => {
            if enc != 0x80 {
                return Err(RdbError::unsupported(EncodingSite::ZiplistEntry, enc).into());
            }
            let len = cur.u32_be()? as usize;
            cur.take_bytes(len).map(Scalar::Bytes)
        }
        _ => read_int(cur, enc).map(Scalar::Int),
    }
}

fn read_int(
    cur: &mut SliceCursor<'_>,
    enc: u8,
) -> RdbResult<i64> {
    match enc {
        ZIP_INT_16B => cur.i16_le().map(i64::from),
        ZIP_INT_32B => cur.i32_le().map(i64::from),
        ZIP_INT_64B => cur.i64_le(),
        ZIP_INT_24B => cur.i24_le().map(i64::from),
        ZIP_INT_8B => cur.u8().map(|b| i64::from(b as i8)),
        ZIP_IMM_MIN..=ZIP_IMM_MAX => Ok(i64::from(enc - ZIP_IMM_MIN)),
        ZIP_END => Err(cur.corrupt("terminator in place of entry encoding").into()),
        other => Err(RdbError::unsupported(EncodingSite::ZiplistEntry, other).into()),
    }
}
