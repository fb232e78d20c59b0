//! Строки дампа: обычные, целочисленные и LZF-сжатые.

use std::io::Read;

use bytes::Bytes;
use rdbstream_error::{RdbError, RdbResult};

use super::{
    compression::decompress,
    length::{read_length, read_plain_length, Length, StringEncoding},
    source::Source,
};
use crate::database::Scalar;

/// Читает строку в позиции значения: встроенные целые остаются числом.
pub fn read_scalar<R: Read>(src: &mut Source<R>) -> RdbResult<Scalar> {
    match read_length(src)? {
        Length::Len(len) => src.read_bytes(len, "string").map(Scalar::Bytes),
        Length::Encoded(StringEncoding::Int8) => {
            let b = src.read_u8("int8 string")?;
            Ok(Scalar::Int(i64::from(b as i8)))
        }
        Length::Encoded(StringEncoding::Int16) => {
            let b = src.read_array::<2>("int16 string")?;
            Ok(Scalar::Int(i64::from(i16::from_le_bytes(b))))
        }
        Length::Encoded(StringEncoding::Int32) => {
            let b = src.read_array::<4>("int32 string")?;
            Ok(Scalar::Int(i64::from(i32::from_le_bytes(b))))
        }
        Length::Encoded(StringEncoding::Lzf) => read_lzf(src).map(Scalar::Bytes),
    }
}

/// Читает строку как байты; целые превращаются в десятичный текст.
///
/// Используется для ключей и AUX-полей.
pub fn read_string<R: Read>(src: &mut Source<R>) -> RdbResult<Bytes> {
    match read_scalar(src)? {
        Scalar::Bytes(b) => Ok(b),
        Scalar::Int(i) => Ok(Bytes::from(i.to_string())),
    }
}

fn read_lzf<R: Read>(src: &mut Source<R>) -> RdbResult<Bytes> {
    let start = src.offset();
    let clen = read_plain_length(src, "lzf compressed length")?;
    let ulen = read_plain_length(src, "lzf original length")?;
    let ulen = src.check_len("lzf original length", ulen)?;
    let compressed = src.read_bytes(clen, "lzf block")?;

    decompress(&compressed, ulen)
        .map(Bytes::from)
        .map_err(|e| e.map_rdb(|rdb| rdb.with_offset(start)))
}

/// Пропускает строку, не материализуя её.
pub fn skip_string<R: Read>(src: &mut Source<R>) -> RdbResult<()> {
    match read_length(src)? {
        Length::Len(len) => src.skip(len, "string"),
        Length::Encoded(StringEncoding::Int8) => src.skip(1, "int8 string"),
        Length::Encoded(StringEncoding::Int16) => src.skip(2, "int16 string"),
        Length::Encoded(StringEncoding::Int32) => src.skip(4, "int32 string"),
        Length::Encoded(StringEncoding::Lzf) => {
            let clen = read_plain_length(src, "lzf compressed length")?;
            let _ulen = read_plain_length(src, "lzf original length")?;
            src.skip(clen, "lzf block")
        }
    }
}

/// Строка как текст UTF-8 (для чисел в тексте и AUX-значений).
pub fn bytes_to_utf8(
    bytes: &[u8],
    what: &str,
) -> RdbResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| RdbError::corrupt(what, format!("invalid UTF-8: {e}")).into())
}
