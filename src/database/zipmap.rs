//! Декодер zipmap — самой старой упакованной кодировки хеша.
//!
//! ```text
//! <zmlen:u8> (<len> field <len> <free:u8> value <free bytes>)... <0xFF>
//! ```
//!
//! Длины здесь свои: один байт `0..=253`, либо `254` и четыре байта LE.
//! Значения всегда строковые.

use rdbstream_error::RdbResult;

use super::{cursor::SliceCursor, Scalar};

const ZIPMAP_BIGLEN: u8 = 254;
const ZIPMAP_END: u8 = 255;

/// Разбирает zipmap в плоскую последовательность `field, value, ...`.
pub fn decode(blob: &[u8]) -> RdbResult<Vec<Scalar>> {
    let mut cur = SliceCursor::new(blob, "zipmap");

    // zmlen достоверен только ниже 254, поэтому идём до терминатора.
    let _zmlen = cur.u8()?;
    let mut values = Vec::new();

    while cur.peek()? != ZIPMAP_END {
        let field_len = read_len(&mut cur)?;
        let field = cur.take_bytes(field_len)?;

        if cur.peek()? == ZIPMAP_END {
            return Err(cur.corrupt("field without value").into());
        }
        let value_len = read_len(&mut cur)?;
        let free = cur.u8()? as usize;
        let value = cur.take_bytes(value_len)?;
        cur.skip(free)?;

        values.push(Scalar::Bytes(field));
        values.push(Scalar::Bytes(value));
    }

    cur.expect_terminator()?;
    Ok(values)
}

fn read_len(cur: &mut SliceCursor<'_>) -> RdbResult<usize> {
    match cur.u8()? {
        ZIPMAP_BIGLEN => cur.u32_le().map(|v| v as usize),
        ZIPMAP_END => Err(cur.corrupt("terminator in place of length").into()),
        len => Ok(len as usize),
    }
}

#[cfg(test)]
mod tests {
    use rdbstream_error::ErrorKind;

    use super::*;

    fn push_len(
        out: &mut Vec<u8>,
        len: usize,
    ) {
        if len < ZIPMAP_BIGLEN as usize {
            out.push(len as u8);
        } else {
            out.push(ZIPMAP_BIGLEN);
            out.extend_from_slice(&(len as u32).to_le_bytes());
        }
    }

    fn build(
        pairs: &[(&[u8], &[u8], u8)],
        terminate: bool,
    ) -> Vec<u8> {
        let mut out = vec![pairs.len() as u8];
        for (field, value, free) in pairs {
            push_len(&mut out, field.len());
            out.extend_from_slice(field);
            push_len(&mut out, value.len());
            out.push(*free);
            out.extend_from_slice(value);
            out.extend(std::iter::repeat(0u8).take(*free as usize));
        }
        if terminate {
            out.push(ZIPMAP_END);
        }
        out
    }

    /// Тест проверяет пары и пропуск свободных байт после значения.
    #[test]
    fn test_pairs_with_free_space() {
        let blob = build(&[(b"foo", b"bar", 2), (b"hello", b"world", 0)], true);
        assert_eq!(
            decode(&blob).unwrap(),
            vec![
                Scalar::from("foo"),
                Scalar::from("bar"),
                Scalar::from("hello"),
                Scalar::from("world"),
            ]
        );
    }

    /// Тест проверяет длинное значение с 5-байтной длиной.
    #[test]
    fn test_big_length() {
        let big = vec![b'v'; 300];
        let blob = build(&[(b"k", &big, 0)], true);
        let values = decode(&blob).unwrap();
        assert_eq!(values[1], Scalar::from(big));
    }

    /// Тест проверяет пустой zipmap.
    #[test]
    fn test_empty() {
        assert!(decode(&[0, ZIPMAP_END]).unwrap().is_empty());
    }

    /// Тест проверяет отсутствие терминатора.
    #[test]
    fn test_unterminated() {
        let blob = build(&[(b"a", b"b", 0)], false);
        let err = decode(&blob).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::CorruptData));
    }
}
