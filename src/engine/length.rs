//! Поле длины с переменной шириной.
//!
//! Два старших бита первого байта выбирают форму:
//! - `00xxxxxx`: 6 бит в самом байте
//! - `01xxxxxx xxxxxxxx`: 14 бит, big-endian
//! - `0x80` + 4 байта BE, `0x81` + 8 байт BE
//! - `11xxxxxx`: не длина, а специальная кодировка строки

use std::io::Read;

use byteorder::{BigEndian, ByteOrder};
use rdbstream_error::{EncodingSite, RdbError, RdbResult};

use super::source::Source;

const RDB_6BITLEN: u8 = 0;
const RDB_14BITLEN: u8 = 1;
const RDB_ENCVAL: u8 = 3;
const RDB_32BITLEN: u8 = 0x80;
const RDB_64BITLEN: u8 = 0x81;

/// Специальная кодировка строки из младших 6 бит.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    Int8,
    Int16,
    Int32,
    Lzf,
}

/// Результат чтения поля длины.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Len(u64),
    Encoded(StringEncoding),
}

pub fn read_length<R: Read>(src: &mut Source<R>) -> RdbResult<Length> {
    let start = src.offset();
    let first = src.read_u8("length")?;

    match first >> 6 {
        RDB_6BITLEN => Ok(Length::Len(u64::from(first & 0x3F))),
        RDB_14BITLEN => {
            let second = src.read_u8("14-bit length")?;
            Ok(Length::Len((u64::from(first & 0x3F) << 8) | u64::from(second)))
        }
        RDB_ENCVAL => match first & 0x3F {
            0 => Ok(Length::Encoded(StringEncoding::Int8)),
            1 => Ok(Length::Encoded(StringEncoding::Int16)),
            2 => Ok(Length::Encoded(StringEncoding::Int32)),
            3 => Ok(Length::Encoded(StringEncoding::Lzf)),
            _ => Err(RdbError::unsupported(EncodingSite::StringEncoding, first)
                .with_offset(start)
                .into()),
        },
        _ => match first {
            RDB_32BITLEN => {
                let b = src.read_array::<4>("32-bit length")?;
                Ok(Length::Len(u64::from(BigEndian::read_u32(&b))))
            }
            RDB_64BITLEN => {
                let b = src.read_array::<8>("64-bit length")?;
                Ok(Length::Len(BigEndian::read_u64(&b)))
            }
            other => Err(RdbError::corrupt(
                "length",
                format!("invalid length prefix 0x{other:02X}"),
            )
            .with_offset(start)
            .into()),
        },
    }
}

/// Длина там, где специальная кодировка недопустима (счётчики, подсказки).
pub fn read_plain_length<R: Read>(
    src: &mut Source<R>,
    what: &str,
) -> RdbResult<u64> {
    let start = src.offset();
    match read_length(src)? {
        Length::Len(len) => Ok(len),
        Length::Encoded(enc) => Err(RdbError::corrupt(
            "length",
            format!("{what}: expected plain length, found {enc:?} encoding"),
        )
        .with_offset(start)
        .into()),
    }
}
