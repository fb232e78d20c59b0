//! Оценки упорядоченных множеств.
//!
//! Тип 3 хранит оценку текстом с однобайтной длиной и тремя
//! зарезервированными значениями длины; тип 5 хранит `f64` как 8 байт LE.

use std::io::Read;

use rdbstream_error::{RdbError, RdbResult};

use super::{source::Source, string::bytes_to_utf8};

const R_NAN: u8 = 253;
const R_POS_INF: u8 = 254;
const R_NEG_INF: u8 = 255;

pub fn read_legacy_float<R: Read>(src: &mut Source<R>) -> RdbResult<f64> {
    let start = src.offset();
    match src.read_u8("float length")? {
        R_NAN => Ok(f64::NAN),
        R_POS_INF => Ok(f64::INFINITY),
        R_NEG_INF => Ok(f64::NEG_INFINITY),
        len => {
            let raw = src.read_bytes(u64::from(len), "float text")?;
            let text = bytes_to_utf8(&raw, "float")?;
            text.trim().parse::<f64>().map_err(|_| {
                RdbError::corrupt("float", format!("unparseable score {text:?}"))
                    .with_offset(start)
                    .into()
            })
        }
    }
}

/// Бинарный `f64`, бит в бит (включая знак нуля и NaN payload).
pub fn read_binary_double<R: Read>(src: &mut Source<R>) -> RdbResult<f64> {
    src.read_array::<8>("binary double")
        .map(f64::from_le_bytes)
}
