//! Чтение одного элемента plain-коллекции прямо из потока.

use std::io::Read;

use rdbstream_error::RdbResult;

use super::{
    float::{read_binary_double, read_legacy_float},
    source::Source,
    string::read_scalar,
};
use crate::database::{HashField, Scalar, ScoredValue};

/// Формат оценки в plain-zset: тип 3 или тип 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreFormat {
    Text,
    Binary,
}

/// Читатель элемента; форма значения фиксирована типом.
pub trait ValueReader {
    type Value;

    fn read<R: Read>(
        &self,
        src: &mut Source<R>,
    ) -> RdbResult<Self::Value>;
}

/// Строка, элемент списка или множества.
pub struct ScalarReader;

/// Пара поле–значение хеша.
pub struct HashFieldReader;

/// Член упорядоченного множества и его оценка.
pub struct ScoredValueReader {
    pub score: ScoreFormat,
}

impl ValueReader for ScalarReader {
    type Value = Scalar;

    fn read<R: Read>(
        &self,
        src: &mut Source<R>,
    ) -> RdbResult<Scalar> {
        read_scalar(src)
    }
}

impl ValueReader for HashFieldReader {
    type Value = HashField;

    fn read<R: Read>(
        &self,
        src: &mut Source<R>,
    ) -> RdbResult<HashField> {
        let field = read_scalar(src)?;
        let value = read_scalar(src)?;
        Ok(HashField { field, value })
    }
}

impl ValueReader for ScoredValueReader {
    type Value = ScoredValue;

    fn read<R: Read>(
        &self,
        src: &mut Source<R>,
    ) -> RdbResult<ScoredValue> {
        let member = read_scalar(src)?;
        let score = match self.score {
            ScoreFormat::Text => read_legacy_float(src)?,
            ScoreFormat::Binary => read_binary_double(src)?,
        };
        Ok(ScoredValue { member, score })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn src(data: &[u8]) -> Source<Cursor<Vec<u8>>> {
        Source::new(Cursor::new(data.to_vec()), 64, 1 << 20)
    }

    /// Тест проверяет чтение пары хеша с целочисленным значением.
    #[test]
    fn test_hash_field() {
        let mut s = src(&[1, b'f', 0xC0, 42]);
        let field = HashFieldReader.read(&mut s).unwrap();
        assert_eq!(field, HashField::new("f", 42i64));
    }

    /// Тест проверяет оба формата оценки.
    #[test]
    fn test_scored_value_formats() {
        let mut s = src(&[1, b'm', 1, b'2']);
        let text = ScoredValueReader {
            score: ScoreFormat::Text,
        };
        assert_eq!(text.read(&mut s).unwrap(), ScoredValue::new("m", 2.0));

        let mut data = vec![1, b'n'];
        data.extend_from_slice(&(-0.5f64).to_le_bytes());
        let binary = ScoredValueReader {
            score: ScoreFormat::Binary,
        };
        assert_eq!(
            binary.read(&mut src(&data)).unwrap(),
            ScoredValue::new("n", -0.5)
        );
    }
}
