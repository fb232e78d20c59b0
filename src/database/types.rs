use std::{borrow::Cow, fmt};

use bytes::Bytes;

/// Примитивное значение элемента коллекции.
///
/// Закрытый набор видов: байтовая строка или целое. Упакованные кодировки
/// (ziplist, listpack, intset) хранят целые отдельно от строк, и это различие
/// сохраняется; строки с целочисленной кодировкой в основном потоке тоже
/// приходят как [`Scalar::Int`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// Бинарно-безопасная строка.
    Bytes(Bytes),
    /// Целое со знаком.
    Int(i64),
}

/// Пара поле–значение хеша.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HashField {
    pub field: Scalar,
    pub value: Scalar,
}

/// Элемент упорядоченного множества.
///
/// Старый текстовый и новый бинарный формат оценки приводятся к `f64`,
/// включая `±inf` и `NaN`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredValue {
    pub member: Scalar,
    pub score: f64,
}

impl Scalar {
    /// Байтовое представление; целые отдаются десятичным текстом.
    pub fn as_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Scalar::Bytes(b) => Cow::Borrowed(b.as_ref()),
            Scalar::Int(i) => Cow::Owned(i.to_string().into_bytes()),
        }
    }

    /// Числовое значение для оценки в упакованном zset.
    ///
    /// Строки разбираются как десятичный текст (`"1.5"`, `"inf"`, `"-inf"`).
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Bytes(b) => std::str::from_utf8(b).ok()?.trim().parse::<f64>().ok(),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<&'static str> for Scalar {
    fn from(v: &'static str) -> Self {
        Scalar::Bytes(Bytes::from_static(v.as_bytes()))
    }
}

impl From<Vec<u8>> for Scalar {
    fn from(v: Vec<u8>) -> Self {
        Scalar::Bytes(Bytes::from(v))
    }
}

impl From<Bytes> for Scalar {
    fn from(v: Bytes) -> Self {
        Scalar::Bytes(v)
    }
}

impl fmt::Display for Scalar {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Scalar::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Scalar::Int(i) => write!(f, "{i}"),
        }
    }
}

impl HashField {
    pub fn new(
        field: impl Into<Scalar>,
        value: impl Into<Scalar>,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl ScoredValue {
    pub fn new(
        member: impl Into<Scalar>,
        score: f64,
    ) -> Self {
        Self {
            member: member.into(),
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет текстовое представление целого.
    #[test]
    fn test_int_as_bytes() {
        assert_eq!(Scalar::Int(-42).as_bytes().as_ref(), b"-42");
        assert_eq!(Scalar::from("abc").as_bytes().as_ref(), b"abc");
    }

    /// Тест проверяет разбор оценки из обоих видов значений.
    #[test]
    fn test_to_f64() {
        assert_eq!(Scalar::Int(3).to_f64(), Some(3.0));
        assert_eq!(Scalar::from("1.5").to_f64(), Some(1.5));
        assert_eq!(Scalar::from("-inf").to_f64(), Some(f64::NEG_INFINITY));
        assert_eq!(Scalar::from("abc").to_f64(), None);
    }
}
