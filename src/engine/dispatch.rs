//! Статическая таблица: тег типа → семейство и раскладка значения.

use rdbstream_error::{EncodingSite, RdbError};

use super::{readers::ScoreFormat, tags::*};

/// Тип данных записи; определяет читателя и маппер.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    String,
    List,
    Set,
    SortedSet(ScoreFormat),
    Hash,
}

/// Упакованная кодировка, хранящаяся одним блобом.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackedEncoding {
    Zipmap,
    Ziplist,
    Intset,
    Listpack,
    /// Узлы-ziplist
    Quicklist,
    /// Узлы с типом контейнера
    Quicklist2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Счётчик и элементы, читаемые по одному
    Plain,
    Packed(PackedEncoding),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub family: Family,
    pub layout: Layout,
}

const fn plain(family: Family) -> Dispatch {
    Dispatch {
        family,
        layout: Layout::Plain,
    }
}

const fn packed(
    family: Family,
    encoding: PackedEncoding,
) -> Dispatch {
    Dispatch {
        family,
        layout: Layout::Packed(encoding),
    }
}

/// Ищет тег в таблице. Смещение проставляет вызывающий.
pub fn lookup(tag: u8) -> Result<Dispatch, RdbError> {
    use PackedEncoding::*;

    let dispatch = match tag {
        TYPE_STRING => plain(Family::String),
        TYPE_LIST => plain(Family::List),
        TYPE_SET => plain(Family::Set),
        TYPE_ZSET => plain(Family::SortedSet(ScoreFormat::Text)),
        TYPE_HASH => plain(Family::Hash),
        TYPE_ZSET_2 => plain(Family::SortedSet(ScoreFormat::Binary)),
        TYPE_HASH_ZIPMAP => packed(Family::Hash, Zipmap),
        TYPE_LIST_ZIPLIST => packed(Family::List, Ziplist),
        TYPE_SET_INTSET => packed(Family::Set, Intset),
        TYPE_ZSET_ZIPLIST => packed(Family::SortedSet(ScoreFormat::Text), Ziplist),
        TYPE_HASH_ZIPLIST => packed(Family::Hash, Ziplist),
        TYPE_LIST_QUICKLIST => packed(Family::List, Quicklist),
        TYPE_HASH_LISTPACK => packed(Family::Hash, Listpack),
        TYPE_ZSET_LISTPACK => packed(Family::SortedSet(ScoreFormat::Text), Listpack),
        TYPE_LIST_QUICKLIST_2 => packed(Family::List, Quicklist2),
        TYPE_SET_LISTPACK => packed(Family::Set, Listpack),
        // модули, стримы, хеши с истечением полей и всё неизвестное
        other => return Err(RdbError::unsupported(EncodingSite::RecordTag, other)),
    };
    Ok(dispatch)
}
