//! События, которые декодер отдаёт вызывающему коду.
//!
//! Для обычных (plain) коллекций: `*Head`, затем `*Entry` на каждый элемент.
//! Для упакованных: одно событие `*Data` со всеми значениями. Внутри одной
//! записи эти две формы никогда не смешиваются.

use bytes::Bytes;

use crate::database::{HashField, Scalar, ScoredValue};

/// Ключ записи с метаданными, действующими на момент её чтения.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    pub key: Bytes,
    /// Номер базы из последнего `SELECTDB`
    pub database: u64,
    /// Срок жизни, мс с эпохи Unix
    pub expiry: Option<u64>,
    /// Время простоя, секунды (LRU)
    pub idle: Option<u64>,
    /// Счётчик частоты (LFU)
    pub freq: Option<u8>,
}

/// Строковая запись.
#[derive(Debug, Clone, PartialEq)]
pub struct StringData {
    pub key: RecordKey,
    pub value: Scalar,
}

/// Заголовок plain-коллекции: объявленное кол-во элементов (или пар).
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionHead {
    pub key: RecordKey,
    pub length: u64,
}

/// Один элемент plain-коллекции.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionEntry<V> {
    pub key: RecordKey,
    pub value: V,
    /// Индекс с нуля, строго возрастает без пропусков
    pub index: u64,
    /// Полная длина коллекции из заголовка
    pub length: u64,
}

/// Упакованная коллекция целиком.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionData<V> {
    pub key: RecordKey,
    pub values: Vec<V>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    String(StringData),

    ListHead(CollectionHead),
    ListEntry(CollectionEntry<Scalar>),
    ListData(CollectionData<Scalar>),

    SetHead(CollectionHead),
    SetEntry(CollectionEntry<Scalar>),
    SetData(CollectionData<Scalar>),

    SortedSetHead(CollectionHead),
    SortedSetEntry(CollectionEntry<ScoredValue>),
    SortedSetData(CollectionData<ScoredValue>),

    HashHead(CollectionHead),
    HashEntry(CollectionEntry<HashField>),
    HashData(CollectionData<HashField>),
}

impl Event {
    /// Ключ записи, к которой относится событие.
    pub fn key(&self) -> &RecordKey {
        match self {
            Event::String(d) => &d.key,
            Event::ListHead(h) | Event::SetHead(h) | Event::SortedSetHead(h) | Event::HashHead(h) => {
                &h.key
            }
            Event::ListEntry(e) | Event::SetEntry(e) => &e.key,
            Event::SortedSetEntry(e) => &e.key,
            Event::HashEntry(e) => &e.key,
            Event::ListData(d) | Event::SetData(d) => &d.key,
            Event::SortedSetData(d) => &d.key,
            Event::HashData(d) => &d.key,
        }
    }

    /// Имя вида события (`"list_entry"`, `"hash_data"`, ...).
    pub fn kind(&self) -> &'static str {
        match self {
            Event::String(_) => "string",
            Event::ListHead(_) => "list_head",
            Event::ListEntry(_) => "list_entry",
            Event::ListData(_) => "list_data",
            Event::SetHead(_) => "set_head",
            Event::SetEntry(_) => "set_entry",
            Event::SetData(_) => "set_data",
            Event::SortedSetHead(_) => "sorted_set_head",
            Event::SortedSetEntry(_) => "sorted_set_entry",
            Event::SortedSetData(_) => "sorted_set_data",
            Event::HashHead(_) => "hash_head",
            Event::HashEntry(_) => "hash_entry",
            Event::HashData(_) => "hash_data",
        }
    }
}
