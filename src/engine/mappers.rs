//! Адаптеры обобщённой коллекции к событию конкретного типа.
//!
//! Маппер не хранит состояния: он только выбирает вариант [`Event`] и, для
//! упакованных кодировок, придаёт плоской последовательности [`Scalar`]
//! форму элемента своего типа.

use rdbstream_error::{RdbError, RdbResult};

use super::events::{CollectionData, CollectionEntry, CollectionHead, Event};
use crate::database::{HashField, Scalar, ScoredValue};

pub trait CollectionMapper {
    type Value;

    fn map_head(
        &self,
        head: CollectionHead,
    ) -> Event;

    fn map_entry(
        &self,
        entry: CollectionEntry<Self::Value>,
    ) -> Event;

    fn map_slice(
        &self,
        data: CollectionData<Self::Value>,
    ) -> Event;

    /// Форма элементов из плоского вывода упакованного декодера.
    fn shape(
        &self,
        values: Vec<Scalar>,
    ) -> RdbResult<Vec<Self::Value>>;
}

pub struct ListMapper;
pub struct SetMapper;
pub struct SortedSetMapper;
pub struct HashMapper;

impl CollectionMapper for ListMapper {
    type Value = Scalar;

    fn map_head(
        &self,
        head: CollectionHead,
    ) -> Event {
        Event::ListHead(head)
    }

    fn map_entry(
        &self,
        entry: CollectionEntry<Scalar>,
    ) -> Event {
        Event::ListEntry(entry)
    }

    fn map_slice(
        &self,
        data: CollectionData<Scalar>,
    ) -> Event {
        Event::ListData(data)
    }

    fn shape(
        &self,
        values: Vec<Scalar>,
    ) -> RdbResult<Vec<Scalar>> {
        Ok(values)
    }
}

impl CollectionMapper for SetMapper {
    type Value = Scalar;

    fn map_head(
        &self,
        head: CollectionHead,
    ) -> Event {
        Event::SetHead(head)
    }

    fn map_entry(
        &self,
        entry: CollectionEntry<Scalar>,
    ) -> Event {
        Event::SetEntry(entry)
    }

    fn map_slice(
        &self,
        data: CollectionData<Scalar>,
    ) -> Event {
        Event::SetData(data)
    }

    fn shape(
        &self,
        values: Vec<Scalar>,
    ) -> RdbResult<Vec<Scalar>> {
        Ok(values)
    }
}

impl CollectionMapper for SortedSetMapper {
    type Value = ScoredValue;

    fn map_head(
        &self,
        head: CollectionHead,
    ) -> Event {
        Event::SortedSetHead(head)
    }

    fn map_entry(
        &self,
        entry: CollectionEntry<ScoredValue>,
    ) -> Event {
        Event::SortedSetEntry(entry)
    }

    fn map_slice(
        &self,
        data: CollectionData<ScoredValue>,
    ) -> Event {
        Event::SortedSetData(data)
    }

    /// Пары `member, score`; оценка — целое или десятичный текст.
    fn shape(
        &self,
        values: Vec<Scalar>,
    ) -> RdbResult<Vec<ScoredValue>> {
        let mut out = Vec::with_capacity(values.len() / 2);
        for (member, score) in pairs(values, "sorted set")? {
            let score = score.to_f64().ok_or_else(|| {
                RdbError::corrupt("sorted set", format!("unparseable score {score}"))
            })?;
            out.push(ScoredValue { member, score });
        }
        Ok(out)
    }
}

impl CollectionMapper for HashMapper {
    type Value = HashField;

    fn map_head(
        &self,
        head: CollectionHead,
    ) -> Event {
        Event::HashHead(head)
    }

    fn map_entry(
        &self,
        entry: CollectionEntry<HashField>,
    ) -> Event {
        Event::HashEntry(entry)
    }

    fn map_slice(
        &self,
        data: CollectionData<HashField>,
    ) -> Event {
        Event::HashData(data)
    }

    fn shape(
        &self,
        values: Vec<Scalar>,
    ) -> RdbResult<Vec<HashField>> {
        Ok(pairs(values, "hash")?
            .map(|(field, value)| HashField { field, value })
            .collect())
    }
}

/// Соседние значения попарно; нечётное кол-во — повреждение.
fn pairs(
    values: Vec<Scalar>,
    structure: &'static str,
) -> RdbResult<impl Iterator<Item = (Scalar, Scalar)>> {
    if values.len() % 2 != 0 {
        return Err(RdbError::corrupt(
            structure,
            format!("odd number of packed values ({})", values.len()),
        )
        .into());
    }
    let mut it = values.into_iter();
    Ok(std::iter::from_fn(move || Some((it.next()?, it.next()?))))
}
