//! Pull-декодер дампа: одно событие на каждый вызов.
//!
//! # Состояния
//!
//! ```text
//! Header ──► RecordLoop ──► Done
//!               │  ▲
//!               ▼  │
//!             Entries        (plain-коллекция, по элементу за вызов)
//!
//! любая ошибка ──► Failed
//! ```
//!
//! Управляющие опкоды (`SELECTDB`, `EXPIRETIME`, `AUX`, ...) событий не
//! порождают: они меняют состояние декодера или метаданные следующей записи.
//! Упакованные коллекции читаются целиком и отдаются одним событием `*Data`.

use std::{
    io::Read,
    iter::FusedIterator,
    mem,
};

use bytes::Bytes;
use rdbstream_error::{RdbError, RdbResult, ResultExt, StackError};
use tracing::{debug, trace, warn};

use super::{
    dispatch::{lookup, Dispatch, Family, Layout, PackedEncoding},
    events::{CollectionData, CollectionEntry, CollectionHead, Event, RecordKey, StringData},
    length::read_plain_length,
    mappers::{CollectionMapper, HashMapper, ListMapper, SetMapper, SortedSetMapper},
    readers::{HashFieldReader, ScalarReader, ScoredValueReader, ValueReader},
    source::Source,
    string::{read_scalar, read_string, skip_string},
    tags::*,
};
use crate::{
    config::{ChecksumPolicy, DecoderConfig},
    database::{intset, listpack, ziplist, zipmap, QuickList, QuicklistNode, Scalar},
};

/// Подсказка размеров из `RESIZEDB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeHint {
    pub db_size: u64,
    pub expires_size: u64,
}

/// Итог сверки контрольной суммы после `EOF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumStatus {
    /// Версия дампа ниже 5, суммы нет
    Absent,
    /// Записан ноль: сервер сохранял без суммы
    Disabled,
    /// Сумма прочитана, сверка отключена политикой
    Skipped,
    Verified,
    /// Не совпала при политике `warn`
    Mismatch { computed: u64, recorded: u64 },
}

/// Статистика декодирования.
#[derive(Debug, Clone, Default)]
pub struct DecodeStats {
    /// Кол-во байт прочитано
    pub bytes_read: u64,
    /// Кол-во прочитанных записей верхнего уровня
    pub records_parsed: u64,
    /// Кол-во отданных событий
    pub events_emitted: u64,
}

/// Метаданные, накопленные опкодами до следующей записи.
#[derive(Debug, Default)]
struct PendingMeta {
    expiry: Option<u64>,
    idle: Option<u64>,
    freq: Option<u8>,
}

struct PlainCursor {
    key: RecordKey,
    family: Family,
    index: u64,
    length: u64,
}

enum State {
    Header,
    RecordLoop,
    Entries(PlainCursor),
    Done,
    Failed,
}

/// Потоковый декодер дампа поверх любого `Read`.
///
/// ```no_run
/// use std::fs::File;
///
/// use rdbstream::Decoder;
///
/// let file = File::open("dump.rdb").unwrap();
/// for event in Decoder::new(file) {
///     println!("{:?}", event.unwrap().key());
/// }
/// ```
pub struct Decoder<R: Read> {
    src: Source<R>,
    config: DecoderConfig,
    state: State,
    version: Option<u32>,
    database: u64,
    pending: PendingMeta,
    aux: Vec<(Bytes, Bytes)>,
    resize_hint: Option<ResizeHint>,
    checksum: Option<ChecksumStatus>,
    stats: DecodeStats,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, DecoderConfig::default())
    }

    pub fn with_config(
        reader: R,
        config: DecoderConfig,
    ) -> Self {
        Self {
            src: Source::new(reader, config.buffer_capacity, config.max_blob_len),
            config,
            state: State::Header,
            version: None,
            database: 0,
            pending: PendingMeta::default(),
            aux: Vec::new(),
            resize_hint: None,
            checksum: None,
            stats: DecodeStats::default(),
        }
    }

    /// Версия формата из заголовка (после первого вызова).
    pub fn version(&self) -> Option<u32> {
        self.version
    }

    /// AUX-поля в порядке появления.
    pub fn aux_fields(&self) -> &[(Bytes, Bytes)] {
        &self.aux
    }

    /// Последняя подсказка `RESIZEDB`.
    pub fn resize_hint(&self) -> Option<ResizeHint> {
        self.resize_hint
    }

    /// Результат сверки суммы; `None`, пока не достигнут `EOF`.
    pub fn checksum_status(&self) -> Option<ChecksumStatus> {
        self.checksum
    }

    pub fn stats(&self) -> DecodeStats {
        DecodeStats {
            bytes_read: self.src.offset(),
            ..self.stats.clone()
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Done | State::Failed)
    }

    pub fn into_inner(self) -> R {
        self.src.into_inner()
    }

    /// Следующее событие.
    ///
    /// `Ok(None)` — дамп закончился. После ошибки все последующие вызовы
    /// тоже возвращают `Ok(None)` и источник больше не читают.
    pub fn next_event(&mut self) -> RdbResult<Option<Event>> {
        match self.step() {
            Ok(Some(event)) => {
                self.stats.events_emitted += 1;
                Ok(Some(event))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                self.state = State::Failed;
                debug!(
                    offset = err.rdb_error().and_then(RdbError::offset),
                    stream_offset = self.src.offset(),
                    status = %err.status_code(),
                    error = %err,
                    "decoding failed"
                );
                Err(err)
            }
        }
    }

    fn step(&mut self) -> RdbResult<Option<Event>> {
        loop {
            match mem::replace(&mut self.state, State::Failed) {
                State::Header => {
                    self.read_header()?;
                    self.state = State::RecordLoop;
                }
                State::RecordLoop => {
                    self.state = State::RecordLoop;
                    if let Some(event) = self.read_record_or_opcode()? {
                        return Ok(Some(event));
                    }
                }
                State::Entries(mut cursor) => {
                    if cursor.index >= cursor.length {
                        self.state = State::RecordLoop;
                        continue;
                    }
                    let event = self.read_entry(&mut cursor)?;
                    self.state = State::Entries(cursor);
                    return Ok(Some(event));
                }
                State::Done => {
                    self.state = State::Done;
                    return Ok(None);
                }
                State::Failed => return Ok(None),
            }
        }
    }

    fn read_header(&mut self) -> RdbResult<()> {
        let magic = self.src.read_array::<5>("magic")?;
        if &magic != RDB_MAGIC {
            return Err(RdbError::InvalidMagic {
                expected: *RDB_MAGIC,
                got: magic,
            }
            .into());
        }

        let raw = self.src.read_array::<4>("version")?;
        if !raw.iter().all(u8::is_ascii_digit) {
            return Err(RdbError::InvalidVersion { got: raw }.into());
        }
        let version = raw
            .iter()
            .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0'));

        if version > RDB_VERSION_MAX {
            warn!(version, max = RDB_VERSION_MAX, "dump version is newer than known");
        } else {
            debug!(version, "header accepted");
        }
        self.version = Some(version);
        Ok(())
    }

    /// Один опкод или одна запись. `None` — опкод прочитан, событий нет.
    fn read_record_or_opcode(&mut self) -> RdbResult<Option<Event>> {
        let op_offset = self.src.offset();
        let op = self.src.read_u8("opcode")?;

        match op {
            OP_EOF => {
                self.finish()?;
                self.state = State::Done;
                return Ok(None);
            }
            OP_SELECTDB => {
                self.database = read_plain_length(&mut self.src, "database index")?;
                trace!(db = self.database, "select database");
            }
            OP_RESIZEDB => {
                let db_size = read_plain_length(&mut self.src, "resize db size")?;
                let expires_size = read_plain_length(&mut self.src, "resize expires size")?;
                trace!(db_size, expires_size, "resize hint");
                self.resize_hint = Some(ResizeHint {
                    db_size,
                    expires_size,
                });
            }
            OP_EXPIRETIME => {
                let secs = self.src.read_u32_le("expire time")?;
                self.pending.expiry = Some(u64::from(secs) * 1000);
            }
            OP_EXPIRETIME_MS => {
                self.pending.expiry = Some(self.src.read_u64_le("expire time ms")?);
            }
            OP_AUX => {
                let key = read_string(&mut self.src)?;
                let value = read_string(&mut self.src)?;
                debug!(
                    key = %String::from_utf8_lossy(&key),
                    value = %String::from_utf8_lossy(&value),
                    "aux field"
                );
                self.aux.push((key, value));
            }
            OP_IDLE => {
                self.pending.idle = Some(read_plain_length(&mut self.src, "idle time")?);
            }
            OP_FREQ => {
                self.pending.freq = Some(self.src.read_u8("lfu frequency")?);
            }
            OP_FUNCTION2 => {
                skip_string(&mut self.src)?;
                trace!("skipped function library");
            }
            OP_SLOT_INFO => {
                for what in ["slot id", "slot size", "slot expires size"] {
                    read_plain_length(&mut self.src, what)?;
                }
            }
            OP_MODULE_AUX | OP_FUNCTION_PRE_GA => {
                return Err(RdbError::unsupported_tag(op, op_offset).into());
            }
            tag => {
                let dispatch = lookup(tag).map_err(|e| e.with_offset(op_offset))?;
                return self.read_record(tag, dispatch).map(Some);
            }
        }
        Ok(None)
    }

    fn read_record(
        &mut self,
        tag: u8,
        dispatch: Dispatch,
    ) -> RdbResult<Event> {
        let key_bytes = read_string(&mut self.src).context("reading record key")?;
        let pending = mem::take(&mut self.pending);
        let key = RecordKey {
            key: key_bytes,
            database: self.database,
            expiry: pending.expiry,
            idle: pending.idle,
            freq: pending.freq,
        };
        self.stats.records_parsed += 1;
        trace!(tag = tag_name(tag), key = %String::from_utf8_lossy(&key.key), "record");

        let result = match dispatch.layout {
            Layout::Plain => self.read_plain(key.clone(), dispatch.family),
            Layout::Packed(encoding) => self.read_packed(key.clone(), dispatch.family, encoding),
        };
        result.map_err(|e| attach_key(e, &key.key))
    }

    fn read_plain(
        &mut self,
        key: RecordKey,
        family: Family,
    ) -> RdbResult<Event> {
        let map_head: fn(CollectionHead) -> Event = match family {
            Family::String => {
                let value = read_scalar(&mut self.src)?;
                return Ok(Event::String(StringData { key, value }));
            }
            Family::List => |head| ListMapper.map_head(head),
            Family::Set => |head| SetMapper.map_head(head),
            Family::SortedSet(_) => |head| SortedSetMapper.map_head(head),
            Family::Hash => |head| HashMapper.map_head(head),
        };

        let length = read_plain_length(&mut self.src, "collection length")?;
        let event = map_head(CollectionHead {
            key: key.clone(),
            length,
        });
        self.state = State::Entries(PlainCursor {
            key,
            family,
            index: 0,
            length,
        });
        Ok(event)
    }

    fn read_entry(
        &mut self,
        cursor: &mut PlainCursor,
    ) -> RdbResult<Event> {
        let result = match cursor.family {
            Family::List => self.next_entry(&ScalarReader, &ListMapper, cursor),
            Family::Set => self.next_entry(&ScalarReader, &SetMapper, cursor),
            Family::SortedSet(score) => {
                self.next_entry(&ScoredValueReader { score }, &SortedSetMapper, cursor)
            }
            Family::Hash => self.next_entry(&HashFieldReader, &HashMapper, cursor),
            Family::String => Err(RdbError::corrupt("record", "string has no entries").into()),
        };
        result.map_err(|e| attach_key(e, &cursor.key.key))
    }

    /// Читатель и маппер сходятся по типу значения на этапе компиляции.
    fn next_entry<V, M>(
        &mut self,
        reader: &V,
        mapper: &M,
        cursor: &mut PlainCursor,
    ) -> RdbResult<Event>
    where
        V: ValueReader,
        M: CollectionMapper<Value = V::Value>,
    {
        let value = reader.read(&mut self.src)?;
        let entry = CollectionEntry {
            key: cursor.key.clone(),
            value,
            index: cursor.index,
            length: cursor.length,
        };
        cursor.index += 1;
        Ok(mapper.map_entry(entry))
    }

    fn read_packed(
        &mut self,
        key: RecordKey,
        family: Family,
        encoding: PackedEncoding,
    ) -> RdbResult<Event> {
        let start = self.src.offset();
        let values = self
            .decode_packed(encoding)
            .map_err(|e| attach_offset(e, start))?;
        trace!(?encoding, values = values.len(), "packed collection");

        let event = match family {
            Family::List => emit_slice(&ListMapper, key, values),
            Family::Set => emit_slice(&SetMapper, key, values),
            Family::SortedSet(_) => emit_slice(&SortedSetMapper, key, values),
            Family::Hash => emit_slice(&HashMapper, key, values),
            Family::String => Err(RdbError::corrupt("record", "string cannot be packed").into()),
        };
        event.map_err(|e| attach_offset(e, start))
    }

    fn decode_packed(
        &mut self,
        encoding: PackedEncoding,
    ) -> RdbResult<Vec<Scalar>> {
        match encoding {
            PackedEncoding::Zipmap => zipmap::decode(&read_string(&mut self.src)?),
            PackedEncoding::Ziplist => ziplist::decode(&read_string(&mut self.src)?),
            PackedEncoding::Intset => intset::decode(&read_string(&mut self.src)?),
            PackedEncoding::Listpack => listpack::decode(&read_string(&mut self.src)?),
            PackedEncoding::Quicklist => {
                let nodes = read_plain_length(&mut self.src, "quicklist node count")?;
                let mut list = QuickList::with_nodes(nodes as usize);
                for _ in 0..nodes {
                    let blob = read_string(&mut self.src)?;
                    list.push(QuicklistNode::Ziplist(blob))?;
                }
                Ok(list.into_values())
            }
            PackedEncoding::Quicklist2 => {
                let nodes = read_plain_length(&mut self.src, "quicklist node count")?;
                let mut list = QuickList::with_nodes(nodes as usize);
                for _ in 0..nodes {
                    let container = read_plain_length(&mut self.src, "quicklist container")?;
                    let payload = read_string(&mut self.src)?;
                    list.push(QuicklistNode::from_container(container, payload)?)?;
                }
                Ok(list.into_values())
            }
        }
    }

    /// Хвост после `EOF`: контрольная сумма по политике.
    fn finish(&mut self) -> RdbResult<()> {
        let computed = self.src.finish_checksum().unwrap_or_default();
        let version = self.version.unwrap_or_default();

        if version < RDB_VERSION_CHECKSUM {
            self.checksum = Some(ChecksumStatus::Absent);
            debug!(records = self.stats.records_parsed, "end of dump");
            return Ok(());
        }

        let trailer_offset = self.src.offset();
        let recorded = self.src.read_u64_le("checksum")?;

        let status = if recorded == 0 {
            debug!("checksum disabled in dump");
            ChecksumStatus::Disabled
        } else {
            match self.config.checksum {
                ChecksumPolicy::Skip => ChecksumStatus::Skipped,
                _ if recorded == computed => {
                    debug!(checksum = format_args!("{computed:016x}"), "checksum verified");
                    ChecksumStatus::Verified
                }
                ChecksumPolicy::Verify => {
                    return Err(RdbError::ChecksumMismatch {
                        computed,
                        recorded,
                        offset: Some(trailer_offset),
                    }
                    .into());
                }
                ChecksumPolicy::Warn => {
                    warn!(
                        computed = format_args!("{computed:016x}"),
                        recorded = format_args!("{recorded:016x}"),
                        "checksum mismatch"
                    );
                    ChecksumStatus::Mismatch { computed, recorded }
                }
            }
        };

        self.checksum = Some(status);
        debug!(records = self.stats.records_parsed, "end of dump");
        Ok(())
    }
}

fn emit_slice<M: CollectionMapper>(
    mapper: &M,
    key: RecordKey,
    values: Vec<Scalar>,
) -> RdbResult<Event> {
    let values = mapper.shape(values)?;
    Ok(mapper.map_slice(CollectionData { key, values }))
}

/// Ошибки вложенных декодеров не знают смещения в потоке.
fn attach_offset(
    err: StackError,
    offset: u64,
) -> StackError {
    err.map_rdb(|rdb| rdb.with_offset(offset))
}

fn attach_key(
    err: StackError,
    key: &Bytes,
) -> StackError {
    err.map_rdb(|rdb| rdb.with_key(String::from_utf8_lossy(key)))
}

impl<R: Read> Iterator for Decoder<R> {
    type Item = RdbResult<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

impl<R: Read> FusedIterator for Decoder<R> {}
