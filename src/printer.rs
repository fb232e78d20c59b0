//! Вывод событий декодера в JSON для `rdb-dump`.
//!
//! Весь вывод — один JSON-массив, по объекту на событие в строке. Байтовые
//! строки выводятся текстом, если это корректный UTF-8, иначе массивом
//! чисел; `NaN` и бесконечные оценки — строками `"nan"`, `"inf"`, `"-inf"`.

use std::io::{self, Write};

use serde_json::{json, Map, Value};

use crate::{
    database::{HashField, Scalar, ScoredValue},
    engine::{CollectionData, CollectionEntry, CollectionHead, Event, RecordKey},
};

/// Приёмник событий.
pub trait Printer {
    fn start(&mut self) -> io::Result<()>;

    fn event(
        &mut self,
        event: &Event,
    ) -> io::Result<()>;

    fn end(&mut self) -> io::Result<()>;
}

pub struct JsonPrinter<W: Write> {
    out: W,
    first: bool,
}

impl<W: Write> JsonPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, first: true }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Printer for JsonPrinter<W> {
    fn start(&mut self) -> io::Result<()> {
        self.out.write_all(b"[")
    }

    fn event(
        &mut self,
        event: &Event,
    ) -> io::Result<()> {
        if !self.first {
            self.out.write_all(b",")?;
        }
        self.first = false;
        self.out.write_all(b"\n")?;
        serde_json::to_writer(&mut self.out, &event_to_json(event))?;
        Ok(())
    }

    fn end(&mut self) -> io::Result<()> {
        if !self.first {
            self.out.write_all(b"\n")?;
        }
        self.out.write_all(b"]\n")?;
        self.out.flush()
    }
}

pub fn event_to_json(event: &Event) -> Value {
    match event {
        Event::String(d) => {
            let mut obj = key_fields(event.kind(), &d.key);
            obj.insert("value".into(), scalar_to_json(&d.value));
            Value::Object(obj)
        }
        Event::ListHead(h) | Event::SetHead(h) | Event::SortedSetHead(h) | Event::HashHead(h) => {
            head_to_json(event.kind(), h)
        }
        Event::ListEntry(e) | Event::SetEntry(e) => entry_to_json(event.kind(), e, scalar_to_json),
        Event::SortedSetEntry(e) => entry_to_json(event.kind(), e, scored_to_json),
        Event::HashEntry(e) => entry_to_json(event.kind(), e, field_to_json),
        Event::ListData(d) | Event::SetData(d) => data_to_json(event.kind(), d, scalar_to_json),
        Event::SortedSetData(d) => data_to_json(event.kind(), d, scored_to_json),
        Event::HashData(d) => data_to_json(event.kind(), d, field_to_json),
    }
}

fn key_fields(
    kind: &str,
    key: &RecordKey,
) -> Map<String, Value> {
    let mut obj = Map::new();
    obj.insert("type".into(), json!(kind));
    obj.insert("db".into(), json!(key.database));
    obj.insert("key".into(), bytes_to_json(&key.key));
    if let Some(expiry) = key.expiry {
        obj.insert("expiry".into(), json!(expiry));
    }
    if let Some(idle) = key.idle {
        obj.insert("idle".into(), json!(idle));
    }
    if let Some(freq) = key.freq {
        obj.insert("freq".into(), json!(freq));
    }
    obj
}

fn head_to_json(
    kind: &str,
    head: &CollectionHead,
) -> Value {
    let mut obj = key_fields(kind, &head.key);
    obj.insert("length".into(), json!(head.length));
    Value::Object(obj)
}

fn entry_to_json<V>(
    kind: &str,
    entry: &CollectionEntry<V>,
    value: fn(&V) -> Value,
) -> Value {
    let mut obj = key_fields(kind, &entry.key);
    obj.insert("index".into(), json!(entry.index));
    obj.insert("length".into(), json!(entry.length));
    obj.insert("value".into(), value(&entry.value));
    Value::Object(obj)
}

fn data_to_json<V>(
    kind: &str,
    data: &CollectionData<V>,
    value: fn(&V) -> Value,
) -> Value {
    let mut obj = key_fields(kind, &data.key);
    obj.insert(
        "values".into(),
        Value::Array(data.values.iter().map(value).collect()),
    );
    Value::Object(obj)
}

fn bytes_to_json(bytes: &[u8]) -> Value {
    match std::str::from_utf8(bytes) {
        Ok(s) => json!(s),
        Err(_) => json!(bytes),
    }
}

fn scalar_to_json(value: &Scalar) -> Value {
    match value {
        Scalar::Bytes(b) => bytes_to_json(b),
        Scalar::Int(i) => json!(i),
    }
}

fn score_to_json(score: f64) -> Value {
    if score.is_nan() {
        json!("nan")
    } else if score == f64::INFINITY {
        json!("inf")
    } else if score == f64::NEG_INFINITY {
        json!("-inf")
    } else {
        json!(score)
    }
}

fn scored_to_json(value: &ScoredValue) -> Value {
    json!({
        "member": scalar_to_json(&value.member),
        "score": score_to_json(value.score),
    })
}

fn field_to_json(value: &HashField) -> Value {
    json!({
        "field": scalar_to_json(&value.field),
        "value": scalar_to_json(&value.value),
    })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::engine::StringData;

    fn key(name: &'static str) -> RecordKey {
        RecordKey {
            key: Bytes::from_static(name.as_bytes()),
            database: 0,
            expiry: None,
            idle: None,
            freq: None,
        }
    }

    /// Тест проверяет строковую запись со сроком жизни.
    #[test]
    fn test_string_event() {
        let mut k = key("greeting");
        k.expiry = Some(1_700_000_000_000);
        let ev = Event::String(StringData {
            key: k,
            value: Scalar::from("hello"),
        });
        assert_eq!(
            event_to_json(&ev),
            json!({
                "type": "string",
                "db": 0,
                "key": "greeting",
                "expiry": 1_700_000_000_000u64,
                "value": "hello",
            })
        );
    }

    /// Тест проверяет невалидный UTF-8 и бесконечные оценки.
    #[test]
    fn test_binary_and_infinite_scores() {
        let ev = Event::SortedSetData(CollectionData {
            key: key("z"),
            values: vec![
                ScoredValue::new(vec![0xFF, 0x00], f64::INFINITY),
                ScoredValue::new(7i64, -1.5),
            ],
        });
        let v = event_to_json(&ev);
        assert_eq!(v["values"][0]["member"], json!([255, 0]));
        assert_eq!(v["values"][0]["score"], json!("inf"));
        assert_eq!(v["values"][1]["member"], json!(7));
        assert_eq!(v["values"][1]["score"], json!(-1.5));
    }

    /// Тест проверяет форму массива на выходе.
    #[test]
    fn test_printer_array() {
        let mut p = JsonPrinter::new(Vec::new());
        p.start().unwrap();
        p.event(&Event::ListHead(CollectionHead {
            key: key("l"),
            length: 2,
        }))
        .unwrap();
        p.event(&Event::HashEntry(CollectionEntry {
            key: key("h"),
            value: HashField::new("f", "v"),
            index: 0,
            length: 1,
        }))
        .unwrap();
        p.end().unwrap();

        let out = String::from_utf8(p.into_inner()).unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[1]["value"]["field"], json!("f"));
    }

    /// Тест проверяет пустой вывод.
    #[test]
    fn test_empty_output() {
        let mut p = JsonPrinter::new(Vec::new());
        p.start().unwrap();
        p.end().unwrap();
        assert_eq!(p.into_inner(), b"[]\n");
    }
}
