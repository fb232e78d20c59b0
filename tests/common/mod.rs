//! Сборщик байтов дампа для интеграционных тестов.
//!
//! Пишет ровно то, что пишет сервер: заголовок, опкоды, записи, `EOF` и
//! CRC-64 для версий от 5. Плюс кодировщики упакованных структур и LZF.

#![allow(dead_code)]

use rdbstream::engine::{source::CRC64, tags::*};

pub fn encode_length(n: u64) -> Vec<u8> {
    if n < 1 << 6 {
        vec![n as u8]
    } else if n < 1 << 14 {
        vec![0x40 | (n >> 8) as u8, (n & 0xFF) as u8]
    } else if n <= u32::MAX as u64 {
        let mut out = vec![0x80];
        out.extend_from_slice(&(n as u32).to_be_bytes());
        out
    } else {
        let mut out = vec![0x81];
        out.extend_from_slice(&n.to_be_bytes());
        out
    }
}

pub fn encode_string(s: &[u8]) -> Vec<u8> {
    let mut out = encode_length(s.len() as u64);
    out.extend_from_slice(s);
    out
}

/// Целое в специальной кодировке минимальной ширины.
pub fn encode_int_string(v: i32) -> Vec<u8> {
    if let Ok(b) = i8::try_from(v) {
        vec![0xC0, b as u8]
    } else if let Ok(h) = i16::try_from(v) {
        let mut out = vec![0xC1];
        out.extend_from_slice(&h.to_le_bytes());
        out
    } else {
        let mut out = vec![0xC2];
        out.extend_from_slice(&v.to_le_bytes());
        out
    }
}

/// LZF-строка: `0xC3`, сжатая длина, исходная длина, данные.
pub fn encode_lzf_string(s: &[u8]) -> Vec<u8> {
    let compressed = lzf_compress(s);
    let mut out = vec![0xC3];
    out.extend(encode_length(compressed.len() as u64));
    out.extend(encode_length(s.len() as u64));
    out.extend(compressed);
    out
}

/// Текстовая оценка для zset типа 3.
pub fn encode_legacy_float(v: f64) -> Vec<u8> {
    if v.is_nan() {
        vec![253]
    } else if v == f64::INFINITY {
        vec![254]
    } else if v == f64::NEG_INFINITY {
        vec![255]
    } else {
        let text = format!("{v}");
        let mut out = vec![text.len() as u8];
        out.extend_from_slice(text.as_bytes());
        out
    }
}

pub struct RdbBuilder {
    buf: Vec<u8>,
    version: u32,
}

impl RdbBuilder {
    pub fn new(version: u32) -> Self {
        let mut buf = RDB_MAGIC.to_vec();
        buf.extend_from_slice(format!("{version:04}").as_bytes());
        Self { buf, version }
    }

    pub fn raw(
        mut self,
        bytes: &[u8],
    ) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn select_db(
        self,
        db: u64,
    ) -> Self {
        self.raw(&[OP_SELECTDB]).raw(&encode_length(db))
    }

    pub fn resize_db(
        self,
        size: u64,
        expires: u64,
    ) -> Self {
        self.raw(&[OP_RESIZEDB])
            .raw(&encode_length(size))
            .raw(&encode_length(expires))
    }

    pub fn aux(
        self,
        key: &str,
        value: &[u8],
    ) -> Self {
        self.raw(&[OP_AUX])
            .raw(&encode_string(key.as_bytes()))
            .raw(value)
    }

    pub fn expire_ms(
        self,
        ms: u64,
    ) -> Self {
        self.raw(&[OP_EXPIRETIME_MS]).raw(&ms.to_le_bytes())
    }

    pub fn expire_secs(
        self,
        secs: u32,
    ) -> Self {
        self.raw(&[OP_EXPIRETIME]).raw(&secs.to_le_bytes())
    }

    pub fn idle(
        self,
        secs: u64,
    ) -> Self {
        self.raw(&[OP_IDLE]).raw(&encode_length(secs))
    }

    pub fn freq(
        self,
        freq: u8,
    ) -> Self {
        self.raw(&[OP_FREQ, freq])
    }

    /// Тег типа и ключ; тело значения пишется следом через `raw`.
    pub fn record(
        self,
        tag: u8,
        key: &[u8],
    ) -> Self {
        self.raw(&[tag]).raw(&encode_string(key))
    }

    pub fn string(
        self,
        key: &[u8],
        value: &[u8],
    ) -> Self {
        self.record(TYPE_STRING, key).raw(&encode_string(value))
    }

    /// Упакованная запись: блоб пишется обычной строкой.
    pub fn packed(
        self,
        tag: u8,
        key: &[u8],
        blob: &[u8],
    ) -> Self {
        self.record(tag, key).raw(&encode_string(blob))
    }

    /// Plain-список или множество строк.
    pub fn plain_list(
        self,
        tag: u8,
        key: &[u8],
        items: &[&[u8]],
    ) -> Self {
        let mut body = encode_length(items.len() as u64);
        for item in items {
            body.extend(encode_string(item));
        }
        self.record(tag, key).raw(&body)
    }

    /// Байты без `EOF`.
    pub fn body(self) -> Vec<u8> {
        self.buf
    }

    /// `EOF` и правильная контрольная сумма (для версий от 5).
    pub fn finish(mut self) -> Vec<u8> {
        self.buf.push(OP_EOF);
        if self.version >= RDB_VERSION_CHECKSUM {
            let crc = CRC64.checksum(&self.buf);
            self.buf.extend_from_slice(&crc.to_le_bytes());
        }
        self.buf
    }

    /// `EOF` и произвольное значение в трейлере.
    pub fn finish_with_checksum(
        mut self,
        checksum: u64,
    ) -> Vec<u8> {
        self.buf.push(OP_EOF);
        self.buf.extend_from_slice(&checksum.to_le_bytes());
        self.buf
    }
}

////////////////////////////////////////////////////////////////////////////////
// Упакованные структуры
////////////////////////////////////////////////////////////////////////////////

/// Элемент ziplist или listpack.
#[derive(Debug, Clone)]
pub enum Packed<'a> {
    Str(&'a [u8]),
    Int(i64),
}

fn ziplist_entry(e: &Packed<'_>) -> Vec<u8> {
    match *e {
        Packed::Str(s) if s.len() < 64 => {
            let mut out = vec![s.len() as u8];
            out.extend_from_slice(s);
            out
        }
        Packed::Str(s) if s.len() < 16_384 => {
            let mut out = vec![0x40 | (s.len() >> 8) as u8, (s.len() & 0xFF) as u8];
            out.extend_from_slice(s);
            out
        }
        Packed::Str(s) => {
            let mut out = vec![0x80];
            out.extend_from_slice(&(s.len() as u32).to_be_bytes());
            out.extend_from_slice(s);
            out
        }
        Packed::Int(v @ 0..=12) => vec![0xF1 + v as u8],
        Packed::Int(v) if i8::try_from(v).is_ok() => vec![0xFE, v as i8 as u8],
        Packed::Int(v) if i16::try_from(v).is_ok() => {
            let mut out = vec![0xC0];
            out.extend_from_slice(&(v as i16).to_le_bytes());
            out
        }
        Packed::Int(v) if (-(1 << 23)..(1 << 23)).contains(&v) => {
            let mut out = vec![0xF0];
            out.extend_from_slice(&(v as i32).to_le_bytes()[..3]);
            out
        }
        Packed::Int(v) if i32::try_from(v).is_ok() => {
            let mut out = vec![0xD0];
            out.extend_from_slice(&(v as i32).to_le_bytes());
            out
        }
        Packed::Int(v) => {
            let mut out = vec![0xE0];
            out.extend_from_slice(&v.to_le_bytes());
            out
        }
    }
}

pub fn ziplist(entries: &[Packed<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    let mut prev = 0usize;
    for e in entries {
        let start = body.len();
        if prev < 254 {
            body.push(prev as u8);
        } else {
            body.push(0xFE);
            body.extend_from_slice(&(prev as u32).to_le_bytes());
        }
        body.extend(ziplist_entry(e));
        prev = body.len() - start;
    }
    let total = 10 + body.len() + 1;
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    out.extend(body);
    out.push(0xFF);
    out
}

fn listpack_backlen(len: usize) -> usize {
    match len {
        0..=127 => 1,
        128..=16_382 => 2,
        16_383..=2_097_150 => 3,
        2_097_151..=268_435_454 => 4,
        _ => 5,
    }
}

fn listpack_entry(e: &Packed<'_>) -> Vec<u8> {
    match *e {
        Packed::Int(v @ 0..=127) => vec![v as u8],
        Packed::Int(v) if (-4096..4096).contains(&v) => {
            let uv = (v as u16) & 0x1FFF;
            vec![0xC0 | (uv >> 8) as u8, (uv & 0xFF) as u8]
        }
        Packed::Int(v) if i16::try_from(v).is_ok() => {
            let mut out = vec![0xF1];
            out.extend_from_slice(&(v as i16).to_le_bytes());
            out
        }
        Packed::Int(v) if (-(1 << 23)..(1 << 23)).contains(&v) => {
            let mut out = vec![0xF2];
            out.extend_from_slice(&(v as i32).to_le_bytes()[..3]);
            out
        }
        Packed::Int(v) if i32::try_from(v).is_ok() => {
            let mut out = vec![0xF3];
            out.extend_from_slice(&(v as i32).to_le_bytes());
            out
        }
        Packed::Int(v) => {
            let mut out = vec![0xF4];
            out.extend_from_slice(&v.to_le_bytes());
            out
        }
        Packed::Str(s) if s.len() < 64 => {
            let mut out = vec![0x80 | s.len() as u8];
            out.extend_from_slice(s);
            out
        }
        Packed::Str(s) if s.len() < 4096 => {
            let mut out = vec![0xE0 | (s.len() >> 8) as u8, (s.len() & 0xFF) as u8];
            out.extend_from_slice(s);
            out
        }
        Packed::Str(s) => {
            let mut out = vec![0xF0];
            out.extend_from_slice(&(s.len() as u32).to_le_bytes());
            out.extend_from_slice(s);
            out
        }
    }
}

pub fn listpack(entries: &[Packed<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for e in entries {
        let enc = listpack_entry(e);
        let backlen = listpack_backlen(enc.len());
        body.extend(enc);
        body.extend(std::iter::repeat(0u8).take(backlen));
    }
    let total = 6 + body.len() + 1;
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    out.extend(body);
    out.push(0xFF);
    out
}

pub fn intset(
    width: u32,
    values: &[i64],
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&(values.len() as u32).to_le_bytes());
    for v in values {
        out.extend_from_slice(&v.to_le_bytes()[..width as usize]);
    }
    out
}

pub fn zipmap(pairs: &[(&str, &str)]) -> Vec<u8> {
    let mut out = vec![pairs.len() as u8];
    for (field, value) in pairs {
        let (field, value) = (field.as_bytes(), value.as_bytes());
        out.push(field.len() as u8);
        out.extend_from_slice(field);
        out.push(value.len() as u8);
        out.push(0);
        out.extend_from_slice(value);
    }
    out.push(0xFF);
    out
}

////////////////////////////////////////////////////////////////////////////////
// LZF
////////////////////////////////////////////////////////////////////////////////

const LZF_MAX_LIT: usize = 32;
const LZF_MAX_OFF: usize = 1 << 13;
const LZF_MAX_REF: usize = (1 << 8) + (1 << 3);

/// Жадный LZF-компрессор: самое длинное совпадение от 3 байт в окне 8 КиБ.
pub fn lzf_compress(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut lit: Vec<u8> = Vec::new();
    let mut i = 0;

    while i < input.len() {
        let (mut best_len, mut best_off) = (0usize, 0usize);
        if i + 3 <= input.len() {
            for j in i.saturating_sub(LZF_MAX_OFF)..i {
                let mut l = 0;
                while i + l < input.len() && l < LZF_MAX_REF && input[j + l] == input[i + l] {
                    l += 1;
                }
                if l > best_len {
                    best_len = l;
                    best_off = i - j - 1;
                }
            }
        }

        if best_len >= 3 {
            flush_literals(&mut out, &mut lit);
            let l = best_len - 2;
            if l < 7 {
                out.push(((l << 5) | (best_off >> 8)) as u8);
            } else {
                out.push(((7 << 5) | (best_off >> 8)) as u8);
                out.push((l - 7) as u8);
            }
            out.push((best_off & 0xFF) as u8);
            i += best_len;
        } else {
            lit.push(input[i]);
            i += 1;
            if lit.len() == LZF_MAX_LIT {
                flush_literals(&mut out, &mut lit);
            }
        }
    }
    flush_literals(&mut out, &mut lit);
    out
}

fn flush_literals(
    out: &mut Vec<u8>,
    lit: &mut Vec<u8>,
) {
    if lit.is_empty() {
        return;
    }
    out.push((lit.len() - 1) as u8);
    out.append(lit);
}
