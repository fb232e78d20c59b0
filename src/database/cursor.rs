//! Курсор по уже извлечённому блобу упакованной коллекции.
//!
//! Блоб целиком в памяти, поэтому выход за его границу означает не усечение
//! потока, а повреждённую внутреннюю структуру: такие ошибки всегда
//! `CorruptData`.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use bytes::Bytes;
use rdbstream_error::{RdbError, RdbResult};

pub struct SliceCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    structure: &'static str,
}

impl<'a> SliceCursor<'a> {
    pub fn new(
        buf: &'a [u8],
        structure: &'static str,
    ) -> Self {
        Self {
            buf,
            pos: 0,
            structure,
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Ошибка структуры с текущей позицией внутри блоба.
    pub fn corrupt(
        &self,
        reason: impl Into<String>,
    ) -> RdbError {
        RdbError::corrupt(
            self.structure,
            format!("{} (at blob byte {})", reason.into(), self.pos),
        )
    }

    pub fn peek(&self) -> RdbResult<u8> {
        self.buf
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.corrupt("unexpected end of blob").into())
    }

    pub fn u8(&mut self) -> RdbResult<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Ok(b)
    }

    /// Следующие `len` байт без копирования.
    pub fn take(
        &mut self,
        len: usize,
    ) -> RdbResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(self
                .corrupt(format!(
                    "entry of {len} bytes overruns blob ({} left)",
                    self.remaining()
                ))
                .into());
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn take_bytes(
        &mut self,
        len: usize,
    ) -> RdbResult<Bytes> {
        self.take(len).map(Bytes::copy_from_slice)
    }

    pub fn skip(
        &mut self,
        len: usize,
    ) -> RdbResult<()> {
        self.take(len).map(|_| ())
    }

    pub fn u16_le(&mut self) -> RdbResult<u16> {
        self.take(2).map(LittleEndian::read_u16)
    }

    pub fn u32_le(&mut self) -> RdbResult<u32> {
        self.take(4).map(LittleEndian::read_u32)
    }

    pub fn u32_be(&mut self) -> RdbResult<u32> {
        self.take(4).map(BigEndian::read_u32)
    }

    pub fn i16_le(&mut self) -> RdbResult<i16> {
        self.take(2).map(LittleEndian::read_i16)
    }

    pub fn i24_le(&mut self) -> RdbResult<i32> {
        self.take(3).map(LittleEndian::read_i24)
    }

    pub fn i32_le(&mut self) -> RdbResult<i32> {
        self.take(4).map(LittleEndian::read_i32)
    }

    pub fn i64_le(&mut self) -> RdbResult<i64> {
        self.take(8).map(LittleEndian::read_i64)
    }

    /// Проверяет, что курсор стоит на терминаторе `0xFF`, и съедает его.
    pub fn expect_terminator(&mut self) -> RdbResult<()> {
        match self.buf.get(self.pos) {
            Some(0xFF) => {
                self.pos += 1;
                Ok(())
            }
            Some(other) => Err(self
                .corrupt(format!("expected terminator 0xFF, found 0x{other:02X}"))
                .into()),
            None => Err(self.corrupt("missing terminator 0xFF").into()),
        }
    }
}
