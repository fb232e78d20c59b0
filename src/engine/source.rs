//! Буферизованный источник байтов дампа.
//!
//! Считает смещение от начала потока и на лету обновляет CRC-64, чтобы
//! контрольную сумму можно было сверить без второго прохода по файлу.

use std::io::{self, BufReader, Read};

use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use crc::{Crc, Digest, CRC_64_REDIS};
use rdbstream_error::{RdbError, RdbResult};

/// CRC-64 Jones, как в самом сервере.
pub static CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_REDIS);

/// Reader обёртка: смещение, CRC и предел размера блоков.
pub struct Source<R: Read> {
    inner: BufReader<R>,
    offset: u64,
    digest: Option<Digest<'static, u64>>,
    max_blob_len: u64,
}

impl<R: Read> Source<R> {
    pub fn new(
        inner: R,
        buffer_capacity: usize,
        max_blob_len: u64,
    ) -> Self {
        Self {
            inner: BufReader::with_capacity(buffer_capacity.max(64), inner),
            offset: 0,
            digest: Some(CRC64.digest()),
            max_blob_len,
        }
    }

    /// Кол-во байт, прочитанных с начала потока.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Останавливает подсчёт CRC и возвращает сумму прочитанного.
    ///
    /// Всё, что читается после вызова, в сумму не входит.
    pub fn finish_checksum(&mut self) -> Option<u64> {
        self.digest.take().map(|d| d.finalize())
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }

    fn consume(
        &mut self,
        buf: &[u8],
    ) {
        self.offset += buf.len() as u64;
        if let Some(digest) = self.digest.as_mut() {
            digest.update(buf);
        }
    }

    /// Заполняет `buf` целиком или возвращает `TruncatedInput`.
    pub fn read_into(
        &mut self,
        buf: &mut [u8],
        context: &str,
    ) -> RdbResult<()> {
        let mut got = 0;
        while got < buf.len() {
            match self.inner.read(&mut buf[got..]) {
                Ok(0) => {
                    return Err(RdbError::truncated(context, buf.len() as u64, got as u64)
                        .with_offset(self.offset)
                        .into());
                }
                Ok(n) => got += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.consume(buf);
        Ok(())
    }

    pub fn read_array<const N: usize>(
        &mut self,
        context: &str,
    ) -> RdbResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_into(&mut buf, context)?;
        Ok(buf)
    }

    pub fn read_u8(
        &mut self,
        context: &str,
    ) -> RdbResult<u8> {
        self.read_array::<1>(context).map(|b| b[0])
    }

    pub fn read_u32_le(
        &mut self,
        context: &str,
    ) -> RdbResult<u32> {
        self.read_array::<4>(context)
            .map(|b| LittleEndian::read_u32(&b))
    }

    pub fn read_u64_le(
        &mut self,
        context: &str,
    ) -> RdbResult<u64> {
        self.read_array::<8>(context)
            .map(|b| LittleEndian::read_u64(&b))
    }

    /// Проверяет заявленную длину блока до выделения памяти.
    pub fn check_len(
        &self,
        what: &str,
        len: u64,
    ) -> RdbResult<usize> {
        if len > self.max_blob_len {
            return Err(RdbError::SizeLimit {
                what: what.to_string(),
                size: len,
                limit: self.max_blob_len,
                offset: Some(self.offset),
                key: None,
            }
            .into());
        }
        usize::try_from(len).map_err(|_| {
            RdbError::SizeLimit {
                what: what.to_string(),
                size: len,
                limit: usize::MAX as u64,
                offset: Some(self.offset),
                key: None,
            }
            .into()
        })
    }

    /// Читает ровно `len` байт.
    ///
    /// Буфер растёт по мере поступления данных, так что ложная огромная
    /// длина в усечённом файле не приводит к выделению всей памяти сразу.
    pub fn read_bytes(
        &mut self,
        len: u64,
        context: &str,
    ) -> RdbResult<Bytes> {
        let len = self.check_len(context, len)?;
        let mut buf = Vec::with_capacity(len.min(self.inner.capacity()));
        let got = (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut buf)?;
        if got < len {
            return Err(RdbError::truncated(context, len as u64, got as u64)
                .with_offset(self.offset)
                .into());
        }
        self.consume(&buf);
        Ok(Bytes::from(buf))
    }

    /// Пропускает `len` байт, учитывая их в CRC.
    pub fn skip(
        &mut self,
        len: u64,
        context: &str,
    ) -> RdbResult<()> {
        self.read_bytes(len, context).map(|_| ())
    }
}
