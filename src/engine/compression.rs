//! Распаковка LZF-блоков, которыми сервер сжимает длинные строки.
//!
//! Поток состоит из управляющих байтов:
//! - `ctrl < 32`: следом `ctrl + 1` литеральных байт
//! - иначе обратная ссылка: длина `ctrl >> 5` (при 7 добавляется следующий
//!   байт) плюс 2, расстояние `((ctrl & 0x1F) << 8) + byte + 1`
//!
//! Любой выход за границы входа или выхода — ошибка, а не паника.

use rdbstream_error::{RdbError, RdbResult};

/// Наибольший выход на байт входа: ссылка из 3 байт даёт до 264 байт.
const LZF_MAX_EXPANSION: usize = 88;

fn failed(
    reason: impl Into<String>,
    expected_len: usize,
    got_len: usize,
) -> RdbError {
    RdbError::DecompressionFailed {
        reason: reason.into(),
        expected_len: expected_len as u64,
        got_len: Some(got_len as u64),
        offset: None,
        key: None,
    }
}

/// Распаковывает `input` ровно в `expected_len` байт.
pub fn decompress(
    input: &[u8],
    expected_len: usize,
) -> RdbResult<Vec<u8>> {
    let mut out = Vec::with_capacity(initial_capacity(input.len(), expected_len));
    let mut i = 0;

    while i < input.len() {
        let ctrl = input[i] as usize;
        i += 1;

        if ctrl < 32 {
            let run = ctrl + 1;
            if i + run > input.len() {
                return Err(failed("literal run past end of input", expected_len, out.len()).into());
            }
            if out.len() + run > expected_len {
                return Err(failed("output exceeds declared length", expected_len, out.len()).into());
            }
            out.extend_from_slice(&input[i..i + run]);
            i += run;
            continue;
        }

        let mut len = ctrl >> 5;
        if len == 7 {
            let ext = *input
                .get(i)
                .ok_or_else(|| failed("missing length byte", expected_len, out.len()))?;
            len += ext as usize;
            i += 1;
        }
        let low = *input
            .get(i)
            .ok_or_else(|| failed("missing distance byte", expected_len, out.len()))?;
        i += 1;

        let distance = ((ctrl & 0x1F) << 8) + low as usize + 1;
        if distance > out.len() {
            return Err(failed(
                format!("back-reference {distance} bytes before start of output"),
                expected_len,
                out.len(),
            )
            .into());
        }
        let len = len + 2;
        if out.len() + len > expected_len {
            return Err(failed("output exceeds declared length", expected_len, out.len()).into());
        }

        // Источник и приёмник могут перекрываться, копируем побайтно.
        let start = out.len() - distance;
        for k in 0..len {
            let b = out[start + k];
            out.push(b);
        }
    }

    if out.len() != expected_len {
        return Err(failed("output shorter than declared length", expected_len, out.len()).into());
    }
    Ok(out)
}

/// Резерв под выход: не больше, чем вход способен развернуть.
fn initial_capacity(
    input_len: usize,
    expected_len: usize,
) -> usize {
    expected_len.min(input_len.saturating_mul(LZF_MAX_EXPANSION))
}
