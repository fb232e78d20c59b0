#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rdbstream::{ChecksumPolicy, Decoder, DecoderConfig};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Версия в заголовке, чтобы тело не тратилось на сигнатуру.
    version: u8,
    policy: u8,
    body: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let mut data = format!("REDIS{:04}", input.version % 13).into_bytes();
    data.extend_from_slice(&input.body);

    let policy = match input.policy % 3 {
        0 => ChecksumPolicy::Verify,
        1 => ChecksumPolicy::Skip,
        _ => ChecksumPolicy::Warn,
    };
    let config = DecoderConfig::default()
        .with_checksum(policy)
        .with_max_blob_len(1 << 20);

    // Декодер не должен паниковать ни на каких данных, а после ошибки
    // обязан молчать.
    let mut decoder = Decoder::with_config(data.as_slice(), config);
    while let Some(result) = decoder.next() {
        if result.is_err() {
            assert!(decoder.next().is_none());
            break;
        }
    }
});
