use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rdbstream::{
    engine::{source::CRC64, tags::*},
    Decoder,
};

fn encode_length(n: usize) -> Vec<u8> {
    if n < 1 << 6 {
        vec![n as u8]
    } else if n < 1 << 14 {
        vec![0x40 | (n >> 8) as u8, (n & 0xFF) as u8]
    } else {
        let mut out = vec![0x80];
        out.extend_from_slice(&(n as u32).to_be_bytes());
        out
    }
}

fn push_string(
    buf: &mut Vec<u8>,
    s: &[u8],
) {
    buf.extend(encode_length(s.len()));
    buf.extend_from_slice(s);
}

/// Listpack из коротких строк.
fn listpack(items: &[Vec<u8>]) -> Vec<u8> {
    let mut body = Vec::new();
    for item in items {
        body.push(0x80 | item.len() as u8);
        body.extend_from_slice(item);
        body.push((item.len() + 1) as u8);
    }
    let total = 6 + body.len() + 1;
    let mut out = (total as u32).to_le_bytes().to_vec();
    out.extend_from_slice(&(items.len() as u16).to_le_bytes());
    out.extend(body);
    out.push(0xFF);
    out
}

/// Дамп из `records` записей: строки, plain-списки и хеши в listpack.
fn build_dump(records: usize) -> Vec<u8> {
    let mut buf = b"REDIS0011".to_vec();
    buf.push(OP_SELECTDB);
    buf.push(0);

    for i in 0..records {
        let key = format!("key:{i:06}");
        match i % 3 {
            0 => {
                buf.push(TYPE_STRING);
                push_string(&mut buf, key.as_bytes());
                push_string(&mut buf, format!("value-{i}").as_bytes());
            }
            1 => {
                buf.push(TYPE_LIST);
                push_string(&mut buf, key.as_bytes());
                buf.extend(encode_length(16));
                for j in 0..16 {
                    push_string(&mut buf, format!("element-{j}").as_bytes());
                }
            }
            _ => {
                let items: Vec<Vec<u8>> = (0..16)
                    .flat_map(|j| [format!("f{j}").into_bytes(), format!("v{j}").into_bytes()])
                    .collect();
                buf.push(TYPE_HASH_LISTPACK);
                push_string(&mut buf, key.as_bytes());
                push_string(&mut buf, &listpack(&items));
            }
        }
    }

    buf.push(OP_EOF);
    let crc = CRC64.checksum(&buf);
    buf.extend_from_slice(&crc.to_le_bytes());
    buf
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_dump");

    for &records in &[100usize, 1_000, 10_000] {
        let dump = build_dump(records);
        group.throughput(Throughput::Bytes(dump.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(records), &dump, |b, dump| {
            b.iter(|| {
                let mut events = 0usize;
                for event in Decoder::new(black_box(dump.as_slice())) {
                    black_box(event.unwrap());
                    events += 1;
                }
                events
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
