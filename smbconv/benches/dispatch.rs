//! Record dispatch throughput over a synthetic record stream
//!
//! Run with: cargo bench -p smbconv

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use smbconv::rules::builtin::record_type as rt;
use smbconv::{taxonomy, DataRecord, Engine, Guid, StringCatalog};
use smbconv_core::codec::{ExpBase10, ExpBase2, InterLink};
use smbconv_core::format::constants::instance::NOT_APPLICABLE;

const PRODUCER: Guid = Guid::from_fields(0xbe7c_0001, 0x1, 0x2, [3, 4, 5, 6, 7, 8, 9, 10]);

/// One processor with three cache levels and one memory device per socket
fn build_stream(sockets: u16) -> Vec<DataRecord> {
    let mut records = Vec::new();
    for socket in 1..=sockets {
        let cpu = |record_type, payload: &[u8]| {
            DataRecord::with_payload(
                taxonomy::PROCESSOR,
                PRODUCER,
                record_type,
                socket,
                NOT_APPLICABLE,
                payload,
            )
        };
        records.push(cpu(rt::processor::SOCKET_DESIGNATION, &1u16.to_le_bytes()));
        records.push(cpu(rt::processor::MANUFACTURER, &2u16.to_le_bytes()));
        records.push(cpu(rt::processor::MAX_SPEED, &ExpBase10::new(36, 8).to_bytes()));
        records.push(cpu(rt::processor::CURRENT_SPEED, &ExpBase10::new(24, 8).to_bytes()));

        for level in 1..=3u16 {
            let mut link = Vec::with_capacity(24);
            link.extend_from_slice(&level.to_le_bytes());
            link.extend_from_slice(&[0, 0]);
            link.extend_from_slice(&InterLink::new(PRODUCER, socket, level).to_bytes());
            records.push(cpu(rt::processor::CACHE_ASSOCIATION, &link));

            let size = ExpBase2::new(32 << (level * 2), 10).to_bytes();
            records.push(DataRecord::with_payload(
                taxonomy::CACHE,
                PRODUCER,
                rt::cache::INSTALLED_SIZE,
                socket,
                level,
                &size,
            ));
            records.push(DataRecord::with_payload(
                taxonomy::CACHE,
                PRODUCER,
                rt::cache::SOCKET_DESIGNATION,
                socket,
                level,
                &3u16.to_le_bytes(),
            ));
        }

        let mem = |record_type, payload: &[u8]| {
            DataRecord::with_payload(taxonomy::MEMORY, PRODUCER, record_type, 1, socket, payload)
        };
        let array_link = InterLink::new(PRODUCER, 1, NOT_APPLICABLE).to_bytes();
        records.push(mem(rt::memory::DEVICE_ARRAY_LINK, &array_link));
        records.push(mem(rt::memory::DEVICE_SIZE, &ExpBase2::new(16, 30).to_bytes()));
        records.push(mem(rt::memory::DEVICE_LOCATOR, &4u16.to_le_bytes()));
    }
    records
}

fn catalog() -> StringCatalog {
    StringCatalog::new()
        .with(PRODUCER, 1, "CPU Socket")
        .with(PRODUCER, 2, "Example Silicon")
        .with(PRODUCER, 3, "Cache")
        .with(PRODUCER, 4, "DIMM")
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for sockets in [4u16, 64, 512] {
        let mut records = build_stream(sockets);
        group.throughput(Throughput::Elements(records.len() as u64));

        group.bench_with_input(BenchmarkId::new("in_order", sockets), &records, |b, records| {
            b.iter(|| {
                let mut engine = Engine::builtin(catalog());
                engine.process_all(black_box(records));
                black_box(engine.finish().map(|table| table.len()))
            });
        });

        // Links mostly arrive before their targets
        records.shuffle(&mut rand::rngs::StdRng::seed_from_u64(42));
        group.bench_with_input(BenchmarkId::new("shuffled", sockets), &records, |b, records| {
            b.iter(|| {
                let mut engine = Engine::builtin(catalog());
                engine.process_all(black_box(records));
                black_box(engine.finish().map(|table| table.len()))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
