//! Benchmarks for frame encoding, validation and decoding.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tsmart::checksum::{checksum, validate};
use tsmart::response::{
    decode_configuration_response, decode_control_read_response, decode_discovery_response,
};
use tsmart::schema::{configuration, RecordBuf, CONFIGURATION_RESPONSE};
use tsmart::{encode_control_write_request, Mode};

const DISCOVERY_HEX: &str =
    "01000020000d2a9b005445534c4100000000000000000000000000000000000000000000000000000064e3";
const CONTROL_READ_HEX: &str = "f1000000640000e00100011b020000000000000000000000000000000039";

fn configuration_frame() -> Vec<u8> {
    RecordBuf::new(&CONFIGURATION_RESPONSE)
        .put_u32(configuration::DEVICE_ID, 0x009B_2A0D)
        .put_bytes(configuration::DEVICE_NAME, b"TESLA")
        .put_u8(configuration::FIRMWARE_MAJOR, 1)
        .put_u8(configuration::FIRMWARE_MINOR, 7)
        .put_u8(configuration::FIRMWARE_DEPLOYMENT, 2)
        .put_bytes(configuration::FIRMWARE_NAME, b"TSmart-IH")
        .finish()
}

fn bench_checksum(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum");
    let frame = configuration_frame();
    group.throughput(Throughput::Bytes(frame.len() as u64));

    group.bench_function("compute_326", |b| {
        b.iter(|| checksum(black_box(&frame[..frame.len() - 1])))
    });
    group.bench_function("validate_326", |b| b.iter(|| validate(black_box(&frame))));
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let discovery = hex::decode(DISCOVERY_HEX).unwrap();
    let control = hex::decode(CONTROL_READ_HEX).unwrap();
    let config = configuration_frame();

    group.bench_function("discovery", |b| {
        b.iter(|| decode_discovery_response(0x01, black_box(&discovery), "192.168.1.42"))
    });
    group.bench_function("configuration", |b| {
        b.iter(|| decode_configuration_response(0x21, black_box(&config)))
    });
    group.bench_function("control_read", |b| {
        b.iter(|| decode_control_read_response(0xF1, black_box(&control)))
    });
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    c.bench_function("encode_control_write", |b| {
        b.iter(|| encode_control_write_request(black_box(true), Mode::Eco, black_box(55.5)))
    });
}

criterion_group!(benches, bench_checksum, bench_decode, bench_encode);
criterion_main!(benches);
