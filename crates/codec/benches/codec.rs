use criterion::{criterion_group, criterion_main, Criterion};
use radius_server_codec::{Code, Packet};

// RFC 2865 §7.1 Access-Request, secret "xyzzy5461".
const ACCESS_REQUEST: &[u8] = &[
    0x01, 0x00, 0x00, 0x38, 0x0f, 0x40, 0x3f, 0x94, 0x73, 0x97, 0x80, 0x57, 0xbd, 0x83, 0xd5,
    0xcb, 0x98, 0xf4, 0x22, 0x7a, 0x01, 0x06, 0x6e, 0x65, 0x6d, 0x6f, 0x02, 0x12, 0x0d, 0xbe,
    0x70, 0x8d, 0x93, 0xd4, 0x13, 0xce, 0x31, 0x96, 0xe4, 0x3f, 0x78, 0x2a, 0x0a, 0xee, 0x04,
    0x06, 0xc0, 0xa8, 0x01, 0x10, 0x05, 0x06, 0x00, 0x00, 0x00, 0x03,
];

fn criterion_benchmark(c: &mut Criterion) {
    let secret = &b"xyzzy5461"[..];
    let packet = Packet::parse(ACCESS_REQUEST, secret).unwrap();
    let response = packet.response(Code::AccessAccept);

    c.bench_function("parse_access_request", |b| {
        b.iter(|| Packet::parse(ACCESS_REQUEST, secret).unwrap())
    });

    c.bench_function("encode_access_request", |b| {
        b.iter(|| packet.encode().unwrap())
    });

    c.bench_function("encode_access_accept", |b| {
        b.iter(|| response.encode().unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
