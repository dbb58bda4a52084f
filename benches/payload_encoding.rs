use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use qrforge::models::{
    ContentKind, ErrorCorrectionLevel, PayloadConfig, RenderParams, Shape, VCardConfig, WifiConfig,
};
use qrforge::payload;
use qrforge::render::render_payload;

fn sample_configs() -> Vec<(&'static str, PayloadConfig)> {
    vec![
        ("url", PayloadConfig::new(ContentKind::Url).with_text("example.com/landing?ref=bench")),
        ("text", PayloadConfig::new(ContentKind::Text).with_text("hello ".repeat(20))),
        (
            "wifi",
            PayloadConfig::new(ContentKind::Wifi).with_wifi(WifiConfig {
                ssid: "Office Network".to_string(),
                password: "correct horse battery staple".to_string(),
                ..WifiConfig::default()
            }),
        ),
        (
            "vcard",
            PayloadConfig::new(ContentKind::Vcard).with_vcard(VCardConfig {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                organization: "Analytical Engines".to_string(),
                phone: "+441234567890".to_string(),
                email: "ada@example.com".to_string(),
                url: "https://example.com".to_string(),
            }),
        ),
    ]
}

fn bench_payload_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload_encode");

    for (name, config) in sample_configs() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, config| {
            b.iter(|| payload::encode_if_ready(black_box(config)));
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_payload");
    group.sample_size(20);

    // Longer payloads mean more modules to rasterize
    for len in [16, 256, 1024].iter() {
        let payload = "x".repeat(*len);
        let params =
            RenderParams { error_correction_level: ErrorCorrectionLevel::L, ..Default::default() };

        group.throughput(Throughput::Bytes(*len as u64));
        group.bench_with_input(BenchmarkId::new("square", len), &payload, |b, payload| {
            b.iter(|| render_payload(black_box(payload), &params));
        });
    }

    let payload = "https://example.com";
    for shape in [Shape::Square, Shape::Rounded, Shape::Circle] {
        let params = RenderParams { shape, ..Default::default() };
        group.bench_with_input(BenchmarkId::new("shape", shape), &params, |b, params| {
            b.iter(|| render_payload(black_box(payload), params));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_payload_encode, bench_render);
criterion_main!(benches);
