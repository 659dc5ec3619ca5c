use camera_capture::VideoFrame;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use marker_detection::{DetectionConfig, MarkerDetector};

fn track_frame() -> VideoFrame {
    let mut frame = VideoFrame::filled(640, 480, [40, 40, 40, 255], 0);
    for i in 0..6 {
        frame.fill_rect(40 + i * 30, 260 + i * 25, 14, 20, [255, 0, 0, 255]);
        frame.fill_rect(560 - i * 30, 260 + i * 25, 14, 20, [0, 255, 255, 255]);
    }
    frame
}

fn bench_detect(c: &mut Criterion) {
    let detector = MarkerDetector::new(&DetectionConfig::default()).expect("default config");
    let frame = track_frame();

    c.bench_function("detect_640x480", |b| {
        b.iter(|| detector.detect(black_box(&frame)))
    });
}

criterion_group!(benches, bench_detect);
criterion_main!(benches);
