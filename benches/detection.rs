use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hue_arm_calib::{detect, DetectorConfig};
use opencv::{
    core::{Mat, Point, Scalar, CV_8UC3},
    imgproc::{self, LINE_8},
    prelude::*,
};

fn synthetic_frame() -> Mat {
    let mut frame = Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::all(0.0)).unwrap();
    for (center, radius) in [
        (Point::new(320, 240), 40),
        (Point::new(200, 150), 25),
        (Point::new(450, 330), 60),
    ] {
        imgproc::circle(
            &mut frame,
            center,
            radius,
            Scalar::new(255.0, 0.0, 0.0, 0.0),
            -1,
            LINE_8,
            0,
        )
        .unwrap();
    }
    frame
}

fn benchmark_detection(c: &mut Criterion) {
    let frame = synthetic_frame();

    c.bench_function("detect_default_config", |b| {
        let config = DetectorConfig::default();
        b.iter(|| detect(black_box(&frame), config).unwrap())
    });

    c.bench_function("detect_three_targets", |b| {
        let config = DetectorConfig {
            lower_bound: [110, 200, 200],
            upper_bound: [130, 255, 255],
            ..Default::default()
        };
        b.iter(|| detect(black_box(&frame), config).unwrap())
    });
}

criterion_group!(benches, benchmark_detection);
criterion_main!(benches);
