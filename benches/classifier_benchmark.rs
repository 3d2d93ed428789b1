use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use agrilens::{ClassVocabulary, Classifier, LesionCountExtractor};

fn leaf_png(width: u32, height: u32) -> Vec<u8> {
    // Mixed green and brown stripes so every scoring path stays warm.
    let image = RgbImage::from_fn(width, height, |x, _| {
        if (x / 8) % 2 == 0 {
            Rgb([60, 180, 60])
        } else {
            Rgb([100, 60, 20])
        }
    });
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Prediction");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    let sizes = [(64u32, 64u32), (224, 224), (1024, 768)];
    for (width, height) in sizes {
        let classifier = Classifier::builder()
            .with_vocabulary(ClassVocabulary::plant_village())
            .build()
            .unwrap();
        let bytes = leaf_png(width, height);

        group.bench_function(format!("predict_{}x{}", width, height), |b| {
            b.iter(|| classifier.predict(black_box(&bytes)))
        });
    }

    group.finish();
}

fn bench_extractors(c: &mut Criterion) {
    let mut group = c.benchmark_group("Extractors");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    let bytes = leaf_png(224, 224);

    let color = Classifier::builder()
        .with_vocabulary(ClassVocabulary::plant_village())
        .build()
        .unwrap();
    group.bench_function("color_statistics", |b| {
        b.iter(|| color.predict(black_box(&bytes)))
    });

    let lesion = Classifier::builder()
        .with_vocabulary(ClassVocabulary::plant_village())
        .with_extractor(LesionCountExtractor::default())
        .build()
        .unwrap();
    group.bench_function("lesion_count", |b| {
        b.iter(|| lesion.predict(black_box(&bytes)))
    });

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scaling");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    let bytes = leaf_png(224, 224);
    let class_counts = [2, 10, 38];
    for &count in &class_counts {
        let mut builder = Classifier::builder();
        for i in 0..count {
            builder = builder.add_class(format!("Crop {} blight", i)).unwrap();
        }
        let classifier = builder.build().unwrap();

        group.bench_function(format!("classes_{}", count), |b| {
            b.iter(|| classifier.predict(black_box(&bytes)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_prediction, bench_extractors, bench_scaling);
criterion_main!(benches);
