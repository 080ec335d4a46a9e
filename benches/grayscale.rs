use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::io::Cursor;
use tiff::encoder::{colortype, Rational, TiffEncoder};
use tiff::tags::ResolutionUnit;
use tiffgrayscaler::image_pipeline::{
    ConversionConfig, ResampleFilter, TiffCompression, TiffGrayscalePipeline,
};

fn generate_mock_tiff(width: u32, height: u32, dpi: u32, pages: usize) -> Vec<u8> {
    let mut data = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut data).unwrap();
        let pixels: Vec<u8> = (0..height)
            .flat_map(|y| (0..width).map(move |x| ((x + y) % 256) as u8))
            .collect();
        for _ in 0..pages {
            let mut image = encoder.new_image::<colortype::Gray8>(width, height).unwrap();
            image.resolution(ResolutionUnit::Inch, Rational { n: dpi, d: 1 });
            image.write_data(&pixels).unwrap();
        }
    }
    data.into_inner()
}

fn benchmark_conversion_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion_by_size");

    let sizes = vec![
        (100, 100, "100x100"),
        (500, 500, "500x500"),
        (1000, 1000, "1000x1000"),
    ];

    for (width, height, label) in sizes {
        let mock_data = generate_mock_tiff(width, height, 150, 1);

        group.bench_with_input(BenchmarkId::from_parameter(label), &mock_data, |b, data| {
            let pipeline = TiffGrayscalePipeline::new(ConversionConfig::default()).unwrap();

            b.iter(|| {
                let mut output = Cursor::new(Vec::new());
                let _ = pipeline.convert(black_box(data), &mut output);
            });
        });
    }

    group.finish();
}

fn benchmark_compression_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression_levels");
    let mock_data = generate_mock_tiff(500, 500, 150, 1);

    let compressions = vec![
        (TiffCompression::DeflateFast, "fast"),
        (TiffCompression::DeflateBalanced, "balanced"),
        (TiffCompression::DeflateBest, "best"),
    ];

    for (compression, label) in compressions {
        group.bench_with_input(BenchmarkId::from_parameter(label), &mock_data, |b, data| {
            let config = ConversionConfig::builder().compression(compression).build();
            let pipeline = TiffGrayscalePipeline::new(config).unwrap();

            b.iter(|| {
                let mut output = Cursor::new(Vec::new());
                let _ = pipeline.convert(black_box(data), &mut output);
            });
        });
    }

    group.finish();
}

fn benchmark_rescale_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("rescale_filters");
    let mock_data = generate_mock_tiff(1000, 1000, 300, 1);

    let filters = vec![
        (ResampleFilter::Nearest, "nearest"),
        (ResampleFilter::Triangle, "triangle"),
        (ResampleFilter::Lanczos3, "lanczos3"),
    ];

    for (filter, label) in filters {
        group.bench_with_input(BenchmarkId::from_parameter(label), &mock_data, |b, data| {
            let config = ConversionConfig::builder().resample_filter(filter).build();
            let pipeline = TiffGrayscalePipeline::new(config).unwrap();

            b.iter(|| {
                let mut output = Cursor::new(Vec::new());
                let _ = pipeline.convert(black_box(data), &mut output);
            });
        });
    }

    group.finish();
}

fn benchmark_page_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_count");

    for pages in [1usize, 4, 16] {
        let mock_data = generate_mock_tiff(300, 300, 150, pages);

        group.bench_with_input(BenchmarkId::from_parameter(pages), &mock_data, |b, data| {
            let pipeline = TiffGrayscalePipeline::new(ConversionConfig::default()).unwrap();

            b.iter(|| {
                let mut output = Cursor::new(Vec::new());
                let _ = pipeline.convert(black_box(data), &mut output);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_conversion_sizes,
    benchmark_compression_levels,
    benchmark_rescale_filters,
    benchmark_page_count
);
criterion_main!(benches);
