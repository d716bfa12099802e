//! Benchmarks for the captioning pipeline.
//!
//! Run with: cargo bench -p captioner-core

use std::collections::HashMap;

use captioner_core::caption::{pad_sequence, CaptionDecoder};
use captioner_core::config::{Padding, TensorLayout};
use captioner_core::embedding::preprocess;
use captioner_core::{ImageEmbedding, PipelineResult, Vocabulary};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::imageops::FilterType;
use image::DynamicImage;

const VOCAB_SIZE: usize = 8000;

/// Synthetic vocabulary with markers at 1 and 2 and filler words after.
fn vocabulary() -> Vocabulary {
    let mut word_index: HashMap<String, usize> = HashMap::with_capacity(VOCAB_SIZE);
    word_index.insert("startseq".to_string(), 1);
    word_index.insert("endseq".to_string(), 2);
    for i in 3..VOCAB_SIZE {
        word_index.insert(format!("word{i}"), i);
    }
    Vocabulary::from_word_index(word_index, "startseq", "endseq").unwrap()
}

fn benchmark_decode_loop(c: &mut Criterion) {
    let vocab = vocabulary();
    let embedding = ImageEmbedding::new(vec![0.5; 1280]);
    let decoder = CaptionDecoder::new(34, Padding::Pre);

    // Never emits the end marker, so every iteration runs the full 34 steps.
    let predictor = |_: &ImageEmbedding, sequence: &[i64]| -> PipelineResult<Vec<f32>> {
        let mut scores = vec![0.0f32; VOCAB_SIZE];
        let filled = sequence.iter().filter(|&&i| i != 0).count();
        scores[3 + filled % (VOCAB_SIZE - 3)] = 1.0;
        Ok(scores)
    };

    c.bench_function("decode_34_steps", |b| {
        b.iter(|| {
            let _ = decoder.decode(black_box(&embedding), &vocab, &predictor);
        })
    });
}

fn benchmark_pad_sequence(c: &mut Criterion) {
    let indices: Vec<i64> = (1..20).collect();

    c.bench_function("pad_sequence_pre", |b| {
        b.iter(|| pad_sequence(black_box(&indices), 34, Padding::Pre))
    });
}

fn benchmark_preprocess(c: &mut Criterion) {
    let img = DynamicImage::new_rgb8(1920, 1080);

    c.bench_function("preprocess_224_nearest", |b| {
        b.iter(|| preprocess(black_box(&img), 224, FilterType::Nearest, TensorLayout::Nhwc))
    });
}

criterion_group!(
    benches,
    benchmark_decode_loop,
    benchmark_pad_sequence,
    benchmark_preprocess,
);
criterion_main!(benches);
