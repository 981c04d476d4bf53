//! Basic usage of the frame-level models
//!
//! This example builds a few architectures directly from their configs and
//! pushes one padded batch of frame features through each.

use burn::backend::NdArray;
use burn::tensor::Tensor;
use frameseq::prelude::*;

fn main() {
    println!("=== frameseq basic example ===\n");

    // Use the NdArray backend (CPU)
    type Backend = NdArray<f32>;
    let device = Default::default();

    // A batch of 4 videos, padded to 30 frames of 64 features each.
    // The last two videos are shorter than the padding.
    let frames = Tensor::<Backend, 3>::random(
        [4, 30, 64],
        burn::tensor::Distribution::Uniform(-1.0, 1.0),
        &device,
    );
    let num_frames = [30, 24, 11, 3];

    // Example 1: logistic baseline over count-averaged frames
    println!("Example 1: logistic baseline");
    let logistic = LogisticModelConfig::new().init::<Backend>(64, 10, &device);
    let output = logistic.forward(frames.clone(), &num_frames);
    println!("  Predictions shape: {:?}", output.predictions.dims());
    println!();

    // Example 2: deep bag-of-frames with a mixture-of-experts head
    println!("Example 2: deep bag-of-frames");
    let dbof = DbofModelConfig::new()
        .with_frame_samples(10)
        .with_cluster_size(256)
        .with_hidden_size(128)
        .init::<Backend>(64, 10, &device);
    let output = dbof.forward(frames.clone(), &num_frames);
    println!("  Sampled 10 frames per video");
    println!("  Predictions shape: {:?}", output.predictions.dims());
    println!();

    // Example 3: two-layer LSTM classifying the final hidden state
    println!("Example 3: stacked LSTM");
    let lstm = LstmModelConfig::new()
        .with_cells(128)
        .with_layers(2)
        .init::<Backend>(64, 10, &device);
    let output = lstm.forward(frames.clone(), &num_frames);
    println!("  Predictions shape: {:?}", output.predictions.dims());
    println!();

    // Example 4: GRU with windowed attention, classifying pooled outputs
    println!("Example 4: GRU with attention");
    let gru = GruModelConfig::new()
        .with_cells(128)
        .with_augment(CellAugment::Attention { length: 8 })
        .with_use_output(true)
        .with_pooling(PoolMethod::Max)
        .init::<Backend>(64, 10, &device);
    let output = gru.forward(frames, &num_frames);
    println!("  Predictions shape: {:?}", output.predictions.dims());
    println!();

    println!("=== examples completed successfully ===");
}
