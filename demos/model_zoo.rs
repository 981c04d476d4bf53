//! Building every registered model by name
//!
//! This example drives the registry the way a training harness would:
//! one flat settings bag, one model name from the command line or a
//! sweep, one constructed model.

use burn::backend::NdArray;
use burn::tensor::Tensor;
use frameseq::prelude::*;

fn main() {
    println!("=== frameseq model zoo ===\n");

    type Backend = NdArray<f32>;
    let device = Default::default();

    // Modest widths so every architecture builds quickly on CPU.
    let settings = ModelSettings::new()
        .with_frame_samples(8)
        .with_dbof_cluster_size(128)
        .with_dbof_hidden_size(64)
        .with_rnn_cells(64);

    let frames = Tensor::<Backend, 3>::random(
        [2, 20, 32],
        burn::tensor::Distribution::Uniform(-1.0, 1.0),
        &device,
    );
    let num_frames = [20, 13];

    for name in [
        "FrameLevelLogisticModel",
        "DbofModel",
        "LstmModel",
        "BidirectionalLstmModel",
        "GruModel",
        "TemporalPoolingModel",
        "TemporalSkippingModel",
    ] {
        let model = match build_model::<Backend>(name, &settings, 32, 10, &device) {
            Ok(model) => model,
            Err(error) => {
                eprintln!("{name}: {error}");
                continue;
            }
        };

        let output = model.forward(frames.clone(), &num_frames);
        let mean = output.predictions.clone().mean().into_scalar();
        println!(
            "{name:<28} predictions {:?}, mean probability {mean:.3}",
            output.predictions.dims()
        );
    }

    // Unknown names fail with a typed error instead of a panic.
    match build_model::<Backend>("FancyTransformerModel", &settings, 32, 10, &device) {
        Ok(_) => unreachable!(),
        Err(error) => println!("\nunknown name rejected: {error}"),
    }

    println!("\n=== model zoo completed ===");
}
