//! Logistic regression over count-averaged frame features.
//!
//! The minimal reference point for every other model in the crate: average
//! the valid frames, apply one sigmoid layer. Anything that cannot beat
//! this is not learning anything from frame order or interactions.

use burn::config::Config;
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::{FrameLevelModel, ModelOutput};
use crate::rnn::check_lengths;

/// Mean of each example's valid frames: the time-axis sum divided by the
/// true frame count rather than the padded length.
///
/// Padding rows are assumed zero, as produced by the dataset reader; they
/// contribute nothing to the sum, so only the divisor needs the true count.
/// A zero count is treated as one to keep the division defined.
pub fn average_frames<B: Backend>(input: Tensor<B, 3>, num_frames: &[usize]) -> Tensor<B, 2> {
    let [batch_size, max_frames, feature_size] = input.dims();
    check_lengths(batch_size, max_frames, num_frames);

    let counts: Vec<f32> = num_frames.iter().map(|&count| count.max(1) as f32).collect();
    let denominators = Tensor::<B, 1>::from_floats(counts.as_slice(), &input.device())
        .reshape([batch_size, 1])
        .expand([batch_size, feature_size]);

    let summed: Tensor<B, 2> = input.sum_dim(1).squeeze(1);
    summed / denominators
}

/// Configuration for a [`LogisticModel`].
#[derive(Config, Debug)]
pub struct LogisticModelConfig {
    /// L2 penalty the training loop should apply to the output weights.
    #[config(default = 1e-8)]
    pub l2_penalty: f64,
}

impl LogisticModelConfig {
    /// Initialize the model for the given feature and vocabulary sizes.
    pub fn init<B: Backend>(
        &self,
        feature_size: usize,
        vocab_size: usize,
        device: &B::Device,
    ) -> LogisticModel<B> {
        LogisticModel {
            output: LinearConfig::new(feature_size, vocab_size).init(device),
            vocab_size,
            l2_penalty: self.l2_penalty,
        }
    }
}

/// Sigmoid layer over the count-aware average of the frame features.
#[derive(Module, Debug)]
pub struct LogisticModel<B: Backend> {
    output: Linear<B>,
    #[module(skip)]
    vocab_size: usize,
    #[module(skip)]
    l2_penalty: f64,
}

impl<B: Backend> LogisticModel<B> {
    /// Weight penalty the optimizer is expected to apply as decay on the
    /// output layer.
    pub fn l2_penalty(&self) -> f64 {
        self.l2_penalty
    }
}

impl<B: Backend> FrameLevelModel<B> for LogisticModel<B> {
    fn forward(&self, input: Tensor<B, 3>, num_frames: &[usize]) -> ModelOutput<B> {
        let averaged = average_frames(input, num_frames);
        ModelOutput {
            predictions: activation::sigmoid(self.output.forward(averaged)),
        }
    }

    fn vocab_size(&self) -> usize {
        self.vocab_size
    }
}
