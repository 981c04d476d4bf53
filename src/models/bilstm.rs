//! Bidirectional-LSTM video classifier.

use burn::config::Config;
use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::classifier::{ClassifierKind, VideoClassifier, VideoClassifierConfig};
use super::{FrameLevelModel, ModelOutput};
use crate::pooling::{pool_frames, PoolMethod};
use crate::rnn::BiLstmStack;

/// Configuration for a [`BiLstmModel`].
#[derive(Config, Debug)]
pub struct BiLstmModelConfig {
    /// Hidden width of every layer in each direction.
    #[config(default = 512)]
    pub cells: usize,
    /// Number of stacked layers per direction.
    #[config(default = 1)]
    pub layers: usize,
    /// Classify from pooled per-step outputs instead of the final states.
    #[config(default = false)]
    pub use_output: bool,
    /// Reduction over per-step outputs when `use_output` is set.
    #[config(default = "PoolMethod::Average")]
    pub pooling: PoolMethod,
    /// Classification head.
    #[config(default = "ClassifierKind::Moe")]
    pub classifier: ClassifierKind,
    /// Experts per class for the mixture head.
    #[config(default = 2)]
    pub mixtures: usize,
}

impl BiLstmModelConfig {
    /// Initialize the model for the given feature and vocabulary sizes.
    pub fn init<B: Backend>(
        &self,
        feature_size: usize,
        vocab_size: usize,
        device: &B::Device,
    ) -> BiLstmModel<B> {
        let stack = BiLstmStack::new(feature_size, self.cells, self.layers, device);
        // Both aggregation paths concatenate the two directions.
        let classifier = VideoClassifierConfig::new()
            .with_kind(self.classifier)
            .with_mixtures(self.mixtures)
            .init(2 * self.cells, vocab_size, device);

        BiLstmModel {
            stack,
            classifier,
            use_output: self.use_output,
            pooling: self.pooling,
        }
    }
}

/// Reads the sequence in both directions and classifies the concatenated
/// directional states (or a pool over the concatenated per-step outputs).
#[derive(Module, Debug)]
pub struct BiLstmModel<B: Backend> {
    stack: BiLstmStack<B>,
    classifier: VideoClassifier<B>,
    #[module(skip)]
    use_output: bool,
    #[module(skip)]
    pooling: PoolMethod,
}

impl<B: Backend> FrameLevelModel<B> for BiLstmModel<B> {
    fn forward(&self, input: Tensor<B, 3>, num_frames: &[usize]) -> ModelOutput<B> {
        let (outputs, state) = self.stack.forward(input, num_frames);

        let aggregated = if self.use_output {
            pool_frames(outputs, self.pooling)
        } else {
            state
        };

        ModelOutput {
            predictions: self.classifier.forward(aggregated),
        }
    }

    fn vocab_size(&self) -> usize {
        self.classifier.vocab_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn random_input(batch: usize, time: usize, features: usize) -> Tensor<TestBackend, 3> {
        let device = Default::default();
        Tensor::random(
            [batch, time, features],
            burn::tensor::Distribution::Uniform(-1.0, 1.0),
            &device,
        )
    }

    #[test]
    fn test_state_path_shape_and_range() {
        let device = Default::default();
        let model = BiLstmModelConfig::new()
            .with_cells(16)
            .init::<TestBackend>(8, 10, &device);

        let output = model.forward(random_input(3, 6, 8), &[6, 4, 2]);

        assert_eq!(output.predictions.dims(), [3, 10]);
        let min = output.predictions.clone().min().into_scalar();
        let max = output.predictions.max().into_scalar();
        assert!(min >= 0.0 && max <= 1.0);
    }

    #[test]
    fn test_output_pooling_path() {
        let device = Default::default();
        let model = BiLstmModelConfig::new()
            .with_cells(16)
            .with_use_output(true)
            .init::<TestBackend>(8, 10, &device);

        let output = model.forward(random_input(2, 6, 8), &[6, 6]);

        assert_eq!(output.predictions.dims(), [2, 10]);
    }
}
