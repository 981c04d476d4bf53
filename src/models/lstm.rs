//! Stacked-LSTM video classifier.

use burn::config::Config;
use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::classifier::{ClassifierKind, VideoClassifier, VideoClassifierConfig};
use super::{FrameLevelModel, ModelOutput};
use crate::cells::CellAugment;
use crate::pooling::{pool_frames, PoolMethod};
use crate::rnn::LstmStack;

/// Configuration for an [`LstmModel`].
#[derive(Config, Debug)]
pub struct LstmModelConfig {
    /// Hidden width of every layer.
    #[config(default = 512)]
    pub cells: usize,
    /// Number of stacked layers.
    #[config(default = 1)]
    pub layers: usize,
    /// Optional per-layer augment (attention or residual).
    #[config(default = "CellAugment::None")]
    pub augment: CellAugment,
    /// Classify from pooled per-step outputs instead of the final state.
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

impl LstmModelConfig {
    /// Initialize the model for the given feature and vocabulary sizes.
    pub fn init<B: Backend>(
        &self,
        feature_size: usize,
        vocab_size: usize,
        device: &B::Device,
    ) -> LstmModel<B> {
        let stack = LstmStack::new(feature_size, self.cells, self.layers, self.augment, device);
        let classifier = VideoClassifierConfig::new()
            .with_kind(self.classifier)
            .with_mixtures(self.mixtures)
            .init(self.cells, vocab_size, device);

        LstmModel {
            stack,
            classifier,
            use_output: self.use_output,
            pooling: self.pooling,
        }
    }
}

/// Runs the full frame sequence through a stack of LSTM layers and
/// classifies either the final hidden state or a pool over the per-step
/// outputs.
#[derive(Module, Debug)]
pub struct LstmModel<B: Backend> {
    stack: LstmStack<B>,
    classifier: VideoClassifier<B>,
    #[module(skip)]
    use_output: bool,
    #[module(skip)]
    pooling: PoolMethod,
}

impl<B: Backend> FrameLevelModel<B> for LstmModel<B> {
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

    fn small_config() -> LstmModelConfig {
        LstmModelConfig::new().with_cells(16).with_layers(2)
    }

    #[test]
    fn test_state_path_shape_and_range() {
        let device = Default::default();
        let model = small_config().init::<TestBackend>(8, 10, &device);

        let output = model.forward(random_input(3, 6, 8), &[6, 4, 1]);

        assert_eq!(output.predictions.dims(), [3, 10]);
        let min = output.predictions.clone().min().into_scalar();
        let max = output.predictions.max().into_scalar();
        assert!(min >= 0.0 && max <= 1.0);
    }

    #[test]
    fn test_output_pooling_path() {
        let device = Default::default();
        let model = small_config()
            .with_use_output(true)
            .init::<TestBackend>(8, 10, &device);

        let output = model.forward(random_input(2, 6, 8), &[6, 6]);

        assert_eq!(output.predictions.dims(), [2, 10]);
    }

    #[test]
    fn test_attention_augment() {
        let device = Default::default();
        let model = small_config()
            .with_augment(CellAugment::Attention { length: 3 })
            .init::<TestBackend>(8, 10, &device);

        let output = model.forward(random_input(2, 6, 8), &[6, 3]);

        assert_eq!(output.predictions.dims(), [2, 10]);
    }

    #[test]
    fn test_residual_augment() {
        let device = Default::default();
        // Residual layers need the input width to match the hidden width.
        let model = LstmModelConfig::new()
            .with_cells(8)
            .with_layers(2)
            .with_augment(CellAugment::Residual)
            .init::<TestBackend>(8, 10, &device);

        let output = model.forward(random_input(2, 5, 8), &[5, 5]);

        assert_eq!(output.predictions.dims(), [2, 10]);
    }
}
