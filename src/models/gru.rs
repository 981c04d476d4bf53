//! Stacked-GRU video classifier.

use burn::config::Config;
use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::classifier::{ClassifierKind, VideoClassifier, VideoClassifierConfig};
use super::{FrameLevelModel, ModelOutput};
use crate::cells::CellAugment;
use crate::pooling::{pool_frames, PoolMethod};
use crate::rnn::GruStack;

/// Configuration for a [`GruModel`].
#[derive(Config, Debug)]
pub struct GruModelConfig {
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

impl GruModelConfig {
    /// Initialize the model for the given feature and vocabulary sizes.
    pub fn init<B: Backend>(
        &self,
        feature_size: usize,
        vocab_size: usize,
        device: &B::Device,
    ) -> GruModel<B> {
        let stack = GruStack::new(feature_size, self.cells, self.layers, self.augment, device);
        let classifier = VideoClassifierConfig::new()
            .with_kind(self.classifier)
            .with_mixtures(self.mixtures)
            .init(self.cells, vocab_size, device);

        GruModel {
            stack,
            classifier,
            use_output: self.use_output,
            pooling: self.pooling,
        }
    }
}

/// GRU counterpart of [`crate::models::LstmModel`]: a lighter cell with a
/// single state tensor, otherwise the same sequence-then-classify shape.
#[derive(Module, Debug)]
pub struct GruModel<B: Backend> {
    stack: GruStack<B>,
    classifier: VideoClassifier<B>,
    #[module(skip)]
    use_output: bool,
    #[module(skip)]
    pooling: PoolMethod,
}

impl<B: Backend> FrameLevelModel<B> for GruModel<B> {
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
