//! Two-stage recurrent networks with a sequence-length reduction between
//! the stages.
//!
//! Stage one reads every frame; the reduction shortens the sequence; stage
//! two reads the shortened sequence and sees a coarser timescale. Both
//! stages contribute to the aggregate, so fine and coarse temporal
//! structure reach the classifier together:
//!
//! - [`TemporalPoolingModel`] reduces with window pooling (or a learned
//!   1-D convolution),
//! - [`TemporalSkippingModel`] reduces by keeping every k-th step.

use burn::config::Config;
use burn::module::Module;
use burn::nn::conv::{Conv1d, Conv1dConfig};
use burn::nn::PaddingConfig1d;
use burn::tensor::backend::Backend;
use burn::tensor::module::{avg_pool1d, max_pool1d};
use burn::tensor::Tensor;

use super::classifier::{ClassifierKind, VideoClassifier, VideoClassifierConfig};
use super::{FrameLevelModel, ModelOutput};
use crate::cells::CellAugment;
use crate::pooling::{
    pool_frames, pooled_length, strided_length, temporal_stride, PoolMethod, TemporalPoolMethod,
};
use crate::rnn::GruStack;

/// Configuration for a [`TemporalPoolingModel`].
#[derive(Config, Debug)]
pub struct TemporalPoolingModelConfig {
    /// Hidden width of both recurrent stages.
    #[config(default = 512)]
    pub cells: usize,
    /// Window length of the reduction stage.
    #[config(default = 3)]
    pub pool_size: usize,
    /// Stride of the reduction stage.
    #[config(default = 1)]
    pub pool_stride: usize,
    /// Window reduction; ignored when `learned_pooling` is set.
    #[config(default = "TemporalPoolMethod::Average")]
    pub pool_type: TemporalPoolMethod,
    /// Replace the fixed window reduction with a learned 1-D convolution.
    #[config(default = false)]
    pub learned_pooling: bool,
    /// Classify from pooled per-step outputs of both stages instead of
    /// their concatenated final states.
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

impl TemporalPoolingModelConfig {
    /// Initialize the model for the given feature and vocabulary sizes.
    ///
    /// # Panics
    /// If `pool_size` or `pool_stride` is zero.
    pub fn init<B: Backend>(
        &self,
        feature_size: usize,
        vocab_size: usize,
        device: &B::Device,
    ) -> TemporalPoolingModel<B> {
        if self.pool_size == 0 || self.pool_stride == 0 {
            panic!("pooling window and stride must be at least 1");
        }

        let first = GruStack::new(feature_size, self.cells, 1, CellAugment::None, device);
        let second = GruStack::new(self.cells, self.cells, 1, CellAugment::None, device);

        let pool_conv = self.learned_pooling.then(|| {
            Conv1dConfig::new(self.cells, self.cells, self.pool_size)
                .with_stride(self.pool_stride)
                .with_padding(PaddingConfig1d::Valid)
                .with_bias(false)
                .init(device)
        });

        // The state path concatenates both stage states; the output path
        // pools over same-width outputs.
        let classifier_input = if self.use_output { self.cells } else { 2 * self.cells };
        let classifier = VideoClassifierConfig::new()
            .with_kind(self.classifier)
            .with_mixtures(self.mixtures)
            .init(classifier_input, vocab_size, device);

        TemporalPoolingModel {
            first,
            second,
            pool_conv,
            classifier,
            pool_size: self.pool_size,
            pool_stride: self.pool_stride,
            pool_type: self.pool_type,
            use_output: self.use_output,
            pooling: self.pooling,
        }
    }
}

/// GRU, window-pool (fixed or learned), GRU again; classify both stages.
#[derive(Module, Debug)]
pub struct TemporalPoolingModel<B: Backend> {
    first: GruStack<B>,
    second: GruStack<B>,
    pool_conv: Option<Conv1d<B>>,
    classifier: VideoClassifier<B>,
    #[module(skip)]
    pool_size: usize,
    #[module(skip)]
    pool_stride: usize,
    #[module(skip)]
    pool_type: TemporalPoolMethod,
    #[module(skip)]
    use_output: bool,
    #[module(skip)]
    pooling: PoolMethod,
}

impl<B: Backend> FrameLevelModel<B> for TemporalPoolingModel<B> {
    fn forward(&self, input: Tensor<B, 3>, num_frames: &[usize]) -> ModelOutput<B> {
        let [_, max_frames, _] = input.dims();
        if max_frames < self.pool_size {
            panic!(
                "padded length {} is shorter than the pooling window {}",
                max_frames, self.pool_size
            );
        }

        let (first_out, first_state) = self.first.forward(input, num_frames);

        // Window reduction runs over [batch, channels, time].
        let reduced = match &self.pool_conv {
            Some(conv) => conv.forward(first_out.clone().swap_dims(1, 2)).swap_dims(1, 2),
            None => {
                let channel_major = first_out.clone().swap_dims(1, 2);
                let pooled = match self.pool_type {
                    TemporalPoolMethod::Average => {
                        avg_pool1d(channel_major, self.pool_size, self.pool_stride, 0, true)
                    }
                    TemporalPoolMethod::Max => {
                        max_pool1d(channel_major, self.pool_size, self.pool_stride, 0, 1)
                    }
                };
                pooled.swap_dims(1, 2)
            }
        };

        let reduced_frames: Vec<usize> = num_frames
            .iter()
            .map(|&count| pooled_length(count, self.pool_size, self.pool_stride))
            .collect();

        let (second_out, second_state) = self.second.forward(reduced, &reduced_frames);

        let aggregated = if self.use_output {
            pool_frames(Tensor::cat(vec![first_out, second_out], 1), self.pooling)
        } else {
            Tensor::cat(vec![first_state, second_state], 1)
        };

        ModelOutput {
            predictions: self.classifier.forward(aggregated),
        }
    }

    fn vocab_size(&self) -> usize {
        self.classifier.vocab_size()
    }
}

/// Configuration for a [`TemporalSkippingModel`].
#[derive(Config, Debug)]
pub struct TemporalSkippingModelConfig {
    /// Hidden width of both recurrent stages.
    #[config(default = 512)]
    pub cells: usize,
    /// Keep every `time_skip`-th step between the stages.
    #[config(default = 2)]
    pub time_skip: usize,
    /// Classify from pooled per-step outputs of both stages instead of
    /// their concatenated final states.
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

impl TemporalSkippingModelConfig {
    /// Initialize the model for the given feature and vocabulary sizes.
    ///
    /// # Panics
    /// If `time_skip` is zero.
    pub fn init<B: Backend>(
        &self,
        feature_size: usize,
        vocab_size: usize,
        device: &B::Device,
    ) -> TemporalSkippingModel<B> {
        if self.time_skip == 0 {
            panic!("time skip must be at least 1");
        }

        let first = GruStack::new(feature_size, self.cells, 1, CellAugment::None, device);
        let second = GruStack::new(self.cells, self.cells, 1, CellAugment::None, device);

        let classifier_input = if self.use_output { self.cells } else { 2 * self.cells };
        let classifier = VideoClassifierConfig::new()
            .with_kind(self.classifier)
            .with_mixtures(self.mixtures)
            .init(classifier_input, vocab_size, device);

        TemporalSkippingModel {
            first,
            second,
            classifier,
            time_skip: self.time_skip,
            use_output: self.use_output,
            pooling: self.pooling,
        }
    }
}

/// GRU, keep every k-th step, GRU again; classify both stages.
#[derive(Module, Debug)]
pub struct TemporalSkippingModel<B: Backend> {
    first: GruStack<B>,
    second: GruStack<B>,
    classifier: VideoClassifier<B>,
    #[module(skip)]
    time_skip: usize,
    #[module(skip)]
    use_output: bool,
    #[module(skip)]
    pooling: PoolMethod,
}

impl<B: Backend> FrameLevelModel<B> for TemporalSkippingModel<B> {
    fn forward(&self, input: Tensor<B, 3>, num_frames: &[usize]) -> ModelOutput<B> {
        let (first_out, first_state) = self.first.forward(input, num_frames);

        let skipped = temporal_stride(first_out.clone(), self.time_skip);
        // An example's reduced length is the number of kept steps that fall
        // inside its valid prefix.
        let reduced_frames: Vec<usize> = num_frames
            .iter()
            .map(|&count| strided_length(count, self.time_skip))
            .collect();

        let (second_out, second_state) = self.second.forward(skipped, &reduced_frames);

        let aggregated = if self.use_output {
            pool_frames(Tensor::cat(vec![first_out, second_out], 1), self.pooling)
        } else {
            Tensor::cat(vec![first_state, second_state], 1)
        };

        ModelOutput {
            predictions: self.classifier.forward(aggregated),
        }
    }

    fn vocab_size(&self) -> usize {
        self.classifier.vocab_size()
    }
}
