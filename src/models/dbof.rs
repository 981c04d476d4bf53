//! Deep bag-of-frames model.
//!
//! Projects each sampled frame into a high-dimensional cluster space, pools
//! across frames in that space, compresses through a hidden layer, and
//! hands the aggregate to the video-level classifier. Frame order carries
//! no signal here; the model trades it away for speed and a much wider
//! per-frame representation.

use burn::config::Config;
use burn::module::Module;
use burn::nn::{BatchNorm, BatchNormConfig, Initializer, Linear, LinearConfig};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use rand::prelude::*;

use super::classifier::{ClassifierKind, VideoClassifier, VideoClassifierConfig};
use super::{FrameLevelModel, ModelOutput};
use crate::activation::Relu6;
use crate::pooling::{pool_frames, PoolMethod};
use crate::sampling::{sample_random_frames, sample_random_sequence};

/// Configuration for a [`DbofModel`].
#[derive(Config, Debug)]
pub struct DbofModelConfig {
    /// Frames kept per example by the sampler.
    #[config(default = 30)]
    pub frame_samples: usize,
    /// Normalize activations with batch norm instead of learned biases.
    #[config(default = true)]
    pub add_batch_norm: bool,
    /// Sample frames independently; when false, sample one contiguous
    /// window instead.
    #[config(default = true)]
    pub sample_random_frames: bool,
    /// Width of the cluster projection.
    #[config(default = 8192)]
    pub cluster_size: usize,
    /// Width of the hidden layer fed to the classifier.
    #[config(default = 1024)]
    pub hidden_size: usize,
    /// Reduction across the sampled frames in cluster space.
    #[config(default = "PoolMethod::Max")]
    pub pooling: PoolMethod,
    /// Classification head.
    #[config(default = "ClassifierKind::Moe")]
    pub classifier: ClassifierKind,
    /// Experts per class for the mixture head.
    #[config(default = 2)]
    pub mixtures: usize,
    /// Seed for the frame sampler.
    #[config(default = 1111)]
    pub seed: u64,
}

impl DbofModelConfig {
    /// Initialize the model for the given feature and vocabulary sizes.
    ///
    /// Both projections use a fan-in-scaled normal initializer
    /// (std = 1/sqrt(fan_in)) so cluster activations start on a comparable
    /// scale whatever the configured widths.
    ///
    /// # Panics
    /// If `frame_samples`, `cluster_size`, or `hidden_size` is zero.
    pub fn init<B: Backend>(
        &self,
        feature_size: usize,
        vocab_size: usize,
        device: &B::Device,
    ) -> DbofModel<B> {
        if self.frame_samples == 0 {
            panic!("the sampler must keep at least one frame per example");
        }
        if self.cluster_size == 0 || self.hidden_size == 0 {
            panic!("cluster and hidden widths must be at least 1");
        }

        log::debug!(
            "building dbof: {} features -> {} clusters -> {} hidden, {:?} pooling",
            feature_size,
            self.cluster_size,
            self.hidden_size,
            self.pooling
        );

        // Batch norm replaces the per-layer biases when enabled.
        let cluster = LinearConfig::new(feature_size, self.cluster_size)
            .with_bias(!self.add_batch_norm)
            .with_initializer(Initializer::Normal {
                mean: 0.0,
                std: 1.0 / (feature_size as f64).sqrt(),
            })
            .init(device);
        let hidden = LinearConfig::new(self.cluster_size, self.hidden_size)
            .with_bias(!self.add_batch_norm)
            .with_initializer(Initializer::Normal {
                mean: 0.0,
                std: 1.0 / (self.cluster_size as f64).sqrt(),
            })
            .init(device);

        let (input_norm, cluster_norm, hidden_norm) = if self.add_batch_norm {
            (
                Some(BatchNormConfig::new(feature_size).init(device)),
                Some(BatchNormConfig::new(self.cluster_size).init(device)),
                Some(BatchNormConfig::new(self.hidden_size).init(device)),
            )
        } else {
            (None, None, None)
        };

        let classifier = VideoClassifierConfig::new()
            .with_kind(self.classifier)
            .with_mixtures(self.mixtures)
            .init(self.hidden_size, vocab_size, device);

        DbofModel {
            input_norm,
            cluster,
            cluster_norm,
            hidden,
            hidden_norm,
            classifier,
            frame_samples: self.frame_samples,
            sample_random_frames: self.sample_random_frames,
            pooling: self.pooling,
            seed: self.seed,
            cluster_size: self.cluster_size,
            hidden_size: self.hidden_size,
        }
    }
}

/// Cluster-projection / pooling / hidden-projection aggregation with a
/// pluggable classification head.
#[derive(Module, Debug)]
pub struct DbofModel<B: Backend> {
    input_norm: Option<BatchNorm<B, 1>>,
    cluster: Linear<B>,
    cluster_norm: Option<BatchNorm<B, 1>>,
    hidden: Linear<B>,
    hidden_norm: Option<BatchNorm<B, 1>>,
    classifier: VideoClassifier<B>,
    #[module(skip)]
    frame_samples: usize,
    #[module(skip)]
    sample_random_frames: bool,
    #[module(skip)]
    pooling: PoolMethod,
    #[module(skip)]
    seed: u64,
    #[module(skip)]
    cluster_size: usize,
    #[module(skip)]
    hidden_size: usize,
}

impl<B: Backend> DbofModel<B> {
    /// Width of the aggregate handed to the classifier.
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Aggregate already-sampled frames to `[batch, hidden_size]`.
    ///
    /// Exposed separately from [`FrameLevelModel::forward`] so the
    /// representation can be inspected or reused without the classifier.
    pub fn encode(&self, sampled: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch_size, samples, feature_size] = sampled.dims();

        let flat = sampled.reshape([batch_size * samples, feature_size]);
        let flat = apply_norm(&self.input_norm, flat);

        let clusters = Relu6::forward(apply_norm(
            &self.cluster_norm,
            self.cluster.forward(flat),
        ));

        let pooled = pool_frames(
            clusters.reshape([batch_size, samples, self.cluster_size]),
            self.pooling,
        );

        Relu6::forward(apply_norm(&self.hidden_norm, self.hidden.forward(pooled)))
    }
}

/// Batch norm over `[n, channels]` activations, expressed on a
/// `[n, channels, 1]` view since Burn's norm expects a spatial axis.
fn apply_norm<B: Backend>(norm: &Option<BatchNorm<B, 1>>, x: Tensor<B, 2>) -> Tensor<B, 2> {
    match norm {
        Some(norm) => {
            let [n, channels] = x.dims();
            norm.forward(x.reshape([n, channels, 1]))
                .reshape([n, channels])
        }
        None => x,
    }
}

impl<B: Backend> FrameLevelModel<B> for DbofModel<B> {
    fn forward(&self, input: Tensor<B, 3>, num_frames: &[usize]) -> ModelOutput<B> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let sampled = if self.sample_random_frames {
            sample_random_frames(input, num_frames, self.frame_samples, &mut rng)
        } else {
            sample_random_sequence(input, num_frames, self.frame_samples, &mut rng)
        };

        let aggregated = self.encode(sampled);
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

    fn small_config() -> DbofModelConfig {
        DbofModelConfig::new()
            .with_frame_samples(6)
            .with_cluster_size(32)
            .with_hidden_size(16)
    }

    fn random_input(batch: usize, time: usize, features: usize) -> Tensor<TestBackend, 3> {
        let device = Default::default();
        Tensor::random(
            [batch, time, features],
            burn::tensor::Distribution::Uniform(-1.0, 1.0),
            &device,
        )
    }

    #[test]
    fn test_encode_shape() {
        let device = Default::default();
        let model = small_config().init::<TestBackend>(10, 20, &device);

        let sampled = random_input(4, 6, 10);
        let encoded = model.encode(sampled);

        assert_eq!(encoded.dims(), [4, 16]);
    }

    #[test]
    fn test_encode_is_bounded_by_capped_relu() {
        let device = Default::default();
        let model = small_config().init::<TestBackend>(10, 20, &device);

        let encoded = model.encode(random_input(4, 6, 10) * 100.0);

        let min = encoded.clone().min().into_scalar();
        let max = encoded.max().into_scalar();
        assert!(min >= 0.0 && max <= 6.0);
    }

    #[test]
    fn test_forward_shape_and_range() {
        let device = Default::default();
        let model = small_config().init::<TestBackend>(10, 20, &device);

        let output = model.forward(random_input(3, 12, 10), &[12, 5, 1]);

        assert_eq!(output.predictions.dims(), [3, 20]);
        let min = output.predictions.clone().min().into_scalar();
        let max = output.predictions.max().into_scalar();
        assert!(min >= 0.0 && max <= 1.0);
    }

    #[test]
    fn test_forward_without_batch_norm() {
        let device = Default::default();
        let model = small_config()
            .with_add_batch_norm(false)
            .init::<TestBackend>(10, 20, &device);

        let output = model.forward(random_input(2, 8, 10), &[8, 3]);

        assert_eq!(output.predictions.dims(), [2, 20]);
    }

    #[test]
    fn test_forward_with_sequence_sampler() {
        let device = Default::default();
        let model = small_config()
            .with_sample_random_frames(false)
            .init::<TestBackend>(10, 20, &device);

        let output = model.forward(random_input(2, 8, 10), &[8, 4]);

        assert_eq!(output.predictions.dims(), [2, 20]);
    }

    #[test]
    fn test_forward_is_deterministic_for_fixed_seed() {
        let device = Default::default();
        let model = small_config().init::<TestBackend>(10, 20, &device);

        let input = random_input(2, 10, 10);
        let a = model.forward(input.clone(), &[10, 6]);
        let b = model.forward(input, &[10, 6]);

        let diff = (a.predictions - b.predictions).abs().sum().into_scalar();
        assert!(diff < 1e-6, "same seed must sample the same frames");
    }

    #[test]
    #[should_panic(expected = "at least one frame")]
    fn test_zero_samples_panics() {
        let device = Default::default();
        let _ = small_config()
            .with_frame_samples(0)
            .init::<TestBackend>(10, 20, &device);
    }
}
