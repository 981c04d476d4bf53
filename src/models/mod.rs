//! # Frame-level models
//!
//! Every model in this module consumes a padded batch of per-frame feature
//! vectors together with each example's true frame count and produces
//! per-class probabilities. **The [`FrameLevelModel`] trait is the uniform
//! contract**; the concrete models differ only in how they collapse the
//! time axis:
//!
//! | Model | Aggregation |
//! |-------|-------------|
//! | [`LogisticModel`] | count-aware average of the frames |
//! | [`DbofModel`] | cluster projection then pooling over sampled frames |
//! | [`LstmModel`] | stacked LSTM over the full sequence |
//! | [`BiLstmModel`] | forward + backward LSTM stacks |
//! | [`GruModel`] | stacked GRU over the full sequence |
//! | [`TemporalPoolingModel`] | GRU, window pooling, GRU |
//! | [`TemporalSkippingModel`] | GRU, uniform striding, GRU |
//!
//! All of them finish by delegating to a [`VideoClassifier`] selected by
//! configuration.
//!
//! ## By-name construction
//!
//! [`build_model`] resolves a model name against [`ModelSettings`], a flat
//! bag of hyperparameters with working defaults, and returns the matching
//! model wrapped in the [`FrameModel`] dispatch enum:
//!
//! ```ignore
//! use frameseq::models::{build_model, FrameLevelModel, ModelSettings};
//!
//! let settings = ModelSettings::new();
//! let model = build_model::<Backend>("DbofModel", &settings, 1024, 3862, &device)?;
//! let output = model.forward(frames, &num_frames);
//! ```

pub mod bilstm;
pub mod classifier;
pub mod dbof;
pub mod gru;
pub mod logistic;
pub mod lstm;
pub mod temporal;

pub use bilstm::{BiLstmModel, BiLstmModelConfig};
pub use classifier::{ClassifierKind, VideoClassifier, VideoClassifierConfig};
pub use dbof::{DbofModel, DbofModelConfig};
pub use gru::{GruModel, GruModelConfig};
pub use logistic::{average_frames, LogisticModel, LogisticModelConfig};
pub use lstm::{LstmModel, LstmModelConfig};
pub use temporal::{
    TemporalPoolingModel, TemporalPoolingModelConfig, TemporalSkippingModel,
    TemporalSkippingModelConfig,
};

use burn::config::Config;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::cells::CellAugment;
use crate::error::ModelError;
use crate::pooling::{PoolMethod, TemporalPoolMethod};

/// Predictions produced by one forward pass.
pub struct ModelOutput<B: Backend> {
    /// Per-class probabilities in [0, 1], shape `[batch, vocab_size]`.
    pub predictions: Tensor<B, 2>,
}

/// Uniform contract of every frame-level model.
pub trait FrameLevelModel<B: Backend> {
    /// Classify a padded batch of frame features.
    ///
    /// # Arguments
    /// * `input` - Frame features of shape `[batch, max_frames, features]`;
    ///   rows past an example's true count are padding
    /// * `num_frames` - True frame count per example
    ///
    /// # Panics
    /// If `num_frames.len()` differs from the batch size or any count
    /// exceeds the padded length.
    fn forward(&self, input: Tensor<B, 3>, num_frames: &[usize]) -> ModelOutput<B>;

    /// Number of output classes.
    fn vocab_size(&self) -> usize;
}

/// Flat hyperparameter bag for by-name model construction.
///
/// Every field has a working default, so `ModelSettings::new()` builds any
/// registered model out of the box; callers override only what they tune.
#[derive(Config, Debug)]
pub struct ModelSettings {
    /// Frames kept per example by the bag-of-frames sampler.
    #[config(default = 30)]
    pub frame_samples: usize,
    /// Batch-normalize the bag-of-frames projections.
    #[config(default = true)]
    pub dbof_add_batch_norm: bool,
    /// Sample frames independently; when false, sample a contiguous window.
    #[config(default = true)]
    pub sample_random_frames: bool,
    /// Width of the bag-of-frames cluster projection.
    #[config(default = 8192)]
    pub dbof_cluster_size: usize,
    /// Width of the bag-of-frames hidden layer.
    #[config(default = 1024)]
    pub dbof_hidden_size: usize,
    /// Pooling across sampled frames in cluster space.
    #[config(default = "PoolMethod::Max")]
    pub dbof_pooling: PoolMethod,
    /// Classification head used by every model.
    #[config(default = "ClassifierKind::Moe")]
    pub classifier: ClassifierKind,
    /// Experts per class for the mixture head.
    #[config(default = 2)]
    pub moe_mixtures: usize,
    /// Hidden width of the recurrent models.
    #[config(default = 512)]
    pub rnn_cells: usize,
    /// Layer count of the recurrent models.
    #[config(default = 1)]
    pub rnn_layers: usize,
    /// Wrap recurrent layers with windowed attention.
    #[config(default = false)]
    pub use_attention: bool,
    /// Wrap recurrent layers with residual connections.
    #[config(default = false)]
    pub use_residuals: bool,
    /// Window length when `use_attention` is set.
    #[config(default = 16)]
    pub attention_length: usize,
    /// Classify from pooled per-step outputs instead of final states.
    #[config(default = false)]
    pub use_rnn_output: bool,
    /// Reduction over per-step outputs when `use_rnn_output` is set.
    #[config(default = "PoolMethod::Average")]
    pub pooling: PoolMethod,
    /// Window length of the temporal pooling reduction.
    #[config(default = 3)]
    pub pool_size: usize,
    /// Stride of the temporal pooling reduction.
    #[config(default = 1)]
    pub pool_stride: usize,
    /// Window reduction of the temporal pooling network.
    #[config(default = "TemporalPoolMethod::Average")]
    pub pool_type: TemporalPoolMethod,
    /// Learn the temporal reduction as a 1-D convolution.
    #[config(default = false)]
    pub learned_pooling: bool,
    /// Step of the temporal skipping reduction.
    #[config(default = 2)]
    pub time_skip: usize,
    /// Seed for the bag-of-frames sampler.
    #[config(default = 1111)]
    pub sample_seed: u64,
    /// L2 penalty recorded on the logistic baseline.
    #[config(default = 1e-8)]
    pub l2_penalty: f64,
}

impl ModelSettings {
    /// Resolve the attention/residual flags into a per-layer augment.
    ///
    /// The flags mirror the flat hyperparameter surface; the augment enum
    /// is what the stacks consume.
    fn augment(&self) -> Result<CellAugment, ModelError> {
        match (self.use_attention, self.use_residuals) {
            (true, true) => Err(ModelError::ConflictingAugments),
            (true, false) => Ok(CellAugment::Attention {
                length: self.attention_length,
            }),
            (false, true) => Ok(CellAugment::Residual),
            (false, false) => Ok(CellAugment::None),
        }
    }
}

/// Registered frame-level model architectures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    /// [`LogisticModel`]
    Logistic,
    /// [`DbofModel`]
    Dbof,
    /// [`LstmModel`]
    Lstm,
    /// [`BiLstmModel`]
    BidirectionalLstm,
    /// [`GruModel`]
    Gru,
    /// [`TemporalPoolingModel`]
    TemporalPooling,
    /// [`TemporalSkippingModel`]
    TemporalSkipping,
}

impl FromStr for ModelKind {
    type Err = ModelError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "FrameLevelLogisticModel" | "logistic" => Ok(Self::Logistic),
            "DbofModel" | "dbof" => Ok(Self::Dbof),
            "LstmModel" | "lstm" => Ok(Self::Lstm),
            "BidirectionalLstmModel" | "bilstm" => Ok(Self::BidirectionalLstm),
            "GruModel" | "gru" => Ok(Self::Gru),
            "TemporalPoolingModel" | "temporal_pooling" => Ok(Self::TemporalPooling),
            "TemporalSkippingModel" | "temporal_skipping" => Ok(Self::TemporalSkipping),
            _ => Err(ModelError::UnknownModel(name.to_string())),
        }
    }
}

/// A frame-level model constructed by name.
///
/// Dispatch wrapper over the concrete model modules; match on it to reach
/// the underlying module, for example to hand its parameters to an
/// optimizer.
#[derive(Debug)]
pub enum FrameModel<B: Backend> {
    /// Logistic baseline.
    Logistic(LogisticModel<B>),
    /// Deep bag-of-frames.
    Dbof(DbofModel<B>),
    /// Stacked LSTM.
    Lstm(LstmModel<B>),
    /// Bidirectional LSTM.
    BidirectionalLstm(BiLstmModel<B>),
    /// Stacked GRU.
    Gru(GruModel<B>),
    /// Two-stage GRU with window pooling.
    TemporalPooling(TemporalPoolingModel<B>),
    /// Two-stage GRU with uniform striding.
    TemporalSkipping(TemporalSkippingModel<B>),
}

impl<B: Backend> FrameLevelModel<B> for FrameModel<B> {
    fn forward(&self, input: Tensor<B, 3>, num_frames: &[usize]) -> ModelOutput<B> {
        match self {
            Self::Logistic(model) => model.forward(input, num_frames),
            Self::Dbof(model) => model.forward(input, num_frames),
            Self::Lstm(model) => model.forward(input, num_frames),
            Self::BidirectionalLstm(model) => model.forward(input, num_frames),
            Self::Gru(model) => model.forward(input, num_frames),
            Self::TemporalPooling(model) => model.forward(input, num_frames),
            Self::TemporalSkipping(model) => model.forward(input, num_frames),
        }
    }

    fn vocab_size(&self) -> usize {
        match self {
            Self::Logistic(model) => model.vocab_size(),
            Self::Dbof(model) => model.vocab_size(),
            Self::Lstm(model) => model.vocab_size(),
            Self::BidirectionalLstm(model) => model.vocab_size(),
            Self::Gru(model) => model.vocab_size(),
            Self::TemporalPooling(model) => model.vocab_size(),
            Self::TemporalSkipping(model) => model.vocab_size(),
        }
    }
}

/// Construct a frame-level model by name.
///
/// # Arguments
/// * `name` - A [`ModelKind`] name, e.g. `"DbofModel"` or `"lstm"`
/// * `settings` - Flat hyperparameters; fields irrelevant to the chosen
///   architecture are ignored
/// * `feature_size` - Width of each per-frame feature vector
/// * `vocab_size` - Number of output classes
///
/// # Errors
/// [`ModelError::UnknownModel`] for an unregistered name and
/// [`ModelError::ConflictingAugments`] when both attention and residual
/// wrapping are requested.
pub fn build_model<B: Backend>(
    name: &str,
    settings: &ModelSettings,
    feature_size: usize,
    vocab_size: usize,
    device: &B::Device,
) -> Result<FrameModel<B>, ModelError> {
    let kind: ModelKind = name.parse()?;
    let augment = settings.augment()?;

    log::debug!(
        "building {:?} for {} features and {} classes",
        kind,
        feature_size,
        vocab_size
    );

    let model = match kind {
        ModelKind::Logistic => FrameModel::Logistic(
            LogisticModelConfig::new()
                .with_l2_penalty(settings.l2_penalty)
                .init(feature_size, vocab_size, device),
        ),
        ModelKind::Dbof => FrameModel::Dbof(
            DbofModelConfig::new()
                .with_frame_samples(settings.frame_samples)
                .with_add_batch_norm(settings.dbof_add_batch_norm)
                .with_sample_random_frames(settings.sample_random_frames)
                .with_cluster_size(settings.dbof_cluster_size)
                .with_hidden_size(settings.dbof_hidden_size)
                .with_pooling(settings.dbof_pooling)
                .with_classifier(settings.classifier)
                .with_mixtures(settings.moe_mixtures)
                .with_seed(settings.sample_seed)
                .init(feature_size, vocab_size, device),
        ),
        ModelKind::Lstm => FrameModel::Lstm(
            LstmModelConfig::new()
                .with_cells(settings.rnn_cells)
                .with_layers(settings.rnn_layers)
                .with_augment(augment)
                .with_use_output(settings.use_rnn_output)
                .with_pooling(settings.pooling)
                .with_classifier(settings.classifier)
                .with_mixtures(settings.moe_mixtures)
                .init(feature_size, vocab_size, device),
        ),
        ModelKind::BidirectionalLstm => FrameModel::BidirectionalLstm(
            BiLstmModelConfig::new()
                .with_cells(settings.rnn_cells)
                .with_layers(settings.rnn_layers)
                .with_use_output(settings.use_rnn_output)
                .with_pooling(settings.pooling)
                .with_classifier(settings.classifier)
                .with_mixtures(settings.moe_mixtures)
                .init(feature_size, vocab_size, device),
        ),
        ModelKind::Gru => FrameModel::Gru(
            GruModelConfig::new()
                .with_cells(settings.rnn_cells)
                .with_layers(settings.rnn_layers)
                .with_augment(augment)
                .with_use_output(settings.use_rnn_output)
                .with_pooling(settings.pooling)
                .with_classifier(settings.classifier)
                .with_mixtures(settings.moe_mixtures)
                .init(feature_size, vocab_size, device),
        ),
        ModelKind::TemporalPooling => FrameModel::TemporalPooling(
            TemporalPoolingModelConfig::new()
                .with_cells(settings.rnn_cells)
                .with_pool_size(settings.pool_size)
                .with_pool_stride(settings.pool_stride)
                .with_pool_type(settings.pool_type)
                .with_learned_pooling(settings.learned_pooling)
                .with_use_output(settings.use_rnn_output)
                .with_pooling(settings.pooling)
                .with_classifier(settings.classifier)
                .with_mixtures(settings.moe_mixtures)
                .init(feature_size, vocab_size, device),
        ),
        ModelKind::TemporalSkipping => FrameModel::TemporalSkipping(
            TemporalSkippingModelConfig::new()
                .with_cells(settings.rnn_cells)
                .with_time_skip(settings.time_skip)
                .with_use_output(settings.use_rnn_output)
                .with_pooling(settings.pooling)
                .with_classifier(settings.classifier)
                .with_mixtures(settings.moe_mixtures)
                .init(feature_size, vocab_size, device),
        ),
    };

    Ok(model)
}
