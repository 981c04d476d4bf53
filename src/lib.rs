//! # frameseq - Frame-level Video Classification Models
//!
//! Sequence models for classifying videos from per-frame feature vectors,
//! built on the Burn framework.
//!
//! ## Features
//!
//! - **Logistic baseline**: sigmoid layer over count-averaged frames
//! - **DBoF**: cluster projection and pooling over sampled frames
//! - **LSTM / BiLSTM / GRU**: length-masked recurrent stacks, with
//!   optional per-layer attention or residual augments
//! - **Temporal pooling / skipping**: two recurrent stages around a
//!   sequence-length reduction
//! - **Pluggable classifier heads**: logistic or mixture-of-experts,
//!   selected by name
//! - **By-name registry**: build any model from a flat settings bag
//!
//! ## Quick Start
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use frameseq::prelude::*;
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! // Two videos, padded to 6 frames of 16 features each.
//! let frames = Tensor::<Backend, 3>::zeros([2, 6, 16], &device);
//! let num_frames = [6, 3];
//!
//! let model = GruModelConfig::new()
//!     .with_cells(32)
//!     .init::<Backend>(16, 10, &device);
//!
//! let output = model.forward(frames, &num_frames);
//! assert_eq!(output.predictions.dims(), [2, 10]);
//! ```
//!
//! ## Padding Contract
//!
//! Inputs are `[batch, max_frames, features]` with one true frame count
//! per example. Frames at or past an example's count are padding: the
//! recurrent stacks hold their state through them, the samplers never
//! select them, and the logistic average divides by the true count.
//!
//! ## By-name Construction
//!
//! ```rust
//! use burn::backend::NdArray;
//! use frameseq::prelude::*;
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! let settings = ModelSettings::new().with_rnn_cells(64);
//! let model = build_model::<Backend>("LstmModel", &settings, 16, 10, &device)
//!     .expect("registered model name");
//! ```

pub mod activation;
pub mod cells;
pub mod error;
pub mod models;
pub mod pooling;
pub mod rnn;
pub mod sampling;

pub mod prelude {
    pub use crate::activation::{Relu6, Relu6Activation};
    pub use crate::cells::{Attention, CellAugment, GruCell, LstmCell, LstmState};
    pub use crate::error::ModelError;
    pub use crate::models::{
        build_model, average_frames, BiLstmModel, BiLstmModelConfig, ClassifierKind, DbofModel,
        DbofModelConfig, FrameLevelModel, FrameModel, GruModel, GruModelConfig, LogisticModel,
        LogisticModelConfig, LstmModel, LstmModelConfig, ModelKind, ModelOutput, ModelSettings,
        TemporalPoolingModel, TemporalPoolingModelConfig, TemporalSkippingModel,
        TemporalSkippingModelConfig, VideoClassifier, VideoClassifierConfig,
    };
    pub use crate::pooling::{pool_frames, PoolMethod, TemporalPoolMethod};
    pub use crate::rnn::{reverse_sequence, BiLstmStack, GruStack, LstmStack};
    pub use crate::sampling::{sample_random_frames, sample_random_sequence};
}
