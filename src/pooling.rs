//! Pooling over the time axis of frame-feature sequences.
//!
//! [`pool_frames`] collapses a whole sequence to one vector and is the
//! aggregation step shared by the bag-of-frames model and the
//! `use_output` path of the recurrent models. The window pooling and
//! striding helpers reduce sequence *length* between the two recurrent
//! stages of the temporal networks.

use burn::module::Module;
use burn::tensor::{backend::Backend, Int, Tensor};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ModelError;

/// Reduction applied across the time axis when collapsing a sequence to a
/// single vector.
#[derive(Module, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolMethod {
    /// Element-wise mean over time.
    Average,
    /// Element-wise maximum over time.
    Max,
    /// Element-wise sum over time.
    Sum,
}

impl FromStr for PoolMethod {
    type Err = ModelError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "average" => Ok(Self::Average),
            "max" => Ok(Self::Max),
            "sum" => Ok(Self::Sum),
            _ => Err(ModelError::UnknownPooling(name.to_string())),
        }
    }
}

/// Window reduction used between the two recurrent stages of the temporal
/// pooling network.
#[derive(Module, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemporalPoolMethod {
    /// Mean over each window.
    Average,
    /// Maximum over each window.
    Max,
}

impl FromStr for TemporalPoolMethod {
    type Err = ModelError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "avg" | "average" => Ok(Self::Average),
            "max" => Ok(Self::Max),
            _ => Err(ModelError::UnknownPooling(name.to_string())),
        }
    }
}

/// Collapses `[batch, time, features]` to `[batch, features]` with the given
/// reduction over the time axis.
///
/// The average divides by the full padded time length, not the true frame
/// count. Callers that need a padding-aware mean should sum and divide by
/// the true count instead (see `models::logistic::average_frames`).
pub fn pool_frames<B: Backend>(sequence: Tensor<B, 3>, method: PoolMethod) -> Tensor<B, 2> {
    match method {
        PoolMethod::Average => sequence.mean_dim(1).squeeze(1),
        PoolMethod::Max => sequence.max_dim(1).squeeze(1),
        PoolMethod::Sum => sequence.sum_dim(1).squeeze(1),
    }
}

/// Keeps every `step`-th time index of `[batch, time, features]`, starting
/// at index zero.
///
/// # Panics
/// If `step` is zero.
pub fn temporal_stride<B: Backend>(sequence: Tensor<B, 3>, step: usize) -> Tensor<B, 3> {
    if step == 0 {
        panic!("temporal stride must be at least 1");
    }
    let [_, time, _] = sequence.dims();
    let kept: Vec<i32> = (0..time).step_by(step).map(|t| t as i32).collect();
    let indices = Tensor::<B, 1, Int>::from_ints(kept.as_slice(), &sequence.device());
    sequence.select(1, indices)
}

/// Valid length of an example after [`temporal_stride`] with the given step:
/// the number of kept indices below `count`.
pub fn strided_length(count: usize, step: usize) -> usize {
    if step == 0 {
        panic!("temporal stride must be at least 1");
    }
    count.div_ceil(step)
}

/// Valid length of an example after window pooling with no padding: zero
/// when the window does not fit, otherwise `(count - window) / stride + 1`.
pub fn pooled_length(count: usize, window: usize, stride: usize) -> usize {
    if window == 0 || stride == 0 {
        panic!("pooling window and stride must be at least 1");
    }
    if count < window {
        0
    } else {
        (count - window) / stride + 1
    }
}
