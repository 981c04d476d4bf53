//! Custom activation functions for frame-level models
//!
//! This module provides activation functions not available in Burn's standard library.

use burn::tensor::{backend::Backend, Tensor};

/// Capped rectified linear unit.
///
/// This activation function is defined as:
/// `f(x) = min(max(x, 0), 6)`
///
/// The cap keeps cluster-space activations bounded, which stabilizes the
/// pooling stage that follows the projection layers: a single frame cannot
/// dominate a max-pool, and averages stay on a predictable scale.
///
/// # Example
///
/// ```rust
/// use burn::backend::NdArray;
/// use burn::tensor::Tensor;
/// use frameseq::activation::Relu6;
///
/// type Backend = NdArray<f32>;
/// let device = Default::default();
///
/// let x = Tensor::<Backend, 1>::from_floats([-1.0, 3.0, 9.0], &device);
/// let y = Relu6::forward(x);
/// ```
pub struct Relu6;

impl Relu6 {
    /// Applies the capped ReLU activation function.
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor of any dimension
    ///
    /// # Returns
    ///
    /// Tensor with values clamped to the range [0, 6] element-wise
    pub fn forward<B: Backend, const D: usize>(x: Tensor<B, D>) -> Tensor<B, D> {
        x.clamp(0.0, 6.0)
    }
}

/// Applies the capped ReLU to a tensor.
///
/// This is a convenience trait extension for applying the activation directly on tensors.
pub trait Relu6Activation {
    /// Applies capped ReLU
    fn relu6(self) -> Self;
}

impl<B: Backend, const D: usize> Relu6Activation for Tensor<B, D> {
    fn relu6(self) -> Self {
        Relu6::forward(self)
    }
}
