//! Windowed additive attention over a layer's recent outputs.
//!
//! Wrapping a recurrent layer with attention lets each timestep look back
//! over a fixed window of the layer's own outputs instead of relying on the
//! hidden state alone to carry everything. The stack drives the window: it
//! starts empty (zeros), is advanced only on valid timesteps, and the
//! attended mix replaces the raw cell output as the layer's output.

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Additive attention over a fixed-length window of past outputs.
///
/// Scores each window slot with `v . tanh(W_k slot + W_q hidden)`, softmaxes
/// over the window, and mixes the resulting context back into the output
/// through a learned projection of `[hidden, context]`.
#[derive(Module, Debug)]
pub struct Attention<B: Backend> {
    #[module(skip)]
    window: usize,
    #[module(skip)]
    hidden_size: usize,
    query: Linear<B>,  // hidden -> hidden
    key: Linear<B>,    // window slot -> hidden
    score: Linear<B>,  // hidden -> scalar, no bias
    output: Linear<B>, // [hidden, context] -> hidden
}

impl<B: Backend> Attention<B> {
    /// Create an attention head over a window of `window` past outputs.
    ///
    /// # Panics
    /// If `window` is zero.
    pub fn new(hidden_size: usize, window: usize, device: &B::Device) -> Self {
        if window == 0 {
            panic!("attention window must hold at least one output");
        }

        let query = LinearConfig::new(hidden_size, hidden_size)
            .with_bias(true)
            .init(device);
        let key = LinearConfig::new(hidden_size, hidden_size)
            .with_bias(false)
            .init(device);
        let score = LinearConfig::new(hidden_size, 1)
            .with_bias(false)
            .init(device);
        let output = LinearConfig::new(2 * hidden_size, hidden_size)
            .with_bias(true)
            .init(device);

        Self {
            window,
            hidden_size,
            query,
            key,
            score,
            output,
        }
    }

    /// Number of past outputs the window holds.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Zero-filled window for the start of a sequence,
    /// shape `[batch, window, hidden_size]`.
    pub fn empty_window(&self, batch_size: usize, device: &B::Device) -> Tensor<B, 3> {
        Tensor::zeros([batch_size, self.window, self.hidden_size], device)
    }

    /// Attend over `window` with `hidden` as the query and mix the context
    /// into the returned output.
    ///
    /// # Arguments
    /// * `window` - Recent outputs, `[batch, window, hidden_size]`
    /// * `hidden` - Current cell output, `[batch, hidden_size]`
    ///
    /// # Returns
    /// Attended output of shape `[batch, hidden_size]`
    pub fn forward(&self, window: Tensor<B, 3>, hidden: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch_size, window_len, hidden_size] = window.dims();

        let queries = self
            .query
            .forward(hidden.clone())
            .unsqueeze_dim::<3>(1)
            .expand([batch_size, window_len, hidden_size]);
        let keys = self.key.forward(window.clone());

        let scores = self.score.forward((keys + queries).tanh()); // [batch, window, 1]
        let weights = activation::softmax(scores, 1).expand([batch_size, window_len, hidden_size]);

        let context: Tensor<B, 2> = (window * weights).sum_dim(1).squeeze(1);

        self.output.forward(Tensor::cat(vec![hidden, context], 1))
    }

    /// Slide the window one step: drop the oldest slot, append `hidden`.
    pub fn push(&self, window: Tensor<B, 3>, hidden: Tensor<B, 2>) -> Tensor<B, 3> {
        let [_, window_len, _] = window.dims();
        let tail = window.narrow(1, 1, window_len - 1);
        Tensor::cat(vec![tail, hidden.unsqueeze_dim(1)], 1)
    }
}
