use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Hidden and cell state of an [`LstmCell`], each `[batch, hidden_size]`.
#[derive(Debug, Clone)]
pub struct LstmState<B: Backend> {
    /// Hidden state, also the cell's output.
    pub hidden: Tensor<B, 2>,
    /// Internal cell state.
    pub cell: Tensor<B, 2>,
}

impl<B: Backend> LstmState<B> {
    /// Zero-initialized state for a fresh sequence.
    pub fn zeros(batch_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        Self {
            hidden: Tensor::zeros([batch_size, hidden_size], device),
            cell: Tensor::zeros([batch_size, hidden_size], device),
        }
    }
}

/// LSTM cell with a constant bias added to the forget gate.
///
/// Gate equations, with `z = W_x x + W_h h + b` split four ways:
/// - i = sigmoid(z_i)
/// - g = tanh(z_g)
/// - f = sigmoid(z_f + forget_bias)
/// - o = sigmoid(z_o)
/// - c' = f * c + i * g
/// - h' = o * tanh(c')
///
/// The forget bias defaults to 1.0 so freshly initialized cells start out
/// remembering rather than forgetting, which avoids vanishing gradients
/// early in training on long frame sequences.
#[derive(Module, Debug)]
pub struct LstmCell<B: Backend> {
    #[module(skip)]
    input_size: usize,
    #[module(skip)]
    hidden_size: usize,
    #[module(skip)]
    forget_bias: f32,
    input_map: Linear<B>,     // input to 4 * hidden_size, with bias
    recurrent_map: Linear<B>, // hidden state to 4 * hidden_size, no bias
}

impl<B: Backend> LstmCell<B> {
    /// Create a new LSTM cell with the default forget bias of 1.0.
    pub fn new(input_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        let input_map = LinearConfig::new(input_size, 4 * hidden_size)
            .with_bias(true)
            .init(device);

        let recurrent_map = LinearConfig::new(hidden_size, 4 * hidden_size)
            .with_bias(false)
            .init(device);

        Self {
            input_size,
            hidden_size,
            forget_bias: 1.0,
            input_map,
            recurrent_map,
        }
    }

    /// Override the constant added to the forget gate before its sigmoid.
    pub fn with_forget_bias(mut self, forget_bias: f32) -> Self {
        self.forget_bias = forget_bias;
        self
    }

    /// Get the input size
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Get the hidden size
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Advance the cell by one timestep.
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape `[batch, input_size]`
    /// * `state` - State carried over from the previous timestep
    ///
    /// # Returns
    /// The updated state; `state.hidden` is the cell's output.
    pub fn forward(&self, input: Tensor<B, 2>, state: LstmState<B>) -> LstmState<B> {
        let z = self.input_map.forward(input) + self.recurrent_map.forward(state.hidden);

        let gates = z.chunk(4, 1);
        let input_gate = activation::sigmoid(gates[0].clone());
        let candidate = gates[1].clone().tanh();
        let forget_gate = activation::sigmoid(gates[2].clone() + self.forget_bias);
        let output_gate = activation::sigmoid(gates[3].clone());

        let cell = state.cell * forget_gate + candidate * input_gate;
        let hidden = cell.clone().tanh() * output_gate;

        LstmState { hidden, cell }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_lstm_cell_creation() {
        let device = Default::default();
        let cell = LstmCell::<TestBackend>::new(20, 50, &device);

        assert_eq!(cell.input_size(), 20);
        assert_eq!(cell.hidden_size(), 50);
    }

    #[test]
    fn test_lstm_forward_shapes() {
        let device = Default::default();
        let cell = LstmCell::<TestBackend>::new(20, 50, &device);

        let batch_size = 4;
        let input = Tensor::<TestBackend, 2>::zeros([batch_size, 20], &device);
        let state = LstmState::zeros(batch_size, 50, &device);

        let next = cell.forward(input, state);

        assert_eq!(next.hidden.dims(), [batch_size, 50]);
        assert_eq!(next.cell.dims(), [batch_size, 50]);
    }

    #[test]
    fn test_lstm_state_evolves_over_sequence() {
        let device = Default::default();
        let cell = LstmCell::<TestBackend>::new(10, 20, &device);

        let mut state = LstmState::zeros(1, 20, &device);
        for _ in 0..3 {
            let input = Tensor::<TestBackend, 2>::random(
                [1, 10],
                burn::tensor::Distribution::Uniform(0.0, 1.0),
                &device,
            );
            state = cell.forward(input, state);
        }

        let h_sum: f32 = state.hidden.sum().into_scalar();
        let c_sum: f32 = state.cell.sum().into_scalar();
        assert!(
            h_sum != 0.0 || c_sum != 0.0,
            "state should have changed after processing a sequence"
        );
    }

    #[test]
    fn test_lstm_forget_gate_modifies_cell_state() {
        let device = Default::default();
        let cell = LstmCell::<TestBackend>::new(10, 20, &device);

        let state = LstmState {
            hidden: Tensor::zeros([1, 20], &device),
            cell: Tensor::ones([1, 20], &device) * 10.0,
        };
        let input = Tensor::<TestBackend, 2>::zeros([1, 10], &device);

        let next = cell.forward(input, state);

        let c_sum_old = 10.0 * 20.0;
        let c_sum_new: f32 = next.cell.sum().into_scalar();
        assert!(
            (c_sum_new - c_sum_old).abs() > 0.1,
            "forget gate should modify the cell state"
        );
    }

    #[test]
    fn test_lstm_batch_sizes() {
        let device = Default::default();
        let cell = LstmCell::<TestBackend>::new(20, 50, &device);

        for batch_size in [1, 4, 16, 32] {
            let input = Tensor::<TestBackend, 2>::zeros([batch_size, 20], &device);
            let state = LstmState::zeros(batch_size, 50, &device);

            let next = cell.forward(input, state);

            assert_eq!(next.hidden.dims(), [batch_size, 50]);
            assert_eq!(next.cell.dims(), [batch_size, 50]);
        }
    }
}
