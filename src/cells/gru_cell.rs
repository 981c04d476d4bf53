use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// GRU cell.
///
/// Gate equations, with `[x, h]` the concatenation of input and hidden
/// state:
/// - r, u = sigmoid(W_g [x, h] + b_g + 1)
/// - c = tanh(W_c [x, r * h] + b_c)
/// - h' = u * h + (1 - u) * c
///
/// The constant added before the gate sigmoid biases reset and update
/// toward 1 at initialization, so a fresh cell passes state through almost
/// unchanged.
#[derive(Module, Debug)]
pub struct GruCell<B: Backend> {
    #[module(skip)]
    input_size: usize,
    #[module(skip)]
    hidden_size: usize,
    gate_map: Linear<B>,      // [input, hidden] to 2 * hidden_size
    candidate_map: Linear<B>, // [input, reset * hidden] to hidden_size
}

impl<B: Backend> GruCell<B> {
    /// Create a new GRU cell
    ///
    /// # Arguments
    /// * `input_size` - Size of the input features
    /// * `hidden_size` - Size of the hidden state
    /// * `device` - Device to create the module on
    pub fn new(input_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        let gate_map = LinearConfig::new(input_size + hidden_size, 2 * hidden_size)
            .with_bias(true)
            .init(device);

        let candidate_map = LinearConfig::new(input_size + hidden_size, hidden_size)
            .with_bias(true)
            .init(device);

        Self {
            input_size,
            hidden_size,
            gate_map,
            candidate_map,
        }
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
    /// * `hidden` - Previous hidden state of shape `[batch, hidden_size]`
    ///
    /// # Returns
    /// New hidden state of shape `[batch, hidden_size]`, also the output.
    pub fn forward(&self, input: Tensor<B, 2>, hidden: Tensor<B, 2>) -> Tensor<B, 2> {
        let combined = Tensor::cat(vec![input.clone(), hidden.clone()], 1);
        let gates = activation::sigmoid(self.gate_map.forward(combined) + 1.0);

        let chunks = gates.chunk(2, 1);
        let reset = chunks[0].clone();
        let update = chunks[1].clone();

        let candidate_input = Tensor::cat(vec![input, hidden.clone() * reset], 1);
        let candidate = self.candidate_map.forward(candidate_input).tanh();

        hidden * update.clone() + candidate * (update.neg() + 1.0)
    }
}
