//! Bidirectional LSTM encoder.

use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::cells::CellAugment;

use super::{reverse_sequence, LstmStack};

/// Two LSTM stacks run over the same sequence in opposite directions.
///
/// The backward stack consumes the length-aware reversal of the input, so
/// it reads each example's last valid frame first and never sees padding
/// before real data. Its per-step outputs are reversed back into input
/// order before concatenation, which puts both directions' views of frame
/// `t` in the same output row.
#[derive(Module, Debug)]
pub struct BiLstmStack<B: Backend> {
    forward_layers: LstmStack<B>,
    backward_layers: LstmStack<B>,
}

impl<B: Backend> BiLstmStack<B> {
    /// Create forward and backward stacks of `num_layers` cells each.
    ///
    /// # Panics
    /// If `num_layers` is zero.
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        num_layers: usize,
        device: &B::Device,
    ) -> Self {
        Self {
            forward_layers: LstmStack::new(
                input_size,
                hidden_size,
                num_layers,
                CellAugment::None,
                device,
            ),
            backward_layers: LstmStack::new(
                input_size,
                hidden_size,
                num_layers,
                CellAugment::None,
                device,
            ),
        }
    }

    /// Hidden width of a single direction; outputs carry twice this.
    pub fn hidden_size(&self) -> usize {
        self.forward_layers.hidden_size()
    }

    /// Drive both stacks over a padded sequence.
    ///
    /// # Arguments
    /// * `input` - Frame features of shape `[batch, max_frames, features]`
    /// * `num_frames` - True frame count per example
    ///
    /// # Returns
    /// Tuple of (outputs, final_hidden) where:
    /// - outputs: both directions' per-step outputs concatenated along the
    ///   feature axis, `[batch, max_frames, 2 * hidden]`
    /// - final_hidden: both directions' final hidden states concatenated
    ///   along the feature axis, `[batch, 2 * hidden]`
    pub fn forward(&self, input: Tensor<B, 3>, num_frames: &[usize]) -> (Tensor<B, 3>, Tensor<B, 2>) {
        let (forward_out, forward_state) = self.forward_layers.forward(input.clone(), num_frames);

        let reversed = reverse_sequence(input, num_frames);
        let (backward_out_reversed, backward_state) =
            self.backward_layers.forward(reversed, num_frames);
        let backward_out = reverse_sequence(backward_out_reversed, num_frames);

        let outputs = Tensor::cat(vec![forward_out, backward_out], 2);
        let state = Tensor::cat(vec![forward_state, backward_state], 1);

        (outputs, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_bidirectional_output_shapes() {
        let device = Default::default();
        let stack = BiLstmStack::<TestBackend>::new(8, 16, 1, &device);

        let input = Tensor::<TestBackend, 3>::random(
            [3, 10, 8],
            burn::tensor::Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let (outputs, state) = stack.forward(input, &[10, 6, 2]);

        assert_eq!(outputs.dims(), [3, 10, 32]);
        assert_eq!(state.dims(), [3, 32]);
    }

    #[test]
    fn test_padding_does_not_leak_into_either_direction() {
        let device = Default::default();
        let stack = BiLstmStack::<TestBackend>::new(4, 8, 1, &device);

        let short = Tensor::<TestBackend, 3>::random(
            [1, 3, 4],
            burn::tensor::Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let junk = Tensor::<TestBackend, 3>::full([1, 2, 4], 9.0, &device);
        let padded = Tensor::cat(vec![short.clone(), junk], 1);

        let (_, state_short) = stack.forward(short, &[3]);
        let (_, state_padded) = stack.forward(padded, &[3]);

        let diff = (state_short - state_padded).abs().sum().into_scalar();
        assert!(diff < 1e-6, "padding leaked into a directional state");
    }

    #[test]
    fn test_directions_disagree_on_asymmetric_input() {
        let device = Default::default();
        let stack = BiLstmStack::<TestBackend>::new(4, 8, 1, &device);

        let input = Tensor::<TestBackend, 3>::random(
            [1, 6, 4],
            burn::tensor::Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let (_, state) = stack.forward(input, &[6]);

        // Forward and backward halves are separate parameter sets fed
        // opposite frame orders; on random input they should differ.
        let forward_half = state.clone().narrow(1, 0, 8);
        let backward_half = state.narrow(1, 8, 8);
        let diff = (forward_half - backward_half).abs().sum().into_scalar();
        assert!(diff > 1e-6);
    }
}
