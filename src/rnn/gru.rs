//! Stacked GRU encoder with per-example length masking.

use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::cells::{Attention, CellAugment, GruCell};

use super::{check_lengths, step_masks};

/// A stack of GRU layers driven over padded frame sequences.
///
/// Same contract as [`crate::rnn::LstmStack`] with a single-tensor hidden
/// state per layer. The temporal two-stage networks use single-layer
/// instances of this stack for both of their stages.
#[derive(Module, Debug)]
pub struct GruStack<B: Backend> {
    layers: Vec<GruCell<B>>,
    attention: Option<Vec<Attention<B>>>,
    #[module(skip)]
    residual: bool,
    #[module(skip)]
    hidden_size: usize,
}

impl<B: Backend> GruStack<B> {
    /// Create a stack of `num_layers` GRU cells of width `hidden_size`.
    ///
    /// # Panics
    /// If `num_layers` is zero, or the residual augment is requested with
    /// `input_size != hidden_size`.
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        num_layers: usize,
        augment: CellAugment,
        device: &B::Device,
    ) -> Self {
        if num_layers == 0 {
            panic!("a recurrent stack needs at least one layer");
        }
        if matches!(augment, CellAugment::Residual) && input_size != hidden_size {
            panic!(
                "residual layers need matching widths, got input {} and hidden {}",
                input_size, hidden_size
            );
        }

        let layers = (0..num_layers)
            .map(|layer| {
                let in_size = if layer == 0 { input_size } else { hidden_size };
                GruCell::new(in_size, hidden_size, device)
            })
            .collect();

        let attention = match augment {
            CellAugment::Attention { length } => Some(
                (0..num_layers)
                    .map(|_| Attention::new(hidden_size, length, device))
                    .collect(),
            ),
            _ => None,
        };

        Self {
            layers,
            attention,
            residual: matches!(augment, CellAugment::Residual),
            hidden_size,
        }
    }

    /// Hidden width of every layer.
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Number of stacked layers.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Drive the stack over a padded sequence.
    ///
    /// # Arguments
    /// * `input` - Frame features of shape `[batch, max_frames, features]`
    /// * `num_frames` - True frame count per example
    ///
    /// # Returns
    /// Tuple of (outputs, final_hidden); see [`crate::rnn::LstmStack::forward`].
    pub fn forward(&self, input: Tensor<B, 3>, num_frames: &[usize]) -> (Tensor<B, 3>, Tensor<B, 2>) {
        let [batch_size, max_frames, _] = input.dims();
        check_lengths(batch_size, max_frames, num_frames);
        let device = input.device();

        let masks = step_masks::<B>(num_frames, max_frames, &device);

        let mut states: Vec<Tensor<B, 2>> = (0..self.layers.len())
            .map(|_| Tensor::zeros([batch_size, self.hidden_size], &device))
            .collect();
        let mut windows: Option<Vec<Tensor<B, 3>>> = self
            .attention
            .as_ref()
            .map(|heads| heads.iter().map(|a| a.empty_window(batch_size, &device)).collect());

        let mut outputs: Vec<Tensor<B, 2>> = Vec::with_capacity(max_frames);

        for t in 0..max_frames {
            let valid = masks
                .clone()
                .narrow(1, t, 1)
                .expand([batch_size, self.hidden_size]);
            let hold = valid.clone().neg() + 1.0;

            let mut x: Tensor<B, 2> = input.clone().narrow(1, t, 1).squeeze(1);

            for (layer, cell) in self.layers.iter().enumerate() {
                let previous = states[layer].clone();
                let next = cell.forward(x.clone(), previous.clone());

                let hidden = next * valid.clone() + previous * hold.clone();
                states[layer] = hidden.clone();

                x = if let (Some(heads), Some(wins)) = (self.attention.as_ref(), windows.as_mut()) {
                    let attended = heads[layer].forward(wins[layer].clone(), hidden.clone());
                    let pushed = heads[layer].push(wins[layer].clone(), hidden);
                    let valid_win = valid
                        .clone()
                        .unsqueeze_dim::<3>(1)
                        .expand(pushed.dims());
                    let hold_win = hold.clone().unsqueeze_dim::<3>(1).expand(pushed.dims());
                    wins[layer] = pushed * valid_win + wins[layer].clone() * hold_win;
                    attended
                } else if self.residual {
                    x + hidden
                } else {
                    hidden
                };
            }

            outputs.push(x * valid);
        }

        let outputs: Tensor<B, 3> = Tensor::stack(outputs, 1);
        let final_hidden = states
            .last()
            .expect("stack has at least one layer")
            .clone();

        (outputs, final_hidden)
    }
}
