//! # Recurrent cells
//!
//! Single-timestep recurrent cells and the per-layer augments that can be
//! wrapped around them. Cells process one timestep at a time and are driven
//! over whole sequences by the length-aware stacks in [`crate::rnn`].
//!
//! ## Cell types
//!
//! | Cell | State | Notes |
//! |------|-------|-------|
//! | [`LstmCell`] | hidden + cell tensors | unit forget-gate bias by default |
//! | [`GruCell`] | hidden tensor | gates biased toward keeping state |
//!
//! ## Tensor shapes
//!
//! All cells expect 2D tensors for single-timestep processing:
//!
//! | Tensor | Shape |
//! |--------|-------|
//! | `input` | `[batch, input_size]` |
//! | `hidden` | `[batch, hidden_size]` |
//!
//! ## Augments
//!
//! A layer in a stack can optionally be augmented, selected by
//! [`CellAugment`]:
//!
//! - **Attention**: mixes the cell output with a context vector attended
//!   over a fixed-length window of the layer's recent outputs.
//! - **Residual**: adds the layer's input to its output; input and hidden
//!   widths must match.
//!
//! The two are mutually exclusive; the enum makes an invalid combination
//! unrepresentable.

pub mod attention;
pub mod gru_cell;
pub mod lstm_cell;

pub use attention::Attention;
pub use gru_cell::GruCell;
pub use lstm_cell::{LstmCell, LstmState};

use serde::{Deserialize, Serialize};

/// Per-layer augmentation applied around every cell of a recurrent stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellAugment {
    /// Plain cells, no wrapping.
    None,
    /// Attend over a window of the last `length` outputs of the layer.
    Attention {
        /// Number of recent outputs kept in the attention window.
        length: usize,
    },
    /// Skip connection from layer input to layer output.
    Residual,
}
