//! # Length-aware recurrent stacks
//!
//! These stacks drive the single-timestep cells in [`crate::cells`] over
//! whole padded sequences. **They are the encoders the frame-level models
//! build on.**
//!
//! ## Available stacks
//!
//! | Stack | Cell | Direction |
//! |-------|------|-----------|
//! | [`LstmStack`] | LSTM | forward |
//! | [`GruStack`] | GRU | forward |
//! | [`BiLstmStack`] | LSTM | forward + backward |
//!
//! ## Padding contract
//!
//! Every forward pass takes the padded tensor `[batch, max_frames,
//! features]` together with the true frame count per example. Timesteps at
//! or past an example's count leave its state untouched and produce a zero
//! output row, so the final state of a padded example equals the final
//! state of its unpadded counterpart.
//!
//! ## Output shapes
//!
//! | Value | Shape |
//! |-------|-------|
//! | per-step outputs | `[batch, max_frames, hidden]` (`2 * hidden` bidirectional) |
//! | final state | `[batch, hidden]` (`2 * hidden` bidirectional) |

pub mod bidirectional;
pub mod gru;
pub mod lstm;

pub use bidirectional::BiLstmStack;
pub use gru::GruStack;
pub use lstm::LstmStack;

use burn::tensor::{backend::Backend, Int, Tensor};

/// Validates a frame-count vector against the padded input dimensions.
pub(crate) fn check_lengths(batch_size: usize, max_frames: usize, num_frames: &[usize]) {
    if num_frames.len() != batch_size {
        panic!(
            "frame-count vector has length {} but the batch has {} examples",
            num_frames.len(),
            batch_size
        );
    }
    for (example, &count) in num_frames.iter().enumerate() {
        if count > max_frames {
            panic!(
                "example {} claims {} frames but the tensor is padded to {}",
                example, count, max_frames
            );
        }
    }
}

/// Per-timestep validity mask, `[batch, max_frames]`, 1.0 where the step is
/// within the example's true length and 0.0 in the padding.
pub(crate) fn step_masks<B: Backend>(
    num_frames: &[usize],
    max_frames: usize,
    device: &B::Device,
) -> Tensor<B, 2> {
    let mut data: Vec<f32> = Vec::with_capacity(num_frames.len() * max_frames);
    for &count in num_frames {
        for t in 0..max_frames {
            data.push(if t < count { 1.0 } else { 0.0 });
        }
    }
    Tensor::<B, 1>::from_floats(data.as_slice(), device).reshape([num_frames.len(), max_frames])
}

/// Reverses each example's valid prefix along the time axis, leaving the
/// padding rows where they are.
///
/// The backward half of [`BiLstmStack`] runs over this view so that it
/// reads an example's last valid frame first without ever consuming
/// padding before real data.
///
/// # Panics
/// If `num_frames.len()` differs from the batch size or any count exceeds
/// the padded length.
pub fn reverse_sequence<B: Backend>(input: Tensor<B, 3>, num_frames: &[usize]) -> Tensor<B, 3> {
    let [batch_size, max_frames, feature_size] = input.dims();
    check_lengths(batch_size, max_frames, num_frames);

    let mut indices: Vec<i32> = Vec::with_capacity(batch_size * max_frames);
    for &count in num_frames {
        for t in 0..max_frames {
            let source = if t < count { count - 1 - t } else { t };
            indices.push(source as i32);
        }
    }

    let index = Tensor::<B, 1, Int>::from_ints(indices.as_slice(), &input.device())
        .reshape([batch_size, max_frames])
        .unsqueeze_dim::<3>(2)
        .expand([batch_size, max_frames, feature_size]);

    input.gather(1, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn ramp(batch: usize, time: usize) -> Tensor<TestBackend, 3> {
        let device = Default::default();
        let data: Vec<f32> = (0..batch * time).map(|v| v as f32).collect();
        Tensor::<TestBackend, 1>::from_floats(data.as_slice(), &device).reshape([batch, time, 1])
    }

    #[test]
    fn test_reverse_sequence_full_length() {
        let input = ramp(1, 4);
        let reversed = reverse_sequence(input, &[4]);

        let expected: Vec<f32> = vec![3.0, 2.0, 1.0, 0.0];
        for (t, want) in expected.iter().enumerate() {
            let got = reversed.clone().slice([0..1, t..t + 1, 0..1]).into_scalar();
            assert!((got - want).abs() < 1e-6);
        }
    }

    #[test]
    fn test_reverse_sequence_keeps_padding_in_place() {
        let input = ramp(1, 5);
        let reversed = reverse_sequence(input, &[3]);

        // Valid prefix 0,1,2 reversed to 2,1,0; padding rows 3,4 untouched.
        let expected: Vec<f32> = vec![2.0, 1.0, 0.0, 3.0, 4.0];
        for (t, want) in expected.iter().enumerate() {
            let got = reversed.clone().slice([0..1, t..t + 1, 0..1]).into_scalar();
            assert!((got - want).abs() < 1e-6);
        }
    }

    #[test]
    fn test_reverse_sequence_is_involution() {
        let device = Default::default();
        let input = Tensor::<TestBackend, 3>::random(
            [3, 6, 4],
            burn::tensor::Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let counts = [6, 2, 5];

        let twice = reverse_sequence(reverse_sequence(input.clone(), &counts), &counts);

        let diff = (twice - input).abs().sum().into_scalar();
        assert!(diff < 1e-6);
    }

    #[test]
    fn test_step_masks_layout() {
        let device = Default::default();
        let masks = step_masks::<TestBackend>(&[2, 0, 3], 3, &device);

        let expected = [1.0f32, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        for (i, want) in expected.iter().enumerate() {
            let got = masks
                .clone()
                .slice([i / 3..i / 3 + 1, i % 3..i % 3 + 1])
                .into_scalar();
            assert!((got - want).abs() < 1e-6, "mask mismatch at {}", i);
        }
    }
}
