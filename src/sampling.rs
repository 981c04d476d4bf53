//! Frame subsampling for shortening padded feature sequences.
//!
//! Long videos are expensive to push through the cluster projection of the
//! bag-of-frames model, so the model first selects a fixed number of frames
//! per example. Two strategies are provided:
//!
//! - [`sample_random_frames`]: independent uniform draws (with replacement)
//!   from each example's valid frames. Destroys frame order.
//! - [`sample_random_sequence`]: one contiguous window at a random valid
//!   start offset. Preserves local order.
//!
//! Both read only the first `count` rows of each example, never the padding,
//! and are fully reproducible given a seeded [`StdRng`].

use burn::tensor::{backend::Backend, Int, Tensor};
use rand::prelude::*;

/// Selects `num_samples` frames per example, drawn independently and
/// uniformly from `[0, count)` with replacement.
///
/// # Arguments
/// * `input` - Frame features of shape `[batch, max_frames, feature_size]`
/// * `num_frames` - True (unpadded) frame count per example; a zero count is
///   treated as one so a row can always be produced
/// * `num_samples` - Number of frames to keep per example
/// * `rng` - Seeded generator; identical seeds yield identical selections
///
/// # Returns
/// Tensor of shape `[batch, num_samples, feature_size]`
///
/// # Panics
/// If `num_samples` is zero, `num_frames.len()` differs from the batch size,
/// or any count exceeds `max_frames`.
pub fn sample_random_frames<B: Backend>(
    input: Tensor<B, 3>,
    num_frames: &[usize],
    num_samples: usize,
    rng: &mut StdRng,
) -> Tensor<B, 3> {
    let [batch_size, max_frames, _] = input.dims();
    check_args(batch_size, max_frames, num_frames, num_samples);

    let mut indices: Vec<i32> = Vec::with_capacity(batch_size * num_samples);
    for &count in num_frames {
        let count = count.max(1);
        for _ in 0..num_samples {
            indices.push(rng.gen_range(0..count) as i32);
        }
    }

    gather_frames(input, &indices, num_samples)
}

/// Selects a contiguous window of `num_samples` frames per example, starting
/// at a random offset in `[0, count - num_samples]`.
///
/// When an example has fewer than `num_samples` valid frames, the window
/// starts at zero and every index past the valid range is clamped to the
/// last valid frame, so the output repeats that frame rather than exposing
/// padding.
///
/// # Arguments
/// * `input` - Frame features of shape `[batch, max_frames, feature_size]`
/// * `num_frames` - True (unpadded) frame count per example
/// * `num_samples` - Window length
/// * `rng` - Seeded generator; identical seeds yield identical selections
///
/// # Returns
/// Tensor of shape `[batch, num_samples, feature_size]`
///
/// # Panics
/// If `num_samples` is zero, `num_frames.len()` differs from the batch size,
/// or any count exceeds `max_frames`.
pub fn sample_random_sequence<B: Backend>(
    input: Tensor<B, 3>,
    num_frames: &[usize],
    num_samples: usize,
    rng: &mut StdRng,
) -> Tensor<B, 3> {
    let [batch_size, max_frames, _] = input.dims();
    check_args(batch_size, max_frames, num_frames, num_samples);

    let mut indices: Vec<i32> = Vec::with_capacity(batch_size * num_samples);
    for &count in num_frames {
        let count = count.max(1);
        let max_start = count.saturating_sub(num_samples);
        let start = rng.gen_range(0..=max_start);
        for offset in 0..num_samples {
            indices.push((start + offset).min(count - 1) as i32);
        }
    }

    gather_frames(input, &indices, num_samples)
}

fn check_args(batch_size: usize, max_frames: usize, num_frames: &[usize], num_samples: usize) {
    if num_samples == 0 {
        panic!("cannot sample zero frames per example");
    }
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

/// Gathers per-example frame rows. `indices` holds `num_samples` entries per
/// example, flattened in batch order.
fn gather_frames<B: Backend>(
    input: Tensor<B, 3>,
    indices: &[i32],
    num_samples: usize,
) -> Tensor<B, 3> {
    let [batch_size, _, feature_size] = input.dims();
    let device = input.device();

    let index = Tensor::<B, 1, Int>::from_ints(indices, &device)
        .reshape([batch_size, num_samples])
        .unsqueeze_dim::<3>(2)
        .expand([batch_size, num_samples, feature_size]);

    input.gather(1, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Tensor;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type Backend = NdArray<f32>;

    /// Input where frame t of example b holds the constant value b * 100 + t,
    /// so gathered rows reveal exactly which frame they came from.
    fn tagged_input(batch: usize, max_frames: usize, features: usize) -> Tensor<Backend, 3> {
        let device = Default::default();
        let mut data = Vec::with_capacity(batch * max_frames * features);
        for b in 0..batch {
            for t in 0..max_frames {
                for _ in 0..features {
                    data.push((b * 100 + t) as f32);
                }
            }
        }
        Tensor::<Backend, 1>::from_floats(data.as_slice(), &device).reshape([
            batch,
            max_frames,
            features,
        ])
    }

    fn frame_tags(sampled: Tensor<Backend, 3>) -> Vec<Vec<usize>> {
        let [batch, samples, _] = sampled.dims();
        let mut tags = Vec::with_capacity(batch);
        for b in 0..batch {
            let mut row = Vec::with_capacity(samples);
            for s in 0..samples {
                let value = sampled
                    .clone()
                    .slice([b..b + 1, s..s + 1, 0..1])
                    .into_scalar();
                row.push(value as usize - b * 100);
            }
            tags.push(row);
        }
        tags
    }

    #[test]
    fn test_random_frames_shape() {
        let input = tagged_input(3, 10, 4);
        let mut rng = StdRng::seed_from_u64(7);

        let sampled = sample_random_frames(input, &[10, 5, 1], 6, &mut rng);

        assert_eq!(sampled.dims(), [3, 6, 4]);
    }

    #[test]
    fn test_random_frames_never_touch_padding() {
        let counts = [1usize, 3, 7, 10];
        let input = tagged_input(4, 10, 2);
        let mut rng = StdRng::seed_from_u64(99);

        let sampled = sample_random_frames(input, &counts, 32, &mut rng);

        for (b, row) in frame_tags(sampled).iter().enumerate() {
            for &tag in row {
                assert!(
                    tag < counts[b],
                    "example {} sampled padded frame {} (count {})",
                    b,
                    tag,
                    counts[b]
                );
            }
        }
    }

    #[test]
    fn test_random_frames_deterministic() {
        let input = tagged_input(2, 8, 3);

        let mut rng_a = StdRng::seed_from_u64(1234);
        let mut rng_b = StdRng::seed_from_u64(1234);
        let a = sample_random_frames(input.clone(), &[8, 4], 5, &mut rng_a);
        let b = sample_random_frames(input, &[8, 4], 5, &mut rng_b);

        let diff = (a - b).abs().sum().into_scalar();
        assert!(diff < 1e-6, "same seed must select the same frames");
    }

    #[test]
    fn test_random_sequence_contiguous() {
        let input = tagged_input(3, 12, 2);
        let mut rng = StdRng::seed_from_u64(5);

        let sampled = sample_random_sequence(input, &[12, 9, 6], 4, &mut rng);

        for (b, row) in frame_tags(sampled).iter().enumerate() {
            for pair in row.windows(2) {
                assert_eq!(
                    pair[1],
                    pair[0] + 1,
                    "example {} window is not contiguous: {:?}",
                    b,
                    row
                );
            }
        }
    }

    #[test]
    fn test_random_sequence_short_example_clamps() {
        // Example has 3 valid frames but a window of 5 is requested: the
        // window starts at 0 and repeats the last valid frame.
        let input = tagged_input(1, 8, 2);
        let mut rng = StdRng::seed_from_u64(11);

        let sampled = sample_random_sequence(input, &[3], 5, &mut rng);

        let tags = frame_tags(sampled);
        assert_eq!(tags[0], vec![0, 1, 2, 2, 2]);
    }

    #[test]
    fn test_random_sequence_deterministic() {
        let input = tagged_input(2, 10, 2);

        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let a = sample_random_sequence(input.clone(), &[10, 7], 4, &mut rng_a);
        let b = sample_random_sequence(input, &[10, 7], 4, &mut rng_b);

        let diff = (a - b).abs().sum().into_scalar();
        assert!(diff < 1e-6);
    }

    #[test]
    fn test_zero_count_treated_as_one() {
        let input = tagged_input(1, 4, 2);
        let mut rng = StdRng::seed_from_u64(0);

        let sampled = sample_random_frames(input, &[0], 3, &mut rng);

        assert_eq!(frame_tags(sampled)[0], vec![0, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "frame-count vector")]
    fn test_count_vector_length_mismatch_panics() {
        let input = tagged_input(2, 4, 2);
        let mut rng = StdRng::seed_from_u64(0);
        let _ = sample_random_frames(input, &[4], 2, &mut rng);
    }

    #[test]
    #[should_panic(expected = "padded to")]
    fn test_count_beyond_padding_panics() {
        let input = tagged_input(1, 4, 2);
        let mut rng = StdRng::seed_from_u64(0);
        let _ = sample_random_frames(input, &[5], 2, &mut rng);
    }
}
