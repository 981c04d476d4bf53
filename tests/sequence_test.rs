//! Tests for the sequence utilities through the public API

use burn::backend::NdArray;
use burn::tensor::Tensor;
use frameseq::pooling::{pooled_length, strided_length, temporal_stride};
use frameseq::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[cfg(test)]
mod tests {
    use super::*;

    type Backend = NdArray<f32>;

    /// Frame t of example b holds the constant b * 100 + t.
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

    fn tag_at(tensor: &Tensor<Backend, 3>, b: usize, t: usize) -> usize {
        let value = tensor
            .clone()
            .slice([b..b + 1, t..t + 1, 0..1])
            .into_scalar();
        value as usize - b * 100
    }

    #[test]
    fn test_samplers_respect_counts_across_length_grid() {
        let max_frames = 12;
        for count in 1..=max_frames {
            let input = tagged_input(1, max_frames, 2);
            let mut rng = StdRng::seed_from_u64(count as u64);

            let frames = sample_random_frames(input.clone(), &[count], 8, &mut rng);
            let window = sample_random_sequence(input, &[count], 8, &mut rng);

            for s in 0..8 {
                assert!(tag_at(&frames, 0, s) < count, "count {}", count);
                assert!(tag_at(&window, 0, s) < count, "count {}", count);
            }
        }
    }

    #[test]
    fn test_pool_frames_equal_vectors_fixed_point() {
        let device = Default::default();
        let frame = [0.5f32, -1.5, 2.0, 0.0];
        let mut data = Vec::new();
        for _ in 0..6 {
            data.extend_from_slice(&frame);
        }
        let sequence =
            Tensor::<Backend, 1>::from_floats(data.as_slice(), &device).reshape([1, 6, 4]);

        for method in [PoolMethod::Average, PoolMethod::Max] {
            let pooled = pool_frames(sequence.clone(), method);
            let expected =
                Tensor::<Backend, 1>::from_floats(frame.as_slice(), &device).reshape([1, 4]);
            let diff = (pooled - expected).abs().sum().into_scalar();
            assert!(diff < 1e-6);
        }

        // Sum scales the common vector by the sequence length.
        let summed = pool_frames(sequence, PoolMethod::Sum);
        let expected =
            Tensor::<Backend, 1>::from_floats(frame.as_slice(), &device).reshape([1, 4]) * 6.0;
        let diff = (summed - expected).abs().sum().into_scalar();
        assert!(diff < 1e-6);
    }

    #[test]
    fn test_reverse_sequence_round_trips_under_models_contract() {
        let device = Default::default();
        let input = Tensor::<Backend, 3>::random(
            [2, 7, 3],
            burn::tensor::Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let counts = [7, 4];

        let twice = reverse_sequence(reverse_sequence(input.clone(), &counts), &counts);

        let diff = (twice - input).abs().sum().into_scalar();
        assert!(diff < 1e-6);
    }

    #[test]
    fn test_stride_and_length_rules_agree() {
        let input = tagged_input(1, 11, 1);

        for step in 1..4 {
            let strided = temporal_stride(input.clone(), step);
            let [_, kept, _] = strided.dims();
            assert_eq!(kept, strided_length(11, step));

            for s in 0..kept {
                assert_eq!(tag_at(&strided, 0, s), s * step);
            }
        }
    }

    #[test]
    fn test_pooled_length_never_exceeds_reduced_tensor() {
        // The stage-2 lengths computed per example must fit inside the
        // tensor produced by pooling the padded sequence.
        let max_frames = 10;
        for window in 1..4 {
            for stride in 1..3 {
                let full = pooled_length(max_frames, window, stride);
                for count in 0..=max_frames {
                    assert!(pooled_length(count, window, stride) <= full);
                }
            }
        }
    }
}
