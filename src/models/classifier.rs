//! Video-level classification heads.
//!
//! Every frame-level model ends the same way: an aggregated per-video
//! vector goes through a classifier selected by name and comes back as
//! per-class probabilities. The heads live in one module struct with a kind
//! tag and optional sub-layers, so a model owns a single classifier field
//! whatever head its configuration picked.

use burn::config::Config;
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ModelError;

/// Classification head selected by a model's configuration.
#[derive(Module, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassifierKind {
    /// Independent sigmoid per class.
    Logistic,
    /// Mixture of expert sigmoids per class with a learned softmax gate.
    Moe,
}

impl FromStr for ClassifierKind {
    type Err = ModelError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "LogisticModel" | "logistic" => Ok(Self::Logistic),
            "MoeModel" | "moe" => Ok(Self::Moe),
            _ => Err(ModelError::UnknownClassifier(name.to_string())),
        }
    }
}

/// Configuration for a [`VideoClassifier`].
#[derive(Config, Debug)]
pub struct VideoClassifierConfig {
    /// Which head to build.
    #[config(default = "ClassifierKind::Moe")]
    pub kind: ClassifierKind,
    /// Number of experts mixed per class; only read by the mixture head.
    #[config(default = 2)]
    pub mixtures: usize,
}

impl VideoClassifierConfig {
    /// Initialize the head for aggregates of width `input_size`.
    ///
    /// # Panics
    /// If the mixture head is requested with zero mixtures.
    pub fn init<B: Backend>(
        &self,
        input_size: usize,
        vocab_size: usize,
        device: &B::Device,
    ) -> VideoClassifier<B> {
        let mut logits = None;
        let mut gates = None;
        let mut experts = None;

        match self.kind {
            ClassifierKind::Logistic => {
                logits = Some(LinearConfig::new(input_size, vocab_size).init(device));
            }
            ClassifierKind::Moe => {
                if self.mixtures == 0 {
                    panic!("a mixture classifier needs at least one expert");
                }
                gates = Some(
                    LinearConfig::new(input_size, vocab_size * (self.mixtures + 1))
                        .with_bias(false)
                        .init(device),
                );
                experts = Some(
                    LinearConfig::new(input_size, vocab_size * self.mixtures).init(device),
                );
            }
        }

        VideoClassifier {
            kind: self.kind,
            vocab_size,
            mixtures: self.mixtures,
            logits,
            gates,
            experts,
        }
    }
}

/// Maps an aggregated `[batch, features]` vector to `[batch, vocab_size]`
/// probabilities.
///
/// The mixture head follows the mixture-of-experts form: per class, a
/// softmax over `mixtures + 1` gate activations weighs `mixtures` expert
/// sigmoids (the extra gate slot is a learned "abstain" that absorbs gate
/// mass without contributing probability).
#[derive(Module, Debug)]
pub struct VideoClassifier<B: Backend> {
    #[module(skip)]
    kind: ClassifierKind,
    #[module(skip)]
    vocab_size: usize,
    #[module(skip)]
    mixtures: usize,
    logits: Option<Linear<B>>,
    gates: Option<Linear<B>>,
    experts: Option<Linear<B>>,
}

impl<B: Backend> VideoClassifier<B> {
    /// Which head this classifier was built as.
    pub fn kind(&self) -> ClassifierKind {
        self.kind
    }

    /// Number of output classes.
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Compute per-class probabilities for a batch of aggregates.
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch_size, _] = features.dims();

        match self.kind {
            ClassifierKind::Logistic => {
                let head = self
                    .logits
                    .as_ref()
                    .expect("logistic head built without its projection");
                activation::sigmoid(head.forward(features))
            }
            ClassifierKind::Moe => {
                let gates = self
                    .gates
                    .as_ref()
                    .expect("mixture head built without its gate projection");
                let experts = self
                    .experts
                    .as_ref()
                    .expect("mixture head built without its expert projection");

                let gate_logits = gates
                    .forward(features.clone())
                    .reshape([batch_size * self.vocab_size, self.mixtures + 1]);
                let gate = activation::softmax(gate_logits, 1);

                let expert = activation::sigmoid(
                    experts
                        .forward(features)
                        .reshape([batch_size * self.vocab_size, self.mixtures]),
                );

                let mixed: Tensor<B, 2> =
                    (gate.narrow(1, 0, self.mixtures) * expert).sum_dim(1);
                mixed.reshape([batch_size, self.vocab_size])
            }
        }
    }
}
