//! Error type for by-name model construction.

use thiserror::Error;

/// Errors raised while resolving names or validating a model configuration.
///
/// Shape and invariant violations inside an already-validated model (for
/// example a frame-count vector whose length does not match the batch size)
/// are programmer errors and panic instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The requested frame-level model name is not registered.
    #[error("unknown frame-level model `{0}`")]
    UnknownModel(String),

    /// The requested video-level classifier name is not registered.
    #[error("unknown video-level classifier `{0}`")]
    UnknownClassifier(String),

    /// The requested pooling method name is not registered.
    #[error("unknown pooling method `{0}`")]
    UnknownPooling(String),

    /// Attention and residual cell augments were both requested.
    #[error("attention and residual cell augments are mutually exclusive")]
    ConflictingAugments,
}
