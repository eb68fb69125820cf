//! Error types shared by the whole crate.

use thiserror::Error;

use crate::Shape;

/// Errors produced while building graphs, loading data or training models.
#[derive(Debug, Error)]
pub enum Error {
  #[error("Data length {len} doesn't match {shape} tensor")]
  DataLength { shape: Shape, len: usize },

  #[error("Shape mismatch in {op}: {lhs} vs {rhs}")]
  ShapeMismatch {
    op: &'static str,
    lhs: Shape,
    rhs: Shape,
  },

  #[error("Expected a single value, got a {0} tensor")]
  NotScalar(Shape),

  #[error("Gradients can only be computed for loss nodes")]
  NotALoss,

  #[error("Loss node has already been used for backpropagation")]
  LossReused,

  #[error("Only parameters can be updated or differentiated against")]
  NotAParameter,

  #[error("Labels must be non-negative and sum to one in every row")]
  InvalidLabels,

  #[error("Batch size {batch_size} doesn't evenly divide {len} examples")]
  BatchSize { len: usize, batch_size: usize },

  #[error("Dataset is empty")]
  EmptyDataset,

  #[error("Dataset has no {0} split")]
  MissingSplit(&'static str),

  #[error("Invalid {what}: {message}")]
  Format { what: &'static str, message: String },

  #[error("Character {0:?} is not part of the alphabet")]
  UnknownCharacter(char),

  #[error("{model} can't stop on {stop}")]
  UnsupportedStop { model: &'static str, stop: &'static str },

  #[error("Checkpoint mismatch: {message}")]
  Checkpoint { message: String },

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Serialization error: {0}")]
  Serialization(#[from] postcard::Error),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
