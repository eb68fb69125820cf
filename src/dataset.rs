//! In-memory datasets and batching.
//!
//! A [Dataset] hands out shuffled `(input, labels)` batches for training,
//! plus fixed evaluation splits. Labels are always a `batch × k` tensor;
//! the input type depends on the model ([Tensor] rows for the feed-forward
//! models, one tensor per character for [LanguageDataset]).

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

mod synthetic;
mod digits;
mod language;
pub mod idx;

pub use synthetic::{ separable_points, sine };
pub use digits::DigitDataset;
pub use language::LanguageDataset;

use crate::{
  internal::with_rng,
  error::{ Error, Result },
  tensor::Tensor,
};


/// A batch of model inputs together with their labels.

pub type Batch<X> = (X, Tensor<f32>);


/// Source of training and evaluation batches.

pub trait Dataset {
  type Input;

  /// Number of training examples.
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// One shuffled pass over the training data in batches of `batch_size`.
  fn iterate_once(&mut self, batch_size: usize) -> Result<Vec<Batch<Self::Input>>>;

  /// The whole training split, in as few batches as the input type allows.
  fn training_set(&self) -> Result<Vec<Batch<Self::Input>>>;

  fn validation_set(&self) -> Result<Vec<Batch<Self::Input>>> {
    Err(Error::MissingSplit("validation"))
  }

  fn test_set(&self) -> Result<Vec<Batch<Self::Input>>> {
    Err(Error::MissingSplit("test"))
  }
}


pub(crate) fn seeded_rng() -> StdRng {
  StdRng::seed_from_u64(with_rng(|rng| rng.gen() ))
}


/// Row-aligned features and labels held in memory.

#[derive(Debug, Clone)]
pub struct TensorDataset {
  x: Tensor<f32>,
  y: Tensor<f32>,
  rng: StdRng,
}

impl TensorDataset {
  pub fn new(x: Tensor<f32>, y: Tensor<f32>) -> Result<Self> {
    if x.rows() != y.rows() {
      return Err(Error::ShapeMismatch { op: "dataset", lhs: x.shape(), rhs: y.shape() })
    }
    Ok(Self { x, y, rng: seeded_rng() })
  }

  /// Make shuffling independent of the thread's random state.

  pub fn with_seed(mut self, seed: u64) -> Self {
    self.rng = StdRng::seed_from_u64(seed);
    self
  }

  pub fn x(&self) -> &Tensor<f32> {
    &self.x
  }

  pub fn y(&self) -> &Tensor<f32> {
    &self.y
  }
}

impl Dataset for TensorDataset {
  type Input = Tensor<f32>;

  fn len(&self) -> usize {
    self.x.rows()
  }

  fn iterate_once(&mut self, batch_size: usize) -> Result<Vec<Batch<Tensor<f32>>>> {
    let len = self.len();
    if len == 0 { return Err(Error::EmptyDataset) }
    if batch_size == 0 || len % batch_size != 0 {
      return Err(Error::BatchSize { len, batch_size })
    }
    let mut indices: Vec<usize> = (0..len).collect();
    indices.shuffle(&mut self.rng);
    indices
      .chunks(batch_size)
      .map(|ids| Ok((self.x.select_rows(ids)?, self.y.select_rows(ids)?)) )
      .collect()
  }

  fn training_set(&self) -> Result<Vec<Batch<Tensor<f32>>>> {
    if self.is_empty() { return Err(Error::EmptyDataset) }
    Ok(vec![(self.x.clone(), self.y.clone())])
  }
}
