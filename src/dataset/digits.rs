use std::path::Path;

use crate::{
  error::{ Error, Result },
  tensor::Tensor,
  dataset::{ Batch, Dataset, TensorDataset, idx::Idx },
};


/// Handwritten digits: `28 × 28` grayscale images flattened into 784 values
/// in `[0, 1]`, labeled with one of ten one-hot classes.
///
/// The held-out images are split in half: the first half validates
/// during training, the second half is kept for testing.

#[derive(Debug, Clone)]
pub struct DigitDataset {
  train: TensorDataset,
  validation: Batch<Tensor<f32>>,
  test: Batch<Tensor<f32>>,
}

impl DigitDataset {
  pub const PIXELS: usize = 784;
  pub const CLASSES: usize = 10;

  pub fn new(
    train_images: Tensor<f32>,
    train_labels: &[usize],
    test_images: Tensor<f32>,
    test_labels: &[usize],
  ) -> Result<Self> {
    let train = TensorDataset::new(train_images, Tensor::one_hot(train_labels, Self::CLASSES)?)?;
    if test_images.rows() != test_labels.len() {
      return Err(Error::Format {
        what: "digit dataset",
        message: format!("{} test images but {} labels", test_images.rows(), test_labels.len()),
      })
    }
    if test_images.cols() != train.x().cols() {
      return Err(Error::ShapeMismatch { op: "digit dataset", lhs: train.x().shape(), rhs: test_images.shape() })
    }
    let half = test_labels.len() / 2;
    let (validation_ids, test_ids): (Vec<usize>, Vec<usize>) = (
      (0..half).collect(),
      (half..test_labels.len()).collect(),
    );
    let split = |ids: &[usize]| -> Result<Batch<Tensor<f32>>> {
      let labels: Vec<usize> = ids.iter().map(|&i| test_labels[i] ).collect();
      Ok((test_images.select_rows(ids)?, Tensor::one_hot(&labels, Self::CLASSES)?))
    };
    Ok(Self {
      validation: split(&validation_ids)?,
      test: split(&test_ids)?,
      train,
    })
  }

  /// Read the four uncompressed MNIST files from `dir`.

  pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref();
    let read = |name: &str| Idx::read(dir.join(name));
    let train_images = read("train-images-idx3-ubyte")?.images()?;
    let train_labels = read("train-labels-idx1-ubyte")?.labels()?;
    let test_images = read("t10k-images-idx3-ubyte")?.images()?;
    let test_labels = read("t10k-labels-idx1-ubyte")?.labels()?;
    log::info!("Loaded {} training and {} held-out digits from {}",
      train_labels.len(), test_labels.len(), dir.display());
    Self::new(train_images, &train_labels, test_images, &test_labels)
  }

  pub fn with_seed(mut self, seed: u64) -> Self {
    self.train = self.train.with_seed(seed);
    self
  }
}

impl Dataset for DigitDataset {
  type Input = Tensor<f32>;

  fn len(&self) -> usize {
    self.train.len()
  }

  fn iterate_once(&mut self, batch_size: usize) -> Result<Vec<Batch<Tensor<f32>>>> {
    self.train.iterate_once(batch_size)
  }

  fn training_set(&self) -> Result<Vec<Batch<Tensor<f32>>>> {
    self.train.training_set()
  }

  fn validation_set(&self) -> Result<Vec<Batch<Tensor<f32>>>> {
    if self.validation.0.rows() == 0 { return Err(Error::MissingSplit("validation")) }
    Ok(vec![self.validation.clone()])
  }

  fn test_set(&self) -> Result<Vec<Batch<Tensor<f32>>>> {
    if self.test.0.rows() == 0 { return Err(Error::MissingSplit("test")) }
    Ok(vec![self.test.clone()])
  }
}
