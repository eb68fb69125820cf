//! The four trainable models.
//!
//! Every model owns its parameters as [Variable]s and rebuilds a small
//! computation graph on each call to [run](Model::run), in the same eager
//! style throughout:
//!
//! ```
//! use microlearn::{ Model, RegressionModel, Tensor };
//!
//! let model = RegressionModel::new();
//! let x = Tensor::column(&[0.0, 1.5]);
//! let y = model.run(&x).unwrap();
//! assert_eq!(y.shape().rows, 2);
//! ```

use crate::{
  error::Result,
  tensor::Tensor,
  variable::Variable,
  dataset::Dataset,
  train::{ self, TrainConfig, TrainReport },
};

mod perceptron;
mod regression;
mod digits;
mod language;

pub use perceptron::PerceptronModel;
pub use regression::RegressionModel;
pub use digits::DigitClassificationModel;
pub use language::LanguageIdModel;


/// Anything holding a fixed list of trainable parameters.

pub trait Parameterized {
  /// Identifies the architecture in checkpoints.
  fn name(&self) -> &'static str;

  /// All parameters, always in the same order.
  fn parameters(&self) -> Vec<&Variable<f32>>;
}


/// A differentiable model trained on batches of `Input` by gradient descent.

pub trait Model: Parameterized {
  type Input;

  /// Compute the model's output scores for a batch.
  fn run(&self, input: &Self::Input) -> Result<Variable<f32>>;

  /// Loss of a batch against its labels.
  fn get_loss(&self, input: &Self::Input, labels: &Tensor<f32>) -> Result<Variable<f32>>;

  /// Hyperparameters that make this model converge on its usual dataset.
  fn training_config(&self) -> TrainConfig;

  /// Index of the highest score in each row.
  fn predict(&self, input: &Self::Input) -> Result<Vec<usize>> {
    Ok(self.run(input)?.tensor().argmax_rows())
  }

  /// Train with [training_config](Model::training_config) until it converges.
  fn train<D>(&self, dataset: &mut D) -> Result<TrainReport>
  where
    Self: Sized,
    D: Dataset<Input = Self::Input>,
  {
    train::train(self, dataset, &self.training_config())
  }
}
