//! Small supervised learning models trained by gradient descent.
//! Tiny. Few dependencies. CPU only.
//!
//! # Features
//!
//! - **Four models**: A [perceptron](PerceptronModel), a
//! [function regressor](RegressionModel), a [digit classifier](DigitClassificationModel)
//! and a recurrent [language identifier](LanguageIdModel), each with the
//! hyperparameters that make it converge on its dataset.
//!
//! - **Eager computation graphs**: Every forward pass records its operations on
//! [Variable]s, so the gradient of a loss with respect to any set of parameters
//! is one call away.
//!
//! - **Checked shapes**: Operations on mismatched tensors return an [Error]
//! instead of panicking.
//!
//! - **Datasets**: Synthetic point clouds and sine samples, MNIST digits from
//! IDX files and tab separated word corpora for language identification.
//!
//! - **Checkpoints**: Trained parameters can be [saved](checkpoint::save)
//! and [restored](checkpoint::load).
//!
//! # Examples
//!
//! Fitting `sin(x)` until the training loss drops below `0.02`:
//! ```no_run
//! use microlearn::{ Model, RegressionModel, dataset::sine };
//!
//! let model = RegressionModel::new();
//! let mut data = sine(200).unwrap();
//! let report = model.train(&mut data).unwrap();
//! println!("Converged after {} epochs", report.epochs);
//! ```
//!
//! Computing gradients by hand:
//! ```
//! use microlearn::{ Tensor, Variable, GradientDescent };
//!
//! let w = Variable::<f32>::parameter(2, 1);
//! let x = Tensor::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap().tracked();
//! let y = Tensor::column(&[1.0, 0.0]).tracked();
//!
//! let mut optimizer = GradientDescent::new(-0.01);
//! for _ in 0..10 {
//!   let loss = x.linear(&w).unwrap().square_loss(&y).unwrap();
//!   optimizer.minimize(&loss, &[&w]).unwrap();
//! }
//! ```
//!
//! ## More examples
//! Check the `/demos` folder for a runnable program per model.
//!
//!
//! # Optional features
//!
//! Some features can be toggled in your `Cargo.toml`.
//!
//! - `unsafe` *(default)*: Accelerated matrix math using [matrixmultiply] crate.
//! - `rayon`: Multi-threaded fallback matrix product when `unsafe` is disabled.

mod internal;
mod shape;
mod tensor;
mod variable;
mod error;

pub mod scalar;
pub mod optimize;
pub mod dataset;
pub mod models;
pub mod train;
pub mod checkpoint;

pub use internal::seed;
pub use shape::Shape;
pub use tensor::Tensor;
pub use variable::{ Variable, UnaryOp, BinaryOp, UnaryMops, BinaryMops };
pub use error::{ Error, Result };
pub use optimize::GradientDescent;
pub use dataset::{ Dataset, TensorDataset, DigitDataset, LanguageDataset };
pub use models::{
  Model,
  Parameterized,
  PerceptronModel,
  RegressionModel,
  DigitClassificationModel,
  LanguageIdModel,
};
pub use train::{ BatchSize, Stop, TrainConfig, TrainReport };
