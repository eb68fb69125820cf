use crate::{
  error::Result,
  tensor::Tensor,
  variable::Variable,
  models::{ Model, Parameterized },
  train::TrainConfig,
};


/// Classifies flattened images with two hidden ReLU layers.
///
/// Rows of the output hold one unnormalized score per class.

#[derive(Debug, Clone)]
pub struct DigitClassificationModel {
  w1: Variable<f32>,
  b1: Variable<f32>,
  w2: Variable<f32>,
  b2: Variable<f32>,
  w3: Variable<f32>,
  b3: Variable<f32>,
}

impl DigitClassificationModel {
  pub const PIXELS: usize = 784;
  pub const HIDDEN: usize = 200;
  pub const CLASSES: usize = 10;

  pub fn new() -> Self {
    Self::with_sizes(Self::PIXELS, Self::HIDDEN, Self::CLASSES)
  }

  pub fn with_sizes(inputs: usize, hidden: usize, classes: usize) -> Self {
    Self {
      w1: Variable::parameter(inputs, hidden),
      b1: Variable::parameter(1, hidden),
      w2: Variable::parameter(hidden, hidden),
      b2: Variable::parameter(1, hidden),
      w3: Variable::parameter(hidden, classes),
      b3: Variable::parameter(1, classes),
    }
  }
}

impl Default for DigitClassificationModel {
  fn default() -> Self {
    Self::new()
  }
}

impl Parameterized for DigitClassificationModel {
  fn name(&self) -> &'static str {
    "digit-classification"
  }

  fn parameters(&self) -> Vec<&Variable<f32>> {
    vec![&self.w1, &self.b1, &self.w2, &self.b2, &self.w3, &self.b3]
  }
}

impl Model for DigitClassificationModel {
  type Input = Tensor<f32>;

  fn run(&self, x: &Tensor<f32>) -> Result<Variable<f32>> {
    x.tracked()
      .linear(&self.w1)?
      .add_bias(&self.b1)?
      .relu()
      .linear(&self.w2)?
      .add_bias(&self.b2)?
      .relu()
      .linear(&self.w3)?
      .add_bias(&self.b3)
  }

  /// Softmax loss against one-hot labels.

  fn get_loss(&self, x: &Tensor<f32>, y: &Tensor<f32>) -> Result<Variable<f32>> {
    self.run(x)?.softmax_loss(&y.tracked())
  }

  fn training_config(&self) -> TrainConfig {
    TrainConfig::digit_classification()
  }
}
