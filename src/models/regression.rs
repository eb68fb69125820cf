use crate::{
  error::Result,
  tensor::Tensor,
  variable::Variable,
  models::{ Model, Parameterized },
  train::TrainConfig,
};


/// Fits a real function of one variable with a single hidden layer:
/// `relu(x·w1 + b1)·w2 + b2`.

#[derive(Debug, Clone)]
pub struct RegressionModel {
  w1: Variable<f32>,
  b1: Variable<f32>,
  w2: Variable<f32>,
  b2: Variable<f32>,
}

impl RegressionModel {
  pub const HIDDEN: usize = 100;

  pub fn new() -> Self {
    Self::with_hidden(Self::HIDDEN)
  }

  pub fn with_hidden(hidden: usize) -> Self {
    Self {
      w1: Variable::parameter(1, hidden),
      b1: Variable::parameter(1, hidden),
      w2: Variable::parameter(hidden, 1),
      b2: Variable::parameter(1, 1),
    }
  }
}

impl Default for RegressionModel {
  fn default() -> Self {
    Self::new()
  }
}

impl Parameterized for RegressionModel {
  fn name(&self) -> &'static str {
    "regression"
  }

  fn parameters(&self) -> Vec<&Variable<f32>> {
    vec![&self.w1, &self.b1, &self.w2, &self.b2]
  }
}

impl Model for RegressionModel {
  type Input = Tensor<f32>;

  /// Predictions for a `batch × 1` column of inputs.

  fn run(&self, x: &Tensor<f32>) -> Result<Variable<f32>> {
    x.tracked()
      .linear(&self.w1)?
      .add_bias(&self.b1)?
      .relu()
      .linear(&self.w2)?
      .add_bias(&self.b2)
  }

  fn get_loss(&self, x: &Tensor<f32>, y: &Tensor<f32>) -> Result<Variable<f32>> {
    self.run(x)?.square_loss(&y.tracked())
  }

  fn training_config(&self) -> TrainConfig {
    TrainConfig::regression()
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::dataset::{ Dataset, sine };

  #[test]
  fn shapes() {
    let model = RegressionModel::with_hidden(8);
    let x = Tensor::column(&[0.0, 1.0, 2.0]);
    assert_eq!(model.run(&x).unwrap().shape(), crate::Shape::new(3, 1));
    assert!(model.get_loss(&x, &Tensor::column(&[0.0])).is_err());
    assert_eq!(model.parameters().len(), 4);
  }

  #[test]
  fn loss_decreases() {
    crate::seed(4);
    let model = RegressionModel::with_hidden(20);
    let mut data = sine(40).unwrap().with_seed(4);
    let (x, y) = data.training_set().unwrap().remove(0);
    let before = model.get_loss(&x, &y).unwrap().item().unwrap();
    let config = model.training_config().max_epochs(50);
    let report = crate::train::train(&model, &mut data, &config).unwrap();
    let after = model.get_loss(&x, &y).unwrap().item().unwrap();
    assert!(after < before, "{after} >= {before}");
    assert_eq!(report.history[0], before);
  }
}
