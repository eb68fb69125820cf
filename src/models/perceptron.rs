use crate::{
  error::{ Error, Result },
  tensor::Tensor,
  variable::Variable,
  dataset::Dataset,
  models::Parameterized,
  train::{ Stop, TrainConfig, TrainReport },
};


/// Binary linear classifier.
///
/// Points are scored by their dot product with a single weight row and
/// classified as `+1` when the score is non-negative, `-1` otherwise.

#[derive(Debug, Clone)]
pub struct PerceptronModel {
  w: Variable<f32>,
}

impl PerceptronModel {
  pub fn new(dimensions: usize) -> Self {
    Self { w: Variable::parameter(1, dimensions) }
  }

  pub fn get_weights(&self) -> &Variable<f32> {
    &self.w
  }

  /// Score of every row of `x`, as a `batch × 1` variable.

  pub fn run(&self, x: &Tensor<f32>) -> Result<Variable<f32>> {
    x.tracked().dot(&self.w)
  }

  /// Class of a single point, `1.0` or `-1.0`.

  pub fn get_prediction(&self, x: &Tensor<f32>) -> Result<f32> {
    let score = self.run(x)?.item()?;
    Ok(if score >= 0.0 { 1.0 } else { -1.0 })
  }

  /// Train until an epoch passes without a single mistake.

  pub fn train<D>(&self, dataset: &mut D) -> Result<TrainReport>
  where
    D: Dataset<Input = Tensor<f32>>,
  {
    self.train_with(dataset, &TrainConfig::perceptron())
  }

  /// Visit the points one at a time and add `multiplier × label × x`
  /// to the weights for every misclassified point.
  ///
  /// The stop condition is checked after each epoch against the
  /// mistakes made during that epoch.

  pub fn train_with<D>(&self, dataset: &mut D, config: &TrainConfig) -> Result<TrainReport>
  where
    D: Dataset<Input = Tensor<f32>>,
  {
    if let Stop::LossBelow(_) = config.stop {
      return Err(Error::UnsupportedStop { model: self.name(), stop: "loss" })
    }
    log::info!("Training perceptron on {} points", dataset.len());
    let mut report = TrainReport::default();
    loop {
      if config.max_epochs.is_some_and(|max| report.epochs >= max ) {
        log::info!("Perceptron still misclassifies points after {} epochs", report.epochs);
        return Ok(report)
      }

      let mut mistakes = 0;
      for (x, y) in dataset.iterate_once(1)? {
        let label = y.item()?;
        if self.get_prediction(&x)? != label {
          mistakes += 1;
          self.w.update(&x, config.multiplier * label)?;
        }
      }
      report.epochs += 1;
      report.updates += mistakes;

      let metric = match config.stop {
        Stop::AccuracyAtLeast(_) => 1.0 - mistakes as f32 / dataset.len() as f32,
        _ => mistakes as f32,
      };
      report.history.push(metric);
      log::debug!("Epoch {}: {mistakes} mistakes", report.epochs);

      if config.stop.reached(metric) {
        report.converged = true;
        log::info!("Perceptron converged after {} epochs", report.epochs);
        return Ok(report)
      }
    }
  }
}

impl Parameterized for PerceptronModel {
  fn name(&self) -> &'static str {
    "perceptron"
  }

  fn parameters(&self) -> Vec<&Variable<f32>> {
    vec![&self.w]
  }
}
