//! Training configuration and the generic gradient descent loop.

use crate::{
  error::{ Error, Result },
  dataset::{ Batch, Dataset },
  models::Model,
  optimize::GradientDescent,
};


/// How many examples go into each update.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BatchSize {
  /// Exactly this many examples.
  Fixed(usize),
  /// The dataset length divided by this number.
  Divisor(usize),
  /// The whole dataset at once.
  Full,
}

impl BatchSize {
  pub fn resolve(&self, len: usize) -> usize {
    match *self {
      Self::Fixed(size) => size,
      Self::Divisor(parts) => (len / parts.max(1)).max(1),
      Self::Full => len.max(1),
    }
  }
}


/// When training counts as converged. Both thresholds are inclusive.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stop {
  /// Every training example is classified correctly.
  NoMistakes,
  /// Loss over the training set is at or below the threshold.
  LossBelow(f32),
  /// Validation accuracy is at or above the threshold.
  AccuracyAtLeast(f32),
}

impl Stop {
  /// Whether `metric`, as computed for this condition, satisfies it.

  pub fn reached(&self, metric: f32) -> bool {
    match *self {
      Self::NoMistakes => metric == 0.0,
      Self::LossBelow(threshold) => metric <= threshold,
      Self::AccuracyAtLeast(threshold) => metric >= threshold,
    }
  }

  fn metric(&self) -> &'static str {
    match self {
      Self::NoMistakes => "mistakes",
      Self::LossBelow(_) => "loss",
      Self::AccuracyAtLeast(_) => "validation accuracy",
    }
  }
}


/// Configuration for model training.

#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
  /// Signed step applied to every gradient. Negative for descent.
  pub multiplier: f32,
  pub batch: BatchSize,
  pub stop: Stop,
  /// Give up after this many epochs. Unbounded when `None`.
  pub max_epochs: Option<usize>,
}

impl TrainConfig {
  pub fn new(multiplier: f32, batch: BatchSize, stop: Stop) -> Self {
    Self { multiplier, batch, stop, max_epochs: None }
  }

  /// One point at a time with the label as step, until an epoch passes without mistakes.

  pub fn perceptron() -> Self {
    Self::new(1.0, BatchSize::Fixed(1), Stop::NoMistakes)
  }

  pub fn regression() -> Self {
    Self::new(-0.05, BatchSize::Divisor(2), Stop::LossBelow(0.02))
  }

  pub fn digit_classification() -> Self {
    Self::new(-0.3, BatchSize::Divisor(600), Stop::AccuracyAtLeast(0.97))
  }

  pub fn language_id() -> Self {
    Self::new(-0.5, BatchSize::Divisor(35), Stop::AccuracyAtLeast(0.87))
  }

  pub fn multiplier(mut self, multiplier: f32) -> Self {
    self.multiplier = multiplier;
    self
  }

  pub fn batch(mut self, batch: BatchSize) -> Self {
    self.batch = batch;
    self
  }

  pub fn stop(mut self, stop: Stop) -> Self {
    self.stop = stop;
    self
  }

  pub fn max_epochs(mut self, epochs: usize) -> Self {
    self.max_epochs = Some(epochs);
    self
  }
}


/// Outcome of a training run.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainReport {
  /// Completed passes over the training data.
  pub epochs: usize,
  /// Parameter updates applied.
  pub updates: usize,
  /// Whether the stop condition was met.
  pub converged: bool,
  /// The stop condition's metric, once before training
  /// and once after every epoch.
  pub history: Vec<f32>,
}


/// Train `model` on `dataset` until `config.stop` is reached.
///
/// The stop condition is evaluated before the first epoch, so a model that
/// already satisfies it is left untouched. Exceeding `config.max_epochs`
/// ends training with an unconverged report rather than an error.

pub fn train<M, D>(model: &M, dataset: &mut D, config: &TrainConfig) -> Result<TrainReport>
where
  M: Model,
  D: Dataset<Input = M::Input>,
{
  let params = model.parameters();
  let batch_size = config.batch.resolve(dataset.len());
  let mut optimizer = GradientDescent::new(config.multiplier);
  let mut report = TrainReport::default();

  let mut metric = evaluate(model, dataset, config.stop)?;
  report.history.push(metric);
  log::info!("Training {} on {} examples in batches of {batch_size}, initial {} {metric}",
    model.name(), dataset.len(), config.stop.metric());

  while !config.stop.reached(metric) {
    if config.max_epochs.is_some_and(|max| report.epochs >= max ) {
      log::info!("Stopped {} after {} epochs at {} {metric}", model.name(), report.epochs, config.stop.metric());
      return Ok(report)
    }

    for (x, y) in dataset.iterate_once(batch_size)? {
      let loss = model.get_loss(&x, &y)?;
      log::trace!("Batch loss {}", loss.item()?);
      optimizer.minimize(&loss, &params)?;
    }
    report.epochs += 1;
    report.updates = optimizer.steps();

    metric = evaluate(model, dataset, config.stop)?;
    report.history.push(metric);
    log::debug!("Epoch {}: {} {metric}", report.epochs, config.stop.metric());
  }

  report.converged = true;
  log::info!("{} converged after {} epochs", model.name(), report.epochs);
  Ok(report)
}


/// Compute the metric `stop` is checked against.

pub fn evaluate<M, D>(model: &M, dataset: &D, stop: Stop) -> Result<f32>
where
  M: Model,
  D: Dataset<Input = M::Input>,
{
  match stop {
    Stop::NoMistakes => {
      let batches = dataset.training_set()?;
      Ok((count(&batches) - correct(model, &batches)?) as f32)
    },
    Stop::LossBelow(_) => loss(model, &dataset.training_set()?),
    Stop::AccuracyAtLeast(_) => accuracy(model, &dataset.validation_set()?),
  }
}


/// Mean loss over all rows of `batches`.

pub fn loss<M: Model>(model: &M, batches: &[Batch<M::Input>]) -> Result<f32> {
  let total = count(batches);
  if total == 0 { return Err(Error::EmptyDataset) }
  let mut sum = 0.0;
  for (x, y) in batches {
    sum += model.get_loss(x, y)?.item()? * y.rows() as f32;
  }
  Ok(sum / total as f32)
}


/// Fraction of rows whose predicted class matches the argmax of their label.

pub fn accuracy<M: Model>(model: &M, batches: &[Batch<M::Input>]) -> Result<f32> {
  let total = count(batches);
  if total == 0 { return Err(Error::EmptyDataset) }
  Ok(correct(model, batches)? as f32 / total as f32)
}

fn correct<M: Model>(model: &M, batches: &[Batch<M::Input>]) -> Result<usize> {
  let mut correct = 0;
  for (x, y) in batches {
    correct += model.predict(x)?
      .iter()
      .zip(y.argmax_rows())
      .filter(|(predicted, label)| **predicted == *label )
      .count();
  }
  Ok(correct)
}

fn count<X>(batches: &[Batch<X>]) -> usize {
  batches.iter().map(|(_, y)| y.rows() ).sum()
}
