//! End to end training of every model on small synthetic datasets.

use microlearn::{
  checkpoint,
  dataset::{ separable_points, sine },
  train,
  BatchSize,
  Dataset,
  DigitClassificationModel,
  DigitDataset,
  LanguageDataset,
  LanguageIdModel,
  Model,
  PerceptronModel,
  RegressionModel,
  Tensor,
  TrainConfig,
};

// Every class lights up its own band of pixels
fn digits(labels: &[usize]) -> Tensor<f32> {
  let mut pixels = vec![0.0; labels.len() * 784];
  for (i, &label) in labels.iter().enumerate() {
    for p in label * 78..(label + 1) * 78 {
      pixels[i * 784 + p] = 0.8;
    }
  }
  Tensor::new(labels.len(), 784, pixels).unwrap()
}

#[test]
fn perceptron_separates_points() {
  microlearn::seed(10);
  let mut data = separable_points(100).unwrap().with_seed(10);
  let model = PerceptronModel::new(3);
  let report = model.train(&mut data).unwrap();
  assert!(report.converged);

  let (x, y) = data.training_set().unwrap().remove(0);
  for i in 0..x.rows() {
    let point = x.select_rows(&[i]).unwrap();
    assert_eq!(model.get_prediction(&point).unwrap(), y.get(i, 0).unwrap());
  }
}

#[test]
fn regression_approaches_sine() {
  microlearn::seed(11);
  let mut data = sine(40).unwrap().with_seed(11);
  let model = RegressionModel::new();
  let report = train::train(&model, &mut data, &model.training_config().max_epochs(200)).unwrap();
  let first = report.history[0];
  let last = *report.history.last().unwrap();
  assert!(last < first, "loss went from {first} to {last}");
  assert_eq!(report.updates, report.epochs * 2);
}

#[test]
fn digit_classifier_reaches_accuracy() {
  microlearn::seed(12);
  let train_labels: Vec<usize> = (0..30).map(|i| i % 10 ).collect();
  let test_labels: Vec<usize> = (0..20).map(|i| (i * 3) % 10 ).collect();
  let mut data = DigitDataset::new(digits(&train_labels), &train_labels, digits(&test_labels), &test_labels)
    .unwrap()
    .with_seed(12);
  let model = DigitClassificationModel::new();
  let config = model.training_config().batch(BatchSize::Fixed(10)).max_epochs(100);
  let report = train::train(&model, &mut data, &config).unwrap();
  assert!(report.converged, "{:?}", report.history);
  assert!(train::accuracy(&model, &data.validation_set().unwrap()).unwrap() >= 0.97);
  assert_eq!(model.predict(&digits(&[4, 7])).unwrap(), vec![4, 7]);
}

#[test]
fn language_model_survives_checkpoint() {
  microlearn::seed(13);
  let corpus = "\
train\tvowels\taei
train\tvowels\tiou
train\tvowels\tuae
train\tvowels\teo
train\tconsonants\tbcd
train\tconsonants\tfgh
train\tconsonants\tdfb
train\tconsonants\tgh
dev\tvowels\toia
dev\tconsonants\thgf
test\tvowels\tea
test\tconsonants\tcb
";
  let mut data = LanguageDataset::from_tsv(corpus).unwrap().with_seed(13);
  let model = LanguageIdModel::for_dataset(&data);
  let config = model.training_config().batch(BatchSize::Fixed(2)).max_epochs(200);
  let report = train::train(&model, &mut data, &config).unwrap();
  assert!(report.converged, "{:?}", report.history);
  assert_eq!(train::accuracy(&model, &data.test_set().unwrap()).unwrap(), 1.0);

  let path = std::env::temp_dir().join(format!("microlearn-language-{}.ckpt", std::process::id()));
  checkpoint::save(&model, &path).unwrap();
  let restored = LanguageIdModel::for_dataset(&data);
  checkpoint::load(&restored, &path).unwrap();
  std::fs::remove_file(&path).unwrap();

  let xs = data.encode(&["aie", "dhb"]).unwrap();
  assert_eq!(restored.run(&xs).unwrap().tensor(), model.run(&xs).unwrap().tensor());
  assert_eq!(restored.predict(&xs).unwrap(), vec![0, 1]);
}

#[test]
fn checkpoints_reject_other_models() {
  let path = std::env::temp_dir().join(format!("microlearn-mismatch-{}.ckpt", std::process::id()));
  checkpoint::save(&RegressionModel::with_hidden(3), &path).unwrap();
  let result = checkpoint::load(&DigitClassificationModel::with_sizes(1, 3, 1), &path);
  std::fs::remove_file(&path).unwrap();
  assert!(result.is_err());
}

#[test]
fn custom_config() {
  microlearn::seed(14);
  let mut data = sine(20).unwrap();
  let model = RegressionModel::with_hidden(10);
  let config = TrainConfig::regression()
    .multiplier(-0.01)
    .batch(BatchSize::Full)
    .max_epochs(5);
  let report = train::train(&model, &mut data, &config).unwrap();
  assert_eq!(report.updates, report.epochs);
  assert!(report.epochs <= 5);
}
