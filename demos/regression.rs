// Fits sin(x) on [-2π, 2π] with a single hidden layer,
// then saves the trained parameters and restores them into a fresh model.

use microlearn::{ Model, RegressionModel, Tensor, checkpoint, dataset::sine };

fn main() {
  microlearn::seed(42);
  let mut data = sine(200).unwrap();

  let model = RegressionModel::new();
  let report = model.train(&mut data).unwrap();
  println!("Loss {:?} after {} epochs", report.history.last(), report.epochs);

  let x = Tensor::column(&[-3.0, -1.0, 0.0, 1.0, 3.0]);
  let y = model.run(&x).unwrap();
  for (x, y) in x.to_vec().iter().zip(y.tensor().to_vec()) {
    println!("sin({x:5.2}) = {:6.3}, predicted {y:6.3}", x.sin());
  }

  let path = std::env::temp_dir().join("regression.ckpt");
  checkpoint::save(&model, &path).unwrap();
  let restored = RegressionModel::new();
  checkpoint::load(&restored, &path).unwrap();
  println!("Restored model predicts {}", restored.run(&x).unwrap().tensor());
}
