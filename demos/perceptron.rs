// Trains a perceptron on randomly generated, linearly separable points.
// Each point carries a constant third coordinate that acts as a bias.

use microlearn::{ PerceptronModel, Parameterized, Tensor, dataset::separable_points };

fn main() {
  let mut data = separable_points(500).unwrap();

  let model = PerceptronModel::new(3);
  let report = model.train(&mut data).unwrap();

  println!("Converged after {} epochs and {} updates", report.epochs, report.updates);
  println!("Mistakes per epoch: {:?}", report.history);
  println!("Learned weights: {}", model.get_weights());

  for point in [[2.0, 1.0, 1.0], [-1.0, -1.0, 1.0]] {
    let class = model.get_prediction(&Tensor::vec(&point)).unwrap();
    println!("{point:?} -> {class}");
  }

  println!("{} has {} parameter tensor", model.name(), model.parameters().len());
}
