use std::f32::consts::PI;

use crate::{
  error::Result,
  tensor::Tensor,
  dataset::TensorDataset,
};


/// Linearly separable points for the perceptron.
///
/// Each row holds two standard normal coordinates followed by a constant 1,
/// which lets the weights act as a bias. Points with `x0 + 2·x1 - 1 ≥ 0`
/// are labeled `+1`, all others `-1`.

pub fn separable_points(points: usize) -> Result<TensorDataset> {
  let coords = Tensor::<f32>::randn(points, 2).to_vec();
  let mut x = Vec::with_capacity(points * 3);
  let mut y = Vec::with_capacity(points);
  for row in coords.chunks(2) {
    x.extend_from_slice(&[row[0], row[1], 1.0]);
    y.push(if row[0] + 2.0 * row[1] - 1.0 >= 0.0 { 1.0 } else { -1.0 });
  }
  TensorDataset::new(Tensor::new(points, 3, x)?, Tensor::column(&y))
}


/// `sin(x)` sampled at `points` evenly spaced positions on `[-2π, 2π]`.

pub fn sine(points: usize) -> Result<TensorDataset> {
  let x = Tensor::linspace(points, -2.0 * PI, 2.0 * PI);
  let y = x.map(f32::sin);
  TensorDataset::new(x, y)
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::dataset::Dataset;

  #[test]
  fn separable() {
    crate::seed(11);
    let data = separable_points(50).unwrap();
    assert_eq!(data.len(), 50);
    assert_eq!(data.x().cols(), 3);
    for i in 0..50 {
      let row = data.x().row(i).unwrap();
      let label = data.y().get(i, 0).unwrap();
      assert_eq!(row[2], 1.0);
      assert_eq!(label > 0.0, row[0] + 2.0 * row[1] - 1.0 >= 0.0);
    }
  }

  #[test]
  fn sine_samples() {
    let data = sine(200).unwrap();
    assert_eq!(data.len(), 200);
    assert!((data.x().get(0, 0).unwrap() + 2.0 * PI).abs() < 1e-5);
    assert!((data.x().get(199, 0).unwrap() - 2.0 * PI).abs() < 1e-5);
    for i in 0..200 {
      let x = data.x().get(i, 0).unwrap();
      assert_eq!(data.y().get(i, 0).unwrap(), x.sin());
    }
  }
}
