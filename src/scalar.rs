use std::fmt::{ Debug, Display };

use rand::distributions::uniform::SampleUniform;
use num_traits::{ Float, NumAssignOps };
use serde::{ Serialize, de::DeserializeOwned };


/// Element types that may be stored in a [Tensor](crate::Tensor) and differentiated.
///
/// Implemented for `f32` and `f64`, each of which brings its own
/// matrix product kernel.

pub trait Real:
  Float + NumAssignOps + SampleUniform + std::iter::Sum
  + Debug + Display + Default + Send + Sync
  + Serialize + DeserializeOwned + 'static
{
  /// Lossy conversion from a literal.
  fn of(value: f64) -> Self;

  /// `out = lhs · rhs` for row-major `lhs` (m×k) and `rhs` (k×n).
  fn matmul(m: usize, k: usize, n: usize, lhs: &[Self], rhs: &[Self], out: &mut [Self]);
}

impl Real for f32 {
  fn of(value: f64) -> Self {
    value as f32
  }

  fn matmul(m: usize, k: usize, n: usize, lhs: &[Self], rhs: &[Self], out: &mut [Self]) {
    crate::tensor::cops::sgemm(m, k, n, lhs, rhs, out)
  }
}

impl Real for f64 {
  fn of(value: f64) -> Self {
    value
  }

  fn matmul(m: usize, k: usize, n: usize, lhs: &[Self], rhs: &[Self], out: &mut [Self]) {
    crate::tensor::cops::dgemm(m, k, n, lhs, rhs, out)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn literals() {
    assert_eq!(f32::of(0.5), 0.5);
    assert_eq!(f64::of(-2.0), -2.0);
  }
}
