use serde::{Serialize, Deserialize};


/// The shape of a [Tensor](crate::Tensor): every tensor is a row-major matrix.
///
/// Single values are represented as `1 × 1` matrices.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
  pub rows: usize,
  pub cols: usize,
}

impl Shape {
  pub fn new(rows: usize, cols: usize) -> Self {
    Self { rows, cols }
  }

  pub fn scalar() -> Self {
    Self::new(1, 1)
  }

  pub fn size(&self) -> usize {
    self.rows * self.cols
  }

  pub fn is_scalar(&self) -> bool {
    self.size() == 1
  }

  pub fn transposed(&self) -> Self {
    Self::new(self.cols, self.rows)
  }

  /// Flat index of element `(row, col)`.

  pub(crate) fn index(&self, row: usize, col: usize) -> usize {
    row * self.cols + col
  }
}

impl std::fmt::Display for Shape {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "[{} x {}]", self.rows, self.cols)
  }
}
