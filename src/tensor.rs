use std::rc::Rc;
use std::cell::{Ref, RefCell};

use itertools::{ izip, Itertools };
use serde::{Serialize, Deserialize};

pub(crate) mod cops;

use crate::{
  internal::*,
  error::{ Error, Result },
  shape::Shape,
  scalar::Real,
  variable::Variable,
};


/// Row-major matrix of [Real] values.
///
/// Cloning a tensor is cheap and yields a handle onto the same storage,
/// which is what allows [Variable::update] to change a parameter in place
/// while models keep holding on to it. Use [detach](Tensor::detach)
/// for an independent copy.
///
/// Tensors can be wrapped in a [Variable] by calling
/// [tracked](Tensor::tracked) or [trained](Tensor::trained).

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Tensor<T: Real> {
  shape: Shape,
  data: Rc<RefCell<Vec<T>>>,
}

impl<T: Real> PartialEq for Tensor<T> {
  fn eq(&self, rhs: &Self) -> bool {
    self.shape == rhs.shape && *self.data.borrow() == *rhs.data.borrow()
  }
}

impl<T: Real> Tensor<T> {
  pub(crate) fn from_shape(shape: Shape, data: Vec<T>) -> Self {
    debug_assert_eq!(shape.size(), data.len());
    Self { shape, data: Rc::new(RefCell::new(data)) }
  }

  pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
    let shape = Shape::new(rows, cols);
    if shape.size() != data.len() {
      return Err(Error::DataLength { shape, len: data.len() })
    }
    Ok(Self::from_shape(shape, data))
  }

  /// Single row holding `values`.

  pub fn vec(values: &[T]) -> Self {
    Self::from_shape(Shape::new(1, values.len()), values.to_vec())
  }

  /// Single column holding `values`.

  pub fn column(values: &[T]) -> Self {
    Self::from_shape(Shape::new(values.len(), 1), values.to_vec())
  }

  pub fn scalar(item: T) -> Self {
    Self::from_shape(Shape::scalar(), vec![item])
  }

  pub fn fill(rows: usize, cols: usize, filler: T) -> Self {
    Self::from_shape(Shape::new(rows, cols), vec![filler; rows * cols])
  }

  pub fn zeros(rows: usize, cols: usize) -> Self {
    Self::fill(rows, cols, T::zero())
  }

  pub fn from_rows(rows: &[Vec<T>]) -> Result<Self> {
    let cols = rows.first().map(|row| row.len() ).unwrap_or(0);
    if let Some(row) = rows.iter().find(|row| row.len() != cols ) {
      return Err(Error::DataLength { shape: Shape::new(rows.len(), cols), len: row.len() })
    }
    Ok(Self::from_shape(Shape::new(rows.len(), cols), rows.concat()))
  }

  /// Values drawn uniformly from `[-limit, limit]`.
  /// The sign of `limit` is ignored. A zero or non-finite limit gives zeros.

  pub fn uniform(rows: usize, cols: usize, limit: T) -> Self {
    let limit = limit.abs();
    if limit == T::zero() || !limit.is_finite() { return Self::zeros(rows, cols) }
    let data = with_rng(|rng| {
      (0..rows * cols).map(|_| uniform(rng, -limit, limit) ).collect()
    });
    Self::from_shape(Shape::new(rows, cols), data)
  }

  /// Values drawn from a standard normal distribution.

  pub fn randn(rows: usize, cols: usize) -> Self {
    let len = rows * cols;
    let data = with_rng(|rng| {
      (0..(len + 1) / 2)
        .flat_map(|_| {
          let (a, b): (T, T) = randn(rng);
          [a, b]
        })
        .take(len)
        .collect()
    });
    Self::from_shape(Shape::new(rows, cols), data)
  }

  /// Column of `n` evenly spaced values from `start` to `end`, both inclusive.

  pub fn linspace(n: usize, start: T, end: T) -> Self {
    let step = if n > 1 { (end - start) / T::of((n - 1) as f64) } else { T::zero() };
    let data = (0..n).map(|i| start + step * T::of(i as f64) ).collect_vec();
    Self::from_shape(Shape::new(n, 1), data)
  }

  /// One row per label with a single one at the label's column.

  pub fn one_hot(labels: &[usize], classes: usize) -> Result<Self> {
    let mut data = vec![T::zero(); labels.len() * classes];
    for (i, &label) in labels.iter().enumerate() {
      if label >= classes {
        return Err(Error::Format {
          what: "label",
          message: format!("{label} is out of range for {classes} classes"),
        })
      }
      data[i * classes + label] = T::one();
    }
    Ok(Self::from_shape(Shape::new(labels.len(), classes), data))
  }

  pub fn shape(&self) -> Shape {
    self.shape
  }

  pub fn rows(&self) -> usize {
    self.shape.rows
  }

  pub fn cols(&self) -> usize {
    self.shape.cols
  }

  pub fn size(&self) -> usize {
    self.shape.size()
  }

  pub fn raw(&self) -> Ref<Vec<T>> {
    self.data.borrow()
  }

  pub fn to_vec(&self) -> Vec<T> {
    self.data.borrow().clone()
  }

  pub fn item(&self) -> Result<T> {
    if !self.shape.is_scalar() { return Err(Error::NotScalar(self.shape)) }
    Ok(self.data.borrow()[0])
  }

  pub fn get(&self, row: usize, col: usize) -> Option<T> {
    if row >= self.rows() || col >= self.cols() { return None }
    Some(self.data.borrow()[self.shape.index(row, col)])
  }

  pub fn row(&self, row: usize) -> Option<Vec<T>> {
    if row >= self.rows() { return None }
    let cols = self.cols();
    Some(self.data.borrow()[row * cols..(row + 1) * cols].to_vec())
  }

  /// Gather the given rows into a new tensor, in the given order.

  pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
    let cols = self.cols();
    let data = self.data.borrow();
    let mut out = Vec::with_capacity(indices.len() * cols);
    for &i in indices {
      if i >= self.rows() {
        return Err(Error::Format {
          what: "row index",
          message: format!("{i} is out of range for {} tensor", self.shape),
        })
      }
      out.extend_from_slice(&data[i * cols..(i + 1) * cols]);
    }
    Ok(Self::from_shape(Shape::new(indices.len(), cols), out))
  }

  /// Independent copy that no longer shares storage.

  pub fn detach(&self) -> Self {
    Self::from_shape(self.shape, self.to_vec())
  }

  pub fn shared_with(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.data, &other.data)
  }

  pub fn map(&self, cb: impl Fn(T) -> T) -> Self {
    let data = self.data.borrow().iter().map(|&a| cb(a) ).collect();
    Self::from_shape(self.shape, data)
  }

  pub fn zip(&self, rhs: &Self, op: &'static str, cb: impl Fn(T, T) -> T) -> Result<Self> {
    self.expect_shape(op, rhs.shape)?;
    let data = izip!(self.data.borrow().iter(), rhs.data.borrow().iter())
      .map(|(&a, &b)| cb(a, b) )
      .collect();
    Ok(Self::from_shape(self.shape, data))
  }

  pub fn add(&self, rhs: &Self) -> Result<Self> {
    self.zip(rhs, "add", |a, b| a + b )
  }

  pub fn sub(&self, rhs: &Self) -> Result<Self> {
    self.zip(rhs, "sub", |a, b| a - b )
  }

  pub fn mul(&self, rhs: &Self) -> Result<Self> {
    self.zip(rhs, "mul", |a, b| a * b )
  }

  pub fn scale(&self, factor: T) -> Self {
    self.map(|a| a * factor )
  }

  /// Add a `1 × cols` row to every row.

  pub fn add_row(&self, row: &Self) -> Result<Self> {
    if row.rows() != 1 || row.cols() != self.cols() {
      return Err(Error::ShapeMismatch { op: "add_row", lhs: self.shape, rhs: row.shape })
    }
    let bias = row.data.borrow();
    let cols = self.cols();
    let data = self.data.borrow()
      .iter()
      .enumerate()
      .map(|(i, &a)| a + bias[i % cols] )
      .collect();
    Ok(Self::from_shape(self.shape, data))
  }

  /// Matrix product.

  pub fn mm(&self, rhs: &Self) -> Result<Self> {
    if self.cols() != rhs.rows() {
      return Err(Error::ShapeMismatch { op: "matmul", lhs: self.shape, rhs: rhs.shape })
    }
    let (m, k, n) = (self.rows(), self.cols(), rhs.cols());
    let mut data = vec![T::zero(); m * n];
    T::matmul(m, k, n, &self.raw(), &rhs.raw(), &mut data);
    Ok(Self::from_shape(Shape::new(m, n), data))
  }

  pub fn transpose(&self) -> Self {
    let (rows, cols) = (self.rows(), self.cols());
    let data = self.data.borrow();
    let transposed = (0..cols)
      .flat_map(|j| (0..rows).map(move |i| (i, j)) )
      .map(|(i, j)| data[i * cols + j] )
      .collect();
    Self::from_shape(self.shape.transposed(), transposed)
  }

  /// Collapse all rows into a single `1 × cols` row of column sums.

  pub fn sum_rows(&self) -> Self {
    let cols = self.cols();
    let mut sums = vec![T::zero(); cols];
    if cols > 0 {
      for row in self.data.borrow().chunks(cols) {
        for (sum, &a) in sums.iter_mut().zip(row) {
          *sum += a;
        }
      }
    }
    Self::from_shape(Shape::new(1, cols), sums)
  }

  pub fn sum(&self) -> T {
    self.data.borrow().iter().copied().sum()
  }

  pub fn mean(&self) -> T {
    if self.size() == 0 { return T::zero() }
    self.sum() / T::of(self.size() as f64)
  }

  pub fn relu(&self) -> Self {
    self.map(|a| a.max(T::zero()) )
  }

  /// Row-wise log-softmax, shifted by each row's maximum for stability.

  pub fn log_softmax_rows(&self) -> Self {
    let cols = self.cols();
    if cols == 0 { return self.detach() }
    let data = self.data.borrow()
      .chunks(cols)
      .flat_map(|row| {
        let max = row.iter().copied().fold(T::neg_infinity(), T::max);
        let log_sum = row.iter().map(|&a| (a - max).exp() ).sum::<T>().ln() + max;
        row.iter().map(move |&a| a - log_sum )
      })
      .collect();
    Self::from_shape(self.shape, data)
  }

  pub fn softmax_rows(&self) -> Self {
    self.log_softmax_rows().map(|a| a.exp() )
  }

  /// Column index of the greatest value in every row. Ties resolve to the first column.

  pub fn argmax_rows(&self) -> Vec<usize> {
    let cols = self.cols();
    if cols == 0 { return vec![0; self.rows()] }
    self.data.borrow()
      .chunks(cols)
      .map(|row| {
        row.iter()
          .enumerate()
          .fold((0, T::neg_infinity()), |(best, max), (i, &a)| {
            if a > max { (i, a) } else { (best, max) }
          })
          .0
      })
      .collect()
  }

  /// Overwrite this tensor's values in place.

  pub fn assign(&self, other: &Self) -> Result<()> {
    self.expect_shape("assign", other.shape)?;
    // Avoid clashing borrow when tensors share storage
    if self.shared_with(other) { return Ok(()) }
    self.data.borrow_mut().copy_from_slice(&other.data.borrow());
    Ok(())
  }

  /// In-place `self += multiplier * direction`.

  pub fn axpy(&self, multiplier: T, direction: &Self) -> Result<()> {
    self.expect_shape("update", direction.shape)?;
    let direction = if self.shared_with(direction) { direction.detach() } else { direction.clone() };
    let mut data = self.data.borrow_mut();
    for (a, &d) in data.iter_mut().zip(direction.data.borrow().iter()) {
      *a += multiplier * d;
    }
    Ok(())
  }

  pub(crate) fn is_consistent(&self) -> bool {
    self.data.borrow().len() == self.shape.size()
  }

  fn expect_shape(&self, op: &'static str, shape: Shape) -> Result<()> {
    if self.shape != shape {
      return Err(Error::ShapeMismatch { op, lhs: self.shape, rhs: shape })
    }
    Ok(())
  }

  pub fn trained(&self) -> Variable<T> {
    Variable::from_tensor(self.clone(), true)
  }

  pub fn tracked(&self) -> Variable<T> {
    Variable::from_tensor(self.clone(), false)
  }
}

impl<T: Real> std::fmt::Display for Tensor<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "Tensor{} ", self.shape)?;
    let cols = self.cols().max(1);
    if self.rows() == 1 {
      return write!(f, "{:?}", &self.raw()[..])
    }
    write!(f, "[\n")?;
    for row in self.raw().chunks(cols) {
      write!(f, "  {:?}\n", row)?;
    }
    write!(f, "]")
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn tensor(rows: usize, cols: usize, data: &[f32]) -> Tensor<f32> {
    Tensor::new(rows, cols, data.to_vec()).unwrap()
  }

  #[test]
  fn data_length() {
    assert!(matches!(Tensor::new(2, 2, vec![1.0f32, 2.0, 3.0]), Err(Error::DataLength { .. })));
    assert!(Tensor::from_rows(&[vec![1.0f32], vec![2.0, 3.0]]).is_err());
    assert_eq!(Tensor::from_rows(&[vec![1.0f32, 2.0], vec![3.0, 4.0]]).unwrap(), tensor(2, 2, &[1.0, 2.0, 3.0, 4.0]));
  }

  #[test]
  fn matmul() {
    let x = tensor(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let y = tensor(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(x.mm(&y).unwrap(), tensor(2, 2, &[22.0, 28.0, 49.0, 64.0]));
    assert!(matches!(x.mm(&x), Err(Error::ShapeMismatch { op: "matmul", .. })));
  }

  #[test]
  fn transpose() {
    let x = tensor(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(x.transpose(), tensor(3, 2, &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]));
  }

  #[test]
  fn add_row() {
    let x = tensor(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    let b = Tensor::vec(&[10.0, 20.0]);
    assert_eq!(x.add_row(&b).unwrap(), tensor(2, 2, &[11.0, 22.0, 13.0, 24.0]));
    assert!(x.add_row(&Tensor::vec(&[1.0])).is_err());
  }

  #[test]
  fn sum_rows() {
    let x = tensor(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(x.sum_rows(), Tensor::vec(&[9.0, 12.0]));
    assert_eq!(x.sum(), 21.0);
    assert_eq!(x.mean(), 3.5);
  }

  #[test]
  fn softmax() {
    let x = tensor(2, 3, &[1.0, 2.0, 3.0, 1000.0, 1000.0, 1000.0]);
    let s = x.softmax_rows();
    for row in 0..2 {
      let total: f32 = s.row(row).unwrap().iter().sum();
      assert!((total - 1.0).abs() < 1e-5);
    }
    assert!((s.get(1, 0).unwrap() - 1.0 / 3.0).abs() < 1e-5);
  }

  #[test]
  fn argmax() {
    let x = tensor(3, 3, &[0.1, 0.7, 0.2, 5.0, -1.0, 5.0, -3.0, -2.0, -1.0]);
    assert_eq!(x.argmax_rows(), vec![1, 0, 2]);
  }

  #[test]
  fn one_hot() {
    let y = Tensor::<f32>::one_hot(&[2, 0], 3).unwrap();
    assert_eq!(y, tensor(2, 3, &[0.0, 0.0, 1.0, 1.0, 0.0, 0.0]));
    assert!(Tensor::<f32>::one_hot(&[3], 3).is_err());
  }

  #[test]
  fn linspace() {
    let x = Tensor::linspace(5, -1.0f32, 1.0);
    assert_eq!(x, Tensor::column(&[-1.0, -0.5, 0.0, 0.5, 1.0]));
  }

  #[test]
  fn shared_storage() {
    let x = tensor(1, 2, &[1.0, 2.0]);
    let handle = x.clone();
    x.axpy(2.0, &Tensor::vec(&[1.0, 1.0])).unwrap();
    assert_eq!(handle, Tensor::vec(&[3.0, 4.0]));
    let copy = x.detach();
    x.assign(&Tensor::vec(&[0.0, 0.0])).unwrap();
    assert_eq!(copy, Tensor::vec(&[3.0, 4.0]));
    x.axpy(1.0, &handle).unwrap();
    assert_eq!(x, Tensor::vec(&[0.0, 0.0]));
  }

  #[test]
  fn select_rows() {
    let x = tensor(3, 1, &[1.0, 2.0, 3.0]);
    assert_eq!(x.select_rows(&[2, 0]).unwrap(), Tensor::column(&[3.0, 1.0]));
    assert!(x.select_rows(&[3]).is_err());
  }

  #[test]
  fn uniform() {
    crate::seed(4);
    let x = Tensor::<f32>::uniform(3, 4, 0.5);
    assert!(x.to_vec().iter().all(|a| a.abs() <= 0.5 ));
    let flipped = Tensor::<f32>::uniform(3, 4, -0.5);
    assert!(flipped.to_vec().iter().all(|a| a.abs() <= 0.5 ));
    assert!(flipped.to_vec().iter().any(|a| *a != 0.0 ));
    assert_eq!(Tensor::<f32>::uniform(2, 2, 0.0), Tensor::zeros(2, 2));
    assert_eq!(Tensor::<f32>::uniform(2, 2, f32::NAN), Tensor::zeros(2, 2));
  }

  #[test]
  fn randn() {
    crate::seed(3);
    let x = Tensor::<f64>::randn(101, 1);
    assert_eq!(x.size(), 101);
    assert!(x.mean().abs() < 0.5);
  }
}
