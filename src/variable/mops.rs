use crate::{
  error::{ Error, Result },
  tensor::Tensor,
  scalar::Real,
  variable::{ BinaryOp, UnaryOp },
};


/// Identifies a single-input operation stored in a graph node.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryMops {
  ReLU,
}

impl UnaryMops {
  pub(super) fn as_unary_op<T: Real>(&self) -> &'static dyn UnaryOp<T> {
    match self {
      Self::ReLU => &ReLU,
    }
  }
}


/// Identifies a two-input operation stored in a graph node.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryMops {
  DotProduct,
  Linear,
  AddBias,
  Add,
  SquareLoss,
  SoftmaxLoss,
}

impl BinaryMops {
  pub(super) fn as_binary_op<T: Real>(&self) -> &'static dyn BinaryOp<T> {
    match self {
      Self::DotProduct => &DotProduct,
      Self::Linear => &Linear,
      Self::AddBias => &AddBias,
      Self::Add => &Add,
      Self::SquareLoss => &SquareLoss,
      Self::SoftmaxLoss => &SoftmaxLoss,
    }
  }

  pub fn is_loss(&self) -> bool {
    matches!(self, Self::SquareLoss | Self::SoftmaxLoss)
  }
}


fn mismatch<T: Real>(op: &'static str, lhs: &Tensor<T>, rhs: &Tensor<T>) -> Error {
  Error::ShapeMismatch { op, lhs: lhs.shape(), rhs: rhs.shape() }
}


#[derive(Debug, Clone, Copy)]
pub struct ReLU;

impl<T: Real> UnaryOp<T> for ReLU {
  fn run(&self, input: &Tensor<T>) -> Tensor<T> {
    input.relu()
  }

  fn derive(&self, input: &Tensor<T>, grad: &Tensor<T>) -> Result<Tensor<T>> {
    grad.zip(input, "relu", |g, a| if a > T::zero() { g } else { T::zero() })
  }
}


/// Row-wise dot product of `batch × d` features with a `1 × d` weight row.

#[derive(Debug, Clone, Copy)]
pub struct DotProduct;

impl<T: Real> BinaryOp<T> for DotProduct {
  fn run(&self, features: &Tensor<T>, weights: &Tensor<T>) -> Result<Tensor<T>> {
    if weights.rows() != 1 || features.cols() != weights.cols() {
      return Err(mismatch("dot", features, weights))
    }
    features.mm(&weights.transpose())
  }

  fn derive(&self, features: &Tensor<T>, weights: &Tensor<T>, grad: &Tensor<T>, needs: [bool; 2])
    -> Result<[Option<Tensor<T>>; 2]>
  {
    Ok([
      if needs[0] { Some(grad.mm(weights)?) } else { None },
      if needs[1] { Some(grad.transpose().mm(features)?) } else { None },
    ])
  }
}


/// Matrix product of `batch × in` features with `in × out` weights.

#[derive(Debug, Clone, Copy)]
pub struct Linear;

impl<T: Real> BinaryOp<T> for Linear {
  fn run(&self, features: &Tensor<T>, weights: &Tensor<T>) -> Result<Tensor<T>> {
    if features.cols() != weights.rows() {
      return Err(mismatch("linear", features, weights))
    }
    features.mm(weights)
  }

  fn derive(&self, features: &Tensor<T>, weights: &Tensor<T>, grad: &Tensor<T>, needs: [bool; 2])
    -> Result<[Option<Tensor<T>>; 2]>
  {
    Ok([
      if needs[0] { Some(grad.mm(&weights.transpose())?) } else { None },
      if needs[1] { Some(features.transpose().mm(grad)?) } else { None },
    ])
  }
}


#[derive(Debug, Clone, Copy)]
pub struct AddBias;

impl<T: Real> BinaryOp<T> for AddBias {
  fn run(&self, features: &Tensor<T>, bias: &Tensor<T>) -> Result<Tensor<T>> {
    features.add_row(bias).map_err(|_| mismatch("add_bias", features, bias) )
  }

  fn derive(&self, _features: &Tensor<T>, _bias: &Tensor<T>, grad: &Tensor<T>, needs: [bool; 2])
    -> Result<[Option<Tensor<T>>; 2]>
  {
    Ok([
      needs[0].then(|| grad.clone() ),
      needs[1].then(|| grad.sum_rows() ),
    ])
  }
}


#[derive(Debug, Clone, Copy)]
pub struct Add;

impl<T: Real> BinaryOp<T> for Add {
  fn run(&self, lhs: &Tensor<T>, rhs: &Tensor<T>) -> Result<Tensor<T>> {
    lhs.add(rhs)
  }

  fn derive(&self, _lhs: &Tensor<T>, _rhs: &Tensor<T>, grad: &Tensor<T>, needs: [bool; 2])
    -> Result<[Option<Tensor<T>>; 2]>
  {
    Ok([
      needs[0].then(|| grad.clone() ),
      needs[1].then(|| grad.clone() ),
    ])
  }
}


/// Mean of halved squared differences.

#[derive(Debug, Clone, Copy)]
pub struct SquareLoss;

impl<T: Real> BinaryOp<T> for SquareLoss {
  fn run(&self, predicted: &Tensor<T>, target: &Tensor<T>) -> Result<Tensor<T>> {
    let half = T::of(0.5);
    let loss = predicted.zip(target, "square_loss", |a, b| (a - b) * (a - b) * half )?.mean();
    Ok(Tensor::scalar(loss))
  }

  fn derive(&self, predicted: &Tensor<T>, target: &Tensor<T>, grad: &Tensor<T>, needs: [bool; 2])
    -> Result<[Option<Tensor<T>>; 2]>
  {
    let factor = grad.item()? / T::of(predicted.size().max(1) as f64);
    let diff = predicted.sub(target)?.scale(factor);
    Ok([
      needs[0].then(|| diff.clone() ),
      needs[1].then(|| diff.scale(-T::one()) ),
    ])
  }
}


/// Mean cross-entropy between `softmax(logits)` and label distributions.

#[derive(Debug, Clone, Copy)]
pub struct SoftmaxLoss;

impl SoftmaxLoss {
  fn check_labels<T: Real>(labels: &Tensor<T>) -> Result<()> {
    let cols = labels.cols().max(1);
    let tolerance = T::of(1e-4);
    let valid = labels.raw()
      .chunks(cols)
      .all(|row| {
        row.iter().all(|&p| p >= T::zero() ) &&
        (row.iter().copied().sum::<T>() - T::one()).abs() <= tolerance
      });
    if valid { Ok(()) } else { Err(Error::InvalidLabels) }
  }
}

impl<T: Real> BinaryOp<T> for SoftmaxLoss {
  fn run(&self, logits: &Tensor<T>, labels: &Tensor<T>) -> Result<Tensor<T>> {
    if logits.shape() != labels.shape() {
      return Err(mismatch("softmax_loss", logits, labels))
    }
    Self::check_labels(labels)?;
    let rows = T::of(logits.rows().max(1) as f64);
    let total = logits.log_softmax_rows().mul(labels)?.sum();
    Ok(Tensor::scalar(-total / rows))
  }

  fn derive(&self, logits: &Tensor<T>, labels: &Tensor<T>, grad: &Tensor<T>, needs: [bool; 2])
    -> Result<[Option<Tensor<T>>; 2]>
  {
    let factor = grad.item()? / T::of(logits.rows().max(1) as f64);
    let log_probs = logits.log_softmax_rows();
    Ok([
      if needs[0] {
        Some(log_probs.map(|a| a.exp() ).sub(labels)?.scale(factor))
      } else { None },
      needs[1].then(|| log_probs.scale(-factor) ),
    ])
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn tensor(rows: usize, cols: usize, data: &[f64]) -> Tensor<f64> {
    Tensor::new(rows, cols, data.to_vec()).unwrap()
  }

  #[test]
  fn dot_product() {
    let x = tensor(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let w = Tensor::vec(&[1.0, 0.0, -1.0]);
    assert_eq!(DotProduct.run(&x, &w).unwrap(), Tensor::column(&[-2.0, -2.0]));
    assert!(DotProduct.run(&x, &x).is_err());
  }

  #[test]
  fn square_loss() {
    let a = Tensor::column(&[1.0, 3.0]);
    let b = Tensor::column(&[0.0, 1.0]);
    // ((1)² / 2 + (2)² / 2) / 2
    assert_eq!(SquareLoss.run(&a, &b).unwrap().item().unwrap(), 1.25);
  }

  #[test]
  fn softmax_loss_uniform() {
    let logits = Tensor::<f64>::zeros(2, 4);
    let labels = Tensor::one_hot(&[1, 3], 4).unwrap();
    let loss = SoftmaxLoss.run(&logits, &labels).unwrap().item().unwrap();
    assert!((loss - 4.0f64.ln()).abs() < 1e-9);
  }

  #[test]
  fn softmax_loss_rejects_bad_labels() {
    let logits = Tensor::zeros(1, 2);
    assert!(matches!(SoftmaxLoss.run(&logits, &Tensor::vec(&[1.0, 1.0])), Err(Error::InvalidLabels)));
    assert!(matches!(SoftmaxLoss.run(&logits, &Tensor::vec(&[1.5, -0.5])), Err(Error::InvalidLabels)));
  }

  #[test]
  fn relu_gradient() {
    let x = Tensor::vec(&[-1.0, 0.0, 2.0]);
    let grad = Tensor::vec(&[5.0, 5.0, 5.0]);
    assert_eq!(ReLU.derive(&x, &grad).unwrap(), Tensor::vec(&[0.0, 0.0, 5.0]));
  }

  #[test]
  fn add_bias_gradient() {
    let x = Tensor::zeros(3, 2);
    let b = Tensor::vec(&[1.0, 2.0]);
    let grad = tensor(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let [_, db] = AddBias.derive(&x, &b, &grad, [false, true]).unwrap();
    assert_eq!(db, Some(Tensor::vec(&[9.0, 12.0])));
  }
}
