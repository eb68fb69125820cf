use crate::{
  error::Result,
  scalar::Real,
  variable::Variable,
};


/// Plain gradient descent with a fixed, signed step multiplier.
///
/// Every step applies `param ← param + multiplier × gradient`, so descent
/// requires a negative multiplier.

#[derive(Debug, Clone)]
pub struct GradientDescent<R: Real> {
  pub multiplier: R,
  steps: usize,
}

impl<R: Real> GradientDescent<R> {
  pub fn new(multiplier: R) -> Self {
    Self { multiplier, steps: 0 }
  }

  /// Number of updates applied so far.

  pub fn steps(&self) -> usize {
    self.steps
  }

  pub fn minimize(&mut self, loss: &Variable<R>, params: &[&Variable<R>]) -> Result<()> {
    // Compute gradients
    let grads = loss.gradients(params)?;

    // Apply change
    for (param, grad) in params.iter().zip(&grads) {
      param.update(grad, self.multiplier)?;
    }

    self.steps += 1;
    Ok(())
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::Tensor;

  #[test]
  fn descends() {
    let w = Tensor::vec(&[3.0, -2.0]).trained();
    let target = Tensor::vec(&[0.0, 0.0]).tracked();
    let mut optimizer = GradientDescent::new(-0.5);
    let mut last = f64::INFINITY;
    for _ in 0..10 {
      let loss = w.square_loss(&target).unwrap();
      let value = loss.item().unwrap();
      assert!(value < last);
      last = value;
      optimizer.minimize(&loss, &[&w]).unwrap();
    }
    assert_eq!(optimizer.steps(), 10);
  }

  #[test]
  fn single_step() {
    // d/dw mean((w - 0)² / 2) = w / 2
    let w = Tensor::vec(&[2.0, 4.0]).trained();
    let loss = w.square_loss(&Tensor::vec(&[0.0, 0.0]).tracked()).unwrap();
    GradientDescent::new(-1.0).minimize(&loss, &[&w]).unwrap();
    assert_eq!(w.tensor(), &Tensor::vec(&[1.0, 2.0]));
  }
}
