use std::rc::Rc;
use std::cell::Cell;
use std::collections::{ HashMap, HashSet, hash_map::Entry };
use std::fmt::Debug;

mod mops;

pub use mops::{ UnaryMops, BinaryMops };

use crate::{
  internal::*,
  error::{ Error, Result },
  shape::Shape,
  tensor::Tensor,
  scalar::Real,
};


/// Unary computational operation that can also compute its derivative.

pub trait UnaryOp<T: Real>: Debug {
  fn run(&self, input: &Tensor<T>) -> Tensor<T>;
  fn derive(&self, input: &Tensor<T>, grad: &Tensor<T>) -> Result<Tensor<T>>;
}


/// Binary computational operation that can also compute its derivative.
///
/// `derive` only produces gradients for the inputs flagged in `needs`.

pub trait BinaryOp<T: Real>: Debug {
  fn run(&self, lhs: &Tensor<T>, rhs: &Tensor<T>) -> Result<Tensor<T>>;
  fn derive(&self, lhs: &Tensor<T>, rhs: &Tensor<T>, grad: &Tensor<T>, needs: [bool; 2])
    -> Result<[Option<Tensor<T>>; 2]>;
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
  Unary(UnaryMops),
  Binary(BinaryMops),
}


/// Node in a computation graph, containing a [Variable]'s value
/// and the operation used to create it.

#[derive(Debug)]
struct Node<T: Real> {
  id: usize,
  data: Tensor<T>,
  op: Option<Op>,
  previous: Vec<Rc<Self>>,
  trainable: bool,
  differentiable: bool,
  used: Cell<bool>,
}

impl<T: Real> Node<T> {
  fn derive(&self, grad: &Tensor<T>) -> Result<Vec<Option<Tensor<T>>>> {
    let needs = |i: usize| self.previous[i].differentiable;
    match self.op {
      None => Ok(vec![]),
      Some(Op::Unary(op)) => {
        if !needs(0) { return Ok(vec![None]) }
        let input = &self.previous[0].data;
        Ok(vec![Some(op.as_unary_op().derive(input, grad)?)])
      },
      Some(Op::Binary(op)) => {
        let lhs = &self.previous[0].data;
        let rhs = &self.previous[1].data;
        Ok(op.as_binary_op().derive(lhs, rhs, grad, [needs(0), needs(1)])?.into())
      },
    }
  }
}


/// Variables record the operations used to create them and allow
/// for computing the gradient of a loss with respect to the parameters involved.
///
/// There are three kinds of variables:
/// - *Parameters*, created by [Variable::parameter] or [Tensor::trained],
///   hold a model's weights and may be [updated](Variable::update) in place.
/// - *Constants*, created by [Tensor::tracked], hold input data.
/// - *Computed* variables result from an operation on other variables.
///
/// Every operation checks the shapes of its inputs and creates a fresh node,
/// so a model's forward pass builds a new graph each time it runs.

#[derive(Debug, Clone)]
pub struct Variable<T: Real> {
  node: Rc<Node<T>>,
}

impl<T: Real> Variable<T> {
  pub(crate) fn from_tensor(tensor: Tensor<T>, trainable: bool) -> Self {
    Self {
      node: Rc::new(Node {
        id: make_id(),
        data: tensor,
        op: None,
        previous: vec![],
        trainable,
        differentiable: trainable,
        used: Cell::new(false),
      }),
    }
  }

  fn operation(op: Op, data: Tensor<T>, previous: Vec<Rc<Node<T>>>) -> Self {
    Self {
      node: Rc::new(Node {
        id: make_id(),
        data,
        op: Some(op),
        differentiable: previous.iter().any(|prev| prev.differentiable ),
        previous,
        trainable: false,
        used: Cell::new(false),
      }),
    }
  }

  /// Trainable `rows × cols` parameter, initialized uniformly
  /// in `[-l, l]` with `l = sqrt(3 / mean(rows, cols))`.

  pub fn parameter(rows: usize, cols: usize) -> Self {
    let mean = (rows + cols).max(1) as f64 / 2.0;
    let limit = T::of((3.0 / mean).sqrt());
    Tensor::uniform(rows, cols, limit).trained()
  }

  pub fn id(&self) -> usize {
    self.node.id
  }

  pub fn tensor(&self) -> &Tensor<T> {
    &self.node.data
  }

  pub fn shape(&self) -> Shape {
    self.node.data.shape()
  }

  pub fn is_parameter(&self) -> bool {
    self.node.trainable
  }

  pub fn is_loss(&self) -> bool {
    matches!(self.node.op, Some(Op::Binary(op)) if op.is_loss())
  }

  /// The single value held by a `1 × 1` variable, such as a loss.

  pub fn item(&self) -> Result<T> {
    self.node.data.item()
  }

  fn unary_op(&self, op: UnaryMops) -> Self {
    let data = op.as_unary_op().run(&self.node.data);
    Self::operation(Op::Unary(op), data, vec![self.node.clone()])
  }

  fn binary_op(&self, op: BinaryMops, rhs: &Self) -> Result<Self> {
    let data = op.as_binary_op().run(&self.node.data, &rhs.node.data)?;
    Ok(Self::operation(Op::Binary(op), data, vec![self.node.clone(), rhs.node.clone()]))
  }

  /// Score every `batch × d` row against a `1 × d` weight row, yielding `batch × 1`.

  pub fn dot(&self, weights: &Self) -> Result<Self> {
    self.binary_op(BinaryMops::DotProduct, weights)
  }

  /// `batch × in` times `in × out`, yielding `batch × out`.

  pub fn linear(&self, weights: &Self) -> Result<Self> {
    self.binary_op(BinaryMops::Linear, weights)
  }

  /// Add a `1 × out` bias row to every row.

  pub fn add_bias(&self, bias: &Self) -> Result<Self> {
    self.binary_op(BinaryMops::AddBias, bias)
  }

  pub fn add(&self, rhs: &Self) -> Result<Self> {
    self.binary_op(BinaryMops::Add, rhs)
  }

  pub fn relu(&self) -> Self {
    self.unary_op(UnaryMops::ReLU)
  }

  /// Mean of `(self - target)² / 2`.

  pub fn square_loss(&self, target: &Self) -> Result<Self> {
    self.binary_op(BinaryMops::SquareLoss, target)
  }

  /// Mean cross-entropy of the row-wise softmax of these logits against
  /// `labels`, whose rows must be probability distributions.

  pub fn softmax_loss(&self, labels: &Self) -> Result<Self> {
    self.binary_op(BinaryMops::SoftmaxLoss, labels)
  }

  /// In-place `self += multiplier * direction`. Only parameters can be updated.

  pub fn update(&self, direction: &Tensor<T>, multiplier: T) -> Result<()> {
    if !self.is_parameter() { return Err(Error::NotAParameter) }
    self.node.data.axpy(multiplier, direction)
  }

  /// Compute the gradient of this loss with respect to each of `params`.
  ///
  /// Parameters that do not contribute to the loss get a zero gradient.
  /// A parameter listed twice gets the same gradient in both places.
  /// Each loss may only be back-propagated once.

  pub fn gradients(&self, params: &[&Self]) -> Result<Vec<Tensor<T>>> {
    if !self.is_loss() { return Err(Error::NotALoss) }
    if params.iter().any(|param| !param.is_parameter() ) { return Err(Error::NotAParameter) }
    if self.node.used.replace(true) { return Err(Error::LossReused) }

    let mut grads: HashMap<usize, Tensor<T>> = HashMap::new();
    grads.insert(self.id(), Tensor::scalar(T::one()));

    for node in self.history().iter().rev() {
      if node.op.is_none() { continue }
      let Some(grad) = grads.remove(&node.id) else { continue };
      let changes = node.derive(&grad)?;
      for (change, prev) in changes.into_iter().zip(&node.previous) {
        let Some(change) = change else { continue };
        match grads.entry(prev.id) {
          Entry::Occupied(mut entry) => {
            let sum = entry.get().add(&change)?;
            entry.insert(sum);
          },
          Entry::Vacant(entry) => { entry.insert(change); },
        }
      }
    }

    Ok(params.iter()
      .map(|param| {
        grads.get(&param.id()).cloned().unwrap_or_else(|| {
          Tensor::zeros(param.shape().rows, param.shape().cols)
        })
      })
      .collect())
  }

  /// List all trainable parameters in this Variable's graph.

  pub fn parameters(&self) -> Vec<Self> {
    self.history()
      .into_iter()
      .filter(|node| node.trainable )
      .map(|node| Self { node } )
      .collect()
  }

  // Nodes in topological order, inputs first
  fn history(&self) -> Vec<Rc<Node<T>>> {
    let mut history = vec![];
    let mut visited = HashSet::new();
    let mut stack = vec![(self.node.clone(), false)];
    while let Some((node, expanded)) = stack.pop() {
      if expanded {
        history.push(node);
        continue
      }
      if !visited.insert(node.id) { continue }
      stack.push((node.clone(), true));
      for prev in node.previous.iter().rev() {
        if !visited.contains(&prev.id) {
          stack.push((prev.clone(), false));
        }
      }
    }
    history
  }
}

impl<T: Real> std::fmt::Display for Variable<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    let title = if self.node.trainable { "Parameter" } else {
      if self.node.op.is_some() { "Computed" } else { "Constant" }
    };
    write!(f, "{title} {}", self.tensor())
  }
}
