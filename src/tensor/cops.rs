#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::scalar::Real;


#[cfg(feature = "unsafe")]
pub(crate) fn sgemm(m: usize, k: usize, n: usize, lhs: &[f32], rhs: &[f32], out: &mut [f32]) {
  assert!(lhs.len() >= m * k && rhs.len() >= k * n && out.len() >= m * n);
  if m == 0 || n == 0 || k == 0 { return }
  unsafe {
    matrixmultiply::sgemm(
      m,
      k,
      n,
      1.0,
      lhs.as_ptr(),
      k as isize,
      1,
      rhs.as_ptr(),
      n as isize,
      1,
      0.0,
      out.as_mut_ptr(),
      n as isize,
      1,
    );
  }
}

#[cfg(feature = "unsafe")]
pub(crate) fn dgemm(m: usize, k: usize, n: usize, lhs: &[f64], rhs: &[f64], out: &mut [f64]) {
  assert!(lhs.len() >= m * k && rhs.len() >= k * n && out.len() >= m * n);
  if m == 0 || n == 0 || k == 0 { return }
  unsafe {
    matrixmultiply::dgemm(
      m,
      k,
      n,
      1.0,
      lhs.as_ptr(),
      k as isize,
      1,
      rhs.as_ptr(),
      n as isize,
      1,
      0.0,
      out.as_mut_ptr(),
      n as isize,
      1,
    );
  }
}

#[cfg(not(feature = "unsafe"))]
pub(crate) fn sgemm(m: usize, k: usize, n: usize, lhs: &[f32], rhs: &[f32], out: &mut [f32]) {
  generic(m, k, n, lhs, rhs, out)
}

#[cfg(not(feature = "unsafe"))]
pub(crate) fn dgemm(m: usize, k: usize, n: usize, lhs: &[f64], rhs: &[f64], out: &mut [f64]) {
  generic(m, k, n, lhs, rhs, out)
}


/// Portable matrix product. `out` must be zeroed.

#[cfg_attr(all(feature = "unsafe", not(test)), allow(dead_code))]
pub(crate) fn generic<T: Real>(m: usize, k: usize, n: usize, lhs: &[T], rhs: &[T], out: &mut [T]) {
  if m == 0 || n == 0 { return }
  let row = |(i, out_row): (usize, &mut [T])| {
    for p in 0..k {
      let a = lhs[i * k + p];
      if a == T::zero() { continue }
      for (o, &b) in out_row.iter_mut().zip(&rhs[p * n..(p + 1) * n]) {
        *o += a * b;
      }
    }
  };

  #[cfg(feature = "rayon")]
  out[..m * n].par_chunks_mut(n).enumerate().for_each(row);

  #[cfg(not(feature = "rayon"))]
  out[..m * n].chunks_mut(n).enumerate().for_each(row);
}
