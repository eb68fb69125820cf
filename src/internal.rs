use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::scalar::Real;


thread_local! {
  static RNG: RefCell<StdRng> = RefCell::new(StdRng::from_entropy());
}


pub fn make_id() -> usize {
  static LAST_ID: AtomicUsize = AtomicUsize::new(0);
  LAST_ID.fetch_add(1, Ordering::Relaxed)
}


/// Make parameter initialization on the current thread reproducible.

pub fn seed(seed: u64) {
  RNG.with(|rng| *rng.borrow_mut() = StdRng::seed_from_u64(seed) );
}


pub fn with_rng<R>(cb: impl FnOnce(&mut StdRng) -> R) -> R {
  RNG.with(|rng| cb(&mut rng.borrow_mut()) )
}


pub fn uniform<T: Real>(rng: &mut impl Rng, low: T, high: T) -> T {
  rng.gen_range(low, high)
}


// Polar Box-Muller transformation

pub fn randn<T: Real>(rng: &mut impl Rng) -> (T, T) {
  loop {
    let u: T = uniform(rng, -T::one(), T::one());
    let v: T = uniform(rng, -T::one(), T::one());
    let r = u * u + v * v;
    // Try again if outside interval
    if r == T::zero() || r >= T::one() { continue }
    let c = (T::of(-2.0) * r.ln() / r).sqrt();
    return (u * c, v * c)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn seeded() {
    seed(7);
    let a: f32 = with_rng(|rng| uniform(rng, 0.0, 1.0) );
    seed(7);
    let b: f32 = with_rng(|rng| uniform(rng, 0.0, 1.0) );
    assert_eq!(a, b);
  }

  #[test]
  fn ids_increase() {
    let a = make_id();
    let b = make_id();
    assert!(b > a);
  }
}
