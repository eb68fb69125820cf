//! Reader and writer for the IDX format used by the MNIST distribution.
//!
//! An IDX file starts with two zero bytes, a type code and the number of
//! dimensions, followed by one big-endian `u32` per dimension and the
//! row-major payload. Only unsigned byte payloads (type `0x08`) are
//! supported, which covers both MNIST images and labels. Files must be
//! decompressed beforehand.

use std::fs;
use std::path::Path;

use crate::{
  error::{ Error, Result },
  tensor::Tensor,
};

const UNSIGNED_BYTE: u8 = 0x08;


/// Decoded IDX array of unsigned bytes.

#[derive(Debug, Clone, PartialEq)]
pub struct Idx {
  pub dims: Vec<usize>,
  pub data: Vec<u8>,
}

fn invalid(message: impl Into<String>) -> Error {
  Error::Format { what: "IDX file", message: message.into() }
}

impl Idx {
  pub fn parse(bytes: &[u8]) -> Result<Self> {
    if bytes.len() < 4 { return Err(invalid("truncated header")) }
    if bytes[0] != 0 || bytes[1] != 0 { return Err(invalid("bad magic number")) }
    if bytes[2] != UNSIGNED_BYTE {
      return Err(invalid(format!("unsupported element type 0x{:02x}", bytes[2])))
    }
    let rank = bytes[3] as usize;
    let header = 4 + rank * 4;
    if bytes.len() < header { return Err(invalid("truncated dimensions")) }
    let dims: Vec<usize> = bytes[4..header]
      .chunks(4)
      .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as usize )
      .collect();
    let size = dims.iter()
      .try_fold(1usize, |size, &dim| size.checked_mul(dim) )
      .ok_or_else(|| invalid("dimensions overflow") )?;
    let data = &bytes[header..];
    if data.len() != size {
      return Err(invalid(format!("expected {size} elements, found {}", data.len())))
    }
    Ok(Self { dims, data: data.to_vec() })
  }

  pub fn read(path: impl AsRef<Path>) -> Result<Self> {
    Self::parse(&fs::read(path)?)
  }

  /// Fails when there are more than 255 dimensions
  /// or a dimension doesn't fit in a `u32`.

  pub fn encode(&self) -> Result<Vec<u8>> {
    let rank = u8::try_from(self.dims.len())
      .map_err(|_| invalid(format!("{} dimensions don't fit the header", self.dims.len())) )?;
    let mut bytes = vec![0, 0, UNSIGNED_BYTE, rank];
    for &dim in &self.dims {
      let dim = u32::try_from(dim).map_err(|_| invalid(format!("dimension {dim} is too large")) )?;
      bytes.extend_from_slice(&dim.to_be_bytes());
    }
    bytes.extend_from_slice(&self.data);
    Ok(bytes)
  }

  /// Images as one row per image, with pixel values scaled to `[0, 1]`.

  pub fn images(&self) -> Result<Tensor<f32>> {
    let Some((&count, pixels)) = self.dims.split_first() else {
      return Err(invalid("images need at least one dimension"))
    };
    let width = pixels.iter().product();
    let data = self.data.iter().map(|&p| p as f32 / 255.0 ).collect();
    Tensor::new(count, width, data)
  }

  pub fn labels(&self) -> Result<Vec<usize>> {
    if self.dims.len() != 1 {
      return Err(invalid(format!("labels must be one-dimensional, got {} dimensions", self.dims.len())))
    }
    Ok(self.data.iter().map(|&l| l as usize ).collect())
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn images() {
    let idx = Idx { dims: vec![2, 2, 2], data: vec![0, 255, 51, 102, 255, 255, 0, 0] };
    let bytes = idx.encode().unwrap();
    assert_eq!(&bytes[..4], &[0, 0, 8, 3]);
    let parsed = Idx::parse(&bytes).unwrap();
    let images = parsed.images().unwrap();
    assert_eq!(images.shape(), crate::Shape::new(2, 4));
    assert_eq!(images.row(0).unwrap(), vec![0.0, 1.0, 0.2, 0.4]);
  }

  #[test]
  fn labels() {
    let bytes = [0, 0, 8, 1, 0, 0, 0, 3, 7, 2, 9];
    assert_eq!(Idx::parse(&bytes).unwrap().labels().unwrap(), vec![7, 2, 9]);
  }

  #[test]
  fn malformed() {
    assert!(Idx::parse(&[0, 0, 8]).is_err());
    assert!(Idx::parse(&[1, 0, 8, 1, 0, 0, 0, 1, 5]).is_err());
    assert!(Idx::parse(&[0, 0, 0x0d, 1, 0, 0, 0, 1, 5]).is_err());
    assert!(Idx::parse(&[0, 0, 8, 1, 0, 0, 0, 2, 5]).is_err());
    assert!(Idx::parse(&[0, 0, 8, 2, 0, 0]).is_err());
    let mut huge = vec![0, 0, 8, 4];
    for _ in 0..4 { huge.extend_from_slice(&u32::MAX.to_be_bytes()) }
    assert!(matches!(Idx::parse(&huge), Err(Error::Format { .. })));
    let images = Idx { dims: vec![2, 2], data: vec![1, 2, 3, 4] };
    assert!(images.labels().is_err());
  }

  #[test]
  fn encode_limits() {
    let deep = Idx { dims: vec![1; 256], data: vec![7] };
    assert!(matches!(deep.encode(), Err(Error::Format { .. })));
    let wide = Idx { dims: vec![u32::MAX as usize + 1], data: vec![] };
    assert!(wide.encode().is_err());
  }
}
