//! Saving and restoring trained parameters.
//!
//! A checkpoint records a model's name together with the values of its
//! [parameters](Parameterized::parameters) in order. Restoring writes those
//! values back into an existing model of the same architecture.

use std::fs;
use std::path::Path;

use serde::{ Serialize, Deserialize };

use crate::{
  error::{ Error, Result },
  tensor::Tensor,
  models::Parameterized,
};


#[derive(Serialize, Deserialize)]
struct CheckpointDump {
  model: String,
  parameters: Vec<Tensor<f32>>,
}


pub fn to_bytes(model: &impl Parameterized) -> Result<Vec<u8>> {
  let dump = CheckpointDump {
    model: model.name().to_string(),
    parameters: model.parameters().iter().map(|param| param.tensor().detach() ).collect(),
  };
  Ok(postcard::to_allocvec(&dump)?)
}

/// Overwrite `model`'s parameters with those stored in `bytes`.
///
/// Nothing is written unless the checkpoint matches the model's name
/// and every parameter's shape.

pub fn from_bytes(model: &impl Parameterized, bytes: &[u8]) -> Result<()> {
  let dump: CheckpointDump = postcard::from_bytes(bytes)?;
  if dump.model != model.name() {
    return Err(Error::Checkpoint {
      message: format!("saved from {}, loading into {}", dump.model, model.name()),
    })
  }
  let params = model.parameters();
  if dump.parameters.len() != params.len() {
    return Err(Error::Checkpoint {
      message: format!("{} parameters saved, model has {}", dump.parameters.len(), params.len()),
    })
  }
  for (i, (param, saved)) in params.iter().zip(&dump.parameters).enumerate() {
    if !saved.is_consistent() || saved.shape() != param.shape() {
      return Err(Error::Checkpoint {
        message: format!("parameter {i} should be {}, found {}", param.shape(), saved.shape()),
      })
    }
  }
  for (param, saved) in params.iter().zip(&dump.parameters) {
    param.tensor().assign(saved)?;
  }
  Ok(())
}

pub fn save(model: &impl Parameterized, path: impl AsRef<Path>) -> Result<()> {
  let path = path.as_ref();
  fs::write(path, to_bytes(model)?)?;
  log::info!("Saved {} checkpoint to {}", model.name(), path.display());
  Ok(())
}

pub fn load(model: &impl Parameterized, path: impl AsRef<Path>) -> Result<()> {
  let path = path.as_ref();
  from_bytes(model, &fs::read(path)?)?;
  log::info!("Restored {} from {}", model.name(), path.display());
  Ok(())
}
