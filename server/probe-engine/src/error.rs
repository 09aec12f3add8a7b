//! Structured error types for the probe engine.
//!
//! Only hard failures live here. Records that cannot be resolved or decoded
//! are reported through [`crate::types::SkipReason`] instead.

use thiserror::Error;

/// Boxed error returned by caller-supplied collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ProbeError {
  #[error("command {command:?} failed: {source}")]
  Command {
    command: String,
    #[source]
    source: BoxError,
  },

  #[error("unmarshaling dump failed: {0}")]
  Dump(#[source] serde_json::Error),

  #[error("json output: {0}")]
  Output(#[from] serde_json::Error),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("usage: {0}")]
  Usage(String),
}

impl ProbeError {
  pub fn command(command: impl Into<String>, source: BoxError) -> Self {
    Self::Command {
      command: command.into(),
      source,
    }
  }

  pub fn usage(msg: impl Into<String>) -> Self {
    Self::Usage(msg.into())
  }
}

/// The model registry has no model for a key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no model registered for key {key:?}")]
pub struct UnknownModel {
  pub key: String,
}

impl UnknownModel {
  pub fn new(key: &str) -> Self {
    Self {
      key: key.to_string(),
    }
  }
}
