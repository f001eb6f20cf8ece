use std::fmt::Display;

use rota_core::error::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RotaError {
    #[error("The rules cannot all be satisfied; no schedule exists for this instance.")]
    Infeasible,
    #[error("No schedule was found within the time limit.")]
    NoSolutionFound,
    #[error("IO error, more details: {0}")]
    Io(#[from] std::io::Error),
    #[error("The configuration could not be parsed, more details: {0}")]
    Config(#[from] toml::de::Error),
    #[error("A rule was rejected, more details: {0}")]
    Validation(#[from] ValidationError),
    #[error("The instance is invalid: {0}")]
    InvalidInstance(String),
}

impl RotaError {
    pub(crate) fn invalid_instance(reason: impl Display) -> Self {
        Self::InvalidInstance(reason.to_string())
    }
}
