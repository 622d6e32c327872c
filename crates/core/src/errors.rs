use std::path::PathBuf;

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("invalid value for `{field}`: {message}")]
    InvalidField { field: &'static str, message: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FeatureError {
    #[error("feature vector has {actual} values, expected {expected}")]
    Length { expected: usize, actual: usize },
    #[error("feature `{name}` is not finite")]
    NonFinite { name: &'static str },
}

/// Why the learned estimator could not price a descriptor.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EstimationError {
    #[error("learned pricing model is not available")]
    ModelUnavailable,
    #[error("prediction failed: {0}")]
    Prediction(String),
    #[error("prediction produced an unusable price: {0}")]
    InvalidPrediction(f64),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum TrainingError {
    #[error("cannot train on an empty dataset")]
    EmptyDataset,
    #[error("training row {row} has an invalid target price {price}")]
    InvalidTarget { row: usize, price: f64 },
    #[error("training row {row} has {actual} features, expected {expected}")]
    FeatureDimension { row: usize, expected: usize, actual: usize },
    #[error("training diverged after {epochs} epochs")]
    Diverged { epochs: usize },
}

#[derive(Debug, Error)]
pub enum ModelStoreError {
    #[error("no model artifact stored under `{0}`")]
    NotFound(String),
    #[error("invalid model artifact key `{0}`")]
    InvalidKey(String),
    #[error("model artifact io failure at `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("model artifact serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("model store did not answer within {0:?}")]
    Timeout(std::time::Duration),
}

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("analyzer `{analyzer}` produced a non-object recommendation")]
    NotAnObject { analyzer: &'static str },
    #[error("analyzer serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("analyzer `{analyzer}` panicked")]
    Panicked { analyzer: &'static str },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Integration(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}
