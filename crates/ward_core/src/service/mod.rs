//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into ward use-case APIs.
//! - Map storage outcomes onto the validation / not-found / persistence
//!   taxonomy seen by callers.
//!
//! # Invariants
//! - Input is validated before any repository call that mutates state.
//! - Services never retry a failed repository call.

pub mod family_service;
pub mod request_service;
pub mod statistics_service;

use crate::model::validation::ValidationError;
use crate::repo::family_repo::{RecordRef, RepoError};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Coarse error category for boundary layers choosing a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Persistence,
}

/// Error returned by every ward service operation.
#[derive(Debug)]
pub enum ServiceError {
    /// Input was rejected before touching storage.
    Validation(ValidationError),
    /// Referenced record does not exist.
    NotFound(RecordRef),
    /// Storage failure, surfaced unchanged.
    Repo(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Repo(_) => ErrorKind::Persistence,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(record) => write!(f, "{record} not found"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(record) => Self::NotFound(record),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Logs a rejected input and wraps it as a validation error.
pub(crate) fn rejected(event: &str, err: ValidationError) -> ServiceError {
    warn!("event={event} module=service status=error error_code=validation error={err}");
    ServiceError::Validation(err)
}
