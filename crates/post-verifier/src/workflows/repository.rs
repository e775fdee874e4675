//! Storage failures shared by every repository port.

use crate::error::ErrorKind;

/// Uniqueness rules the backing store enforces on behalf of the workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    RegistrationCode,
    ActiveRegistration,
    AccountAlreadyRegistered,
    ContentStableId,
}

impl Constraint {
    pub fn describe(self) -> &'static str {
        match self {
            Constraint::RegistrationCode => "registration code already issued",
            Constraint::ActiveRegistration => "an active registration code already exists",
            Constraint::AccountAlreadyRegistered => "account already registered",
            Constraint::ContentStableId => "this post has already been submitted",
        }
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("conflict: {}", .0.describe())]
    Conflict(Constraint),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::Conflict(_) => ErrorKind::Conflict,
            RepositoryError::NotFound => ErrorKind::NotFound,
            RepositoryError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}
