//! The module contains the errors the engine can throw.
//!
//! The distribution-specific errors are:
//!
//! - [`InvalidTotalAmount`] for a negative pool total.
//! - [`InvalidCrewCount`] for an empty roster or a zero headcount override.
//! - [`CrewCountMismatch`] when the roster size differs from the box setting.
//! - [`DebtExceedsShare`] when an ad-hoc deduction fails the netting policy.
//! - [`AlreadyCompleted`] when acting on a box whose cycle is closed.
//!
//!  [`InvalidTotalAmount`]: EngineError::InvalidTotalAmount
//!  [`InvalidCrewCount`]: EngineError::InvalidCrewCount
//!  [`CrewCountMismatch`]: EngineError::CrewCountMismatch
//!  [`DebtExceedsShare`]: EngineError::DebtExceedsShare
//!  [`AlreadyCompleted`]: EngineError::AlreadyCompleted
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid total amount: {0}")]
    InvalidTotalAmount(String),
    #[error("Invalid crew count: {0}")]
    InvalidCrewCount(String),
    #[error("Crew count mismatch: box expects {expected} members, roster has {actual}")]
    CrewCountMismatch { expected: u32, actual: u32 },
    #[error("Debt exceeds share: {0}")]
    DebtExceedsShare(String),
    #[error("Financial box already completed: {0}")]
    AlreadyCompleted(String),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidTotalAmount(a), Self::InvalidTotalAmount(b)) => a == b,
            (Self::InvalidCrewCount(a), Self::InvalidCrewCount(b)) => a == b,
            (
                Self::CrewCountMismatch {
                    expected: ea,
                    actual: aa,
                },
                Self::CrewCountMismatch {
                    expected: eb,
                    actual: ab,
                },
            ) => ea == eb && aa == ab,
            (Self::DebtExceedsShare(a), Self::DebtExceedsShare(b)) => a == b,
            (Self::AlreadyCompleted(a), Self::AlreadyCompleted(b)) => a == b,
            (Self::InvalidStatus(a), Self::InvalidStatus(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
