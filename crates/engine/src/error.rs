//! The module contains the error the engine can throw.
//!
//! Every error is recoverable at the request boundary. Use
//! [`EngineError::kind`] to classify an error into an [`ErrorKind`] when a
//! caller (e.g. the HTTP layer) needs to pick a status code.
//!
//! The most common ones are:
//!
//! - [`KeyNotFound`] thrown when an item is missing or soft-deleted.
//! - [`Forbidden`] thrown when the actor is not the session host.
//! - [`SessionLocked`] thrown when a session no longer accepts edits.
//! - [`PendingObligations`] thrown when closing a session with open debts.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`SessionLocked`]: EngineError::SessionLocked
//!  [`PendingObligations`]: EngineError::PendingObligations
use sea_orm::DbErr;
use thiserror::Error;

use crate::{ObligationStatus, SessionStatus};

/// Coarse classification of [`EngineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    InvalidState,
    Conflict,
    Validation,
    NoParticipants,
    Internal,
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not the payer: {0}")]
    NotPayer(String),
    #[error("Session is locked in status {0}")]
    SessionLocked(SessionStatus),
    #[error("Obligation already settled ({0})")]
    AlreadySettled(ObligationStatus),
    #[error("{count} obligation(s) are not verified yet")]
    PendingObligations { count: u64 },
    #[error("{sessions} hosted session(s) still have unverified obligations")]
    HostingUnsettled { sessions: u64 },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Session has no participants to split with")]
    NoParticipants,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyNotFound(_) => ErrorKind::NotFound,
            Self::Forbidden(_) | Self::NotPayer(_) => ErrorKind::PermissionDenied,
            Self::SessionLocked(_)
            | Self::AlreadySettled(_)
            | Self::PendingObligations { .. }
            | Self::HostingUnsettled { .. }
            | Self::InvalidTransition(_) => ErrorKind::InvalidState,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InvalidAmount(_) | Self::InvalidInput(_) | Self::InvalidId(_) => {
                ErrorKind::Validation
            }
            Self::NoParticipants => ErrorKind::NoParticipants,
            Self::Database(_) => ErrorKind::Internal,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::NotPayer(a), Self::NotPayer(b)) => a == b,
            (Self::SessionLocked(a), Self::SessionLocked(b)) => a == b,
            (Self::AlreadySettled(a), Self::AlreadySettled(b)) => a == b,
            (
                Self::PendingObligations { count: a },
                Self::PendingObligations { count: b },
            ) => a == b,
            (Self::HostingUnsettled { sessions: a }, Self::HostingUnsettled { sessions: b }) => {
                a == b
            }
            (Self::InvalidTransition(a), Self::InvalidTransition(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::NoParticipants, Self::NoParticipants) => true,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
