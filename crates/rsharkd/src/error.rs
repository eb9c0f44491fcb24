//! Error types shared across the daemon.

use core::fmt;
use std::net::SocketAddr;

use radioshark_hid::HidError;
use thiserror::Error;

use crate::config::PersistenceError;
use crate::server::Channel;
use crate::validation::ValidationIssue;

/// An ordered collection of independent failures.
///
/// Used wherever every check or write runs regardless of earlier failures,
/// so the caller sees all problems at once. `Display` joins the individual
/// messages with `", "`.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateError<E> {
    errors: Vec<E>,
}

impl<E> AggregateError<E> {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: E) {
        self.errors.push(error);
    }

    /// Record the error of `result`, if any.
    pub fn record<T>(&mut self, result: Result<T, E>) {
        if let Err(e) = result {
            self.errors.push(e);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, E> {
        self.errors.iter()
    }

    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl<E> Default for AggregateError<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> From<Vec<E>> for AggregateError<E> {
    fn from(errors: Vec<E>) -> Self {
        Self { errors }
    }
}

impl<E> IntoIterator for AggregateError<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a AggregateError<E> {
    type Item = &'a E;
    type IntoIter = core::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl<E: fmt::Display> fmt::Display for AggregateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl<E: std::error::Error> std::error::Error for AggregateError<E> {}

/// One failed device write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{channel}: {source}")]
pub struct ChannelWriteError {
    pub channel: Channel,
    #[source]
    pub source: HidError,
}

pub type ValidationErrors = AggregateError<ValidationIssue>;
pub type WriteErrors = AggregateError<ChannelWriteError>;

/// Why an apply did not complete.
#[derive(Error, Debug)]
pub enum ApplyError {
    /// Rejected before any side effect.
    #[error("{0}")]
    Invalid(ValidationErrors),

    /// At least one device write failed; nothing was persisted.
    #[error("{0}")]
    Device(WriteErrors),

    /// Every write succeeded but the record could not be stored.
    #[error("{0}")]
    Persistence(#[from] PersistenceError),
}

/// Fatal errors while bringing the daemon up.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("the RadioSHARK to manage must be supplied (--shark)")]
    MissingDevice,

    #[error(transparent)]
    Config(#[from] PersistenceError),

    #[error("failed to open RadioSHARK: {0}")]
    Device(#[from] HidError),

    #[error("failed to apply initial configuration: {0}")]
    InitialApply(#[from] ApplyError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),
}
