//! Crate-wide error type.
//!
//! Every failure is fatal to the operation that raised it; nothing here is
//! retryable. The only non-fatal condition (quadrature decimation beyond the
//! stability threshold) is reported through `tracing::warn!` instead.

use thiserror::Error;

/// Errors raised by quadrature, geometry, polynomial and local function code.
#[derive(Debug, Error)]
pub enum Error {
    /// A geometric operation was requested before `parameterize`.
    #[error("must parameterize edges before {action}")]
    NotParameterized {
        /// What the caller tried to do.
        action: &'static str,
    },

    /// Two collections that must have equal length do not.
    #[error("size mismatch in {what}: expected {expected}, found {found}")]
    SizeMismatch {
        /// The offending quantity.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        found: usize,
    },

    /// Input validation failure (bad counts, bad parameters, wrong operands).
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Human readable reason.
        reason: String,
    },

    /// Geometric degeneracy (coincident points, open boundaries, ...).
    #[error("degenerate geometry: {reason}")]
    Degenerate {
        /// Human readable reason.
        reason: String,
    },

    /// The boundary integral system could not be solved.
    #[error("boundary integral system is singular")]
    SingularSystem,

    /// A declared strategy without an implementation.
    #[error("not supported: {feature}")]
    Unsupported {
        /// Name of the missing capability.
        feature: &'static str,
    },
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::Degenerate {
            reason: reason.into(),
        }
    }

    pub(crate) fn size(what: &'static str, expected: usize, found: usize) -> Self {
        Self::SizeMismatch {
            what,
            expected,
            found,
        }
    }
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Fails with [`Error::SizeMismatch`] unless `found == expected`.
#[inline]
pub(crate) fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::size(what, expected, found))
    }
}
