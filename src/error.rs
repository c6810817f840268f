//! Errors raised by the external atom machinery.
//!
//! These errors are carried inside [anyhow::Error] values;
//! use [anyhow::Error::downcast_ref] to recover the kind of failure.

/// The kinds of fatal failures raised while evaluating and verifying external atoms.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HexError {
    /// A plugin broke its contract (e.g. an output tuple both known true and unknown).
    #[error("plugin contract violation: {0}")]
    ContractViolation(String),
    /// An operation was called on a value that does not support it.
    #[error("usage error: {0}")]
    Usage(String),
    /// The external atom declarations or the ground program are inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// An identifier was used after the end of the scope it was created in.
    #[error("identifier {0} used outside of the scope it was created in")]
    StaleIdentifier(String),
}

impl HexError {
    pub(crate) fn usage<S: Into<String>>(msg: S) -> anyhow::Error {
        HexError::Usage(msg.into()).into()
    }

    pub(crate) fn configuration<S: Into<String>>(msg: S) -> anyhow::Error {
        HexError::Configuration(msg.into()).into()
    }

    pub(crate) fn contract<S: Into<String>>(msg: S) -> anyhow::Error {
        HexError::ContractViolation(msg.into()).into()
    }
}
