//! Error type shared by every parameter kind and the command set.

use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

/// Errors returned by parameter declaration and query operations.
///
/// The matching engine itself never fails; these surface only when a caller
/// declares a parameter or reads a resolved value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("the key length must be greater than zero")]
    EmptyKey,

    #[error("the parameter name length must be greater than zero")]
    InvalidName,

    #[error("argument not set")]
    ArgumentMissing,

    /// An option has neither a command-line value nor a usable default.
    #[error("the option was not set")]
    Missing,

    #[error("the flag was not set")]
    FlagMissing,

    /// The option was given on the command line without its value.
    #[error("the option's value was not set")]
    OptionValueMissing,

    #[error("the environment variable default name must not be empty (zero length or all whitespace)")]
    EmptyEnvDefaultName,

    #[error("the config default name must not be empty (zero length or all whitespace)")]
    EmptyConfigDefaultName,

    /// A required parameter was absent after the match pass.
    #[error("required parameter '{key}' is missing: {source}")]
    RequiredMissing {
        key: String,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid integer value {value:?}: {source}")]
    InvalidInt {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid unsigned integer value {value:?}: {source}")]
    InvalidUint {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid number value {value:?}: {source}")]
    InvalidNumber {
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

impl Error {
    /// Whether this error means "no value at all" rather than "malformed value".
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            Self::ArgumentMissing
                | Self::Missing
                | Self::FlagMissing
                | Self::OptionValueMissing
                | Self::RequiredMissing { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
