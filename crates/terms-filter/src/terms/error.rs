//! Error types for terms filter compilation.

use thiserror::Error;

/// A specialized Result type for filter compilation.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while compiling a terms filter.
///
/// Every variant is terminal for the compilation call that produced it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// No array-valued key was found in the filter body.
    #[error("[terms] filter requires a field name, followed by array of terms")]
    MissingFieldName,

    /// A term in the terms array was null.
    #[error("no value specified for term filter on field [{field}]")]
    NullTermValue {
        /// The field whose terms array held the null.
        field: String,
    },

    /// A scalar key outside the recognized option set.
    #[error("[terms] filter does not support [{key}]")]
    UnsupportedOption {
        /// The unrecognized key.
        key: String,
    },

    /// The `execution` value is not one of the known modes.
    #[error("[terms] filter execution value [{value}] not supported{}", did_you_mean(.suggestion))]
    UnsupportedExecutionMode {
        /// The offending execution value.
        value: String,
        /// The closest known mode name, if any is close enough.
        suggestion: Option<String>,
    },

    /// A second array-valued key was found after the first one.
    #[error("[terms] filter expects a single terms array, found [{first}] and [{second}]")]
    DuplicateFieldName {
        /// The key of the first terms array.
        first: String,
        /// The key of the second terms array.
        second: String,
    },

    /// The `_cache` value could not be read as a boolean.
    #[error("[terms] filter [_cache] expects a boolean, got [{value}]")]
    InvalidCacheFlag {
        /// The value that was given.
        value: String,
    },

    /// A term could not be encoded for its mapped field.
    #[error("failed to encode term [{value}] for field [{field}]: {reason}")]
    InvalidTermValue {
        /// The canonical field name.
        field: String,
        /// The raw term text.
        value: String,
        /// Why the encoder rejected it.
        reason: String,
    },

    /// A token that has no meaning at its position.
    #[error("unexpected token: {token}")]
    UnexpectedToken {
        /// Description of the unexpected token.
        token: String,
    },

    /// The token stream ended before the filter body was closed.
    #[error("unexpected end of filter body")]
    UnexpectedEndOfInput,

    /// No parser is registered under the given filter name.
    #[error("no filter registered for [{name}]")]
    UnknownFilter {
        /// The top-level filter name.
        name: String,
    },

    /// The filter document does not have the expected shape.
    #[error("malformed filter: {reason}")]
    MalformedFilter {
        /// What is wrong with the document.
        reason: String,
    },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(", did you mean [{}]?", s),
        None => String::new(),
    }
}

impl FilterError {
    /// Creates a null term value error.
    pub fn null_term(field: impl Into<String>) -> Self {
        FilterError::NullTermValue {
            field: field.into(),
        }
    }

    /// Creates an unsupported option error.
    pub fn unsupported_option(key: impl Into<String>) -> Self {
        FilterError::UnsupportedOption { key: key.into() }
    }

    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>) -> Self {
        FilterError::UnexpectedToken {
            token: token.into(),
        }
    }

    /// Creates a malformed filter error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        FilterError::MalformedFilter {
            reason: reason.into(),
        }
    }

    /// Returns true for errors caused by the content of the request, as
    /// opposed to its structure.
    pub fn is_invalid_value(&self) -> bool {
        matches!(
            self,
            FilterError::NullTermValue { .. }
                | FilterError::UnsupportedExecutionMode { .. }
                | FilterError::InvalidCacheFlag { .. }
                | FilterError::InvalidTermValue { .. }
        )
    }
}
