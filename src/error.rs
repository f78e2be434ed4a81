//! Definition of the crate's error and result.

use thiserror::Error;

/// The library's error enum
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TopKError {
    /// Invalid argument was passed by the user.
    #[error("An invalid argument was passed: '{0}'")]
    InvalidArgument(String),
    /// An Error appeared related to the schema, e.g. a sort column with an unexpected type.
    #[error("Schema error: '{0}'")]
    SchemaError(String),
    /// An Error happened in one of the threads.
    #[error("An error occurred in a thread: '{0}'")]
    ErrorInThread(String),
    /// System error. (e.g.: We failed spawning a new thread)
    #[error("System error.'{0}'")]
    SystemError(String),
}

impl From<rayon::ThreadPoolBuildError> for TopKError {
    fn from(error: rayon::ThreadPoolBuildError) -> TopKError {
        TopKError::SystemError(error.to_string())
    }
}
