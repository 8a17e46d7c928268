//! Error types for butler-core
//!
//! This module provides the error handling for the library, including:
//! - Networking errors surfaced through completion callbacks
//! - Account store errors returned synchronously from mutating operations
//! - Parsing errors for both strict and loose response decoding

use thiserror::Error;

/// Result type alias for butler-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for butler-core
///
/// Networking and parsing errors are always delivered through a completion
/// callback, never returned synchronously. Account store errors are returned
/// synchronously from the mutating operations of [`crate::account::AccountStore`].
#[derive(Debug, Error)]
pub enum Error {
    /// The response body could not be interpreted as JSON
    #[error("JSON parsing failed")]
    JsonParsing,

    /// The server answered with a status code outside the success set
    #[error("HTTP {code}: {message}")]
    HttpNoSuccess {
        /// The response status code
        code: u16,
        /// Message derived from the response status description
        message: String,
    },

    /// Transport-level failure (connection, TLS, timeout)
    ///
    /// Cancellation never surfaces here: a cancelled task's completion
    /// callback is not invoked at all.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A successful response carried no body where one was required
    #[error("no data found in response")]
    NoData,

    /// A request URL could not be assembled
    #[error("cannot build request URL")]
    UrlBuilding,

    /// Account store error
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Response decoding error
    #[error(transparent)]
    Parsing(#[from] ParsingError),
}

/// Errors produced by the account store
#[derive(Debug, Error)]
pub enum AccountError {
    /// An equal account is already present in the store
    #[error("an account with that url already exists")]
    AlreadyExists,

    /// The account's base URL could not be turned into a safe storage key
    #[error("could not encode the account url as a storage key")]
    UrlEncoding,

    /// The platform secret store rejected an operation
    #[error("secret store error: {0}")]
    SecretStore(String),

    /// Metadata record I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata record (de)serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors produced when decoding response payloads
#[derive(Debug, Error)]
pub enum ParsingError {
    /// The payload does not match the expected schema
    #[error("the data is not in the expected format")]
    DataNotCorrectFormat,

    /// A required key is absent from the payload
    #[error("the key {0:?} is missing in the response")]
    KeyMissing(String),
}
