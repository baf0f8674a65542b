// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the JSON interchange format

use famforge_model::CollaboratorError;
use thiserror::Error;

/// Interchange result type
pub type Result<T> = std::result::Result<T, Error>;

/// Interchange errors
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed JSON that is not the expected document
    #[error("Unexpected document: {0}")]
    Format(String),
}

impl Error {
    /// Create a format error
    pub fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }
}

impl From<Error> for CollaboratorError {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(io) => CollaboratorError::Io(io),
            Error::Json(json) => CollaboratorError::format(json.to_string()),
            Error::Format(msg) => CollaboratorError::Format(msg),
        }
    }
}
