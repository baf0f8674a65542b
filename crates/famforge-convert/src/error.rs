// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for geometry conversion

use famforge_model::{CollaboratorError, ConversionOutcome, GeometryKind};
use thiserror::Error;

/// Conversion result type
pub type Result<T> = std::result::Result<T, Error>;

/// Per-node conversion errors
#[derive(Error, Debug)]
pub enum Error {
    /// Node carries no geometry payload
    #[error("Node '{0}' has no geometry payload")]
    MissingPayload(String),

    /// Converter was handed a node of the wrong kind
    #[error("{converter} converter cannot handle {kind} geometry")]
    KindMismatch {
        converter: &'static str,
        kind: GeometryKind,
    },

    /// No registered converter accepts this kind
    #[error("Unsupported geometry type: {0}")]
    UnsupportedType(GeometryKind),

    /// Geometry kernel failure
    #[error("Kernel failed: {0}")]
    Kernel(#[source] CollaboratorError),

    /// Target writer refused to build the geometry
    #[error("Target writer failed: {0}")]
    Writer(#[source] CollaboratorError),
}

impl Error {
    /// Create a missing payload error
    pub fn missing_payload(name: impl Into<String>) -> Self {
        Error::MissingPayload(name.into())
    }

    /// Outcome this error stands for when reported for a single node
    pub fn outcome(&self) -> ConversionOutcome {
        match self {
            Error::MissingPayload(_) => ConversionOutcome::InvalidInput,
            Error::KindMismatch { .. } | Error::UnsupportedType(_) => {
                ConversionOutcome::UnsupportedGeometry
            }
            Error::Kernel(_) => ConversionOutcome::Failed,
            Error::Writer(_) => ConversionOutcome::TargetSystemError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_outcomes() {
        assert_eq!(
            Error::missing_payload("a").outcome(),
            ConversionOutcome::InvalidInput
        );
        assert_eq!(
            Error::UnsupportedType(GeometryKind::Unknown).outcome(),
            ConversionOutcome::UnsupportedGeometry
        );
        assert_eq!(
            Error::Writer(CollaboratorError::rejected("no")).outcome(),
            ConversionOutcome::TargetSystemError
        );
    }

    #[test]
    fn test_unsupported_message() {
        let msg = Error::UnsupportedType(GeometryKind::Unknown).to_string();
        assert!(msg.to_lowercase().contains("unsupported geometry"));
    }
}
