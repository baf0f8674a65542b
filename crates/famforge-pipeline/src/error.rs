// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the pipeline stages
//!
//! None of these cross a stage boundary: a stage turns a [`StageFailure`]
//! into its [`ConversionOutcome`] plus Error and Completed events.

use famforge_model::{
    CollaboratorError, ConversionOutcome, DeclaredType, ModelError, ParameterValue,
};
use std::path::PathBuf;
use thiserror::Error;

/// Structural problem that ends a stage early
#[derive(Error, Debug)]
pub enum StageFailure {
    /// Input path does not exist
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Input exists but fails the reader's extension/signature check
    #[error("Unsupported input file: {}", .0.display())]
    UnreadableInput(PathBuf),

    /// Reader could not open the document
    #[error("Failed to open {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: CollaboratorError,
    },

    /// No reader is configured for this kind of input
    #[error("No reader configured for {0} documents")]
    NoReader(&'static str),

    /// Node store rejected an operation
    #[error("Geometry store error: {0}")]
    Model(#[from] ModelError),

    /// Convert was handed an empty forest
    #[error("No geometry to convert")]
    EmptyForest,

    /// Family lacks a name or category
    #[error("Invalid family definition: {0}")]
    InvalidFamily(String),

    /// Generation refused because there is no geometry
    #[error("No geometry to generate")]
    EmptyGeometry,

    /// Target application cannot be reached
    #[error("Target system is not available")]
    Unavailable,

    /// Target document could not be created
    #[error("Failed to create target document")]
    CreateDocument(#[source] CollaboratorError),

    /// Saving the target document failed
    #[error("Failed to save {}", .0.display())]
    Save(PathBuf),

    /// Cancellation was honored
    #[error("Cancelled")]
    Cancelled,
}

impl StageFailure {
    /// Outcome reported for this failure
    pub fn outcome(&self) -> ConversionOutcome {
        match self {
            StageFailure::MissingInput(_)
            | StageFailure::UnreadableInput(_)
            | StageFailure::EmptyForest
            | StageFailure::InvalidFamily(_)
            | StageFailure::EmptyGeometry => ConversionOutcome::InvalidInput,
            StageFailure::Open { .. }
            | StageFailure::Unavailable
            | StageFailure::NoReader(_)
            | StageFailure::CreateDocument(_) => ConversionOutcome::TargetSystemError,
            StageFailure::Model(_) => ConversionOutcome::Failed,
            StageFailure::Save(_) => ConversionOutcome::OutputWriteError,
            StageFailure::Cancelled => ConversionOutcome::Cancelled,
        }
    }

    /// Create an invalid family error
    pub fn invalid_family(msg: impl Into<String>) -> Self {
        StageFailure::InvalidFamily(msg.into())
    }
}

/// Value coercion failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    /// Value cannot be read as the declared type
    #[error("Cannot convert '{value}' to {declared:?}")]
    Coercion {
        value: String,
        declared: DeclaredType,
    },
}

impl MapError {
    /// Create a coercion error
    pub fn coercion(value: &ParameterValue, declared: DeclaredType) -> Self {
        MapError::Coercion {
            value: value.to_string(),
            declared,
        }
    }
}
