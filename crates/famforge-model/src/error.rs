// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the node store and external collaborators

use crate::NodeId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for node store operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised by [`GeometryForest`](crate::GeometryForest) operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Node not present in the forest
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    /// Child already belongs to another parent and re-parenting was not requested
    #[error("Node {child} is already owned by {owner}")]
    AlreadyOwned { child: NodeId, owner: NodeId },

    /// Attaching would make a node its own ancestor
    #[error("Attaching {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    /// Node has no parent to detach from
    #[error("Node {0} has no parent")]
    NotAttached(NodeId),

    /// Merge called without input nodes
    #[error("Merge requires at least one node")]
    EmptyMerge,
}

/// Errors reported by external collaborators (readers, kernel, writer)
#[derive(Error, Debug)]
pub enum CollaboratorError {
    /// The target application or service is not available
    #[error("Target system unavailable: {0}")]
    Unavailable(String),

    /// Template file could not be found
    #[error("Template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// Document content is malformed
    #[error("Invalid document format: {0}")]
    Format(String),

    /// The collaborator refused the request
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Geometry kernel failure
    #[error("Kernel error: {0}")]
    Kernel(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollaboratorError {
    /// Create a format error
    pub fn format(msg: impl Into<String>) -> Self {
        CollaboratorError::Format(msg.into())
    }

    /// Create a rejection error
    pub fn rejected(msg: impl Into<String>) -> Self {
        CollaboratorError::Rejected(msg.into())
    }

    /// Create a kernel error
    pub fn kernel(msg: impl Into<String>) -> Self {
        CollaboratorError::Kernel(msg.into())
    }
}
