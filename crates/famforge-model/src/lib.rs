// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! famforge Model - Geometry node store, parameter model and collaborator traits
//!
//! This crate provides the in-memory representation that every famforge stage
//! works on. A source document is parsed into a [`GeometryForest`] of
//! [`GeometryNode`]s, each carrying an opaque geometry payload and a typed
//! [`ParameterSet`]. The pipeline converts the forest and hands it to a target
//! document writer.
//!
//! # Architecture
//!
//! - [`GeometryForest`] - Arena of nodes addressed by [`NodeId`]; the only
//!   place where parent/child edges change
//! - [`ParameterSet`] / [`ParameterValue`] - Ordered, typed parameters
//! - [`FamilyDefinition`] / [`TypeVariant`] - Parametric family description
//! - [`ConversionOptions`] - Per-run configuration
//! - [`ConversionOutcome`] / [`ProgressEvent`] - Stage results and progress
//! - [`SourceFileReader`], [`GeometryKernel`], [`TargetDocumentWriter`],
//!   [`FamilyDocumentReader`] - External collaborators
//!
//! # Example
//!
//! ```ignore
//! use famforge_model::{ElementClass, GeometryForest, GeometryKind, GeometryNode};
//!
//! let mut forest = GeometryForest::new();
//! let wall = forest.add(GeometryNode::new("Wall 1", GeometryKind::Brep, ElementClass::Wall));
//! let copy = forest.clone_subtree(wall)?;
//! assert_ne!(wall, copy);
//! ```

pub mod collaborators;
pub mod error;
pub mod family;
pub mod node;
pub mod options;
pub mod outcome;
pub mod parameters;
pub mod progress;
pub mod types;

// Re-export all public types
pub use collaborators::*;
pub use error::*;
pub use family::*;
pub use node::*;
pub use options::*;
pub use outcome::*;
pub use parameters::*;
pub use progress::*;
pub use types::*;

// Re-export nalgebra types for convenience
pub use nalgebra::Point3;
