// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # famforge Geometry Conversion (Trait-Based)
//!
//! Dispatches geometry nodes to representation-specific converters. The core
//! never interprets payloads: converters sequence calls to the
//! [`GeometryKernel`](famforge_model::GeometryKernel) and the
//! [`TargetDocumentWriter`](famforge_model::TargetDocumentWriter) and attach
//! the resulting target geometry to the node.
//!
//! ## Architecture
//!
//! - [`GeometryConverter`]: Trait for individual representation converters
//! - [`ConverterRegistry`]: Ordered set of converters, first match wins
//! - [`ConvertContext`]: Options, kernel, writer and sink for one call
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use famforge_convert::{ConvertContext, ConverterRegistry};
//!
//! let registry = ConverterRegistry::with_default_converters();
//! let mut ctx = ConvertContext::new(&options, &kernel, &mut writer, &sink);
//! registry.convert_node(&mut node, &mut ctx)?;
//! assert!(node.is_converted());
//! ```

pub mod converters;
pub mod error;
pub mod router;

#[cfg(test)]
mod testing;

// Re-export main types
pub use converters::{BrepConverter, MeshConverter};
pub use error::{Error, Result};
pub use router::{ConvertContext, ConverterRegistry, GeometryConverter};
