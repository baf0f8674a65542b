// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Converter Registry - Capability-based dispatch to geometry converters
//!
//! Routes geometry nodes to the first registered converter whose
//! `can_convert` accepts the node's kind.

use crate::{Error, Result};
use famforge_model::{
    ConversionOptions, GeometryKernel, GeometryKind, GeometryNode, ProgressEvent, ProgressSink,
    TargetDocumentWriter, TargetGeometry,
};
use log::debug;
use std::sync::Arc;

/// Everything a converter may touch while converting one node
///
/// The writer is borrowed mutably: whoever holds the context is the single
/// writer for its lifetime.
pub struct ConvertContext<'a> {
    /// Per-run options
    pub options: &'a ConversionOptions,
    /// Geometry capabilities
    pub kernel: &'a dyn GeometryKernel,
    /// Target-side builder
    pub writer: &'a mut dyn TargetDocumentWriter,
    /// Event consumer
    pub sink: &'a dyn ProgressSink,
}

impl<'a> ConvertContext<'a> {
    /// Create a context
    pub fn new(
        options: &'a ConversionOptions,
        kernel: &'a dyn GeometryKernel,
        writer: &'a mut dyn TargetDocumentWriter,
        sink: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            options,
            kernel,
            writer,
            sink,
        }
    }

    /// Emit a warning event
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.sink.emit(ProgressEvent::warning(message));
    }
}

/// Geometry converter trait
///
/// Each converter handles one representation kind. Converters never run
/// geometry math themselves; they sequence kernel and writer calls.
pub trait GeometryConverter: Send + Sync {
    /// Short display name
    fn name(&self) -> &'static str;

    /// Whether this converter accepts `kind`
    fn can_convert(&self, kind: GeometryKind) -> bool;

    /// Convert one node into target geometry
    ///
    /// Runs to completion once started; cancellation is checked by the caller
    /// between nodes.
    fn convert(&self, node: &GeometryNode, ctx: &mut ConvertContext<'_>) -> Result<TargetGeometry>;
}

/// Converter registry - selects converters by capability query
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    /// Converters in registration order
    converters: Vec<Arc<dyn GeometryConverter>>,
}

impl ConverterRegistry {
    /// Create a registry without any converters registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with default converters registered
    ///
    /// Registers, in order:
    /// - `BrepConverter` (Brep)
    /// - `MeshConverter` (Mesh)
    pub fn with_default_converters() -> Self {
        use crate::converters::{BrepConverter, MeshConverter};

        let mut registry = Self::new();
        registry.register(Arc::new(BrepConverter::new()));
        registry.register(Arc::new(MeshConverter::new()));
        registry
    }

    /// Register a converter; earlier registrations take precedence
    pub fn register(&mut self, converter: Arc<dyn GeometryConverter>) {
        self.converters.push(converter);
    }

    /// Number of registered converters
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Check if no converter is registered
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Names of the registered converters in order
    pub fn names(&self) -> Vec<&'static str> {
        self.converters.iter().map(|c| c.name()).collect()
    }

    /// First converter accepting `kind`
    pub fn select(&self, kind: GeometryKind) -> Option<&Arc<dyn GeometryConverter>> {
        self.converters.iter().find(|c| c.can_convert(kind))
    }

    /// Check if some converter accepts `kind`
    pub fn has_converter(&self, kind: GeometryKind) -> bool {
        self.select(kind).is_some()
    }

    /// Convert a node and attach the target geometry on success
    ///
    /// The node is left untouched on error.
    pub fn convert_node(&self, node: &mut GeometryNode, ctx: &mut ConvertContext<'_>) -> Result<()> {
        let converter = self
            .select(node.kind)
            .ok_or(Error::UnsupportedType(node.kind))?;

        debug!(
            "Converting node {} '{}' with {} converter",
            node.id(),
            node.name,
            converter.name()
        );

        let target = converter.convert(node, ctx)?;
        node.target = Some(target);
        Ok(())
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("converters", &self.names())
            .finish()
    }
}
