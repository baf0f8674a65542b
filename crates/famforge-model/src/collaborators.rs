// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! External collaborators
//!
//! The pipeline never touches native file formats or geometry math itself.
//! These traits are the whole contract it relies on; implementations live in
//! other crates (see `famforge-interchange` for a JSON-backed one).

use crate::{
    BoundingBox, CollaboratorError, ConstructionStrategy, DeclaredType, DocumentHandle,
    ElementClass, ElementHandle, GeometryHandle, GeometryKind, GeometryPayload, ParameterValue,
    RawValue, TargetGeometry, TemplateRef, TypeVariant,
};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result type alias for collaborator calls
pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

/// A parameter as read from a source document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceParameter {
    /// Source-side name
    pub name: String,
    /// Untyped value
    pub value: RawValue,
    /// Declared storage type, if the source states one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared: Option<DeclaredType>,
}

impl SourceParameter {
    /// Create an untyped source parameter
    pub fn new(name: impl Into<String>, value: RawValue) -> Self {
        Self {
            name: name.into(),
            value,
            declared: None,
        }
    }

    /// Set the declared type
    pub fn declared(mut self, declared: DeclaredType) -> Self {
        self.declared = Some(declared);
        self
    }
}

/// An element as read from a source document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceElement {
    pub name: String,
    #[serde(default)]
    pub kind: GeometryKind,
    #[serde(default)]
    pub class: ElementClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<GeometryPayload>,
    /// Hidden in the authoring application
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub parameters: Vec<SourceParameter>,
    #[serde(default)]
    pub children: Vec<SourceElement>,
}

impl SourceElement {
    /// Create an element without payload
    pub fn new(name: impl Into<String>, kind: GeometryKind, class: ElementClass) -> Self {
        Self {
            name: name.into(),
            kind,
            class,
            payload: None,
            hidden: false,
            parameters: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set payload
    pub fn with_payload(mut self, payload: GeometryPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Add a parameter
    pub fn with_parameter(mut self, parameter: SourceParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Add a child element
    pub fn with_child(mut self, child: SourceElement) -> Self {
        self.children.push(child);
        self
    }

    /// Mark as hidden
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Number of elements in this subtree
    pub fn element_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|c| c.element_count())
            .sum::<usize>()
    }
}

/// Contents of an opened source (or target-native family) document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Document or family name
    #[serde(default)]
    pub name: Option<String>,
    /// Family category, when the document is a family
    #[serde(default)]
    pub category: Option<String>,
    /// Top-level elements in order
    #[serde(default)]
    pub elements: Vec<SourceElement>,
    /// Document-level (family instance) parameters
    #[serde(default)]
    pub parameters: Vec<SourceParameter>,
    /// Raw type-parameter tables
    #[serde(default)]
    pub type_tables: Vec<Vec<SourceParameter>>,
}

impl SourceDocument {
    /// Total number of elements, nested ones included
    pub fn element_count(&self) -> usize {
        self.elements.iter().map(|e| e.element_count()).sum()
    }
}

/// Reader for the authoring application's native files
pub trait SourceFileReader: Send + Sync {
    /// Extension and signature check
    fn can_read(&self, path: &Path) -> bool;

    /// Open a document
    fn open(&self, path: &Path) -> CollaboratorResult<SourceDocument>;
}

/// Reader for target-native family documents (the reverse direction)
pub trait FamilyDocumentReader: Send + Sync {
    /// Extension and signature check
    fn can_read(&self, path: &Path) -> bool;

    /// Open a family document
    fn open_family(&self, path: &Path) -> CollaboratorResult<SourceDocument>;
}

/// Geometry capabilities used by converters
///
/// Payloads are opaque to the core; the kernel is the only party that
/// understands them.
pub trait GeometryKernel: Send + Sync {
    /// Repair the payload and weld vertices closer than `tolerance`
    fn cleanup(
        &self,
        payload: &GeometryPayload,
        kind: GeometryKind,
        tolerance: f64,
    ) -> CollaboratorResult<GeometryPayload>;

    /// Reduce mesh complexity within `tolerance`
    fn simplify(&self, payload: &GeometryPayload, tolerance: f64)
        -> CollaboratorResult<GeometryPayload>;

    /// Tessellate a BRep payload into a mesh payload
    fn tessellate(
        &self,
        payload: &GeometryPayload,
        tolerance: f64,
    ) -> CollaboratorResult<GeometryPayload>;

    /// Axis-aligned bounds, if computable
    fn compute_bounds(&self, payload: &GeometryPayload, kind: GeometryKind) -> Option<BoundingBox>;

    /// Centroid, if computable
    fn compute_centroid(&self, payload: &GeometryPayload, kind: GeometryKind)
        -> Option<Point3<f64>>;
}

/// Kind of target document to create
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Project,
    Family,
}

/// Writer for the target application
///
/// Every mutating method takes `&mut self`: whoever holds the writer is the
/// single writer, and each call is its own transaction.
pub trait TargetDocumentWriter: Send {
    /// Whether the target application can be reached
    fn is_available(&self) -> bool {
        true
    }

    /// File extension for saved documents (without the dot)
    fn output_extension(&self, kind: DocumentKind) -> &str;

    /// Create a new document, optionally from a template
    fn create_document(
        &mut self,
        kind: DocumentKind,
        template: Option<&TemplateRef>,
        target_version: &str,
    ) -> CollaboratorResult<DocumentHandle>;

    /// Build target-side geometry from a payload
    fn build_geometry(
        &mut self,
        kind: GeometryKind,
        payload: &GeometryPayload,
    ) -> CollaboratorResult<GeometryHandle>;

    /// Place an element using previously built geometry
    ///
    /// `host` is the element this one is nested under, `None` at top level.
    fn create_element(
        &mut self,
        doc: DocumentHandle,
        host: Option<ElementHandle>,
        strategy: ConstructionStrategy,
        class: ElementClass,
        name: &str,
        geometry: &TargetGeometry,
    ) -> CollaboratorResult<ElementHandle>;

    /// Set a parameter on an element
    fn set_parameter(
        &mut self,
        doc: DocumentHandle,
        element: ElementHandle,
        name: &str,
        value: &ParameterValue,
    ) -> bool;

    /// Declare a family parameter with its default value
    fn add_family_parameter(
        &mut self,
        doc: DocumentHandle,
        name: &str,
        value: &ParameterValue,
    ) -> bool;

    /// Set the category of a family document
    fn set_family_category(&mut self, _doc: DocumentHandle, _category: &str) -> bool {
        true
    }

    /// Create a family type
    fn add_family_type(&mut self, doc: DocumentHandle, variant: &TypeVariant) -> bool;

    /// Save the document
    fn save(&mut self, doc: DocumentHandle, path: &Path, overwrite: bool) -> bool;

    /// Release the document
    fn close(&mut self, _doc: DocumentHandle) {}
}
