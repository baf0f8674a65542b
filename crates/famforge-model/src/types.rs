// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for geometry data representation
//!
//! This module defines identifiers, the closed geometry/element
//! classifications, and the opaque handles exchanged with collaborators.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use nalgebra::Point3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Type-safe node identifier
///
/// Identifiers are assigned by the [`GeometryForest`](crate::GeometryForest)
/// when a node is inserted and are never reused within that forest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        NodeId(id)
    }
}

/// Representation kind of a node's geometry payload
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    /// Kind could not be determined; never convertible
    #[default]
    Unknown,
    /// Boundary representation (solids, surfaces, curves)
    Brep,
    /// Tessellated (triangulated) geometry
    Mesh,
}

impl GeometryKind {
    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::Unknown => "Unknown",
            GeometryKind::Brep => "Brep",
            GeometryKind::Mesh => "Mesh",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Closed element classification used to pick a construction strategy
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementClass {
    Wall,
    Floor,
    Ceiling,
    Roof,
    Column,
    Beam,
    Door,
    Window,
    Furniture,
    #[serde(rename = "mep_component")]
    MEPComponent,
    Site,
    #[default]
    GenericModel,
    Other,
}

impl ElementClass {
    /// All classifications in declaration order
    pub const ALL: [ElementClass; 13] = [
        ElementClass::Wall,
        ElementClass::Floor,
        ElementClass::Ceiling,
        ElementClass::Roof,
        ElementClass::Column,
        ElementClass::Beam,
        ElementClass::Door,
        ElementClass::Window,
        ElementClass::Furniture,
        ElementClass::MEPComponent,
        ElementClass::Site,
        ElementClass::GenericModel,
        ElementClass::Other,
    ];

    /// Parse a classification from a source label (case-insensitive)
    ///
    /// Unrecognized labels map to [`ElementClass::Other`].
    pub fn parse(s: &str) -> Self {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "wall" | "walls" => ElementClass::Wall,
            "floor" | "floors" | "slab" => ElementClass::Floor,
            "ceiling" | "ceilings" => ElementClass::Ceiling,
            "roof" | "roofs" => ElementClass::Roof,
            "column" | "columns" | "structuralcolumn" => ElementClass::Column,
            "beam" | "beams" | "structuralframing" => ElementClass::Beam,
            "door" | "doors" => ElementClass::Door,
            "window" | "windows" => ElementClass::Window,
            "furniture" | "furnishing" => ElementClass::Furniture,
            "mep" | "mepcomponent" | "mechanicalequipment" => ElementClass::MEPComponent,
            "site" | "topography" => ElementClass::Site,
            "generic" | "genericmodel" | "genericmodels" => ElementClass::GenericModel,
            _ => ElementClass::Other,
        }
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            ElementClass::Wall => "Wall",
            ElementClass::Floor => "Floor",
            ElementClass::Ceiling => "Ceiling",
            ElementClass::Roof => "Roof",
            ElementClass::Column => "Column",
            ElementClass::Beam => "Beam",
            ElementClass::Door => "Door",
            ElementClass::Window => "Window",
            ElementClass::Furniture => "Furniture",
            ElementClass::MEPComponent => "MEP Component",
            ElementClass::Site => "Site",
            ElementClass::GenericModel => "Generic Model",
            ElementClass::Other => "Other",
        }
    }

    /// Target-side family category for this classification
    pub fn category_name(&self) -> &'static str {
        match self {
            ElementClass::Wall => "Walls",
            ElementClass::Floor => "Floors",
            ElementClass::Ceiling => "Ceilings",
            ElementClass::Roof => "Roofs",
            ElementClass::Column => "Structural Columns",
            ElementClass::Beam => "Structural Framing",
            ElementClass::Door => "Doors",
            ElementClass::Window => "Windows",
            ElementClass::Furniture => "Furniture",
            ElementClass::MEPComponent => "Mechanical Equipment",
            ElementClass::Site => "Site",
            ElementClass::GenericModel | ElementClass::Other => "Generic Models",
        }
    }
}

impl FromStr for ElementClass {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(ElementClass::parse(s))
    }
}

impl fmt::Display for ElementClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Target-side construction strategy selected from an element classification
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionStrategy {
    Wall,
    Floor,
    Ceiling,
    Roof,
    Column,
    Beam,
    /// Hosted openings (doors and windows)
    Opening,
    Furniture,
    /// Generic opaque-shape element; accepts any geometry
    GenericShape,
}

impl ConstructionStrategy {
    /// Select the strategy for an element classification
    pub fn for_class(class: ElementClass) -> Self {
        match class {
            ElementClass::Wall => ConstructionStrategy::Wall,
            ElementClass::Floor => ConstructionStrategy::Floor,
            ElementClass::Ceiling => ConstructionStrategy::Ceiling,
            ElementClass::Roof => ConstructionStrategy::Roof,
            ElementClass::Column => ConstructionStrategy::Column,
            ElementClass::Beam => ConstructionStrategy::Beam,
            ElementClass::Door | ElementClass::Window => ConstructionStrategy::Opening,
            ElementClass::Furniture => ConstructionStrategy::Furniture,
            ElementClass::MEPComponent
            | ElementClass::Site
            | ElementClass::GenericModel
            | ElementClass::Other => ConstructionStrategy::GenericShape,
        }
    }

    /// Whether this is the catch-all strategy
    pub fn is_generic(&self) -> bool {
        matches!(self, ConstructionStrategy::GenericShape)
    }
}

/// Opaque geometry payload
///
/// The core never interprets the bytes; only the [`GeometryKind`] tag on the
/// owning node says what they are. Cloning is cheap (shared buffer).
/// Serializes as a base64 string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GeometryPayload {
    bytes: Arc<[u8]>,
}

impl GeometryPayload {
    /// Wrap raw payload bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
        }
    }

    /// Raw payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if payload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for GeometryPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeometryPayload({} bytes)", self.bytes.len())
    }
}

impl Serialize for GeometryPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(&self.bytes))
    }
}

impl<'de> Deserialize<'de> for GeometryPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64
            .decode(encoded.as_bytes())
            .map(GeometryPayload::new)
            .map_err(serde::de::Error::custom)
    }
}

/// Axis-aligned bounds reported by the geometry kernel
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Create new bounds
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Extent along each axis
    pub fn size(&self) -> [f64; 3] {
        [
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        ]
    }
}

/// Handle to an open target document
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DocumentHandle(pub u64);

/// Handle to an element placed in a target document
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ElementHandle(pub u64);

/// Handle to target-side geometry built by the writer
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct GeometryHandle(pub u64);

/// Target-ready geometry attached to a node after conversion
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetGeometry {
    /// Writer-side handle
    pub handle: GeometryHandle,
    /// Representation that was actually built (a Brep may fall back to Mesh)
    pub kind: GeometryKind,
    /// Bounds reported by the kernel, if it could compute them
    pub bounds: Option<BoundingBox>,
    /// Centroid reported by the kernel, if it could compute it
    pub centroid: Option<Point3<f64>>,
}

impl TargetGeometry {
    /// Create target geometry without bounds
    pub fn new(handle: GeometryHandle, kind: GeometryKind) -> Self {
        Self {
            handle,
            kind,
            bounds: None,
            centroid: None,
        }
    }

    /// Attach kernel bounds
    pub fn with_bounds(mut self, bounds: Option<BoundingBox>) -> Self {
        self.bounds = bounds;
        self
    }

    /// Attach kernel centroid
    pub fn with_centroid(mut self, centroid: Option<Point3<f64>>) -> Self {
        self.centroid = centroid;
        self
    }
}
