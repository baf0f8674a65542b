// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parametric family definition

use crate::{GeometryForest, ParameterSet, TemplateRef};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Key that names a type variant inside a raw type-parameter table
pub const TYPE_NAME_KEY: &str = "Type Name";

/// Name given to the implicit variant
pub const DEFAULT_TYPE_NAME: &str = "Default";

/// A named parameter preset of a family
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeVariant {
    /// Variant name (unique within a family)
    pub name: String,
    /// Parameter values, without the type name entry
    pub parameters: ParameterSet,
}

impl TypeVariant {
    /// Create a variant
    pub fn new(name: impl Into<String>, parameters: ParameterSet) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// Variant as a raw table with the type name as the first entry
    pub fn to_table(&self) -> ParameterSet {
        let mut table = ParameterSet::new().with(TYPE_NAME_KEY, self.name.clone());
        table.merge_from(&self.parameters);
        table
    }
}

/// A parametric family: geometry, instance parameters and type variants
#[derive(Clone, Debug, Default)]
pub struct FamilyDefinition {
    /// Family name
    pub name: String,
    /// Target category (e.g. "Furniture")
    pub category: String,
    /// Template used to create the family document
    pub template: Option<TemplateRef>,
    /// Normalized instance parameters
    pub parameters: ParameterSet,
    /// Type variants in order
    pub types: Vec<TypeVariant>,
    /// Owned geometry
    pub geometry: GeometryForest,
    /// Set once the family has been generated
    pub output_path: Option<PathBuf>,
}

impl FamilyDefinition {
    /// Create a family without geometry
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    /// Set the geometry forest
    pub fn with_geometry(mut self, geometry: GeometryForest) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the type variants
    pub fn with_types(mut self, types: Vec<TypeVariant>) -> Self {
        self.types = types;
        self
    }

    /// Set the instance parameters
    pub fn with_parameters(mut self, parameters: ParameterSet) -> Self {
        self.parameters = parameters;
        self
    }

    /// Valid iff both name and category are non-empty
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.category.trim().is_empty()
    }

    /// Whether the family owns any geometry
    pub fn has_geometry(&self) -> bool {
        !self.geometry.is_empty()
    }

    /// Find a type variant by name
    pub fn type_variant(&self, name: &str) -> Option<&TypeVariant> {
        self.types.iter().find(|t| t.name == name)
    }
}
