// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-run conversion options

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default target application version tag
pub const DEFAULT_TARGET_VERSION: &str = "2024";

/// Default numeric tolerance for kernel operations (model units)
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Reference to a target-side template document
///
/// Serializes as the bare path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateRef {
    /// Template file path
    pub path: PathBuf,
}

impl TemplateRef {
    /// Create a template reference
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Template path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// What Generate does with a family or project that has no geometry
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyGeometryPolicy {
    /// Generate anyway; the outcome is at best `PartialSuccess`
    #[default]
    Allow,
    /// Stop with `InvalidInput`
    Reject,
}

/// Immutable per-run configuration
///
/// Deserializes from TOML/JSON with every field optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Target application version tag (e.g. "2024")
    pub target_version: String,
    /// Output document path; a temporary path is generated when absent
    pub output_path: Option<PathBuf>,
    /// Numeric tolerance handed to kernel operations
    pub tolerance: f64,
    /// Weld coincident vertices before building target geometry
    pub merge_coincident_vertices: bool,
    /// Simplify meshes before building target geometry
    pub simplify_meshes: bool,
    /// Keep geometry the source marks as hidden
    pub include_hidden_geometry: bool,
    /// Derive the family category from the geometry when none is given
    pub auto_determine_family_type: bool,
    /// Emit per-node status events
    pub detailed_progress: bool,
    /// User rename table (source name -> target name), checked first
    pub parameter_renames: BTreeMap<String, String>,
    /// Template used to create the target document
    pub template: Option<TemplateRef>,
    /// Handling of inputs without geometry
    pub empty_geometry: EmptyGeometryPolicy,
    /// Overwrite an existing output file on save
    pub overwrite: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            target_version: DEFAULT_TARGET_VERSION.to_string(),
            output_path: None,
            tolerance: DEFAULT_TOLERANCE,
            merge_coincident_vertices: true,
            simplify_meshes: false,
            include_hidden_geometry: false,
            auto_determine_family_type: true,
            detailed_progress: false,
            parameter_renames: BTreeMap::new(),
            template: None,
            empty_geometry: EmptyGeometryPolicy::Allow,
            overwrite: true,
        }
    }
}

impl ConversionOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set target version
    pub fn with_target_version(mut self, version: impl Into<String>) -> Self {
        self.target_version = version.into();
        self
    }

    /// Set output path
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Set tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set template
    pub fn with_template(mut self, template: TemplateRef) -> Self {
        self.template = Some(template);
        self
    }

    /// Add a user rename
    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.parameter_renames.insert(from.into(), to.into());
        self
    }

    /// Set the empty-geometry policy
    pub fn with_empty_geometry(mut self, policy: EmptyGeometryPolicy) -> Self {
        self.empty_geometry = policy;
        self
    }

    /// Enable per-node status events
    pub fn with_detailed_progress(mut self, enabled: bool) -> Self {
        self.detailed_progress = enabled;
        self
    }

    /// Include hidden source geometry
    pub fn with_hidden_geometry(mut self, enabled: bool) -> Self {
        self.include_hidden_geometry = enabled;
        self
    }

    /// Enable mesh simplification
    pub fn with_mesh_simplification(mut self, enabled: bool) -> Self {
        self.simplify_meshes = enabled;
        self
    }

    /// Effective tolerance (non-finite or negative values fall back to the default)
    pub fn effective_tolerance(&self) -> f64 {
        if self.tolerance.is_finite() && self.tolerance >= 0.0 {
            self.tolerance
        } else {
            DEFAULT_TOLERANCE
        }
    }
}
