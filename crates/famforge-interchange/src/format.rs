// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On-disk JSON layouts
//!
//! Two documents share this crate: source files (`format = "famforge-source"`)
//! that the pipeline parses, and target documents
//! (`format = "famforge-document"`) that [`JsonDocumentWriter`](crate::JsonDocumentWriter)
//! saves and [`JsonFamilyReader`](crate::JsonFamilyReader) reads back.

use crate::{Error, Result};
use famforge_model::{
    BoundingBox, ConstructionStrategy, DocumentKind, ElementClass, GeometryKind, GeometryPayload,
    ParameterSet, SourceDocument, TypeVariant,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Format tag of source files
pub const SOURCE_FORMAT: &str = "famforge-source";

/// Format tag of saved target documents
pub const DOCUMENT_FORMAT: &str = "famforge-document";

/// Current layout version
pub const FORMAT_VERSION: u32 = 1;

/// Source file: a format header around a [`SourceDocument`]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceFile {
    pub format: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(flatten)]
    pub document: SourceDocument,
}

impl SourceFile {
    /// Wrap a document with the current header
    pub fn new(document: SourceDocument) -> Self {
        Self {
            format: SOURCE_FORMAT.to_string(),
            version: FORMAT_VERSION,
            document,
        }
    }

    /// Parse and check the header
    pub fn from_json(json: &str) -> Result<Self> {
        let file: SourceFile = serde_json::from_str(json)?;
        check_header(&file.format, SOURCE_FORMAT, file.version)?;
        Ok(file)
    }
}

/// Element placed in a saved target document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredElement {
    pub id: u64,
    /// Id of the hosting element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    pub name: String,
    pub strategy: ConstructionStrategy,
    pub class: ElementClass,
    pub geometry_kind: GeometryKind,
    pub payload: GeometryPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundingBox>,
    #[serde(default)]
    pub parameters: ParameterSet,
}

/// A target document as saved by the JSON writer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub format: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub kind: DocumentKind,
    pub target_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub elements: Vec<StoredElement>,
    #[serde(default)]
    pub family_parameters: ParameterSet,
    #[serde(default)]
    pub types: Vec<TypeVariant>,
}

impl StoredDocument {
    /// Create an empty document
    pub fn new(kind: DocumentKind, target_version: impl Into<String>) -> Self {
        Self {
            format: DOCUMENT_FORMAT.to_string(),
            version: FORMAT_VERSION,
            kind,
            target_version: target_version.into(),
            template: None,
            category: None,
            elements: Vec::new(),
            family_parameters: ParameterSet::new(),
            types: Vec::new(),
        }
    }

    /// Parse and check the header
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: StoredDocument = serde_json::from_str(json)?;
        check_header(&doc.format, DOCUMENT_FORMAT, doc.version)?;
        Ok(doc)
    }

    /// Find an element by id
    pub fn element(&self, id: u64) -> Option<&StoredElement> {
        self.elements.iter().find(|e| e.id == id)
    }
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

fn check_header(format: &str, expected: &str, version: u32) -> Result<()> {
    if format != expected {
        return Err(Error::format(format!(
            "expected format '{}', found '{}'",
            expected, format
        )));
    }
    if version > FORMAT_VERSION {
        return Err(Error::format(format!(
            "layout version {} is newer than supported version {}",
            version, FORMAT_VERSION
        )));
    }
    Ok(())
}

/// Whether the file's first non-whitespace byte opens a JSON object
pub fn has_json_signature(path: &Path) -> bool {
    let mut buf = [0u8; 64];
    let read = match File::open(path).and_then(|mut f| f.read(&mut buf)) {
        Ok(n) => n,
        Err(_) => return false,
    };
    buf[..read]
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{')
}

/// Whether the file name ends with `suffix` (case-insensitive)
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.to_ascii_lowercase().ends_with(suffix))
}
