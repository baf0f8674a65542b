// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Readers for source files and saved family documents

use crate::format::{has_json_signature, has_suffix, SourceFile, StoredDocument, StoredElement};
use crate::Result;
use famforge_model::{
    CollaboratorError, CollaboratorResult, DocumentKind, FamilyDocumentReader, SourceDocument,
    SourceElement, SourceFileReader, SourceParameter, TypeVariant,
};
use log::debug;
use rustc_hash::FxHashMap;
use std::path::Path;

/// Extension of source files
pub const SOURCE_EXTENSION: &str = ".json";

/// Extension of saved family documents
pub const FAMILY_EXTENSION: &str = "ffam";

/// Extension of saved project documents
pub const PROJECT_EXTENSION: &str = "fproj";

/// Reader for `famforge-source` JSON files
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSourceReader;

impl JsonSourceReader {
    /// Create new reader
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a source file
    pub fn read(&self, path: &Path) -> Result<SourceDocument> {
        let json = std::fs::read_to_string(path)?;
        let file = SourceFile::from_json(&json)?;
        debug!(
            "Read source '{}' with {} elements",
            path.display(),
            file.document.element_count()
        );
        Ok(file.document)
    }
}

impl SourceFileReader for JsonSourceReader {
    fn can_read(&self, path: &Path) -> bool {
        has_suffix(path, SOURCE_EXTENSION) && has_json_signature(path)
    }

    fn open(&self, path: &Path) -> CollaboratorResult<SourceDocument> {
        self.read(path).map_err(CollaboratorError::from)
    }
}

/// Reader for family documents saved by [`JsonDocumentWriter`](crate::JsonDocumentWriter)
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFamilyReader;

impl JsonFamilyReader {
    /// Create new reader
    pub fn new() -> Self {
        Self
    }

    /// Read a family document into the generic source representation
    pub fn read(&self, path: &Path) -> Result<SourceDocument> {
        let json = std::fs::read_to_string(path)?;
        let stored = StoredDocument::from_json(&json)?;
        if stored.kind != DocumentKind::Family {
            return Err(crate::Error::format("document is not a family"));
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string);

        Ok(SourceDocument {
            name,
            category: stored.category,
            elements: nest_elements(stored.elements),
            parameters: to_source_parameters(stored.family_parameters),
            type_tables: stored.types.iter().map(type_table).collect(),
        })
    }
}

impl FamilyDocumentReader for JsonFamilyReader {
    fn can_read(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(FAMILY_EXTENSION))
            && has_json_signature(path)
    }

    fn open_family(&self, path: &Path) -> CollaboratorResult<SourceDocument> {
        self.read(path).map_err(CollaboratorError::from)
    }
}

fn to_source_parameters(parameters: famforge_model::ParameterSet) -> Vec<SourceParameter> {
    parameters
        .into_iter()
        .map(|p| SourceParameter::new(p.name, p.value.into()))
        .collect()
}

fn type_table(variant: &TypeVariant) -> Vec<SourceParameter> {
    to_source_parameters(variant.to_table())
}

/// Rebuild the element tree from parent ids
///
/// Elements are saved parents first. One whose parent is unknown or saved
/// after it comes back at top level.
fn nest_elements(elements: Vec<StoredElement>) -> Vec<SourceElement> {
    let index: FxHashMap<u64, usize> = elements
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id, i))
        .collect();
    let parents: Vec<Option<usize>> = elements
        .iter()
        .enumerate()
        .map(|(i, e)| {
            e.parent
                .and_then(|p| index.get(&p).copied())
                .filter(|&p| p < i)
        })
        .collect();
    let mut slots: Vec<Option<SourceElement>> =
        elements.into_iter().map(|e| Some(stored_to_source(e))).collect();

    // Back to front, so every element already holds its children when moved
    for i in (0..slots.len()).rev() {
        let Some(parent) = parents[i] else {
            continue;
        };
        if let Some(child) = slots[i].take() {
            if let Some(host) = slots[parent].as_mut() {
                host.children.insert(0, child);
            }
        }
    }
    slots.into_iter().flatten().collect()
}

fn stored_to_source(element: StoredElement) -> SourceElement {
    let mut source = SourceElement::new(element.name, element.geometry_kind, element.class)
        .with_payload(element.payload);
    source.parameters = to_source_parameters(element.parameters);
    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::StoredDocument;
    use famforge_model::{
        ConstructionStrategy, ElementClass, GeometryKind, GeometryPayload, ParameterSet, RawValue,
        TYPE_NAME_KEY,
    };

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_source_reader_can_read() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "a.ffsrc.json", r#"{"format":"famforge-source"}"#);
        let wrong_ext = write(dir.path(), "a.txt", r#"{"format":"famforge-source"}"#);
        let not_object = write(dir.path(), "b.json", "\"text\"");

        let reader = JsonSourceReader::new();
        assert!(reader.can_read(&good));
        assert!(!reader.can_read(&wrong_ext));
        assert!(!reader.can_read(&not_object));
        assert!(!reader.can_read(&dir.path().join("missing.json")));
    }

    #[test]
    fn test_source_reader_open_reports_format_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "a.json", r#"{"format":"other"}"#);

        let err = JsonSourceReader::new().open(&path).unwrap_err();
        assert!(matches!(err, CollaboratorError::Format(_)));
    }

    #[test]
    fn test_family_reader_round_trips_stored_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut stored = StoredDocument::new(DocumentKind::Family, "2024");
        stored.category = Some("Furniture".into());
        stored.family_parameters = ParameterSet::new().with("Material", "Oak");
        stored.types = vec![TypeVariant::new("Small", ParameterSet::new().with("Width", 0.4))];
        stored.elements.push(StoredElement {
            id: 1,
            parent: None,
            name: "Seat".into(),
            strategy: ConstructionStrategy::Furniture,
            class: ElementClass::Furniture,
            geometry_kind: GeometryKind::Mesh,
            payload: GeometryPayload::new(vec![7u8, 7]),
            bounds: None,
            parameters: ParameterSet::new().with("Mark", "S1"),
        });
        let path = dir.path().join("Chair.ffam");
        std::fs::write(&path, serde_json::to_string(&stored).unwrap()).unwrap();

        let reader = JsonFamilyReader::new();
        assert!(reader.can_read(&path));
        let doc = reader.open_family(&path).unwrap();

        assert_eq!(doc.name.as_deref(), Some("Chair"));
        assert_eq!(doc.category.as_deref(), Some("Furniture"));
        assert_eq!(doc.elements.len(), 1);
        assert_eq!(doc.elements[0].parameters[0].value, RawValue::Text("S1".into()));
        assert_eq!(doc.type_tables.len(), 1);
        assert_eq!(doc.type_tables[0][0].name, TYPE_NAME_KEY);
        assert_eq!(doc.type_tables[0][1].value, RawValue::Number(0.4));
    }

    fn element(id: u64, parent: Option<u64>, name: &str) -> StoredElement {
        StoredElement {
            id,
            parent,
            name: name.into(),
            strategy: ConstructionStrategy::Furniture,
            class: ElementClass::Furniture,
            geometry_kind: GeometryKind::Mesh,
            payload: GeometryPayload::new(vec![1u8]),
            bounds: None,
            parameters: ParameterSet::new(),
        }
    }

    #[test]
    fn test_family_reader_nests_hosted_elements() {
        let dir = tempfile::tempdir().unwrap();
        let mut stored = StoredDocument::new(DocumentKind::Family, "2024");
        stored.elements = vec![
            element(1, None, "Seat"),
            element(2, Some(1), "Leg A"),
            element(3, Some(2), "Foot"),
            element(4, Some(1), "Leg B"),
            element(5, Some(42), "Stray"),
        ];
        let path = dir.path().join("Chair.ffam");
        std::fs::write(&path, serde_json::to_string(&stored).unwrap()).unwrap();

        let doc = JsonFamilyReader::new().read(&path).unwrap();
        let roots: Vec<_> = doc.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(roots, vec!["Seat", "Stray"]);
        let legs: Vec<_> = doc.elements[0].children.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(legs, vec!["Leg A", "Leg B"]);
        assert_eq!(doc.elements[0].children[0].children[0].name, "Foot");
        assert_eq!(doc.element_count(), 5);
    }

    #[test]
    fn test_family_reader_rejects_projects() {
        let dir = tempfile::tempdir().unwrap();
        let stored = StoredDocument::new(DocumentKind::Project, "2024");
        let path = dir.path().join("Site.ffam");
        std::fs::write(&path, serde_json::to_string(&stored).unwrap()).unwrap();

        let err = JsonFamilyReader::new().open_family(&path).unwrap_err();
        assert!(matches!(err, CollaboratorError::Format(_)));
    }
}
