// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON target document writer
//!
//! Keeps open documents in memory and serializes them on save. Built geometry
//! is held per handle and dropped once the last open document is closed.

use crate::format::{StoredDocument, StoredElement};
use crate::reader::{FAMILY_EXTENSION, PROJECT_EXTENSION};
use famforge_model::{
    CollaboratorError, CollaboratorResult, ConstructionStrategy, DocumentHandle, DocumentKind,
    ElementClass, ElementHandle, GeometryHandle, GeometryKind, GeometryPayload, ParameterValue,
    TargetDocumentWriter, TargetGeometry, TemplateRef, TypeVariant,
};
use log::{debug, info, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;

/// Writer producing `famforge-document` JSON files
#[derive(Debug)]
pub struct JsonDocumentWriter {
    available: bool,
    unsupported: FxHashSet<ConstructionStrategy>,
    documents: FxHashMap<DocumentHandle, StoredDocument>,
    geometry: FxHashMap<GeometryHandle, (GeometryKind, GeometryPayload)>,
    next_handle: u64,
}

impl Default for JsonDocumentWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonDocumentWriter {
    /// Create an available writer supporting every strategy
    pub fn new() -> Self {
        Self {
            available: true,
            unsupported: FxHashSet::default(),
            documents: FxHashMap::default(),
            geometry: FxHashMap::default(),
            next_handle: 1,
        }
    }

    /// Simulate an unreachable target application
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Refuse elements built with `strategy`
    pub fn without_strategy(mut self, strategy: ConstructionStrategy) -> Self {
        self.unsupported.insert(strategy);
        self
    }

    /// An open document
    pub fn document(&self, doc: DocumentHandle) -> Option<&StoredDocument> {
        self.documents.get(&doc)
    }

    /// Number of open documents
    pub fn open_documents(&self) -> usize {
        self.documents.len()
    }

    /// Number of built geometry handles still held
    pub fn built_geometry(&self) -> usize {
        self.geometry.len()
    }

    fn allocate(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl TargetDocumentWriter for JsonDocumentWriter {
    fn is_available(&self) -> bool {
        self.available
    }

    fn output_extension(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Family => FAMILY_EXTENSION,
            DocumentKind::Project => PROJECT_EXTENSION,
        }
    }

    fn create_document(
        &mut self,
        kind: DocumentKind,
        template: Option<&TemplateRef>,
        target_version: &str,
    ) -> CollaboratorResult<DocumentHandle> {
        if !self.available {
            return Err(CollaboratorError::Unavailable(
                "JSON writer disabled".to_string(),
            ));
        }
        if let Some(template) = template {
            if !template.path().is_file() {
                return Err(CollaboratorError::TemplateNotFound(template.path.clone()));
            }
        }

        let mut stored = StoredDocument::new(kind, target_version);
        stored.template = template.map(|t| t.path().display().to_string());

        let doc = DocumentHandle(self.allocate());
        self.documents.insert(doc, stored);
        debug!("Created {:?} document {:?}", kind, doc);
        Ok(doc)
    }

    fn build_geometry(
        &mut self,
        kind: GeometryKind,
        payload: &GeometryPayload,
    ) -> CollaboratorResult<GeometryHandle> {
        if kind == GeometryKind::Unknown {
            return Err(CollaboratorError::rejected("geometry kind is unknown"));
        }
        if payload.is_empty() {
            return Err(CollaboratorError::rejected("geometry payload is empty"));
        }
        let handle = GeometryHandle(self.allocate());
        self.geometry.insert(handle, (kind, payload.clone()));
        Ok(handle)
    }

    fn create_element(
        &mut self,
        doc: DocumentHandle,
        host: Option<ElementHandle>,
        strategy: ConstructionStrategy,
        class: ElementClass,
        name: &str,
        geometry: &TargetGeometry,
    ) -> CollaboratorResult<ElementHandle> {
        if self.unsupported.contains(&strategy) {
            return Err(CollaboratorError::rejected(format!(
                "strategy {:?} is not supported",
                strategy
            )));
        }
        let (kind, payload) = self
            .geometry
            .get(&geometry.handle)
            .cloned()
            .ok_or_else(|| CollaboratorError::rejected("geometry handle is not known"))?;

        let id = self.allocate();
        let stored = self
            .documents
            .get_mut(&doc)
            .ok_or_else(|| CollaboratorError::rejected("document is not open"))?;
        if let Some(host) = host {
            if stored.element(host.0).is_none() {
                return Err(CollaboratorError::rejected("host element is not in the document"));
            }
        }
        stored.elements.push(StoredElement {
            id,
            parent: host.map(|h| h.0),
            name: name.to_string(),
            strategy,
            class,
            geometry_kind: kind,
            payload,
            bounds: geometry.bounds,
            parameters: Default::default(),
        });
        Ok(ElementHandle(id))
    }

    fn set_parameter(
        &mut self,
        doc: DocumentHandle,
        element: ElementHandle,
        name: &str,
        value: &ParameterValue,
    ) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        let Some(stored) = self.documents.get_mut(&doc) else {
            return false;
        };
        match stored.elements.iter_mut().find(|e| e.id == element.0) {
            Some(target) => {
                target.parameters.insert(name, value.clone());
                true
            }
            None => false,
        }
    }

    fn add_family_parameter(
        &mut self,
        doc: DocumentHandle,
        name: &str,
        value: &ParameterValue,
    ) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        match self.documents.get_mut(&doc) {
            Some(stored) if stored.kind == DocumentKind::Family => {
                stored.family_parameters.insert(name, value.clone());
                true
            }
            _ => false,
        }
    }

    fn set_family_category(&mut self, doc: DocumentHandle, category: &str) -> bool {
        match self.documents.get_mut(&doc) {
            Some(stored) if stored.kind == DocumentKind::Family => {
                stored.category = Some(category.to_string());
                true
            }
            _ => false,
        }
    }

    fn add_family_type(&mut self, doc: DocumentHandle, variant: &TypeVariant) -> bool {
        match self.documents.get_mut(&doc) {
            Some(stored) if stored.kind == DocumentKind::Family => {
                if stored.types.iter().any(|t| t.name == variant.name) {
                    return false;
                }
                stored.types.push(variant.clone());
                true
            }
            _ => false,
        }
    }

    fn save(&mut self, doc: DocumentHandle, path: &Path, overwrite: bool) -> bool {
        let Some(stored) = self.documents.get(&doc) else {
            return false;
        };
        if path.exists() && !overwrite {
            warn!("Refusing to overwrite {}", path.display());
            return false;
        }

        let json = match serde_json::to_string_pretty(stored) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize document: {}", e);
                return false;
            }
        };
        match std::fs::write(path, json) {
            Ok(()) => {
                info!(
                    "Saved {} elements to {}",
                    stored.elements.len(),
                    path.display()
                );
                true
            }
            Err(e) => {
                warn!("Failed to write {}: {}", path.display(), e);
                false
            }
        }
    }

    fn close(&mut self, doc: DocumentHandle) {
        self.documents.remove(&doc);
        if self.documents.is_empty() {
            debug!("Dropping {} built geometry handles", self.geometry.len());
            self.geometry.clear();
        }
    }
}
