// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recording collaborators for converter tests

use famforge_model::{
    BoundingBox, CollaboratorError, CollaboratorResult, ConstructionStrategy, DocumentHandle,
    DocumentKind, ElementClass, ElementHandle, GeometryHandle, GeometryKernel, GeometryKind,
    GeometryPayload, ParameterValue, Point3, TargetDocumentWriter, TargetGeometry, TemplateRef,
    TypeVariant,
};
use parking_lot::Mutex;
use std::path::Path;

/// Kernel that records which operations ran
#[derive(Debug, Default)]
pub struct StubKernel {
    pub fail: bool,
    pub(crate) calls: Mutex<Vec<&'static str>>,
}

impl StubKernel {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    fn record(
        &self,
        call: &'static str,
        payload: &GeometryPayload,
    ) -> CollaboratorResult<GeometryPayload> {
        self.calls.lock().push(call);
        if self.fail {
            Err(CollaboratorError::kernel(format!("{} failed", call)))
        } else {
            Ok(payload.clone())
        }
    }
}

impl GeometryKernel for StubKernel {
    fn cleanup(
        &self,
        payload: &GeometryPayload,
        _kind: GeometryKind,
        _tolerance: f64,
    ) -> CollaboratorResult<GeometryPayload> {
        self.record("cleanup", payload)
    }

    fn simplify(
        &self,
        payload: &GeometryPayload,
        _tolerance: f64,
    ) -> CollaboratorResult<GeometryPayload> {
        self.record("simplify", payload)
    }

    fn tessellate(
        &self,
        payload: &GeometryPayload,
        _tolerance: f64,
    ) -> CollaboratorResult<GeometryPayload> {
        self.record("tessellate", payload)
    }

    fn compute_bounds(&self, payload: &GeometryPayload, _kind: GeometryKind) -> Option<BoundingBox> {
        let extent = payload.len() as f64;
        Some(BoundingBox::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(extent, extent, extent),
        ))
    }

    fn compute_centroid(&self, payload: &GeometryPayload, _kind: GeometryKind) -> Option<Point3<f64>> {
        let half = payload.len() as f64 / 2.0;
        Some(Point3::new(half, half, half))
    }
}

/// Writer that records built geometry kinds
#[derive(Debug, Default)]
pub struct StubWriter {
    pub reject_brep: bool,
    pub built: Vec<GeometryKind>,
}

impl TargetDocumentWriter for StubWriter {
    fn output_extension(&self, _kind: DocumentKind) -> &str {
        "stub"
    }

    fn create_document(
        &mut self,
        _kind: DocumentKind,
        _template: Option<&TemplateRef>,
        _target_version: &str,
    ) -> CollaboratorResult<DocumentHandle> {
        Ok(DocumentHandle(1))
    }

    fn build_geometry(
        &mut self,
        kind: GeometryKind,
        _payload: &GeometryPayload,
    ) -> CollaboratorResult<GeometryHandle> {
        if kind == GeometryKind::Brep && self.reject_brep {
            return Err(CollaboratorError::rejected("BRep not supported"));
        }
        self.built.push(kind);
        Ok(GeometryHandle(self.built.len() as u64))
    }

    fn create_element(
        &mut self,
        _doc: DocumentHandle,
        _host: Option<ElementHandle>,
        _strategy: ConstructionStrategy,
        _class: ElementClass,
        _name: &str,
        geometry: &TargetGeometry,
    ) -> CollaboratorResult<ElementHandle> {
        Ok(ElementHandle(geometry.handle.0))
    }

    fn set_parameter(
        &mut self,
        _doc: DocumentHandle,
        _element: ElementHandle,
        _name: &str,
        _value: &ParameterValue,
    ) -> bool {
        true
    }

    fn add_family_parameter(
        &mut self,
        _doc: DocumentHandle,
        _name: &str,
        _value: &ParameterValue,
    ) -> bool {
        true
    }

    fn add_family_type(&mut self, _doc: DocumentHandle, _variant: &TypeVariant) -> bool {
        true
    }

    fn save(&mut self, _doc: DocumentHandle, _path: &Path, _overwrite: bool) -> bool {
        true
    }
}
