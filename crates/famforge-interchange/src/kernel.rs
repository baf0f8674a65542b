// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pass-through geometry kernel
//!
//! Performs no geometric computation: every payload operation returns its
//! input and bounds are not computable. Useful when the target writer accepts
//! payloads as they come.

use famforge_model::{
    BoundingBox, CollaboratorError, CollaboratorResult, GeometryKernel, GeometryKind,
    GeometryPayload, Point3,
};

/// Kernel that hands payloads back unchanged
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughKernel;

impl PassthroughKernel {
    /// Create new kernel
    pub fn new() -> Self {
        Self
    }
}

impl GeometryKernel for PassthroughKernel {
    fn cleanup(
        &self,
        payload: &GeometryPayload,
        _kind: GeometryKind,
        _tolerance: f64,
    ) -> CollaboratorResult<GeometryPayload> {
        Ok(payload.clone())
    }

    fn simplify(
        &self,
        payload: &GeometryPayload,
        _tolerance: f64,
    ) -> CollaboratorResult<GeometryPayload> {
        Ok(payload.clone())
    }

    fn tessellate(
        &self,
        payload: &GeometryPayload,
        _tolerance: f64,
    ) -> CollaboratorResult<GeometryPayload> {
        if payload.is_empty() {
            return Err(CollaboratorError::kernel("cannot tessellate an empty payload"));
        }
        Ok(payload.clone())
    }

    fn compute_bounds(&self, _payload: &GeometryPayload, _kind: GeometryKind) -> Option<BoundingBox> {
        None
    }

    fn compute_centroid(&self, _payload: &GeometryPayload, _kind: GeometryKind) -> Option<Point3<f64>> {
        None
    }
}
