// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry Converters - Implementations per representation kind
//!
//! Each converter validates its input, runs the kernel steps the options ask
//! for, and hands construction to the target writer.

use crate::{ConvertContext, Error, GeometryConverter, Result};
use famforge_model::{GeometryKind, GeometryNode, GeometryPayload, TargetGeometry};
use log::debug;

/// Check payload presence and kind before any collaborator is called
fn validated_payload<'n>(
    node: &'n GeometryNode,
    converter: &'static str,
    expected: GeometryKind,
) -> Result<&'n GeometryPayload> {
    let payload = node
        .payload
        .as_ref()
        .ok_or_else(|| Error::missing_payload(&node.name))?;
    if node.kind != expected {
        return Err(Error::KindMismatch {
            converter,
            kind: node.kind,
        });
    }
    Ok(payload)
}

/// Attach kernel-computed bounds and centroid to built geometry
fn describe(
    ctx: &ConvertContext<'_>,
    target: TargetGeometry,
    payload: &GeometryPayload,
) -> TargetGeometry {
    let kind = target.kind;
    target
        .with_bounds(ctx.kernel.compute_bounds(payload, kind))
        .with_centroid(ctx.kernel.compute_centroid(payload, kind))
}

/// BRep converter
///
/// Cleans the BRep when vertex merging is requested and builds it natively.
/// When the writer refuses the BRep, the kernel tessellates it and the mesh is
/// built instead (with a warning).
#[derive(Clone, Copy, Debug, Default)]
pub struct BrepConverter;

impl BrepConverter {
    /// Create new converter
    pub fn new() -> Self {
        Self
    }
}

impl GeometryConverter for BrepConverter {
    fn name(&self) -> &'static str {
        "Brep"
    }

    fn can_convert(&self, kind: GeometryKind) -> bool {
        kind == GeometryKind::Brep
    }

    fn convert(&self, node: &GeometryNode, ctx: &mut ConvertContext<'_>) -> Result<TargetGeometry> {
        let payload = validated_payload(node, self.name(), GeometryKind::Brep)?;
        let tolerance = ctx.options.effective_tolerance();

        let cleaned = if ctx.options.merge_coincident_vertices {
            ctx.kernel
                .cleanup(payload, GeometryKind::Brep, tolerance)
                .map_err(Error::Kernel)?
        } else {
            payload.clone()
        };

        match ctx.writer.build_geometry(GeometryKind::Brep, &cleaned) {
            Ok(handle) => {
                let target = TargetGeometry::new(handle, GeometryKind::Brep);
                Ok(describe(ctx, target, &cleaned))
            }
            Err(rejection) => {
                ctx.warn(format!(
                    "Node '{}': BRep rejected by target ({}), falling back to tessellated mesh",
                    node.name, rejection
                ));
                let mesh = ctx
                    .kernel
                    .tessellate(&cleaned, tolerance)
                    .map_err(Error::Kernel)?;
                let handle = ctx
                    .writer
                    .build_geometry(GeometryKind::Mesh, &mesh)
                    .map_err(Error::Writer)?;
                let target = TargetGeometry::new(handle, GeometryKind::Mesh);
                Ok(describe(ctx, target, &mesh))
            }
        }
    }
}

/// Mesh converter
///
/// Welds coincident vertices and simplifies when requested, then builds the
/// mesh on the target side.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeshConverter;

impl MeshConverter {
    /// Create new converter
    pub fn new() -> Self {
        Self
    }
}

impl GeometryConverter for MeshConverter {
    fn name(&self) -> &'static str {
        "Mesh"
    }

    fn can_convert(&self, kind: GeometryKind) -> bool {
        kind == GeometryKind::Mesh
    }

    fn convert(&self, node: &GeometryNode, ctx: &mut ConvertContext<'_>) -> Result<TargetGeometry> {
        let payload = validated_payload(node, self.name(), GeometryKind::Mesh)?;
        let tolerance = ctx.options.effective_tolerance();
        let mut mesh = payload.clone();

        if ctx.options.merge_coincident_vertices {
            mesh = ctx
                .kernel
                .cleanup(&mesh, GeometryKind::Mesh, tolerance)
                .map_err(Error::Kernel)?;
        }

        if ctx.options.simplify_meshes {
            let before = mesh.len();
            mesh = ctx
                .kernel
                .simplify(&mesh, tolerance)
                .map_err(Error::Kernel)?;
            debug!(
                "Simplified mesh of '{}': {} -> {} bytes",
                node.name,
                before,
                mesh.len()
            );
        }

        let handle = ctx
            .writer
            .build_geometry(GeometryKind::Mesh, &mesh)
            .map_err(Error::Writer)?;
        let target = TargetGeometry::new(handle, GeometryKind::Mesh);
        Ok(describe(ctx, target, &mesh))
    }
}
