// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared fixtures for stage tests

use crate::Pipeline;
use famforge_interchange::{
    JsonDocumentWriter, JsonFamilyReader, JsonSourceReader, PassthroughKernel, StoredDocument,
};
use famforge_model::{ElementClass, EventLog, GeometryKind, GeometryNode, GeometryPayload};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Pipeline over the JSON collaborators with a recording sink
pub fn pipeline_with_log() -> (Pipeline, Arc<EventLog>) {
    pipeline_with_writer(JsonDocumentWriter::new())
}

/// Same, with a specific writer
pub fn pipeline_with_writer(writer: JsonDocumentWriter) -> (Pipeline, Arc<EventLog>) {
    let log = Arc::new(EventLog::new());
    let pipeline = Pipeline::new(
        Arc::new(JsonSourceReader::new()),
        Arc::new(PassthroughKernel::new()),
        Box::new(writer),
    )
    .with_family_reader(Arc::new(JsonFamilyReader::new()))
    .with_sink(log.clone());
    (pipeline, log)
}

/// Mesh node with a small payload
pub fn mesh_node(name: &str) -> GeometryNode {
    GeometryNode::new(name, GeometryKind::Mesh, ElementClass::GenericModel)
        .with_payload(GeometryPayload::new(name.as_bytes().to_vec()))
}

/// Write a source file; the format header is added
pub fn write_source(dir: &Path, mut body: serde_json::Value) -> PathBuf {
    body["format"] = serde_json::Value::from("famforge-source");
    let path = dir.join("model.ffsrc.json");
    std::fs::write(&path, body.to_string()).unwrap();
    path
}

/// Read back a saved document
pub fn read_saved(path: &Path) -> StoredDocument {
    StoredDocument::from_json(&std::fs::read_to_string(path).unwrap()).unwrap()
}
