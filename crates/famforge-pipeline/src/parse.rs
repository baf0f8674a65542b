// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parse stage: source file -> geometry forest

use crate::progress::{ProgressPlan, Stage, StageReporter, Step};
use crate::{ParameterMapper, ParsedDocument, Pipeline, StageFailure, StageReport, StageResult};
use famforge_model::{
    ConversionOptions, ConversionOutcome, GeometryForest, GeometryNode, NodeId, ParameterSet,
    SourceElement, SourceParameter,
};
use log::debug;
use std::path::Path;

/// Item counters shared while walking a source element tree
pub(crate) struct ElementWalk<'r, 'a> {
    pub reporter: &'r mut StageReporter<'a>,
    pub plan: &'r ProgressPlan,
    pub total: usize,
    pub visited: usize,
    pub created: usize,
    pub hidden: usize,
}

impl ElementWalk<'_, '_> {
    fn advance(&mut self, elements: usize) {
        self.visited += elements;
        let percent = self.plan.percent(Step::Items, self.visited, self.total);
        self.reporter.progress(percent);
    }
}

/// Build forest nodes for `elements` (and their children) under `parent`
pub(crate) fn build_forest(
    mapper: &ParameterMapper,
    options: &ConversionOptions,
    forest: &mut GeometryForest,
    parent: Option<NodeId>,
    elements: &[SourceElement],
    walk: &mut ElementWalk<'_, '_>,
) -> Result<(), StageFailure> {
    for element in elements {
        if element.hidden && !options.include_hidden_geometry {
            let skipped = element.element_count();
            debug!("Skipping hidden element '{}' ({} elements)", element.name, skipped);
            walk.hidden += skipped;
            walk.advance(skipped);
            continue;
        }

        let parameters = mapped_parameters(mapper, &element.parameters, walk.reporter);
        let mut node = GeometryNode::new(element.name.clone(), element.kind, element.class)
            .with_parameters(parameters);
        node.payload = element.payload.clone();

        let id = match parent {
            Some(parent) => forest.add_child(parent, node)?,
            None => forest.add(node),
        };
        walk.created += 1;
        walk.advance(1);

        build_forest(mapper, options, forest, Some(id), &element.children, walk)?;
    }
    Ok(())
}

/// Map source parameter values, reporting every coercion fallback
pub(crate) fn mapped_parameters(
    mapper: &ParameterMapper,
    parameters: &[SourceParameter],
    reporter: &mut StageReporter<'_>,
) -> ParameterSet {
    let (set, fallbacks) = mapper.map_source_parameters(parameters);
    for message in fallbacks {
        reporter.warning(message);
    }
    set
}

impl Pipeline {
    /// Parse a source file into a geometry forest
    ///
    /// Missing or unreadable inputs are `InvalidInput`; a reader that cannot
    /// open the document is `TargetSystemError`. Value coercion fallbacks are
    /// warnings and make the outcome `PartialSuccess`.
    pub fn parse(&self, path: &Path) -> StageResult<ParsedDocument> {
        let mut reporter = StageReporter::new(self.sink.as_ref(), Stage::Parse);
        let plan = ProgressPlan::parse();

        match self.parse_document(path, &mut reporter, &plan) {
            Ok((document, attempted)) => {
                let created = document.forest.len();
                let mut outcome = ConversionOutcome::Success;
                if reporter.warnings() > 0 {
                    outcome = outcome.degraded();
                }
                let message = format!("Parsed {} elements from {}", created, path.display());
                let outcome = reporter.complete(outcome, message);
                let report = StageReport::new(Stage::Parse, outcome)
                    .with_counts(attempted, created)
                    .with_warnings(reporter.warnings());
                StageResult::new(document, report)
            }
            Err(failure) => {
                let outcome = reporter.fail(failure);
                StageResult::empty(
                    StageReport::new(Stage::Parse, outcome).with_warnings(reporter.warnings()),
                )
            }
        }
    }

    fn parse_document(
        &self,
        path: &Path,
        reporter: &mut StageReporter<'_>,
        plan: &ProgressPlan,
    ) -> Result<(ParsedDocument, usize), StageFailure> {
        if !path.exists() {
            return Err(StageFailure::MissingInput(path.to_path_buf()));
        }
        reporter.status(
            format!("Reading {}", path.display()),
            Some(plan.start_of(Step::Open)),
        );
        if !self.reader.can_read(path) {
            return Err(StageFailure::UnreadableInput(path.to_path_buf()));
        }
        let source = self.reader.open(path).map_err(|source| StageFailure::Open {
            path: path.to_path_buf(),
            source,
        })?;
        reporter.progress(plan.end_of(Step::Open));

        let mut forest = GeometryForest::new();
        let mut walk = ElementWalk {
            reporter: &mut *reporter,
            plan,
            total: source.element_count(),
            visited: 0,
            created: 0,
            hidden: 0,
        };
        build_forest(
            &self.mapper,
            &self.options,
            &mut forest,
            None,
            &source.elements,
            &mut walk,
        )?;
        let (attempted, hidden) = (walk.visited - walk.hidden, walk.hidden);
        if hidden > 0 {
            debug!("Skipped {} hidden elements", hidden);
        }

        let parameters = mapped_parameters(&self.mapper, &source.parameters, reporter);
        let type_tables = source
            .type_tables
            .iter()
            .map(|table| mapped_parameters(&self.mapper, table, reporter))
            .collect();

        let document = ParsedDocument {
            name: source.name,
            category: source.category,
            forest,
            parameters,
            type_tables,
        };
        Ok((document, attempted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{pipeline_with_log, write_source};
    use famforge_model::{ElementClass, GeometryKind, ParameterValue, ProgressEvent};
    use serde_json::json;

    #[test]
    fn test_nonexistent_path_is_invalid_input() {
        let (pipeline, log) = pipeline_with_log();
        let result = pipeline.parse(Path::new("/no/such/model.ffsrc.json"));

        assert!(result.output.is_none());
        assert_eq!(result.outcome(), ConversionOutcome::InvalidInput);
        assert_eq!(log.errors().len(), 1);
        assert_eq!(log.completions(), vec![false]);
    }

    #[test]
    fn test_wrong_extension_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.txt");
        std::fs::write(&path, "{}").unwrap();

        let (pipeline, log) = pipeline_with_log();
        let result = pipeline.parse(&path);
        assert_eq!(result.outcome(), ConversionOutcome::InvalidInput);
        assert_eq!(log.completions(), vec![false]);
    }

    #[test]
    fn test_unopenable_document_is_target_system_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, r#"{"format": "not-famforge"}"#).unwrap();

        let (pipeline, log) = pipeline_with_log();
        let result = pipeline.parse(&path);
        assert_eq!(result.outcome(), ConversionOutcome::TargetSystemError);

        let errors: Vec<_> = log
            .events()
            .into_iter()
            .filter(|e| matches!(e, ProgressEvent::Error { cause: Some(_), .. }))
            .collect();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_builds_hierarchy_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(
            dir.path(),
            json!({
                "name": "Table",
                "elements": [
                    {"name": "Top", "kind": "brep", "class": "furniture", "payload": "AQID",
                     "parameters": [{"name": "Layer", "value": {"text": "Wood"}}],
                     "children": [{"name": "Leg", "kind": "mesh", "class": "furniture", "payload": "BAU="}]},
                    {"name": "Guide", "kind": "mesh", "hidden": true, "payload": "AQ==",
                     "children": [{"name": "Guide child", "kind": "mesh", "payload": "AQ=="}]}
                ]
            }),
        );

        let (pipeline, log) = pipeline_with_log();
        let result = pipeline.parse(&path);
        assert_eq!(result.outcome(), ConversionOutcome::Success);
        assert_eq!(result.report.attempted, 2);

        let document = result.output.unwrap();
        assert_eq!(document.name.as_deref(), Some("Table"));
        assert_eq!(document.forest.len(), 2);

        let top = document.forest.find_by_name("Top").unwrap();
        let leg = document.forest.find_by_name("Leg").unwrap();
        assert_eq!(document.forest.parent(leg), Some(top));
        let top = document.forest.get(top).unwrap();
        assert_eq!(top.kind, GeometryKind::Brep);
        assert_eq!(top.class, ElementClass::Furniture);
        assert_eq!(top.parameters.get("Layer"), Some(&ParameterValue::Text("Wood".into())));

        let percentages = log.percentages();
        assert!(percentages.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(percentages.last(), Some(&100.0));
        assert_eq!(log.completions(), vec![true]);
    }

    #[test]
    fn test_hidden_included_on_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(
            dir.path(),
            json!({"elements": [{"name": "Guide", "kind": "mesh", "hidden": true, "payload": "AQ=="}]}),
        );

        let (pipeline, _log) = pipeline_with_log();
        let pipeline =
            pipeline.with_options(ConversionOptions::default().with_hidden_geometry(true));
        let document = pipeline.parse(&path).output.unwrap();
        assert_eq!(document.forest.len(), 1);
    }

    #[test]
    fn test_coercion_fallback_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(
            dir.path(),
            json!({
                "elements": [{"name": "Wall", "kind": "brep", "class": "wall", "payload": "AQ==",
                    "parameters": [
                        {"name": "Height", "value": {"text": "tall"}, "declared": "length"},
                        {"name": "Built", "value": {"date": "2021-06-01"}}
                    ]}],
                "type_tables": [[{"name": "Type Name", "value": {"text": "Thick"}}]]
            }),
        );

        let (pipeline, log) = pipeline_with_log();
        let result = pipeline.parse(&path);
        assert_eq!(result.outcome(), ConversionOutcome::PartialSuccess);
        assert_eq!(log.warnings().len(), 1);

        let document = result.output.unwrap();
        let wall = document.forest.iter().next().unwrap();
        assert_eq!(wall.parameters.get("Height"), Some(&ParameterValue::Number(0.0)));
        assert_eq!(
            wall.parameters.get("Built"),
            Some(&ParameterValue::Text("2021-06-01".into()))
        );
        assert_eq!(document.type_tables.len(), 1);
        assert_eq!(log.completions(), vec![true]);
    }
}
