// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Convert stage: geometry forest -> target-ready forest

use crate::progress::{ProgressPlan, Stage, StageReporter, Step};
use crate::{Pipeline, StageFailure, StageReport};
use famforge_convert::ConvertContext;
use famforge_model::{ConversionOutcome, GeometryForest};
use log::debug;

impl Pipeline {
    /// Convert every node of `forest` in pre-order
    ///
    /// A node that fails is reported as a Warning and left unconverted; the
    /// outcome aggregates over all nodes. Cancellation is checked before each
    /// node; nodes converted before it keep their target geometry.
    pub fn convert(&mut self, forest: &mut GeometryForest) -> StageReport {
        let Pipeline {
            kernel,
            writer,
            registry,
            mapper,
            options,
            sink,
            cancel,
            ..
        } = self;
        let mut reporter = StageReporter::new(sink.as_ref(), Stage::Convert);
        let plan = ProgressPlan::convert();

        if forest.is_empty() {
            let outcome = reporter.fail(StageFailure::EmptyForest);
            return StageReport::new(Stage::Convert, outcome);
        }

        let ids = forest.iter_ids();
        let total = ids.len();
        let mut succeeded = 0;
        debug!(
            "{} of {} nodes carry a convertible payload",
            forest.convert_ready_count(),
            total
        );
        reporter.status(format!("Converting {} nodes", total), Some(0.0));

        for (index, id) in ids.into_iter().enumerate() {
            if cancel.is_cancelled() {
                debug!("Cancellation honored before node {} of {}", index + 1, total);
                let outcome = reporter.fail(StageFailure::Cancelled);
                return StageReport::new(Stage::Convert, outcome)
                    .with_counts(index, succeeded)
                    .with_warnings(reporter.warnings());
            }

            let Some(node) = forest.get_mut(id) else {
                continue;
            };
            if options.detailed_progress {
                reporter.status(format!("Converting '{}'", node.name), None);
            }

            let mut ctx = ConvertContext::new(options, kernel.as_ref(), writer.as_mut(), sink.as_ref());
            match registry.convert_node(node, &mut ctx) {
                Ok(()) => succeeded += 1,
                Err(e) => reporter.warning(format!("Node '{}' skipped: {}", node.name, e)),
            }
            node.parameters = mapper.normalize(&node.parameters, options);

            reporter.progress(plan.percent(Step::Items, index + 1, total));
        }

        let outcome = ConversionOutcome::aggregate(total, succeeded);
        let outcome = reporter.complete(
            outcome,
            format!("Converted {} of {} nodes", succeeded, total),
        );
        StageReport::new(Stage::Convert, outcome)
            .with_counts(total, succeeded)
            .with_warnings(reporter.warnings())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{mesh_node, pipeline_with_log};
    use famforge_model::{
        ConversionOptions, ConversionOutcome, ElementClass, GeometryForest, GeometryKind,
        GeometryNode, GeometryPayload, ParameterSet, ParameterValue, ProgressEvent,
    };
    use std::sync::Arc;

    #[test]
    fn test_empty_forest_is_invalid_input() {
        let (mut pipeline, log) = pipeline_with_log();
        let report = pipeline.convert(&mut GeometryForest::new());

        assert_eq!(report.outcome, ConversionOutcome::InvalidInput);
        assert_eq!(log.errors().len(), 1);
        assert_eq!(log.completions(), vec![false]);
    }

    #[test]
    fn test_unknown_node_gives_partial_success() {
        let (mut pipeline, log) = pipeline_with_log();
        let mut forest = GeometryForest::new();
        forest.add(mesh_node("n1"));
        forest.add(
            GeometryNode::new("n2", GeometryKind::Unknown, ElementClass::Other)
                .with_payload(GeometryPayload::new(vec![1u8])),
        );
        forest.add(
            GeometryNode::new("n3", GeometryKind::Brep, ElementClass::Wall)
                .with_payload(GeometryPayload::new(vec![2u8])),
        );

        let report = pipeline.convert(&mut forest);
        assert_eq!(report.outcome, ConversionOutcome::PartialSuccess);
        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);

        let warnings = log.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].to_lowercase().contains("unsupported geometry"));
        assert_eq!(forest.converted_count(), 2);
    }

    #[test]
    fn test_all_failing_is_failed() {
        let (mut pipeline, log) = pipeline_with_log();
        let mut forest = GeometryForest::new();
        forest.add(GeometryNode::new("no payload", GeometryKind::Mesh, ElementClass::Other));

        let report = pipeline.convert(&mut forest);
        assert_eq!(report.outcome, ConversionOutcome::Failed);
        assert_eq!(log.completions(), vec![false]);
    }

    #[test]
    fn test_cancellation_before_second_node() {
        let (pipeline, _log) = pipeline_with_log();
        let token = pipeline.cancellation_token();
        let log = Arc::new(famforge_model::EventLog::new());
        let recorder = log.clone();
        let cancel_after_first = token.clone();
        let sink = move |event: ProgressEvent| {
            if matches!(&event, ProgressEvent::ProgressChanged { percent } if *percent > 0.0) {
                cancel_after_first.cancel();
            }
            famforge_model::ProgressSink::emit(recorder.as_ref(), event);
        };
        let mut pipeline = pipeline
            .with_sink(Arc::new(sink))
            .with_options(ConversionOptions::default().with_detailed_progress(true));

        let mut forest = GeometryForest::new();
        for i in 1..=5 {
            forest.add(mesh_node(&format!("n{}", i)));
        }

        let report = pipeline.convert(&mut forest);
        assert_eq!(report.outcome, ConversionOutcome::Cancelled);
        assert_eq!(report.attempted, 1);
        assert_eq!(report.succeeded, 1);
        assert_eq!(forest.converted_count(), 1);

        let statuses: Vec<String> = log
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::StatusChanged { message, .. } => Some(message),
                _ => None,
            })
            .collect();
        assert!(statuses.iter().any(|m| m.contains("'n1'")));
        assert!(!statuses.iter().any(|m| m.contains("'n2'") || m.contains("'n3'")));
        assert!(log.errors().is_empty());
        assert_eq!(log.completions(), vec![false]);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_parameter_names_normalized() {
        let (mut pipeline, _log) = pipeline_with_log();
        let mut forest = GeometryForest::new();
        let id = forest.add(
            mesh_node("n1").with_parameters(ParameterSet::new().with("Area/Room", 12.0)),
        );

        pipeline.convert(&mut forest);
        let node = forest.get(id).unwrap();
        assert_eq!(node.parameters.get("Area_Room"), Some(&ParameterValue::Number(12.0)));
    }

    #[test]
    fn test_progress_monotonic_and_complete() {
        let (mut pipeline, log) = pipeline_with_log();
        let mut forest = GeometryForest::new();
        let root = forest.add(mesh_node("root"));
        forest.add_child(root, mesh_node("child")).unwrap();
        forest.add(mesh_node("second"));

        let report = pipeline.convert(&mut forest);
        assert_eq!(report.outcome, ConversionOutcome::Success);

        let percentages = log.percentages();
        assert!(percentages.windows(2).all(|w| w[0] <= w[1]));
        assert!(percentages.iter().all(|p| (0.0..=100.0).contains(p)));
        assert_eq!(percentages.last(), Some(&100.0));
        assert_eq!(log.completions(), vec![true]);
    }
}
