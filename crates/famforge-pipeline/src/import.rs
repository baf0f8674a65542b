// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import stage: target-native family document -> family definition

use crate::parse::{build_forest, mapped_parameters, ElementWalk};
use crate::pipeline::{dominant_category, file_stem};
use crate::progress::{ProgressPlan, Stage, StageReporter, Step};
use crate::{Pipeline, StageFailure, StageReport, StageResult};
use famforge_model::{ConversionOutcome, FamilyDefinition, GeometryForest, ParameterSet};
use log::{debug, info};
use std::path::Path;

impl Pipeline {
    /// Read a family document back into a [`FamilyDefinition`]
    ///
    /// Geometry comes back unconverted (payloads only). Instance parameters
    /// and type tables go through the same mapping and normalization as a
    /// parsed source, and types are rebuilt by the family type builder.
    pub fn import_family(&self, path: &Path) -> StageResult<FamilyDefinition> {
        let mut reporter = StageReporter::new(self.sink.as_ref(), Stage::Import);
        let plan = ProgressPlan::import();

        match self.import_document(path, &mut reporter, &plan) {
            Ok((family, attempted)) => {
                let created = family.geometry.len();
                let mut outcome = ConversionOutcome::Success;
                if reporter.warnings() > 0 {
                    outcome = outcome.degraded();
                }
                let message = format!(
                    "Imported family '{}' with {} types",
                    family.name,
                    family.types.len()
                );
                let outcome = reporter.complete(outcome, message);
                let report = StageReport::new(Stage::Import, outcome)
                    .with_counts(attempted, created)
                    .with_warnings(reporter.warnings());
                StageResult::new(family, report)
            }
            Err(failure) => {
                let outcome = reporter.fail(failure);
                StageResult::empty(
                    StageReport::new(Stage::Import, outcome).with_warnings(reporter.warnings()),
                )
            }
        }
    }

    fn import_document(
        &self,
        path: &Path,
        reporter: &mut StageReporter<'_>,
        plan: &ProgressPlan,
    ) -> Result<(FamilyDefinition, usize), StageFailure> {
        let Some(reader) = self.family_reader.as_ref() else {
            return Err(StageFailure::NoReader("family"));
        };
        if !path.exists() {
            return Err(StageFailure::MissingInput(path.to_path_buf()));
        }
        reporter.status(
            format!("Opening family {}", path.display()),
            Some(plan.start_of(Step::Open)),
        );
        if !reader.can_read(path) {
            return Err(StageFailure::UnreadableInput(path.to_path_buf()));
        }
        let source = reader.open_family(path).map_err(|source| StageFailure::Open {
            path: path.to_path_buf(),
            source,
        })?;
        reporter.progress(plan.end_of(Step::Open));
        self.check_cancelled()?;

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
        let attempted = walk.visited - walk.hidden;
        self.check_cancelled()?;

        reporter.status(
            "Reading parameters and types",
            Some(plan.start_of(Step::ParametersAndTypes)),
        );
        let parameters = mapped_parameters(&self.mapper, &source.parameters, reporter);
        let tables: Vec<ParameterSet> = source
            .type_tables
            .iter()
            .map(|table| {
                let mapped = mapped_parameters(&self.mapper, table, reporter);
                self.mapper.normalize(&mapped, &self.options)
            })
            .collect();
        let types = self.type_builder.build(&tables);
        debug!("Rebuilt {} types from {} tables", types.len(), tables.len());

        let name = source
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| file_stem(path))
            .unwrap_or_default();
        let category = match source.category.filter(|c| !c.trim().is_empty()) {
            Some(category) => category,
            None if self.options.auto_determine_family_type => dominant_category(&forest)
                .unwrap_or_default()
                .to_string(),
            None => String::new(),
        };

        let mut family = FamilyDefinition::new(name, category)
            .with_parameters(self.mapper.normalize(&parameters, &self.options))
            .with_types(types)
            .with_geometry(forest);
        if !family.is_valid() {
            let missing = if family.name.trim().is_empty() {
                "name is empty"
            } else {
                "category is empty"
            };
            return Err(StageFailure::invalid_family(missing));
        }
        family.output_path = Some(path.to_path_buf());
        reporter.progress(plan.end_of(Step::ParametersAndTypes));
        info!("Imported family '{}' from {}", family.name, path.display());
        Ok((family, attempted))
    }

    fn check_cancelled(&self) -> Result<(), StageFailure> {
        if self.cancel.is_cancelled() {
            Err(StageFailure::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mesh_node, pipeline_with_log};
    use famforge_interchange::{JsonDocumentWriter, JsonSourceReader, PassthroughKernel};
    use famforge_model::{
        ElementClass, GeometryKind, GeometryNode, GeometryPayload, ParameterValue, TypeVariant,
        TYPE_NAME_KEY,
    };
    use std::sync::Arc;

    /// Generate a chair family at `path` with two types
    fn generate_chair(path: &Path) {
        let (pipeline, _log) = pipeline_with_log();
        let options = pipeline.options().clone().with_output_path(path);
        let mut pipeline = pipeline.with_options(options);

        let mut forest = GeometryForest::new();
        let seat = forest.add(
            GeometryNode::new("Seat", GeometryKind::Mesh, ElementClass::Furniture)
                .with_payload(GeometryPayload::new(vec![1u8, 2, 3])),
        );
        forest.add_child(seat, mesh_node("Leg")).unwrap();
        pipeline.convert(&mut forest);

        let mut family = FamilyDefinition::new("Chair", "Furniture")
            .with_geometry(forest)
            .with_parameters(ParameterSet::new().with("Material", "Oak"))
            .with_types(vec![
                TypeVariant::new("Small", ParameterSet::new().with("Width", 0.4)),
                TypeVariant::new("Large", ParameterSet::new().with("Width", 0.6)),
            ]);
        let result = pipeline.generate_family(&mut family);
        assert!(result.outcome().is_success());
    }

    #[test]
    fn test_generated_family_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Chair.ffam");
        generate_chair(&path);

        let (pipeline, log) = pipeline_with_log();
        let result = pipeline.import_family(&path);
        assert_eq!(result.outcome(), ConversionOutcome::Success);
        assert_eq!(log.completions(), vec![true]);

        let family = result.output.unwrap();
        assert_eq!(family.name, "Chair");
        assert_eq!(family.category, "Furniture");
        assert_eq!(family.geometry.len(), 2);
        let roots = family.geometry.roots();
        assert_eq!(roots.len(), 1);
        assert_eq!(family.geometry.get(roots[0]).unwrap().name, "Seat");
        let leg = family.geometry.children(roots[0])[0];
        assert_eq!(family.geometry.get(leg).unwrap().name, "Leg");
        assert_eq!(family.geometry.parent(leg), Some(roots[0]));
        assert_eq!(
            family.parameters.get("Material"),
            Some(&ParameterValue::Text("Oak".into()))
        );
        let names: Vec<_> = family.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Small", "Large"]);
        assert_eq!(
            family.type_variant("Large").unwrap().parameters.get("Width"),
            Some(&ParameterValue::Number(0.6))
        );
        assert!(!family.types[0].parameters.contains(TYPE_NAME_KEY));
        assert_eq!(family.output_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_no_family_reader() {
        let log = Arc::new(famforge_model::EventLog::new());
        let pipeline = Pipeline::new(
            Arc::new(JsonSourceReader::new()),
            Arc::new(PassthroughKernel::new()),
            Box::new(JsonDocumentWriter::new()),
        )
        .with_sink(log.clone());

        let result = pipeline.import_family(Path::new("Chair.ffam"));
        assert_eq!(result.outcome(), ConversionOutcome::TargetSystemError);
        assert_eq!(log.errors().len(), 1);
        assert_eq!(log.completions(), vec![false]);
    }

    #[test]
    fn test_missing_and_unreadable_inputs() {
        let (pipeline, _log) = pipeline_with_log();
        let result = pipeline.import_family(Path::new("/no/such/Chair.ffam"));
        assert_eq!(result.outcome(), ConversionOutcome::InvalidInput);

        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("site.fproj");
        std::fs::write(&project, "{}").unwrap();
        let result = pipeline.import_family(&project);
        assert_eq!(result.outcome(), ConversionOutcome::InvalidInput);
        assert!(result.output.is_none());
    }

    #[test]
    fn test_corrupt_family_is_target_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Broken.ffam");
        std::fs::write(&path, r#"{"format": "something-else"}"#).unwrap();

        let (pipeline, log) = pipeline_with_log();
        let result = pipeline.import_family(&path);
        assert_eq!(result.outcome(), ConversionOutcome::TargetSystemError);
        assert_eq!(log.errors().len(), 1);
    }

    #[test]
    fn test_cancelled_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Chair.ffam");
        generate_chair(&path);

        let (pipeline, log) = pipeline_with_log();
        pipeline.cancellation_token().cancel();
        let result = pipeline.import_family(&path);
        assert_eq!(result.outcome(), ConversionOutcome::Cancelled);
        assert!(log.errors().is_empty());
        assert_eq!(log.completions(), vec![false]);
    }
}
