// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Generate stage: converted forest or family -> saved target document
//!
//! Sub-steps and their share of the progress range:
//! document creation 10, element placement 60, parameters/types 20, save 10.

use crate::pipeline::dominant_category;
use crate::progress::{ProgressPlan, Stage, StageReporter, Step};
use crate::{FamilyTypeBuilder, Pipeline, StageFailure, StageReport, StageResult};
use famforge_model::{
    CancellationToken, ConstructionStrategy, ConversionOptions, ConversionOutcome, DocumentHandle,
    DocumentKind, ElementClass, ElementHandle, EmptyGeometryPolicy, FamilyDefinition,
    GeometryForest, GeometryNode, NodeId, TargetDocumentWriter, TemplateRef,
};
use log::{debug, info};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// What a Generate invocation produces
enum Target<'f> {
    Project(&'f GeometryForest),
    Family(&'f mut FamilyDefinition),
}

impl Target<'_> {
    fn kind(&self) -> DocumentKind {
        match self {
            Target::Project(_) => DocumentKind::Project,
            Target::Family(_) => DocumentKind::Family,
        }
    }

    fn forest(&self) -> &GeometryForest {
        match self {
            Target::Project(forest) => forest,
            Target::Family(family) => &family.geometry,
        }
    }

    fn has_geometry(&self) -> bool {
        match self {
            Target::Project(forest) => !forest.is_empty(),
            Target::Family(family) => family.has_geometry(),
        }
    }

    /// The family's own template wins over the configured one
    fn template<'t>(&'t self, options: &'t ConversionOptions) -> Option<&'t TemplateRef> {
        match self {
            Target::Project(_) => options.template.as_ref(),
            Target::Family(family) => family.template.as_ref().or(options.template.as_ref()),
        }
    }
}

/// Counters of one Generate invocation
#[derive(Default)]
struct Placement {
    attempted: usize,
    placed: usize,
    degraded: bool,
    /// Element created for each placed node, hosts for its descendants
    elements: FxHashMap<NodeId, ElementHandle>,
}

/// Borrowed state of one Generate invocation
struct Generation<'p, 'r, 'a> {
    writer: &'p mut dyn TargetDocumentWriter,
    options: &'p ConversionOptions,
    cancel: &'p CancellationToken,
    type_builder: &'p FamilyTypeBuilder,
    reporter: &'r mut StageReporter<'a>,
    plan: ProgressPlan,
    placement: Placement,
}

impl Pipeline {
    /// Generate a project document from a converted forest
    pub fn generate(&mut self, forest: &GeometryForest) -> StageResult<PathBuf> {
        self.run_generation(Target::Project(forest))
    }

    /// Generate a family document
    ///
    /// Fills in the category from the geometry when it is empty and
    /// auto-determination is enabled, and records the output path on success.
    pub fn generate_family(&mut self, family: &mut FamilyDefinition) -> StageResult<PathBuf> {
        self.run_generation(Target::Family(family))
    }

    fn run_generation(&mut self, mut target: Target<'_>) -> StageResult<PathBuf> {
        let Pipeline {
            writer,
            type_builder,
            options,
            sink,
            cancel,
            ..
        } = self;
        let mut reporter = StageReporter::new(sink.as_ref(), Stage::Generate);
        let mut generation = Generation {
            writer: writer.as_mut(),
            options,
            cancel,
            type_builder,
            reporter: &mut reporter,
            plan: ProgressPlan::generate(),
            placement: Placement::default(),
        };

        let result = generation.run(&mut target);
        let Placement {
            attempted,
            placed,
            degraded,
            ..
        } = generation.placement;

        match result {
            Ok(Some(path)) => {
                let mut outcome = if attempted == 0 {
                    ConversionOutcome::PartialSuccess
                } else {
                    ConversionOutcome::aggregate(attempted, placed)
                };
                if degraded {
                    outcome = outcome.degraded();
                }
                let outcome = reporter.complete(
                    outcome,
                    format!("Saved {} elements to {}", placed, path.display()),
                );
                let report = StageReport::new(Stage::Generate, outcome)
                    .with_counts(attempted, placed)
                    .with_warnings(reporter.warnings());
                StageResult::new(path, report)
            }
            Ok(None) => {
                let outcome = reporter.complete(
                    ConversionOutcome::Failed,
                    format!("None of {} elements could be placed", attempted),
                );
                StageResult::empty(
                    StageReport::new(Stage::Generate, outcome)
                        .with_counts(attempted, placed)
                        .with_warnings(reporter.warnings()),
                )
            }
            Err(failure) => {
                let outcome = reporter.fail(failure);
                StageResult::empty(
                    StageReport::new(Stage::Generate, outcome)
                        .with_counts(attempted, placed)
                        .with_warnings(reporter.warnings()),
                )
            }
        }
    }
}

impl Generation<'_, '_, '_> {
    /// Returns the saved path, or `None` when nothing could be placed
    fn run(&mut self, target: &mut Target<'_>) -> Result<Option<PathBuf>, StageFailure> {
        if let Target::Family(family) = target {
            self.prepare_family(family)?;
        }

        if !target.has_geometry() {
            match self.options.empty_geometry {
                EmptyGeometryPolicy::Reject => return Err(StageFailure::EmptyGeometry),
                EmptyGeometryPolicy::Allow => {
                    self.reporter
                        .warning("No geometry to place; generating an empty document");
                }
            }
        }

        let path = self.output_path(target.kind());
        self.check_cancelled()?;
        if !self.writer.is_available() {
            return Err(StageFailure::Unavailable);
        }

        self.reporter.status(
            "Creating target document",
            Some(self.plan.start_of(Step::CreateDocument)),
        );
        let template = target.template(self.options);
        let doc = self
            .writer
            .create_document(target.kind(), template, &self.options.target_version)
            .map_err(StageFailure::CreateDocument)?;
        self.reporter.progress(self.plan.end_of(Step::CreateDocument));

        let result = self.fill_and_save(doc, target, &path);
        self.writer.close(doc);

        let saved = result?;
        if saved {
            if let Target::Family(family) = target {
                family.output_path = Some(path.clone());
            }
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }

    fn fill_and_save(
        &mut self,
        doc: DocumentHandle,
        target: &Target<'_>,
        path: &Path,
    ) -> Result<bool, StageFailure> {
        self.place_elements(doc, target.forest())?;
        if self.placement.attempted > 0 && self.placement.placed == 0 {
            return Ok(false);
        }

        if let Target::Family(family) = target {
            self.write_family(doc, family)?;
        }
        self.reporter
            .progress(self.plan.end_of(Step::ParametersAndTypes));

        self.check_cancelled()?;
        self.reporter.status(
            format!("Saving {}", path.display()),
            Some(self.plan.start_of(Step::Save)),
        );
        if !self.writer.save(doc, path, self.options.overwrite) {
            return Err(StageFailure::Save(path.to_path_buf()));
        }
        info!("Generated {}", path.display());
        Ok(true)
    }

    fn prepare_family(&mut self, family: &mut FamilyDefinition) -> Result<(), StageFailure> {
        if family.category.trim().is_empty() && self.options.auto_determine_family_type {
            let category = dominant_category(&family.geometry)
                .unwrap_or(ElementClass::GenericModel.category_name());
            debug!("Family '{}' categorized as {}", family.name, category);
            family.category = category.to_string();
        }
        if family.template.is_none() {
            family.template = self.options.template.clone();
        }
        if !family.is_valid() {
            let missing = if family.name.trim().is_empty() {
                "name is empty"
            } else {
                "category is empty"
            };
            return Err(StageFailure::invalid_family(missing));
        }
        Ok(())
    }

    fn output_path(&self, kind: DocumentKind) -> PathBuf {
        match &self.options.output_path {
            Some(path) => path.clone(),
            None => std::env::temp_dir().join(format!(
                "famforge-{}.{}",
                Uuid::new_v4(),
                self.writer.output_extension(kind)
            )),
        }
    }

    fn check_cancelled(&self) -> Result<(), StageFailure> {
        if self.cancel.is_cancelled() {
            Err(StageFailure::Cancelled)
        } else {
            Ok(())
        }
    }

    fn place_elements(
        &mut self,
        doc: DocumentHandle,
        forest: &GeometryForest,
    ) -> Result<(), StageFailure> {
        let ids = forest.iter_ids();
        let total = ids.len();

        for (index, id) in ids.into_iter().enumerate() {
            self.check_cancelled()?;
            let Some(node) = forest.get(id) else {
                continue;
            };
            self.placement.attempted += 1;
            if self.options.detailed_progress {
                self.reporter.status(format!("Placing '{}'", node.name), None);
            }
            let host = forest
                .ancestors(id)
                .into_iter()
                .find_map(|ancestor| self.placement.elements.get(&ancestor).copied());
            if let Some(element) = self.place_node(doc, node, host) {
                self.placement.elements.insert(id, element);
                self.placement.placed += 1;
            }
            self.reporter
                .progress(self.plan.percent(Step::PlaceElements, index + 1, total));
        }
        Ok(())
    }

    /// Place one node under `host` and write its parameters
    fn place_node(
        &mut self,
        doc: DocumentHandle,
        node: &GeometryNode,
        host: Option<ElementHandle>,
    ) -> Option<ElementHandle> {
        let Some(geometry) = node.target.as_ref() else {
            self.reporter
                .warning(format!("Node '{}' has no converted geometry", node.name));
            return None;
        };

        let strategy = ConstructionStrategy::for_class(node.class);
        let element = match self
            .writer
            .create_element(doc, host, strategy, node.class, &node.name, geometry)
        {
            Ok(element) => element,
            Err(e) if !strategy.is_generic() => {
                debug!("{:?} placement of '{}' refused: {}", strategy, node.name, e);
                match self.writer.create_element(
                    doc,
                    host,
                    ConstructionStrategy::GenericShape,
                    node.class,
                    &node.name,
                    geometry,
                ) {
                    Ok(element) => {
                        self.reporter.warning(format!(
                            "Node '{}' placed as generic shape ({})",
                            node.name, e
                        ));
                        element
                    }
                    Err(e) => {
                        self.reporter
                            .warning(format!("Node '{}' could not be placed: {}", node.name, e));
                        return None;
                    }
                }
            }
            Err(e) => {
                self.reporter
                    .warning(format!("Node '{}' could not be placed: {}", node.name, e));
                return None;
            }
        };

        for parameter in &node.parameters {
            if !self
                .writer
                .set_parameter(doc, element, &parameter.name, &parameter.value)
            {
                self.reporter.warning(format!(
                    "Parameter '{}' of '{}' was rejected",
                    parameter.name, node.name
                ));
                self.placement.degraded = true;
            }
        }
        Some(element)
    }

    fn write_family(
        &mut self,
        doc: DocumentHandle,
        family: &FamilyDefinition,
    ) -> Result<(), StageFailure> {
        if !self.writer.set_family_category(doc, &family.category) {
            self.reporter
                .warning(format!("Category '{}' was rejected", family.category));
            self.placement.degraded = true;
        }

        let defaults;
        let types = if family.types.is_empty() {
            defaults = self.type_builder.build(&[]);
            &defaults
        } else {
            &family.types
        };
        let total = family.parameters.len() + types.len();
        let mut done = 0;

        for parameter in &family.parameters {
            self.check_cancelled()?;
            if !self
                .writer
                .add_family_parameter(doc, &parameter.name, &parameter.value)
            {
                self.reporter
                    .warning(format!("Family parameter '{}' was rejected", parameter.name));
                self.placement.degraded = true;
            }
            done += 1;
            self.reporter
                .progress(self.plan.percent(Step::ParametersAndTypes, done, total));
        }

        for variant in types {
            self.check_cancelled()?;
            if !self.writer.add_family_type(doc, variant) {
                self.reporter
                    .warning(format!("Family type '{}' was rejected", variant.name));
                self.placement.degraded = true;
            }
            done += 1;
            self.reporter
                .progress(self.plan.percent(Step::ParametersAndTypes, done, total));
        }
        Ok(())
    }
}
