// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline Orchestrator - Owns the collaborators and sequences the stages
//!
//! The stages themselves live in `parse`, `convert`, `generate` and `import`;
//! this module holds the shared state and the full-run drivers.

use crate::{FamilyTypeBuilder, ParameterMapper, RunReport};
use famforge_convert::ConverterRegistry;
use famforge_model::{
    CancellationToken, ConversionOptions, ElementClass, FamilyDefinition, FamilyDocumentReader,
    GeometryForest, GeometryKernel, NullSink, ParameterSet, ProgressSink, SourceFileReader,
    TargetDocumentWriter,
};
use log::info;
use rustc_hash::FxHashMap;
use std::path::Path;
use std::sync::Arc;

/// Result of the Parse stage
#[derive(Clone, Debug, Default)]
pub struct ParsedDocument {
    /// Document name reported by the reader
    pub name: Option<String>,
    /// Family category reported by the reader
    pub category: Option<String>,
    /// Geometry in source order
    pub forest: GeometryForest,
    /// Document-level parameters (values mapped, names as in the source)
    pub parameters: ParameterSet,
    /// Raw type-parameter tables (values mapped)
    pub type_tables: Vec<ParameterSet>,
}

/// Staged conversion pipeline
///
/// Holds the single target writer for its lifetime; every stage borrows it
/// mutably, so document-mutating calls are never interleaved.
pub struct Pipeline {
    pub(crate) reader: Arc<dyn SourceFileReader>,
    pub(crate) family_reader: Option<Arc<dyn FamilyDocumentReader>>,
    pub(crate) kernel: Arc<dyn GeometryKernel>,
    pub(crate) writer: Box<dyn TargetDocumentWriter>,
    pub(crate) registry: ConverterRegistry,
    pub(crate) mapper: ParameterMapper,
    pub(crate) type_builder: FamilyTypeBuilder,
    pub(crate) options: ConversionOptions,
    pub(crate) sink: Arc<dyn ProgressSink>,
    pub(crate) cancel: CancellationToken,
}

impl Pipeline {
    /// Create a pipeline with default converters, mapper and options
    pub fn new(
        reader: Arc<dyn SourceFileReader>,
        kernel: Arc<dyn GeometryKernel>,
        writer: Box<dyn TargetDocumentWriter>,
    ) -> Self {
        Self {
            reader,
            family_reader: None,
            kernel,
            writer,
            registry: ConverterRegistry::with_default_converters(),
            mapper: ParameterMapper::new(),
            type_builder: FamilyTypeBuilder::new(),
            options: ConversionOptions::default(),
            sink: Arc::new(NullSink),
            cancel: CancellationToken::new(),
        }
    }

    /// Set options
    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the progress sink
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the converter registry
    pub fn with_registry(mut self, registry: ConverterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the parameter mapper
    pub fn with_mapper(mut self, mapper: ParameterMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Enable import of target-native families
    pub fn with_family_reader(mut self, reader: Arc<dyn FamilyDocumentReader>) -> Self {
        self.family_reader = Some(reader);
        self
    }

    /// Share an existing cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this pipeline's stages
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current options
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Converter registry
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Parameter mapper
    pub fn mapper(&self) -> &ParameterMapper {
        &self.mapper
    }

    /// Target writer
    pub fn writer(&self) -> &dyn TargetDocumentWriter {
        self.writer.as_ref()
    }

    /// Parse, convert and generate a project document
    pub fn run_project(&mut self, path: &Path) -> RunReport {
        info!("Converting project {}", path.display());
        let mut run = RunReport::default();

        let parsed = self.parse(path);
        let proceed = run.record(parsed.report);
        let Some(mut document) = parsed.output.filter(|_| proceed) else {
            return run;
        };

        if !run.record(self.convert(&mut document.forest)) {
            return run;
        }

        let generated = self.generate(&document.forest);
        run.record(generated.report);
        run.output = generated.output;
        run
    }

    /// Parse, convert and generate a family
    ///
    /// `name` and `category` override what the source document reports; the
    /// name falls back to the input's file stem.
    pub fn run_family(
        &mut self,
        path: &Path,
        name: Option<&str>,
        category: Option<&str>,
    ) -> RunReport {
        info!("Converting family {}", path.display());
        let mut run = RunReport::default();

        let parsed = self.parse(path);
        let proceed = run.record(parsed.report);
        let Some(mut document) = parsed.output.filter(|_| proceed) else {
            return run;
        };

        if !run.record(self.convert(&mut document.forest)) {
            return run;
        }

        let mut family = self.family_from(document, path, name, category);
        let generated = self.generate_family(&mut family);
        run.record(generated.report);
        run.output = generated.output;
        run.family = Some(family);
        run
    }

    /// Assemble a family definition from a parsed (and converted) document
    pub fn family_from(
        &self,
        document: ParsedDocument,
        path: &Path,
        name: Option<&str>,
        category: Option<&str>,
    ) -> FamilyDefinition {
        let name = name
            .map(str::to_string)
            .or(document.name)
            .or_else(|| file_stem(path))
            .unwrap_or_default();
        let category = category
            .map(str::to_string)
            .or(document.category)
            .unwrap_or_default();

        let tables: Vec<ParameterSet> = document
            .type_tables
            .iter()
            .map(|t| self.mapper.normalize(t, &self.options))
            .collect();

        let mut family = FamilyDefinition::new(name, category)
            .with_parameters(self.mapper.normalize(&document.parameters, &self.options))
            .with_types(self.type_builder.build(&tables))
            .with_geometry(document.forest);
        family.template = self.options.template.clone();
        family
    }
}

/// File name without its extensions (`chair.ffsrc.json` -> `chair`)
pub(crate) fn file_stem(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next().unwrap_or(name);
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Category of the most frequent element class (ties go to declaration order)
pub fn dominant_category(forest: &GeometryForest) -> Option<&'static str> {
    let mut counts: FxHashMap<ElementClass, usize> = FxHashMap::default();
    for node in forest.iter() {
        *counts.entry(node.class).or_insert(0) += 1;
    }

    let mut best: Option<(ElementClass, usize)> = None;
    for class in ElementClass::ALL {
        let count = counts.get(&class).copied().unwrap_or(0);
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((class, count));
        }
    }
    best.map(|(class, _)| class.category_name())
}
