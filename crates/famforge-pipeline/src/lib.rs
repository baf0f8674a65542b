// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # famforge Conversion Pipeline
//!
//! Staged conversion of authoring-application geometry into target
//! families and projects, and back.
//!
//! ## Stages
//!
//! - **Parse**: source file -> [`GeometryForest`](famforge_model::GeometryForest)
//!   with mapped parameter values
//! - **Convert**: every node -> target geometry through the converter registry
//! - **Generate**: converted forest or family -> saved target document
//! - **Import**: target family document -> [`FamilyDefinition`](famforge_model::FamilyDefinition)
//!
//! Every stage reports through the pipeline's progress sink, ends with
//! exactly one `Completed` event and returns a [`StageReport`]; nothing
//! is thrown across a stage boundary.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use famforge_pipeline::Pipeline;
//!
//! let mut pipeline = Pipeline::new(reader, kernel, writer).with_options(options);
//! let run = pipeline.run_family(Path::new("chair.ffsrc.json"), None, Some("Furniture"));
//! println!("{} -> {:?}", run.outcome(), run.output);
//! ```

mod convert;
pub mod error;
pub mod family_types;
mod generate;
mod import;
pub mod mapper;
mod parse;
pub mod pipeline;
pub mod progress;
pub mod report;

#[cfg(test)]
mod testing;

pub use error::{MapError, StageFailure};
pub use family_types::FamilyTypeBuilder;
pub use mapper::{is_legal_name, sanitize_name, ParameterMapper, FORBIDDEN_CHARS};
pub use pipeline::{dominant_category, ParsedDocument, Pipeline};
pub use progress::{ProgressPlan, Stage, StageReporter, Step};
pub use report::{RunReport, StageReport, StageResult};
