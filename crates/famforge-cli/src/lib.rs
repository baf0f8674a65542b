// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! famforge command-line front end
//!
//! Wires the JSON interchange collaborators into a [`Pipeline`], runs a
//! project or family conversion and maps the outcome to an exit code.

mod args;
pub mod config;
pub mod error;

pub use args::Args;
pub use error::{CliError, Result};

use famforge_interchange::{
    JsonDocumentWriter, JsonFamilyReader, JsonSourceReader, PassthroughKernel,
};
use famforge_model::{ProgressEvent, ProgressSink};
use famforge_pipeline::{Pipeline, RunReport};
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Forwards progress events to the log
#[derive(Debug, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn emit(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StatusChanged { message, .. } => info!("{}", message),
            ProgressEvent::ProgressChanged { percent } => debug!("{:.0}%", percent),
            ProgressEvent::Warning { message } => warn!("{}", message),
            ProgressEvent::Error { message, cause } => match cause {
                Some(cause) => error!("{}: {}", message, cause),
                None => error!("{}", message),
            },
            ProgressEvent::Completed { message, success } => {
                if success {
                    info!("{}", message);
                } else {
                    warn!("{}", message);
                }
            }
        }
    }
}

/// Build a pipeline over the JSON collaborators
pub fn build_pipeline(args: &Args) -> Result<Pipeline> {
    let options = config::load_options(args.config.as_deref())?;
    let options = config::apply_overrides(options, args);
    debug!("Options: {:?}", options);

    Ok(Pipeline::new(
        Arc::new(JsonSourceReader::new()),
        Arc::new(PassthroughKernel::new()),
        Box::new(JsonDocumentWriter::new()),
    )
    .with_family_reader(Arc::new(JsonFamilyReader::new()))
    .with_options(options)
    .with_sink(Arc::new(LogSink)))
}

/// Run the conversion the arguments describe
pub fn run(args: &Args) -> Result<RunReport> {
    let mut pipeline = build_pipeline(args)?;
    let report = match &args.family {
        Some(name) => {
            info!("Converting {} into family '{}'", args.input.display(), name);
            pipeline.run_family(&args.input, Some(name), args.category.as_deref())
        }
        None => {
            info!("Converting {} into a project", args.input.display());
            pipeline.run_project(&args.input)
        }
    };
    Ok(report)
}

/// One line per stage, then the output path
pub fn summary(report: &RunReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .stages
        .iter()
        .map(|stage| {
            format!(
                "{:<9} {:<20} {}/{} items, {} warnings",
                stage.stage.name(),
                stage.outcome.name(),
                stage.succeeded,
                stage.attempted,
                stage.warnings
            )
        })
        .collect();
    if let Some(output) = &report.output {
        lines.push(format!("Output: {}", output.display()));
    }
    lines
}

/// Exit code for a finished run
pub fn exit_code(report: &RunReport, strict: bool) -> i32 {
    report.outcome().exit_code(strict)
}
