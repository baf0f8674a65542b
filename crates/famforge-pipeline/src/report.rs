// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stage and run results

use crate::Stage;
use famforge_model::{ConversionOutcome, FamilyDefinition};
use std::path::PathBuf;

/// Summary of one stage invocation
#[derive(Clone, Debug, PartialEq)]
pub struct StageReport {
    pub stage: Stage,
    pub outcome: ConversionOutcome,
    /// Items the stage tried to process
    pub attempted: usize,
    /// Items processed successfully
    pub succeeded: usize,
    /// Warning events emitted
    pub warnings: usize,
}

impl StageReport {
    /// Create a report
    pub fn new(stage: Stage, outcome: ConversionOutcome) -> Self {
        Self {
            stage,
            outcome,
            attempted: 0,
            succeeded: 0,
            warnings: 0,
        }
    }

    /// Set item counts
    pub fn with_counts(mut self, attempted: usize, succeeded: usize) -> Self {
        self.attempted = attempted;
        self.succeeded = succeeded;
        self
    }

    /// Set warning count
    pub fn with_warnings(mut self, warnings: usize) -> Self {
        self.warnings = warnings;
        self
    }
}

/// Stage output together with its report
#[derive(Clone, Debug)]
pub struct StageResult<T> {
    /// Present when the stage produced something
    pub output: Option<T>,
    pub report: StageReport,
}

impl<T> StageResult<T> {
    /// Result with output
    pub fn new(output: T, report: StageReport) -> Self {
        Self {
            output: Some(output),
            report,
        }
    }

    /// Result without output
    pub fn empty(report: StageReport) -> Self {
        Self {
            output: None,
            report,
        }
    }

    /// Stage outcome
    pub fn outcome(&self) -> ConversionOutcome {
        self.report.outcome
    }
}

/// Reports of a full Parse -> Convert -> Generate run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Reports of the stages that ran, in order
    pub stages: Vec<StageReport>,
    /// Saved document, if generation succeeded
    pub output: Option<PathBuf>,
    /// Generated family, for family runs that got that far
    pub family: Option<FamilyDefinition>,
}

impl RunReport {
    /// Record a stage; returns whether the run may continue
    pub fn record(&mut self, report: StageReport) -> bool {
        let proceed = report.outcome.is_success_like();
        self.stages.push(report);
        proceed
    }

    /// Report of a given stage, if it ran
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    /// Overall outcome
    ///
    /// The last stage's outcome when it failed; otherwise `PartialSuccess` if
    /// any stage was partial, else `Success`. A run with no stages failed.
    pub fn outcome(&self) -> ConversionOutcome {
        let Some(last) = self.stages.last() else {
            return ConversionOutcome::Failed;
        };
        if !last.outcome.is_success_like() {
            return last.outcome;
        }
        if self
            .stages
            .iter()
            .any(|r| r.outcome == ConversionOutcome::PartialSuccess)
        {
            ConversionOutcome::PartialSuccess
        } else {
            ConversionOutcome::Success
        }
    }

    /// Total warnings over all stages
    pub fn warnings(&self) -> usize {
        self.stages.iter().map(|r| r.warnings).sum()
    }
}
