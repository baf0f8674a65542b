// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stage-scoped progress reporting
//!
//! [`StageReporter`] wraps the caller's sink for one stage invocation: it
//! clamps percentages, keeps them non-decreasing and guarantees exactly one
//! `Completed` event. [`ProgressPlan`] apportions the 0-100 range across the
//! sub-steps of a stage.

use crate::StageFailure;
use famforge_model::{ConversionOutcome, ProgressEvent, ProgressSink};
use log::{error, info, warn};
use std::error::Error as _;
use std::fmt;

/// Pipeline stage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Parse,
    Convert,
    Generate,
    Import,
}

impl Stage {
    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Parse => "Parse",
            Stage::Convert => "Convert",
            Stage::Generate => "Generate",
            Stage::Import => "Import",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sub-step of a stage with its own share of the progress range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// Opening the input document
    Open,
    /// Walking the items of the stage (elements, nodes)
    Items,
    /// Creating the target document
    CreateDocument,
    /// Placing elements
    PlaceElements,
    /// Family parameters and type variants
    ParametersAndTypes,
    /// Saving the target document
    Save,
}

/// Fixed weight table over the sub-steps of a stage
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressPlan {
    steps: Vec<(Step, f32)>,
}

impl ProgressPlan {
    /// Create a plan; weights are relative and normalized to 100
    pub fn new(steps: &[(Step, f32)]) -> Self {
        Self {
            steps: steps.to_vec(),
        }
    }

    /// Parse: open 10, elements 90
    pub fn parse() -> Self {
        Self::new(&[(Step::Open, 10.0), (Step::Items, 90.0)])
    }

    /// Convert: nodes only
    pub fn convert() -> Self {
        Self::new(&[(Step::Items, 100.0)])
    }

    /// Generate: document 10, placement 60, parameters/types 20, save 10
    pub fn generate() -> Self {
        Self::new(&[
            (Step::CreateDocument, 10.0),
            (Step::PlaceElements, 60.0),
            (Step::ParametersAndTypes, 20.0),
            (Step::Save, 10.0),
        ])
    }

    /// Import: open 20, elements 60, parameters/types 20
    pub fn import() -> Self {
        Self::new(&[
            (Step::Open, 20.0),
            (Step::Items, 60.0),
            (Step::ParametersAndTypes, 20.0),
        ])
    }

    fn total(&self) -> f32 {
        self.steps.iter().map(|(_, w)| w.max(0.0)).sum()
    }

    /// Percent after `done` of `total` items of `step`
    ///
    /// Linear inside the step; a step with no items counts as finished.
    /// Steps not in the plan report the start of the range.
    pub fn percent(&self, step: Step, done: usize, total: usize) -> f32 {
        let sum = self.total();
        if sum <= 0.0 {
            return 0.0;
        }
        let mut start = 0.0;
        for (candidate, weight) in &self.steps {
            let weight = weight.max(0.0);
            if *candidate == step {
                let fraction = if total == 0 {
                    1.0
                } else {
                    (done.min(total) as f32) / (total as f32)
                };
                return ProgressEvent::clamp_percent((start + weight * fraction) * 100.0 / sum);
            }
            start += weight;
        }
        0.0
    }

    /// Percent at the beginning of `step`
    pub fn start_of(&self, step: Step) -> f32 {
        self.percent(step, 0, 1)
    }

    /// Percent at the end of `step`
    pub fn end_of(&self, step: Step) -> f32 {
        self.percent(step, 1, 1)
    }
}

/// Progress reporter for one stage invocation
pub struct StageReporter<'a> {
    sink: &'a dyn ProgressSink,
    stage: Stage,
    last_percent: f32,
    warnings: usize,
    completed: bool,
}

impl<'a> StageReporter<'a> {
    /// Start reporting a stage
    pub fn new(sink: &'a dyn ProgressSink, stage: Stage) -> Self {
        Self {
            sink,
            stage,
            last_percent: 0.0,
            warnings: 0,
            completed: false,
        }
    }

    /// Stage being reported
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Warnings emitted so far
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// Last reported percent
    pub fn last_percent(&self) -> f32 {
        self.last_percent
    }

    fn monotonic(&mut self, percent: f32) -> f32 {
        let percent = ProgressEvent::clamp_percent(percent).max(self.last_percent);
        self.last_percent = percent;
        percent
    }

    /// Status message with optional percent
    pub fn status(&mut self, message: impl Into<String>, percent: Option<f32>) {
        let percent = percent.map(|p| self.monotonic(p));
        self.sink.emit(ProgressEvent::status(message, percent));
    }

    /// Progress update
    pub fn progress(&mut self, percent: f32) {
        let percent = self.monotonic(percent);
        self.sink.emit(ProgressEvent::progress(percent));
    }

    /// Per-item problem that degrades the outcome
    pub fn warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}: {}", self.stage, message);
        self.warnings += 1;
        self.sink.emit(ProgressEvent::warning(message));
    }

    /// Finish the stage with `outcome`; later calls are ignored
    pub fn complete(&mut self, outcome: ConversionOutcome, message: impl Into<String>) -> ConversionOutcome {
        if self.completed {
            return outcome;
        }
        self.completed = true;
        let success = outcome.is_success_like();
        if success {
            self.progress(100.0);
        }
        let message = message.into();
        info!("{} finished with {}: {}", self.stage, outcome, message);
        self.sink.emit(ProgressEvent::completed(message, success));
        outcome
    }

    /// Finish the stage after a structural failure
    ///
    /// Emits an Error event (except for cancellation) followed by
    /// `Completed { success: false }`.
    pub fn fail(&mut self, failure: StageFailure) -> ConversionOutcome {
        let outcome = failure.outcome();
        if !matches!(failure, StageFailure::Cancelled) {
            let message = failure.to_string();
            let cause = failure.source().map(|s| s.to_string());
            match &cause {
                Some(cause) => error!("{}: {} ({})", self.stage, message, cause),
                None => error!("{}: {}", self.stage, message),
            }
            self.sink.emit(ProgressEvent::error(message, cause));
        }
        let message = format!("{} {}", self.stage, outcome);
        self.complete(outcome, message)
    }
}

impl Drop for StageReporter<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.completed = true;
            self.sink.emit(ProgressEvent::completed(
                format!("{} ended without a result", self.stage),
                false,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use famforge_model::EventLog;
    use std::path::PathBuf;

    #[test]
    fn test_generate_plan_weights() {
        let plan = ProgressPlan::generate();
        assert_eq!(plan.start_of(Step::CreateDocument), 0.0);
        assert_eq!(plan.end_of(Step::CreateDocument), 10.0);
        assert_eq!(plan.percent(Step::PlaceElements, 1, 2), 40.0);
        assert_eq!(plan.percent(Step::PlaceElements, 0, 0), 70.0);
        assert_eq!(plan.end_of(Step::Save), 100.0);
        assert_eq!(plan.percent(Step::Open, 1, 1), 0.0);
    }

    #[test]
    fn test_reporter_monotonic_and_clamped() {
        let log = EventLog::new();
        {
            let mut reporter = StageReporter::new(&log, Stage::Convert);
            reporter.progress(40.0);
            reporter.progress(20.0);
            reporter.status("still going", Some(250.0));
            reporter.complete(ConversionOutcome::Success, "done");
        }

        assert_eq!(log.percentages(), vec![40.0, 40.0, 100.0, 100.0]);
        assert_eq!(log.completions(), vec![true]);
    }

    #[test]
    fn test_exactly_one_completion() {
        let log = EventLog::new();
        {
            let mut reporter = StageReporter::new(&log, Stage::Generate);
            reporter.fail(StageFailure::Save(PathBuf::from("out.ffam")));
            reporter.complete(ConversionOutcome::Success, "ignored");
        }
        assert_eq!(log.errors().len(), 1);
        assert_eq!(log.completions(), vec![false]);
    }

    #[test]
    fn test_drop_completes_unfinished_stage() {
        let log = EventLog::new();
        {
            let mut reporter = StageReporter::new(&log, Stage::Parse);
            reporter.progress(5.0);
        }
        assert_eq!(log.completions(), vec![false]);
    }

    #[test]
    fn test_cancellation_is_not_an_error() {
        let log = EventLog::new();
        let outcome = StageReporter::new(&log, Stage::Convert).fail(StageFailure::Cancelled);
        assert_eq!(outcome, ConversionOutcome::Cancelled);
        assert!(log.errors().is_empty());
        assert_eq!(log.completions(), vec![false]);
    }

    #[test]
    fn test_warnings_counted() {
        let log = EventLog::new();
        let mut reporter = StageReporter::new(&log, Stage::Convert);
        reporter.warning("one");
        reporter.warning("two");
        assert_eq!(reporter.warnings(), 2);
        assert_eq!(log.warnings().len(), 2);
    }
}
