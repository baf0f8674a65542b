// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stage outcomes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of one pipeline stage invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionOutcome {
    Success,
    PartialSuccess,
    Failed,
    Cancelled,
    InvalidInput,
    UnsupportedGeometry,
    TargetSystemError,
    OutputWriteError,
}

impl ConversionOutcome {
    /// Aggregate per-item results: `s == 0` fails, `s == n` succeeds,
    /// anything in between is a partial success
    pub fn aggregate(attempted: usize, succeeded: usize) -> Self {
        if succeeded == 0 {
            ConversionOutcome::Failed
        } else if succeeded >= attempted {
            ConversionOutcome::Success
        } else {
            ConversionOutcome::PartialSuccess
        }
    }

    /// Success or PartialSuccess
    pub fn is_success_like(&self) -> bool {
        matches!(
            self,
            ConversionOutcome::Success | ConversionOutcome::PartialSuccess
        )
    }

    /// Strict success
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success)
    }

    /// Downgrade a success to a partial success
    pub fn degraded(self) -> Self {
        match self {
            ConversionOutcome::Success => ConversionOutcome::PartialSuccess,
            other => other,
        }
    }

    /// Process exit code; `PartialSuccess` counts as success unless `strict`
    pub fn exit_code(&self, strict: bool) -> i32 {
        match self {
            ConversionOutcome::Success => 0,
            ConversionOutcome::PartialSuccess if !strict => 0,
            _ => 1,
        }
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            ConversionOutcome::Success => "Success",
            ConversionOutcome::PartialSuccess => "PartialSuccess",
            ConversionOutcome::Failed => "Failed",
            ConversionOutcome::Cancelled => "Cancelled",
            ConversionOutcome::InvalidInput => "InvalidInput",
            ConversionOutcome::UnsupportedGeometry => "UnsupportedGeometry",
            ConversionOutcome::TargetSystemError => "TargetSystemError",
            ConversionOutcome::OutputWriteError => "OutputWriteError",
        }
    }
}

impl fmt::Display for ConversionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_law() {
        for n in 1..6 {
            for s in 0..=n {
                let outcome = ConversionOutcome::aggregate(n, s);
                assert_eq!(outcome == ConversionOutcome::Failed, s == 0);
                assert_eq!(outcome == ConversionOutcome::Success, s == n);
                if s > 0 && s < n {
                    assert_eq!(outcome, ConversionOutcome::PartialSuccess);
                }
            }
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ConversionOutcome::Success.exit_code(true), 0);
        assert_eq!(ConversionOutcome::PartialSuccess.exit_code(false), 0);
        assert_eq!(ConversionOutcome::PartialSuccess.exit_code(true), 1);
        assert_eq!(ConversionOutcome::Cancelled.exit_code(false), 1);
    }

    #[test]
    fn test_degraded() {
        assert_eq!(
            ConversionOutcome::Success.degraded(),
            ConversionOutcome::PartialSuccess
        );
        assert_eq!(
            ConversionOutcome::Failed.degraded(),
            ConversionOutcome::Failed
        );
    }
}
