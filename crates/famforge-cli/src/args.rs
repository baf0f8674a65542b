// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

/// Convert authoring-application geometry into target families and projects
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Source document to convert
    pub input: PathBuf,

    /// Output document (a temporary path is used when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Target application version
    #[arg(long)]
    pub target_version: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Generate a family with this name instead of a project
    #[arg(long)]
    pub family: Option<String>,

    /// Family category (derived from the geometry when omitted)
    #[arg(long, requires = "family")]
    pub category: Option<String>,

    /// Template used to create the target document
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Treat a partial success as failure
    #[arg(long)]
    pub strict: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_arguments() {
        let args = Args::try_parse_from(["famforge", "chair.ffsrc.json"]).unwrap();
        assert_eq!(args.input, PathBuf::from("chair.ffsrc.json"));
        assert!(args.output.is_none());
        assert!(args.family.is_none());
        assert!(!args.strict);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_family_arguments() {
        let args = Args::try_parse_from([
            "famforge",
            "chair.ffsrc.json",
            "-o",
            "Chair.ffam",
            "--family",
            "Chair",
            "--category",
            "Furniture",
            "--target-version",
            "2025",
            "--strict",
        ])
        .unwrap();
        assert_eq!(args.output, Some(PathBuf::from("Chair.ffam")));
        assert_eq!(args.family.as_deref(), Some("Chair"));
        assert_eq!(args.category.as_deref(), Some("Furniture"));
        assert_eq!(args.target_version.as_deref(), Some("2025"));
        assert!(args.strict);
    }

    #[test]
    fn test_category_requires_family() {
        assert!(Args::try_parse_from(["famforge", "in.json", "--category", "Furniture"]).is_err());
    }
}
