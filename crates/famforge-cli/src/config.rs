// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration file loading
//!
//! The file holds [`ConversionOptions`] fields at the top level, all
//! optional. Search order: explicit path, `famforge.toml` in the working
//! directory, built-in defaults.

use crate::error::{CliError, Result};
use crate::Args;
use famforge_model::{ConversionOptions, TemplateRef};
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Configuration file looked up in the working directory
pub const LOCAL_CONFIG: &str = "famforge.toml";

/// Find and load conversion options
pub fn load_options(explicit_path: Option<&Path>) -> Result<ConversionOptions> {
    if let Some(path) = explicit_path {
        info!("Loading configuration from {}", path.display());
        return load_options_file(path);
    }

    let local = Path::new(LOCAL_CONFIG);
    if local.exists() {
        info!("Loading configuration from {}", local.display());
        return load_options_file(local);
    }

    debug!("No configuration file found, using defaults");
    Ok(ConversionOptions::default())
}

/// Load options from a TOML file
pub fn load_options_file(path: &Path) -> Result<ConversionOptions> {
    if !path.exists() {
        return Err(CliError::MissingConfig(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply command-line overrides on top of loaded options
pub fn apply_overrides(mut options: ConversionOptions, args: &Args) -> ConversionOptions {
    if let Some(output) = &args.output {
        options.output_path = Some(output.clone());
    }
    if let Some(version) = &args.target_version {
        options.target_version = version.clone();
    }
    if let Some(template) = &args.template {
        options.template = Some(TemplateRef::new(template));
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use famforge_model::EmptyGeometryPolicy;
    use std::path::PathBuf;

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("famforge.toml");
        fs::write(
            &path,
            r#"
target_version = "2023"
simplify_meshes = true
empty_geometry = "reject"

[parameter_renames]
"Fire Rating" = "FireRating"
"#,
        )
        .unwrap();

        let options = load_options(Some(&path)).unwrap();
        assert_eq!(options.target_version, "2023");
        assert!(options.simplify_meshes);
        assert_eq!(options.empty_geometry, EmptyGeometryPolicy::Reject);
        assert_eq!(
            options.parameter_renames.get("Fire Rating").map(String::as_str),
            Some("FireRating")
        );
        assert!(options.merge_coincident_vertices);
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_options(Some(Path::new("/no/such/famforge.toml"))).unwrap_err();
        assert!(matches!(err, CliError::MissingConfig(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "tolerance = \"very small\"").unwrap();

        let err = load_options(Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }

    #[test]
    fn test_flag_overrides() {
        let args = Args::try_parse_from([
            "famforge",
            "in.json",
            "-o",
            "out.fproj",
            "--target-version",
            "2025",
            "--template",
            "base.fft",
        ])
        .unwrap();
        let options = apply_overrides(ConversionOptions::default().with_target_version("2022"), &args);

        assert_eq!(options.output_path, Some(PathBuf::from("out.fproj")));
        assert_eq!(options.target_version, "2025");
        assert_eq!(
            options.template.as_ref().map(|t| t.path()),
            Some(Path::new("base.fft"))
        );
    }
}
