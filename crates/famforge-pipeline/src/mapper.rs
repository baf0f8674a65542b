// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parameter Mapper - Normalizes parameter names and values
//!
//! Name lookup order:
//! 1. The per-run rename table in [`ConversionOptions`]
//! 2. The mapper's built-in table
//! 3. The name itself, when it is legal on the target side
//! 4. The name with every forbidden character replaced by `_`

use crate::MapError;
use famforge_model::{
    ConversionOptions, DeclaredType, ParameterSet, ParameterValue, RawValue, SourceParameter,
};
use rustc_hash::FxHashMap;

/// Characters the target rejects in parameter names
pub const FORBIDDEN_CHARS: [char; 9] = ['<', '>', '"', '/', '\\', ':', '*', '?', '|'];

/// Built-in source-to-target name table
const BUILTIN_NAMES: &[(&str, &str)] = &[
    ("Layer", "Source Layer"),
    ("ObjectName", "Name"),
    ("ObjectId", "Source Id"),
    ("Level", "Reference Level"),
    ("Color", "Source Color"),
    ("Material Name", "Material"),
    ("LongName", "Description"),
];

/// Whether `name` contains no forbidden character
pub fn is_legal_name(name: &str) -> bool {
    !name.contains(FORBIDDEN_CHARS)
}

/// Replace every forbidden character with `_`
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Parameter name and value normalizer
#[derive(Clone, Debug)]
pub struct ParameterMapper {
    names: FxHashMap<String, String>,
}

impl Default for ParameterMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterMapper {
    /// Create a mapper with the built-in name table
    pub fn new() -> Self {
        let mut mapper = Self::empty();
        for (from, to) in BUILTIN_NAMES {
            mapper.names.insert(from.to_string(), to.to_string());
        }
        mapper
    }

    /// Create a mapper without built-in names
    pub fn empty() -> Self {
        Self {
            names: FxHashMap::default(),
        }
    }

    /// Add a built-in mapping
    pub fn with_mapping(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.names.insert(from.into(), to.into());
        self
    }

    /// Map a source parameter name to its target name
    pub fn map_name(&self, source: &str, options: &ConversionOptions) -> String {
        if let Some(renamed) = options.parameter_renames.get(source) {
            return renamed.clone();
        }
        if let Some(mapped) = self.names.get(source) {
            return mapped.clone();
        }
        if is_legal_name(source) {
            source.to_string()
        } else {
            sanitize_name(source)
        }
    }

    /// Map an untyped source value to a target value
    ///
    /// Scalars pass through, dates become `YYYY-MM-DD` text and everything
    /// else is stringified.
    pub fn map_value(&self, raw: &RawValue) -> ParameterValue {
        match raw {
            RawValue::Text(s) => ParameterValue::Text(s.clone()),
            RawValue::Integer(i) => ParameterValue::Integer(*i),
            RawValue::Number(n) => ParameterValue::Number(*n),
            RawValue::Boolean(b) => ParameterValue::Boolean(*b),
            other => ParameterValue::Text(other.to_string()),
        }
    }

    /// Coerce a value to its declared type
    pub fn try_convert_by_declared_type(
        &self,
        value: &ParameterValue,
        declared: DeclaredType,
    ) -> Result<ParameterValue, MapError> {
        let converted = match declared {
            DeclaredType::Text => Some(ParameterValue::Text(value.to_string())),
            DeclaredType::Integer => match value {
                ParameterValue::Integer(i) => Some(ParameterValue::Integer(*i)),
                ParameterValue::Number(n) if n.is_finite() => {
                    Some(ParameterValue::Integer(n.round() as i64))
                }
                ParameterValue::Boolean(b) => Some(ParameterValue::Integer(i64::from(*b))),
                ParameterValue::Text(s) => {
                    s.trim().parse::<i64>().ok().map(ParameterValue::Integer)
                }
                _ => None,
            },
            DeclaredType::YesNo => match value {
                ParameterValue::Boolean(b) => Some(ParameterValue::Boolean(*b)),
                ParameterValue::Integer(i) => Some(ParameterValue::Boolean(*i != 0)),
                ParameterValue::Number(n) => Some(ParameterValue::Boolean(*n != 0.0)),
                ParameterValue::Text(s) => parse_yes_no(s).map(ParameterValue::Boolean),
            },
            _ => match value {
                ParameterValue::Number(n) => Some(ParameterValue::Number(*n)),
                ParameterValue::Integer(i) => Some(ParameterValue::Number(*i as f64)),
                ParameterValue::Boolean(b) => Some(ParameterValue::Number(f64::from(u8::from(*b)))),
                ParameterValue::Text(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(ParameterValue::Number),
            },
        };
        converted.ok_or_else(|| MapError::coercion(value, declared))
    }

    /// Coerce a value to its declared type, falling back to the type's zero
    pub fn convert_by_declared_type(
        &self,
        value: &ParameterValue,
        declared: DeclaredType,
    ) -> ParameterValue {
        self.try_convert_by_declared_type(value, declared)
            .unwrap_or_else(|_| declared.zero_value())
    }

    /// Map one source parameter's value
    ///
    /// A coercion failure still yields the zero value; the error is returned
    /// alongside so the caller can report it.
    pub fn map_parameter(&self, parameter: &SourceParameter) -> (ParameterValue, Option<MapError>) {
        let value = self.map_value(&parameter.value);
        match parameter.declared {
            Some(declared) => match self.try_convert_by_declared_type(&value, declared) {
                Ok(converted) => (converted, None),
                Err(e) => (declared.zero_value(), Some(e)),
            },
            None => (value, None),
        }
    }

    /// Map a list of source parameters into a typed set (names untouched)
    ///
    /// Returns the set and one message per coercion fallback.
    pub fn map_source_parameters(
        &self,
        parameters: &[SourceParameter],
    ) -> (ParameterSet, Vec<String>) {
        let mut set = ParameterSet::new();
        let mut fallbacks = Vec::new();
        for parameter in parameters {
            let (value, error) = self.map_parameter(parameter);
            if let Some(e) = error {
                fallbacks.push(format!("Parameter '{}': {}, using default", parameter.name, e));
            }
            set.insert(parameter.name.clone(), value);
        }
        (set, fallbacks)
    }

    /// Rename every parameter of a set to its target name
    ///
    /// Order is preserved; when two names map to the same target name the
    /// later value wins.
    pub fn normalize(&self, parameters: &ParameterSet, options: &ConversionOptions) -> ParameterSet {
        let mut normalized = ParameterSet::new();
        for parameter in parameters {
            normalized.insert(self.map_name(&parameter.name, options), parameter.value.clone());
        }
        normalized
    }
}

fn parse_yes_no(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "y" | "on" => Some(true),
        "no" | "false" | "0" | "n" | "off" | "" => Some(false),
        _ => None,
    }
}
