// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Family Type Builder - Synthesizes named type variants from raw tables

use famforge_model::{ParameterSet, ParameterValue, TypeVariant, DEFAULT_TYPE_NAME, TYPE_NAME_KEY};
use rustc_hash::FxHashMap;

/// Builds the ordered list of type variants of a family
///
/// - No tables yields exactly one `"Default"` variant without parameters.
/// - A repeated name keeps the first variant's position; values from later
///   tables overwrite overlapping keys.
/// - A table without a type name is named `"Default"`, or `"Default 2"`,
///   `"Default 3"`, ... when that name is taken.
#[derive(Clone, Copy, Debug, Default)]
pub struct FamilyTypeBuilder;

impl FamilyTypeBuilder {
    /// Create new builder
    pub fn new() -> Self {
        Self
    }

    /// Build variants from raw type-parameter tables
    pub fn build(&self, tables: &[ParameterSet]) -> Vec<TypeVariant> {
        if tables.is_empty() {
            return vec![TypeVariant::new(DEFAULT_TYPE_NAME, ParameterSet::new())];
        }

        let mut variants: Vec<TypeVariant> = Vec::with_capacity(tables.len());
        let mut index: FxHashMap<String, usize> = FxHashMap::default();

        for table in tables {
            let mut parameters = table.clone();
            let name = match parameters.remove(TYPE_NAME_KEY) {
                Some(value) => type_name(&value),
                None => None,
            };
            let name = match name {
                Some(name) => name,
                None => unused_default_name(&index),
            };

            match index.get(&name) {
                Some(&existing) => variants[existing].parameters.merge_from(&parameters),
                None => {
                    index.insert(name.clone(), variants.len());
                    variants.push(TypeVariant::new(name, parameters));
                }
            }
        }

        variants
    }
}

/// Non-blank type name carried by a table entry
fn type_name(value: &ParameterValue) -> Option<String> {
    let name = value.to_string();
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn unused_default_name(index: &FxHashMap<String, usize>) -> String {
    if !index.contains_key(DEFAULT_TYPE_NAME) {
        return DEFAULT_TYPE_NAME.to_string();
    }
    (2..)
        .map(|n| format!("{} {}", DEFAULT_TYPE_NAME, n))
        .find(|candidate| !index.contains_key(candidate))
        .unwrap_or_else(|| DEFAULT_TYPE_NAME.to_string())
}
