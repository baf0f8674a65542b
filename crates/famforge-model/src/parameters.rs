// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed parameters attached to geometry nodes and families

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed parameter value
///
/// This is the closed set of value types the target document accepts.
/// Source values of any other shape go through the parameter mapper first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
}

impl ParameterValue {
    /// Get as string slice (Text only)
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParameterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as float (Number or Integer)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParameterValue::Number(n) => Some(*n),
            ParameterValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ParameterValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Name of the value type
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterValue::Text(_) => "Text",
            ParameterValue::Integer(_) => "Integer",
            ParameterValue::Number(_) => "Number",
            ParameterValue::Boolean(_) => "Boolean",
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Text(s) => f.write_str(s),
            ParameterValue::Integer(i) => write!(f, "{}", i),
            ParameterValue::Number(n) => write!(f, "{}", n),
            ParameterValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(s: &str) -> Self {
        ParameterValue::Text(s.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(s: String) -> Self {
        ParameterValue::Text(s)
    }
}

impl From<i64> for ParameterValue {
    fn from(i: i64) -> Self {
        ParameterValue::Integer(i)
    }
}

impl From<f64> for ParameterValue {
    fn from(n: f64) -> Self {
        ParameterValue::Number(n)
    }
}

impl From<bool> for ParameterValue {
    fn from(b: bool) -> Self {
        ParameterValue::Boolean(b)
    }
}

/// A single named parameter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Typed value
    pub value: ParameterValue,
}

impl Parameter {
    /// Create a new parameter
    pub fn new(name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered mapping of parameter name to typed value
///
/// Insertion order is preserved. Inserting an existing name replaces its
/// value in place, keeping the original position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    parameters: Vec<Parameter>,
}

impl ParameterSet {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter; returns the previous value if any
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ParameterValue>,
    ) -> Option<ParameterValue> {
        let name = name.into();
        let value = value.into();
        match self.parameters.iter_mut().find(|p| p.name == name) {
            Some(existing) => Some(std::mem::replace(&mut existing.value, value)),
            None => {
                self.parameters.push(Parameter { name, value });
                None
            }
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Get a value by name
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Check if a parameter exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove a parameter, preserving the order of the rest
    pub fn remove(&mut self, name: &str) -> Option<ParameterValue> {
        let index = self.parameters.iter().position(|p| p.name == name)?;
        Some(self.parameters.remove(index).value)
    }

    /// Overlay another set: values for existing names are replaced, new names appended
    pub fn merge_from(&mut self, other: &ParameterSet) {
        for param in &other.parameters {
            self.insert(param.name.clone(), param.value.clone());
        }
    }

    /// Iterate parameters in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    /// Parameter names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl FromIterator<Parameter> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        for param in iter {
            set.insert(param.name, param.value);
        }
        set
    }
}

impl IntoIterator for ParameterSet {
    type Item = Parameter;
    type IntoIter = std::vec::IntoIter<Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

/// Untyped value as read from a source document
///
/// The parameter mapper turns these into [`ParameterValue`]s.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawValue {
    Null,
    Text(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Value from a closed set (e.g. `.ELEMENT.`)
    Enumerated(String),
    List(Vec<RawValue>),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => Ok(()),
            RawValue::Text(s) | RawValue::Enumerated(s) => f.write_str(s),
            RawValue::Integer(i) => write!(f, "{}", i),
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Boolean(b) => write!(f, "{}", b),
            RawValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            RawValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d")),
            RawValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<ParameterValue> for RawValue {
    fn from(value: ParameterValue) -> Self {
        match value {
            ParameterValue::Text(s) => RawValue::Text(s),
            ParameterValue::Integer(i) => RawValue::Integer(i),
            ParameterValue::Number(n) => RawValue::Number(n),
            ParameterValue::Boolean(b) => RawValue::Boolean(b),
        }
    }
}

/// Declared storage type of a target parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    Text,
    Integer,
    Number,
    Length,
    Area,
    Volume,
    Angle,
    YesNo,
}

impl DeclaredType {
    /// Whether values of this type are stored as floating point numbers
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DeclaredType::Number
                | DeclaredType::Length
                | DeclaredType::Area
                | DeclaredType::Volume
                | DeclaredType::Angle
        )
    }

    /// Type-appropriate zero value used when coercion fails
    pub fn zero_value(&self) -> ParameterValue {
        match self {
            DeclaredType::Text => ParameterValue::Text(String::new()),
            DeclaredType::Integer => ParameterValue::Integer(0),
            DeclaredType::YesNo => ParameterValue::Boolean(false),
            _ => ParameterValue::Number(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_preserves_order_and_replaces() {
        let mut set = ParameterSet::new();
        set.insert("Width", 0.2);
        set.insert("Mark", "W1");
        let previous = set.insert("Width", 0.3);

        assert_eq!(previous, Some(ParameterValue::Number(0.2)));
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["Width", "Mark"]);
        assert_eq!(set.get("Width"), Some(&ParameterValue::Number(0.3)));
    }

    #[test]
    fn test_remove_and_merge() {
        let mut base = ParameterSet::new().with("A", 1i64).with("B", 2i64);
        let overlay = ParameterSet::new().with("B", 20i64).with("C", 30i64);
        base.merge_from(&overlay);

        assert_eq!(base.names().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(base.get("B"), Some(&ParameterValue::Integer(20)));

        assert_eq!(base.remove("A"), Some(ParameterValue::Integer(1)));
        assert_eq!(base.names().collect::<Vec<_>>(), vec!["B", "C"]);
        assert!(base.remove("missing").is_none());
    }

    #[test]
    fn test_raw_value_display() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(RawValue::Date(date).to_string(), "2024-03-09");
        assert_eq!(
            RawValue::List(vec![RawValue::Integer(1), RawValue::Text("a".into())]).to_string(),
            "1, a"
        );
        assert_eq!(RawValue::Null.to_string(), "");
    }

    #[test]
    fn test_declared_type_zero_values() {
        assert_eq!(DeclaredType::Integer.zero_value(), ParameterValue::Integer(0));
        assert_eq!(DeclaredType::Length.zero_value(), ParameterValue::Number(0.0));
        assert_eq!(DeclaredType::YesNo.zero_value(), ParameterValue::Boolean(false));
        assert!(DeclaredType::Angle.is_numeric());
        assert!(!DeclaredType::Text.is_numeric());
    }

    #[test]
    fn test_parameter_set_serde_is_list() {
        let set = ParameterSet::new().with("Mark", "W1");
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"[{"name":"Mark","value":{"text":"W1"}}]"#);
    }
}
