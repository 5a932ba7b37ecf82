//! Selection values, modes, and value ownership.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectError};

/// Whether an engine chooses one value or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Single,
    Multi,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Multi => write!(f, "multi"),
        }
    }
}

/// The current selection of an engine.
///
/// Serialized untagged, so a single value travels as a JSON string and a
/// multi value as a JSON array, matching what form collaborators store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionValue {
    /// Single mode. The empty string means "no selection".
    Single(String),
    /// Multi mode, in selection order. Empty means "no selection".
    Multi(Vec<String>),
}

impl SelectionValue {
    /// The "no selection" value for `mode`.
    pub fn empty(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::Single => Self::Single(String::new()),
            SelectionMode::Multi => Self::Multi(Vec::new()),
        }
    }

    /// The mode this value belongs to.
    pub fn mode(&self) -> SelectionMode {
        match self {
            Self::Single(_) => SelectionMode::Single,
            Self::Multi(_) => SelectionMode::Multi,
        }
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(v) => v.is_empty(),
            Self::Multi(v) => v.is_empty(),
        }
    }

    /// Whether `value` is part of the selection.
    pub fn contains(&self, value: &str) -> bool {
        match self {
            Self::Single(v) => v == value,
            Self::Multi(v) => v.iter().any(|item| item == value),
        }
    }

    /// Return the value unchanged when it has the expected shape.
    pub(crate) fn expect_mode(self, expected: SelectionMode) -> Result<Self> {
        if self.mode() == expected {
            Ok(self)
        } else {
            Err(SelectError::ModeMismatch { expected })
        }
    }
}

impl From<&str> for SelectionValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_owned())
    }
}

impl From<String> for SelectionValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for SelectionValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

impl From<Vec<&str>> for SelectionValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multi(values.into_iter().map(str::to_owned).collect())
    }
}

/// Who owns the authoritative selection value.
///
/// Fixed when the engine is built; the engine matches on the variant
/// instead of probing for an external value at every call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Uncontrolled: the engine mutates this value on every selection.
    Owned(SelectionValue),
    /// Controlled: a read-only snapshot of a value owned elsewhere.
    Mirrored(SelectionValue),
}

impl ValueSource {
    /// The value currently in effect, regardless of owner.
    pub fn current(&self) -> &SelectionValue {
        match self {
            Self::Owned(v) | Self::Mirrored(v) => v,
        }
    }

    /// Whether an external owner supplies the value.
    pub fn is_controlled(&self) -> bool {
        matches!(self, Self::Mirrored(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_per_mode() {
        assert_eq!(
            SelectionValue::empty(SelectionMode::Single),
            SelectionValue::Single(String::new())
        );
        assert!(SelectionValue::empty(SelectionMode::Multi).is_empty());
    }

    #[test]
    fn contains_matches_per_mode() {
        let single = SelectionValue::from("a");
        assert!(single.contains("a"));
        assert!(!single.contains("b"));

        let multi = SelectionValue::from(vec!["a", "c"]);
        assert!(multi.contains("c"));
        assert!(!multi.contains("b"));
    }

    #[test]
    fn json_shape_is_untagged() {
        let single: SelectionValue = serde_json::from_str("\"daily\"").unwrap();
        assert_eq!(single, SelectionValue::from("daily"));

        let multi: SelectionValue = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(multi.mode(), SelectionMode::Multi);
        assert_eq!(serde_json::to_string(&multi).unwrap(), "[\"a\",\"b\"]");
    }

    #[test]
    fn expect_mode_rejects_wrong_shape() {
        let err = SelectionValue::from("a")
            .expect_mode(SelectionMode::Multi)
            .unwrap_err();
        assert!(matches!(
            err,
            SelectError::ModeMismatch {
                expected: SelectionMode::Multi
            }
        ));
    }

    #[test]
    fn value_source_reports_control() {
        let owned = ValueSource::Owned(SelectionValue::from("x"));
        let mirrored = ValueSource::Mirrored(SelectionValue::from("y"));
        assert!(!owned.is_controlled());
        assert!(mirrored.is_controlled());
        assert_eq!(mirrored.current(), &SelectionValue::from("y"));
    }
}
