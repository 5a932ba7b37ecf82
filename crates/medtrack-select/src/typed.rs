//! Typed data input dispatcher.
//!
//! A [`TypedInput`] picks an editing widget from its [`DataKind`] and turns
//! raw edits into emitted [`TypedValue`]s. Timezone and color inputs reuse
//! the selection engine in controlled mode: the input owns the value and
//! pushes it back into the engine after every change.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog;
use crate::engine::SelectionEngine;
use crate::error::{Result, SelectError};
use crate::value::{SelectionMode, SelectionValue};

/// Maximum number of recurrence rules.
pub const MAX_RECURRENCE_RULES: usize = 10;
/// Maximum number of entries in a generic array input.
pub const MAX_ARRAY_ITEMS: usize = 20;

/// The kind of data an input edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Text,
    Number,
    Email,
    Url,
    Date,
    Time,
    Datetime,
    Timezone,
    Color,
    Recurrence,
    Json,
    Array,
    Phone,
    Location,
}

impl DataKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Email => "email",
            Self::Url => "url",
            Self::Date => "date",
            Self::Time => "time",
            Self::Datetime => "datetime",
            Self::Timezone => "timezone",
            Self::Color => "color",
            Self::Recurrence => "recurrence",
            Self::Json => "json",
            Self::Array => "array",
            Self::Phone => "phone",
            Self::Location => "location",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value emitted by a typed input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    Empty,
    Text(String),
    List(Vec<String>),
    Json(serde_json::Value),
}

impl TypedValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A raw edit coming from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedEdit {
    /// Replace the whole text of a free-form input.
    Text(String),
    /// Change the date half (`YYYY-MM-DD`) of a datetime input.
    Date(String),
    /// Change the time half (`HH:MM`) of a datetime input.
    Time(String),
    /// Pick an option from a timezone or color input's catalogue.
    Choose(String),
    /// Append a blank entry to a list input.
    AddItem,
    /// Replace one entry of a list input.
    EditItem { index: usize, value: String },
    /// Drop one entry of a list input.
    RemoveItem(usize),
}

impl TypedEdit {
    fn name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::Choose(_) => "choose",
            Self::AddItem => "add_item",
            Self::EditItem { .. } => "edit_item",
            Self::RemoveItem(_) => "remove_item",
        }
    }
}

enum Widget {
    Plain,
    DateTime { date: String, time: String },
    Choice(SelectionEngine),
    List { items: Vec<String>, max: usize, item_label: &'static str },
    Json { text: String, error: Option<String> },
}

/// One typed input field.
pub struct TypedInput {
    kind: DataKind,
    value: TypedValue,
    widget: Widget,
}

impl fmt::Debug for TypedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedInput")
            .field("kind", &self.kind)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

impl TypedInput {
    /// Create an empty input of `kind`.
    pub fn new(kind: DataKind) -> Result<Self> {
        Self::with_value(kind, TypedValue::Empty)
    }

    /// Create an input of `kind` pre-filled with `value`.
    pub fn with_value(kind: DataKind, value: TypedValue) -> Result<Self> {
        let widget = match kind {
            DataKind::Datetime => {
                let iso = value.as_text().unwrap_or_default();
                Widget::DateTime {
                    date: iso.get(0..10).unwrap_or_default().to_owned(),
                    time: iso.get(11..16).unwrap_or_default().to_owned(),
                }
            }
            DataKind::Timezone | DataKind::Color => {
                let options = if kind == DataKind::Timezone {
                    catalog::timezone_options()
                } else {
                    catalog::color_options()
                };
                let current = value.as_text().unwrap_or_default().to_owned();
                let engine = SelectionEngine::builder(SelectionMode::Single)
                    .options(options)
                    .searchable(kind == DataKind::Timezone)
                    .controlled(current)
                    .build()?;
                Widget::Choice(engine)
            }
            DataKind::Recurrence | DataKind::Array => {
                let items = match &value {
                    TypedValue::List(items) => items.clone(),
                    _ => Vec::new(),
                };
                let (max, item_label) = if kind == DataKind::Recurrence {
                    (MAX_RECURRENCE_RULES, "RRULE")
                } else {
                    (MAX_ARRAY_ITEMS, "Item")
                };
                Widget::List {
                    items,
                    max,
                    item_label,
                }
            }
            DataKind::Json => {
                let text = match &value {
                    TypedValue::Json(serde_json::Value::Null) | TypedValue::Empty => String::new(),
                    TypedValue::Json(v) => serde_json::to_string_pretty(v)
                        .map_err(|e| SelectError::InvalidJson(e.to_string()))?,
                    TypedValue::Text(s) => s.clone(),
                    TypedValue::List(_) => String::new(),
                };
                Widget::Json { text, error: None }
            }
            _ => Widget::Plain,
        };

        Ok(Self {
            kind,
            value,
            widget,
        })
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    /// The last emitted (or initial) value.
    pub fn value(&self) -> &TypedValue {
        &self.value
    }

    /// The selection engine behind timezone and color inputs.
    pub fn engine(&self) -> Option<&SelectionEngine> {
        match &self.widget {
            Widget::Choice(engine) => Some(engine),
            _ => None,
        }
    }

    pub fn engine_mut(&mut self) -> Option<&mut SelectionEngine> {
        match &mut self.widget {
            Widget::Choice(engine) => Some(engine),
            _ => None,
        }
    }

    /// Entries of a list input.
    pub fn items(&self) -> &[String] {
        match &self.widget {
            Widget::List { items, .. } => items.as_slice(),
            _ => &[],
        }
    }

    /// Heading for list entries (`RRULE` or `Item`).
    pub fn item_label(&self) -> Option<&'static str> {
        match &self.widget {
            Widget::List { item_label, .. } => Some(*item_label),
            _ => None,
        }
    }

    /// Whether another list entry may be added.
    pub fn can_add_item(&self) -> bool {
        matches!(&self.widget, Widget::List { items, max, .. } if items.len() < *max)
    }

    /// Local validation message of a json input.
    pub fn error(&self) -> Option<&str> {
        match &self.widget {
            Widget::Json { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    /// Raw text of a json input.
    pub fn json_text(&self) -> Option<&str> {
        match &self.widget {
            Widget::Json { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }

    /// The `(date, time)` halves of a datetime input.
    pub fn datetime_parts(&self) -> Option<(&str, &str)> {
        match &self.widget {
            Widget::DateTime { date, time } => Some((date.as_str(), time.as_str())),
            _ => None,
        }
    }

    /// Apply an edit. Returns the emitted value, or `None` when the edit
    /// changed local state without producing a complete value.
    pub fn apply(&mut self, edit: TypedEdit) -> Result<Option<TypedValue>> {
        let kind = self.kind;
        let unsupported = |edit: &TypedEdit| SelectError::UnsupportedEdit {
            edit: edit.name(),
            kind: kind.as_str(),
        };

        let emitted = match (&mut self.widget, edit) {
            (Widget::Plain, TypedEdit::Text(text)) => Some(TypedValue::Text(text)),

            (Widget::DateTime { date, time }, TypedEdit::Date(d)) => {
                *date = d;
                compose_datetime(date, time)?
            }
            (Widget::DateTime { date, time }, TypedEdit::Time(t)) => {
                *time = t;
                compose_datetime(date, time)?
            }

            (Widget::Choice(engine), TypedEdit::Choose(choice)) => {
                match engine.select_value(&choice)? {
                    Some(SelectionValue::Single(v)) => {
                        engine.set_external_value(SelectionValue::Single(v.clone()))?;
                        Some(TypedValue::Text(v))
                    }
                    _ => None,
                }
            }
            (Widget::Choice(engine), TypedEdit::Text(text)) if kind == DataKind::Color => {
                engine.set_external_value(SelectionValue::Single(text.clone()))?;
                Some(TypedValue::Text(text))
            }

            (Widget::List { items, max, .. }, TypedEdit::AddItem) => {
                if items.len() >= *max {
                    return Err(SelectError::TooManyItems { max: *max });
                }
                items.push(String::new());
                Some(TypedValue::List(items.clone()))
            }
            (Widget::List { items, .. }, TypedEdit::EditItem { index, value }) => {
                let len = items.len();
                let slot = items
                    .get_mut(index)
                    .ok_or(SelectError::IndexOutOfRange { index, len })?;
                *slot = value;
                Some(TypedValue::List(items.clone()))
            }
            (Widget::List { items, .. }, TypedEdit::RemoveItem(index)) => {
                if index >= items.len() {
                    return Err(SelectError::IndexOutOfRange {
                        index,
                        len: items.len(),
                    });
                }
                items.remove(index);
                Some(TypedValue::List(items.clone()))
            }

            (Widget::Json { text, error }, TypedEdit::Text(raw)) => {
                *text = raw;
                if text.trim().is_empty() {
                    *error = None;
                    Some(TypedValue::Json(serde_json::Value::Null))
                } else {
                    match serde_json::from_str::<serde_json::Value>(text) {
                        Ok(parsed) => {
                            *error = None;
                            Some(TypedValue::Json(parsed))
                        }
                        Err(err) => {
                            *error = Some("Invalid JSON format".to_owned());
                            return Err(SelectError::InvalidJson(err.to_string()));
                        }
                    }
                }
            }

            (_, edit) => return Err(unsupported(&edit)),
        };

        if let Some(value) = &emitted {
            debug!(kind = %self.kind, value = ?value, "typed input emitted");
            self.value = value.clone();
        }
        Ok(emitted)
    }
}

/// Join date and time halves into `YYYY-MM-DDTHH:MM:00.000Z` once both are
/// present.
fn compose_datetime(date: &str, time: &str) -> Result<Option<TypedValue>> {
    if date.is_empty() || time.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| SelectError::InvalidDateTime(format!("date {date:?}: {e}")))?;
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|e| SelectError::InvalidDateTime(format!("time {time:?}: {e}")))?;
    Ok(Some(TypedValue::Text(format!("{date}T{time}:00.000Z"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_emits_only_when_both_halves_set() {
        let mut input = TypedInput::new(DataKind::Datetime).unwrap();
        assert_eq!(input.apply(TypedEdit::Date("2026-10-19".into())).unwrap(), None);

        let emitted = input.apply(TypedEdit::Time("08:30".into())).unwrap();
        assert_eq!(
            emitted,
            Some(TypedValue::Text("2026-10-19T08:30:00.000Z".into()))
        );
    }

    #[test]
    fn datetime_splits_initial_value() {
        let input = TypedInput::with_value(
            DataKind::Datetime,
            TypedValue::Text("2026-01-02T21:15:00.000Z".into()),
        )
        .unwrap();
        assert_eq!(input.datetime_parts(), Some(("2026-01-02", "21:15")));
    }

    #[test]
    fn datetime_rejects_garbage() {
        let mut input = TypedInput::new(DataKind::Datetime).unwrap();
        input.apply(TypedEdit::Date("2026-13-40".into())).unwrap();
        let err = input.apply(TypedEdit::Time("08:00".into())).unwrap_err();
        assert!(matches!(err, SelectError::InvalidDateTime(_)));
    }

    #[test]
    fn timezone_choice_goes_through_engine() {
        let mut input = TypedInput::new(DataKind::Timezone).unwrap();
        let emitted = input.apply(TypedEdit::Choose("Asia/Tokyo".into())).unwrap();
        assert_eq!(emitted, Some(TypedValue::Text("Asia/Tokyo".into())));

        let engine = input.engine().unwrap();
        assert!(engine.is_controlled());
        assert_eq!(engine.display_value(), "Asia/Tokyo");
    }

    #[test]
    fn color_accepts_free_entry() {
        let mut input = TypedInput::new(DataKind::Color).unwrap();
        input.apply(TypedEdit::Choose("#0b8043".into())).unwrap();
        assert_eq!(input.engine().unwrap().display_value(), "Green");

        input.apply(TypedEdit::Text("#123456".into())).unwrap();
        assert_eq!(input.value(), &TypedValue::Text("#123456".into()));
        assert!(input.engine().unwrap().selected_options().is_empty());
    }

    #[test]
    fn recurrence_caps_at_ten_rules() {
        let mut input = TypedInput::new(DataKind::Recurrence).unwrap();
        assert_eq!(input.item_label(), Some("RRULE"));
        for _ in 0..MAX_RECURRENCE_RULES {
            input.apply(TypedEdit::AddItem).unwrap();
        }
        assert!(!input.can_add_item());
        assert!(matches!(
            input.apply(TypedEdit::AddItem),
            Err(SelectError::TooManyItems { max: 10 })
        ));
    }

    #[test]
    fn array_edit_and_remove() {
        let mut input = TypedInput::with_value(
            DataKind::Array,
            TypedValue::List(vec!["a".into(), "b".into()]),
        )
        .unwrap();
        input
            .apply(TypedEdit::EditItem {
                index: 1,
                value: "c".into(),
            })
            .unwrap();
        let emitted = input.apply(TypedEdit::RemoveItem(0)).unwrap();
        assert_eq!(emitted, Some(TypedValue::List(vec!["c".into()])));
        assert!(matches!(
            input.apply(TypedEdit::RemoveItem(3)),
            Err(SelectError::IndexOutOfRange { index: 3, len: 1 })
        ));
    }

    #[test]
    fn json_parses_or_keeps_local_error() {
        let mut input = TypedInput::new(DataKind::Json).unwrap();
        let err = input.apply(TypedEdit::Text("{oops".into())).unwrap_err();
        assert!(matches!(err, SelectError::InvalidJson(_)));
        assert_eq!(input.error(), Some("Invalid JSON format"));
        assert_eq!(input.value(), &TypedValue::Empty);

        let emitted = input.apply(TypedEdit::Text(r#"{"a":1}"#.into())).unwrap();
        assert_eq!(emitted, Some(TypedValue::Json(serde_json::json!({"a": 1}))));
        assert_eq!(input.error(), None);

        let cleared = input.apply(TypedEdit::Text("  ".into())).unwrap();
        assert_eq!(cleared, Some(TypedValue::Json(serde_json::Value::Null)));
    }

    #[test]
    fn plain_kinds_pass_text_through() {
        let mut input = TypedInput::new(DataKind::Phone).unwrap();
        let emitted = input.apply(TypedEdit::Text("+1 555 0100".into())).unwrap();
        assert_eq!(emitted, Some(TypedValue::Text("+1 555 0100".into())));
    }

    #[test]
    fn mismatched_edit_is_rejected() {
        let mut input = TypedInput::new(DataKind::Email).unwrap();
        let err = input.apply(TypedEdit::AddItem).unwrap_err();
        assert!(matches!(
            err,
            SelectError::UnsupportedEdit {
                edit: "add_item",
                kind: "email"
            }
        ));
    }
}
