//! Selectable options, search filtering, and grouping.
//!
//! Filtering and grouping are free functions over borrowed option slices so
//! the engine can recompute them on every render without caching. Both
//! always start from the raw catalogue, which keeps repeated calls with the
//! same inputs idempotent.

use serde::{Deserialize, Serialize};

/// One selectable entry in a selection control.
///
/// `value` uniqueness within a list is the caller's responsibility; the
/// engine never deduplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Identifier reported back through value changes.
    pub value: String,
    /// Human-readable display text.
    pub label: String,
    /// Disabled options can be rendered but never selected.
    #[serde(default)]
    pub disabled: bool,
    /// Options sharing a group render together under one heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Presentational token, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl SelectOption {
    /// Create an enabled, ungrouped option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
            group: None,
            icon: None,
        }
    }

    /// Create an option whose label equals its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(value.clone(), value)
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Case-insensitive substring match against label or value.
    ///
    /// `needle` must already be lowercased.
    fn matches_lowercase(&self, needle: &str) -> bool {
        self.label.to_lowercase().contains(needle) || self.value.to_lowercase().contains(needle)
    }
}

/// Options that share one group heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup<'a> {
    pub name: &'a str,
    pub options: Vec<&'a SelectOption>,
}

/// Filtered options split for rendering: ungrouped first, then each group in
/// order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedOptions<'a> {
    pub ungrouped: Vec<&'a SelectOption>,
    pub groups: Vec<OptionGroup<'a>>,
}

impl<'a> GroupedOptions<'a> {
    /// Look up a group's options by name.
    pub fn group(&self, name: &str) -> Option<&[&'a SelectOption]> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.options.as_slice())
    }

    /// Whether the partition holds no options at all.
    pub fn is_empty(&self) -> bool {
        self.ungrouped.is_empty() && self.groups.is_empty()
    }

    /// Options in render order: ungrouped, then each group in turn.
    pub fn render_order(&self) -> impl Iterator<Item = &'a SelectOption> + '_ {
        self.ungrouped
            .iter()
            .copied()
            .chain(self.groups.iter().flat_map(|g| g.options.iter().copied()))
    }
}

/// Keep the options whose label or value contains `term`, ignoring case.
///
/// An empty term passes every option through in its original order.
pub fn filter_options<'a>(options: &'a [SelectOption], term: &str) -> Vec<&'a SelectOption> {
    if term.is_empty() {
        return options.iter().collect();
    }
    let needle = term.to_lowercase();
    options
        .iter()
        .filter(|opt| opt.matches_lowercase(&needle))
        .collect()
}

/// Partition options into ungrouped entries and named groups.
pub fn group_options<'a, I>(options: I) -> GroupedOptions<'a>
where
    I: IntoIterator<Item = &'a SelectOption>,
{
    let mut grouped = GroupedOptions::default();
    for opt in options {
        match opt.group.as_deref() {
            None => grouped.ungrouped.push(opt),
            Some(name) => match grouped.groups.iter_mut().find(|g| g.name == name) {
                Some(group) => group.options.push(opt),
                None => grouped.groups.push(OptionGroup {
                    name,
                    options: vec![opt],
                }),
            },
        }
    }
    grouped
}
