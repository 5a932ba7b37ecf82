//! The selection engine state machine.
//!
//! One [`SelectionEngine`] backs one rendered dropdown. It owns the open
//! flag and the search term, and either owns or mirrors the selection value
//! depending on the [`ValueSource`] picked at build time.
//!
//! ```text
//! single:  Closed --open--> Open --select--> Closed
//!                           Open --dismiss-> Closed
//!                           Open --search--> Open
//! multi:   Open --select--> Open
//!          Open --dismiss/close--> Closed
//! ```
//!
//! Every transition that closes the dropdown also clears the search term.

use std::fmt;

use tracing::debug;

use crate::error::{Result, SelectError};
use crate::option::{GroupedOptions, SelectOption, filter_options, group_options};
use crate::value::{SelectionMode, SelectionValue, ValueSource};

/// Callback invoked with every value the engine emits.
pub type ChangeCallback = Box<dyn FnMut(&SelectionValue) + Send>;

/// Control-level flags that do not change the selection semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectConfig {
    /// Whether a search box filters the options.
    pub searchable: bool,
    /// Whether a clear affordance is offered.
    pub clearable: bool,
    /// A disabled control ignores trigger clicks.
    pub disabled: bool,
    /// A loading control ignores trigger clicks.
    pub loading: bool,
    /// Text shown when nothing resolves to an option.
    pub placeholder: String,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            searchable: false,
            clearable: false,
            disabled: false,
            loading: false,
            placeholder: "Select an option".to_owned(),
        }
    }
}

/// Single- or multi-select state machine over a list of options.
pub struct SelectionEngine {
    options: Vec<SelectOption>,
    mode: SelectionMode,
    source: ValueSource,
    config: SelectConfig,
    search_term: String,
    is_open: bool,
    on_change: Option<ChangeCallback>,
}

impl fmt::Debug for SelectionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionEngine")
            .field("mode", &self.mode)
            .field("source", &self.source)
            .field("options", &self.options.len())
            .field("search_term", &self.search_term)
            .field("is_open", &self.is_open)
            .finish_non_exhaustive()
    }
}

impl SelectionEngine {
    /// Start building an engine for `mode`.
    pub fn builder(mode: SelectionMode) -> SelectionEngineBuilder {
        SelectionEngineBuilder {
            mode,
            options: Vec::new(),
            initial: Initial::None,
            config: SelectConfig::default(),
            on_change: None,
        }
    }

    // ── readouts ─────────────────────────────────────────────────────

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_controlled(&self) -> bool {
        self.source.is_controlled()
    }

    /// The selection currently in effect.
    pub fn value(&self) -> &SelectionValue {
        self.source.current()
    }

    pub fn value_source(&self) -> &ValueSource {
        &self.source
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn config(&self) -> &SelectConfig {
        &self.config
    }

    /// Update control-level flags such as `disabled` or `loading`.
    pub fn config_mut(&mut self) -> &mut SelectConfig {
        &mut self.config
    }

    // ── value ownership ──────────────────────────────────────────────

    /// Overwrite the mirrored value of a controlled engine.
    ///
    /// Values naming options absent from the catalogue are kept verbatim;
    /// they simply render as unselected until a matching option arrives.
    /// The only rejection is a value of the wrong shape for the engine's
    /// mode (a list on a single-select or a string on a multi-select),
    /// which returns [`SelectError::ModeMismatch`] and leaves the value
    /// unchanged. An uncontrolled engine returns
    /// [`SelectError::NotControlled`].
    pub fn set_external_value(&mut self, value: SelectionValue) -> Result<()> {
        let value = value.expect_mode(self.mode)?;
        match &mut self.source {
            ValueSource::Mirrored(current) => {
                debug!(value = ?value, "mirrored value replaced");
                *current = value;
                Ok(())
            }
            ValueSource::Owned(_) => Err(SelectError::NotControlled),
        }
    }

    /// Replace the option catalogue. The value is left untouched.
    pub fn set_options(&mut self, options: Vec<SelectOption>) {
        debug!(count = options.len(), "options replaced");
        self.options = options;
    }

    // ── selection ────────────────────────────────────────────────────

    /// Apply a user's choice of `option`.
    ///
    /// Returns the emitted value, or `None` when the option is disabled (in
    /// which case nothing changes and nothing is emitted). In single mode
    /// this is one compound transition: the value is set, the dropdown
    /// closes, and the search term is cleared.
    pub fn select_option(&mut self, option: &SelectOption) -> Option<SelectionValue> {
        if option.disabled {
            debug!(value = %option.value, "ignored selection of disabled option");
            return None;
        }

        let next = match self.value() {
            SelectionValue::Single(_) => SelectionValue::Single(option.value.clone()),
            SelectionValue::Multi(current) => {
                let mut next = current.clone();
                if let Some(pos) = next.iter().position(|v| *v == option.value) {
                    next.remove(pos);
                } else {
                    next.push(option.value.clone());
                }
                SelectionValue::Multi(next)
            }
        };

        if self.mode == SelectionMode::Single {
            self.close();
        }

        Some(self.commit(next))
    }

    /// Select the catalogue option whose value is `value`.
    ///
    /// Convenience for presentation layers that only hold the identifier.
    pub fn select_value(&mut self, value: &str) -> Result<Option<SelectionValue>> {
        let option = self
            .options
            .iter()
            .find(|o| o.value == value)
            .cloned()
            .ok_or_else(|| SelectError::UnknownOption(value.to_owned()))?;
        Ok(self.select_option(&option))
    }

    /// Reset to "no selection" and emit it. The open flag is untouched.
    pub fn clear(&mut self) -> SelectionValue {
        self.commit(SelectionValue::empty(self.mode))
    }

    /// Store the value when uncontrolled and notify the caller.
    fn commit(&mut self, next: SelectionValue) -> SelectionValue {
        if let ValueSource::Owned(current) = &mut self.source {
            *current = next.clone();
        }
        debug!(value = ?next, controlled = self.source.is_controlled(), "selection emitted");
        if let Some(callback) = self.on_change.as_mut() {
            callback(&next);
        }
        next
    }

    pub fn is_option_selected(&self, option: &SelectOption) -> bool {
        self.value().contains(&option.value)
    }

    /// Catalogue options that the current value resolves to.
    ///
    /// Values without a matching option are skipped here but stay in
    /// [`value`](Self::value).
    pub fn selected_options(&self) -> Vec<&SelectOption> {
        match self.value() {
            SelectionValue::Single(v) if v.is_empty() => Vec::new(),
            SelectionValue::Single(v) => self
                .options
                .iter()
                .find(|o| o.value == *v)
                .into_iter()
                .collect(),
            SelectionValue::Multi(vs) => self
                .options
                .iter()
                .filter(|o| vs.contains(&o.value))
                .collect(),
        }
    }

    /// Text for the trigger: selected labels, or the placeholder.
    pub fn display_value(&self) -> String {
        let labels: Vec<&str> = self
            .selected_options()
            .into_iter()
            .map(|o| o.label.as_str())
            .collect();
        if labels.is_empty() {
            self.config.placeholder.clone()
        } else {
            labels.join(", ")
        }
    }

    /// Whether the clear affordance should be shown right now.
    pub fn is_clearable_now(&self) -> bool {
        self.config.clearable && !self.config.disabled && !self.selected_options().is_empty()
    }

    // ── search ───────────────────────────────────────────────────────

    pub fn set_search_term(&mut self, term: impl Into<String>) -> Result<()> {
        if !self.config.searchable {
            return Err(SelectError::SearchDisabled);
        }
        self.search_term = term.into();
        debug!(term = %self.search_term, "search term updated");
        Ok(())
    }

    /// Options surviving the current search term, in catalogue order.
    pub fn filtered_options(&self) -> Vec<&SelectOption> {
        if !self.config.searchable {
            return self.options.iter().collect();
        }
        filter_options(&self.options, &self.search_term)
    }

    /// Filtered options partitioned for rendering.
    pub fn grouped_options(&self) -> GroupedOptions<'_> {
        group_options(self.filtered_options())
    }

    // ── open / close ─────────────────────────────────────────────────

    pub fn request_open(&mut self) {
        if !self.is_open {
            debug!("dropdown opened");
        }
        self.is_open = true;
    }

    /// Close the dropdown, discarding any in-progress search.
    pub fn request_close(&mut self) {
        self.close();
    }

    /// Trigger click: flip the open state unless the control is disabled or
    /// loading.
    pub fn toggle(&mut self) {
        if self.config.disabled || self.config.loading {
            return;
        }
        if self.is_open {
            self.close();
        } else {
            self.request_open();
        }
    }

    /// Whether a pointer interaction should dismiss the dropdown.
    pub fn should_dismiss_on(&self, pointer_target_is_inside_region: bool) -> bool {
        self.is_open && !pointer_target_is_inside_region
    }

    /// Wire an outside-interaction notification straight to a close.
    ///
    /// Returns `true` when the dropdown was dismissed.
    pub fn handle_pointer(&mut self, pointer_target_is_inside_region: bool) -> bool {
        let dismiss = self.should_dismiss_on(pointer_target_is_inside_region);
        if dismiss {
            self.close();
        }
        dismiss
    }

    fn close(&mut self) {
        if self.is_open {
            debug!("dropdown closed");
        }
        self.is_open = false;
        self.search_term.clear();
    }
}

// ── builder ──────────────────────────────────────────────────────────

enum Initial {
    None,
    Default(SelectionValue),
    Controlled(SelectionValue),
}

/// Builder for [`SelectionEngine`].
pub struct SelectionEngineBuilder {
    mode: SelectionMode,
    options: Vec<SelectOption>,
    initial: Initial,
    config: SelectConfig,
    on_change: Option<ChangeCallback>,
}

impl SelectionEngineBuilder {
    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    /// Start uncontrolled with `value`.
    pub fn default_value(mut self, value: impl Into<SelectionValue>) -> Self {
        self.initial = Initial::Default(value.into());
        self
    }

    /// Mirror `value`, owned by the caller. The engine stays controlled for
    /// its whole lifetime.
    pub fn controlled(mut self, value: impl Into<SelectionValue>) -> Self {
        self.initial = Initial::Controlled(value.into());
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.config.searchable = searchable;
        self
    }

    pub fn clearable(mut self, clearable: bool) -> Self {
        self.config.clearable = clearable;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.config.disabled = disabled;
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.config.loading = loading;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.config.placeholder = placeholder.into();
        self
    }

    /// Register the value-change callback.
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&SelectionValue) + Send + 'static,
    {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Build the engine, checking that any initial value fits the mode.
    pub fn build(self) -> Result<SelectionEngine> {
        let source = match self.initial {
            Initial::None => ValueSource::Owned(SelectionValue::empty(self.mode)),
            Initial::Default(v) => ValueSource::Owned(v.expect_mode(self.mode)?),
            Initial::Controlled(v) => ValueSource::Mirrored(v.expect_mode(self.mode)?),
        };

        debug!(
            mode = %self.mode,
            controlled = source.is_controlled(),
            options = self.options.len(),
            "selection engine created"
        );

        Ok(SelectionEngine {
            options: self.options,
            mode: self.mode,
            source,
            config: self.config,
            search_term: String::new(),
            is_open: false,
            on_change: self.on_change,
        })
    }
}

// ── tests ────────────────────────────────────────────────────────────
