//! Line-oriented colour picker driven by a [`SelectionEngine`].
//!
//! Each input line is one interaction:
//!
//! - a number selects the option with that index in the current listing
//! - `-` clears the colour
//! - `q` cancels without changing anything
//! - an empty line keeps the current selection
//! - anything else becomes the search term

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use medtrack_select::{SelectionEngine, SelectionMode, SelectionValue, catalog};
use tracing::debug;

use crate::helpers::format_option;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerInput {
    /// Zero-based index into the rendered listing.
    Select(usize),
    Search(String),
    Clear,
    Cancel,
    Done,
}

impl PickerInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => Self::Done,
            "q" | "Q" => Self::Cancel,
            "-" => Self::Clear,
            _ => match line.parse::<usize>() {
                Ok(n) if n > 0 => Self::Select(n - 1),
                _ => Self::Search(line.to_owned()),
            },
        }
    }
}

/// How a picker session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    /// A colour was chosen (hex value).
    Chosen(String),
    Cleared,
    Cancelled,
}

/// Result of feeding one line to the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerStep {
    Continue,
    /// The index did not name a listed option, or the option is disabled.
    Rejected,
    Finished(PickerOutcome),
}

pub struct ColorPicker {
    engine: SelectionEngine,
}

impl ColorPicker {
    /// Open a picker over the colour presets, starting at `current`.
    pub fn new(current: Option<&str>) -> Result<Self> {
        let mut builder = SelectionEngine::builder(SelectionMode::Single)
            .options(catalog::color_options())
            .searchable(true)
            .clearable(true)
            .placeholder("No colour");
        if let Some(current) = current {
            builder = builder.default_value(current);
        }
        let mut engine = builder.build()?;
        engine.request_open();
        Ok(Self { engine })
    }

    /// The listing as the user sees it: grouped render order of the
    /// filtered options.
    pub fn listing(&self) -> Vec<String> {
        self.engine
            .grouped_options()
            .render_order()
            .enumerate()
            .map(|(i, option)| format_option(i, option, self.engine.is_option_selected(option)))
            .collect()
    }

    pub fn apply(&mut self, input: PickerInput) -> Result<PickerStep> {
        debug!(input = ?input, "picker input");
        let step = match input {
            PickerInput::Select(index) => {
                let option = self
                    .engine
                    .grouped_options()
                    .render_order()
                    .nth(index)
                    .cloned();
                let Some(option) = option else {
                    return Ok(PickerStep::Rejected);
                };
                match self.engine.select_option(&option) {
                    Some(SelectionValue::Single(value)) => {
                        PickerStep::Finished(PickerOutcome::Chosen(value))
                    }
                    Some(_) => PickerStep::Continue,
                    None => PickerStep::Rejected,
                }
            }
            PickerInput::Search(term) => {
                self.engine.set_search_term(term)?;
                PickerStep::Continue
            }
            PickerInput::Clear => {
                self.engine.clear();
                self.engine.request_close();
                PickerStep::Finished(PickerOutcome::Cleared)
            }
            PickerInput::Cancel => {
                self.engine.request_close();
                PickerStep::Finished(PickerOutcome::Cancelled)
            }
            PickerInput::Done => {
                self.engine.request_close();
                match self.engine.value() {
                    SelectionValue::Single(v) if !v.is_empty() => {
                        PickerStep::Finished(PickerOutcome::Chosen(v.clone()))
                    }
                    _ => PickerStep::Finished(PickerOutcome::Cancelled),
                }
            }
        };
        Ok(step)
    }

    /// Drive the picker from `input` until it finishes. End of input cancels.
    pub fn run<R: BufRead, W: Write>(mut self, input: R, mut out: W) -> Result<PickerOutcome> {
        let mut lines = input.lines();
        loop {
            writeln!(out, "Current: {}", self.engine.display_value())?;
            if !self.engine.search_term().is_empty() {
                writeln!(out, "Search: {}", self.engine.search_term())?;
            }
            let listing = self.listing();
            if listing.is_empty() {
                writeln!(out, "  (no matches)")?;
            }
            for line in listing {
                writeln!(out, "{line}")?;
            }
            write!(out, "number / search / - clear / q quit > ")?;
            out.flush()?;

            let Some(line) = lines.next() else {
                self.engine.request_close();
                return Ok(PickerOutcome::Cancelled);
            };
            let line = line.context("failed to read input")?;

            match self.apply(PickerInput::parse(&line))? {
                PickerStep::Continue => {}
                PickerStep::Rejected => writeln!(out, "No such option.")?,
                PickerStep::Finished(outcome) => return Ok(outcome),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn hex_of(name: &str) -> String {
        catalog::COLOR_PRESETS
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(hex, _)| (*hex).to_owned())
            .unwrap()
    }

    #[test]
    fn parse_inputs() {
        assert_eq!(PickerInput::parse("3"), PickerInput::Select(2));
        assert_eq!(PickerInput::parse("  "), PickerInput::Done);
        assert_eq!(PickerInput::parse("q"), PickerInput::Cancel);
        assert_eq!(PickerInput::parse("-"), PickerInput::Clear);
        assert_eq!(PickerInput::parse("gre"), PickerInput::Search("gre".into()));
        assert_eq!(PickerInput::parse("0"), PickerInput::Search("0".into()));
    }

    #[test]
    fn search_then_select_uses_filtered_index() {
        let mut picker = ColorPicker::new(None).unwrap();
        picker.apply(PickerInput::Search("grey".into())).unwrap();
        assert_eq!(picker.listing().len(), 2);

        let step = picker.apply(PickerInput::Select(1)).unwrap();
        assert_eq!(step, PickerStep::Finished(PickerOutcome::Chosen(hex_of("Light Grey"))));
        assert!(!picker.engine.is_open());
        assert!(picker.engine.search_term().is_empty());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut picker = ColorPicker::new(None).unwrap();
        assert_eq!(picker.apply(PickerInput::Select(99)).unwrap(), PickerStep::Rejected);
        assert!(picker.engine.is_open());
    }

    #[test]
    fn done_keeps_current_colour() {
        let blue = hex_of("Blue");
        let mut picker = ColorPicker::new(Some(&blue)).unwrap();
        assert!(picker.listing()[0].contains("[x]"));
        assert_eq!(
            picker.apply(PickerInput::Done).unwrap(),
            PickerStep::Finished(PickerOutcome::Chosen(blue))
        );
    }

    #[test]
    fn done_without_colour_cancels() {
        let mut picker = ColorPicker::new(None).unwrap();
        assert_eq!(
            picker.apply(PickerInput::Done).unwrap(),
            PickerStep::Finished(PickerOutcome::Cancelled)
        );
    }

    #[test]
    fn run_reads_until_a_choice() {
        let picker = ColorPicker::new(None).unwrap();
        let input = Cursor::new("purple\n1\n");
        let mut out = Vec::new();

        let outcome = picker.run(input, &mut out).unwrap();
        assert_eq!(outcome, PickerOutcome::Chosen(hex_of("Purple")));

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Search: purple"));
        assert!(printed.contains("Current: No colour"));
    }

    #[test]
    fn run_reports_unknown_numbers_and_eof_cancels() {
        let picker = ColorPicker::new(None).unwrap();
        let mut out = Vec::new();
        let outcome = picker.run(Cursor::new("42\n"), &mut out).unwrap();
        assert_eq!(outcome, PickerOutcome::Cancelled);
        assert!(String::from_utf8(out).unwrap().contains("No such option."));
    }
}
