//! Shared helpers for the CLI commands.

use anyhow::{Result, bail};
use chrono::NaiveTime;
use medtrack_select::{SelectOption, catalog, filter_options};
use medtrack_store::MedicationRecord;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

/// Validate a reminder time and normalise it to `HH:MM`.
pub fn parse_time(input: &str) -> Result<String> {
    match NaiveTime::parse_from_str(input.trim(), "%H:%M") {
        Ok(t) => Ok(t.format("%H:%M").to_string()),
        Err(_) => bail!("invalid time {input:?}, expected HH:MM"),
    }
}

/// Resolve a colour argument to a hex value.
///
/// Accepts a raw `#rrggbb` value, or a search term that matches exactly one
/// preset by name or hex.
pub fn resolve_color(input: &str) -> Result<String> {
    let input = input.trim();
    if is_hex_color(input) {
        return Ok(input.to_ascii_lowercase());
    }

    let options = catalog::color_options();
    let matches = filter_options(&options, input);
    if let Some(exact) = matches
        .iter()
        .find(|o| o.label.eq_ignore_ascii_case(input))
    {
        return Ok(exact.value.clone());
    }
    match matches.as_slice() {
        [only] => Ok(only.value.clone()),
        [] => bail!("unknown colour {input:?}"),
        many => bail!(
            "colour {input:?} is ambiguous: {}",
            many.iter()
                .map(|o| o.label.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Preset name for a hex colour, if it is one.
pub fn color_name(hex: &str) -> Option<&'static str> {
    catalog::COLOR_PRESETS
        .iter()
        .find(|(value, _)| value.eq_ignore_ascii_case(hex))
        .map(|(_, name)| *name)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One table row for `medtrack list`.
pub fn format_record(record: &MedicationRecord) -> String {
    let color = record
        .color_id
        .as_deref()
        .map(|hex| color_name(hex).map_or_else(|| hex.to_owned(), str::to_owned))
        .unwrap_or_default();
    format!(
        "{:<38} {:<20} {:<10} {:<6} {}",
        record.id,
        record.medication.as_deref().unwrap_or("-"),
        record.dosage.as_deref().unwrap_or("-"),
        record.time.as_deref().unwrap_or("-"),
        color,
    )
}

/// One picker line: index, selection marker and label.
pub fn format_option(index: usize, option: &SelectOption, selected: bool) -> String {
    let marker = if selected { "x" } else { " " };
    let disabled = if option.disabled { " (disabled)" } else { "" };
    format!("{:>3}. [{marker}] {}{disabled}", index + 1, option.label)
}
