//! Built-in option catalogues used by the typed inputs and the medication
//! form.

use crate::option::SelectOption;

/// Timezones offered by timezone inputs.
pub const TIMEZONES: &[&str] = &[
    "UTC",
    "America/New_York",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "America/Toronto",
    "Europe/London",
    "Europe/Paris",
    "Europe/Berlin",
    "Asia/Tokyo",
    "Asia/Shanghai",
    "Asia/Singapore",
    "Australia/Sydney",
    "Pacific/Auckland",
];

/// Preset swatches offered by color inputs, as `(hex, name)`.
pub const COLOR_PRESETS: &[(&str, &str)] = &[
    ("#1a73e8", "Blue"),
    ("#0b8043", "Green"),
    ("#c5221f", "Red"),
    ("#f09300", "Orange"),
    ("#833ab4", "Purple"),
    ("#b80672", "Pink"),
    ("#5e5e5e", "Grey"),
    ("#f6bf26", "Yellow"),
    ("#8f8f8f", "Light Grey"),
];

/// Repeat frequencies for the medication form's box select.
pub const FREQUENCIES: &[&str] = &["Daily", "Weekly", "Monthly"];

/// Timezone options grouped by region (`America`, `Europe`, ...), with
/// `UTC` left ungrouped.
pub fn timezone_options() -> Vec<SelectOption> {
    TIMEZONES
        .iter()
        .map(|tz| match tz.split_once('/') {
            Some((region, _)) => SelectOption::plain(*tz).with_group(region),
            None => SelectOption::plain(*tz),
        })
        .collect()
}

/// Color preset options; the hex code is the value.
pub fn color_options() -> Vec<SelectOption> {
    COLOR_PRESETS
        .iter()
        .map(|(hex, name)| SelectOption::new(*hex, *name).with_icon(*hex))
        .collect()
}

pub fn frequency_options() -> Vec<SelectOption> {
    FREQUENCIES.iter().map(|f| SelectOption::plain(*f)).collect()
}
