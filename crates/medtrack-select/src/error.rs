//! Error types for the selection engine.
//!
//! Nothing in the engine is fatal. These errors only report misuse of an
//! operation (feeding a list into a single-select engine, typing into a
//! control whose search is disabled) or a rejected edit in a typed input.

use crate::value::SelectionMode;

/// Alias for `Result<T, SelectError>`.
pub type Result<T> = std::result::Result<T, SelectError>;

/// Errors raised by the selection engine and the typed input dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    /// An external value was pushed into an engine that owns its own value.
    #[error("engine is uncontrolled; external values are not accepted")]
    NotControlled,

    /// The shape of a value does not match the engine's mode.
    #[error("value shape does not match {expected} mode")]
    ModeMismatch { expected: SelectionMode },

    /// A search term was supplied to an engine built without search.
    #[error("search is not enabled for this control")]
    SearchDisabled,

    /// The JSON text entered into a json input does not parse.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// A list input already holds its maximum number of entries.
    #[error("list already holds the maximum of {max} items")]
    TooManyItems { max: usize },

    /// An index edit referenced an entry past the end of a list input.
    #[error("item index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A date/time pair did not form a valid timestamp.
    #[error("invalid date/time: {0}")]
    InvalidDateTime(String),

    /// The edit does not apply to this kind of input.
    #[error("edit `{edit}` is not supported by {kind} inputs")]
    UnsupportedEdit { edit: &'static str, kind: &'static str },

    /// A choice referenced a value absent from the control's catalogue.
    #[error("unknown option: {0}")]
    UnknownOption(String),
}
