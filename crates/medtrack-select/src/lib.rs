//! # medtrack-select
//!
//! Selection engine shared by every dropdown in medtrack.
//!
//! The engine is pure state: no I/O, no rendering. A presentation layer
//! hands it an option list, forwards user gestures (open, type, pick,
//! click outside), and reads back what to draw.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  TypedInput (datetime, timezone, color,  │
//! │             recurrence, json, array...)  │
//! ├──────────────────────────────────────────┤
//! │  SelectionEngine                         │
//! │    ValueSource  Owned | Mirrored         │
//! │    open flag + search term               │
//! ├──────────────────────────────────────────┤
//! │  filter_options / group_options          │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```ignore
//! use medtrack_select::{SelectOption, SelectionEngine, SelectionMode};
//!
//! let mut engine = SelectionEngine::builder(SelectionMode::Single)
//!     .options(vec![SelectOption::new("am", "Morning")])
//!     .searchable(true)
//!     .on_change(|v| println!("picked {v:?}"))
//!     .build()?;
//! engine.request_open();
//! engine.select_value("am")?;
//! assert!(!engine.is_open());
//! ```

pub mod catalog;
pub mod engine;
pub mod error;
pub mod option;
pub mod typed;
pub mod value;

// ── re-exports ───────────────────────────────────────────────────────

pub use engine::{ChangeCallback, SelectConfig, SelectionEngine, SelectionEngineBuilder};
pub use error::{Result, SelectError};
pub use option::{GroupedOptions, OptionGroup, SelectOption, filter_options, group_options};
pub use typed::{DataKind, TypedEdit, TypedInput, TypedValue};
pub use value::{SelectionMode, SelectionValue, ValueSource};
