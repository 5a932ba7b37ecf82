//! Integration tests for the medtrack-select crate.
//!
//! These drive the engine through full gesture sequences the way a
//! presentation layer would: open, search, pick, dismiss, re-render.

use std::sync::{Arc, Mutex};

use medtrack_select::{
    DataKind, SelectOption, SelectionEngine, SelectionMode, SelectionValue, TypedEdit, TypedInput,
    TypedValue, catalog, filter_options,
};

fn medication_options() -> Vec<SelectOption> {
    vec![
        SelectOption::new("a", "Amoxicillin").with_group("X"),
        SelectOption::new("b", "Ibuprofen"),
        SelectOption::new("c", "Atorvastatin").with_group("X"),
        SelectOption::new("d", "Metformin").with_group("Y"),
        SelectOption::new("e", "Warfarin").disabled(),
    ]
}

fn values<'a>(opts: impl IntoIterator<Item = &'a SelectOption>) -> Vec<&'a str> {
    opts.into_iter().map(|o| o.value.as_str()).collect()
}

// ═══════════════════════════════════════════════════════════════════════
//  Filtering and grouping
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn grouping_example_partitions_as_documented() {
    let options = vec![
        SelectOption::plain("a").with_group("X"),
        SelectOption::plain("b"),
        SelectOption::plain("c").with_group("X"),
        SelectOption::plain("d").with_group("Y"),
    ];
    let engine = SelectionEngine::builder(SelectionMode::Single)
        .options(options)
        .build()
        .unwrap();

    let grouped = engine.grouped_options();
    assert_eq!(values(grouped.ungrouped.iter().copied()), vec!["b"]);
    assert_eq!(values(grouped.group("X").unwrap().iter().copied()), vec!["a", "c"]);
    assert_eq!(values(grouped.group("Y").unwrap().iter().copied()), vec!["d"]);
}

#[test]
fn grouping_follows_search_filter() {
    let mut engine = SelectionEngine::builder(SelectionMode::Single)
        .options(medication_options())
        .searchable(true)
        .build()
        .unwrap();
    engine.request_open();
    engine.set_search_term("IN").unwrap();

    let grouped = engine.grouped_options();
    // Amoxicillin, Atorvastatin, Metformin, Warfarin all contain "in"
    assert!(grouped.ungrouped.iter().all(|o| o.value == "e"));
    assert_eq!(values(grouped.group("X").unwrap().iter().copied()), vec!["a", "c"]);
    assert_eq!(values(grouped.group("Y").unwrap().iter().copied()), vec!["d"]);
}

#[test]
fn repeated_filtering_is_idempotent() {
    let options = medication_options();
    let first = values(filter_options(&options, "or"));
    let second = values(filter_options(&options, "or"));
    assert_eq!(first, second);
    assert_eq!(first, vec!["c", "d"]);
}

// ═══════════════════════════════════════════════════════════════════════
//  Gesture sequences
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn single_select_round_trip_through_controlled_owner() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&emitted);
    let mut engine = SelectionEngine::builder(SelectionMode::Single)
        .options(medication_options())
        .searchable(true)
        .controlled("")
        .on_change(move |v| sink.lock().unwrap().push(v.clone()))
        .build()
        .unwrap();

    engine.toggle();
    engine.set_search_term("ibu").unwrap();
    assert_eq!(values(engine.filtered_options()), vec!["b"]);

    let ibuprofen = engine.filtered_options()[0].clone();
    engine.select_option(&ibuprofen);
    assert!(!engine.is_open());
    assert_eq!(engine.search_term(), "");

    // The owner decides to accept the change and pushes it back.
    let latest = emitted.lock().unwrap().last().cloned().unwrap();
    engine.set_external_value(latest).unwrap();
    assert!(engine.is_option_selected(&ibuprofen));
    assert_eq!(engine.display_value(), "Ibuprofen");
}

#[test]
fn multi_select_survives_dismissal() {
    let mut engine = SelectionEngine::builder(SelectionMode::Multi)
        .options(medication_options())
        .searchable(true)
        .build()
        .unwrap();

    engine.request_open();
    engine.select_value("d").unwrap();
    engine.select_value("a").unwrap();
    engine.set_search_term("met").unwrap();
    assert!(engine.handle_pointer(false));

    assert!(!engine.is_open());
    assert_eq!(engine.search_term(), "");
    assert_eq!(engine.value(), &SelectionValue::from(vec!["d", "a"]));
}

#[test]
fn frequency_multi_select_toggles_and_keeps_open() {
    let mut engine = SelectionEngine::builder(SelectionMode::Multi)
        .options(catalog::frequency_options())
        .placeholder("Repeat")
        .build()
        .unwrap();
    assert_eq!(engine.display_value(), "Repeat");

    engine.request_open();
    engine.select_value("Weekly").unwrap();
    engine.select_value("Daily").unwrap();
    assert!(engine.is_open());
    // Labels follow catalogue order, not click order.
    assert_eq!(engine.display_value(), "Daily, Weekly");

    engine.select_value("Weekly").unwrap();
    assert_eq!(engine.value(), &SelectionValue::from(vec!["Daily"]));
}

#[test]
fn disabled_option_never_changes_state_in_either_mode() {
    for mode in [SelectionMode::Single, SelectionMode::Multi] {
        let mut engine = SelectionEngine::builder(mode)
            .options(medication_options())
            .searchable(true)
            .build()
            .unwrap();
        engine.request_open();
        engine.set_search_term("war").unwrap();
        let before = engine.value().clone();

        assert_eq!(engine.select_value("e").unwrap(), None);
        assert_eq!(engine.value(), &before);
        assert!(engine.is_open());
        assert_eq!(engine.search_term(), "war");
    }
}

#[test]
fn clear_leaves_nothing_selected() {
    for (mode, initial) in [
        (SelectionMode::Single, SelectionValue::from("b")),
        (SelectionMode::Multi, SelectionValue::from(vec!["a", "d"])),
    ] {
        let mut engine = SelectionEngine::builder(mode)
            .options(medication_options())
            .default_value(initial)
            .build()
            .unwrap();
        engine.clear();
        assert!(
            engine
                .options()
                .iter()
                .all(|o| !engine.is_option_selected(o))
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Typed inputs
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn timezone_input_searches_grouped_catalogue() {
    let mut input = TypedInput::new(DataKind::Timezone).unwrap();
    let engine = input.engine_mut().unwrap();
    engine.request_open();
    engine.set_search_term("europe").unwrap();
    assert_eq!(
        engine.grouped_options().group("Europe").map(<[_]>::len),
        Some(3)
    );

    let emitted = input
        .apply(TypedEdit::Choose("Europe/Paris".into()))
        .unwrap();
    assert_eq!(emitted, Some(TypedValue::Text("Europe/Paris".into())));
    assert!(!input.engine().unwrap().is_open());
}

#[test]
fn color_input_covers_every_preset() {
    for (hex, name) in catalog::COLOR_PRESETS {
        let mut input = TypedInput::new(DataKind::Color).unwrap();
        input.apply(TypedEdit::Choose((*hex).to_owned())).unwrap();
        assert_eq!(input.engine().unwrap().display_value(), *name);
    }
}
