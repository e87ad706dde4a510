//! Property-based tests for the prediction pipeline.
//!
//! Random tables of SMILES-like identifiers (with missing cells) are pushed
//! through the mock engine to check invariants that must hold for any input:
//!
//! 1. **Row preservation**: output row count and order equal the input's
//! 2. **Null placement**: nulls appear exactly where identifiers were missing
//! 3. **Progress**: fractions never decrease and end at 1.0
//!
//! ```bash
//! PROPTEST_CASES=10000 cargo test -p fluoro --test property_tests
//! ```

use proptest::prelude::*;

use fluoro::{
    CancellationToken, DataTable, ExecutionConfig, ExecutionMode, MockEngine, NullPolicy, Parser,
    Predictor, ProgressAccounting, Property, PropertySet, RecordingSink,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Strings built from SMILES atoms and bonds, always bracket-balanced.
fn smiles_like() -> impl Strategy<Value = String> {
    prop_oneof![
        "C{1,8}",
        "C{1,4}O",
        "C{1,3}N",
        "FC(F)(F)C{0,3}(=O)O",
        "c1ccccc1C{0,2}",
        "CC(Cl)C{0,4}",
    ]
}

/// A column of identifiers with some missing cells.
fn identifier_column() -> impl Strategy<Value = Vec<Option<String>>> {
    prop::collection::vec(prop::option::weighted(0.8, smiles_like()), 0..40)
}

fn property_set() -> impl Strategy<Value = PropertySet> {
    prop_oneof![
        Just(PropertySet::only(Property::LogP)),
        Just(PropertySet::only(Property::PKa)),
        Just(PropertySet::all()),
    ]
}

fn accounting() -> impl Strategy<Value = ProgressAccounting> {
    prop_oneof![
        Just(ProgressAccounting::PerProperty),
        Just(ProgressAccounting::PerRow),
    ]
}

fn table(cells: &[Option<String>]) -> DataTable {
    let rows: Vec<Vec<Option<&str>>> = cells
        .iter()
        .enumerate()
        .map(|(i, c)| vec![Some(if i % 2 == 0 { "even" } else { "odd" }), c.as_deref()])
        .collect();
    DataTable::from_rows(&["tag", "SMILES"], &rows)
}

// =============================================================================
// Pipeline invariants
// =============================================================================

proptest! {
    #[test]
    fn rows_preserved_and_nulls_in_place(
        cells in identifier_column(),
        properties in property_set(),
        accounting in accounting(),
    ) {
        let input = table(&cells);
        let config = ExecutionConfig::new()
            .with_identifier_column("SMILES")
            .with_properties(properties)
            .with_mode(ExecutionMode::Fast)
            .with_null_policy(NullPolicy::SkipRow)
            .with_accounting(accounting);
        let predictor = Predictor::with_config(config).with_engine(MockEngine::new());

        let output = predictor.predict(&input).unwrap();

        prop_assert_eq!(output.row_count(), cells.len());
        prop_assert_eq!(&output.input, &input);
        for property in properties.iter() {
            let values = output.property_values(property).unwrap();
            for (cell, value) in cells.iter().zip(values) {
                prop_assert_eq!(cell.is_some(), value.is_some());
            }
        }
    }

    #[test]
    fn progress_is_monotone_and_completes(
        cells in identifier_column(),
        properties in property_set(),
        accounting in accounting(),
    ) {
        let config = ExecutionConfig::new()
            .with_identifier_column("SMILES")
            .with_properties(properties)
            .with_accounting(accounting);
        let predictor = Predictor::with_config(config).with_engine(MockEngine::new());
        let sink = RecordingSink::new();

        predictor
            .predict_table(&table(&cells), &sink, &CancellationToken::new())
            .unwrap();

        let fractions = sink.fractions();
        prop_assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(fractions.iter().all(|f| (0.0..=1.0).contains(f)));
        if !cells.is_empty() {
            prop_assert_eq!(fractions.last().copied(), Some(1.0));
        }
    }

    #[test]
    fn fail_batch_never_calls_engine_with_nulls(cells in identifier_column()) {
        let engine = std::sync::Arc::new(MockEngine::new());
        let config = ExecutionConfig::new()
            .with_identifier_column("SMILES")
            .with_null_policy(NullPolicy::FailBatch);
        let predictor = Predictor::with_config(config).with_shared_engine(engine.clone());

        let result = predictor.predict(&table(&cells));

        if cells.iter().any(Option::is_none) {
            prop_assert!(result.is_err());
            prop_assert_eq!(engine.call_count(), 0);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(engine.call_count(), cells.len() * 2);
        }
    }

    #[test]
    fn parser_never_panics(text in "[a-zA-Z0-9,;|\t\"\n ()=#]{0,300}") {
        let _ = Parser::new().parse_str(&text);
    }
}
