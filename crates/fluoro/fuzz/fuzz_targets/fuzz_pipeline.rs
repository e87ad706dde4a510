//! Fuzz target for parse-then-predict.
//!
//! Any text that parses into a table with a `SMILES` column either predicts
//! with one output row per input row or fails with an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use fluoro::{ExecutionConfig, MockEngine, Parser, Predictor};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 20_000 {
        return;
    }

    let Ok(table) = Parser::new().parse_str(text) else {
        return;
    };

    let predictor = Predictor::with_config(ExecutionConfig::new().with_identifier_column("SMILES"))
        .with_engine(MockEngine::new());
    if let Ok(output) = predictor.predict(&table) {
        assert_eq!(output.row_count(), table.row_count());
    }
});
