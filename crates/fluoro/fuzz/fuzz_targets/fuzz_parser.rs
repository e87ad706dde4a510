//! Fuzz target for the table parser.
//!
//! The CSV/TSV parser must never panic on malformed input, whatever the
//! delimiter mix, and must hash the file it read.

#![no_main]

use libfuzzer_sys::fuzz_target;
use fluoro::Parser;
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok(mut temp_file) = tempfile::NamedTempFile::new() {
        if temp_file.write_all(data).is_ok() {
            if let Ok((table, source)) = Parser::new().parse_file(temp_file.path()) {
                assert_eq!(table.row_count(), source.row_count);
                assert!(source.hash.starts_with("sha256:"));
            }
        }
    }
});
