//! Schema command - show the output columns of a run without predicting.

use std::path::PathBuf;

use colored::Colorize;
use fluoro::{Parser, Predictor};

use crate::cli::RunArgs;

pub fn run(
    file: PathBuf,
    args: RunArgs,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let config = super::build_config(&args)?;
    let (table, source) = Parser::new().parse_file(&file)?;
    let input = table.schema();

    let predictor = Predictor::with_config(config);
    let schema = predictor.output_schema(&input)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows, {})",
        "Output schema for".cyan().bold(),
        source.file.white(),
        source.row_count,
        source.format
    );
    println!();

    for col in &schema.columns {
        let line = format!("  {:3} {:20} {}", col.position, col.name, col.column_type);
        if input.contains(&col.name) {
            println!("{}", line);
        } else {
            println!("{}", line.green().bold());
        }
    }

    if verbose {
        println!();
        println!("Settings:");
        println!("{}", serde_json::to_string_pretty(predictor.config())?);
    }

    Ok(())
}
