//! Predict command - run pKa/logP predictions over a data file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use colored::Colorize;
use fluoro::{
    CancellationToken, CommandEngine, CommandEngineConfig, HttpEngine, InferenceEngine, MockEngine,
    Predictor, ProgressSink,
};
use log::info;

use crate::cli::{EngineChoice, OutputFormat, RunArgs};

/// Engine selection from the command line.
pub struct EngineArgs {
    pub choice: EngineChoice,
    pub command: Option<String>,
    pub url: Option<String>,
}

impl EngineArgs {
    fn build(&self) -> Result<Arc<dyn InferenceEngine>, Box<dyn std::error::Error>> {
        let engine: Arc<dyn InferenceEngine> = match self.choice {
            EngineChoice::Mock => Arc::new(MockEngine::new()),
            EngineChoice::Command => match &self.command {
                Some(line) => Arc::new(CommandEngine::with_config(
                    CommandEngineConfig::from_command_line(line)?,
                )),
                None => Arc::new(CommandEngine::from_env()?),
            },
            EngineChoice::Http => match &self.url {
                Some(url) => Arc::new(HttpEngine::with_url(url)?),
                None => Arc::new(HttpEngine::new()?),
            },
        };
        Ok(engine)
    }
}

/// Single-line progress bar on stderr.
struct TerminalProgress {
    quiet: bool,
    drawn: Mutex<bool>,
}

impl TerminalProgress {
    const BAR_WIDTH: usize = 30;
    const MESSAGE_WIDTH: usize = 48;

    fn new(quiet: bool) -> Self {
        Self {
            quiet,
            drawn: Mutex::new(false),
        }
    }

    /// End the progress line, if one was drawn.
    fn finish(&self) {
        if let Ok(drawn) = self.drawn.lock() {
            if *drawn {
                eprintln!();
            }
        }
    }
}

impl ProgressSink for TerminalProgress {
    fn set_progress(&self, fraction: f64, message: &str) {
        if self.quiet {
            return;
        }

        let filled = ((fraction * Self::BAR_WIDTH as f64).round() as usize).min(Self::BAR_WIDTH);
        let bar: String = "█".repeat(filled) + &"░".repeat(Self::BAR_WIDTH - filled);
        let message: String = message.chars().take(Self::MESSAGE_WIDTH).collect();

        let mut stderr = std::io::stderr().lock();
        let _ = write!(
            stderr,
            "\r{} {:>3.0}% {:<width$}",
            bar.cyan(),
            fraction * 100.0,
            message,
            width = Self::MESSAGE_WIDTH
        );
        let _ = stderr.flush();

        if let Ok(mut drawn) = self.drawn.lock() {
            *drawn = true;
        }
    }
}

fn default_output_path(file: &Path, format: OutputFormat) -> PathBuf {
    let mut p = file.to_path_buf();
    let stem = p.file_stem().unwrap_or_default().to_string_lossy();
    let extension = fluoro::OutputFormat::from(format).extension();
    p.set_file_name(format!("{}.predicted.{}", stem, extension));
    p
}

pub fn run(
    file: PathBuf,
    args: RunArgs,
    engine: EngineArgs,
    output: Option<PathBuf>,
    format: OutputFormat,
    quiet: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let config = super::build_config(&args)?;
    let predictor = Predictor::with_config(config).with_shared_engine(engine.build()?);

    let properties: Vec<String> = predictor
        .config()
        .properties
        .iter()
        .map(|p| p.to_string())
        .collect();
    println!(
        "{} {} {} ({} mode, {} engine)",
        "Predicting".cyan().bold(),
        properties.join(", ").white().bold(),
        file.display().to_string().white(),
        predictor.config().mode,
        predictor.engine_name()
    );

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())?;

    let progress = TerminalProgress::new(quiet);
    let result = predictor.predict_file(&file, &progress, &cancel);
    progress.finish();
    let result = result?;

    if verbose {
        println!();
        println!("{}", "Output columns:".yellow().bold());
        for col in &result.table.schema().columns {
            println!("  {:20} {}", col.name, col.column_type);
        }
        println!();
    }

    let summary = &result.summary;
    println!(
        "Predicted {} of {} rows ({} skipped, {} engine calls) in {:.1}s",
        summary.predicted_rows.to_string().white().bold(),
        summary.rows,
        summary.skipped_rows.to_string().yellow(),
        summary.engine_calls,
        summary.elapsed().num_milliseconds() as f64 / 1000.0
    );

    let output_path = output.unwrap_or_else(|| default_output_path(&file, format));
    info!("Writing {} output to {}", format, output_path.display());
    result.table.save(&output_path, format.into())?;

    println!(
        "{} {}",
        "Saved to".green().bold(),
        output_path.display().to_string().white()
    );

    if summary.skipped_rows > 0 {
        println!(
            "{}",
            format!("{} rows had no SMILES and were left empty", summary.skipped_rows).yellow()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        let path = default_output_path(Path::new("data/molecules.tsv"), OutputFormat::Csv);
        assert_eq!(path, PathBuf::from("data/molecules.predicted.csv"));
    }

    #[test]
    fn test_engine_build_mock() {
        let engine = EngineArgs {
            choice: EngineChoice::Mock,
            command: None,
            url: None,
        }
        .build()
        .unwrap();
        assert_eq!(engine.name(), "mock");
    }
}
