//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fluoro: batch pKa and logP prediction for molecule tables
#[derive(Parser)]
#[command(name = "fluoro")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Settings shared by every command that needs an execution configuration.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct RunArgs {
    /// Settings file (JSON); flags override its values
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Predict logP
    #[arg(long)]
    pub logp: bool,

    /// Predict pKa
    #[arg(long)]
    pub pka: bool,

    /// Execution mode (fast, slow, experimental)
    #[arg(short, long)]
    pub mode: Option<fluoro::ExecutionMode>,

    /// Column containing SMILES (default: SMILES)
    #[arg(short, long)]
    pub column: Option<String>,

    /// Handling of empty SMILES cells (skip, fail)
    #[arg(long)]
    pub null_policy: Option<NullPolicyChoice>,

    /// Layout of properties that were not requested (omit, null)
    #[arg(long)]
    pub unrequested: Option<UnrequestedChoice>,

    /// Progress step accounting (per-property, per-row)
    #[arg(long)]
    pub progress_accounting: Option<AccountingChoice>,

    /// Require the column to be declared as SMILES
    #[arg(long)]
    pub require_smiles_type: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict pKa and/or logP for every row of a data file
    Predict {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        run: RunArgs,

        /// Inference engine to use
        #[arg(long, default_value = "mock")]
        engine: EngineChoice,

        /// Predictor command line (overrides FLUORO_ENGINE_CMD)
        #[arg(long, value_name = "CMD")]
        engine_cmd: Option<String>,

        /// Prediction service URL (overrides FLUORO_ENGINE_URL)
        #[arg(long, value_name = "URL")]
        engine_url: Option<String>,

        /// Output path (default: <file>.predicted.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "tsv")]
        format: OutputFormat,

        /// Don't print progress
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show the columns a prediction run would produce, without predicting
    Schema {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        run: RunArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Tsv,
    Csv,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use tsv, csv, or json.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Tsv => write!(f, "tsv"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl From<OutputFormat> for fluoro::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Tsv => fluoro::OutputFormat::Tsv,
            OutputFormat::Csv => fluoro::OutputFormat::Csv,
            OutputFormat::Json => fluoro::OutputFormat::Json,
        }
    }
}

/// Inference engine choice for predictions
#[derive(Clone, Debug, Default)]
pub enum EngineChoice {
    /// Deterministic stand-in values, for dry runs
    #[default]
    Mock,
    /// External predictor program (requires FLUORO_ENGINE_CMD or --engine-cmd)
    Command,
    /// Prediction service over HTTP (FLUORO_ENGINE_URL or --engine-url)
    Http,
}

impl std::str::FromStr for EngineChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(EngineChoice::Mock),
            "command" | "cmd" => Ok(EngineChoice::Command),
            "http" => Ok(EngineChoice::Http),
            _ => Err(format!("Unknown engine: {}. Use mock, command, or http.", s)),
        }
    }
}

impl std::fmt::Display for EngineChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineChoice::Mock => write!(f, "mock"),
            EngineChoice::Command => write!(f, "command"),
            EngineChoice::Http => write!(f, "http"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum NullPolicyChoice {
    Skip,
    Fail,
}

impl std::str::FromStr for NullPolicyChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" | "skip-row" => Ok(NullPolicyChoice::Skip),
            "fail" | "fail-batch" => Ok(NullPolicyChoice::Fail),
            _ => Err(format!("Unknown null policy: {}. Use skip or fail.", s)),
        }
    }
}

impl From<NullPolicyChoice> for fluoro::NullPolicy {
    fn from(choice: NullPolicyChoice) -> Self {
        match choice {
            NullPolicyChoice::Skip => fluoro::NullPolicy::SkipRow,
            NullPolicyChoice::Fail => fluoro::NullPolicy::FailBatch,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum UnrequestedChoice {
    Omit,
    Null,
}

impl std::str::FromStr for UnrequestedChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "omit" => Ok(UnrequestedChoice::Omit),
            "null" | "emit-null" => Ok(UnrequestedChoice::Null),
            _ => Err(format!("Unknown layout: {}. Use omit or null.", s)),
        }
    }
}

impl From<UnrequestedChoice> for fluoro::UnrequestedColumns {
    fn from(choice: UnrequestedChoice) -> Self {
        match choice {
            UnrequestedChoice::Omit => fluoro::UnrequestedColumns::Omit,
            UnrequestedChoice::Null => fluoro::UnrequestedColumns::EmitNull,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum AccountingChoice {
    PerProperty,
    PerRow,
}

impl std::str::FromStr for AccountingChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "per-property" => Ok(AccountingChoice::PerProperty),
            "per-row" => Ok(AccountingChoice::PerRow),
            _ => Err(format!("Unknown accounting: {}. Use per-property or per-row.", s)),
        }
    }
}

impl From<AccountingChoice> for fluoro::ProgressAccounting {
    fn from(choice: AccountingChoice) -> Self {
        match choice {
            AccountingChoice::PerProperty => fluoro::ProgressAccounting::PerProperty,
            AccountingChoice::PerRow => fluoro::ProgressAccounting::PerRow,
        }
    }
}
