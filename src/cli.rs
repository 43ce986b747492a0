//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::{Path, PathBuf};

/// GradeLens - AI-powered student data dashboard
///
/// Ingest a multi-sheet Excel export of student records, generate dashboard
/// analytics as Markdown/JSON, and ask questions about the data through a
/// local AI assistant.
///
/// Examples:
///   gradelens students.xlsx
///   gradelens students.xlsx --format json -o dashboard.json
///   gradelens students.xlsx --ask "Which curriculum has the most probation students?"
///   gradelens students.xlsx --chat
///   gradelens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Excel workbook to ingest (.xlsx, .xls)
    ///
    /// Every worksheet is treated as one academic-year cohort; the sheet
    /// name becomes the records' academic year.
    #[arg(value_name = "WORKBOOK", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file path for the dashboard report
    ///
    /// Defaults to gradelens_report.md (or the config file setting).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Ask a single question about the data and print the answer
    #[arg(long, value_name = "QUESTION", conflicts_with = "chat")]
    pub ask: Option<String>,

    /// Start an interactive chat session about the data
    #[arg(long)]
    pub chat: bool,

    /// Ollama model to use for the assistant
    ///
    /// Can also be set via GRADELENS_MODEL env var or .gradelens.toml config.
    /// Defaults to llama3.2:latest.
    #[arg(short, long, value_name = "MODEL", env = "GRADELENS_MODEL")]
    pub model: Option<String>,

    /// Ollama API endpoint URL
    ///
    /// Can also be set via OLLAMA_URL env var or .gradelens.toml config.
    /// Defaults to http://localhost:11434.
    #[arg(long, value_name = "URL", env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Temperature for LLM responses (0.0 - 1.0), defaults to 0.1
    ///
    /// Lower values produce more consistent/deterministic output
    #[arg(long, value_name = "TEMP")]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum records sent to the assistant as context
    ///
    /// Larger datasets are truncated (with an explicit note in the prompt)
    /// to cap request size. Default: from config or 500.
    #[arg(long, value_name = "COUNT")]
    pub max_context_records: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .gradelens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .gradelens.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the workbook path, empty if not set (should be validated first).
    pub fn input_path(&self) -> &Path {
        self.input.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        let input = self.input_path();

        // Validate workbook path and extension
        if !input.exists() {
            return Err(format!("Workbook does not exist: {}", input.display()));
        }
        let is_excel = input
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                ext == "xlsx" || ext == "xls"
            })
            .unwrap_or(false);
        if !is_excel {
            return Err("Invalid file type. Please provide an Excel file (.xlsx, .xls)".to_string());
        }

        // Validate Ollama URL format (only needed when the assistant is used)
        if self.ask.is_some() || self.chat {
            if let Some(ref url) = self.ollama_url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
                }
            }
        }

        // Validate temperature range if provided
        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Validate context bound if provided
        if let Some(max_records) = self.max_context_records {
            if max_records == 0 {
                return Err("Max context records must be at least 1".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
