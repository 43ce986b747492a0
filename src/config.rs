//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.gradelens.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analysis::DashboardRules;
use crate::ingest::HeaderLabels;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Header labels recognized during ingestion.
    #[serde(default)]
    pub headers: HeaderLabels,

    /// Dashboard grouping rules.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "gradelens_report.md".to_string()
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Default model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum records serialized into the assistant's prompt context.
    #[serde(default = "default_max_context_records")]
    pub max_context_records: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            ollama_url: default_ollama_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
            max_context_records: default_max_context_records(),
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout() -> u64 {
    300
}

fn default_max_context_records() -> usize {
    500
}

/// Dashboard grouping rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Students strictly below this GPAX are probation candidates.
    #[serde(default = "default_probation_threshold")]
    pub probation_gpax_threshold: f64,

    /// Status label marking an actively enrolled student.
    #[serde(default = "default_normal_status")]
    pub normal_status: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            probation_gpax_threshold: default_probation_threshold(),
            normal_status: default_normal_status(),
        }
    }
}

fn default_probation_threshold() -> f64 {
    2.0
}

fn default_normal_status() -> String {
    "ปกติ".to_string()
}

impl From<&DashboardConfig> for DashboardRules {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            probation_gpax_threshold: config.probation_gpax_threshold,
            normal_status: config.normal_status.clone(),
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".gradelens.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref ollama_url) = args.ollama_url {
            self.model.ollama_url = ollama_url.clone();
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = temperature;
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
        if let Some(max_records) = args.max_context_records {
            self.model.max_context_records = max_records;
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Effective log level: CLI verbosity flags win, then the config file's
    /// `verbose` setting.
    pub fn log_level(&self, args: &crate::cli::Args) -> tracing::Level {
        if self.general.verbose && !args.verbose && !args.quiet {
            return tracing::Level::DEBUG;
        }
        args.log_level()
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, OutputFormat};
    use std::path::PathBuf;

    fn make_args() -> Args {
        Args {
            input: Some(PathBuf::from("students.xlsx")),
            output: None,
            format: OutputFormat::Markdown,
            ask: None,
            chat: false,
            model: None,
            ollama_url: None,
            temperature: None,
            timeout: None,
            max_context_records: None,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "llama3.2:latest");
        assert_eq!(config.model.max_context_records, 500);
        assert_eq!(config.dashboard.probation_gpax_threshold, 2.0);
        assert_eq!(config.dashboard.normal_status, "ปกติ");
        assert!(config
            .headers
            .student_id
            .contains(&"รหัสนักศึกษา".to_string()));
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "custom_report.md"
verbose = true

[model]
name = "qwen2.5:14b"
temperature = 0.2

[headers]
student_id = ["Student ID"]
gpax = ["GPA", "GPAX"]

[dashboard]
probation_gpax_threshold = 2.25
normal_status = "Active"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "custom_report.md");
        assert!(config.general.verbose);
        assert_eq!(config.model.name, "qwen2.5:14b");
        assert_eq!(config.model.temperature, 0.2);
        assert_eq!(config.headers.student_id, vec!["Student ID"]);
        assert_eq!(config.headers.gpax, vec!["GPA", "GPAX"]);
        // Sections omitted from the file keep their defaults.
        assert_eq!(config.headers.status, vec!["สถานะ"]);
        assert_eq!(config.dashboard.probation_gpax_threshold, 2.25);
        assert_eq!(config.dashboard.normal_status, "Active");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[headers]"));
        assert!(toml_str.contains("[dashboard]"));
    }

    #[test]
    fn test_merge_keeps_config_model_when_flags_absent() {
        let mut config = Config::default();
        config.model.name = "qwen2.5:14b".to_string();
        config.model.ollama_url = "http://ollama.lan:11434".to_string();
        config.model.temperature = 0.3;

        config.merge_with_args(&make_args());
        assert_eq!(config.model.name, "qwen2.5:14b");
        assert_eq!(config.model.ollama_url, "http://ollama.lan:11434");
        assert_eq!(config.model.temperature, 0.3);
    }

    #[test]
    fn test_merge_explicit_flags_override_config() {
        let mut config = Config::default();
        config.model.name = "qwen2.5:14b".to_string();

        let mut args = make_args();
        args.model = Some("mistral:7b".to_string());
        args.temperature = Some(0.7);
        config.merge_with_args(&args);

        assert_eq!(config.model.name, "mistral:7b");
        assert_eq!(config.model.temperature, 0.7);
    }

    #[test]
    fn test_config_verbose_raises_log_level() {
        let mut config = Config::default();
        let args = make_args();
        assert_eq!(config.log_level(&args), tracing::Level::INFO);

        config.general.verbose = true;
        assert_eq!(config.log_level(&args), tracing::Level::DEBUG);

        // --quiet still wins over the config file.
        let mut quiet = make_args();
        quiet.quiet = true;
        assert_eq!(config.log_level(&quiet), tracing::Level::ERROR);
    }

    #[test]
    fn test_dashboard_rules_from_config() {
        let config = DashboardConfig {
            probation_gpax_threshold: 1.75,
            normal_status: "Active".to_string(),
        };
        let rules = DashboardRules::from(&config);
        assert_eq!(rules.probation_gpax_threshold, 1.75);
        assert_eq!(rules.normal_status, "Active");
    }
}
