//! GradeLens - AI-powered Student Data Dashboard
//!
//! A CLI tool that ingests multi-sheet Excel exports of student records,
//! computes dashboard analytics, and answers questions about the data
//! through an Ollama-backed assistant.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable workbook, empty dataset, config, ...)

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use gradelens::analysis::{self, DashboardRules};
use gradelens::chat::{extract_blocks, AssistantClient, AssistantConfig};
use gradelens::cli::{Args, OutputFormat};
use gradelens::config::Config;
use gradelens::ingest::{self, NormalizedData};
use gradelens::models::{DashboardReport, ReportMetadata, StudentRecord};
use gradelens::report::{self, render_blocks};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // The log level can come from the merged config, so load it first
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&args, &config);

    info!("GradeLens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the dashboard workflow
    match run(args, config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .gradelens.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".gradelens.toml");

    if path.exists() {
        eprintln!("⚠️  .gradelens.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .gradelens.toml")?;

    println!("✅ Created .gradelens.toml with default settings.");
    println!("   Edit it to customize model, header labels, and probation rules.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = config.log_level(args);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete dashboard workflow.
async fn run(args: Args, config: Config) -> Result<()> {
    // Step 1: Ingest the workbook
    println!("📥 Ingesting workbook: {}", args.input_path().display());
    let data = ingest_workbook(&args, &config).await?;

    println!(
        "   {} records from {} sheet(s)",
        data.records.len(),
        data.sheets_ingested
    );
    for skipped in &data.skipped_sheets {
        warn!("Skipped sheet {}", skipped);
        println!("   ⚠️  Skipped sheet {}", skipped);
    }

    // Step 2: Compute the dashboard aggregates
    let rules = DashboardRules::from(&config.dashboard);
    let aggregates = analysis::aggregate(&data.records, &rules);

    // Step 3: Generate and save the report
    println!("\n📝 Generating report...");

    let dashboard = DashboardReport {
        metadata: ReportMetadata {
            source_file: args.input_path().display().to_string(),
            generated_at: Utc::now(),
            total_records: data.records.len(),
            sheets_ingested: data.sheets_ingested,
            skipped_sheets: data
                .skipped_sheets
                .iter()
                .map(|skipped| skipped.to_string())
                .collect(),
        },
        aggregates,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&dashboard)?,
        OutputFormat::Markdown => report::generate_markdown_report(&dashboard),
    };

    let output_path = PathBuf::from(&config.general.output);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    println!("\n📊 Dashboard Summary:");
    println!("   Total students: {}", dashboard.aggregates.total_records);
    println!("   Average GPAX: {:.2}", dashboard.aggregates.mean_gpax);
    println!(
        "   Status categories: {}",
        dashboard.aggregates.status_distribution.len()
    );
    println!(
        "   Probation students: {}",
        dashboard.aggregates.probation.total
    );
    println!("\n✅ Report saved to: {}", output_path.display());

    // Step 4: Serve assistant questions, if requested
    if args.ask.is_some() || args.chat {
        let client = AssistantClient::new(AssistantConfig {
            ollama_url: config.model.ollama_url.clone(),
            model_name: config.model.name.clone(),
            temperature: config.model.temperature,
            timeout_seconds: config.model.timeout_seconds,
            max_context_records: config.model.max_context_records,
        });

        println!("\n🤖 Assistant model: {}", config.model.name);

        if let Some(ref question) = args.ask {
            answer_question(&client, question, &data.records, args.quiet).await?;
        } else {
            run_chat(&client, &data.records, args.quiet).await?;
        }
    }

    Ok(())
}

/// Read and normalize the workbook on a blocking worker thread.
///
/// Parsing large binary payloads is CPU-bound; keeping it off the async
/// runtime threads leaves the interactive surface responsive.
async fn ingest_workbook(args: &Args, config: &Config) -> Result<NormalizedData> {
    let path = args.input_path().to_path_buf();
    let labels = config.headers.clone();

    let spinner = progress_spinner("Reading workbook...", args.quiet);
    let result = tokio::task::spawn_blocking(move || -> Result<NormalizedData> {
        let sheets = ingest::read_workbook(&path)?;
        let data = ingest::normalize(&sheets, &labels)?;
        Ok(data)
    })
    .await
    .context("Ingestion task failed")?;
    spinner.finish_and_clear();

    result
}

/// Ask a single question and print the rendered answer.
async fn answer_question(
    client: &AssistantClient,
    question: &str,
    records: &[StudentRecord],
    quiet: bool,
) -> Result<()> {
    let spinner = progress_spinner("Thinking...", quiet);
    let answer = client.ask(question, records).await;
    spinner.finish_and_clear();

    let answer = answer?;
    println!("\n{}", render_blocks(&extract_blocks(&answer)));
    Ok(())
}

/// Interactive chat loop over the ingested records.
///
/// One question is in flight at a time; a failed request is reported and
/// the session continues.
async fn run_chat(client: &AssistantClient, records: &[StudentRecord], quiet: bool) -> Result<()> {
    println!("   Type a question, or 'exit' to leave the session.\n");

    loop {
        print!("You> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        let spinner = progress_spinner("Thinking...", quiet);
        let answer = client.ask(question, records).await;
        spinner.finish_and_clear();

        match answer {
            Ok(answer) => println!("\n{}", render_blocks(&extract_blocks(&answer))),
            Err(e) => {
                warn!("Assistant request failed: {}", e);
                eprintln!("⚠️  {}", e);
            }
        }
    }

    println!("👋 Chat session ended.");
    Ok(())
}

/// A steady-tick spinner, hidden in quiet mode.
fn progress_spinner(message: &'static str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("valid spinner template"),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .gradelens.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
