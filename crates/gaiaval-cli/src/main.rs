//! GAIA Validator CLI
//!
//! The `gaiaval` command validates a hosted model's answers to GAIA
//! benchmark questions and records the outcome.
//!
//! ## Commands
//!
//! - `items`: List benchmark items, optionally filtered by level or attachment type
//! - `show`: Show one item with its predefined answer and annotator steps
//! - `validate`: Ask a model an item's question and classify the answer
//! - `results`: Show recorded results for an item

mod input;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gaiaval_core::{
    available_extensions, available_levels, filter_items, load_session, init_tracing, ItemFilter,
    Resolution, SaveStatus, SessionDeps, SessionStep, ValidationConfig,
    ValidationSession,
};
use gaiaval_llm::{OpenAiClient, OpenAiConfig};
use gaiaval_state::jsonl_catalog::split_steps;
use gaiaval_state::{
    connect_from_env, BenchmarkItem, FsArtifactStore, ItemCatalog, JsonlItemCatalog,
    ResultLedger, SurrealItemCatalog, SurrealResultLedger,
};
use tracing::{info, Level};

use crate::input::Prompter;

#[derive(Parser)]
#[command(name = "gaiaval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate hosted model answers against GAIA benchmark items", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Validation config file (TOML)
    #[arg(long, global = true, env = "GAIAVAL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List benchmark items
    Items {
        /// GAIA metadata.jsonl file (default: the database catalog)
        #[arg(long)]
        items: Option<PathBuf>,

        /// Only items at this level
        #[arg(long)]
        level: Option<String>,

        /// Only items whose attachment has this extension
        #[arg(long)]
        extension: Option<String>,

        /// Maximum number of items to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one item
    Show {
        task_id: String,

        /// GAIA metadata.jsonl file (default: the database catalog)
        #[arg(long)]
        items: Option<PathBuf>,
    },

    /// Ask a model an item's question and record the outcome
    Validate {
        task_id: String,

        /// Model name (e.g. GPT-4o)
        #[arg(short, long, env = "OPENAI_MODEL")]
        model: String,

        /// GAIA metadata.jsonl file (default: the database catalog)
        #[arg(long)]
        items: Option<PathBuf>,

        /// Retries with edited steps after a wrong answer
        #[arg(long)]
        max_retries: Option<u32>,

        /// Compare answers case-sensitively
        #[arg(long)]
        case_sensitive: bool,

        /// Seconds to wait for the model
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Steps to send on retry, one per line
        #[arg(long)]
        steps_file: Option<PathBuf>,

        /// Accept every prompt (retry with annotator steps, retry saving)
        #[arg(short, long)]
        yes: bool,

        /// Directory for per-attempt transcripts
        #[arg(long, env = "GAIAVAL_ARTIFACT_DIR", default_value = ".gaiaval/artifacts")]
        artifact_dir: PathBuf,
    },

    /// Show recorded results for an item
    Results { task_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Items {
            items,
            level,
            extension,
            limit,
        } => {
            let filter = ItemFilter { level, extension };
            cmd_items(items.as_deref(), &filter, limit).await
        }
        Commands::Show { task_id, items } => cmd_show(&task_id, items.as_deref()).await,
        Commands::Validate {
            task_id,
            model,
            items,
            max_retries,
            case_sensitive,
            timeout_secs,
            steps_file,
            yes,
            artifact_dir,
        } => {
            let config = load_config(
                cli.config.as_deref(),
                max_retries,
                case_sensitive,
                timeout_secs,
            )?;
            let options = ValidateOptions {
                steps_file,
                yes,
                artifact_dir,
            };
            cmd_validate(&task_id, &model, items.as_deref(), config, options).await
        }
        Commands::Results { task_id } => cmd_results(&task_id).await,
    }
}

/// File and environment config, then command-line flags on top.
fn load_config(
    path: Option<&Path>,
    max_retries: Option<u32>,
    case_sensitive: bool,
    timeout_secs: Option<u64>,
) -> Result<ValidationConfig> {
    let mut config = ValidationConfig::load(path).context("Failed to load validation config")?;
    if let Some(n) = max_retries {
        config.max_retries = n;
    }
    if case_sensitive {
        config.match_case_sensitive = true;
    }
    if let Some(secs) = timeout_secs {
        config.invocation_timeout_secs = secs;
    }
    config.validate()?;
    Ok(config)
}

async fn open_catalog(items: Option<&Path>) -> Result<Box<dyn ItemCatalog>> {
    match items {
        Some(path) => Ok(Box::new(JsonlItemCatalog::new(path))),
        None => {
            let db = connect_from_env()
                .await
                .context("Failed to connect to GAIA Validator database")?;
            Ok(Box::new(SurrealItemCatalog::new(db)))
        }
    }
}

async fn load_items(items: Option<&Path>) -> Result<Vec<BenchmarkItem>> {
    let catalog = open_catalog(items).await?;
    catalog
        .load_items()
        .await
        .context("Failed to load benchmark items")
}

async fn cmd_items(items: Option<&Path>, filter: &ItemFilter, limit: Option<usize>) -> Result<()> {
    let all = load_items(items).await?;
    let matching = filter_items(&all, filter);

    if matching.is_empty() {
        println!("No items match");
    }
    for item in matching.iter().take(limit.unwrap_or(usize::MAX)) {
        println!(
            "{}  L{:<2} {:<6} {}",
            item.task_id,
            item.level.as_deref().unwrap_or("-"),
            item.file_extension().unwrap_or_else(|| "-".to_string()),
            truncate(&item.question, 72)
        );
    }

    println!();
    println!("{} of {} items", matching.len(), all.len());
    println!("Levels: {}", available_levels(&all).join(", "));
    println!("Extensions: {}", available_extensions(&all).join(", "));
    Ok(())
}

async fn cmd_show(task_id: &str, items: Option<&Path>) -> Result<()> {
    let all = load_items(items).await?;
    let Some(item) = gaiaval_core::find_item(&all, task_id) else {
        bail!("Item not found: {}", task_id);
    };

    println!("Task:     {}", item.task_id);
    println!("Level:    {}", item.level.as_deref().unwrap_or("-"));
    if let Some(file) = &item.file_name {
        println!("File:     {}", file);
    }
    println!("Answer:   {}", item.final_answer);
    println!();
    println!("{}", item.question);
    print_steps(&item.steps);
    Ok(())
}

struct ValidateOptions {
    steps_file: Option<PathBuf>,
    yes: bool,
    artifact_dir: PathBuf,
}

async fn cmd_validate(
    task_id: &str,
    model: &str,
    items: Option<&Path>,
    config: ValidationConfig,
    options: ValidateOptions,
) -> Result<()> {
    let db = connect_from_env()
        .await
        .context("Failed to connect to GAIA Validator database")?;
    let catalog: Box<dyn ItemCatalog> = match items {
        Some(path) => Box::new(JsonlItemCatalog::new(path)),
        None => Box::new(SurrealItemCatalog::new(db.clone())),
    };

    let openai = OpenAiConfig::from_env()
        .context("Model client not configured")?
        .with_timeout(config.invocation_timeout());
    let client = OpenAiClient::new(openai)?;
    let artifacts = FsArtifactStore::new(&options.artifact_dir).with_context(|| {
        format!(
            "Failed to open artifact directory {}",
            options.artifact_dir.display()
        )
    })?;

    let deps = SessionDeps {
        invoker: Arc::new(client),
        ledger: Arc::new(SurrealResultLedger::new(db)),
        artifacts: Arc::new(artifacts),
    };
    let mut session = load_session(catalog.as_ref(), task_id, model, config, deps).await?;
    info!(
        session_id = %session.session_id(),
        task_id = %task_id,
        model = %model,
        "starting validation"
    );

    println!("Question: {}", session.item().question);
    println!("Expected: {}", session.item().final_answer);
    println!();

    let mut prompter = Prompter::new()?;
    let mut step = session.submit().await?;
    loop {
        match step {
            SessionStep::AwaitingEdit { attempt } => {
                println!(
                    "Attempt {}: model answered {:?}, which does not match.",
                    attempt.number,
                    attempt.answer.as_deref().unwrap_or_default()
                );
                match choose_steps(&session, &options, &mut prompter).await? {
                    Some(steps) => step = session.submit_edited_steps(steps).await?,
                    None => step = SessionStep::Resolved(session.decline_edit().await?),
                }
            }
            SessionStep::Resolved(resolution) => {
                print_resolution(&resolution);
                if let SaveStatus::NotSaved { .. } = resolution.save {
                    let retry =
                        options.yes || prompter.confirm("Retry saving the result?", true).await?;
                    if retry {
                        let retried = session.retry_persist().await?;
                        print_save_status(&retried.save);
                    }
                }
                return Ok(());
            }
        }
    }
}

/// Steps for the next attempt, or None when the user declines to retry.
async fn choose_steps(
    session: &ValidationSession,
    options: &ValidateOptions,
    prompter: &mut Prompter,
) -> Result<Option<Vec<String>>> {
    if let Some(path) = &options.steps_file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read steps file {}", path.display()))?;
        let steps = split_steps(&text);
        if steps.is_empty() {
            bail!("Steps file {} is empty", path.display());
        }
        return Ok(Some(steps));
    }

    let annotator_steps = &session.item().steps;
    if options.yes {
        return Ok((!annotator_steps.is_empty()).then(|| annotator_steps.clone()));
    }

    print_steps(annotator_steps);
    let question = format!(
        "Retry with steps? ({} retries left)",
        session.retries_left()
    );
    if !prompter.confirm(&question, true).await? {
        return Ok(None);
    }

    println!("Edit each step (clear a line to drop it), then add any new steps; blank line to finish:");
    match prompter.edit_steps(annotator_steps).await? {
        Some(steps) if !steps.is_empty() => Ok(Some(steps)),
        Some(_) => {
            println!("No steps entered.");
            Ok(None)
        }
        None => Ok(None),
    }
}

async fn cmd_results(task_id: &str) -> Result<()> {
    let ledger = SurrealResultLedger::from_env()
        .await
        .context("Failed to connect to GAIA Validator database")?;
    let records = ledger.list_for_item(task_id).await?;

    if records.is_empty() {
        println!("No results recorded for {}", task_id);
        return Ok(());
    }
    for record in records {
        println!(
            "{}  attempt {}  {:<20} {:<10} {}",
            record.recorded_at.format("%Y-%m-%d %H:%M:%S UTC"),
            record.attempt_number,
            record.category,
            record.model,
            record
                .error
                .as_deref()
                .map(|e| format!("error: {e}"))
                .unwrap_or_else(|| truncate(&record.answer, 60))
        );
    }
    Ok(())
}

fn print_steps(steps: &[String]) {
    if steps.is_empty() {
        println!("(no annotator steps)");
        return;
    }
    println!();
    println!("Annotator steps:");
    for step in steps {
        println!("  {}", step);
    }
}

fn print_resolution(resolution: &Resolution) {
    println!();
    println!("Outcome:  {}", resolution.outcome);
    println!("Attempt:  {}", resolution.attempt.number);
    if let Some(answer) = &resolution.attempt.answer {
        println!("Answer:   {}", answer);
    }
    print_save_status(&resolution.save);
}

fn print_save_status(save: &SaveStatus) {
    match save {
        SaveStatus::Saved => println!("Saved."),
        SaveStatus::NotSaved { reason } => println!("NOT SAVED: {}", reason),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn truncate_flattens_and_cuts() {
        assert_eq!(truncate("line one\nline two", 10), "line on...");
    }

    #[test]
    fn cli_flags_override_config() {
        let config = load_config(None, Some(3), true, Some(15)).unwrap();
        assert_eq!(config.max_retries, 3);
        assert!(config.match_case_sensitive);
        assert_eq!(config.invocation_timeout_secs, 15);
    }

    #[test]
    fn zero_timeout_flag_rejected() {
        assert!(load_config(None, None, false, Some(0)).is_err());
    }

    #[test]
    fn validate_command_parses() {
        let cli = Cli::try_parse_from([
            "gaiaval",
            "validate",
            "c61d22de",
            "--model",
            "GPT-4o",
            "--max-retries",
            "2",
            "--yes",
        ])
        .unwrap();
        match cli.command {
            Commands::Validate {
                task_id,
                model,
                max_retries,
                yes,
                ..
            } => {
                assert_eq!(task_id, "c61d22de");
                assert_eq!(model, "GPT-4o");
                assert_eq!(max_retries, Some(2));
                assert!(yes);
            }
            _ => panic!("expected validate"),
        }
    }
}
