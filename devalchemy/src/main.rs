use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use devalchemy::{
    CommandContext, CommandResponse, Config, ControllerHandle, EditController, TaskState,
    TransactionError, client_from_config, config::DEFAULT_CONFIG_FILE, detect_language,
    generate_execution_id, join_task, load_config, logging,
};
use tracing::info;

/// Edit a local HTML/CSS/JS file with natural-language instructions
#[derive(Parser, Debug)]
#[command(name = "devalchemy", version)]
#[command(about = "AI-assisted edits with a one-deep backup slot", long_about = None)]
struct Args {
    /// Configuration file (TOML); defaults apply when it does not exist
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Working file (overrides `working_file`)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Backup file (overrides `backup_file`)
    #[arg(short, long)]
    backup: Option<PathBuf>,

    /// Model identifier (overrides `provider.model`)
    #[arg(long)]
    model: Option<String>,

    /// Sampling temperature (overrides `provider.temperature`)
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum output length in tokens (overrides `provider.max_output_tokens`)
    #[arg(long)]
    max_output_tokens: Option<u32>,

    /// Output structured JSON instead of human-readable
    #[arg(short, long)]
    json: bool,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    File(FileCommand),
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Subcommand, Debug)]
enum FileCommand {
    /// Print the working file.
    Show,
    /// Copy the working file into the backup slot.
    Backup,
    /// Copy the backup slot back over the working file.
    Restore,
    /// Back up, ask the model for a rewrite, and write the result.
    Edit {
        /// What the model should do (default: "Improve structure and styling.")
        instruction: Vec<String>,
    },
    /// Ask the model for a short advisory review. Changes nothing.
    Review,
}

impl FileCommand {
    fn name(&self) -> &'static str {
        match self {
            FileCommand::Show => "show",
            FileCommand::Backup => "backup",
            FileCommand::Restore => "restore",
            FileCommand::Edit { .. } => "edit",
            FileCommand::Review => "review",
        }
    }
}

/// What a successful command produced.
enum Outcome {
    Content(String),
    Review(String),
    BackedUp,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = effective_config(&args)?;
    let command = match &args.command {
        Command::Config => return emit(&config.to_toml()?, args.output.as_deref()),
        Command::File(command) => command,
    };

    let client = client_from_config(&config.provider).context("configure provider")?;
    let handle = ControllerHandle::new(EditController::from_config(&config, Arc::from(client)));

    let ctx = CommandContext {
        execution_id: generate_execution_id(),
        command: command.name().to_string(),
        working_file: config.working_file.display().to_string(),
        backup_file: config.backup_file.display().to_string(),
        language: detect_language(&config.working_file),
    };
    info!(execution_id = %ctx.execution_id, command = %ctx.command, "starting");

    let result = execute(command, &handle, &config).await;
    let response = match &result {
        Ok(Outcome::Content(content)) => CommandResponse::success(&ctx).with_content(content),
        Ok(Outcome::Review(review)) => CommandResponse::success(&ctx).with_review(review),
        Ok(Outcome::BackedUp) => CommandResponse::success(&ctx),
        Err(e) => CommandResponse::failure(&ctx, e),
    };

    let rendered = if args.json {
        serde_json::to_string_pretty(&response).context("serialize response")?
    } else {
        human_readable(&result)
    };
    emit(&rendered, args.output.as_deref())?;

    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}

fn effective_config(args: &Args) -> Result<Config> {
    let mut config = load_config(&args.config)?;
    if let Some(file) = &args.file {
        config.working_file = file.clone();
    }
    if let Some(backup) = &args.backup {
        config.backup_file = backup.clone();
    }
    let model = match &args.model {
        Some(model) => model.clone(),
        None => config.provider.model().to_string(),
    };
    config.provider.model = Some(model);
    if let Some(temperature) = args.temperature {
        config.provider.temperature = temperature;
    }
    if let Some(max) = args.max_output_tokens {
        config.provider.max_output_tokens = max;
    }
    config.validate().context("invalid command-line overrides")?;
    Ok(config)
}

async fn execute(
    command: &FileCommand,
    handle: &ControllerHandle,
    config: &Config,
) -> Result<Outcome, TransactionError> {
    match command {
        FileCommand::Show => join_task(handle.spawn_load(&config.working_file))
            .await
            .map(Outcome::Content),
        FileCommand::Backup => {
            join_task(handle.spawn_backup()).await?;
            Ok(Outcome::BackedUp)
        }
        FileCommand::Restore => join_task(handle.spawn_restore()).await.map(Outcome::Content),
        FileCommand::Edit { instruction } => {
            let task = handle.spawn_edit(instruction.join(" "))?;
            let watcher = tokio::spawn(log_progress(handle.subscribe()));
            let result = join_task(task).await;
            watcher.abort();
            result.map(Outcome::Content)
        }
        FileCommand::Review => join_task(handle.spawn_review()).await.map(Outcome::Review),
    }
}

async fn log_progress(mut states: tokio::sync::watch::Receiver<TaskState>) {
    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();
        info!(?state, "edit progress");
        if !state.is_pending() {
            break;
        }
    }
}

fn human_readable(result: &Result<Outcome, TransactionError>) -> String {
    match result {
        Ok(Outcome::Content(content)) => content.clone(),
        Ok(Outcome::Review(review)) => review.clone(),
        Ok(Outcome::BackedUp) => "Backup created".to_string(),
        Err(e) => format!("Error ({}): {e}", e.kind()),
    }
}

/// Write to file or stdout
fn emit(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("write output to {}", path.display())),
        None => {
            println!("{output}");
            Ok(())
        }
    }
}
