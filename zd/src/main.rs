//! ZenDo - task list with AI task breakdown
//!
//! CLI entry point. Without a subcommand the terminal UI is started.

use std::fs;
use std::path::Path;

use clap::{CommandFactory, FromArgMatches};
use colored::{ColoredString, Colorize};
use eyre::{Context, Result, bail};
use tracing::{debug, info};

use zendo::cli::{Cli, Command, OutputFormat, generate_after_help, get_log_path};
use zendo::config::Config;
use zendo::controller::Controller;
use zendo::decompose::{DecomposeOutcome, Decomposer};
use zendo::domain::{Filter, IdResolver, Priority, TaskId};
use zendo::storage::{JsonFileRepository, MemoryRepository, TaskRepository};
use zendo::tui;
use zendo::view::{TaskRow, task_rows};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load config before parsing so --help can report the AI key status
    let pre_config = Config::load(None).unwrap_or_default();
    let cmd = Cli::command().after_help(generate_after_help(&pre_config.llm));
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(provider = %config.llm.provider, "ZenDo loaded config");

    let data_file = cli.data_file.clone().unwrap_or_else(|| config.storage.data_file());
    let repo: Box<dyn TaskRepository> = if cli.ephemeral {
        Box::new(MemoryRepository::new())
    } else {
        Box::new(JsonFileRepository::new(data_file.clone()))
    };
    let mut controller = Controller::new(repo);

    // A load problem is a warning for one-shot commands; they still run
    if cli.command.is_some() {
        if let Some(status) = controller.status() {
            eprintln!("{} {}", "warning:".yellow().bold(), status);
            if controller.is_read_only() {
                eprintln!("{} changes will not be saved this run", "warning:".yellow().bold());
            }
            controller.clear_status();
        }
    }

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None => tui::run(controller, &config).await,
        Some(Command::Add { text, priority }) => {
            cmd_add(&mut controller, &text.join(" "), priority.unwrap_or(config.ui.default_priority))
        }
        Some(Command::List { filter, format }) => cmd_list(&mut controller, filter, format, &config.ui.date_format),
        Some(Command::Toggle { id }) => cmd_toggle(&mut controller, &id),
        Some(Command::Delete { id }) => cmd_delete(&mut controller, &id),
        Some(Command::ClearCompleted) => cmd_clear_completed(&mut controller),
        Some(Command::Stats { format }) => cmd_stats(&controller, format),
        Some(Command::Decompose { text, add, priority }) => {
            let priority = priority.unwrap_or(config.ui.default_priority);
            cmd_decompose(&mut controller, &config, &text.join(" "), add, priority).await
        }
        Some(Command::Config) => cmd_config(&config, &data_file, cli.ephemeral),
    }
}

fn colored_priority(priority: Priority) -> ColoredString {
    let label = format!("{:<6}", priority.as_str());
    match priority {
        Priority::Low => label.green(),
        Priority::Medium => label.yellow(),
        Priority::High => label.red().bold(),
    }
}

fn print_row(row: &TaskRow) {
    let checkbox = if row.completed { "[x]" } else { "[ ]" };
    let text = if row.completed {
        row.text.dimmed().strikethrough()
    } else {
        row.text.normal()
    };
    println!(
        "{}  {} {} {}  {}",
        row.short_id.dimmed(),
        checkbox,
        colored_priority(row.priority),
        text,
        row.date.dimmed()
    );
}

/// Fail the command when the last mutation could not be saved
fn check_saved(controller: &Controller) -> Result<()> {
    match controller.status() {
        Some(status) => bail!("{}", status),
        None => Ok(()),
    }
}

fn resolve_id(controller: &Controller, reference: &str) -> Result<TaskId> {
    debug!(%reference, "resolve_id: called");
    match IdResolver::new(controller.tasks()).resolve(reference) {
        Ok(Some(id)) => Ok(id),
        Ok(None) => bail!("No task matches '{}'", reference),
        Err(candidates) => bail!("'{}' is ambiguous, matches: {}", reference, candidates.join(", ")),
    }
}

fn cmd_add(controller: &mut Controller, text: &str, priority: Priority) -> Result<()> {
    debug!(%priority, "cmd_add: called");
    let Some(id) = controller.add_task(text, priority) else {
        bail!("Task text is empty");
    };
    check_saved(controller)?;
    let short: String = id.chars().take(8).collect();
    println!("{} {} {}", "Added".green(), short.dimmed(), text.trim());
    Ok(())
}

fn cmd_list(controller: &mut Controller, filter: Filter, format: OutputFormat, date_format: &str) -> Result<()> {
    debug!(%filter, %format, "cmd_list: called");
    controller.set_filter(filter);
    let tasks = controller.visible_tasks();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        OutputFormat::Text => {
            if tasks.is_empty() {
                println!("{}", "No tasks found".bold());
                println!("{}", "Enjoy your productivity!".dimmed());
            }
            for row in task_rows(tasks, date_format) {
                print_row(&row);
            }
        }
    }
    Ok(())
}

fn cmd_toggle(controller: &mut Controller, reference: &str) -> Result<()> {
    let id = resolve_id(controller, reference)?;
    controller.toggle(&id);
    check_saved(controller)?;
    if let Some(task) = controller.store().find(&id) {
        let state = if task.completed { "completed".green() } else { "active".yellow() };
        println!("{} is now {}", task.text, state);
    }
    Ok(())
}

fn cmd_delete(controller: &mut Controller, reference: &str) -> Result<()> {
    let id = resolve_id(controller, reference)?;
    let text = controller.store().find(&id).map(|t| t.text.clone()).unwrap_or_default();
    controller.delete(&id);
    check_saved(controller)?;
    println!("{} {}", "Deleted".red(), text);
    Ok(())
}

fn cmd_clear_completed(controller: &mut Controller) -> Result<()> {
    let removed = controller.clear_completed();
    check_saved(controller)?;
    println!("Cleared {} completed task{}", removed, if removed == 1 { "" } else { "s" });
    Ok(())
}

fn cmd_stats(controller: &Controller, format: OutputFormat) -> Result<()> {
    let stats = controller.stats();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => {
            println!("Total:     {}", stats.total);
            println!("Completed: {}", stats.completed.to_string().green());
            println!("Progress:  {}%", stats.progress_percent.to_string().cyan());
        }
    }
    Ok(())
}

async fn cmd_decompose(
    controller: &mut Controller,
    config: &Config,
    text: &str,
    add: bool,
    priority: Priority,
) -> Result<()> {
    debug!(add, %priority, "cmd_decompose: called");
    controller.set_draft_text(text);
    controller.set_draft_priority(priority);
    let Some(ticket) = controller.begin_decompose() else {
        bail!("Task text is empty");
    };

    let decomposer = Decomposer::from_config(&config.llm).context("Cannot reach the AI provider")?;
    let outcome = match decomposer.try_decompose(&ticket.text).await {
        DecomposeOutcome::Failed(e) => bail!("Breakdown failed: {}", e),
        outcome => outcome,
    };

    if !controller.finish_decompose(&ticket, outcome) {
        println!("{}", controller.status().unwrap_or("No subtasks suggested"));
        return Ok(());
    }

    if let Some(review) = controller.review() {
        println!("Breakdown of \"{}\":", review.source_text.bold());
        for (i, suggestion) in review.suggestions.iter().enumerate() {
            println!("  {}. {}", (i + 1).to_string().cyan(), suggestion);
        }
    }

    if add {
        let added = controller.accept_suggestions();
        check_saved(controller)?;
        println!("{} {} tasks as {}", "Added".green(), added, colored_priority(priority));
    } else {
        controller.cancel_suggestions();
    }
    Ok(())
}

fn cmd_config(config: &Config, data_file: &Path, ephemeral: bool) -> Result<()> {
    println!("{}", serde_yaml::to_string(config).context("Failed to serialize config")?);
    let resolved = config.llm.resolve();
    println!("# provider model: {}", resolved.model);
    println!("# api key env:    {}", resolved.api_key_env);
    if ephemeral {
        println!("# data file:      (in memory)");
    } else {
        println!("# data file:      {}", data_file.display());
    }
    println!("# log file:       {}", get_log_path().display());
    Ok(())
}
