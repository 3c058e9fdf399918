//! Lingo - terminal client for the German/English translation service
//!
//! Parses the command line, sets up logging and configuration, builds the
//! application context and runs one command against the backend.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use tracing_appender::{non_blocking, rolling};

use lingo::app::AppContext;
use lingo::cli::{Args, Commands, ConfigAction, HistoryAction};
use lingo::config::Config;
use lingo::display::{format_health, TerminalDisplay};
use lingo::error::LingoError;
use lingo::history::HistoryEntry;
use lingo::language::{LanguageCatalog, AUTO_DETECT};
use lingo::session::{Completion, IgnoreReason};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("lingo.toml").exists() {
                info!("Found lingo.toml in current directory, loading...");
                Config::from_file("lingo.toml")?
            } else {
                Config::default()
            }
        }
    };

    let details = matches!(args.command, Commands::Translate { details: true, .. });
    let display = Arc::new(TerminalDisplay::new(details || args.verbose));

    match args.command {
        Commands::Config { action: ConfigAction::Init { path, force } } => {
            if path.exists() && !force {
                eprintln!("{} already exists (use --force to overwrite)", path.display());
                return Ok(ExitCode::FAILURE);
            }
            Config::default().save_to_file(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
        Commands::Languages => {
            println!("{:<10} {:<22} {:<8}", "Code", "Name", "Speech");
            println!("{}", "-".repeat(42));
            for language in LanguageCatalog::all() {
                println!("{:<10} {:<22} {:<8}", language.code, language.name, language.speech_locale);
            }
        }
        Commands::Translate { text, from, to, .. } => {
            let app = AppContext::new(config, display)?;
            apply_selections(&app, from.as_deref(), to.as_deref());
            app.session.set_source_text(text);
            return Ok(exit_code(app.session.translate().await));
        }
        Commands::Swap { text, from, to } => {
            let app = AppContext::new(config, display)?;
            apply_selections(&app, from.as_deref(), to.as_deref());
            app.session.set_source_text(text);
            let completion = app.session.translate().await;
            if !matches!(completion, Completion::Finished(ref result) if result.success) {
                return Ok(exit_code(completion));
            }

            app.session.swap_languages();
            let form = app.session.form();
            println!();
            println!("{:<8} {} ({})", "Source", form.source_label, display_code(&form.source_language));
            println!("{:<8} {}", "Target", display_code(&form.target_language));
            println!("{:<8} {}", "Text", form.source_text);
        }
        Commands::Detect { text } => {
            let app = AppContext::new(config, display)?;
            app.session.set_source_text(text);
            match app.session.detect_source_language().await {
                Ok(detected) => {
                    let name = detected
                        .language_name
                        .unwrap_or_else(|| LanguageCatalog::name_of(&detected.detected_language));
                    println!("{} ({})", name, detected.detected_language);
                    if let Some(confidence) = detected.confidence {
                        println!("Confidence: {}", confidence);
                    }
                }
                Err(e) => {
                    eprintln!("error: {}", e.user_message());
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::History { action } => {
            let app = AppContext::new(config, display)?;
            match action {
                HistoryAction::List => print_history(&app.history_entries()),
                HistoryAction::Remove { id } => {
                    if app.remove_history_entry(id)? {
                        println!("Removed entry {}", id);
                    } else {
                        println!("No entry with id {}", id);
                    }
                }
                HistoryAction::Clear { yes } => {
                    let count = app.history_entries().len();
                    if count == 0 {
                        println!("History is already empty.");
                    } else if yes || confirm(&format!("Clear all {} history entries?", count))? {
                        app.clear_history()?;
                        println!("Cleared {} history entries", count);
                    } else {
                        println!("Aborted.");
                    }
                }
                HistoryAction::Replay { id } => match app.session.replay(id).await {
                    Ok(completion) => return Ok(exit_code(completion)),
                    Err(LingoError::EntryNotFound(id)) => {
                        eprintln!("No entry with id {}", id);
                        return Ok(ExitCode::FAILURE);
                    }
                    Err(e) => return Err(e.into()),
                },
            }
        }
        Commands::Models { switch } => {
            let app = AppContext::new(config, display)?;
            if let Err(e) = app.models.refresh().await {
                eprintln!("error: {}", e.user_message());
            }

            if let Some(index) = switch {
                match app.models.switch_to(index).await {
                    Ok(state) => println!("Switched to {} on {}", state.current_model_name, state.device_descriptor),
                    Err(e) => {
                        eprintln!("error: {}", e.user_message());
                        return Ok(ExitCode::FAILURE);
                    }
                }
            }

            let state = app.models.state();
            println!("\nCurrent model: {} ({})", state.current_model_name, state.device_descriptor);
            if !state.available_models.is_empty() {
                println!("\n{:<6} {:<40} {:<8}", "Index", "Model", "Status");
                println!("{}", "-".repeat(56));
                for (index, name) in state.available_models.iter().enumerate() {
                    let status = if *name == state.current_model_name { "active" } else { "" };
                    println!("{:<6} {:<40} {:<8}", index, name, status);
                }
            }
        }
        Commands::Health => {
            let app = AppContext::new(config, display)?;
            match app.backend.health().await {
                Ok(health) => {
                    println!("{}", format_health(&health));
                    if !health.is_healthy() {
                        return Ok(ExitCode::FAILURE);
                    }
                }
                Err(e) => {
                    eprintln!("error: {}", e.user_message());
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Apply --from/--to, accepting codes or display names
fn apply_selections(app: &AppContext, from: Option<&str>, to: Option<&str>) {
    if let Some(from) = from {
        app.session.set_source_language(resolve_language(from));
    }
    if let Some(to) = to {
        app.session.set_target_language(resolve_language(to));
    }
}

/// Unknown names pass through; the server decides whether it supports them
fn resolve_language(input: &str) -> String {
    LanguageCatalog::resolve(input)
        .map(str::to_string)
        .unwrap_or_else(|| input.trim().to_string())
}

fn display_code(code: &str) -> &str {
    if code.is_empty() { AUTO_DETECT } else { code }
}

fn exit_code(completion: Completion) -> ExitCode {
    match completion {
        Completion::Finished(result) if result.success => ExitCode::SUCCESS,
        Completion::Finished(_) | Completion::Discarded => ExitCode::FAILURE,
        Completion::Ignored(IgnoreReason::EmptyInput) => {
            eprintln!("Nothing to translate.");
            ExitCode::FAILURE
        }
        Completion::Ignored(IgnoreReason::InFlight) => ExitCode::FAILURE,
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No translations in history.");
        return;
    }

    println!("\nTranslation History:");
    println!("{:<15} {:<20} {:<12} {:<40}", "ID", "When", "Languages", "Source -> Translation");
    println!("{}", "-".repeat(90));

    for entry in entries {
        let when = chrono::DateTime::parse_from_rfc3339(&entry.timestamp)
            .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| entry.timestamp.clone());
        let languages = format!("{} -> {}", entry.source_language, display_code(&entry.target_language));

        println!(
            "{:<15} {:<20} {:<12} {} -> {}",
            entry.id,
            when,
            languages,
            preview(&entry.source_text, 30),
            preview(&entry.translated_text, 30)
        );
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() > max_chars {
        let cut: String = single_line.chars().take(max_chars - 3).collect();
        format!("{}...", cut)
    } else {
        single_line
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".lingo").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "lingo.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };
    // Translations go to stdout, so the console only hears about problems
    let console_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .with_filter(console_level);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - level: {}, file: {}",
          log_level, log_dir.join("lingo.log").display());

    Ok(())
}
