//! `folio` - CLI for the portfolio backend
//!
//! This binary runs the HTTP server and offers offline views over the
//! feedback store.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;

use folio::cli::{Cli, Command, ConfigCommand, FeedbackCommand, ServeCommand};
use folio::{init_logging, Config, FeedbackRecord, FeedbackService, FeedbackType, JsonFileStore, TypeCounts};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    // Execute the command
    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, serve_cmd).await,
        Command::Feedback(feedback_cmd) => handle_feedback(&config, feedback_cmd).await,
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    if let Some(dir) = cmd.feedback_dir {
        config.storage.feedback_dir = Some(dir);
    }
    config.validate()?;

    folio::server::serve(&config)
        .await
        .context("server exited with an error")
}

async fn handle_feedback(config: &Config, cmd: FeedbackCommand) -> anyhow::Result<()> {
    // Read-only: a store that does not exist yet is simply empty
    let store = JsonFileStore::new(config.feedback_dir(), config.storage.daily_log);
    let service = FeedbackService::new(Arc::new(store));

    match cmd {
        FeedbackCommand::List { json } => {
            let records = service.all().await.context("failed to read feedback")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                println!("{} feedback records", records.len());
                println!();
                for record in &records {
                    print_record_line(record);
                }
            }
        }
        FeedbackCommand::Stats { json } => {
            let stats = service.stats().await.context("failed to read feedback")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Feedback Statistics");
                println!("===================");
                println!("Total:              {}", stats.total);
                print_type_counts(&stats.by_type);
                println!();
                println!("Most recent:");
                for record in &stats.recent {
                    print_record_line(record);
                }
            }
        }
        FeedbackCommand::Summary { date, json } => {
            let date = date
                .map(|raw| {
                    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                        .with_context(|| format!("invalid date '{raw}', expected YYYY-MM-DD"))
                })
                .transpose()?;
            let summary = service
                .summary(date)
                .await
                .context("failed to read feedback")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Feedback for {}", summary.date);
                println!("========================");
                println!("Total:              {}", summary.total_count);
                print_type_counts(&summary.by_type);
                println!();
                for preview in &summary.feedback {
                    println!(
                        "[{}] {:<9} {} <{}>",
                        preview.timestamp, preview.feedback_type, preview.name, preview.email
                    );
                    println!("    {}", preview.message);
                }
            }
        }
    }
    Ok(())
}

fn print_type_counts(counts: &TypeCounts) {
    for feedback_type in FeedbackType::ALL {
        println!(
            "  {:<18}{}",
            format!("{feedback_type}:"),
            counts.get(feedback_type)
        );
    }
}

fn print_record_line(record: &FeedbackRecord) {
    println!(
        "[{}] {:<9} {} <{}> ({})",
        record.submitted_at, record.feedback_type, record.name, record.email, record.id
    );
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Address:            {}", config.bind_address());
                println!("  Environment:        {}", config.server.environment);
                if config.server.allowed_origins.is_empty() {
                    println!("  Allowed origins:    any");
                } else {
                    println!(
                        "  Allowed origins:    {}",
                        config.server.allowed_origins.join(", ")
                    );
                }
                println!("  Body limit (bytes): {}", config.server.body_limit_bytes);
                println!();
                println!("[Storage]");
                println!("  Feedback dir:       {}", config.feedback_dir().display());
                println!("  Feedback file:      {}", config.feedback_file().display());
                println!("  Daily log:          {}", config.storage.daily_log);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
