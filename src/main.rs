// file: src/main.rs
// version: 2.0.0
// guid: 9b4d2e70-a1c6-4f85-83e9-5c0f7b2d6a14

//! pve-devbox-agent - Main entry point

use clap::Parser;
use colored::Colorize;
use pve_devbox_agent::{
    cli::{args::Cli, commands::*, Commands},
    config::ConfigLoader,
    logging::init_logger,
    ProvisionError, Result,
};
use tokio::signal;
use tracing::warn;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logger(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }

    // Prompts block on stdin, so the command runs on its own task and
    // Ctrl+C is observed here.
    let command = tokio::spawn(run(cli));

    let result = tokio::select! {
        joined = command => joined.unwrap_or_else(|e| {
            Err(ProvisionError::config(format!("Command task failed: {}", e)))
        }),
        _ = signal::ctrl_c() => Err(ProvisionError::Interrupted),
    };

    if let Err(e) = result {
        if matches!(e, ProvisionError::Interrupted) {
            warn!("Interrupted by user");
        } else {
            eprintln!("{} {}", "error:".red().bold(), e);
        }
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let app = ConfigLoader::new().load_app_config(cli.config.as_deref())?;

    match cli.command.unwrap_or_else(Commands::interactive_create) {
        Commands::Create {
            answers,
            yes,
            dry_run,
            json,
        } => {
            // Declining the plan still exits 0
            create_command(&app, answers.as_deref(), yes, dry_run, json).await?;
            Ok(())
        }
        Commands::Render { answers, output } => {
            render_payload_command(&app, answers.as_deref(), output.as_deref()).await
        }
        Commands::CheckPrereqs => check_prereqs_command().await,
    }
}
