pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "dealband",
    about = "Dealband pricing operator CLI",
    long_about = "Price creator ad deals, inspect the chat parser, and operate the reference database.",
    after_help = "Examples:\n  dealband price --creator c-42 --params '{\"format\":\"reels\",\"exclusivity\":\"nenhuma\",\"usageRights\":\"organico\"}'\n  dealband chat --creator c-42 \"quanto cobrar por 3 reels sem exclusividade?\"\n  dealband doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price a structured deal request for a creator")]
    Price {
        #[arg(long, help = "Creator identifier")]
        creator: String,
        #[arg(long, help = "Deal parameters as a JSON object (camelCase fields)")]
        params: String,
        #[arg(long, help = "Known profile segment, skipping the metrics-first lookup")]
        segment: Option<String>,
    },
    #[command(about = "Send a free-text chat message through the pricing flow")]
    Chat {
        #[arg(long, help = "Creator identifier")]
        creator: String,
        #[arg(long, help = "Topic of the previous conversation turn")]
        previous_topic: Option<String>,
        message: String,
    },
    #[command(about = "Show what the chat parser extracts from a message, offline")]
    Parse {
        #[arg(long, help = "Topic of the previous conversation turn")]
        previous_topic: Option<String>,
        message: String,
    },
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, pricing settings, and DB connectivity checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Price { creator, params, segment } => {
            commands::price::run(&creator, &params, segment.as_deref())
        }
        Command::Chat { creator, previous_topic, message } => {
            commands::chat::run(&creator, &message, previous_topic.as_deref())
        }
        Command::Parse { previous_topic, message } => {
            commands::parse::run(&message, previous_topic.as_deref())
        }
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
