pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "kopi",
    about = "Kopi assistant operator CLI",
    long_about = "Operate the kopi assistant: migrations, outlet seeding, readiness checks, and an interactive chat loop.",
    after_help = "Examples:\n  kopi doctor --json\n  kopi seed\n  kopi chat"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Migrate, load the outlet seed dataset, and verify predicate coverage")]
    Seed,
    #[command(about = "Validate config, LLM readiness, and database connectivity checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Start an interactive chat session against the dispatch router")]
    Chat,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Chat => return commands::chat::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
