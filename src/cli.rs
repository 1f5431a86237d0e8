//! Command-line arguments and terminal formatting

use clap::Parser;
use owo_colors::OwoColorize;
use std::path::PathBuf;

const DIVIDER: &str = "----------------------------------------";

/// Weather and web search assistant
#[derive(Debug, Parser)]
#[command(name = "skyroute", version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Answer one query and exit instead of starting the prompt
    #[arg(short, long, value_name = "TEXT")]
    pub query: Option<String>,
}

pub fn banner() -> String {
    format!(
        "{}\n{}\nAsk about the weather in Pakistan's major cities, or anything else.\nType {} for commands, {} to leave.\n{}",
        DIVIDER.dimmed(),
        format!("skyroute {}", crate::VERSION).bold().cyan(),
        "help".green(),
        "exit".green(),
        DIVIDER.dimmed()
    )
}

pub fn prompt() -> String {
    format!("{} ", "You:".bold().green())
}

pub fn reply(text: &str) -> String {
    format!("{} {}\n{}", "Assistant:".bold().cyan(), text, DIVIDER.dimmed())
}

pub fn error(text: &str) -> String {
    format!("{} {}", "[ERROR]".bright_red(), text)
}

pub fn goodbye() -> String {
    "Goodbye!".yellow().to_string()
}
