//! CLI for the Linkup search/fetch API.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use linkup_core::{Depth, OutputType};

use commands::{run_balance, run_completions, run_fetch, run_search};

/// Top-level CLI for the Linkup API.
#[derive(Debug, Parser)]
#[command(name = "linkup")]
#[command(about = "linkup: search and fetch the web through the Linkup API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Flags shared by every command that talks to the API.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Override the API base URL (e.g. for testing).
    #[arg(long = "base", value_name = "URL")]
    pub base_url: Option<String>,

    /// Custom User-Agent.
    #[arg(long = "ua", value_name = "UA")]
    pub user_agent: Option<String>,

    /// Deadline for the whole call in seconds, retries included.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// API key.
    #[arg(long, env = "LINKUP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Query text.
    #[arg(short = 'q', long = "query", value_name = "TEXT")]
    pub query: String,

    /// Search depth: standard|deep.
    #[arg(long, default_value = "standard")]
    pub depth: Depth,

    /// Output type: sourcedAnswer|searchResults|structured.
    #[arg(long = "output", default_value = "searchResults")]
    pub output_type: OutputType,

    /// Only results published on or after this date (YYYY-MM-DD).
    #[arg(long = "from", value_name = "DATE")]
    pub from_date: Option<String>,

    /// Only results published on or before this date (YYYY-MM-DD).
    #[arg(long = "to", value_name = "DATE")]
    pub to_date: Option<String>,

    /// Comma-separated domains to restrict results to.
    #[arg(long, value_name = "DOMAINS")]
    pub include: Option<String>,

    /// Comma-separated domains to exclude.
    #[arg(long, value_name = "DOMAINS")]
    pub exclude: Option<String>,

    /// Include images.
    #[arg(long)]
    pub images: bool,

    /// Include inline citations.
    #[arg(long)]
    pub inline: bool,

    /// Include sources in the response.
    #[arg(long)]
    pub sources: bool,

    /// Structured output schema (JSON string), used with `--output structured`.
    #[arg(long, value_name = "JSON")]
    pub schema: Option<String>,

    #[command(flatten)]
    pub conn: ConnectionArgs,
}

#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// URL to fetch.
    #[arg(long)]
    pub url: String,

    /// Include raw HTML.
    #[arg(long = "rawhtml")]
    pub raw_html: bool,

    /// Render JavaScript before extracting.
    #[arg(long)]
    pub render: bool,

    /// Extract images.
    #[arg(long)]
    pub images: bool,

    #[command(flatten)]
    pub conn: ConnectionArgs,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a web search.
    Search(SearchArgs),

    /// Fetch a single URL as markdown.
    Fetch(FetchArgs),

    /// Show the remaining credit balance.
    Balance {
        #[command(flatten)]
        conn: ConnectionArgs,
    },

    /// Print a shell completion script to stdout.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        cli.command.run()
    }

    fn run(self) -> Result<()> {
        match self {
            CliCommand::Search(args) => run_search(&args)?,
            CliCommand::Fetch(args) => run_fetch(&args)?,
            CliCommand::Balance { conn } => run_balance(&conn)?,
            CliCommand::Completions { shell } => run_completions(shell),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
