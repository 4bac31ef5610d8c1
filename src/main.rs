mod cli;
mod daemon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use comment_warden::constants::DEFAULT_CONFIG_FILE;

#[derive(Parser)]
#[command(name = "comment-warden", version, about = "Comment Warden: automatic comment moderation for one video")]
struct App {
    /// Path to the JSON config file
    #[arg(long, short, global = true, env = "COMMENT_WARDEN_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the moderation daemon (default)
    Run {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },
    /// Validate the config and test a text against the banned patterns
    Check {
        /// Text to test (omit to only validate the config)
        text: Option<String>,
    },
    /// Show the persisted violation ledger
    Ledger {
        /// Only list blocked users
        #[arg(long)]
        blocked: bool,
    },
}

fn main() -> ExitCode {
    let app = App::parse();

    let result = match app.command.unwrap_or(Commands::Run { once: false }) {
        Commands::Run { once } => daemon::run(&app.config, once),
        Commands::Check { text } => cli::check::run(&app.config, text.as_deref()),
        Commands::Ledger { blocked } => cli::ledger::run(&app.config, blocked),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
