mod platform;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use examdash_engine::ClientSettings;
use log::LevelFilter;

use platform::logging::LogDestination;

#[derive(Parser)]
#[command(author, version, about = "Terminal client for the exam dashboard", long_about = None)]
/// Command-line arguments
struct Args {
    /// Dashboard server base URL.
    #[arg(long, value_name = "URL", default_value = "http://127.0.0.1:8000")]
    base_url: String,

    /// Directory holding the client state file.
    #[arg(long, value_name = "DIR", default_value = ".")]
    state_dir: PathBuf,

    /// Minimum level written to the logs.
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LevelFilter,

    /// Also write logs to ./examdash.log.
    #[arg(long = "log-file", action = ArgAction::SetTrue)]
    log_file: bool,

    /// Use the dark theme when no theme has been saved yet.
    #[arg(long = "prefer-dark", action = ArgAction::SetTrue)]
    prefer_dark: bool,

    /// Upload request timeout in seconds.
    #[arg(long, value_name = "SECONDS", default_value = "60")]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a PDF and follow its processing job to completion.
    Upload {
        /// PDF file to upload (10 MB max).
        file: PathBuf,
    },
    /// Reconcile a job left over from a previous run.
    Resume,
    /// Delete an exam after confirmation.
    Delete {
        exam_id: String,
        /// Exam name shown in the confirmation prompt.
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
        /// Skip the confirmation prompt.
        #[arg(long, action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Show or toggle the saved theme.
    Theme {
        #[arg(long, action = ArgAction::SetTrue)]
        toggle: bool,
    },
    /// Print the sign-in URL.
    Login,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let destination = if args.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    };
    platform::logging::initialize(destination, args.log_level);

    let settings = ClientSettings {
        base_url: args.base_url,
        request_timeout: Duration::from_secs(args.timeout),
        ..ClientSettings::default()
    };
    let page = platform::PageConfig {
        settings,
        state_dir: args.state_dir,
        prefers_dark: args.prefer_dark,
    };

    let action = match args.command {
        Command::Upload { file } => platform::Action::Upload { file },
        Command::Resume => platform::Action::Resume,
        Command::Delete { exam_id, name, yes } => platform::Action::Delete {
            exam_name: name.unwrap_or_else(|| exam_id.clone()),
            exam_id,
            confirmed: yes,
        },
        Command::Theme { toggle } => platform::Action::Theme { toggle },
        Command::Login => platform::Action::Login,
    };

    platform::run_app(page, action)
}
