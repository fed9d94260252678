// Entrypoint for the CLI application.
// - Sets up logging on stderr and the Ctrl-C handler, then hands the real
//   terminal and API client to the setup menu.
// - The exit status comes from the `SetupOutcome`; cancelling is never an
//   error.

use anyhow::{Context, Result};
use std::process::ExitCode;
use supabase_setup::{
    api::ApiClient,
    config::Config,
    setup::{self, SetupOutcome},
    ui::{is_interrupted, Terminal, TerminalState},
};
use tracing_subscriber::EnvFilter;

const CANCELLED: &str = "\n\nCancelled by user.";

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    // Prompts in raw mode report Ctrl-C as an `Interrupted` error instead;
    // this covers the sleep, the HTTP calls and hidden-input prompts, which
    // leave echo off if the process exits under them.
    let terminal = TerminalState::capture();
    if let Err(err) = ctrlc::set_handler(move || {
        terminal.restore();
        println!("{}", CANCELLED);
        std::process::exit(0);
    }) {
        tracing::warn!(error = %err, "could not install Ctrl-C handler");
    }

    match run() {
        Ok(outcome) => ExitCode::from(outcome.exit_status()),
        Err(err) if is_interrupted(&err) => {
            println!("{}", CANCELLED);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<SetupOutcome> {
    let config = Config::from_env()?;
    let api = ApiClient::new(&config.api_url).context("Failed to build HTTP client")?;
    tracing::debug!(
        api = api.base_url(),
        env_file = %config.env_file.display(),
        "starting setup"
    );

    setup::main_menu(&Terminal, &api, &config)
}
