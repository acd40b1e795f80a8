use clap::Parser;
use deploy_scripts::{cli::Cli, errors::ScriptError};
use tool_utils::TerminalPrompter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let ctx = cli.context()?;
    let mut prompter = TerminalPrompter::stdio();

    cli.command.run(&ctx, &mut prompter).await
}
