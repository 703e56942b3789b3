use clap::Parser;
use deduction_recon::{CliArgs, LoggingConfig, cli, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = init_logging(LoggingConfig::from_env())?;

    let args = CliArgs::parse();
    let result = cli::run(args).await;
    if let Err(err) = &result {
        tracing::error!(error = %format!("{err:#}"), "command failed");
    }
    result
}
