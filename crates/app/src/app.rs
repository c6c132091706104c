use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use stdsync_api::{ApiClient, ApiSettings, StandardsApi, StandardsClient};
use stdsync_sync::{ApplyOptions, ExtractOptions};

use crate::cli::{Cli, Commands};
use crate::commands::{
    handle_apply_command, handle_check_command, handle_extract_command, handle_list_command,
    ApplyRequest,
};
use crate::picker::PromptPicker;

/// The main entry point for the `stdsync` application.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let api = connect(cli.command.organization())?;
    let runtime = Runtime::new()?;
    let mut stdout = io::stdout().lock();
    runtime.block_on(dispatch(&api, cli.command, &mut stdout))
}

/// Builds the HTTP client from the environment. No request is sent yet.
fn connect(organization: &str) -> Result<StandardsClient> {
    let settings = ApiSettings::from_env(organization)?;
    tracing::debug!(
        base_url = %settings.base_url,
        provider = %settings.provider,
        organization,
        "Using Codacy API"
    );
    Ok(StandardsClient::new(ApiClient::new(settings)?))
}

pub(crate) async fn dispatch<A>(api: &A, command: Commands, out: &mut dyn Write) -> Result<()>
where
    A: StandardsApi + ?Sized,
{
    let picker = PromptPicker;
    match command {
        Commands::List { json, .. } => handle_list_command(api, json, out).await,
        Commands::Extract {
            select,
            output,
            include_disabled_patterns,
            concurrency,
            ..
        } => {
            let options = ExtractOptions {
                concurrency,
                include_disabled_patterns,
            };
            handle_extract_command(api, select.selector(&picker), output, &options, out)
                .await
                .map(|_| ())
        }
        Commands::Apply {
            name,
            config,
            output,
            prune,
            dry_run,
            no_promote,
            batch_size,
            ..
        } => {
            let request = ApplyRequest {
                name,
                config,
                output,
                promote: !no_promote,
                options: ApplyOptions {
                    prune,
                    dry_run,
                    pattern_batch_size: batch_size,
                },
            };
            handle_apply_command(api, request, out).await
        }
        Commands::Check {
            select,
            config,
            prune,
            ..
        } => handle_check_command(api, select.selector(&picker), &config, prune, out).await,
    }
}
