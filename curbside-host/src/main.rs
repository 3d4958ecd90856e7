//! Entry point that answers one voice-assistant request about curbside pickups.
//!
//! The request envelope is read from stdin and the response envelope is written
//! to stdout. Logs go to stderr.

mod envelope;
mod settings;

use std::io::{self, Write as _};

use anyhow::{Context as _, Result};
use curbside_core::{Config, Dispatcher};
use curbside_provider_recollect as recollect;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::envelope::{RequestEnvelope, ResponseEnvelope};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // A missing address aborts the invocation without a response.
    let config = Config::from_env()?;
    info!(address = config.street_address(), "using the configured address");

    let service = recollect::service(settings::recollect_from_env()?)?;
    let dispatcher = Dispatcher::new(config, service);

    run(&dispatcher).await.inspect_err(|err| {
        error!(error = %err, "failed to answer the request");
    })
}

async fn run(dispatcher: &Dispatcher) -> Result<()> {
    let raw = io::read_to_string(io::stdin()).context("failed to read the request")?;
    let request: RequestEnvelope =
        serde_json::from_str(&raw).context("failed to decode the request envelope")?;

    let answer = dispatcher.dispatch(&request.intent()).await?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &ResponseEnvelope::simple(answer))
        .context("failed to write the response")?;
    writeln!(stdout)?;
    Ok(())
}
