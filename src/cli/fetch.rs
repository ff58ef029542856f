//! CLI handlers for the transcript and meeting download commands.

use crate::api::GranolaClient;
use crate::auth::Credential;
use crate::cli::FetchCliArgs;
use crate::config::Config;
use crate::fetch::{self, FetchOptions};
use crate::fetch::meetings::MeetingExporter;
use crate::fetch::transcripts::TranscriptExporter;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub async fn handle_transcripts_command(args: FetchCliArgs) -> Result<()> {
    let config = Config::load()?;
    let options = fetch_options(&args, config.output.transcripts_dir.clone(), &config);
    let client = build_client(&config)?;

    fetch::run(&client, &TranscriptExporter, &options).await?;
    Ok(())
}

pub async fn handle_meetings_command(args: FetchCliArgs) -> Result<()> {
    let config = Config::load()?;
    let options = fetch_options(&args, config.output.meetings_dir.clone(), &config);
    let client = build_client(&config)?;

    fetch::run(&client, &MeetingExporter, &options).await?;
    Ok(())
}

fn build_client(config: &Config) -> Result<GranolaClient> {
    info!("Loading Granola credentials");
    let credential = Credential::load()?;
    Ok(GranolaClient::new(&credential, &config.api, &config.fetch))
}

fn fetch_options(args: &FetchCliArgs, default_dir: PathBuf, config: &Config) -> FetchOptions {
    FetchOptions {
        output_dir: args.output.clone().unwrap_or(default_dir),
        days: args.days,
        force: args.force,
        item_delay: Duration::from_millis(config.fetch.item_delay_ms),
    }
}
