use anyhow::Result;
use clap::Parser;
use granola_export::cli::{
    handle_convert_command, handle_meetings_command, handle_transcripts_command, Cli, CliCommand,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        CliCommand::Transcripts(args) => handle_transcripts_command(args).await,
        CliCommand::Meetings(args) => handle_meetings_command(args).await,
        CliCommand::Convert(args) => handle_convert_command(args),
        CliCommand::Version => {
            println!("granola-export {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
