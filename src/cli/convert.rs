//! CLI handler for the Markdown conversion command.

use crate::cli::ConvertCliArgs;
use crate::config::Config;
use crate::convert::{self, ConvertOptions};
use anyhow::Result;

pub fn handle_convert_command(args: ConvertCliArgs) -> Result<()> {
    let config = Config::load()?;

    let options = ConvertOptions {
        transcripts_dir: args
            .transcripts
            .unwrap_or(config.output.transcripts_dir),
        meetings_dir: args.meetings.unwrap_or(config.output.meetings_dir),
        output_dir: args.output.unwrap_or(config.output.markdown_dir),
        days: args.days,
        force: args.force,
    };

    convert::run(&options)?;
    Ok(())
}
