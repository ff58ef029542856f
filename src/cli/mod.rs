use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

pub mod convert;
pub mod fetch;

pub use convert::handle_convert_command;
pub use fetch::{handle_meetings_command, handle_transcripts_command};

#[derive(Parser, Debug)]
#[command(name = "granola-export")]
#[command(about = "Export Granola meeting transcripts and notes", long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Download meeting transcripts as JSON files
    Transcripts(FetchCliArgs),
    /// Download meeting notes and metadata as JSON files
    Meetings(FetchCliArgs),
    /// Convert downloaded JSON files into Markdown documents
    Convert(ConvertCliArgs),
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct FetchCliArgs {
    /// Output directory (default from config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Only download meetings from the last N days (default: all time)
    #[arg(short, long)]
    pub days: Option<i64>,
    /// Force overwrite of existing files
    #[arg(short, long)]
    pub force: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ConvertCliArgs {
    /// Directory containing downloaded transcript JSON files (default from config)
    #[arg(long)]
    pub transcripts: Option<PathBuf>,
    /// Directory containing downloaded meeting JSON files (default from config)
    #[arg(long)]
    pub meetings: Option<PathBuf>,
    /// Output directory for Markdown files (default from config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Only convert meetings from the last N days (default: all time)
    #[arg(short, long)]
    pub days: Option<i64>,
    /// Force overwrite of existing Markdown files
    #[arg(short, long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transcripts_flags() {
        let cli = Cli::try_parse_from([
            "granola-export",
            "transcripts",
            "-o",
            "/tmp/out",
            "-d",
            "7",
            "-f",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            CliCommand::Transcripts(args) => {
                assert_eq!(args.output.unwrap(), PathBuf::from("/tmp/out"));
                assert_eq!(args.days, Some(7));
                assert!(args.force);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_convert_input_overrides() {
        let cli = Cli::try_parse_from([
            "granola-export",
            "convert",
            "--transcripts",
            "t",
            "--meetings",
            "m",
        ])
        .unwrap();

        match cli.command {
            CliCommand::Convert(args) => {
                assert_eq!(args.transcripts.unwrap(), PathBuf::from("t"));
                assert_eq!(args.meetings.unwrap(), PathBuf::from("m"));
                assert!(args.output.is_none());
                assert!(!args.force);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["granola-export"]).is_err());
    }
}
