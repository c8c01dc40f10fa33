use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::args::Args;
use crate::commands::Command;
use crate::commands::CottonCommand;

/// The main CLI structure that defines the command-line interface
#[derive(Parser)]
#[command(name = "cotton-ls")]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CottonCommand,

    #[command(flatten)]
    pub args: Args,
}

/// Parse CLI arguments and execute the chosen command
pub fn run(args: Vec<String>) -> Result<ExitCode> {
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| {
        e.exit();
    });

    let exit = match &cli.command {
        CottonCommand::Check(check) => check.execute(&cli.args)?,
        CottonCommand::Serve(serve) => serve.execute(&cli.args)?,
    };

    Ok(exit.report(cli.args.global.quiet))
}
