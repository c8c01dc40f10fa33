use anyhow::Context;
use anyhow::Result;
use clap::Parser;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Serve {}

impl Command for Serve {
    fn execute(&self, _args: &Args) -> Result<Exit> {
        cotton_server::run().context("Language server failed")?;
        Ok(Exit::success())
    }
}
