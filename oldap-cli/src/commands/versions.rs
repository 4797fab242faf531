use super::Execute;
use clap::Args;
use oldap_errors::Error;

const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Args, Debug)]
pub(crate) struct Command;

impl Execute for Command {
    fn execute(&self) -> Result<(), Error> {
        println!("oldap-cli:      {}", CLI_VERSION);
        println!("oldap-core:     {}", env!("CARGO_PKG_VERSION"));
        Ok(())
    }
}
