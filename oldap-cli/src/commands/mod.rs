use clap::Subcommand;
use oldap_errors::Error;
use tracing::trace;

mod config;
mod datamodel;
mod versions;

pub(crate) trait Execute {
    fn execute(&self) -> Result<(), Error>;
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Show the resolved environment configuration
    Config(config::Command),
    /// Data-model lifecycle operations (create / delete) against the configured endpoint
    #[command(subcommand)]
    Datamodel(datamodel::Command),
    /// Show tool and library versions
    Versions(versions::Command),
}

impl Execute for Commands {
    fn execute(&self) -> Result<(), Error> {
        trace!("Commands::execute self: {self:?}");
        match self {
            Commands::Config(cmd) => cmd.execute(),
            Commands::Datamodel(cmd) => cmd.execute(),
            Commands::Versions(cmd) => cmd.execute(),
        }
    }
}
