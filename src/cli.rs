mod api;
mod fetch;

use clap::{Parser, Subcommand};

pub use self::fetch::FetchArgs;

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch the generation, print the hourly averages, and write the exports.
    #[clap(name = "fetch")]
    Fetch(Box<FetchArgs>),

    /// List the supported bidding zones.
    #[clap(name = "zones")]
    Zones,
}
