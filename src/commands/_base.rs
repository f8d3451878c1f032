//! Shared helpers for command modules

use clap::ArgMatches;

/// Typed view over a command's parsed arguments
pub trait FromArgs: Sized {
    fn from_args(args: &ArgMatches) -> anyhow::Result<Self>;
}
