#![forbid(unsafe_code)]
//! cmdscan Command Line Interface

mod commands;

use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;

use clap::{Arg, ArgAction};
use console::style;
use tracing::Level;

use cmdscan::config::CONFIG_FILE;
use cmdscan::{
    setup_logging, BaseLocation, Config, Discovery, Dispatcher, Registry, COMMAND_NAME_ATTRIBUTE,
};

/// Command modules live next to this file
const COMMANDS_REFERENCE: &str = ".commands";
const ANCHOR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/src/main.rs");

fn app() -> clap::Command {
    clap::Command::new("cmdscan")
        .about("Runs commands discovered from the command directory")
        .version(cmdscan::VERSION)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Verbose output"),
        )
}

/// `-v`/`--verbose` anywhere before `--`; logging starts before the parser exists
fn verbose_requested<I, T>(args: I) -> bool
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .skip(1)
        .map(Into::<OsString>::into)
        .take_while(|arg| arg != "--")
        .any(|arg| arg == "-v" || arg == "--verbose")
}

/// Discover the compiled-in commands under `config`
fn discover(config: &Config) -> anyhow::Result<Registry> {
    let anchor = Path::new(ANCHOR);
    let location = config.location(BaseLocation::package(COMMANDS_REFERENCE, anchor), Some(anchor));
    let discovery = config.apply(Discovery::commands(location))?;
    Ok(discovery.registry(&commands::module_table(), COMMAND_NAME_ATTRIBUTE)?)
}

fn run() -> anyhow::Result<()> {
    let level = if verbose_requested(std::env::args_os()) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    setup_logging(level);

    let config = Config::load_or_default(CONFIG_FILE)?;
    let dispatcher = Dispatcher::new(app(), discover(&config)?)?;
    let matches = dispatcher.command().get_matches();
    dispatcher.dispatch(&matches)
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", style("✗").red(), err);
            ExitCode::FAILURE
        }
    }
}
