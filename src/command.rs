//! @acp:module "Command Capability"
//! @acp:summary "Contract every discovered command implements"
//! @acp:domain cli
//! @acp:layer api
//!
//! A command module defines a `Command` type that implements [`BaseCommand`],
//! gives it an associated `COMMAND_NAME` constant, and exports it from the
//! module's init function:
//!
//! ```rust,ignore
//! #[derive(Default)]
//! pub struct Command;
//!
//! impl Command {
//!     pub const COMMAND_NAME: &'static str = "greet";
//! }
//!
//! impl BaseCommand for Command {
//!     fn setup_parser(parser: clap::Command) -> clap::Command {
//!         parser.arg(clap::Arg::new("name").required(true))
//!     }
//!
//!     fn run(&self, args: &clap::ArgMatches) -> anyhow::Result<()> {
//!         println!("hello {}", args.get_one::<String>("name").unwrap());
//!         Ok(())
//!     }
//! }
//!
//! pub fn exports() -> anyhow::Result<ModuleExports> {
//!     Ok(ModuleExports::new().with_type(
//!         LoadedType::command::<Command>("Command")
//!             .with_attribute("COMMAND_NAME", Command::COMMAND_NAME),
//!     ))
//! }
//! ```

use clap::ArgMatches;

use crate::matching::MatchSpec;

/// Type name every command module exports
pub const COMMAND_TYPE: &str = "Command";

/// Attribute holding a command's sub-command name
pub const COMMAND_NAME_ATTRIBUTE: &str = "COMMAND_NAME";

/// @acp:summary "Base capability of a discovered command"
pub trait BaseCommand: 'static {
    /// Configure the command-specific arguments on `parser`
    fn setup_parser(parser: clap::Command) -> clap::Command
    where
        Self: Sized;

    /// Help text shown in the sub-command listing.
    ///
    /// `None` falls back to `"<name> command"`.
    fn help() -> Option<String>
    where
        Self: Sized,
    {
        None
    }

    /// Execute the command with the parsed arguments
    fn run(&self, args: &ArgMatches) -> anyhow::Result<()>;
}

/// @acp:summary "Type-erased hooks of a command type"
#[derive(Debug, Clone, Copy)]
pub struct CommandHooks {
    setup_parser: fn(clap::Command) -> clap::Command,
    help: fn() -> Option<String>,
    create: fn() -> Box<dyn BaseCommand>,
}

impl CommandHooks {
    pub fn of<T: BaseCommand + Default>() -> Self {
        Self {
            setup_parser: T::setup_parser,
            help: T::help,
            create: create::<T>,
        }
    }

    pub fn setup_parser(&self, parser: clap::Command) -> clap::Command {
        (self.setup_parser)(parser)
    }

    /// Help text for a command registered as `name`
    pub fn help(&self, name: &str) -> String {
        (self.help)().unwrap_or_else(|| default_help(name))
    }

    /// Construct a fresh command instance
    pub fn instantiate(&self) -> Box<dyn BaseCommand> {
        (self.create)()
    }
}

fn create<T: BaseCommand + Default>() -> Box<dyn BaseCommand> {
    Box::new(T::default())
}

/// Generated help text for commands that do not provide one
pub fn default_help(name: &str) -> String {
    format!("{} command", name)
}

/// Match spec for command modules: a `Command` type implementing
/// [`BaseCommand`] with a `COMMAND_NAME` attribute
pub fn command_match_spec() -> MatchSpec {
    MatchSpec::new(COMMAND_TYPE)
        .with_attribute(COMMAND_NAME_ATTRIBUTE)
        .with_base::<dyn BaseCommand>()
}
