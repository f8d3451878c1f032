//! @acp:module "Example Command"
//! @acp:summary "Minimal command showing the module layout"
//! @acp:domain cli
//! @acp:layer handler

use clap::{Arg, ArgAction, ArgMatches};

use cmdscan::{BaseCommand, LoadedType, ModuleExports, COMMAND_NAME_ATTRIBUTE, COMMAND_TYPE};

use super::_base::FromArgs;

#[derive(Debug, Default)]
pub struct Command;

impl Command {
    pub const COMMAND_NAME: &'static str = "example";
}

#[derive(Debug)]
struct ExampleArgs {
    example: bool,
}

impl FromArgs for ExampleArgs {
    fn from_args(args: &ArgMatches) -> anyhow::Result<Self> {
        Ok(Self {
            example: args.get_flag("example"),
        })
    }
}

impl BaseCommand for Command {
    fn setup_parser(parser: clap::Command) -> clap::Command {
        parser.arg(
            Arg::new("example")
                .long("example")
                .action(ArgAction::SetTrue)
                .help("Example flag"),
        )
    }

    fn help() -> Option<String> {
        Some("Example command".to_string())
    }

    fn run(&self, args: &ArgMatches) -> anyhow::Result<()> {
        let args = ExampleArgs::from_args(args)?;
        if args.example {
            tracing::info!("running example with --example");
        } else {
            tracing::info!("running example");
        }
        Ok(())
    }
}

pub fn exports() -> anyhow::Result<ModuleExports> {
    Ok(ModuleExports::new().with_type(
        LoadedType::command::<Command>(COMMAND_TYPE)
            .with_attribute(COMMAND_NAME_ATTRIBUTE, Command::COMMAND_NAME),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parsing() {
        let parser = Command::setup_parser(clap::Command::new(Command::COMMAND_NAME));
        let matches = parser.clone().get_matches_from(["example", "--example"]);
        assert!(ExampleArgs::from_args(&matches).unwrap().example);

        let matches = parser.get_matches_from(["example"]);
        assert!(!ExampleArgs::from_args(&matches).unwrap().example);
    }

    #[test]
    fn test_exports_command() {
        let exports = exports().unwrap();
        let loaded = exports.get(COMMAND_TYPE).unwrap();
        assert_eq!(
            loaded.attribute(COMMAND_NAME_ATTRIBUTE).and_then(|v| v.as_str()),
            Some("example")
        );
        assert!(loaded.hooks().is_some());
    }
}
