//! Dispatcher integration tests
//!
//! Builds sub-command parsers from registries and runs the selected command.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::bail;
use clap::{Arg, ArgMatches};
use pretty_assertions::assert_eq;

use cmdscan::{
    BaseCommand, DiscoveryError, Dispatcher, LoadedType, Registry, COMMAND_NAME_ATTRIBUTE,
    COMMAND_TYPE,
};

static GREETINGS: AtomicUsize = AtomicUsize::new(0);
static BUILDS: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct Greet;

impl BaseCommand for Greet {
    fn setup_parser(parser: clap::Command) -> clap::Command {
        parser.arg(Arg::new("name").required(true))
    }

    fn help() -> Option<String> {
        Some("Say hello".to_string())
    }

    fn run(&self, args: &ArgMatches) -> anyhow::Result<()> {
        let name = args.get_one::<String>("name").map(String::as_str);
        if name == Some("nobody") {
            bail!("nobody to greet");
        }
        GREETINGS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct Build;

impl BaseCommand for Build {
    fn setup_parser(parser: clap::Command) -> clap::Command {
        parser
    }

    fn run(&self, _args: &ArgMatches) -> anyhow::Result<()> {
        BUILDS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Plain;

#[derive(Default)]
struct Loud;

impl BaseCommand for Loud {
    fn setup_parser(parser: clap::Command) -> clap::Command {
        parser.arg(
            Arg::new("volume")
                .short('v')
                .long("volume")
                .action(clap::ArgAction::SetTrue),
        )
    }

    fn run(&self, _args: &ArgMatches) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct Host;

impl BaseCommand for Host {
    fn setup_parser(parser: clap::Command) -> clap::Command {
        parser.arg(Arg::new("host").short('h'))
    }

    fn run(&self, _args: &ArgMatches) -> anyhow::Result<()> {
        Ok(())
    }
}

fn command<T: BaseCommand + Default>(name: &str) -> LoadedType {
    LoadedType::command::<T>(COMMAND_TYPE).with_attribute(COMMAND_NAME_ATTRIBUTE, name)
}

fn dispatcher() -> Dispatcher {
    let registry = Registry::build(
        vec![command::<Greet>("greet"), command::<Build>("build")],
        COMMAND_NAME_ATTRIBUTE,
    )
    .unwrap();
    Dispatcher::new(clap::Command::new("tool"), registry).unwrap()
}

// =============================================================================
// Parser construction
// =============================================================================

mod parser_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_subcommands_follow_registry_order() {
        let app = dispatcher().command();
        let names: Vec<&str> = app.get_subcommands().map(|c| c.get_name()).collect();
        assert_eq!(names, vec!["greet", "build"]);
    }

    #[test]
    fn test_help_text() {
        let app = dispatcher().command();
        let about = |name: &str| {
            app.find_subcommand(name)
                .and_then(|c| c.get_about())
                .map(|s| s.to_string())
        };
        assert_eq!(about("greet").as_deref(), Some("Say hello"));
        assert_eq!(about("build").as_deref(), Some("build command"));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(dispatcher().try_parse_from(["tool"]).is_err());
    }

    #[test]
    fn test_command_arguments_are_configured() {
        let dispatcher = dispatcher();
        assert!(dispatcher.try_parse_from(["tool", "greet"]).is_err());
        assert!(dispatcher.try_parse_from(["tool", "greet", "world"]).is_ok());
        assert!(dispatcher.run_from(["tool", "deploy"]).is_err());
    }

    #[test]
    fn test_plain_type_is_rejected() {
        let registry = Registry::build(
            vec![LoadedType::new::<Plain>(COMMAND_TYPE).with_attribute(COMMAND_NAME_ATTRIBUTE, "plain")],
            COMMAND_NAME_ATTRIBUTE,
        )
        .unwrap();
        let err = Dispatcher::new(clap::Command::new("tool"), registry)
            .err()
            .unwrap();
        assert!(matches!(err, DiscoveryError::TypeMismatch { .. }));
    }
}

// =============================================================================
// Conflicts with the top-level parser
// =============================================================================

mod conflict_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn single(loaded: LoadedType) -> Registry {
        Registry::build(vec![loaded], COMMAND_NAME_ATTRIBUTE).unwrap()
    }

    #[test]
    fn test_help_name_is_rejected() {
        let err = Dispatcher::new(clap::Command::new("tool"), single(command::<Build>("help")))
            .err()
            .unwrap();
        match err {
            DiscoveryError::Conflict { name, conflict, .. } => {
                assert_eq!(name, "help");
                assert!(conflict.contains("'help' sub-command"));
            }
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_help_name_allowed_without_help_subcommand() {
        let app = clap::Command::new("tool").disable_help_subcommand(true);
        let dispatcher = Dispatcher::new(app, single(command::<Build>("help"))).unwrap();
        assert!(dispatcher.try_parse_from(["tool", "help"]).is_ok());
    }

    #[test]
    fn test_global_flag_reuse_is_rejected() {
        let app = clap::Command::new("tool").arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        );
        let err = Dispatcher::new(app, single(command::<Loud>("loud")))
            .err()
            .unwrap();
        assert!(matches!(err, DiscoveryError::Conflict { ref name, .. } if name == "loud"));
        assert!(err.to_string().contains("'-v'"));
    }

    #[test]
    fn test_help_flag_reuse_is_rejected() {
        let err = Dispatcher::new(clap::Command::new("tool"), single(command::<Host>("connect")))
            .err()
            .unwrap();
        assert!(err.to_string().contains("'-h'"));
    }

    #[test]
    fn test_non_global_flags_do_not_conflict() {
        let app = clap::Command::new("tool").arg(
            Arg::new("verbose")
                .short('v')
                .action(clap::ArgAction::SetTrue),
        );
        let dispatcher = Dispatcher::new(app, single(command::<Loud>("loud"))).unwrap();
        assert!(dispatcher.try_parse_from(["tool", "loud", "-v"]).is_ok());
    }
}

// =============================================================================
// Dispatch
// =============================================================================

mod dispatch_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_runs_only_the_selected_command() {
        // BUILDS is only touched here
        let dispatcher = dispatcher();
        dispatcher.run_from(["tool", "build"]).unwrap();
        dispatcher.run_from(["tool", "greet", "world"]).unwrap();
        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_parsed_matches() {
        let dispatcher = dispatcher();
        let before = GREETINGS.load(Ordering::SeqCst);
        let matches = dispatcher.try_parse_from(["tool", "greet", "world"]).unwrap();
        dispatcher.dispatch(&matches).unwrap();
        assert!(GREETINGS.load(Ordering::SeqCst) > before);
    }

    #[test]
    fn test_command_failure_names_command() {
        let err = dispatcher()
            .run_from(["tool", "greet", "nobody"])
            .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("command 'greet' failed"));
        assert!(message.contains("nobody to greet"));
    }

    #[test]
    fn test_registry_is_kept() {
        let dispatcher = dispatcher();
        assert_eq!(dispatcher.registry().len(), 2);
        assert!(dispatcher.registry().contains("greet"));
    }
}
