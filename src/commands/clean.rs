//! @acp:module "Clean Command"
//! @acp:summary "Removes files or folders"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches};
use console::style;

use cmdscan::fs::remove_path;
use cmdscan::{BaseCommand, LoadedType, ModuleExports, COMMAND_NAME_ATTRIBUTE, COMMAND_TYPE};

use super::_base::FromArgs;

#[derive(Debug, Default)]
pub struct Command;

impl Command {
    pub const COMMAND_NAME: &'static str = "clean";
}

#[derive(Debug)]
struct CleanArgs {
    paths: Vec<PathBuf>,
    dry_run: bool,
}

impl FromArgs for CleanArgs {
    fn from_args(args: &ArgMatches) -> anyhow::Result<Self> {
        let paths = args
            .get_many::<PathBuf>("paths")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        Ok(Self {
            paths,
            dry_run: args.get_flag("dry-run"),
        })
    }
}

impl BaseCommand for Command {
    fn setup_parser(parser: clap::Command) -> clap::Command {
        parser
            .arg(
                Arg::new("paths")
                    .value_name("PATH")
                    .num_args(1..)
                    .required(true)
                    .value_parser(clap::value_parser!(PathBuf))
                    .help("Files or folders to remove"),
            )
            .arg(
                Arg::new("dry-run")
                    .long("dry-run")
                    .action(ArgAction::SetTrue)
                    .help("Show what would be removed"),
            )
    }

    fn help() -> Option<String> {
        Some("Remove files or folders".to_string())
    }

    fn run(&self, args: &ArgMatches) -> anyhow::Result<()> {
        let args = CleanArgs::from_args(args)?;
        for path in &args.paths {
            if std::fs::symlink_metadata(path).is_err() {
                tracing::debug!("{} does not exist", path.display());
                continue;
            }
            if args.dry_run {
                println!("{} would remove {}", style("→").cyan(), path.display());
                continue;
            }
            remove_path(path).with_context(|| format!("failed to remove {}", path.display()))?;
            tracing::info!("removed {}", path.display());
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
    use tempfile::TempDir;

    fn matches(args: &[&str]) -> ArgMatches {
        Command::setup_parser(clap::Command::new(Command::COMMAND_NAME))
            .try_get_matches_from(args)
            .unwrap()
    }

    #[test]
    fn test_removes_files_and_folders() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        let dir = temp.path().join("target");
        std::fs::write(&file, "a").unwrap();
        std::fs::create_dir_all(dir.join("debug")).unwrap();

        let file_arg = file.to_string_lossy().to_string();
        let dir_arg = dir.to_string_lossy().to_string();
        Command.run(&matches(&["clean", &file_arg, &dir_arg])).unwrap();

        assert!(!file.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn test_dry_run_keeps_paths() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("keep.txt");
        std::fs::write(&file, "k").unwrap();

        let file_arg = file.to_string_lossy().to_string();
        Command.run(&matches(&["clean", "--dry-run", &file_arg])).unwrap();
        assert!(file.exists());
    }

    #[test]
    fn test_missing_path_is_skipped() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("gone").to_string_lossy().to_string();
        Command.run(&matches(&["clean", &missing])).unwrap();
    }

    #[test]
    fn test_requires_a_path() {
        let result = Command::setup_parser(clap::Command::new(Command::COMMAND_NAME))
            .try_get_matches_from(["clean"]);
        assert!(result.is_err());
    }
}
