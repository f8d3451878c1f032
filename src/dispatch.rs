//! @acp:module "Dispatcher"
//! @acp:summary "Builds the sub-command parser from a registry and runs the selected command"
//! @acp:domain cli
//! @acp:layer handler

use std::ffi::OsString;

use anyhow::{anyhow, Context};
use clap::ArgMatches;

use crate::command::CommandHooks;
use crate::error::{DiscoveryError, Result};
use crate::registry::Registry;

/// @acp:summary "clap front end over a command registry"
pub struct Dispatcher {
    app: clap::Command,
    registry: Registry,
    entries: Vec<(String, CommandHooks)>,
}

impl Dispatcher {
    /// Wrap `registry` under the top-level parser `app`.
    ///
    /// Every entry must be a command type; plain types are rejected. Names
    /// and flags that clash with `app` are rejected as well.
    pub fn new(app: clap::Command, registry: Registry) -> Result<Self> {
        let mut entries = Vec::with_capacity(registry.len());
        for (name, loaded) in registry.iter() {
            let hooks = loaded.hooks().ok_or_else(|| DiscoveryError::TypeMismatch {
                type_name: loaded.type_name().to_string(),
                module: loaded.module().to_string(),
                expected: "BaseCommand".to_string(),
            })?;
            check_conflicts(&app, name, loaded.module(), hooks)?;
            entries.push((name.to_string(), *hooks));
        }

        Ok(Self {
            app,
            registry,
            entries,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The full parser, one sub-command per registry entry in registry order
    pub fn command(&self) -> clap::Command {
        let mut app = self.app.clone().subcommand_required(true);
        for (name, hooks) in &self.entries {
            let parser = clap::Command::new(name.clone()).about(hooks.help(name));
            app = app.subcommand(hooks.setup_parser(parser));
        }
        app
    }

    /// Parse `args` (including the binary name) without exiting
    pub fn try_parse_from<I, T>(&self, args: I) -> std::result::Result<ArgMatches, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.command().try_get_matches_from(args)
    }

    /// Instantiate and run the sub-command selected in `matches`
    pub fn dispatch(&self, matches: &ArgMatches) -> anyhow::Result<()> {
        let (name, sub_matches) = matches
            .subcommand()
            .ok_or_else(|| anyhow!("no command given"))?;
        let hooks = self
            .entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, hooks)| hooks)
            .ok_or_else(|| anyhow!("unknown command '{}'", name))?;

        tracing::debug!("running command '{}'", name);
        hooks
            .instantiate()
            .run(sub_matches)
            .with_context(|| format!("command '{}' failed", name))
    }

    /// Parse `args` and dispatch
    pub fn run_from<I, T>(&self, args: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.try_parse_from(args)?;
        self.dispatch(&matches)
    }
}

/// Reject a sub-command whose name or flags the top-level parser already owns
fn check_conflicts(
    app: &clap::Command,
    name: &str,
    module: &str,
    hooks: &CommandHooks,
) -> Result<()> {
    let conflict = |conflict: String| DiscoveryError::Conflict {
        name: name.to_string(),
        module: module.to_string(),
        conflict,
    };

    if name == "help" && !app.is_disable_help_subcommand_set() {
        return Err(conflict("the built-in 'help' sub-command".to_string()));
    }
    if app.find_subcommand(name).is_some() {
        return Err(conflict(format!("the existing '{}' sub-command", name)));
    }

    let parser = hooks.setup_parser(clap::Command::new(name.to_string()));

    // (id, short, long) of every flag the sub-command inherits
    let mut inherited: Vec<(&str, Option<char>, Option<&str>)> = app
        .get_arguments()
        .filter(|arg| arg.is_global_set())
        .map(|arg| (arg.get_id().as_str(), arg.get_short(), arg.get_long()))
        .collect();
    if !parser.is_disable_help_flag_set() {
        inherited.push(("help", Some('h'), Some("help")));
    }
    if app.is_propagate_version_set() && !app.is_disable_version_flag_set() {
        inherited.push(("version", Some('V'), Some("version")));
    }

    for arg in parser.get_arguments() {
        for (id, short, long) in &inherited {
            if arg.get_id().as_str() == *id {
                continue;
            }
            if let Some(flag) = arg.get_short().filter(|s| Some(*s) == *short) {
                return Err(conflict(format!("the inherited '-{}' flag", flag)));
            }
            if let Some(flag) = arg.get_long().filter(|l| Some(*l) == *long) {
                return Err(conflict(format!("the inherited '--{}' flag", flag)));
            }
        }
    }

    Ok(())
}
