//! @acp:module "Module Loader"
//! @acp:summary "Loads accepted candidates and exposes the types they export"
//! @acp:domain cli
//! @acp:layer service
//!
//! Command modules are compiled into the binary. Loading a candidate means
//! looking its module identifier up in a [`ModuleTable`] and running the
//! module's init function, which builds the module's exports. Any
//! [`ModuleLoader`] can stand in for the table.

use anyhow::{anyhow, Context};
use indexmap::IndexMap;

use crate::command::{BaseCommand, CommandHooks};
use crate::enumerate::CandidateFile;
use crate::matching::{AttrValue, TypeTag};

/// @acp:summary "Runtime handle to a type exported by a module"
#[derive(Debug, Clone)]
pub struct LoadedType {
    type_name: String,
    module: String,
    tag: TypeTag,
    capabilities: Vec<TypeTag>,
    attributes: IndexMap<String, AttrValue>,
    hooks: Option<CommandHooks>,
}

impl LoadedType {
    /// Export `T` under `type_name` with no capabilities
    pub fn new<T: 'static>(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            module: String::new(),
            tag: TypeTag::of::<T>(),
            capabilities: Vec::new(),
            attributes: IndexMap::new(),
            hooks: None,
        }
    }

    /// Export the command type `T` under `type_name`
    pub fn command<T: BaseCommand + Default>(type_name: impl Into<String>) -> Self {
        let mut loaded = Self::new::<T>(type_name).implements::<dyn BaseCommand>();
        loaded.hooks = Some(CommandHooks::of::<T>());
        loaded
    }

    /// Declare that the type implements capability `C`
    pub fn implements<C: ?Sized + 'static>(mut self) -> Self {
        let tag = TypeTag::of::<C>();
        if !self.capabilities.contains(&tag) {
            self.capabilities.push(tag);
        }
        self
    }

    /// Attach a type-level attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub(crate) fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Identifier of the module the type was loaded from
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// The type itself, or one of its declared capabilities, is `base`
    pub fn is_subtype_of(&self, base: TypeTag) -> bool {
        self.tag == base || self.capabilities.contains(&base)
    }

    /// Command hooks, present for types exported with [`LoadedType::command`]
    pub fn hooks(&self) -> Option<&CommandHooks> {
        self.hooks.as_ref()
    }
}

/// @acp:summary "Types exported by one loaded module"
#[derive(Debug, Clone, Default)]
pub struct ModuleExports {
    types: Vec<LoadedType>,
}

impl ModuleExports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, loaded: LoadedType) -> Self {
        self.types.push(loaded);
        self
    }

    pub fn get(&self, type_name: &str) -> Option<&LoadedType> {
        self.types.iter().find(|t| t.type_name == type_name)
    }

    /// Take the exported type named `type_name`
    pub fn into_type(self, type_name: &str) -> Option<LoadedType> {
        self.types.into_iter().find(|t| t.type_name == type_name)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// @acp:summary "Loads a candidate module"
pub trait ModuleLoader {
    /// Load the module behind `candidate`. Errors are fatal for discovery.
    fn load(&self, candidate: &CandidateFile) -> anyhow::Result<ModuleExports>;
}

impl<F> ModuleLoader for F
where
    F: Fn(&CandidateFile) -> anyhow::Result<ModuleExports>,
{
    fn load(&self, candidate: &CandidateFile) -> anyhow::Result<ModuleExports> {
        self(candidate)
    }
}

/// Init function of a compiled-in module
pub type ModuleInit = fn() -> anyhow::Result<ModuleExports>;

/// @acp:summary "Compiled-in registration table of command modules"
#[derive(Debug, Clone, Default)]
pub struct ModuleTable {
    modules: IndexMap<&'static str, ModuleInit>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the module `name` (its file stem) with its init function
    pub fn module(mut self, name: &'static str, init: ModuleInit) -> Self {
        self.modules.insert(name, init);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.keys().copied()
    }
}

impl ModuleLoader for ModuleTable {
    fn load(&self, candidate: &CandidateFile) -> anyhow::Result<ModuleExports> {
        let init = self
            .modules
            .get(candidate.module.as_str())
            .ok_or_else(|| anyhow!("module '{}' is not compiled into this binary", candidate.module))?;
        init().with_context(|| format!("initializing module '{}'", candidate.module))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    trait Greeter {}

    struct Plain;

    #[derive(Default)]
    struct Hello;

    impl BaseCommand for Hello {
        fn setup_parser(parser: clap::Command) -> clap::Command {
            parser
        }

        fn run(&self, _args: &clap::ArgMatches) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn candidate(module: &str) -> CandidateFile {
        CandidateFile {
            path: PathBuf::from(format!("commands/{}.rs", module)),
            module: module.to_string(),
        }
    }

    fn hello_exports() -> anyhow::Result<ModuleExports> {
        Ok(ModuleExports::new().with_type(
            LoadedType::command::<Hello>("Command").with_attribute("COMMAND_NAME", "hello"),
        ))
    }

    fn broken_exports() -> anyhow::Result<ModuleExports> {
        anyhow::bail!("config file missing")
    }

    #[test]
    fn test_loaded_type_capabilities() {
        let plain = LoadedType::new::<Plain>("Command").implements::<dyn Greeter>();
        assert!(plain.is_subtype_of(TypeTag::of::<dyn Greeter>()));
        assert!(plain.is_subtype_of(TypeTag::of::<Plain>()));
        assert!(!plain.is_subtype_of(TypeTag::of::<dyn BaseCommand>()));
        assert!(plain.hooks().is_none());

        let hello = LoadedType::command::<Hello>("Command");
        assert!(hello.is_subtype_of(TypeTag::of::<dyn BaseCommand>()));
        assert!(hello.hooks().is_some());
    }

    #[test]
    fn test_module_table_loads_registered_module() {
        let table = ModuleTable::new().module("hello", hello_exports);
        let exports = table.load(&candidate("hello")).unwrap();
        let loaded = exports.get("Command").unwrap();
        assert_eq!(loaded.attribute("COMMAND_NAME"), Some(&AttrValue::from("hello")));
        assert!(exports.get("Other").is_none());
    }

    #[test]
    fn test_module_table_unknown_module_fails() {
        let table = ModuleTable::new().module("hello", hello_exports);
        let err = table.load(&candidate("missing")).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_module_table_init_failure_keeps_cause() {
        let table = ModuleTable::new().module("broken", broken_exports);
        let err = table.load(&candidate("broken")).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("broken"));
        assert!(message.contains("config file missing"));
    }

    #[test]
    fn test_closure_loader() {
        let loader = |c: &CandidateFile| -> anyhow::Result<ModuleExports> {
            Ok(ModuleExports::new().with_type(LoadedType::new::<Plain>(c.module.clone())))
        };
        let exports = loader.load(&candidate("dyn")).unwrap();
        assert!(exports.into_type("dyn").is_some());
    }

    #[test]
    fn test_table_names_in_registration_order() {
        let table = ModuleTable::new()
            .module("zeta", hello_exports)
            .module("alpha", hello_exports);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert!(table.contains("alpha"));
    }
}
