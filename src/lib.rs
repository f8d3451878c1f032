#![forbid(unsafe_code)]

//! @acp:module "cmdscan Library"
//! @acp:summary "Discovery of command modules and sub-command dispatch"
//! @acp:domain cli
//! @acp:layer api
//! @acp:stability stable
//!
//! # cmdscan
//!
//! Finds command modules in a directory, checks each one without loading it,
//! loads the ones that match, and folds them into a name-keyed registry that
//! drives a clap sub-command parser.
//!
//! ## Features
//!
//! - **Static pre-filter**: tree-sitter scan for the target type and attribute
//! - **Pluggable loading**: compiled-in module table or any [`ModuleLoader`]
//! - **Fail-fast validation**: base capability, attribute, exact value
//! - **Ordered registry**: discovery order, duplicate names rejected
//!
//! ## Example
//!
//! ```rust,no_run
//! use cmdscan::{discover_commands, BaseLocation, Dispatcher, ModuleTable};
//!
//! fn main() -> anyhow::Result<()> {
//!     let table = ModuleTable::new();
//!     let registry = discover_commands(BaseLocation::directory("src/commands"), &table)?;
//!
//!     let dispatcher = Dispatcher::new(clap::Command::new("tool"), registry)?;
//!     dispatcher.run_from(std::env::args_os())
//! }
//! ```

pub mod command;
pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod enumerate;
pub mod error;
pub mod fs;
pub mod loader;
pub mod logging;
pub mod matching;
pub mod registry;
pub mod scan;
pub mod validate;

// Re-exports
pub use command::{default_help, BaseCommand, CommandHooks, COMMAND_NAME_ATTRIBUTE, COMMAND_TYPE};
pub use config::Config;
pub use discovery::{discover_commands, Discovery};
pub use dispatch::Dispatcher;
pub use enumerate::{BaseLocation, CandidateFile};
pub use error::{DiscoveryError, Result};
pub use loader::{LoadedType, ModuleExports, ModuleLoader, ModuleTable};
pub use logging::setup_logging;
pub use matching::{AttrValue, MatchSpec, TypeTag};
pub use registry::Registry;
pub use scan::{SourceScanner, SyntaxDescriptor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
