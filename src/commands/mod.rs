//! @acp:module "Commands"
//! @acp:summary "Built-in command modules of the cmdscan binary"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Each public submodule defines a `Command` type and is found at startup by
//! scanning this directory. Adding a command means adding its file here and
//! registering its init function in [`module_table`].

mod _base;
pub mod clean;
pub mod example;

use cmdscan::ModuleTable;

/// Init functions of every compiled-in command module, keyed by file stem
pub fn module_table() -> ModuleTable {
    ModuleTable::new()
        .module("clean", clean::exports)
        .module("example", example::exports)
}
