//! @acp:module "Discovery"
//! @acp:summary "Entry point: enumerate, pre-filter, load, validate, register"
//! @acp:domain cli
//! @acp:layer service
//!
//! Discovery runs once per process, sequentially, before any command
//! executes. The first fatal error aborts the run; nothing discovered up to
//! that point is returned.

use std::path::PathBuf;

use crate::command::{command_match_spec, COMMAND_NAME_ATTRIBUTE};
use crate::enumerate::{default_name_filter, enumerate_candidates, BaseLocation, NameFilter};
use crate::error::{DiscoveryError, Result};
use crate::loader::{LoadedType, ModuleLoader};
use crate::matching::MatchSpec;
use crate::registry::{Registry, RegistryBuilder};
use crate::scan::SourceScanner;
use crate::validate::validate;

/// Default extension of command module sources
pub const DEFAULT_EXTENSION: &str = "rs";

/// @acp:summary "Configured discovery run"
pub struct Discovery {
    location: BaseLocation,
    spec: MatchSpec,
    extension: String,
    name_filter: NameFilter,
    search_roots: Vec<PathBuf>,
    safe: bool,
}

impl Discovery {
    pub fn new(location: BaseLocation, spec: MatchSpec) -> Self {
        Self {
            location,
            spec,
            extension: DEFAULT_EXTENSION.to_string(),
            name_filter: Box::new(default_name_filter),
            search_roots: Vec::new(),
            safe: true,
        }
    }

    /// Discovery of [`BaseCommand`](crate::command::BaseCommand) modules
    pub fn commands(location: BaseLocation) -> Self {
        Self::new(location, command_match_spec())
    }

    /// Replace the module stem filter
    pub fn name_filter(mut self, filter: impl Fn(&str) -> bool + 'static) -> Self {
        self.name_filter = Box::new(filter);
        self
    }

    pub fn boxed_name_filter(mut self, filter: NameFilter) -> Self {
        self.name_filter = filter;
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Roots absolute package references are resolved against
    pub fn search_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.search_roots = roots;
        self
    }

    /// `false` skips the static pre-filter and loads every candidate
    pub fn safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    pub fn spec(&self) -> &MatchSpec {
        &self.spec
    }

    pub fn location(&self) -> &BaseLocation {
        &self.location
    }

    /// Run discovery and return the validated types in discovery order
    pub fn run<L>(&self, loader: &L) -> Result<Vec<LoadedType>>
    where
        L: ModuleLoader + ?Sized,
    {
        let dir = self.location.resolve(&self.search_roots)?;
        let candidates = enumerate_candidates(&dir, &self.extension, &*self.name_filter)?;
        tracing::debug!(
            "{} candidate(s) in {} for type '{}'",
            candidates.len(),
            dir.display(),
            self.spec.type_name()
        );

        let mut scanner = if self.safe {
            Some(SourceScanner::new()?)
        } else {
            None
        };

        let mut found = Vec::new();
        for candidate in candidates {
            if let Some(scanner) = scanner.as_mut() {
                if !scanner.scan_file(&candidate.path, &self.spec) {
                    tracing::debug!("skipping '{}': no static match", candidate.module);
                    continue;
                }
            }

            let exports = loader.load(&candidate).map_err(|source| DiscoveryError::Load {
                module: candidate.module.clone(),
                path: candidate.path.clone(),
                source,
            })?;

            let Some(loaded) = exports.into_type(self.spec.type_name()) else {
                tracing::debug!(
                    "skipping '{}': module does not export '{}'",
                    candidate.module,
                    self.spec.type_name()
                );
                continue;
            };

            let loaded = loaded.in_module(candidate.module.as_str());
            validate(&loaded, &self.spec)?;
            found.push(loaded);
        }

        if found.is_empty() {
            return Err(DiscoveryError::EmptyRegistry {
                location: self.location.to_string(),
                type_name: self.spec.type_name().to_string(),
            });
        }

        Ok(found)
    }

    /// Run discovery and key the result by `key_attribute`
    pub fn registry<L>(&self, loader: &L, key_attribute: &str) -> Result<Registry>
    where
        L: ModuleLoader + ?Sized,
    {
        let mut builder = RegistryBuilder::new(key_attribute)
            .origin(self.location.to_string(), self.spec.type_name());
        for loaded in self.run(loader)? {
            builder.insert(loaded)?;
        }
        builder.finish()
    }
}

/// Discover command modules at `location` and build the command registry
pub fn discover_commands<L>(location: BaseLocation, loader: &L) -> Result<Registry>
where
    L: ModuleLoader + ?Sized,
{
    Discovery::commands(location).registry(loader, COMMAND_NAME_ATTRIBUTE)
}
