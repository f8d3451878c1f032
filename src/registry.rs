//! @acp:module "Registry"
//! @acp:summary "Name-keyed, discovery-ordered collection of command types"
//! @acp:domain cli
//! @acp:layer model

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::error::{DiscoveryError, Result};
use crate::loader::LoadedType;

/// @acp:summary "Validated command types keyed by their identifying name"
///
/// Keys are unique and non-empty; iteration follows insertion order.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: IndexMap<String, LoadedType>,
    key_attribute: String,
}

impl Registry {
    /// Fold `types` into a registry keyed by `key_attribute`
    pub fn build(
        types: impl IntoIterator<Item = LoadedType>,
        key_attribute: &str,
    ) -> Result<Self> {
        let mut builder = RegistryBuilder::new(key_attribute);
        for loaded in types {
            builder.insert(loaded)?;
        }
        builder.finish()
    }

    pub fn get(&self, name: &str) -> Option<&LoadedType> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LoadedType)> {
        self.entries.iter().map(|(name, loaded)| (name.as_str(), loaded))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attribute the keys were read from
    pub fn key_attribute(&self) -> &str {
        &self.key_attribute
    }
}

/// @acp:summary "Incremental registry construction"
#[derive(Debug)]
pub struct RegistryBuilder {
    entries: IndexMap<String, LoadedType>,
    key_attribute: String,
    location: String,
    type_name: String,
}

impl RegistryBuilder {
    pub fn new(key_attribute: impl Into<String>) -> Self {
        Self {
            entries: IndexMap::new(),
            key_attribute: key_attribute.into(),
            location: "<input>".to_string(),
            type_name: "<any>".to_string(),
        }
    }

    /// Where the types come from, reported if none arrive
    pub fn origin(mut self, location: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.location = location.into();
        self.type_name = type_name.into();
        self
    }

    /// Append `loaded` under the value of its key attribute
    pub fn insert(&mut self, loaded: LoadedType) -> Result<()> {
        let key = loaded
            .attribute(&self.key_attribute)
            .and_then(|value| value.as_str())
            .filter(|key| !key.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| DiscoveryError::Configuration {
                type_name: loaded.type_name().to_string(),
                module: loaded.module().to_string(),
                attribute: self.key_attribute.clone(),
            })?;

        match self.entries.entry(key) {
            Entry::Occupied(existing) => Err(DiscoveryError::DuplicateKey {
                key: existing.key().clone(),
                module: loaded.module().to_string(),
                existing: existing.get().module().to_string(),
            }),
            Entry::Vacant(slot) => {
                tracing::debug!("registered '{}' from module '{}'", slot.key(), loaded.module());
                slot.insert(loaded);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finish construction; an empty registry is an error
    pub fn finish(self) -> Result<Registry> {
        if self.entries.is_empty() {
            return Err(DiscoveryError::EmptyRegistry {
                location: self.location,
                type_name: self.type_name,
            });
        }
        Ok(Registry {
            entries: self.entries,
            key_attribute: self.key_attribute,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Marker;

    fn named(module: &str, name: &str) -> LoadedType {
        LoadedType::new::<Marker>("Command")
            .with_attribute("COMMAND_NAME", name)
            .in_module(module)
    }

    #[test]
    fn test_build_preserves_order() {
        let registry = Registry::build(
            vec![named("zeta", "zeta"), named("alpha", "alpha"), named("mid", "mid")],
            "COMMAND_NAME",
        )
        .unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.key_attribute(), "COMMAND_NAME");
    }

    #[test]
    fn test_lookup_round_trip() {
        let registry =
            Registry::build(vec![named("a", "build"), named("b", "run")], "COMMAND_NAME").unwrap();
        for name in registry.names() {
            let loaded = registry.get(name).unwrap();
            assert_eq!(loaded.attribute("COMMAND_NAME").and_then(|v| v.as_str()), Some(name));
        }
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_key_names_both_modules() {
        let err = Registry::build(vec![named("a", "build"), named("b", "build")], "COMMAND_NAME")
            .unwrap_err();
        match err {
            DiscoveryError::DuplicateKey { key, module, existing } => {
                assert_eq!(key, "build");
                assert_eq!(module, "b");
                assert_eq!(existing, "a");
            }
            other => panic!("expected DuplicateKey, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_or_missing_key_is_configuration_error() {
        let mut builder = RegistryBuilder::new("COMMAND_NAME");
        assert!(matches!(
            builder.insert(named("blank", "  ")),
            Err(DiscoveryError::Configuration { ref module, .. }) if module == "blank"
        ));

        let unnamed = LoadedType::new::<Marker>("Command").in_module("unnamed");
        assert!(matches!(
            builder.insert(unnamed),
            Err(DiscoveryError::Configuration { .. })
        ));

        let numeric = LoadedType::new::<Marker>("Command")
            .with_attribute("COMMAND_NAME", 7)
            .in_module("numeric");
        assert!(matches!(
            builder.insert(numeric),
            Err(DiscoveryError::Configuration { .. })
        ));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_empty_registry_is_error() {
        assert!(matches!(
            Registry::build(Vec::<LoadedType>::new(), "COMMAND_NAME"),
            Err(DiscoveryError::EmptyRegistry { .. })
        ));

        let err = RegistryBuilder::new("COMMAND_NAME")
            .origin("src/commands", "Command")
            .finish()
            .unwrap_err();
        assert!(err.to_string().contains("src/commands"));
    }

    #[test]
    fn test_keys_are_kept_verbatim() {
        let registry = Registry::build(vec![named("padded", " run")], "COMMAND_NAME").unwrap();
        assert!(registry.contains(" run"));
        assert!(!registry.contains("run"));
    }
}
