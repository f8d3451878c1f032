//! @acp:module "Errors"
//! @acp:summary "Error taxonomy for command discovery"
//! @acp:domain cli
//! @acp:layer model
//!
//! Only fatal conditions are represented here. Files that fail to parse,
//! files the static pre-filter rejects and modules that turn out not to
//! export the target type are skipped by the pipeline and never surface
//! as errors.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// @acp:summary "Fatal discovery failures"
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A relative package reference was given without an anchor file
    #[error("package reference '{reference}' is relative, an anchor file is required to resolve it")]
    MissingAnchor { reference: String },

    /// The base location does not resolve to a directory
    #[error("command location '{location}' does not resolve to a directory")]
    LocationNotFound { location: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The tree-sitter grammar could not be loaded
    #[error("failed to load source grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    /// The candidate listing pattern could not be compiled
    #[error("invalid candidate pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Loading an accepted candidate failed
    #[error("failed to load module '{module}' ({}): {source:#}", path.display())]
    Load {
        module: String,
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The loaded type does not implement the required base capability
    #[error("type '{type_name}' in module '{module}' does not implement '{expected}'")]
    TypeMismatch {
        type_name: String,
        module: String,
        expected: String,
    },

    /// The loaded type lacks the required attribute
    #[error("type '{type_name}' in module '{module}' does not have attribute '{attribute}'")]
    MissingAttribute {
        type_name: String,
        module: String,
        attribute: String,
    },

    /// The loaded type's attribute value differs from the required value
    #[error(
        "type '{type_name}' in module '{module}' has attribute '{attribute}' = {actual}, expected {expected}"
    )]
    ValueMismatch {
        type_name: String,
        module: String,
        attribute: String,
        expected: String,
        actual: String,
    },

    /// The identifying attribute cannot be used as a registry key
    #[error("type '{type_name}' in module '{module}' must define a non-empty string '{attribute}'")]
    Configuration {
        type_name: String,
        module: String,
        attribute: String,
    },

    /// Two modules resolve to the same registry key
    #[error("duplicate command name '{key}': defined in module '{module}' and already in module '{existing}'")]
    DuplicateKey {
        key: String,
        module: String,
        existing: String,
    },

    /// A command's name or arguments clash with the top-level parser
    #[error("command '{name}' in module '{module}' conflicts with {conflict}")]
    Conflict {
        name: String,
        module: String,
        conflict: String,
    },

    /// Discovery completed without a single qualifying type
    #[error("no modules found in '{location}' with type '{type_name}'")]
    EmptyRegistry { location: String, type_name: String },
}

impl DiscoveryError {
    /// Module the error is attributed to, if any
    pub fn module(&self) -> Option<&str> {
        match self {
            DiscoveryError::Load { module, .. }
            | DiscoveryError::TypeMismatch { module, .. }
            | DiscoveryError::MissingAttribute { module, .. }
            | DiscoveryError::ValueMismatch { module, .. }
            | DiscoveryError::Configuration { module, .. }
            | DiscoveryError::DuplicateKey { module, .. }
            | DiscoveryError::Conflict { module, .. } => Some(module),
            _ => None,
        }
    }
}
