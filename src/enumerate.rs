//! @acp:module "Candidate Enumerator"
//! @acp:summary "Resolves the command location and lists candidate module files"
//! @acp:domain cli
//! @acp:layer io
//!
//! Candidates come back in alphabetical file-name order, which is the order
//! the `glob` crate yields directory entries in. Registry order and help
//! output follow from it, so it must not depend on the filesystem.

use std::fmt;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::{DiscoveryError, Result};

/// Predicate over module stems; `true` keeps the candidate
pub type NameFilter = Box<dyn Fn(&str) -> bool>;

/// Default name filter: excludes private modules (`_base`, `_util`, ...)
pub fn default_name_filter(stem: &str) -> bool {
    !stem.starts_with('_')
}

/// Name filter rejecting every stem matched by one of the glob `patterns`.
///
/// Invalid patterns are reported, not ignored.
pub fn exclude_filter(patterns: &[String]) -> Result<NameFilter> {
    let compiled = patterns
        .iter()
        .map(|p| Pattern::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    Ok(Box::new(move |stem: &str| {
        !compiled.iter().any(|p| p.matches_with(stem, options))
    }))
}

/// @acp:summary "Where command modules live"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseLocation {
    /// A directory on disk
    Directory(PathBuf),
    /// A dotted package reference (`.commands`, `app.commands`)
    Package {
        reference: String,
        /// File that relative references are resolved against
        anchor: Option<PathBuf>,
    },
}

impl BaseLocation {
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        BaseLocation::Directory(path.into())
    }

    pub fn package(reference: impl Into<String>, anchor: impl Into<PathBuf>) -> Self {
        BaseLocation::Package {
            reference: reference.into(),
            anchor: Some(anchor.into()),
        }
    }

    /// Interpret a configured location: anything starting with `.` followed by
    /// a name, or containing no path separator but a dot, is a package
    /// reference; everything else is a directory.
    pub fn parse(value: &str, anchor: Option<&Path>) -> Self {
        let looks_like_path = value.contains('/') || value.contains('\\') || value == "." || value == "..";
        if !looks_like_path && (value.starts_with('.') || value.contains('.')) {
            BaseLocation::Package {
                reference: value.to_string(),
                anchor: anchor.map(Path::to_path_buf),
            }
        } else {
            BaseLocation::Directory(PathBuf::from(value))
        }
    }

    /// Resolve to an existing directory.
    ///
    /// Relative package references walk from the anchor file: an empty
    /// segment steps to the parent, a named segment descends. Absolute
    /// references are tried against each search root in order.
    pub fn resolve(&self, search_roots: &[PathBuf]) -> Result<PathBuf> {
        let resolved = match self {
            BaseLocation::Directory(path) => Some(path.clone()),
            BaseLocation::Package { reference, anchor } if reference.starts_with('.') => {
                let anchor = anchor.as_ref().ok_or_else(|| DiscoveryError::MissingAnchor {
                    reference: reference.clone(),
                })?;
                let mut path = anchor.clone();
                for part in reference.split('.') {
                    if part.is_empty() {
                        path = path.parent().map(Path::to_path_buf).unwrap_or_default();
                    } else {
                        path.push(part);
                    }
                }
                Some(path)
            }
            BaseLocation::Package { reference, .. } => {
                let relative: PathBuf = reference.split('.').collect();
                let default_root = [PathBuf::from(".")];
                let roots = if search_roots.is_empty() {
                    &default_root[..]
                } else {
                    search_roots
                };
                roots
                    .iter()
                    .map(|root| root.join(&relative))
                    .find(|candidate| candidate.is_dir())
            }
        };

        match resolved {
            Some(path) if path.is_dir() => Ok(path),
            _ => Err(DiscoveryError::LocationNotFound {
                location: self.to_string(),
            }),
        }
    }
}

impl fmt::Display for BaseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseLocation::Directory(path) => write!(f, "{}", path.display()),
            BaseLocation::Package { reference, .. } => f.write_str(reference),
        }
    }
}

/// @acp:summary "A source file that may define a command"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    /// Module identifier, the file stem
    pub module: String,
}

impl CandidateFile {
    /// Build a candidate from a path; `None` if the path has no UTF-8 stem
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let module = path.file_stem()?.to_str()?.to_string();
        Some(Self { path, module })
    }
}

/// List files in `dir` with `extension` whose stem passes `filter`
pub fn enumerate_candidates(
    dir: &Path,
    extension: &str,
    filter: &dyn Fn(&str) -> bool,
) -> Result<Vec<CandidateFile>> {
    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(extension)
    );

    let mut candidates = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry.map_err(std::io::Error::from)?;
        if !path.is_file() {
            continue;
        }
        let Some(candidate) = CandidateFile::from_path(path) else {
            continue;
        };
        if !filter(&candidate.module) {
            tracing::debug!("module '{}' rejected by name filter", candidate.module);
            continue;
        }
        candidates.push(candidate);
    }

    Ok(candidates)
}
