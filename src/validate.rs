//! @acp:module "Contract Validator"
//! @acp:summary "Runtime re-check of a loaded type against the match spec"
//! @acp:domain cli
//! @acp:layer service
//!
//! The scanner only sees syntax. After loading, the live type is checked
//! again: base capability first, then attribute presence, then attribute
//! value. The first violation is reported.

use crate::error::{DiscoveryError, Result};
use crate::loader::LoadedType;
use crate::matching::MatchSpec;

/// Verify `loaded` against `spec`, fail-fast
pub fn validate(loaded: &LoadedType, spec: &MatchSpec) -> Result<()> {
    if let Some(base) = spec.base() {
        if !loaded.is_subtype_of(base) {
            return Err(DiscoveryError::TypeMismatch {
                type_name: loaded.type_name().to_string(),
                module: loaded.module().to_string(),
                expected: base.short_name().to_string(),
            });
        }
    }

    let Some(attribute) = spec.attribute() else {
        return Ok(());
    };

    let actual = loaded
        .attribute(attribute)
        .ok_or_else(|| DiscoveryError::MissingAttribute {
            type_name: loaded.type_name().to_string(),
            module: loaded.module().to_string(),
            attribute: attribute.to_string(),
        })?;

    if let Some(expected) = spec.value() {
        if actual != expected {
            return Err(DiscoveryError::ValueMismatch {
                type_name: loaded.type_name().to_string(),
                module: loaded.module().to_string(),
                attribute: attribute.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
    }

    Ok(())
}
