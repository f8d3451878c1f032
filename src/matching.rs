//! @acp:module "Match Spec"
//! @acp:summary "Structural requirements a discovered type must satisfy"
//! @acp:domain cli
//! @acp:layer model
//!
//! A [`MatchSpec`] is built once per discovery run and shared, read-only, by
//! the source scanner (static checks) and the contract validator (runtime
//! checks).

use std::any::TypeId;
use std::fmt;

/// @acp:summary "Literal value of a type-level attribute"
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
}

impl AttrValue {
    /// String payload, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => write!(f, "{:?}", s),
            AttrValue::Int(i) => write!(f, "{}", i),
            AttrValue::Float(x) => write!(f, "{:?}", x),
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Char(c) => write!(f, "{:?}", c),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value.into())
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        AttrValue::Int(value.into())
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<char> for AttrValue {
    fn from(value: char) -> Self {
        AttrValue::Char(value)
    }
}

/// @acp:summary "Identity of a type or capability trait"
///
/// Capabilities are named through their trait objects, e.g.
/// `TypeTag::of::<dyn BaseCommand>()`.
#[derive(Debug, Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name (`dyn a::b::Trait` -> `Trait`)
    pub fn short_name(&self) -> &'static str {
        if self.name.contains('<') {
            return self.name;
        }
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// @acp:summary "Query shared by the scanner and the validator"
#[derive(Debug, Clone)]
pub struct MatchSpec {
    type_name: String,
    attribute: Option<String>,
    value: Option<AttrValue>,
    base: Option<TypeTag>,
}

impl MatchSpec {
    /// Require a top-level type named `type_name`
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attribute: None,
            value: None,
            base: None,
        }
    }

    /// Require the type to carry a type-level attribute
    pub fn with_attribute(mut self, name: impl Into<String>) -> Self {
        self.attribute = Some(name.into());
        self
    }

    /// Require the attribute to equal `value` exactly.
    ///
    /// Only takes effect together with [`MatchSpec::with_attribute`].
    pub fn with_value(mut self, value: impl Into<AttrValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Require the type to implement the capability `T`
    pub fn with_base<T: ?Sized + 'static>(self) -> Self {
        self.with_base_tag(TypeTag::of::<T>())
    }

    pub fn with_base_tag(mut self, tag: TypeTag) -> Self {
        self.base = Some(tag);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Required attribute value; `None` unless an attribute is also required
    pub fn value(&self) -> Option<&AttrValue> {
        self.attribute.as_ref().and(self.value.as_ref())
    }

    pub fn base(&self) -> Option<TypeTag> {
        self.base
    }
}
