//! @acp:module "Source Scanner"
//! @acp:summary "Static pre-filter deciding whether a command module is worth loading"
//! @acp:domain cli
//! @acp:layer service
//!
//! Parses Rust sources with tree-sitter and summarizes their top-level type
//! definitions together with the associated constants declared for them in
//! top-level `impl` blocks. The summary answers the question "does this file
//! plausibly define the type we are looking for" without compiling or loading
//! anything. A file that does not parse cleanly is never plausible.

use std::path::Path;

use tree_sitter::{Node, Parser};

use crate::error::Result;
use crate::matching::{AttrValue, MatchSpec};

/// Node kinds that define a named type at top level
const TYPE_DEFINITION_KINDS: &[&str] = &["struct_item", "enum_item", "union_item", "type_item"];

/// @acp:summary "Right-hand side of a type-level field assignment"
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A literal that can be compared without evaluation
    Literal(AttrValue),
    /// Present, but computed (paths, macros, arithmetic, ...)
    Opaque,
}

/// @acp:summary "A type-level field assignment (associated const)"
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAssignment {
    pub name: String,
    pub value: FieldValue,
}

/// @acp:summary "A top-level type definition and its type-level fields"
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub name: String,
    /// tree-sitter node kind of the definition (`struct_item`, `enum_item`, ...)
    pub kind: String,
    pub fields: Vec<FieldAssignment>,
}

impl TypeDescriptor {
    /// All assignments to `name`, in source order
    pub fn fields_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FieldAssignment> {
        self.fields.iter().filter(move |f| f.name == name)
    }
}

/// @acp:summary "Structural summary of one source file"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyntaxDescriptor {
    types: Vec<TypeDescriptor>,
}

impl SyntaxDescriptor {
    /// Top-level type definitions in source order
    pub fn types(&self) -> &[TypeDescriptor] {
        &self.types
    }

    /// First top-level definition named `name`
    pub fn find(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Static plausibility verdict for `spec`
    pub fn matches(&self, spec: &MatchSpec) -> bool {
        let Some(ty) = self.find(spec.type_name()) else {
            return false;
        };
        let Some(attribute) = spec.attribute() else {
            return true;
        };
        let mut assignments = ty.fields_named(attribute);
        match spec.value() {
            None => assignments.next().is_some(),
            Some(expected) => {
                assignments.any(|f| matches!(&f.value, FieldValue::Literal(v) if v == expected))
            }
        }
    }
}

/// @acp:summary "tree-sitter backed scanner for Rust sources"
pub struct SourceScanner {
    parser: Parser,
}

impl SourceScanner {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_rust::LANGUAGE.into())?;
        Ok(Self { parser })
    }

    /// Summarize `source`, or `None` if it does not parse cleanly
    pub fn describe(&mut self, source: &str) -> Option<SyntaxDescriptor> {
        let tree = self.parser.parse(source, None)?;
        let root = tree.root_node();
        if root.has_error() {
            return None;
        }

        let mut descriptor = SyntaxDescriptor::default();
        let mut cursor = root.walk();

        for node in root.named_children(&mut cursor) {
            if TYPE_DEFINITION_KINDS.contains(&node.kind()) {
                if let Some(name) = node.child_by_field_name("name") {
                    descriptor.types.push(TypeDescriptor {
                        name: text(name, source).to_string(),
                        kind: node.kind().to_string(),
                        fields: Vec::new(),
                    });
                }
            }
        }

        // Associated consts may live in impls placed anywhere at top level,
        // before or after the definition.
        for node in root.named_children(&mut cursor) {
            if node.kind() != "impl_item" {
                continue;
            }
            let Some(self_type) = node.child_by_field_name("type").and_then(|t| type_name(t, source))
            else {
                continue;
            };
            let Some(ty) = descriptor.types.iter_mut().find(|t| t.name == self_type) else {
                continue;
            };
            let Some(body) = node.child_by_field_name("body") else {
                continue;
            };
            let mut body_cursor = body.walk();
            for item in body.named_children(&mut body_cursor) {
                if item.kind() != "const_item" {
                    continue;
                }
                let Some(name) = item.child_by_field_name("name") else {
                    continue;
                };
                let value = item
                    .child_by_field_name("value")
                    .and_then(|v| literal_value(v, source))
                    .map(FieldValue::Literal)
                    .unwrap_or(FieldValue::Opaque);
                ty.fields.push(FieldAssignment {
                    name: text(name, source).to_string(),
                    value,
                });
            }
        }

        Some(descriptor)
    }

    /// Static plausibility check for a source text; never fails
    pub fn is_plausible(&mut self, source: &str, spec: &MatchSpec) -> bool {
        match self.describe(source) {
            Some(descriptor) => descriptor.matches(spec),
            None => {
                tracing::trace!("source does not parse cleanly, skipping");
                false
            }
        }
    }

    /// Read and check a file; unreadable files are not plausible
    pub fn scan_file(&mut self, path: &Path, spec: &MatchSpec) -> bool {
        match std::fs::read_to_string(path) {
            Ok(source) => self.is_plausible(&source, spec),
            Err(err) => {
                tracing::debug!("cannot read {}: {}", path.display(), err);
                false
            }
        }
    }
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

/// Name of the self type of an impl block (`Command`, `Command<T>`, `self::Command`)
fn type_name(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "type_identifier" => Some(text(node, source).to_string()),
        "generic_type" => node
            .child_by_field_name("type")
            .and_then(|inner| type_name(inner, source)),
        "scoped_type_identifier" => node
            .child_by_field_name("name")
            .map(|name| text(name, source).to_string()),
        _ => None,
    }
}

/// Evaluate a literal expression node; anything else is `None`
fn literal_value(node: Node<'_>, source: &str) -> Option<AttrValue> {
    let raw = text(node, source);
    match node.kind() {
        "string_literal" => {
            let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
            unescape(inner).map(AttrValue::Str)
        }
        "raw_string_literal" => {
            if !raw.starts_with('r') {
                return None;
            }
            let mut cursor = node.walk();
            let content = node
                .named_children(&mut cursor)
                .find(|c| c.kind() == "string_content")
                .map(|c| text(c, source))
                .unwrap_or("");
            Some(AttrValue::Str(content.to_string()))
        }
        "char_literal" => {
            let inner = raw.strip_prefix('\'')?.strip_suffix('\'')?;
            let decoded = unescape(inner)?;
            let mut chars = decoded.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(AttrValue::Char(c)),
                _ => None,
            }
        }
        "boolean_literal" => match raw {
            "true" => Some(AttrValue::Bool(true)),
            "false" => Some(AttrValue::Bool(false)),
            _ => None,
        },
        "integer_literal" => integer_literal(raw, false),
        "float_literal" => parse_float(raw).map(AttrValue::Float),
        "unary_expression" => {
            if !raw.starts_with('-') {
                return None;
            }
            let operand = node.named_child(0)?;
            // Negated before narrowing so that i64::MIN survives
            if operand.kind() == "integer_literal" {
                return integer_literal(text(operand, source), true);
            }
            match literal_value(operand, source)? {
                AttrValue::Int(i) => i.checked_neg().map(AttrValue::Int),
                AttrValue::Float(x) => Some(AttrValue::Float(-x)),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Integer literal, or an integer body with a float suffix (`1f32`)
fn integer_literal(raw: &str, negate: bool) -> Option<AttrValue> {
    let radix_prefixed = ["0x", "0o", "0b"].iter().any(|p| raw.starts_with(*p));
    if !radix_prefixed && (raw.ends_with("f32") || raw.ends_with("f64")) {
        let value = parse_float(raw)?;
        return Some(AttrValue::Float(if negate { -value } else { value }));
    }
    let magnitude = parse_integer(raw)?;
    let value = if negate { -magnitude } else { magnitude };
    i64::try_from(value).ok().map(AttrValue::Int)
}

fn parse_integer(raw: &str) -> Option<i128> {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let (radix, digits) = if let Some(rest) = cleaned.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = cleaned.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = cleaned.strip_prefix("0b") {
        (2, rest)
    } else {
        (10, cleaned.as_str())
    };
    // Type suffixes start with `i` or `u`, neither of which is a hex digit
    let digits = match digits.find(['i', 'u']) {
        Some(idx) => &digits[..idx],
        None => digits,
    };
    i128::from_str_radix(digits, radix).ok()
}

fn parse_float(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let cleaned = cleaned
        .strip_suffix("f32")
        .or_else(|| cleaned.strip_suffix("f64"))
        .unwrap_or(&cleaned);
    cleaned.parse().ok()
}

/// Decode Rust escape sequences; unknown escapes yield `None`
fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                let byte = u8::from_str_radix(&hex, 16).ok()?;
                if byte > 0x7f {
                    return None;
                }
                out.push(char::from(byte));
            }
            'u' => {
                if chars.next()? != '{' {
                    return None;
                }
                let hex: String = chars.by_ref().take_while(|c| *c != '}').collect();
                let hex: String = hex.chars().filter(|c| *c != '_').collect();
                out.push(char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?);
            }
            '\n' => {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
            }
            _ => return None,
        }
    }

    Some(out)
}
