//! Type descriptor parsing.
//!
//! Signature tables describe return types as strings such as
//! `int|false`, `array<string, int>` or `array{0: int, 1: int}`. The
//! resolver only depends on the [`TypeDescriptorParser`] trait; this module
//! also ships [`DescriptorParser`], which understands the subset of the
//! descriptor grammar the built-in table uses.
//!
//! ## Grammar
//!
//! ```text
//! <union>    := <atomic> ("|" <atomic>)*
//! <atomic>   := "?" <atomic> | <int> | <name> [<args>] [<fields>]
//! <args>     := "<" <union> ("," <union>)* ">"
//! <fields>   := "{" [<field> ("," <field>)*] "}"
//! <field>    := <key> ["?"] ":" <union>
//! ```

use thiserror::Error;
use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, delimited, opt, separated};
use winnow::error::{ErrMode, ParserError};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};
use winnow::ModalResult;

use indexmap::IndexMap;

use crate::types::{ArrayShape, Atomic, Record, Union};

/// Error type for descriptor parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// The descriptor is not valid descriptor syntax.
    #[error("malformed type descriptor '{descriptor}': {message}")]
    Malformed { descriptor: String, message: String },
}

/// Turns a descriptor string into a [`Union`].
pub trait TypeDescriptorParser {
    fn parse(&self, descriptor: &str) -> Result<Union, DescriptorError>;
}

/// Parser for the descriptor subset used by built-in signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorParser;

impl TypeDescriptorParser for DescriptorParser {
    fn parse(&self, descriptor: &str) -> Result<Union, DescriptorError> {
        parse_descriptor(descriptor)
    }
}

/// Parse a descriptor string.
pub fn parse_descriptor(descriptor: &str) -> Result<Union, DescriptorError> {
    let trimmed = descriptor.trim();
    if trimmed.is_empty() {
        return Err(DescriptorError::Malformed {
            descriptor: descriptor.to_string(),
            message: "empty descriptor".to_string(),
        });
    }

    parse_union
        .parse(trimmed)
        .map_err(|e| DescriptorError::Malformed {
            descriptor: descriptor.to_string(),
            message: format!("{:?}", e),
        })
}

// ============================================================================
// Parser implementation using winnow
// ============================================================================

fn parse_union(input: &mut &str) -> ModalResult<Union> {
    let parts: Vec<Vec<Atomic>> =
        separated(1.., parse_atomic, (multispace0, '|', multispace0)).parse_next(input)?;

    Union::try_new(parts.into_iter().flatten()).ok_or_else(|| ErrMode::from_input(input))
}

/// Parse one atomic; `?T` yields both `T` and `null`.
fn parse_atomic(input: &mut &str) -> ModalResult<Vec<Atomic>> {
    let _ = multispace0.parse_next(input)?;

    if opt('?').parse_next(input)?.is_some() {
        let mut atomics = parse_atomic(input)?;
        atomics.push(Atomic::Null);
        return Ok(atomics);
    }

    alt((
        parse_int_literal.map(|value| vec![Atomic::LiteralInt(value)]),
        parse_named.map(|atomic| vec![atomic]),
    ))
    .parse_next(input)
}

fn parse_int_literal(input: &mut &str) -> ModalResult<i64> {
    (opt('-'), digit1)
        .take()
        .try_map(|s: &str| s.parse::<i64>())
        .parse_next(input)
}

fn parse_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '\\'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == '\\' || c == '-'
        }),
    )
        .take()
        .parse_next(input)
}

fn parse_args(input: &mut &str) -> ModalResult<Vec<Union>> {
    delimited(
        ('<', multispace0),
        separated(1.., parse_union, (multispace0, ',', multispace0)),
        (multispace0, '>'),
    )
    .parse_next(input)
}

fn parse_fields(input: &mut &str) -> ModalResult<IndexMap<String, Union>> {
    let fields: Vec<(String, Union)> = delimited(
        ('{', multispace0),
        separated(0.., parse_field, (multispace0, ',', multispace0)),
        (multispace0, '}'),
    )
    .parse_next(input)?;

    Ok(fields.into_iter().collect())
}

fn parse_field(input: &mut &str) -> ModalResult<(String, Union)> {
    let key: &str =
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)?;
    let _ = (multispace0, opt('?'), multispace0, ':', multispace0).parse_next(input)?;
    let ty = parse_union(input)?;
    Ok((key.to_string(), ty))
}

fn parse_named(input: &mut &str) -> ModalResult<Atomic> {
    let name = parse_name(input)?;
    let args = opt(parse_args).parse_next(input)?.unwrap_or_default();
    let fields = opt(parse_fields).parse_next(input)?;

    let lowered = name.to_ascii_lowercase();

    if let Some(properties) = fields {
        return match lowered.as_str() {
            "array" => Ok(Atomic::Record(Record {
                properties,
                sealed: true,
                callable: false,
            })),
            "callable-array" => Ok(Atomic::Record(Record {
                properties,
                sealed: true,
                callable: true,
            })),
            _ => Err(ErrMode::from_input(input)),
        };
    }

    let atomic = match (lowered.as_str(), args.len()) {
        ("int" | "integer" | "positive-int" | "non-negative-int", 0) => Atomic::Int,
        ("float" | "double", 0) => Atomic::Float,
        (
            "string" | "non-empty-string" | "numeric-string" | "lowercase-string"
            | "callable-string",
            0,
        ) => Atomic::String,
        ("bool" | "boolean", 0) => Atomic::Bool,
        ("true", 0) => Atomic::True,
        ("false", 0) => Atomic::False,
        ("null", 0) => Atomic::Null,
        ("mixed", 0) => Atomic::Mixed,
        ("void", 0) => Atomic::Void,
        ("object", 0) => Atomic::Object,
        ("array-key", 0) => Atomic::ArrayKey,
        ("callable-array", 0) => Atomic::Array(ArrayShape::CallableArray),
        ("callable-list", 0) => Atomic::Array(ArrayShape::CallableList),
        ("class-string", 0) => Atomic::ClassString {
            name: "object".to_string(),
            concrete: None,
        },
        ("class-string", 1) => {
            let name = match args[0].single_atomic() {
                Some(Atomic::NamedObject(object)) => object.name.clone(),
                Some(Atomic::Object) => "object".to_string(),
                _ => return Err(ErrMode::from_input(input)),
            };
            Atomic::ClassString {
                name,
                concrete: None,
            }
        }
        ("array" | "non-empty-array", _) => {
            let (key, value) = match args.len() {
                0 => (Union::single(Atomic::ArrayKey), Union::mixed()),
                1 => (Union::single(Atomic::ArrayKey), args[0].clone()),
                2 => (args[0].clone(), args[1].clone()),
                _ => return Err(ErrMode::from_input(input)),
            };
            if lowered == "array" {
                Atomic::Array(ArrayShape::Array { key, value })
            } else {
                Atomic::Array(ArrayShape::NonEmptyArray {
                    key,
                    value,
                    count: None,
                })
            }
        }
        ("list" | "non-empty-list", 0 | 1) => {
            let value = args.first().cloned().unwrap_or_else(Union::mixed);
            if lowered == "list" {
                Atomic::Array(ArrayShape::List { value })
            } else {
                Atomic::Array(ArrayShape::NonEmptyList { value, count: None })
            }
        }
        (_, 0) if is_class_name(name) => Atomic::NamedObject(crate::types::NamedObject::new(
            name.trim_start_matches('\\'),
        )),
        _ => return Err(ErrMode::from_input(input)),
    };

    Ok(atomic)
}

/// Reserved-looking lowercase keywords with a dash are never class names.
fn is_class_name(name: &str) -> bool {
    !name.contains('-')
}
