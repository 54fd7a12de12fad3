//! Atomic types: the individual shapes a union is made of.

use std::fmt;

use indexmap::IndexMap;

use super::Union;

/// A reference to a class instance type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedObject {
    /// Fully qualified class name.
    pub name: String,
    /// True when the object is the late-static-bound class (`static`).
    pub was_static: bool,
}

impl NamedObject {
    pub fn new(name: impl Into<String>) -> Self {
        NamedObject {
            name: name.into(),
            was_static: false,
        }
    }

    /// The late-static-bound form of `name`.
    pub fn late_static(name: impl Into<String>) -> Self {
        NamedObject {
            name: name.into(),
            was_static: true,
        }
    }
}

/// Array shapes that are not keyed records.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayShape {
    /// `array<K, V>`, possibly empty.
    Array { key: Union, value: Union },
    /// `non-empty-array<K, V>`, with an element count when statically known.
    NonEmptyArray {
        key: Union,
        value: Union,
        count: Option<usize>,
    },
    /// `list<V>`, possibly empty.
    List { value: Union },
    /// `non-empty-list<V>`, with an element count when statically known.
    NonEmptyList { value: Union, count: Option<usize> },
    /// An array usable as a callable: `[class-or-object, method]`.
    CallableArray,
    /// A list usable as a callable: `[class-or-object, method]`.
    CallableList,
}

impl ArrayShape {
    /// `array<array-key, mixed>`.
    pub fn plain() -> Self {
        ArrayShape::Array {
            key: Union::single(Atomic::ArrayKey),
            value: Union::mixed(),
        }
    }

    /// True for the callable-shaped variants, which always hold exactly two elements.
    pub fn is_callable(&self) -> bool {
        matches!(self, ArrayShape::CallableArray | ArrayShape::CallableList)
    }
}

/// A keyed array with a known set of properties (`array{a: int, b: string}`).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Declared properties, in declaration order.
    pub properties: IndexMap<String, Union>,
    /// True when the record holds exactly these properties and no others.
    pub sealed: bool,
    /// True when the record is a callable `[class-or-object, method]` pair.
    pub callable: bool,
}

impl Record {
    /// An unsealed record with the given properties.
    pub fn new(properties: IndexMap<String, Union>) -> Self {
        Record {
            properties,
            sealed: false,
            callable: false,
        }
    }

    /// A sealed record whose properties are the positional keys `0..n`.
    pub fn sealed_tuple(elements: impl IntoIterator<Item = Union>) -> Self {
        let properties = elements
            .into_iter()
            .enumerate()
            .map(|(i, ty)| (i.to_string(), ty))
            .collect();
        Record {
            properties,
            sealed: true,
            callable: false,
        }
    }
}

/// One alternative of a [`Union`].
#[derive(Debug, Clone, PartialEq)]
pub enum Atomic {
    Mixed,
    Void,
    Null,
    Bool,
    True,
    False,
    Int,
    LiteralInt(i64),
    Float,
    String,
    ArrayKey,
    Object,
    Array(ArrayShape),
    Record(Record),
    /// A class name string; `concrete` marks it as naming exactly that object's class.
    ClassString {
        name: String,
        concrete: Option<NamedObject>,
    },
    NamedObject(NamedObject),
}

impl Atomic {
    /// The key identifying this atomic's shape within a union.
    ///
    /// Every array-like atomic shares the key `array`, so a union holds at
    /// most one array shape.
    pub fn key(&self) -> String {
        match self {
            Atomic::Mixed => "mixed".to_string(),
            Atomic::Void => "void".to_string(),
            Atomic::Null => "null".to_string(),
            Atomic::Bool => "bool".to_string(),
            Atomic::True => "true".to_string(),
            Atomic::False => "false".to_string(),
            Atomic::Int => "int".to_string(),
            Atomic::LiteralInt(value) => format!("int({})", value),
            Atomic::Float => "float".to_string(),
            Atomic::String => "string".to_string(),
            Atomic::ArrayKey => "array-key".to_string(),
            Atomic::Object => "object".to_string(),
            Atomic::Array(_) | Atomic::Record(_) => "array".to_string(),
            Atomic::ClassString { name, .. } => format!("class-string<{}>", name),
            Atomic::NamedObject(object) => object.name.to_ascii_lowercase(),
        }
    }

    /// True for array shapes and records.
    pub fn is_array_like(&self) -> bool {
        matches!(self, Atomic::Array(_) | Atomic::Record(_))
    }
}

impl fmt::Display for Atomic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atomic::Mixed => f.write_str("mixed"),
            Atomic::Void => f.write_str("void"),
            Atomic::Null => f.write_str("null"),
            Atomic::Bool => f.write_str("bool"),
            Atomic::True => f.write_str("true"),
            Atomic::False => f.write_str("false"),
            Atomic::Int => f.write_str("int"),
            Atomic::LiteralInt(value) => write!(f, "{}", value),
            Atomic::Float => f.write_str("float"),
            Atomic::String => f.write_str("string"),
            Atomic::ArrayKey => f.write_str("array-key"),
            Atomic::Object => f.write_str("object"),
            Atomic::Array(shape) => match shape {
                ArrayShape::Array { key, value } => write!(f, "array<{}, {}>", key, value),
                ArrayShape::NonEmptyArray { key, value, .. } => {
                    write!(f, "non-empty-array<{}, {}>", key, value)
                }
                ArrayShape::List { value } => write!(f, "list<{}>", value),
                ArrayShape::NonEmptyList { value, .. } => write!(f, "non-empty-list<{}>", value),
                ArrayShape::CallableArray => f.write_str("callable-array"),
                ArrayShape::CallableList => f.write_str("callable-list"),
            },
            Atomic::Record(record) => {
                f.write_str(if record.callable {
                    "callable-array{"
                } else {
                    "array{"
                })?;
                for (i, (name, ty)) in record.properties.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                f.write_str("}")
            }
            Atomic::ClassString { name, .. } => write!(f, "class-string<{}>", name),
            Atomic::NamedObject(object) => f.write_str(&object.name),
        }
    }
}
