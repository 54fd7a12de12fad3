//! Built-in function signature table.
//!
//! The table maps lowercase function names to a return type descriptor and
//! a list of parameter descriptors. The JSON form is an object of
//! `name -> [return, param...]`, where each parameter is written
//! `name: type` with the markers `&` (by reference), `...` (variadic) and a
//! trailing `=` on the name (optional):
//!
//! ```json
//! { "strpos": ["int|false", "haystack: string", "needle: string", "offset=: int"] }
//! ```
//!
//! An empty return descriptor means the return type is unknown.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const BUILTIN_CALLMAP: &str = include_str!("../data/callmap.json");

/// Error type for signature table loading.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// The input is not a JSON object of string arrays.
    #[error("invalid signature JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An entry has no return descriptor.
    #[error("signature for {function} has no return descriptor")]
    MissingReturn { function: String },

    /// A parameter descriptor could not be read.
    #[error("signature for {function} has malformed parameter '{param}'")]
    MalformedParam { function: String, param: String },
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub name: String,
    /// Type descriptor, unparsed.
    pub ty: String,
    pub optional: bool,
    pub variadic: bool,
    pub by_reference: bool,
}

impl ParamDescriptor {
    /// Read a `[&][...]name[=]: type` descriptor.
    pub fn parse(raw: &str) -> Option<Self> {
        let (name, ty) = raw.split_once(':')?;
        let mut name = name.trim();

        let by_reference = name.starts_with('&');
        name = name.trim_start_matches('&');
        let variadic = name.starts_with("...");
        name = name.trim_start_matches("...");
        let optional = name.ends_with('=');
        name = name.trim_end_matches('=');

        if name.is_empty() {
            return None;
        }

        Some(ParamDescriptor {
            name: name.to_string(),
            ty: ty.trim().to_string(),
            optional: optional || variadic,
            variadic,
            by_reference,
        })
    }
}

/// A function's declared signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Return type descriptor; empty when unknown.
    pub return_type: String,
    pub params: Vec<ParamDescriptor>,
}

/// Lookup of return descriptors by function key.
pub trait SignatureLookup {
    /// Return descriptor for `key`, or `None` if the function is unknown.
    ///
    /// Implementations match `key` case-insensitively.
    fn return_descriptor(&self, key: &str) -> Option<&str>;
}

/// In-memory signature table keyed by lowercase function name.
#[derive(Debug, Clone, Default)]
pub struct SignatureTable {
    entries: HashMap<String, FunctionSignature>,
}

impl SignatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table embedded in this crate.
    ///
    /// # Panics
    /// Panics if the embedded data is malformed, which the crate's tests rule out.
    pub fn builtin() -> Self {
        match SignatureTable::from_json(BUILTIN_CALLMAP) {
            Ok(table) => table,
            Err(e) => panic!("embedded call map is malformed: {}", e),
        }
    }

    /// Load a table from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, SignatureError> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(json)?;
        let mut table = SignatureTable::new();

        for (name, parts) in raw {
            let mut parts = parts.into_iter();
            let return_type = parts.next().ok_or_else(|| SignatureError::MissingReturn {
                function: name.clone(),
            })?;

            let params = parts
                .map(|param| {
                    ParamDescriptor::parse(&param).ok_or_else(|| SignatureError::MalformedParam {
                        function: name.clone(),
                        param: param.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            table.insert(
                &name,
                FunctionSignature {
                    return_type,
                    params,
                },
            );
        }

        tracing::debug!(functions = table.len(), "loaded signature table");
        Ok(table)
    }

    /// Add or replace a signature. The key is stored lowercased.
    pub fn insert(&mut self, name: &str, signature: FunctionSignature) {
        self.entries.insert(name.to_ascii_lowercase(), signature);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSignature> {
        self.entries.get(&name.to_ascii_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SignatureLookup for SignatureTable {
    fn return_descriptor(&self, key: &str) -> Option<&str> {
        self.get(key).map(|signature| signature.return_type.as_str())
    }
}
