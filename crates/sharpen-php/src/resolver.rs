//! Return types of built-in function calls.
//!
//! [`ReturnTypeResolver::resolve`] computes the type of a call to a
//! built-in function. Resolution goes through three stages:
//!
//! 1. A fixed [`Refinement`] for the function, if any. Refinements look at
//!    the argument types and the calling class and may return a sharper
//!    type than the declared one. Returning `None` falls through.
//! 2. The declared return descriptor from the signature table, parsed into
//!    a [`Union`]. An empty descriptor means `mixed`.
//! 3. Suppression flags from [`AnalysisConfig`] applied to the parsed type.
//!
//! A function missing from the signature table is a caller bug and is
//! reported as [`ResolveError::UnknownFunction`].

use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::context::{CallArgument, CallingContext};
use crate::descriptor::{DescriptorError, TypeDescriptorParser};
use crate::signatures::SignatureLookup;
use crate::taint_flow::apply_taint_rules;
use crate::types::{ArrayShape, Atomic, NamedObject, Union};

/// Search functions whose `false` result is meaningful and never suppressed.
const FALSABLE_EXEMPT: &[&str] = &[
    "mb_strpos",
    "mb_strrpos",
    "mb_stripos",
    "mb_strripos",
    "strpos",
    "strrpos",
    "stripos",
    "strripos",
    "strstr",
    "stristr",
    "strrchr",
    "strpbrk",
    "array_search",
];

/// Functions whose `null` result may be suppressed.
const NULLABLE_SUPPRESSIBLE: &[&str] = &["array_replace", "array_replace_recursive"];

/// Error type for return type resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The function is not in the signature table.
    #[error("function {function_id} was not found in the signature table")]
    UnknownFunction { function_id: String },

    /// The declared return descriptor could not be parsed.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

// ============================================================================
// Refinements
// ============================================================================

/// A function-specific rule that can sharpen the declared return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refinement {
    /// `count` and `sizeof`: element counts of statically sized arrays.
    Count,
    /// `hrtime`: a `[seconds, nanoseconds]` pair or a nanosecond integer.
    ClockPair,
    /// `get_called_class`: the late-static-bound class name.
    CalledClass,
    /// `get_parent_class`: the nearest recorded parent of the calling class.
    ParentClass,
}

impl Refinement {
    /// The refinement for a lowercase function key.
    pub fn for_function(key: &str) -> Option<Refinement> {
        match key {
            "count" | "sizeof" => Some(Refinement::Count),
            "hrtime" => Some(Refinement::ClockPair),
            "get_called_class" => Some(Refinement::CalledClass),
            "get_parent_class" => Some(Refinement::ParentClass),
            _ => None,
        }
    }

    /// Compute the refined type, or `None` to use the declared type.
    pub fn refine(self, args: &[CallArgument], context: &CallingContext<'_>) -> Option<Union> {
        match (self, args.first()) {
            (Refinement::Count, Some(first)) => count(first.ty.as_ref()?),
            (Refinement::Count, None) => None,

            (Refinement::ClockPair, None) => Some(Union::int_pair()),
            (Refinement::ClockPair, Some(first)) => Some(clock_with_flag(first.ty.as_ref())),

            (Refinement::CalledClass, None) => Some(called_class(context)),
            (Refinement::CalledClass, Some(_)) => None,

            (Refinement::ParentClass, None) => parent_class(context),
            // Which subclass level the argument names is not tracked.
            (Refinement::ParentClass, Some(_)) => None,
        }
    }
}

fn count(ty: &Union) -> Option<Union> {
    match ty.single_atomic()? {
        Atomic::Array(shape) if shape.is_callable() => Some(Union::literal_int(2)),
        Atomic::Array(ArrayShape::NonEmptyArray { count, .. })
        | Atomic::Array(ArrayShape::NonEmptyList { count, .. }) => Some(match count {
            Some(n) => Union::literal_int(*n as i64),
            None => Union::int(),
        }),
        Atomic::Record(record) if record.callable => Some(Union::literal_int(2)),
        Atomic::Record(record) if record.sealed => {
            Some(Union::literal_int(record.properties.len() as i64))
        }
        _ => None,
    }
}

fn clock_with_flag(flag: Option<&Union>) -> Union {
    match flag {
        Some(flag) if flag.is_false() => Union::int_pair(),
        Some(flag) if !flag.is_true() => {
            let mut either = Union::int_pair();
            either.add_atomic(Atomic::Int);
            either
        }
        _ => Union::calculated_int(),
    }
}

fn called_class(context: &CallingContext<'_>) -> Union {
    let atomic = match context.self_class {
        Some(name) => Atomic::ClassString {
            name: name.to_string(),
            concrete: Some(NamedObject::late_static(name)),
        },
        None => Atomic::ClassString {
            name: "object".to_string(),
            concrete: None,
        },
    };
    Union::single(atomic)
}

fn parent_class(context: &CallingContext<'_>) -> Option<Union> {
    let self_class = context.self_class?;
    if !context.hierarchy.class_exists(self_class) {
        return None;
    }
    let parent = context.hierarchy.parent_classes(self_class).into_iter().next()?;
    Some(Union::single(Atomic::ClassString {
        name: parent,
        concrete: None,
    }))
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves built-in call return types against a signature table.
pub struct ReturnTypeResolver<'a> {
    signatures: &'a dyn SignatureLookup,
    parser: &'a dyn TypeDescriptorParser,
    config: AnalysisConfig,
}

impl<'a> ReturnTypeResolver<'a> {
    pub fn new(
        signatures: &'a dyn SignatureLookup,
        parser: &'a dyn TypeDescriptorParser,
        config: AnalysisConfig,
    ) -> Self {
        ReturnTypeResolver {
            signatures,
            parser,
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The return type of calling `function_id` with `args` from `context`.
    pub fn resolve(
        &self,
        function_id: &str,
        args: &[CallArgument],
        context: &CallingContext<'_>,
    ) -> Result<Union, ResolveError> {
        let key = function_id.to_ascii_lowercase();

        let descriptor = self.signatures.return_descriptor(&key).ok_or_else(|| {
            ResolveError::UnknownFunction {
                function_id: function_id.to_string(),
            }
        })?;

        if let Some(refinement) = Refinement::for_function(&key) {
            if let Some(refined) = refinement.refine(args, context) {
                tracing::debug!(function = %key, ?refinement, ty = %refined, "refined return type");
                return Ok(refined);
            }
            tracing::trace!(function = %key, ?refinement, "refinement fell through");
        }

        if descriptor.trim().is_empty() {
            return Ok(Union::mixed());
        }

        let mut ty = self.parser.parse(descriptor)?;

        if self.config.ignore_internal_falsable_issues
            && ty.is_falsable()
            && !FALSABLE_EXEMPT.contains(&key.as_str())
        {
            ty.ignore_falsable_issues = true;
        }

        if self.config.ignore_internal_nullable_issues
            && NULLABLE_SUPPRESSIBLE.contains(&key.as_str())
        {
            ty.ignore_nullable_issues = true;
        }

        Ok(ty)
    }

    /// Resolve the call, then apply taint propagation to the result.
    pub fn resolve_call(
        &self,
        function_id: &str,
        args: &[CallArgument],
        context: &CallingContext<'_>,
    ) -> Result<Union, ResolveError> {
        let mut ty = self.resolve(function_id, args, context)?;
        apply_taint_rules(function_id, args, &mut ty, &self.config);
        Ok(ty)
    }
}
