//! Taint propagation through built-in string functions.
//!
//! Each function with a rule maps to one [`TaintRule`]. Rules read the
//! taint of the call's arguments and rewrite the taint of the resolved
//! return type in place. Missing or untyped arguments count as untainted,
//! and nothing here fails.
//!
//! The subject-replace rule merges taint from the first and third
//! arguments but takes provenance from the first argument only.

use crate::config::AnalysisConfig;
use crate::context::CallArgument;
use crate::types::{TaintKind, TaintSet, TaintSource, Union};

/// How a function moves taint from its arguments to its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaintRule {
    /// HTML escaping: clears SQL and HTML taint.
    HtmlEscape,
    /// Case folding, formatting, quoting, substrings: taint passes through.
    PassThrough,
    /// Search/replace over a subject: first and third argument taint combine.
    SubjectReplace,
    /// Tag stripping: clears HTML taint only.
    TagStrip,
}

impl TaintRule {
    /// The rule for a lowercase function key.
    pub fn for_function(key: &str) -> Option<TaintRule> {
        match key {
            "htmlspecialchars" => Some(TaintRule::HtmlEscape),
            "strtolower" | "strtoupper" | "sprintf" | "preg_quote" | "substr" => {
                Some(TaintRule::PassThrough)
            }
            "str_replace" | "preg_replace" => Some(TaintRule::SubjectReplace),
            "htmlentities" | "strip_tags" | "striptags" => Some(TaintRule::TagStrip),
            _ => None,
        }
    }

    /// Rewrite `result` from the taint of `args`.
    pub fn apply(self, args: &[CallArgument], result: &mut Union) {
        match self {
            TaintRule::HtmlEscape => copy_first_argument(
                args,
                result,
                TaintSet::from_kinds(&[TaintKind::Sql, TaintKind::Html]),
            ),
            TaintRule::PassThrough => copy_first_argument(args, result, TaintSet::empty()),
            TaintRule::TagStrip => {
                copy_first_argument(args, result, TaintSet::of(TaintKind::Html))
            }
            TaintRule::SubjectReplace => {
                let first = argument_taint(args, 0);
                let third = argument_taint(args, 2);
                let combined = first.union(third);
                if !combined.is_empty() {
                    result.taint = combined;
                    result.sources = argument_sources(args, 0);
                }
            }
        }
    }
}

/// Apply the taint rule for `function_id`, if taint tracking is enabled and
/// the function has one.
pub fn apply_taint_rules(
    function_id: &str,
    args: &[CallArgument],
    result: &mut Union,
    config: &AnalysisConfig,
) {
    if !config.taint_tracking_enabled {
        return;
    }

    let key = function_id.to_ascii_lowercase();
    if let Some(rule) = TaintRule::for_function(&key) {
        rule.apply(args, result);
        tracing::trace!(function = %key, ?rule, taint = %result.taint, "applied taint rule");
    }
}

fn copy_first_argument(args: &[CallArgument], result: &mut Union, cleared: TaintSet) {
    let taint = argument_taint(args, 0);
    if taint.is_empty() {
        return;
    }
    result.taint = taint.without(cleared);
    result.sources = argument_sources(args, 0);
}

fn argument_taint(args: &[CallArgument], index: usize) -> TaintSet {
    args.get(index)
        .and_then(|arg| arg.ty.as_ref())
        .map_or(TaintSet::empty(), |ty| ty.taint)
}

fn argument_sources(args: &[CallArgument], index: usize) -> Vec<TaintSource> {
    args.get(index)
        .and_then(|arg| arg.ty.as_ref())
        .map_or_else(Vec::new, |ty| ty.sources.clone())
}
