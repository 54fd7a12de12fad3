//! Union types.

use std::fmt;

use indexmap::IndexMap;

use super::atomic::{Atomic, Record};
use super::taint::{TaintSet, TaintSource};

/// A set of alternative atomic shapes, plus the flags and taint metadata the
/// checker tracks on a value.
///
/// Atomics are keyed by [`Atomic::key`]; adding an atomic whose key is
/// already present replaces the earlier one. Equality ignores atomic order.
#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    types: IndexMap<String, Atomic>,
    /// Suppress "possibly false" diagnostics for this value.
    pub ignore_falsable_issues: bool,
    /// Suppress "possibly null" diagnostics for this value.
    pub ignore_nullable_issues: bool,
    /// The value came from arithmetic rather than a declaration.
    pub from_calculation: bool,
    /// Taint kinds the value may carry.
    pub taint: TaintSet,
    /// Where the taint originated, in discovery order.
    pub sources: Vec<TaintSource>,
}

impl Union {
    /// Create a union from a non-empty list of atomics.
    ///
    /// # Panics
    /// Panics if `atomics` is empty.
    pub fn new(atomics: impl IntoIterator<Item = Atomic>) -> Self {
        Union::try_new(atomics).expect("a union must hold at least one atomic type")
    }

    /// Create a union, returning `None` if `atomics` is empty.
    pub fn try_new(atomics: impl IntoIterator<Item = Atomic>) -> Option<Self> {
        let types: IndexMap<String, Atomic> =
            atomics.into_iter().map(|atomic| (atomic.key(), atomic)).collect();
        if types.is_empty() {
            return None;
        }
        Some(Union {
            types,
            ignore_falsable_issues: false,
            ignore_nullable_issues: false,
            from_calculation: false,
            taint: TaintSet::empty(),
            sources: Vec::new(),
        })
    }

    /// A union of exactly one atomic.
    pub fn single(atomic: Atomic) -> Self {
        Union::new([atomic])
    }

    /// The top type.
    pub fn mixed() -> Self {
        Union::single(Atomic::Mixed)
    }

    pub fn int() -> Self {
        Union::single(Atomic::Int)
    }

    pub fn literal_int(value: i64) -> Self {
        Union::single(Atomic::LiteralInt(value))
    }

    pub fn bool() -> Self {
        Union::single(Atomic::Bool)
    }

    pub fn string() -> Self {
        Union::single(Atomic::String)
    }

    /// `int` flagged as coming from a calculation.
    pub fn calculated_int() -> Self {
        let mut int = Union::int();
        int.from_calculation = true;
        int
    }

    /// The sealed `array{0: int, 1: int}` shape.
    pub fn int_pair() -> Self {
        Union::single(Atomic::Record(Record::sealed_tuple([
            Union::int(),
            Union::int(),
        ])))
    }

    /// Iterate the atomics in insertion order.
    pub fn atomics(&self) -> impl Iterator<Item = &Atomic> {
        self.types.values()
    }

    /// Number of atomics.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always false for a constructed union.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The atomic stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Atomic> {
        self.types.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.types.contains_key(key)
    }

    /// The only atomic, if the union has exactly one.
    pub fn single_atomic(&self) -> Option<&Atomic> {
        if self.types.len() == 1 {
            self.types.values().next()
        } else {
            None
        }
    }

    /// Add an atomic, replacing any atomic with the same key.
    pub fn add_atomic(&mut self, atomic: Atomic) {
        self.types.insert(atomic.key(), atomic);
    }

    /// True if the value may be `false`.
    pub fn is_falsable(&self) -> bool {
        self.has("false")
    }

    /// True if the value may be `null`.
    pub fn is_nullable(&self) -> bool {
        self.has("null")
    }

    pub fn is_mixed(&self) -> bool {
        self.has("mixed")
    }

    /// True if the value is statically the literal `true`.
    pub fn is_true(&self) -> bool {
        matches!(self.single_atomic(), Some(Atomic::True))
    }

    /// True if the value is statically the literal `false`.
    pub fn is_false(&self) -> bool {
        matches!(self.single_atomic(), Some(Atomic::False))
    }

    /// True if the value carries any taint.
    pub fn is_tainted(&self) -> bool {
        !self.taint.is_empty()
    }
}

impl fmt::Display for Union {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, atomic) in self.types.values().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{}", atomic)?;
        }
        Ok(())
    }
}
