//! Taint metadata carried on union types.
//!
//! A [`TaintSet`] records which vulnerability classes a value may carry
//! attacker-controlled content for. Combination is a monotone union and
//! neutralisation removes named kinds; the underlying bits never leave this
//! module.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A vulnerability class a value can be tainted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaintKind {
    /// Input that may end up in an SQL query.
    Sql,
    /// Input that may end up in HTML output.
    Html,
    /// Input that may end up in a shell command.
    Shell,
}

impl TaintKind {
    /// Every taint kind, in bit order.
    pub const ALL: [TaintKind; 3] = [TaintKind::Sql, TaintKind::Html, TaintKind::Shell];

    fn bit(self) -> u8 {
        match self {
            TaintKind::Sql => 1,
            TaintKind::Html => 1 << 1,
            TaintKind::Shell => 1 << 2,
        }
    }

    /// Lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            TaintKind::Sql => "sql",
            TaintKind::Html => "html",
            TaintKind::Shell => "shell",
        }
    }
}

/// A set of [`TaintKind`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TaintSet(u8);

impl TaintSet {
    /// The untainted set.
    pub const fn empty() -> Self {
        TaintSet(0)
    }

    /// A set holding exactly `kind`.
    pub fn of(kind: TaintKind) -> Self {
        TaintSet(kind.bit())
    }

    /// Build a set from several kinds.
    pub fn from_kinds(kinds: &[TaintKind]) -> Self {
        kinds
            .iter()
            .fold(TaintSet::empty(), |set, &kind| set.with(kind))
    }

    /// This set plus `kind`.
    #[must_use]
    pub fn with(self, kind: TaintKind) -> Self {
        TaintSet(self.0 | kind.bit())
    }

    /// Union of two sets.
    #[must_use]
    pub fn union(self, other: TaintSet) -> Self {
        TaintSet(self.0 | other.0)
    }

    /// This set with every kind in `cleared` removed.
    #[must_use]
    pub fn without(self, cleared: TaintSet) -> Self {
        TaintSet(self.0 & !cleared.0)
    }

    /// True if `kind` is in the set.
    pub fn contains(self, kind: TaintKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// True if the set holds no kinds.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the kinds in the set, in bit order.
    pub fn iter(self) -> impl Iterator<Item = TaintKind> {
        TaintKind::ALL
            .into_iter()
            .filter(move |&kind| self.contains(kind))
    }
}

impl FromIterator<TaintKind> for TaintSet {
    fn from_iter<I: IntoIterator<Item = TaintKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(TaintSet::empty(), |set, kind| set.with(kind))
    }
}

impl fmt::Display for TaintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(TaintKind::name).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

impl Serialize for TaintSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for TaintSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let kinds = Vec::<TaintKind>::deserialize(deserializer)?;
        Ok(kinds.into_iter().collect())
    }
}

/// Where a tainted value originated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaintSource {
    /// Human readable description of the source (e.g. `$_GET['id']`).
    pub label: String,
    /// File the source appears in.
    pub file_path: String,
    /// 1-indexed line of the source.
    pub line: u32,
}

impl TaintSource {
    pub fn new(label: impl Into<String>, file_path: impl Into<String>, line: u32) -> Self {
        TaintSource {
            label: label.into(),
            file_path: file_path.into(),
            line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_is_monotone() {
        let sql = TaintSet::of(TaintKind::Sql);
        let html = TaintSet::of(TaintKind::Html);
        let both = sql.union(html);
        assert!(both.contains(TaintKind::Sql));
        assert!(both.contains(TaintKind::Html));
        assert_eq!(both.union(sql), both);
        assert_eq!(TaintSet::empty().union(both), both);
    }

    #[test]
    fn without_clears_only_named_kinds() {
        let all = TaintSet::from_kinds(&TaintKind::ALL);
        let cleared = all.without(TaintSet::from_kinds(&[TaintKind::Sql, TaintKind::Html]));
        assert_eq!(cleared, TaintSet::of(TaintKind::Shell));
        assert!(TaintSet::empty().without(all).is_empty());
    }

    #[test]
    fn iter_and_display() {
        let set = TaintSet::of(TaintKind::Html).with(TaintKind::Sql);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![TaintKind::Sql, TaintKind::Html]
        );
        assert_eq!(set.to_string(), "{sql, html}");
        assert_eq!(TaintSet::empty().to_string(), "{}");
    }

    #[test]
    fn serializes_as_kind_names() {
        let set = TaintSet::of(TaintKind::Shell).with(TaintKind::Sql);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["sql","shell"]"#);
        let back: TaintSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
