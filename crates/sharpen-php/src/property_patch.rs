//! Property type annotation patches.
//!
//! When the checker decides a property's declared type should change, it
//! records the new types here and later asks for the text edits that update
//! the property's native type hint and its `@var` / `@psalm-var` docblock
//! tags. Edits are byte spans into the original, unmodified file.
//!
//! # Lifecycle
//!
//! A [`PatchRegistry`] holds one [`PropertyPatch`] per `(file, property)`
//! for the current run:
//!
//! 1. [`PatchRegistry::get_or_create`] captures the declaration's spans and
//!    indentation the first time a property is seen and hands out a
//!    [`PatchHandle`]. Later calls for the same key return the same handle.
//! 2. [`PatchRegistry::set_type`] records the desired types. The last call
//!    wins.
//! 3. [`PatchRegistry::emit_patches`] produces the edits for one file,
//!    ordered by source line.
//!
//! [`PatchRegistry::reset`] starts a new run. Handles from an earlier run
//! are rejected with [`PatchError::StaleHandle`].

use std::collections::{BTreeMap, HashMap};

use sharpen_core::patch::{validate_edits, EditError, Span, TextEdit};
use sharpen_core::text::leading_indentation;
use thiserror::Error;

use crate::docblock::ParsedDocblock;
use crate::source::SourceProvider;

/// Generic parameters that add nothing to a plain `array` annotation.
const REDUNDANT_GENERICS: &[&str] = &["<mixed, mixed>", "<array-key, mixed>", "<empty, empty>"];

/// Error type for the patch builder.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The declaration statement declares several properties.
    #[error("cannot patch {property_id}: statement declares {count} properties")]
    MultipleProperties { property_id: String, count: usize },

    /// The declaration snapshot is inconsistent.
    #[error("cannot patch {property_id}: {reason}")]
    MalformedDeclaration { property_id: String, reason: String },

    /// The handle was issued before the last reset.
    #[error("patch handle from run {handle_run} used in run {current_run}")]
    StaleHandle { handle_run: u64, current_run: u64 },

    /// The handle does not refer to a record in this registry.
    #[error("unknown patch handle")]
    UnknownHandle,

    /// The file contents could not be read.
    #[error("failed to read {path}: {source}")]
    Source {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The emitted edits are inconsistent with the file.
    #[error(transparent)]
    Edit(#[from] EditError),
}

// ============================================================================
// Declaration snapshot
// ============================================================================

/// A documentation comment attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocComment {
    /// Full comment text, `/**` through `*/`.
    pub text: String,
    /// Byte offset of `/**`.
    pub start: usize,
}

/// One variable declared by a property statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyVariable {
    /// Name without `$`.
    pub name: String,
    /// Byte offset of `$`.
    pub start: usize,
}

/// What the patch builder needs to know about a property statement.
///
/// `start` is the offset of the statement itself (its first modifier), not
/// of the attached comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDeclaration {
    /// 1-indexed line of the statement.
    pub line: u32,
    pub start: usize,
    pub doc_comment: Option<DocComment>,
    /// Span of the native type hint, if the statement has one.
    pub type_hint: Option<Span>,
    pub variables: Vec<PropertyVariable>,
}

/// The types a property should be annotated with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredType {
    /// Native hint. `Some("")` removes an existing hint; `None` leaves it.
    pub native_hint: Option<String>,
    /// Type for the `@var` tag.
    pub doc_type: String,
    /// Type for the `@psalm-var` tag, written only when it says more than `doc_type`.
    pub extended_doc_type: String,
    /// True if `native_hint` fully expresses the type.
    pub hint_compatible: bool,
    /// Appended to the `@var` value.
    pub description: Option<String>,
}

// ============================================================================
// Patch records
// ============================================================================

/// Handle to a patch record in a [`PatchRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchHandle {
    run: u64,
    slot: usize,
}

/// Captured spans and pending state for one property.
#[derive(Debug, Clone)]
pub struct PropertyPatch {
    file: String,
    property_id: String,
    line: u32,
    /// From the comment start (or the statement start) to the statement start.
    doc_span: Span,
    doc_comment: Option<String>,
    hint_span: Option<Span>,
    hint_insert_at: usize,
    indentation: String,
    desired: Option<DesiredType>,
}

impl PropertyPatch {
    fn capture(
        file: &str,
        property_id: &str,
        declaration: &PropertyDeclaration,
        contents: &str,
    ) -> Result<Self, PatchError> {
        let malformed = |reason: String| PatchError::MalformedDeclaration {
            property_id: property_id.to_string(),
            reason,
        };

        let variable = match declaration.variables.as_slice() {
            [variable] => variable,
            [] => return Err(malformed("statement declares no property".to_string())),
            variables => {
                return Err(PatchError::MultipleProperties {
                    property_id: property_id.to_string(),
                    count: variables.len(),
                })
            }
        };

        let doc_start = declaration
            .doc_comment
            .as_ref()
            .map_or(declaration.start, |comment| comment.start);
        let doc_span = Span::checked(doc_start, declaration.start).ok_or_else(|| {
            malformed(format!(
                "comment starts at {} after the statement at {}",
                doc_start, declaration.start
            ))
        })?;

        for offset in [doc_start, declaration.start, variable.start] {
            if offset > contents.len() {
                return Err(malformed(format!(
                    "offset {} is beyond the end of {} ({} bytes)",
                    offset,
                    file,
                    contents.len()
                )));
            }
            if !contents.is_char_boundary(offset) {
                return Err(malformed(format!(
                    "offset {} in {} splits a character",
                    offset, file
                )));
            }
        }

        let hint_span = declaration
            .type_hint
            .map(|span| {
                Span::checked(span.start, span.end).ok_or_else(|| {
                    malformed(format!("type hint span {} ends before it starts", span))
                })
            })
            .transpose()?;

        Ok(PropertyPatch {
            file: file.to_string(),
            property_id: property_id.to_string(),
            line: declaration.line,
            doc_span,
            doc_comment: declaration.doc_comment.as_ref().map(|c| c.text.clone()),
            hint_span,
            hint_insert_at: variable.start.saturating_sub(1),
            indentation: leading_indentation(contents, declaration.start).to_string(),
            desired: None,
        })
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn property_id(&self) -> &str {
        &self.property_id
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn doc_span(&self) -> Span {
        self.doc_span
    }

    pub fn hint_span(&self) -> Option<Span> {
        self.hint_span
    }

    /// Where `" <hint>"` is inserted when the statement has no hint.
    pub fn hint_insert_at(&self) -> usize {
        self.hint_insert_at
    }

    pub fn indentation(&self) -> &str {
        &self.indentation
    }

    /// The pending desired types, if any were set.
    pub fn desired(&self) -> Option<&DesiredType> {
        self.desired.as_ref()
    }

    /// Edits for this property, in offset order.
    fn edits(&self) -> Vec<TextEdit> {
        let native = self.desired.as_ref().and_then(|d| d.native_hint.as_deref());
        let doc_type = self.desired.as_ref().map_or("", |d| d.doc_type.as_str());
        let compatible = self.desired.as_ref().is_some_and(|d| d.hint_compatible);

        let mut edits = Vec::new();

        let hint_written = matches!(native, Some(hint) if !hint.is_empty());
        if !hint_written || !compatible || !self.doc_span.is_empty() {
            edits.push(TextEdit::replace(self.doc_span, self.docblock_text()));
        }

        match (native, self.hint_span) {
            (Some(hint), Some(span)) if !hint.is_empty() => {
                edits.push(TextEdit::replace(span, hint));
            }
            (Some(hint), None) if !hint.is_empty() => {
                edits.push(TextEdit::insert(self.hint_insert_at, format!(" {}", hint)));
            }
            (Some(""), Some(span)) if !doc_type.is_empty() => {
                edits.push(TextEdit::delete(span));
            }
            _ => {}
        }

        edits.retain(|edit| !edit.is_noop());
        edits
    }

    /// The replacement text for the docblock span.
    fn docblock_text(&self) -> String {
        let mut parsed = self
            .doc_comment
            .as_deref()
            .map_or_else(ParsedDocblock::new, ParsedDocblock::parse);

        let (doc_type, extended, description) = match &self.desired {
            Some(desired) => (
                desired.doc_type.as_str(),
                desired.extended_doc_type.as_str(),
                desired.description.as_deref().unwrap_or(""),
            ),
            None => ("", "", ""),
        };

        let mut modified = false;

        if !doc_type.is_empty() {
            let value = if description.is_empty() {
                doc_type.to_string()
            } else {
                format!("{} {}", doc_type, description)
            };
            if parsed.first_tag("var") != Some(value.as_str()) {
                parsed.set_tag("var", value);
                modified = true;
            }
        }

        if !extended.is_empty()
            && extended != doc_type
            && parsed.first_tag("psalm-var") != Some(extended)
        {
            parsed.set_tag("psalm-var", extended);
            modified = true;
        }

        if parsed.is_empty() {
            return String::new();
        }

        if !modified {
            let original = self.doc_comment.as_deref().unwrap_or_default();
            return format!("{}\n{}", original, self.indentation);
        }

        parsed.render(&self.indentation)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// All patch records of one run.
#[derive(Debug, Default)]
pub struct PatchRegistry {
    run: u64,
    patches: Vec<PropertyPatch>,
    by_key: HashMap<(String, String), usize>,
    /// Per file, slots ordered by (line, statement offset).
    by_line: HashMap<String, BTreeMap<(u32, usize), usize>>,
    source_lens: HashMap<String, usize>,
}

impl PatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current run number.
    pub fn run(&self) -> u64 {
        self.run
    }

    /// Number of records in the current run.
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Drop every record and start a new run.
    pub fn reset(&mut self) {
        self.run += 1;
        self.patches.clear();
        self.by_key.clear();
        self.by_line.clear();
        self.source_lens.clear();
        tracing::debug!(run = self.run, "reset patch registry");
    }

    /// The handle for `(file, property_id)`, creating its record on first use.
    ///
    /// Creation reads `file` from `sources`. A statement that declares
    /// more than one property is rejected.
    pub fn get_or_create(
        &mut self,
        file: &str,
        property_id: &str,
        declaration: &PropertyDeclaration,
        sources: &dyn SourceProvider,
    ) -> Result<PatchHandle, PatchError> {
        let key = (file.to_string(), property_id.to_string());
        if let Some(&slot) = self.by_key.get(&key) {
            return Ok(PatchHandle {
                run: self.run,
                slot,
            });
        }

        let contents = sources.contents(file).map_err(|source| PatchError::Source {
            path: file.to_string(),
            source,
        })?;
        let patch = PropertyPatch::capture(file, property_id, declaration, &contents)?;

        let slot = self.patches.len();
        tracing::debug!(
            file,
            property = property_id,
            line = patch.line,
            doc_span = %patch.doc_span,
            "created property patch"
        );

        self.by_line
            .entry(file.to_string())
            .or_default()
            .insert((declaration.line, declaration.start), slot);
        self.source_lens.insert(file.to_string(), contents.len());
        self.by_key.insert(key, slot);
        self.patches.push(patch);

        Ok(PatchHandle {
            run: self.run,
            slot,
        })
    }

    /// The record behind `handle`.
    pub fn get(&self, handle: PatchHandle) -> Result<&PropertyPatch, PatchError> {
        self.check(handle)?;
        self.patches.get(handle.slot).ok_or(PatchError::UnknownHandle)
    }

    /// Record the desired types for a property, replacing any earlier call.
    pub fn set_type(
        &mut self,
        handle: PatchHandle,
        mut desired: DesiredType,
    ) -> Result<(), PatchError> {
        self.check(handle)?;
        let patch = self
            .patches
            .get_mut(handle.slot)
            .ok_or(PatchError::UnknownHandle)?;

        for redundant in REDUNDANT_GENERICS {
            if desired.extended_doc_type.contains(redundant) {
                desired.extended_doc_type = desired.extended_doc_type.replace(redundant, "");
            }
        }

        patch.desired = Some(desired);
        Ok(())
    }

    /// All edits for `file`, ordered by source line.
    ///
    /// Returns an empty list for files with no records.
    pub fn emit_patches(&self, file: &str) -> Result<Vec<TextEdit>, PatchError> {
        let Some(slots) = self.by_line.get(file) else {
            return Ok(Vec::new());
        };

        let mut edits = Vec::new();
        for &slot in slots.values() {
            if let Some(patch) = self.patches.get(slot) {
                edits.extend(patch.edits());
            }
        }

        let source_len = self.source_lens.get(file).copied().unwrap_or(0);
        validate_edits(&edits, source_len)?;

        tracing::debug!(file, edits = edits.len(), "emitted property patches");
        Ok(edits)
    }

    fn check(&self, handle: PatchHandle) -> Result<(), PatchError> {
        if handle.run != self.run {
            return Err(PatchError::StaleHandle {
                handle_run: handle.run,
                current_run: self.run,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemorySources;
    use sharpen_core::patch::apply_edits;

    /// Build a declaration by locating `statement` and `$name` in `source`.
    fn declare(source: &str, statement: &str, hint: Option<&str>) -> PropertyDeclaration {
        let start = source.find(statement).unwrap();
        let dollar_in_statement = statement.find('$').unwrap();
        let dollar = start + dollar_in_statement;
        let line = source[..start].matches('\n').count() as u32 + 1;

        let doc_comment = source[..start].rfind("/**").and_then(|comment_start| {
            let end = source[comment_start..].find("*/").unwrap() + comment_start + 2;
            source[end..start].trim().is_empty().then(|| DocComment {
                text: source[comment_start..end].to_string(),
                start: comment_start,
            })
        });

        let type_hint = hint.map(|hint| {
            let hint_start = start + statement.find(hint).unwrap();
            Span::new(hint_start, hint_start + hint.len())
        });

        let after_dollar = &statement[dollar_in_statement + 1..];
        let name_len = after_dollar
            .find(|c: char| !c.is_alphanumeric() && c != '_')
            .unwrap_or(after_dollar.len());
        let name = after_dollar[..name_len].to_string();

        PropertyDeclaration {
            line,
            start,
            doc_comment,
            type_hint,
            variables: vec![PropertyVariable { name, start: dollar }],
        }
    }

    fn registry_for(
        source: &str,
        property_id: &str,
        declaration: &PropertyDeclaration,
    ) -> (PatchRegistry, PatchHandle) {
        let sources = InMemorySources::new().with_file("a.php", source);
        let mut registry = PatchRegistry::new();
        let handle = registry
            .get_or_create("a.php", property_id, declaration, &sources)
            .unwrap();
        (registry, handle)
    }

    mod capture {
        use super::*;

        #[test]
        fn records_spans_and_indentation() {
            let source = "<?php\nclass A {\n    /** @var int */\n    public $x;\n}\n";
            let decl = declare(source, "public $x;", None);
            let (registry, handle) = registry_for(source, "A::$x", &decl);
            let patch = registry.get(handle).unwrap();

            let comment_start = source.find("/**").unwrap();
            assert_eq!(patch.doc_span(), Span::new(comment_start, decl.start));
            assert_eq!(patch.indentation(), "    ");
            assert_eq!(patch.hint_span(), None);
            assert_eq!(&source[patch.hint_insert_at()..patch.hint_insert_at() + 2], " $");
            assert_eq!(patch.line(), 4);
        }

        #[test]
        fn comment_less_span_is_empty() {
            let source = "<?php\nclass A {\n\tprivate $y;\n}\n";
            let decl = declare(source, "private $y;", None);
            let (registry, handle) = registry_for(source, "A::$y", &decl);
            let patch = registry.get(handle).unwrap();
            assert!(patch.doc_span().is_empty());
            assert_eq!(patch.doc_span().start, decl.start);
            assert_eq!(patch.indentation(), "\t");
        }

        #[test]
        fn multiple_properties_are_rejected() {
            let source = "<?php\nclass A {\n    public $a, $b;\n}\n";
            let mut decl = declare(source, "public $a, $b;", None);
            decl.variables.push(PropertyVariable {
                name: "b".to_string(),
                start: source.find("$b").unwrap(),
            });
            let sources = InMemorySources::new().with_file("a.php", source);
            let mut registry = PatchRegistry::new();
            let err = registry
                .get_or_create("a.php", "A::$a", &decl, &sources)
                .unwrap_err();
            assert!(matches!(
                err,
                PatchError::MultipleProperties { count: 2, .. }
            ));
            assert!(registry.is_empty());
        }

        #[test]
        fn missing_source_is_reported() {
            let source = "<?php\nclass A {\n    public $x;\n}\n";
            let decl = declare(source, "public $x;", None);
            let mut registry = PatchRegistry::new();
            let err = registry
                .get_or_create("a.php", "A::$x", &decl, &InMemorySources::new())
                .unwrap_err();
            assert!(matches!(err, PatchError::Source { .. }));
        }

        #[test]
        fn comment_after_statement_is_malformed() {
            let source = "<?php\nclass A {\n    public $x;\n}\n";
            let mut decl = declare(source, "public $x;", None);
            decl.doc_comment = Some(DocComment {
                text: "/** */".to_string(),
                start: decl.start + 3,
            });
            let sources = InMemorySources::new().with_file("a.php", source);
            let err = PatchRegistry::new()
                .get_or_create("a.php", "A::$x", &decl, &sources)
                .unwrap_err();
            assert!(matches!(err, PatchError::MalformedDeclaration { .. }));
        }

        #[test]
        fn offset_inside_character_is_malformed() {
            let source = "<?php\nclass A {\n    /* é */ public $x;\n}\n";
            let mut decl = declare(source, "public $x;", None);
            decl.start = source.find('é').unwrap() + 1;
            let sources = InMemorySources::new().with_file("a.php", source);
            let mut registry = PatchRegistry::new();
            let err = registry
                .get_or_create("a.php", "A::$x", &decl, &sources)
                .unwrap_err();
            assert!(matches!(err, PatchError::MalformedDeclaration { .. }));
            assert!(registry.is_empty());
        }

        #[test]
        fn inverted_hint_span_is_malformed() {
            let source = "<?php\nclass A {\n    public int $x;\n}\n";
            let mut decl = declare(source, "public int $x;", None);
            decl.type_hint = Some(Span {
                start: decl.start + 10,
                end: decl.start + 7,
            });
            let sources = InMemorySources::new().with_file("a.php", source);
            let err = PatchRegistry::new()
                .get_or_create("a.php", "A::$x", &decl, &sources)
                .unwrap_err();
            assert!(matches!(err, PatchError::MalformedDeclaration { .. }));
        }
    }

    mod registry {
        use super::*;

        #[test]
        fn same_key_same_handle() {
            let source = "<?php\nclass A {\n    public $x;\n}\n";
            let decl = declare(source, "public $x;", None);
            let sources = InMemorySources::new().with_file("a.php", source);
            let mut registry = PatchRegistry::new();
            let first = registry
                .get_or_create("a.php", "A::$x", &decl, &sources)
                .unwrap();
            let second = registry
                .get_or_create("a.php", "A::$x", &decl, &sources)
                .unwrap();
            assert_eq!(first, second);
            assert_eq!(registry.len(), 1);
        }

        #[test]
        fn last_set_type_wins() {
            let source = "<?php\nclass A {\n    public $x;\n}\n";
            let decl = declare(source, "public $x;", None);
            let (mut registry, handle) = registry_for(source, "A::$x", &decl);

            registry
                .set_type(
                    handle,
                    DesiredType {
                        native_hint: Some("int".to_string()),
                        doc_type: "int".to_string(),
                        extended_doc_type: "positive-int".to_string(),
                        hint_compatible: true,
                        description: Some("the count".to_string()),
                    },
                )
                .unwrap();
            let second = DesiredType {
                native_hint: None,
                doc_type: "string".to_string(),
                extended_doc_type: String::new(),
                hint_compatible: false,
                description: None,
            };
            registry.set_type(handle, second.clone()).unwrap();

            assert_eq!(registry.get(handle).unwrap().desired(), Some(&second));
        }

        #[test]
        fn redundant_generics_are_stripped() {
            let source = "<?php\nclass A {\n    public $x;\n}\n";
            let decl = declare(source, "public $x;", None);
            let (mut registry, handle) = registry_for(source, "A::$x", &decl);
            registry
                .set_type(
                    handle,
                    DesiredType {
                        doc_type: "array".to_string(),
                        extended_doc_type: "array<mixed, mixed>|list<array<array-key, mixed>>"
                            .to_string(),
                        ..DesiredType::default()
                    },
                )
                .unwrap();
            let desired = registry.get(handle).unwrap().desired().unwrap();
            assert_eq!(desired.extended_doc_type, "array|list<array>");
        }

        #[test]
        fn reset_invalidates_handles() {
            let source = "<?php\nclass A {\n    public $x;\n}\n";
            let decl = declare(source, "public $x;", None);
            let (mut registry, handle) = registry_for(source, "A::$x", &decl);
            registry.reset();

            assert!(registry.is_empty());
            assert!(matches!(
                registry.set_type(handle, DesiredType::default()),
                Err(PatchError::StaleHandle {
                    handle_run: 0,
                    current_run: 1
                })
            ));
            assert!(registry.emit_patches("a.php").unwrap().is_empty());
        }
    }

    mod emission {
        use super::*;

        #[test]
        fn untouched_comment_less_property_emits_nothing() {
            let source = "<?php\nclass A {\n    public $x;\n}\n";
            let decl = declare(source, "public $x;", None);
            let (registry, _handle) = registry_for(source, "A::$x", &decl);
            assert!(registry.emit_patches("a.php").unwrap().is_empty());
        }

        #[test]
        fn unknown_file_emits_nothing() {
            assert!(PatchRegistry::new()
                .emit_patches("other.php")
                .unwrap()
                .is_empty());
        }

        #[test]
        fn insert_hint_and_docblock() {
            let source = "<?php\nclass A {\n    public $x;\n}\n";
            let decl = declare(source, "public $x;", None);
            let (mut registry, handle) = registry_for(source, "A::$x", &decl);
            registry
                .set_type(
                    handle,
                    DesiredType {
                        native_hint: Some("array".to_string()),
                        doc_type: "array<int, string>".to_string(),
                        extended_doc_type: "list<string>".to_string(),
                        hint_compatible: false,
                        description: None,
                    },
                )
                .unwrap();

            let edits = registry.emit_patches("a.php").unwrap();
            assert_eq!(edits.len(), 2);
            let result = apply_edits(source, &edits).unwrap();
            assert_eq!(
                result,
                "<?php\nclass A {\n    /**\n     * @var array<int, string>\n     * @psalm-var list<string>\n     */\n    public array $x;\n}\n"
            );
        }

        #[test]
        fn compatible_hint_without_comment_skips_docblock() {
            let source = "<?php\nclass A {\n    public $x;\n}\n";
            let decl = declare(source, "public $x;", None);
            let (mut registry, handle) = registry_for(source, "A::$x", &decl);
            registry
                .set_type(
                    handle,
                    DesiredType {
                        native_hint: Some("int".to_string()),
                        doc_type: "int".to_string(),
                        extended_doc_type: "int".to_string(),
                        hint_compatible: true,
                        description: None,
                    },
                )
                .unwrap();

            let edits = registry.emit_patches("a.php").unwrap();
            assert_eq!(edits, vec![TextEdit::insert(decl.variables[0].start - 1, " int")]);
            assert_eq!(
                apply_edits(source, &edits).unwrap(),
                "<?php\nclass A {\n    public int $x;\n}\n"
            );
        }

        #[test]
        fn replace_existing_hint() {
            let source = "<?php\nclass A {\n    /** @var int */\n    public int $x;\n}\n";
            let decl = declare(source, "public int $x;", Some("int"));
            let (mut registry, handle) = registry_for(source, "A::$x", &decl);
            registry
                .set_type(
                    handle,
                    DesiredType {
                        native_hint: Some("?int".to_string()),
                        doc_type: "int|null".to_string(),
                        extended_doc_type: "int|null".to_string(),
                        hint_compatible: true,
                        description: None,
                    },
                )
                .unwrap();

            let result = apply_edits(source, &registry.emit_patches("a.php").unwrap()).unwrap();
            assert_eq!(
                result,
                "<?php\nclass A {\n    /**\n     * @var int|null\n     */\n    public ?int $x;\n}\n"
            );
        }

        #[test]
        fn cleared_hint_is_removed() {
            let source = "<?php\nclass A {\n    public int $x;\n}\n";
            let decl = declare(source, "public int $x;", Some("int"));
            let (mut registry, handle) = registry_for(source, "A::$x", &decl);
            registry
                .set_type(
                    handle,
                    DesiredType {
                        native_hint: Some(String::new()),
                        doc_type: "int|string".to_string(),
                        extended_doc_type: "int|string".to_string(),
                        hint_compatible: false,
                        description: Some("mixed id".to_string()),
                    },
                )
                .unwrap();

            let result = apply_edits(source, &registry.emit_patches("a.php").unwrap()).unwrap();
            assert_eq!(
                result,
                "<?php\nclass A {\n    /**\n     * @var int|string mixed id\n     */\n    public  $x;\n}\n"
            );
        }

        #[test]
        fn unchanged_comment_is_reemitted_with_separator() {
            let source = "<?php\nclass A {\n    /** @var int */\n    public $x;\n}\n";
            let decl = declare(source, "public $x;", None);
            let (mut registry, handle) = registry_for(source, "A::$x", &decl);
            registry
                .set_type(
                    handle,
                    DesiredType {
                        native_hint: None,
                        doc_type: "int".to_string(),
                        extended_doc_type: "int".to_string(),
                        hint_compatible: false,
                        description: None,
                    },
                )
                .unwrap();

            let edits = registry.emit_patches("a.php").unwrap();
            assert_eq!(edits.len(), 1);
            assert_eq!(edits[0].text, "/** @var int */\n    ");
            assert_eq!(apply_edits(source, &edits).unwrap(), source);
        }

        #[test]
        fn emptied_comment_is_deleted() {
            let source = "<?php\nclass A {\n    /** */\n    public $x;\n}\n";
            let decl = declare(source, "public $x;", None);
            let (registry, _handle) = registry_for(source, "A::$x", &decl);

            let edits = registry.emit_patches("a.php").unwrap();
            assert_eq!(edits.len(), 1);
            assert_eq!(
                apply_edits(source, &edits).unwrap(),
                "<?php\nclass A {\n    public $x;\n}\n"
            );
        }

        #[test]
        fn extended_tag_kept_when_unchanged() {
            let source =
                "<?php\nclass A {\n    /**\n     * @var array\n     * @psalm-var list<int>\n     */\n    public $x;\n}\n";
            let decl = declare(source, "public $x;", None);
            let (mut registry, handle) = registry_for(source, "A::$x", &decl);
            registry
                .set_type(
                    handle,
                    DesiredType {
                        native_hint: None,
                        doc_type: "array".to_string(),
                        extended_doc_type: "list<int>".to_string(),
                        hint_compatible: false,
                        description: None,
                    },
                )
                .unwrap();

            let result = apply_edits(source, &registry.emit_patches("a.php").unwrap()).unwrap();
            assert_eq!(result, source);
        }

        #[test]
        fn hint_overlapping_neighbour_comment_is_rejected() {
            let source =
                "<?php\nclass A {\n    public $a;\n    /** @var int */\n    public $b;\n}\n";
            let comment_start = source.find("/**").unwrap();
            let mut decl_a = declare(source, "public $a;", None);
            decl_a.type_hint = Some(Span::new(comment_start + 2, comment_start + 6));
            let decl_b = declare(source, "public $b;", None);

            let sources = InMemorySources::new().with_file("a.php", source);
            let mut registry = PatchRegistry::new();
            let a = registry
                .get_or_create("a.php", "A::$a", &decl_a, &sources)
                .unwrap();
            registry
                .get_or_create("a.php", "A::$b", &decl_b, &sources)
                .unwrap();
            registry
                .set_type(
                    a,
                    DesiredType {
                        native_hint: Some("int".to_string()),
                        doc_type: "int".to_string(),
                        extended_doc_type: "int".to_string(),
                        hint_compatible: true,
                        description: None,
                    },
                )
                .unwrap();

            let err = registry.emit_patches("a.php").unwrap_err();
            assert!(matches!(
                err,
                PatchError::Edit(EditError::OverlappingEdits { .. })
            ));
        }

        #[test]
        fn hint_past_end_of_file_is_rejected() {
            let source = "<?php\nclass A {\n    public $x;\n}\n";
            let mut decl = declare(source, "public $x;", None);
            decl.type_hint = Some(Span::new(source.len() + 2, source.len() + 5));
            let (mut registry, handle) = registry_for(source, "A::$x", &decl);
            registry
                .set_type(
                    handle,
                    DesiredType {
                        native_hint: Some("int".to_string()),
                        doc_type: "int".to_string(),
                        extended_doc_type: "int".to_string(),
                        hint_compatible: true,
                        description: None,
                    },
                )
                .unwrap();

            let err = registry.emit_patches("a.php").unwrap_err();
            assert!(matches!(
                err,
                PatchError::Edit(EditError::SpanOutOfBounds { source_len, .. })
                    if source_len == source.len()
            ));
        }
    }
}
