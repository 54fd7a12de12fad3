//! Documentation comment model.
//!
//! Just enough of a `/** ... */` parser for rewriting property type tags:
//! a free-text description followed by `@tag value` lines, where a value
//! may continue over several lines. Tag values are kept verbatim and in
//! order of first appearance.

use indexmap::IndexMap;

/// A parsed documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocblock {
    /// Text before the first tag, with line breaks preserved.
    pub description: String,
    /// Tag values keyed by tag name (without `@`).
    pub tags: IndexMap<String, Vec<String>>,
}

impl ParsedDocblock {
    /// An empty docblock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse comment text, including its `/**` and `*/` delimiters.
    pub fn parse(text: &str) -> Self {
        let body = text.trim();
        let body = body.strip_prefix("/**").unwrap_or(body);
        let body = body.strip_suffix("*/").unwrap_or(body);

        let mut docblock = ParsedDocblock::new();
        let mut description: Vec<&str> = Vec::new();
        let mut open_tag: Option<String> = None;

        for raw in body.lines() {
            let line = strip_gutter(raw);

            if let Some(tag_line) = line.strip_prefix('@') {
                let (name, value) = match tag_line.split_once(char::is_whitespace) {
                    Some((name, value)) => (name, value.trim()),
                    None => (tag_line, ""),
                };
                if name.is_empty() {
                    continue;
                }
                docblock
                    .tags
                    .entry(name.to_string())
                    .or_default()
                    .push(value.to_string());
                open_tag = Some(name.to_string());
                continue;
            }

            match &open_tag {
                Some(name) => {
                    if line.is_empty() {
                        continue;
                    }
                    if let Some(value) = docblock.tags.get_mut(name).and_then(|v| v.last_mut()) {
                        value.push('\n');
                        value.push_str(line);
                    }
                }
                None => description.push(line),
            }
        }

        docblock.description = description.join("\n").trim().to_string();
        docblock
    }

    /// The first value of `name`.
    pub fn first_tag(&self, name: &str) -> Option<&str> {
        self.tags
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Replace every value of `name` with `value`. A new tag goes last.
    pub fn set_tag(&mut self, name: &str, value: impl Into<String>) {
        self.tags.insert(name.to_string(), vec![value.into()]);
    }

    /// True if there is neither a description nor any tag.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.description.trim().is_empty()
    }

    /// Render the docblock with `indentation` before each continuation line.
    ///
    /// The result starts at `/**` and ends with a line break plus
    /// `indentation`, ready to sit in front of the declaration it documents.
    pub fn render(&self, indentation: &str) -> String {
        let mut out = String::from("/**\n");

        let has_description = !self.description.trim().is_empty();
        if has_description {
            for line in self.description.lines() {
                push_line(&mut out, indentation, line);
            }
        }

        if !self.tags.is_empty() {
            if has_description {
                push_line(&mut out, indentation, "");
            }
            for (name, values) in &self.tags {
                for value in values {
                    let mut lines = value.lines();
                    let first = lines.next().unwrap_or("");
                    if first.is_empty() {
                        push_line(&mut out, indentation, &format!("@{}", name));
                    } else {
                        push_line(&mut out, indentation, &format!("@{} {}", name, first));
                    }
                    for line in lines {
                        push_line(&mut out, indentation, line);
                    }
                }
            }
        }

        out.push_str(indentation);
        out.push_str(" */\n");
        out.push_str(indentation);
        out
    }
}

/// Strip leading whitespace and the `*` gutter, keeping text verbatim.
fn strip_gutter(raw: &str) -> &str {
    let line = raw.trim_start();
    let line = match line.strip_prefix('*') {
        Some(rest) if !rest.starts_with('/') => rest,
        _ => line,
    };
    line.strip_prefix(' ').unwrap_or(line).trim_end()
}

fn push_line(out: &mut String, indentation: &str, text: &str) {
    out.push_str(indentation);
    out.push_str(" *");
    if !text.trim().is_empty() {
        out.push(' ');
        out.push_str(text);
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse {
        use super::*;

        #[test]
        fn single_line() {
            let doc = ParsedDocblock::parse("/** @var int */");
            assert_eq!(doc.first_tag("var"), Some("int"));
            assert!(doc.description.is_empty());
        }

        #[test]
        fn description_and_tags() {
            let doc = ParsedDocblock::parse(
                "/**\n     * The user name.\n     *\n     * @var string\n     * @psalm-var non-empty-string\n     */",
            );
            assert_eq!(doc.description, "The user name.");
            assert_eq!(doc.first_tag("var"), Some("string"));
            assert_eq!(doc.first_tag("psalm-var"), Some("non-empty-string"));
            assert_eq!(
                doc.tags.keys().collect::<Vec<_>>(),
                vec!["var", "psalm-var"]
            );
        }

        #[test]
        fn multi_line_description_is_kept() {
            let doc = ParsedDocblock::parse("/**\n * First line.\n *\n * Second paragraph.\n */");
            assert_eq!(doc.description, "First line.\n\nSecond paragraph.");
        }

        #[test]
        fn continuation_lines_join_tag_value() {
            let doc = ParsedDocblock::parse(
                "/**\n * @var array{\n *   a: int,\n *   b: string\n * }\n */",
            );
            assert_eq!(
                doc.first_tag("var"),
                Some("array{\n  a: int,\n  b: string\n}")
            );
        }

        #[test]
        fn repeated_tags_accumulate() {
            let doc = ParsedDocblock::parse("/**\n * @see A\n * @see B\n * @deprecated\n */");
            assert_eq!(doc.tags["see"], vec!["A", "B"]);
            assert_eq!(doc.first_tag("deprecated"), Some(""));
        }

        #[test]
        fn empty_comment() {
            assert!(ParsedDocblock::parse("/** */").is_empty());
            assert!(ParsedDocblock::parse("/**\n */").is_empty());
        }
    }

    mod render {
        use super::*;

        #[test]
        fn tags_only() {
            let mut doc = ParsedDocblock::new();
            doc.set_tag("var", "int");
            assert_eq!(doc.render("    "), "/**\n     * @var int\n     */\n    ");
        }

        #[test]
        fn description_then_tags() {
            let mut doc = ParsedDocblock::parse("/**\n * The id.\n */");
            doc.set_tag("var", "int");
            doc.set_tag("psalm-var", "positive-int");
            assert_eq!(
                doc.render("  "),
                "/**\n   * The id.\n   *\n   * @var int\n   * @psalm-var positive-int\n   */\n  "
            );
        }

        #[test]
        fn set_tag_keeps_position() {
            let mut doc = ParsedDocblock::parse("/**\n * @var int\n * @internal\n */");
            doc.set_tag("var", "string");
            assert_eq!(doc.render(""), "/**\n * @var string\n * @internal\n */\n");
        }

        #[test]
        fn multi_line_value() {
            let mut doc = ParsedDocblock::new();
            doc.set_tag("var", "array{\n  a: int\n}");
            assert_eq!(
                doc.render(""),
                "/**\n * @var array{\n *   a: int\n * }\n */\n"
            );
        }
    }
}
