//! Restricted TOML-subset tokenizer (spec §6), grounded in
//! `original_source/src/common/toml_parser.c`: that scanner walks the
//! manifest character by character, recognizing exactly section headers,
//! one level of array-of-tables nesting (`[[bin]]` / `[[bin.dep]]`),
//! string-valued `key = "value"` pairs, and `#` comments. The grammar here
//! is line-oriented rather than character-oriented — every construct the
//! manifest format allows starts and ends on one line — so a `str::lines`
//! walk is the natural Rust shape for the same recognizer, not a
//! simplification of what it accepts.
//!
//! Deliberately absent, matching the original: numbers, booleans, dates,
//! inline tables, multi-line strings, and dotted *keys* (`a.b = "x"`) are
//! all parse errors rather than silently accepted or coerced.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Default, Clone)]
pub struct Table {
    fields: HashMap<String, String>,
}

impl Table {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// One entry of an array-of-tables section (`[[name]]`), plus whatever
/// nested array-of-tables entries (`[[name.child]]`) followed it before the
/// next `[[name]]` header. The manifest format only ever nests one level
/// deep (`bin.dep`), so `nested` need not recurse further.
#[derive(Debug, Default, Clone)]
pub struct ArrayEntry {
    pub table: Table,
    nested: HashMap<String, Vec<Table>>,
}

impl ArrayEntry {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.table.get(key)
    }

    pub fn nested(&self, name: &str) -> &[Table] {
        self.nested.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Default)]
pub struct Document {
    sections: HashMap<String, Table>,
    array_sections: HashMap<String, Vec<ArrayEntry>>,
}

impl Document {
    pub fn section(&self, name: &str) -> Option<&Table> {
        self.sections.get(name)
    }

    pub fn array_section(&self, name: &str) -> &[ArrayEntry] {
        self.array_sections.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TomlError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for TomlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for TomlError {}

enum Current {
    None,
    Section(String),
    Array(String),
    Nested { parent: String, child: String },
}

pub fn parse(input: &str) -> Result<Document, TomlError> {
    let mut doc = Document::default();
    let mut current = Current::None;

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix("[[").and_then(|s| s.strip_suffix("]]")) {
            let name = header.trim();
            current = open_array_header(&mut doc, name, line_no)?;
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let name = header.trim();
            if name.contains('.') {
                return Err(TomlError {
                    line: line_no,
                    message: format!("dotted section name '[{name}]' is not supported"),
                });
            }
            doc.sections.entry(name.to_string()).or_default();
            current = Current::Section(name.to_string());
            continue;
        }

        let (key, value) = parse_key_value(line, line_no)?;
        insert_pair(&mut doc, &current, key, value, line_no)?;
    }

    Ok(doc)
}

fn open_array_header(doc: &mut Document, name: &str, line_no: usize) -> Result<Current, TomlError> {
    match name.split_once('.') {
        Some((parent, child)) => {
            if child.contains('.') {
                return Err(TomlError {
                    line: line_no,
                    message: format!("'[[{name}]]' nests deeper than this format supports"),
                });
            }
            let entries = doc.array_sections.entry(parent.to_string()).or_default();
            let Some(last) = entries.last_mut() else {
                return Err(TomlError {
                    line: line_no,
                    message: format!("'[[{name}]]' has no preceding '[[{parent}]]' entry to attach to"),
                });
            };
            last.nested.entry(child.to_string()).or_default().push(Table::default());
            Ok(Current::Nested { parent: parent.to_string(), child: child.to_string() })
        }
        None => {
            doc.array_sections.entry(name.to_string()).or_default().push(ArrayEntry::default());
            Ok(Current::Array(name.to_string()))
        }
    }
}

fn insert_pair(doc: &mut Document, current: &Current, key: String, value: String, line_no: usize) -> Result<(), TomlError> {
    match current {
        Current::Section(name) => {
            doc.sections.entry(name.clone()).or_default().fields.insert(key, value);
        }
        Current::Array(name) => {
            let entry = doc
                .array_sections
                .get_mut(name)
                .and_then(|v| v.last_mut())
                .expect("array header always pushes an entry before any key is seen");
            entry.table.fields.insert(key, value);
        }
        Current::Nested { parent, child } => {
            let table = doc
                .array_sections
                .get_mut(parent)
                .and_then(|v| v.last_mut())
                .and_then(|e| e.nested.get_mut(child))
                .and_then(|v| v.last_mut())
                .expect("nested header always pushes a table before any key is seen");
            table.fields.insert(key, value);
        }
        Current::None => {
            return Err(TomlError {
                line: line_no,
                message: format!("key-value pair '{key} = ...' outside of any section"),
            });
        }
    }
    Ok(())
}

fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == '#' {
            return &line[..i];
        }
    }
    line
}

fn parse_key_value(line: &str, line_no: usize) -> Result<(String, String), TomlError> {
    let (key, rest) = line.split_once('=').ok_or_else(|| TomlError {
        line: line_no,
        message: format!("expected 'key = \"value\"', found '{line}'"),
    })?;
    let key = key.trim();
    let key_valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !key_valid {
        return Err(TomlError {
            line: line_no,
            message: format!("'{key}' is not a valid key (dotted keys are not supported)"),
        });
    }
    let value = parse_string_literal(rest.trim(), line_no)?;
    Ok((key.to_string(), value))
}

fn parse_string_literal(raw: &str, line_no: usize) -> Result<String, TomlError> {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| TomlError {
            line: line_no,
            message: format!("expected a quoted string value, found '{raw}' (numbers, booleans and bare words are not supported)"),
        })?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => {
                return Err(TomlError {
                    line: line_no,
                    message: format!("unsupported escape sequence '\\{other}'"),
                })
            }
            None => {
                return Err(TomlError {
                    line: line_no,
                    message: "dangling escape at end of string".to_string(),
                })
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_project_section() {
        let doc = parse("[project]\nname = \"shiro_demo\"\n").unwrap();
        assert_eq!(doc.section("project").unwrap().get("name"), Some("shiro_demo"));
    }

    #[test]
    fn parses_array_of_tables_with_nested_deps() {
        let doc = parse(
            "[[bin]]\nname = \"app\"\nsrc = \"src/app\"\n[[bin.dep]]\nname = \"core\"\n[[bin.dep]]\nname = \"util\"\n",
        )
        .unwrap();
        let bins = doc.array_section("bin");
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].get("name"), Some("app"));
        let deps = bins[0].nested("dep");
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].get("name"), Some("core"));
        assert_eq!(deps[1].get("name"), Some("util"));
    }

    #[test]
    fn comment_inside_string_is_not_stripped() {
        let doc = parse("[project]\nname = \"not # a comment\"\n").unwrap();
        assert_eq!(doc.section("project").unwrap().get("name"), Some("not # a comment"));
    }

    #[test]
    fn rejects_unquoted_values() {
        let err = parse("[project]\nname = 5\n").unwrap_err();
        assert!(err.message.contains("quoted string"));
    }

    #[test]
    fn rejects_dotted_section_header() {
        let err = parse("[a.b]\nx = \"1\"\n").unwrap_err();
        assert!(err.message.contains("dotted"));
    }

    #[test]
    fn escapes_are_decoded() {
        let doc = parse("[project]\nname = \"line1\\nline2\\ttabbed\"\n").unwrap();
        assert_eq!(doc.section("project").unwrap().get("name"), Some("line1\nline2\ttabbed"));
    }
}
