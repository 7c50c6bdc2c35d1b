//! Documentation comment extraction: source file to raw comment blocks.
//!
//! Each language family has its own block delimiters. The gutter of every
//! inner line (`*` for C-style blocks, `#` for hash comments) is removed so
//! the lexer sees plain tag lines.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static RE_C_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*\*(.*?)\*/").unwrap());

static RE_C_GUTTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\*[ ]?").unwrap());

static RE_PY_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)"""(.*?)""""#).unwrap());

static RE_RUBY_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^=begin[^\n]*\n(.*?)^=end|^=pod[^\n]*\n(.*?)^=cut").unwrap()
});

static RE_HASH_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*#\*\*[ \t]*$").unwrap());

static RE_HASH_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*#[ ]?(.*)$").unwrap());

/// Comment syntax family of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// `/** ... */`: C, C++, Java, JS/TS, Go, Rust, PHP, Swift, Kotlin, ...
    Default,
    /// `""" ... """` docstrings.
    Python,
    /// `=begin ... =end` and `=pod ... =cut`.
    Ruby,
    /// A `#**` line followed by `#` comment lines (shell, Elixir scripts, ...).
    Hash,
}

impl Language {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("py") => Language::Python,
            Some("rb" | "pl" | "pm") => Language::Ruby,
            Some("sh" | "bash" | "exs" | "ex" | "cr" | "nim") => Language::Hash,
            _ => Language::Default,
        }
    }
}

/// Extract the raw documentation blocks of `source`, in file order.
pub fn find_blocks(source: &str, language: Language) -> Vec<String> {
    let source = source.replace("\r\n", "\n");
    match language {
        Language::Default => RE_C_BLOCK
            .captures_iter(&source)
            .map(|caps| RE_C_GUTTER.replace_all(&caps[1], "").into_owned())
            .collect(),
        Language::Python => RE_PY_BLOCK
            .captures_iter(&source)
            .map(|caps| caps[1].to_string())
            .collect(),
        Language::Ruby => RE_RUBY_BLOCK
            .captures_iter(&source)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().to_string())
            .collect(),
        Language::Hash => hash_blocks(&source),
    }
}

fn hash_blocks(source: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in source.lines() {
        if RE_HASH_OPEN.is_match(line) {
            if let Some(lines) = current.take() {
                blocks.push(lines.join("\n"));
            }
            current = Some(Vec::new());
            continue;
        }
        if let Some(ref mut lines) = current {
            match RE_HASH_LINE.captures(line) {
                Some(caps) => lines.push(caps.get(1).map(|m| m.as_str()).unwrap_or("")),
                None => {
                    blocks.push(lines.join("\n"));
                    current = None;
                }
            }
        }
    }
    if let Some(lines) = current {
        blocks.push(lines.join("\n"));
    }
    blocks
}
