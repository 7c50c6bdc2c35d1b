//! Small text helpers shared by the tag plugins.

/// Strip the indentation common to all non-blank lines.
///
/// Compares the lexicographically smallest and largest non-blank lines and
/// removes their shared leading whitespace from every line.
pub fn unindent(text: &str) -> String {
    let mut non_blank: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if non_blank.is_empty() {
        return text.to_string();
    }
    non_blank.sort_unstable();
    let first = non_blank[0];
    let last = non_blank[non_blank.len() - 1];

    let common = first
        .chars()
        .zip(last.chars())
        .take_while(|(a, b)| a.is_whitespace() && a == b)
        .map(|(a, _)| a.len_utf8())
        .sum::<usize>();
    if common == 0 {
        return text.to_string();
    }

    text.split('\n')
        .map(|line| line.get(common..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse runs of whitespace into `_` (`@apiGroup User Admin` -> `User_Admin`).
pub fn underscore_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join("_")
}
