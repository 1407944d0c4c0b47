//! Deterministic rewrite of raw release text into normalized change lines.
use regex::Regex;
use std::sync::LazyLock;

/// Sentence every normalized change line starts with.
pub const CHANGE_PREFIX: &str =
    "This change improves system behavior related to:";

/// One or more `-`, `*` or `+` bullets, each followed by whitespace or the end
/// of the line, or a line made only of marker characters (`---`, `***`).
/// Markers glued to text (`**bold**`, `-5%`, `--flag`) are content.
static LIST_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*+](?:\s+|$))+|^[-*+\s]+$").unwrap()
});

/// Ordered, normalized change lines derived one-to-one from the non-empty
/// lines of a release body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    lines: Vec<String>,
}

impl ChangeSet {
    /// Normalize `raw` into a change set. Input order is preserved and lines
    /// that are empty once list markers and whitespace are stripped are
    /// dropped.
    pub fn interpret(raw: &str) -> Self {
        let lines = raw
            .lines()
            .map(strip_list_marker)
            .filter(|line| !line.is_empty())
            .map(|line| format!("{CHANGE_PREFIX} {}.", line.to_lowercase()))
            .collect();

        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// One markdown bullet per change, newline terminated.
    pub fn to_markdown(&self) -> String {
        self.lines.iter().map(|line| format!("- {line}\n")).collect()
    }
}

/// Whether a release body carries no content worth documenting.
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

fn strip_list_marker(line: &str) -> &str {
    let trimmed = line.trim();
    match LIST_MARKER_REGEX.find(trimmed) {
        Some(marker) => trimmed[marker.end()..].trim(),
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_bulleted_lines() {
        let changes =
            ChangeSet::interpret("- Fixed login bug\n- Improved latency");

        assert_eq!(
            changes.lines(),
            &[
                "This change improves system behavior related to: fixed login bug.",
                "This change improves system behavior related to: improved latency.",
            ]
        );
    }

    #[test]
    fn drops_empty_lines_and_preserves_order() {
        let raw =
            "\n  * Third party update\n\n\t+ Second\r\nplain first\n   \n";
        let changes = ChangeSet::interpret(raw);

        assert_eq!(changes.len(), 3);
        assert!(changes.lines()[0].ends_with(": third party update."));
        assert!(changes.lines()[1].ends_with(": second."));
        assert!(changes.lines()[2].ends_with(": plain first."));
    }

    #[test]
    fn line_count_matches_non_empty_input_lines() {
        let raw = "## What's Changed\n\
                   * Static search bars by @user1 in #245\n\n\
                   **Full Changelog**: v1.4.0...v1.5.0\n";
        let non_empty = raw.lines().filter(|l| !l.trim().is_empty()).count();

        assert_eq!(ChangeSet::interpret(raw).len(), non_empty);
    }

    #[test]
    fn passes_through_other_characters() {
        let changes = ChangeSet::interpret("- Handle <script> & {{braces}}");
        assert_eq!(
            changes.lines()[0],
            "This change improves system behavior related to: handle <script> & {{braces}}."
        );
    }

    #[test]
    fn bare_markers_are_dropped() {
        let changes = ChangeSet::interpret("-\n- - nested marker\n---");
        assert_eq!(changes.len(), 1);
        assert!(changes.lines()[0].ends_with(": nested marker."));
    }

    #[test]
    fn keeps_markers_attached_to_text() {
        let changes = ChangeSet::interpret(
            "**Full Changelog**: https://x/compare/a...b\n\
             -5% latency\n\
             --dry-run flag added\n\
             * **Breaking**: drop v1 api",
        );

        assert_eq!(
            changes.lines(),
            &[
                format!("{CHANGE_PREFIX} **full changelog**: https://x/compare/a...b."),
                format!("{CHANGE_PREFIX} -5% latency."),
                format!("{CHANGE_PREFIX} --dry-run flag added."),
                format!("{CHANGE_PREFIX} **breaking**: drop v1 api."),
            ]
        );
    }

    #[test]
    fn renders_markdown_bullets() {
        let changes = ChangeSet::interpret("- A\n- B");
        assert_eq!(
            changes.to_markdown(),
            "- This change improves system behavior related to: a.\n- This change improves system behavior related to: b.\n"
        );
    }

    #[test]
    fn is_deterministic() {
        let raw = "- Fixed login bug\n- Improved latency";
        assert_eq!(ChangeSet::interpret(raw), ChangeSet::interpret(raw));
    }

    #[test]
    fn detects_blank_bodies() {
        assert!(is_blank(""));
        assert!(is_blank(" \n\t \r\n"));
        assert!(!is_blank("- something"));
    }
}
