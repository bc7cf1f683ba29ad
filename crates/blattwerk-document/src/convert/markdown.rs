// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Markdown output.

/// Heading every converted document starts with.
pub const HEADING: &str = "# PDF Content";

/// Each non-blank line becomes its own paragraph; blank lines pass through.
pub fn render(text: &str) -> String {
    let mut out = String::with_capacity(HEADING.len() + text.len() * 2);
    out.push_str(HEADING);
    out.push_str("\n\n");

    // Trailing empty lines carry no content.
    for line in text.trim_end_matches('\n').split('\n') {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            out.push_str(line);
            out.push_str("\n\n");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_become_paragraphs() {
        assert_eq!(render("alpha\nbeta\n"), "# PDF Content\n\nalpha\n\nbeta\n\n");
    }

    #[test]
    fn blank_lines_pass_through() {
        assert_eq!(render("alpha\n  \nbeta"), "# PDF Content\n\nalpha\n\n\nbeta\n\n");
    }

    #[test]
    fn lines_are_not_trimmed() {
        assert_eq!(render("  indented"), "# PDF Content\n\n  indented\n\n");
    }
}
