//! Markdown to terminal text.
//!
//! Handles the subset proposals use: headings, bullet lists, `**bold**`
//! spans and horizontal rules. Anything else passes through unchanged.

use colored::Colorize;

const RULE_WIDTH: usize = 60;

/// Render `markdown` as ANSI-styled text for a terminal.
pub fn render_terminal(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());

    for line in markdown.lines() {
        let line = line.trim_end();
        let rendered = if let Some(text) = line.strip_prefix("# ") {
            let title = text.trim().to_uppercase();
            format!("{}\n{}", title.bold().underline(), "=".repeat(title.chars().count()))
        } else if let Some(text) = line.strip_prefix("## ") {
            format!("{}", inline(text.trim()).bold().cyan())
        } else if let Some(text) = line.strip_prefix("### ") {
            format!("{}", inline(text.trim()).bold())
        } else if line == "---" || line == "***" {
            "─".repeat(RULE_WIDTH).dimmed().to_string()
        } else if let Some(text) = line.strip_prefix("* ").or_else(|| line.strip_prefix("- ")) {
            format!("  • {}", inline(text))
        } else {
            inline(line)
        };

        out.push_str(&rendered);
        out.push('\n');
    }

    out
}

/// Style `**bold**` spans. An unmatched `**` is kept as is.
fn inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&after[..end].bold().to_string());
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}
