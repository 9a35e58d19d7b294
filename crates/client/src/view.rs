//! Terminal rendering of progress snapshots.

use crate::poller::ProgressView;
use colored::Colorize;
use pg_protocol::run_models::ProgressSnapshot;
use std::io::Write;

const BAR_WIDTH: usize = 30;

/// Prints progress as it changes: a bar line whenever percent or status
/// moves, and one line per newly completed stage.
pub struct TerminalView<W: Write + Send> {
    out: W,
    printed_steps: usize,
    last_line: Option<String>,
    errors_shown: usize,
}

impl TerminalView<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed_steps: 0,
            last_line: None,
            errors_shown: 0,
        }
    }

    /// How many times an error was displayed.
    pub fn errors_shown(&self) -> usize {
        self.errors_shown
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// `[#########---------------------]  30%`
pub fn progress_bar(percent: u8) -> String {
    let percent = usize::from(percent.min(100));
    let filled = percent * BAR_WIDTH / 100;
    format!(
        "[{}{}] {percent:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}

impl<W: Write + Send> ProgressView for TerminalView<W> {
    fn render(&mut self, snapshot: &ProgressSnapshot) {
        for step in snapshot.completed_steps.iter().skip(self.printed_steps) {
            let _ = writeln!(self.out, "  {} {step}", "✓".green());
        }
        self.printed_steps = self.printed_steps.max(snapshot.completed_steps.len());

        let mut line = progress_bar(snapshot.progress);
        if !snapshot.status.is_empty() {
            line.push(' ');
            line.push_str(&snapshot.status);
        }
        if self.last_line.as_deref() != Some(line.as_str()) {
            let _ = writeln!(self.out, "{line}");
            self.last_line = Some(line);
        }
        let _ = self.out.flush();
    }

    fn show_error(&mut self, message: &str) {
        self.errors_shown += 1;
        let _ = writeln!(self.out, "{} {message}", "Error:".red().bold());
        let _ = self.out.flush();
    }
}
