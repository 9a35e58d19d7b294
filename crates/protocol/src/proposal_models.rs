//! The assembled proposal document.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One section of a proposal, produced by a single stage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ProposalSection {
    /// Name of the stage that produced this section.
    pub stage: String,

    /// Section heading.
    pub title: String,

    /// Markdown body, without the heading.
    pub content: String,
}

/// A complete proposal: a title plus sections in stage order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct Proposal {
    pub title: String,
    pub sections: Vec<ProposalSection>,
}

impl Proposal {
    /// Render the whole document as Markdown.
    ///
    /// The title becomes a level-one heading and each section a level-two
    /// heading followed by its body.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n", self.title);
        for section in &self.sections {
            out.push_str(&format!("\n## {}\n\n", section.title));
            out.push_str(section.content.trim_end());
            out.push('\n');
        }
        out
    }
}
