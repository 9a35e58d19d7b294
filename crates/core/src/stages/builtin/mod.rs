//! Built-in proposal stages.
//!
//! These compose their sections from the brief with fixed text templates.
//! Deployments that call out to a language model or research tool swap in
//! their own [`StageUnit`] under the same name.

mod architecture;
mod competitive;
mod cost;
mod mockups;
mod requirements;

pub use architecture::ArchitectureDesign;
pub use competitive::CompetitiveResearch;
pub use cost::CostEstimation;
pub use mockups::MockupGeneration;
pub use requirements::RequirementsAnalysis;

use crate::stages::base::{StageContext, StageUnit};
use std::fmt::Write;
use std::sync::Arc;

pub const REQUIREMENTS_ANALYSIS: &str = "requirements-analysis";
pub const ARCHITECTURE_DESIGN: &str = "architecture-design";
pub const MOCKUP_GENERATION: &str = "mockup-generation";
pub const COST_ESTIMATION: &str = "cost-estimation";
pub const COMPETITIVE_RESEARCH: &str = "competitive-research";

/// One instance of every built-in stage.
pub fn all() -> Vec<Arc<dyn StageUnit>> {
    vec![
        Arc::new(RequirementsAnalysis),
        Arc::new(CompetitiveResearch),
        Arc::new(ArchitectureDesign),
        Arc::new(MockupGeneration),
        Arc::new(CostEstimation),
    ]
}

/// Delivery complexity derived from the requested feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn from_feature_count(count: usize) -> Self {
        match count {
            0..=3 => Complexity::Low,
            4..=7 => Complexity::Medium,
            _ => Complexity::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Complexity::Low),
            "medium" => Some(Complexity::Medium),
            "high" => Some(Complexity::High),
            _ => None,
        }
    }

    /// Rating published by requirements analysis, or recomputed from the
    /// brief when that stage did not run.
    pub fn for_context(context: &StageContext) -> Self {
        context
            .attribute(REQUIREMENTS_ANALYSIS, "complexity")
            .and_then(|value| value.as_str())
            .and_then(Complexity::parse)
            .unwrap_or_else(|| {
                Complexity::from_feature_count(cleaned(&context.brief.features).len())
            })
    }
}

/// Non-blank, trimmed entries.
pub(crate) fn cleaned(items: &[String]) -> Vec<&str> {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Append a `### heading` followed by one bullet per item.
pub(crate) fn push_bullets<S: AsRef<str>>(out: &mut String, heading: &str, items: &[S]) {
    let _ = writeln!(out, "### {heading}\n");
    for item in items {
        let _ = writeln!(out, "* {}", item.as_ref());
    }
    out.push('\n');
}

/// `125000` -> `$125,000`
pub(crate) fn format_usd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}")
}
