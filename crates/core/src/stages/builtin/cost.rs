//! Cost estimation: prices the engagement from the complexity rating and
//! feature count.

use super::{cleaned, format_usd, push_bullets, Complexity, COST_ESTIMATION};
use crate::stages::base::{StageContext, StageError, StageOutput, StageUnit};
use async_trait::async_trait;
use std::fmt::Write;

const PER_FEATURE: u64 = 5_000;

/// Share of the total per line item, in percent. Sums to 100.
const BREAKDOWN: [(&str, u64); 4] = [
    ("Core Development", 60),
    ("Design & UX", 20),
    ("Testing & QA", 12),
    ("Deployment", 8),
];

pub struct CostEstimation;

impl CostEstimation {
    fn base(complexity: Complexity) -> u64 {
        match complexity {
            Complexity::Low => 25_000,
            Complexity::Medium => 60_000,
            Complexity::High => 120_000,
        }
    }

    /// Total investment for the given rating and feature count.
    pub fn estimate(complexity: Complexity, feature_count: usize) -> u64 {
        Self::base(complexity) + PER_FEATURE * feature_count as u64
    }
}

#[async_trait]
impl StageUnit for CostEstimation {
    fn name(&self) -> &str {
        COST_ESTIMATION
    }

    fn title(&self) -> &str {
        "Investment"
    }

    async fn execute(&self, context: &StageContext) -> Result<StageOutput, StageError> {
        let complexity = Complexity::for_context(context);
        let feature_count = cleaned(&context.brief.features).len();
        let total = Self::estimate(complexity, feature_count);

        let mut out = String::new();
        let _ = writeln!(out, "Total estimated investment: **{}**.\n", format_usd(total));

        let budget = context.brief.budget_range.trim();
        if !budget.is_empty() {
            let _ = writeln!(out, "Client budget range: {budget}.\n");
        }

        let lines: Vec<String> = BREAKDOWN
            .iter()
            .map(|(item, share)| format!("{item}: {}", format_usd(total * share / 100)))
            .collect();
        push_bullets(&mut out, "Development Investment", &lines);

        push_bullets(
            &mut out,
            "Ongoing Support",
            &[
                format!("Monthly Maintenance: {}", format_usd(total / 50)),
                "Security Patches: Included".to_string(),
            ],
        );
        push_bullets(
            &mut out,
            "Payment Schedule",
            &[
                "30% upon project initiation",
                "30% at development milestone",
                "30% at testing completion",
                "10% at project completion",
            ],
        );

        Ok(StageOutput::new(out).with_attribute("total_usd", total))
    }
}
