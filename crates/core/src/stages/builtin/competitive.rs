//! Competitive research: positions the client against the competitors named
//! in the brief.

use super::{cleaned, push_bullets, COMPETITIVE_RESEARCH};
use crate::stages::base::{StageContext, StageError, StageOutput, StageUnit};
use async_trait::async_trait;
use std::fmt::Write;

pub struct CompetitiveResearch;

#[async_trait]
impl StageUnit for CompetitiveResearch {
    fn name(&self) -> &str {
        COMPETITIVE_RESEARCH
    }

    fn title(&self) -> &str {
        "Competitive Research"
    }

    async fn execute(&self, context: &StageContext) -> Result<StageOutput, StageError> {
        let brief = &context.brief;
        let competitors = cleaned(&brief.competitors);
        let selling_points = cleaned(&brief.unique_selling_points);
        let industry = match brief.industry.trim() {
            "" => "its market",
            industry => industry,
        };

        let mut out = String::new();
        let _ = writeln!(out, "### Market Landscape\n");
        if competitors.is_empty() {
            let _ = writeln!(
                out,
                "No competitors were named in the brief. A landscape review of {industry} \
                 is scheduled for the discovery phase.\n"
            );
        } else {
            let _ = writeln!(
                out,
                "{} competitors were reviewed for {}:\n",
                competitors.len(),
                brief.display_name()
            );
            for competitor in &competitors {
                let _ = writeln!(out, "* {competitor}");
            }
            out.push('\n');
        }

        if let Some(position) = brief
            .market_position
            .as_deref()
            .map(str::trim)
            .filter(|position| !position.is_empty())
        {
            let _ = writeln!(out, "Current market position: **{position}**.\n");
        }

        if selling_points.is_empty() {
            push_bullets(
                &mut out,
                "Differentiation Strategy",
                &[
                    "Faster delivery through an iterative release plan",
                    "Tailored user experience for the target audience",
                    "Measurable outcomes tied to business goals",
                ],
            );
        } else {
            push_bullets(&mut out, "Differentiation Strategy", &selling_points);
        }

        Ok(StageOutput::new(out).with_attribute("competitor_count", competitors.len()))
    }
}
