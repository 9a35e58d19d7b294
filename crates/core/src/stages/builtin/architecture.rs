//! Architecture design: proposes a technical architecture sized to the
//! complexity rating from requirements analysis.

use super::{push_bullets, Complexity, ARCHITECTURE_DESIGN};
use crate::stages::base::{StageContext, StageError, StageOutput, StageUnit};
use async_trait::async_trait;
use std::fmt::Write;

pub struct ArchitectureDesign;

#[async_trait]
impl StageUnit for ArchitectureDesign {
    fn name(&self) -> &str {
        ARCHITECTURE_DESIGN
    }

    fn title(&self) -> &str {
        "Architecture Design"
    }

    async fn execute(&self, context: &StageContext) -> Result<StageOutput, StageError> {
        let complexity = Complexity::for_context(context);
        let project_type = context.brief.project_type.trim();

        let (summary, core): (&str, &[&str]) = match complexity {
            Complexity::Low => (
                "A compact, single-deployment architecture keeps delivery fast and hosting \
                 costs low.",
                &[
                    "Modular monolith with a clear domain layer",
                    "Managed relational database",
                    "Server-rendered pages with progressive enhancement",
                    "Single-region cloud hosting",
                ],
            ),
            Complexity::Medium => (
                "A service-oriented architecture separates the busiest workloads while \
                 keeping operations simple.",
                &[
                    "API-first backend with a small set of services",
                    "Managed relational database with read replicas",
                    "Single-page frontend consuming the public API",
                    "Containerized deployment",
                ],
            ),
            Complexity::High => (
                "A cloud-native architecture lets independent teams scale and release \
                 their parts of the platform separately.",
                &[
                    "Microservices behind an API gateway",
                    "Event streaming between services",
                    "Polyglot persistence per service",
                    "Container orchestration across regions",
                ],
            ),
        };

        let mut out = String::new();
        if project_type.is_empty() {
            let _ = writeln!(out, "{summary}\n");
        } else {
            let _ = writeln!(out, "Proposed architecture for the {project_type}. {summary}\n");
        }

        push_bullets(&mut out, "Core Architecture", core);
        push_bullets(
            &mut out,
            "Security",
            &[
                "End-to-end encryption",
                "Multi-factor authentication",
                "Regular security audits",
            ],
        );
        push_bullets(
            &mut out,
            "Scalability",
            &["Horizontal scaling", "Load balancing", "Caching layers"],
        );

        Ok(StageOutput::new(out).with_attribute("complexity", complexity.as_str()))
    }
}
