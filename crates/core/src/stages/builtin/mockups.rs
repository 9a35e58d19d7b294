//! Mockup generation: plans the page set and visual direction.

use super::{cleaned, push_bullets, MOCKUP_GENERATION};
use crate::stages::base::{StageContext, StageError, StageOutput, StageUnit};
use async_trait::async_trait;
use std::fmt::Write;

const MAX_FEATURE_PAGES: usize = 6;

pub struct MockupGeneration;

#[async_trait]
impl StageUnit for MockupGeneration {
    fn name(&self) -> &str {
        MOCKUP_GENERATION
    }

    fn title(&self) -> &str {
        "Design Mockups"
    }

    async fn execute(&self, context: &StageContext) -> Result<StageOutput, StageError> {
        let brief = &context.brief;

        let mut pages = vec!["Home".to_string()];
        pages.extend(
            cleaned(&brief.features)
                .into_iter()
                .take(MAX_FEATURE_PAGES)
                .map(|feature| format!("{feature} page")),
        );
        pages.push("Contact".to_string());

        let audience = match brief.target_audience.trim() {
            "" => "the client's customers",
            audience => audience,
        };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "Wireframes and high-fidelity mockups cover {} screens.\n",
            pages.len()
        );
        push_bullets(&mut out, "Screens", &pages);
        push_bullets(
            &mut out,
            "Visual Direction",
            &[
                format!("Layout and typography tuned for {audience}"),
                "Responsive layouts for mobile, tablet and desktop".to_string(),
                "Accessible color contrast (WCAG AA)".to_string(),
            ],
        );

        Ok(StageOutput::new(out).with_attribute("page_count", pages.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_protocol::brief_models::ClientBrief;
    use std::sync::Arc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_one_screen_per_feature_plus_fixed_pages() {
        let brief = ClientBrief {
            features: vec!["Catalog".to_string(), "Checkout".to_string()],
            target_audience: "young professionals".to_string(),
            ..Default::default()
        };
        let context = StageContext::new(Uuid::new_v4(), Arc::new(brief));

        let output = MockupGeneration.execute(&context).await.unwrap();

        assert!(output.content.contains("cover 4 screens"));
        assert!(output.content.contains("* Home\n* Catalog page\n* Checkout page\n* Contact"));
        assert!(output.content.contains("tuned for young professionals"));
    }

    #[tokio::test]
    async fn test_caps_feature_pages() {
        let brief = ClientBrief {
            features: (1..=10).map(|i| format!("Feature {i}")).collect(),
            ..Default::default()
        };
        let context = StageContext::new(Uuid::new_v4(), Arc::new(brief));

        let output = MockupGeneration.execute(&context).await.unwrap();

        assert_eq!(
            output.attributes.get("page_count"),
            Some(&serde_json::Value::from(MAX_FEATURE_PAGES + 2))
        );
        assert!(!output.content.contains("Feature 7 page"));
    }
}
