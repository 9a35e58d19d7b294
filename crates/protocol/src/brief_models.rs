//! Client brief submitted to `POST /generate`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// The structured description of a prospective client's project.
///
/// Every field is optional on the wire so partially filled forms still
/// deserialize; [`ClientBrief::validate`] enforces the required ones.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
pub struct ClientBrief {
    #[serde(default)]
    pub client_name: String,

    /// Kind of project, e.g. "E-commerce Platform". Required.
    #[serde(default)]
    pub project_type: String,

    #[serde(default)]
    pub industry: String,

    /// Free-text project description. Required.
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub features: Vec<String>,

    /// Desired delivery timeline. Required.
    #[serde(default)]
    pub timeline: String,

    /// Budget range as entered by the client. Required.
    #[serde(default)]
    pub budget_range: String,

    #[serde(default)]
    pub target_audience: String,

    #[serde(default)]
    pub client_website: String,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub company_size: String,

    #[serde(default)]
    pub business_goals: Vec<String>,

    #[serde(default)]
    pub market_position: Option<String>,

    #[serde(default)]
    pub unique_selling_points: Vec<String>,

    /// Known competitor websites or names.
    #[serde(default)]
    pub competitors: Vec<String>,

    #[serde(default)]
    pub analysis_options: AnalysisOptions,

    /// Pipeline template to run. Falls back to `default`.
    #[serde(default)]
    pub template: Option<String>,
}

/// Toggles for optional pipeline stages.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
pub struct AnalysisOptions {
    /// Run the competitive research stage.
    #[serde(default = "default_true")]
    pub competitor_analysis: bool,

    /// Run the mockup generation stage.
    #[serde(default = "default_true")]
    pub design_mockups: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            competitor_analysis: true,
            design_mockups: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Reasons a brief is rejected before any run is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BriefError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

impl ClientBrief {
    /// Check that all required fields carry non-blank text.
    pub fn validate(&self) -> Result<(), BriefError> {
        let required = [
            ("project_type", &self.project_type),
            ("description", &self.description),
            ("timeline", &self.timeline),
            ("budget_range", &self.budget_range),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(BriefError::MissingField(field));
            }
        }

        Ok(())
    }

    /// Name used in titles: the client name, or the project type when the
    /// client is anonymous.
    pub fn display_name(&self) -> &str {
        if self.client_name.trim().is_empty() {
            self.project_type.trim()
        } else {
            self.client_name.trim()
        }
    }

    /// Selected template name.
    pub fn template_name(&self) -> &str {
        self.template
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_brief() -> ClientBrief {
        ClientBrief {
            project_type: "Web Application".to_string(),
            description: "Customer portal".to_string(),
            timeline: "3 months".to_string(),
            budget_range: "$50k-$100k".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_accepts_complete_brief() {
        assert!(complete_brief().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_required_field() {
        let mut brief = complete_brief();
        brief.timeline = "   ".to_string();
        assert_eq!(brief.validate(), Err(BriefError::MissingField("timeline")));
    }

    #[test]
    fn test_display_name_falls_back_to_project_type() {
        let mut brief = complete_brief();
        assert_eq!(brief.display_name(), "Web Application");

        brief.client_name = "Acme Corp".to_string();
        assert_eq!(brief.display_name(), "Acme Corp");
    }

    #[test]
    fn test_template_name_defaults() {
        let mut brief = complete_brief();
        assert_eq!(brief.template_name(), "default");

        brief.template = Some(" ".to_string());
        assert_eq!(brief.template_name(), "default");

        brief.template = Some("consulting".to_string());
        assert_eq!(brief.template_name(), "consulting");
    }
}
