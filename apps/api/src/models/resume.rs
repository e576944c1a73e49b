use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::feedback::Feedback;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AnalysisType {
    #[serde(rename = "job-specific")]
    JobSpecific,
    #[serde(rename = "hr-review")]
    HrReview,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::JobSpecific => "job-specific",
            AnalysisType::HrReview => "hr-review",
        }
    }
}

/// A stored resume and its analysis, keyed by `resume:{id}`.
///
/// Written twice by the analysis pipeline: once as a placeholder with
/// `feedback: None` before the AI call, then with the completed feedback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub id: String,
    pub resume_path: String,
    pub image_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    pub analysis_type: AnalysisType,
    /// `None` means the analysis has not completed. Stored as `""`.
    #[serde(with = "pending_feedback")]
    pub feedback: Option<Feedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ResumeRecord {
    pub fn is_pending(&self) -> bool {
        self.feedback.is_none()
    }

    /// True when the stored feedback has the shape `analysis_type` promises.
    /// A pending record trivially matches.
    pub fn feedback_matches_type(&self) -> bool {
        matches!(
            (&self.feedback, self.analysis_type),
            (None, _)
                | (Some(Feedback::Job(_)), AnalysisType::JobSpecific)
                | (Some(Feedback::HrReview(_)), AnalysisType::HrReview)
        )
    }

    /// Client route that renders this record.
    pub fn result_route(&self) -> String {
        match self.analysis_type {
            AnalysisType::JobSpecific => format!("/resume/{}", self.id),
            AnalysisType::HrReview => format!("/hr-review/{}", self.id),
        }
    }
}

/// Treats `""`, `null` and `{}` as "no feedback yet"; anything else must be
/// a complete feedback object.
mod pending_feedback {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    use crate::models::feedback::Feedback;

    pub fn serialize<S: Serializer>(value: &Option<Feedback>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(feedback) => feedback.serialize(s),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Feedback>, D::Error> {
        let raw = Value::deserialize(d)?;
        match &raw {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::Object(map) if map.is_empty() => Ok(None),
            _ => serde_json::from_value(raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::feedback::{Category, JobFeedback};

    fn placeholder() -> ResumeRecord {
        ResumeRecord {
            id: "0b6c1b9e-8f5e-4a43-9a4e-0b9f3c2d1e00".into(),
            resume_path: "uploads/a-resume.pdf".into(),
            image_path: "uploads/b-resume.png".into(),
            company_name: Some("Google".into()),
            job_title: Some("Frontend Developer".into()),
            job_description: None,
            analysis_type: AnalysisType::JobSpecific,
            feedback: None,
            created_at: None,
        }
    }

    #[test]
    fn test_placeholder_serializes_empty_feedback_string() {
        let json = serde_json::to_value(placeholder()).unwrap();
        assert_eq!(json["feedback"], "");
        assert_eq!(json["analysisType"], "job-specific");
        assert_eq!(json["resumePath"], "uploads/a-resume.pdf");
        assert!(json.get("jobDescription").is_none());
    }

    #[test]
    fn test_placeholder_round_trips_as_pending() {
        let text = serde_json::to_string(&placeholder()).unwrap();
        let back: ResumeRecord = serde_json::from_str(&text).unwrap();
        assert!(back.is_pending());
        assert_eq!(back, placeholder());
    }

    #[test]
    fn test_legacy_record_with_blank_strings_loads() {
        let text = r#"{
            "id": "x", "resumePath": "r", "imagePath": "i",
            "companyName": "", "jobTitle": "", "jobDescription": "",
            "analysisType": "hr-review", "feedback": ""
        }"#;
        let record: ResumeRecord = serde_json::from_str(text).unwrap();
        assert_eq!(record.analysis_type, AnalysisType::HrReview);
        assert!(record.is_pending());
        assert_eq!(record.result_route(), "/hr-review/x");
    }

    #[test]
    fn test_mismatched_feedback_shape_detected() {
        let mut record = placeholder();
        record.analysis_type = AnalysisType::HrReview;
        let c = || Category { score: 50, tips: vec![] };
        record.feedback = Some(Feedback::Job(JobFeedback {
            overall_score: 50,
            ats: c(),
            tone_and_style: c(),
            content: c(),
            structure: c(),
            skills: c(),
        }));
        assert!(!record.feedback_matches_type());
        record.analysis_type = AnalysisType::JobSpecific;
        assert!(record.feedback_matches_type());
    }
}
