//! View models for completed analyses. The browser renders these directly;
//! all score-to-colour logic lives here.

use serde::Serialize;

use crate::models::feedback::{Feedback, HrReviewFeedback, JobFeedback, Tip, TipKind};
use crate::models::resume::{AnalysisType, ResumeRecord};

/// Above this a score is strong everywhere.
pub const STRONG_THRESHOLD: u32 = 69;
/// Moderate cut-off for job-specific views (badges, ATS card, categories).
pub const ATS_MID_THRESHOLD: u32 = 49;
/// Moderate cut-off for HR quick-review views.
pub const HR_MID_THRESHOLD: u32 = 39;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Strong,
    Moderate,
    Weak,
}

impl ScoreTier {
    pub fn classify(score: u32, mid_threshold: u32) -> Self {
        if score > STRONG_THRESHOLD {
            ScoreTier::Strong
        } else if score > mid_threshold {
            ScoreTier::Moderate
        } else {
            ScoreTier::Weak
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ScoreTier::Strong => "green",
            ScoreTier::Moderate => "yellow",
            ScoreTier::Weak => "red",
        }
    }

    pub fn badge_text(&self) -> &'static str {
        match self {
            ScoreTier::Strong => "Strong",
            ScoreTier::Moderate => "Good Start",
            ScoreTier::Weak => "Needs Work",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreView {
    pub score: u32,
    pub tier: ScoreTier,
    pub color: &'static str,
    pub badge: &'static str,
}

impl ScoreView {
    fn new(score: u32, mid_threshold: u32) -> Self {
        let tier = ScoreTier::classify(score, mid_threshold);
        Self {
            score,
            tier,
            color: tier.color(),
            badge: tier.badge_text(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TipIcon {
    Check,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TipView {
    pub icon: TipIcon,
    pub tip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl From<&Tip> for TipView {
    fn from(tip: &Tip) -> Self {
        Self {
            icon: match tip.kind {
                TipKind::Good => TipIcon::Check,
                TipKind::Improve => TipIcon::Warning,
            },
            tip: tip.tip.clone(),
            explanation: tip.explanation.clone(),
        }
    }
}

fn tip_views(tips: &[Tip]) -> Vec<TipView> {
    tips.iter().map(TipView::from).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub score: ScoreView,
    pub tips: Vec<TipView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Job-specific
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsCardView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub score: ScoreView,
    pub suggestions: Vec<TipView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFeedbackView {
    pub overall: ScoreView,
    pub ats: AtsCardView,
    pub categories: Vec<CategoryView>,
}

impl From<&JobFeedback> for JobFeedbackView {
    fn from(f: &JobFeedback) -> Self {
        let ats = AtsCardView {
            title: "ATS Compliance",
            subtitle: "Applicant Tracking System check",
            score: ScoreView::new(f.ats.score, ATS_MID_THRESHOLD),
            suggestions: tip_views(&f.ats.tips),
            empty_message: f
                .ats
                .tips
                .is_empty()
                .then_some("No specific suggestions found."),
        };

        // ATS gets its own card; the accordion holds the other four.
        let categories = f
            .categories()
            .into_iter()
            .filter(|(title, _)| *title != "ATS")
            .map(|(title, category)| CategoryView {
                title,
                subtitle: None,
                score: ScoreView::new(category.score, ATS_MID_THRESHOLD),
                tips: tip_views(&category.tips),
                highlights: Vec::new(),
            })
            .collect();

        Self {
            overall: ScoreView::new(f.overall_score, ATS_MID_THRESHOLD),
            ats,
            categories,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HR quick review
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HrOverallView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub score: ScoreView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassBannerView {
    pub passed: bool,
    pub icon: TipIcon,
    pub headline: &'static str,
    pub detail: &'static str,
}

impl PassBannerView {
    fn new(passed: bool) -> Self {
        if passed {
            Self {
                passed,
                icon: TipIcon::Check,
                headline: "Would Advance to Next Stage",
                detail: "Based on the quick HR scan, this resume would make it to the 'consider' pile.",
            }
        } else {
            Self {
                passed,
                icon: TipIcon::Warning,
                headline: "Would Likely Be Skipped",
                detail: "Based on the quick HR scan, this resume would likely be passed over. See tips above to improve.",
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HrReviewView {
    pub overall: HrOverallView,
    pub pass: PassBannerView,
    pub categories: Vec<CategoryView>,
}

impl From<&HrReviewFeedback> for HrReviewView {
    fn from(f: &HrReviewFeedback) -> Self {
        let category = |title, score, tips: &[Tip]| CategoryView {
            title,
            subtitle: None,
            score: ScoreView::new(score, HR_MID_THRESHOLD),
            tips: tip_views(tips),
            highlights: Vec::new(),
        };

        let categories = vec![
            CategoryView {
                subtitle: Some(f.first_impression.time_estimate.clone()),
                ..category(
                    "First Impression",
                    f.first_impression.score,
                    &f.first_impression.tips,
                )
            },
            category(
                "Visual Hierarchy",
                f.visual_hierarchy.score,
                &f.visual_hierarchy.tips,
            ),
            CategoryView {
                subtitle: Some(format!("Scan path: {}", f.scannability.scan_path)),
                ..category("Scannability", f.scannability.score, &f.scannability.tips)
            },
            CategoryView {
                highlights: f.key_information.found_in_seconds.clone(),
                ..category(
                    "Key Information",
                    f.key_information.score,
                    &f.key_information.tips,
                )
            },
        ];

        Self {
            overall: HrOverallView {
                title: "HR Quick Review Score",
                subtitle: "Based on a 6-10 second recruiter scan",
                score: ScoreView::new(f.overall_score, HR_MID_THRESHOLD),
            },
            pass: PassBannerView::new(f.pass_would_move),
            categories,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Record-level views
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FeedbackView {
    /// Analysis has not finished (or never will).
    Pending,
    Job(JobFeedbackView),
    HrReview(HrReviewView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeView {
    pub id: String,
    pub analysis_type: AnalysisType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    pub pdf_url: String,
    pub image_url: String,
    pub feedback: FeedbackView,
}

/// Builds the view for a stored record. Returns `None` when the stored
/// feedback has the wrong shape for the record's analysis type.
pub fn resume_view(record: &ResumeRecord) -> Option<ResumeView> {
    if !record.feedback_matches_type() {
        return None;
    }
    let feedback = match &record.feedback {
        None => FeedbackView::Pending,
        Some(Feedback::Job(f)) => FeedbackView::Job(f.into()),
        Some(Feedback::HrReview(f)) => FeedbackView::HrReview(f.into()),
    };
    Some(ResumeView {
        id: record.id.clone(),
        analysis_type: record.analysis_type,
        company_name: record.company_name.clone(),
        job_title: record.job_title.clone(),
        pdf_url: pdf_url(&record.id),
        image_url: image_url(&record.id),
        feedback,
    })
}

pub fn pdf_url(id: &str) -> String {
    format!("/api/v1/resumes/{id}/pdf")
}

pub fn image_url(id: &str) -> String {
    format!("/api/v1/resumes/{id}/image")
}

/// Gallery card for one stored resume.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeCardView {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub analysis_type: AnalysisType,
    pub pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreView>,
    pub image_url: String,
    pub route: String,
}

impl From<&ResumeRecord> for ResumeCardView {
    fn from(record: &ResumeRecord) -> Self {
        let (title, subtitle) = match (&record.company_name, &record.job_title) {
            (Some(company), title) => (company.clone(), title.clone()),
            (None, Some(title)) => (title.clone(), None),
            (None, None) => match record.analysis_type {
                AnalysisType::JobSpecific => ("Resume".to_string(), None),
                AnalysisType::HrReview => ("HR Quick Review".to_string(), None),
            },
        };
        let mid = match record.analysis_type {
            AnalysisType::JobSpecific => ATS_MID_THRESHOLD,
            AnalysisType::HrReview => HR_MID_THRESHOLD,
        };
        Self {
            id: record.id.clone(),
            title,
            subtitle,
            analysis_type: record.analysis_type,
            pending: record.is_pending(),
            score: record
                .feedback
                .as_ref()
                .map(|f| ScoreView::new(f.overall_score(), mid)),
            image_url: image_url(&record.id),
            route: record.result_route(),
        }
    }
}
