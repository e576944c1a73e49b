use serde::{Deserialize, Serialize};

/// Whether a tip affirms something the resume does well or asks for a change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TipKind {
    Good,
    Improve,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tip {
    #[serde(rename = "type")]
    pub kind: TipKind,
    pub tip: String,
    /// Absent for ATS tips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// A scored category with its ordered tips.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub score: u32,
    pub tips: Vec<Tip>,
}

// ────────────────────────────────────────────────────────────────────────────
// Job-specific analysis
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobFeedback {
    pub overall_score: u32,
    #[serde(rename = "ATS")]
    pub ats: Category,
    pub tone_and_style: Category,
    pub content: Category,
    pub structure: Category,
    pub skills: Category,
}

impl JobFeedback {
    /// Top-level keys a model response must carry to be accepted.
    pub const REQUIRED_KEYS: &'static [&'static str] = &[
        "overallScore",
        "ATS",
        "toneAndStyle",
        "content",
        "structure",
        "skills",
    ];

    /// Categories in display order, paired with their human-readable names.
    pub fn categories(&self) -> [(&'static str, &Category); 5] {
        [
            ("ATS", &self.ats),
            ("Tone & Style", &self.tone_and_style),
            ("Content", &self.content),
            ("Structure", &self.structure),
            ("Skills", &self.skills),
        ]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HR quick review
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FirstImpression {
    pub score: u32,
    pub time_estimate: String,
    pub tips: Vec<Tip>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scannability {
    pub score: u32,
    pub scan_path: String,
    pub tips: Vec<Tip>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeyInformation {
    pub score: u32,
    pub found_in_seconds: Vec<String>,
    pub tips: Vec<Tip>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HrReviewFeedback {
    pub overall_score: u32,
    pub first_impression: FirstImpression,
    pub visual_hierarchy: Category,
    pub scannability: Scannability,
    pub key_information: KeyInformation,
    pub pass_would_move: bool,
}

impl HrReviewFeedback {
    pub const REQUIRED_KEYS: &'static [&'static str] = &[
        "overallScore",
        "firstImpression",
        "visualHierarchy",
        "scannability",
        "keyInformation",
        "passWouldMove",
    ];

    pub fn categories(&self) -> [(&'static str, u32, &[Tip]); 4] {
        [
            (
                "First Impression",
                self.first_impression.score,
                &self.first_impression.tips,
            ),
            (
                "Visual Hierarchy",
                self.visual_hierarchy.score,
                &self.visual_hierarchy.tips,
            ),
            ("Scannability", self.scannability.score, &self.scannability.tips),
            (
                "Key Information",
                self.key_information.score,
                &self.key_information.tips,
            ),
        ]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Completed feedback of either shape
// ────────────────────────────────────────────────────────────────────────────

/// Completed analysis. The wire form carries no tag; the owning record's
/// `analysisType` says which shape is expected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Feedback {
    Job(JobFeedback),
    HrReview(HrReviewFeedback),
}

impl Feedback {
    pub fn overall_score(&self) -> u32 {
        match self {
            Feedback::Job(f) => f.overall_score,
            Feedback::HrReview(f) => f.overall_score,
        }
    }

    /// Every score in the feedback, labelled by its JSON path.
    pub fn scores(&self) -> Vec<(&'static str, u32)> {
        match self {
            Feedback::Job(f) => vec![
                ("overallScore", f.overall_score),
                ("ATS.score", f.ats.score),
                ("toneAndStyle.score", f.tone_and_style.score),
                ("content.score", f.content.score),
                ("structure.score", f.structure.score),
                ("skills.score", f.skills.score),
            ],
            Feedback::HrReview(f) => vec![
                ("overallScore", f.overall_score),
                ("firstImpression.score", f.first_impression.score),
                ("visualHierarchy.score", f.visual_hierarchy.score),
                ("scannability.score", f.scannability.score),
                ("keyInformation.score", f.key_information.score),
            ],
        }
    }

    /// Collects every tip flagged "improve", tagged with its category name.
    /// A missing explanation becomes an empty string.
    pub fn improvement_tips(&self) -> Vec<ImprovementTip> {
        let mut out = Vec::new();
        let mut push = |category: &str, tips: &[Tip]| {
            out.extend(
                tips.iter()
                    .filter(|t| t.kind == TipKind::Improve)
                    .map(|t| ImprovementTip {
                        category: category.to_string(),
                        tip: t.tip.clone(),
                        explanation: t.explanation.clone().unwrap_or_default(),
                    }),
            );
        };
        match self {
            Feedback::Job(f) => {
                for (name, category) in f.categories() {
                    push(name, &category.tips);
                }
            }
            Feedback::HrReview(f) => {
                for (name, _, tips) in f.categories() {
                    push(name, tips);
                }
            }
        }
        out
    }
}

/// A tip flagged for improvement, as fed into the rewrite prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ImprovementTip {
    pub category: String,
    pub tip: String,
    pub explanation: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Rewrite suggestions (never persisted)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImprovedSection {
    pub category: String,
    pub original_issue: String,
    pub improved_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImprovedContent {
    pub sections: Vec<ImprovedSection>,
    pub summary: String,
}

impl ImprovedContent {
    pub const REQUIRED_KEYS: &'static [&'static str] = &["sections", "summary"];

    /// All rewritten sections as one markdown document, ready to paste.
    pub fn copy_all_text(&self) -> String {
        self.sections
            .iter()
            .map(|s| format!("## {}\n\n{}", s.category, s.improved_text))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tip(kind: TipKind, text: &str, explanation: Option<&str>) -> Tip {
        Tip {
            kind,
            tip: text.to_string(),
            explanation: explanation.map(String::from),
        }
    }

    fn category(score: u32, tips: Vec<Tip>) -> Category {
        Category { score, tips }
    }

    #[test]
    fn test_ats_tip_serializes_without_explanation() {
        let t = tip(TipKind::Good, "Standard headings", None);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json, serde_json::json!({"type": "good", "tip": "Standard headings"}));
    }

    #[test]
    fn test_job_feedback_uses_wire_names() {
        let feedback = JobFeedback {
            overall_score: 72,
            ats: category(80, vec![]),
            tone_and_style: category(70, vec![]),
            content: category(60, vec![]),
            structure: category(75, vec![]),
            skills: category(65, vec![]),
        };
        let json = serde_json::to_value(&feedback).unwrap();
        assert_eq!(json["overallScore"], 72);
        assert_eq!(json["ATS"]["score"], 80);
        assert_eq!(json["toneAndStyle"]["score"], 70);
    }

    #[test]
    fn test_untagged_feedback_picks_hr_shape() {
        let json = serde_json::json!({
            "overallScore": 40,
            "firstImpression": {"score": 35, "timeEstimate": "Would skip in 3 seconds", "tips": []},
            "visualHierarchy": {"score": 45, "tips": []},
            "scannability": {"score": 50, "scanPath": "Name → Skills", "tips": []},
            "keyInformation": {"score": 30, "foundInSeconds": ["Python"], "tips": []},
            "passWouldMove": false
        });
        let feedback: Feedback = serde_json::from_value(json).unwrap();
        assert!(matches!(feedback, Feedback::HrReview(_)));
        assert_eq!(feedback.overall_score(), 40);
    }

    #[test]
    fn test_improvement_tips_only_collects_improve() {
        let feedback = Feedback::Job(JobFeedback {
            overall_score: 60,
            ats: category(50, vec![tip(TipKind::Improve, "Use keywords", None)]),
            tone_and_style: category(
                70,
                vec![
                    tip(TipKind::Good, "Confident voice", Some("Reads well")),
                    tip(TipKind::Improve, "Passive voice", Some("Use action verbs")),
                ],
            ),
            content: category(60, vec![]),
            structure: category(60, vec![]),
            skills: category(60, vec![]),
        });

        let tips = feedback.improvement_tips();
        assert_eq!(tips.len(), 2);
        assert_eq!(tips[0].category, "ATS");
        assert_eq!(tips[0].explanation, "");
        assert_eq!(tips[1].category, "Tone & Style");
        assert_eq!(tips[1].explanation, "Use action verbs");
    }

    #[test]
    fn test_copy_all_text_joins_sections() {
        let content = ImprovedContent {
            sections: vec![
                ImprovedSection {
                    category: "Content".into(),
                    original_issue: "Vague bullets".into(),
                    improved_text: "Cut build times by 40%".into(),
                },
                ImprovedSection {
                    category: "Skills".into(),
                    original_issue: "Missing tools".into(),
                    improved_text: "Rust, Tokio, PostgreSQL".into(),
                },
            ],
            summary: "Sharper bullets".into(),
        };
        assert_eq!(
            content.copy_all_text(),
            "## Content\n\nCut build times by 40%\n\n---\n\n## Skills\n\nRust, Tokio, PostgreSQL"
        );
    }
}
