// All LLM prompt templates for resume analysis.
// Each builder is a pure function of its inputs.

use crate::llm_client::prompts::RETURN_JSON_OBJECT;
use crate::models::feedback::ImprovementTip;

/// Response schema for a job-specific analysis, embedded verbatim.
pub const FEEDBACK_FORMAT: &str = r#"
      interface Feedback {
      overallScore: number; //max 100
      ATS: {
        score: number; //rate based on ATS suitability
        tips: {
          type: "good" | "improve";
          tip: string; //give 3-4 tips
        }[];
      };
      toneAndStyle: {
        score: number; //max 100
        tips: {
          type: "good" | "improve";
          tip: string; //make it a short "title" for the actual explanation
          explanation: string; //explain in detail here
        }[]; //give 3-4 tips
      };
      content: {
        score: number; //max 100
        tips: {
          type: "good" | "improve";
          tip: string; //make it a short "title" for the actual explanation
          explanation: string; //explain in detail here
        }[]; //give 3-4 tips
      };
      structure: {
        score: number; //max 100
        tips: {
          type: "good" | "improve";
          tip: string; //make it a short "title" for the actual explanation
          explanation: string; //explain in detail here
        }[]; //give 3-4 tips
      };
      skills: {
        score: number; //max 100
        tips: {
          type: "good" | "improve";
          tip: string; //make it a short "title" for the actual explanation
          explanation: string; //explain in detail here
        }[]; //give 3-4 tips
      };
    }"#;

/// Job-specific analysis prompt.
/// Replace: {job_title}, {job_description}, {format}, {return_json}
const JOB_SPECIFIC_TEMPLATE: &str = "You are an expert in ATS (Applicant Tracking System) and resume analysis.
  Please analyze and rate this resume and suggest how to improve it.
  The rating can be low if the resume is bad.
  Be thorough and detailed. Don't be afraid to point out any mistakes or areas for improvement.
  If there is a lot to improve, don't hesitate to give low scores. This is to help the user to improve their resume.
  If available, use the job description for the job user is applying to to give more detailed feedback.
  If provided, take the job description into consideration.
  The job title is: {job_title}
  The job description is: {job_description}
  Provide the feedback using the following format: {format}
  {return_json}";

pub const HR_REVIEW_FORMAT: &str = r#"
interface HRReviewFeedback {
  overallScore: number; // max 100 - overall resume quality from HR perspective
  firstImpression: {
    score: number; // max 100 - how professional does it look at first glance?
    timeEstimate: string; // e.g., "Would spend 8+ seconds", "Would skip in 3 seconds"
    tips: {
      type: "good" | "improve";
      tip: string; // short title
      explanation: string; // detailed explanation
    }[]; // give 3-4 tips
  };
  visualHierarchy: {
    score: number; // max 100 - are sections clearly defined? good whitespace?
    tips: {
      type: "good" | "improve";
      tip: string;
      explanation: string;
    }[]; // give 3-4 tips
  };
  scannability: {
    score: number; // max 100 - can HR quickly find key information?
    scanPath: string; // describe what HR's eyes would follow, e.g., "Name → Current Title → Company Names → Skills section"
    tips: {
      type: "good" | "improve";
      tip: string;
      explanation: string;
    }[]; // give 3-4 tips
  };
  keyInformation: {
    score: number; // max 100 - is critical info prominent and easy to find?
    foundInSeconds: string[]; // list what HR would notice in first 6 seconds, e.g., ["Software Engineer at Google", "5+ years experience", "Python, React skills"]
    tips: {
      type: "good" | "improve";
      tip: string;
      explanation: string;
    }[]; // give 3-4 tips
  };
  passWouldMove: boolean; // Would this resume make it to the "consider" pile?
}"#;

/// HR quick review prompt.
/// Replace: {format}, {return_json}
const HR_REVIEW_TEMPLATE: &str = r#"You are an experienced HR recruiter who has reviewed thousands of resumes.
  You typically spend only 6-10 seconds on an initial resume scan before deciding to read further or move on.

  Analyze this resume AS IF you are doing a quick initial scan. Be honest and critical - recruiters are busy and quick to reject.

  Focus on these key areas:

  1. FIRST IMPRESSION (2-3 seconds)
     - Does it look professional at a glance?
     - Is the layout clean and modern?
     - Are there any immediate red flags (cluttered, too long, poor formatting)?

  2. VISUAL HIERARCHY
     - Are sections clearly defined with headers?
     - Is there good use of whitespace?
     - Is the font readable and consistent?
     - Does the design guide the eye naturally?

  3. SCANNABILITY
     - Can you quickly identify who this person is and what they do?
     - Are bullet points concise and easy to scan?
     - Is information density appropriate (not too sparse, not overwhelming)?

  4. KEY INFORMATION PROMINENCE
     - In the first 6 seconds, what stands out? (Name, current role, key skills?)
     - Is contact information easy to find?
     - Are the most impressive achievements visible without deep reading?

  5. PASS OR SKIP DECISION
     - Based on your quick scan, would you move this resume to the "consider" pile or skip it?
     - Be honest - most resumes get rejected in the first scan.

  Rate each category honestly. If the resume is poor, give low scores. This helps the user improve.

  Provide the feedback using the following format: {format}
  {return_json}"#;

pub const IMPROVEMENT_FORMAT: &str = r#"
interface ImprovedContent {
  sections: {
    category: string; // e.g., "Tone & Style", "Content", "Structure", "Skills"
    originalIssue: string; // the tip that was flagged for improvement
    improvedText: string; // suggested improved text/content
  }[];
  summary: string; // brief summary of all improvements made
}"#;

/// Rewrite prompt for flagged tips.
/// Replace: {tips}, {format}
const IMPROVEMENT_TEMPLATE: &str = "You are an expert CV/resume writer helping to improve a resume.

Based on the following feedback that flagged areas for improvement, provide specific improved text for each issue:

AREAS TO IMPROVE:
{tips}

For each area:
1. Look at the original resume content
2. Rewrite or improve that specific section
3. Provide professional, impactful text that addresses the feedback

Be specific and provide actual text the user can copy-paste into their resume.
Focus on action verbs, quantifiable achievements, and professional language.

Return the improvements using this format: {format}
Return as JSON only, no other text or backticks.";

/// Substitutes `{key}` placeholders in a single pass over `template`.
/// Inserted values are never scanned again, so user text that happens to
/// look like a placeholder is kept as written.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let hit = values.iter().find_map(|&(key, value)| {
            tail.strip_prefix(key)
                .and_then(|t| t.strip_prefix('}'))
                .map(|after| (value, after))
        });
        match hit {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Scores a resume against a job across five categories.
/// Empty title or description still yields a usable resume-only prompt.
pub fn build_job_specific_prompt(job_title: &str, job_description: &str) -> String {
    fill_template(
        JOB_SPECIFIC_TEMPLATE,
        &[
            ("job_title", job_title.trim()),
            ("job_description", job_description.trim()),
            ("format", FEEDBACK_FORMAT),
            ("return_json", RETURN_JSON_OBJECT),
        ],
    )
}

/// Simulates a recruiter's 6-10 second first scan across four categories.
pub fn build_hr_review_prompt() -> String {
    fill_template(
        HR_REVIEW_TEMPLATE,
        &[("format", HR_REVIEW_FORMAT), ("return_json", RETURN_JSON_OBJECT)],
    )
}

/// Asks for rewritten resume text for each flagged tip.
///
/// Returns `None` when there is nothing to improve, so callers can skip the
/// AI call entirely.
pub fn build_improvement_prompt(tips: &[ImprovementTip]) -> Option<String> {
    if tips.is_empty() {
        return None;
    }

    let formatted = tips
        .iter()
        .map(|t| format!("- {}: {} - {}", t.category, t.tip, t.explanation))
        .collect::<Vec<_>>()
        .join("\n");

    Some(fill_template(
        IMPROVEMENT_TEMPLATE,
        &[("tips", formatted.as_str()), ("format", IMPROVEMENT_FORMAT)],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn improve(category: &str, tip: &str, explanation: &str) -> ImprovementTip {
        ImprovementTip {
            category: category.into(),
            tip: tip.into(),
            explanation: explanation.into(),
        }
    }

    #[test]
    fn test_job_prompt_embeds_context_and_schema() {
        let prompt = build_job_specific_prompt("Frontend Developer", "React, TypeScript");
        assert!(prompt.contains("The job title is: Frontend Developer"));
        assert!(prompt.contains("The job description is: React, TypeScript"));
        assert!(prompt.contains("interface Feedback"));
        assert!(prompt.contains("toneAndStyle"));
        assert!(prompt.contains("without the backticks"));
        assert!(!prompt.contains("{format}"));
    }

    #[test]
    fn test_job_prompt_tolerates_empty_inputs() {
        let prompt = build_job_specific_prompt("", "");
        assert!(prompt.contains("The job title is: \n"));
        assert!(prompt.contains("interface Feedback"));
        assert!(!prompt.contains("{job_title}"));
        assert!(!prompt.contains("{job_description}"));
    }

    #[test]
    fn test_job_prompt_does_not_expand_placeholders_in_user_text() {
        let prompt = build_job_specific_prompt("{format}", "{return_json}");
        assert!(prompt.contains("The job title is: {format}"));
        assert!(prompt.contains("The job description is: {return_json}"));
    }

    #[test]
    fn test_job_prompt_keeps_title_that_names_another_field() {
        let prompt = build_job_specific_prompt("{job_description}", "React, TypeScript");
        assert!(prompt.contains("The job title is: {job_description}\n"));
        assert!(prompt.contains("The job description is: React, TypeScript\n"));

        let prompt = build_job_specific_prompt("Frontend Developer", "{job_title} {format}");
        assert!(prompt.contains("The job description is: {job_title} {format}\n"));
        assert_eq!(prompt.matches("interface Feedback").count(), 1);
    }

    #[test]
    fn test_improvement_tips_are_not_expanded() {
        let prompt =
            build_improvement_prompt(&[improve("Skills", "List {format}", "")]).unwrap();
        assert!(prompt.contains("- Skills: List {format} - \n"));
        assert_eq!(prompt.matches("interface ImprovedContent").count(), 1);
    }

    #[test]
    fn test_fill_template_leaves_unknown_braces() {
        assert_eq!(fill_template("a {x} {y} {", &[("x", "1")]), "a 1 {y} {");
    }

    #[test]
    fn test_job_prompt_is_deterministic() {
        assert_eq!(
            build_job_specific_prompt("Cloud Engineer", "AWS"),
            build_job_specific_prompt("Cloud Engineer", "AWS")
        );
    }

    #[test]
    fn test_hr_prompt_persona_and_schema() {
        let prompt = build_hr_review_prompt();
        assert!(prompt.contains("6-10 seconds"));
        assert!(prompt.contains("Be honest and critical"));
        assert!(prompt.contains("interface HRReviewFeedback"));
        assert!(prompt.contains("passWouldMove"));
        assert!(prompt.contains("Do not include any other text or comments."));
    }

    #[test]
    fn test_improvement_prompt_empty_is_none() {
        assert_eq!(build_improvement_prompt(&[]), None);
    }

    #[test]
    fn test_improvement_prompt_lists_tips() {
        let prompt = build_improvement_prompt(&[
            improve("Content", "Quantify results", "Add metrics to bullets"),
            improve("ATS", "Use standard headings", ""),
        ])
        .unwrap();
        assert!(prompt.contains(
            "AREAS TO IMPROVE:\n- Content: Quantify results - Add metrics to bullets\n- ATS: Use standard headings - \n"
        ));
        assert!(prompt.contains("interface ImprovedContent"));
        assert!(prompt.ends_with("Return as JSON only, no other text or backticks."));
    }
}
