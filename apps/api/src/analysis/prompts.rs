// Prompt constants for resume analysis.

use crate::llm_client::prompts::JSON_OBJECT_RULES;

pub const MODEL: &str = "deepseek-chat";
pub const TEMPERATURE: f64 = 0.8;

/// Shape the model must answer with. Stored verbatim as the resume's feedback.
pub const FEEDBACK_SCHEMA: &str = r#"
interface Feedback {
  overallScore: number; // max 100
  ATS: {
    score: number; // rate based on ATS suitability
    tips: {
      type: "good" | "improve";
      tip: string; // give 3-4 tips
    }[];
  };
  toneAndStyle: {
    score: number; // max 100
    tips: {
      type: "good" | "improve";
      tip: string; // short "title" for the explanation
      explanation: string; // explain in detail here
    }[]; // give 3-4 tips
  };
  content: {
    score: number; // max 100
    tips: {
      type: "good" | "improve";
      tip: string; // short "title" for the explanation
      explanation: string; // explain in detail here
    }[]; // give 3-4 tips
  };
  structure: {
    score: number; // max 100
    tips: {
      type: "good" | "improve";
      tip: string; // short "title" for the explanation
      explanation: string; // explain in detail here
    }[]; // give 3-4 tips
  };
  skills: {
    score: number; // max 100
    tips: {
      type: "good" | "improve";
      tip: string; // short "title" for the explanation
      explanation: string; // explain in detail here
    }[]; // give 3-4 tips
  };
}
"#;

const REVIEWER_ROLE: &str = "\
You are an expert in ATS (Applicant Tracking System) and professional resume analysis.

Your task:
- Analyze and rate this resume thoroughly.
- Identify strengths and weaknesses in each section.
- Be honest and critical; low scores are fine if the resume needs improvement.
- Use the job title, description, and company context to refine your evaluation.

The JSON object must follow this format:";

/// The fixed system message: reviewer role, feedback schema, JSON-only rules.
pub fn system_instructions() -> String {
    format!("{REVIEWER_ROLE}\n{FEEDBACK_SCHEMA}\n{JSON_OBJECT_RULES}")
}

/// The user message: extracted resume text followed by the job context.
pub fn resume_content(
    resume_text: &str,
    job_title: &str,
    job_description: &str,
    company_name: &str,
) -> String {
    format!(
        "The resume content is as follows:\n\n\
         {resume_text}\n\n\
         Additional details:\n\
         - Job Title: {job_title}\n\
         - Job Description: {job_description}\n\
         - Company: {company_name}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_instructions_carry_schema_and_rules() {
        let system = system_instructions();
        assert!(system.starts_with("You are an expert in ATS"));
        for section in ["overallScore", "ATS", "toneAndStyle", "content", "structure", "skills"] {
            assert!(system.contains(section), "missing {section}");
        }
        assert!(system.contains("must begin with '{'"));
    }

    #[test]
    fn test_resume_content_keeps_fields_verbatim() {
        let content = resume_content(
            "Senior Engineer with {braces}",
            "Backend Engineer",
            "Own the {job_title} API",
            "Acme",
        );
        assert!(content.contains("Senior Engineer with {braces}"));
        assert!(content.contains("- Job Title: Backend Engineer"));
        assert!(content.contains("- Job Description: Own the {job_title} API"));
        assert!(content.contains("- Company: Acme"));
    }
}
