// Resume analysis and cover letter prompt templates.

pub const ANALYSIS_ROLE: &str = "You are an experienced technical recruiter and ATS expert. \
You compare a resume against a job description and report the match honestly.";

/// Placeholders: {resume_text}, {job_description}
pub const ANALYSIS_PROMPT: &str = r#"Compare the RESUME against the JOB DESCRIPTION.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

OUTPUT SCHEMA (return exactly this structure):
{
  "match_score": 0-100,
  "summary": "two or three sentences on overall fit",
  "strengths": ["specific strength backed by the resume"],
  "missing_keywords": ["important JD keyword absent from the resume"],
  "suggested_keywords": ["keyword the candidate can honestly add given their experience"],
  "improvements": ["concrete edit to the resume"]
}

SCORING GUIDE:
- 85-100: meets nearly all hard requirements
- 60-84: meets most hard requirements, some gaps
- 30-59: partial overlap
- 0-29: different field or seniority"#;

pub const COVER_LETTER_ROLE: &str = "You are a professional career writer. \
You write cover letters that are specific, warm and free of cliches.";

/// Placeholders: {resume_text}, {job_description}, {company_name}, {tone_instruction}
pub const COVER_LETTER_PROMPT: &str = r#"Write a cover letter for the candidate below, applying to {company_name}.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

TONE: {tone_instruction}

OUTPUT SCHEMA:
{
  "body": "the full letter as plain text, paragraphs separated by blank lines"
}"#;
