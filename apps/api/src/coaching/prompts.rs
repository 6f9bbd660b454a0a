// Interview and negotiation coaching prompt templates.

pub const INTERVIEW_ROLE: &str = "You are a hiring manager preparing a structured interview. \
You ask questions a real panel would ask for this role.";

/// Placeholders: {count}, {job_description}, {resume_section}
pub const INTERVIEW_PROMPT: &str = r#"Write {count} interview questions for the role below.

JOB DESCRIPTION:
{job_description}
{resume_section}
OUTPUT SCHEMA:
{
  "questions": [
    {
      "category": "behavioral | technical | situational | culture",
      "question": "the question, one sentence",
      "guidance": "what a strong answer covers, one or two sentences"
    }
  ]
}

RULES:
1. Mix categories; at least one behavioral and one technical question.
2. Tie technical questions to skills named in the job description.
3. If a resume is provided, probe its specific projects and gaps."#;

/// Placeholder: {resume_text}
pub const RESUME_SECTION: &str = "\nCANDIDATE RESUME:\n{resume_text}\n";

pub const NEGOTIATION_ROLE: &str = "You are a compensation negotiation coach. \
You give candid, practical advice and never encourage dishonesty.";

/// Placeholders: {role}, {company}, {offer_line}, {target_line}
pub const NEGOTIATION_PROMPT: &str = r#"Prepare a salary negotiation plan.

ROLE: {role}
COMPANY: {company}
{offer_line}
{target_line}

OUTPUT SCHEMA:
{
  "talking_points": ["short, specific point the candidate can make"],
  "counter_offer_script": "what the candidate says on the call, 80-150 words",
  "questions_to_ask": ["question about equity, bonus, level or start date"]
}

RULES:
1. Anchor on market data and the candidate's value, not personal need.
2. Keep the tone collaborative.
3. Do not invent specific salary figures that were not provided."#;
