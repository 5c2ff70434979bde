// All model prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// JD parsing prompt template.
/// Replace: {json_only_instruction}, {jd_text}
pub const JD_PARSE_PROMPT_TEMPLATE: &str = r#"TASK: PARSE_JOB_DESCRIPTION
You are an expert recruiter. Parse the job description below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "title": "Senior Rust Engineer",
  "company": "Acme Corp",
  "requirements": ["5+ years Rust", "Distributed systems"],
  "nice_to_have": ["Kubernetes"],
  "keywords": ["rust", "distributed systems", "kubernetes"]
}

Rules:
- REQUIREMENTS: explicit must-haves ("required", "must have", minimum years).
- NICE TO HAVE: "preferred", "bonus", "a plus".
- KEYWORDS: role-specific skills, languages, frameworks, tools and concepts.
  Short noun phrases only, no sentences.

{json_only_instruction}

Job Description:
----------------
{jd_text}"#;

/// Tailoring prompt template.
/// Replace: {tone}, {role}, {length}, {keywords}, {resume_json}, {jd_json}
pub const TAILORING_PROMPT_TEMPLATE: &str = r#"TASK: TAILOR_RESUME
You are an elite resume writer optimizing for ATS. Given structured resume data and a parsed job description, produce a tailored resume in Markdown.
Instructions:
- Emphasize impact and quantified achievements.
- Match role keywords naturally; avoid keyword stuffing: {keywords}
- Keep concise, strong bullet points.
- Reorder experience to highlight role fit.
- Tone: {tone}. Target role: {role}. Length: {length}.
- Use ONLY facts present in the structured resume. Do not invent employers, metrics or skills.

Return ONLY the Markdown for the final resume.

Structured Resume JSON:
{resume_json}

Parsed Job Description JSON:
{jd_json}"#;
