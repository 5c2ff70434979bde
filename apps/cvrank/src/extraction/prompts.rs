// Prompt constants for resume extraction.

/// Resume extraction prompt template.
/// Replace: {json_only_instruction}, {resume_text}
pub const RESUME_EXTRACTION_PROMPT: &str = r#"TASK: EXTRACT_RESUME
You are an expert HR assistant. Extract structured fields from the resume text below.

Return a JSON object with this EXACT schema:
{
  "name": "Jane Doe",
  "skills": ["Rust", "PostgreSQL"],
  "experience": [
    {
      "title": "Senior Engineer",
      "company": "Acme Corp",
      "bullets": ["Cut p99 latency by 40% across 3 services"],
      "technologies": ["Rust", "Kafka"]
    }
  ]
}

{json_only_instruction}

Resume Text:
----------------
{resume_text}"#;
