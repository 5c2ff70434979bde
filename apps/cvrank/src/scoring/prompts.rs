// Model prompt constants for the scoring engines.

/// Rubric scoring prompt template.
/// Replace: {json_only_instruction}, {requirements}, {keywords}, {resume_text}
pub const RUBRIC_PROMPT_TEMPLATE: &str = r#"TASK: SCORE_RESUME_RUBRIC
You are a senior technical recruiter. Rate how well the resume below matches
the job requirements on a 0-10 scale.

Rubric:
- 9-10: meets every requirement with quantified, directly relevant evidence.
- 6-8: meets most requirements; some evidence is indirect.
- 3-5: partial match; key requirements missing.
- 0-2: unrelated background.

Then judge each job requirement on its own, from 0.0 (no evidence) to 1.0
(fully met).

Return a JSON object with this EXACT schema:
{"score": 7, "rationale": "One or two sentences.",
 "per_requirement": [{"requirement": "...", "score": 0.8, "explanation": "One sentence."}]}

{json_only_instruction}

Job requirements:
{requirements}

Job keywords: {keywords}

Resume:
-------
{resume_text}"#;
