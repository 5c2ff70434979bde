// Job-side and rewrite stages of the pipeline.
// Implements: JD parsing and per-resume tailoring.
// All model calls go through llm_client; nothing here talks HTTP directly.

pub mod jd_parser;
pub mod prompts;
pub mod tailor;
