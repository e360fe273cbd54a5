// Resume ingestion LLM prompt templates.
// All prompts for the ingest module are defined here.

pub const RESUME_FIELDS_SYSTEM: &str = "\
You are an expert resume parser. \
Extract structured information from resume text accurately and completely. \
You MUST respond with valid JSON only — no markdown fences, no explanations. \
Never invent details that are not present in the resume.";

pub const RESUME_FIELDS_PROMPT: &str = r#"Extract the structured fields from the following resume text.

RESUME TEXT:
{resume_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "summary": "string — 2-3 sentence overview of the candidate",
  "skills": ["string"],
  "experience": [
    {"title": "string", "company": "string", "duration": "string", "description": "string"}
  ],
  "education": [
    {"degree": "string", "institution": "string", "year": "string", "gpa": "string (omit if absent)"}
  ],
  "projects": [
    {"name": "string", "description": "string", "technologies": ["string"]}
  ],
  "achievements": ["string"],
  "interests": ["string"]
}

RULES:
1. Use empty arrays for sections the resume does not contain
2. Keep skills as short, individual items (e.g. "Python", "Financial Modeling")
3. Preserve dates and durations exactly as written
4. Return ONLY the JSON object — nothing else, no code fences."#;

pub const USER_SUMMARY_SYSTEM: &str = "\
You are a career coach writing concise professional profiles. \
You MUST respond with valid JSON only — no markdown fences, no explanations.";

pub const USER_SUMMARY_PROMPT: &str = r#"Write a professional profile for the candidate described by this structured resume data.

RESUME DATA:
{resume_json}

OUTPUT SCHEMA (return exactly this structure):
{
  "professionalSummary": "string — 2-3 sentences",
  "keyStrengths": ["string"],
  "careerFocus": "string",
  "valueProposition": "string"
}

RULES:
1. keyStrengths has at most 5 items
2. Ground every statement in the resume data
3. Return ONLY the JSON object — nothing else, no code fences."#;
