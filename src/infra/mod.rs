pub mod gemini;
pub mod github;
