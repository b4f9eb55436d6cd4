// Generation Service: CV adaptation and cover letters.
// All LLM calls go through llm_client; access checks happen in the handlers
// before anything here runs.

pub mod generator;
pub mod handlers;
pub mod prompts;
