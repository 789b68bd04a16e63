// Rodrigo: the conversational assistant.
// Prompt construction, model call, tagged-block parsing and handoff detection.
// All model calls go through llm_client::ModelClient.

pub mod conversation;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod prompt_builder;
pub mod prompts;
pub mod protocol;
