// Résumé analysis: session state machine, prompt building, orchestration.
// Completion calls go through llm_client; persistence through store.

pub mod handlers;
pub mod orchestrator;
pub mod prompts;
pub mod registry;
pub mod session;
