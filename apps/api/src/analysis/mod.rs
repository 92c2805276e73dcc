// Tender analysis pipeline.
// upload → extract → invoke model → normalize → respond; the quota gate
// brackets the model call. All model calls go through llm_client.

pub mod extract;
pub mod handlers;
pub mod invoke;
pub mod normalize;
pub mod prompts;
pub mod report;
pub mod schema;
