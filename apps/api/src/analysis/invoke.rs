use crate::analysis::extract::ExtractionResult;
use crate::analysis::prompts::{text_prompt, ANALYSIS_PROMPT};
use crate::llm_client::{GenerativeModel, LlmError, ModelPart, ModelRequest};

/// Builds the model request for an extraction.
///
/// Text: one part, instructions followed by the document.
/// Binary: the attachment first, then the instructions as a separate part.
pub fn build_request(extraction: &ExtractionResult) -> ModelRequest {
    let parts = match extraction {
        ExtractionResult::Text(text) => vec![ModelPart::Text(text_prompt(text))],
        ExtractionResult::BinaryAttachment { data, mime_type } => vec![
            ModelPart::InlineBinary {
                mime_type: (*mime_type).to_string(),
                data: data.clone(),
            },
            ModelPart::Text(ANALYSIS_PROMPT.to_string()),
        ],
    };
    ModelRequest { parts }
}

/// Sends one analysis request and returns the model's raw text.
pub async fn invoke(
    model: &dyn GenerativeModel,
    extraction: &ExtractionResult,
) -> Result<String, LlmError> {
    model.generate(build_request(extraction)).await
}
