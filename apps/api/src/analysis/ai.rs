//! The inference seam. `ResumeAi` takes a stored resume path and an
//! instruction string and returns the model's raw reply.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::analysis::response::{AiMessage, AiResponse, ContentPart, MessageContent};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError, LlmResponse};
use crate::storage::BlobStore;

#[async_trait]
pub trait ResumeAi: Send + Sync {
    /// Scores the resume at `file_path` following `instructions`.
    async fn feedback(&self, file_path: &str, instructions: &str)
        -> Result<AiResponse, LlmError>;

    /// Produces rewrite suggestions for the resume at `file_path`.
    async fn improve_resume(
        &self,
        file_path: &str,
        instructions: &str,
    ) -> Result<AiResponse, LlmError>;
}

/// Reads the PDF from blob storage and sends it to Claude as a document.
pub struct AnthropicResumeAi {
    llm: LlmClient,
    blobs: Arc<dyn BlobStore>,
}

impl AnthropicResumeAi {
    pub fn new(llm: LlmClient, blobs: Arc<dyn BlobStore>) -> Self {
        Self { llm, blobs }
    }

    async fn ask(&self, file_path: &str, instructions: &str) -> Result<AiResponse, LlmError> {
        let pdf = self
            .blobs
            .read(file_path)
            .await
            .map_err(|e| LlmError::DocumentUnavailable(e.to_string()))?
            .ok_or_else(|| LlmError::DocumentNotFound(file_path.to_string()))?;

        info!("Sending {} ({} bytes) to {}", file_path, pdf.len(), crate::llm_client::MODEL);
        let response = self
            .llm
            .call_with_pdf(instructions, JSON_ONLY_SYSTEM, &pdf)
            .await?;

        into_ai_response(response)
    }
}

#[async_trait]
impl ResumeAi for AnthropicResumeAi {
    async fn feedback(
        &self,
        file_path: &str,
        instructions: &str,
    ) -> Result<AiResponse, LlmError> {
        self.ask(file_path, instructions).await
    }

    async fn improve_resume(
        &self,
        file_path: &str,
        instructions: &str,
    ) -> Result<AiResponse, LlmError> {
        self.ask(file_path, instructions).await
    }
}

/// Keeps only text blocks; the first one becomes element 0 of the parts list.
fn into_ai_response(response: LlmResponse) -> Result<AiResponse, LlmError> {
    let parts: Vec<ContentPart> = response
        .content
        .into_iter()
        .filter(|b| b.block_type == "text")
        .map(|b| ContentPart {
            part_type: Some(b.block_type),
            text: b.text,
        })
        .collect();

    if parts.is_empty() {
        return Err(LlmError::EmptyContent);
    }

    Ok(AiResponse {
        message: AiMessage {
            content: MessageContent::Parts(parts),
        },
    })
}
