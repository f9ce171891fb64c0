//! Language Model traits

use async_trait::async_trait;

use crate::{GenerateRequest, GenerateResponse, Result, ToolDefinition};

/// Language Model interface
///
/// Implementations:
/// - `OpenAIBackend` - any OpenAI-compatible chat completions endpoint
///
/// Capacity problems (rate limit, quota, timeout) must be reported as
/// [`crate::Error::ModelUnavailable`] so callers can answer with a fallback.
///
/// # Example
///
/// ```ignore
/// let llm: Arc<dyn LanguageModel> = Arc::new(OpenAIBackend::new(config)?);
/// let request = GenerateRequest::new("Sos un asistente inmobiliario")
///     .with_user_message("Busco alquilar en Palermo");
/// let response = llm.generate_with_tools(request, &tools).await?;
/// ```
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Generate with tool/function calling
    ///
    /// # Arguments
    /// * `request` - Generation request
    /// * `tools` - Available tool definitions, empty for plain completion
    ///
    /// # Returns
    /// Response which may include tool calls in addition to text
    async fn generate_with_tools(
        &self,
        request: GenerateRequest,
        tools: &[ToolDefinition],
    ) -> Result<GenerateResponse>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
