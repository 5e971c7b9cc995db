use async_trait::async_trait;
use errors::GenerationError;
use nb_core::SourceInput;
use serde_json::Value;

/// Piece of a multimodal prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// Base64 payload without a data-URL prefix.
    InlineImage { mime_type: String, data: String },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn jpeg(data: impl Into<String>) -> Self {
        Self::InlineImage {
            mime_type: "image/jpeg".to_string(),
            data: data.into(),
        }
    }
}

/// One request/response exchange with a hosted model.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub parts: Vec<Part>,
    /// When set the model is asked for JSON matching this schema.
    pub response_schema: Option<Value>,
    pub thinking_budget: Option<u32>,
}

impl LlmRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            parts: vec![Part::text(prompt)],
            response_schema: None,
            thinking_budget: None,
        }
    }

    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }

    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Appends the input text under `label` when non-blank, then the image.
    pub fn with_input(mut self, label: &str, input: &SourceInput) -> Self {
        if !input.text.trim().is_empty() {
            self.parts.push(Part::text(format!("{label}: {}", input.text)));
        }
        if let Some(image) = &input.image {
            self.parts.push(Part::jpeg(image.clone()));
        }
        self
    }
}

/// Transport to a hosted model. Returns the raw text of the reply.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, request: LlmRequest) -> Result<String, GenerationError>;
}
