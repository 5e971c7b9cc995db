//! # Generation
//!
//! Implementations of [`nb_core::GenerationService`].
//!
//! - [`PromptedGenerationService`]: builds prompts and response schemas and
//!   talks to a hosted model through the [`LlmClient`] seam
//! - [`GeminiClient`]: REST client for the Gemini `generateContent` endpoint
//! - [`MockGenerationService`]: deterministic, scriptable service for tests

pub mod gemini;
pub mod llm;
pub mod mock;
pub mod prompts;
pub mod response;
pub mod schema;
pub mod service;

pub use gemini::GeminiClient;
pub use llm::{LlmClient, LlmRequest, Part};
pub use mock::{MockCall, MockGenerationService};
pub use service::PromptedGenerationService;
