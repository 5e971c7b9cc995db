//! # Prompted Generation Service
//!
//! [`GenerationService`] on top of any [`LlmClient`].
//!
//! - Reasoning model: note generation, integration, problem extraction
//! - Fast model: every other operation
//! - Replies are parsed leniently and normalised (problem ids, SVG cleanup)

use async_trait::async_trait;
use config::GenerationConfig;
use errors::GenerationError;
use nb_core::{
    ContinuationContext, ContinuationJudgment, GenerationService, NoteContent, NoteRequest,
    PracticeSet, Problem, SourceInput, SyllabusModule,
};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::llm::{LlmClient, LlmRequest};
use crate::prompts;
use crate::response::{clean_text, clean_visuals, parse_json};
use crate::schema;

const NOTE_THINKING_BUDGET: u32 = 2048;
const INTEGRATION_THINKING_BUDGET: u32 = 4096;

#[derive(Deserialize)]
struct ProblemsReply {
    #[serde(default)]
    problems: Vec<Problem>,
}

#[derive(Deserialize)]
struct SyllabusReply {
    #[serde(default)]
    modules: Vec<SyllabusModule>,
}

pub struct PromptedGenerationService<C> {
    client: C,
    reasoning_model: String,
    fast_model: String,
    prior_context_chars: usize,
}

impl<C: LlmClient> PromptedGenerationService<C> {
    pub fn new(client: C, config: &GenerationConfig) -> Self {
        Self {
            client,
            reasoning_model: config.reasoning_model.clone(),
            fast_model: config.fast_model.clone(),
            prior_context_chars: config.prior_context_chars,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn normalise(mut content: NoteContent) -> NoteContent {
        content.ensure_problem_ids();
        content.visuals = clean_visuals(std::mem::take(&mut content.visuals));
        content
    }

    /// Free-form text reply; an empty reply yields `fallback`.
    async fn text_reply(
        &self,
        request: LlmRequest,
        fallback: String,
    ) -> Result<String, GenerationError> {
        match self.client.generate(request).await {
            Ok(text) => Ok(clean_text(&text)),
            Err(GenerationError::EmptyResponse) => Ok(fallback),
            Err(e) => Err(e),
        }
    }

    async fn note_reply(&self, request: LlmRequest) -> Result<NoteContent, GenerationError> {
        let text = self.client.generate(request).await?;
        parse_json::<NoteContent>(&text).map(Self::normalise)
    }
}

#[async_trait]
impl<C: LlmClient> GenerationService for PromptedGenerationService<C> {
    #[instrument(skip_all, fields(domain = %request.domain, detail = %request.detail))]
    async fn generate_note(&self, request: &NoteRequest) -> Result<NoteContent, GenerationError> {
        let prompt = prompts::generate_note(
            &request.domain,
            request.detail,
            request.prior_context.as_deref(),
            self.prior_context_chars,
        );
        let llm_request = LlmRequest::new(&self.reasoning_model, prompt)
            .with_system(prompts::note_system_instruction(&request.domain))
            .with_schema(schema::note())
            .with_thinking_budget(NOTE_THINKING_BUDGET)
            .with_input("Additional User Notes", &request.input);

        self.note_reply(llm_request).await
    }

    #[instrument(skip_all)]
    async fn integrate_into_note(
        &self,
        existing: &NoteContent,
        input: &SourceInput,
    ) -> Result<NoteContent, GenerationError> {
        let mut llm_request =
            LlmRequest::new(&self.reasoning_model, prompts::integrate(existing, &input.text))
                .with_system(prompts::EDITOR_SYSTEM_INSTRUCTION)
                .with_schema(schema::note())
                .with_thinking_budget(INTEGRATION_THINKING_BUDGET);
        if let Some(image) = &input.image {
            llm_request = llm_request.with_part(crate::llm::Part::jpeg(image.clone()));
        }

        self.note_reply(llm_request).await
    }

    #[instrument(skip_all, fields(previous = %previous.title))]
    async fn analyze_continuation(
        &self,
        input: &SourceInput,
        previous: &ContinuationContext,
    ) -> Result<ContinuationJudgment, GenerationError> {
        let llm_request = LlmRequest::new(&self.fast_model, prompts::continuation(previous))
            .with_schema(schema::continuation())
            .with_input("New Input Text", input);

        match self.client.generate(llm_request).await {
            Ok(text) => parse_json(&text),
            Err(GenerationError::EmptyResponse) => {
                debug!("Empty continuation reply, treating as not a continuation");
                Ok(ContinuationJudgment::default())
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip_all)]
    async fn extract_problems(&self, input: &SourceInput) -> Result<Vec<Problem>, GenerationError> {
        let llm_request = LlmRequest::new(&self.reasoning_model, prompts::extract_problems())
            .with_schema(schema::problems_only())
            .with_input("Input Text", input);

        let text = self.client.generate(llm_request).await?;
        let mut problems = parse_json::<ProblemsReply>(&text)?.problems;
        for problem in &mut problems {
            problem.ensure_id();
        }
        Ok(problems)
    }

    #[instrument(skip_all, fields(title = %content.title))]
    async fn summarize_note(&self, content: &NoteContent) -> Result<NoteContent, GenerationError> {
        let llm_request = LlmRequest::new(&self.fast_model, prompts::summarize(content))
            .with_schema(schema::note());

        self.note_reply(llm_request).await
    }

    #[instrument(skip_all, fields(topic = %topic))]
    async fn generate_practice_set(
        &self,
        topic: &str,
        context: &str,
    ) -> Result<PracticeSet, GenerationError> {
        let llm_request = LlmRequest::new(&self.fast_model, prompts::practice_set(topic, context))
            .with_schema(schema::practice_set());

        let text = self.client.generate(llm_request).await?;
        let mut set: PracticeSet = parse_json(&text)?;
        set.easy.ensure_id();
        set.medium.ensure_id();
        set.hard.ensure_id();
        Ok(set)
    }

    #[instrument(skip_all, fields(domain = %domain))]
    async fn parse_raw_text(
        &self,
        text: &str,
        domain: &str,
    ) -> Result<NoteContent, GenerationError> {
        let llm_request = LlmRequest::new(&self.fast_model, prompts::parse_raw_text(text, domain))
            .with_schema(schema::note());

        let mut content = self.note_reply(llm_request).await?;
        content.extended_explanation = text.to_string();
        Ok(content)
    }

    #[instrument(skip_all)]
    async fn parse_syllabus(
        &self,
        input: &SourceInput,
    ) -> Result<Vec<SyllabusModule>, GenerationError> {
        let llm_request = LlmRequest::new(&self.fast_model, prompts::syllabus())
            .with_schema(schema::syllabus())
            .with_input("Syllabus Text", input);

        match self.client.generate(llm_request).await {
            Ok(text) => Ok(parse_json::<SyllabusReply>(&text)?.modules),
            Err(GenerationError::EmptyResponse) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn generate_summary_table(&self, digests: &[String]) -> Result<String, GenerationError> {
        let llm_request = LlmRequest::new(&self.fast_model, prompts::summary_table(digests));
        self.text_reply(llm_request, String::new()).await
    }

    async fn generate_cheat_sheet(&self, digests: &[String]) -> Result<String, GenerationError> {
        let llm_request = LlmRequest::new(&self.fast_model, prompts::cheat_sheet(digests));
        self.text_reply(llm_request, String::new()).await
    }

    async fn transform_selection(
        &self,
        selected: &str,
        instruction: &str,
    ) -> Result<String, GenerationError> {
        let llm_request = LlmRequest::new(
            &self.fast_model,
            prompts::transform_selection(selected, instruction),
        );

        self.text_reply(llm_request, selected.to_string()).await
    }
}
