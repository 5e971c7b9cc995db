//! Deterministic [`GenerationService`] for tests and offline runs.
//!
//! Output is derived from the input text line by line:
//! - the first plain line becomes the title
//! - `Q: ...` lines become problems
//! - `SVG: ...` lines become visuals
//!
//! Any input containing [`FAILURE_MARKER`] fails the call and input
//! containing [`CONTINUATION_MARKER`] is judged a continuation.

use async_trait::async_trait;
use errors::GenerationError;
use nb_core::{
    ContinuationContext, ContinuationJudgment, GenerationService, NoteContent, NoteRequest,
    PracticeSet, Problem, SourceInput, SyllabusModule,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const FAILURE_MARKER: &str = "[fail]";
pub const CONTINUATION_MARKER: &str = "[continue]";

/// One recorded call, with the fields tests assert on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    GenerateNote { text: String, prior_context: Option<String> },
    IntegrateIntoNote { existing_title: String, text: String },
    AnalyzeContinuation { text: String, previous_title: String, excerpt: String },
    ExtractProblems { text: String },
    SummarizeNote { title: String },
    GeneratePracticeSet { topic: String },
    ParseRawText { text: String, domain: String },
    ParseSyllabus { text: String },
    GenerateSummaryTable { digests: usize },
    GenerateCheatSheet { digests: usize },
    TransformSelection { selected: String, instruction: String },
}

#[derive(Default)]
pub struct MockGenerationService {
    calls: Mutex<Vec<MockCall>>,
    latency: Option<Duration>,
    continuation_default: bool,
    fail_continuation: bool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockGenerationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Verdict returned when the input carries no continuation marker.
    pub fn with_continuation(mut self, verdict: bool) -> Self {
        self.continuation_default = verdict;
        self
    }

    /// Makes every continuation judgment fail.
    pub fn failing_continuation(mut self) -> Self {
        self.fail_continuation = true;
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Highest number of calls observed running at the same time.
    pub fn max_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, call: MockCall) -> InFlightGuard<'_> {
        self.calls.lock().push(call);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlightGuard(&self.in_flight);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        guard
    }
}

fn check(text: &str) -> Result<(), GenerationError> {
    if text.contains(FAILURE_MARKER) {
        return Err(GenerationError::request_failed(format!(
            "scripted failure for input: {}",
            text.trim()
        )));
    }
    Ok(())
}

fn is_directive(line: &str) -> bool {
    line.starts_with("Q:") || line.starts_with("SVG:")
}

fn title_of(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !is_directive(line))
        .map_or_else(
            || "Untitled".to_string(),
            |line| line.replace(CONTINUATION_MARKER, "").trim().to_string(),
        )
}

fn problems_in(text: &str) -> Vec<Problem> {
    text.lines()
        .filter_map(|line| line.trim().strip_prefix("Q:"))
        .map(|question| Problem::new(question.trim()))
        .collect()
}

fn visuals_in(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.trim().strip_prefix("SVG:"))
        .map(|svg| svg.trim().to_string())
        .collect()
}

fn content_from(text: &str, subtopic: &str) -> NoteContent {
    let title = title_of(text);
    NoteContent {
        analogy: format!("Like {title}"),
        conceptual_logic: format!("Why {title} matters"),
        condensed_review: vec![title.clone()],
        extended_explanation: text.trim().to_string(),
        class_problems: problems_in(text),
        visuals: visuals_in(text),
        subtopic: subtopic.to_string(),
        title,
        editor_content: None,
    }
}

fn practice_problem(level: &str, topic: &str) -> Problem {
    let mut problem = Problem::new(format!("{level}: {topic}"));
    problem.answer = format!("{level} answer");
    problem
}

#[async_trait]
impl GenerationService for MockGenerationService {
    async fn generate_note(&self, request: &NoteRequest) -> Result<NoteContent, GenerationError> {
        let _guard = self
            .enter(MockCall::GenerateNote {
                text: request.input.text.clone(),
                prior_context: request.prior_context.clone(),
            })
            .await;
        check(&request.input.text)?;
        Ok(content_from(&request.input.text, &request.domain))
    }

    async fn integrate_into_note(
        &self,
        existing: &NoteContent,
        input: &SourceInput,
    ) -> Result<NoteContent, GenerationError> {
        let _guard = self
            .enter(MockCall::IntegrateIntoNote {
                existing_title: existing.title.clone(),
                text: input.text.clone(),
            })
            .await;
        check(&input.text)?;

        let addition = title_of(&input.text);
        Ok(NoteContent {
            title: existing.title.clone(),
            subtopic: existing.subtopic.clone(),
            analogy: existing.analogy.clone(),
            conceptual_logic: format!("{} + {addition}", existing.conceptual_logic),
            condensed_review: existing
                .condensed_review
                .iter()
                .cloned()
                .chain(std::iter::once(addition))
                .collect(),
            extended_explanation: format!(
                "{}\n\n{}",
                existing.extended_explanation,
                input.text.trim()
            ),
            class_problems: problems_in(&input.text),
            visuals: visuals_in(&input.text),
            editor_content: None,
        })
    }

    async fn analyze_continuation(
        &self,
        input: &SourceInput,
        previous: &ContinuationContext,
    ) -> Result<ContinuationJudgment, GenerationError> {
        let _guard = self
            .enter(MockCall::AnalyzeContinuation {
                text: input.text.clone(),
                previous_title: previous.title.clone(),
                excerpt: previous.explanation_tail.clone(),
            })
            .await;
        if self.fail_continuation {
            return Err(GenerationError::request_failed("continuation judgment unavailable"));
        }
        check(&input.text)?;

        let is_continuation = input.text.contains(CONTINUATION_MARKER) || self.continuation_default;
        Ok(ContinuationJudgment {
            is_continuation,
            reasoning: Some(format!("compared with {}", previous.title)),
        })
    }

    async fn extract_problems(&self, input: &SourceInput) -> Result<Vec<Problem>, GenerationError> {
        let _guard = self
            .enter(MockCall::ExtractProblems {
                text: input.text.clone(),
            })
            .await;
        check(&input.text)?;
        Ok(problems_in(&input.text))
    }

    async fn summarize_note(&self, content: &NoteContent) -> Result<NoteContent, GenerationError> {
        let _guard = self
            .enter(MockCall::SummarizeNote {
                title: content.title.clone(),
            })
            .await;
        check(&content.title)?;

        let class_problems = content
            .class_problems
            .iter()
            .map(|problem| Problem {
                solution_steps: Vec::new(),
                ..problem.clone()
            })
            .collect();
        Ok(NoteContent {
            title: content.title.clone(),
            subtopic: content.subtopic.clone(),
            analogy: "N/A".to_string(),
            conceptual_logic: format!("Summary of {}", content.title),
            condensed_review: content.condensed_review.clone(),
            extended_explanation: String::new(),
            class_problems,
            visuals: Vec::new(),
            editor_content: None,
        })
    }

    async fn generate_practice_set(
        &self,
        topic: &str,
        context: &str,
    ) -> Result<PracticeSet, GenerationError> {
        let _guard = self
            .enter(MockCall::GeneratePracticeSet {
                topic: topic.to_string(),
            })
            .await;
        check(topic)?;
        check(context)?;
        Ok(PracticeSet {
            easy: practice_problem("Easy", topic),
            medium: practice_problem("Medium", topic),
            hard: practice_problem("Hard", topic),
        })
    }

    async fn parse_raw_text(
        &self,
        text: &str,
        domain: &str,
    ) -> Result<NoteContent, GenerationError> {
        let _guard = self
            .enter(MockCall::ParseRawText {
                text: text.to_string(),
                domain: domain.to_string(),
            })
            .await;
        check(text)?;
        let mut content = content_from(text, domain);
        content.extended_explanation = text.to_string();
        Ok(content)
    }

    async fn parse_syllabus(
        &self,
        input: &SourceInput,
    ) -> Result<Vec<SyllabusModule>, GenerationError> {
        let _guard = self
            .enter(MockCall::ParseSyllabus {
                text: input.text.clone(),
            })
            .await;
        check(&input.text)?;

        // "Title: sub one, sub two" per line
        Ok(input
            .text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match line.split_once(':') {
                Some((title, subtopics)) => SyllabusModule {
                    title: title.trim().to_string(),
                    subtopics: subtopics
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect(),
                },
                None => SyllabusModule {
                    title: line.to_string(),
                    subtopics: Vec::new(),
                },
            })
            .collect())
    }

    async fn generate_summary_table(&self, digests: &[String]) -> Result<String, GenerationError> {
        let _guard = self
            .enter(MockCall::GenerateSummaryTable {
                digests: digests.len(),
            })
            .await;
        for digest in digests {
            check(digest)?;
        }
        let rows: Vec<String> = digests
            .iter()
            .map(|digest| format!("| {} |", digest.lines().next().unwrap_or_default()))
            .collect();
        Ok(format!("| Concept |\n|---|\n{}", rows.join("\n")))
    }

    async fn generate_cheat_sheet(&self, digests: &[String]) -> Result<String, GenerationError> {
        let _guard = self
            .enter(MockCall::GenerateCheatSheet {
                digests: digests.len(),
            })
            .await;
        for digest in digests {
            check(digest)?;
        }
        Ok(format!("# Cheat Sheet\n\n{}", digests.join("\n\n")))
    }

    async fn transform_selection(
        &self,
        selected: &str,
        instruction: &str,
    ) -> Result<String, GenerationError> {
        let _guard = self
            .enter(MockCall::TransformSelection {
                selected: selected.to_string(),
                instruction: instruction.to_string(),
            })
            .await;
        check(selected)?;
        check(instruction)?;
        Ok(format!("{instruction}: {selected}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nb_core::DetailLevel;
    use std::sync::Arc;

    fn request(text: &str) -> NoteRequest {
        NoteRequest {
            input: SourceInput::text(text),
            detail: DetailLevel::Expanded,
            domain: "Physics".to_string(),
            prior_context: None,
        }
    }

    #[tokio::test]
    async fn test_generate_note_reads_directives() {
        let mock = MockGenerationService::new();
        let content = mock
            .generate_note(&request("Torque\nQ: lever arm?\nSVG: <svg/>"))
            .await
            .unwrap();

        assert_eq!(content.title, "Torque");
        assert_eq!(content.subtopic, "Physics");
        assert_eq!(content.class_problems[0].question, "lever arm?");
        assert_eq!(content.visuals, vec!["<svg/>".to_string()]);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_marker_fails_call() {
        let mock = MockGenerationService::new();
        let result = mock.generate_note(&request("Torque [fail]")).await;
        assert!(matches!(result, Err(GenerationError::RequestFailed { .. })));
    }

    #[tokio::test]
    async fn test_continuation_marker_and_default() {
        let previous = ContinuationContext {
            title: "Torque".to_string(),
            subtopic: String::new(),
            explanation_tail: String::new(),
        };
        let mock = MockGenerationService::new();
        let judged = mock
            .analyze_continuation(&SourceInput::text("part 2 [continue]"), &previous)
            .await
            .unwrap();
        assert!(judged.is_continuation);

        let judged = mock
            .analyze_continuation(&SourceInput::text("new topic"), &previous)
            .await
            .unwrap();
        assert!(!judged.is_continuation);

        let always = MockGenerationService::new().with_continuation(true);
        let judged = always
            .analyze_continuation(&SourceInput::text("anything"), &previous)
            .await
            .unwrap();
        assert!(judged.is_continuation);
    }

    #[tokio::test]
    async fn test_max_concurrency_tracks_overlap() {
        let mock = Arc::new(MockGenerationService::new().with_latency(Duration::from_millis(20)));
        let a = {
            let mock = mock.clone();
            tokio::spawn(async move { mock.extract_problems(&SourceInput::text("Q: a")).await })
        };
        let b = {
            let mock = mock.clone();
            tokio::spawn(async move { mock.extract_problems(&SourceInput::text("Q: b")).await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert_eq!(mock.max_concurrency(), 2);
    }

    #[tokio::test]
    async fn test_parse_syllabus_lines() {
        let mock = MockGenerationService::new();
        let modules = mock
            .parse_syllabus(&SourceInput::text("Kinematics: Velocity, Acceleration\nDynamics"))
            .await
            .unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].subtopics, vec!["Velocity", "Acceleration"]);
        assert!(modules[1].subtopics.is_empty());
    }
}
