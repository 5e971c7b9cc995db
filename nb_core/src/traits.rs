//! Collaborator traits the queue engine is written against.

use async_trait::async_trait;
use errors::{GenerationError, StoreError};
use serde::{Deserialize, Serialize};

use crate::task::SourceInput;
use crate::types::{
    Chapter, ContinuationJudgment, DetailLevel, Note, NoteContent, PracticeSet, Problem, Subject,
    SyllabusModule,
};

/// Input for a full note generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRequest {
    pub input: SourceInput,
    pub detail: DetailLevel,
    pub domain: String,
    /// Content of the preceding note, for coherence across notes.
    pub prior_context: Option<String>,
}

/// Excerpt of the previous note shown to the continuation judgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationContext {
    pub title: String,
    pub subtopic: String,
    pub explanation_tail: String,
}

impl ContinuationContext {
    pub fn from_content(content: &NoteContent, excerpt_chars: usize) -> Self {
        Self {
            title: content.title.clone(),
            subtopic: content.subtopic.clone(),
            explanation_tail: content.explanation_tail(excerpt_chars).to_string(),
        }
    }
}

/// Hosted generative service producing structured study content.
///
/// Every call is request/response and may fail with an opaque
/// [`GenerationError`].
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Full note content from raw input.
    async fn generate_note(&self, request: &NoteRequest) -> Result<NoteContent, GenerationError>;

    /// Weaves new input into an existing note. The returned problems and
    /// visuals contain only what the new input adds; prose fields are
    /// rewritten.
    async fn integrate_into_note(
        &self,
        existing: &NoteContent,
        input: &SourceInput,
    ) -> Result<NoteContent, GenerationError>;

    /// Whether `input` directly continues the previous note.
    async fn analyze_continuation(
        &self,
        input: &SourceInput,
        previous: &ContinuationContext,
    ) -> Result<ContinuationJudgment, GenerationError>;

    async fn extract_problems(&self, input: &SourceInput) -> Result<Vec<Problem>, GenerationError>;

    /// Condensed cheat-sheet version of a note.
    async fn summarize_note(&self, content: &NoteContent) -> Result<NoteContent, GenerationError>;

    async fn generate_practice_set(
        &self,
        topic: &str,
        context: &str,
    ) -> Result<PracticeSet, GenerationError>;

    /// Structures pasted text without regenerating it.
    async fn parse_raw_text(&self, text: &str, domain: &str)
    -> Result<NoteContent, GenerationError>;

    async fn parse_syllabus(
        &self,
        input: &SourceInput,
    ) -> Result<Vec<SyllabusModule>, GenerationError>;

    /// Markdown summary table for a chapter, from per-note digests.
    async fn generate_summary_table(&self, digests: &[String]) -> Result<String, GenerationError>;

    /// Markdown formula cheat sheet for a chapter, from per-note digests.
    async fn generate_cheat_sheet(&self, digests: &[String]) -> Result<String, GenerationError>;

    /// Rewrites a text selection following a free-form instruction.
    async fn transform_selection(
        &self,
        selected: &str,
        instruction: &str,
    ) -> Result<String, GenerationError>;
}

/// Partial or full update of a note. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotePatch {
    pub content: Option<NoteContent>,
    pub images: Option<Vec<String>>,
    /// Title-only edit, applied after `content`.
    pub title: Option<String>,
}

impl NotePatch {
    pub fn content(content: NoteContent) -> Self {
        Self {
            content: Some(content),
            ..Default::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn apply_to(self, note: &mut Note) {
        if let Some(content) = self.content {
            note.content = content;
        }
        if let Some(images) = self.images {
            note.images = images;
        }
        if let Some(title) = self.title {
            note.content.title = title;
        }
    }
}

/// Document store for subjects, chapters and notes.
///
/// Operations are synchronous in-memory calls; the queue engine never
/// suspends on them.
pub trait ContentStore: Send + Sync {
    fn create_chapter(&self, title: &str, subject_id: &str) -> Result<String, StoreError>;

    /// Inserts the note and returns it as stored (with its assigned order).
    fn create_note(&self, note: Note) -> Result<Note, StoreError>;

    fn update_note(&self, id: &str, patch: NotePatch) -> Result<Note, StoreError>;

    fn list_notes_by_chapter(&self, chapter_id: &str) -> Vec<Note>;

    fn set_selected_note(&self, note: Option<Note>);

    fn selected_note(&self) -> Option<Note>;

    fn get_note(&self, id: &str) -> Option<Note>;

    fn get_subject(&self, id: &str) -> Option<Subject>;

    fn get_chapter(&self, id: &str) -> Option<Chapter>;

    fn list_subjects(&self) -> Vec<Subject>;

    fn list_chapters_by_subject(&self, subject_id: &str) -> Vec<Chapter>;

    fn update_chapter_summary(&self, chapter_id: &str, summary: &str) -> Result<(), StoreError>;

    /// Creates a subject and its summary twin, with one chapter per module
    /// and one placeholder note per subtopic. Returns the regular subject.
    fn add_subject(
        &self,
        title: &str,
        term: &str,
        year: &str,
        structure: &[SyllabusModule],
    ) -> Subject;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NoteType;

    fn note() -> Note {
        Note {
            id: "n1".to_string(),
            subject_id: "s1".to_string(),
            chapter_id: "c1".to_string(),
            created_at: 1,
            order: 1,
            note_type: NoteType::Concept,
            content: NoteContent {
                title: "Old".to_string(),
                ..Default::default()
            },
            images: vec!["a".to_string()],
        }
    }

    #[test]
    fn test_title_patch_keeps_rest_of_content() {
        let mut note = note();
        note.content.analogy = "wheel".to_string();
        NotePatch::title("New").apply_to(&mut note);
        assert_eq!(note.content.title, "New");
        assert_eq!(note.content.analogy, "wheel");
        assert_eq!(note.images, vec!["a".to_string()]);
    }

    #[test]
    fn test_content_patch_with_images_replaces_both() {
        let mut note = note();
        let content = NoteContent {
            title: "Merged".to_string(),
            ..Default::default()
        };
        NotePatch::content(content)
            .with_images(vec!["a".to_string(), "b".to_string()])
            .apply_to(&mut note);
        assert_eq!(note.content.title, "Merged");
        assert_eq!(note.images.len(), 2);
    }

    #[test]
    fn test_continuation_context_takes_tail() {
        let content = NoteContent {
            title: "Torque".to_string(),
            subtopic: "Rotation".to_string(),
            extended_explanation: "abcdefghij".to_string(),
            ..Default::default()
        };
        let context = ContinuationContext::from_content(&content, 4);
        assert_eq!(context.explanation_tail, "ghij");
        assert_eq!(context.title, "Torque");
    }
}
