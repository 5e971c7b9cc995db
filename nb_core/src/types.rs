use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Milliseconds since the Unix epoch, the resolution used for `created_at`.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NoteType {
    #[default]
    Concept,
    Example,
    Mixed,
}

/// How far the generator may go beyond what the input literally shows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DetailLevel {
    /// Polished version of the input only.
    #[serde(alias = "strict")]
    Strict,
    /// Adds the context needed to make the concept clear.
    #[default]
    #[serde(alias = "expanded")]
    Expanded,
}

/// A notebook. Summary notebooks point back at their source via
/// `original_subject_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub is_summary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_subject_id: Option<String>,
}

impl Subject {
    /// Id used for the summary twin of a regular subject.
    pub fn summary_twin_id(&self) -> String {
        format!("{}_summary", self.id)
    }

    pub fn summary_twin(&self) -> Subject {
        Subject {
            id: self.summary_twin_id(),
            title: self.title.clone(),
            term: self.term.clone(),
            year: self.year.clone(),
            cover_image: self.cover_image.clone(),
            is_summary: true,
            original_subject_id: Some(self.id.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub subject_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_table: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStatus {
    pub safe: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// A worked exercise. Owned by value by its note's content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Problem {
    pub id: String,
    pub question: String,
    pub given: Vec<String>,
    pub formulas: Vec<String>,
    pub solution_steps: Vec<String>,
    pub solution_math: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trick: Option<String>,
    pub answer: String,
    pub unit_status: UnitStatus,
}

impl Problem {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            question: question.into(),
            unit_status: UnitStatus {
                safe: true,
                warning: None,
            },
            ..Default::default()
        }
    }

    /// Model output frequently omits ids.
    pub fn ensure_id(&mut self) {
        if self.id.trim().is_empty() {
            self.id = uuid::Uuid::new_v4().to_string();
        }
    }
}

/// Structured body of a note. Every field defaults so partial model output
/// still deserializes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteContent {
    pub title: String,
    pub subtopic: String,
    pub analogy: String,
    pub conceptual_logic: String,
    pub condensed_review: Vec<String>,
    pub extended_explanation: String,
    pub class_problems: Vec<Problem>,
    pub visuals: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_content: Option<serde_json::Value>,
}

impl NoteContent {
    pub fn ensure_problem_ids(&mut self) {
        for problem in &mut self.class_problems {
            problem.ensure_id();
        }
    }

    /// Last `max_chars` characters of the explanation, on a char boundary.
    pub fn explanation_tail(&self, max_chars: usize) -> &str {
        let text = self.extended_explanation.as_str();
        let count = text.chars().count();
        if count <= max_chars {
            return text;
        }
        let skip = count - max_chars;
        let offset = text
            .char_indices()
            .nth(skip)
            .map(|(idx, _)| idx)
            .unwrap_or(text.len());
        &text[offset..]
    }

    /// One-paragraph digest used by chapter-level study tools.
    pub fn digest(&self) -> String {
        format!(
            "Title: {}\nConcept: {}\nFormulas: {}",
            self.title,
            self.conceptual_logic,
            self.condensed_review.join("; ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub subject_id: String,
    pub chapter_id: String,
    pub created_at: i64,
    /// Display sort key within the chapter. Uniqueness is not required.
    pub order: i64,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    pub content: NoteContent,
    pub images: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteRecord {
    id: String,
    subject_id: String,
    chapter_id: String,
    #[serde(default)]
    created_at: i64,
    #[serde(default)]
    order: Option<i64>,
    #[serde(rename = "type", default)]
    note_type: NoteType,
    #[serde(default)]
    content: NoteContent,
    #[serde(default)]
    images: Vec<String>,
}

impl From<NoteRecord> for Note {
    fn from(record: NoteRecord) -> Self {
        Self {
            order: record.order.unwrap_or(record.created_at),
            id: record.id,
            subject_id: record.subject_id,
            chapter_id: record.chapter_id,
            created_at: record.created_at,
            note_type: record.note_type,
            content: record.content,
            images: record.images,
        }
    }
}

impl<'de> Deserialize<'de> for Note {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        NoteRecord::deserialize(deserializer).map(Note::from)
    }
}

/// Easy / medium / hard practice problems for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeSet {
    pub easy: Problem,
    pub medium: Problem,
    pub hard: Problem,
}

impl PracticeSet {
    pub fn into_problems(self) -> [Problem; 3] {
        [self.easy, self.medium, self.hard]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllabusModule {
    pub title: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuationJudgment {
    pub is_continuation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}
