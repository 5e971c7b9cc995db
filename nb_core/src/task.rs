//! Queue task types.
//!
//! A [`QueueItem`] is created by a producer, consumed exactly once by the
//! queue engine and never persisted. Each task kind carries only the fields
//! it needs.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::{Note, now_millis};

/// Raw input handed to the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceInput {
    pub text: String,
    /// Base64 encoded image, without a data-URL prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl SourceInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum ChapterTarget {
    Existing { chapter_id: String },
    /// Create the chapter when the task starts running.
    New { title: String },
}

impl ChapterTarget {
    pub fn existing(chapter_id: impl Into<String>) -> Self {
        Self::Existing {
            chapter_id: chapter_id.into(),
        }
    }

    pub fn new_chapter(title: impl Into<String>) -> Self {
        Self::New {
            title: title.into(),
        }
    }

    pub fn new_chapter_title(&self) -> Option<&str> {
        match self {
            Self::New { title } => Some(title.as_str()),
            Self::Existing { .. } => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CreateMode {
    #[default]
    Concept,
    Problem,
    /// Raw text paste; the text itself becomes the explanation.
    Import,
    /// Placeholder note, no generation call.
    Blank,
}

/// User-supplied placement signals, consulted in priority order by the
/// placement resolver.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlacementHints {
    pub target_note_id: Option<String>,
    pub force_new_note: bool,
    pub custom_subtopic: Option<String>,
}

impl PlacementHints {
    /// Trimmed custom subtopic, `None` when absent or blank.
    pub fn custom_title(&self) -> Option<&str> {
        self.custom_subtopic
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.target_note_id.is_none() && !self.force_new_note && self.custom_title().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub input: SourceInput,
    #[serde(default)]
    pub placement: PlacementHints,
    #[serde(default)]
    pub mode: CreateMode,
    /// Concept mode: also generate practice problems. Problem mode: also
    /// generate the concept body.
    #[serde(default)]
    pub include_add_on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeTask {
    /// Snapshot of the note taken when the task was enqueued.
    pub source: Note,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "taskType")]
pub enum TaskKind {
    Create(CreateTask),
    Summarize(SummarizeTask),
}

impl TaskKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Summarize(_) => "summarize",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: String,
    pub subject_id: String,
    pub chapter: ChapterTarget,
    pub kind: TaskKind,
    pub created_at: i64,
}

impl QueueItem {
    pub fn create(
        subject_id: impl Into<String>,
        chapter: ChapterTarget,
        task: CreateTask,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            subject_id: subject_id.into(),
            chapter,
            kind: TaskKind::Create(task),
            created_at: now_millis(),
        }
    }

    pub fn summarize(
        summary_subject_id: impl Into<String>,
        chapter: ChapterTarget,
        source: Note,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            subject_id: summary_subject_id.into(),
            chapter,
            kind: TaskKind::Summarize(SummarizeTask { source }),
            created_at: now_millis(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}
