//! # Task Planning
//!
//! Turns one queue item into the generation calls it needs and the store
//! mutations ([`Effect`]s) that follow from their results. Planning reads
//! a snapshot of the target chapter and never writes to the store; the
//! engine applies the effects afterwards.

use config::GenerationConfig;
use errors::GenerationError;
use nb_core::{
    CreateMode, CreateTask, DetailLevel, GenerationService, Note, NoteContent, NotePatch,
    NoteRequest, NoteType, Problem, QueueItem, SummarizeTask, TaskKind, now_millis,
};
use serde::Serialize;

use crate::placement::{Placement, resolve};

const PROBLEM_SET_TITLE: &str = "Problem Set";
const UNTITLED_NOTE: &str = "Untitled Note";
const START_WRITING: &str = "Start writing here...";

/// Settings the planner reads from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSettings {
    pub detail: DetailLevel,
    /// Used when the task carries no domain of its own.
    pub domain: String,
    pub continuation_excerpt_chars: usize,
}

impl QueueSettings {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            detail: config.detail_level,
            domain: config.domain.clone(),
            continuation_excerpt_chars: config.continuation_excerpt_chars,
        }
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

/// A store mutation produced by planning.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// `select` makes the stored note the selected note.
    CreateNote { note: Note, select: bool },
    UpdateNote { note_id: String, patch: NotePatch },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TaskOutcome {
    Created { note_id: String },
    Merged { note_id: String },
}

impl TaskOutcome {
    pub fn note_id(&self) -> &str {
        match self {
            Self::Created { note_id } | Self::Merged { note_id } => note_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskPlan {
    /// `None` for tasks that always create (summaries, blank notes).
    pub placement: Option<Placement>,
    pub effects: Vec<Effect>,
}

impl TaskPlan {
    fn single(placement: Option<Placement>, effect: Effect) -> Self {
        Self {
            placement,
            effects: vec![effect],
        }
    }

    pub fn outcome(&self) -> Option<TaskOutcome> {
        self.effects.first().map(|effect| match effect {
            Effect::CreateNote { note, .. } => TaskOutcome::Created {
                note_id: note.id.clone(),
            },
            Effect::UpdateNote { note_id, .. } => TaskOutcome::Merged {
                note_id: note_id.clone(),
            },
        })
    }
}

/// Plans `item` against the notes currently in `chapter_id`.
///
/// Any generation failure aborts the whole plan; nothing has been written
/// at that point.
pub async fn plan_task(
    item: &QueueItem,
    chapter_id: &str,
    chapter_notes: &[Note],
    generation: &dyn GenerationService,
    settings: &QueueSettings,
) -> Result<TaskPlan, GenerationError> {
    let target = Target { item, chapter_id };
    match &item.kind {
        TaskKind::Summarize(task) => plan_summary(&target, task, generation).await,
        TaskKind::Create(task) if task.mode == CreateMode::Blank => Ok(TaskPlan::single(
            None,
            Effect::CreateNote {
                note: target.note(NoteType::Concept, blank_content(task), Vec::new()),
                select: true,
            },
        )),
        TaskKind::Create(task) => {
            let placement = resolve(
                task,
                chapter_notes,
                generation,
                settings.continuation_excerpt_chars,
            )
            .await;

            let effect = match &placement {
                Placement::Merge { note_id } => {
                    // The resolver only merges into notes of this chapter.
                    match chapter_notes.iter().find(|note| &note.id == note_id) {
                        Some(existing) => plan_merge(existing, task, generation).await?,
                        None => plan_new(&target, task, None, generation, settings).await?,
                    }
                }
                Placement::New { title } => {
                    plan_new(&target, task, title.as_deref(), generation, settings).await?
                }
            };
            Ok(TaskPlan::single(Some(placement), effect))
        }
    }
}

/// Where a new note lands.
struct Target<'a> {
    item: &'a QueueItem,
    chapter_id: &'a str,
}

impl Target<'_> {
    fn note(&self, note_type: NoteType, content: NoteContent, images: Vec<String>) -> Note {
        Note {
            id: self.item.id.clone(),
            subject_id: self.item.subject_id.clone(),
            chapter_id: self.chapter_id.to_string(),
            created_at: now_millis(),
            // Assigned by the store.
            order: 0,
            note_type,
            content,
            images,
        }
    }
}

async fn plan_summary(
    target: &Target<'_>,
    task: &SummarizeTask,
    generation: &dyn GenerationService,
) -> Result<TaskPlan, GenerationError> {
    let content = generation.summarize_note(&task.source.content).await?;
    let note = target.note(NoteType::Concept, content, task.source.images.clone());
    Ok(TaskPlan::single(
        None,
        Effect::CreateNote {
            note,
            select: false,
        },
    ))
}

async fn practice_triple(
    generation: &dyn GenerationService,
    content: &NoteContent,
) -> Result<Vec<Problem>, GenerationError> {
    let set = generation
        .generate_practice_set(&content.title, &content.extended_explanation)
        .await?;
    Ok(set.into_problems().into())
}

/// Problems and visuals keep the order existing, integrated, add-on.
async fn plan_merge(
    existing: &Note,
    task: &CreateTask,
    generation: &dyn GenerationService,
) -> Result<Effect, GenerationError> {
    let integrated = generation
        .integrate_into_note(&existing.content, &task.input)
        .await?;
    let add_on = if task.include_add_on {
        practice_triple(generation, &integrated).await?
    } else {
        Vec::new()
    };

    let class_problems = existing
        .content
        .class_problems
        .iter()
        .chain(integrated.class_problems.iter())
        .cloned()
        .chain(add_on)
        .collect();
    let visuals = existing
        .content
        .visuals
        .iter()
        .chain(integrated.visuals.iter())
        .cloned()
        .collect();
    let content = NoteContent {
        class_problems,
        visuals,
        ..integrated
    };

    let mut patch = NotePatch::content(content);
    if let Some(image) = &task.input.image {
        let mut images = existing.images.clone();
        images.push(image.clone());
        patch = patch.with_images(images);
    }
    Ok(Effect::UpdateNote {
        note_id: existing.id.clone(),
        patch,
    })
}

async fn plan_new(
    target: &Target<'_>,
    task: &CreateTask,
    custom_title: Option<&str>,
    generation: &dyn GenerationService,
    settings: &QueueSettings,
) -> Result<Effect, GenerationError> {
    let domain = task
        .domain
        .clone()
        .unwrap_or_else(|| settings.domain.clone());
    let request = NoteRequest {
        input: task.input.clone(),
        detail: settings.detail,
        domain: domain.clone(),
        prior_context: None,
    };
    let images: Vec<String> = task.input.image.iter().cloned().collect();

    let note = match task.mode {
        CreateMode::Problem => {
            let problems = generation.extract_problems(&task.input).await?;
            if task.include_add_on {
                let mut content = generation.generate_note(&request).await?;
                content.class_problems = problems;
                target.note(NoteType::Mixed, content, images)
            } else {
                let title = custom_title
                    .or_else(|| target.item.chapter.new_chapter_title())
                    .unwrap_or(PROBLEM_SET_TITLE);
                target.note(NoteType::Example, problem_set_content(title, problems), images)
            }
        }
        CreateMode::Import => {
            let mut content = generation.parse_raw_text(&task.input.text, &domain).await?;
            if let Some(title) = custom_title {
                content.title = title.to_string();
                content.subtopic = "Imported Note".to_string();
            }
            target.note(NoteType::Concept, content, Vec::new())
        }
        CreateMode::Concept | CreateMode::Blank => {
            let mut content = generation.generate_note(&request).await?;
            if let Some(title) = custom_title {
                content.title = title.to_string();
                content.subtopic = "Manual Entry".to_string();
            }
            let note_type = if task.include_add_on {
                let triple = practice_triple(generation, &content).await?;
                content.class_problems.extend(triple);
                NoteType::Mixed
            } else {
                NoteType::Concept
            };
            target.note(note_type, content, images)
        }
    };

    Ok(Effect::CreateNote { note, select: true })
}

fn problem_set_content(title: &str, problems: Vec<Problem>) -> NoteContent {
    NoteContent {
        title: title.to_string(),
        subtopic: "Practice".to_string(),
        analogy: "N/A".to_string(),
        conceptual_logic: "N/A".to_string(),
        extended_explanation: "Problem set only.".to_string(),
        class_problems: problems,
        ..Default::default()
    }
}

fn blank_content(task: &CreateTask) -> NoteContent {
    let custom = task.placement.custom_title();
    let title = custom.unwrap_or(UNTITLED_NOTE);
    NoteContent {
        title: title.to_string(),
        subtopic: if custom.is_some() { "Manual Entry" } else { "New Topic" }.to_string(),
        analogy: "N/A".to_string(),
        conceptual_logic: START_WRITING.to_string(),
        editor_content: Some(serde_json::Value::String(format!(
            "<h1>{title}</h1><p>{START_WRITING}</p>"
        ))),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use generation::MockGenerationService;
    use nb_core::{ChapterTarget, PlacementHints, SourceInput};

    fn blank_item(custom: Option<&str>) -> QueueItem {
        QueueItem::create(
            "s1",
            ChapterTarget::existing("c1"),
            CreateTask {
                input: SourceInput::text(""),
                mode: CreateMode::Blank,
                placement: PlacementHints {
                    custom_subtopic: custom.map(str::to_string),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_settings_follow_generation_config() {
        let config = GenerationConfig {
            detail_level: DetailLevel::Strict,
            domain: "Chemistry".to_string(),
            continuation_excerpt_chars: 120,
            ..Default::default()
        };
        let settings = QueueSettings::from_config(&config);
        assert_eq!(settings.detail, DetailLevel::Strict);
        assert_eq!(settings.domain, "Chemistry");
        assert_eq!(settings.continuation_excerpt_chars, 120);
        assert_eq!(QueueSettings::default().continuation_excerpt_chars, 300);
    }

    #[tokio::test]
    async fn test_blank_plan_creates_selected_placeholder() {
        let mock = MockGenerationService::new();
        let item = blank_item(Some("  Kinematics "));
        let plan = plan_task(&item, "c1", &[], &mock, &QueueSettings::default())
            .await
            .unwrap();

        assert!(plan.placement.is_none());
        assert_eq!(mock.call_count(), 0);
        match plan.effects.as_slice() {
            [Effect::CreateNote { note, select }] => {
                assert!(*select);
                assert_eq!(note.id, item.id);
                assert_eq!(note.chapter_id, "c1");
                assert_eq!(note.content.title, "Kinematics");
                assert_eq!(note.content.subtopic, "Manual Entry");
            }
            other => panic!("unexpected effects: {other:?}"),
        }
        assert_eq!(
            plan.outcome(),
            Some(TaskOutcome::Created {
                note_id: item.id.clone()
            })
        );
    }

    #[test]
    fn test_blank_content_defaults() {
        let content = blank_content(&CreateTask::default());
        assert_eq!(content.title, UNTITLED_NOTE);
        assert_eq!(content.subtopic, "New Topic");
        assert_eq!(
            content.editor_content,
            Some(serde_json::Value::String(
                "<h1>Untitled Note</h1><p>Start writing here...</p>".to_string()
            ))
        );
    }
}
