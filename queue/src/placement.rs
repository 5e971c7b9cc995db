//! Decides whether a create task merges into an existing note or starts a
//! new one. Never mutates anything.

use nb_core::{ContinuationContext, CreateMode, CreateTask, GenerationService, Note};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Merge { note_id: String },
    /// `title` is the user's custom subtopic, if one was given.
    New { title: Option<String> },
}

impl Placement {
    pub fn merge(note_id: impl Into<String>) -> Self {
        Self::Merge {
            note_id: note_id.into(),
        }
    }

    pub fn new_note(title: Option<&str>) -> Self {
        Self::New {
            title: title.map(str::to_string),
        }
    }

    /// Label used for logs and metrics.
    pub fn decision(&self) -> &'static str {
        match self {
            Self::Merge { .. } => "merge",
            Self::New { .. } => "new",
        }
    }
}

/// Resolves placement in priority order:
///
/// 1. an explicit target note present in the chapter
/// 2. a forced new note
/// 3. a custom subtopic matching a note title, ignoring case
/// 4. the continuation judgment against the most recent note (concept mode
///    only)
///
/// A target id missing from the chapter falls through to 2-4. A failed
/// continuation judgment resolves to a new note.
pub async fn resolve(
    task: &CreateTask,
    chapter_notes: &[Note],
    generation: &dyn GenerationService,
    excerpt_chars: usize,
) -> Placement {
    let hints = &task.placement;

    if let Some(target) = hints.target_note_id.as_deref() {
        if chapter_notes.iter().any(|note| note.id == target) {
            return Placement::merge(target);
        }
        tracing::warn!(target_note_id = target, "Merge target not in chapter, resolving by hints");
    }

    let custom_title = hints.custom_title();

    if hints.force_new_note {
        return Placement::new_note(custom_title);
    }

    if let Some(title) = custom_title {
        let wanted = title.to_lowercase();
        let matched = chapter_notes
            .iter()
            .find(|note| note.content.title.trim().to_lowercase() == wanted);
        return match matched {
            Some(note) => Placement::merge(&note.id),
            None => Placement::new_note(Some(title)),
        };
    }

    if task.mode != CreateMode::Concept {
        return Placement::new_note(None);
    }

    let Some(previous) = chapter_notes.iter().max_by_key(|note| note.created_at) else {
        return Placement::new_note(None);
    };

    let context = ContinuationContext::from_content(&previous.content, excerpt_chars);
    match generation.analyze_continuation(&task.input, &context).await {
        Ok(judgment) if judgment.is_continuation => {
            tracing::debug!(note_id = %previous.id, "Input continues the previous note");
            Placement::merge(&previous.id)
        }
        Ok(_) => Placement::new_note(None),
        Err(e) => {
            tracing::warn!(error = %e, "Continuation judgment failed, creating a new note");
            Placement::new_note(None)
        }
    }
}
