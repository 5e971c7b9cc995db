//! Producers that submit many tasks (or structure) at once.

use errors::QueueError;
use nb_core::{ChapterTarget, ContentStore, GenerationService, QueueItem, SourceInput, Subject};

use crate::engine::TaskQueue;

/// Enqueues one summary task per note of each source chapter, into
/// same-titled chapters of the subject's summary notebook.
///
/// Missing twin chapters are created up front. Unknown chapter ids are
/// skipped. Returns the number of tasks enqueued.
pub fn summarize_chapters(
    queue: &TaskQueue,
    subject_id: &str,
    chapter_ids: &[String],
) -> Result<usize, QueueError> {
    let store = queue.store().as_ref();
    let twin = store
        .list_subjects()
        .into_iter()
        .find(|s| s.is_summary && s.original_subject_id.as_deref() == Some(subject_id))
        .ok_or_else(|| {
            QueueError::missing_prerequisite(format!(
                "could not find the summary notebook for {subject_id}"
            ))
        })?;

    let mut enqueued = 0;
    for chapter_id in chapter_ids {
        let Some(source) = store.get_chapter(chapter_id) else {
            tracing::warn!(chapter_id, "Skipping unknown chapter");
            continue;
        };

        let target = summary_chapter(store, &twin, &source.title)?;
        for note in store.list_notes_by_chapter(chapter_id) {
            queue.enqueue(QueueItem::summarize(
                twin.id.clone(),
                ChapterTarget::existing(target.clone()),
                note,
            ))?;
            enqueued += 1;
        }
    }

    tracing::info!(subject_id, enqueued, "Queued chapter summaries");
    Ok(enqueued)
}

fn summary_chapter(
    store: &dyn ContentStore,
    twin: &Subject,
    title: &str,
) -> Result<String, QueueError> {
    let existing = store
        .list_chapters_by_subject(&twin.id)
        .into_iter()
        .find(|chapter| chapter.title == title);
    match existing {
        Some(chapter) => Ok(chapter.id),
        None => Ok(store.create_chapter(title, &twin.id)?),
    }
}

/// Parses a syllabus and creates a subject shaped after it.
pub async fn create_subject_from_syllabus(
    store: &dyn ContentStore,
    generation: &dyn GenerationService,
    title: &str,
    term: &str,
    year: &str,
    syllabus: &SourceInput,
) -> Result<Subject, QueueError> {
    let structure = generation.parse_syllabus(syllabus).await?;
    tracing::debug!(modules = structure.len(), "Parsed syllabus");
    Ok(store.add_subject(title, term, year, &structure))
}
