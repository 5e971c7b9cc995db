//! On-demand study helpers. These call the generation service directly
//! and do not go through the queue.

use errors::{QueueError, StoreError};
use nb_core::{ContentStore, GenerationService, PracticeSet};
use std::sync::Arc;
use tracing::instrument;

use crate::engine::TaskQueue;

#[derive(Clone)]
pub struct StudyTools {
    store: Arc<dyn ContentStore>,
    generation: Arc<dyn GenerationService>,
}

impl StudyTools {
    pub fn new(store: Arc<dyn ContentStore>, generation: Arc<dyn GenerationService>) -> Self {
        Self { store, generation }
    }

    /// Shares the queue's store and generation service.
    pub fn for_queue(queue: &TaskQueue) -> Self {
        Self::new(queue.store().clone(), queue.generation().clone())
    }

    fn chapter_digests(&self, chapter_id: &str) -> Result<Vec<String>, StoreError> {
        if self.store.get_chapter(chapter_id).is_none() {
            return Err(StoreError::ChapterNotFound {
                id: chapter_id.to_string(),
            });
        }
        Ok(self
            .store
            .list_notes_by_chapter(chapter_id)
            .iter()
            .map(|note| note.content.digest())
            .collect())
    }

    /// Regenerates the chapter's summary table and stores it.
    #[instrument(skip(self))]
    pub async fn refresh_chapter_summary(&self, chapter_id: &str) -> Result<String, QueueError> {
        let digests = self.chapter_digests(chapter_id)?;
        let table = self.generation.generate_summary_table(&digests).await?;
        self.store.update_chapter_summary(chapter_id, &table)?;
        Ok(table)
    }

    #[instrument(skip(self))]
    pub async fn cheat_sheet(&self, chapter_id: &str) -> Result<String, QueueError> {
        let digests = self.chapter_digests(chapter_id)?;
        Ok(self.generation.generate_cheat_sheet(&digests).await?)
    }

    /// Practice problems for the note's topic, with its explanation as
    /// context. Nothing is written to the note.
    #[instrument(skip(self))]
    pub async fn practice_for_note(&self, note_id: &str) -> Result<PracticeSet, QueueError> {
        let note = self
            .store
            .get_note(note_id)
            .ok_or_else(|| StoreError::NoteNotFound {
                id: note_id.to_string(),
            })?;
        let context =
            serde_json::Value::String(note.content.extended_explanation.clone()).to_string();
        Ok(self
            .generation
            .generate_practice_set(&note.content.title, &context)
            .await?)
    }

    #[instrument(skip(self, selected))]
    pub async fn transform_selection(
        &self,
        selected: &str,
        instruction: &str,
    ) -> Result<String, QueueError> {
        Ok(self
            .generation
            .transform_selection(selected, instruction)
            .await?)
    }
}
