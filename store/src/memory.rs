//! In-memory [`ContentStore`] guarded by a single `parking_lot::RwLock`.

use errors::StoreError;
use nb_core::{
    Chapter, ContentStore, Note, NoteContent, NotePatch, NoteType, Subject, SyllabusModule,
    now_millis,
};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::bundle::{ImportSummary, NotebookBundle, load_bundle, save_bundle};
use crate::pairing::{ensure_summary_twins, paired_subject_id};

const COVER_GRADIENTS: [&str; 4] = [
    "linear-gradient(135deg, #a8edea 0%, #fed6e3 100%)",
    "linear-gradient(135deg, #e0c3fc 0%, #8ec5fc 100%)",
    "linear-gradient(120deg, #f093fb 0%, #f5576c 100%)",
    "linear-gradient(120deg, #84fab0 0%, #8fd3f4 100%)",
];

#[derive(Debug, Default)]
struct StoreState {
    bundle: NotebookBundle,
    selected_note_id: Option<String>,
}

impl StoreState {
    fn chapter_mut(&mut self, id: &str) -> Result<&mut Chapter, StoreError> {
        self.bundle
            .chapters
            .iter_mut()
            .find(|chapter| chapter.id == id)
            .ok_or_else(|| StoreError::ChapterNotFound { id: id.to_string() })
    }

    fn note_mut(&mut self, id: &str) -> Result<&mut Note, StoreError> {
        self.bundle
            .notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or_else(|| StoreError::NoteNotFound { id: id.to_string() })
    }

    /// Drops the selection when the selected note no longer exists.
    fn prune_selection(&mut self) {
        if let Some(selected) = &self.selected_note_id
            && !self.bundle.notes.iter().any(|note| &note.id == selected)
        {
            self.selected_note_id = None;
        }
    }
}

/// Thread-safe notebook store.
///
/// All mutations go through one write lock, so every operation is atomic
/// with respect to the others. Persistence is explicit through
/// [`InMemoryContentStore::save`].
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    state: RwLock<StoreState>,
    path: Option<PathBuf>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bundle(mut bundle: NotebookBundle) -> Self {
        ensure_summary_twins(&mut bundle.subjects);
        Self {
            state: RwLock::new(StoreState {
                bundle,
                selected_note_id: None,
            }),
            path: None,
        }
    }

    /// Loads the bundle at `path` (seed data when absent) and remembers the
    /// path for [`Self::save`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let bundle = load_bundle(&path)?;
        tracing::info!(
            subjects = bundle.subjects.len(),
            notes = bundle.notes.len(),
            "Opened notebook at {}",
            path.display()
        );
        let mut store = Self::from_bundle(bundle);
        store.path = Some(path);
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes the current bundle to the path given to [`Self::open`].
    ///
    /// A store without a path has nothing to write to.
    pub fn save(&self) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => self.save_to(path),
            None => {
                tracing::debug!("Store has no data path, skipping save");
                Ok(())
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        let snapshot = self.snapshot();
        save_bundle(path, &snapshot)
    }

    pub fn snapshot(&self) -> NotebookBundle {
        self.state.read().bundle.clone()
    }

    pub fn merge_import(&self, incoming: NotebookBundle) -> ImportSummary {
        let summary = self.state.write().bundle.merge_import(incoming);
        tracing::info!(
            subjects = summary.subjects,
            chapters = summary.chapters,
            notes = summary.notes,
            "Merged imported notebook data"
        );
        summary
    }

    /// Sets the cover of a subject and of its paired subject.
    pub fn update_cover(&self, subject_id: &str, cover_image: &str) -> Result<(), StoreError> {
        let mut state = self.state.write();
        if !state.bundle.subjects.iter().any(|s| s.id == subject_id) {
            return Err(StoreError::SubjectNotFound {
                id: subject_id.to_string(),
            });
        }
        let pair = paired_subject_id(&state.bundle.subjects, subject_id);
        for subject in &mut state.bundle.subjects {
            if subject.id == subject_id || pair.as_deref() == Some(subject.id.as_str()) {
                subject.cover_image = Some(cover_image.to_string());
            }
        }
        Ok(())
    }

    /// Edits the subject's title, term and year. The summary twin follows.
    pub fn edit_subject(
        &self,
        subject_id: &str,
        title: &str,
        term: &str,
        year: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write();
        if !state.bundle.subjects.iter().any(|s| s.id == subject_id) {
            return Err(StoreError::SubjectNotFound {
                id: subject_id.to_string(),
            });
        }
        let pair = paired_subject_id(&state.bundle.subjects, subject_id);
        for subject in &mut state.bundle.subjects {
            if subject.id == subject_id || pair.as_deref() == Some(subject.id.as_str()) {
                subject.title = title.to_string();
                subject.term = term.to_string();
                subject.year = year.to_string();
            }
        }
        Ok(())
    }

    pub fn rename_chapter(&self, chapter_id: &str, title: &str) -> Result<(), StoreError> {
        self.state.write().chapter_mut(chapter_id)?.title = title.to_string();
        Ok(())
    }

    /// Deletes a subject together with its pair and every chapter and note
    /// of both.
    pub fn delete_subject(&self, subject_id: &str) -> Result<(), StoreError> {
        let mut state = self.state.write();
        if !state.bundle.subjects.iter().any(|s| s.id == subject_id) {
            return Err(StoreError::SubjectNotFound {
                id: subject_id.to_string(),
            });
        }

        let mut doomed = HashSet::from([subject_id.to_string()]);
        if let Some(pair) = paired_subject_id(&state.bundle.subjects, subject_id) {
            doomed.insert(pair);
        }

        state.bundle.subjects.retain(|s| !doomed.contains(&s.id));
        state.bundle.chapters.retain(|c| !doomed.contains(&c.subject_id));
        state.bundle.notes.retain(|n| !doomed.contains(&n.subject_id));
        state.prune_selection();
        tracing::info!(subject_id, removed_subjects = doomed.len(), "Deleted subject");
        Ok(())
    }

    pub fn delete_chapter(&self, chapter_id: &str) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let before = state.bundle.chapters.len();
        state.bundle.chapters.retain(|c| c.id != chapter_id);
        if state.bundle.chapters.len() == before {
            return Err(StoreError::ChapterNotFound {
                id: chapter_id.to_string(),
            });
        }
        state.bundle.notes.retain(|n| n.chapter_id != chapter_id);
        state.prune_selection();
        Ok(())
    }

    pub fn delete_note(&self, note_id: &str) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let before = state.bundle.notes.len();
        state.bundle.notes.retain(|n| n.id != note_id);
        if state.bundle.notes.len() == before {
            return Err(StoreError::NoteNotFound {
                id: note_id.to_string(),
            });
        }
        state.prune_selection();
        Ok(())
    }

    /// Moves the note at display position `from` to position `to` and
    /// renumbers the chapter's notes `0..n`.
    ///
    /// Positions past the end clamp to the last note.
    pub fn reorder_notes(&self, chapter_id: &str, from: usize, to: usize) {
        let mut state = self.state.write();
        let mut ids: Vec<(i64, String)> = state
            .bundle
            .notes
            .iter()
            .filter(|n| n.chapter_id == chapter_id)
            .map(|n| (n.order, n.id.clone()))
            .collect();
        if ids.is_empty() {
            return;
        }
        ids.sort_by_key(|(order, _)| *order);

        let last = ids.len() - 1;
        let moved = ids.remove(from.min(last));
        ids.insert(to.min(last), moved);

        for (position, (_, id)) in ids.iter().enumerate() {
            if let Some(note) = state.bundle.notes.iter_mut().find(|n| &n.id == id) {
                note.order = position as i64;
            }
        }
    }
}

fn placeholder_content(title: &str, subtopic: &str) -> NoteContent {
    NoteContent {
        title: title.to_string(),
        subtopic: subtopic.to_string(),
        analogy: "N/A".to_string(),
        conceptual_logic: "Placeholder".to_string(),
        editor_content: Some(serde_json::Value::String(format!(
            "<h1>{title}</h1><p>Start writing here...</p>"
        ))),
        ..Default::default()
    }
}

impl ContentStore for InMemoryContentStore {
    fn create_chapter(&self, title: &str, subject_id: &str) -> Result<String, StoreError> {
        let mut state = self.state.write();
        if !state.bundle.subjects.iter().any(|s| s.id == subject_id) {
            return Err(StoreError::SubjectNotFound {
                id: subject_id.to_string(),
            });
        }
        let id = uuid::Uuid::new_v4().to_string();
        state.bundle.chapters.push(Chapter {
            id: id.clone(),
            subject_id: subject_id.to_string(),
            title: title.to_string(),
            summary_table: None,
        });
        tracing::debug!(chapter_id = %id, subject_id, "Created chapter");
        Ok(id)
    }

    fn create_note(&self, mut note: Note) -> Result<Note, StoreError> {
        let mut state = self.state.write();
        if !state.bundle.chapters.iter().any(|c| c.id == note.chapter_id) {
            return Err(StoreError::ChapterNotFound {
                id: note.chapter_id.clone(),
            });
        }
        if state.bundle.notes.iter().any(|n| n.id == note.id) {
            return Err(StoreError::DuplicateNote { id: note.id });
        }
        let max_order = state
            .bundle
            .notes
            .iter()
            .filter(|n| n.chapter_id == note.chapter_id)
            .map(|n| n.order)
            .max()
            .unwrap_or(0);
        note.order = max_order + 1;
        state.bundle.notes.push(note.clone());
        Ok(note)
    }

    fn update_note(&self, id: &str, patch: NotePatch) -> Result<Note, StoreError> {
        let mut state = self.state.write();
        let note = state.note_mut(id)?;
        patch.apply_to(note);
        Ok(note.clone())
    }

    /// Notes of the chapter in display order.
    fn list_notes_by_chapter(&self, chapter_id: &str) -> Vec<Note> {
        let state = self.state.read();
        let mut notes: Vec<Note> = state
            .bundle
            .notes
            .iter()
            .filter(|n| n.chapter_id == chapter_id)
            .cloned()
            .collect();
        notes.sort_by_key(|n| n.order);
        notes
    }

    fn set_selected_note(&self, note: Option<Note>) {
        self.state.write().selected_note_id = note.map(|n| n.id);
    }

    fn selected_note(&self) -> Option<Note> {
        let state = self.state.read();
        let id = state.selected_note_id.as_deref()?;
        state.bundle.notes.iter().find(|n| n.id == id).cloned()
    }

    fn get_note(&self, id: &str) -> Option<Note> {
        self.state
            .read()
            .bundle
            .notes
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    fn get_subject(&self, id: &str) -> Option<Subject> {
        self.state
            .read()
            .bundle
            .subjects
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    fn get_chapter(&self, id: &str) -> Option<Chapter> {
        self.state
            .read()
            .bundle
            .chapters
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    fn list_subjects(&self) -> Vec<Subject> {
        self.state.read().bundle.subjects.clone()
    }

    fn list_chapters_by_subject(&self, subject_id: &str) -> Vec<Chapter> {
        self.state
            .read()
            .bundle
            .chapters
            .iter()
            .filter(|c| c.subject_id == subject_id)
            .cloned()
            .collect()
    }

    fn update_chapter_summary(&self, chapter_id: &str, summary: &str) -> Result<(), StoreError> {
        self.state.write().chapter_mut(chapter_id)?.summary_table = Some(summary.to_string());
        Ok(())
    }

    fn add_subject(
        &self,
        title: &str,
        term: &str,
        year: &str,
        structure: &[SyllabusModule],
    ) -> Subject {
        let mut state = self.state.write();
        let cover = COVER_GRADIENTS[state.bundle.subjects.len() % COVER_GRADIENTS.len()];
        let subject = Subject {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            term: term.to_string(),
            year: year.to_string(),
            cover_image: Some(cover.to_string()),
            is_summary: false,
            original_subject_id: None,
        };
        state.bundle.subjects.push(subject.clone());
        state.bundle.subjects.push(subject.summary_twin());

        let now = now_millis();
        for module in structure {
            let chapter = Chapter {
                id: uuid::Uuid::new_v4().to_string(),
                subject_id: subject.id.clone(),
                title: module.title.clone(),
                summary_table: None,
            };
            for (idx, subtopic) in module.subtopics.iter().enumerate() {
                let idx = idx as i64;
                state.bundle.notes.push(Note {
                    id: uuid::Uuid::new_v4().to_string(),
                    subject_id: subject.id.clone(),
                    chapter_id: chapter.id.clone(),
                    created_at: now + idx,
                    order: idx,
                    note_type: NoteType::Concept,
                    content: placeholder_content(subtopic, &module.title),
                    images: Vec::new(),
                });
            }
            state.bundle.chapters.push(chapter);
        }

        tracing::info!(
            subject_id = %subject.id,
            chapters = structure.len(),
            "Created subject"
        );
        subject
    }
}
