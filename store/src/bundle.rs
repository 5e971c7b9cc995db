//! # Notebook Bundle
//!
//! JSON document holding every subject, chapter and note. This is both the
//! on-disk format and the backup export/import format.
//!
//! Loading tolerates older documents:
//! - `originalImage` on a note moves into `images`
//! - `content.digitizedVisual` moves into `content.visuals`
//! - a note without `order` takes its `createdAt`
//! - missing summary twins are created

use errors::StoreError;
use nb_core::{Chapter, Note, Subject};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use crate::pairing::ensure_summary_twins;

const SEED_TERM: &str = "Term 2";
const SEED_YEAR: &str = "SY 2025-2026";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NotebookBundle {
    pub subjects: Vec<Subject>,
    pub chapters: Vec<Chapter>,
    pub notes: Vec<Note>,
}

/// Number of records added by [`NotebookBundle::merge_import`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub subjects: usize,
    pub chapters: usize,
    pub notes: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.subjects + self.chapters + self.notes
    }
}

impl NotebookBundle {
    /// Starter notebook used when no data file exists yet.
    pub fn seed() -> Self {
        let subject = |id: &str, title: &str, cover: &str| Subject {
            id: id.to_string(),
            title: title.to_string(),
            term: SEED_TERM.to_string(),
            year: SEED_YEAR.to_string(),
            cover_image: Some(cover.to_string()),
            is_summary: false,
            original_subject_id: None,
        };
        let chapter = |id: &str, title: &str| Chapter {
            id: id.to_string(),
            subject_id: "s1".to_string(),
            title: title.to_string(),
            summary_table: None,
        };

        let mut subjects = vec![
            subject(
                "s1",
                "MATPY03",
                "linear-gradient(135deg, #a8edea 0%, #fed6e3 100%)",
            ),
            subject(
                "s2",
                "MATPY04",
                "linear-gradient(135deg, #e0c3fc 0%, #8ec5fc 100%)",
            ),
        ];
        ensure_summary_twins(&mut subjects);

        Self {
            subjects,
            chapters: vec![chapter("c1", "Chapter 1"), chapter("c2", "Chapter 2")],
            notes: Vec::new(),
        }
    }

    /// Parses a bundle document, applying legacy migrations first.
    pub fn from_value(mut value: Value) -> Result<Self, StoreError> {
        validate(&value)?;
        let migrated = migrate_legacy(&mut value);
        if migrated > 0 {
            tracing::info!(migrated, "Migrated legacy note fields");
        }

        let mut bundle: Self = serde_json::from_value(value).map_err(|e| {
            StoreError::Serialization {
                reason: e.to_string(),
            }
        })?;
        ensure_summary_twins(&mut bundle.subjects);
        Ok(bundle)
    }

    /// Adds every record whose id is not already present.
    ///
    /// Existing records are never overwritten.
    pub fn merge_import(&mut self, incoming: NotebookBundle) -> ImportSummary {
        let subject_ids: HashSet<String> = self.subjects.iter().map(|s| s.id.clone()).collect();
        let chapter_ids: HashSet<String> = self.chapters.iter().map(|c| c.id.clone()).collect();
        let note_ids: HashSet<String> = self.notes.iter().map(|n| n.id.clone()).collect();

        let mut summary = ImportSummary::default();
        for subject in incoming.subjects {
            if !subject_ids.contains(&subject.id) {
                self.subjects.push(subject);
                summary.subjects += 1;
            }
        }
        for chapter in incoming.chapters {
            if !chapter_ids.contains(&chapter.id) {
                self.chapters.push(chapter);
                summary.chapters += 1;
            }
        }
        for note in incoming.notes {
            if !note_ids.contains(&note.id) {
                self.notes.push(note);
                summary.notes += 1;
            }
        }
        ensure_summary_twins(&mut self.subjects);
        summary
    }
}

/// Rejects documents that are not objects with `subjects`, `chapters` and
/// `notes` arrays.
pub fn validate(value: &Value) -> Result<(), StoreError> {
    for key in ["subjects", "chapters", "notes"] {
        if !value.get(key).is_some_and(Value::is_array) {
            return Err(StoreError::InvalidBundle {
                reason: format!("missing '{key}' array"),
            });
        }
    }
    Ok(())
}

/// Rewrites legacy note fields in place. Returns how many notes changed.
fn migrate_legacy(value: &mut Value) -> usize {
    let Some(notes) = value.get_mut("notes").and_then(Value::as_array_mut) else {
        return 0;
    };

    let mut migrated = 0;
    for note in notes.iter_mut().filter_map(Value::as_object_mut) {
        let mut changed = false;

        if let Some(image) = note.remove("originalImage") {
            if let Some(image) = image.as_str().filter(|s| !s.is_empty()) {
                push_string(note, "images", image);
            }
            changed = true;
        }

        if let Some(content) = note.get_mut("content").and_then(Value::as_object_mut)
            && let Some(visual) = content.remove("digitizedVisual")
        {
            if let Some(visual) = visual.as_str().filter(|s| !s.is_empty()) {
                push_string(content, "visuals", visual);
            }
            changed = true;
        }

        if changed {
            migrated += 1;
        }
    }
    migrated
}

fn push_string(object: &mut serde_json::Map<String, Value>, key: &str, item: &str) {
    let entry = object
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !entry.is_array() {
        *entry = Value::Array(Vec::new());
    }
    if let Value::Array(items) = entry {
        items.push(Value::String(item.to_string()));
    }
}

/// Loads a bundle, falling back to [`NotebookBundle::seed`] when the file
/// does not exist.
pub fn load_bundle(path: &Path) -> Result<NotebookBundle, StoreError> {
    if !path.exists() {
        tracing::info!("No notebook data at {}, using seed data", path.display());
        return Ok(NotebookBundle::seed());
    }

    let contents = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents).map_err(|e| StoreError::Serialization {
        reason: e.to_string(),
    })?;
    NotebookBundle::from_value(value)
}

pub fn save_bundle(path: &Path, bundle: &NotebookBundle) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(bundle).map_err(|e| StoreError::Serialization {
        reason: e.to_string(),
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    tracing::debug!(
        subjects = bundle.subjects.len(),
        chapters = bundle.chapters.len(),
        notes = bundle.notes.len(),
        "Saved notebook bundle"
    );
    Ok(())
}
