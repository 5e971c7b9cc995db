use nb_core::{Note, NoteContent, NoteType, Problem, now_millis};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use store::{InMemoryContentStore, NotebookBundle};

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

pub fn unique_id(prefix: &str) -> String {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}", prefix, id)
}

pub fn sample_problem(question: &str) -> Problem {
    let mut problem = Problem::new(question);
    problem.given = vec!["m = 2 kg".to_string()];
    problem.formulas = vec!["F = ma".to_string()];
    problem.answer = "4 N".to_string();
    problem
}

pub fn sample_content(title: &str) -> NoteContent {
    NoteContent {
        title: title.to_string(),
        subtopic: "Mechanics".to_string(),
        analogy: format!("{title} is like pushing a cart"),
        conceptual_logic: format!("Why {title} works"),
        condensed_review: vec![format!("{title} formula")],
        extended_explanation: format!("A long explanation of {title}."),
        ..Default::default()
    }
}

/// Concept note with a unique id, not yet stored.
pub fn note_in_chapter(subject_id: &str, chapter_id: &str, title: &str) -> Note {
    Note {
        id: unique_id("note"),
        subject_id: subject_id.to_string(),
        chapter_id: chapter_id.to_string(),
        created_at: now_millis(),
        order: 0,
        note_type: NoteType::Concept,
        content: sample_content(title),
        images: Vec::new(),
    }
}

/// Store holding the default seed notebook.
pub fn seeded_store() -> Arc<InMemoryContentStore> {
    Arc::new(InMemoryContentStore::from_bundle(NotebookBundle::seed()))
}
