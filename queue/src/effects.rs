//! Applies planned [`Effect`]s to a [`ContentStore`].

use errors::StoreError;
use nb_core::{ContentStore, Note};

use crate::planner::Effect;

/// Applies `effects` in order and returns the notes as stored.
///
/// Stops at the first store error; earlier effects stay applied.
pub fn apply_effects(
    store: &dyn ContentStore,
    effects: Vec<Effect>,
) -> Result<Vec<Note>, StoreError> {
    let mut applied = Vec::with_capacity(effects.len());
    for effect in effects {
        match effect {
            Effect::CreateNote { note, select } => {
                let stored = store.create_note(note)?;
                if select {
                    store.set_selected_note(Some(stored.clone()));
                }
                applied.push(stored);
            }
            Effect::UpdateNote { note_id, patch } => {
                applied.push(store.update_note(&note_id, patch)?);
            }
        }
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nb_core::{NoteContent, NotePatch};
    use store::{InMemoryContentStore, NotebookBundle};
    use testing::note_in_chapter;

    #[test]
    fn test_create_effect_selects_when_asked() {
        let store = InMemoryContentStore::from_bundle(NotebookBundle::seed());
        let effects = vec![
            Effect::CreateNote {
                note: note_in_chapter("s1", "c1", "Torque"),
                select: false,
            },
            Effect::CreateNote {
                note: note_in_chapter("s1", "c1", "Inertia"),
                select: true,
            },
        ];

        let applied = apply_effects(&store, effects).unwrap();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[1].order, 2);
        assert_eq!(store.selected_note().unwrap().content.title, "Inertia");
    }

    #[test]
    fn test_update_effect_missing_note_fails() {
        let store = InMemoryContentStore::from_bundle(NotebookBundle::seed());
        let effects = vec![Effect::UpdateNote {
            note_id: "gone".to_string(),
            patch: NotePatch::content(NoteContent::default()),
        }];
        assert!(matches!(
            apply_effects(&store, effects),
            Err(StoreError::NoteNotFound { .. })
        ));
    }
}
