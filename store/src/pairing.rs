//! Summary twin pairing.
//!
//! Every regular subject has exactly one summary subject pointing back at
//! it through `original_subject_id`.

use nb_core::Subject;

/// Appends a summary twin for every regular subject that lacks one.
///
/// Returns the number of twins created; a second call returns 0.
pub fn ensure_summary_twins(subjects: &mut Vec<Subject>) -> usize {
    let missing: Vec<Subject> = subjects
        .iter()
        .filter(|subject| !subject.is_summary)
        .filter(|subject| {
            !subjects.iter().any(|other| {
                other.is_summary && other.original_subject_id.as_deref() == Some(&subject.id)
            })
        })
        .map(Subject::summary_twin)
        .collect();

    let created = missing.len();
    if created > 0 {
        tracing::info!(created, "Created missing summary notebooks");
    }
    subjects.extend(missing);
    created
}

/// Id of the subject paired with `id`, in either direction.
pub fn paired_subject_id(subjects: &[Subject], id: &str) -> Option<String> {
    let target = subjects.iter().find(|subject| subject.id == id)?;
    if target.is_summary {
        return target.original_subject_id.clone();
    }
    subjects
        .iter()
        .find(|subject| subject.is_summary && subject.original_subject_id.as_deref() == Some(id))
        .map(|subject| subject.id.clone())
}

/// Summary subject paired with the regular subject `id`.
pub fn summary_twin_of<'a>(subjects: &'a [Subject], id: &str) -> Option<&'a Subject> {
    subjects
        .iter()
        .find(|subject| subject.is_summary && subject.original_subject_id.as_deref() == Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: &str) -> Subject {
        Subject {
            id: id.to_string(),
            title: format!("Title {id}"),
            term: "Term 2".to_string(),
            year: "SY 2025-2026".to_string(),
            cover_image: Some("cover".to_string()),
            is_summary: false,
            original_subject_id: None,
        }
    }

    #[test]
    fn test_twins_created_once() {
        let mut subjects = vec![subject("a"), subject("b")];
        assert_eq!(ensure_summary_twins(&mut subjects), 2);
        assert_eq!(ensure_summary_twins(&mut subjects), 0);
        assert_eq!(subjects.len(), 4);

        let twin = summary_twin_of(&subjects, "a").unwrap();
        assert_eq!(twin.id, "a_summary");
        assert_eq!(twin.title, "Title a");
        assert_eq!(twin.cover_image.as_deref(), Some("cover"));
    }

    #[test]
    fn test_existing_twin_with_other_id_is_respected() {
        let mut legacy = subject("a_sum");
        legacy.is_summary = true;
        legacy.original_subject_id = Some("a".to_string());
        let mut subjects = vec![subject("a"), legacy];

        assert_eq!(ensure_summary_twins(&mut subjects), 0);
        assert_eq!(paired_subject_id(&subjects, "a").as_deref(), Some("a_sum"));
        assert_eq!(paired_subject_id(&subjects, "a_sum").as_deref(), Some("a"));
    }

    #[test]
    fn test_paired_subject_unknown_id() {
        let subjects = vec![subject("a")];
        assert_eq!(paired_subject_id(&subjects, "zzz"), None);
        assert_eq!(paired_subject_id(&subjects, "a"), None);
    }
}
