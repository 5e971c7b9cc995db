//! # Study Notebook Core
//!
//! Shared types and traits for the study notebook engine.
//!
//! This crate provides:
//! - The notebook data model (subjects, chapters, notes, problems)
//! - Queue task types, modelled as a tagged variant per task kind
//! - The two collaborator traits the engine is written against:
//!   [`traits::GenerationService`] and [`traits::ContentStore`]

pub mod task;
pub mod traits;
pub mod types;

pub use task::{
    ChapterTarget, CreateMode, CreateTask, PlacementHints, QueueItem, SourceInput, SummarizeTask,
    TaskKind,
};
pub use traits::{ContentStore, ContinuationContext, GenerationService, NotePatch, NoteRequest};
pub use types::{
    Chapter, ContinuationJudgment, DetailLevel, Note, NoteContent, NoteType, PracticeSet,
    Problem, Subject, SyllabusModule, UnitStatus, now_millis,
};
