//! # Notebook Queue
//!
//! Sequential generation queue for the study notebook.
//!
//! - [`TaskQueue`]: FIFO engine, one task in flight at a time
//! - [`placement::resolve`]: merge-or-new decision for create tasks
//! - [`planner::plan_task`] and [`effects::apply_effects`]: per-task
//!   decisions kept apart from store mutation
//! - [`batch`]: chapter summarization and syllabus import
//! - [`StudyTools`]: chapter summaries, cheat sheets, practice sets

pub mod batch;
pub mod effects;
pub mod engine;
pub mod placement;
pub mod planner;
pub mod study;

pub use batch::{create_subject_from_syllabus, summarize_chapters};
pub use effects::apply_effects;
pub use engine::{ActiveTask, QueueEvent, QueueProgress, TaskQueue, TaskQueueBuilder};
pub use placement::{Placement, resolve};
pub use planner::{Effect, QueueSettings, TaskOutcome, TaskPlan, plan_task};
pub use study::StudyTools;
