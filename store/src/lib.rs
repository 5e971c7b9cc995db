//! # Notebook Store
//!
//! Concrete [`nb_core::ContentStore`] for the study notebook engine.
//!
//! - [`InMemoryContentStore`]: thread-safe store with cascading deletes
//! - [`NotebookBundle`]: JSON persistence and backup import
//! - [`ensure_summary_twins`]: regular/summary subject pairing

pub mod bundle;
pub mod memory;
pub mod pairing;

pub use bundle::{ImportSummary, NotebookBundle, load_bundle, save_bundle, validate};
pub use memory::InMemoryContentStore;
pub use pairing::{ensure_summary_twins, paired_subject_id, summary_twin_of};
