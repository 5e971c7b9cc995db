//! Shared test fixtures for the notebook workspace.
//!
//! Builders for notes, problems and contents, plus an in-memory store
//! holding the seed notebook (subjects `s1` and `s2` with their summary
//! twins, chapters `c1` and `c2` in `s1`).

mod fixtures;

pub use fixtures::*;
