//! # Formwork Core
//!
//! Shared infrastructure used by the scheduling engines in `formwork-pm`:
//! the closed error type, and RON-based config/file utilities. Nothing in
//! this crate knows about tasks, zones, or schedules — it only supplies
//! the ambient plumbing other crates build on.

pub mod error;
pub mod utils;

pub use error::{FormworkError, Result};
