//! Core library for the school records tool: validated student, instructor
//! and course records, their SQLite persistence, the reconciliation that keeps
//! the in-memory graph and the database in agreement, and the JSON/CSV
//! interchange formats.
//!
//! The binary is a thin command-line shell over [`Registrar`]; any other
//! front end can drive the same API.
pub mod catalog;
pub mod cli;
pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod search;
pub mod sync;
pub mod validation;

/// Persistence entry point.
pub use db::Store;

/// Domain types that other layers manipulate.
pub use catalog::Catalog;
pub use models::{Course, CourseId, Instructor, InstructorId, Member, Person, Student, StudentId};

pub use error::{RecordsError, Result};
pub use sync::{reload, Registrar, RejectedRow, SyncReport};
