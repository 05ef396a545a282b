//! Relational store adapter, split by table. Each submodule holds the
//! statements for one relation as free functions over a `Connection` plus the
//! `Store` methods that open a connection, run them, and release it.

mod connection;
mod courses;
mod instructors;
mod registrations;
mod students;

pub use connection::Store;
pub use courses::CourseRow;
pub use instructors::InstructorRow;
pub use registrations::RegistrationRow;
pub use students::StudentRow;

pub(crate) use courses::fetch_courses;
pub(crate) use instructors::fetch_instructors;
pub(crate) use registrations::fetch_registrations;
pub(crate) use students::fetch_students;
