use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::catalog::{COURSE, INSTRUCTOR};
use crate::error::{RecordsError, Result};
use crate::models::{Course, CourseId, InstructorId};

use super::connection::{map_constraint, Store};
use super::instructors::find_instructor_id_by_name;

/// Flat `courses` row as stored. Enrolled students live in `registrations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRow {
    pub course_id: String,
    pub course_name: String,
    /// `None` when unassigned. Older databases stored an empty string for
    /// "no instructor"; `Store::open` migrates those to `NULL` and any blank
    /// that still turns up is read back as `None` too.
    pub instructor_id: Option<String>,
}

/// Every course in insertion order. A blank instructor id is read as
/// unassigned.
pub(crate) fn fetch_courses(conn: &Connection) -> Result<Vec<CourseRow>> {
    let mut stmt = conn
        .prepare("SELECT course_id, course_name, instructor_id FROM courses ORDER BY rowid")?;

    let courses = stmt
        .query_map([], |row| {
            let instructor_id: Option<String> = row.get(2)?;
            Ok(CourseRow {
                course_id: row.get(0)?,
                course_name: row.get(1)?,
                instructor_id: instructor_id.filter(|id| !id.trim().is_empty()),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(courses)
}

/// Whether a row with this course id exists. Registration checks this
/// before writing anything.
pub(crate) fn course_exists(conn: &Connection, id: &CourseId) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM courses WHERE course_id = ?1",
            params![id.as_str()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Add a new course row, storing `NULL` when it has no instructor. A taken id
/// comes back as `DuplicateKey` and the table is left as it was.
pub(crate) fn insert_course(conn: &Connection, course: &Course) -> Result<()> {
    conn.execute(
        "INSERT INTO courses (course_id, course_name, instructor_id) VALUES (?1, ?2, ?3)",
        params![
            course.id().as_str(),
            course.name(),
            course.instructor().map(InstructorId::as_str)
        ],
    )
    .map_err(|err| map_constraint(err, COURSE, course.id().as_str()))?;

    debug!(course_id = %course.id(), "inserted course");
    Ok(())
}

/// Rename a course. The instructor column belongs to assign/unassign and is
/// not touched here.
pub(crate) fn update_course(conn: &Connection, course: &Course) -> Result<()> {
    let updated = conn.execute(
        "UPDATE courses SET course_name = ?1 WHERE course_id = ?2",
        params![course.name(), course.id().as_str()],
    )?;

    if updated == 0 {
        Err(RecordsError::not_found(COURSE, course.id().as_str()))
    } else {
        debug!(course_id = %course.id(), "updated course");
        Ok(())
    }
}

/// Registrations for the course are left in place.
pub(crate) fn delete_course(conn: &Connection, id: &CourseId) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM courses WHERE course_id = ?1",
        params![id.as_str()],
    )?;

    if deleted == 0 {
        Err(RecordsError::not_found(COURSE, id.as_str()))
    } else {
        debug!(course_id = %id, "deleted course");
        Ok(())
    }
}

/// Point a course at `instructor`, or clear it with `None`. The instructor id
/// is written as given; resolving it is the caller's job. `NotFound` when
/// the course row does not exist.
pub(crate) fn set_course_instructor(
    conn: &Connection,
    course: &CourseId,
    instructor: Option<&InstructorId>,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE courses SET instructor_id = ?1 WHERE course_id = ?2",
        params![instructor.map(InstructorId::as_str), course.as_str()],
    )?;

    if updated == 0 {
        Err(RecordsError::not_found(COURSE, course.as_str()))
    } else {
        debug!(course_id = %course, instructor_id = ?instructor.map(InstructorId::as_str), "set course instructor");
        Ok(())
    }
}

impl Store {
    /// Insert one course. `DuplicateKey` if the id is taken.
    pub fn add_course(&self, course: &Course) -> Result<()> {
        let conn = self.connect()?;
        insert_course(&conn, course)
    }

    /// All course rows in insertion order.
    pub fn courses(&self) -> Result<Vec<CourseRow>> {
        let conn = self.connect()?;
        fetch_courses(&conn)
    }

    /// Rename an existing course. `NotFound` if the id is unknown.
    pub fn update_course(&self, course: &Course) -> Result<()> {
        let conn = self.connect()?;
        update_course(&conn, course)
    }

    /// Remove a course. Its registrations stay behind as orphans.
    pub fn delete_course(&self, id: &CourseId) -> Result<()> {
        let conn = self.connect()?;
        delete_course(&conn, id)
    }

    /// Resolve `instructor_name` to the first instructor with that exact name
    /// and make them the course's instructor. Nothing is written when the
    /// name or the course cannot be found.
    pub fn assign_instructor(&self, instructor_name: &str, course: &CourseId) -> Result<InstructorId> {
        let conn = self.connect()?;
        let instructor = find_instructor_id_by_name(&conn, instructor_name)?.ok_or_else(|| {
            RecordsError::ReferenceResolution {
                entity: INSTRUCTOR,
                name: instructor_name.to_string(),
            }
        })?;
        set_course_instructor(&conn, course, Some(&instructor))?;
        Ok(instructor)
    }

    /// Clear the course's instructor. `NotFound` if the course is unknown.
    pub fn unassign_instructor(&self, course: &CourseId) -> Result<()> {
        let conn = self.connect()?;
        set_course_instructor(&conn, course, None)
    }
}
