use rusqlite::{params, Connection};
use tracing::debug;

use crate::catalog::{COURSE, REGISTRATION, STUDENT};
use crate::error::{RecordsError, Result};
use crate::models::{CourseId, StudentId};

use super::connection::{map_constraint, Store};
use super::courses::course_exists;
use super::students::{find_student_id_by_name, StudentRow};

/// One row of the student/course join relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRow {
    pub student_id: String,
    pub course_id: String,
}

/// Every registration pair in insertion order, including pairs whose student
/// or course row is gone.
pub(crate) fn fetch_registrations(conn: &Connection) -> Result<Vec<RegistrationRow>> {
    let mut stmt =
        conn.prepare("SELECT student_id, course_id FROM registrations ORDER BY rowid")?;

    let registrations = stmt
        .query_map([], |row| {
            Ok(RegistrationRow {
                student_id: row.get(0)?,
                course_id: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(registrations)
}

/// Students joined through `registrations` for one course, in registration
/// order. Registrations whose student row is gone drop out of the join.
pub(crate) fn fetch_registered_students(
    conn: &Connection,
    course: &CourseId,
) -> Result<Vec<StudentRow>> {
    let mut stmt = conn.prepare(
        "SELECT s.student_id, s.name, s.age, s.email
         FROM students s
         INNER JOIN registrations r ON r.student_id = s.student_id
         WHERE r.course_id = ?1
         ORDER BY r.rowid",
    )?;

    let students = stmt
        .query_map([course.as_str()], |row| {
            Ok(StudentRow {
                student_id: row.get(0)?,
                name: row.get(1)?,
                age: row.get(2)?,
                email: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(students)
}

/// The composite primary key turns a repeated pairing into `DuplicateKey`;
/// the failed insert leaves the table as it was.
pub(crate) fn insert_registration(
    conn: &Connection,
    student: &StudentId,
    course: &CourseId,
) -> Result<()> {
    let key = format!("{student}/{course}");
    conn.execute(
        "INSERT INTO registrations (student_id, course_id) VALUES (?1, ?2)",
        params![student.as_str(), course.as_str()],
    )
    .map_err(|err| map_constraint(err, REGISTRATION, &key))?;

    debug!(student_id = %student, course_id = %course, "inserted registration");
    Ok(())
}

/// Remove one pairing. `NotFound` when the pair was not registered.
pub(crate) fn delete_registration(
    conn: &Connection,
    student: &StudentId,
    course: &CourseId,
) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM registrations WHERE student_id = ?1 AND course_id = ?2",
        params![student.as_str(), course.as_str()],
    )?;

    if deleted == 0 {
        Err(RecordsError::not_found(
            REGISTRATION,
            format!("{student}/{course}"),
        ))
    } else {
        debug!(student_id = %student, course_id = %course, "deleted registration");
        Ok(())
    }
}

impl Store {
    /// All registration rows in insertion order.
    pub fn registrations(&self) -> Result<Vec<RegistrationRow>> {
        let conn = self.connect()?;
        fetch_registrations(&conn)
    }

    /// Students registered in `course`, in registration order.
    pub fn registered_students(&self, course: &CourseId) -> Result<Vec<StudentRow>> {
        let conn = self.connect()?;
        fetch_registered_students(&conn, course)
    }

    /// Resolve `student_name` to the first student with that exact name and
    /// register them into `course`. An unknown name or course writes nothing.
    pub fn register_student(&self, student_name: &str, course: &CourseId) -> Result<StudentId> {
        let conn = self.connect()?;
        let student = find_student_id_by_name(&conn, student_name)?.ok_or_else(|| {
            RecordsError::ReferenceResolution {
                entity: STUDENT,
                name: student_name.to_string(),
            }
        })?;
        if !course_exists(&conn, course)? {
            return Err(RecordsError::not_found(COURSE, course.as_str()));
        }
        insert_registration(&conn, &student, course)?;
        Ok(student)
    }

    /// Drop one registration. `NotFound` when the pair was not registered.
    pub fn unregister_student(&self, student: &StudentId, course: &CourseId) -> Result<()> {
        let conn = self.connect()?;
        delete_registration(&conn, student, course)
    }
}
