use rusqlite::{params, Connection};
use tracing::debug;

use crate::catalog::STUDENT;
use crate::error::{RecordsError, Result};
use crate::models::{Student, StudentId};

use super::connection::{map_constraint, Store};

/// Flat `students` row as stored. Reload turns these back into validated
/// [`Student`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRow {
    pub student_id: String,
    pub name: String,
    pub age: i64,
    pub email: String,
}

impl StudentRow {
    pub fn to_student(&self) -> Result<Student> {
        Ok(Student::new(&self.student_id, &self.name, self.age, &self.email)?)
    }
}

/// Every student in insertion order. That order is the iteration order used
/// for name resolution.
pub(crate) fn fetch_students(conn: &Connection) -> Result<Vec<StudentRow>> {
    let mut stmt =
        conn.prepare("SELECT student_id, name, age, email FROM students ORDER BY rowid")?;

    let students = stmt
        .query_map([], |row| {
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

/// Add a new student row. A taken id comes back as `DuplicateKey` and the
/// table is left as it was.
pub(crate) fn insert_student(conn: &Connection, student: &Student) -> Result<()> {
    let person = student.person();
    conn.execute(
        "INSERT INTO students (student_id, name, age, email) VALUES (?1, ?2, ?3, ?4)",
        params![student.id().as_str(), person.name(), person.age(), person.email()],
    )
    .map_err(|err| map_constraint(err, STUDENT, student.id().as_str()))?;

    debug!(student_id = %student.id(), "inserted student");
    Ok(())
}

/// Overwrite name, age and email for an existing row. Never inserts.
pub(crate) fn update_student(conn: &Connection, student: &Student) -> Result<()> {
    let person = student.person();
    let updated = conn.execute(
        "UPDATE students SET name = ?1, age = ?2, email = ?3 WHERE student_id = ?4",
        params![person.name(), person.age(), person.email(), student.id().as_str()],
    )?;

    if updated == 0 {
        Err(RecordsError::not_found(STUDENT, student.id().as_str()))
    } else {
        debug!(student_id = %student.id(), "updated student");
        Ok(())
    }
}

/// Registrations that mention the student are left in place.
pub(crate) fn delete_student(conn: &Connection, id: &StudentId) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM students WHERE student_id = ?1",
        params![id.as_str()],
    )?;

    if deleted == 0 {
        Err(RecordsError::not_found(STUDENT, id.as_str()))
    } else {
        debug!(student_id = %id, "deleted student");
        Ok(())
    }
}

/// Scan every row and return the id of the first student whose name matches
/// exactly (case-sensitive).
pub(crate) fn find_student_id_by_name(conn: &Connection, name: &str) -> Result<Option<StudentId>> {
    fetch_students(conn)?
        .into_iter()
        .find(|row| row.name == name)
        .map(|row| StudentId::new(row.student_id).map_err(RecordsError::from))
        .transpose()
}

impl Store {
    /// Insert one student. `DuplicateKey` if the id is taken.
    pub fn add_student(&self, student: &Student) -> Result<()> {
        let conn = self.connect()?;
        insert_student(&conn, student)
    }

    /// All student rows in insertion order.
    pub fn students(&self) -> Result<Vec<StudentRow>> {
        let conn = self.connect()?;
        fetch_students(&conn)
    }

    /// Rewrite an existing student's fields. `NotFound` if the id is unknown.
    pub fn update_student(&self, student: &Student) -> Result<()> {
        let conn = self.connect()?;
        update_student(&conn, student)
    }

    /// Remove a student. Their registrations stay behind as orphans.
    pub fn delete_student(&self, id: &StudentId) -> Result<()> {
        let conn = self.connect()?;
        delete_student(&conn, id)
    }

    /// Id of the first student with exactly this name, if any.
    pub fn student_id_by_name(&self, name: &str) -> Result<Option<StudentId>> {
        let conn = self.connect()?;
        find_student_id_by_name(&conn, name)
    }
}
